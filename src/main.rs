use clap::Parser;
use co2dash::{
    chart_export, error_display, report, AppConfig, Args, CacheManager, ConfigManager, Dashboard,
    DashboardParams, OpenOptions, ReportFormat, APP_NAME,
};
use co2dash::{App, AppEvent};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use ratatui::DefaultTerminal;
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(app, frame.area()))?;
    Ok(())
}

fn run(
    mut terminal: DefaultTerminal,
    args: Args,
    config: AppConfig,
    path: PathBuf,
    opts: OpenOptions,
) -> Result<()> {
    let (tx, rx) = channel::<AppEvent>();
    let debug = args.debug;
    let mut app = App::new(tx.clone(), args, config)?;
    if debug {
        app.enable_debug();
    }
    render(&mut terminal, &mut app)?;
    app.send_event(AppEvent::Open(path, opts))?;

    loop {
        if crossterm::event::poll(std::time::Duration::from_millis(25))? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) => tx.send(AppEvent::Key(key))?,
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        }

        let updated = match rx.recv_timeout(std::time::Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    event => {
                        if let Some(event) = app.event(&event) {
                            tx.send(event)?;
                        }
                    }
                }
                true
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => false,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if updated {
            render(&mut terminal, &mut app)?;
        }
    }
    Ok(())
}

/// Report and PNG export run without the terminal UI.
fn is_batch(args: &Args) -> bool {
    args.report.is_some() || args.export_png.is_some()
}

fn run_batch(args: &Args, config: &AppConfig, path: &Path, opts: &OpenOptions) -> Result<()> {
    let table = co2dash::load_table(path, opts)?;
    let dashboard = Dashboard::new(table.store);
    let params = DashboardParams::from_args_and_config(args, config, dashboard.meta());
    let view = dashboard.compute(&params);

    if let Some(png) = &args.export_png {
        chart_export::export_view_png(png, &view, config.export.width, config.export.height)?;
        eprintln!("Chart written to {}", png.display());
    }

    match args.report {
        Some(ReportFormat::Text) => print!("{}", report::render_text(&dashboard, &view)),
        Some(ReportFormat::Json) => println!("{}", report::render_json(&view)?),
        None => {}
    }
    Ok(())
}

/// Logs go to stderr in batch mode and to the cache directory while the
/// dashboard owns the terminal.
fn init_logging(args: &Args, config: &AppConfig, to_file: bool) {
    let level = if args.debug {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));
    if args.debug {
        builder.filter_level(log::LevelFilter::Debug);
    }

    if to_file {
        match CacheManager::new(APP_NAME).and_then(|cache| cache.open_log_file()) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(_) => {
                builder.filter_level(log::LevelFilter::Off);
            }
        }
    } else {
        builder.target(env_logger::Target::Stderr);
    }

    // Ignore an already-installed logger
    let _ = builder.try_init();
}

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.generate_config {
        match ConfigManager::new(APP_NAME) {
            Ok(config_manager) => match config_manager.write_default_config(args.force) {
                Ok(config_path) => {
                    println!("Configuration file written to: {}", config_path.display());
                    return Ok(Some(()));
                }
                Err(e) => {
                    eprintln!("Error writing configuration file: {}", e);
                    std::process::exit(1);
                }
            },
            Err(e) => {
                eprintln!("Error initializing config manager: {}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(None)
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    color_eyre::install()?;
    let config = AppConfig::load(APP_NAME)?;
    let path = args
        .path
        .clone()
        .ok_or_else(|| eyre!("A data file path is required"))?;
    let opts = OpenOptions::from_args_and_config(&args, &config);
    let batch = is_batch(&args);
    init_logging(&args, &config, !batch);

    if batch {
        if let Err(e) = run_batch(&args, &config, &path, &opts) {
            log::debug!("{:?}", e);
            eprintln!("Error: {}", error_display::user_message(&e));
            std::process::exit(1);
        }
        return Ok(());
    }

    let terminal = ratatui::init();
    let result = run(terminal, args, config, path, opts);
    ratatui::restore();
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
