//! Global series chart export to PNG (plotters bitmap).

use color_eyre::Result;
use std::path::Path;

use crate::aggregate::{Extremes, SeriesPoint};
use crate::dashboard::DashboardView;

/// Size and labels for the exported image.
#[derive(Debug, Clone)]
pub struct ChartExportOptions {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub y_label: String,
}

impl ChartExportOptions {
    pub fn for_view(view: &DashboardView, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            title: format!(
                "Global CO2 emissions {}-{}",
                view.years.min, view.years.max
            ),
            y_label: format!("{} CO2", view.unit.label()),
        }
    }
}

/// Axis bounds with a little headroom; degenerate spans are widened.
fn axis_bounds(series: &[SeriesPoint]) -> ((f64, f64), (f64, f64)) {
    let x_min = series.first().map(|p| p.year as f64).unwrap_or(0.0);
    let mut x_max = series.last().map(|p| p.year as f64).unwrap_or(1.0);
    if x_max <= x_min {
        x_max = x_min + 1.0;
    }
    let y_min = series
        .iter()
        .map(|p| p.value)
        .fold(f64::INFINITY, f64::min)
        .min(0.0);
    let mut y_max = series.iter().map(|p| p.value).fold(f64::NEG_INFINITY, f64::max);
    if !y_max.is_finite() || y_max <= y_min {
        y_max = y_min + 1.0;
    }
    ((x_min, x_max), (y_min, y_max * 1.05))
}

/// Draw the visible global series with its local peak and valley marked.
pub fn write_series_png(
    path: &Path,
    series: &[SeriesPoint],
    extremes: Option<&Extremes>,
    options: &ChartExportOptions,
) -> Result<()> {
    use plotters::prelude::*;

    if series.is_empty() {
        return Err(color_eyre::eyre::eyre!("No data to export"));
    }

    let root = BitMapBackend::new(path, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let ((x_min, x_max), (y_min, y_max)) = axis_bounds(series);

    let mut chart = ChartBuilder::on(&root)
        .caption(options.title.as_str(), ("sans-serif", 22).into_font())
        .margin(30)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc(options.y_label.as_str())
        .x_label_formatter(&|x| format!("{:.0}", x))
        .draw()?;

    let line_color = RGBColor(0x2e, 0x7d, 0x32);
    chart
        .draw_series(LineSeries::new(
            series.iter().map(|p| (p.year as f64, p.value)),
            line_color.stroke_width(2),
        ))?
        .label("Global")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_color));

    if let Some(extremes) = extremes {
        let markers = [
            (extremes.peak, RED, "Peak"),
            (extremes.valley, BLUE, "Valley"),
        ];
        for (point, color, name) in markers {
            let label = format!("{} {} ({:.2})", name, point.year, point.value);
            chart.draw_series(PointSeries::of_element(
                std::iter::once((point.year as f64, point.value)),
                5,
                color,
                &|c, s, st| {
                    EmptyElement::at(c)
                        + Circle::new((0, 0), s, st.filled())
                        + Text::new(label.clone(), (8, -12), ("sans-serif", 14).into_font())
                },
            ))?;
        }
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    log::info!("Exported chart to {}", path.display());
    Ok(())
}

/// Export the view's visible series.
pub fn export_view_png(path: &Path, view: &DashboardView, width: u32, height: u32) -> Result<()> {
    let options = ChartExportOptions::for_view(view, width, height);
    write_series_png(path, &view.series, view.local_extremes.as_ref(), &options)
}
