//! Binary that emits command-line options markdown to stdout.
//!
//! `cargo run -p co2dash-cli --bin gen_docs > OPTIONS.md`

fn main() {
    print!("{}", co2dash_cli::render_options_markdown());
}
