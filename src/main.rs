use anyhow::Context;
use clap::Parser;
use cli::{render, Args};
use command::execute;
use store::CsvStore;
use tracing_subscriber::EnvFilter;

mod chart;
mod cli;
mod command;
mod compute;
mod data;
mod read;
mod store;
mod write;

fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();
    setup_logging(args.verbose);

    let mut store = CsvStore::new(&args.file);
    let svg = args.action.svg_path().cloned();
    let command = args.action.into_command()?;
    tracing::debug!("running {command:?} against {}", store.path().display());
    let outcome = execute(&mut store, command)?;

    let stdout = std::io::stdout();
    render(&mut stdout.lock(), &outcome)?;

    if let (Some(path), command::Outcome::Summarized { totals, .. }) = (svg, &outcome) {
        if totals.is_empty() {
            tracing::warn!("nothing to draw, {} not written", path.display());
        } else {
            chart::save_svg(totals, &path)
                .with_context(|| format!("cannot write chart to {}", path.display()))?;
            tracing::info!("chart written to {}", path.display());
        }
    }
    Ok(())
}

/// Logs go to stderr so they never mix with the tables and charts on stdout.
fn setup_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("expenses={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
