use std::{io, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use library_catalog::{
    LoadPolicy,
    console::Console,
    observers::TransitionLogger,
    persistence::{self, DEFAULT_CATALOG_FILE},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the library catalog
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Catalog file to load on start and save on exit
    #[arg(long, env = "LIBRARY_CATALOG_FILE", default_value = DEFAULT_CATALOG_FILE)]
    catalog_file: PathBuf,

    /// Skip malformed lines in the catalog file instead of refusing to start
    #[arg(long)]
    skip_malformed: bool,

    /// Write a JSON snapshot of the loaded catalog to this path and exit
    #[arg(long, value_name = "PATH")]
    export_json: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

/// Install the stderr fmt subscriber
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

/// Load, run the console, save
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    if args.no_color {
        colored::control::set_override(false);
    }

    let policy = if args.skip_malformed { LoadPolicy::Skip } else { LoadPolicy::Abort };
    let (mut catalog, report) = persistence::load(&args.catalog_file, policy)
        .with_context(|| format!("failed to load {}", args.catalog_file.display()))?;
    for skipped in &report.skipped {
        eprintln!("{} {skipped}", "Skipped:".yellow());
    }

    if let Some(path) = &args.export_json {
        persistence::export_json(&catalog, path)
            .with_context(|| format!("failed to export {}", path.display()))?;
        println!("Exported {} books to {}", catalog.len(), path.display());
        return Ok(());
    }

    catalog.register_observer(Box::new(TransitionLogger));
    info!(%catalog, "catalog ready");

    Console::new(&mut catalog, io::stdin().lock(), io::stdout().lock())
        .run()
        .context("console I/O failed")?;

    persistence::save(&catalog, &args.catalog_file)
        .with_context(|| format!("failed to save {}", args.catalog_file.display()))?;
    println!("{}", "Data saved. Goodbye!".green());
    Ok(())
}
