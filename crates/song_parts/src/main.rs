mod cli;
mod config;

use anyhow::Result;
use arranger::{allocate_in, render, render_catalog};
use clap::Parser;
use log::{debug, error, info, warn};
use std::io::{self, Write};

fn main() -> Result<()> {
    // Defaults to RUST_LOG if set, otherwise WARN so stdout stays clean
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .try_init();

    let args = cli::Args::parse();
    if let Err(e) = run(&args) {
        error!("Error: {e}");
        for cause in e.chain().skip(1) {
            error!("Caused by: {cause}");
        }
        let _ = io::stderr().flush();
        std::process::exit(1);
    }
    Ok(())
}

fn run(args: &cli::Args) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.list {
        let catalog = config::listing_catalog(args, config::env_config_value())?;
        render_catalog(&catalog, &mut out)?;
        return Ok(());
    }

    let settings = config::Settings::resolve(args)?;

    if settings.kinds.is_empty() {
        warn!("No sections requested. Pass section names or set song.structure in the config file.");
        return Ok(());
    }

    match (settings.length, settings.bpm) {
        (Some(length), Some(bpm)) => info!("Song length: {length} at {bpm} BPM"),
        (None, _) => warn!("No song length given (--duration); sections are left unallocated."),
        (_, None) => warn!("No tempo given (--bpm); sections are left unallocated."),
    }

    let total_beats = settings.total_beats();
    info!(
        "Allocating {total_beats} beats across {} sections, {} beats per measure",
        settings.kinds.len(),
        settings.beats_per_measure
    );

    let arrangement = allocate_in(
        &settings.catalog,
        &settings.kinds,
        total_beats,
        settings.beats_per_measure,
    );
    render(&arrangement, settings.format, &mut out)?;
    out.flush()?;

    debug!(
        "Total: {} measures, {} beats",
        arrangement.total_measures(),
        arrangement.total_beats()
    );
    if arrangement.unplaced_measures > 0 {
        info!(
            "{} measures were too few to share between sections and were left out",
            arrangement.unplaced_measures
        );
    }

    Ok(())
}
