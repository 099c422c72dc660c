//! Trackmap CLI - Command-line interface
//!
//! This binary provides a command-line interface to the trackmap library.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use trackmap::coord::{BoundingBox, TILE_SIZE};
use trackmap::fetch::HttpFetcher;
use trackmap::logging;
use trackmap::map::{DownloadConfig, MapSettings, ProgressObserver, TileMap};
use trackmap::mosaic::{self, GapPolicy};
use trackmap::source::{Availability, TileSource};

#[derive(Parser)]
#[command(name = "trackmap")]
#[command(about = "Download map tiles and assemble them into one image", long_about = None)]
struct Args {
    /// First corner latitude in decimal degrees
    #[arg(long, allow_negative_numbers = true, required_unless_present = "list_sources")]
    lat1: Option<f64>,

    /// First corner longitude in decimal degrees
    #[arg(long, allow_negative_numbers = true, required_unless_present = "list_sources")]
    lon1: Option<f64>,

    /// Opposite corner latitude in decimal degrees
    #[arg(long, allow_negative_numbers = true, required_unless_present = "list_sources")]
    lat2: Option<f64>,

    /// Opposite corner longitude in decimal degrees
    #[arg(long, allow_negative_numbers = true, required_unless_present = "list_sources")]
    lon2: Option<f64>,

    /// Tile source, by name or catalog index (see --list-sources)
    #[arg(long, default_value = "openstreetmap")]
    source: TileSource,

    /// Zoom level, clamped to the source's supported range
    #[arg(long, default_value_t = 12)]
    zoom: u8,

    /// Output image path (format chosen by file extension)
    #[arg(long, default_value = "map.png")]
    output: PathBuf,

    /// Number of tile requests in flight at once
    #[arg(long, default_value_t = 1)]
    max_in_flight: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Attempts per tile before it is reported failed
    #[arg(long, default_value_t = 3)]
    retries: u32,

    /// Reuse tiles already present in the cache
    #[arg(long)]
    reuse_cache: bool,

    /// Tile cache directory (default: ~/.trackmap/cache)
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Mirror logs into this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (repeat for more)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log warnings and errors only
    #[arg(short = 'q', long)]
    quiet: bool,

    /// List the tile source catalog and exit
    #[arg(long)]
    list_sources: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if args.list_sources {
        print_sources();
        return;
    }

    let verbosity = if args.quiet { -1 } else { args.verbose as i8 };
    let _logging = match logging::init_logging(verbosity, args.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error initializing logging: {}", e);
            process::exit(1);
        }
    };

    // clap guarantees all four corners unless --list-sources was given.
    let (lat1, lon1, lat2, lon2) = match (args.lat1, args.lon1, args.lat2, args.lon2) {
        (Some(lat1), Some(lon1), Some(lat2), Some(lon2)) => (lat1, lon1, lat2, lon2),
        _ => {
            eprintln!("Error: --lat1, --lon1, --lat2 and --lon2 are required");
            process::exit(1);
        }
    };

    let bbox = match BoundingBox::new(lat1, lon1, lat2, lon2) {
        Ok(bbox) => bbox,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let zoom = clamp_zoom(args.zoom, args.source);
    let settings = MapSettings::new(args.source, zoom, bbox);
    let map = match build_map(settings, args.cache_dir.clone()) {
        Ok(map) => map,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let grid = map.grid();
    println!("Downloading {} tiles:", map.tiles().len());
    println!("  Source: {}", args.source.name());
    println!("  Zoom: {}", zoom);
    println!(
        "  Grid: {}x{} tiles ({}x{} pixels)",
        grid.width(),
        grid.height(),
        grid.width() * TILE_SIZE,
        grid.height() * TILE_SIZE
    );
    println!("  Cache: {}", map.cache_root().display());
    println!();

    let fetcher = match HttpFetcher::new() {
        Ok(fetcher) => Arc::new(fetcher),
        Err(e) => {
            eprintln!("Error creating HTTP client: {}", e);
            process::exit(1);
        }
    };

    let config = DownloadConfig::new()
        .with_max_in_flight(args.max_in_flight)
        .with_request_timeout(Duration::from_secs(args.timeout_secs))
        .with_max_attempts(args.retries)
        .with_reuse_cached(args.reuse_cache);

    // First Ctrl-C cancels the run; tiles already in flight finish.
    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Interrupted, stopping the download...");
            interrupt.cancel();
        }
    });

    let bar = Arc::new(BarObserver::new(map.tiles().len() as u64));
    let start = std::time::Instant::now();
    let report = match map
        .download_cancellable(fetcher, &config, bar.clone(), cancel)
        .await
    {
        Ok(report) => report,
        Err(e) => {
            bar.finish();
            eprintln!("Error downloading tiles: {}", e);
            process::exit(1);
        }
    };
    bar.finish();

    if report.cancelled() {
        eprintln!(
            "Cancelled after {} of {} tiles",
            report.completed().len(),
            report.total()
        );
        process::exit(1);
    }

    for failure in report.failed() {
        eprintln!(
            "Failed tile {} after {} attempts: {}",
            failure.coord, failure.attempts, failure.error
        );
    }

    println!(
        "Downloaded {} of {} tiles in {:.2}s",
        report.completed().len(),
        report.total(),
        start.elapsed().as_secs_f64()
    );

    // Failed tiles become magenta cells so the run still produces a map.
    let mosaic = match mosaic::assemble(&map, GapPolicy::default()).await {
        Ok(mosaic) => mosaic,
        Err(e) => {
            eprintln!("Error assembling mosaic: {}", e);
            process::exit(1);
        }
    };

    if !mosaic.gaps().is_empty() {
        println!("  {} tile(s) missing, painted as gaps", mosaic.gaps().len());
    }

    match mosaic.save(&args.output) {
        Ok(()) => {
            let file_size = std::fs::metadata(&args.output).map(|m| m.len()).unwrap_or(0);
            println!(
                "✓ Saved successfully: {} ({}x{}, {:.2} MB)",
                args.output.display(),
                mosaic.width(),
                mosaic.height(),
                file_size as f64 / 1_048_576.0
            );
        }
        Err(e) => {
            eprintln!("Error saving mosaic: {}", e);
            process::exit(1);
        }
    }

    let attribution = args.source.attribution();
    if !attribution.is_empty() {
        println!("  {}", attribution);
    }

    if !report.failed().is_empty() {
        process::exit(1);
    }
}

/// Clamps the requested zoom into the source's supported range.
fn clamp_zoom(zoom: u8, source: TileSource) -> u8 {
    let clamped = zoom.clamp(source.min_zoom(), source.max_zoom());
    if clamped != zoom {
        warn!(
            requested = zoom,
            used = clamped,
            source = source.name(),
            "zoom clamped to the source's supported range"
        );
    }
    clamped
}

fn build_map(
    settings: MapSettings,
    cache_dir: Option<PathBuf>,
) -> Result<TileMap, trackmap::map::MapError> {
    match cache_dir {
        Some(dir) => TileMap::with_cache_root(settings, dir),
        None => TileMap::new(settings),
    }
}

fn print_sources() {
    println!("Available tile sources:");
    for source in TileSource::all() {
        match source.availability() {
            Availability::Disabled => continue,
            Availability::Unsupported => {
                println!(
                    "  {:>2}  {:<24} (not supported: quadtree tile addressing)",
                    source.index(),
                    source.slug()
                );
            }
            Availability::Available => {
                println!(
                    "  {:>2}  {:<24} zoom {:>2}-{:>2}  {}",
                    source.index(),
                    source.slug(),
                    source.min_zoom(),
                    source.max_zoom(),
                    source.attribution()
                );
            }
        }
    }
    println!();
    println!("Pass --source with the name or the index.");
}

/// Progress bar fed by download events.
struct BarObserver {
    bar: ProgressBar,
}

impl BarObserver {
    fn new(total: u64) -> Self {
        let style = ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} tiles ({percent}%)")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        let bar = ProgressBar::new(total);
        bar.set_style(style);
        Self { bar }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressObserver for BarObserver {
    fn tile_finished(&self, completed: usize, _total: usize) {
        self.bar.set_position(completed as u64);
    }
}
