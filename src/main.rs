use clap::{Parser, Subcommand};
use log::{info, warn};
use mosaic_gal::config::{self, GalleryConfig, LayoutOptions};
use mosaic_gal::fetch::{FileFetcher, ImageFetcher, SyntheticFetcher};
use mosaic_gal::gallery::Gallery;
use mosaic_gal::output;
use mosaic_gal::surface::{MemorySurface, NodeKind, RenderSurface};
use mosaic_gal::types::LayoutKind;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use walkdir::WalkDir;

/// Extensions picked up when walking a directory.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff", "webp"];

/// Longest the event loop sleeps between ticks.
const MAX_SLEEP: Duration = Duration::from_millis(5);

#[derive(Parser)]
#[command(name = "mosaic-gal")]
#[command(about = "Lay out images as a jigsaw, waterfall or brick gallery")]
#[command(long_about = "\
Lay out images as a jigsaw, waterfall or brick gallery

Images are ingested in the order given. Their sizes are probed from file
headers on a worker pool and committed strictly in submission order; an image
that cannot be read, or that takes longer than the configured timeout, is
dropped. The chosen layout is then printed as a node tree.

Layouts:

  jigsaw      fixed grid of up to six slots, each image cropped to its slot
  waterfall   equal-width columns, each image goes to the shortest column
  brick       justified rows scaled to fill the container width

Examples:

  mosaic-gal layout --layout brick photos/
  mosaic-gal layout --layout waterfall --width 1000 --synthetic 250x300,250x100
  mosaic-gal layout --config gallery.toml --json photos/

Set RUST_LOG=debug to watch ingestion and placement.
Run 'mosaic-gal gen-config' to generate a documented gallery.toml.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest images and print the resulting layout
    Layout(LayoutArgs),
    /// Print a stock gallery.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct LayoutArgs {
    /// Layout to build (overrides the config file)
    #[arg(long)]
    layout: Option<LayoutKind>,

    /// Container width in pixels
    #[arg(long, default_value_t = 1200.0)]
    width: f64,

    /// gallery.toml, or a directory containing one
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use synthetic WxH sizes instead of files, e.g. 800x600,600x800
    #[arg(long, value_delimiter = ',')]
    synthetic: Vec<String>,

    /// Print the surface tree as JSON
    #[arg(long)]
    json: bool,

    /// Size-probe worker threads (default: one per core)
    #[arg(long)]
    threads: Option<usize>,

    /// Image files or directories to walk
    paths: Vec<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Layout(args) => run_layout(args)?,
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn run_layout(args: LayoutArgs) -> Result<(), Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => GalleryConfig::default(),
    };
    if let Some(layout) = args.layout {
        config.layout = layout;
    }

    if args.synthetic.is_empty() {
        let sources = collect_images(&args.paths);
        if sources.is_empty() {
            warn!("no images found");
        }
        let fetcher = FileFetcher::new(args.threads)?;
        run(fetcher, config, args.width, &sources, args.json)
    } else {
        run(SyntheticFetcher, config, args.width, &args.synthetic, args.json)
    }
}

/// Drive a gallery over `sources` until nothing is left to do, then print it.
fn run<F: ImageFetcher>(
    fetcher: F,
    config: GalleryConfig,
    width: f64,
    sources: &[String],
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let mut surface = MemorySurface::new();
    let container = surface.create_node(NodeKind::Container);
    surface.set_client_width(container, width);
    let mut gallery = Gallery::new(surface, fetcher, container, config);

    let titles: Vec<String> = sources.iter().map(|s| title_from(s)).collect();
    let source_refs: Vec<&str> = sources.iter().map(String::as_str).collect();
    let title_refs: Vec<&str> = titles.iter().map(String::as_str).collect();

    let start = Instant::now();
    gallery.set_images(
        &source_refs,
        &title_refs,
        LayoutOptions::default(),
        start.elapsed(),
    )?;
    while let Some(wakeup) = gallery.next_wakeup() {
        let elapsed = start.elapsed();
        std::thread::sleep(wakeup.saturating_sub(elapsed).min(MAX_SLEEP));
        gallery.tick(start.elapsed());
    }
    let elapsed = start.elapsed();
    info!(
        "{} of {} images committed",
        gallery.cache_len(),
        sources.len()
    );

    let Some(snapshot) = gallery.surface().snapshot(gallery.container()) else {
        return Ok(());
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }
    output::print_images(gallery.records());
    println!();
    output::print_tree(&snapshot);
    println!();
    let layout = gallery.active_layout().unwrap_or(gallery.layout());
    println!(
        "{}",
        output::format_summary(layout, gallery.cache_len(), elapsed)
    );
    Ok(())
}

/// Expand directories into their image files, sorted by name.
fn collect_images(paths: &[PathBuf]) -> Vec<String> {
    let mut sources = Vec::new();
    for path in paths {
        if path.is_file() {
            sources.push(path.display().to_string());
            continue;
        }
        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if entry.file_type().is_file() && is_image(entry.path()) {
                sources.push(entry.path().display().to_string());
            }
        }
    }
    sources
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

/// File stem as the display title: `photos/dawn.jpg` becomes `dawn`.
fn title_from(source: &str) -> String {
    Path::new(source)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(source)
        .to_string()
}
