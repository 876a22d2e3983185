//! End-to-end scenarios through the public `Gallery` API.
//!
//! Unit tests cover each component with a hand-driven fetcher. These drive a
//! whole gallery the way a host would: real files probed on the worker pool,
//! a wall clock, and layout properties read back from the surface.

use image::{ImageBuffer, Rgb};
use mosaic_gal::config::{GalleryConfig, LayoutOptions};
use mosaic_gal::fetch::{FileFetcher, ImageFetcher, SyntheticFetcher};
use mosaic_gal::gallery::Gallery;
use mosaic_gal::surface::{MemorySurface, NodeKind, RenderSurface, StyleProp};
use mosaic_gal::types::LayoutKind;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn gallery<F: ImageFetcher>(fetcher: F, layout: LayoutKind, width: f64) -> Gallery<MemorySurface, F> {
    let mut surface = MemorySurface::new();
    let container = surface.create_node(NodeKind::Container);
    surface.set_client_width(container, width);
    let config = GalleryConfig {
        layout,
        ..GalleryConfig::default()
    };
    Gallery::new(surface, fetcher, container, config)
}

fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> String {
    let path = dir.join(name);
    ImageBuffer::from_pixel(width, height, Rgb([40u8, 40, 40]))
        .save(&path)
        .unwrap();
    path.display().to_string()
}

/// Tick on the wall clock measured from `start` until the gallery has no
/// timer work left.
fn run_until_idle<F: ImageFetcher>(g: &mut Gallery<MemorySurface, F>, start: Instant) {
    while g.next_wakeup().is_some() {
        assert!(start.elapsed() < Duration::from_secs(30), "gallery never went idle");
        std::thread::sleep(Duration::from_millis(2));
        g.tick(start.elapsed());
    }
}

fn percent_width(g: &Gallery<MemorySurface, impl ImageFetcher>, node: mosaic_gal::surface::NodeId) -> f64 {
    g.surface()
        .style(node, StyleProp::Width)
        .and_then(|v| v.percent())
        .unwrap()
}

// =========================================================================
// File ingestion
// =========================================================================

#[test]
fn files_commit_in_submission_order() {
    let tmp = TempDir::new().unwrap();
    let big = write_png(tmp.path(), "big.png", 640, 480);
    let small = write_png(tmp.path(), "small.png", 8, 6);
    let tall = write_png(tmp.path(), "tall.png", 30, 90);
    let missing = tmp.path().join("missing.png").display().to_string();

    let fetcher = FileFetcher::new(Some(4)).unwrap();
    let mut g = gallery(fetcher, LayoutKind::Brick, 1000.0);
    let sources = [big.as_str(), missing.as_str(), small.as_str(), tall.as_str()];
    let titles = ["big", "missing", "small", "tall"];
    let start = Instant::now();
    g.set_images(&sources, &titles, LayoutOptions::default(), start.elapsed())
        .unwrap();
    run_until_idle(&mut g, start);

    let titles: Vec<&str> = g.records().map(|r| r.title()).collect();
    assert_eq!(titles, vec!["big", "small", "tall"]);
    let sizes: Vec<String> = g
        .records()
        .map(|r| r.natural_size().unwrap().to_string())
        .collect();
    assert_eq!(sizes, vec!["640x480", "8x6", "30x90"]);
    assert!(!g.is_loading());
}

#[test]
fn known_files_settle_synchronously_on_second_batch() {
    let tmp = TempDir::new().unwrap();
    let a = write_png(tmp.path(), "a.png", 20, 10);

    let fetcher = FileFetcher::new(Some(1)).unwrap();
    let mut g = gallery(fetcher, LayoutKind::Waterfall, 1000.0);
    let start = Instant::now();
    g.set_images(&[a.as_str()], &[], LayoutOptions::default(), start.elapsed())
        .unwrap();
    run_until_idle(&mut g, start);
    assert_eq!(g.cache_len(), 1);

    // The size is remembered, so this batch drains inside add_images.
    g.add_images(&[a.as_str()], &[], start.elapsed()).unwrap();
    assert!(!g.is_loading());
    assert_eq!(g.cache_len(), 2);
}

// =========================================================================
// Layout properties
// =========================================================================

#[test]
fn brick_rows_span_container() {
    let sizes = [
        "300x200", "200x300", "400x200", "250x250", "600x300", "300x400", "500x200", "200x200",
        "350x250", "300x300",
    ];
    let mut g = gallery(SyntheticFetcher, LayoutKind::Brick, 1000.0);
    g.set_images(&sizes, &[], LayoutOptions::default(), Duration::ZERO)
        .unwrap();

    let rows = g.surface().children(g.container());
    assert!(rows.len() > 1);
    let totals: Vec<f64> = rows
        .iter()
        .map(|row| {
            g.surface()
                .children(*row)
                .into_iter()
                .map(|w| percent_width(&g, w))
                .sum()
        })
        .collect();
    let (tail, finished) = totals.split_last().unwrap();
    for total in finished {
        assert!((total - 100.0).abs() < 1e-6, "row spans {total}%");
    }
    assert!(*tail <= 100.0 + 1e-6);
}

#[test]
fn waterfall_columns_stay_balanced() {
    let heights = [300, 100, 200, 150, 50, 400, 120, 80, 260, 90, 310, 60];
    let sources: Vec<String> = heights.iter().map(|h| format!("250x{h}")).collect();
    let refs: Vec<&str> = sources.iter().map(String::as_str).collect();

    let mut g = gallery(SyntheticFetcher, LayoutKind::Waterfall, 1000.0);
    g.set_images(&refs, &[], LayoutOptions::default(), Duration::ZERO)
        .unwrap();

    // 250px columns, so every image keeps its natural height.
    let columns = g.surface().children(g.container());
    assert_eq!(columns.len(), 4);
    let column_heights: Vec<u32> = columns
        .iter()
        .map(|col| {
            g.surface()
                .children(*col)
                .into_iter()
                .map(|w| {
                    let record = g.records().find(|r| r.wrapper() == w).unwrap();
                    record.natural_size().unwrap().height
                })
                .sum()
        })
        .collect();
    let max = *column_heights.iter().max().unwrap();
    let min = *column_heights.iter().min().unwrap();
    assert!(max - min <= *heights.iter().max().unwrap());
}

#[test]
fn jigsaw_caps_slots_at_six() {
    let mut g = gallery(SyntheticFetcher, LayoutKind::Jigsaw, 900.0);
    g.set_images(&["4x3"; 10], &[], LayoutOptions::default(), Duration::ZERO)
        .unwrap();
    assert_eq!(g.cache_len(), 10);
    assert_eq!(g.surface().children(g.container()).len(), 6);
    assert_eq!(g.surface().live_masks(), 6);
}
