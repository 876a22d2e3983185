//! Shared test utilities for the mosaic-gal test suite.
//!
//! Provides a hand-driven fetcher, ready-made caches of committed records, and
//! a rig that owns everything a layout engine needs for one operation.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mut rig = LayoutRig::new(1000.0);
//! rig.commit(LayoutKind::Brick, &["300x200", "200x300"]);
//!
//! let mut layout = BrickLayout::new();
//! layout.init(&mut rig.ctx());
//! layout.place(&mut rig.ctx());
//! ```

use std::collections::HashMap;
use std::sync::Mutex;

use crate::cache::MainCache;
use crate::config::{GalleryConfig, LayoutOptions, LayoutSettings};
use crate::fetch::{FetchCompleter, FetchError, FetchTask, ImageFetcher, SyntheticFetcher};
use crate::gallery::Gallery;
use crate::layout::LayoutContext;
use crate::record::ImageRecord;
use crate::surface::{MemorySurface, NodeId, NodeKind, RenderSurface};
use crate::types::{Dimensions, Gutter, LayoutKind};

// =========================================================================
// Hand-driven fetcher
// =========================================================================

/// Fetcher whose tasks settle only when the test says so.
///
/// Sources registered with [`ManualFetcher::with_cached`] settle
/// synchronously, like sizes the host already knows, until the gallery
/// asks the fetcher to forget them.
#[derive(Debug, Default)]
pub struct ManualFetcher {
    waiting: Mutex<HashMap<String, Vec<FetchCompleter>>>,
    cached: Mutex<HashMap<String, Dimensions>>,
}

impl ManualFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cached(mut self, source: &str, width: u32, height: u32) -> Self {
        self.cached
            .get_mut()
            .unwrap()
            .insert(source.to_string(), Dimensions::new(width, height));
        self
    }

    /// Complete every pending fetch of `source` with a size.
    pub fn resolve(&self, source: &str, width: u32, height: u32) {
        for completer in self.take(source) {
            completer.complete(Ok(Dimensions::new(width, height)));
        }
    }

    /// Complete every pending fetch of `source` with a decode error.
    pub fn fail(&self, source: &str) {
        for completer in self.take(source) {
            completer.complete(Err(FetchError::Decode(format!("{source}: bad data"))));
        }
    }

    fn take(&self, source: &str) -> Vec<FetchCompleter> {
        self.waiting
            .lock()
            .unwrap()
            .remove(source)
            .unwrap_or_default()
    }
}

impl ImageFetcher for ManualFetcher {
    fn fetch(&self, source: &str) -> FetchTask {
        if let Some(dims) = self.cached.lock().unwrap().get(source).copied() {
            return FetchTask::ready(Ok(dims));
        }
        let (completer, task) = FetchTask::pending();
        self.waiting
            .lock()
            .unwrap()
            .entry(source.to_string())
            .or_default()
            .push(completer);
        task
    }

    fn forget_resolved(&self) {
        self.cached.lock().unwrap().clear();
    }
}

// =========================================================================
// Committed records
// =========================================================================

/// Build a cache of committed records whose sizes come from `WxH` sources.
pub fn committed_cache(surface: &mut MemorySurface, sources: &[&str]) -> MainCache {
    let mut cache = MainCache::new();
    push_committed(surface, &mut cache, LayoutKind::Brick, sources);
    cache
}

fn push_committed(
    surface: &mut MemorySurface,
    cache: &mut MainCache,
    kind: LayoutKind,
    sources: &[&str],
) {
    for source in sources {
        let mut record = ImageRecord::new(surface, *source, *source, kind);
        assert!(
            record.resolve(&SyntheticFetcher, surface),
            "source '{source}' is not a WxH reference"
        );
        cache.push(record, surface);
    }
}

// =========================================================================
// Layout rig
// =========================================================================

/// A surface, a cache and a container: one engine's whole world.
pub struct LayoutRig {
    pub surface: MemorySurface,
    pub cache: MainCache,
    pub container: NodeId,
    pub settings: LayoutSettings,
}

impl LayoutRig {
    /// Empty container `width` pixels wide, stock layout settings.
    pub fn new(width: f64) -> Self {
        let mut surface = MemorySurface::new();
        let container = surface.create_node(NodeKind::Container);
        surface.set_client_width(container, width);
        Self {
            surface,
            cache: MainCache::new(),
            container,
            settings: LayoutOptions::default().resolve(&GalleryConfig::default(), Gutter::default()),
        }
    }

    pub fn ctx(&mut self) -> LayoutContext<'_> {
        LayoutContext {
            surface: &mut self.surface,
            cache: &mut self.cache,
            container: self.container,
            settings: &self.settings,
        }
    }

    /// Commit records for `WxH` sources to the cache without placing them.
    pub fn commit(&mut self, kind: LayoutKind, sources: &[&str]) {
        push_committed(&mut self.surface, &mut self.cache, kind, sources);
    }

    pub fn set_width(&mut self, width: f64) {
        self.surface.set_client_width(self.container, width);
    }
}

// =========================================================================
// Gallery builders
// =========================================================================

/// Gallery over a fresh surface with a container `width` pixels wide.
pub fn gallery_with<F: ImageFetcher>(
    fetcher: F,
    width: f64,
    config: GalleryConfig,
) -> Gallery<MemorySurface, F> {
    let mut surface = MemorySurface::new();
    let container = surface.create_node(NodeKind::Container);
    surface.set_client_width(container, width);
    Gallery::new(surface, fetcher, container, config)
}

/// Stock config with `layout` selected.
pub fn config_for(layout: LayoutKind) -> GalleryConfig {
    GalleryConfig {
        layout,
        ..GalleryConfig::default()
    }
}
