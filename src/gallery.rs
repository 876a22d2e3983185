//! Gallery orchestrator: the public API a host drives.
//!
//! A [`Gallery`] owns one rendering surface, one fetcher, the main cache and
//! the three moving parts that act on it: the ingestion monitor, the active
//! layout engine and the mutation coordinator. Nothing here is process-wide,
//! so independent galleries can live side by side.
//!
//! ## Time
//!
//! The gallery never sleeps or spawns timers. The host owns the clock and
//! calls [`Gallery::tick`] with the current instant (any monotonic
//! `Duration`, typically time since start). A tick delivers finished fetches,
//! then runs every poll instant and deferred removal that has come due, in
//! time order. [`Gallery::next_wakeup`] tells the host when the next timer
//! fires; [`Gallery::pump`] delivers completions without advancing the clock.
//!
//! Calls that start timed work (`set_images`, `add_images`, `remove_images`
//! and `handle_click`) take the current instant as well. They tick up to it
//! first, so a batch start or a removal deadline is never stamped with the
//! instant of an earlier tick.
//!
//! ## Lifecycle
//!
//! ```text
//! new ──► set_images ──► add_images / remove_images / tick / handle_click ...
//!              ▲                    │
//!              └──── set_images ◄───┘   (tears down and rebuilds)
//! ```
//!
//! `add_images` and `remove_images` before the first `set_images` are logged
//! no-ops. A batch submitted while another is still loading is rejected with
//! [`GalleryError::Busy`].

use crate::cache::MainCache;
use crate::config::{DEFAULT_TIMEOUT_MS, GalleryConfig, LayoutOptions, LayoutSettings};
use crate::fetch::ImageFetcher;
use crate::ingest::IngestionMonitor;
use crate::layout::{LayoutContext, LayoutEngine, RemovalMode, engine_for};
use crate::mutation::MutationCoordinator;
use crate::record::ImageRecord;
use crate::surface::{NodeId, NodeKind, RenderSurface, class};
use crate::types::{Gutter, LayoutKind};
use crate::viewer::{Viewer, ViewerTarget};
use log::{debug, info, warn};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryError {
    #[error("Gallery is not initialized; call set_images first")]
    NotInitialized,
    #[error("A previous batch is still loading")]
    Busy,
}

/// What a click routed through [`Gallery::handle_click`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The click hit nothing the gallery reacts to.
    Ignored,
    /// A delete affordance was clicked; carries the `remove_images` flag.
    RemovalRequested { all_found: bool },
    /// The viewer opened on this cache index.
    ViewerOpened(usize),
    /// The viewer moved; carries the new current index.
    ViewerMoved(usize),
    ViewerClosed,
}

pub struct Gallery<S, F> {
    surface: S,
    fetcher: F,
    container: NodeId,
    loading: NodeId,
    config: GalleryConfig,
    /// Layout the next `set_images` builds.
    layout: LayoutKind,
    gutter: Gutter,
    settings: LayoutSettings,
    full_screen: bool,
    initialized: bool,
    now: Duration,
    cache: MainCache,
    monitor: IngestionMonitor,
    mutations: MutationCoordinator,
    engine: Box<dyn LayoutEngine>,
    viewer: Viewer,
}

impl<S: RenderSurface, F: ImageFetcher> Gallery<S, F> {
    /// Take over `container` on `surface`.
    ///
    /// The loading indicator and the viewer modal are created detached; the
    /// host mounts them wherever it likes (see [`Gallery::loading_indicator`]
    /// and [`Viewer::modal`]).
    pub fn new(mut surface: S, fetcher: F, container: NodeId, config: GalleryConfig) -> Self {
        surface.add_class(container, class::GALLERY);
        let loading = surface.create_node(NodeKind::Text {
            text: "LOADING......".to_string(),
        });
        surface.add_class(loading, class::LOADING);
        let viewer = Viewer::new(&mut surface);

        let gutter = config.gutter.resolve();
        let settings = LayoutOptions::default().resolve(&config, gutter);
        let monitor =
            IngestionMonitor::new(config.ingest.timeout(), config.ingest.poll_interval());
        let mutations = MutationCoordinator::new(config.removal.delay());

        Self {
            surface,
            fetcher,
            container,
            loading,
            layout: config.layout,
            gutter,
            settings,
            full_screen: config.full_screen,
            initialized: false,
            now: Duration::ZERO,
            cache: MainCache::new(),
            monitor,
            mutations,
            engine: engine_for(config.layout),
            viewer,
            config,
        }
    }

    // =========================================================================
    // Content
    // =========================================================================

    /// Replace all content and (re)build the selected layout.
    ///
    /// `titles[i]` labels `sources[i]`; missing titles are empty. Options left
    /// unset fall back to the config, and an unset gutter keeps the current one.
    /// Replacing existing content also tells the fetcher to forget the sizes
    /// it remembered.
    pub fn set_images(
        &mut self,
        sources: &[&str],
        titles: &[&str],
        options: LayoutOptions,
        now: Duration,
    ) -> Result<(), GalleryError> {
        self.tick(now);
        if self.monitor.is_active() {
            warn!("set_images ignored: a previous batch is still loading");
            return Err(GalleryError::Busy);
        }
        self.teardown();

        self.settings = options.resolve(&self.config, self.gutter);
        self.gutter = self.settings.gutter;
        self.engine = engine_for(self.layout);
        let mut ctx = layout_ctx(
            &mut self.surface,
            &mut self.cache,
            self.container,
            &self.settings,
        );
        self.engine.init(&mut ctx);
        self.initialized = true;
        info!("{} layout initialized", self.layout);

        self.submit(sources, titles)
    }

    /// Append images to the current content.
    pub fn add_images(
        &mut self,
        sources: &[&str],
        titles: &[&str],
        now: Duration,
    ) -> Result<(), GalleryError> {
        if !self.initialized {
            warn!("add_images called before set_images; ignoring");
            return Err(GalleryError::NotInitialized);
        }
        self.tick(now);
        if self.monitor.is_active() {
            warn!("add_images ignored: a previous batch is still loading");
            return Err(GalleryError::Busy);
        }
        self.submit(sources, titles)
    }

    /// Request removal of the images whose wrappers are `wrappers`.
    ///
    /// Returns `false` if any target has no live record or is already being
    /// removed. Jigsaw removes at once; waterfall and brick show the exit
    /// affordance now and drop the records once the removal delay has passed.
    pub fn remove_images(&mut self, wrappers: &[NodeId], now: Duration) -> bool {
        if !self.initialized {
            warn!("remove_images called before set_images; ignoring");
            return false;
        }
        self.tick(now);
        let immediate = self.engine.removal_mode() == RemovalMode::Immediate;
        let mut ctx = layout_ctx(
            &mut self.surface,
            &mut self.cache,
            self.container,
            &self.settings,
        );
        let all_found = self
            .mutations
            .remove(self.engine.as_mut(), &mut ctx, wrappers, self.now);
        if immediate {
            self.close_viewer();
        }
        all_found
    }

    fn submit(&mut self, sources: &[&str], titles: &[&str]) -> Result<(), GalleryError> {
        let kind = self.engine.kind();
        let records: Vec<ImageRecord> = sources
            .iter()
            .enumerate()
            .map(|(i, source)| {
                let title = titles.get(i).copied().unwrap_or_default();
                ImageRecord::new(&mut self.surface, *source, title, kind)
            })
            .collect();
        let committed = self.monitor.submit(
            records,
            self.now,
            &self.fetcher,
            &mut self.surface,
            &mut self.cache,
        )?;
        self.place(committed);
        self.sync_loading();
        Ok(())
    }

    /// Drop the engine's layout and every record.
    fn teardown(&mut self) {
        self.close_viewer();
        self.mutations.clear();
        if self.initialized {
            self.fetcher.forget_resolved();
            let mut ctx = layout_ctx(
                &mut self.surface,
                &mut self.cache,
                self.container,
                &self.settings,
            );
            self.engine.teardown(&mut ctx);
        }
        for record in self.cache.drain() {
            record.destroy(&mut self.surface);
        }
    }

    // =========================================================================
    // Settings
    // =========================================================================

    /// Select the layout used by the next `set_images`.
    pub fn set_layout(&mut self, layout: LayoutKind) {
        debug!("layout {} selected", layout);
        self.layout = layout;
    }

    /// Selected layout (not necessarily the one on screen yet).
    pub fn layout(&self) -> LayoutKind {
        self.layout
    }

    /// Layout currently built on the container, if any.
    pub fn active_layout(&self) -> Option<LayoutKind> {
        self.initialized.then(|| self.engine.kind())
    }

    /// Spacing for placements from now on; `y` defaults to `x`.
    pub fn set_gutter(&mut self, x: f64, y: Option<f64>) {
        self.gutter = Gutter::new(x, y);
        self.settings.gutter = self.gutter;
    }

    pub fn gutter(&self) -> Gutter {
        self.gutter
    }

    /// Per-image timeout in milliseconds. Zero restores the default.
    pub fn set_timeout(&mut self, ms: u64) {
        let ms = if ms == 0 { DEFAULT_TIMEOUT_MS } else { ms };
        self.monitor.set_timeout(Duration::from_millis(ms));
    }

    pub fn timeout(&self) -> Duration {
        self.monitor.timeout()
    }

    pub fn enable_full_screen(&mut self) {
        self.full_screen = true;
    }

    pub fn disable_full_screen(&mut self) {
        self.full_screen = false;
        self.close_viewer();
    }

    pub fn is_full_screen_enabled(&self) -> bool {
        self.full_screen
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Advance the gallery clock to `now` and run everything that came due.
    ///
    /// The clock never runs backwards; an earlier `now` only delivers fetch
    /// completions.
    pub fn tick(&mut self, now: Duration) {
        self.now = self.now.max(now);
        let now = self.now;

        let committed = self.monitor.deliver(&mut self.surface, &mut self.cache);
        self.place(committed);

        loop {
            let poll = self.monitor.next_poll().filter(|t| *t <= now);
            let due = self.mutations.next_due().filter(|t| *t <= now);
            match (poll, due) {
                (None, None) => break,
                (Some(p), Some(d)) if d < p => self.run_removals(d),
                (Some(p), _) => {
                    let committed = self.monitor.poll_due(p, &mut self.surface, &mut self.cache);
                    self.place(committed);
                }
                (None, Some(d)) => self.run_removals(d),
            }
        }
        self.sync_loading();
    }

    /// Deliver finished fetches without advancing the clock.
    pub fn pump(&mut self) {
        self.tick(self.now);
    }

    /// Earliest instant at which a tick has timer work to do.
    pub fn next_wakeup(&self) -> Option<Duration> {
        match (self.monitor.next_poll(), self.mutations.next_due()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Whether a batch is loading or a removal is waiting.
    pub fn is_busy(&self) -> bool {
        self.next_wakeup().is_some()
    }

    /// Re-read the container width and let the engine adapt.
    pub fn resize(&mut self) {
        if !self.initialized {
            return;
        }
        let mut ctx = layout_ctx(
            &mut self.surface,
            &mut self.cache,
            self.container,
            &self.settings,
        );
        self.engine.resize(&mut ctx);
    }

    /// Route a click on `leaf` (the innermost node under the pointer) made at
    /// `now`.
    pub fn handle_click(&mut self, leaf: NodeId, now: Duration) -> ClickOutcome {
        if self.viewer.is_open() {
            match self.viewer.target_of(leaf) {
                Some(ViewerTarget::Banner) => {
                    self.viewer.hide(&mut self.surface);
                    return ClickOutcome::ViewerClosed;
                }
                Some(ViewerTarget::PrevArrow) => {
                    self.viewer.prev(&mut self.surface, &self.cache);
                    return self.viewer_position();
                }
                Some(ViewerTarget::NextArrow) => {
                    self.viewer.next(&mut self.surface, &self.cache);
                    return self.viewer_position();
                }
                None => {}
            }
        }
        if !self.initialized {
            return ClickOutcome::Ignored;
        }
        let Some(wrapper) = self.owning_wrapper(leaf) else {
            return ClickOutcome::Ignored;
        };
        if self.surface.has_class(leaf, class::DEL) {
            let all_found = self.remove_images(&[wrapper], now);
            return ClickOutcome::RemovalRequested { all_found };
        }

        let Some(index) = self.cache.index_of(wrapper) else {
            return ClickOutcome::Ignored;
        };
        let on_image = self
            .cache
            .get(index)
            .is_some_and(|r| r.nodes().image == leaf);
        if !on_image || !self.full_screen {
            return ClickOutcome::Ignored;
        }
        let window = self.engine.visible_count(self.cache.len());
        if self.viewer.show(&mut self.surface, &self.cache, index, window) {
            ClickOutcome::ViewerOpened(index)
        } else {
            ClickOutcome::Ignored
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Whether a batch is still loading.
    pub fn is_loading(&self) -> bool {
        self.monitor.is_active()
    }

    /// Wrapper nodes of the committed images, in cache order.
    pub fn image_elements(&self) -> Vec<NodeId> {
        if !self.initialized {
            warn!("image_elements called before set_images");
            return Vec::new();
        }
        self.cache.wrappers()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Committed records in cache order.
    pub fn records(&self) -> impl Iterator<Item = &ImageRecord> {
        self.cache.iter()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn container(&self) -> NodeId {
        self.container
    }

    pub fn loading_indicator(&self) -> NodeId {
        self.loading
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn place(&mut self, committed: usize) {
        if committed == 0 || !self.initialized {
            return;
        }
        let mut ctx = layout_ctx(
            &mut self.surface,
            &mut self.cache,
            self.container,
            &self.settings,
        );
        self.engine.place(&mut ctx);
    }

    fn run_removals(&mut self, due: Duration) {
        let mut ctx = layout_ctx(
            &mut self.surface,
            &mut self.cache,
            self.container,
            &self.settings,
        );
        let removed = self.mutations.run_due(self.engine.as_mut(), &mut ctx, due);
        if removed > 0 {
            debug!("{removed} deferred removals ran");
            self.close_viewer();
        }
    }

    fn sync_loading(&mut self) {
        if self.monitor.is_active() {
            self.surface.add_class(self.loading, class::LOADING_SHOW);
        } else {
            self.surface.remove_class(self.loading, class::LOADING_SHOW);
        }
    }

    /// Indices under an open viewer go stale when the cache changes shape.
    fn close_viewer(&mut self) {
        if self.viewer.is_open() {
            self.viewer.hide(&mut self.surface);
        }
    }

    fn viewer_position(&self) -> ClickOutcome {
        self.viewer
            .current()
            .map_or(ClickOutcome::ViewerClosed, ClickOutcome::ViewerMoved)
    }

    /// Nearest ancestor of `node` (itself included) that is a live wrapper.
    fn owning_wrapper(&self, node: NodeId) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(n) = current {
            if self.cache.index_of(n).is_some() {
                return Some(n);
            }
            current = self.surface.parent(n);
        }
        None
    }
}

fn layout_ctx<'a>(
    surface: &'a mut dyn RenderSurface,
    cache: &'a mut MainCache,
    container: NodeId,
    settings: &'a LayoutSettings,
) -> LayoutContext<'a> {
    LayoutContext {
        surface,
        cache,
        container,
        settings,
    }
}
