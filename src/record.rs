//! One submitted image and its load/commit lifecycle.
//!
//! ```text
//!             resolve ok            commit
//! Pending ──────────────► SizeObtained ─────► Committed ──► (destroyed on removal)
//!    │
//!    └── fetch failed / timed out ──► Errored  (discarded, never committed)
//! ```
//!
//! A record owns its surface nodes: a wrapper holding the image, and after
//! reveal an info label and a delete affordance. While the size is known but
//! the record is not yet committed, the wrapper shows a placeholder chosen by
//! the layout that was active when the record was submitted.

use crate::fetch::{FetchError, FetchResult, FetchTask, ImageFetcher};
use crate::surface::{NodeId, NodeKind, RenderSurface, StyleProp, StyleValue, class};
use crate::types::{Dimensions, LayoutKind};
use log::{debug, warn};

const PLACEHOLDER_COLOR: &str = "grey";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    /// Waiting for the fetch to report a size.
    Pending,
    /// Size known; waiting for earlier records before it can be committed.
    SizeObtained,
    /// Living in the main cache.
    Committed,
    /// Fetch failed or timed out; will be discarded.
    Errored,
}

/// Surface nodes owned by a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordNodes {
    pub wrapper: NodeId,
    pub image: NodeId,
    pub placeholder: Option<NodeId>,
    pub info: Option<NodeId>,
    pub delete: Option<NodeId>,
}

#[derive(Debug)]
pub struct ImageRecord {
    source: String,
    title: String,
    layout: LayoutKind,
    dimensions: Option<Dimensions>,
    state: RecordState,
    cache_index: Option<usize>,
    removing: bool,
    failure: Option<FetchError>,
    nodes: RecordNodes,
    task: Option<FetchTask>,
}

impl ImageRecord {
    /// Create a pending record and its wrapper/image nodes (detached).
    pub fn new(
        surface: &mut dyn RenderSurface,
        source: impl Into<String>,
        title: impl Into<String>,
        layout: LayoutKind,
    ) -> Self {
        let source = source.into();
        let wrapper = surface.create_node(NodeKind::Container);
        surface.add_class(wrapper, class::WRAPPER);
        let image = surface.create_node(NodeKind::Image {
            source: source.clone(),
        });
        Self {
            source,
            title: title.into(),
            layout,
            dimensions: None,
            state: RecordState::Pending,
            cache_index: None,
            removing: false,
            failure: None,
            nodes: RecordNodes {
                wrapper,
                image,
                placeholder: None,
                info: None,
                delete: None,
            },
            task: None,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn state(&self) -> RecordState {
        self.state
    }

    pub fn natural_size(&self) -> Option<Dimensions> {
        self.dimensions
    }

    /// Size used by layout math. Committed records always carry a size; a
    /// unit square is assumed otherwise so geometry never divides by zero.
    pub fn layout_size(&self) -> Dimensions {
        self.dimensions.unwrap_or(Dimensions::new(1, 1))
    }

    pub fn cache_index(&self) -> Option<usize> {
        self.cache_index
    }

    pub fn failure(&self) -> Option<&FetchError> {
        self.failure.as_ref()
    }

    pub fn nodes(&self) -> &RecordNodes {
        &self.nodes
    }

    pub fn wrapper(&self) -> NodeId {
        self.nodes.wrapper
    }

    /// Start fetching the size.
    ///
    /// Returns `true` when the fetcher settled synchronously, in which case the
    /// state transition has already happened and the caller must run its
    /// commit step right away rather than on a later tick.
    pub fn resolve(
        &mut self,
        fetcher: &dyn ImageFetcher,
        surface: &mut dyn RenderSurface,
    ) -> bool {
        self.task = Some(fetcher.fetch(&self.source));
        self.observe(surface)
    }

    /// Check the fetch task. Returns `true` if this call settled the record.
    pub fn observe(&mut self, surface: &mut dyn RenderSurface) -> bool {
        if self.state != RecordState::Pending {
            return false;
        }
        let Some(result) = self.task.as_mut().and_then(FetchTask::poll) else {
            return false;
        };
        self.task = None;
        self.settle(result, surface);
        true
    }

    fn settle(&mut self, result: FetchResult, surface: &mut dyn RenderSurface) {
        match result {
            Ok(dims) => {
                debug!("size obtained for {}: {}", self.source, dims);
                self.dimensions = Some(dims);
                self.state = RecordState::SizeObtained;
                self.show_placeholder(surface);
            }
            Err(e) => {
                warn!("failed to load {}: {}", self.source, e);
                self.fail(e);
            }
        }
    }

    /// Give up waiting. A pending record becomes `Errored(Timeout)`; the
    /// in-flight fetch is dropped, not cancelled. Returns `true` if it expired.
    pub fn expire(&mut self) -> bool {
        if self.state != RecordState::Pending {
            return false;
        }
        warn!("timed out waiting for {}", self.source);
        self.task = None;
        self.fail(FetchError::Timeout);
        true
    }

    fn fail(&mut self, error: FetchError) {
        self.failure = Some(error);
        self.state = RecordState::Errored;
    }

    fn show_placeholder(&mut self, surface: &mut dyn RenderSurface) {
        let wrapper = self.nodes.wrapper;
        match self.layout {
            LayoutKind::Waterfall => {
                // Reserve the image's space without showing it.
                surface.attach(wrapper, self.nodes.image);
                surface.set_style(self.nodes.image, StyleProp::Visibility, StyleValue::Visible(false));
                surface.set_style(
                    wrapper,
                    StyleProp::Background,
                    StyleValue::Color(PLACEHOLDER_COLOR.into()),
                );
            }
            LayoutKind::Jigsaw | LayoutKind::Brick => {
                let block = surface.create_node(NodeKind::Container);
                surface.add_class(block, class::PLACEHOLDER);
                surface.set_style(
                    block,
                    StyleProp::Background,
                    StyleValue::Color(PLACEHOLDER_COLOR.into()),
                );
                surface.set_style(block, StyleProp::Width, StyleValue::Percent(100.0));
                surface.set_style(block, StyleProp::Height, StyleValue::Percent(100.0));
                surface.attach(wrapper, block);
                self.nodes.placeholder = Some(block);
            }
        }
    }

    /// Move into the main cache at `index` and reveal the real content.
    pub fn commit(&mut self, index: usize, surface: &mut dyn RenderSurface) {
        self.state = RecordState::Committed;
        self.cache_index = Some(index);
        self.reveal(surface);
    }

    fn reveal(&mut self, surface: &mut dyn RenderSurface) {
        if let Some(block) = self.nodes.placeholder.take() {
            surface.destroy_node(block);
        }
        surface.set_style(self.nodes.image, StyleProp::Visibility, StyleValue::Visible(true));
        self.assemble(surface);
    }

    /// Rebuild the wrapper's children: image, info label, delete affordance.
    pub fn assemble(&mut self, surface: &mut dyn RenderSurface) {
        let wrapper = self.nodes.wrapper;
        let size = self.layout_size();
        let delete = *self.nodes.delete.get_or_insert_with(|| {
            let node = surface.create_node(NodeKind::Button);
            surface.add_class(node, class::DEL);
            node
        });
        // Text nodes are immutable on the surface; replace the label.
        if let Some(old) = self.nodes.info.take() {
            surface.destroy_node(old);
        }
        let info = surface.create_node(NodeKind::Text {
            text: format!("{}\n{}px {}px", self.title, size.width, size.height),
        });
        surface.add_class(info, class::INFO);
        self.nodes.info = Some(info);

        for child in [self.nodes.image, info, delete] {
            surface.attach(wrapper, child);
        }
    }

    /// Place the info label and delete affordance on the right-hand side.
    pub fn set_lean_right(&self, surface: &mut dyn RenderSurface, lean: bool) {
        for node in [self.nodes.info, self.nodes.delete].into_iter().flatten() {
            if lean {
                surface.add_class(node, class::LEAN_RIGHT);
            } else {
                surface.remove_class(node, class::LEAN_RIGHT);
            }
        }
    }

    /// Whether a deferred removal is waiting on this record. Layouts leave
    /// such records out when they pack or rebuild.
    pub fn is_removing(&self) -> bool {
        self.removing
    }

    pub(crate) fn begin_removal(&mut self) {
        self.removing = true;
    }

    pub(crate) fn set_cache_index(&mut self, index: usize) {
        self.cache_index = Some(index);
    }

    /// Destroy every node the record owns.
    pub fn destroy(self, surface: &mut dyn RenderSurface) {
        let n = self.nodes;
        for node in [Some(n.image), n.placeholder, n.info, n.delete, Some(n.wrapper)]
            .into_iter()
            .flatten()
        {
            surface.destroy_node(node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::SyntheticFetcher;
    use crate::surface::MemorySurface;
    use crate::test_helpers::ManualFetcher;

    fn record(s: &mut MemorySurface, source: &str, layout: LayoutKind) -> ImageRecord {
        ImageRecord::new(s, source, "t", layout)
    }

    #[test]
    fn new_record_is_pending_with_detached_nodes() {
        let mut s = MemorySurface::new();
        let r = record(&mut s, "a", LayoutKind::Brick);
        assert_eq!(r.state(), RecordState::Pending);
        assert_eq!(r.cache_index(), None);
        assert!(s.has_class(r.wrapper(), class::WRAPPER));
        assert_eq!(s.parent(r.wrapper()), None);
    }

    #[test]
    fn synchronous_fetch_settles_immediately() {
        let mut s = MemorySurface::new();
        let mut r = record(&mut s, "40x30", LayoutKind::Brick);
        assert!(r.resolve(&SyntheticFetcher, &mut s));
        assert_eq!(r.state(), RecordState::SizeObtained);
        assert_eq!(r.natural_size(), Some(Dimensions::new(40, 30)));
    }

    #[test]
    fn deferred_fetch_settles_on_observe() {
        let mut s = MemorySurface::new();
        let fetcher = ManualFetcher::new();
        let mut r = record(&mut s, "a", LayoutKind::Brick);
        assert!(!r.resolve(&fetcher, &mut s));
        assert!(!r.observe(&mut s));

        fetcher.resolve("a", 10, 20);
        assert!(r.observe(&mut s));
        assert_eq!(r.state(), RecordState::SizeObtained);
        // Only the first observation reports the transition.
        assert!(!r.observe(&mut s));
    }

    #[test]
    fn failed_fetch_errors_record() {
        let mut s = MemorySurface::new();
        let fetcher = ManualFetcher::new();
        let mut r = record(&mut s, "a", LayoutKind::Jigsaw);
        r.resolve(&fetcher, &mut s);
        fetcher.fail("a");
        assert!(r.observe(&mut s));
        assert_eq!(r.state(), RecordState::Errored);
        assert!(r.failure().is_some());
    }

    #[test]
    fn expire_only_affects_pending_records() {
        let mut s = MemorySurface::new();
        let fetcher = ManualFetcher::new();
        let mut r = record(&mut s, "a", LayoutKind::Jigsaw);
        r.resolve(&fetcher, &mut s);
        assert!(r.expire());
        assert_eq!(r.failure(), Some(&FetchError::Timeout));

        // A late completion is ignored.
        fetcher.resolve("a", 10, 10);
        assert!(!r.observe(&mut s));
        assert_eq!(r.state(), RecordState::Errored);

        let mut done = record(&mut s, "5x5", LayoutKind::Jigsaw);
        done.resolve(&SyntheticFetcher, &mut s);
        assert!(!done.expire());
    }

    #[test]
    fn brick_placeholder_is_filled_block() {
        let mut s = MemorySurface::new();
        let mut r = record(&mut s, "40x30", LayoutKind::Brick);
        r.resolve(&SyntheticFetcher, &mut s);

        let block = r.nodes().placeholder.unwrap();
        assert_eq!(s.parent(block), Some(r.wrapper()));
        assert_eq!(
            s.style(block, StyleProp::Background),
            Some(&StyleValue::Color("grey".into()))
        );
        // The image itself is not shown yet.
        assert_eq!(s.parent(r.nodes().image), None);
    }

    #[test]
    fn waterfall_placeholder_reserves_hidden_image() {
        let mut s = MemorySurface::new();
        let mut r = record(&mut s, "40x30", LayoutKind::Waterfall);
        r.resolve(&SyntheticFetcher, &mut s);

        assert_eq!(r.nodes().placeholder, None);
        assert_eq!(s.parent(r.nodes().image), Some(r.wrapper()));
        assert_eq!(
            s.style(r.nodes().image, StyleProp::Visibility),
            Some(&StyleValue::Visible(false))
        );
    }

    #[test]
    fn commit_reveals_and_assembles() {
        let mut s = MemorySurface::new();
        let mut r = ImageRecord::new(&mut s, "40x30", "Dawn", LayoutKind::Brick);
        r.resolve(&SyntheticFetcher, &mut s);
        r.commit(3, &mut s);

        assert_eq!(r.state(), RecordState::Committed);
        assert_eq!(r.cache_index(), Some(3));
        assert_eq!(r.nodes().placeholder, None);
        let info = r.nodes().info.unwrap();
        let delete = r.nodes().delete.unwrap();
        assert_eq!(s.children(r.wrapper()), vec![r.nodes().image, info, delete]);
        assert_eq!(
            s.kind(info),
            Some(&NodeKind::Text {
                text: "Dawn\n40px 30px".into()
            })
        );
    }

    #[test]
    fn lean_right_toggles_affordance_class() {
        let mut s = MemorySurface::new();
        let mut r = record(&mut s, "4x3", LayoutKind::Jigsaw);
        r.resolve(&SyntheticFetcher, &mut s);
        r.commit(0, &mut s);

        r.set_lean_right(&mut s, true);
        assert!(s.has_class(r.nodes().delete.unwrap(), class::LEAN_RIGHT));
        r.set_lean_right(&mut s, false);
        assert!(!s.has_class(r.nodes().info.unwrap(), class::LEAN_RIGHT));
    }

    #[test]
    fn destroy_removes_all_nodes() {
        let mut s = MemorySurface::new();
        let mut r = record(&mut s, "4x3", LayoutKind::Brick);
        r.resolve(&SyntheticFetcher, &mut s);
        r.commit(0, &mut s);
        r.destroy(&mut s);
        assert_eq!(s.node_count(), 0);
    }
}
