//! Full-screen viewer with circular navigation.
//!
//! The viewer shows a three-slot window (previous, current, next) over the
//! first `window` records of the main cache and wraps around at both ends.
//! Its nodes live in a modal that is created once, hidden, and toggled with
//! the show/hide classes. Slots hold their own image nodes pointing at the
//! same sources as the gallery images.

use crate::cache::MainCache;
use crate::surface::{NodeId, NodeKind, RenderSurface, class};
use log::debug;

/// Part of the modal a click landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerTarget {
    Banner,
    PrevArrow,
    NextArrow,
}

#[derive(Debug)]
pub struct Viewer {
    modal: NodeId,
    banner: NodeId,
    prev_arrow: NodeId,
    next_arrow: NodeId,
    window: usize,
    /// `(cache index, slot node)` in prev, mid, next order while open.
    slots: Vec<(usize, NodeId)>,
}

impl Viewer {
    /// Build the hidden modal: a banner and two arrows.
    pub fn new(surface: &mut dyn RenderSurface) -> Self {
        let modal = surface.create_node(NodeKind::Container);
        surface.add_class(modal, class::MODAL);
        surface.add_class(modal, class::MODAL_HIDE);

        let banner = surface.create_node(NodeKind::Container);
        surface.add_class(banner, class::MODAL_BANNER);
        let prev_arrow = surface.create_node(NodeKind::Button);
        surface.add_class(prev_arrow, class::ARROW_PREV);
        let next_arrow = surface.create_node(NodeKind::Button);
        surface.add_class(next_arrow, class::ARROW_NEXT);

        for child in [banner, prev_arrow, next_arrow] {
            surface.attach(modal, child);
        }
        Self {
            modal,
            banner,
            prev_arrow,
            next_arrow,
            window: 0,
            slots: Vec::new(),
        }
    }

    /// Root node of the modal, for the host to mount.
    pub fn modal(&self) -> NodeId {
        self.modal
    }

    pub fn banner(&self) -> NodeId {
        self.banner
    }

    pub fn prev_arrow(&self) -> NodeId {
        self.prev_arrow
    }

    pub fn next_arrow(&self) -> NodeId {
        self.next_arrow
    }

    pub fn is_open(&self) -> bool {
        !self.slots.is_empty()
    }

    /// Cache index shown in the middle slot.
    pub fn current(&self) -> Option<usize> {
        self.slots.get(1).map(|(index, _)| *index)
    }

    /// Cache indices in the prev, mid and next slots.
    pub fn visible(&self) -> Vec<usize> {
        self.slots.iter().map(|(index, _)| *index).collect()
    }

    pub fn target_of(&self, node: NodeId) -> Option<ViewerTarget> {
        if node == self.banner {
            Some(ViewerTarget::Banner)
        } else if node == self.prev_arrow {
            Some(ViewerTarget::PrevArrow)
        } else if node == self.next_arrow {
            Some(ViewerTarget::NextArrow)
        } else {
            None
        }
    }

    /// Open on `index` within a window over the first `window` records.
    ///
    /// Returns `false` (and stays closed) if `index` falls outside the window.
    pub fn show(
        &mut self,
        surface: &mut dyn RenderSurface,
        cache: &MainCache,
        index: usize,
        window: usize,
    ) -> bool {
        let window = window.min(cache.len());
        if index >= window {
            return false;
        }
        self.clear_slots(surface);
        self.window = window;

        let ids = [(index + window - 1) % window, index, (index + 1) % window];
        let positions = [class::BANNER_PREV, class::BANNER_MID, class::BANNER_NEXT];
        for (id, position) in ids.into_iter().zip(positions) {
            let Some(node) = slot_node(surface, cache, id, position) else {
                self.clear_slots(surface);
                return false;
            };
            surface.attach(self.banner, node);
            self.slots.push((id, node));
        }

        surface.remove_class(self.modal, class::MODAL_HIDE);
        surface.add_class(self.modal, class::MODAL_SHOW);
        debug!("viewer opened on {index} of {window}");
        true
    }

    /// Advance one image to the right, wrapping around.
    pub fn next(&mut self, surface: &mut dyn RenderSurface, cache: &MainCache) {
        let [Some(&(_, old_prev)), Some(&(mid, mid_node)), Some(&(next, next_node))] =
            [self.slots.first(), self.slots.get(1), self.slots.get(2)]
        else {
            return;
        };
        let incoming = (next + 1) % self.window.max(1);
        let Some(node) = slot_node(surface, cache, incoming, class::BANNER_NEXT) else {
            self.hide(surface);
            return;
        };
        surface.destroy_node(old_prev);
        swap_class(surface, mid_node, class::BANNER_MID, class::BANNER_PREV);
        swap_class(surface, next_node, class::BANNER_NEXT, class::BANNER_MID);
        surface.attach(self.banner, node);
        self.slots = vec![(mid, mid_node), (next, next_node), (incoming, node)];
    }

    /// Step one image to the left, wrapping around.
    pub fn prev(&mut self, surface: &mut dyn RenderSurface, cache: &MainCache) {
        let [Some(&(prev, prev_node)), Some(&(mid, mid_node)), Some(&(_, old_next))] =
            [self.slots.first(), self.slots.get(1), self.slots.get(2)]
        else {
            return;
        };
        let window = self.window.max(1);
        let incoming = (prev + window - 1) % window;
        let Some(node) = slot_node(surface, cache, incoming, class::BANNER_PREV) else {
            self.hide(surface);
            return;
        };
        surface.destroy_node(old_next);
        swap_class(surface, mid_node, class::BANNER_MID, class::BANNER_NEXT);
        swap_class(surface, prev_node, class::BANNER_PREV, class::BANNER_MID);
        // Re-append the survivors so the banner keeps prev, mid, next order.
        surface.attach(self.banner, node);
        surface.attach(self.banner, prev_node);
        surface.attach(self.banner, mid_node);
        self.slots = vec![(incoming, node), (prev, prev_node), (mid, mid_node)];
    }

    pub fn hide(&mut self, surface: &mut dyn RenderSurface) {
        self.clear_slots(surface);
        surface.remove_class(self.modal, class::MODAL_SHOW);
        surface.add_class(self.modal, class::MODAL_HIDE);
    }

    fn clear_slots(&mut self, surface: &mut dyn RenderSurface) {
        for (_, node) in self.slots.drain(..) {
            surface.destroy_node(node);
        }
    }
}

fn slot_node(
    surface: &mut dyn RenderSurface,
    cache: &MainCache,
    index: usize,
    position: &str,
) -> Option<NodeId> {
    let record = cache.get(index)?;
    let node = surface.create_node(NodeKind::Image {
        source: record.source().to_string(),
    });
    let fit = if record.layout_size().is_landscape() {
        class::WIDTH_FIRST
    } else {
        class::HEIGHT_FIRST
    };
    surface.add_class(node, fit);
    surface.add_class(node, position);
    Some(node)
}

fn swap_class(surface: &mut dyn RenderSurface, node: NodeId, from: &str, to: &str) {
    surface.remove_class(node, from);
    surface.add_class(node, to);
}
