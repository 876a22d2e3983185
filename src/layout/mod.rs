//! Layout engines.
//!
//! A gallery holds exactly one engine behind the [`LayoutEngine`] trait and
//! never switches on the layout kind at call sites. Each engine owns its own
//! layout state (slot masks, column heights, brick rows) and reads committed
//! records from the main cache.
//!
//! | Engine | Arrangement | Removal |
//! |---|---|---|
//! | [`JigsawLayout`] | fixed grid of at most six masked slots | immediate, full rebuild |
//! | [`WaterfallLayout`] | equal-width columns, shortest column first | deferred |
//! | [`BrickLayout`] | greedy rows scaled to the container width | deferred |
//!
//! [`geometry`] holds the pure math shared by the three.

pub mod brick;
pub mod geometry;
pub mod jigsaw;
pub mod waterfall;

pub use brick::BrickLayout;
pub use jigsaw::JigsawLayout;
pub use waterfall::WaterfallLayout;

use crate::cache::MainCache;
use crate::config::LayoutSettings;
use crate::surface::{NodeId, RenderSurface, StyleProp, StyleValue, class};
use crate::types::LayoutKind;
use log::warn;

/// Everything an engine may touch during one operation.
pub struct LayoutContext<'a> {
    pub surface: &'a mut dyn RenderSurface,
    pub cache: &'a mut MainCache,
    /// The gallery's container node.
    pub container: NodeId,
    pub settings: &'a LayoutSettings,
}

impl LayoutContext<'_> {
    pub fn container_width(&self) -> f64 {
        self.surface.client_width(self.container)
    }
}

/// When the structural part of a removal happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalMode {
    /// Splice right away.
    Immediate,
    /// Show the exit affordance now, splice after the removal delay.
    Deferred,
}

pub trait LayoutEngine {
    fn kind(&self) -> LayoutKind;

    /// Prepare the container for this layout.
    fn init(&mut self, ctx: &mut LayoutContext<'_>);

    /// Place every committed record the engine has not placed yet.
    fn place(&mut self, ctx: &mut LayoutContext<'_>);

    /// Remove the records owning `wrappers` from the surface and the cache.
    ///
    /// Returns `false` if any wrapper no longer maps to a live record.
    fn remove_items(&mut self, ctx: &mut LayoutContext<'_>, wrappers: &[NodeId]) -> bool;

    /// Tear down the visual arrangement and rewind placement. The cache is
    /// kept, so a following [`place`](Self::place) rebuilds everything.
    fn reset(&mut self, ctx: &mut LayoutContext<'_>);

    /// React to a change of the container width.
    fn resize(&mut self, ctx: &mut LayoutContext<'_>);

    /// Undo [`init`](Self::init) and [`reset`](Self::reset) before another
    /// engine takes over the container.
    fn teardown(&mut self, ctx: &mut LayoutContext<'_>);

    fn removal_mode(&self) -> RemovalMode {
        RemovalMode::Deferred
    }

    /// How many leading cache records are on display.
    fn visible_count(&self, cached: usize) -> usize {
        cached
    }

    /// Apply the "being removed" affordance ahead of a deferred removal.
    fn mark_removing(&mut self, ctx: &mut LayoutContext<'_>, wrapper: NodeId) {
        ctx.surface.add_class(wrapper, class::WRAPPER_DELETED);
        ctx.surface
            .set_style(wrapper, StyleProp::Margin, StyleValue::Px(0.0));
    }
}

/// Build the engine for `kind`.
pub fn engine_for(kind: LayoutKind) -> Box<dyn LayoutEngine> {
    match kind {
        LayoutKind::Jigsaw => Box::new(JigsawLayout::new()),
        LayoutKind::Waterfall => Box::new(WaterfallLayout::new()),
        LayoutKind::Brick => Box::new(BrickLayout::new()),
    }
}

/// Splice the record owning `wrapper` out of the cache and free its nodes.
pub(crate) fn splice_record(ctx: &mut LayoutContext<'_>, wrapper: NodeId) -> bool {
    let Some(index) = ctx.cache.index_of(wrapper) else {
        warn!("no live record for {wrapper}");
        return false;
    };
    match ctx.cache.remove(index) {
        Some(record) => {
            record.destroy(ctx.surface);
            true
        }
        None => false,
    }
}

/// Destroy every child of `node`. Grandchildren (record wrappers) survive
/// detached.
pub(crate) fn destroy_children(surface: &mut dyn RenderSurface, node: NodeId) {
    for child in surface.children(node) {
        surface.destroy_node(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_builds_matching_engine() {
        for kind in [LayoutKind::Jigsaw, LayoutKind::Waterfall, LayoutKind::Brick] {
            assert_eq!(engine_for(kind).kind(), kind);
        }
    }

    #[test]
    fn only_jigsaw_removes_immediately() {
        assert_eq!(
            engine_for(LayoutKind::Jigsaw).removal_mode(),
            RemovalMode::Immediate
        );
        assert_eq!(
            engine_for(LayoutKind::Brick).removal_mode(),
            RemovalMode::Deferred
        );
        assert_eq!(
            engine_for(LayoutKind::Waterfall).removal_mode(),
            RemovalMode::Deferred
        );
    }
}
