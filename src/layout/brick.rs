//! Brick: greedy row packing.
//!
//! Rows are packed from the placement cursor at the normalized height
//! `min_height`. A row that overflows is finalised: scaled so it spans the
//! container exactly, and the cursor moves past it. A row that runs out of
//! images becomes the tail. The cursor stays at the tail's first record, so
//! the next pass tears the tail down and packs it again together with
//! whatever was committed since. Finalised rows are never touched again.
//! Records waiting on a deferred removal are left out of every pack.
//!
//! An image too wide to fit any row at the normalized height gets a
//! full-width row of its own at its natural aspect. Such rows are finalised
//! and ignored by the resize range check.
//!
//! On resize every row height is replayed from its stored ratio. If any
//! regular row leaves `[min_height, max_height]` the whole layout is rebuilt.

use super::geometry::plan_row;
use super::{LayoutContext, LayoutEngine, destroy_children, splice_record};
use crate::surface::{NodeId, NodeKind, StyleProp, StyleValue, class};
use crate::types::{Dimensions, LayoutKind};
use log::{debug, info};

#[derive(Debug)]
struct BrickRow {
    node: NodeId,
    /// Height divided by container width.
    ratio: f64,
    oversized: bool,
}

#[derive(Debug, Default)]
pub struct BrickLayout {
    rows: Vec<BrickRow>,
    has_tail: bool,
}

impl BrickLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row_nodes(&self) -> Vec<NodeId> {
        self.rows.iter().map(|r| r.node).collect()
    }

    /// Whether the last row is an unfinished tail.
    pub fn has_tail(&self) -> bool {
        self.has_tail
    }

    fn drop_tail(&mut self, ctx: &mut LayoutContext<'_>) {
        if !self.has_tail {
            return;
        }
        if let Some(row) = self.rows.pop() {
            ctx.surface.destroy_node(row.node);
        }
        self.has_tail = false;
    }

    fn clear(&mut self, ctx: &mut LayoutContext<'_>) {
        destroy_children(ctx.surface, ctx.container);
        self.rows.clear();
        self.has_tail = false;
        ctx.cache.rewind();
    }
}

impl LayoutEngine for BrickLayout {
    fn kind(&self) -> LayoutKind {
        LayoutKind::Brick
    }

    fn init(&mut self, ctx: &mut LayoutContext<'_>) {
        ctx.surface.add_class(ctx.container, class::BRICK);
    }

    fn place(&mut self, ctx: &mut LayoutContext<'_>) {
        let width = ctx.container_width();
        if width <= 0.0 {
            debug!("brick container has no width yet");
            return;
        }
        let norm_height = ctx.settings.brick.min_height;
        let gutter = ctx.settings.gutter;

        while ctx.cache.placed() < ctx.cache.len() {
            let head = ctx.cache.placed();
            self.drop_tail(ctx);

            // Records on their way out are left out of the repack.
            let entries: Vec<(usize, Dimensions)> = ctx
                .cache
                .unplaced()
                .filter_map(|i| ctx.cache.get(i).map(|r| (i, r)))
                .filter(|(_, r)| !r.is_removing())
                .map(|(i, r)| (i, r.layout_size()))
                .collect();
            let sizes: Vec<Dimensions> = entries.iter().map(|(_, d)| *d).collect();
            let Some(plan) = plan_row(&sizes, norm_height, width) else {
                ctx.cache.mark_placed(ctx.cache.len());
                break;
            };

            let row = ctx.surface.create_node(NodeKind::Container);
            ctx.surface.add_class(row, class::BRICK_ROW);
            ctx.surface
                .set_style(row, StyleProp::Height, StyleValue::Px(plan.height));
            for (k, pct) in plan.widths_pct.iter().enumerate() {
                let Some(record) = entries.get(k).and_then(|(i, _)| ctx.cache.get(*i)) else {
                    break;
                };
                let wrapper = record.wrapper();
                let pad_right = if k + 1 < plan.count { gutter.x } else { 0.0 };
                ctx.surface
                    .set_style(wrapper, StyleProp::Width, StyleValue::Percent(*pct));
                ctx.surface
                    .set_style(wrapper, StyleProp::PaddingBottom, StyleValue::Px(gutter.y));
                ctx.surface
                    .set_style(wrapper, StyleProp::PaddingRight, StyleValue::Px(pad_right));
                ctx.surface.attach(row, wrapper);
            }
            ctx.surface.attach(ctx.container, row);
            self.rows.push(BrickRow {
                node: row,
                ratio: plan.ratio,
                oversized: plan.oversized,
            });

            if plan.full {
                let end = entries.get(plan.count - 1).map_or(head + plan.count, |(i, _)| i + 1);
                ctx.cache.mark_placed(end);
            } else {
                self.has_tail = true;
                break;
            }
        }
    }

    fn remove_items(&mut self, ctx: &mut LayoutContext<'_>, wrappers: &[NodeId]) -> bool {
        let mut all_found = true;
        for wrapper in wrappers {
            let row = ctx.surface.parent(*wrapper);
            ctx.surface.detach(*wrapper);
            all_found &= splice_record(ctx, *wrapper);

            let Some(row) = row else { continue };
            if !ctx.surface.children(row).is_empty() {
                continue;
            }
            if let Some(pos) = self.rows.iter().position(|r| r.node == row) {
                if pos + 1 == self.rows.len() {
                    self.has_tail = false;
                }
                self.rows.remove(pos);
                ctx.surface.destroy_node(row);
            }
        }
        all_found
    }

    fn reset(&mut self, ctx: &mut LayoutContext<'_>) {
        self.clear(ctx);
    }

    fn resize(&mut self, ctx: &mut LayoutContext<'_>) {
        let width = ctx.container_width();
        let bounds = ctx.settings.brick;
        let mut rebuild = self.rows.is_empty();
        for row in &self.rows {
            let height = width * row.ratio;
            ctx.surface
                .set_style(row.node, StyleProp::Height, StyleValue::Px(height));
            if !row.oversized && (height < bounds.min_height || height > bounds.max_height) {
                rebuild = true;
            }
        }
        if rebuild {
            info!("brick rows left [{}, {}], rebuilding", bounds.min_height, bounds.max_height);
            self.reset(ctx);
            self.place(ctx);
        }
    }

    fn teardown(&mut self, ctx: &mut LayoutContext<'_>) {
        self.clear(ctx);
        ctx.surface.remove_class(ctx.container, class::BRICK);
        ctx.surface.clear_styles(ctx.container);
    }

    fn mark_removing(&mut self, ctx: &mut LayoutContext<'_>, wrapper: NodeId) {
        ctx.surface.add_class(wrapper, class::WRAPPER_DELETED);
        ctx.surface
            .set_style(wrapper, StyleProp::Width, StyleValue::Px(0.0));
        ctx.surface
            .set_style(wrapper, StyleProp::PaddingRight, StyleValue::Px(0.0));
        if let Some(row) = ctx.surface.parent(wrapper) {
            if ctx.surface.children(row).len() == 1 {
                ctx.surface
                    .set_style(row, StyleProp::Height, StyleValue::Px(0.0));
            }
        }
    }
}
