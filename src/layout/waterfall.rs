//! Waterfall: balanced equal-width columns.
//!
//! Each newly committed record goes to the column with the smallest running
//! height; ties go to the leftmost column. Heights are tracked as the image's
//! height scaled to the realized column width, so images of different widths
//! weigh correctly. A record's contribution is remembered so a removal can
//! take it back out of its column.
//!
//! When a resize pushes the realized column width outside
//! `[min_width, max_width]` the columns are rebuilt with a fresh count and the
//! whole cache is replayed.

use super::geometry::{column_count, scaled_height, shortest_column};
use super::{LayoutContext, LayoutEngine, destroy_children, splice_record};
use crate::surface::{NodeId, NodeKind, StyleProp, StyleValue, class};
use crate::types::LayoutKind;
use log::{debug, info};
use std::collections::HashMap;

#[derive(Debug)]
struct Column {
    node: NodeId,
    height: f64,
}

#[derive(Debug, Default)]
pub struct WaterfallLayout {
    columns: Vec<Column>,
    /// Wrapper -> (column, height it added).
    placements: HashMap<NodeId, (usize, f64)>,
}

impl WaterfallLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Running height of every column.
    pub fn column_heights(&self) -> Vec<f64> {
        self.columns.iter().map(|c| c.height).collect()
    }

    /// Column holding `wrapper`, if placed.
    pub fn column_of(&self, wrapper: NodeId) -> Option<usize> {
        self.placements.get(&wrapper).map(|(col, _)| *col)
    }

    fn build_columns(&mut self, ctx: &mut LayoutContext<'_>) {
        let count = column_count(ctx.container_width(), ctx.settings.waterfall.min_width);
        let width_pct = 100.0 / count as f64;
        for i in 0..count {
            let node = ctx.surface.create_node(NodeKind::Container);
            ctx.surface.add_class(node, class::WATERFALL_COL);
            ctx.surface
                .set_style(node, StyleProp::Width, StyleValue::Percent(width_pct));
            if i + 1 < count {
                ctx.surface.set_style(
                    node,
                    StyleProp::PaddingRight,
                    StyleValue::Px(ctx.settings.gutter.x),
                );
            }
            ctx.surface.attach(ctx.container, node);
            self.columns.push(Column { node, height: 0.0 });
        }
        debug!("waterfall built {count} columns");
    }

    fn column_width(&self, ctx: &LayoutContext<'_>) -> f64 {
        let width = ctx.container_width();
        if width > 0.0 && !self.columns.is_empty() {
            width / self.columns.len() as f64
        } else {
            ctx.settings.waterfall.min_width
        }
    }

    fn clear(&mut self, ctx: &mut LayoutContext<'_>) {
        destroy_children(ctx.surface, ctx.container);
        self.columns.clear();
        self.placements.clear();
        ctx.cache.rewind();
    }
}

impl LayoutEngine for WaterfallLayout {
    fn kind(&self) -> LayoutKind {
        LayoutKind::Waterfall
    }

    fn init(&mut self, ctx: &mut LayoutContext<'_>) {
        ctx.surface.add_class(ctx.container, class::WATERFALL);
        ctx.surface.set_style(
            ctx.container,
            StyleProp::MinWidth,
            StyleValue::Px(ctx.settings.waterfall.min_width),
        );
        self.build_columns(ctx);
    }

    fn place(&mut self, ctx: &mut LayoutContext<'_>) {
        if self.columns.is_empty() {
            self.build_columns(ctx);
        }
        let column_width = self.column_width(ctx);
        for index in ctx.cache.unplaced() {
            let Some(record) = ctx.cache.get(index) else {
                break;
            };
            if record.is_removing() {
                continue;
            }
            let wrapper = record.wrapper();
            let added = scaled_height(record.layout_size(), column_width);
            ctx.surface.set_style(
                wrapper,
                StyleProp::MarginBottom,
                StyleValue::Px(ctx.settings.gutter.y),
            );

            let heights: Vec<f64> = self.columns.iter().map(|c| c.height).collect();
            let target = shortest_column(&heights);
            let column = &mut self.columns[target];
            column.height += added;
            ctx.surface.attach(column.node, wrapper);
            self.placements.insert(wrapper, (target, added));
        }
        ctx.cache.mark_placed(ctx.cache.len());
    }

    fn remove_items(&mut self, ctx: &mut LayoutContext<'_>, wrappers: &[NodeId]) -> bool {
        let mut all_found = true;
        for wrapper in wrappers {
            if let Some((col, added)) = self.placements.remove(wrapper) {
                if let Some(column) = self.columns.get_mut(col) {
                    column.height = (column.height - added).max(0.0);
                }
            }
            ctx.surface.detach(*wrapper);
            all_found &= splice_record(ctx, *wrapper);
        }
        all_found
    }

    fn reset(&mut self, ctx: &mut LayoutContext<'_>) {
        self.clear(ctx);
        self.build_columns(ctx);
    }

    fn resize(&mut self, ctx: &mut LayoutContext<'_>) {
        let width = ctx.container_width();
        let column_width = width / self.columns.len().max(1) as f64;
        let bounds = ctx.settings.waterfall;
        if column_width < bounds.min_width || column_width > bounds.max_width {
            info!(
                "column width {column_width:.1}px outside [{}, {}], rebuilding waterfall",
                bounds.min_width, bounds.max_width
            );
            self.reset(ctx);
            self.place(ctx);
        }
    }

    fn teardown(&mut self, ctx: &mut LayoutContext<'_>) {
        self.clear(ctx);
        ctx.surface.remove_class(ctx.container, class::WATERFALL);
        ctx.surface.clear_styles(ctx.container);
    }
}
