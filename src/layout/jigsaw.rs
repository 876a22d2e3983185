//! Jigsaw: a fixed grid of up to six slots, each cropping its image to the
//! slot's target ratio with a clip mask.
//!
//! The grid is rebuilt from scratch whenever its membership changes. Clip
//! masks are surface resources tied to the current slot set, so every rebuild
//! releases the previous masks before allocating new ones. On resize only the
//! container height follows the width; slot contents are left as they are.

use super::geometry::{self, CropAxis, JIGSAW_ASPECT, JIGSAW_MAX_SLOTS};
use super::{LayoutContext, LayoutEngine, RemovalMode, splice_record};
use crate::surface::{MaskId, NodeId, StyleProp, StyleValue, class};
use crate::types::LayoutKind;
use log::debug;

#[derive(Debug, Default)]
pub struct JigsawLayout {
    count: usize,
    masks: Vec<MaskId>,
}

impl JigsawLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slots currently shown.
    pub fn slot_count(&self) -> usize {
        self.count
    }

    fn fit_height(&self, ctx: &mut LayoutContext<'_>) {
        let height = ctx.container_width() * JIGSAW_ASPECT;
        ctx.surface
            .set_style(ctx.container, StyleProp::Height, StyleValue::Px(height));
    }

    fn count_class(count: usize) -> String {
        format!("{}{}", class::JIGSAW_COUNT_PREFIX, count)
    }

    fn rebuild(&mut self, ctx: &mut LayoutContext<'_>) {
        self.reset(ctx);

        let count = ctx.cache.len().min(JIGSAW_MAX_SLOTS);
        self.count = count;
        if count == 0 {
            return;
        }
        ctx.surface.add_class(ctx.container, &Self::count_class(count));
        let ratios = geometry::jigsaw_ratios(count);

        for (slot, ratio) in ratios.iter().copied().enumerate() {
            let Some(record) = ctx.cache.get_mut(slot) else {
                break;
            };
            let paired = count == 2 && slot == 1;
            record.assemble(ctx.surface);
            record.set_lean_right(ctx.surface, paired);

            let dims = record.layout_size();
            let image = record.nodes().image;
            let crop_class = match geometry::crop_axis(dims, ratio) {
                CropAxis::Vertical => class::V_CLIP,
                CropAxis::Horizontal => class::H_CLIP,
            };
            ctx.surface.add_class(image, crop_class);

            let polygon = if paired {
                geometry::slanted_mask(dims, ratio)
            } else {
                geometry::crop_mask(dims, ratio)
            };
            let mask = ctx.surface.create_clip_mask(polygon);
            ctx.surface.apply_clip_mask(image, mask);
            self.masks.push(mask);

            ctx.surface.attach(ctx.container, record.wrapper());
        }
        ctx.cache.mark_placed(ctx.cache.len());
        self.fit_height(ctx);
        debug!("jigsaw rebuilt with {count} slots");
    }
}

impl LayoutEngine for JigsawLayout {
    fn kind(&self) -> LayoutKind {
        LayoutKind::Jigsaw
    }

    fn init(&mut self, ctx: &mut LayoutContext<'_>) {
        ctx.surface.add_class(ctx.container, class::JIGSAW);
        self.fit_height(ctx);
    }

    fn place(&mut self, ctx: &mut LayoutContext<'_>) {
        self.rebuild(ctx);
    }

    fn remove_items(&mut self, ctx: &mut LayoutContext<'_>, wrappers: &[NodeId]) -> bool {
        let mut all_found = true;
        for wrapper in wrappers {
            all_found &= splice_record(ctx, *wrapper);
        }
        self.rebuild(ctx);
        all_found
    }

    fn reset(&mut self, ctx: &mut LayoutContext<'_>) {
        for record in ctx.cache.iter() {
            let image = record.nodes().image;
            ctx.surface.remove_class(image, class::V_CLIP);
            ctx.surface.remove_class(image, class::H_CLIP);
        }
        for child in ctx.surface.children(ctx.container) {
            ctx.surface.detach(child);
        }
        if self.count > 0 {
            ctx.surface
                .remove_class(ctx.container, &Self::count_class(self.count));
        }
        for mask in self.masks.drain(..) {
            ctx.surface.release_clip_mask(mask);
        }
        self.count = 0;
        ctx.cache.rewind();
    }

    fn resize(&mut self, ctx: &mut LayoutContext<'_>) {
        self.fit_height(ctx);
    }

    fn teardown(&mut self, ctx: &mut LayoutContext<'_>) {
        self.reset(ctx);
        ctx.surface.remove_class(ctx.container, class::JIGSAW);
        ctx.surface.clear_styles(ctx.container);
    }

    fn removal_mode(&self) -> RemovalMode {
        RemovalMode::Immediate
    }

    fn visible_count(&self, cached: usize) -> usize {
        self.count.min(cached)
    }
}
