//! Rendering surface collaborator.
//!
//! The engine never draws anything itself. It creates and arranges nodes on a
//! [`RenderSurface`], sets a small fixed set of geometry/style properties on
//! them, toggles named classes, and manages clip-mask resources.
//!
//! | Piece | Role |
//! |---|---|
//! | [`backend`] | [`RenderSurface`] trait, node/mask handles, style vocabulary |
//! | [`memory`] | [`MemorySurface`]: an in-memory node tree used by the CLI and tests |
//! | [`class`] | class names the engine applies |

pub mod backend;
pub mod memory;

pub use backend::{ClipPolygon, MaskId, NodeId, NodeKind, RenderSurface, StyleProp, StyleValue};
pub use memory::MemorySurface;

/// Class names applied to surface nodes.
pub mod class {
    pub const GALLERY: &str = "z-gallery";
    pub const JIGSAW: &str = "z-g-jigsaw";
    /// Suffixed with the slot count, e.g. `z-g-jigsaw-4`.
    pub const JIGSAW_COUNT_PREFIX: &str = "z-g-jigsaw-";
    pub const WATERFALL: &str = "z-g-waterfall";
    pub const WATERFALL_COL: &str = "z-g-waterfall-col";
    pub const BRICK: &str = "z-g-brick";
    pub const BRICK_ROW: &str = "z-g-brick-row";
    pub const V_CLIP: &str = "v-clip";
    pub const H_CLIP: &str = "h-clip";
    pub const WRAPPER: &str = "wrapper";
    pub const WRAPPER_DELETED: &str = "wrapper-deleted";
    pub const PLACEHOLDER: &str = "placeholder";
    pub const INFO: &str = "info";
    pub const DEL: &str = "del";
    pub const LEAN_RIGHT: &str = "lean-right";
    pub const LOADING: &str = "loading";
    pub const LOADING_SHOW: &str = "loading-show";
    pub const MODAL: &str = "z-g-modal";
    pub const MODAL_SHOW: &str = "z-g-modal-show";
    pub const MODAL_HIDE: &str = "z-g-modal-hide";
    pub const MODAL_BANNER: &str = "z-g-modal-banner";
    pub const BANNER_PREV: &str = "z-g-modal-b-prev";
    pub const BANNER_MID: &str = "z-g-modal-b-mid";
    pub const BANNER_NEXT: &str = "z-g-modal-b-next";
    pub const ARROW_PREV: &str = "arrow-prev";
    pub const ARROW_NEXT: &str = "arrow-next";
    pub const WIDTH_FIRST: &str = "w-first";
    pub const HEIGHT_FIRST: &str = "h-first";
}
