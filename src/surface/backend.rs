//! Surface trait and shared handle types.
//!
//! The [`RenderSurface`] trait is the whole contract between the engine and
//! whatever actually displays the gallery: create/destroy nodes, attach and
//! detach children, set geometry and a few style properties, toggle classes,
//! and own clip-mask resources whose lifetime the engine manages explicitly.

use serde::Serialize;
use std::fmt;

/// Handle to a node living on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to a clip-mask resource owned by a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MaskId(pub u64);

/// What a node displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeKind {
    /// Plain box holding other nodes.
    Container,
    /// An image drawn from `source`.
    Image { source: String },
    /// A text label.
    Text { text: String },
    /// A clickable affordance.
    Button,
}

/// The fixed set of style properties the engine sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleProp {
    Width,
    Height,
    MinWidth,
    Margin,
    MarginBottom,
    PaddingRight,
    PaddingBottom,
    Background,
    Visibility,
}

/// Value of a style property.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    Px(f64),
    Percent(f64),
    Color(String),
    Visible(bool),
}

impl StyleValue {
    /// Pixel value, if this is a pixel length.
    pub fn px(&self) -> Option<f64> {
        match self {
            StyleValue::Px(v) => Some(*v),
            _ => None,
        }
    }

    /// Percentage value, if this is a relative length.
    pub fn percent(&self) -> Option<f64> {
        match self {
            StyleValue::Percent(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::Px(v) => write!(f, "{}px", round2(*v)),
            StyleValue::Percent(v) => write!(f, "{}%", round2(*v)),
            StyleValue::Color(c) => f.write_str(c),
            StyleValue::Visible(true) => f.write_str("visible"),
            StyleValue::Visible(false) => f.write_str("hidden"),
        }
    }
}

impl Serialize for StyleValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// A clip region in object-bounding-box units (`0.0..=1.0` on both axes).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClipPolygon {
    pub points: Vec<(f64, f64)>,
}

impl ClipPolygon {
    /// Axis-aligned rectangle from `(x0, y0)` to `(x1, y1)`.
    pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            points: vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1)],
        }
    }

    /// Horizontal extent covered by the polygon.
    pub fn x_span(&self) -> f64 {
        span(self.points.iter().map(|p| p.0))
    }

    /// Vertical extent covered by the polygon.
    pub fn y_span(&self) -> f64 {
        span(self.points.iter().map(|p| p.1))
    }
}

fn span(values: impl Iterator<Item = f64>) -> f64 {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if lo.is_finite() { hi - lo } else { 0.0 }
}

/// Trait for rendering surfaces.
///
/// Operations on unknown handles are ignored; they must never panic, because
/// deferred work (removal timers, rebuilds) can race with teardown.
pub trait RenderSurface {
    /// Create a detached node.
    fn create_node(&mut self, kind: NodeKind) -> NodeId;

    /// Destroy a node, detaching it first. Its children become detached.
    fn destroy_node(&mut self, node: NodeId);

    /// Append `child` to `parent`, detaching it from any previous parent.
    fn attach(&mut self, parent: NodeId, child: NodeId);

    /// Detach `child` from its parent, if any.
    fn detach(&mut self, child: NodeId);

    /// Current parent of `node`.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Children of `node` in order.
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Set one style property.
    fn set_style(&mut self, node: NodeId, prop: StyleProp, value: StyleValue);

    /// Clear every style property on `node`.
    fn clear_styles(&mut self, node: NodeId);

    fn add_class(&mut self, node: NodeId, class: &str);

    fn remove_class(&mut self, node: NodeId, class: &str);

    fn has_class(&self, node: NodeId, class: &str) -> bool;

    /// Realized content width of a container node, in pixels.
    fn client_width(&self, node: NodeId) -> f64;

    /// Allocate a clip-mask resource.
    fn create_clip_mask(&mut self, polygon: ClipPolygon) -> MaskId;

    /// Clip `node` to a previously created mask.
    fn apply_clip_mask(&mut self, node: NodeId, mask: MaskId);

    /// Release a clip mask; any node using it is unclipped.
    fn release_clip_mask(&mut self, mask: MaskId);
}
