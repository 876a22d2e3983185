//! Shared value types used across ingestion, layout and the public API.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Intrinsic pixel size of an image as reported by the fetch collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Height-to-width ratio. Degenerate widths are treated as 1px.
    pub fn aspect_hw(self) -> f64 {
        self.height as f64 / self.width.max(1) as f64
    }

    /// Width-to-height ratio. Degenerate heights are treated as 1px.
    pub fn aspect_wh(self) -> f64 {
        self.width as f64 / self.height.max(1) as f64
    }

    pub fn is_landscape(self) -> bool {
        self.width > self.height
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// The packing layout a gallery arranges its images with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    /// Fixed grid of at most six masked slots.
    #[default]
    Jigsaw,
    /// Balanced columns, shortest column first.
    Waterfall,
    /// Greedy justified rows.
    Brick,
}

impl LayoutKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LayoutKind::Jigsaw => "jigsaw",
            LayoutKind::Waterfall => "waterfall",
            LayoutKind::Brick => "brick",
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jigsaw" => Ok(LayoutKind::Jigsaw),
            "waterfall" => Ok(LayoutKind::Waterfall),
            "brick" => Ok(LayoutKind::Brick),
            other => Err(format!(
                "unknown layout '{other}' (expected jigsaw, waterfall or brick)"
            )),
        }
    }
}

/// Spacing between images, in surface pixels.
///
/// `x` separates neighbours horizontally (applied as right padding), `y`
/// separates them vertically (applied as bottom margin or padding).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Gutter {
    pub x: f64,
    pub y: f64,
}

impl Gutter {
    /// Build a gutter the way `set_gutter(x, y?)` does: a missing or zero `y`
    /// falls back to `x`.
    pub fn new(x: f64, y: Option<f64>) -> Self {
        let x = x.max(0.0);
        let y = match y {
            Some(y) if y > 0.0 => y,
            _ => x,
        };
        Self { x, y }
    }
}
