//! Gallery configuration module.
//!
//! Handles loading, validating, and merging `gallery.toml` files. Stock
//! defaults are the base layer; a user file only needs the keys it wants to
//! override.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! layout = "jigsaw"         # jigsaw | waterfall | brick
//! full_screen = true        # open the full-screen viewer on image click
//!
//! [ingest]
//! timeout_ms = 5000         # give up on an image after this long
//! poll_interval_ms = 40     # ingestion monitor poll period
//!
//! [removal]
//! delay_ms = 600            # exit transition before waterfall/brick removal
//!
//! [gutter]
//! x = 0.0                   # horizontal spacing between images
//! # y = 0.0                 # vertical spacing (defaults to x)
//!
//! [waterfall]
//! min_width = 250.0         # narrowest allowed column
//! max_width = 350.0         # widest allowed column
//!
//! [brick]
//! min_height = 200.0        # normalized row height and lower bound
//! max_height = 250.0        # tallest allowed row
//! ```
//!
//! Unknown keys are rejected to catch typos early.
//!
//! Per-call overrides passed to
//! [`Gallery::set_images`](crate::gallery::Gallery::set_images) use
//! [`LayoutOptions`]; any field left as `None` falls back to the config.

use crate::types::{Gutter, LayoutKind};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Name of the config file looked up by [`load_config`].
pub const CONFIG_FILENAME: &str = "gallery.toml";

/// Timeout restored by `set_timeout(0)`.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Gallery configuration loaded from `gallery.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Layout selected by the next `set_images`.
    pub layout: LayoutKind,
    /// Whether clicking an image opens the full-screen viewer.
    pub full_screen: bool,
    /// Ingestion monitor timing.
    pub ingest: IngestConfig,
    /// Deferred removal timing.
    pub removal: RemovalConfig,
    /// Spacing between images.
    pub gutter: GutterConfig,
    /// Column bounds for the waterfall layout.
    pub waterfall: WaterfallConfig,
    /// Row bounds for the brick layout.
    pub brick: BrickConfig,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            layout: LayoutKind::Jigsaw,
            full_screen: true,
            ingest: IngestConfig::default(),
            removal: RemovalConfig::default(),
            gutter: GutterConfig::default(),
            waterfall: WaterfallConfig::default(),
            brick: BrickConfig::default(),
        }
    }
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ingest.poll_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "ingest.poll_interval_ms must be non-zero".into(),
            ));
        }
        self.waterfall.validate()?;
        self.brick.validate()?;
        if self.gutter.x < 0.0 || self.gutter.y.is_some_and(|y| y < 0.0) {
            return Err(ConfigError::Validation(
                "gutter values must not be negative".into(),
            ));
        }
        Ok(())
    }
}

/// Ingestion monitor timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IngestConfig {
    /// Per-batch timeout after which unresolved images are given up on.
    pub timeout_ms: u64,
    /// Period of the monitor's poll loop.
    pub poll_interval_ms: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: 40,
        }
    }
}

impl IngestConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

/// Deferred removal timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemovalConfig {
    /// How long the "removed" affordance shows before the record is dropped.
    pub delay_ms: u64,
}

impl Default for RemovalConfig {
    fn default() -> Self {
        Self { delay_ms: 600 }
    }
}

impl RemovalConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Gutter as written in the config file. `y` falls back to `x`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GutterConfig {
    pub x: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

impl GutterConfig {
    pub fn resolve(&self) -> Gutter {
        Gutter::new(self.x, self.y)
    }
}

/// Column width bounds for the waterfall layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaterfallConfig {
    /// Minimum realized column width; also the divisor for the column count.
    pub min_width: f64,
    /// Maximum realized column width before the layout is rebuilt.
    pub max_width: f64,
}

impl Default for WaterfallConfig {
    fn default() -> Self {
        Self {
            min_width: 250.0,
            max_width: 350.0,
        }
    }
}

impl WaterfallConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.min_width <= 0.0 {
            return Err(ConfigError::Validation(
                "waterfall.min_width must be positive".into(),
            ));
        }
        if self.min_width > self.max_width {
            return Err(ConfigError::Validation(
                "waterfall.min_width must not exceed waterfall.max_width".into(),
            ));
        }
        Ok(())
    }
}

/// Row height bounds for the brick layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrickConfig {
    /// Normalized row height used while packing; also the lower resize bound.
    pub min_height: f64,
    /// Upper resize bound.
    pub max_height: f64,
}

impl Default for BrickConfig {
    fn default() -> Self {
        Self {
            min_height: 200.0,
            max_height: 250.0,
        }
    }
}

impl BrickConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.min_height <= 0.0 {
            return Err(ConfigError::Validation(
                "brick.min_height must be positive".into(),
            ));
        }
        if self.min_height > self.max_height {
            return Err(ConfigError::Validation(
                "brick.min_height must not exceed brick.max_height".into(),
            ));
        }
        Ok(())
    }
}

/// Per-call layout options accepted by `set_images`.
///
/// Mirrors `{minWidth, maxWidth, minHeight, maxHeight, gutterX, gutterY}`.
/// Unset fields keep the value from [`GalleryConfig`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutOptions {
    pub min_width: Option<f64>,
    pub max_width: Option<f64>,
    pub min_height: Option<f64>,
    pub max_height: Option<f64>,
    pub gutter_x: Option<f64>,
    pub gutter_y: Option<f64>,
}

/// Fully resolved settings handed to a layout engine on `init`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutSettings {
    pub waterfall: WaterfallConfig,
    pub brick: BrickConfig,
    pub gutter: Gutter,
}

impl LayoutOptions {
    /// Overlay these options on the config and the gallery's current gutter.
    ///
    /// Bounds that end up inverted are widened so `min <= max` always holds.
    /// A `gutter_y` without `gutter_x` replaces only the vertical gutter.
    pub fn resolve(&self, config: &GalleryConfig, gutter: Gutter) -> LayoutSettings {
        let min_width = positive_or(self.min_width, config.waterfall.min_width);
        let max_width = positive_or(self.max_width, config.waterfall.max_width).max(min_width);
        let min_height = positive_or(self.min_height, config.brick.min_height);
        let max_height = positive_or(self.max_height, config.brick.max_height).max(min_height);
        let gutter = match (self.gutter_x, self.gutter_y) {
            (Some(x), y) => Gutter::new(x, y),
            (None, Some(y)) if y > 0.0 => Gutter { x: gutter.x, y },
            (None, _) => gutter,
        };
        LayoutSettings {
            waterfall: WaterfallConfig {
                min_width,
                max_width,
            },
            brick: BrickConfig {
                min_height,
                max_height,
            },
            gutter,
        }
    }
}

/// A missing or non-positive option keeps the fallback, like `opt.x || default`.
fn positive_or(value: Option<f64>, fallback: f64) -> f64 {
    match value {
        Some(v) if v > 0.0 => v,
        _ => fallback,
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(GalleryConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Parse a config file as a raw TOML value. `Ok(None)` when it doesn't exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<GalleryConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: GalleryConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `gallery.toml` from a directory, or a config file given directly.
pub fn load_config(path: &Path) -> Result<GalleryConfig, ConfigError> {
    let file = if path.is_dir() {
        path.join(CONFIG_FILENAME)
    } else {
        path.to_path_buf()
    };
    let overlay = load_raw_config(&file)?;
    resolve_config(stock_defaults_value(), overlay)
}

/// Returns a fully-commented stock `gallery.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Mosaic Gal Configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# Layout used by the next set_images: "jigsaw", "waterfall" or "brick".
layout = "jigsaw"

# Open the full-screen viewer when an image is clicked.
full_screen = true

# ---------------------------------------------------------------------------
# Ingestion
# ---------------------------------------------------------------------------
[ingest]
# Images still unresolved this long after their batch started are dropped.
timeout_ms = 5000

# How often the ingestion monitor checks the in-flight batch.
poll_interval_ms = 40

# ---------------------------------------------------------------------------
# Removal
# ---------------------------------------------------------------------------
[removal]
# Waterfall and brick removals wait this long so exit transitions can finish.
delay_ms = 600

# ---------------------------------------------------------------------------
# Spacing
# ---------------------------------------------------------------------------
[gutter]
# Horizontal spacing between neighbouring images, in pixels.
x = 0.0
# Vertical spacing. Omit to reuse x.
# y = 0.0

# ---------------------------------------------------------------------------
# Waterfall (balanced columns)
# ---------------------------------------------------------------------------
[waterfall]
# Column count is ceil(container width / min_width). When a resize pushes the
# realized column width outside [min_width, max_width] the layout is rebuilt.
min_width = 250.0
max_width = 350.0

# ---------------------------------------------------------------------------
# Brick (justified rows)
# ---------------------------------------------------------------------------
[brick]
# Rows are packed at min_height and scaled to fill the container. When a
# resize pushes any row outside [min_height, max_height] the layout is rebuilt.
min_height = 200.0
max_height = 250.0
"##
}
