//! CLI output formatting for a laid-out gallery.
//!
//! # Information-First Display
//!
//! The primary display for every image is its semantic identity (cache
//! position and title), with the source reference shown as secondary context
//! on an indented `Source:` line. The surface tree follows, so the arrangement
//! each layout produced can be read straight off the terminal.
//!
//! # Output Format
//!
//! ```text
//! Images
//! 001 Dawn (800x600)
//!     Source: photos/dawn.jpg
//! 002 (photos/dusk.jpg) (600x800)
//!
//! Surface
//! container #1 .z-g-brick .z-gallery
//!     container #9 .z-g-brick-row height=200px
//!         container #2 .wrapper width=57.14% padding-bottom=0px padding-right=0px
//!             image #3 photos/dawn.jpg visibility=visible
//!             text #8 .info "Dawn / 800px 600px"
//!             button #7 .del
//!
//! Brick layout: 2 images in 12ms
//! ```
//!
//! # Architecture
//!
//! Each section has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::record::ImageRecord;
use crate::surface::memory::NodeSnapshot;
use crate::surface::{NodeKind, StyleProp};
use crate::types::LayoutKind;
use std::time::Duration;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format an image line: titled images show the title, untitled ones show the
/// source in parens.
///
/// ```text
/// 001 The Sunset (800x600)        // titled
/// 001 (sunset.jpg) (800x600)      // untitled, the source IS the identity
/// ```
fn image_line(index: usize, title: &str, source: &str, size: &str) -> String {
    if title.is_empty() {
        format!("{} ({}) ({})", format_index(index), source, size)
    } else {
        format!("{} {} ({})", format_index(index), title, size)
    }
}

fn prop_name(prop: StyleProp) -> &'static str {
    match prop {
        StyleProp::Width => "width",
        StyleProp::Height => "height",
        StyleProp::MinWidth => "min-width",
        StyleProp::Margin => "margin",
        StyleProp::MarginBottom => "margin-bottom",
        StyleProp::PaddingRight => "padding-right",
        StyleProp::PaddingBottom => "padding-bottom",
        StyleProp::Background => "background",
        StyleProp::Visibility => "visibility",
    }
}

// ============================================================================
// Images
// ============================================================================

/// List committed records in cache order.
pub fn format_images<'a>(records: impl IntoIterator<Item = &'a ImageRecord>) -> Vec<String> {
    let mut lines = vec!["Images".to_string()];
    for (i, record) in records.into_iter().enumerate() {
        let size = record
            .natural_size()
            .map_or_else(|| "unknown size".to_string(), |d| d.to_string());
        lines.push(image_line(i + 1, record.title(), record.source(), &size));
        if !record.title().is_empty() {
            lines.push(format!("{}Source: {}", indent(1), record.source()));
        }
    }
    if lines.len() == 1 {
        lines.push(format!("{}(none)", indent(1)));
    }
    lines
}

pub fn print_images<'a>(records: impl IntoIterator<Item = &'a ImageRecord>) {
    for line in format_images(records) {
        println!("{}", line);
    }
}

// ============================================================================
// Surface tree
// ============================================================================

/// Render a surface subtree, one node per line, children indented.
pub fn format_tree(root: &NodeSnapshot) -> Vec<String> {
    let mut lines = vec!["Surface".to_string()];
    walk_tree(root, 0, &mut lines);
    lines
}

fn walk_tree(node: &NodeSnapshot, depth: usize, lines: &mut Vec<String>) {
    lines.push(format!("{}{}", indent(depth), node_line(node)));
    for child in &node.children {
        walk_tree(child, depth + 1, lines);
    }
}

fn node_line(node: &NodeSnapshot) -> String {
    let mut parts = match &node.kind {
        NodeKind::Container => vec![format!("container {}", node.id)],
        NodeKind::Image { source } => vec![format!("image {} {}", node.id, source)],
        NodeKind::Text { .. } => vec![format!("text {}", node.id)],
        NodeKind::Button => vec![format!("button {}", node.id)],
    };
    parts.extend(node.classes.iter().map(|c| format!(".{c}")));
    if let NodeKind::Text { text } = &node.kind {
        parts.push(format!("\"{}\"", text.replace('\n', " / ")));
    }
    parts.extend(
        node.styles
            .iter()
            .map(|(prop, value)| format!("{}={}", prop_name(*prop), value)),
    );
    if let Some(clip) = &node.clip {
        let points: Vec<String> = clip
            .points
            .iter()
            .map(|(x, y)| format!("{:.2},{:.2}", x, y))
            .collect();
        parts.push(format!("clip=[{}]", points.join(" ")));
    }
    parts.join(" ")
}

pub fn print_tree(root: &NodeSnapshot) {
    for line in format_tree(root) {
        println!("{}", line);
    }
}

// ============================================================================
// Summary
// ============================================================================

pub fn format_summary(layout: LayoutKind, images: usize, elapsed: Duration) -> String {
    let noun = if images == 1 { "image" } else { "images" };
    let mut name = layout.as_str().to_string();
    if let Some(first) = name.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    format!(
        "{} layout: {} {} in {}ms",
        name,
        images,
        noun,
        elapsed.as_millis()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::SyntheticFetcher;
    use crate::surface::{MemorySurface, RenderSurface, StyleValue, class};
    use crate::test_helpers::committed_cache;

    #[test]
    fn format_index_pads_to_three_digits() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    // =========================================================================
    // Images
    // =========================================================================

    #[test]
    fn images_show_title_then_source() {
        let mut surface = MemorySurface::new();
        let mut record = ImageRecord::new(&mut surface, "photos/4x3", "Dawn", LayoutKind::Brick);
        assert!(record.resolve(&SyntheticFetcher, &mut surface));

        let lines = format_images([&record]);
        assert_eq!(
            lines,
            vec!["Images", "001 Dawn (4x3)", "    Source: photos/4x3"]
        );
    }

    #[test]
    fn untitled_images_use_source_as_identity() {
        let mut surface = MemorySurface::new();
        let cache = committed_cache(&mut surface, &["10x20", "30x40"]);
        // committed_cache titles each record with its source.
        let lines = format_images(cache.iter());
        assert_eq!(lines[1], "001 10x20 (10x20)");

        let untitled = ImageRecord::new(&mut surface, "x.jpg", "", LayoutKind::Brick);
        let lines = format_images([&untitled]);
        assert_eq!(lines[1], "001 (x.jpg) (unknown size)");
    }

    #[test]
    fn empty_image_list() {
        let lines = format_images(std::iter::empty());
        assert_eq!(lines, vec!["Images", "    (none)"]);
    }

    // =========================================================================
    // Surface tree
    // =========================================================================

    #[test]
    fn tree_lists_nodes_with_classes_and_styles() {
        let mut s = MemorySurface::new();
        let root = s.create_node(NodeKind::Container);
        s.add_class(root, class::BRICK);
        let row = s.create_node(NodeKind::Container);
        s.set_style(row, StyleProp::Height, StyleValue::Px(200.0));
        let label = s.create_node(NodeKind::Text {
            text: "Dawn\n4px 3px".into(),
        });
        s.attach(root, row);
        s.attach(row, label);

        let lines = format_tree(&s.snapshot(root).unwrap());
        assert_eq!(
            lines,
            vec![
                "Surface".to_string(),
                format!("container {} .z-g-brick", root),
                format!("    container {} height=200px", row),
                format!("        text {} \"Dawn / 4px 3px\"", label),
            ]
        );
    }

    #[test]
    fn tree_shows_clip_points() {
        let mut s = MemorySurface::new();
        let image = s.create_node(NodeKind::Image {
            source: "a.jpg".into(),
        });
        let mask = s.create_clip_mask(crate::surface::ClipPolygon::rect(0.0, 0.25, 1.0, 0.75));
        s.apply_clip_mask(image, mask);

        let lines = format_tree(&s.snapshot(image).unwrap());
        assert!(lines[1].starts_with(&format!("image {} a.jpg", image)));
        assert!(lines[1].contains("clip=[0.00,0.25"));
    }

    // =========================================================================
    // Summary
    // =========================================================================

    #[test]
    fn summary_names_layout_and_count() {
        let line = format_summary(LayoutKind::Waterfall, 1, Duration::from_millis(7));
        assert_eq!(line, "Waterfall layout: 1 image in 7ms");
        let line = format_summary(LayoutKind::Jigsaw, 3, Duration::ZERO);
        assert_eq!(line, "Jigsaw layout: 3 images in 0ms");
    }
}
