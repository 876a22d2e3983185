//! In-memory [`RenderSurface`] implementation.
//!
//! Keeps a plain node tree with styles, classes and clip masks. The CLI
//! renders it as text or JSON; tests inspect it to check layout geometry.
//! Container widths are set by the host with [`MemorySurface::set_client_width`],
//! which is how a resize is simulated.

use super::backend::{ClipPolygon, MaskId, NodeId, NodeKind, RenderSurface, StyleProp, StyleValue};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    styles: BTreeMap<StyleProp, StyleValue>,
    classes: BTreeSet<String>,
    mask: Option<MaskId>,
    client_width: f64,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            styles: BTreeMap::new(),
            classes: BTreeSet::new(),
            mask: None,
            client_width: 0.0,
        }
    }
}

/// Serializable view of a node subtree.
#[derive(Debug, Clone, Serialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub classes: BTreeSet<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub styles: BTreeMap<StyleProp, StyleValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip: Option<ClipPolygon>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

#[derive(Debug, Default)]
pub struct MemorySurface {
    nodes: HashMap<NodeId, Node>,
    masks: HashMap<MaskId, ClipPolygon>,
    next_node: u64,
    next_mask: u64,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the realized width of a container, as a layout pass would.
    pub fn set_client_width(&mut self, node: NodeId, width: f64) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.client_width = width.max(0.0);
        }
    }

    pub fn exists(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.nodes.get(&node).map(|n| &n.kind)
    }

    pub fn style(&self, node: NodeId, prop: StyleProp) -> Option<&StyleValue> {
        self.nodes.get(&node).and_then(|n| n.styles.get(&prop))
    }

    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.nodes
            .get(&node)
            .map(|n| n.classes.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Clip polygon currently applied to `node`.
    pub fn clip_of(&self, node: NodeId) -> Option<&ClipPolygon> {
        let mask = self.nodes.get(&node)?.mask?;
        self.masks.get(&mask)
    }

    /// Number of clip masks allocated and not yet released.
    pub fn live_masks(&self) -> usize {
        self.masks.len()
    }

    /// Snapshot the subtree rooted at `node`.
    pub fn snapshot(&self, node: NodeId) -> Option<NodeSnapshot> {
        let n = self.nodes.get(&node)?;
        Some(NodeSnapshot {
            id: node,
            kind: n.kind.clone(),
            classes: n.classes.clone(),
            styles: n.styles.clone(),
            clip: n.mask.and_then(|m| self.masks.get(&m).cloned()),
            children: n
                .children
                .iter()
                .filter_map(|c| self.snapshot(*c))
                .collect(),
        })
    }

    fn unlink(&mut self, child: NodeId) {
        let Some(parent) = self.nodes.get_mut(&child).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.retain(|c| *c != child);
        }
    }
}

impl RenderSurface for MemorySurface {
    fn create_node(&mut self, kind: NodeKind) -> NodeId {
        self.next_node += 1;
        let id = NodeId(self.next_node);
        self.nodes.insert(id, Node::new(kind));
        id
    }

    fn destroy_node(&mut self, node: NodeId) {
        self.unlink(node);
        if let Some(n) = self.nodes.remove(&node) {
            for child in n.children {
                if let Some(c) = self.nodes.get_mut(&child) {
                    c.parent = None;
                }
            }
        }
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || !self.exists(parent) || !self.exists(child) {
            return;
        }
        self.unlink(child);
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(child);
        }
        if let Some(c) = self.nodes.get_mut(&child) {
            c.parent = Some(parent);
        }
    }

    fn detach(&mut self, child: NodeId) {
        self.unlink(child);
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|n| n.parent)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(&node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn set_style(&mut self, node: NodeId, prop: StyleProp, value: StyleValue) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.styles.insert(prop, value);
        }
    }

    fn clear_styles(&mut self, node: NodeId) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.styles.clear();
        }
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.classes.insert(class.to_string());
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.classes.remove(class);
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes
            .get(&node)
            .is_some_and(|n| n.classes.contains(class))
    }

    fn client_width(&self, node: NodeId) -> f64 {
        self.nodes.get(&node).map_or(0.0, |n| n.client_width)
    }

    fn create_clip_mask(&mut self, polygon: ClipPolygon) -> MaskId {
        self.next_mask += 1;
        let id = MaskId(self.next_mask);
        self.masks.insert(id, polygon);
        id
    }

    fn apply_clip_mask(&mut self, node: NodeId, mask: MaskId) {
        if !self.masks.contains_key(&mask) {
            return;
        }
        if let Some(n) = self.nodes.get_mut(&node) {
            n.mask = Some(mask);
        }
    }

    fn release_clip_mask(&mut self, mask: MaskId) {
        if self.masks.remove(&mask).is_some() {
            for n in self.nodes.values_mut() {
                if n.mask == Some(mask) {
                    n.mask = None;
                }
            }
        }
    }
}
