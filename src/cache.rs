//! Main Cache: the ordered, index-stable collection of committed records.
//!
//! Every layout reads from here. A record's position is its cache index;
//! nothing reorders the cache except removal, which shifts later records down
//! by one. Wrapper nodes map back to their index through an explicit table
//! that is rewritten together with every re-index, so a click on a node can
//! always be traced to the record that owns it.
//!
//! The cache also carries the layout's placement cursor: records before it
//! have been handed to the active layout, records from it onwards are
//! committed but not yet placed.

use crate::record::ImageRecord;
use crate::surface::{NodeId, RenderSurface};
use std::collections::HashMap;
use std::ops::Range;

#[derive(Debug, Default)]
pub struct MainCache {
    records: Vec<ImageRecord>,
    placed: usize,
    index_by_node: HashMap<NodeId, usize>,
}

impl MainCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ImageRecord> {
        self.records.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ImageRecord> {
        self.records.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageRecord> {
        self.records.iter()
    }

    /// Commit `record` at the next sequential index and reveal it.
    pub fn push(&mut self, mut record: ImageRecord, surface: &mut dyn RenderSurface) -> usize {
        let index = self.records.len();
        record.commit(index, surface);
        self.index_by_node.insert(record.wrapper(), index);
        self.records.push(record);
        index
    }

    /// Current index of the record owning wrapper `node`.
    pub fn index_of(&self, node: NodeId) -> Option<usize> {
        self.index_by_node.get(&node).copied()
    }

    /// Splice out the record at `index`.
    ///
    /// Moves the placement cursor back if the record had already been placed
    /// and renumbers every later record so its index equals its new position.
    pub fn remove(&mut self, index: usize) -> Option<ImageRecord> {
        if index >= self.records.len() {
            return None;
        }
        let record = self.records.remove(index);
        self.index_by_node.remove(&record.wrapper());
        if index < self.placed {
            self.placed -= 1;
        }
        for (i, later) in self.records.iter_mut().enumerate().skip(index) {
            later.set_cache_index(i);
            self.index_by_node.insert(later.wrapper(), i);
        }
        Some(record)
    }

    /// Indices committed but not yet handed to the layout.
    pub fn unplaced(&self) -> Range<usize> {
        self.placed.min(self.records.len())..self.records.len()
    }

    pub fn placed(&self) -> usize {
        self.placed
    }

    /// Mark every record up to `end` as placed.
    pub fn mark_placed(&mut self, end: usize) {
        self.placed = end.min(self.records.len());
    }

    /// Rewind the placement cursor so a rebuild replays the whole cache.
    pub fn rewind(&mut self) {
        self.placed = 0;
    }

    /// Empty the cache, handing back the records so their nodes can be freed.
    pub fn drain(&mut self) -> Vec<ImageRecord> {
        self.placed = 0;
        self.index_by_node.clear();
        std::mem::take(&mut self.records)
    }

    /// Wrapper nodes in cache order.
    pub fn wrappers(&self) -> Vec<NodeId> {
        self.records.iter().map(ImageRecord::wrapper).collect()
    }
}
