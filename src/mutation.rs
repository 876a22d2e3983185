//! Mutation Coordinator: removal requests and their deferred execution.
//!
//! A removal request is checked against the main cache when it is made. The
//! returned flag is `false` if any target has no live record or is already
//! waiting to be removed. What happens next depends on the active engine:
//! an immediate engine splices and rebuilds on the spot, a deferred one shows
//! its exit affordance now and the splice runs once the removal delay has
//! passed on the gallery clock.

use crate::layout::{LayoutContext, LayoutEngine, RemovalMode};
use crate::surface::NodeId;
use log::{debug, warn};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingRemoval {
    due: Duration,
    wrapper: NodeId,
}

#[derive(Debug)]
pub struct MutationCoordinator {
    delay: Duration,
    /// Ordered by `due`; requests are appended with a non-decreasing clock.
    pending: Vec<PendingRemoval>,
}

impl MutationCoordinator {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Vec::new(),
        }
    }

    pub fn is_pending(&self, wrapper: NodeId) -> bool {
        self.pending.iter().any(|p| p.wrapper == wrapper)
    }

    /// Removals waiting for their delay.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// When the earliest deferred removal comes due.
    pub fn next_due(&self) -> Option<Duration> {
        self.pending.first().map(|p| p.due)
    }

    /// Forget every deferred removal; used when the content is replaced.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Request removal of the records owning `wrappers`.
    pub fn remove(
        &mut self,
        engine: &mut dyn LayoutEngine,
        ctx: &mut LayoutContext<'_>,
        wrappers: &[NodeId],
        now: Duration,
    ) -> bool {
        if engine.removal_mode() == RemovalMode::Immediate {
            return engine.remove_items(ctx, wrappers);
        }

        let mut all_found = true;
        let due = now + self.delay;
        for wrapper in wrappers {
            let Some(index) = ctx.cache.index_of(*wrapper) else {
                warn!("remove requested for {wrapper}, which has no live record");
                all_found = false;
                continue;
            };
            if self.is_pending(*wrapper) {
                warn!("{wrapper} is already being removed");
                all_found = false;
                continue;
            }
            if let Some(record) = ctx.cache.get_mut(index) {
                record.begin_removal();
            }
            engine.mark_removing(ctx, *wrapper);
            self.pending.push(PendingRemoval {
                due,
                wrapper: *wrapper,
            });
        }
        debug!("{} removals pending", self.pending.len());
        all_found
    }

    /// Carry out every deferred removal due by `now`. Returns how many ran.
    pub fn run_due(
        &mut self,
        engine: &mut dyn LayoutEngine,
        ctx: &mut LayoutContext<'_>,
        now: Duration,
    ) -> usize {
        let ready = self.pending.partition_point(|p| p.due <= now);
        if ready == 0 {
            return 0;
        }
        let wrappers: Vec<NodeId> = self.pending.drain(..ready).map(|p| p.wrapper).collect();
        if !engine.remove_items(ctx, &wrappers) {
            warn!("some deferred removals had no live record");
        }
        wrappers.len()
    }
}
