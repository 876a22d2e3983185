//! Ingestion Monitor: moves a load batch into the main cache in submission
//! order.
//!
//! Fetches complete in any order. The monitor keeps a commit cursor over the
//! batch and only ever commits the record under the cursor:
//!
//! - size obtained: append to the cache, advance
//! - errored (failed or timed out): discard, advance
//! - still pending: stop; nothing later may overtake it
//!
//! The scan runs whenever a fetch settles and on every poll instant
//! (`batch_start + k * poll_interval`). At a poll instant any record that has
//! been pending for longer than the timeout is expired, which bounds
//! head-of-line blocking. Once the cursor passes the last record the batch is
//! dropped and the monitor goes idle.
//!
//! Only one batch runs at a time. Submitting while a batch is in flight is
//! rejected with [`GalleryError::Busy`].

use crate::cache::MainCache;
use crate::fetch::ImageFetcher;
use crate::gallery::GalleryError;
use crate::record::{ImageRecord, RecordState};
use crate::surface::RenderSurface;
use log::{debug, info, warn};
use std::time::Duration;

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug)]
pub struct IngestionMonitor {
    /// Records leave the batch (become `None`) when committed or discarded.
    batch: Vec<Option<ImageRecord>>,
    cursor: usize,
    batch_start: Duration,
    next_poll: Duration,
    timeout: Duration,
    interval: Duration,
}

impl IngestionMonitor {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self {
            batch: Vec::new(),
            cursor: 0,
            batch_start: Duration::ZERO,
            next_poll: Duration::ZERO,
            timeout,
            interval: interval.max(MIN_POLL_INTERVAL),
        }
    }

    /// Whether a batch is in flight (the poll loop is running).
    pub fn is_active(&self) -> bool {
        !self.batch.is_empty()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Applies to the running batch too, from its next poll.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn poll_interval(&self) -> Duration {
        self.interval
    }

    /// Instant of the next scheduled poll, if a batch is in flight.
    pub fn next_poll(&self) -> Option<Duration> {
        self.is_active().then_some(self.next_poll)
    }

    /// Records still waiting in the batch.
    pub fn outstanding(&self) -> usize {
        self.batch.iter().flatten().count()
    }

    /// Start a new batch at `now` and begin fetching every record.
    ///
    /// Records whose fetch settles synchronously are committed during the
    /// call, so a batch made only of already-known sizes drains before this
    /// returns and never leaves the monitor busy. Returns the number of
    /// records committed during the call.
    pub fn submit(
        &mut self,
        records: Vec<ImageRecord>,
        now: Duration,
        fetcher: &dyn ImageFetcher,
        surface: &mut dyn RenderSurface,
        cache: &mut MainCache,
    ) -> Result<usize, GalleryError> {
        if self.is_active() {
            warn!(
                "rejecting batch of {} images: {} still loading",
                records.len(),
                self.outstanding()
            );
            for record in records {
                record.destroy(surface);
            }
            return Err(GalleryError::Busy);
        }
        if records.is_empty() {
            return Ok(0);
        }
        info!("loading batch of {} images", records.len());
        self.batch = records.into_iter().map(Some).collect();
        self.cursor = 0;
        self.batch_start = now;
        self.next_poll = now + self.interval;

        let mut committed = 0;
        for i in 0..self.batch.len() {
            let settled = match self.batch[i].as_mut() {
                Some(record) => record.resolve(fetcher, surface),
                None => false,
            };
            if settled {
                committed += self.commit_ready(surface, cache);
            }
        }
        self.finish_if_drained();
        Ok(committed)
    }

    /// Observe fetch completions and commit whatever became eligible.
    pub fn deliver(&mut self, surface: &mut dyn RenderSurface, cache: &mut MainCache) -> usize {
        if !self.is_active() {
            return 0;
        }
        let mut settled = false;
        for record in self.batch.iter_mut().skip(self.cursor).flatten() {
            settled |= record.observe(surface);
        }
        let committed = if settled {
            self.commit_ready(surface, cache)
        } else {
            0
        };
        self.finish_if_drained();
        committed
    }

    /// Run every poll instant that has come due by `now`.
    pub fn poll_due(
        &mut self,
        now: Duration,
        surface: &mut dyn RenderSurface,
        cache: &mut MainCache,
    ) -> usize {
        let mut committed = 0;
        while self.is_active() && self.next_poll <= now {
            let instant = self.next_poll;
            self.next_poll += self.interval;
            committed += self.poll_at(instant, surface, cache);
        }
        committed
    }

    fn poll_at(
        &mut self,
        instant: Duration,
        surface: &mut dyn RenderSurface,
        cache: &mut MainCache,
    ) -> usize {
        let elapsed = instant.saturating_sub(self.batch_start);
        for record in self.batch.iter_mut().skip(self.cursor).flatten() {
            record.observe(surface);
            if elapsed > self.timeout {
                record.expire();
            }
        }
        let committed = self.commit_ready(surface, cache);
        debug!(
            "poll at {}ms: committed {}, {} outstanding",
            elapsed.as_millis(),
            committed,
            self.outstanding()
        );
        self.finish_if_drained();
        committed
    }

    /// Advance the commit cursor as far as submission order allows.
    fn commit_ready(&mut self, surface: &mut dyn RenderSurface, cache: &mut MainCache) -> usize {
        let mut committed = 0;
        while self.cursor < self.batch.len() {
            let slot = &mut self.batch[self.cursor];
            let state = match slot {
                Some(record) => record.state(),
                None => {
                    self.cursor += 1;
                    continue;
                }
            };
            match state {
                RecordState::Pending => break,
                RecordState::SizeObtained | RecordState::Committed => {
                    if let Some(record) = slot.take() {
                        let index = cache.push(record, surface);
                        debug!("committed batch item {} at index {}", self.cursor, index);
                        committed += 1;
                    }
                }
                RecordState::Errored => {
                    if let Some(record) = slot.take() {
                        debug!("discarding {}", record.source());
                        record.destroy(surface);
                    }
                }
            }
            self.cursor += 1;
        }
        committed
    }

    fn finish_if_drained(&mut self) {
        if self.is_active() && self.cursor >= self.batch.len() {
            info!("batch drained");
            self.batch.clear();
            self.cursor = 0;
        }
    }
}
