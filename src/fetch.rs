//! Asynchronous image-size fetching.
//!
//! The engine never decodes pixels. It asks an [`ImageFetcher`] for the
//! intrinsic size of a source reference and gets back a [`FetchTask`]: either
//! already settled (the synchronous fast path for references resolved before)
//! or pending until a worker completes it. The ingestion monitor observes
//! tasks with [`FetchTask::poll`]; giving up on a slow task means dropping
//! it, never cancelling the worker.
//!
//! | Fetcher | Resolves |
//! |---|---|
//! | [`FileFetcher`] | file paths, header-only probe via `image::image_dimensions` on a rayon pool |
//! | [`SyntheticFetcher`] | `WxH` references such as `320x240` or `placeholder/320x240` |

use crate::types::Dimensions;
use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Could not read image size: {0}")]
    Decode(String),
    #[error("Fetch abandoned before completion")]
    Abandoned,
    #[error("Timed out waiting for image size")]
    Timeout,
}

pub type FetchResult = Result<Dimensions, FetchError>;

/// Handle to one in-flight (or already finished) size fetch.
#[derive(Debug)]
pub struct FetchTask {
    state: TaskState,
}

#[derive(Debug)]
enum TaskState {
    Settled(FetchResult),
    Waiting(Receiver<FetchResult>),
    Observed,
}

impl FetchTask {
    /// A task that is already complete.
    pub fn ready(result: FetchResult) -> Self {
        Self {
            state: TaskState::Settled(result),
        }
    }

    /// A pending task plus the completer a worker uses to settle it.
    pub fn pending() -> (FetchCompleter, FetchTask) {
        let (tx, rx) = mpsc::channel();
        (
            FetchCompleter { tx },
            FetchTask {
                state: TaskState::Waiting(rx),
            },
        )
    }

    /// Take the result if the fetch has finished.
    ///
    /// Returns `None` while the fetch is still running and after the result
    /// has been taken once. A completer dropped without completing settles
    /// the task as [`FetchError::Abandoned`].
    pub fn poll(&mut self) -> Option<FetchResult> {
        let outcome = match &self.state {
            TaskState::Settled(_) => None,
            TaskState::Waiting(rx) => match rx.try_recv() {
                Ok(result) => Some(result),
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => Some(Err(FetchError::Abandoned)),
            },
            TaskState::Observed => return None,
        };
        match std::mem::replace(&mut self.state, TaskState::Observed) {
            TaskState::Settled(result) => Some(result),
            _ => outcome,
        }
    }
}

/// Completion side of a pending [`FetchTask`].
#[derive(Debug)]
pub struct FetchCompleter {
    tx: Sender<FetchResult>,
}

impl FetchCompleter {
    /// Settle the task. A task that was already dropped is ignored.
    pub fn complete(self, result: FetchResult) {
        let _ = self.tx.send(result);
    }
}

/// Source of intrinsic image sizes.
pub trait ImageFetcher {
    /// Begin fetching the size of `source`.
    fn fetch(&self, source: &str) -> FetchTask;

    /// Drop any remembered sizes. Called when a gallery replaces its content.
    fn forget_resolved(&self) {}
}

// =============================================================================
// File-backed fetcher
// =============================================================================

/// Reads image headers from disk on a dedicated rayon pool.
///
/// Successful probes are remembered, so fetching the same reference again
/// settles synchronously.
pub struct FileFetcher {
    root: Option<PathBuf>,
    pool: Arc<rayon::ThreadPool>,
    resolved: Arc<Mutex<HashMap<String, Dimensions>>>,
}

impl FileFetcher {
    /// Create a fetcher with `threads` workers (`None` = one per core).
    pub fn new(threads: Option<usize>) -> Result<Self, rayon::ThreadPoolBuildError> {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(n) = threads {
            builder = builder.num_threads(n.max(1));
        }
        Ok(Self {
            root: None,
            pool: Arc::new(builder.build()?),
            resolved: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Resolve relative references against `root`.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    fn path_for(&self, source: &str) -> PathBuf {
        match &self.root {
            Some(root) if Path::new(source).is_relative() => root.join(source),
            _ => PathBuf::from(source),
        }
    }

    fn cached(&self, source: &str) -> Option<Dimensions> {
        self.resolved.lock().ok()?.get(source).copied()
    }

    #[cfg(test)]
    fn remembered(&self) -> usize {
        self.resolved.lock().map(|m| m.len()).unwrap_or(0)
    }
}

impl ImageFetcher for FileFetcher {
    fn fetch(&self, source: &str) -> FetchTask {
        if let Some(dims) = self.cached(source) {
            return FetchTask::ready(Ok(dims));
        }
        let (completer, task) = FetchTask::pending();
        let path = self.path_for(source);
        let key = source.to_string();
        let resolved = Arc::clone(&self.resolved);
        self.pool.spawn(move || {
            let result = probe_dimensions(&path);
            if let Ok(dims) = &result {
                debug!("probed {} -> {}", path.display(), dims);
                if let Ok(mut cache) = resolved.lock() {
                    cache.insert(key, *dims);
                }
            }
            completer.complete(result);
        });
        task
    }

    fn forget_resolved(&self) {
        if let Ok(mut resolved) = self.resolved.lock() {
            debug!("forgetting {} resolved sizes", resolved.len());
            resolved.clear();
        }
    }
}

/// Read the image header only; pixel data is never decoded.
pub fn probe_dimensions(path: &Path) -> FetchResult {
    match image::image_dimensions(path) {
        Ok((width, height)) => Ok(Dimensions::new(width, height)),
        Err(image::ImageError::IoError(e)) => Err(FetchError::Io(e.to_string())),
        Err(e) => Err(FetchError::Decode(e.to_string())),
    }
}

// =============================================================================
// Synthetic fetcher
// =============================================================================

/// Resolves references that spell out their own size, e.g. `placeholder/320x240`.
///
/// Always settles synchronously. Useful for demos and for driving the layouts
/// without image files.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyntheticFetcher;

impl ImageFetcher for SyntheticFetcher {
    fn fetch(&self, source: &str) -> FetchTask {
        let result = parse_size_reference(source)
            .ok_or_else(|| FetchError::Decode(format!("'{source}' is not a WxH reference")));
        FetchTask::ready(result)
    }
}

/// Parse the last path segment of `source` as `WxH`.
pub fn parse_size_reference(source: &str) -> Option<Dimensions> {
    let segment = source.rsplit('/').next()?;
    let segment = segment.split('.').next()?;
    let (w, h) = segment.split_once(['x', 'X'])?;
    let width: u32 = w.trim().parse().ok()?;
    let height: u32 = h.trim().parse().ok()?;
    (width > 0 && height > 0).then(|| Dimensions::new(width, height))
}
