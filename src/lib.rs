//! # Mosaic Gal
//!
//! An image-gallery layout engine. Hand it a list of image references and it
//! fetches their intrinsic sizes asynchronously, commits them to an ordered
//! cache strictly in submission order, and arranges them on a rendering
//! surface with one of three packing layouts.
//!
//! # Architecture: Ingest, Commit, Place
//!
//! ```text
//! refs ──► ImageRecord ──fetch──► Ingestion Monitor ──commit──► Main Cache
//!                                  (ordered, timeout)              │
//!                                                                  ▼
//!                    Mutation Coordinator ◄──── remove ──── Layout Engine
//!                    (deferred removals)                    (jigsaw | waterfall | brick)
//! ```
//!
//! - **Ingest**: every reference becomes an [`record::ImageRecord`] whose size
//!   is fetched through an [`fetch::ImageFetcher`]. Fetches finish in any
//!   order.
//! - **Commit**: the [`ingest::IngestionMonitor`] moves records into the
//!   [`cache::MainCache`] in submission order. Failed images are dropped;
//!   images still pending after the timeout are dropped too, so one slow
//!   image never stalls a batch for long.
//! - **Place**: the active [`layout::LayoutEngine`] arranges committed records
//!   on a [`surface::RenderSurface`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`gallery`] | Public API: `set_images`, `add_images`, `remove_images`, clock and click routing |
//! | [`record`] | Per-image state machine and its surface nodes |
//! | [`ingest`] | Ordered commit of a load batch, poll loop and timeout |
//! | [`cache`] | Index-stable committed records plus the wrapper-to-index map |
//! | [`layout`] | `LayoutEngine` trait, shared geometry, the three layouts |
//! | [`mutation`] | Removal requests, immediate or after the exit delay |
//! | [`viewer`] | Full-screen viewer with circular navigation |
//! | [`fetch`] | Size fetching: `FetchTask`, file and synthetic fetchers |
//! | [`surface`] | Rendering surface trait and the in-memory surface |
//! | [`config`] | `gallery.toml` loading, validation and per-call layout options |
//! | [`types`] | Shared value types (`Dimensions`, `LayoutKind`, `Gutter`) |
//! | [`output`] | CLI output formatting of records and surface trees |
//!
//! # Design Decisions
//!
//! ## Host-Driven Clock
//!
//! The engine owns no timers and never blocks. The host calls
//! [`gallery::Gallery::tick`] with the current instant; poll instants, the
//! image timeout and deferred removals are all measured against that clock.
//! Calls that start timed work take the instant too and catch up to it
//! before stamping anything.
//! Tests drive time explicitly and the CLI drives it from `Instant::now()`.
//!
//! ## Explicit Wrapper Index
//!
//! Removal needs to find the record behind a clicked node. Rather than storing
//! the cache index on the node, [`cache::MainCache`] keeps a map from wrapper
//! node to index and updates it in the same step that re-indexes the records.
//!
//! ## One Engine Behind a Trait
//!
//! The gallery holds a single `Box<dyn LayoutEngine>` chosen at `set_images`.
//! No call site switches on the layout kind; engines that need different
//! removal timing say so through [`layout::LayoutEngine::removal_mode`].

pub mod cache;
pub mod config;
pub mod fetch;
pub mod gallery;
pub mod ingest;
pub mod layout;
pub mod mutation;
pub mod output;
pub mod record;
pub mod surface;
pub mod types;
pub mod viewer;

#[cfg(test)]
pub(crate) mod test_helpers;
