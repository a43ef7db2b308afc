//! # Yogurt Thumbs
//!
//! Catalogs image files spread over several directories into one ordered JSON
//! list, then derives a parallel tree of proportionally scaled thumbnails for a
//! browser gallery to page through.
//!
//! # Architecture: Two-Phase Pipeline
//!
//! The phases are independent invocations connected only by the catalog file:
//!
//! ```text
//! 1. Catalog     catalog.toml + image dirs  →  db.json       (ordered path list)
//! 2. Thumbnails  thumbnails.toml + db.json  →  thumb/...     (scaled copies)
//! ```
//!
//! Phase 2 never re-scans the filesystem for sources: the catalog is the
//! authoritative list of which images exist and in which order the gallery
//! shows them.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | TOML loading, schema validation and normalization for both phases |
//! | [`catalog`] | Phase 1: enumerates directories, filters by extension, reads/writes the catalog |
//! | [`sort`] | Catalog ordering strategies and stable reversal |
//! | [`plan`] | Collision-free thumbnail directory planning |
//! | [`imaging`] | Bounding-box scaling and format-dispatched encoding behind an `ImageBackend` trait |
//! | [`process`] | Phase 2: runs decode → scale → encode for every catalog entry on a worker pool |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Typed Schema, Two Kinds of Config Errors
//!
//! Every option is declared once with its type, default, and rule. A value of
//! the wrong *type* falls back to the default with a warning; a value of the
//! right type that breaks its *rule* aborts the run.
//!
//! ## Plan, Then Encode
//!
//! All thumbnail directories are named and created single-threaded before any
//! image is touched. Workers then share only the finished, read-only plan and
//! each writes to a destination no other worker writes to.
//!
//! ## Best-Effort Batches
//!
//! A corrupt or unsupported image is counted and reported, never fatal. Only a
//! bad config or an unreadable catalog stops a run.

pub mod catalog;
pub mod config;
pub mod imaging;
pub mod output;
pub mod plan;
pub mod process;
pub mod sort;

#[cfg(test)]
pub(crate) mod test_helpers;
