//! CLI output formatting for both pipeline phases.
//!
//! # Output Format
//!
//! ## Catalog
//!
//! ```text
//! ==> Cataloging ../img/
//! Catalog written: ../img/db.json (14 images)
//!     japan-photos/: 9
//!     random-photos/: 5
//! ```
//!
//! ## Thumbnails
//!
//! ```text
//! ==> Generating thumbnails from ../img/db.json
//! 14 images in 2 directories, 8 workers
//! Generating: japan-photos/001.jpg
//! Generating: japan-photos/broken.jpg
//! FAILED: japan-photos/broken.jpg (decode failed: ...)
//! ...
//! Thumbnail generation complete.
//! 13 generated successfully and 1 failed.
//! ```
//!
//! # Architecture
//!
//! Each phase has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::catalog::Catalog;
use crate::process::{ProcessEvent, ProcessSummary};
use std::path::Path;

// ============================================================================
// Shared
// ============================================================================

/// Phase banner.
pub fn format_banner(action: &str, target: &Path) -> Vec<String> {
    vec![format!("==> {} {}", action, target.display())]
}

pub fn print_banner(action: &str, target: &Path) {
    for line in format_banner(action, target) {
        println!("{}", line);
    }
}

// ============================================================================
// Phase 1: Catalog output
// ============================================================================

/// Catalog location and total, then a per-directory count in first-seen order.
pub fn format_catalog_output(catalog_path: &Path, catalog: &Catalog) -> Vec<String> {
    let mut lines = vec![format!(
        "Catalog written: {} ({} images)",
        catalog_path.display(),
        catalog.len()
    )];

    let mut counts: Vec<(String, usize)> = Vec::new();
    for entry in catalog.entries() {
        match counts.iter_mut().find(|(dir, _)| *dir == entry.directory) {
            Some((_, n)) => *n += 1,
            None => counts.push((entry.directory, 1)),
        }
    }
    for (dir, n) in counts {
        lines.push(format!("    {}: {}", dir, n));
    }
    lines
}

pub fn print_catalog_output(catalog_path: &Path, catalog: &Catalog) {
    for line in format_catalog_output(catalog_path, catalog) {
        println!("{}", line);
    }
}

// ============================================================================
// Phase 2: Thumbnail output
// ============================================================================

/// Format a single progress event as display lines.
///
/// Successful files print nothing beyond their `Generating:` line.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::Planned {
            images,
            directories,
            workers,
        } => vec![format!(
            "{} images in {} {}, {} {}",
            images,
            directories,
            plural(*directories, "directory", "directories"),
            workers,
            plural(*workers, "worker", "workers")
        )],
        ProcessEvent::Started { path } => vec![format!("Generating: {}", path)],
        ProcessEvent::Generated { .. } => Vec::new(),
        ProcessEvent::Failed { path, reason } => vec![format!("FAILED: {} ({})", path, reason)],
    }
}

/// Terminal summary with success and failure counts.
pub fn format_process_summary(summary: &ProcessSummary) -> Vec<String> {
    let mut lines = vec![
        "Thumbnail generation complete.".to_string(),
        format!(
            "{} generated successfully and {} failed.",
            summary.generated, summary.failed
        ),
    ];
    if summary.skipped > 0 {
        lines.push(format!("{} skipped (stopped early).", summary.skipped));
    }
    lines
}

pub fn print_process_summary(summary: &ProcessSummary) {
    for line in format_process_summary(summary) {
        println!("{}", line);
    }
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 { one } else { many }
}

// ============================================================================
// Tests
// ============================================================================
