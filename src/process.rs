//! Thumbnail generation.
//!
//! Phase 2 of the pipeline. Reads the catalog written by phase 1 and writes one
//! bounding-box-scaled thumbnail per entry into a tree that mirrors the source
//! directories.
//!
//! ## Steps
//!
//! 1. Read the catalog. A missing or malformed catalog is fatal.
//! 2. Plan a unique destination directory for every source directory and
//!    create all of them. Nothing is encoded until this has finished.
//! 3. Encode every entry on a bounded rayon pool. Each job reads its source
//!    and writes to its own planned destination, so jobs never share files.
//! 4. Collect per-job outcomes into a single [`ProcessSummary`].
//!
//! A file that cannot be decoded or encoded is reported and counted; the run
//! always continues to the end of the catalog unless stopped.
//!
//! ## Output Structure
//!
//! ```text
//! img/
//! ├── db.json
//! ├── japan-photos/
//! │   ├── 001.jpg
//! │   └── fuji.gif
//! └── thumb/
//!     └── japan-photos/
//!         ├── 001.jpg         # ≤154px on the longer edge
//!         └── fuji.png        # GIF and BMP are written as PNG
//! ```
//!
//! ## Early stop
//!
//! A [`StopHandle`] halts dispatch of new files. Files already being encoded
//! finish; everything not yet started is counted as skipped.

use crate::catalog::{CatalogError, read_catalog};
use crate::config::{ThumbnailConfig, effective_workers};
use crate::imaging::{BackendError, EncodingSettings, ImageBackend, RustBackend, create_thumbnail};
use crate::plan::{ThumbnailPlan, destination_file_name};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Progress events sent from workers to the printer.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessEvent {
    /// Directories are created and encoding is about to start.
    Planned {
        images: usize,
        directories: usize,
        workers: usize,
    },
    /// A worker picked up an entry.
    Started { path: String },
    Generated {
        path: String,
        width: u32,
        height: u32,
    },
    Failed { path: String, reason: String },
}

/// Cooperative stop signal shared between the caller and the workers.
///
/// Cloning shares the same flag.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop dispatching new files. In-flight files still finish.
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Run options that are not part of the thumbnail config.
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    pub stop: StopHandle,
    /// Trip `stop` once this many files have failed.
    pub max_failures: Option<usize>,
}

/// A failed entry and why it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub path: String,
    pub reason: String,
}

/// Totals for one thumbnail run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessSummary {
    pub generated: usize,
    pub failed: usize,
    /// Entries never started because the run was stopped.
    pub skipped: usize,
    /// Failures in catalog order.
    pub failures: Vec<Failure>,
}

impl ProcessSummary {
    pub fn total(&self) -> usize {
        self.generated + self.failed + self.skipped
    }
}

/// One catalog entry resolved to concrete paths.
#[derive(Debug, Clone)]
struct ThumbnailJob {
    /// Catalog path, used for reporting.
    path: String,
    source: PathBuf,
    output: PathBuf,
}

enum JobOutcome {
    Generated,
    Failed(String),
    Skipped,
}

/// Generate thumbnails with the production backend.
pub fn process(
    config: &ThumbnailConfig,
    options: &ProcessOptions,
    events: Option<Sender<ProcessEvent>>,
) -> Result<ProcessSummary, ProcessError> {
    process_with_backend(&RustBackend::new(), config, options, events)
}

/// Generate thumbnails with a custom backend (allows testing with mock).
pub fn process_with_backend(
    backend: &impl ImageBackend,
    config: &ThumbnailConfig,
    options: &ProcessOptions,
    events: Option<Sender<ProcessEvent>>,
) -> Result<ProcessSummary, ProcessError> {
    let catalog_path = Path::new(&config.catalog_path);
    let catalog = read_catalog(catalog_path)?;
    let source_root = config.source_root();
    let thumbnail_root = config.thumbnail_root();

    let entries: Vec<_> = catalog.entries().collect();
    let plan = ThumbnailPlan::for_entries(
        entries
            .iter()
            .map(|e| (e.directory.as_str(), e.file_name.as_str())),
    );
    let created = plan.create_directories(&thumbnail_root)?;
    log::debug!(
        "Created {} thumbnail directories under {}",
        created.len(),
        thumbnail_root.display()
    );

    let jobs: Vec<ThumbnailJob> = entries
        .iter()
        .map(|entry| {
            // Every directory in the catalog was planned above.
            let destination = plan.destination(&entry.directory).unwrap_or_default();
            ThumbnailJob {
                path: entry.relative_path(),
                source: entry.source_path(&source_root),
                output: thumbnail_root
                    .join(destination)
                    .join(destination_file_name(&entry.file_name)),
            }
        })
        .collect();

    let workers = effective_workers(config.max_workers);
    if let Some(tx) = &events {
        tx.send(ProcessEvent::Planned {
            images: jobs.len(),
            directories: plan.len(),
            workers,
        })
        .ok();
    }

    let settings = EncodingSettings::from_config(config);
    let failure_count = AtomicUsize::new(0);
    let total = jobs.len();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()?;
    let outcomes: Vec<JobOutcome> = pool.install(|| {
        jobs.par_iter()
            .map_with(events.clone(), |tx, job| {
                if options.stop.is_stopped() {
                    return JobOutcome::Skipped;
                }
                if let Some(tx) = tx.as_ref() {
                    tx.send(ProcessEvent::Started {
                        path: job.path.clone(),
                    })
                    .ok();
                }

                match run_job(backend, job, config.thumbnail_size, &settings) {
                    Ok((width, height)) => {
                        if let Some(tx) = tx.as_ref() {
                            tx.send(ProcessEvent::Generated {
                                path: job.path.clone(),
                                width,
                                height,
                            })
                            .ok();
                        }
                        JobOutcome::Generated
                    }
                    Err(e) => {
                        let reason = e.to_string();
                        log::debug!("{} failed: {}", job.source.display(), reason);
                        if let Some(tx) = tx.as_ref() {
                            tx.send(ProcessEvent::Failed {
                                path: job.path.clone(),
                                reason: reason.clone(),
                            })
                            .ok();
                        }
                        let failed_so_far = failure_count.fetch_add(1, Ordering::SeqCst) + 1;
                        if options.max_failures.is_some_and(|limit| failed_so_far >= limit) {
                            options.stop.stop();
                        }
                        JobOutcome::Failed(reason)
                    }
                }
            })
            .collect()
    });

    let summary = summarize(&jobs, outcomes);
    if summary.skipped > 0 {
        log::warn!(
            "Stopped early: {} of {} files were not processed",
            summary.skipped,
            total
        );
    }
    Ok(summary)
}

fn run_job(
    backend: &impl ImageBackend,
    job: &ThumbnailJob,
    bound: u32,
    settings: &EncodingSettings,
) -> Result<(u32, u32), BackendError> {
    let dims = create_thumbnail(backend, &job.source, &job.output, bound, settings)?;
    Ok((dims.width, dims.height))
}

/// Fold per-job outcomes (in catalog order) into totals.
fn summarize(jobs: &[ThumbnailJob], outcomes: Vec<JobOutcome>) -> ProcessSummary {
    let mut summary = ProcessSummary::default();
    for (job, outcome) in jobs.iter().zip(outcomes) {
        match outcome {
            JobOutcome::Generated => summary.generated += 1,
            JobOutcome::Skipped => summary.skipped += 1,
            JobOutcome::Failed(reason) => {
                summary.failed += 1;
                summary.failures.push(Failure {
                    path: job.path.clone(),
                    reason,
                });
            }
        }
    }
    summary
}
