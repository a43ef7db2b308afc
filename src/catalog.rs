//! Catalog construction and persistence.
//!
//! Phase 1 of the pipeline: enumerate the configured directories, keep files
//! with an allowed extension, order them (see [`crate::sort`]), and write the
//! flattened path list as JSON.
//!
//! ```text
//! <root>/japan/b.png  ┐
//! <root>/japan/a.jpg  ├─ collect → sort → flatten → <root>/db.json
//! <root>/misc/c.gif   ┘
//! ```
//!
//! The catalog file is a pretty-printed JSON array of root-relative,
//! forward-slash paths:
//!
//! ```json
//! [
//!     "japan/a.jpg",
//!     "japan/b.png",
//!     "misc/c.gif"
//! ]
//! ```
//!
//! Its order is the display order of the gallery, and phase 2 reads it
//! verbatim instead of scanning the filesystem again.
//!
//! Directories are never descended into. Every directory has to be listed in
//! the config.

use crate::config::CatalogConfig;
use crate::sort::{flatten, sort_entries};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Cannot read catalog {path}: {reason}")]
    Read { path: PathBuf, reason: String },
}

/// One cataloged image: its directory (relative to the root, trailing slash)
/// and its file name, kept apart so sorting can ignore the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub directory: String,
    pub file_name: String,
}

impl CatalogEntry {
    pub fn new(directory: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            file_name: file_name.into(),
        }
    }

    /// Split a persisted catalog path at its last slash.
    ///
    /// `"japan/a.jpg"` → (`"japan/"`, `"a.jpg"`); `"a.jpg"` → (`""`, `"a.jpg"`).
    pub fn from_relative_path(path: &str) -> Self {
        match path.rfind('/') {
            Some(idx) => Self::new(&path[..=idx], &path[idx + 1..]),
            None => Self::new("", path),
        }
    }

    /// The persisted form: directory followed by file name.
    pub fn relative_path(&self) -> String {
        format!("{}{}", self.directory, self.file_name)
    }

    /// Location of the source file on disk.
    pub fn source_path(&self, root: &Path) -> PathBuf {
        root.join(&self.directory).join(&self.file_name)
    }
}

/// Allow-listed file extensions, lowercase.
///
/// `jpg` and `jpeg` name the same format, so asking for either one admits both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionSet(BTreeSet<String>);

impl ExtensionSet {
    pub fn new<I, S>(formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set: BTreeSet<String> = formats
            .into_iter()
            .map(|f| f.as_ref().to_ascii_lowercase())
            .collect();
        if set.contains("jpg") || set.contains("jpeg") {
            set.insert("jpg".to_string());
            set.insert("jpeg".to_string());
        }
        Self(set)
    }

    /// Case-insensitive extension check.
    pub fn contains(&self, extension: &str) -> bool {
        self.0.contains(&extension.to_ascii_lowercase())
    }

    /// Whether a file name has an allowed extension.
    pub fn matches(&self, file_name: &str) -> bool {
        Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.contains(e))
    }
}

/// Enumerate each directory (non-recursively) in configured order.
///
/// Within a directory the filesystem's own order is kept. Hidden files,
/// sub-directories, and names that are not valid UTF-8 are skipped.
pub fn collect_entries(
    root: &Path,
    directories: &[String],
    formats: &ExtensionSet,
) -> Result<Vec<CatalogEntry>, CatalogError> {
    let mut entries = Vec::new();

    for dir in directories {
        for dir_entry in fs::read_dir(root.join(dir))? {
            let dir_entry = dir_entry?;
            let Ok(name) = dir_entry.file_name().into_string() else {
                log::warn!(
                    "Skipping {}: file name is not valid UTF-8",
                    dir_entry.path().display()
                );
                continue;
            };
            if name.starts_with('.') || !formats.matches(&name) {
                continue;
            }
            if !dir_entry.path().is_file() {
                continue;
            }
            entries.push(CatalogEntry::new(dir.as_str(), name));
        }
    }

    Ok(entries)
}

/// The ordered list of root-relative image paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    paths: Vec<String>,
}

impl Catalog {
    pub fn new(paths: Vec<String>) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = CatalogEntry> + '_ {
        self.paths
            .iter()
            .map(|p| CatalogEntry::from_relative_path(p))
    }
}

/// Collect and order the configured directories into a catalog.
pub fn build_catalog(config: &CatalogConfig) -> Result<Catalog, CatalogError> {
    let formats = ExtensionSet::new(&config.formats);
    let entries = collect_entries(config.root(), &config.directories, &formats)?;
    log::debug!(
        "Collected {} files from {} directories",
        entries.len(),
        config.directories.len()
    );
    let sorted = sort_entries(
        entries,
        config.sort_method,
        config.reverse_sorting,
        config.root(),
    )?;
    Ok(Catalog::new(flatten(&sorted)))
}

/// Write the catalog as a pretty-printed JSON array (4-space indent).
pub fn write_catalog(path: &Path, catalog: &Catalog) -> Result<(), CatalogError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    catalog.serialize(&mut serializer)?;
    fs::write(path, buf)?;
    Ok(())
}

/// Load a catalog written by [`write_catalog`].
///
/// A missing or malformed file is reported as [`CatalogError::Read`]; the
/// thumbnail phase cannot do anything without it.
pub fn read_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    let content = fs::read_to_string(path).map_err(|e| CatalogError::Read {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| CatalogError::Read {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
