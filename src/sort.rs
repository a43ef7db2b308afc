//! Catalog ordering.
//!
//! The order written to the catalog is the order the gallery pages through,
//! so every strategy except [`SortMethod::None`] is deterministic. All sorts
//! are stable: entries that compare equal keep their enumeration order
//! (configured directory order, then filesystem order within a directory).
//!
//! Reversal is a separate pass over the already-sorted list, never an inverted
//! comparator, so ties end up in exactly reversed order too.

use crate::catalog::{CatalogEntry, CatalogError};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMethod {
    /// Filesystem enumeration order. Differs between platforms.
    None,
    /// Byte-wise comparison of the file name; the directory is ignored.
    Alphanumeric,
    /// Oldest modification time first.
    DateModified,
    /// Oldest creation time first.
    DateCreated,
}

impl FromStr for SortMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NONE" => Ok(SortMethod::None),
            "ALPHANUMERIC" => Ok(SortMethod::Alphanumeric),
            "DATE_MODIFIED" => Ok(SortMethod::DateModified),
            "DATE_CREATED" => Ok(SortMethod::DateCreated),
            other => Err(format!("{other} is not a valid sort method")),
        }
    }
}

/// Order entries with `method`, then reverse the result if requested.
///
/// `root` is needed by the date strategies to stat each file.
pub fn sort_entries(
    mut entries: Vec<CatalogEntry>,
    method: SortMethod,
    reverse: bool,
    root: &Path,
) -> Result<Vec<CatalogEntry>, CatalogError> {
    match method {
        SortMethod::None => {}
        SortMethod::Alphanumeric => sort_alphanumeric(&mut entries),
        SortMethod::DateModified => {
            entries = sort_by_timestamp(entries, |entry| {
                Ok(fs::metadata(entry.source_path(root))?.modified()?)
            })?;
        }
        SortMethod::DateCreated => {
            entries = sort_by_timestamp(entries, |entry| {
                let meta = fs::metadata(entry.source_path(root))?;
                // Not every platform records a creation time.
                meta.created().or_else(|_| meta.modified())
            })?;
        }
    }

    if reverse {
        entries.reverse();
    }
    Ok(entries)
}

fn sort_alphanumeric(entries: &mut [CatalogEntry]) {
    entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));
}

/// Stable sort on a timestamp read once per entry.
fn sort_by_timestamp<F>(
    entries: Vec<CatalogEntry>,
    timestamp: F,
) -> Result<Vec<CatalogEntry>, CatalogError>
where
    F: Fn(&CatalogEntry) -> std::io::Result<SystemTime>,
{
    let mut keyed = entries
        .into_iter()
        .map(|entry| {
            let time = timestamp(&entry)?;
            Ok((time, entry))
        })
        .collect::<Result<Vec<_>, CatalogError>>()?;
    keyed.sort_by_key(|(time, _)| *time);
    Ok(keyed.into_iter().map(|(_, entry)| entry).collect())
}

/// Flatten entries into the persisted `directory + file name` form.
pub fn flatten(entries: &[CatalogEntry]) -> Vec<String> {
    entries.iter().map(CatalogEntry::relative_path).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn entry(dir: &str, name: &str) -> CatalogEntry {
        CatalogEntry::new(dir, name)
    }

    fn names(entries: &[CatalogEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.file_name.as_str()).collect()
    }

    #[test]
    fn parse_sort_methods() {
        assert_eq!("NONE".parse::<SortMethod>(), Ok(SortMethod::None));
        assert_eq!("ALPHANUMERIC".parse::<SortMethod>(), Ok(SortMethod::Alphanumeric));
        assert_eq!("DATE_MODIFIED".parse::<SortMethod>(), Ok(SortMethod::DateModified));
        assert_eq!("DATE_CREATED".parse::<SortMethod>(), Ok(SortMethod::DateCreated));
        assert!("alphanumeric".parse::<SortMethod>().is_err());
    }

    #[test]
    fn alphanumeric_sorts_by_file_name() {
        let entries = vec![entry("x/", "b.png"), entry("x/", "a.jpg"), entry("x/", "c.gif")];
        let sorted = sort_entries(entries, SortMethod::Alphanumeric, false, Path::new("")).unwrap();
        assert_eq!(names(&sorted), vec!["a.jpg", "b.png", "c.gif"]);
    }

    #[test]
    fn alphanumeric_reversed() {
        let entries = vec![entry("x/", "b.png"), entry("x/", "a.jpg"), entry("x/", "c.gif")];
        let sorted = sort_entries(entries, SortMethod::Alphanumeric, true, Path::new("")).unwrap();
        assert_eq!(names(&sorted), vec!["c.gif", "b.png", "a.jpg"]);
    }

    #[test]
    fn alphanumeric_ignores_directory() {
        let entries = vec![entry("a/", "z.png"), entry("z/", "a.png")];
        let sorted = sort_entries(entries, SortMethod::Alphanumeric, false, Path::new("")).unwrap();
        assert_eq!(
            flatten(&sorted),
            vec!["z/a.png".to_string(), "a/z.png".to_string()]
        );
    }

    #[test]
    fn alphanumeric_ties_keep_enumeration_order() {
        let entries = vec![entry("first/", "same.png"), entry("second/", "same.png")];
        let sorted = sort_entries(entries, SortMethod::Alphanumeric, false, Path::new("")).unwrap();
        assert_eq!(flatten(&sorted), vec!["first/same.png", "second/same.png"]);
    }

    #[test]
    fn reversal_reverses_ties_exactly() {
        let entries = vec![
            entry("first/", "same.png"),
            entry("second/", "same.png"),
            entry("first/", "a.png"),
        ];
        let sorted = sort_entries(entries, SortMethod::Alphanumeric, true, Path::new("")).unwrap();
        assert_eq!(
            flatten(&sorted),
            vec!["second/same.png", "first/same.png", "first/a.png"]
        );
    }

    #[test]
    fn none_keeps_input_order() {
        let entries = vec![entry("x/", "b.png"), entry("x/", "a.jpg")];
        let sorted = sort_entries(entries.clone(), SortMethod::None, false, Path::new("")).unwrap();
        assert_eq!(sorted, entries);

        let reversed = sort_entries(entries, SortMethod::None, true, Path::new("")).unwrap();
        assert_eq!(names(&reversed), vec!["a.jpg", "b.png"]);
    }

    #[test]
    fn date_modified_orders_oldest_first() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("pics");
        fs::create_dir_all(&dir).unwrap();

        let base = SystemTime::now() - Duration::from_secs(10_000);
        for (name, offset) in [("a.png", 300), ("b.png", 100), ("c.png", 200)] {
            let path = dir.join(name);
            let file = fs::File::create(&path).unwrap();
            file.set_modified(base + Duration::from_secs(offset)).unwrap();
        }

        let entries = vec![
            entry("pics/", "a.png"),
            entry("pics/", "b.png"),
            entry("pics/", "c.png"),
        ];
        let sorted =
            sort_entries(entries.clone(), SortMethod::DateModified, false, tmp.path()).unwrap();
        assert_eq!(names(&sorted), vec!["b.png", "c.png", "a.png"]);

        let reversed = sort_entries(entries, SortMethod::DateModified, true, tmp.path()).unwrap();
        assert_eq!(names(&reversed), vec!["a.png", "c.png", "b.png"]);
    }

    #[test]
    fn date_sort_missing_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let entries = vec![entry("pics/", "gone.png")];
        let result = sort_entries(entries, SortMethod::DateModified, false, tmp.path());
        assert!(matches!(result, Err(CatalogError::Io(_))));
    }

    #[test]
    fn date_created_orders_oldest_first() {
        let tmp = TempDir::new().unwrap();
        // Created in this order; names deliberately out of order.
        for name in ["c.png", "a.png", "b.png"] {
            fs::write(tmp.path().join(name), b"x").unwrap();
            std::thread::sleep(Duration::from_millis(50));
        }
        // Without creation times the modification times (same order) are used.
        let has_birth_time = fs::metadata(tmp.path().join("a.png"))
            .unwrap()
            .created()
            .is_ok();

        let entries = vec![entry("", "a.png"), entry("", "b.png"), entry("", "c.png")];
        let sorted =
            sort_entries(entries.clone(), SortMethod::DateCreated, false, tmp.path()).unwrap();
        assert_eq!(
            names(&sorted),
            vec!["c.png", "a.png", "b.png"],
            "birth time available: {has_birth_time}"
        );

        let reversed = sort_entries(entries, SortMethod::DateCreated, true, tmp.path()).unwrap();
        assert_eq!(names(&reversed), vec!["b.png", "a.png", "c.png"]);
    }

    #[test]
    fn date_created_ignores_later_modification() {
        let tmp = TempDir::new().unwrap();
        for name in ["old.png", "new.png"] {
            fs::write(tmp.path().join(name), b"x").unwrap();
            std::thread::sleep(Duration::from_millis(50));
        }
        let old = tmp.path().join("old.png");
        if fs::metadata(&old).unwrap().created().is_err() {
            return;
        }
        // Touching the older file must not move it.
        fs::OpenOptions::new()
            .write(true)
            .open(&old)
            .unwrap()
            .set_modified(SystemTime::now() + Duration::from_secs(60))
            .unwrap();

        let entries = vec![entry("", "new.png"), entry("", "old.png")];
        let sorted = sort_entries(entries, SortMethod::DateCreated, false, tmp.path()).unwrap();
        assert_eq!(names(&sorted), vec!["old.png", "new.png"]);
    }
}
