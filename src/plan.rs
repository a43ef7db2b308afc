//! Thumbnail directory planning.
//!
//! Every source directory in the catalog gets exactly one destination
//! directory under the thumbnail root. Names are derived from the source
//! directory with parent markers (`..`, `.`) removed, which can make two
//! different sources collide:
//!
//! ```text
//! ../foo/  →  foo/
//! foo/     →  foo_1/
//! ```
//!
//! A directory name is also kept clear of the thumbnail files planned next
//! to it, so a directory never occupies a thumbnail's path or vice versa.
//!
//! Planning runs single-threaded and creates every directory before any
//! encoding starts. Workers only ever read the finished [`ThumbnailPlan`].

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Injective mapping from source directory to destination directory name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThumbnailPlan {
    /// Source directory → destination name, relative to the thumbnail root.
    assignments: HashMap<String, String>,
    /// Source directories in first-seen order.
    order: Vec<String>,
}

impl ThumbnailPlan {
    /// Assign destination names to source directories in first-seen order.
    ///
    /// Repeated directories are ignored after their first appearance.
    pub fn new<'a, I>(directories: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self::assign(directories.into_iter().map(|dir| (dir, Vec::new())))
    }

    /// Plan from `(directory, file name)` catalog entries.
    ///
    /// Besides being distinct from each other, destination directories never
    /// land on a planned thumbnail file, and no thumbnail lands on a planned
    /// directory:
    ///
    /// ```text
    /// ../a/ + b.png     →  a/b.png
    /// a/b.png/ + c.jpg  →  a/b.png_1/c.jpg
    /// ```
    pub fn for_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut order: Vec<&str> = Vec::new();
        let mut files: HashMap<&str, Vec<String>> = HashMap::new();
        for (dir, file_name) in entries {
            files
                .entry(dir)
                .or_insert_with(|| {
                    order.push(dir);
                    Vec::new()
                })
                .push(destination_file_name(file_name));
        }
        Self::assign(
            order
                .into_iter()
                .map(|dir| (dir, files.remove(dir).unwrap_or_default())),
        )
    }

    fn assign<'a, I>(directories: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Vec<String>)>,
    {
        let mut plan = Self::default();
        let mut occupied = Occupied::default();

        for (dir, files) in directories {
            if plan.assignments.contains_key(dir) {
                continue;
            }
            let name = occupied.free_name(&sanitize_directory(dir), &files);
            occupied.claim(&name, &files);
            plan.assignments.insert(dir.to_string(), name);
            plan.order.push(dir.to_string());
        }

        plan
    }

    /// Destination name planned for a source directory.
    pub fn destination(&self, source_dir: &str) -> Option<&str> {
        self.assignments.get(source_dir).map(String::as_str)
    }

    /// `(source, destination)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order
            .iter()
            .map(|dir| (dir.as_str(), self.assignments[dir].as_str()))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Create the thumbnail root and every planned directory.
    ///
    /// Existing directories are reused, so a re-run overwrites the previous
    /// thumbnails in place.
    pub fn create_directories(&self, thumbnail_root: &Path) -> std::io::Result<Vec<PathBuf>> {
        fs::create_dir_all(thumbnail_root)?;
        let mut created = Vec::with_capacity(self.order.len());
        for (_, destination) in self.iter() {
            let path = thumbnail_root.join(destination);
            fs::create_dir_all(&path)?;
            created.push(path);
        }
        Ok(created)
    }
}

/// Paths under the thumbnail root already claimed by a plan.
#[derive(Default)]
struct Occupied {
    directories: HashSet<String>,
    /// Planned directories plus every parent they imply.
    directory_paths: HashSet<String>,
    files: HashSet<String>,
}

impl Occupied {
    /// First free name for `candidate`, suffixing `_1`, `_2`, ... as needed.
    fn free_name(&self, candidate: &str, files: &[String]) -> String {
        let mut base = candidate.to_string();

        // A thumbnail file sitting on a parent: move that parent aside.
        while let Some(blocked) = ancestors(&base)
            .skip(1)
            .filter(|path| self.files.contains(*path))
            .last()
            .map(str::to_string)
        {
            let mut suffix = 1;
            let renamed = loop {
                let name = format!("{blocked}_{suffix}");
                if !self.files.contains(&name) {
                    break name;
                }
                suffix += 1;
            };
            base = format!("{renamed}{}", &base[blocked.len()..]);
        }

        let mut name = base.clone();
        let mut suffix = 1;
        while !self.is_free(&name, files) {
            name = format!("{base}_{suffix}");
            suffix += 1;
        }
        name
    }

    fn is_free(&self, name: &str, files: &[String]) -> bool {
        !self.directories.contains(name)
            && !ancestors(name).any(|path| self.files.contains(path))
            && files.iter().all(|file| {
                let path = join(name, file);
                !self.directory_paths.contains(&path) && !self.files.contains(&path)
            })
    }

    fn claim(&mut self, name: &str, files: &[String]) {
        self.directories.insert(name.to_string());
        self.directory_paths.extend(ancestors(name).map(str::to_string));
        self.files.extend(files.iter().map(|file| join(name, file)));
    }
}

/// `"a/b/c"`, then `"a/b"`, then `"a"`. Nothing for the root.
fn ancestors(name: &str) -> impl Iterator<Item = &str> {
    let mut rest = Some(name).filter(|n| !n.is_empty());
    std::iter::from_fn(move || {
        let current = rest?;
        rest = current.rfind('/').map(|i| &current[..i]);
        Some(current)
    })
}

fn join(dir: &str, file: &str) -> String {
    if dir.is_empty() {
        file.to_string()
    } else {
        format!("{dir}/{file}")
    }
}

/// Filesystem-safe destination name for a source directory.
///
/// Backslashes become slashes, and empty, `.`, and `..` segments are dropped:
/// `"../foo/"` → `"foo"`, `"./a//b/"` → `"a/b"`, `"../"` → `""` (the
/// thumbnail root itself).
pub fn sanitize_directory(dir: &str) -> String {
    dir.replace('\\', "/")
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .collect::<Vec<_>>()
        .join("/")
}

/// Thumbnail file name for a source file name.
///
/// GIF and BMP sources are written as PNG; every other name is kept.
pub fn destination_file_name(file_name: &str) -> String {
    let path = Path::new(file_name);
    let retarget = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gif") || e.eq_ignore_ascii_case("bmp"));
    if retarget {
        path.with_extension("png").to_string_lossy().into_owned()
    } else {
        file_name.to_string()
    }
}
