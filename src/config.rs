//! Phase configuration: loading, schema validation, and normalization.
//!
//! Each phase reads its own TOML file. The raw table is checked once against
//! a typed schema and turned into an immutable config struct that is threaded
//! through every call of that phase.
//!
//! ## Catalog phase (`catalog.toml`)
//!
//! ```toml
//! root_path = "../img/"          # Required. Root all directories are relative to
//! directories = ["japan/", "misc/"] # Required. Listed directories only, no recursion
//! output_file = "db.json"        # Catalog file name, written under root_path
//! formats = ["jpg", "png", "gif"] # Any of jpg, jpeg, png, gif, bmp, webp
//! sort_method = "ALPHANUMERIC"   # NONE | ALPHANUMERIC | DATE_MODIFIED | DATE_CREATED
//! reverse_sorting = false
//! ```
//!
//! ## Thumbnail phase (`thumbnails.toml`)
//!
//! ```toml
//! catalog_path = "../img/db.json" # Required. Catalog produced by the catalog phase
//! thumbnail_dir = "thumb"         # Required. Created next to the catalog file
//! thumbnail_size = 154            # Longer edge of every thumbnail, in pixels
//! jpeg_quality = 75               # 0-100
//! webp_quality = 8                # 0-9
//! png_compression = 6             # 0-9
//! max_workers = 0                 # 0 = one worker per CPU core
//! ```
//!
//! ## Validation policy
//!
//! - Unknown keys are dropped with a warning.
//! - A present key with the wrong type is replaced by its default, with a warning.
//! - A missing key silently takes its default.
//! - A value of the right type that breaks its rule (empty required string,
//!   missing directory, out-of-range number, unknown enum value) fails the
//!   whole run.

use crate::sort::SortMethod;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid value for option {key}: {reason}")]
    Invalid { key: String, reason: String },
}

impl ConfigError {
    fn invalid(key: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// Non-fatal findings collected while validating a config table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    UnknownKey(String),
    WrongType {
        key: &'static str,
        expected: ValueKind,
        found: String,
    },
    AppendedExtension {
        key: &'static str,
        value: String,
    },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::UnknownKey(key) => {
                write!(f, "Unknown configuration option {key}; ignoring it")
            }
            ConfigWarning::WrongType {
                key,
                expected,
                found,
            } => write!(
                f,
                "Option {key} must be of type {expected} but was of type {found}; using the default"
            ),
            ConfigWarning::AppendedExtension { key, value } => {
                write!(f, "Option {key} does not end in .json; using {value}")
            }
        }
    }
}

/// Value type an option must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    StringList,
    Integer,
    Boolean,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::String => "string",
            ValueKind::StringList => "array of strings",
            ValueKind::Integer => "integer",
            ValueKind::Boolean => "boolean",
        };
        f.write_str(name)
    }
}

impl ValueKind {
    fn matches(self, value: &toml::Value) -> bool {
        match (self, value) {
            (ValueKind::String, toml::Value::String(_)) => true,
            (ValueKind::Integer, toml::Value::Integer(_)) => true,
            (ValueKind::Boolean, toml::Value::Boolean(_)) => true,
            (ValueKind::StringList, toml::Value::Array(items)) => items.iter().all(|v| v.is_str()),
            _ => false,
        }
    }
}

/// Default value for an option, in a const-friendly form.
#[derive(Debug, Clone, Copy)]
pub enum DefaultValue {
    Str(&'static str),
    List(&'static [&'static str]),
    Int(i64),
    Bool(bool),
}

impl DefaultValue {
    pub fn to_value(self) -> toml::Value {
        match self {
            DefaultValue::Str(s) => toml::Value::String(s.to_string()),
            DefaultValue::List(items) => toml::Value::Array(
                items
                    .iter()
                    .map(|s| toml::Value::String(s.to_string()))
                    .collect(),
            ),
            DefaultValue::Int(n) => toml::Value::Integer(n),
            DefaultValue::Bool(b) => toml::Value::Boolean(b),
        }
    }
}

/// How a path-like string is normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Directory,
    File,
}

/// Semantic rule checked after the type check passes.
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    Any,
    NonEmpty,
    NonEmptyList,
    JsonFileName,
    OneOf(&'static [&'static str]),
    Range(i64, i64),
    AtLeast(i64),
}

/// One entry of a config schema.
#[derive(Debug, Clone, Copy)]
pub struct OptionSpec {
    pub key: &'static str,
    pub kind: ValueKind,
    pub default: DefaultValue,
    pub rule: Rule,
    pub path: Option<PathKind>,
}

/// Image formats the catalog phase accepts.
pub const ACCEPTED_FORMATS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];

/// Sort method names as written in config files.
pub const SORT_METHODS: &[&str] = &["NONE", "ALPHANUMERIC", "DATE_MODIFIED", "DATE_CREATED"];

pub const CATALOG_SCHEMA: &[OptionSpec] = &[
    OptionSpec {
        key: "root_path",
        kind: ValueKind::String,
        default: DefaultValue::Str(""),
        rule: Rule::NonEmpty,
        path: Some(PathKind::Directory),
    },
    OptionSpec {
        key: "directories",
        kind: ValueKind::StringList,
        default: DefaultValue::List(&[]),
        rule: Rule::NonEmptyList,
        path: Some(PathKind::Directory),
    },
    OptionSpec {
        key: "output_file",
        kind: ValueKind::String,
        default: DefaultValue::Str("db.json"),
        rule: Rule::JsonFileName,
        path: Some(PathKind::File),
    },
    OptionSpec {
        key: "formats",
        kind: ValueKind::StringList,
        default: DefaultValue::List(&["jpg", "png", "gif"]),
        rule: Rule::OneOf(ACCEPTED_FORMATS),
        path: None,
    },
    OptionSpec {
        key: "sort_method",
        kind: ValueKind::String,
        default: DefaultValue::Str("ALPHANUMERIC"),
        rule: Rule::OneOf(SORT_METHODS),
        path: None,
    },
    OptionSpec {
        key: "reverse_sorting",
        kind: ValueKind::Boolean,
        default: DefaultValue::Bool(false),
        rule: Rule::Any,
        path: None,
    },
];

pub const THUMBNAIL_SCHEMA: &[OptionSpec] = &[
    OptionSpec {
        key: "catalog_path",
        kind: ValueKind::String,
        default: DefaultValue::Str(""),
        rule: Rule::NonEmpty,
        path: Some(PathKind::File),
    },
    OptionSpec {
        key: "thumbnail_dir",
        kind: ValueKind::String,
        default: DefaultValue::Str(""),
        rule: Rule::NonEmpty,
        path: Some(PathKind::Directory),
    },
    OptionSpec {
        key: "thumbnail_size",
        kind: ValueKind::Integer,
        default: DefaultValue::Int(154),
        rule: Rule::AtLeast(1),
        path: None,
    },
    OptionSpec {
        key: "jpeg_quality",
        kind: ValueKind::Integer,
        default: DefaultValue::Int(75),
        rule: Rule::Range(0, 100),
        path: None,
    },
    OptionSpec {
        key: "webp_quality",
        kind: ValueKind::Integer,
        default: DefaultValue::Int(8),
        rule: Rule::Range(0, 9),
        path: None,
    },
    OptionSpec {
        key: "png_compression",
        kind: ValueKind::Integer,
        default: DefaultValue::Int(6),
        rule: Rule::Range(0, 9),
        path: None,
    },
    OptionSpec {
        key: "max_workers",
        kind: ValueKind::Integer,
        default: DefaultValue::Int(0),
        rule: Rule::AtLeast(0),
        path: None,
    },
];

/// Replace backslashes with forward slashes; directories get a trailing slash.
pub fn normalize_path(path: &str, kind: PathKind) -> String {
    let mut normalized = path.replace('\\', "/");
    if kind == PathKind::Directory && !normalized.ends_with('/') {
        normalized.push('/');
    }
    normalized
}

/// A config table that passed schema validation.
///
/// Every schema key is present with a value of the right type; unknown keys
/// have been removed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedTable {
    pub values: toml::Table,
    pub warnings: Vec<ConfigWarning>,
    /// Keys that were absent and took their default.
    pub defaulted: Vec<&'static str>,
}

impl ValidatedTable {
    fn str(&self, key: &str) -> &str {
        self.values.get(key).and_then(|v| v.as_str()).unwrap_or("")
    }

    fn strings(&self, key: &str) -> Vec<String> {
        self.values
            .get(key)
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn int(&self, key: &str) -> i64 {
        self.values
            .get(key)
            .and_then(|v| v.as_integer())
            .unwrap_or(0)
    }

    fn bool(&self, key: &str) -> bool {
        self.values
            .get(key)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }
}

/// Check a raw table against a schema.
///
/// Type problems are recovered by defaulting; rule violations are returned as
/// [`ConfigError::Invalid`]. Warnings are logged as they are found and also
/// returned so callers can report them.
pub fn validate(raw: toml::Table, schema: &[OptionSpec]) -> Result<ValidatedTable, ConfigError> {
    let mut warnings = Vec::new();
    let mut defaulted = Vec::new();
    let mut values = toml::Table::new();

    for key in raw.keys() {
        if !schema.iter().any(|spec| spec.key == key) {
            let warning = ConfigWarning::UnknownKey(key.clone());
            log::warn!("{warning}");
            warnings.push(warning);
        }
    }

    for spec in schema {
        let value = match raw.get(spec.key) {
            None => {
                log::info!(
                    "Missing option {}; defaulting to {}",
                    spec.key,
                    spec.default.to_value()
                );
                defaulted.push(spec.key);
                spec.default.to_value()
            }
            Some(value) if !spec.kind.matches(value) => {
                let warning = ConfigWarning::WrongType {
                    key: spec.key,
                    expected: spec.kind,
                    found: value.type_str().to_string(),
                };
                log::warn!("{warning}");
                warnings.push(warning);
                spec.default.to_value()
            }
            Some(value) => value.clone(),
        };

        let value = apply_rule(spec, value, &mut warnings)?;
        values.insert(spec.key.to_string(), value);
    }

    Ok(ValidatedTable {
        values,
        warnings,
        defaulted,
    })
}

fn apply_rule(
    spec: &OptionSpec,
    value: toml::Value,
    warnings: &mut Vec<ConfigWarning>,
) -> Result<toml::Value, ConfigError> {
    let key = spec.key;
    match (spec.rule, value) {
        (Rule::NonEmpty, toml::Value::String(s)) => {
            if s.is_empty() {
                return Err(ConfigError::invalid(
                    key,
                    "cannot be an empty string. Did you forget to specify this option in the config?",
                ));
            }
            Ok(toml::Value::String(normalize(spec, &s)))
        }
        (Rule::NonEmptyList, toml::Value::Array(items)) => {
            if items.is_empty() {
                return Err(ConfigError::invalid(
                    key,
                    "cannot be an empty array. Did you forget to specify this option in the config?",
                ));
            }
            let mut normalized = Vec::with_capacity(items.len());
            for item in items {
                let s = item.as_str().unwrap_or_default();
                if s.is_empty() {
                    return Err(ConfigError::invalid(
                        key,
                        "contains an empty string entry, which is not allowed",
                    ));
                }
                normalized.push(toml::Value::String(normalize(spec, s)));
            }
            Ok(toml::Value::Array(normalized))
        }
        (Rule::JsonFileName, toml::Value::String(s)) => {
            if s.is_empty() {
                return Err(ConfigError::invalid(key, "cannot be an empty string"));
            }
            let mut name = normalize(spec, &s);
            if !name.ends_with(".json") {
                name.push_str(".json");
                let warning = ConfigWarning::AppendedExtension {
                    key,
                    value: name.clone(),
                };
                log::warn!("{warning}");
                warnings.push(warning);
            }
            Ok(toml::Value::String(name))
        }
        (Rule::OneOf(allowed), toml::Value::String(s)) => {
            if !allowed.contains(&s.as_str()) {
                return Err(ConfigError::invalid(
                    key,
                    format!("{s} is not valid. Accepted values are: [{}]", allowed.join(", ")),
                ));
            }
            Ok(toml::Value::String(s))
        }
        (Rule::OneOf(allowed), toml::Value::Array(items)) => {
            let mut normalized = Vec::with_capacity(items.len());
            for item in items {
                let s = item.as_str().unwrap_or_default().to_ascii_lowercase();
                if !allowed.contains(&s.as_str()) {
                    return Err(ConfigError::invalid(
                        key,
                        format!(
                            "{s} is not an accepted value. Accepted values are: [{}]",
                            allowed.join(", ")
                        ),
                    ));
                }
                normalized.push(toml::Value::String(s));
            }
            Ok(toml::Value::Array(normalized))
        }
        (Rule::Range(min, max), toml::Value::Integer(n)) => {
            if n < min || n > max {
                return Err(ConfigError::invalid(
                    key,
                    format!("must be an integer within the range of {min} - {max}"),
                ));
            }
            Ok(toml::Value::Integer(n))
        }
        (Rule::AtLeast(min), toml::Value::Integer(n)) => {
            if n < min {
                return Err(ConfigError::invalid(
                    key,
                    format!("must be an integer with a value of at least {min}"),
                ));
            }
            Ok(toml::Value::Integer(n))
        }
        (_, value) => Ok(value),
    }
}

fn normalize(spec: &OptionSpec, value: &str) -> String {
    match spec.path {
        Some(kind) => normalize_path(value, kind),
        None => value.to_string(),
    }
}

/// A typed config together with the warnings produced while validating it.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated<T> {
    pub config: T,
    pub warnings: Vec<ConfigWarning>,
}

/// Settings for the catalog phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Root directory, normalized with a trailing slash.
    pub root_path: String,
    /// Directories relative to the root, each with a trailing slash.
    pub directories: Vec<String>,
    /// Catalog file name, written under the root.
    pub output_file: String,
    /// Lowercase allowed extensions as configured (aliasing happens at scan time).
    pub formats: Vec<String>,
    pub sort_method: SortMethod,
    pub reverse_sorting: bool,
}

impl CatalogConfig {
    /// Validate a raw table and build the typed config.
    ///
    /// Also checks that every configured directory exists under the root.
    pub fn from_table(raw: toml::Table) -> Result<Validated<Self>, ConfigError> {
        let table = validate(raw, CATALOG_SCHEMA)?;
        let sort_method = table
            .str("sort_method")
            .parse::<SortMethod>()
            .map_err(|e| ConfigError::invalid("sort_method", e))?;

        let config = Self {
            root_path: table.str("root_path").to_string(),
            directories: table.strings("directories"),
            output_file: table.str("output_file").to_string(),
            formats: table.strings("formats"),
            sort_method,
            reverse_sorting: table.bool("reverse_sorting"),
        };

        for dir in &config.directories {
            if !config.root().join(dir).is_dir() {
                return Err(ConfigError::invalid(
                    "directories",
                    format!("image directory {}{} does not exist", config.root_path, dir),
                ));
            }
        }

        Ok(Validated {
            config,
            warnings: table.warnings,
        })
    }

    pub fn root(&self) -> &Path {
        Path::new(&self.root_path)
    }

    /// Where the catalog file is written.
    pub fn catalog_path(&self) -> PathBuf {
        self.root().join(&self.output_file)
    }
}

/// Settings for the thumbnail phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailConfig {
    /// Catalog file produced by the catalog phase.
    pub catalog_path: String,
    /// Thumbnail root name, relative to the catalog's directory, trailing slash.
    pub thumbnail_dir: String,
    /// Longer edge of every thumbnail.
    pub thumbnail_size: u32,
    pub jpeg_quality: u8,
    pub webp_quality: u8,
    pub png_compression: u8,
    /// Worker cap; 0 means one per core.
    pub max_workers: usize,
}

impl ThumbnailConfig {
    pub fn from_table(raw: toml::Table) -> Result<Validated<Self>, ConfigError> {
        let table = validate(raw, THUMBNAIL_SCHEMA)?;
        let thumbnail_size = u32::try_from(table.int("thumbnail_size"))
            .map_err(|_| ConfigError::invalid("thumbnail_size", "is too large"))?;
        let max_workers = usize::try_from(table.int("max_workers"))
            .map_err(|_| ConfigError::invalid("max_workers", "is too large"))?;

        // Ranges were checked by the schema, so these casts cannot truncate.
        let config = Self {
            catalog_path: table.str("catalog_path").to_string(),
            thumbnail_dir: table.str("thumbnail_dir").to_string(),
            thumbnail_size,
            jpeg_quality: table.int("jpeg_quality") as u8,
            webp_quality: table.int("webp_quality") as u8,
            png_compression: table.int("png_compression") as u8,
            max_workers,
        };

        Ok(Validated {
            config,
            warnings: table.warnings,
        })
    }

    /// Directory the catalog lives in; catalog paths are relative to it.
    pub fn source_root(&self) -> PathBuf {
        Path::new(&self.catalog_path)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// Root of the generated thumbnail tree.
    pub fn thumbnail_root(&self) -> PathBuf {
        self.source_root().join(&self.thumbnail_dir)
    }
}

/// Resolve the effective worker count.
///
/// - `0` → use all available cores
/// - `n` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_workers(max_workers: usize) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    if max_workers == 0 {
        cores
    } else {
        max_workers.min(cores)
    }
}

/// Read a TOML file into a raw table.
pub fn load_raw_config(path: &Path) -> Result<toml::Table, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

pub fn load_catalog_config(path: &Path) -> Result<Validated<CatalogConfig>, ConfigError> {
    CatalogConfig::from_table(load_raw_config(path)?)
}

pub fn load_thumbnail_config(path: &Path) -> Result<Validated<ThumbnailConfig>, ConfigError> {
    ThumbnailConfig::from_table(load_raw_config(path)?)
}

/// Fully-commented stock `catalog.toml`.
pub fn stock_catalog_toml() -> &'static str {
    r#"# Catalog configuration
# =====================
# Builds the ordered image list consumed by the thumbnail phase and the gallery.
# Unknown keys are ignored with a warning; a value of the wrong type falls back
# to its default with a warning. Invalid values stop the run.

# Root directory (relative to the working directory). All directories below are
# relative to it, and the catalog file is written into it.
root_path = "../img/"

# Directories to catalog. Sub-directories are NOT descended into; list every
# directory you want included, e.g. "illustration/", "illustration/extras/".
directories = [
    "japan-photos/",
    "random-photos/",
]

# Catalog file name. ".json" is appended if missing.
output_file = "db.json"

# Extensions to catalog: jpg, jpeg, png, gif, bmp, webp.
# "jpg" and "jpeg" each include the other.
formats = ["jpg", "png", "gif", "bmp", "webp"]

# NONE, ALPHANUMERIC, DATE_MODIFIED or DATE_CREATED.
# NONE keeps filesystem order, which differs between platforms.
sort_method = "ALPHANUMERIC"

# Reverse the sorted list.
reverse_sorting = false
"#
}

/// Fully-commented stock `thumbnails.toml`.
pub fn stock_thumbnails_toml() -> &'static str {
    r#"# Thumbnail configuration
# =======================
# Reads the catalog and writes one thumbnail per entry. GIF and BMP sources are
# written as PNG.

# Catalog produced by the catalog phase.
catalog_path = "../img/db.json"

# Thumbnail folder name, created next to the catalog file.
thumbnail_dir = "thumb"

# Longer edge of each thumbnail in pixels; the shorter edge scales to match.
thumbnail_size = 154

# JPEG quality, 0 (smallest) to 100 (best).
jpeg_quality = 75

# WebP quality, 0 (smallest) to 9 (best).
webp_quality = 8

# PNG compression, 0 (none, fastest) to 9 (max, slowest). Lossless either way.
png_compression = 6

# Parallel workers. 0 uses every CPU core; larger values are capped at the core count.
max_workers = 0
"#
}
