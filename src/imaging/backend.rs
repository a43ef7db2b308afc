//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the seam between the pipeline runner and the
//! pixel work. The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend); tests swap in a mock
//! that records every call and fails on demand.

use super::params::ThumbnailParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("encode failed: {0}")]
    Encode(String),
    #[error("unsupported source format: {0}")]
    UnsupportedFormat(String),
}

/// Size of an encoded thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// Implementations must be `Sync`: one backend instance is shared by every
/// worker in the pool.
pub trait ImageBackend: Sync {
    /// Decode `params.source`, fit it into the bounding box, and encode it
    /// to `params.output`. Returns the size of the written image.
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<Dimensions, BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::calculations::scaled_dimensions;
    use crate::imaging::params::Encoding;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Mock backend that records operations without touching pixels.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    pub struct MockBackend {
        /// Pretend every source has this size.
        pub source_dimensions: (u32, u32),
        /// Source file names that fail to decode.
        pub failing: HashSet<String>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedOp {
        pub source: String,
        pub output: String,
        pub bound: u32,
        pub encoding: Encoding,
    }

    impl Default for MockBackend {
        fn default() -> Self {
            Self {
                source_dimensions: (400, 300),
                failing: HashSet::new(),
                operations: Mutex::new(Vec::new()),
            }
        }
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_on(names: &[&str]) -> Self {
            Self {
                failing: names.iter().map(|n| n.to_string()).collect(),
                ..Self::default()
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }
    }

    impl ImageBackend for MockBackend {
        fn thumbnail(&self, params: &ThumbnailParams) -> Result<Dimensions, BackendError> {
            self.operations.lock().unwrap().push(RecordedOp {
                source: params.source.to_string_lossy().to_string(),
                output: params.output.to_string_lossy().to_string(),
                bound: params.bound,
                encoding: params.encoding,
            });

            let name = params
                .source
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            if self.failing.contains(&name) {
                return Err(BackendError::Decode(format!("mock failure for {name}")));
            }

            let (width, height) = scaled_dimensions(self.source_dimensions, params.bound);
            Ok(Dimensions { width, height })
        }
    }

    fn params(source: &str) -> ThumbnailParams {
        ThumbnailParams {
            source: source.into(),
            output: "/thumb/out.jpg".into(),
            bound: 100,
            encoding: Encoding::Jpeg { quality: 75 },
        }
    }

    #[test]
    fn mock_records_thumbnail() {
        let backend = MockBackend::new();

        let dims = backend.thumbnail(&params("/src/a.jpg")).unwrap();
        assert_eq!(dims, Dimensions { width: 100, height: 75 });

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].source, "/src/a.jpg");
        assert_eq!(ops[0].output, "/thumb/out.jpg");
        assert_eq!(ops[0].bound, 100);
    }

    #[test]
    fn mock_fails_named_sources() {
        let backend = MockBackend::failing_on(&["broken.jpg"]);

        assert!(backend.thumbnail(&params("/src/fine.jpg")).is_ok());
        let err = backend.thumbnail(&params("/src/broken.jpg")).unwrap_err();
        assert!(matches!(err, BackendError::Decode(_)));
        assert_eq!(backend.get_operations().len(), 2);
    }
}
