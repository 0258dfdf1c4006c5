//! Error types for rastercache.

use thiserror::Error;

use crate::common::{DataType, Tier};

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in rastercache.
#[derive(Debug, Error)]
pub enum Error {
    /// Storage for a tier could not be allocated.
    ///
    /// The manager handles this internally by moving to the next heavier
    /// tier. Callers only see it when the disk tier fails too.
    #[error("cannot allocate {bytes} bytes for {tier} tier")]
    AllocationFailed { tier: Tier, bytes: usize },

    /// A legacy tier code outside `-1..=2`.
    #[error("invalid tier code: {0}")]
    InvalidTier(i32),

    /// Linear index past the end of the grid.
    #[error("index {index} out of range for grid of {len} elements")]
    IndexOutOfRange { index: usize, len: usize },

    /// A rectangle that does not fit inside the grid.
    #[error("rectangle {row_count}x{col_count} at ({brow}, {bcol}) exceeds {rows}x{cols} grid")]
    RectOutOfBounds {
        brow: usize,
        bcol: usize,
        row_count: usize,
        col_count: usize,
        rows: usize,
        cols: usize,
    },

    /// Supplied buffer length does not match the target region.
    #[error("buffer holds {actual} elements, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    /// I/O error from the persisted raster.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted raster stores a different element type.
    #[error("raster stores {found:?}, expected {expected:?}")]
    TypeMismatch { expected: DataType, found: DataType },

    /// Persisted raster header is unreadable or fails its checksum.
    #[error("corrupt raster header: {0}")]
    CorruptHeader(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::IndexOutOfRange { index: 100, len: 25 };
        assert_eq!(
            format!("{}", err),
            "index 100 out of range for grid of 25 elements"
        );

        let err = Error::InvalidTier(7);
        assert_eq!(format!("{}", err), "invalid tier code: 7");

        let err = Error::AllocationFailed {
            tier: Tier::Paged,
            bytes: 4096,
        };
        assert_eq!(format!("{}", err), "cannot allocate 4096 bytes for Paged tier");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();

        match err {
            Error::Io(_) => {}
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_io_error_has_source() {
        use std::error::Error as _;

        let err: Error = std::io::Error::new(std::io::ErrorKind::Other, "boom").into();
        assert!(err.source().is_some());
        assert!(Error::InvalidTier(9).source().is_none());
    }
}
