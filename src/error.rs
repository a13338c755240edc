//! Error types for the sheetcraft library

use thiserror::Error;

/// Result type alias for sheetcraft operations
pub type Result<T> = std::result::Result<T, SheetcraftError>;

/// Closed error taxonomy for a workbook build (spec §7).
#[derive(Error, Debug)]
pub enum SheetcraftError {
    /// A ZIP-entry path contains `..`, is empty, or the caller's output
    /// path cannot be normalized.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// A filesystem operation (mkdir, write, rename, rm) failed.
    #[error("file write error: {0}")]
    FileWriteError(#[from] std::io::Error),

    /// An XML-escape or UTF-8 encoding invariant was violated. Should be
    /// unreachable by construction; signals an implementation bug.
    #[error("encoding error: {0}")]
    EncodingError(String),

    /// DEFLATE or CRC-32 computation failed.
    #[error("compression error: {0}")]
    CompressionError(String),

    /// The sanitizer could not produce a non-empty sheet name and no
    /// default was configured.
    #[error("invalid sheet name: {0}")]
    InvalidSheetName(String),

    /// Build was invoked with zero sheets.
    #[error("workbook has no sheets")]
    EmptyWorkbook,
}
