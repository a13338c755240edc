//! Streaming ZIP container writer (spec §4.9), hand-rolled: per-entry
//! CRC-32, local file headers, central directory, end-of-central-directory
//! record — no compression crate underneath (see SPEC_FULL.md §10.7).

pub mod crc32;
pub mod deflate;
pub mod writer;

pub use writer::{CompressionMethod, ZipWriter};
