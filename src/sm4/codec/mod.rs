//! Codec layer for payload transformations.
//!
//! # Submodules
//!
//! - [`compression`][]: Decompression of zlib-packed PRM parameter blocks

pub mod compression;
