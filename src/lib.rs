//! # rhk-sm4
//!
//! A reader for RHK Technology SM4 scanning probe microscopy files.
//!
//! The file is a tree of tagged objects located through `(type, offset, size)`
//! directories. Opening a file decodes the whole tree into an index-based
//! arena; objects without a known layout keep their raw bytes.
//!
//! **Note:** Only image pages have their samples decoded. Spectra and other
//! page data types are left unparsed.
pub mod sm4;

// Re-export the main types for convenience
pub use sm4::{
    format::registry::{Decoder, Registry},
    image::ImageView,
    tree::{Node, NodeId, ObjectTree, Parent, Payload},
    types::models::{
        DataType, DirectoryEntry, ObjectType, Page, PageHeader, PageIndexHeader, PageKind, PrmHeader,
        RootHeader, ScanDirection, SourceType, StringData, ThumbnailHeader,
    },
    PageView, Result, Sm4Error, Sm4File,
};
