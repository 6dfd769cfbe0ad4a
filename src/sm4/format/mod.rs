//! Record layouts of the SM4 container.
//!
//! An SM4 file opens with a small root record and a root directory. Every
//! directory entry names an object by type id, absolute offset and byte size.
//! Some objects (the page index header, each inline page record, each page
//! header) are followed directly by a directory of their own, which is how the
//! file nests: root, page index, pages, page header, string data.
//!
//! [`header`] and [`directory`] read those two framing pieces, [`objects`]
//! holds one decoder per fixed layout, and [`registry`] picks the decoder for
//! a type id. Following the nesting is left to the reader.

pub mod directory;
pub mod header;
pub mod objects;
pub mod registry;
