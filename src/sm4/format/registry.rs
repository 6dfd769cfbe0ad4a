//! Mapping from object type ids to decode routines.
//!
//! The standard table covers the object kinds with a known fixed layout. Every
//! other id, including ids outside the RHK enumeration, resolves to
//! [`Decoder::Opaque`] and keeps its raw bytes.

use std::collections::HashMap;

use crate::sm4::types::models::ObjectType;

/// The decode routine selected for a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoder {
    PageIndexHeader,
    PageIndexArray,
    PageHeader,
    PageData,
    StringData,
    PrmHeader,
    ThumbnailHeader,
    /// Copies `size` raw bytes at `offset`.
    Opaque,
}

/// Decoders for the object kinds with a concrete layout.
pub const STANDARD_DECODERS: &[(ObjectType, Decoder)] = &[
    (ObjectType::PageIndexHeader, Decoder::PageIndexHeader),
    (ObjectType::PageIndexArray, Decoder::PageIndexArray),
    (ObjectType::PageHeader, Decoder::PageHeader),
    (ObjectType::PageData, Decoder::PageData),
    (ObjectType::StringData, Decoder::StringData),
    (ObjectType::PrmHeader, Decoder::PrmHeader),
    (ObjectType::ThumbnailHeader, Decoder::ThumbnailHeader),
];

/// Type id to decoder table, fixed before decoding starts.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    decoders: HashMap<u32, Decoder>,
}

impl Registry {
    /// A registry with no entries; every object decodes as opaque bytes.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The registry built from [`STANDARD_DECODERS`].
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        for &(object_type, decoder) in STANDARD_DECODERS {
            registry.register(object_type.id(), decoder);
        }
        registry
    }

    /// Associates `type_id` with `decoder`. A later registration for the same id replaces the earlier one.
    pub fn register(&mut self, type_id: u32, decoder: Decoder) -> &mut Self {
        self.decoders.insert(type_id, decoder);
        self
    }

    pub fn resolve(&self, type_id: u32) -> Decoder {
        self.decoders.get(&type_id).copied().unwrap_or(Decoder::Opaque)
    }

    pub fn is_registered(&self, type_id: u32) -> bool {
        self.decoders.contains_key(&type_id)
    }
}
