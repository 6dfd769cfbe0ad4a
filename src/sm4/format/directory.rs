//! Object directory parsing.
//!
//! A directory is a flat array of 12-byte `(type_id, offset, size)` entries,
//! little-endian. Entry order is preserved.

use std::io::{Read, Seek};

use byteorder::{LittleEndian, ReadBytesExt};
use log::trace;

use crate::sm4::types::error::Result;
use crate::sm4::types::models::DirectoryEntry;
use crate::sm4::utils;

/// Reads `count` directory entries starting at the current position.
///
/// `count` comes from the file itself. A count larger than the bytes left
/// fails with [`Truncated`](crate::sm4::Sm4Error::Truncated) at the first
/// missing entry.
pub fn read_entries<R: Read + Seek>(reader: &mut R, count: u32) -> Result<Vec<DirectoryEntry>> {
    // not pre-sized: count is unchecked until the records are read
    let mut entries = Vec::new();
    for _ in 0..count {
        let record = utils::read_record(reader, DirectoryEntry::SIZE, "directory entry")?;
        let entry = parse_entry(&record)?;
        trace!(
            "Directory entry: type={}, offset={}, size={}",
            entry.type_id,
            entry.offset,
            entry.size
        );
        entries.push(entry);
    }
    Ok(entries)
}

fn parse_entry(mut record: &[u8]) -> Result<DirectoryEntry> {
    Ok(DirectoryEntry {
        type_id: record.read_u32::<LittleEndian>()?,
        offset: record.read_u32::<LittleEndian>()?,
        size: record.read_u32::<LittleEndian>()?,
    })
}
