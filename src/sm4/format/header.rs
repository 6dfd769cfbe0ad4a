//! SM4 root header parsing.
//!
//! # Header Structure
//! ```text
//! [2 bytes]  Header size (little-endian u16)
//! [36 bytes] Signature (UTF-16LE "STiMage 005.004 1\0")
//! [4 bytes]  Page count
//! [4 bytes]  Root object count
//! [4 bytes]  Object field size
//! [8 bytes]  Reserved
//! [N bytes]  Padding, only when the header size exceeds the fixed record
//! ```

use std::io::{Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};
use log::{debug, info, trace};

use crate::sm4::types::error::Result;
use crate::sm4::types::models::RootHeader;
use crate::sm4::utils;

/// Size of the fixed root record that follows the 2-byte size prefix.
pub const ROOT_RECORD_SIZE: usize = 56;

/// Parses the root header from the start of the stream.
///
/// On return the reader is positioned at the first root directory entry.
pub fn parse<R: Read + Seek>(file: &mut R) -> Result<RootHeader> {
    file.seek(SeekFrom::Start(0))?;

    let prefix = utils::read_record(file, 2, "root header size")?;
    let header_size = prefix.as_slice().read_u16::<LittleEndian>()?;
    trace!("Root header size: {} bytes", header_size);

    let record = utils::read_record(file, ROOT_RECORD_SIZE, "root header")?;
    let mut reader = record.as_slice();

    let mut signature = [0u8; 36];
    reader.read_exact(&mut signature)?;
    let page_count = reader.read_u32::<LittleEndian>()?;
    let object_count = reader.read_u32::<LittleEndian>()?;
    let object_field_size = reader.read_u32::<LittleEndian>()?;
    let reserved = [
        reader.read_u32::<LittleEndian>()?,
        reader.read_u32::<LittleEndian>()?,
    ];

    let header_pad = if header_size as usize > ROOT_RECORD_SIZE {
        let pad_len = header_size as usize - ROOT_RECORD_SIZE;
        debug!("Root header carries {} padding bytes", pad_len);
        utils::read_record(file, pad_len, "root header padding")?
    } else {
        Vec::new()
    };

    let header = RootHeader {
        header_size,
        signature,
        page_count,
        object_count,
        object_field_size,
        reserved,
        header_pad,
    };

    info!(
        "Root header parsed: signature='{}', pages={}, objects={}",
        header.signature_text().trim_end_matches('\0'),
        page_count,
        object_count
    );

    Ok(header)
}

impl RootHeader {
    /// The signature decoded as UTF-16LE, including its trailing NUL.
    pub fn signature_text(&self) -> String {
        utils::decode_utf16(&self.signature)
    }
}
