//! Low-level byte reading utilities

use std::io::{ErrorKind, Read, Seek, SeekFrom};

use encoding_rs::UTF_16LE;

use crate::sm4::types::error::{Result, Sm4Error};

/// Reads a fixed-size record at the current position.
///
/// A short read is reported as [`Sm4Error::Truncated`] with the offset where the
/// record starts, so callers never see a bare `UnexpectedEof`.
pub fn read_record<R: Read + Seek>(reader: &mut R, len: usize, context: &'static str) -> Result<Vec<u8>> {
    let offset = reader.stream_position()?;
    let mut buf = vec![0u8; len];
    let mut filled = 0;
    while filled < len {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(Sm4Error::Truncated {
                    context,
                    offset,
                    expected: len as u64,
                    found: filled as u64,
                })
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(buf)
}

/// Seeks to `offset` and reads a fixed-size record there.
pub fn read_record_at<R: Read + Seek>(
    reader: &mut R,
    offset: u64,
    len: usize,
    context: &'static str,
) -> Result<Vec<u8>> {
    reader.seek(SeekFrom::Start(offset))?;
    read_record(reader, len, context)
}

/// Decodes UTF-16LE bytes. A trailing NUL is kept as part of the text.
pub fn decode_utf16(bytes: &[u8]) -> String {
    let (text, _) = UTF_16LE.decode_without_bom_handling(bytes);
    text.into_owned()
}

/// Total length of the stream, restoring the current position afterwards.
pub fn stream_len<R: Seek>(reader: &mut R) -> Result<u64> {
    let pos = reader.stream_position()?;
    let len = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(pos))?;
    Ok(len)
}
