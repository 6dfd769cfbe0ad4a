//! Decompression of PRM parameter payloads.
//!
//! The PRM object holds the acquisition parameter text. Its PRM header states
//! whether the payload is stored raw (0) or zlib compressed (1).

use std::io::Read;

use flate2::read::ZlibDecoder;
use log::trace;

use crate::sm4::types::error::{Result, Sm4Error};
use crate::sm4::types::models::PrmHeader;

/// Returns the uncompressed PRM payload described by `header`.
///
/// Compressed payloads are inflated and must produce exactly `original_size` bytes.
/// Inflation stops one byte past that size, so an oversized stream is rejected
/// without being expanded in full.
pub fn decompress_prm(payload: &[u8], header: &PrmHeader) -> Result<Vec<u8>> {
    match header.compression {
        0 => {
            trace!("PRM payload stored uncompressed, {} bytes", payload.len());
            Ok(payload.to_vec())
        }
        1 => {
            trace!(
                "Inflating PRM payload: {} bytes -> {} bytes (expected)",
                payload.len(),
                header.original_size
            );
            let limit = header.original_size as u64 + 1;
            let mut output = Vec::new();
            ZlibDecoder::new(payload)
                .take(limit)
                .read_to_end(&mut output)
                .map_err(|e| Sm4Error::DecompressionError(format!("Zlib decompression failed: {}", e)))?;
            if output.len() as u64 == limit {
                return Err(Sm4Error::InvalidFormat(format!(
                    "PRM payload inflates past the {} bytes its header declares",
                    header.original_size
                )));
            }
            if output.len() as u64 != header.original_size as u64 {
                return Err(Sm4Error::InvalidFormat(format!(
                    "PRM payload inflated to {} bytes, header declares {}",
                    output.len(),
                    header.original_size
                )));
            }
            Ok(output)
        }
        other => Err(Sm4Error::DecompressionError(format!(
            "Unknown PRM compression flag: {}",
            other
        ))),
    }
}
