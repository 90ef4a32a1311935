//! Gzip wrapping applied to message payloads outside the `OpenPGP` packet structure.

use std::io::{Read, Write};

use flate2::{bufread::GzDecoder, write::GzEncoder, Compression};
use log::debug;

use crate::CompressionError;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Gzip-compresses `data` with the given level (0-9, clamped).
///
/// The encoder is always finished, a failure to flush the trailer is reported as
/// [`CompressionError::Finish`].
pub fn gzip(data: &[u8], level: u32) -> Result<Vec<u8>, CompressionError> {
    let mut encoder = GzEncoder::new(
        Vec::with_capacity(data.len() / 2 + 32),
        Compression::new(level.min(9)),
    );
    encoder.write_all(data).map_err(CompressionError::Write)?;
    let compressed = encoder.finish().map_err(CompressionError::Finish)?;
    debug!(
        "gzip: compressed {} bytes into {} bytes",
        data.len(),
        compressed.len()
    );
    Ok(compressed)
}

/// Decompresses a gzip stream, including multi-member streams.
///
/// Data that does not start with a gzip header fails with
/// [`CompressionError::InvalidHeader`] before any decompressor is created.
/// Each member is read by its own decompressor, which is released afterwards.
/// Input left after the last member that does not start another member is
/// reported as [`CompressionError::Release`].
pub fn gunzip(data: &[u8]) -> Result<Vec<u8>, CompressionError> {
    if !data.starts_with(&GZIP_MAGIC) {
        return Err(CompressionError::InvalidHeader);
    }
    let mut decompressed = Vec::with_capacity(data.len() * 2);
    let mut remaining = data;
    let mut members = 0_usize;
    while !remaining.is_empty() {
        if !remaining.starts_with(&GZIP_MAGIC) {
            return Err(CompressionError::Release(remaining.len()));
        }
        let mut decoder = GzDecoder::new(remaining);
        decoder
            .read_to_end(&mut decompressed)
            .map_err(CompressionError::Read)?;
        remaining = decoder.into_inner();
        members += 1;
    }
    debug!(
        "gzip: decompressed {} bytes in {members} member(s) into {} bytes",
        data.len(),
        decompressed.len()
    );
    Ok(decompressed)
}
