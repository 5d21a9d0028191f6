use std::io::Write as _;

use flate2::{Compression, write::GzEncoder};

use crate::foundation::error::{Stage, TgsError, TgsResult};

/// Highest level accepted by the deflate encoder.
pub const MAX_COMPRESSION_LEVEL: u32 = 9;

/// Wrap `bytes` in a single-member gzip container.
///
/// The header carries no file name and a zero modification time, so equal input always yields
/// equal output.
pub(crate) fn compress(bytes: &[u8], level: u32) -> TgsResult<Vec<u8>> {
    if level > MAX_COMPRESSION_LEVEL {
        return Err(TgsError::transcode(
            Stage::Compress,
            format!("compression level {level} is out of range 0..={MAX_COMPRESSION_LEVEL}"),
        ));
    }

    let mut encoder = GzEncoder::new(Vec::with_capacity(bytes.len() / 4), Compression::new(level));
    encoder
        .write_all(bytes)
        .map_err(|e| TgsError::transcode(Stage::Compress, e))?;
    encoder
        .finish()
        .map_err(|e| TgsError::transcode(Stage::Compress, e))
}
