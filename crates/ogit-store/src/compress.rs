//! zlib stream compression for loose objects.
//!
//! Objects are small enough to be materialised whole, so the codec works on
//! complete buffers rather than exposing a streaming interface.

use std::io::{self, Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

/// Default zlib level, matching git's `core.compression` default.
pub const DEFAULT_LEVEL: u32 = 6;

/// Whole-buffer zlib compressor.
#[derive(Clone, Copy, Debug)]
pub struct Compressor {
    level: Compression,
}

impl Compressor {
    /// Create a compressor at the given zlib level (clamped to 0..=9).
    pub fn new(level: u32) -> Self {
        Self {
            level: Compression::new(level.min(9)),
        }
    }

    /// The zlib level in use.
    pub fn level(&self) -> u32 {
        self.level.level()
    }

    /// Compress `data` into a complete zlib stream.
    pub fn compress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2 + 16), self.level);
        encoder.write_all(data)?;
        encoder.finish()
    }

    /// Decompress a complete zlib stream.
    ///
    /// Fails on a bad header or a corrupt deflate body.
    pub fn decompress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        let mut decoder = ZlibDecoder::new(data);
        let mut out = Vec::new();
        decoder.read_to_end(&mut out)?;
        Ok(out)
    }
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new(DEFAULT_LEVEL)
    }
}
