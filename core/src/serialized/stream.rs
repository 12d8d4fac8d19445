//! Stream capabilities used by the decoder.
//!
//! The container body is read through a zlib decoder, which can only move
//! forward. Skipping data there means reading and discarding it.

use std::io::{self, Read};

/// Forward-only skipping for any reader.
pub(crate) trait SkipExt: Read + Sized {
    /// Consume exactly `n` bytes without storing them.
    fn skip_bytes(&mut self, n: u64) -> io::Result<()> {
        let skipped = io::copy(&mut self.by_ref().take(n), &mut io::sink())?;
        if skipped < n {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("skipped {skipped} of {n} bytes"),
            ));
        }
        Ok(())
    }
}

impl<R: Read> SkipExt for R {}

/// Read a zero-terminated string.
///
/// Invalid UTF-8 sequences are replaced rather than rejected.
pub(crate) fn read_cstring<R: Read>(reader: &mut R) -> io::Result<String> {
    let mut bytes = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        reader.read_exact(&mut byte)?;
        if byte[0] == 0 {
            break;
        }
        bytes.push(byte[0]);
    }
    Ok(match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            log::warn!("mesh name is not valid UTF-8, replacing invalid bytes");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    })
}
