//! Small `std::io::Read`/`Write` adapters bridging [`crate::rawio::RawFile`]
//! (which has no standard-trait I/O of its own, per spec.md §4.2) and the
//! format-detection peek buffer into the generic `Read`/`Write` world the
//! BGZF, `flate2`, and line-buffer layers are built on.

use std::io::{self, Read, Write};

use crate::rawio::RawFile;

/// Adapts [`RawFile`] to `std::io::Read`/`Write`.
pub struct RawFileIo(RawFile);

impl RawFileIo {
    pub fn new(file: RawFile) -> Self {
        RawFileIo(file)
    }
}

fn to_io_error(e: crate::error::SamError) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e.to_string())
}

impl Read for RawFileIo {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf).map_err(to_io_error)
    }
}

impl Write for RawFileIo {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf).map_err(to_io_error)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Replays a small prefix of already-consumed bytes (the format-detection
/// peek) before continuing to read from the underlying source.
pub struct PrefixReader<R: Read> {
    prefix: Vec<u8>,
    pos: usize,
    inner: R,
}

impl<R: Read> PrefixReader<R> {
    pub fn new(prefix: Vec<u8>, inner: R) -> Self {
        PrefixReader {
            prefix,
            pos: 0,
            inner,
        }
    }
}

impl<R: Read> Read for PrefixReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos < self.prefix.len() {
            let n = (self.prefix.len() - self.pos).min(buf.len());
            buf[..n].copy_from_slice(&self.prefix[self.pos..self.pos + n]);
            self.pos += n;
            return Ok(n);
        }
        self.inner.read(buf)
    }
}
