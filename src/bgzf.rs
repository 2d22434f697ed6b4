//! Identify, decompress, and emit BGZF-framed gzip blocks.
//!
//! A BGZF block is an RFC 1952 gzip member whose extra-subfield region
//! carries a `BC` subfield recording the total on-disk block size. Blocks
//! are independently decompressible (each is a complete gzip member), which
//! is what makes BGZF-framed BAM seekable by block boundary even though
//! this crate does not implement virtual-offset seeking itself (spec.md
//! §1 Non-goals).
//!
//! [`BgzfReader`] / [`BgzfWriter`] wrap a generic `R: Read` / `W: Write`,
//! decoding or encoding one block at a time, in the same shape as the
//! teacher crate's `Lz4ReadFile`/`Lz4WriteFile` streaming wrappers.

use std::io::{self, Read, Write};

use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};

use crate::error::{Result, SamError};

/// Maximum uncompressed payload per block (spec.md §4.3).
pub const MAX_UNCOMPRESSED_BLOCK_SIZE: usize = 64 * 1024;

/// Maximum compressed payload the encoder will emit per block, leaving room
/// for the fixed 18-byte header and 8-byte trailer within a 64 KiB block.
pub const MAX_COMPRESSED_PAYLOAD: usize = 65536 - 26;

const HEADER_SIZE: usize = 18;
const TRAILER_SIZE: usize = 8;

/// The canonical 28-byte BGZF end-of-file marker: a valid BGZF block whose
/// payload is empty.
pub const EOF_MARKER: [u8; 28] = [
    0x1f, 0x8b, 0x08, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0xff, 0x06, 0x00, 0x42, 0x43, 0x02,
    0x00, 0x1b, 0x00, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

fn bad(msg: impl Into<String>) -> SamError {
    SamError::bad_format(msg)
}

/// Read exactly `buf.len()` bytes, or fewer only at a clean EOF (nothing
/// read at all). A partial read is always a bad-format (truncated) error.
fn read_exact_or_eof<R: Read>(source: &mut R, buf: &mut [u8]) -> Result<bool> {
    let mut got = 0;
    while got < buf.len() {
        let n = source
            .read(&mut buf[got..])
            .map_err(|e| SamError::system("read", e.raw_os_error(), None))?;
        if n == 0 {
            if got == 0 {
                return Ok(false);
            }
            return Err(bad("truncated BGZF block header"));
        }
        got += n;
    }
    Ok(true)
}

/// Decode exactly one BGZF block from `source`.
///
/// Returns `Ok(None)` at a clean end of stream: either the physical source
/// is exhausted at a block boundary, or an empty-payload "EOF" block was
/// read (spec.md §4.3).
pub fn decode_block<R: Read>(source: &mut R) -> Result<Option<Vec<u8>>> {
    let mut header = [0u8; HEADER_SIZE];
    if !read_exact_or_eof(source, &mut header)? {
        return Ok(None);
    }

    if header[0] != 0x1f || header[1] != 0x8b {
        return Err(bad("not a BGZF block: bad gzip magic"));
    }
    // FEXTRA flag (bit 2 of FLG) must be set; XLEN must be 6 (one BC subfield).
    if header[3] & 0x04 == 0 {
        return Err(bad("not a BGZF block: FEXTRA flag not set"));
    }
    let xlen = u16::from_le_bytes([header[10], header[11]]);
    if xlen != 6 {
        return Err(bad("not a BGZF block: unexpected extra-field length"));
    }
    if &header[12..14] != b"BC" || header[14] != 6 || header[15] != 0 {
        return Err(bad("not a BGZF block: missing BC subfield"));
    }
    let bsize = u16::from_le_bytes([header[16], header[17]]) as usize;
    if bsize + 1 < HEADER_SIZE + TRAILER_SIZE {
        return Err(bad("BGZF block size too small"));
    }
    let remaining_len = bsize + 1 - HEADER_SIZE;

    let mut remaining = vec![0u8; remaining_len];
    if !read_exact_or_eof(source, &mut remaining)? {
        return Err(bad("truncated BGZF block body"));
    }

    let body_len = remaining_len - TRAILER_SIZE;
    let (body, trailer) = remaining.split_at(body_len);
    let expected_crc = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
    let expected_isize = u32::from_le_bytes([trailer[4], trailer[5], trailer[6], trailer[7]]);

    if expected_isize == 0 {
        // Empty-payload EOF block: an isize-0 block is the EOF sentinel by
        // definition, regardless of how many bytes its (empty-DEFLATE-
        // stream) compressed body takes up.
        return Ok(None);
    }
    if expected_isize as usize > MAX_UNCOMPRESSED_BLOCK_SIZE {
        return Err(bad("BGZF block declares an oversized uncompressed size"));
    }

    let mut out = vec![0u8; expected_isize as usize];
    let mut decompress = Decompress::new(false);
    let status = decompress
        .decompress(body, &mut out, FlushDecompress::Finish)
        .map_err(|_| bad("BGZF block failed to inflate"))?;
    if status != Status::StreamEnd {
        return Err(bad("BGZF block did not terminate cleanly"));
    }
    if decompress.total_out() != expected_isize as u64 {
        return Err(bad("BGZF block inflated to the wrong size"));
    }

    let mut crc = flate2::Crc::new();
    crc.update(&out);
    if crc.sum() != expected_crc {
        return Err(bad("BGZF block CRC-32 mismatch"));
    }

    Ok(Some(out))
}

/// Encode `data` (at most [`MAX_UNCOMPRESSED_BLOCK_SIZE`] bytes) as one
/// complete BGZF block.
pub fn encode_block(data: &[u8]) -> Result<Vec<u8>> {
    if data.len() > MAX_UNCOMPRESSED_BLOCK_SIZE {
        return Err(SamError::logic(
            "encode_block: input exceeds the maximum BGZF block size",
        ));
    }

    let mut compress = Compress::new(Compression::default(), false);
    let mut payload = vec![0u8; MAX_COMPRESSED_PAYLOAD];
    let status = compress
        .compress(data, &mut payload, FlushCompress::Finish)
        .map_err(|_| SamError::logic("BGZF block failed to deflate"))?;
    if status != Status::StreamEnd {
        return Err(SamError::logic(
            "BGZF block payload exceeds the maximum compressed size",
        ));
    }
    let compressed_len = compress.total_out() as usize;
    payload.truncate(compressed_len);

    let mut crc = flate2::Crc::new();
    crc.update(data);

    let bsize = (HEADER_SIZE + compressed_len + TRAILER_SIZE - 1) as u16;

    let mut block = Vec::with_capacity(HEADER_SIZE + compressed_len + TRAILER_SIZE);
    block.extend_from_slice(&[0x1f, 0x8b, 0x08, 0x04, 0, 0, 0, 0, 0, 0xff]);
    block.extend_from_slice(&6u16.to_le_bytes());
    block.extend_from_slice(b"BC");
    block.extend_from_slice(&2u16.to_le_bytes());
    block.extend_from_slice(&bsize.to_le_bytes());
    block.extend_from_slice(&payload);
    block.extend_from_slice(&crc.sum().to_le_bytes());
    block.extend_from_slice(&(data.len() as u32).to_le_bytes());
    Ok(block)
}

/// Returns `true` if the first bytes of `peek` look like a BGZF block
/// (gzip magic followed by the `BC` extra subfield at the fixed offsets
/// spec.md §4.10 uses for format auto-detection).
pub fn looks_like_bgzf(peek: &[u8]) -> bool {
    peek.len() >= 16
        && peek[0] == 0x1f
        && peek[1] == 0x8b
        && peek[10..16] == [0x06, 0x00, 0x42, 0x43, 0x02, 0x00]
}

/// Streaming BGZF decoder implementing [`Read`].
pub struct BgzfReader<R: Read> {
    inner: R,
    buf: Vec<u8>,
    pos: usize,
    finished: bool,
}

impl<R: Read> BgzfReader<R> {
    pub fn new(inner: R) -> Self {
        BgzfReader {
            inner,
            buf: Vec::new(),
            pos: 0,
            finished: false,
        }
    }
}

impl<R: Read> Read for BgzfReader<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if self.pos >= self.buf.len() && !self.finished {
            match decode_block(&mut self.inner) {
                Ok(Some(block)) => {
                    self.buf = block;
                    self.pos = 0;
                }
                Ok(None) => self.finished = true,
                Err(e) => return Err(io::Error::new(io::ErrorKind::InvalidData, e.to_string())),
            }
        }
        let avail = self.buf.len() - self.pos;
        let n = avail.min(out.len());
        out[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Streaming BGZF encoder implementing [`Write`]. Buffers up to
/// [`MAX_UNCOMPRESSED_BLOCK_SIZE`] bytes before emitting a block; call
/// [`finish`](Self::finish) to flush the final partial block and append the
/// EOF marker.
pub struct BgzfWriter<W: Write> {
    inner: Option<W>,
    buf: Vec<u8>,
}

impl<W: Write> BgzfWriter<W> {
    pub fn new(inner: W) -> Self {
        BgzfWriter {
            inner: Some(inner),
            buf: Vec::with_capacity(MAX_UNCOMPRESSED_BLOCK_SIZE),
        }
    }

    fn flush_block(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let block = encode_block(&self.buf)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
        self.inner.as_mut().unwrap().write_all(&block)?;
        self.buf.clear();
        Ok(())
    }

    /// Flush any buffered data, write the EOF marker, and return the inner writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.flush_block()?;
        self.inner.as_mut().unwrap().write_all(&EOF_MARKER)?;
        Ok(self.inner.take().unwrap())
    }
}

impl<W: Write> Write for BgzfWriter<W> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut written = 0;
        while written < data.len() {
            let room = MAX_UNCOMPRESSED_BLOCK_SIZE - self.buf.len();
            let chunk = room.min(data.len() - written);
            self.buf.extend_from_slice(&data[written..written + chunk]);
            written += chunk;
            if self.buf.len() == MAX_UNCOMPRESSED_BLOCK_SIZE {
                self.flush_block()?;
            }
        }
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_block()?;
        self.inner.as_mut().unwrap().flush()
    }
}

impl<W: Write> Drop for BgzfWriter<W> {
    fn drop(&mut self) {
        if self.inner.is_some() {
            let _ = self.flush_block();
            if let Some(inner) = self.inner.as_mut() {
                let _ = inner.write_all(&EOF_MARKER);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trip_single_block() {
        let data = b"the quick brown fox jumps over the lazy dog".repeat(100);
        let block = encode_block(&data).unwrap();
        let mut cursor = Cursor::new(block);
        let decoded = decode_block(&mut cursor).unwrap().unwrap();
        assert_eq!(decoded, data);
        assert!(decode_block(&mut cursor).unwrap().is_none());
    }

    #[test]
    fn concatenated_blocks_plus_eof_marker() {
        let a = encode_block(b"first block").unwrap();
        let b = encode_block(b"second block").unwrap();
        let mut stream = Vec::new();
        stream.extend_from_slice(&a);
        stream.extend_from_slice(&b);
        stream.extend_from_slice(&EOF_MARKER);

        let mut cursor = Cursor::new(stream);
        assert_eq!(decode_block(&mut cursor).unwrap().unwrap(), b"first block");
        assert_eq!(
            decode_block(&mut cursor).unwrap().unwrap(),
            b"second block"
        );
        assert!(decode_block(&mut cursor).unwrap().is_none());
    }

    #[test]
    fn reader_writer_round_trip_multi_block() {
        let original: Vec<u8> = (0u8..=255).cycle().take(200_000).collect();

        let mut writer = BgzfWriter::new(Vec::new());
        writer.write_all(&original).unwrap();
        let compressed = writer.finish().unwrap();

        let mut reader = BgzfReader::new(Cursor::new(compressed));
        let mut recovered = Vec::new();
        reader.read_to_end(&mut recovered).unwrap();
        assert_eq!(recovered, original);
    }

    #[test]
    fn rejects_bad_magic() {
        let junk = vec![0u8; 32];
        let mut cursor = Cursor::new(junk);
        assert!(decode_block(&mut cursor).unwrap_err().is_bad_format());
    }

    #[test]
    fn detects_bgzf_prefix() {
        let block = encode_block(b"hi").unwrap();
        assert!(looks_like_bgzf(&block));
        assert!(!looks_like_bgzf(b"not a bgzf block at all"));
    }
}
