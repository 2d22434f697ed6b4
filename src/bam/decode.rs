//! BAM per-record decoding (spec.md §4.9).
//!
//! An alignment's in-memory block is byte-for-byte the BAM wire record
//! (`block_size` followed by the same `rest_length` bytes of payload), so
//! decoding one record is reading `block_size` and then that many more
//! bytes straight into a fresh `Vec<u8>` — no field-by-field rebuilding.

use std::io::Read;

use crate::error::{Result, SamError};
use crate::record::block;
use crate::record::Alignment;

fn io_err(e: std::io::Error) -> SamError {
    SamError::system("read", e.raw_os_error(), None)
}

/// Size of the fixed-width core fields within the payload (`block_size`
/// counts everything after itself, so the leading 4-byte `rest_length`
/// field is not part of it).
const CORE_PAYLOAD_SIZE: usize = block::CORE_SIZE - 4;

/// Validate that `block_size` is large enough to hold the fixed core
/// fields plus the `qname`/`cigar`/`seq`/`qual` regions the block's own
/// declared lengths call for (spec.md §4.9: "validates `block_size`
/// against summed field lengths; mismatch is a bad-format failure").
/// Without this, a record whose declared lengths overrun `block_size`
/// makes `block::aux_offset`/`Alignment::parts` compute an out-of-bounds
/// slice and panic instead of returning an error.
fn validate_block_size(b: &[u8], block_size: usize) -> Result<()> {
    if block_size < CORE_PAYLOAD_SIZE {
        return Err(SamError::bad_format("truncated BAM record (core fields)"));
    }
    let name_length = block::name_length(b) as usize;
    let cigar_length = block::cigar_length(b) as usize;
    let read_length = block::read_length(b);
    if read_length < 0 {
        return Err(SamError::bad_format("BAM record has a negative read_length"));
    }
    let read_length = read_length as usize;
    let seq_bytes = (read_length + 1) / 2;

    let fixed_len = CORE_PAYLOAD_SIZE + name_length + 4 * cigar_length + seq_bytes + read_length;
    if fixed_len > block_size {
        return Err(SamError::bad_format(
            "BAM record's declared field lengths exceed its block_size",
        ));
    }
    Ok(())
}

/// Decode the next alignment record from `reader`, or `Ok(None)` on a
/// clean end of stream (no bytes at all before the `block_size` field).
pub fn decode_record<R: Read>(reader: &mut R, cindex: u16) -> Result<Option<Alignment>> {
    let mut block_size_bytes = [0u8; 4];
    let mut read_so_far = 0;
    while read_so_far < 4 {
        let n = reader
            .read(&mut block_size_bytes[read_so_far..])
            .map_err(io_err)?;
        if n == 0 {
            if read_so_far == 0 {
                return Ok(None);
            }
            return Err(SamError::bad_format("truncated BAM record (block_size)"));
        }
        read_so_far += n;
    }

    let block_size = u32::from_le_bytes(block_size_bytes) as usize;
    let mut raw = Vec::with_capacity(4 + block_size);
    raw.extend_from_slice(&block_size_bytes);
    raw.resize(4 + block_size, 0);
    reader
        .read_exact(&mut raw[4..])
        .map_err(|_| SamError::bad_format("truncated BAM record (payload)"))?;

    validate_block_size(&raw, block_size)?;

    Ok(Some(Alignment::from_block(raw, cindex)))
}
