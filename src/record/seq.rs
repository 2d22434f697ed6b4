//! Packed sequence and raw-quality encoding (spec.md §4.7).
//!
//! Sequence bases are packed two-per-byte, high nibble first, using
//! htslib's `seq_nt16_str` table. Quality bytes are stored as raw Phred
//! scores (no `+33` printable offset) exactly as the BAM wire format
//! stores them; the `+33` shift only happens at the SAM text boundary.

use crate::error::{Result, SamError};

/// htslib's `seq_nt16_str`: nibble value -> base letter.
pub const SEQ_NT16_STR: &[u8; 16] = b"=ACMGRSVTWYHKDBN";

fn nibble_for_base(base: u8) -> Result<u8> {
    let upper = base.to_ascii_uppercase();
    SEQ_NT16_STR
        .iter()
        .position(|&c| c == upper)
        .map(|i| i as u8)
        .ok_or_else(|| SamError::bad_format(format!("unknown sequence base '{}'", base as char)))
}

/// Pack an ASCII base string into two-bases-per-byte nibbles, high nibble
/// first. An odd-length sequence's final byte has its low nibble zeroed.
pub fn pack_seq(bases: &str) -> Result<Vec<u8>> {
    let bytes = bases.as_bytes();
    let mut packed = vec![0u8; (bytes.len() + 1) / 2];
    for (i, &base) in bytes.iter().enumerate() {
        let nibble = nibble_for_base(base)?;
        if i % 2 == 0 {
            packed[i / 2] = nibble << 4;
        } else {
            packed[i / 2] |= nibble;
        }
    }
    Ok(packed)
}

/// Unpack `length` bases from two-bases-per-byte nibbles back to an ASCII
/// string.
pub fn unpack_seq(packed: &[u8], length: usize) -> String {
    let mut s = String::with_capacity(length);
    for i in 0..length {
        let byte = packed[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0xF };
        s.push(SEQ_NT16_STR[nibble as usize] as char);
    }
    s
}

/// Convert printable SAM quality text (`'!'`-based, `+33` offset) to raw
/// Phred bytes. `"*"` (no reported quality) is `length` bytes of `0xFF`.
pub fn parse_qual(text: &str, length: usize) -> Result<Vec<u8>> {
    if text == "*" {
        return Ok(vec![0xFF; length]);
    }
    if text.len() != length {
        return Err(SamError::bad_format(
            "quality string length does not match sequence length",
        ));
    }
    Ok(text.bytes().map(|b| b.wrapping_sub(33)).collect())
}

/// Convert raw Phred quality bytes to printable SAM text. All-`0xFF`
/// quality formats as `"*"`.
pub fn format_qual(raw: &[u8]) -> String {
    if raw.iter().all(|&b| b == 0xFF) {
        return "*".to_string();
    }
    raw.iter().map(|&b| (b.wrapping_add(33)) as char).collect()
}
