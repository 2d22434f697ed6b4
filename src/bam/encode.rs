//! BAM per-record encoding (spec.md §4.9): the inverse of
//! [`crate::bam::decode`] — the alignment's block is already shaped like
//! the wire record, so encoding is a single `write_all`.

use std::io::Write;

use crate::error::{Result, SamError};
use crate::record::Alignment;

/// Write one alignment record in BAM wire format.
pub fn encode_record<W: Write>(writer: &mut W, alignment: &Alignment) -> Result<()> {
    writer
        .write_all(alignment.block())
        .map_err(|e| SamError::system("write", e.raw_os_error(), None))
}
