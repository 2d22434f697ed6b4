//! The alignment record (spec.md §4.7, component C7): a single heap
//! block shaped like the BAM wire format, plus the cigar, sequence, flag,
//! aux, and ordering helpers built on top of it.

pub(crate) mod aux;
pub(crate) mod block;
pub mod cigar;
pub mod cmp;
pub mod flags;
pub mod seq;

use std::sync::OnceLock;

pub use aux::{AuxArray, AuxField, AuxValue};
pub use cigar::CigarUnit;

use crate::error::Result;

/// The shared block every default-constructed `Alignment` starts from,
/// built once and reused rather than allocated per instance. First
/// mutation clones it into an owned buffer.
fn empty_block() -> &'static Vec<u8> {
    static EMPTY: OnceLock<Vec<u8>> = OnceLock::new();
    EMPTY.get_or_init(|| {
        block::build(
            -1,
            -1,
            0,
            block::UNKNOWN_BIN,
            flags::UNMAPPED,
            -1,
            -1,
            0,
            "*",
            &[],
            &[],
            0,
            &[],
            &[],
        )
    })
}

enum Storage {
    Shared,
    Owned(Vec<u8>),
}

/// A single SAM/BAM alignment record.
pub struct Alignment {
    storage: Storage,
    /// Index into the thread-local collection registry that owns this
    /// alignment's reference sequences and read groups, or `0` (the
    /// reserved "unbound" slot) if it was built without one.
    cindex: u16,
}

impl Clone for Alignment {
    fn clone(&self) -> Self {
        Alignment {
            storage: Storage::Owned(self.block().to_vec()),
            cindex: self.cindex,
        }
    }
}

impl Default for Alignment {
    fn default() -> Self {
        Alignment {
            storage: Storage::Shared,
            cindex: 0,
        }
    }
}

/// The decoded logical fields of a block, used as the intermediate form
/// for any mutation that changes a variable-length region: the block is
/// rebuilt wholesale from these rather than patched in place, trading a
/// full copy for always-correct offsets.
struct Parts {
    rindex: i32,
    zpos: i32,
    mapq: u8,
    bin: u16,
    flags: u16,
    mate_rindex: i32,
    mate_zpos: i32,
    isize_value: i32,
    qname: String,
    cigar: Vec<CigarUnit>,
    seq: String,
    qual: Vec<u8>,
    aux: Vec<u8>,
}

impl Parts {
    fn rebuild(&self) -> Result<Vec<u8>> {
        let cigar_units: Vec<u8> = self
            .cigar
            .iter()
            .flat_map(|u| u.to_packed().to_le_bytes())
            .collect();
        let seq_packed = seq::pack_seq(&self.seq)?;
        Ok(block::build(
            self.rindex,
            self.zpos,
            self.mapq,
            self.bin,
            self.flags,
            self.mate_rindex,
            self.mate_zpos,
            self.isize_value,
            &self.qname,
            &cigar_units,
            &seq_packed,
            self.seq.chars().count() as i32,
            &self.qual,
            &self.aux,
        ))
    }
}

impl Alignment {
    /// A default, unmapped alignment with qname `"*"` — the same starting
    /// point as [`Alignment::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct directly from a full BAM-shaped block, as produced by
    /// the BAM decoder.
    pub(crate) fn from_block(block: Vec<u8>, cindex: u16) -> Self {
        Alignment {
            storage: Storage::Owned(block),
            cindex,
        }
    }

    pub(crate) fn block(&self) -> &[u8] {
        match &self.storage {
            Storage::Shared => empty_block(),
            Storage::Owned(b) => b,
        }
    }

    fn block_mut(&mut self) -> &mut Vec<u8> {
        if matches!(self.storage, Storage::Shared) {
            self.storage = Storage::Owned(empty_block().clone());
        }
        match &mut self.storage {
            Storage::Owned(b) => b,
            Storage::Shared => unreachable!(),
        }
    }

    /// The collection this alignment is bound to (spec.md §3's "cindex"),
    /// or `0` if it was never bound to one.
    pub fn cindex(&self) -> u16 {
        self.cindex
    }

    /// Bind this alignment to a collection's cindex, so that `rindex`/
    /// `mate_rindex` can later be resolved back to reference names through
    /// it. The SAM/BAM codecs call this automatically when they parse or
    /// decode a record; callers building an `Alignment` programmatically
    /// must call it themselves before handing the record to a codec that
    /// needs to resolve names.
    pub fn set_cindex(&mut self, cindex: u16) {
        self.cindex = cindex;
    }

    fn parts(&self) -> Parts {
        let b = self.block();
        let cigar_off = block::cigar_offset(b);
        let seq_off = block::seq_offset(b);
        let qual_off = block::qual_offset(b);
        let aux_off = block::aux_offset(b);
        let read_length = block::read_length(b) as usize;
        let cigar_units: Vec<CigarUnit> = b[cigar_off..seq_off]
            .chunks_exact(4)
            .map(|c| CigarUnit::from_packed(u32::from_le_bytes([c[0], c[1], c[2], c[3]])))
            .collect();
        Parts {
            rindex: block::rindex(b),
            zpos: block::zpos(b),
            mapq: block::mapq(b),
            bin: block::bin(b),
            flags: block::flags(b),
            mate_rindex: block::mate_rindex(b),
            mate_zpos: block::mate_zpos(b),
            isize_value: block::isize_(b),
            qname: self.qname().to_string(),
            cigar: cigar_units,
            seq: seq::unpack_seq(&b[seq_off..qual_off], read_length),
            qual: b[qual_off..aux_off].to_vec(),
            aux: b[aux_off..].to_vec(),
        }
    }

    fn apply(&mut self, parts: Parts) -> Result<()> {
        let block = parts.rebuild()?;
        *self.block_mut() = block;
        Ok(())
    }

    // -- core fixed-width fields --------------------------------------

    pub fn rindex(&self) -> i32 {
        block::rindex(self.block())
    }

    pub fn set_rindex(&mut self, rindex: i32) {
        block::set_rindex(self.block_mut(), rindex);
    }

    pub fn zpos(&self) -> i32 {
        block::zpos(self.block())
    }

    pub fn set_zpos(&mut self, zpos: i32) {
        block::set_zpos(self.block_mut(), zpos);
    }

    pub fn mapq(&self) -> u8 {
        block::mapq(self.block())
    }

    pub fn set_mapq(&mut self, mapq: u8) {
        block::set_mapq(self.block_mut(), mapq);
    }

    pub fn bin(&self) -> u16 {
        block::bin(self.block())
    }

    pub fn flags(&self) -> u16 {
        block::flags(self.block())
    }

    pub fn set_flags(&mut self, flags: u16) {
        block::set_flags(self.block_mut(), flags);
    }

    pub fn read_length(&self) -> i32 {
        block::read_length(self.block())
    }

    pub fn mate_rindex(&self) -> i32 {
        block::mate_rindex(self.block())
    }

    pub fn set_mate_rindex(&mut self, rindex: i32) {
        block::set_mate_rindex(self.block_mut(), rindex);
    }

    pub fn mate_zpos(&self) -> i32 {
        block::mate_zpos(self.block())
    }

    pub fn set_mate_zpos(&mut self, zpos: i32) {
        block::set_mate_zpos(self.block_mut(), zpos);
    }

    pub fn isize(&self) -> i32 {
        block::isize_(self.block())
    }

    pub fn set_isize(&mut self, isize_value: i32) {
        block::set_isize(self.block_mut(), isize_value);
    }

    // -- flag predicates ------------------------------------------------

    pub fn is_paired(&self) -> bool {
        self.flags() & flags::PAIRED != 0
    }

    pub fn is_unmapped(&self) -> bool {
        self.flags() & flags::UNMAPPED != 0
    }

    pub fn is_reverse(&self) -> bool {
        self.flags() & flags::REVERSE_STRAND != 0
    }

    pub fn is_duplicate(&self) -> bool {
        self.flags() & flags::DUPLICATE != 0
    }

    // -- qname ------------------------------------------------------------

    pub fn qname(&self) -> &str {
        let b = self.block();
        let len = block::name_length(b) as usize;
        // name_length includes the trailing NUL.
        std::str::from_utf8(&b[block::CORE_SIZE..block::CORE_SIZE + len - 1]).unwrap_or("")
    }

    pub fn set_qname(&mut self, qname: &str) -> Result<()> {
        let mut parts = self.parts();
        parts.qname = qname.to_string();
        self.apply(parts)
    }

    // -- cigar --------------------------------------------------------

    pub fn cigar(&self) -> Vec<CigarUnit> {
        let b = self.block();
        let off = block::cigar_offset(b);
        let end = block::seq_offset(b);
        b[off..end]
            .chunks_exact(4)
            .map(|c| CigarUnit::from_packed(u32::from_le_bytes([c[0], c[1], c[2], c[3]])))
            .collect()
    }

    pub fn cigar_str(&self) -> String {
        cigar::format_cigar_str(&self.cigar())
    }

    pub fn set_cigar(&mut self, units: Vec<CigarUnit>) -> Result<()> {
        let mut parts = self.parts();
        parts.cigar = units;
        self.apply(parts)
    }

    pub fn set_cigar_str(&mut self, text: &str) -> Result<()> {
        let units = cigar::parse_cigar_str(text)?;
        self.set_cigar(units)
    }

    /// Reference-coordinate end of this alignment: `zpos + cigar_span`.
    /// Equal to `zpos` itself for an unmapped or cigar-less record.
    pub fn right_zpos(&self) -> i32 {
        self.zpos() + cigar::cigar_span(&self.cigar())
    }

    /// Recompute `bin` from the current `zpos`/cigar span. Must be called
    /// after any mutation to position or cigar before the record is
    /// written to an indexed BAM file.
    pub fn sync(&mut self) {
        let bin = cigar::calc_zbin(self.zpos(), self.right_zpos().max(self.zpos() + 1));
        block::set_bin(self.block_mut(), bin);
    }

    // -- sequence / quality ---------------------------------------------

    pub fn unpacked_seq(&self) -> String {
        let b = self.block();
        let off = block::seq_offset(b);
        let end = block::qual_offset(b);
        seq::unpack_seq(&b[off..end], block::read_length(b) as usize)
    }

    pub fn qual(&self) -> &[u8] {
        let b = self.block();
        &b[block::qual_offset(b)..block::aux_offset(b)]
    }

    pub fn set_seq_qual(&mut self, seq: &str, qual: Vec<u8>) -> Result<()> {
        let mut parts = self.parts();
        parts.seq = seq.to_string();
        parts.qual = qual;
        self.apply(parts)
    }

    // -- aux fields -------------------------------------------------------

    pub fn aux_iter(&self) -> aux::AuxIter<'_> {
        let b = self.block();
        aux::AuxIter::new(&b[block::aux_offset(b)..])
    }

    pub fn aux(&self, tag: [u8; 2]) -> Option<AuxValue> {
        let b = self.block();
        let region = &b[block::aux_offset(b)..];
        let (offset, len) = aux::find_field(region, tag)?;
        aux::decode_field(&region[offset..offset + len]).ok().map(|(f, _)| f.value)
    }

    /// Insert or replace an aux field by tag, growing or shrinking the
    /// block's tail region in place via `Vec::splice`.
    pub fn set_aux(&mut self, tag: [u8; 2], value: AuxValue) {
        let encoded = aux::encode_field(&AuxField { tag, value });
        let b = self.block_mut();
        let aux_off = block::aux_offset(b);
        let region = &b[aux_off..];
        let existing = aux::find_field(region, tag);
        let payload_delta: i32;
        match existing {
            Some((offset, len)) => {
                payload_delta = encoded.len() as i32 - len as i32;
                let start = aux_off + offset;
                let end = start + len;
                b.splice(start..end, encoded);
            }
            None => {
                payload_delta = encoded.len() as i32;
                b.splice(b.len()..b.len(), encoded);
            }
        }
        let new_rest_length = block::rest_length(b) + payload_delta;
        crate::bytes::write_i32_le(b, block::REST_LENGTH, new_rest_length);
    }

    /// Remove an aux field by tag, if present.
    pub fn erase_aux(&mut self, tag: [u8; 2]) {
        let b = self.block_mut();
        let aux_off = block::aux_offset(b);
        let region = &b[aux_off..];
        if let Some((offset, len)) = aux::find_field(region, tag) {
            let start = aux_off + offset;
            let end = start + len;
            b.splice(start..end, std::iter::empty());
            let new_rest_length = block::rest_length(b) - len as i32;
            crate::bytes::write_i32_le(b, block::REST_LENGTH, new_rest_length);
        }
    }
}
