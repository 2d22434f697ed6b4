// In-memory SAM/BAM alignment model, plus SAM/BGZF-BAM/gzipped-SAM codecs

pub mod bam;
pub mod bgzf;
pub mod bytes;
pub mod error;
pub mod header;
pub mod itree;
pub mod linebuf;
pub mod rawio;
pub mod record;
pub mod sam;
pub mod stream;

// ─────────────────────────────────────────────────────────────────────────────
// Top-level convenience re-exports for the most common entry points.
// ─────────────────────────────────────────────────────────────────────────────

/// A single alignment record (component C7, spec.md §4.7).
pub use record::Alignment;
/// The crate's error type and its `Result` alias (spec.md §7).
pub use error::{Result, SamError};
/// Auto-detecting reader over SAM, gzipped SAM, or BAM (spec.md §4.10).
pub use stream::InputStream;
/// Writer for a chosen one of SAM, gzipped SAM, or BAM (spec.md §4.10).
pub use stream::OutputStream;

// ─────────────────────────────────────────────────────────────────────────────
// Header model (component C5, spec.md §4.5)
// ─────────────────────────────────────────────────────────────────────────────

/// A SAM header (`@HD`/`@SQ`/`@RG`/...) plus the reference sequences and
/// read groups parsed out of it.
pub use header::Collection;
/// A single `@XY\t...` header line.
pub use header::Header;
/// One `@RG` read-group entry.
pub use header::ReadGroup;
/// One `@SQ` reference-sequence entry.
pub use header::RefSequence;

// ─────────────────────────────────────────────────────────────────────────────
// Interval tree (component C6, spec.md §4.6)
// ─────────────────────────────────────────────────────────────────────────────

/// A half-open `[zstart, zlimit)` interval.
pub use itree::Interval;
/// A single sequence's augmented red-black interval tree.
pub use itree::IntervalTree;
/// Per-reference-name collection of `IntervalTree`s.
pub use itree::IntervalMultimap;
/// A `"NAME:START-END"`-style region, parsed or formatted.
pub use itree::SeqRegion;

// ─────────────────────────────────────────────────────────────────────────────
// Stream format detection (component C10, spec.md §4.10)
// ─────────────────────────────────────────────────────────────────────────────

pub use stream::Format;

// ─────────────────────────────────────────────────────────────────────────────
// SAM text codec (component C8, spec.md §4.8)
// ─────────────────────────────────────────────────────────────────────────────

pub use sam::{format_record, parse_fields, parse_record};

// ─────────────────────────────────────────────────────────────────────────────
// BAM binary codec (component C9, spec.md §4.9)
// ─────────────────────────────────────────────────────────────────────────────

pub use bam::{decode_header, decode_record, encode_header, encode_record};

// ─────────────────────────────────────────────────────────────────────────────
// BGZF container (component C3, spec.md §4.3)
// ─────────────────────────────────────────────────────────────────────────────

pub use bgzf::{BgzfReader, BgzfWriter};
