//! Stream format auto-detection (spec.md §4.10): a 16-byte peek at the
//! start of a stream is enough to tell BAM, gzipped SAM, and plain SAM
//! apart, mirroring `samstream_base::sambamio::new_in`'s dispatch.

use crate::bgzf;

/// The three physical encodings this crate's stream layer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Sam,
    SamGz,
    Bam,
}

/// Classify a stream from its first bytes (16 or more needed to be
/// certain about BAM; fewer than that is never mistaken for BAM or
/// gzipped SAM).
pub fn detect_from_peek(peek: &[u8]) -> Format {
    if peek.len() >= 2 && peek[0] == 0x1f && peek[1] == 0x8b {
        if bgzf::looks_like_bgzf(peek) {
            Format::Bam
        } else {
            Format::SamGz
        }
    } else {
        Format::Sam
    }
}

/// Classify a stream purely from its filename, for callers (like the
/// output side) that have no content to peek at yet. Matches case
/// insensitively (`.BAM`, `.Sam.GZ`, ...); safe on arbitrary UTF-8 paths
/// since it lowercases the whole string rather than indexing into it.
pub fn detect_from_extension(path: &str) -> Option<Format> {
    let lower = path.to_lowercase();
    if lower.ends_with(".bam") {
        Some(Format::Bam)
    } else if lower.ends_with(".sam.gz") {
        Some(Format::SamGz)
    } else if lower.ends_with(".sam") {
        Some(Format::Sam)
    } else {
        None
    }
}
