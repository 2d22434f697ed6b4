//! Output side of the stream façade (spec.md §4.10): write a header once,
//! then alignments one at a time, in whichever of SAM / gzipped SAM / BAM
//! the caller picked.

use std::io::Write;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::bam;
use crate::bgzf::BgzfWriter;
use crate::error::{Result, SamError};
use crate::header::Collection;
use crate::rawio::{OpenMode, RawFile};
use crate::record::Alignment;
use crate::sam;

use super::detect::Format;
use super::io_adapt::RawFileIo;

enum Body {
    Sam(Box<dyn Write>),
    SamGz(GzEncoder<Box<dyn Write>>),
    Bam(BgzfWriter<Box<dyn Write>>),
}

fn io_err(e: std::io::Error) -> SamError {
    SamError::system("write", e.raw_os_error(), None)
}

/// A writable SAM/BAM/gzipped-SAM stream, bound to the header it was
/// opened with.
pub struct OutputStream {
    collection: Collection,
    body: Body,
}

impl OutputStream {
    /// Create `path` and write its header in `format`.
    pub fn create(path: &Path, format: Format, collection: Collection) -> Result<Self> {
        let raw = RawFile::open(path, OpenMode::Write, 0o644, false)?;
        Self::from_writer(RawFileIo::new(raw), format, collection)
    }

    /// Create from an already-constructed writer (used by tests and by
    /// callers composing their own byte sink).
    pub fn from_writer<W: Write + 'static>(
        writer: W,
        format: Format,
        collection: Collection,
    ) -> Result<Self> {
        let boxed: Box<dyn Write> = Box::new(writer);
        let body = match format {
            Format::Sam => {
                let mut w = boxed;
                write_sam_header(&mut w, &collection)?;
                Body::Sam(w)
            }
            Format::SamGz => {
                let mut enc = GzEncoder::new(boxed, Compression::default());
                write_sam_header(&mut enc, &collection)?;
                Body::SamGz(enc)
            }
            Format::Bam => {
                let mut w = BgzfWriter::new(boxed);
                bam::encode_header(&mut w, &collection)?;
                Body::Bam(w)
            }
        };
        Ok(OutputStream { collection, body })
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    /// Write one alignment record.
    pub fn write_record(&mut self, alignment: &Alignment) -> Result<()> {
        match &mut self.body {
            Body::Sam(w) => write_sam_line(w, alignment, &self.collection),
            Body::SamGz(w) => write_sam_line(w, alignment, &self.collection),
            Body::Bam(w) => bam::encode_record(w, alignment),
        }
    }

    /// Flush any buffered data and, for BAM/gzip, write the trailing
    /// container footer. Must be called (rather than relying only on
    /// `Drop`) to observe I/O errors from the final flush.
    pub fn finish(self) -> Result<()> {
        match self.body {
            Body::Sam(mut w) => w.flush().map_err(io_err),
            Body::SamGz(enc) => enc.finish().map(|_| ()).map_err(io_err),
            Body::Bam(w) => w.finish().map(|_| ()).map_err(io_err),
        }
    }
}

fn write_sam_header<W: Write>(w: &mut W, collection: &Collection) -> Result<()> {
    let text = collection.text();
    if text.is_empty() {
        return Ok(());
    }
    w.write_all(text.as_bytes()).map_err(io_err)?;
    w.write_all(b"\n").map_err(io_err)
}

fn write_sam_line<W: Write>(w: &mut W, alignment: &Alignment, collection: &Collection) -> Result<()> {
    let line = sam::format_record(alignment, collection);
    w.write_all(line.as_bytes()).map_err(io_err)?;
    w.write_all(b"\n").map_err(io_err)
}
