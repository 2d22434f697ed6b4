//! Input side of the stream façade (spec.md §4.10): open a path, detect
//! its format from content, and hand back alignments one at a time
//! against the header [`Collection`] it parsed.

use std::io::Read;
use std::path::Path;

use crate::bam;
use crate::bgzf::BgzfReader;
use crate::error::Result;
use crate::header::{self, Collection};
use crate::linebuf::LineBuffer;
use crate::rawio::{OpenMode, RawFile};
use crate::record::Alignment;
use crate::sam;

use super::detect::{detect_from_peek, Format};
use super::io_adapt::{PrefixReader, RawFileIo};

enum Body {
    Text(LineBuffer<Box<dyn Read>>),
    Bam(BgzfReader<Box<dyn Read>>),
}

/// A readable SAM/BAM/gzipped-SAM stream plus the header it parsed on open.
pub struct InputStream {
    collection: Collection,
    body: Body,
    fields: Vec<usize>,
}

impl InputStream {
    /// Open `path`, peeking its first bytes to detect BAM / gzipped SAM /
    /// plain SAM regardless of its extension, and parse its header.
    pub fn open(path: &Path) -> Result<Self> {
        let raw = RawFile::open(path, OpenMode::Read, 0o644, false)?;
        Self::from_reader(RawFileIo::new(raw))
    }

    /// Open from an already-constructed reader (used by tests and by
    /// callers composing their own byte source).
    pub fn from_reader<R: Read + 'static>(mut inner: R) -> Result<Self> {
        let mut peek = [0u8; 16];
        let mut n = 0;
        while n < peek.len() {
            let got = inner
                .read(&mut peek[n..])
                .map_err(|e| crate::error::SamError::system("read", e.raw_os_error(), None))?;
            if got == 0 {
                break;
            }
            n += got;
        }
        let format = detect_from_peek(&peek[..n]);
        let boxed: Box<dyn Read> = Box::new(PrefixReader::new(peek[..n].to_vec(), inner));

        match format {
            Format::Bam => {
                let mut reader = BgzfReader::new(boxed);
                let collection = bam::decode_header(&mut reader)?;
                Ok(InputStream {
                    collection,
                    body: Body::Bam(reader),
                    fields: Vec::new(),
                })
            }
            Format::SamGz => {
                let gz: Box<dyn Read> = Box::new(flate2::read::GzDecoder::new(boxed));
                let mut lb = LineBuffer::new(gz);
                let collection = Collection::new();
                Self::read_header_lines(&mut lb, &collection)?;
                Ok(InputStream {
                    collection,
                    body: Body::Text(lb),
                    fields: Vec::new(),
                })
            }
            Format::Sam => {
                let mut lb = LineBuffer::new(boxed);
                let collection = Collection::new();
                Self::read_header_lines(&mut lb, &collection)?;
                Ok(InputStream {
                    collection,
                    body: Body::Text(lb),
                    fields: Vec::new(),
                })
            }
        }
    }

    fn read_header_lines(lb: &mut LineBuffer<Box<dyn Read>>, collection: &Collection) -> Result<()> {
        let mut fields = Vec::new();
        loop {
            match lb.peek()? {
                Some(b'@') => {}
                _ => break,
            }
            let start = match lb.getline(&mut fields)? {
                Some(s) => s,
                None => break,
            };
            let mut parts = vec![to_str(lb.field(start))];
            for &off in &fields {
                parts.push(to_str(lb.field(off)));
            }
            collection.push_back(&parts.join("\t"), header::ADD_ALL)?;
        }
        Ok(())
    }

    /// The header this stream parsed on open.
    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    /// Read the next alignment record, or `Ok(None)` at a clean end of
    /// stream.
    pub fn next_record(&mut self) -> Result<Option<Alignment>> {
        match &mut self.body {
            Body::Bam(reader) => bam::decode_record(reader, self.collection.cindex()),
            Body::Text(lb) => {
                let start = match lb.getline(&mut self.fields)? {
                    Some(s) => s,
                    None => return Ok(None),
                };
                let mut parts = vec![to_str(lb.field(start))];
                for &off in &self.fields {
                    parts.push(to_str(lb.field(off)));
                }
                let alignment = sam::parse_fields(&parts, &self.collection)?;
                Ok(Some(alignment))
            }
        }
    }
}

fn to_str(bytes: &[u8]) -> &str {
    std::str::from_utf8(bytes).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_plain_sam_header_and_records() {
        let text = b"@HD\tVN:1.6\n@SQ\tSN:chr1\tLN:1000\nread1\t0\tchr1\t100\t60\t10M\t*\t0\t0\tACGTACGTAC\tIIIIIIIIII\n".to_vec();
        let mut input = InputStream::from_reader(Cursor::new(text)).unwrap();
        assert_eq!(input.collection().refseq_count(), 1);

        let rec = input.next_record().unwrap().unwrap();
        assert_eq!(rec.qname(), "read1");
        assert!(input.next_record().unwrap().is_none());
    }

    #[test]
    fn reads_gzipped_sam() {
        use std::io::Write;
        let text = b"@HD\tVN:1.6\nread1\t4\t*\t0\t0\t*\t*\t0\t0\t*\t*\n";
        let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(text).unwrap();
        let gz_bytes = encoder.finish().unwrap();

        let mut input = InputStream::from_reader(Cursor::new(gz_bytes)).unwrap();
        let rec = input.next_record().unwrap().unwrap();
        assert_eq!(rec.qname(), "read1");
        assert!(input.next_record().unwrap().is_none());
    }
}
