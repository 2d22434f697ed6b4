//! The BAM header block (spec.md §4.9): `"BAM\1"` magic, the verbatim SAM
//! header text, then a redundant binary reference-sequence list used for
//! fast random access without re-parsing the text.

use std::io::{Read, Write};

use crate::error::{Result, SamError};
use crate::header::{self, Collection};

const MAGIC: &[u8; 4] = b"BAM\x01";

fn io_err(e: std::io::Error) -> SamError {
    SamError::system("read", e.raw_os_error(), None)
}

/// Decode the header block from the start of a BAM stream (after BGZF
/// decompression), returning the populated [`Collection`].
pub fn decode_header<R: Read>(reader: &mut R) -> Result<Collection> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic).map_err(io_err)?;
    if &magic != MAGIC {
        return Err(SamError::bad_format("not a BAM stream (bad magic)"));
    }

    let l_text = read_u32(reader)? as usize;
    let mut text_buf = vec![0u8; l_text];
    reader.read_exact(&mut text_buf).map_err(io_err)?;
    let text = String::from_utf8_lossy(&text_buf).into_owned();

    let collection = Collection::new();
    for line in text.lines() {
        if !line.is_empty() {
            collection.push_back(line, header::ADD_HEADER)?;
        }
    }

    let n_ref = read_u32(reader)?;
    for _ in 0..n_ref {
        let l_name = read_u32(reader)? as usize;
        let mut name_buf = vec![0u8; l_name];
        reader.read_exact(&mut name_buf).map_err(io_err)?;
        if l_name == 0 || name_buf[l_name - 1] != 0 {
            return Err(SamError::bad_format("BAM reference name is not NUL-terminated"));
        }
        let name = String::from_utf8_lossy(&name_buf[..l_name - 1]).into_owned();
        let l_ref = read_u32(reader)? as i32;
        let line = format!("@SQ\tSN:{}\tLN:{}", name, l_ref);
        collection.push_back(&line, header::ADD_REFSEQ | header::ADD_REFNAME)?;
    }

    Ok(collection)
}

/// Encode the header block for `collection` to a BAM stream (before BGZF
/// compression).
pub fn encode_header<W: Write>(writer: &mut W, collection: &Collection) -> Result<()> {
    writer.write_all(MAGIC).map_err(io_err)?;

    let mut text = collection.text();
    if !text.is_empty() {
        text.push('\n');
    }
    let text_bytes = text.as_bytes();
    write_u32(writer, text_bytes.len() as u32)?;
    writer.write_all(text_bytes).map_err(io_err)?;

    let refseqs = collection.refseqs();
    write_u32(writer, refseqs.len() as u32)?;
    for r in &refseqs {
        let name_bytes = r.name().as_bytes();
        write_u32(writer, (name_bytes.len() + 1) as u32)?;
        writer.write_all(name_bytes).map_err(io_err)?;
        writer.write_all(&[0]).map_err(io_err)?;
        write_u32(writer, r.length() as u32)?;
    }
    Ok(())
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf).map_err(io_err)?;
    Ok(u32::from_le_bytes(buf))
}

fn write_u32<W: Write>(writer: &mut W, value: u32) -> Result<()> {
    writer.write_all(&value.to_le_bytes()).map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::ADD_ALL;

    #[test]
    fn header_roundtrip() {
        let c = Collection::new();
        c.push_back("@HD\tVN:1.6\tSO:coordinate", ADD_ALL).unwrap();
        c.push_back("@SQ\tSN:chr1\tLN:1000", ADD_ALL).unwrap();
        c.push_back("@SQ\tSN:chr2\tLN:2000", ADD_ALL).unwrap();

        let mut buf = Vec::new();
        encode_header(&mut buf, &c).unwrap();

        let decoded = decode_header(&mut &buf[..]).unwrap();
        assert_eq!(decoded.refseq_count(), 2);
        assert_eq!(decoded.findseq_by_name("chr2").unwrap().length(), 2000);
        assert!(decoded.text().contains("@HD"));
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut buf = b"NOPE".to_vec();
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        assert!(decode_header(&mut &buf[..]).is_err());
    }
}
