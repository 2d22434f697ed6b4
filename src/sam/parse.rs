//! SAM text line -> [`Alignment`] (spec.md §4.8).

use crate::error::{Result, SamError};
use crate::header::Collection;
use crate::record::{aux, cigar, flags, seq, Alignment};

/// Parse one tab-delimited SAM record line (no trailing newline) against
/// `collection` for `RNAME`/`RNEXT` resolution.
pub fn parse_record(line: &str, collection: &Collection) -> Result<Alignment> {
    let fields: Vec<&str> = line.split('\t').collect();
    parse_fields(&fields, collection)
}

/// Parse an already-tab-split SAM record (as produced by
/// [`crate::linebuf::LineBuffer`], which splits on tabs in place rather
/// than handing back a single delimited string).
pub fn parse_fields(fields: &[&str], collection: &Collection) -> Result<Alignment> {
    if fields.len() < 11 {
        return Err(SamError::bad_format(
            "SAM record has fewer than the 11 mandatory fields",
        ));
    }

    let qname = fields[0];
    let flag = flags::parse_flags(fields[1])
        .ok_or_else(|| SamError::bad_format(format!("malformed FLAG field \"{}\"", fields[1])))?;
    let rname = fields[2];
    let pos: i64 = fields[3]
        .parse()
        .map_err(|_| SamError::bad_format(format!("malformed POS field \"{}\"", fields[3])))?;
    let mapq: u8 = fields[4]
        .parse()
        .map_err(|_| SamError::bad_format(format!("malformed MAPQ field \"{}\"", fields[4])))?;
    let cigar_text = fields[5];
    let rnext = fields[6];
    let pnext: i64 = fields[7]
        .parse()
        .map_err(|_| SamError::bad_format(format!("malformed PNEXT field \"{}\"", fields[7])))?;
    let tlen: i32 = fields[8]
        .parse()
        .map_err(|_| SamError::bad_format(format!("malformed TLEN field \"{}\"", fields[8])))?;
    let seq_text = fields[9];
    let qual_text = fields[10];

    let rindex = if rname == "*" {
        -1
    } else {
        collection.findseq_by_name(rname)?.index()
    };
    let mate_rindex = if rnext == "*" {
        -1
    } else if rnext == "=" {
        rindex
    } else {
        collection.findseq_by_name(rnext)?.index()
    };

    let seq_str = if seq_text == "*" { "" } else { seq_text };
    let qual = seq::parse_qual(qual_text, seq_str.len())?;
    // Validate the cigar text up front so a malformed field is reported
    // before any partial mutation of the record.
    cigar::parse_cigar_str(cigar_text)?;

    let mut a = Alignment::new();
    a.set_qname(qname)?;
    a.set_flags(flag);
    a.set_rindex(rindex);
    a.set_zpos(pos as i32 - 1);
    a.set_mapq(mapq);
    a.set_cigar_str(cigar_text)?;
    a.set_mate_rindex(mate_rindex);
    a.set_mate_zpos(pnext as i32 - 1);
    a.set_isize(tlen);
    a.set_seq_qual(seq_str, qual)?;
    a.set_cindex(collection.cindex());

    for field in &fields[11..] {
        let parsed = aux::parse_aux_text(field)?;
        a.set_aux(parsed.tag, parsed.value);
    }

    a.sync();
    Ok(a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::ADD_ALL;

    fn collection_with_chr1() -> Collection {
        let c = Collection::new();
        c.push_back("@SQ\tSN:chr1\tLN:1000", ADD_ALL).unwrap();
        c
    }

    #[test]
    fn parses_mandatory_fields() {
        let c = collection_with_chr1();
        let a = parse_record(
            "read1\t0\tchr1\t100\t60\t10M\t*\t0\t0\tACGTACGTAC\tIIIIIIIIII",
            &c,
        )
        .unwrap();
        assert_eq!(a.qname(), "read1");
        assert_eq!(a.flags(), 0);
        assert_eq!(a.rindex(), 0);
        assert_eq!(a.zpos(), 99);
        assert_eq!(a.mapq(), 60);
        assert_eq!(a.cigar_str(), "10M");
        assert_eq!(a.unpacked_seq(), "ACGTACGTAC");
    }

    #[test]
    fn equals_sign_rnext_means_same_reference() {
        let c = collection_with_chr1();
        let a = parse_record(
            "read1\t1\tchr1\t100\t60\t10M\t=\t200\t100\tACGTACGTAC\t*",
            &c,
        )
        .unwrap();
        assert_eq!(a.mate_rindex(), a.rindex());
        assert_eq!(a.mate_zpos(), 199);
    }

    #[test]
    fn star_rname_is_unmapped_reference() {
        let c = collection_with_chr1();
        let a = parse_record("read1\t4\t*\t0\t0\t*\t*\t0\t0\t*\t*", &c).unwrap();
        assert_eq!(a.rindex(), -1);
        assert_eq!(a.zpos(), -1);
        assert_eq!(a.unpacked_seq(), "");
        assert_eq!(a.qual(), &[0xFFu8; 0][..]);
    }

    #[test]
    fn aux_fields_are_parsed() {
        let c = collection_with_chr1();
        let a = parse_record(
            "read1\t0\tchr1\t100\t60\t10M\t*\t0\t0\tACGTACGTAC\tIIIIIIIIII\tNM:i:1\tXZ:Z:hi",
            &c,
        )
        .unwrap();
        assert_eq!(a.aux(*b"NM"), Some(crate::record::AuxValue::Int(1)));
        assert_eq!(
            a.aux(*b"XZ"),
            Some(crate::record::AuxValue::String("hi".to_string()))
        );
    }

    #[test]
    fn too_few_fields_is_rejected() {
        let c = collection_with_chr1();
        assert!(parse_record("read1\t0\tchr1", &c).is_err());
    }

    #[test]
    fn unknown_reference_name_is_rejected() {
        let c = collection_with_chr1();
        assert!(parse_record(
            "read1\t0\tchrX\t100\t60\t10M\t*\t0\t0\tACGTACGTAC\tIIIIIIIIII",
            &c
        )
        .is_err());
    }
}
