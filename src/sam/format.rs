//! [`Alignment`] -> SAM text line (spec.md §4.8).

use crate::header::Collection;
use crate::record::{aux, seq, Alignment};

/// Format one alignment as a tab-delimited SAM line (no trailing
/// newline), resolving `RNAME`/`RNEXT` against `collection`.
pub fn format_record(a: &Alignment, collection: &Collection) -> String {
    let rname = refname(a.rindex(), collection);
    let rnext = if a.mate_rindex() == -1 {
        "*".to_string()
    } else if a.mate_rindex() == a.rindex() {
        "=".to_string()
    } else {
        refname(a.mate_rindex(), collection)
    };

    let seq_text = {
        let s = a.unpacked_seq();
        if s.is_empty() {
            "*".to_string()
        } else {
            s
        }
    };
    let qual_text = seq::format_qual(a.qual());

    let mut fields = vec![
        a.qname().to_string(),
        a.flags().to_string(),
        rname,
        (a.zpos() + 1).to_string(),
        a.mapq().to_string(),
        a.cigar_str(),
        rnext,
        (a.mate_zpos() + 1).to_string(),
        a.isize().to_string(),
        seq_text,
        qual_text,
    ];

    for field in a.aux_iter() {
        if let Ok(field) = field {
            fields.push(aux::format_aux_text(&field));
        }
    }

    fields.join("\t")
}

fn refname(rindex: i32, collection: &Collection) -> String {
    if rindex == -1 {
        return "*".to_string();
    }
    collection
        .findseq_by_index(rindex)
        .map(|r| r.name().to_string())
        .unwrap_or_else(|_| "*".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::ADD_ALL;
    use crate::sam::parse::parse_record;

    fn collection_with_chr1() -> Collection {
        let c = Collection::new();
        c.push_back("@SQ\tSN:chr1\tLN:1000", ADD_ALL).unwrap();
        c
    }

    #[test]
    fn roundtrips_through_parse() {
        let c = collection_with_chr1();
        let line = "read1\t0\tchr1\t100\t60\t10M\t*\t0\t0\tACGTACGTAC\tIIIIIIIIII\tNM:i:1";
        let a = parse_record(line, &c).unwrap();
        assert_eq!(format_record(&a, &c), line);
    }

    #[test]
    fn unmapped_roundtrips_to_star_fields() {
        let c = collection_with_chr1();
        let line = "read1\t4\t*\t0\t0\t*\t*\t0\t0\t*\t*";
        let a = parse_record(line, &c).unwrap();
        assert_eq!(format_record(&a, &c), line);
    }

    #[test]
    fn same_reference_mate_formats_as_equals() {
        let c = collection_with_chr1();
        let line = "read1\t1\tchr1\t100\t60\t10M\t=\t200\t100\tACGTACGTAC\t*";
        let a = parse_record(line, &c).unwrap();
        assert_eq!(format_record(&a, &c), line);
    }
}
