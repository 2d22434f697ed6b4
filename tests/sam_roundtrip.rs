//! End-to-end SAM text round-trip scenarios (spec.md §8).

use samlib::header::{Collection, ADD_ALL};
use samlib::record::AuxValue;
use samlib::{format_record, parse_record};

fn collection_with_chr1() -> Collection {
    let c = Collection::new();
    c.push_back("@HD\tVN:1.6", ADD_ALL).unwrap();
    c.push_back("@SQ\tSN:chr1\tLN:1000", ADD_ALL).unwrap();
    c
}

#[test]
fn mapped_record_round_trips() {
    let c = collection_with_chr1();
    let line = "read1\t0\tchr1\t100\t60\t10M\t*\t0\t0\tACGTACGTAC\tIIIIIIIIII";
    let a = parse_record(line, &c).unwrap();
    assert_eq!(format_record(&a, &c), line);
}

#[test]
fn unmapped_record_round_trips_with_star_fields() {
    let c = collection_with_chr1();
    let line = "foo\t37\t*\t0\t0\t*\t*\t0\t0\tATGC\t????\tNM:i:4";
    let a = parse_record(line, &c).unwrap();

    assert_eq!(a.qname(), "foo");
    assert_eq!(a.flags(), 37);
    assert_eq!(a.rindex(), -1);
    assert_eq!(a.zpos(), -1);
    assert_eq!(a.read_length(), 4);
    assert_eq!(a.unpacked_seq(), "ATGC");
    assert_eq!(a.aux(*b"NM"), Some(AuxValue::Int(4)));

    assert_eq!(format_record(&a, &c), line);
}

#[test]
fn mate_on_same_reference_round_trips_through_equals_sign() {
    let c = collection_with_chr1();
    let line = "read1\t99\tchr1\t100\t60\t10M\t=\t150\t60\tACGTACGTAC\tIIIIIIIIII";
    let a = parse_record(line, &c).unwrap();
    assert_eq!(a.mate_rindex(), a.rindex());
    assert_eq!(format_record(&a, &c), line);
}

#[test]
fn aux_fields_round_trip_in_insertion_order() {
    let c = collection_with_chr1();
    let line = "read1\t0\tchr1\t100\t60\t10M\t*\t0\t0\tACGTACGTAC\tIIIIIIIIII\tXS:Z:carrot\tXI:i:37";
    let a = parse_record(line, &c).unwrap();
    assert_eq!(format_record(&a, &c), line);
}

#[test]
fn computed_bin_matches_the_smallest_ucsc_bin_for_a_short_alignment() {
    let c = collection_with_chr1();
    let a = parse_record("read1\t0\tchr1\t1\t60\t4M\t*\t0\t0\tATGC\t????", &c).unwrap();
    assert_eq!(a.bin(), samlib::record::cigar::calc_zbin(0, 4));
}
