//! End-to-end header/collection scenarios (spec.md §3, §4.5, §8).

use samlib::header::{ADD_ALL, ADD_HEADER};
use samlib::{Collection, Header};

#[test]
fn collection_builds_name_and_index_lookup_from_sq_lines() {
    let c = Collection::new();
    c.push_back("@HD\tVN:1.6\tSO:coordinate", ADD_ALL).unwrap();
    c.push_back("@SQ\tSN:chr1\tLN:249250621", ADD_ALL).unwrap();
    c.push_back("@SQ\tSN:chr2\tLN:243199373", ADD_ALL).unwrap();
    c.push_back("@RG\tID:rg1\tSM:sample-a\tLB:lib1", ADD_HEADER).unwrap();

    assert_eq!(c.refseq_count(), 2);
    let chr2 = c.findseq_by_name("chr2").unwrap();
    assert_eq!(chr2.index(), 1);
    assert_eq!(chr2.length(), 243199373);

    // Collection identity invariant (spec.md §8).
    assert_eq!(c.findseq_by_index(chr2.index()).unwrap().name(), "chr2");
    assert_eq!(c.findseq_by_name("*").unwrap().index(), -1);
    assert_eq!(c.findseq_by_index(-1).unwrap().name(), "*");

    let rg = c.findgroup("rg1").unwrap();
    assert_eq!(rg.extra("SM"), Some("sample-a"));
}

#[test]
fn duplicate_reference_name_is_rejected_as_bad_format() {
    let c = Collection::new();
    c.push_back("@SQ\tSN:chr1\tLN:100", ADD_ALL).unwrap();
    let err = c.push_back("@SQ\tSN:chr1\tLN:200", ADD_ALL).unwrap_err();
    assert!(err.is_bad_format());
    // The first insertion must survive a rejected second one.
    assert_eq!(c.refseq_count(), 1);
}

#[test]
fn unknown_reference_name_lookup_is_bad_format() {
    let c = Collection::new();
    c.push_back("@SQ\tSN:chr1\tLN:100", ADD_ALL).unwrap();
    assert!(c.findseq_by_name("chrZ").is_err());
}

#[test]
fn header_field_order_is_preserved_and_duplicate_tags_resolve_to_the_first() {
    let h = Header::parse("CO", &["XX:one", "YY:two", "XX:three"]).unwrap();
    assert_eq!(h.field::<String>("XX").unwrap(), "one");
    let tags: Vec<&str> = h.fields().map(|(t, _)| t).collect();
    assert_eq!(tags, vec!["XX", "YY", "XX"]);
}

#[test]
fn header_text_round_trips_through_the_collection() {
    let c = Collection::new();
    c.push_back("@HD\tVN:1.6", ADD_ALL).unwrap();
    c.push_back("@SQ\tSN:chr1\tLN:1000", ADD_ALL).unwrap();
    assert_eq!(c.text(), "@HD\tVN:1.6\n@SQ\tSN:chr1\tLN:1000");
}

#[test]
fn reallocate_resets_indices_but_keeps_the_same_cindex_for_existing_handles() {
    let c = Collection::new();
    let cindex = c.cindex();
    c.push_back("@SQ\tSN:chr1\tLN:1000", ADD_ALL).unwrap();
    assert_eq!(c.refseq_count(), 1);

    c.reallocate();
    assert_eq!(c.cindex(), cindex);
    assert_eq!(c.refseq_count(), 0);

    c.push_back("@SQ\tSN:chr9\tLN:1", ADD_ALL).unwrap();
    assert_eq!(c.findseq_by_name("chr9").unwrap().index(), 0);
}
