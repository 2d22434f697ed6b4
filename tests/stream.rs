//! End-to-end stream façade scenarios (spec.md §4.10, §5, §8).

use std::io::Cursor;

use samlib::header::ADD_ALL;
use samlib::{Collection, Format, InputStream, OutputStream};

#[test]
fn auto_detects_plain_sam_from_content_alone() {
    let text = b"@HD\tVN:1.6\nread1\t4\t*\t0\t0\t*\t*\t0\t0\t*\t*\n".to_vec();
    let mut input = InputStream::from_reader(Cursor::new(text)).unwrap();
    let rec = input.next_record().unwrap().unwrap();
    assert_eq!(rec.qname(), "read1");
    assert!(rec.is_unmapped());
}

#[test]
fn auto_detects_bam_from_content_regardless_of_filename() {
    let collection = Collection::new();
    collection.push_back("@SQ\tSN:chr1\tLN:1000", ADD_ALL).unwrap();

    let dir = tempfile::tempdir().unwrap();
    // Deliberately a ".dat" extension: detection must come from the BGZF
    // magic bytes, not the filename.
    let path = dir.path().join("out.dat");
    let out = OutputStream::create(&path, Format::Bam, collection).unwrap();
    out.finish().unwrap();

    let input = InputStream::open(&path).unwrap();
    assert_eq!(input.collection().refseq_count(), 1);
}

#[test]
fn stream_stays_at_a_clean_eof_once_reached() {
    let text = b"read1\t4\t*\t0\t0\t*\t*\t0\t0\t*\t*\n".to_vec();
    let mut input = InputStream::from_reader(Cursor::new(text)).unwrap();
    assert!(input.next_record().unwrap().is_some());
    assert!(input.next_record().unwrap().is_none());
    // Still a clean `None`, not an error, on a second read past EOF.
    assert!(input.next_record().unwrap().is_none());
}

#[test]
fn header_is_fully_parsed_before_the_first_record_is_returned() {
    let text = b"@HD\tVN:1.6\n@SQ\tSN:chr1\tLN:1000\n@SQ\tSN:chr2\tLN:2000\nread1\t0\tchr2\t5\t60\t4M\t*\t0\t0\tACGT\tIIII\n".to_vec();
    let mut input = InputStream::from_reader(Cursor::new(text)).unwrap();
    assert_eq!(input.collection().refseq_count(), 2);

    let rec = input.next_record().unwrap().unwrap();
    assert_eq!(rec.rindex(), 1);
}

#[test]
fn writing_then_reading_back_preserves_header_and_record_order() {
    let collection = Collection::new();
    collection.push_back("@SQ\tSN:chr1\tLN:1000", ADD_ALL).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.sam");
    let mut out = OutputStream::create(&path, Format::Sam, collection.clone()).unwrap();
    for name in ["first", "second", "third"] {
        let mut a = samlib::Alignment::new();
        a.set_qname(name).unwrap();
        a.set_flags(samlib::record::flags::UNMAPPED);
        a.set_rindex(-1);
        a.set_zpos(-1);
        a.set_cindex(collection.cindex());
        a.sync();
        out.write_record(&a).unwrap();
    }
    out.finish().unwrap();

    let mut input = InputStream::open(&path).unwrap();
    let names: Vec<String> = std::iter::from_fn(|| input.next_record().unwrap().map(|a| a.qname().to_string()))
        .collect();
    assert_eq!(names, vec!["first", "second", "third"]);
}

#[test]
fn extension_based_detection_matches_content_based_detection_for_bam() {
    assert_eq!(samlib::stream::detect_from_extension("out.bam"), Some(Format::Bam));
}
