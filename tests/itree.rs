//! End-to-end interval-tree query scenarios (spec.md §8 scenario 2).

use samlib::{Interval, IntervalMultimap, IntervalTree, SeqRegion};

#[test]
fn scenario_2_query_matches_the_exact_expected_set() {
    let raw = [
        (16, 22),
        (8, 10),
        (15, 24),
        (5, 9),
        (25, 31),
        (17, 20),
        (19, 21),
        (6, 11),
        (26, 27),
        (1, 4),
    ];
    let mut tree = IntervalTree::new();
    for (i, &(a, b)) in raw.iter().enumerate() {
        tree.insert(Interval::new(a, b), i);
    }

    let mut got: Vec<(i32, i32)> = tree
        .intersecting(Interval::new(12, 20))
        .map(|(iv, _)| (iv.zstart, iv.zlimit))
        .collect();
    got.sort();

    let mut want = vec![(15, 24), (16, 22), (17, 20), (19, 21), (6, 11)];
    want.sort();
    assert_eq!(got, want);
}

#[test]
fn multimap_scopes_intervals_by_sequence_name() {
    let mut mm: IntervalMultimap<&str> = IntervalMultimap::new();
    mm.insert("chr1", Interval::new(100, 200), "gene-a");
    mm.insert("chr1", Interval::new(500, 600), "gene-b");
    mm.insert("chr2", Interval::new(100, 200), "gene-c");

    let hits: Vec<&str> = mm
        .intersecting("chr1", Interval::new(150, 160))
        .map(|(_, v)| *v)
        .collect();
    assert_eq!(hits, vec!["gene-a"]);

    assert_eq!(mm.intersecting("chr3", Interval::new(0, 10)).count(), 0);
    assert_eq!(mm.len(), 3);
}

#[test]
fn region_strings_parse_and_roundtrip_through_the_multimap() {
    let region = SeqRegion::parse("chr1:1000-2000").unwrap();
    assert_eq!(region.name, "chr1");

    let mut mm: IntervalMultimap<&str> = IntervalMultimap::new();
    mm.insert(&region.name, region.interval, "feature");

    let hits: Vec<&str> = mm
        .intersecting("chr1", Interval::new(1500, 1501))
        .map(|(_, v)| *v)
        .collect();
    assert_eq!(hits, vec!["feature"]);
}
