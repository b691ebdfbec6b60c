// tests/unit_skiplist_test.rs

//! Unit tests for the span-carrying skip list: ordering, rank arithmetic,
//! range location and range deletion.

use bytes::Bytes;
use exzset::core::dict::Dict;
use exzset::core::score::MultiScore;
use exzset::core::skiplist::{LexRange, ScoreRange, ZSkipList};

fn score(text: &str) -> MultiScore {
    MultiScore::parse(text.as_bytes()).expect("valid score")
}

fn member(text: &str) -> Bytes {
    Bytes::copy_from_slice(text.as_bytes())
}

/// Builds a list plus the companion hash the range deletions require.
fn build(entries: &[(&str, &str)]) -> (ZSkipList, Dict<usize>) {
    let arity = entries
        .first()
        .map_or(1, |(s, _)| score(s).arity());
    let mut zsl = ZSkipList::new(arity);
    let mut dict = Dict::new();
    for (s, m) in entries {
        let idx = zsl.insert(score(s), member(m));
        assert!(dict.add(member(m), idx));
    }
    (zsl, dict)
}

fn members_in_order(zsl: &ZSkipList) -> Vec<String> {
    zsl.iter()
        .map(|(m, _)| String::from_utf8_lossy(m).into_owned())
        .collect()
}

#[test]
fn test_insert_orders_by_score_then_member() {
    let (zsl, _) = build(&[("2#1", "x"), ("1#9", "y"), ("1#1", "z"), ("1#1", "a")]);
    zsl.check_invariants();
    assert_eq!(members_in_order(&zsl), ["a", "z", "y", "x"]);
}

#[test]
fn test_spans_hold_after_many_inserts() {
    let mut zsl = ZSkipList::new(1);
    for i in 0..200 {
        zsl.insert(score(&format!("{}", i % 37)), member(&format!("m{i:03}")));
    }
    zsl.check_invariants();
    assert_eq!(zsl.len(), 200);
}

#[test]
fn test_delete_and_level_decay() {
    let (mut zsl, _) = build(&[("1", "a"), ("2", "b"), ("3", "c")]);
    assert!(zsl.delete(&score("2"), b"b"));
    assert!(!zsl.delete(&score("2"), b"b"));
    assert!(!zsl.delete(&score("9"), b"a"));
    zsl.check_invariants();
    assert_eq!(members_in_order(&zsl), ["a", "c"]);
}

#[test]
fn test_get_rank_is_one_based() {
    let (zsl, _) = build(&[("1", "a"), ("2", "b"), ("3", "c")]);
    assert_eq!(zsl.get_rank(&score("1"), b"a"), 1);
    assert_eq!(zsl.get_rank(&score("3"), b"c"), 3);
    assert_eq!(zsl.get_rank(&score("2"), b"missing"), 0);
}

#[test]
fn test_rank_by_score_counts_strictly_smaller() {
    let (zsl, _) = build(&[("1", "a"), ("2", "b"), ("2", "c"), ("3", "d")]);
    assert_eq!(zsl.rank_by_score(&score("1")), 0);
    assert_eq!(zsl.rank_by_score(&score("2")), 1);
    assert_eq!(zsl.rank_by_score(&score("3")), 3);
    assert_eq!(zsl.rank_by_score(&score("99")), 4);
}

#[test]
fn test_element_by_rank_inverts_get_rank() {
    let entries: Vec<(String, String)> = (0..50)
        .map(|i| (format!("{}", i / 3), format!("m{i:02}")))
        .collect();
    let pairs: Vec<(&str, &str)> = entries
        .iter()
        .map(|(s, m)| (s.as_str(), m.as_str()))
        .collect();
    let (zsl, _) = build(&pairs);

    for rank in 1..=zsl.len() {
        let idx = zsl.element_by_rank(rank).expect("rank in range");
        let found = zsl.get_rank(zsl.score(idx), zsl.member(idx));
        assert_eq!(found, rank);
    }
    assert!(zsl.element_by_rank(0).is_none());
    assert!(zsl.element_by_rank(zsl.len() + 1).is_none());
}

#[test]
fn test_update_score_in_place_and_relocating() {
    let (mut zsl, _) = build(&[("1", "a"), ("2", "b"), ("3", "c")]);

    // 2 -> 2.5 stays between its neighbors.
    zsl.update_score(&score("2"), b"b", score("2.5"));
    zsl.check_invariants();
    assert_eq!(members_in_order(&zsl), ["a", "b", "c"]);

    // 2.5 -> 9 must relocate past "c".
    zsl.update_score(&score("2.5"), b"b", score("9"));
    zsl.check_invariants();
    assert_eq!(members_in_order(&zsl), ["a", "c", "b"]);
    assert_eq!(zsl.get_rank(&score("9"), b"b"), 3);
}

#[test]
fn test_first_and_last_in_range() {
    let (zsl, _) = build(&[("1", "a"), ("2", "b"), ("3", "c"), ("4", "d")]);

    let range = ScoreRange::parse(b"2", b"3").unwrap();
    let first = zsl.first_in_range(&range).unwrap();
    let last = zsl.last_in_range(&range).unwrap();
    assert_eq!(zsl.member(first).as_ref(), b"b");
    assert_eq!(zsl.member(last).as_ref(), b"c");

    let exclusive = ScoreRange::parse(b"(2", b"(3").unwrap();
    assert!(zsl.first_in_range(&exclusive).is_none());

    let inverted = ScoreRange::parse(b"5", b"1").unwrap();
    assert!(zsl.first_in_range(&inverted).is_none());
    assert!(zsl.last_in_range(&inverted).is_none());

    let open = ScoreRange::parse(b"-inf", b"+inf").unwrap();
    assert_eq!(zsl.member(zsl.first_in_range(&open).unwrap()).as_ref(), b"a");
    assert_eq!(zsl.member(zsl.last_in_range(&open).unwrap()).as_ref(), b"d");
}

#[test]
fn test_lex_ranges_with_sentinels() {
    let (zsl, _) = build(&[("0", "a"), ("0", "b"), ("0", "c"), ("0", "d")]);

    let all = LexRange::parse(b"-", b"+").unwrap();
    assert_eq!(zsl.member(zsl.first_in_lex_range(&all).unwrap()).as_ref(), b"a");
    assert_eq!(zsl.member(zsl.last_in_lex_range(&all).unwrap()).as_ref(), b"d");

    // (a [c  is  a < m <= c
    let half_open = LexRange::parse(b"(a", b"[c").unwrap();
    let first = zsl.first_in_lex_range(&half_open).unwrap();
    let last = zsl.last_in_lex_range(&half_open).unwrap();
    assert_eq!(zsl.member(first).as_ref(), b"b");
    assert_eq!(zsl.member(last).as_ref(), b"c");

    let empty = LexRange::parse(b"(c", b"(c").unwrap();
    assert!(zsl.first_in_lex_range(&empty).is_none());

    assert!(LexRange::parse(b"a", b"+").is_err());
    assert!(LexRange::parse(b"-", b"c").is_err());
}

#[test]
fn test_delete_range_by_score_keeps_dict_in_sync() {
    let (mut zsl, mut dict) = build(&[("1", "a"), ("2", "b"), ("3", "c"), ("4", "d")]);
    let range = ScoreRange::parse(b"2", b"3").unwrap();

    let removed = zsl.delete_range_by_score(&range, &mut dict);
    assert_eq!(removed, 2);
    zsl.check_invariants();
    assert_eq!(members_in_order(&zsl), ["a", "d"]);
    assert_eq!(dict.len(), 2);
    assert!(dict.get(b"b").is_none());
    assert!(dict.get(b"c").is_none());
}

#[test]
fn test_delete_range_by_rank_is_one_based_inclusive() {
    let (mut zsl, mut dict) = build(&[("1", "a"), ("2", "b"), ("3", "c"), ("4", "d")]);

    let removed = zsl.delete_range_by_rank(2, 3, &mut dict);
    assert_eq!(removed, 2);
    zsl.check_invariants();
    assert_eq!(members_in_order(&zsl), ["a", "d"]);
    assert_eq!(dict.len(), 2);
}

#[test]
fn test_delete_range_by_lex() {
    let (mut zsl, mut dict) = build(&[("0", "a"), ("0", "b"), ("0", "c"), ("0", "d")]);
    let range = LexRange::parse(b"(a", b"[c").unwrap();

    let removed = zsl.delete_range_by_lex(&range, &mut dict);
    assert_eq!(removed, 2);
    zsl.check_invariants();
    assert_eq!(members_in_order(&zsl), ["a", "d"]);
    assert_eq!(dict.len(), 2);
}
