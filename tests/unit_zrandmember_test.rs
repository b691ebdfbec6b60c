// tests/unit_zrandmember_test.rs

//! Command-level tests for the random member strategies.


use std::collections::HashSet;

use exzset::core::storage::store::Store;
use test_helpers::*;

fn ten_members(store: &mut Store) -> Vec<String> {
    let pairs: Vec<(String, String)> = (0..10)
        .map(|i| (i.to_string(), format!("m{i}")))
        .collect();
    let pair_refs: Vec<(&str, &str)> = pairs
        .iter()
        .map(|(s, m)| (s.as_str(), m.as_str()))
        .collect();
    seed(store, "k", &pair_refs);
    pairs.into_iter().map(|(_, m)| m).collect()
}

#[test]
fn test_bare_form_returns_one_member() {
    let mut store = Store::new();
    let members = ten_members(&mut store);
    for _ in 0..50 {
        let reply = run_ok(&mut store, "exzrandmember", &["k"]);
        assert!(members.contains(&as_bulk(&reply)));
    }
    assert_null(&run_ok(&mut store, "exzrandmember", &["missing"]), "");
}

#[test]
fn test_count_zero_is_empty() {
    let mut store = Store::new();
    ten_members(&mut store);
    assert_strings(&run_ok(&mut store, "exzrandmember", &["k", "0"]), &[], "");
}

#[test]
fn test_positive_count_returns_distinct_members() {
    let mut store = Store::new();
    let members = ten_members(&mut store);

    // 4 of 10 lands in the subtract strategy (4 * 3 > 10).
    for _ in 0..20 {
        let out = as_strings(&run_ok(&mut store, "exzrandmember", &["k", "4"]));
        assert_eq!(out.len(), 4);
        let unique: HashSet<&String> = out.iter().collect();
        assert_eq!(unique.len(), 4, "members must be distinct");
        assert!(out.iter().all(|m| members.contains(m)));
    }

    // 2 of 10 exercises the sampling strategy (2 * 3 <= 10).
    for _ in 0..20 {
        let out = as_strings(&run_ok(&mut store, "exzrandmember", &["k", "2"]));
        assert_eq!(out.len(), 2);
        assert_ne!(out[0], out[1]);
    }
}

#[test]
fn test_count_at_or_above_size_returns_whole_set_ascending() {
    let mut store = Store::new();
    ten_members(&mut store);

    let expected: Vec<String> = (0..10).map(|i| format!("m{i}")).collect();
    let expected_refs: Vec<&str> = expected.iter().map(String::as_str).collect();

    assert_strings(
        &run_ok(&mut store, "exzrandmember", &["k", "10"]),
        &expected_refs,
        "count == size",
    );
    assert_strings(
        &run_ok(&mut store, "exzrandmember", &["k", "100"]),
        &expected_refs,
        "count > size",
    );
}

#[test]
fn test_negative_count_allows_repeats() {
    let mut store = Store::new();
    let members = ten_members(&mut store);

    let out = as_strings(&run_ok(&mut store, "exzrandmember", &["k", "-40"]));
    assert_eq!(out.len(), 40, "negative count draws with repetition");
    assert!(out.iter().all(|m| members.contains(m)));
}

#[test]
fn test_withscores_interleaves() {
    let mut store = Store::new();
    ten_members(&mut store);

    let out = as_strings(&run_ok(
        &mut store,
        "exzrandmember",
        &["k", "3", "WITHSCORES"],
    ));
    assert_eq!(out.len(), 6);
    for pair in out.chunks(2) {
        // Member mN carries score N.
        assert_eq!(pair[0], format!("m{}", pair[1]));
    }
}

#[test]
fn test_missing_key_with_count() {
    let mut store = Store::new();
    assert_strings(
        &run_ok(&mut store, "exzrandmember", &["missing", "5"]),
        &[],
        "",
    );
}
