// tests/unit_zrem_test.rs

//! Command-level tests for element and range removal, including key
//! lifecycle on emptying.


use exzset::ExZsetError;
use exzset::core::storage::store::Store;
use test_helpers::*;

#[test]
fn test_zrem_counts_removed() {
    let mut store = Store::new();
    seed(&mut store, "k", &[("1", "a"), ("2", "b"), ("3", "c")]);

    let reply = run_ok(&mut store, "exzrem", &["k", "a", "nope", "b"]);
    assert_int(&reply, 2, "two of three existed");
    assert_strings(
        &run_ok(&mut store, "exzrange", &["k", "0", "-1"]),
        &["c"],
        "remaining member",
    );
    store.get_mut(b"k").unwrap().check_invariants();
}

#[test]
fn test_zrem_deletes_key_when_empty() {
    let mut store = Store::new();
    seed(&mut store, "k", &[("1", "a"), ("2", "b")]);

    assert_int(&run_ok(&mut store, "exzrem", &["k", "a", "b"]), 2, "");
    assert!(store.get(b"k").is_none(), "empty set removes the key");

    assert_int(
        &run_ok(&mut store, "exzrem", &["k", "a"]),
        0,
        "missing key removes nothing",
    );
}

#[test]
fn test_zremrangebyrank() {
    let mut store = Store::new();
    seed(&mut store, "k", &[("1", "a"), ("2", "b"), ("3", "c"), ("4", "d")]);

    assert_int(&run_ok(&mut store, "exzremrangebyrank", &["k", "1", "2"]), 2, "");
    assert_strings(
        &run_ok(&mut store, "exzrange", &["k", "0", "-1"]),
        &["a", "d"],
        "middle removed",
    );

    assert_int(
        &run_ok(&mut store, "exzremrangebyrank", &["k", "-1", "-1"]),
        1,
        "negative rank",
    );
    assert_int(
        &run_ok(&mut store, "exzremrangebyrank", &["k", "5", "9"]),
        0,
        "out of range removes nothing",
    );
    assert_int(&run_ok(&mut store, "exzremrangebyrank", &["k", "0", "-1"]), 1, "");
    assert!(store.get(b"k").is_none(), "key deleted once emptied");
}

#[test]
fn test_zremrangebyscore() {
    let mut store = Store::new();
    seed(&mut store, "k", &[("1", "a"), ("2", "b"), ("3", "c"), ("4", "d")]);

    assert_eq!(
        run(&mut store, "exzremrangebyscore", &["k", "1", "2#2"]),
        Err(ExZsetError::ScoreFormat),
        "a mismatched max bound alone is rejected"
    );
    assert_int(&run_ok(&mut store, "exzcard", &["k"]), 4, "nothing removed");

    assert_int(
        &run_ok(&mut store, "exzremrangebyscore", &["k", "(1", "3"]),
        2,
        "exclusive min",
    );
    assert_strings(
        &run_ok(&mut store, "exzrange", &["k", "0", "-1"]),
        &["a", "d"],
        "",
    );
    assert_int(
        &run_ok(&mut store, "exzremrangebyscore", &["k", "-inf", "+inf"]),
        2,
        "",
    );
    assert!(store.get(b"k").is_none());
}

#[test]
fn test_zremrangebylex() {
    let mut store = Store::new();
    seed(
        &mut store,
        "k",
        &[("0", "a"), ("0", "b"), ("0", "c"), ("0", "d")],
    );

    assert_int(
        &run_ok(&mut store, "exzremrangebylex", &["k", "(a", "[c"]),
        2,
        "",
    );
    assert_strings(
        &run_ok(&mut store, "exzrange", &["k", "0", "-1"]),
        &["a", "d"],
        "",
    );
    assert_int(&run_ok(&mut store, "exzremrangebylex", &["k", "-", "+"]), 2, "");
    assert!(store.get(b"k").is_none());
}

#[test]
fn test_remove_heavy_churn_keeps_invariants() {
    let mut store = Store::new();
    let pairs: Vec<(String, String)> = (0..300)
        .map(|i| (format!("{}", i % 17), format!("m{i:03}")))
        .collect();
    let pair_refs: Vec<(&str, &str)> = pairs
        .iter()
        .map(|(s, m)| (s.as_str(), m.as_str()))
        .collect();
    seed(&mut store, "k", &pair_refs);

    // Remove members one by one; the shrink path and span bookkeeping must
    // survive the churn.
    for i in (0..300).step_by(2) {
        let member = format!("m{i:03}");
        assert_int(&run_ok(&mut store, "exzrem", &["k", &member]), 1, "");
    }
    let zset = store.get_mut(b"k").unwrap();
    assert_eq!(zset.len(), 150);
    zset.check_invariants();
}
