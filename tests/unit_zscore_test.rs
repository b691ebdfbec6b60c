// tests/unit_zscore_test.rs

//! Command-level tests for score lookups.


use exzset::ExZsetError;
use exzset::core::storage::store::Store;
use test_helpers::*;

#[test]
fn test_zscore() {
    let mut store = Store::new();
    seed(&mut store, "k", &[("1.5#2", "a")]);

    assert_eq!(as_bulk(&run_ok(&mut store, "exzscore", &["k", "a"])), "1.5#2");
    assert_null(&run_ok(&mut store, "exzscore", &["k", "nope"]), "no member");
    assert_null(&run_ok(&mut store, "exzscore", &["missing", "a"]), "no key");
    assert!(matches!(
        run(&mut store, "exzscore", &["k"]),
        Err(ExZsetError::WrongArgumentCount(_))
    ));
}

#[test]
fn test_zmscore() {
    let mut store = Store::new();
    seed(&mut store, "k", &[("1", "a"), ("2", "b")]);

    assert_strings(
        &run_ok(&mut store, "exzmscore", &["k", "a", "nope", "b"]),
        &["1", "<null>", "2"],
        "per-member nulls",
    );
    assert_strings(
        &run_ok(&mut store, "exzmscore", &["missing", "a", "b"]),
        &["<null>", "<null>"],
        "missing key is all nulls",
    );
}

#[test]
fn test_score_agrees_with_range_at_rank() {
    let mut store = Store::new();
    seed(&mut store, "k", &[("3#1", "p"), ("1#2", "q"), ("2#9", "r")]);

    let flat = as_strings(&run_ok(
        &mut store,
        "exzrange",
        &["k", "0", "-1", "WITHSCORES"],
    ));
    for pair in flat.chunks(2) {
        let score = as_bulk(&run_ok(&mut store, "exzscore", &["k", &pair[0]]));
        assert_eq!(score, pair[1], "score and range agree for {}", pair[0]);
    }
}
