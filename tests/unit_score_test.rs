// tests/unit_score_test.rs

//! Unit tests for the composite score: parse grammar, formatting, ordering
//! and arithmetic.

use exzset::ExZsetError;
use exzset::core::score::{Aggregate, MultiScore};
use std::cmp::Ordering;

fn score(text: &str) -> MultiScore {
    MultiScore::parse(text.as_bytes()).expect("valid score")
}

#[test]
fn test_parse_single_and_multi() {
    assert_eq!(score("1").values(), &[1.0]);
    assert_eq!(score("1#2#3").values(), &[1.0, 2.0, 3.0]);
    assert_eq!(score("-1.5#2.25").values(), &[-1.5, 2.25]);
    assert_eq!(score("inf#-inf").values(), &[f64::INFINITY, f64::NEG_INFINITY]);
    assert_eq!(score("+inf").values(), &[f64::INFINITY]);
    assert_eq!(score("1e3").values(), &[1000.0]);
}

#[test]
fn test_parse_rejects_bad_grammar() {
    for raw in ["", "#", "1#", "#1", "1##2", "a", "1#b", "1 ", " 1", "1#2 "] {
        assert_eq!(
            MultiScore::parse(raw.as_bytes()),
            Err(ExZsetError::ScoreFormat),
            "{raw:?} must be rejected"
        );
    }
}

#[test]
fn test_parse_rejects_nan() {
    assert_eq!(
        MultiScore::parse(b"nan"),
        Err(ExZsetError::ScoreFormat)
    );
    assert_eq!(
        MultiScore::parse(b"1#NaN#2"),
        Err(ExZsetError::ScoreFormat)
    );
}

#[test]
fn test_parse_rejects_oversized_tuple() {
    let raw = vec!["1"; 256].join("#");
    assert_eq!(
        MultiScore::parse(raw.as_bytes()),
        Err(ExZsetError::ScoreFormat)
    );
    let raw = vec!["1"; 255].join("#");
    assert_eq!(MultiScore::parse(raw.as_bytes()).unwrap().arity(), 255);
}

#[test]
fn test_format_integral_without_fraction() {
    assert_eq!(score("1#2").to_string(), "1#2");
    assert_eq!(score("-3#0").to_string(), "-3#0");
    assert_eq!(score("1.5#2").to_string(), "1.5#2");
    assert_eq!(score("inf#-inf").to_string(), "inf#-inf");
}

#[test]
fn test_format_round_trips() {
    for raw in ["1", "1#2", "0.5#-0.25", "3.141592653589793", "1e300#-1e300"] {
        let parsed = score(raw);
        let reparsed = MultiScore::parse(parsed.to_string().as_bytes()).unwrap();
        assert_eq!(parsed, reparsed, "{raw} must round-trip");
    }
}

#[test]
fn test_cmp_is_lexicographic() {
    assert_eq!(score("1#9").cmp(&score("2#1")), Ordering::Less);
    assert_eq!(score("2#1").cmp(&score("1#9")), Ordering::Greater);
    assert_eq!(score("1#2").cmp(&score("1#2")), Ordering::Equal);
    assert_eq!(score("1#1").cmp(&score("1#9")), Ordering::Less);
    assert_eq!(score("-inf#5").cmp(&score("0#0")), Ordering::Less);
    assert_eq!(score("inf#0").cmp(&score("inf#1")), Ordering::Less);
}

#[test]
#[should_panic(expected = "different arity")]
fn test_cmp_arity_mismatch_panics() {
    let _ = score("1").cmp(&score("1#2"));
}

#[test]
fn test_add_assign() {
    let mut a = score("1#2");
    a.add_assign(&score("0.5#-3")).unwrap();
    assert_eq!(a, score("1.5#-1"));
}

#[test]
fn test_add_assign_nan_fails() {
    let mut a = score("inf#0");
    assert_eq!(
        a.add_assign(&score("-inf#1")),
        Err(ExZsetError::NanResult)
    );
}

#[test]
fn test_add_ignore_nan_keeps_component() {
    let mut a = score("inf#1");
    a.add_ignore_nan(&score("-inf#2"));
    // First component would be NaN and is left alone.
    assert_eq!(a, score("inf#3"));
}

#[test]
fn test_scale() {
    let mut a = MultiScore::zeroed(2);
    a.scale_from(&score("2#-4"), 0.5);
    assert_eq!(a, score("1#-2"));

    let mut aliased = score("2#-4");
    aliased.scale(0.5);
    assert_eq!(aliased, score("1#-2"));

    assert_eq!(MultiScore::scaled(&score("10#1"), 3.0), score("30#3"));
}

#[test]
fn test_aggregate_sum_min_max() {
    let mut sum = score("1#1");
    sum.aggregate_from(&score("2#3"), Aggregate::Sum);
    assert_eq!(sum, score("3#4"));

    let mut min = score("2#0");
    min.aggregate_from(&score("1#9"), Aggregate::Min);
    assert_eq!(min, score("1#9"));
    min.aggregate_from(&score("5#0"), Aggregate::Min);
    assert_eq!(min, score("1#9"));

    let mut max = score("2#0");
    max.aggregate_from(&score("1#9"), Aggregate::Max);
    assert_eq!(max, score("2#0"));
    max.aggregate_from(&score("2#1"), Aggregate::Max);
    assert_eq!(max, score("2#1"));
}
