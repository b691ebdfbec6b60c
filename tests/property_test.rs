// tests/property_test.rs

//! Property-based tests: the sorted set against a naive model, the score
//! codec round-trip, and ordering symmetries.

use std::collections::HashMap;

use bytes::Bytes;
use exzset::core::score::MultiScore;
use exzset::core::storage::zset::{ExZset, UpsertOptions};
use proptest::prelude::*;

fn score_of(a: i32, b: i32) -> MultiScore {
    MultiScore::parse(format!("{a}#{b}").as_bytes()).unwrap()
}

fn sorted_model(model: &HashMap<String, (i32, i32)>) -> Vec<(String, (i32, i32))> {
    let mut entries: Vec<_> = model.iter().map(|(m, &s)| (m.clone(), s)).collect();
    entries.sort_by(|(m1, s1), (m2, s2)| s1.cmp(s2).then_with(|| m1.cmp(m2)));
    entries
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 100,
        max_shrink_iters: 1000,
        ..ProptestConfig::default()
    })]

    #[test]
    fn test_zset_tracks_naive_model(
        ops in prop::collection::vec(
            (0u8..2, 0usize..12, -3i32..4, -3i32..4),
            1..80
        )
    ) {
        let mut zset = ExZset::new(2);
        let mut model: HashMap<String, (i32, i32)> = HashMap::new();

        for (op, member_idx, a, b) in ops {
            let member = format!("m{member_idx:02}");
            if op == 0 {
                let outcome = zset.upsert(
                    score_of(a, b),
                    &Bytes::from(member.clone()),
                    UpsertOptions::default(),
                );
                prop_assert!(outcome.is_ok());
                model.insert(member, (a, b));
            } else {
                let removed = zset.remove(member.as_bytes());
                prop_assert_eq!(removed, model.remove(&member).is_some());
            }
        }

        zset.check_invariants();
        prop_assert_eq!(zset.len(), model.len());

        // Ascending iteration equals the model sorted by (score, member).
        let actual: Vec<(String, String)> = zset
            .iter()
            .map(|(m, s)| (String::from_utf8_lossy(m).into_owned(), s.to_string()))
            .collect();
        let expected: Vec<(String, String)> = sorted_model(&model)
            .into_iter()
            .map(|(m, (a, b))| (m, format!("{a}#{b}")))
            .collect();
        prop_assert_eq!(actual, expected);

        // Rank round-trips through the position in sorted order, and the
        // stored score is reachable through the hash side.
        let len = model.len();
        for (pos, (member, (a, b))) in sorted_model(&model).into_iter().enumerate() {
            prop_assert_eq!(zset.rank(member.as_bytes(), false), Some(pos));
            prop_assert_eq!(zset.rank(member.as_bytes(), true), Some(len - 1 - pos));
            prop_assert_eq!(zset.score_of(member.as_bytes()), Some(&score_of(a, b)));
        }
    }

    #[test]
    fn test_score_format_parse_round_trip(
        values in prop::collection::vec(
            any::<f64>().prop_filter("scores are never NaN", |v| !v.is_nan()),
            1..6
        )
    ) {
        let score = MultiScore::from_values(values);
        let text = score.to_string();
        let reparsed = MultiScore::parse(text.as_bytes()).unwrap();
        prop_assert_eq!(&score, &reparsed, "text was {}", text);
    }

    #[test]
    fn test_reverse_range_is_reversed_forward_range(
        pairs in prop::collection::btree_map("[a-z]{1,6}", (-9i32..10, -9i32..10), 1..40)
    ) {
        let mut zset = ExZset::new(2);
        for (member, (a, b)) in &pairs {
            zset.upsert(
                score_of(*a, *b),
                &Bytes::from(member.clone()),
                UpsertOptions::default(),
            )
            .unwrap();
        }

        let forward: Vec<String> = zset
            .range_by_rank(0, -1, false)
            .into_iter()
            .map(|(m, _)| String::from_utf8_lossy(m).into_owned())
            .collect();
        let mut backward: Vec<String> = zset
            .range_by_rank(0, -1, true)
            .into_iter()
            .map(|(m, _)| String::from_utf8_lossy(m).into_owned())
            .collect();
        backward.reverse();
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn test_upsert_twice_is_idempotent(
        member in "[a-z]{1,8}",
        a in -9i32..10,
        b in -9i32..10
    ) {
        let mut zset = ExZset::new(2);
        let member = Bytes::from(member);
        zset.upsert(score_of(a, b), &member, UpsertOptions::default()).unwrap();
        zset.upsert(score_of(a, b), &member, UpsertOptions::default()).unwrap();

        zset.check_invariants();
        prop_assert_eq!(zset.len(), 1);
        prop_assert_eq!(zset.score_of(&member), Some(&score_of(a, b)));
    }
}
