//! Property tests for predicate composition and member-set semantics

use cadfilter::{BoolOp, Expr, MemberFilter, Predicate};
use proptest::prelude::*;

proptest! {
    /// `a AND b` matches iff both sides match, over arbitrary thresholds
    #[test]
    fn and_is_conjunction(lo in 0u8..=255, hi in 0u8..=255, subject in 0u8..=255) {
        let mut combined = Predicate::from_fn(move |n: &u8| *n >= lo);
        combined.and(Expr::new(move |n: &u8| *n < hi)).unwrap();

        let expected = subject >= lo && subject < hi;
        prop_assert_eq!(combined.eval(&subject).unwrap(), expected);
    }

    /// `a OR b` matches iff either side matches
    #[test]
    fn or_is_disjunction(lo in 0u8..=255, hi in 0u8..=255, subject in 0u8..=255) {
        let mut combined = Predicate::from_fn(move |n: &u8| *n < lo);
        combined.or(Expr::new(move |n: &u8| *n > hi)).unwrap();

        let expected = subject < lo || subject > hi;
        prop_assert_eq!(combined.eval(&subject).unwrap(), expected);
    }

    /// NOT inverts every outcome
    #[test]
    fn negation_inverts(threshold in 0u8..=255, subject in 0u8..=255) {
        let plain = Expr::new(move |n: &u8| *n < threshold);
        let negated = plain.clone().negate();

        let f = plain.compile();
        let g = negated.compile();
        prop_assert_eq!(f(&subject).unwrap(), !g(&subject).unwrap());
    }

    /// Structural combination evaluates the same as the closures it merges
    #[test]
    fn combined_tree_matches_reference(
        ops in proptest::collection::vec(any::<bool>(), 1..6),
        thresholds in proptest::collection::vec(0u8..=255, 1..6),
        subject in 0u8..=255,
    ) {
        let n = ops.len().min(thresholds.len());
        let mut predicate = Predicate::from_fn(|n: &u8| *n % 2 == 0);
        let mut expected = subject % 2 == 0;

        for i in 0..n {
            let t = thresholds[i];
            let fragment = Expr::new(move |n: &u8| *n < t);
            let result = subject < t;
            if ops[i] {
                predicate.combine(BoolOp::And, fragment).unwrap();
                expected = expected && result;
            } else {
                predicate.combine(BoolOp::Or, fragment).unwrap();
                expected = expected || result;
            }
        }

        prop_assert_eq!(predicate.eval(&subject).unwrap(), expected);
    }

    /// Membership matches exactly the key set; inversion flips non-empty sets
    #[test]
    fn member_set_semantics(
        keys in proptest::collection::hash_set(0u8..=20, 0..6),
        inverted in any::<bool>(),
        empty_default in any::<bool>(),
        subject in 0u8..=20,
    ) {
        let mut filter = MemberFilter::new(|n: &u8| *n, keys.iter().copied());
        filter.set_inverted(inverted).unwrap();
        filter.set_empty_default(empty_default).unwrap();

        let expected = if keys.is_empty() {
            empty_default
        } else {
            keys.contains(&subject) != inverted
        };
        prop_assert_eq!(filter.is_match(&subject), expected);
    }

    /// Removing every key falls back to the empty default
    #[test]
    fn member_set_drains_to_default(
        keys in proptest::collection::hash_set(0u8..=20, 1..6),
        empty_default in any::<bool>(),
        subject in 0u8..=20,
    ) {
        let mut filter = MemberFilter::new(|n: &u8| *n, keys.iter().copied());
        filter.set_empty_default(empty_default).unwrap();

        for key in &keys {
            filter.remove(key).unwrap();
        }
        prop_assert_eq!(filter.is_match(&subject), empty_default);
    }
}
