use std::cell::Cell;

use num_bigint::BigUint;
use num_traits::ToPrimitive;
use proptest::prelude::*;

use crate::{
    permutation::{Permutation, PermutationError},
    transform::{image_of, PivotRotation, SequenceTransform},
};

use super::*;

/// Rotates left on its first application and right on every later one, so its
/// analytic and empirical orders disagree.
#[derive(Default)]
struct Inconsistent {
    applied: Cell<bool>,
}

impl SequenceTransform for Inconsistent {
    fn apply<T: Clone>(&self, input: &[T]) -> Vec<T> {
        let mut out = input.to_vec();
        if out.is_empty() {
            return out;
        }
        if self.applied.replace(true) {
            out.rotate_right(1);
        } else {
            out.rotate_left(1);
        }
        out
    }
}

/// Loses the last element.
struct Truncating;

impl SequenceTransform for Truncating {
    fn apply<T: Clone>(&self, input: &[T]) -> Vec<T> {
        let mut out = input.to_vec();
        out.pop();
        out
    }
}

/// Repeats the first element everywhere.
struct Smearing;

impl SequenceTransform for Smearing {
    fn apply<T: Clone>(&self, input: &[T]) -> Vec<T> {
        match input.first() {
            Some(first) => vec![first.clone(); input.len()],
            None => Vec::new(),
        }
    }
}

/// Plain reversal, an involution.
struct Reverse;

impl SequenceTransform for Reverse {
    fn apply<T: Clone>(&self, input: &[T]) -> Vec<T> {
        input.iter().rev().cloned().collect()
    }
}

#[test]
fn empty_sequence() {
    let engine = OrderEngine::new();
    let record = engine.record(0).unwrap();
    assert_eq!(record.length(), 0);
    assert_eq!(record.order(), &BigUint::from(1u32));
    assert_eq!(record.cycle_count(), 0);
    assert!(record.distinct_cycle_lengths().is_empty());
    assert_eq!(engine.check_order(&record), Ok(1));
}

#[test]
fn single_element() {
    let engine = OrderEngine::new();
    let record = engine.record(1).unwrap();
    assert_eq!(record.permutation().map(), &[0]);
    assert_eq!(record.order(), &BigUint::from(1u32));
    assert_eq!(record.distinct_cycle_lengths(), vec![1]);
    assert_eq!(engine.measure_order(&record), Ok(1));
}

#[test]
fn two_elements_swap() {
    let engine = OrderEngine::new();
    let record = engine.record(2).unwrap();
    assert_eq!(record.permutation().map(), &[1, 0]);
    assert_eq!(
        record.cycle_structure().iter().collect::<Vec<_>>(),
        vec![(&2, &1)]
    );
    assert_eq!(record.order(), &BigUint::from(2u32));
    assert_eq!(engine.run(&[0, 1], 2), vec![0, 1]);
    assert_eq!(engine.measure_order(&record), Ok(2));
}

#[test]
fn three_elements_one_cycle() {
    let engine = OrderEngine::new();
    let record = engine.record(3).unwrap();
    assert_eq!(record.permutation().map(), &[1, 2, 0]);
    assert_eq!(record.distinct_cycle_lengths(), vec![3]);
    assert_eq!(record.order(), &BigUint::from(3u32));
    assert_eq!(engine.check_order(&record), Ok(3));
}

#[test]
fn fixed_points_are_cycles() {
    let engine = OrderEngine::new();

    let record = engine.record(4).unwrap();
    assert_eq!(record.permutation().map(), &[3, 1, 2, 0]);
    assert_eq!(
        record.cycle_structure().clone().into_iter().collect::<Vec<_>>(),
        vec![(1, 2), (2, 1)]
    );
    assert_eq!(record.cycle_count(), 2);
    assert_eq!(record.order(), &BigUint::from(2u32));

    let record = engine.record(10).unwrap();
    assert_eq!(record.distinct_cycle_lengths(), vec![1, 3, 6]);
    assert_eq!(record.order(), &BigUint::from(6u32));
}

#[test]
fn length_transform() {
    let engine = OrderEngine::new();
    let record = engine.record_with(5, &|n| 2 * n + 1).unwrap();
    assert_eq!(record.base_length(), 5);
    assert_eq!(record.length(), 11);
    assert_eq!(record.order(), &BigUint::from(15u32));
    assert_eq!(record.distinct_cycle_lengths(), vec![3, 5]);
    assert_eq!(record.cycle_structure().get(&3), Some(&2));
}

#[test]
fn checked_length_transform() {
    let engine = OrderEngine::new();
    let scaled = |n: usize| n.checked_mul(usize::MAX);

    let record = engine.try_record_with(1, &|n| n.checked_mul(3)).unwrap();
    assert_eq!(record.length(), 3);
    assert_eq!(engine.try_record_with(0, &scaled).unwrap().length(), 0);

    let err = engine.try_record_with(2, &scaled).unwrap_err();
    assert_eq!(err, OrderError::LengthOverflow { base_length: 2 });
    assert!(err.is_fatal());
    assert_eq!(
        engine.try_record_with(7, &|_| Some(MAX_LENGTH + 1)),
        Err(OrderError::LengthOverflow { base_length: 7 })
    );
}

#[test]
fn bound_exceeded() {
    // order of length 11 is 15
    let record = OrderEngine::new().record(11).unwrap();

    let tight = OrderEngine::new().with_upper_bound(15);
    assert_eq!(tight.measure_order(&record), Ok(15));

    let short = OrderEngine::new().with_upper_bound(14);
    let err = short.check_order(&record).unwrap_err();
    assert_eq!(
        err,
        OrderError::OrderBoundExceeded {
            length: 11,
            bound: 14
        }
    );
    assert!(!err.is_fatal());
}

#[test]
fn mismatch_is_fatal() {
    let engine = OrderEngine::with_transform(Inconsistent::default());
    let record = engine.record(3).unwrap();
    assert_eq!(record.order(), &BigUint::from(3u32));

    let err = engine.check_order(&record).unwrap_err();
    assert_eq!(
        err,
        OrderError::OrderMismatch {
            length: 3,
            analytic: BigUint::from(3u32),
            empirical: 2,
        }
    );
    assert!(err.is_fatal());
}

#[test]
fn invalid_images() {
    let err = OrderEngine::with_transform(Truncating)
        .record(4)
        .unwrap_err();
    assert_eq!(
        err,
        OrderError::InvalidPermutation {
            length: 4,
            source: PermutationError::LengthMismatch {
                expected: 4,
                found: 3
            }
        }
    );
    assert!(err.is_fatal());

    let err = OrderEngine::with_transform(Smearing).record(3).unwrap_err();
    assert!(matches!(
        err,
        OrderError::InvalidPermutation {
            length: 3,
            source: PermutationError::Duplicate { value: 0, .. }
        }
    ));
}

#[test]
fn alternate_transform() {
    let engine = OrderEngine::with_transform(Reverse);
    for n in 0..10 {
        let record = engine.record(n).unwrap();
        let expected = if n < 2 { 1 } else { 2 };
        assert_eq!(record.order(), &BigUint::from(expected as u32));
        assert_eq!(engine.check_order(&record), Ok(expected));
    }
}

#[test]
fn timing_log_records_calls() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pivrot.log");
    let engine = OrderEngine::new().with_timing(TimingLog::open(&path).unwrap());

    let record = engine.record(3).unwrap();
    engine.check_order(&record).unwrap();
    engine.timing().unwrap().flush().unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let calls: Vec<&str> = contents
        .lines()
        .filter_map(|line| line.split('\'').nth(1))
        .collect();
    // one application to build the record, two more to get back to the start
    assert_eq!(
        calls,
        vec!["algorithm", "make_perm", "get_order", "algorithm", "algorithm"]
    );
    assert!(contents.contains("'get_order'\t called with '<Permutation, cycles: 1>'"));
}

proptest! {
    #[test]
    fn image_is_bijection(n in 0usize..400) {
        let image = image_of(&PivotRotation, n);
        prop_assert!(Permutation::from_image_with_len(image, n).is_ok());
    }

    #[test]
    fn cycle_lengths_partition_length(n in 0usize..400) {
        let record = OrderEngine::new().record(n).unwrap();
        let total: usize = record
            .cycle_structure()
            .iter()
            .map(|(len, count)| len * count)
            .sum();
        prop_assert_eq!(total, n);
    }

    #[test]
    fn analytic_matches_empirical(n in 1usize..=60) {
        let engine = OrderEngine::new();
        let record = engine.record(n).unwrap();
        let measured = engine.check_order(&record).unwrap();
        prop_assert_eq!(BigUint::from(measured), record.order().clone());
    }

    #[test]
    fn applying_order_times_is_identity(n in 0usize..=60) {
        let engine = OrderEngine::new();
        let record = engine.record(n).unwrap();
        let order = record.order().to_usize().unwrap();
        let start: Vec<usize> = (0..n).collect();
        prop_assert_eq!(engine.transform().apply_k(&start, order), start);
    }
}

// Runs the full pivot rotation once per length, which takes a while in debug
// builds: `cargo test --release -- --ignored`.
#[test]
#[ignore]
fn analytic_matches_empirical_up_to_1000() {
    let engine = OrderEngine::new();
    let mut verified = 0;
    let mut unverified = 0;
    for n in 1..=1000 {
        let record = engine.record(n).unwrap();
        match engine.check_order(&record) {
            Ok(_) => verified += 1,
            Err(OrderError::OrderBoundExceeded { length, bound }) => {
                assert_eq!((length, bound), (n, DEFAULT_UPPER_BOUND));
                unverified += 1;
            }
            Err(err) => panic!("length {n}: {err}"),
        }
    }
    assert_eq!(verified + unverified, 1000);
    assert!(verified > unverified);
}
