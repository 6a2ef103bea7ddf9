//! # Order engine
//!
//! Builds an [`OrderRecord`] for a sequence length: apply the transform once to
//! the identity sequence, read the result as a permutation image and extract its
//! order and cycle structure.
//!
//! The analytic order can be cross-checked empirically with
//! [`OrderEngine::measure_order`], which keeps re-applying the transform until the
//! identity arrangement recurs, and [`OrderEngine::check_order`], which fails if
//! the two disagree.
//!
//! ```
//! use num_bigint::BigUint;
//! use pivrot::engine::OrderEngine;
//!
//! let engine = OrderEngine::new();
//! let record = engine.record(11).unwrap();
//! assert_eq!(record.order(), &BigUint::from(15u32));
//! assert_eq!(record.distinct_cycle_lengths(), vec![3, 5]);
//! assert_eq!(engine.check_order(&record).unwrap(), 15);
//! ```

use std::{collections::BTreeMap, fmt};

use num_bigint::BigUint;
use thiserror::Error;
use tracing::debug;

use crate::{
    permutation::{Permutation, PermutationError},
    timing::{timed, TimingLog},
    transform::{PivotRotation, SequenceTransform},
};

/// Iteration bound used by [`OrderEngine::measure_order`] unless configured otherwise.
pub const DEFAULT_UPPER_BOUND: usize = 100_000;

/// Longest sequence whose identity arrangement fits in one allocation.
pub const MAX_LENGTH: usize = isize::MAX as usize / std::mem::size_of::<usize>();

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("transform produced an invalid permutation for length {length}")]
    InvalidPermutation {
        length: usize,
        #[source]
        source: PermutationError,
    },

    #[error("base length {base_length} has no sequence length of at most {max}", max = MAX_LENGTH)]
    LengthOverflow { base_length: usize },

    #[error("length {length}: sequence did not return to its start within {bound} iterations")]
    OrderBoundExceeded { length: usize, bound: usize },

    #[error("length {length}: analytic order {analytic} but the sequence returned after {empirical} iterations")]
    OrderMismatch {
        length: usize,
        analytic: BigUint,
        empirical: usize,
    },
}

impl OrderError {
    /// Whether the error falsifies the computed results, as opposed to only
    /// leaving a record unverified.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, OrderError::OrderBoundExceeded { .. })
    }
}

/// Order and cycle statistics of the permutation induced on one sequence length.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrderRecord {
    base_length: usize,
    length: usize,
    permutation: Permutation,
    order: BigUint,
    cycle_structure: BTreeMap<usize, usize>,
}

impl OrderRecord {
    /// The length before the length transform was applied.
    pub fn base_length(&self) -> usize {
        self.base_length
    }

    /// The length of the sequence that was actually transformed.
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn permutation(&self) -> &Permutation {
        &self.permutation
    }

    pub fn order(&self) -> &BigUint {
        &self.order
    }

    /// Cycle length -> number of cycles of that length. Fixed points count as
    /// cycles of length one.
    pub fn cycle_structure(&self) -> &BTreeMap<usize, usize> {
        &self.cycle_structure
    }

    /// Sorted distinct cycle lengths.
    pub fn distinct_cycle_lengths(&self) -> Vec<usize> {
        self.cycle_structure.keys().copied().collect()
    }

    /// Number of distinct cycle lengths.
    pub fn cycle_count(&self) -> usize {
        self.cycle_structure.len()
    }
}

struct PermSummary<'a>(&'a Permutation);

impl fmt::Display for PermSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Permutation, cycles: {}>", self.0.cycle_lengths().len())
    }
}

/// Computes [`OrderRecord`]s for a [`SequenceTransform`], pivot rotation by default.
#[derive(Debug)]
pub struct OrderEngine<S = PivotRotation> {
    transform: S,
    upper_bound: usize,
    timing: Option<TimingLog>,
}

impl OrderEngine<PivotRotation> {
    pub fn new() -> Self {
        Self::with_transform(PivotRotation)
    }
}

impl Default for OrderEngine<PivotRotation> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SequenceTransform> OrderEngine<S> {
    /// An engine for a different transform, with default configuration.
    pub fn with_transform(transform: S) -> Self {
        OrderEngine {
            transform,
            upper_bound: DEFAULT_UPPER_BOUND,
            timing: None,
        }
    }

    /// Sets the iteration bound of [`OrderEngine::measure_order`].
    pub fn with_upper_bound(mut self, upper_bound: usize) -> Self {
        self.upper_bound = upper_bound;
        self
    }

    /// Records the duration of every transform application, permutation
    /// construction and order computation in `log`.
    pub fn with_timing(mut self, log: TimingLog) -> Self {
        self.timing = Some(log);
        self
    }

    pub fn transform(&self) -> &S {
        &self.transform
    }

    pub fn upper_bound(&self) -> usize {
        self.upper_bound
    }

    pub fn timing(&self) -> Option<&TimingLog> {
        self.timing.as_ref()
    }

    fn algorithm<T: Clone>(&self, input: &[T]) -> Vec<T> {
        timed(
            self.timing(),
            "algorithm",
            format_args!("<Iterable, len: {}>", input.len()),
            || self.transform.apply(input),
        )
    }

    /// Applies the transform `k` times to `input`.
    pub fn run<T: Clone>(&self, input: &[T], k: usize) -> Vec<T> {
        timed(
            self.timing(),
            "run",
            format_args!("<Iterable, len: {}>, {k}", input.len()),
            || {
                let mut current = input.to_vec();
                for _ in 0..k {
                    current = self.algorithm(&current);
                }
                current
            },
        )
    }

    /// Record for a sequence of length `n`.
    pub fn record(&self, n: usize) -> Result<OrderRecord, OrderError> {
        self.record_with(n, &|n| n)
    }

    /// Record for the sequence of length `length_transform(base_length)`.
    pub fn record_with(
        &self,
        base_length: usize,
        length_transform: &dyn Fn(usize) -> usize,
    ) -> Result<OrderRecord, OrderError> {
        self.try_record_with(base_length, &|n| Some(length_transform(n)))
    }

    /// Like [`OrderEngine::record_with`] for a transform that can fail, e.g. by
    /// checked arithmetic. `None`, or a length above [`MAX_LENGTH`], is reported
    /// as [`OrderError::LengthOverflow`].
    pub fn try_record_with(
        &self,
        base_length: usize,
        length_transform: &dyn Fn(usize) -> Option<usize>,
    ) -> Result<OrderRecord, OrderError> {
        let length = length_transform(base_length)
            .filter(|&length| length <= MAX_LENGTH)
            .ok_or(OrderError::LengthOverflow { base_length })?;
        let identity: Vec<usize> = (0..length).collect();
        let image = self.algorithm(&identity);

        let permutation = timed(
            self.timing(),
            "make_perm",
            format_args!("<Iterable, len: {}>", image.len()),
            || Permutation::from_image_with_len(image, length),
        )
        .map_err(|source| OrderError::InvalidPermutation { length, source })?;

        let (cycle_structure, order) = timed(
            self.timing(),
            "get_order",
            PermSummary(&permutation),
            || {
                let structure = permutation.cycle_structure();
                let order = Permutation::order_of_structure(&structure);
                (structure, order)
            },
        );

        debug!(base_length, length, %order, cycles = cycle_structure.len(), "computed order");

        Ok(OrderRecord {
            base_length,
            length,
            permutation,
            order,
            cycle_structure,
        })
    }

    /// Counts how many applications of the transform bring the identity sequence
    /// back to itself, starting from the once-transformed sequence of `record`.
    ///
    /// Fails with [`OrderError::OrderBoundExceeded`] if the count would pass the
    /// configured upper bound.
    pub fn measure_order(&self, record: &OrderRecord) -> Result<usize, OrderError> {
        let identity: Vec<usize> = (0..record.length).collect();
        let mut current = record.permutation.map().to_vec();
        let mut iterations = 1;

        while current != identity {
            if iterations >= self.upper_bound {
                return Err(OrderError::OrderBoundExceeded {
                    length: record.length,
                    bound: self.upper_bound,
                });
            }
            current = self.algorithm(&current);
            iterations += 1;
        }

        Ok(iterations)
    }

    /// Measures the order of `record` and compares it with its analytic order.
    pub fn check_order(&self, record: &OrderRecord) -> Result<usize, OrderError> {
        let empirical = self.measure_order(record)?;
        if BigUint::from(empirical) != record.order {
            return Err(OrderError::OrderMismatch {
                length: record.length,
                analytic: record.order.clone(),
                empirical,
            });
        }
        Ok(empirical)
    }
}

#[cfg(test)]
mod test;
