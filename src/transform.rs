//! # Sequence transforms
//!
//! A [`SequenceTransform`] rearranges an ordered sequence into a new one. It
//! never looks at the elements themselves, so applying it to the identity
//! sequence `0..n` yields the image array of the permutation it induces.
//!
//! [`PivotRotation`] is the transform this crate studies: pop the front of the
//! remaining input onto the front of the output, then rotate the remaining
//! input left by one, until the input is exhausted.

use std::collections::VecDeque;

/// A pure, position-only rearrangement of a sequence.
///
/// Implementors must return a sequence of the same length containing exactly
/// the input's elements, and must not depend on the element values.
pub trait SequenceTransform {
    fn apply<T: Clone>(&self, input: &[T]) -> Vec<T>;

    /// Applies the transform `k` times. `k = 0` returns a copy of the input.
    fn apply_k<T: Clone>(&self, input: &[T], k: usize) -> Vec<T> {
        let mut current = input.to_vec();
        for _ in 0..k {
            current = self.apply(&current);
        }
        current
    }
}

/// The pivot-rotation transform.
///
/// # Examples
///
/// ```
/// use pivrot::transform::{PivotRotation, SequenceTransform};
///
/// assert_eq!(PivotRotation.apply(&[0, 1, 2]), vec![1, 2, 0]);
/// assert_eq!(PivotRotation.apply_k(&[0, 1, 2], 3), vec![0, 1, 2]);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PivotRotation;

impl SequenceTransform for PivotRotation {
    fn apply<T: Clone>(&self, input: &[T]) -> Vec<T> {
        let mut remaining: VecDeque<T> = input.iter().cloned().collect();
        let mut output = VecDeque::with_capacity(remaining.len());
        while let Some(front) = remaining.pop_front() {
            output.push_front(front);
            if !remaining.is_empty() {
                remaining.rotate_left(1);
            }
        }
        output.into()
    }
}

/// Image of the permutation induced by one application of `transform` on
/// `len` positions.
pub fn image_of<S: SequenceTransform>(transform: &S, len: usize) -> Vec<usize> {
    let identity: Vec<usize> = (0..len).collect();
    transform.apply(&identity)
}
