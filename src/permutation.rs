//! # Permutations
//!
//! This module provides a `Permutation` struct for representing permutations of
//! `0..n` produced by a sequence transform, together with the cycle data needed
//! to compute their order.
//!
//! ## Key Features:
//!
//! - **Representation**: A `Permutation` is stored by its direct mapping (`map[i]` is
//!   the image of `i`) and its inverse mapping.
//! - **Construction**: from an image array, validated: `Permutation::from_image(vec![...])`,
//!   `Permutation::from_image_with_len(vec![...], n)`.
//! - **Cycle Utilities**:
//!   - Cycle lengths and cycle structure: `p.cycle_lengths()`, `p.cycle_structure()`.
//!   - Order as an arbitrary precision integer: `p.order()`.

use std::collections::BTreeMap;

use bitvec::vec::BitVec;
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::One;
use thiserror::Error;

/// A permutation of `0..n`.
///
/// # Examples
///
/// ```
/// use num_bigint::BigUint;
/// use pivrot::permutation::Permutation;
///
/// // 0->2, 1->0, 2->1, 3->3
/// let p = Permutation::from_image(vec![2, 0, 1, 3]).unwrap();
///
/// assert_eq!(p.cycle_lengths(), vec![3, 1]);
/// assert_eq!(p.order(), BigUint::from(3u32));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Permutation {
    map: Vec<usize>,
    inv: Vec<usize>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PermutationError {
    #[error("image has length {found}, expected a permutation of 0..{expected}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("image value {value} at index {index} is out of range for length {len}")]
    OutOfRange {
        index: usize,
        value: usize,
        len: usize,
    },

    #[error("image value {value} appears at both index {first} and index {second}")]
    Duplicate {
        value: usize,
        first: usize,
        second: usize,
    },
}

impl Permutation {
    // --------------------------------------------------------------------------------------------
    // Basic Constructors and Accessors
    // --------------------------------------------------------------------------------------------

    /// Creates a permutation from an image array: `image[i]` is where `i` is sent.
    /// The domain is `0..image.len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use pivrot::permutation::{Permutation, PermutationError};
    /// let p = Permutation::from_image(vec![1, 2, 0]).unwrap();
    /// assert_eq!(p.inv(), &[2, 0, 1]);
    ///
    /// assert_eq!(
    ///     Permutation::from_image(vec![0, 0]),
    ///     Err(PermutationError::Duplicate { value: 0, first: 0, second: 1 })
    /// );
    /// ```
    pub fn from_image(image: Vec<usize>) -> Result<Self, PermutationError> {
        let len = image.len();
        Self::from_image_with_len(image, len)
    }

    /// Like [`Permutation::from_image`], but also checks that the image covers
    /// exactly the domain `0..len`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use pivrot::permutation::{Permutation, PermutationError};
    /// assert_eq!(
    ///     Permutation::from_image_with_len(vec![1, 0], 3),
    ///     Err(PermutationError::LengthMismatch { expected: 3, found: 2 })
    /// );
    /// ```
    pub fn from_image_with_len(image: Vec<usize>, len: usize) -> Result<Self, PermutationError> {
        if image.len() != len {
            return Err(PermutationError::LengthMismatch {
                expected: len,
                found: image.len(),
            });
        }

        let mut preimage: Vec<Option<usize>> = vec![None; len];
        for (index, &value) in image.iter().enumerate() {
            if value >= len {
                return Err(PermutationError::OutOfRange { index, value, len });
            }
            if let Some(first) = preimage[value] {
                return Err(PermutationError::Duplicate {
                    value,
                    first,
                    second: index,
                });
            }
            preimage[value] = Some(index);
        }

        // len distinct values in 0..len: every slot is filled
        let inv: Vec<usize> = preimage.into_iter().flatten().collect();
        debug_assert_eq!(inv.len(), len);

        Ok(Permutation { map: image, inv })
    }

    /// Returns the internal mapping as a slice.
    ///
    /// # Examples
    ///
    /// ```
    /// # use pivrot::permutation::Permutation;
    /// let p = Permutation::from_image(vec![2, 0, 1]).unwrap();
    /// assert_eq!(p.map(), &[2, 0, 1]);
    /// ```
    pub fn map(&self) -> &[usize] {
        &self.map
    }

    /// Returns the inverse mapping as a slice.
    pub fn inv(&self) -> &[usize] {
        &self.inv
    }

    pub fn length(&self) -> usize {
        self.map.len()
    }

    // --------------------------------------------------------------------------------------------
    // Cycles and Order
    // --------------------------------------------------------------------------------------------

    /// Lengths of the cycles of `self`, ordered by their smallest element.
    /// Fixed points are cycles of length one.
    ///
    /// # Examples
    ///
    /// ```
    /// # use pivrot::permutation::Permutation;
    /// let p = Permutation::from_image(vec![5, 1, 3, 6, 4, 2, 0]).unwrap();
    /// assert_eq!(p.cycle_lengths(), vec![5, 1, 1]);
    /// ```
    pub fn cycle_lengths(&self) -> Vec<usize> {
        let mut visited: BitVec = BitVec::repeat(false, self.map.len());
        let mut lengths = Vec::new();
        for i in 0..self.map.len() {
            if visited[i] {
                continue;
            }
            let mut len = 0;
            let mut j = i;
            while !visited[j] {
                visited.set(j, true);
                len += 1;
                j = self.map[j];
            }
            lengths.push(len);
        }
        lengths
    }

    /// Maps each cycle length to the number of cycles of that length.
    ///
    /// # Examples
    ///
    /// ```
    /// # use pivrot::permutation::Permutation;
    /// let p = Permutation::from_image(vec![3, 1, 2, 0]).unwrap();
    /// let structure = p.cycle_structure();
    /// assert_eq!(structure.into_iter().collect::<Vec<_>>(), vec![(1, 2), (2, 1)]);
    /// ```
    pub fn cycle_structure(&self) -> BTreeMap<usize, usize> {
        let mut structure = BTreeMap::new();
        for len in self.cycle_lengths() {
            *structure.entry(len).or_insert(0) += 1;
        }
        debug_assert_eq!(
            structure.iter().map(|(len, count)| len * count).sum::<usize>(),
            self.length(),
            "cycle lengths must partition the domain"
        );
        structure
    }

    /// The order of `self`: the least common multiple of its cycle lengths.
    /// The empty permutation has order one.
    pub fn order(&self) -> BigUint {
        Self::order_of_structure(&self.cycle_structure())
    }

    /// Order from an already computed cycle structure.
    pub fn order_of_structure(structure: &BTreeMap<usize, usize>) -> BigUint {
        structure
            .keys()
            .fold(BigUint::one(), |acc, &len| acc.lcm(&BigUint::from(len)))
    }
}
