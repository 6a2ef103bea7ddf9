//! # Pivrot
//!
//! Pivrot studies the permutation induced by the *pivot rotation* of a sequence:
//! repeatedly move the front of the remaining input to the front of the output,
//! then rotate the remaining input left by one.
//!
//! For each sequence length the library computes the order of that permutation
//! from its cycle structure, can verify it by re-applying the transform until
//! the sequence returns to its starting arrangement, and tabulates the results
//! over ranges of lengths or lists of primes.

pub mod engine;
pub mod lengths;
pub mod permutation;
pub mod report;
pub mod timing;
pub mod transform;
