/*!
Module containing the standard ChaCha round counts.

Each type counts *double* rounds, so `R20` runs the mixer ten times.
*/

pub trait DoubleRounds {
    const COUNT: usize;
}

/// ChaCha8 (reduced round, *not recommended* outside of RNG use).
pub struct R8;
impl DoubleRounds for R8 {
    const COUNT: usize = 4;
}

/// ChaCha12 (reduced round).
pub struct R12;
impl DoubleRounds for R12 {
    const COUNT: usize = 6;
}

/// ChaCha20 (full strength).
pub struct R20;
impl DoubleRounds for R20 {
    const COUNT: usize = 10;
}
