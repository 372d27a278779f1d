use crate::chacha::State;
use crate::util::*;
use core::ops::Add;

pub struct Soft;

impl Backend for Soft {
    type Wide = Matrix<LANES>;
    type Narrow = Matrix<1>;
}

/// `N` independent ChaCha matrices, stored row-wise so each row is a plain
/// `[u32; 4]` the compiler can keep in a vector register.
#[derive(Clone)]
#[repr(C)]
pub struct Matrix<const N: usize> {
    state: [[Row; ROWS]; N],
}

impl<const N: usize> Add for Matrix<N> {
    type Output = Self;

    #[inline]
    fn add(mut self, rhs: Self) -> Self::Output {
        for (lane, rhs) in self.state.iter_mut().zip(rhs.state.iter()) {
            for (row, rhs) in lane.iter_mut().zip(rhs.iter()) {
                add(row, rhs);
            }
        }
        self
    }
}

#[inline(always)]
fn add(x: &mut Row, y: &Row) {
    for (x, y) in x.0.iter_mut().zip(y.0) {
        *x = x.wrapping_add(y);
    }
}

#[inline(always)]
fn xor_rotate<const SHIFT: u32>(x: &mut Row, y: &Row) {
    for (x, y) in x.0.iter_mut().zip(y.0) {
        *x = (*x ^ y).rotate_left(SHIFT);
    }
}

impl<const N: usize> Matrix<N> {
    /// Every step runs across all lanes before the next one starts, so the
    /// lanes advance in lock-step.
    #[inline(always)]
    fn quarter_round(&mut self) {
        for [a, b, _, d] in self.state.iter_mut() {
            add(a, b);
            xor_rotate::<16>(d, a);
        }
        for [_, b, c, d] in self.state.iter_mut() {
            add(c, d);
            xor_rotate::<12>(b, c);
        }
        for [a, b, _, d] in self.state.iter_mut() {
            add(a, b);
            xor_rotate::<8>(d, a);
        }
        for [_, b, c, d] in self.state.iter_mut() {
            add(c, d);
            xor_rotate::<7>(b, c);
        }
    }

    #[inline(always)]
    fn make_diagonal(&mut self) {
        for [_, b, c, d] in self.state.iter_mut() {
            b.0.rotate_left(1);
            c.0.rotate_left(2);
            d.0.rotate_left(3);
        }
    }

    #[inline(always)]
    fn unmake_diagonal(&mut self) {
        for [_, b, c, d] in self.state.iter_mut() {
            b.0.rotate_left(3);
            c.0.rotate_left(2);
            d.0.rotate_left(1);
        }
    }
}

impl<const N: usize> Machine for Matrix<N> {
    const LANES: usize = N;

    #[inline]
    fn new(state: &State) -> Self {
        let mut counter_nonce = state.counter_nonce;
        Matrix {
            state: core::array::from_fn(|_| {
                let rows = [SIGMA, state.key_low, state.key_high, counter_nonce];
                counter_nonce = counter_nonce.add_u64x2(ONE);
                rows
            }),
        }
    }

    #[inline]
    fn double_round(&mut self) {
        // Column rounds
        self.quarter_round();
        // Diagonal rounds
        self.make_diagonal();
        self.quarter_round();
        self.unmake_diagonal();
    }

    #[inline]
    fn apply(self, buf: &mut [u8]) {
        for (block, lane) in buf.chunks_exact_mut(BLOCK_LEN).zip(self.state.iter()) {
            let words = lane.iter().flat_map(|row| row.0);
            for (chunk, word) in block.chunks_exact_mut(4).zip(words) {
                for (byte, key) in chunk.iter_mut().zip(word.to_le_bytes()) {
                    *byte ^= key;
                }
            }
        }
    }

    #[inline]
    fn lane(&self, index: usize) -> [Row; ROWS] {
        self.state[index]
    }
}
