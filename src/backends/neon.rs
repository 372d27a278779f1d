use crate::chacha::State;
use crate::util::*;
use core::arch::aarch64::*;
use core::ops::Add;

pub struct Neon;

impl Backend for Neon {
    type Wide = Matrix<LANES>;
    type Narrow = Matrix<1>;
}

#[derive(Clone)]
#[repr(C)]
pub struct Matrix<const N: usize> {
    state: [[uint32x4_t; ROWS]; N],
}

impl<const N: usize> Add for Matrix<N> {
    type Output = Self;

    #[inline]
    fn add(mut self, rhs: Self) -> Self::Output {
        unsafe {
            for (lane, rhs) in self.state.iter_mut().zip(rhs.state.iter()) {
                for (row, rhs) in lane.iter_mut().zip(rhs.iter()) {
                    *row = vaddq_u32(*row, *rhs);
                }
            }
            self
        }
    }
}

macro_rules! rotate_left_epi32 {
    ($value:expr, $LEFT_SHIFT:expr) => {{
        const RIGHT_SHIFT: i32 = 32 - $LEFT_SHIFT;
        let left_shift = vshlq_n_u32($value, $LEFT_SHIFT);
        let right_shift = vshrq_n_u32($value, RIGHT_SHIFT);
        vorrq_u32(left_shift, right_shift)
    }};
}

#[inline(always)]
unsafe fn load(row: &Row) -> uint32x4_t {
    unsafe { vld1q_u32(row.0.as_ptr()) }
}

impl<const N: usize> Matrix<N> {
    #[inline]
    fn quarter_round(&mut self) {
        unsafe {
            for [a, b, _, d] in self.state.iter_mut() {
                *a = vaddq_u32(*a, *b);
                *d = veorq_u32(*d, *a);
                *d = rotate_left_epi32!(*d, 16);
            }
            for [_, b, c, d] in self.state.iter_mut() {
                *c = vaddq_u32(*c, *d);
                *b = veorq_u32(*b, *c);
                *b = rotate_left_epi32!(*b, 12);
            }
            for [a, b, _, d] in self.state.iter_mut() {
                *a = vaddq_u32(*a, *b);
                *d = veorq_u32(*d, *a);
                *d = rotate_left_epi32!(*d, 8);
            }
            for [_, b, c, d] in self.state.iter_mut() {
                *c = vaddq_u32(*c, *d);
                *b = veorq_u32(*b, *c);
                *b = rotate_left_epi32!(*b, 7);
            }
        }
    }

    #[inline]
    fn make_diagonal(&mut self) {
        unsafe {
            for [_, b, c, d] in self.state.iter_mut() {
                *b = vextq_u32(*b, *b, 1);
                *c = vextq_u32(*c, *c, 2);
                *d = vextq_u32(*d, *d, 3);
            }
        }
    }

    #[inline]
    fn unmake_diagonal(&mut self) {
        unsafe {
            for [_, b, c, d] in self.state.iter_mut() {
                *b = vextq_u32(*b, *b, 3);
                *c = vextq_u32(*c, *c, 2);
                *d = vextq_u32(*d, *d, 1);
            }
        }
    }
}

impl<const N: usize> Machine for Matrix<N> {
    const LANES: usize = N;

    #[inline]
    fn new(state: &State) -> Self {
        unsafe {
            let sigma = load(&SIGMA);
            let one = vreinterpretq_u64_u32(load(&ONE));
            let key_low = load(&state.key_low);
            let key_high = load(&state.key_high);
            let mut counter_nonce = load(&state.counter_nonce);
            Matrix {
                state: core::array::from_fn(|_| {
                    let rows = [sigma, key_low, key_high, counter_nonce];
                    let counter = vaddq_u64(vreinterpretq_u64_u32(counter_nonce), one);
                    counter_nonce = vreinterpretq_u32_u64(counter);
                    rows
                }),
            }
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
        unsafe {
            for (block, lane) in buf.chunks_exact_mut(BLOCK_LEN).zip(self.state.iter()) {
                for (chunk, row) in block.chunks_exact_mut(ROW_LEN).zip(lane.iter()) {
                    let ptr = chunk.as_mut_ptr();
                    vst1q_u8(ptr, veorq_u8(vld1q_u8(ptr), vreinterpretq_u8_u32(*row)));
                }
            }
        }
    }

    #[inline]
    fn lane(&self, index: usize) -> [Row; ROWS] {
        let mut result = [Row::default(); ROWS];
        unsafe {
            for (out, row) in result.iter_mut().zip(self.state[index].iter()) {
                vst1q_u32(out.0.as_mut_ptr(), *row);
            }
        }
        result
    }
}
