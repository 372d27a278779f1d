use crate::chacha::State;
use crate::util::*;
#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;
use core::ops::Add;

pub struct Sse2;

impl Backend for Sse2 {
    type Wide = Matrix<LANES>;
    type Narrow = Matrix<1>;
}

#[derive(Clone)]
#[repr(C)]
pub struct Matrix<const N: usize> {
    state: [[__m128i; ROWS]; N],
}

impl<const N: usize> Add for Matrix<N> {
    type Output = Self;

    #[inline]
    fn add(mut self, rhs: Self) -> Self::Output {
        unsafe {
            for (lane, rhs) in self.state.iter_mut().zip(rhs.state.iter()) {
                for (row, rhs) in lane.iter_mut().zip(rhs.iter()) {
                    *row = _mm_add_epi32(*row, *rhs);
                }
            }
            self
        }
    }
}

macro_rules! rotate_left_epi32 {
    ($value:expr, $LEFT_SHIFT:expr) => {{
        const RIGHT_SHIFT: i32 = 32 - $LEFT_SHIFT;
        let left_shift = _mm_slli_epi32($value, $LEFT_SHIFT);
        let right_shift = _mm_srli_epi32($value, RIGHT_SHIFT);
        _mm_or_si128(left_shift, right_shift)
    }};
}

#[inline(always)]
unsafe fn load(row: &Row) -> __m128i {
    unsafe { _mm_loadu_si128(row.0.as_ptr().cast()) }
}

impl<const N: usize> Matrix<N> {
    #[inline]
    fn quarter_round(&mut self) {
        unsafe {
            for [a, b, _, d] in self.state.iter_mut() {
                *a = _mm_add_epi32(*a, *b);
                *d = _mm_xor_si128(*d, *a);
                *d = rotate_left_epi32!(*d, 16);
            }
            for [_, b, c, d] in self.state.iter_mut() {
                *c = _mm_add_epi32(*c, *d);
                *b = _mm_xor_si128(*b, *c);
                *b = rotate_left_epi32!(*b, 12);
            }
            for [a, b, _, d] in self.state.iter_mut() {
                *a = _mm_add_epi32(*a, *b);
                *d = _mm_xor_si128(*d, *a);
                *d = rotate_left_epi32!(*d, 8);
            }
            for [_, b, c, d] in self.state.iter_mut() {
                *c = _mm_add_epi32(*c, *d);
                *b = _mm_xor_si128(*b, *c);
                *b = rotate_left_epi32!(*b, 7);
            }
        }
    }

    #[inline]
    fn make_diagonal(&mut self) {
        unsafe {
            for [_, b, c, d] in self.state.iter_mut() {
                *b = _mm_shuffle_epi32(*b, 0b_00_11_10_01);
                *c = _mm_shuffle_epi32(*c, 0b_01_00_11_10);
                *d = _mm_shuffle_epi32(*d, 0b_10_01_00_11);
            }
        }
    }

    #[inline]
    fn unmake_diagonal(&mut self) {
        unsafe {
            for [_, b, c, d] in self.state.iter_mut() {
                *b = _mm_shuffle_epi32(*b, 0b_10_01_00_11);
                *c = _mm_shuffle_epi32(*c, 0b_01_00_11_10);
                *d = _mm_shuffle_epi32(*d, 0b_00_11_10_01);
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
            let one = load(&ONE);
            let key_low = load(&state.key_low);
            let key_high = load(&state.key_high);
            let mut counter_nonce = load(&state.counter_nonce);
            Matrix {
                state: core::array::from_fn(|_| {
                    let rows = [sigma, key_low, key_high, counter_nonce];
                    counter_nonce = _mm_add_epi64(counter_nonce, one);
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
                    let ptr = chunk.as_mut_ptr().cast::<__m128i>();
                    _mm_storeu_si128(ptr, _mm_xor_si128(_mm_loadu_si128(ptr), *row));
                }
            }
        }
    }

    #[inline]
    fn lane(&self, index: usize) -> [Row; ROWS] {
        let mut result = [Row::default(); ROWS];
        unsafe {
            for (out, row) in result.iter_mut().zip(self.state[index].iter()) {
                _mm_storeu_si128(out.0.as_mut_ptr().cast(), *row);
            }
        }
        result
    }
}
