use crate::chacha::State;
use crate::rounds::*;
use core::ops::Add;

/// Size (in 8-bit integers) of a single keystream block.
pub const BLOCK_LEN: usize = ROWS * ROW_LEN;
/// Size (in 8-bit integers) of a ChaCha key.
pub const KEY_LEN: usize = 2 * ROW_LEN;
/// Size (in 8-bit integers) of a nonce. The other half of the last row is the counter.
pub const NONCE_LEN: usize = ROW_LEN / 2;
/// Size (in 8-bit integers) of a serialized [`State`].
pub const STATE_LEN: usize = (ROWS - 1) * ROW_LEN;
/// Size (in 8-bit integers) of the HChaCha input and output.
pub const HCHACHA_INPUT_LEN: usize = ROW_LEN;
pub const HCHACHA_OUTPUT_LEN: usize = 2 * ROW_LEN;
/// Size (in 8-bit integers) of an XChaCha nonce: HChaCha input, then the nonce proper.
pub const XNONCE_LEN: usize = HCHACHA_INPUT_LEN + NONCE_LEN;
/// The amount of distinct blocks the wide path processes per iteration.
pub const LANES: usize = 3;
pub const ROWS: usize = 4;
pub const ROW_LEN: usize = size_of::<Row>();

/// Standard constant used in all ChaCha implementations ("expand 32-byte k").
pub const SIGMA: Row = Row([0x6170_7865, 0x3320_646e, 0x7962_2d32, 0x6b20_6574]);
/// The 64-bit integer 1 in the low half of a row. Adding this with a 64-bit
/// lane add moves the counter forward by one block, carry included.
pub const ONE: Row = Row([1, 0, 0, 0]);

/// One row of the ChaCha matrix: four 32-bit words, which is exactly one
/// 128-bit vector on the SIMD backends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(C, align(16))]
pub struct Row(pub [u32; 4]);

impl Row {
    #[inline(always)]
    pub fn from_le_bytes(bytes: [u8; ROW_LEN]) -> Self {
        let mut words = [0; 4];
        for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
            *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Self(words)
    }

    #[inline(always)]
    pub fn to_le_bytes(self) -> [u8; ROW_LEN] {
        let mut bytes = [0; ROW_LEN];
        for (chunk, word) in bytes.chunks_exact_mut(4).zip(self.0) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        bytes
    }

    /// Treats both rows as two 64-bit lanes (low word first) and adds them
    /// lane-wise. This is what `paddq` does, spelled out for 32-bit words.
    #[inline(always)]
    pub fn add_u64x2(self, rhs: Self) -> Self {
        let [a0, a1, a2, a3] = self.0;
        let [b0, b1, b2, b3] = rhs.0;
        let lo = join(a0, a1).wrapping_add(join(b0, b1));
        let hi = join(a2, a3).wrapping_add(join(b2, b3));
        Self([lo as u32, (lo >> 32) as u32, hi as u32, (hi >> 32) as u32])
    }
}

#[inline(always)]
pub fn join(low: u32, high: u32) -> u64 {
    (high as u64) << 32 | low as u64
}

/// Defines the interface that concrete implementations need to
/// implement to process `LANES` independent ChaCha blocks at once.
pub trait Machine
where
    Self: Add<Output = Self> + Clone,
{
    /// Number of blocks produced by one invocation.
    const LANES: usize;

    /// Loads the matrix for every lane. Lane `k` gets the counter of `state`
    /// plus `k`, computed by repeatedly adding [`ONE`].
    fn new(state: &State) -> Self;

    /// One column round followed by one diagonal round, on every lane.
    fn double_round(&mut self);

    /// XORs lane `k` into `buf[k * BLOCK_LEN..][..BLOCK_LEN]`.
    fn apply(self, buf: &mut [u8]);

    /// Raw rows of a single lane, for consumers that skip the feed-forward.
    fn lane(&self, index: usize) -> [Row; ROWS];

    #[inline(always)]
    fn chacha<R: DoubleRounds>(state: &State, buf: &mut [u8]) {
        debug_assert_eq!(buf.len(), Self::LANES * BLOCK_LEN);
        let old = Self::new(state);
        let mut cur = old.clone();
        for _ in 0..R::COUNT {
            cur.double_round();
        }
        let result = cur + old;
        result.apply(buf);
    }
}

/// Pairs the wide and serial machine of one architecture.
pub trait Backend {
    /// [`LANES`] blocks per invocation.
    type Wide: Machine;
    /// A single block per invocation, for the remainder.
    type Narrow: Machine;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigma_matches_ascii() {
        assert_eq!(SIGMA.to_le_bytes(), *b"expand 32-byte k");
    }

    #[test]
    fn row_byte_order() {
        let row = Row::from_le_bytes(
            *b"\x01\x00\x00\x00\x00\x01\x00\x00\x00\x00\x01\x00\x00\x00\x00\x01",
        );
        assert_eq!(row, Row([1, 1 << 8, 1 << 16, 1 << 24]));
        assert_eq!(Row::from_le_bytes(row.to_le_bytes()), row);
    }

    #[test]
    fn add_u64x2_carries_within_lanes_only() {
        let row = Row([u32::MAX, 7, u32::MAX, u32::MAX]);
        assert_eq!(row.add_u64x2(ONE), Row([0, 8, u32::MAX, u32::MAX]));

        // Low lane wraps without touching the high lane.
        let row = Row([u32::MAX, u32::MAX, 5, 6]);
        assert_eq!(row.add_u64x2(ONE), Row([0, 0, 5, 6]));
    }
}
