use crate::rounds::*;
use crate::util::*;
use core::marker::PhantomData;

#[cfg(feature = "zeroize")]
use zeroize::{Zeroize, ZeroizeOnDrop};

/// The 48 mutable bytes of a ChaCha matrix: everything except the constants.
///
/// Serialized as twelve little-endian 32-bit words:
///
/// ```text
/// Key      Key      Key      Key
/// Key      Key      Key      Key
/// Counter  Counter  Nonce    Nonce
/// ```
///
/// The counter is a 64-bit integer, low word first.
#[derive(Clone)]
#[repr(C)]
pub struct State {
    pub(crate) key_low: Row,
    pub(crate) key_high: Row,
    pub(crate) counter_nonce: Row,
}

impl From<[u8; STATE_LEN]> for State {
    #[inline(always)]
    fn from(value: [u8; STATE_LEN]) -> Self {
        let row = |index: usize| {
            let mut bytes = [0; ROW_LEN];
            bytes.copy_from_slice(&value[index * ROW_LEN..][..ROW_LEN]);
            Row::from_le_bytes(bytes)
        };
        Self {
            key_low: row(0),
            key_high: row(1),
            counter_nonce: row(2),
        }
    }
}

impl TryFrom<&[u8]> for State {
    type Error = core::array::TryFromSliceError;

    #[inline]
    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let bytes: [u8; STATE_LEN] = value.try_into()?;
        Ok(bytes.into())
    }
}

impl State {
    /// Builds a state for `key` and `nonce` with the counter at zero.
    #[inline]
    pub fn new(key: &[u8; KEY_LEN], nonce: &[u8; NONCE_LEN]) -> Self {
        Self::with_counter(key, nonce, 0)
    }

    #[inline]
    pub fn with_counter(key: &[u8; KEY_LEN], nonce: &[u8; NONCE_LEN], counter: u64) -> Self {
        let mut last = [0; ROW_LEN];
        last[..NONCE_LEN].copy_from_slice(&counter.to_le_bytes());
        last[NONCE_LEN..].copy_from_slice(nonce);
        Self::from_key_and_row(key, Row::from_le_bytes(last))
    }

    #[inline(always)]
    pub(crate) fn from_key_and_row(key: &[u8; KEY_LEN], counter_nonce: Row) -> Self {
        let mut low = [0; ROW_LEN];
        let mut high = [0; ROW_LEN];
        low.copy_from_slice(&key[..ROW_LEN]);
        high.copy_from_slice(&key[ROW_LEN..]);
        Self {
            key_low: Row::from_le_bytes(low),
            key_high: Row::from_le_bytes(high),
            counter_nonce,
        }
    }

    /// Index of the next block this state will produce.
    #[inline]
    pub fn counter(&self) -> u64 {
        let [low, high, ..] = self.counter_nonce.0;
        join(low, high)
    }

    #[inline]
    pub fn set_counter(&mut self, counter: u64) {
        self.counter_nonce.0[0] = counter as u32;
        self.counter_nonce.0[1] = (counter >> 32) as u32;
    }

    #[inline]
    pub fn nonce(&self) -> [u8; NONCE_LEN] {
        let mut nonce = [0; NONCE_LEN];
        nonce.copy_from_slice(&self.counter_nonce.to_le_bytes()[NONCE_LEN..]);
        nonce
    }

    pub fn to_bytes(&self) -> [u8; STATE_LEN] {
        let mut bytes = [0; STATE_LEN];
        let rows = [self.key_low, self.key_high, self.counter_nonce];
        for (chunk, row) in bytes.chunks_exact_mut(ROW_LEN).zip(rows) {
            chunk.copy_from_slice(&row.to_le_bytes());
        }
        bytes
    }

    /// 64-bit add on the counter; the nonce never changes.
    #[inline(always)]
    fn advance(&mut self, blocks: u64) {
        let increment = Row([blocks as u32, (blocks >> 32) as u32, 0, 0]);
        self.counter_nonce = self.counter_nonce.add_u64x2(increment);
    }
}

#[cfg(feature = "zeroize")]
impl Zeroize for State {
    fn zeroize(&mut self) {
        self.key_low.0.zeroize();
        self.key_high.0.zeroize();
        self.counter_nonce.0.zeroize();
    }
}

#[cfg(feature = "zeroize")]
impl Drop for State {
    fn drop(&mut self) {
        self.zeroize();
    }
}

#[cfg(feature = "zeroize")]
impl ZeroizeOnDrop for State {}

/// Keystream generator over backend `B` with `R` double rounds.
///
/// Holds no data of its own. Every call reads the counter from the given
/// [`State`], produces the requested blocks, and writes the counter back.
/// Running the counter past 2<sup>64</sup> blocks (2<sup>70</sup> bytes) for one
/// key/nonce pair wraps it and repeats keystream; staying below that is up to
/// the caller.
pub struct ChaChaCore<B, R> {
    _pd1: PhantomData<B>,
    _pd2: PhantomData<R>,
}

impl<B, R> ChaChaCore<B, R>
where
    B: Backend,
    R: DoubleRounds,
{
    /// Writes `input ^ keystream` to `output` for `blocks` 64-byte blocks.
    ///
    /// Both buffers must hold exactly `blocks * BLOCK_LEN` bytes.
    #[inline]
    pub fn xor_blocks(state: &mut State, input: &[u8], output: &mut [u8], blocks: usize) {
        let len = blocks * BLOCK_LEN;
        debug_assert_eq!(input.len(), len);
        debug_assert_eq!(output.len(), len);
        let output = &mut output[..len];
        output.copy_from_slice(&input[..len]);
        Self::apply_keystream(state, output, blocks);
    }

    /// Writes the raw keystream to `output`, as if encrypting zeroes.
    #[inline]
    pub fn keystream(state: &mut State, output: &mut [u8], blocks: usize) {
        let len = blocks * BLOCK_LEN;
        debug_assert_eq!(output.len(), len);
        output[..len].fill(0);
        Self::apply_keystream(state, output, blocks);
    }

    /// XORs the keystream into `buf` in place.
    ///
    /// Blocks are produced three at a time on the wide machine, and the
    /// remaining zero to two blocks one at a time on the narrow machine.
    /// Block `i` always uses counter `start + i`, so both paths agree.
    #[inline(never)]
    pub fn apply_keystream(state: &mut State, buf: &mut [u8], blocks: usize) {
        let len = blocks * BLOCK_LEN;
        debug_assert_eq!(buf.len(), len);
        let mut working = state.clone();

        let mut groups = buf[..len].chunks_exact_mut(LANES * BLOCK_LEN);
        for group in &mut groups {
            B::Wide::chacha::<R>(&working, group);
            working.advance(LANES as u64);
        }
        for block in groups.into_remainder().chunks_exact_mut(BLOCK_LEN) {
            B::Narrow::chacha::<R>(&working, block);
            working.advance(1);
        }

        state.counter_nonce = working.counter_nonce;
    }

    /// HChaCha: the ChaCha permutation over `key` and a 16-byte `input` in
    /// place of the counter and nonce, without the feed-forward add. Returns
    /// the constant row followed by the counter/nonce row.
    pub fn hchacha(
        key: &[u8; KEY_LEN],
        input: &[u8; HCHACHA_INPUT_LEN],
    ) -> [u8; HCHACHA_OUTPUT_LEN] {
        let state = State::from_key_and_row(key, Row::from_le_bytes(*input));
        let mut matrix = B::Narrow::new(&state);
        for _ in 0..R::COUNT {
            matrix.double_round();
        }
        let [a, _, _, d] = matrix.lane(0);
        let mut result = [0; HCHACHA_OUTPUT_LEN];
        result[..ROW_LEN].copy_from_slice(&a.to_le_bytes());
        result[ROW_LEN..].copy_from_slice(&d.to_le_bytes());
        result
    }

    /// XChaCha: derives a subkey from `key` and the first 16 bytes of the
    /// 24-byte `nonce` with [`hchacha`](Self::hchacha), then keys a state with
    /// it and the last 8 nonce bytes. The counter starts at zero.
    pub fn xchacha_state(key: &[u8; KEY_LEN], nonce: &[u8; XNONCE_LEN]) -> State {
        let mut input = [0; HCHACHA_INPUT_LEN];
        let mut short_nonce = [0; NONCE_LEN];
        input.copy_from_slice(&nonce[..HCHACHA_INPUT_LEN]);
        short_nonce.copy_from_slice(&nonce[HCHACHA_INPUT_LEN..]);

        #[allow(unused_mut)]
        let mut subkey = Self::hchacha(key, &input);
        let state = State::new(&subkey, &short_nonce);
        #[cfg(feature = "zeroize")]
        subkey.zeroize();
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; KEY_LEN] = [
        1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25,
        26, 27, 28, 29, 30, 31, 32,
    ];
    const NONCE: [u8; NONCE_LEN] = [0xa0, 0xa1, 0xa2, 0xa3, 0xa4, 0xa5, 0xa6, 0xa7];

    #[test]
    fn layout() {
        let state = State::with_counter(&KEY, &NONCE, 0x0102_0304_0506_0708);
        let bytes = state.to_bytes();
        assert_eq!(bytes[..KEY_LEN], KEY);
        assert_eq!(bytes[32..40], [8, 7, 6, 5, 4, 3, 2, 1]);
        assert_eq!(bytes[40..], NONCE);
        assert_eq!(
            state.counter_nonce.0,
            [0x0506_0708, 0x0102_0304, 0xa3a2_a1a0, 0xa7a6_a5a4]
        );

        let restored = State::from(bytes);
        assert_eq!(restored.to_bytes(), bytes);
        assert_eq!(restored.counter(), 0x0102_0304_0506_0708);
        assert_eq!(restored.nonce(), NONCE);
    }

    #[test]
    fn try_from_slice() {
        let bytes = State::new(&KEY, &NONCE).to_bytes();
        let state = State::try_from(&bytes[..]).unwrap();
        assert_eq!(state.to_bytes(), bytes);
        assert!(State::try_from(&bytes[1..]).is_err());
    }

    #[test]
    fn advance_carries_into_high_word() {
        let mut state = State::with_counter(&KEY, &NONCE, u32::MAX as u64);
        state.advance(1);
        assert_eq!(state.counter(), 1 << 32);
        assert_eq!(state.counter_nonce.0[..2], [0, 1]);
        assert_eq!(state.nonce(), NONCE);

        state.advance(3);
        assert_eq!(state.counter(), (1 << 32) + 3);
    }

    #[test]
    fn advance_wraps_silently() {
        let mut state = State::with_counter(&KEY, &NONCE, u64::MAX - 1);
        state.advance(3);
        assert_eq!(state.counter(), 1);
        assert_eq!(state.nonce(), NONCE);
    }

    #[test]
    fn set_counter_keeps_nonce() {
        let mut state = State::new(&KEY, &NONCE);
        state.set_counter(u64::MAX);
        assert_eq!(state.counter(), u64::MAX);
        assert_eq!(state.nonce(), NONCE);
        assert_eq!(state.to_bytes()[..KEY_LEN], KEY);
    }

    #[cfg(feature = "zeroize")]
    #[test]
    fn zeroize_wipes_everything() {
        fn assert_zeroize_on_drop<T: ZeroizeOnDrop>() {}
        assert_zeroize_on_drop::<State>();

        let mut state = State::with_counter(&KEY, &NONCE, u64::MAX);
        state.zeroize();
        assert_eq!(state.to_bytes(), [0; STATE_LEN]);
        assert_eq!(state.counter(), 0);
        assert_eq!(state.nonce(), [0; NONCE_LEN]);
    }
}
