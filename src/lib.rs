/*!
SIMD ChaCha keystream generation, three blocks at a time.

A ChaCha matrix holds 16 32-bit words in a 4-by-4 layout. The first row is the constant
"`expand 32-byte k`", the next two rows are the key, and the last row is a 64-bit block
counter (low word first) followed by a 64-bit nonce:

```text
"expa"   "nd 3"   "2-by"   "te k"
Key      Key      Key      Key
Key      Key      Key      Key
Counter  Counter  Nonce    Nonce
```

The constant row never changes, so the caller only ever holds the bottom three rows as a
48-byte [`State`]. Every keystream call reads the counter out of that state, produces the
requested 64-byte blocks, XORs them into the caller's buffer and writes the advanced
counter back. Nothing else is kept between calls.

How a call is processed:

1. While at least three blocks remain, the state is loaded into a `Matrix` holding three
   independent copies of the ChaCha matrix. The second and third copies get the counter
   plus one and plus two, added as a real 64-bit integer so a carry out of the low word
   lands in the high word.

2. Ten double rounds run over all three copies in lock-step. Each step of the quarter
   round is issued for every copy before the next step starts, which gives the CPU three
   independent dependency chains to overlap.

3. The result is added to the untouched starting matrix (the feed-forward) and XORed into
   the next 192 bytes of the buffer. The counter moves on by three.

4. The last zero to two blocks go through the exact same code with a single-copy
   `Matrix`, so a block's output only depends on its counter value and never on which path
   produced it.

5. The final counter is written back into the caller's state.

The SSE2 and NEON backends hold one row per 128-bit register, which makes the column
round a handful of vector instructions. Diagonal rounds rotate the words of the last three
rows so that diagonals line up as columns, run the same column round, and rotate back.
Other targets get a portable backend built from `[u32; 4]` rows.

```
use chacha_lanes::{BLOCK_LEN, ChaCha20, State};

let key = [0x42; 32];
let nonce = [0x24; 8];
let plaintext = [7u8; 4 * BLOCK_LEN];
let mut ciphertext = [0u8; 4 * BLOCK_LEN];

let mut state = State::new(&key, &nonce);
ChaCha20::xor_blocks(&mut state, &plaintext, &mut ciphertext, 4);
assert_eq!(state.counter(), 4);

let mut state = State::new(&key, &nonce);
ChaCha20::apply_keystream(&mut state, &mut ciphertext, 4);
assert_eq!(ciphertext, plaintext);
```

## Security

The counter wraps after 2<sup>64</sup> blocks (2<sup>70</sup> bytes) and the keystream
then repeats. Nothing checks for this; never encrypt that much under one key/nonce pair.
*/

#![no_std]

#[cfg(test)]
mod chacha_reference;

mod backends;
mod chacha;
mod rounds;
mod util;

use self::chacha::ChaChaCore;
use backends::Active;

pub type ChaCha<R> = ChaChaCore<Active, R>;

pub type ChaCha8 = ChaCha<R8>;
pub type ChaCha12 = ChaCha<R12>;
pub type ChaCha20 = ChaCha<R20>;

pub use chacha::State;
pub use rounds::{DoubleRounds, R8, R12, R20};
pub use util::{
    BLOCK_LEN, HCHACHA_INPUT_LEN, HCHACHA_OUTPUT_LEN, KEY_LEN, LANES, NONCE_LEN, ONE, Row, SIGMA,
    STATE_LEN, XNONCE_LEN,
};
