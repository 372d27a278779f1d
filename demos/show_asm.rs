//! Used for viewing assembly of the keystream loop via `cargo-show-asm`.

use chacha_lanes::*;
use core::hint::black_box;

fn main() {
    let mut buf = [0; 8 * BLOCK_LEN];
    let mut state = State::new(&[0; KEY_LEN], &[0; NONCE_LEN]);
    ChaCha8::apply_keystream(&mut state, &mut buf, 8);
    black_box(&buf);
    ChaCha12::apply_keystream(&mut state, &mut buf, 8);
    black_box(&buf);
    ChaCha20::apply_keystream(&mut state, &mut buf, 8);
    black_box(&buf);
    black_box(ChaCha20::hchacha(&[0; KEY_LEN], &[0; HCHACHA_INPUT_LEN]));
}
