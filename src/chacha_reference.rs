//! Straightforward one-block-at-a-time ChaCha, used to check the backends.

use crate::rounds::*;
use crate::util::*;

pub struct ChaCha {
    state: [u32; 16],
}

impl ChaCha {
    pub fn new(key: &[u8; KEY_LEN], nonce: &[u8; NONCE_LEN], counter: u64) -> Self {
        let mut state = [0; 16];
        state[..4].copy_from_slice(&SIGMA.0);
        for (word, chunk) in state[4..12].iter_mut().zip(key.chunks_exact(4)) {
            *word = u32::from_le_bytes(chunk.try_into().unwrap());
        }
        state[12] = counter as u32;
        state[13] = (counter >> 32) as u32;
        for (word, chunk) in state[14..].iter_mut().zip(nonce.chunks_exact(4)) {
            *word = u32::from_le_bytes(chunk.try_into().unwrap());
        }
        Self { state }
    }

    pub fn get_block<R: DoubleRounds>(&mut self) -> [u8; BLOCK_LEN] {
        let mut x = self.state;
        for _ in 0..R::COUNT {
            // Column rounds
            quarter_round(&mut x, 0, 4, 8, 12);
            quarter_round(&mut x, 1, 5, 9, 13);
            quarter_round(&mut x, 2, 6, 10, 14);
            quarter_round(&mut x, 3, 7, 11, 15);
            // Diagonal rounds
            quarter_round(&mut x, 0, 5, 10, 15);
            quarter_round(&mut x, 1, 6, 11, 12);
            quarter_round(&mut x, 2, 7, 8, 13);
            quarter_round(&mut x, 3, 4, 9, 14);
        }

        let mut block = [0; BLOCK_LEN];
        for ((chunk, x), s) in block.chunks_exact_mut(4).zip(x).zip(self.state) {
            chunk.copy_from_slice(&x.wrapping_add(s).to_le_bytes());
        }

        let counter = join(self.state[12], self.state[13]).wrapping_add(1);
        self.state[12] = counter as u32;
        self.state[13] = (counter >> 32) as u32;
        block
    }

    pub fn xor<R: DoubleRounds>(&mut self, buf: &mut [u8]) {
        for chunk in buf.chunks_exact_mut(BLOCK_LEN) {
            for (byte, key) in chunk.iter_mut().zip(self.get_block::<R>()) {
                *byte ^= key;
            }
        }
    }
}

fn quarter_round(x: &mut [u32; 16], a: usize, b: usize, c: usize, d: usize) {
    x[a] = x[a].wrapping_add(x[b]);
    x[d] = (x[d] ^ x[a]).rotate_left(16);

    x[c] = x[c].wrapping_add(x[d]);
    x[b] = (x[b] ^ x[c]).rotate_left(12);

    x[a] = x[a].wrapping_add(x[b]);
    x[d] = (x[d] ^ x[a]).rotate_left(8);

    x[c] = x[c].wrapping_add(x[d]);
    x[b] = (x[b] ^ x[c]).rotate_left(7);
}
