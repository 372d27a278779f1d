use chacha_lanes::*;
use std::{hint::black_box, time::Instant};

use rand_chacha::ChaCha20Rng;
use rand_chacha::rand_core::{RngCore, SeedableRng};

use chacha20::ChaCha20Rng as Wow;

const SIZE: usize = 2;
const BUF_LEN: usize = SIZE * GB;
const GB: usize = 1 << 30;

fn report(label: &str, seconds: f64) -> f64 {
    let ns_per_byte = seconds / BUF_LEN as f64 * 1e9;
    let speed = SIZE as f64 / seconds;
    println!("{label}: {ns_per_byte:.2} ns per byte, {speed:.2} GiB/s");
    speed
}

fn main() {
    let mut buf = vec![u8::MAX; BUF_LEN];
    let mut key = [0; KEY_LEN];
    let mut nonce = [0; NONCE_LEN];
    getrandom::fill(&mut key).unwrap();
    getrandom::fill(&mut nonce).unwrap();
    let mut state = State::new(&key, &nonce);
    let mut c2 = ChaCha20Rng::from_seed(key);
    let mut c3 = Wow::from_seed(Default::default());

    let start = Instant::now();
    ChaCha20::apply_keystream(&mut state, &mut buf, BUF_LEN / BLOCK_LEN);
    let speed1 = report("local", start.elapsed().as_secs_f64());

    let start = Instant::now();
    c2.fill_bytes(buf.as_mut_slice());
    let speed2 = report("rand_chacha", start.elapsed().as_secs_f64());

    let start = Instant::now();
    c3.fill_bytes(buf.as_mut_slice());
    let speed3 = report("chacha20", start.elapsed().as_secs_f64());
    black_box(buf);
    println!();

    println!(
        "Local over `rand_chacha`: {:.2}%",
        (speed1 / speed2 - 1.0) * 100.0
    );
    println!(
        "Local over `chacha20`: {:.2}%",
        (speed1 / speed3 - 1.0) * 100.0
    );
}
