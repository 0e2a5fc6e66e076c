// SPDX-License-Identifier: Apache-2.0

//! Deterministic pseudo-random bit generation for `srand` and for test
//! stimulus. A `BitRng` wraps `Xoshiro256StarStar` and buffers the raw
//! words down to the bit level so that bit-vector widths do not have to be
//! word aligned.
//!
//! `srand` draws from a thread-local instance, so concurrent clients
//! observe independent streams; [`set_seed`] reseeds only the calling
//! thread's stream.

use std::cell::RefCell;

use rand_xoshiro::rand_core::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

use crate::bits::Bits;

const DEFAULT_SEED: u64 = 0;

#[derive(Debug)]
pub struct BitRng {
    rng: Xoshiro256StarStar,
    buf: u64,
    // invariant: `used <= 64`, the number of bits consumed from `buf`
    used: u32,
}

impl BitRng {
    pub fn new(seed: u64) -> Self {
        let mut rng = Xoshiro256StarStar::seed_from_u64(seed);
        let buf = rng.next_u64();
        Self { rng, buf, used: 0 }
    }

    pub fn next_bool(&mut self) -> bool {
        if self.used == 64 {
            self.buf = self.rng.next_u64();
            self.used = 0;
        }
        let bit = (self.buf >> self.used) & 1 == 1;
        self.used += 1;
        bit
    }

    /// Draws a fresh word, independent of the bit buffer.
    pub fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    /// A random bit pattern of the given width.
    pub fn next_bits(&mut self, width: usize) -> Bits {
        assert!(width >= 1, "BitRng::next_bits: width must be >= 1");
        let bools: Vec<bool> = (0..width).map(|_| self.next_bool()).collect();
        Bits::from_lsb_is_0(&bools)
    }
}

thread_local! {
    static THREAD_RNG: RefCell<BitRng> = RefCell::new(BitRng::new(DEFAULT_SEED));
}

/// Reseeds the calling thread's `srand` stream.
pub fn set_seed(seed: u64) {
    THREAD_RNG.with(|rng| *rng.borrow_mut() = BitRng::new(seed));
}

pub(crate) fn random_bits(width: usize) -> Bits {
    THREAD_RNG.with(|rng| rng.borrow_mut().next_bits(width))
}
