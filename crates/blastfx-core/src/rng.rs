//! Deterministic random number generator
//!
//! Uses a simple xorshift64 algorithm for reproducibility across platforms.
//! The RAND opcode draws from this generator, so the same seed produces the
//! same spawn parameters everywhere.

use serde::{Deserialize, Serialize};

/// A deterministic random number generator
///
/// Passed explicitly into every interpreter run; there is no ambient global
/// random source. Must be externally synchronized (or per-thread) if spawns
/// run concurrently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectRng {
    state: u64,
}

impl EffectRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        // xorshift requires non-zero state
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Get the current state (useful for saving/loading)
    pub fn state(&self) -> u64 {
        self.state
    }

    /// Generate the next raw u64 value
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Generate a random f32 in range [0, 1)
    pub fn next_f32(&mut self) -> f32 {
        // use the top 24 bits so the quotient is exactly representable
        ((self.next_u64() >> 40) as f32) / ((1u32 << 24) as f32)
    }

    /// Generate a random f32 in range [min, max)
    pub fn range_f32(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }
}

impl Default for EffectRng {
    fn default() -> Self {
        Self::new(12345)
    }
}
