//! Order-sensitive hash accumulator.

/// Seed for the mixed hash code.
const INITIAL_HASH: i32 = 17;

/// Multiplier applied to the running hash before each contribution.
const MULTIPLIER: i32 = 37;

/// Accumulates ordered 32-bit contributions into a running 64-bit checksum
/// and a mixed 32-bit hash code.
///
/// Each appended value is scaled by its 1-based position before folding, so
/// the same contributions in a different order produce a different state.
/// All arithmetic is two's-complement wrapping; overflow is part of the
/// mixing, not an error.
#[derive(Debug)]
pub struct HashCodeCalculator {
    count: i32,
    check_sum: i64,
    hash_code: i32,
}

impl HashCodeCalculator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self {
            count: 0,
            check_sum: 0,
            hash_code: INITIAL_HASH,
        }
    }

    /// Fold one contribution into the running checksum and hash code.
    pub fn append(&mut self, value: i32) {
        self.count = self.count.wrapping_add(1);
        let scaled = self.count.wrapping_mul(value);
        let mixed = scaled ^ (((scaled as u32) >> 16) as i32);
        self.hash_code = self.hash_code.wrapping_mul(MULTIPLIER).wrapping_add(mixed);
        self.check_sum = self.check_sum.wrapping_add(i64::from(scaled));
    }

    /// The accumulated 64-bit checksum.
    pub fn check_sum(&self) -> i64 {
        self.check_sum
    }

    /// The accumulated mixed 32-bit hash code.
    pub fn hash_code(&self) -> i32 {
        self.hash_code
    }
}

impl Default for HashCodeCalculator {
    fn default() -> Self {
        Self::new()
    }
}
