//! Cache key generation.
//!
//! A cache key identifies one method invocation — the method itself plus
//! the arguments it was called with — compactly enough to use as a lookup
//! key in any backend. [`HashCodeKeyGenerator`] derives a
//! [`HashCodeCacheKey`] by folding the method's stable hash and each
//! argument's 32-bit contribution, in order, through a
//! [`HashCodeCalculator`].
//!
//! The composite (64-bit checksum, 32-bit hash) pair is deliberately not a
//! cryptographic digest: collisions are possible and accepted; the second
//! number exists to shrink the practical collision probability versus a
//! single 32-bit hash.

mod calculator;

pub use calculator::HashCodeCalculator;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::invocation::Invocation;

/// Cache key built from a pre-calculated checksum and hash code.
///
/// Equality and hashing are defined purely on the `(check_sum, hash_code)`
/// pair; two keys built from equal inputs are interchangeable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HashCodeCacheKey {
    check_sum: i64,
    hash_code: i32,
}

impl HashCodeCacheKey {
    /// Assemble a key from its two components.
    pub fn new(check_sum: i64, hash_code: i32) -> Self {
        Self {
            check_sum,
            hash_code,
        }
    }

    /// The 64-bit checksum component.
    pub fn check_sum(&self) -> i64 {
        self.check_sum
    }

    /// The 32-bit hash component.
    pub fn hash_code(&self) -> i32 {
        self.hash_code
    }
}

impl fmt::Display for HashCodeCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.hash_code, self.check_sum)
    }
}

/// Strategy for deriving a cache key from an invocation.
pub trait CacheKeyGenerator: Send + Sync {
    /// Compute the key for one invocation.
    ///
    /// Must be deterministic: equal method descriptors with element-wise
    /// equal argument digests, in the same order, yield equal keys.
    fn generate_key(&self, invocation: &Invocation<'_>) -> HashCodeCacheKey;
}

/// Default key generator: method stable hash + ordered argument hashes.
///
/// Argument contributions are the digests' raw 32-bit values; absent
/// (null) arguments contribute zero. With
/// [`mix_argument_hash`](Self::mix_argument_hash) enabled, each raw value
/// is first run through a fresh secondary [`HashCodeCalculator`], which
/// decorrelates arguments whose own hash functions are poor.
#[derive(Clone, Debug, Default)]
pub struct HashCodeKeyGenerator {
    mix_argument_hash: bool,
}

impl HashCodeKeyGenerator {
    /// Generator with argument-hash mixing disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the secondary mixing step for argument hashes.
    pub fn mix_argument_hash(mut self, enabled: bool) -> Self {
        self.mix_argument_hash = enabled;
        self
    }

    /// The contribution of one argument digest under the current settings.
    pub(crate) fn argument_hash(&self, raw: Option<i32>) -> i32 {
        match raw {
            None => 0,
            Some(value) if self.mix_argument_hash => {
                let mut mixer = HashCodeCalculator::new();
                mixer.append(value);
                mixer.hash_code()
            }
            Some(value) => value,
        }
    }
}

impl CacheKeyGenerator for HashCodeKeyGenerator {
    fn generate_key(&self, invocation: &Invocation<'_>) -> HashCodeCacheKey {
        let mut calculator = HashCodeCalculator::new();
        calculator.append(invocation.method().stable_hash());
        for digest in invocation.arguments() {
            calculator.append(self.argument_hash(digest.raw()));
        }
        HashCodeCacheKey::new(calculator.check_sum(), calculator.hash_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invocation::{ArgumentDigest, MethodDescriptor};

    fn method() -> MethodDescriptor {
        MethodDescriptor::new("CustomerService", "get_customer", ["u64"])
    }

    #[test]
    fn same_invocation_same_key() {
        let m = method();
        let generator = HashCodeKeyGenerator::new();
        let a = generator.generate_key(&Invocation::new(&m).arg(&1u64).arg(&2u64));
        let b = generator.generate_key(&Invocation::new(&m).arg(&1u64).arg(&2u64));
        assert_eq!(a, b);
    }

    #[test]
    fn argument_order_changes_key() {
        let m = method();
        let generator = HashCodeKeyGenerator::new();
        let a = generator.generate_key(&Invocation::new(&m).arg(&1u64).arg(&2u64));
        let b = generator.generate_key(&Invocation::new(&m).arg(&2u64).arg(&1u64));
        assert_ne!(a, b);
    }

    #[test]
    fn different_methods_produce_different_keys() {
        let a = MethodDescriptor::new("CustomerService", "get_customer", ["u64"]);
        let b = MethodDescriptor::new("CustomerService", "remove_customer", ["u64"]);
        let generator = HashCodeKeyGenerator::new();
        assert_ne!(
            generator.generate_key(&Invocation::new(&a).arg(&1u64)),
            generator.generate_key(&Invocation::new(&b).arg(&1u64)),
        );
    }

    #[test]
    fn key_without_arguments_is_seed_only() {
        let m = method();
        let generator = HashCodeKeyGenerator::new();
        let key = generator.generate_key(&Invocation::new(&m));

        let mut expected = HashCodeCalculator::new();
        expected.append(m.stable_hash());
        assert_eq!(
            key,
            HashCodeCacheKey::new(expected.check_sum(), expected.hash_code())
        );
    }

    #[test]
    fn null_argument_contributes_zero() {
        let m = method();
        let generator = HashCodeKeyGenerator::new();
        let with_null = generator.generate_key(&Invocation::new(&m).null_arg());
        let with_zero =
            generator.generate_key(&Invocation::new(&m).digest(ArgumentDigest::from_raw(0)));
        assert_eq!(with_null, with_zero);
    }

    #[test]
    fn raw_hash_used_when_mixing_disabled() {
        let generator = HashCodeKeyGenerator::new().mix_argument_hash(false);
        assert_eq!(generator.argument_hash(Some(10)), 10);
    }

    #[test]
    fn mixed_hash_differs_from_raw() {
        // an argument whose hash code is always 10 must contribute
        // something other than 10 once mixing is on
        let generator = HashCodeKeyGenerator::new().mix_argument_hash(true);
        assert_ne!(generator.argument_hash(Some(10)), 10);
    }

    #[test]
    fn mixing_changes_the_generated_key() {
        let m = method();
        let invocation = Invocation::new(&m).digest(ArgumentDigest::from_raw(10));
        let plain = HashCodeKeyGenerator::new().generate_key(&invocation);
        let mixed = HashCodeKeyGenerator::new()
            .mix_argument_hash(true)
            .generate_key(&invocation);
        assert_ne!(plain, mixed);
    }

    #[test]
    fn display_is_hash_pipe_checksum() {
        let key = HashCodeCacheKey::new(42, 7);
        assert_eq!(key.to_string(), "7|42");
    }

    #[test]
    fn equality_ignores_provenance() {
        assert_eq!(HashCodeCacheKey::new(1, 2), HashCodeCacheKey::new(1, 2));
        assert_ne!(HashCodeCacheKey::new(1, 2), HashCodeCacheKey::new(1, 3));
        assert_ne!(HashCodeCacheKey::new(2, 2), HashCodeCacheKey::new(1, 2));
    }
}
