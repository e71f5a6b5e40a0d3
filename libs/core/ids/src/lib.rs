//! Time-ordered, lexicographically sortable identifiers for ledger entities.
//!
//! Every entity identifier in this system (account, payment, ledger entry,
//! idempotency record, outbox event) is a Crockford Base32, 26-symbol ULID:
//! the first 10 symbols encode a millisecond timestamp, the remaining 16 are
//! random. Two identifiers minted in the same millisecond still sort
//! deterministically because the random component is generated with a
//! monotonic source.

use std::sync::Mutex;

use ulid::{Generator, Ulid};

/// Generates new entity identifiers.
///
/// Wraps `ulid::Generator` behind a mutex so one generator can be shared
/// across tasks without each caller managing its own monotonic counter.
pub struct IdGenerator {
    inner: Mutex<Generator>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Generator::new()),
        }
    }

    /// Mints a new identifier, guaranteed to sort after every identifier
    /// this generator has previously minted within the same millisecond.
    pub fn next_id(&self) -> String {
        let mut generator = self.inner.lock().expect("id generator mutex poisoned");
        loop {
            match generator.generate() {
                Ok(ulid) => return ulid.to_string(),
                // Exhausted the random bits available within this
                // millisecond; the generator itself will roll forward to
                // the next millisecond on the following call.
                Err(_) => continue,
            }
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns `true` if `value` is a syntactically valid identifier: exactly
/// 26 characters, every character drawn from the Crockford Base32 alphabet.
pub fn is_valid(value: &str) -> bool {
    value.len() == 26 && Ulid::from_string(value).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_26_symbols_crockford_base32() {
        let generator = IdGenerator::new();
        let id = generator.next_id();
        assert_eq!(id.len(), 26);
        assert!(is_valid(&id));
    }

    #[test]
    fn successive_ids_from_one_generator_sort_monotonically() {
        let generator = IdGenerator::new();
        let mut previous = generator.next_id();
        for _ in 0..1_000 {
            let current = generator.next_id();
            assert!(current > previous, "{current} should sort after {previous}");
            previous = current;
        }
    }

    #[test]
    fn rejects_malformed_identifiers() {
        assert!(!is_valid("not-an-id"));
        assert!(!is_valid(""));
        assert!(!is_valid(&"0".repeat(26)[..25]));
    }

    proptest::proptest! {
        #[test]
        fn every_generated_id_round_trips_through_ulid_parsing(_unused in 0..1u8) {
            let generator = IdGenerator::new();
            let id = generator.next_id();
            proptest::prop_assert!(Ulid::from_string(&id).is_ok());
        }
    }
}
