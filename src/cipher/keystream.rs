//! Per-counter keystream derivation.
//!
//! Both ends derive their key bytes independently; they never exchange
//! counters. The hash input is the canonical decimal string of the
//! counter, and that encoding lives here and nowhere else: any
//! divergence between the two ends breaks the protocol silently.

use sha2::{Digest, Sha256};

/// Derive the single keystream byte for a counter value.
///
/// SHA-256 over the counter's decimal string, truncated to the first
/// digest byte. Deterministic and total over all counters.
pub fn derive(counter: u64) -> u8 {
    let mut hasher = Sha256::new();
    hasher.update(counter.to_string().as_bytes());
    hasher.finalize()[0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn known_values() {
        // SHA-256("0") = 5feceb66..., SHA-256("1") = 6b86b273...
        assert_eq!(derive(0), 0x5f);
        assert_eq!(derive(1), 0x6b);
    }

    #[test]
    fn distinct_counters_usually_differ() {
        // Not a guarantee of the design, but 0 and 1 happen not to collide
        // and the protocol tests below rely on that.
        assert_ne!(derive(0), derive(1));
    }

    proptest! {
        #[test]
        fn deterministic(c in any::<u64>()) {
            prop_assert_eq!(derive(c), derive(c));
        }

        #[test]
        fn xor_round_trips(c in any::<u64>(), m in any::<u8>()) {
            let key = derive(c);
            prop_assert_eq!((m ^ key) ^ key, m);
        }
    }
}
