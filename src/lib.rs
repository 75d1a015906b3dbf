//! lumen — short messages over a noisy one-byte link.
//!
//! Each message is one dictionary codeword, XOR-encrypted with a key
//! byte derived from a per-side counter. The two ends never exchange
//! counter values; the receiver recovers drift by searching a bounded
//! window of candidate counters.
//!
//! ```text
//! operator text                       link bytes            operator console
//!      |                                  |                        |
//!      v                                  v                        v
//! +-----------+   frame   +--------+  +---------+  +-----------------------+
//! | tx loop   | --------> | link   |->| rx loop | <- RESET / command entry |
//! | (matcher, |  "3C\n"   | bridge |  | (window |  +-----------------------+
//! |  cipher)  |           +--------+  |  search)|
//! +-----------+                       +---------+
//! ```

pub mod cipher;
pub mod config;
pub mod console;
pub mod counter;
pub mod dictionary;
pub mod error;
pub mod link;
pub mod matcher;
pub mod rx;
pub mod tx;

pub use cipher::{ResyncMatch, Resyncer, DEFAULT_WINDOW};
pub use counter::CounterStore;
pub use dictionary::Dictionary;
pub use error::{LinkError, Result};
pub use matcher::{MatchHit, Matcher, TfIdfMatcher};
