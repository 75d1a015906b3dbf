//! Counter-driven single-byte stream cipher.
//!
//! One codeword per frame, XORed with a key byte derived from a
//! per-side counter. Synchronization between the sides is implicit:
//! see [`resync`].

pub mod keystream;
pub mod resync;

pub use resync::{ResyncMatch, Resyncer, DEFAULT_WINDOW};
