//! Windowed resynchronization search.
//!
//! The two ends never exchange counter values. When bytes get dropped
//! on the link, the receiver's counter lags the transmitter's by a few
//! steps; trying an ascending window of candidate counters and taking
//! the first one that decrypts to a known codeword recovers lock-step
//! without any handshake. Beyond `window - 1` consecutive drops the
//! protocol requires a manual reset on both sides.

use crate::cipher::keystream;
use crate::dictionary::Dictionary;

/// Default search window.
pub const DEFAULT_WINDOW: u64 = 5;

/// A successful window search.
#[derive(Debug, Clone, PartialEq)]
pub struct ResyncMatch {
    /// Counter the frame was encrypted under.
    pub counter: u64,
    /// Offset from the receiver's stored counter.
    pub offset: u64,
    pub key: u8,
    pub codeword: u8,
    pub sentence: String,
}

pub struct Resyncer<'a> {
    dictionary: &'a Dictionary,
    window: u64,
}

impl<'a> Resyncer<'a> {
    pub fn new(dictionary: &'a Dictionary, window: u64) -> Self {
        debug_assert!(window > 0);
        Self { dictionary, window }
    }

    pub fn window(&self) -> u64 {
        self.window
    }

    /// Search `base .. base + window` for a counter that decrypts
    /// `encrypted` to a known codeword.
    ///
    /// Offsets are tried ascending and the first hit wins; when two
    /// offsets in the window both decrypt to valid codewords, the lower
    /// one is taken. That tie-break is observable protocol behavior and
    /// must not change. `None` means the byte is unrecoverable noise;
    /// the caller leaves its counter untouched so a later frame can
    /// still resolve.
    pub fn resolve(&self, encrypted: u8, base: u64) -> Option<ResyncMatch> {
        for offset in 0..self.window {
            let counter = match base.checked_add(offset) {
                Some(c) => c,
                None => break,
            };
            let key = keystream::derive(counter);
            let codeword = encrypted ^ key;
            if let Some(sentence) = self.dictionary.sentence(codeword) {
                return Some(ResyncMatch {
                    counter,
                    offset,
                    key,
                    codeword,
                    sentence: sentence.to_string(),
                });
            }
        }
        None
    }
}
