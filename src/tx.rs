//! Transmitter loop.
//!
//! Strictly sequential by design: one operator message, fully processed
//! (match, encrypt, emit, advance), before the next prompt. A matcher
//! miss takes no protocol action at all — nothing on the wire, counter
//! untouched. The literal input RESET (any case) bypasses matching and
//! zeroes this side's counter only.

use crate::cipher::keystream;
use crate::counter::CounterStore;
use crate::link::frame;
use crate::matcher::{MatchHit, Matcher};
use anyhow::{Context, Result};
use colored::Colorize;
use std::io::Write as _;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

#[derive(Debug, PartialEq)]
pub enum TxOutcome {
    Sent {
        hit: MatchHit,
        counter: u64,
        key: u8,
        encrypted: u8,
    },
    NoMatch,
    Reset,
}

pub struct Transmitter<M> {
    matcher: M,
    store: CounterStore,
}

impl<M: Matcher> Transmitter<M> {
    pub fn new(matcher: M, store: CounterStore) -> Self {
        Self { matcher, store }
    }

    pub fn counter(&self) -> u64 {
        self.store.current()
    }

    /// Process one operator line: exactly one frame written and one
    /// counter persist on success, zero of either otherwise.
    pub async fn handle_line<W>(&mut self, text: &str, link: &mut W) -> Result<TxOutcome>
    where
        W: AsyncWrite + Unpin,
    {
        let text = text.trim();
        if text.eq_ignore_ascii_case("reset") {
            self.store.reset().context("failed to persist counter reset")?;
            return Ok(TxOutcome::Reset);
        }

        let Some(hit) = self.matcher.best_match(text) else {
            return Ok(TxOutcome::NoMatch);
        };

        let counter = self.store.current();
        let key = keystream::derive(counter);
        let encrypted = hit.codeword ^ key;

        link.write_all(frame::encode(encrypted).as_bytes())
            .await
            .context("link write failed")?;
        link.flush().await.context("link flush failed")?;

        // Persisted before the outcome is reported; a crash here loses
        // at most the operator's confirmation line, never the counter.
        self.store.advance().context("failed to persist counter")?;

        Ok(TxOutcome::Sent {
            hit,
            counter,
            key,
            encrypted,
        })
    }
}

/// Prompt loop over an operator console and a link writer. Returns on
/// console EOF.
pub async fn run<M, C, W>(mut tx: Transmitter<M>, console: C, mut link: W) -> Result<()>
where
    M: Matcher,
    C: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(console).lines();

    loop {
        print!("\nmessage (or RESET): ");
        std::io::stdout().flush().ok();

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match tx.handle_line(&line, &mut link).await? {
            TxOutcome::Sent {
                hit,
                counter,
                key,
                encrypted,
            } => {
                println!(
                    "{} \"{}\" (score {:.3})",
                    "matched".green(),
                    hit.sentence,
                    hit.score
                );
                tracing::info!(
                    counter,
                    key = format_args!("0x{key:02X}"),
                    frame = format_args!("0x{encrypted:02X}"),
                    "frame sent"
                );
            }
            TxOutcome::NoMatch => {
                println!("{}", "no close match in dictionary".yellow());
            }
            TxOutcome::Reset => {
                println!("{}", "counter reset to 0".cyan());
            }
        }
    }

    tracing::info!(counter = tx.counter(), "transmitter done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Dictionary;
    use crate::matcher::TfIdfMatcher;
    use tempfile::TempDir;

    fn fixture(tmp: &TempDir) -> (Dictionary, CounterStore) {
        let dict =
            Dictionary::from_pairs([(1, "HELLO".to_string()), (2, "BYE".to_string())]).unwrap();
        let store = CounterStore::open(tmp.path().join("tx_counter"));
        (dict, store)
    }

    #[tokio::test]
    async fn sent_frame_is_codeword_xor_key() {
        let tmp = TempDir::new().unwrap();
        let (dict, store) = fixture(&tmp);
        let mut tx = Transmitter::new(TfIdfMatcher::new(&dict, 0.2), store);

        let mut wire = Vec::new();
        let outcome = tx.handle_line("HELLO", &mut wire).await.unwrap();

        let expected = 1 ^ keystream::derive(0);
        match outcome {
            TxOutcome::Sent {
                counter,
                key,
                encrypted,
                ref hit,
            } => {
                assert_eq!(counter, 0);
                assert_eq!(key, keystream::derive(0));
                assert_eq!(encrypted, expected);
                assert_eq!(hit.codeword, 1);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(wire, frame::encode(expected).into_bytes());
        assert_eq!(tx.counter(), 1);
    }

    #[tokio::test]
    async fn no_match_writes_nothing_and_keeps_counter() {
        let tmp = TempDir::new().unwrap();
        let (dict, store) = fixture(&tmp);
        let mut tx = Transmitter::new(TfIdfMatcher::new(&dict, 0.2), store);

        let mut wire = Vec::new();
        let outcome = tx
            .handle_line("nothing like the dictionary", &mut wire)
            .await
            .unwrap();

        assert_eq!(outcome, TxOutcome::NoMatch);
        assert!(wire.is_empty());
        assert_eq!(tx.counter(), 0);
    }

    #[tokio::test]
    async fn reset_bypasses_matching() {
        let tmp = TempDir::new().unwrap();
        let (dict, store) = fixture(&tmp);
        let mut tx = Transmitter::new(TfIdfMatcher::new(&dict, 0.2), store);

        let mut wire = Vec::new();
        tx.handle_line("HELLO", &mut wire).await.unwrap();
        tx.handle_line("BYE", &mut wire).await.unwrap();
        assert_eq!(tx.counter(), 2);

        let outcome = tx.handle_line("  reset  ", &mut wire).await.unwrap();
        assert_eq!(outcome, TxOutcome::Reset);
        assert_eq!(tx.counter(), 0);

        let persisted = std::fs::read_to_string(tmp.path().join("tx_counter")).unwrap();
        assert_eq!(persisted, "0");
    }

    #[tokio::test]
    async fn counter_advances_once_per_send() {
        let tmp = TempDir::new().unwrap();
        let (dict, store) = fixture(&tmp);
        let mut tx = Transmitter::new(TfIdfMatcher::new(&dict, 0.2), store);

        let mut wire = Vec::new();
        for expected in 0..3u64 {
            assert_eq!(tx.counter(), expected);
            tx.handle_line("HELLO", &mut wire).await.unwrap();
        }
        assert_eq!(tx.counter(), 3);
        // Three frames, one line each.
        assert_eq!(wire.iter().filter(|&&b| b == b'\n').count(), 3);
    }
}
