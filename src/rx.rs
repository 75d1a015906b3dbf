//! Receiver control loop.
//!
//! One select loop services both inputs — link bytes and operator
//! keystrokes — so neither can stall the other. Link frames go through
//! the window search regardless of whether a command line is being
//! composed; console bytes feed the command buffer. Every counter
//! mutation persists before the loop continues, so exiting at any point
//! leaves no unflushed state.

use crate::cipher::{ResyncMatch, Resyncer};
use crate::console::{Command, CommandLine};
use crate::counter::CounterStore;
use crate::dictionary::Dictionary;
use crate::link::frame::{FrameDecoder, FrameEvent};
use anyhow::{Context, Result};
use colored::Colorize;
use std::future::Future;
use tokio::io::{AsyncRead, AsyncReadExt};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RxStats {
    /// Well-formed frames that reached the cipher layer.
    pub frames: u64,
    /// Frames that resolved to a sentence.
    pub delivered: u64,
    /// Frames outside the window.
    pub misses: u64,
    /// Completed lines that never parsed as a frame. Link noise, not
    /// misses: these never reached the cipher.
    pub malformed: u64,
}

pub struct Receiver<'a> {
    resyncer: Resyncer<'a>,
    store: CounterStore,
    stats: RxStats,
}

impl<'a> Receiver<'a> {
    pub fn new(dictionary: &'a Dictionary, window: u64, store: CounterStore) -> Self {
        Self {
            resyncer: Resyncer::new(dictionary, window),
            store,
            stats: RxStats::default(),
        }
    }

    pub fn counter(&self) -> u64 {
        self.store.current()
    }

    pub fn stats(&self) -> RxStats {
        self.stats
    }

    pub fn window(&self) -> u64 {
        self.resyncer.window()
    }

    /// Handle one well-formed frame. On a match the counter is committed
    /// strictly past the counter the frame used; on a miss nothing
    /// changes, so a later correctly-windowed frame can still resolve.
    pub fn handle_frame(&mut self, encrypted: u8) -> crate::error::Result<Option<ResyncMatch>> {
        self.stats.frames += 1;
        match self.resyncer.resolve(encrypted, self.store.current()) {
            Some(m) => {
                self.store.commit(m.counter + 1)?;
                self.stats.delivered += 1;
                Ok(Some(m))
            }
            None => {
                self.stats.misses += 1;
                Ok(None)
            }
        }
    }

    pub fn handle_command(&mut self, cmd: &Command) -> crate::error::Result<()> {
        if let Command::Reset = cmd {
            self.store.reset()?;
        }
        Ok(())
    }

    /// Record a framing non-event.
    pub fn note_malformed(&mut self) {
        self.stats.malformed += 1;
    }
}

/// Drive the receiver until the link closes or `shutdown` resolves.
///
/// Generic over the link and console readers so tests can run the whole
/// loop over in-memory pipes.
pub async fn run<R, C, S>(
    mut receiver: Receiver<'_>,
    mut link: R,
    mut console: C,
    shutdown: S,
) -> Result<RxStats>
where
    R: AsyncRead + Unpin,
    C: AsyncRead + Unpin,
    S: Future<Output = ()>,
{
    let mut decoder = FrameDecoder::new();
    let mut line = CommandLine::new();
    let mut link_buf = [0u8; 256];
    let mut con_buf = [0u8; 64];
    let mut console_open = true;

    tokio::pin!(shutdown);

    println!("monitoring link; type RESET + enter to reset the counter");

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("shutdown requested");
                break;
            }
            n = link.read(&mut link_buf) => {
                let n = n.context("link read failed")?;
                if n == 0 {
                    tracing::info!("link closed");
                    break;
                }
                for &b in &link_buf[..n] {
                    match decoder.feed(b) {
                        FrameEvent::Frame(encrypted) => deliver(&mut receiver, encrypted)?,
                        FrameEvent::Malformed => {
                            receiver.note_malformed();
                            tracing::debug!("malformed line dropped");
                        }
                        FrameEvent::Pending => {}
                    }
                }
            }
            n = console.read(&mut con_buf), if console_open => {
                let n = n.context("console read failed")?;
                if n == 0 {
                    // Operator console gone; keep servicing the link.
                    console_open = false;
                    continue;
                }
                for &b in &con_buf[..n] {
                    if let Some(cmd) = line.feed(b) {
                        receiver.handle_command(&cmd)?;
                        match cmd {
                            Command::Reset => {
                                println!("{}", "counter reset to 0".cyan());
                            }
                            Command::Unknown(s) => {
                                println!("{} {s}", "unknown command:".yellow());
                            }
                        }
                    }
                }
            }
        }
    }

    let stats = receiver.stats();
    tracing::info!(
        frames = stats.frames,
        delivered = stats.delivered,
        misses = stats.misses,
        malformed = stats.malformed,
        counter = receiver.counter(),
        "receiver done"
    );
    Ok(stats)
}

fn deliver(receiver: &mut Receiver<'_>, encrypted: u8) -> Result<()> {
    match receiver.handle_frame(encrypted)? {
        Some(m) => {
            tracing::info!(
                counter = m.counter,
                offset = m.offset,
                key = format_args!("0x{:02X}", m.key),
                "frame resolved"
            );
            println!("\n{}", "*** message received ***".green().bold());
            println!("{}", m.sentence.bold());
        }
        None => {
            tracing::warn!(
                frame = format_args!("0x{encrypted:02X}"),
                counter = receiver.counter(),
                window = receiver.window(),
                "frame outside window"
            );
        }
    }
    Ok(())
}
