//! Operator command entry for the receiver.
//!
//! Commands are composed character-by-character while link traffic keeps
//! flowing, and committed on a line terminator. The buffer is the whole
//! state machine: empty means idle, non-empty means a line is being
//! built.

use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Reset,
    Unknown(String),
}

#[derive(Debug, Default)]
pub struct CommandLine {
    buf: String,
}

impl CommandLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one console byte.
    ///
    /// A terminator commits the buffered line as a command (empty lines
    /// commit nothing), backspace drops the last buffered character,
    /// anything else accumulates.
    pub fn feed(&mut self, byte: u8) -> Option<Command> {
        match byte {
            b'\r' | b'\n' => {
                let line = std::mem::take(&mut self.buf);
                let cmd = line.trim();
                if cmd.is_empty() {
                    None
                } else if cmd.eq_ignore_ascii_case("reset") {
                    Some(Command::Reset)
                } else {
                    Some(Command::Unknown(cmd.to_string()))
                }
            }
            // Backspace or DEL
            0x08 | 0x7f => {
                self.buf.pop();
                None
            }
            b => {
                self.buf.push(b as char);
                None
            }
        }
    }
}

/// Console byte source detached from the runtime.
///
/// A plain thread blocks on stdin and forwards bytes over a channel;
/// the async side only ever polls the channel. Dropping the runtime
/// never waits on an in-flight console read — the thread just dies
/// with the process.
pub struct ConsoleInput {
    rx: mpsc::UnboundedReceiver<Vec<u8>>,
    pending: Vec<u8>,
}

impl ConsoleInput {
    /// Spawn the stdin reader thread. A thread that cannot be spawned
    /// (or stdin at EOF) presents as a closed console.
    pub fn stdin() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let _ = std::thread::Builder::new()
            .name("console-stdin".to_string())
            .spawn(move || {
                use std::io::Read;
                let mut stdin = std::io::stdin();
                let mut buf = [0u8; 64];
                loop {
                    match stdin.read(&mut buf) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            if tx.send(buf[..n].to_vec()).is_err() {
                                break;
                            }
                        }
                    }
                }
            });
        Self::from_channel(rx)
    }

    /// Wrap an existing byte channel. Tests drive the control loop
    /// through this.
    pub fn from_channel(rx: mpsc::UnboundedReceiver<Vec<u8>>) -> Self {
        Self {
            rx,
            pending: Vec::new(),
        }
    }
}

impl AsyncRead for ConsoleInput {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        let this = self.get_mut();
        if this.pending.is_empty() {
            match this.rx.poll_recv(cx) {
                Poll::Ready(Some(bytes)) => this.pending = bytes,
                // Channel closed: console EOF.
                Poll::Ready(None) => return Poll::Ready(Ok(())),
                Poll::Pending => return Poll::Pending,
            }
        }
        let n = this.pending.len().min(buf.remaining());
        buf.put_slice(&this.pending[..n]);
        this.pending.drain(..n);
        Poll::Ready(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    fn feed_str(line: &mut CommandLine, s: &str) -> Vec<Command> {
        s.bytes().filter_map(|b| line.feed(b)).collect()
    }

    #[test]
    fn reset_is_case_insensitive() {
        let mut line = CommandLine::new();
        assert_eq!(feed_str(&mut line, "reset\n"), vec![Command::Reset]);
        assert_eq!(feed_str(&mut line, "ReSeT\n"), vec![Command::Reset]);
        assert_eq!(feed_str(&mut line, "RESET\r\n"), vec![Command::Reset]);
    }

    #[test]
    fn empty_lines_commit_nothing() {
        let mut line = CommandLine::new();
        assert!(feed_str(&mut line, "\n\r\n   \n").is_empty());
    }

    #[test]
    fn unknown_commands_reported_verbatim() {
        let mut line = CommandLine::new();
        assert_eq!(
            feed_str(&mut line, "status\n"),
            vec![Command::Unknown("status".to_string())]
        );
    }

    #[test]
    fn backspace_edits_the_buffer() {
        let mut line = CommandLine::new();
        // "resex" + backspace + "t"
        assert_eq!(feed_str(&mut line, "resex\x08t\n"), vec![Command::Reset]);
    }

    #[test]
    fn partial_input_commits_only_on_terminator() {
        let mut line = CommandLine::new();
        assert!(feed_str(&mut line, "rese").is_empty());
        assert_eq!(feed_str(&mut line, "t\n"), vec![Command::Reset]);
    }

    #[test]
    fn backspace_on_empty_buffer_is_harmless() {
        let mut line = CommandLine::new();
        assert_eq!(line.feed(0x08), None);
        assert_eq!(feed_str(&mut line, "reset\n"), vec![Command::Reset]);
    }

    #[tokio::test]
    async fn console_input_delivers_bytes_then_eof() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut con = ConsoleInput::from_channel(rx);

        tx.send(b"res".to_vec()).unwrap();
        tx.send(b"et\n".to_vec()).unwrap();
        drop(tx);

        let mut all = Vec::new();
        con.read_to_end(&mut all).await.unwrap();
        assert_eq!(all, b"reset\n");

        // Closed channel keeps reading as EOF.
        let mut buf = [0u8; 8];
        assert_eq!(con.read(&mut buf).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn console_input_honors_small_read_buffers() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut con = ConsoleInput::from_channel(rx);

        tx.send(b"abcd".to_vec()).unwrap();

        let mut buf = [0u8; 2];
        assert_eq!(con.read(&mut buf).await.unwrap(), 2);
        assert_eq!(&buf, b"ab");
        assert_eq!(con.read(&mut buf).await.unwrap(), 2);
        assert_eq!(&buf, b"cd");
    }
}
