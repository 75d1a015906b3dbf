//! Hex-line wire framing.
//!
//! One frame per line: the encrypted byte as hex digits terminated by a
//! newline (CR tolerated). Anything else that completes a line —
//! garbage between glitches, partial digits, embedded noise — is a
//! framing non-event: it never reaches the cipher layer and is not a
//! decryption miss, but the decoder reports it so the receiver can
//! account for noisy links.

/// Longest line worth buffering; runaway garbage past this is dropped
/// until the next terminator.
const MAX_LINE: usize = 64;

/// Encode one encrypted byte as a wire frame.
pub fn encode(byte: u8) -> String {
    format!("{}\n", hex::encode_upper([byte]))
}

/// Outcome of feeding one link byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEvent {
    /// Mid-line, or a blank line; nothing to report.
    Pending,
    /// A well-formed frame.
    Frame(u8),
    /// A completed non-empty line that failed to parse.
    Malformed,
}

/// Incremental frame decoder over raw link bytes.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    line: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one link byte. A terminator commits the buffered line:
    /// either a frame, or `Malformed` if the line held anything but
    /// one or two hex digits. Blank lines commit nothing.
    pub fn feed(&mut self, byte: u8) -> FrameEvent {
        match byte {
            b'\n' | b'\r' => {
                let line = std::mem::take(&mut self.line);
                let s = match std::str::from_utf8(&line) {
                    Ok(s) => s.trim(),
                    Err(_) => return FrameEvent::Malformed,
                };
                if s.is_empty() {
                    return FrameEvent::Pending;
                }
                match parse_byte(s) {
                    Some(b) => FrameEvent::Frame(b),
                    None => FrameEvent::Malformed,
                }
            }
            b => {
                if self.line.len() < MAX_LINE {
                    self.line.push(b);
                }
                FrameEvent::Pending
            }
        }
    }
}

/// One or two hex digits, nothing else.
fn parse_byte(s: &str) -> Option<u8> {
    if s.len() > 2 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u8::from_str_radix(s, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drive(dec: &mut FrameDecoder, s: &str) -> (Vec<u8>, usize) {
        let mut frames = Vec::new();
        let mut malformed = 0;
        for b in s.bytes() {
            match dec.feed(b) {
                FrameEvent::Frame(f) => frames.push(f),
                FrameEvent::Malformed => malformed += 1,
                FrameEvent::Pending => {}
            }
        }
        (frames, malformed)
    }

    #[test]
    fn encode_is_two_upper_digits_and_newline() {
        assert_eq!(encode(0x0A), "0A\n");
        assert_eq!(encode(0xFF), "FF\n");
    }

    #[test]
    fn decodes_own_encoding() {
        let mut dec = FrameDecoder::new();
        for b in [0x00u8, 0x01, 0x7F, 0xAB, 0xFF] {
            assert_eq!(drive(&mut dec, &encode(b)), (vec![b], 0));
        }
    }

    #[test]
    fn single_digit_frames_accepted() {
        let mut dec = FrameDecoder::new();
        assert_eq!(drive(&mut dec, "f\n"), (vec![0x0F], 0));
    }

    #[test]
    fn crlf_yields_one_frame() {
        let mut dec = FrameDecoder::new();
        assert_eq!(drive(&mut dec, "3C\r\n"), (vec![0x3C], 0));
    }

    #[test]
    fn blank_lines_are_not_malformed() {
        let mut dec = FrameDecoder::new();
        assert_eq!(drive(&mut dec, "\n\r\n   \n"), (vec![], 0));
    }

    #[test]
    fn malformed_lines_are_counted() {
        let mut dec = FrameDecoder::new();
        let (frames, malformed) = drive(&mut dec, "xyz\n123\n+1\n");
        assert!(frames.is_empty());
        assert_eq!(malformed, 3);
        // Decoder recovers on the next good frame.
        assert_eq!(drive(&mut dec, "2A\n"), (vec![0x2A], 0));
    }

    #[test]
    fn runaway_garbage_capped_then_recovers() {
        let mut dec = FrameDecoder::new();
        let garbage = "g".repeat(10_000);
        assert_eq!(drive(&mut dec, &garbage), (vec![], 0));
        assert_eq!(drive(&mut dec, "\n"), (vec![], 1));
        assert_eq!(drive(&mut dec, "01\n"), (vec![0x01], 0));
    }

    #[test]
    fn split_delivery_across_feeds() {
        let mut dec = FrameDecoder::new();
        assert_eq!(dec.feed(b'4'), FrameEvent::Pending);
        assert_eq!(dec.feed(b'2'), FrameEvent::Pending);
        assert_eq!(dec.feed(b'\n'), FrameEvent::Frame(0x42));
    }
}
