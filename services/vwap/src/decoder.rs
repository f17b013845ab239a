//! Framed feed decoder
//!
//! The feed is a contiguous sequence of frames: a 16-bit big-endian length
//! L followed by L bytes whose first byte is the type code. The decoder
//! consumes exactly L+2 bytes per frame whether or not it recognizes the
//! type. End-of-stream at a frame boundary is a clean stop; anything short
//! mid-frame is fatal.
//!
//! Zero-length frames occur in some feed exports and are skipped, never
//! treated as end of stream.

use std::io::{self, Read};

use thiserror::Error;
use tracing::{debug, info};

use crate::messages::ItchMessage;
use crate::wire::WireError;

/// Frames between progress log lines.
const PROGRESS_INTERVAL: u64 = 10_000_000;

/// Fatal decoding failures. Unknown type codes are not errors; they are
/// skipped and counted.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("I/O error reading feed: {0}")]
    Io(#[from] io::Error),

    #[error("truncated frame: expected {expected} bytes, got {read}")]
    TruncatedFrame { expected: usize, read: usize },

    #[error("malformed '{kind}' frame: {source}")]
    BadField { kind: char, source: WireError },
}

/// Pulls typed messages out of a framed byte stream.
pub struct FrameDecoder<R> {
    reader: R,
    frames_read: u64,
    unknown_skipped: u64,
}

impl<R: Read> FrameDecoder<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            frames_read: 0,
            unknown_skipped: 0,
        }
    }

    /// Decode the next recognized message.
    ///
    /// Returns `Ok(None)` on a clean end of stream. Skips zero-length and
    /// unrecognized frames internally.
    pub fn next_message(&mut self) -> Result<Option<ItchMessage>, DecodeError> {
        loop {
            let mut prefix = [0u8; 2];
            let got = read_full(&mut self.reader, &mut prefix)?;
            if got == 0 {
                return Ok(None);
            }
            if got < prefix.len() {
                return Err(DecodeError::TruncatedFrame {
                    expected: prefix.len(),
                    read: got,
                });
            }

            let length = u16::from_be_bytes(prefix) as usize;
            if length == 0 {
                debug!("zero-length frame skipped");
                continue;
            }

            let mut body = vec![0u8; length];
            let got = read_full(&mut self.reader, &mut body)?;
            if got < length {
                return Err(DecodeError::TruncatedFrame {
                    expected: length,
                    read: got,
                });
            }

            self.frames_read += 1;
            if self.frames_read % PROGRESS_INTERVAL == 0 {
                info!(frames = self.frames_read, "feed progress");
            }

            let kind = body[0];
            match ItchMessage::parse(kind, &body[1..]) {
                Ok(Some(message)) => return Ok(Some(message)),
                Ok(None) => {
                    self.unknown_skipped += 1;
                    debug!(kind = %(kind as char), "unrecognized frame skipped");
                }
                Err(source) => {
                    return Err(DecodeError::BadField {
                        kind: kind as char,
                        source,
                    })
                }
            }
        }
    }

    /// Total frames consumed (recognized or not, excluding zero-length).
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Frames skipped because the type code was not recognized.
    pub fn unknown_skipped(&self) -> u64 {
        self.unknown_skipped
    }
}

/// Fill `buf` as far as the stream allows; a short count means EOF.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use types::ids::{MatchNumber, StockLocate};

    fn frame(kind: u8, body: &[u8]) -> Vec<u8> {
        let length = (body.len() + 1) as u16;
        let mut bytes = length.to_be_bytes().to_vec();
        bytes.push(kind);
        bytes.extend_from_slice(body);
        bytes
    }

    fn broken_trade_body(locate: u16, timestamp: u64, match_number: u64) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&locate.to_be_bytes());
        body.extend_from_slice(&[0, 0]);
        body.extend_from_slice(&timestamp.to_be_bytes()[2..]);
        body.extend_from_slice(&match_number.to_be_bytes());
        body
    }

    #[test]
    fn test_decode_single_frame_then_eof() {
        let feed = frame(b'B', &broken_trade_body(7, 1_000, 42));
        let mut decoder = FrameDecoder::new(Cursor::new(feed));

        let message = decoder.next_message().unwrap().unwrap();
        assert_eq!(
            message,
            ItchMessage::BrokenTrade {
                stock_locate: StockLocate::new(7),
                timestamp: 1_000,
                match_number: MatchNumber::new(42),
            }
        );
        assert!(decoder.next_message().unwrap().is_none());
        assert_eq!(decoder.frames_read(), 1);
    }

    #[test]
    fn test_empty_stream_is_clean_eof() {
        let mut decoder = FrameDecoder::new(Cursor::new(Vec::new()));
        assert!(decoder.next_message().unwrap().is_none());
        assert_eq!(decoder.frames_read(), 0);
    }

    #[test]
    fn test_unknown_frames_consume_exactly_their_length() {
        let mut feed = frame(b'X', &[0xAB; 22]); // order cancel, ignored
        feed.extend_from_slice(&frame(b'B', &broken_trade_body(7, 1_000, 42)));
        let mut decoder = FrameDecoder::new(Cursor::new(feed));

        // The unknown frame is swallowed; the next call lands on 'B'.
        let message = decoder.next_message().unwrap().unwrap();
        assert!(matches!(message, ItchMessage::BrokenTrade { .. }));
        assert_eq!(decoder.unknown_skipped(), 1);
        assert_eq!(decoder.frames_read(), 2);
    }

    #[test]
    fn test_zero_length_frame_is_skipped_not_eof() {
        let mut feed = vec![0, 0]; // L = 0
        feed.extend_from_slice(&frame(b'B', &broken_trade_body(7, 1_000, 42)));
        let mut decoder = FrameDecoder::new(Cursor::new(feed));

        assert!(decoder.next_message().unwrap().is_some());
        assert!(decoder.next_message().unwrap().is_none());
    }

    #[test]
    fn test_truncated_body_is_fatal() {
        let mut feed = frame(b'B', &broken_trade_body(7, 1_000, 42));
        feed.truncate(feed.len() - 3);
        let mut decoder = FrameDecoder::new(Cursor::new(feed));

        match decoder.next_message() {
            Err(DecodeError::TruncatedFrame { expected, read }) => {
                assert_eq!(expected, 19);
                assert_eq!(read, 16);
            }
            other => panic!("Expected TruncatedFrame, got {:?}", other),
        }
    }

    #[test]
    fn test_truncated_length_prefix_is_fatal() {
        let mut decoder = FrameDecoder::new(Cursor::new(vec![0x00]));
        assert!(matches!(
            decoder.next_message(),
            Err(DecodeError::TruncatedFrame {
                expected: 2,
                read: 1
            })
        ));
    }

    #[test]
    fn test_recognized_frame_shorter_than_layout_is_fatal() {
        // 'B' with only 4 body bytes after the type code.
        let feed = frame(b'B', &[0, 7, 0, 0]);
        let mut decoder = FrameDecoder::new(Cursor::new(feed));
        assert!(matches!(
            decoder.next_message(),
            Err(DecodeError::BadField { kind: 'B', .. })
        ));
    }

    #[test]
    fn test_oversized_recognized_frame_discards_trailer() {
        // 'B' body padded past its layout; the extra bytes belong to the
        // frame and must not bleed into the next one.
        let mut body = broken_trade_body(7, 1_000, 42);
        body.extend_from_slice(&[0xEE; 5]);
        let mut feed = frame(b'B', &body);
        feed.extend_from_slice(&frame(b'B', &broken_trade_body(7, 2_000, 43)));
        let mut decoder = FrameDecoder::new(Cursor::new(feed));

        let first = decoder.next_message().unwrap().unwrap();
        let second = decoder.next_message().unwrap().unwrap();
        assert_eq!(first.timestamp(), 1_000);
        assert_eq!(second.timestamp(), 2_000);
        assert!(decoder.next_message().unwrap().is_none());
    }
}
