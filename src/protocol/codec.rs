//! Chat line codec
//!
//! Frames the inbound byte stream into command lines. Lines are split on
//! `\n` (a trailing `\r` is dropped) and decoded lossily, so malformed UTF-8
//! never ends a session. A line longer than the configured limit is never
//! buffered in full: once the limit is passed the rest of the line is thrown
//! away and a single `ChatFrame::TooLong` is yielded when its newline arrives.

use std::io;

use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;

/// One framed unit of client input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatFrame {
    Line(String),
    TooLong,
}

#[derive(Debug)]
pub struct ChatCodec {
    max_length: usize,
    /// Bytes already searched for a newline
    next_index: usize,
    /// Inside an overlong line, dropping bytes until the next newline
    discarding: bool,
}

impl ChatCodec {
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            next_index: 0,
            discarding: false,
        }
    }

    fn frame(&self, raw: &[u8]) -> ChatFrame {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        if raw.len() > self.max_length {
            ChatFrame::TooLong
        } else {
            ChatFrame::Line(String::from_utf8_lossy(raw).into_owned())
        }
    }
}

impl Decoder for ChatCodec {
    type Item = ChatFrame;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let newline = src[self.next_index..]
            .iter()
            .position(|b| *b == b'\n')
            .map(|offset| self.next_index + offset);

        match newline {
            Some(pos) => {
                let line = src.split_to(pos + 1);
                self.next_index = 0;

                if self.discarding {
                    self.discarding = false;
                    return Ok(Some(ChatFrame::TooLong));
                }
                Ok(Some(self.frame(&line[..pos])))
            }
            None if self.discarding || src.len() > self.max_length + 1 => {
                // +1 leaves room for a `\r` that may precede the newline
                self.discarding = true;
                self.next_index = 0;
                src.advance(src.len());
                Ok(None)
            }
            None => {
                self.next_index = src.len();
                Ok(None)
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }

        // Unterminated final line
        self.next_index = 0;
        if self.discarding {
            self.discarding = false;
            return Ok(Some(ChatFrame::TooLong));
        }
        if src.is_empty() {
            return Ok(None);
        }
        let rest = src.split_to(src.len());
        Ok(Some(self.frame(&rest)))
    }
}
