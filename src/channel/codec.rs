//! NDJSON codec for recorded or streamed push events.
//!
//! Wraps [`LinesCodec`] with a maximum line length so an unterminated or
//! oversized frame cannot exhaust memory. Each non-blank line is one
//! [`InboundEvent`] frame; blank lines are skipped. A line that is not a
//! valid frame is dropped with a warning and decoding continues, so only
//! framing failures (oversized line, I/O) end the stream.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder, LinesCodec, LinesCodecError};
use tracing::warn;

use super::{decode_frame, InboundEvent};
use crate::{AppError, Result};

/// Maximum accepted frame length: 1 MiB.
pub const MAX_LINE_BYTES: usize = 1_048_576;

/// Line-framed JSON codec for [`InboundEvent`]s.
#[derive(Debug)]
pub struct EventCodec(LinesCodec);

impl EventCodec {
    /// Create a codec with the default [`MAX_LINE_BYTES`] limit.
    #[must_use]
    pub fn new() -> Self {
        Self(LinesCodec::new_with_max_length(MAX_LINE_BYTES))
    }
}

impl Default for EventCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for EventCodec {
    type Item = InboundEvent;
    type Error = AppError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        loop {
            match self.0.decode(src).map_err(map_codec_error)? {
                Some(line) if line.trim().is_empty() => {}
                Some(line) => {
                    if let Some(event) = parse_line(&line) {
                        return Ok(Some(event));
                    }
                }
                None => return Ok(None),
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        loop {
            match self.0.decode_eof(src).map_err(map_codec_error)? {
                Some(line) if line.trim().is_empty() => {}
                Some(line) => {
                    if let Some(event) = parse_line(&line) {
                        return Ok(Some(event));
                    }
                }
                None => return Ok(None),
            }
        }
    }
}

impl Encoder<&InboundEvent> for EventCodec {
    type Error = AppError;

    fn encode(&mut self, item: &InboundEvent, dst: &mut BytesMut) -> Result<()> {
        let line = serde_json::to_string(item)?;
        self.0.encode(line, dst).map_err(map_codec_error)
    }
}

fn parse_line(line: &str) -> Option<InboundEvent> {
    match decode_frame(line) {
        Ok(event) => Some(event),
        Err(err) => {
            warn!(%err, len = line.len(), "dropping undecodable frame");
            None
        }
    }
}

fn map_codec_error(e: LinesCodecError) -> AppError {
    match e {
        LinesCodecError::MaxLineLengthExceeded => {
            AppError::Codec(format!("line too long: exceeded {MAX_LINE_BYTES} bytes"))
        }
        LinesCodecError::Io(io_err) => AppError::Io(io_err.to_string()),
    }
}
