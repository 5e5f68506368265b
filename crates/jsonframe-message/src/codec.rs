//! Record format for captured event sequences, written by `jsonframe pack`
//! and read back by `jsonframe replay`.

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{EventLogError, EventLogResult};
use crate::frame::{Frame, FrameKind};

/// Record header: magic (2) + length (4) + kind (2) = 8 bytes.
pub const HEADER_SIZE: usize = 8;

/// Magic bytes: "JF" (0x4a 0x46).
pub const MAGIC: [u8; 2] = *b"JF";

/// Default maximum payload size: 16 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 16 * 1024 * 1024;

/// Event log limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventLogConfig {
    /// Maximum payload size in bytes. Default: 16 MiB.
    pub max_payload_size: usize,
}

impl Default for EventLogConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}

/// Append one event record to `dst`.
///
/// Record layout:
/// ```text
/// ┌──────────────┬───────────┬──────────┬─────────────────┐
/// │ Magic (2B)   │ Length    │ Kind     │ Payload          │
/// │ 0x4a 0x46    │ (4B LE)   │ (2B LE)  │ (Length bytes)   │
/// │ "JF"         │           │ 1 text   │                  │
/// │              │           │ 2 binary │                  │
/// └──────────────┴───────────┴──────────┴─────────────────┘
/// ```
pub fn encode_event(event: &Frame, dst: &mut BytesMut) -> EventLogResult<()> {
    let len = event.payload.len();
    if len > u32::MAX as usize {
        return Err(EventLogError::PayloadTooLarge {
            size: len,
            max: u32::MAX as usize,
        });
    }
    dst.reserve(HEADER_SIZE + len);
    dst.put_slice(&MAGIC);
    dst.put_u32_le(len as u32);
    dst.put_u16_le(event.kind.code());
    dst.put_slice(&event.payload);
    Ok(())
}

/// Decode one record from the front of `src`.
///
/// Returns `Ok(None)` until a complete record is buffered; on success the
/// record bytes are consumed.
pub fn decode_event(src: &mut BytesMut, max_payload: usize) -> EventLogResult<Option<Frame>> {
    if src.len() < HEADER_SIZE {
        return Ok(None);
    }

    if src[0..2] != MAGIC {
        return Err(EventLogError::InvalidMagic);
    }

    let payload_len = u32::from_le_bytes([src[2], src[3], src[4], src[5]]) as usize;
    let code = u16::from_le_bytes([src[6], src[7]]);
    let kind = FrameKind::from_code(code).ok_or(EventLogError::UnknownKind(code))?;

    if payload_len > max_payload {
        return Err(EventLogError::PayloadTooLarge {
            size: payload_len,
            max: max_payload,
        });
    }

    if src.len() < HEADER_SIZE + payload_len {
        return Ok(None);
    }

    src.advance(HEADER_SIZE);
    let payload = src.split_to(payload_len).freeze();
    Ok(Some(Frame { kind, payload }))
}
