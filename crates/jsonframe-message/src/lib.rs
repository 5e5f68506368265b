//! Header-plus-frames message assembly on top of `jsonframe-json`.
//!
//! A message is one JSON header event followed by the number of frame
//! events the header declares:
//! - [`assembler`] — state machine turning transport events into [`Message`]s
//! - [`header`] — required-field checks with stable error codes
//! - [`outgoing`] — building header and frame events for sending
//! - [`codec`], [`reader`], [`writer`] — "JF" event log for capturing and
//!   replaying event sequences

pub mod assembler;
pub mod codec;
pub mod error;
pub mod frame;
pub mod header;
pub mod message;
pub mod outgoing;
pub mod reader;
pub mod writer;

pub use assembler::{
    AssemblerConfig, AssemblerState, CollectOutcome, MessageAssembler, DEFAULT_MAX_FRAMES,
    DEFAULT_MAX_HEADER_LEN,
};
pub use codec::{decode_event, encode_event, EventLogConfig, DEFAULT_MAX_PAYLOAD, HEADER_SIZE};
pub use error::{AssemblerError, EventLogError, EventLogResult, HeaderError, Result};
pub use frame::{Frame, FrameKind};
pub use header::Header;
pub use message::Message;
pub use outgoing::{reply_header, OutgoingMessage};
pub use reader::EventReader;
pub use writer::EventWriter;
