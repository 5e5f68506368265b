use std::io::{ErrorKind, Read};

use bytes::BytesMut;

use crate::codec::{decode_event, EventLogConfig};
use crate::error::{EventLogError, EventLogResult};
use crate::frame::Frame;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads complete event records from any `Read` source.
///
/// Partial reads are buffered internally.
pub struct EventReader<R> {
    inner: R,
    buf: BytesMut,
    config: EventLogConfig,
    failed: bool,
}

impl<R: Read> EventReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_config(inner, EventLogConfig::default())
    }

    pub fn with_config(inner: R, config: EventLogConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            failed: false,
        }
    }

    /// Read the next event, failing with `ConnectionClosed` at end of input.
    pub fn read_event(&mut self) -> EventLogResult<Frame> {
        self.next_event()?.ok_or(EventLogError::ConnectionClosed)
    }

    /// Read the next event. `Ok(None)` means the input ended cleanly on a
    /// record boundary; ending inside a record is `ConnectionClosed`.
    pub fn next_event(&mut self) -> EventLogResult<Option<Frame>> {
        loop {
            if let Some(event) = decode_event(&mut self.buf, self.config.max_payload_size)? {
                return Ok(Some(event));
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(EventLogError::Io(err)),
            };

            if read == 0 {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                tracing::debug!(buffered = self.buf.len(), "event log ended mid-record");
                return Err(EventLogError::ConnectionClosed);
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    pub fn config(&self) -> &EventLogConfig {
        &self.config
    }
}

/// Yields events until clean end of input. Stops after the first error.
impl<R: Read> Iterator for EventReader<R> {
    type Item = EventLogResult<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.next_event().transpose();
        self.failed = matches!(item, Some(Err(_)));
        item
    }
}
