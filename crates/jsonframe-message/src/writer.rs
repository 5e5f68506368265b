use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::codec::{encode_event, EventLogConfig};
use crate::error::{EventLogError, EventLogResult};
use crate::frame::Frame;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes complete event records to any `Write` sink.
pub struct EventWriter<W> {
    inner: W,
    buf: BytesMut,
    config: EventLogConfig,
}

impl<W: Write> EventWriter<W> {
    pub fn new(inner: W) -> Self {
        Self::with_config(inner, EventLogConfig::default())
    }

    pub fn with_config(inner: W, config: EventLogConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Encode, write and flush one event.
    ///
    /// `Interrupted` is retried. Any other I/O error, `WouldBlock` included,
    /// is returned as `Io`; a non-blocking sink may have taken part of the record.
    pub fn write_event(&mut self, event: &Frame) -> EventLogResult<()> {
        if event.len() > self.config.max_payload_size {
            return Err(EventLogError::PayloadTooLarge {
                size: event.len(),
                max: self.config.max_payload_size,
            });
        }

        self.buf.clear();
        encode_event(event, &mut self.buf)?;

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(EventLogError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(EventLogError::Io(err)),
            }
        }

        self.flush()
    }

    /// Write every event in order.
    pub fn write_all<'a>(
        &mut self,
        events: impl IntoIterator<Item = &'a Frame>,
    ) -> EventLogResult<()> {
        for event in events {
            self.write_event(event)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> EventLogResult<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(EventLogError::Io(err)),
            }
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
