//! Event Pipeline: the foreground side of the input handoff.
//!
//! Bytes received from the reader accumulate in a local buffer and are
//! decoded one event at a time. Anything already buffered is delivered
//! before a pending resize.

use super::decode::decode_event;
use super::input::InputChannels;
use super::messages::{Event, InputChunk};
use crate::color::InputMode;
use crate::error::Error;
use crossbeam_channel::{after, never, select};
use std::time::Duration;

/// Blocking event source fed by the input actor.
#[derive(Debug)]
pub struct EventPipeline {
    channels: InputChannels,
    /// Bytes received but not yet decoded.
    pending: Vec<u8>,
}

impl EventPipeline {
    /// Create a pipeline over the foreground channel ends.
    pub fn new(channels: InputChannels) -> Self {
        Self {
            channels,
            pending: Vec::with_capacity(256),
        }
    }

    /// Bytes waiting to be decoded.
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// Block until the next event.
    ///
    /// `size` is queried when a resize is delivered.
    pub fn next(&mut self, mode: InputMode, size: impl FnMut() -> (u16, u16)) -> Event {
        self.wait(mode, size, None)
    }

    /// Like [`next`](Self::next), but return [`Event::None`] once `timeout`
    /// elapses.
    pub fn next_timeout(
        &mut self,
        mode: InputMode,
        size: impl FnMut() -> (u16, u16),
        timeout: Duration,
    ) -> Event {
        self.wait(mode, size, Some(timeout))
    }

    fn wait(
        &mut self,
        mode: InputMode,
        mut size: impl FnMut() -> (u16, u16),
        timeout: Option<Duration>,
    ) -> Event {
        if let Some(event) = decode_event(&mut self.pending, mode) {
            return event;
        }

        let deadline = timeout.map_or_else(never, after);
        loop {
            select! {
                recv(self.channels.chunks) -> chunk => {
                    let Ok(chunk) = chunk else {
                        return Event::error(Error::InputClosed);
                    };
                    if let Some(event) = self.receive(chunk, mode) {
                        return event;
                    }
                }
                recv(self.channels.resize) -> notice => {
                    if notice.is_err() {
                        return Event::error(Error::InputClosed);
                    }
                    let (width, height) = size();
                    return Event::Resize { width, height };
                }
                recv(deadline) -> _ => return Event::None,
            }
        }
    }

    /// Take a chunk's bytes and give its buffer back to the reader.
    fn receive(&mut self, chunk: InputChunk, mode: InputMode) -> Option<Event> {
        let InputChunk { buf, result } = chunk;
        match result {
            Err(err) => {
                let _ = self.channels.handback.send(buf);
                Some(Event::error(Error::Read(err)))
            }
            Ok(n) => {
                self.pending.extend_from_slice(&buf[..n.min(buf.len())]);
                let _ = self.channels.handback.send(buf);
                decode_event(&mut self.pending, mode)
            }
        }
    }
}
