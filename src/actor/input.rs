//! Input Actor: Dedicated thread reading the terminal.
//!
//! The thread blocks in `poll(2)` on three descriptors: the terminal input,
//! the resize self-pipe and a wake pipe used for shutdown. Terminal bytes
//! are handed to the foreground one chunk at a time over a zero-capacity
//! channel; the thread does not read again until the buffer comes back.
#![allow(unsafe_code)]

use super::messages::InputChunk;
use crate::error::{Error, Result};
use crate::terminal::signal::{self, Waker};
use crossbeam_channel::{bounded, select, Receiver, Sender};
use std::fs::File;
use std::io::{self, Read};
use std::os::unix::io::{AsRawFd, OwnedFd, RawFd};
use std::thread::{self, JoinHandle};

/// Foreground ends of the channels the reader thread talks through.
#[derive(Debug)]
pub struct InputChannels {
    /// Chunks read from the terminal (rendezvous).
    pub chunks: Receiver<InputChunk>,
    /// Buffers going back to the reader.
    pub handback: Sender<Vec<u8>>,
    /// One message per coalesced SIGWINCH.
    pub resize: Receiver<()>,
}

impl InputChannels {
    /// Create an unconnected set of channels, returning the reader's ends.
    pub fn new() -> (Self, ReaderEnds) {
        let (chunk_tx, chunk_rx) = bounded(0);
        let (handback_tx, handback_rx) = bounded(1);
        let (resize_tx, resize_rx) = bounded(1);
        let channels = Self {
            chunks: chunk_rx,
            handback: handback_tx,
            resize: resize_rx,
        };
        let ends = ReaderEnds {
            chunks: chunk_tx,
            handback: handback_rx,
            resize: resize_tx,
        };
        (channels, ends)
    }
}

/// Reader-side ends of [`InputChannels`].
#[derive(Debug)]
pub struct ReaderEnds {
    /// Offer chunks here.
    pub chunks: Sender<InputChunk>,
    /// Wait for the buffer here.
    pub handback: Receiver<Vec<u8>>,
    /// Report resizes here with `try_send`.
    pub resize: Sender<()>,
}

/// Input actor that reads terminal bytes and resize notifications.
pub struct InputActor {
    /// Handle to the input thread.
    handle: Option<JoinHandle<()>>,
    /// Dropping this cancels any pending handoff.
    quit: Option<Sender<()>>,
    /// Interrupts the thread's `poll(2)`.
    waker: Waker,
}

/// Everything the reader thread owns.
struct Reader {
    input: File,
    resize_fd: OwnedFd,
    wake_fd: OwnedFd,
    ends: ReaderEnds,
    quit: Receiver<()>,
    chunk_size: usize,
}

impl InputActor {
    /// Spawn the input actor thread.
    ///
    /// # Arguments
    ///
    /// * `input` - Non-blocking terminal input descriptor.
    /// * `resize_fd` - Read end of the SIGWINCH self-pipe.
    /// * `ends` - Reader-side channel ends.
    /// * `chunk_size` - Size of the single read buffer.
    pub fn spawn(input: File, resize_fd: OwnedFd, ends: ReaderEnds, chunk_size: usize) -> Result<Self> {
        let (waker, wake_fd) = Waker::new().map_err(Error::InputSetup)?;
        let (quit_tx, quit_rx) = bounded::<()>(0);

        let reader = Reader {
            input,
            resize_fd,
            wake_fd,
            ends,
            quit: quit_rx,
            chunk_size: chunk_size.max(1),
        };

        let handle = thread::Builder::new()
            .name("cellgrid-input".to_string())
            .spawn(move || reader.run_loop())
            .map_err(Error::Spawn)?;

        Ok(Self {
            handle: Some(handle),
            quit: Some(quit_tx),
            waker,
        })
    }

    /// Signal the input thread to shutdown.
    pub fn shutdown(&mut self) {
        self.quit.take();
        self.waker.wake();
    }

    /// Signal shutdown and wait for the input thread to finish.
    pub fn join(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("input thread panicked");
            }
        }
    }
}

impl Drop for InputActor {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Reader {
    /// Main input loop.
    fn run_loop(self) {
        let mut buf = vec![0u8; self.chunk_size];
        let mut fds = [
            pollfd(self.input.as_raw_fd()),
            pollfd(self.wake_fd.as_raw_fd()),
            pollfd(self.resize_fd.as_raw_fd()),
        ];

        loop {
            if let Err(err) = poll(&mut fds) {
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                let _ = self.offer(buf, Err(err));
                return;
            }

            if fds[1].revents != 0 {
                return;
            }

            if fds[2].revents != 0 {
                signal::drain(self.resize_fd.as_raw_fd());
                // A pending notification already covers this resize.
                let _ = self.ends.resize.try_send(());
            }

            if fds[0].revents & libc::POLLNVAL != 0 {
                let _ = self.offer(buf, Err(io::Error::from_raw_os_error(libc::EBADF)));
                return;
            }
            if fds[0].revents == 0 {
                continue;
            }

            match self.drain_input(buf) {
                Some(back) => buf = back,
                None => return,
            }
        }
    }

    /// Read until `WouldBlock`, handing each chunk over.
    ///
    /// Returns the buffer to keep reading with, or `None` when the thread
    /// should stop.
    fn drain_input(&self, mut buf: Vec<u8>) -> Option<Vec<u8>> {
        loop {
            match (&self.input).read(&mut buf) {
                Ok(0) => {
                    let eof = io::Error::new(io::ErrorKind::UnexpectedEof, "terminal input closed");
                    let _ = self.offer(buf, Err(eof));
                    return None;
                }
                Ok(n) => buf = self.offer(buf, Ok(n))?,
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => return Some(buf),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return self.offer(buf, Err(err)),
            }
        }
    }

    /// Hand a chunk to the foreground and wait for the buffer to return.
    ///
    /// Shutdown ends either wait; the chunk is then dropped.
    fn offer(&self, buf: Vec<u8>, result: io::Result<usize>) -> Option<Vec<u8>> {
        let chunk = InputChunk { buf, result };
        select! {
            recv(self.quit) -> _ => return None,
            send(self.ends.chunks, chunk) -> sent => sent.ok()?,
        }
        select! {
            recv(self.quit) -> _ => None,
            recv(self.ends.handback) -> buf => buf.ok(),
        }
    }
}

const fn pollfd(fd: RawFd) -> libc::pollfd {
    libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    }
}

/// Block until any descriptor is ready.
fn poll(fds: &mut [libc::pollfd]) -> io::Result<()> {
    for fd in fds.iter_mut() {
        fd.revents = 0;
    }
    // SAFETY: fds is a valid, exclusively borrowed array of pollfd.
    let ready = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, -1) };
    if ready < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
