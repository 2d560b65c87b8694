//! Terminal device control: raw mode, window size and descriptors.
//!
//! This module necessarily uses `unsafe` for termios (`tcgetattr`,
//! `tcsetattr`), `ioctl(TIOCGWINSZ)` and `fcntl`. Each block is minimal.
#![allow(unsafe_code)]

use crate::error::{Error, Result};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::Path;

/// The controlling terminal, opened once for output and once for input.
pub struct Tty {
    /// Write-only descriptor for all output and termios calls.
    out: File,
    /// Read-only, non-blocking descriptor handed to the input reader.
    input: File,
    /// Attributes captured at open, restored at close.
    original: libc::termios,
}

impl Tty {
    /// Open the device at `path` and capture its current attributes.
    ///
    /// The input descriptor is switched to non-blocking mode so the reader
    /// can drain it until `WouldBlock`.
    pub fn open(path: &Path) -> Result<Self> {
        let open_error = |source| Error::DeviceOpen {
            path: path.to_path_buf(),
            source,
        };
        let out = OpenOptions::new().write(true).open(path).map_err(open_error)?;
        let input = OpenOptions::new().read(true).open(path).map_err(open_error)?;

        set_nonblocking(input.as_raw_fd()).map_err(Error::InputSetup)?;

        let original = get_attributes(out.as_raw_fd()).map_err(Error::GetAttributes)?;

        Ok(Self {
            out,
            input,
            original,
        })
    }

    /// Apply raw mode derived from the captured attributes.
    pub fn enter_raw_mode(&self) -> Result<()> {
        let raw_mode = make_raw(self.original);
        set_attributes(self.out.as_raw_fd(), &raw_mode).map_err(Error::SetAttributes)
    }

    /// Put back the attributes captured at open.
    pub fn restore(&self) -> Result<()> {
        set_attributes(self.out.as_raw_fd(), &self.original).map_err(Error::SetAttributes)
    }

    /// Current size in (columns, rows); `(0, 0)` if the query fails.
    pub fn size(&self) -> (u16, u16) {
        window_size(self.out.as_raw_fd()).unwrap_or((0, 0))
    }

    /// Write bytes to the terminal and flush.
    pub fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.out.write_all(bytes).map_err(Error::Write)?;
        self.out.flush().map_err(Error::Write)
    }

    /// A second handle on the input descriptor for the reader thread.
    pub fn input_handle(&self) -> io::Result<File> {
        self.input.try_clone()
    }
}

/// Raw-mode attributes: no line editing, echo, signal keys or output
/// post-processing; reads return after one byte with no timeout.
pub fn make_raw(mut termios: libc::termios) -> libc::termios {
    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON);
    termios.c_oflag &= !libc::OPOST;
    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
    termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
    termios.c_cflag |= libc::CS8;
    termios.c_cc[libc::VMIN] = 1;
    termios.c_cc[libc::VTIME] = 0;
    termios
}

fn get_attributes(fd: RawFd) -> io::Result<libc::termios> {
    // SAFETY: termios is plain data and tcgetattr fully initializes it on success.
    unsafe {
        let mut termios: libc::termios = std::mem::zeroed();
        if libc::tcgetattr(fd, &mut termios) != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(termios)
    }
}

fn set_attributes(fd: RawFd, termios: &libc::termios) -> io::Result<()> {
    // SAFETY: termios points to a valid struct for the duration of the call.
    if unsafe { libc::tcsetattr(fd, libc::TCSANOW, termios) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Query (columns, rows) via `ioctl(TIOCGWINSZ)`.
pub fn window_size(fd: RawFd) -> Option<(u16, u16)> {
    // SAFETY: winsize is plain data filled in by the ioctl.
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut ws) };
    (result == 0).then_some((ws.ws_col, ws.ws_row))
}

/// Add `O_NONBLOCK` to a descriptor's status flags.
pub fn set_nonblocking(fd: RawFd) -> io::Result<()> {
    // SAFETY: fcntl on a descriptor we own; no pointers involved.
    unsafe {
        let flags = libc::fcntl(fd, libc::F_GETFL);
        if flags < 0 {
            return Err(io::Error::last_os_error());
        }
        if libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) < 0 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}
