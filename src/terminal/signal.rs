//! Self-pipes for waking the input reader.
//!
//! A signal handler may only do async-signal-safe work, so SIGWINCH is
//! turned into a byte on a pipe that the reader thread polls alongside the
//! terminal. The same trick wakes the reader for shutdown.
#![allow(unsafe_code)]

use super::tty::set_nonblocking;
use std::io;
use std::os::unix::io::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::sync::atomic::{AtomicI32, Ordering};

/// Write end of the resize pipe, or -1 when no handler is installed.
static WINCH_WRITE_FD: AtomicI32 = AtomicI32::new(-1);

extern "C" fn on_sigwinch(_sig: libc::c_int) {
    let fd = WINCH_WRITE_FD.load(Ordering::Relaxed);
    if fd >= 0 {
        poke(fd);
    }
}

/// Write a single byte; a full pipe already carries a pending wakeup.
fn poke(fd: RawFd) {
    let byte = 1u8;
    // SAFETY: writes one byte from a live stack variable; write(2) is
    // async-signal-safe.
    unsafe {
        libc::write(fd, std::ptr::addr_of!(byte).cast(), 1);
    }
}

/// Create a non-blocking, close-on-exec pipe as `(read, write)`.
pub fn pipe() -> io::Result<(OwnedFd, OwnedFd)> {
    let mut fds = [0 as RawFd; 2];
    // SAFETY: fds has room for the two descriptors pipe(2) writes.
    if unsafe { libc::pipe(fds.as_mut_ptr()) } != 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: pipe(2) succeeded, so both descriptors are open and ours.
    let (read, write) = unsafe { (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) };
    for fd in [&read, &write] {
        set_nonblocking(fd.as_raw_fd())?;
        // SAFETY: fcntl on a descriptor we own.
        if unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_SETFD, libc::FD_CLOEXEC) } < 0 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok((read, write))
}

/// Read and discard everything currently in a non-blocking pipe.
pub fn drain(fd: RawFd) {
    let mut scratch = [0u8; 64];
    loop {
        // SAFETY: reads into a live stack buffer of the stated length.
        let n = unsafe { libc::read(fd, scratch.as_mut_ptr().cast(), scratch.len()) };
        if n <= 0 {
            break;
        }
    }
}

/// Wakes a thread blocked in `poll(2)` on the paired read end.
pub struct Waker {
    write: OwnedFd,
}

impl Waker {
    /// Create a waker and the read end to poll.
    pub fn new() -> io::Result<(Self, OwnedFd)> {
        let (read, write) = pipe()?;
        Ok((Self { write }, read))
    }

    /// Make the read end readable.
    pub fn wake(&self) {
        poke(self.write.as_raw_fd());
    }
}

/// Installed SIGWINCH handler; the previous disposition comes back on drop.
pub struct ResizeSignal {
    write: OwnedFd,
    previous: libc::sigaction,
}

impl ResizeSignal {
    /// Install the handler and return the read end that becomes readable
    /// on every resize.
    pub fn install() -> io::Result<(Self, OwnedFd)> {
        let (read, write) = pipe()?;
        WINCH_WRITE_FD.store(write.as_raw_fd(), Ordering::Relaxed);

        // SAFETY: sigaction structs are plain data; the handler only touches
        // an atomic and write(2).
        let previous = unsafe {
            let mut action: libc::sigaction = std::mem::zeroed();
            action.sa_sigaction = on_sigwinch as extern "C" fn(libc::c_int) as libc::sighandler_t;
            action.sa_flags = libc::SA_RESTART;
            libc::sigemptyset(&mut action.sa_mask);

            let mut previous: libc::sigaction = std::mem::zeroed();
            if libc::sigaction(libc::SIGWINCH, &action, &mut previous) != 0 {
                WINCH_WRITE_FD.store(-1, Ordering::Relaxed);
                return Err(io::Error::last_os_error());
            }
            previous
        };

        Ok((Self { write, previous }, read))
    }
}

impl Drop for ResizeSignal {
    fn drop(&mut self) {
        // SAFETY: restores the disposition saved by install().
        unsafe {
            libc::sigaction(libc::SIGWINCH, &self.previous, std::ptr::null_mut());
        }
        let _ = WINCH_WRITE_FD.compare_exchange(
            self.write.as_raw_fd(),
            -1,
            Ordering::Relaxed,
            Ordering::Relaxed,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn readable(fd: RawFd) -> bool {
        let mut pfd = libc::pollfd {
            fd,
            events: libc::POLLIN,
            revents: 0,
        };
        // SAFETY: polls one valid pollfd with a zero timeout.
        unsafe { libc::poll(&mut pfd, 1, 0) == 1 }
    }

    #[test]
    fn test_waker_makes_read_end_readable() {
        let (waker, read) = Waker::new().unwrap();
        assert!(!readable(read.as_raw_fd()));
        waker.wake();
        waker.wake();
        assert!(readable(read.as_raw_fd()));
        drain(read.as_raw_fd());
        assert!(!readable(read.as_raw_fd()));
    }

    #[test]
    fn test_pipe_is_nonblocking() {
        let (read, _write) = pipe().unwrap();
        // Draining an empty non-blocking pipe returns immediately.
        drain(read.as_raw_fd());
        assert!(!readable(read.as_raw_fd()));
    }
}
