//! Session: the terminal, both grids and the event pipeline.
//!
//! A [`Session`] is the entry point for applications. It puts the terminal
//! into raw mode on the alternate screen, owns the renderer and the input
//! thread, and restores everything when closed or dropped.
//!
//! ```no_run
//! use cellgrid::{Attribute, KeyCode, Session};
//!
//! let mut session = Session::open()?;
//! session.set_cell(0, 0, 'H', Attribute::GREEN, Attribute::DEFAULT);
//! session.flush()?;
//! loop {
//!     if session.poll_event().is_key(KeyCode::Esc) {
//!         break;
//!     }
//! }
//! session.close()?;
//! # Ok::<(), cellgrid::Error>(())
//! ```

mod renderer;

pub use renderer::Renderer;

use crate::actor::{Event, EventPipeline, InputActor, InputChannels};
use crate::buffer::diff::DiffResult;
use crate::buffer::{Attribute, Cell};
use crate::color::{check_256_color, ColorMode, InputMode, Rgb, PALETTE_256};
use crate::error::{Error, Result};
use crate::terminal::signal::ResizeSignal;
use crate::terminal::{Capabilities, Tty};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Set while a session is open in this process.
static ACTIVE: AtomicBool = AtomicBool::new(false);

/// Ownership of [`ACTIVE`]; released on drop.
struct ActiveClaim;

impl ActiveClaim {
    fn acquire() -> Result<Self> {
        ACTIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self)
            .map_err(|_| Error::AlreadyActive)
    }
}

impl Drop for ActiveClaim {
    fn drop(&mut self) {
        ACTIVE.store(false, Ordering::Release);
    }
}

/// Configuration for a [`Session`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Control device to open.
    pub device: PathBuf,
    /// Size of the input thread's read buffer.
    pub read_chunk_size: usize,
    /// Initial capacity of the output buffer.
    pub output_capacity: usize,
    /// Control sequences to emit.
    pub capabilities: Capabilities,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from("/dev/tty"),
            read_chunk_size: 128,
            output_capacity: 4096,
            capabilities: Capabilities::default(),
        }
    }
}

/// An open terminal session.
///
/// At most one session exists per process at a time. The terminal is
/// restored by [`close`](Self::close), or on drop if `close` was never
/// called.
pub struct Session {
    tty: Tty,
    renderer: Renderer,
    input_mode: InputMode,
    pipeline: EventPipeline,
    input: Option<InputActor>,
    resize: Option<ResizeSignal>,
    active: Option<ActiveClaim>,
    closed: bool,
}

impl Session {
    /// Open `/dev/tty` with the default configuration.
    pub fn open() -> Result<Self> {
        Self::open_with(SessionConfig::default())
    }

    /// Open a session with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyActive`] if another session is open, and
    /// the corresponding setup error if the device cannot be opened or
    /// configured. Anything changed before the failure is put back.
    pub fn open_with(config: SessionConfig) -> Result<Self> {
        let active = ActiveClaim::acquire()?;
        let tty = Tty::open(&config.device)?;
        let (resize, resize_fd) = ResizeSignal::install().map_err(Error::InputSetup)?;
        tty.enter_raw_mode()?;

        let (channels, ends) = InputChannels::new();
        let mut session = Self {
            tty,
            renderer: Renderer::new(0, 0, config.capabilities, config.output_capacity),
            input_mode: InputMode::default(),
            pipeline: EventPipeline::new(channels),
            input: None,
            resize: Some(resize),
            active: Some(active),
            closed: false,
        };

        // From here on, dropping `session` restores the terminal.
        let enter = session.renderer.capabilities().enter_sequence();
        session.tty.write_all(enter.as_bytes())?;

        let (width, height) = session.tty.size();
        session.renderer.reset(width, height);

        let input = session.tty.input_handle().map_err(Error::InputSetup)?;
        session.input = Some(InputActor::spawn(
            input,
            resize_fd,
            ends,
            config.read_chunk_size,
        )?);

        log::debug!(
            "terminal session opened on {} ({width}x{height})",
            config.device.display()
        );
        Ok(session)
    }

    /// Stop input, restore the terminal and end the session.
    ///
    /// # Errors
    ///
    /// Returns the first write or attribute error; every teardown step is
    /// attempted regardless.
    pub fn close(mut self) -> Result<()> {
        self.teardown()
    }

    fn teardown(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        if let Some(input) = self.input.take() {
            input.join();
        }

        let exit = self.renderer.capabilities().exit_sequence();
        let written = self.tty.write_all(exit.as_bytes());
        let restored = self.tty.restore();

        self.resize.take();
        self.renderer.reset(0, 0);
        self.input_mode = InputMode::default();
        self.active.take();

        log::debug!("terminal session closed");
        written.and(restored)
    }

    /// Write and discard pending renderer output.
    fn write_pending(&mut self) -> Result<()> {
        if self.renderer.pending_output().is_empty() {
            return Ok(());
        }
        let result = self.tty.write_all(self.renderer.pending_output());
        self.renderer.discard_output();
        result
    }

    /// Draw the differences between the desired grid and the screen.
    ///
    /// While the cursor is visible every flush ends by repositioning it,
    /// so an unchanged grid writes nothing only with the cursor hidden.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`] if the terminal write fails. The front grid
    /// has already been updated at that point; call [`sync`](Self::sync)
    /// after recovering.
    pub fn flush(&mut self) -> Result<DiffResult> {
        let result = self.renderer.render(self.tty.size());
        log::trace!(
            "flush: {} cells, {} moves, {} color changes",
            result.cells_changed,
            result.cursor_moves,
            result.color_changes
        );
        self.write_pending()?;
        Ok(result)
    }

    /// Show the cursor at (x, y); takes effect with the next write.
    pub fn set_cursor(&mut self, x: u16, y: u16) {
        self.renderer.set_cursor(x, y);
    }

    /// Hide the cursor; takes effect with the next write.
    pub fn hide_cursor(&mut self) {
        self.renderer.hide_cursor();
    }

    /// Put a glyph into the desired grid. Out-of-range coordinates are
    /// ignored.
    pub fn set_cell(&mut self, x: i32, y: i32, ch: char, fg: Attribute, bg: Attribute) {
        self.renderer.set_cell(x, y, Cell::new(ch, fg, bg));
    }

    /// The desired grid's cells, row-major.
    pub fn cell_buffer(&mut self) -> &mut [Cell] {
        self.renderer.back_mut().cells_mut()
    }

    /// Block until the next event.
    pub fn poll_event(&mut self) -> Event {
        let tty = &self.tty;
        self.pipeline.next(self.input_mode, || tty.size())
    }

    /// Wait up to `timeout` for the next event; [`Event::None`] if none
    /// arrived.
    pub fn poll_event_timeout(&mut self, timeout: Duration) -> Event {
        let tty = &self.tty;
        self.pipeline
            .next_timeout(self.input_mode, || tty.size(), timeout)
    }

    /// Grid size in (columns, rows).
    pub const fn size(&self) -> (u16, u16) {
        self.renderer.size()
    }

    /// Blank the desired grid with `fg`/`bg`, which also become the colors
    /// for later resizes and syncs.
    pub fn clear(&mut self, fg: Attribute, bg: Attribute) -> Result<()> {
        if self.renderer.clear(fg, bg, self.tty.size()) {
            self.write_pending()?;
        }
        Ok(())
    }

    /// Set the input mode, or query it with [`InputMode::CURRENT`].
    ///
    /// Mouse reporting is switched on or off to match the `MOUSE` bit.
    pub fn set_input_mode(&mut self, mode: InputMode) -> Result<InputMode> {
        if mode == InputMode::CURRENT {
            return Ok(self.input_mode);
        }
        self.renderer.set_mouse(mode.contains(InputMode::MOUSE));
        self.input_mode = mode.normalized();
        self.write_pending()?;
        Ok(self.input_mode)
    }

    /// Current input mode.
    pub const fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    /// Select 16 or 256 colors.
    ///
    /// # Errors
    ///
    /// 256 colors require `TERM` to name a 256-color terminal:
    /// [`Error::TermUnset`] or [`Error::No256Color`] otherwise. On success
    /// the built-in palette is sent.
    pub fn set_color_mode(&mut self, mode: ColorMode) -> Result<()> {
        if mode == ColorMode::Color256 {
            check_256_color(std::env::var("TERM").ok().as_deref())?;
        }
        self.renderer.set_color_mode(mode);
        if mode == ColorMode::Color256 {
            self.renderer.write_palette(&PALETTE_256);
        }
        log::debug!("color mode set to {mode:?}");
        self.write_pending()
    }

    /// Current color mode.
    pub const fn color_mode(&self) -> ColorMode {
        self.renderer.color_mode()
    }

    /// Redefine palette entries `0..palette.len()`.
    pub fn set_color_palette(&mut self, palette: &[Rgb]) -> Result<()> {
        self.renderer.write_palette(palette);
        self.write_pending()
    }

    /// Clear the screen and redraw the whole desired grid.
    pub fn sync(&mut self) -> Result<DiffResult> {
        let result = self.renderer.sync(self.tty.size());
        self.write_pending()?;
        Ok(result)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(err) = self.teardown() {
            log::warn!("terminal teardown failed: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.device, PathBuf::from("/dev/tty"));
        assert_eq!(config.read_chunk_size, 128);
        assert_eq!(config.output_capacity, 4096);
        assert_eq!(config.capabilities, Capabilities::xterm());
    }

    #[test]
    fn test_failed_open_releases_claim() {
        let config = SessionConfig {
            device: PathBuf::from("/nonexistent/tty"),
            ..SessionConfig::default()
        };
        assert!(matches!(
            Session::open_with(config.clone()),
            Err(Error::DeviceOpen { .. })
        ));
        // A second attempt fails the same way rather than as AlreadyActive.
        assert!(matches!(
            Session::open_with(config),
            Err(Error::DeviceOpen { .. })
        ));
    }
}
