//! # Cellgrid
//!
//! A double-buffered character-cell terminal runtime.
//!
//! Cellgrid owns the terminal for the lifetime of a [`Session`]: raw mode,
//! the alternate screen and a background thread reading input. The
//! application draws into a grid of [`Cell`]s and flushes; only cells that
//! differ from what is on screen are sent.
//!
//! ## Core Concepts
//!
//! - **Double-buffered rendering**: a desired (back) grid and a last-flushed
//!   (front) grid, reconciled by a minimal diff
//! - **Cached terminal state**: cursor position and colors are only sent
//!   when they change
//! - **Rendezvous input**: the reader thread hands over one chunk at a time
//!   and waits for the buffer to come back
//! - **Resize signals**: SIGWINCH becomes an [`Event::Resize`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use cellgrid::{Attribute, Event, Session};
//!
//! let mut session = Session::open()?;
//! for (i, ch) in "Hello".chars().enumerate() {
//!     session.set_cell(i as i32, 0, ch, Attribute::YELLOW, Attribute::DEFAULT);
//! }
//! session.flush()?;
//!
//! match session.poll_event() {
//!     Event::Key(key) => println!("{key:?}"),
//!     Event::Resize { width, height } => println!("{width}x{height}"),
//!     _ => {}
//! }
//! session.close()?;
//! # Ok::<(), cellgrid::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod actor;
pub mod buffer;
pub mod color;
pub mod error;
pub mod session;
pub mod terminal;

// Re-exports for convenience
pub use actor::{Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent};
pub use buffer::diff::DiffResult;
pub use buffer::{Attribute, Buffer, Cell, Style};
pub use color::{ColorMode, InputMode, Rgb, PALETTE_256};
pub use error::{Error, Result};
pub use session::{Session, SessionConfig};
pub use terminal::Capabilities;
