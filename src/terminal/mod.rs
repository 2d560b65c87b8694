//! Terminal module: device control and output encoding.
//!
//! - [`Tty`]: the control device, raw mode and window size
//! - [`Capabilities`]: named control sequences
//! - [`OutputBuffer`]: escape sequence accumulator flushed in one write
//! - [`signal`]: self-pipes for resize and shutdown wakeups

pub mod caps;
pub mod output;
pub mod signal;
pub mod tty;

pub use caps::Capabilities;
pub use output::OutputBuffer;
pub use tty::Tty;
