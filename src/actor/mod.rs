//! Event pipeline: a reader thread and a blocking foreground consumer.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   InputChunk (rendezvous)  ┌────────────────┐
//! │ Input Thread │ ─────────────────────────▶ │                │
//! │   poll(2)    │ ◀───────────────────────── │ EventPipeline  │ ──▶ Event
//! └──────────────┘     Vec<u8> (hand back)    │  decode_event  │
//!        │                                    │                │
//!        └──────────── () resize ───────────▶ └────────────────┘
//! ```
//!
//! The reader never holds more than one unconsumed chunk, and the
//! foreground decodes buffered bytes before looking at a pending resize.

mod decode;
mod input;
mod messages;
mod pipeline;

pub use decode::decode_event;
pub use input::{InputActor, InputChannels, ReaderEnds};
pub use messages::{Event, InputChunk, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent};
pub use pipeline::EventPipeline;
