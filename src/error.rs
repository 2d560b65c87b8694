//! Error types for session setup, rendering and input.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by a terminal [`Session`](crate::Session).
///
/// Setup failures are returned synchronously from `open` and
/// `set_color_mode` and are never retried. Read failures on the input
/// descriptor arrive as [`Event::Error`](crate::Event::Error) instead.
#[derive(Error, Debug)]
pub enum Error {
    /// The control device could not be opened.
    #[error("failed to open terminal device {}: {source}", path.display())]
    DeviceOpen {
        /// Path of the device that was opened.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// `tcgetattr` failed.
    #[error("failed to read terminal attributes: {0}")]
    GetAttributes(#[source] io::Error),

    /// `tcsetattr` failed.
    #[error("failed to set terminal attributes: {0}")]
    SetAttributes(#[source] io::Error),

    /// The input descriptor, wake pipe or resize signal could not be set up.
    #[error("failed to configure terminal input: {0}")]
    InputSetup(#[source] io::Error),

    /// The background input thread could not be spawned.
    #[error("failed to spawn input thread: {0}")]
    Spawn(#[source] io::Error),

    /// Another session is already active in this process.
    #[error("a terminal session is already active")]
    AlreadyActive,

    /// 256-color mode requested but `TERM` is not set.
    #[error("TERM environment variable not set")]
    TermUnset,

    /// 256-color mode requested but `TERM` does not declare it.
    #[error("TERM ({0:?}) does not declare 256-color support")]
    No256Color(String),

    /// Writing to the terminal failed.
    #[error("failed to write to terminal: {0}")]
    Write(#[source] io::Error),

    /// Reading from the terminal failed.
    #[error("failed to read from terminal: {0}")]
    Read(#[source] io::Error),

    /// The input thread is gone and no further input will arrive.
    #[error("terminal input closed")]
    InputClosed,
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
