//! The host frontend as seen from the session.
//!
//! The host owns the window, the audio device and the option UI. It calls
//! into the session once per frame and provides everything below in return.

use std::path::PathBuf;

use bitflags::bitflags;

use crate::FileSystem;

bitflags! {
    /// Digital joypad buttons for one controller port.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PadButtons: u16 {
        const A = 1 << 0;
        const B = 1 << 1;
        const X = 1 << 2;
        const Y = 1 << 3;
        const UP = 1 << 4;
        const DOWN = 1 << 5;
        const LEFT = 1 << 6;
        const RIGHT = 1 << 7;
    }
}

/// Relative pointer input for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerInput {
    pub dx: i16,
    pub dy: i16,
    pub left: bool,
    pub right: bool,
}

/// Result of the single input poll of a frame.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputSnapshot {
    /// Controller ports 0 and 1.
    pub pads: [PadButtons; 2],
    pub pointer: PointerInput,
    /// Host key codes currently held down.
    pub keys: Vec<u32>,
}

/// One video frame handed to the host.
#[derive(Debug, Clone, Copy)]
pub struct VideoFrame<'a> {
    pub pixels: &'a [u16],
    pub width: usize,
    pub height: usize,
    /// Row stride in bytes.
    pub pitch: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Interleaved stereo sample output.
pub trait AudioSink {
    fn push_sample(&mut self, left: i16, right: i16);

    /// Push interleaved stereo frames. Returns the number of frames taken.
    fn push_batch(&mut self, interleaved: &[i16]) -> usize;
}

/// String-valued option lookup.
pub trait OptionSource {
    fn option(&self, key: &str) -> Option<&str>;
}

impl OptionSource for std::collections::HashMap<String, String> {
    fn option(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

/// The host frontend.
pub trait Host: AudioSink + OptionSource {
    /// Whether any option changed since the last call.
    fn options_updated(&mut self) -> bool {
        false
    }

    /// Sample every input device. Called exactly once per frame.
    fn poll_input(&mut self) -> InputSnapshot;

    fn present(&mut self, frame: &VideoFrame<'_>);

    /// User-visible log channel. Hosts without one get `tracing` output.
    fn log(&mut self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => tracing::debug!("{message}"),
            LogLevel::Info => tracing::info!("{message}"),
            LogLevel::Warn => tracing::warn!("{message}"),
            LogLevel::Error => tracing::error!("{message}"),
        }
    }

    /// Ask the host to stop the session in an orderly way.
    fn request_shutdown(&mut self);

    /// Directory holding system files such as ROMs.
    fn system_directory(&self) -> Option<PathBuf> {
        None
    }

    /// Host-provided virtual file access, if the host has one.
    fn file_system(&mut self) -> Option<Box<dyn FileSystem>> {
        None
    }
}
