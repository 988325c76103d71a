//! Core traits and types for frame-paced BK emulation.
//!
//! The host calls the session once per frame; the session advances the
//! virtual clock by one frame budget. All timing derives from the tick rate
//! and the fixed 25 Hz frame cadence. No exceptions.

mod clock;
mod fs;
mod host;
mod machine;
mod ticks;

pub use clock::{ClockMultiplier, FRAMES_PER_SECOND, VirtualClock};
pub use fs::{AccessMode, FileHandle, FileSystem};
pub use host::{
    AudioSink, Host, InputSnapshot, LogLevel, OptionSource, PadButtons, PointerInput, VideoFrame,
};
pub use machine::{
    Display, DriveMedia, HardwareProfile, Keyboard, KeyboardLayout, KeyboardMode, Machine,
    MachineFault, MouseMode, Peripheral, PointerState, RomSlot, RunContext, SCREEN_HEIGHT,
    SCREEN_PITCH, SCREEN_WIDTH,
};
pub use ticks::Ticks;
