//! Collaborator traits for the emulated hardware.
//!
//! The session drives these but does not implement them: instruction
//! stepping, device registers, raster composition and scan-code translation
//! all live behind the traits below.

use std::path::Path;

use thiserror::Error;

use crate::{AudioSink, InputSnapshot, Ticks};

/// Logical canvas width in pixels.
pub const SCREEN_WIDTH: usize = 512;
/// Logical canvas height in pixels.
pub const SCREEN_HEIGHT: usize = 512;
/// Row stride in bytes (RGB565, two bytes per pixel).
pub const SCREEN_PITCH: usize = SCREEN_WIDTH * 2;

/// An unrecoverable failure inside the CPU or device simulation.
#[derive(Debug, Error)]
#[error("machine fault: {0}")]
pub struct MachineFault(pub String);

/// Mouse resolution for the UP-port mouse adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseMode {
    Low,
    High,
}

/// The single device wired to the user port.
///
/// The variants are mutually exclusive: a session has exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Peripheral {
    #[default]
    None,
    /// Covox-style 8-bit DAC.
    Covox,
    /// AY-3-8910 sound chip.
    Synthesizer,
    Mouse(MouseMode),
    Joystick,
}

impl Peripheral {
    #[must_use]
    pub const fn mouse(self) -> Option<MouseMode> {
        match self {
            Peripheral::Mouse(mode) => Some(mode),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_joystick(self) -> bool {
        matches!(self, Peripheral::Joystick)
    }
}

/// ROM sockets a variant may populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RomSlot {
    /// System monitor, mapped at 0o100000.
    Monitor,
    /// FOCAL or BASIC, mapped at 0o120000.
    Language,
    /// Floppy controller firmware, mapped at 0o160000.
    DiskController,
}

impl RomSlot {
    pub const ALL: [RomSlot; 3] = [RomSlot::Monitor, RomSlot::Language, RomSlot::DiskController];

    /// Base address of the socket in the PDP-11 address space.
    #[must_use]
    pub const fn base_address(self) -> u16 {
        match self {
            RomSlot::Monitor => 0o100_000,
            RomSlot::Language => 0o120_000,
            RomSlot::DiskController => 0o160_000,
        }
    }
}

/// Keyboard layout used when translating host keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyboardLayout {
    #[default]
    Qwerty,
    Jcuken,
}

/// How the keyboard front-end receives host keys. Fixed for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyboardMode {
    #[default]
    Poll,
    Callback,
}

/// Hardware facts the machine needs before it powers on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HardwareProfile {
    /// BK-0011M memory map and banking.
    pub bk0011: bool,
    /// Floppy controller present.
    pub disk_controller: bool,
    /// Terak 8510/a instead of a BK.
    pub terak: bool,
    /// Effective tick rate in ticks per second.
    pub tick_rate_hz: u64,
}

/// Pointer state latched into the mouse adapter once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerState {
    /// Accumulated relative X motion since the session began.
    pub rel_x: i32,
    /// Accumulated relative Y motion since the session began.
    pub rel_y: i32,
    /// Button word: bit 0 left, bit 1 right, scaled by the adapter's enable
    /// value.
    pub buttons: u16,
}

/// Removable media as seen by the drive emulation.
pub trait DriveMedia {
    /// Number of drive units (always 4 on the BK floppy controller).
    fn unit_count(&self) -> usize;

    /// Image bytes for a unit, or `None` when the drive is empty.
    ///
    /// An empty drive must read as end of media, never as zero-filled data.
    fn unit(&self, index: usize) -> Option<&[u8]>;

    /// Mutable image bytes for a unit, or `None` when empty or read-only.
    fn unit_mut(&mut self, index: usize) -> Option<&mut [u8]>;

    fn is_read_only(&self, index: usize) -> bool;
}

/// Collaborators available to the machine while it executes.
pub struct RunContext<'a> {
    /// Incremental sample output; the sound devices call back into this.
    pub audio: &'a mut dyn AudioSink,
    pub media: &'a mut dyn DriveMedia,
}

/// The CPU and device simulation.
pub trait Machine {
    /// Bring up memory, devices and the CPU for the given hardware.
    fn power_on(&mut self, profile: &HardwareProfile) -> Result<(), MachineFault>;

    /// Install a ROM image into a socket.
    fn load_rom(&mut self, slot: RomSlot, image: &[u8]) -> Result<(), MachineFault>;

    /// Reset every device on the bus.
    fn reset_devices(&mut self);

    /// Wire the user-port peripheral. Called at most once per session.
    fn attach_peripheral(&mut self, peripheral: Peripheral);

    /// Update the effective tick rate used by timers and sound devices.
    fn set_tick_rate(&mut self, tick_rate_hz: u64);

    /// Enable or disable sample production by the sound devices.
    fn set_sound_enabled(&mut self, enabled: bool);

    /// Directory the tape emulation resolves file names against.
    fn set_tape_directory(&mut self, _dir: &Path) {}

    /// Cumulative tick counter.
    fn ticks(&self) -> Ticks;

    /// Execute until the cumulative tick counter reaches `target`.
    ///
    /// Returns immediately when the counter is already at or past `target`.
    fn run_until(&mut self, target: Ticks, ctx: &mut RunContext<'_>) -> Result<(), MachineFault>;

    fn read_word(&self, address: u16) -> u16;

    fn write_byte(&mut self, address: u16, value: u8);

    fn set_pc(&mut self, pc: u16);

    /// Current value of the mouse adapter's button enable register.
    fn mouse_button_enable(&self) -> u16;

    fn set_pointer(&mut self, state: PointerState);

    fn set_joystick(&mut self, state: u16);

    /// Output sample rate of the sound devices in Hz.
    fn sample_rate(&self) -> u32;

    /// Size of the mutable state record. Constant once powered on.
    fn state_size(&self) -> usize;

    /// Append exactly `state_size()` bytes of state to `out`.
    fn save_state(&self, out: &mut Vec<u8>);

    /// Replace the mutable state from exactly `state_size()` bytes.
    fn load_state(&mut self, data: &[u8]);

    /// Main memory, for host-side inspection.
    fn system_ram(&mut self) -> &mut [u8];
}

/// Raster composition collaborator.
pub trait Display {
    /// Compose any pending changes into the framebuffer.
    fn flush(&mut self);

    /// RGB565 pixels, `SCREEN_WIDTH * SCREEN_HEIGHT` long.
    fn framebuffer(&self) -> &[u16];

    /// Force a full redraw on the next flush.
    fn mark_dirty(&mut self);

    fn set_color(&mut self, color: bool);
}

/// Keyboard front-end collaborator.
pub trait Keyboard {
    fn set_mode(&mut self, mode: KeyboardMode);

    fn set_layout(&mut self, layout: KeyboardLayout);

    /// Advance the front-end once per frame with the frame's input.
    fn poll(&mut self, input: &InputSnapshot);
}
