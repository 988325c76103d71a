//! The frame-paced BK session.
//!
//! The host calls [`Session::run_frame`] once per host frame. Each call runs
//! the machine up to the next absolute tick target, so emulated time is a
//! pure function of the frame count and the tick rate, never of how long the
//! host took to call back.

use std::io;
use std::path::{Path, PathBuf};

use emu_core::{
    Display, FRAMES_PER_SECOND, FileHandle, Host, Keyboard, LogLevel, Machine, Peripheral,
    RunContext, SCREEN_HEIGHT, SCREEN_PITCH, SCREEN_WIDTH, Ticks, VideoFrame,
};
use format_bk_bin::BinImage;
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::content::LoadBundle;
use crate::error::{Result, SessionError};
use crate::input::{accumulate_pointer, joystick_word};
use crate::media::StorageUnits;
use crate::rom::{load_rom_file, rom_dir, size_limits};
use crate::snapshot::SchedulerState;
use crate::vfs::FileAccess;

/// Terak 8510/a bootstrap ROM entry point.
const TERAK_BOOT_PC: u16 = 0o173_000;
/// BK system register; its high byte holds the start address.
const BOOT_REGISTER: u16 = 0o177_716;
const BOOT_ADDRESS_MASK: u16 = 0o177_400;

/// The pending program is injected on the first frame after this one, once
/// the monitor has finished clearing memory.
const INJECT_AFTER_FRAME: u64 = 2;

/// Upper bound on silence delivered per frame, in stereo frames.
const MAX_SILENCE_FRAMES: usize = 5000;
static SILENCE: [i16; MAX_SILENCE_FRAMES * 2] = [0; MAX_SILENCE_FRAMES * 2];

/// Static facts the host shows before any content is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemInfo {
    pub library_name: &'static str,
    pub library_version: &'static str,
    /// `|`-separated content extensions.
    pub valid_extensions: &'static str,
    /// Content is passed as bytes, never as a path the core opens itself.
    pub need_fullpath: bool,
}

pub const SYSTEM_INFO: SystemInfo = SystemInfo {
    library_name: "bk",
    library_version: env!("CARGO_PKG_VERSION"),
    valid_extensions: "bin|img|dsk|bkd",
    need_fullpath: false,
};

/// Audio and video parameters of a running session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvInfo {
    pub fps: f64,
    pub sample_rate: f64,
    pub base_width: usize,
    pub base_height: usize,
    pub max_width: usize,
    pub max_height: usize,
    pub aspect_ratio: f64,
}

/// A program image waiting to be copied into memory.
#[derive(Debug)]
struct PendingProgram {
    load_address: u16,
    payload: Vec<u8>,
}

impl PendingProgram {
    fn copy_from(data: &[u8]) -> Result<Self> {
        let image = BinImage::parse(data)?;
        let mut payload = Vec::new();
        payload
            .try_reserve_exact(image.payload.len())
            .map_err(|_| SessionError::OutOfMemory {
                len: image.payload.len(),
            })?;
        payload.extend_from_slice(image.payload);
        Ok(Self {
            load_address: image.start_address(),
            payload,
        })
    }
}

/// One emulation session.
pub struct Session<M, D, K> {
    machine: M,
    display: D,
    keyboard: K,
    config: SessionConfig,
    files: FileAccess,
    storage: StorageUnits,
    pending_program: Option<PendingProgram>,
    pub(crate) sched: SchedulerState,
    halted: bool,
}

impl<M: Machine, D: Display, K: Keyboard> Session<M, D, K> {
    /// Compose the machine and load content.
    ///
    /// On failure the reason is logged through the host and the host is
    /// asked to shut down; no session exists and no frames run.
    pub fn start<H: Host>(
        machine: M,
        display: D,
        keyboard: K,
        bundle: &LoadBundle<'_>,
        host: &mut H,
    ) -> Result<Self> {
        match Self::compose(machine, display, keyboard, bundle, host) {
            Ok(session) => Ok(session),
            Err(err) => {
                report_fatal(host, &err);
                Err(err)
            }
        }
    }

    fn compose<H: Host>(
        mut machine: M,
        mut display: D,
        mut keyboard: K,
        bundle: &LoadBundle<'_>,
        host: &mut H,
    ) -> Result<Self> {
        let pending_program = bundle
            .program
            .map(PendingProgram::copy_from)
            .transpose()?;
        let storage = StorageUnits::assemble(&bundle.media)?;

        let config = SessionConfig::resolve(&*host)?;
        for notice in config.notices(&*host) {
            host.log(LogLevel::Info, &notice);
        }
        info!(
            "BK model {} with {:?} on the UP port",
            config.variant.option_value(),
            config.peripheral
        );

        let files = FileAccess::select(host.file_system());
        let system_dir = host.system_directory();
        let roms = rom_dir(system_dir.as_deref());

        machine.power_on(&config.hardware_profile())?;
        keyboard.set_mode(config.keyboard_mode);
        keyboard.set_layout(config.layout);
        display.set_color(config.color);

        for (slot, name) in config.rom_set().iter() {
            let image = load_rom_file(
                &files,
                roms.as_deref(),
                name,
                size_limits(slot),
                &mut |message| host.log(LogLevel::Info, message),
            )?;
            machine.load_rom(slot, &image)?;
            debug!("{name}: {} bytes at {:#o}", image.len(), slot.base_address());
        }

        machine.reset_devices();
        if config.peripheral != Peripheral::None {
            machine.attach_peripheral(config.peripheral);
        }
        machine.set_sound_enabled(config.sound);
        machine.set_tick_rate(config.clock().tick_rate());

        let pc = if config.variant.is_terak() {
            TERAK_BOOT_PC
        } else {
            machine.read_word(BOOT_REGISTER) & BOOT_ADDRESS_MASK
        };
        machine.set_pc(pc);

        if let Some(dir) = bundle.tape_directory() {
            machine.set_tape_directory(dir);
        }

        Ok(Self {
            machine,
            display,
            keyboard,
            config,
            files,
            storage,
            pending_program,
            sched: SchedulerState::default(),
            halted: false,
        })
    }

    /// Run one host frame.
    ///
    /// A machine fault stops the session for good: it is reported through
    /// the host, shutdown is requested, and every later call returns
    /// [`SessionError::Halted`].
    pub fn run_frame<H: Host>(&mut self, host: &mut H) -> Result<()> {
        if self.halted {
            return Err(SessionError::Halted);
        }

        if host.options_updated() {
            self.reconcile(&*host);
        }

        let input = host.poll_input();

        if self.sched.frame_index > INJECT_AFTER_FRAME {
            if let Some(program) = self.pending_program.take() {
                self.inject(&program);
            }
        }

        if self.config.peripheral.mouse().is_some() {
            let enable = self.machine.mouse_button_enable();
            accumulate_pointer(&mut self.sched.pointer, &input.pointer, enable);
            self.machine.set_pointer(self.sched.pointer);
        }

        if self.config.peripheral.is_joystick() {
            self.sched.joystick = joystick_word(&input.pads);
            self.machine.set_joystick(self.sched.joystick);
        }

        self.keyboard.poll(&input);

        let target = self.frame_target();
        self.sched.frame_index = self.sched.frame_index.saturating_add(1);
        let result = self.machine.run_until(
            target,
            &mut RunContext {
                audio: &mut *host,
                media: &mut self.storage,
            },
        );
        if let Err(fault) = result {
            let err = SessionError::from(fault);
            self.halted = true;
            report_fatal(host, &err);
            return Err(err);
        }

        self.display.flush();
        host.present(&VideoFrame {
            pixels: self.display.framebuffer(),
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
            pitch: SCREEN_PITCH,
        });

        if !self.config.sound {
            host.push_batch(self.silence());
        }

        Ok(())
    }

    /// Absolute tick position the current frame runs to.
    fn frame_target(&self) -> Ticks {
        let frames = self
            .sched
            .frame_index
            .saturating_sub(self.sched.base_frame)
            .saturating_add(1);
        self.config.clock().target_after(self.sched.base_ticks, frames)
    }

    /// Apply option changes the host reported between frames.
    fn reconcile<H: Host>(&mut self, host: &H) {
        let old_clock = self.config.clock();
        let changes = self.config.reconfigure(host);

        if changes.clock_changed {
            // Count from where the last frame ended so the target never
            // moves backwards when the rate drops.
            let done = self.sched.frame_index.saturating_sub(self.sched.base_frame);
            self.sched.base_ticks = old_clock.target_after(self.sched.base_ticks, done);
            self.sched.base_frame = self.sched.frame_index;
            let rate = self.config.clock().tick_rate();
            self.machine.set_tick_rate(rate);
            info!("tick rate now {rate} Hz");
        }

        if changes.color_changed {
            self.display.set_color(self.config.color);
            self.display.mark_dirty();
        }

        self.keyboard.set_layout(self.config.layout);
    }

    fn inject(&mut self, program: &PendingProgram) {
        let image = BinImage {
            load_address: program.load_address,
            payload: &program.payload,
        };
        for (address, byte) in image.bytes() {
            self.machine.write_byte(address, byte);
        }
        self.machine.set_pc(program.load_address);
        info!(
            "program of {} bytes started at {:#o}",
            program.payload.len(),
            program.load_address
        );
    }

    /// One frame of interleaved stereo silence.
    fn silence(&self) -> &'static [i16] {
        let per_frame = u64::from(self.machine.sample_rate()) / FRAMES_PER_SECOND;
        let frames = usize::try_from(per_frame)
            .unwrap_or(MAX_SILENCE_FRAMES)
            .min(MAX_SILENCE_FRAMES);
        &SILENCE[..frames * 2]
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn av_info(&self) -> AvInfo {
        AvInfo {
            fps: FRAMES_PER_SECOND as f64,
            sample_rate: f64::from(self.machine.sample_rate()),
            base_width: SCREEN_WIDTH,
            base_height: SCREEN_HEIGHT,
            max_width: SCREEN_WIDTH,
            max_height: SCREEN_HEIGHT,
            aspect_ratio: self.config.aspect_ratio.value(),
        }
    }

    /// Floppy contents as the host's save-data region.
    pub fn save_ram(&mut self) -> Option<&mut [u8]> {
        self.storage.save_ram()
    }

    /// Main memory as the host's system RAM region.
    pub fn system_ram(&mut self) -> &mut [u8] {
        self.machine.system_ram()
    }

    /// Write-protect a drive unit.
    pub fn set_read_only(&mut self, unit: usize, read_only: bool) {
        self.storage.set_read_only(unit, read_only);
    }

    /// Open an asset through the session's file provider, announcing each
    /// attempt on the host's log.
    pub fn open_asset<H: Host>(
        &self,
        path: &Path,
        host: &mut H,
    ) -> io::Result<(PathBuf, Box<dyn FileHandle>)> {
        self.files
            .open_asset(path, &mut |message| host.log(LogLevel::Info, message))
    }

    #[must_use]
    pub fn machine(&self) -> &M {
        &self.machine
    }

    pub(crate) fn machine_mut(&mut self) -> &mut M {
        &mut self.machine
    }

    #[must_use]
    pub fn display(&self) -> &D {
        &self.display
    }

    pub(crate) fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    #[must_use]
    pub fn keyboard(&self) -> &K {
        &self.keyboard
    }

    #[must_use]
    pub fn storage(&self) -> &StorageUnits {
        &self.storage
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Frames run so far.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.sched.frame_index
    }

    /// Whether a program image is still waiting to be injected.
    #[must_use]
    pub fn program_pending(&self) -> bool {
        self.pending_program.is_some()
    }

    /// Whether a fatal error stopped the session.
    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.halted
    }
}

fn report_fatal<H: Host>(host: &mut H, err: &SessionError) {
    host.log(LogLevel::Error, &err.to_string());
    host.request_shutdown();
}
