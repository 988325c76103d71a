//! Fake collaborators for driving a session without a real CPU.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use emu_bk::LoadBundle;
use emu_bk::Session;
use emu_core::{
    AudioSink, Display, DriveMedia, HardwareProfile, Host, InputSnapshot, Keyboard, KeyboardLayout,
    KeyboardMode, LogLevel, Machine, MachineFault, OptionSource, PadButtons, Peripheral,
    PointerInput, PointerState, RomSlot, RunContext, SCREEN_HEIGHT, SCREEN_WIDTH, Ticks,
    VideoFrame,
};

pub const RAM_SIZE: usize = 0x1_0000;
/// RAM the fake CPU scribbles on while running.
pub const WORK_AREA: usize = 0x8000;
/// Boot register contents the fake monitor leaves behind.
pub const BOOT_WORD: u16 = 0o100_123;

/// A deterministic stand-in for the PDP-11 and its devices.
pub struct FakeMachine {
    pub ram: Vec<u8>,
    pub ticks: Ticks,
    pub pc: u16,
    pub joystick: u16,
    pub pointer: PointerState,
    pub button_enable: u16,
    pub sample_rate: u32,
    pub sound: bool,
    pub tick_rate: u64,
    pub profile: Option<HardwareProfile>,
    pub roms: Vec<(RomSlot, usize)>,
    pub peripheral: Option<Peripheral>,
    pub resets: usize,
    pub tape_dir: Option<PathBuf>,
    /// Targets passed to `run_until`, in call order.
    pub targets: Vec<Ticks>,
    /// Fail on this `run_until` call, counting from 1.
    pub fault_on_call: Option<usize>,
}

impl FakeMachine {
    pub fn new() -> Self {
        let mut ram = vec![0; RAM_SIZE];
        ram[0o177_716..0o177_720].copy_from_slice(&BOOT_WORD.to_le_bytes());
        Self {
            ram,
            ticks: Ticks::ZERO,
            pc: 0,
            joystick: 0,
            pointer: PointerState::default(),
            button_enable: 1,
            sample_rate: 44_100,
            sound: false,
            tick_rate: 0,
            profile: None,
            roms: Vec::new(),
            peripheral: None,
            resets: 0,
            tape_dir: None,
            targets: Vec::new(),
            fault_on_call: None,
        }
    }
}

impl Machine for FakeMachine {
    fn power_on(&mut self, profile: &HardwareProfile) -> Result<(), MachineFault> {
        self.profile = Some(*profile);
        Ok(())
    }

    fn load_rom(&mut self, slot: RomSlot, image: &[u8]) -> Result<(), MachineFault> {
        self.roms.push((slot, image.len()));
        Ok(())
    }

    fn reset_devices(&mut self) {
        self.resets += 1;
    }

    fn attach_peripheral(&mut self, peripheral: Peripheral) {
        assert!(self.peripheral.is_none(), "peripheral wired twice");
        self.peripheral = Some(peripheral);
    }

    fn set_tick_rate(&mut self, tick_rate_hz: u64) {
        self.tick_rate = tick_rate_hz;
    }

    fn set_sound_enabled(&mut self, enabled: bool) {
        self.sound = enabled;
    }

    fn set_tape_directory(&mut self, dir: &Path) {
        self.tape_dir = Some(dir.to_path_buf());
    }

    fn ticks(&self) -> Ticks {
        self.ticks
    }

    fn run_until(&mut self, target: Ticks, ctx: &mut RunContext<'_>) -> Result<(), MachineFault> {
        self.targets.push(target);
        if self.fault_on_call == Some(self.targets.len()) {
            return Err(MachineFault("odd address trap".into()));
        }
        if self.ticks >= target {
            return Ok(());
        }

        // Touch memory in a way that depends on prior state, so a bad
        // restore shows up as diverging RAM.
        let slot = WORK_AREA + 1 + (target.get() / 1000 % 4096) as usize;
        let seed = self.ram[WORK_AREA] ^ (target.get() as u8) ^ (self.joystick as u8);
        self.ram[slot] = self.ram[slot].wrapping_add(seed);
        self.ram[WORK_AREA] = self.ram[WORK_AREA].wrapping_add(1);

        if let Some(disk) = ctx.media.unit_mut(0) {
            disk[0] = disk[0].wrapping_add(1);
        }
        if self.sound {
            for _ in 0..self.sample_rate / 25 {
                ctx.audio.push_sample(0, 0);
            }
        }

        self.ticks = target;
        Ok(())
    }

    fn read_word(&self, address: u16) -> u16 {
        let at = usize::from(address & !1);
        u16::from_le_bytes([self.ram[at], self.ram[at + 1]])
    }

    fn write_byte(&mut self, address: u16, value: u8) {
        self.ram[usize::from(address)] = value;
    }

    fn set_pc(&mut self, pc: u16) {
        self.pc = pc;
    }

    fn mouse_button_enable(&self) -> u16 {
        self.button_enable
    }

    fn set_pointer(&mut self, state: PointerState) {
        self.pointer = state;
    }

    fn set_joystick(&mut self, state: u16) {
        self.joystick = state;
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn state_size(&self) -> usize {
        8 + 2 + 2 + RAM_SIZE
    }

    fn save_state(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.ticks.to_le_bytes());
        out.extend_from_slice(&self.pc.to_le_bytes());
        out.extend_from_slice(&self.joystick.to_le_bytes());
        out.extend_from_slice(&self.ram);
    }

    fn load_state(&mut self, data: &[u8]) {
        assert_eq!(data.len(), self.state_size());
        let mut ticks = [0; 8];
        ticks.copy_from_slice(&data[0..8]);
        self.ticks = Ticks::from_le_bytes(ticks);
        self.pc = u16::from_le_bytes([data[8], data[9]]);
        self.joystick = u16::from_le_bytes([data[10], data[11]]);
        self.ram.copy_from_slice(&data[12..]);
    }

    fn system_ram(&mut self) -> &mut [u8] {
        &mut self.ram
    }
}

/// Records what the session asked of the display.
pub struct FakeDisplay {
    pub pixels: Vec<u16>,
    pub events: Vec<String>,
    pub color: Option<bool>,
}

impl FakeDisplay {
    pub fn new() -> Self {
        Self {
            pixels: vec![0; SCREEN_WIDTH * SCREEN_HEIGHT],
            events: Vec::new(),
            color: None,
        }
    }
}

impl Display for FakeDisplay {
    fn flush(&mut self) {
        self.events.push("flush".into());
    }

    fn framebuffer(&self) -> &[u16] {
        &self.pixels
    }

    fn mark_dirty(&mut self) {
        self.events.push("dirty".into());
    }

    fn set_color(&mut self, color: bool) {
        self.color = Some(color);
        self.events.push(format!("color:{color}"));
    }
}

#[derive(Default)]
pub struct FakeKeyboard {
    pub mode: Option<KeyboardMode>,
    pub layout: Option<KeyboardLayout>,
    pub polls: usize,
}

impl Keyboard for FakeKeyboard {
    fn set_mode(&mut self, mode: KeyboardMode) {
        self.mode = Some(mode);
    }

    fn set_layout(&mut self, layout: KeyboardLayout) {
        self.layout = Some(layout);
    }

    fn poll(&mut self, _input: &InputSnapshot) {
        self.polls += 1;
    }
}

/// A frontend that records every call.
#[derive(Default)]
pub struct FakeHost {
    pub options: HashMap<String, String>,
    pub updated: bool,
    pub input: InputSnapshot,
    pub system_dir: Option<PathBuf>,
    pub polls: usize,
    /// `(width, height, pitch, pixel count)` of every presented frame.
    pub frames: Vec<(usize, usize, usize, usize)>,
    pub samples: usize,
    /// Length of every batch pushed, in `i16` values.
    pub batches: Vec<usize>,
    pub logs: Vec<(LogLevel, String)>,
    pub shutdown: bool,
}

impl FakeHost {
    pub fn with_model(model: &str) -> Self {
        let mut host = Self::default();
        host.set(emu_bk::config::OPT_MODEL, model);
        host
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.options.insert(key.to_string(), value.to_string());
    }

    /// Change an option the way a frontend does between frames.
    pub fn update(&mut self, key: &str, value: &str) {
        self.set(key, value);
        self.updated = true;
    }

    pub fn press(&mut self, port: usize, buttons: PadButtons) {
        self.input.pads[port] = buttons;
    }

    pub fn move_pointer(&mut self, pointer: PointerInput) {
        self.input.pointer = pointer;
    }

    pub fn errors(&self) -> usize {
        self.logs
            .iter()
            .filter(|(level, _)| *level == LogLevel::Error)
            .count()
    }
}

impl AudioSink for FakeHost {
    fn push_sample(&mut self, _left: i16, _right: i16) {
        self.samples += 1;
    }

    fn push_batch(&mut self, interleaved: &[i16]) -> usize {
        assert!(interleaved.iter().all(|&s| s == 0));
        self.batches.push(interleaved.len());
        interleaved.len() / 2
    }
}

impl OptionSource for FakeHost {
    fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }
}

impl Host for FakeHost {
    fn options_updated(&mut self) -> bool {
        std::mem::take(&mut self.updated)
    }

    fn poll_input(&mut self) -> InputSnapshot {
        self.polls += 1;
        self.input.clone()
    }

    fn present(&mut self, frame: &VideoFrame<'_>) {
        self.frames
            .push((frame.width, frame.height, frame.pitch, frame.pixels.len()));
    }

    fn log(&mut self, level: LogLevel, message: &str) {
        self.logs.push((level, message.to_string()));
    }

    fn request_shutdown(&mut self) {
        self.shutdown = true;
    }

    fn system_directory(&self) -> Option<PathBuf> {
        self.system_dir.clone()
    }
}

pub type FakeSession = Session<FakeMachine, FakeDisplay, FakeKeyboard>;

pub fn start(host: &mut FakeHost, bundle: &LoadBundle<'_>) -> emu_bk::Result<FakeSession> {
    start_with(FakeMachine::new(), host, bundle)
}

pub fn start_with(
    machine: FakeMachine,
    host: &mut FakeHost,
    bundle: &LoadBundle<'_>,
) -> emu_bk::Result<FakeSession> {
    Session::start(
        machine,
        FakeDisplay::new(),
        FakeKeyboard::default(),
        bundle,
        host,
    )
}

pub fn run_frames(session: &mut FakeSession, host: &mut FakeHost, count: usize) {
    for _ in 0..count {
        session.run_frame(host).expect("frame runs");
    }
}

/// A `.bin` image: load address, length, payload.
pub fn bin_image(address: u16, payload: &[u8]) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&address.to_le_bytes());
    data.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    data.extend_from_slice(payload);
    data
}
