//! BK machine configuration.
//!
//! Maps the frontend's string options onto a concrete hardware topology:
//! - BK-0010 (1985) - monitor + FOCAL
//! - BK-0010.01 (1986) - monitor + Vilnius BASIC
//! - BK-0010.01 + FDD - monitor + floppy controller firmware
//! - BK-0011M + FDD (1990) - banked memory, 4 MHz
//! - Slow BK-0011M - BK-0011M clocked at 3 MHz
//! - Terak 8510/a - the PDP-11/03 workstation the BK descends from
//!
//! Model, peripheral and keyboard mode are read once at session start.
//! Everything else is re-read whenever the host reports an option change.

use emu_core::{
    ClockMultiplier, HardwareProfile, KeyboardLayout, KeyboardMode, MouseMode, OptionSource,
    Peripheral, RomSlot, VirtualClock,
};

use crate::error::ConfigError;

pub const OPT_MODEL: &str = "bk_model";
pub const OPT_PERIPHERAL: &str = "bk_peripheral";
pub const OPT_LAYOUT: &str = "bk_layout";
pub const OPT_DOUBLESPEED: &str = "bk_doublespeed";
pub const OPT_COLOR: &str = "bk_color";
pub const OPT_KEYBOARD_TYPE: &str = "bk_keyboard_type";
pub const OPT_ASPECT_RATIO: &str = "bk_aspect_ratio";

/// One entry of the frontend's option UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionDescriptor {
    pub key: &'static str,
    pub label: &'static str,
    /// Recognized values in UI order. The first one is the UI default.
    pub values: &'static [&'static str],
}

impl OptionDescriptor {
    #[must_use]
    pub fn default_value(&self) -> &'static str {
        self.values[0]
    }
}

/// Every option the core understands, in the order the UI lists them.
pub const OPTION_DESCRIPTORS: [OptionDescriptor; 7] = [
    OptionDescriptor {
        key: OPT_MODEL,
        label: "Model (restart)",
        values: &[
            "BK-0010",
            "BK-0010.01",
            "BK-0010.01 + FDD",
            "BK-0011M + FDD",
            "Terak 8510/a",
            "Slow BK-0011M",
        ],
    },
    OptionDescriptor {
        key: OPT_PERIPHERAL,
        label: "Peripheral (UP port, restart)",
        values: &[
            "none",
            "covox",
            "ay_3_8910",
            "mouse_high",
            "mouse_low",
            "joystick",
        ],
    },
    OptionDescriptor {
        key: OPT_LAYOUT,
        label: "Keyboard layout",
        values: &["qwerty", "jcuken"],
    },
    OptionDescriptor {
        key: OPT_DOUBLESPEED,
        label: "Double CPU speed",
        values: &["disabled", "enabled"],
    },
    OptionDescriptor {
        key: OPT_COLOR,
        label: "Use color display",
        values: &["enabled", "disabled"],
    },
    OptionDescriptor {
        key: OPT_KEYBOARD_TYPE,
        label: "Keyboard type (restart)",
        values: &["poll", "callback"],
    },
    OptionDescriptor {
        key: OPT_ASPECT_RATIO,
        label: "Aspect ratio",
        values: &["1:1", "4:3"],
    },
];

/// Machine variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MachineVariant {
    Bk0010,
    Bk001001,
    Bk001001Fdd,
    Bk0011mFdd,
    SlowBk0011m,
    Terak8510a,
}

impl MachineVariant {
    /// Variant used when the host supplies no model option at all.
    pub const FALLBACK: Self = MachineVariant::Bk0011mFdd;

    /// Parse the exact option string shown in the UI.
    #[must_use]
    pub fn from_option(value: &str) -> Option<Self> {
        match value {
            "BK-0010" => Some(MachineVariant::Bk0010),
            "BK-0010.01" => Some(MachineVariant::Bk001001),
            "BK-0010.01 + FDD" => Some(MachineVariant::Bk001001Fdd),
            "BK-0011M + FDD" => Some(MachineVariant::Bk0011mFdd),
            "Slow BK-0011M" => Some(MachineVariant::SlowBk0011m),
            "Terak 8510/a" => Some(MachineVariant::Terak8510a),
            _ => None,
        }
    }

    #[must_use]
    pub const fn option_value(self) -> &'static str {
        match self {
            MachineVariant::Bk0010 => "BK-0010",
            MachineVariant::Bk001001 => "BK-0010.01",
            MachineVariant::Bk001001Fdd => "BK-0010.01 + FDD",
            MachineVariant::Bk0011mFdd => "BK-0011M + FDD",
            MachineVariant::SlowBk0011m => "Slow BK-0011M",
            MachineVariant::Terak8510a => "Terak 8510/a",
        }
    }

    /// ROM images this layer loads for the variant.
    ///
    /// The BK-0011M and Terak firmware is part of the machine itself, so
    /// those variants leave every socket empty.
    #[must_use]
    pub const fn rom_set(self) -> RomSet {
        match self {
            MachineVariant::Bk0010 => RomSet {
                monitor: Some(MONITOR_ROM),
                language: Some(FOCAL_ROM),
                disk_controller: None,
            },
            MachineVariant::Bk001001 => RomSet {
                monitor: Some(MONITOR_ROM),
                language: Some(BASIC_ROM),
                disk_controller: None,
            },
            MachineVariant::Bk001001Fdd => RomSet {
                monitor: Some(MONITOR_ROM),
                language: None,
                disk_controller: Some(DISK_ROM),
            },
            MachineVariant::Bk0011mFdd
            | MachineVariant::SlowBk0011m
            | MachineVariant::Terak8510a => RomSet::EMPTY,
        }
    }

    /// Base CPU clock in ticks per second.
    #[must_use]
    pub const fn base_tick_rate(self) -> u64 {
        match self {
            MachineVariant::Bk0011mFdd | MachineVariant::Terak8510a => 4_000_000,
            _ => 3_000_000,
        }
    }

    /// Whether a floppy controller is fitted.
    #[must_use]
    pub const fn has_disk_controller(self) -> bool {
        !matches!(self, MachineVariant::Bk0010 | MachineVariant::Bk001001)
    }

    /// BK-0011M memory map (the Terak shares it).
    #[must_use]
    pub const fn is_bk0011(self) -> bool {
        matches!(
            self,
            MachineVariant::Bk0011mFdd | MachineVariant::SlowBk0011m | MachineVariant::Terak8510a
        )
    }

    /// The Terak has a different display timing and no BK user port.
    #[must_use]
    pub const fn is_terak(self) -> bool {
        matches!(self, MachineVariant::Terak8510a)
    }

    /// The Terak sound path is not emulated.
    #[must_use]
    pub const fn has_sound(self) -> bool {
        !self.is_terak()
    }
}

pub const MONITOR_ROM: &str = "MONIT10.ROM";
pub const FOCAL_ROM: &str = "FOCAL10.ROM";
pub const BASIC_ROM: &str = "BASIC10.ROM";
pub const DISK_ROM: &str = "DISK_327.ROM";

/// ROM file names per socket. Any socket may be empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RomSet {
    pub monitor: Option<&'static str>,
    pub language: Option<&'static str>,
    pub disk_controller: Option<&'static str>,
}

impl RomSet {
    pub const EMPTY: Self = Self {
        monitor: None,
        language: None,
        disk_controller: None,
    };

    #[must_use]
    pub const fn get(&self, slot: RomSlot) -> Option<&'static str> {
        match slot {
            RomSlot::Monitor => self.monitor,
            RomSlot::Language => self.language,
            RomSlot::DiskController => self.disk_controller,
        }
    }

    /// Populated sockets in address order.
    pub fn iter(&self) -> impl Iterator<Item = (RomSlot, &'static str)> + '_ {
        RomSlot::ALL
            .into_iter()
            .filter_map(|slot| self.get(slot).map(|name| (slot, name)))
    }
}

/// Display aspect ratio reported to the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AspectRatio {
    #[default]
    Square,
    FourThree,
}

impl AspectRatio {
    #[must_use]
    pub fn value(self) -> f64 {
        match self {
            AspectRatio::Square => 1.0,
            AspectRatio::FourThree => 4.0 / 3.0,
        }
    }
}

fn known_peripheral(value: &str) -> Option<Peripheral> {
    Some(match value {
        "none" => Peripheral::None,
        "covox" => Peripheral::Covox,
        "ay_3_8910" => Peripheral::Synthesizer,
        "mouse_low" => Peripheral::Mouse(MouseMode::Low),
        "mouse_high" => Peripheral::Mouse(MouseMode::High),
        "joystick" => Peripheral::Joystick,
        _ => return None,
    })
}

/// Parse the peripheral option. Unknown values fall back to no peripheral.
#[must_use]
pub fn parse_peripheral(value: Option<&str>) -> Peripheral {
    value.and_then(known_peripheral).unwrap_or(Peripheral::None)
}

/// What changed in a runtime reconfiguration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ConfigChanges {
    pub color_changed: bool,
    pub clock_changed: bool,
}

/// Resolved configuration of one session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionConfig {
    // Fixed for the session.
    pub variant: MachineVariant,
    pub peripheral: Peripheral,
    pub keyboard_mode: KeyboardMode,
    /// Whether the sound devices produce samples.
    pub sound: bool,

    // Re-read on every option change.
    pub aspect_ratio: AspectRatio,
    pub color: bool,
    pub layout: KeyboardLayout,
    pub multiplier: ClockMultiplier,
}

impl SessionConfig {
    /// Resolve the full configuration at session start.
    pub fn resolve<O: OptionSource + ?Sized>(options: &O) -> Result<Self, ConfigError> {
        let variant = match options.option(OPT_MODEL) {
            None => MachineVariant::FALLBACK,
            Some(value) => MachineVariant::from_option(value)
                .ok_or_else(|| ConfigError::UnknownVariant(value.to_string()))?,
        };

        let peripheral = if variant.is_terak() {
            Peripheral::None
        } else {
            parse_peripheral(options.option(OPT_PERIPHERAL))
        };

        let keyboard_mode = match options.option(OPT_KEYBOARD_TYPE) {
            Some("callback") => KeyboardMode::Callback,
            _ => KeyboardMode::Poll,
        };

        let mut config = Self {
            variant,
            peripheral,
            keyboard_mode,
            sound: variant.has_sound(),
            aspect_ratio: AspectRatio::Square,
            color: true,
            layout: KeyboardLayout::Qwerty,
            multiplier: ClockMultiplier::Normal,
        };
        config.read_runtime(options);
        Ok(config)
    }

    /// Defaults [`resolve`](Self::resolve) fell back to, worded for the
    /// host's log.
    #[must_use]
    pub fn notices<O: OptionSource + ?Sized>(&self, options: &O) -> Vec<String> {
        let ignored = options
            .option(OPT_PERIPHERAL)
            .filter(|value| !self.variant.is_terak() && known_peripheral(value).is_none());
        ignored
            .map(|value| format!("unknown peripheral {value:?}, leaving the UP port empty"))
            .into_iter()
            .collect()
    }

    /// Re-read the hot-reloadable subset.
    pub fn reconfigure<O: OptionSource + ?Sized>(&mut self, options: &O) -> ConfigChanges {
        let before = *self;
        self.read_runtime(options);
        ConfigChanges {
            color_changed: before.color != self.color,
            clock_changed: before.multiplier != self.multiplier,
        }
    }

    fn read_runtime<O: OptionSource + ?Sized>(&mut self, options: &O) {
        self.aspect_ratio = match options.option(OPT_ASPECT_RATIO) {
            Some("4:3") => AspectRatio::FourThree,
            _ => AspectRatio::Square,
        };
        self.layout = match options.option(OPT_LAYOUT) {
            Some("jcuken") => KeyboardLayout::Jcuken,
            _ => KeyboardLayout::Qwerty,
        };
        self.color = options.option(OPT_COLOR) != Some("disabled");
        self.multiplier = match options.option(OPT_DOUBLESPEED) {
            Some("enabled") => ClockMultiplier::Double,
            _ => ClockMultiplier::Normal,
        };
    }

    #[must_use]
    pub fn clock(&self) -> VirtualClock {
        VirtualClock::new(self.variant.base_tick_rate(), self.multiplier)
    }

    #[must_use]
    pub fn rom_set(&self) -> RomSet {
        self.variant.rom_set()
    }

    #[must_use]
    pub fn hardware_profile(&self) -> HardwareProfile {
        HardwareProfile {
            bk0011: self.variant.is_bk0011(),
            disk_controller: self.variant.has_disk_controller(),
            terak: self.variant.is_terak(),
            tick_rate_hz: self.clock().tick_rate(),
        }
    }
}
