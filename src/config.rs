//! Panel bring-up configuration.
//!
//! [`PanelConfig`] holds every parameter the driver pushes while bringing the
//! panel out of reset. The [`Default`] value matches a 128x64 module wired
//! with alternative COM pins and the internal charge pump, which covers the
//! common breakout boards.

use crate::command::{Command, CommandError};

/// Number of commands issued between the reset pulse and power-on.
pub const BRING_UP_COMMANDS: usize = 14;

/// How the controller advances its RAM pointer after each data byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AddressingMode {
    /// Column first, wrapping to the next page
    #[default]
    Horizontal = 0b00,
    /// Page first, wrapping to the next column
    Vertical = 0b01,
    /// Column only, the page is set explicitly
    Page = 0b10,
}

impl From<AddressingMode> for u8 {
    fn from(mode: AddressingMode) -> Self {
        mode as u8
    }
}

/// VCOMH deselect level as a fraction of Vcc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum VcomLevel {
    /// ~0.65 x Vcc
    Low = 0b00,
    /// ~0.77 x Vcc
    Medium = 0b01,
    /// ~0.83 x Vcc
    #[default]
    High = 0b11,
}

impl From<VcomLevel> for u8 {
    fn from(level: VcomLevel) -> Self {
        level as u8
    }
}

/// Parameters applied by [`crate::driver::Ssd1306::with_config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PanelConfig {
    /// RAM addressing mode
    pub addressing_mode: AddressingMode,
    /// RAM start line, 0..=63
    pub start_line: u8,
    /// Map column 127 to SEG0
    pub segment_remap: bool,
    /// Active rows minus one, 16..=63
    pub mux_ratio: u8,
    /// Scan COM lines in reverse
    pub com_scan_reversed: bool,
    /// Vertical display offset, 0..=63
    pub display_offset: u8,
    /// Alternative COM pin wiring
    pub com_alternative: bool,
    /// COM left/right remap
    pub com_remap: bool,
    /// Display clock divide ratio, 0..=15
    pub divide_ratio: u8,
    /// Oscillator frequency index, 0..=15
    pub oscillator_frequency: u8,
    /// Pre-charge phase 1 in clocks, 1..=15
    pub pre_charge_phase1: u8,
    /// Pre-charge phase 2 in clocks, 1..=15
    pub pre_charge_phase2: u8,
    /// VCOMH deselect level
    pub vcom_level: VcomLevel,
    /// Contrast
    pub contrast: u8,
    /// Light every pixel instead of showing RAM
    pub test_mode: bool,
    /// Inverse video
    pub inverted: bool,
    /// Internal charge pump
    pub charge_pump: bool,
}

impl PanelConfig {
    /// The stock bring-up parameters.
    pub const DEFAULT: Self = Self {
        addressing_mode: AddressingMode::Horizontal,
        start_line: 0,
        segment_remap: true,
        mux_ratio: 63,
        com_scan_reversed: true,
        display_offset: 0,
        com_alternative: true,
        com_remap: false,
        divide_ratio: 0,
        oscillator_frequency: 0x8,
        pre_charge_phase1: 0x1,
        pre_charge_phase2: 0xF,
        vcom_level: VcomLevel::High,
        contrast: 0xFF,
        test_mode: false,
        inverted: false,
        charge_pump: true,
    };

    /// The bring-up commands in the order they are sent.
    #[must_use]
    pub const fn commands(&self) -> [Command; BRING_UP_COMMANDS] {
        [
            Command::AddressingMode(self.addressing_mode as u8),
            Command::StartLine(self.start_line),
            Command::SegmentRemap(self.segment_remap),
            Command::MuxRatio(self.mux_ratio),
            Command::ComScanReversed(self.com_scan_reversed),
            Command::DisplayOffset(self.display_offset),
            Command::ComPinConfig {
                alternative: self.com_alternative,
                remap: self.com_remap,
            },
            Command::Oscillator {
                divide_ratio: self.divide_ratio,
                frequency: self.oscillator_frequency,
            },
            Command::PreChargePeriod {
                phase1: self.pre_charge_phase1,
                phase2: self.pre_charge_phase2,
            },
            Command::VcomDeselectLevel(self.vcom_level as u8),
            Command::Contrast(self.contrast),
            Command::EntireDisplayOn(self.test_mode),
            Command::Invert(self.inverted),
            Command::ChargePump(self.charge_pump),
        ]
    }

    /// Check every parameter without touching the panel.
    ///
    /// # Errors
    ///
    /// Returns the first [`CommandError`] in bring-up order.
    pub fn validate(&self) -> Result<(), CommandError> {
        for command in self.commands() {
            command.encode()?;
        }
        Ok(())
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
