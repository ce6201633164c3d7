//! SSD1306 command encoding.
//!
//! Every command is an opcode byte, optionally followed by a single operand
//! byte. Both bytes are clocked out with the data/command line held low; the
//! driver in [`crate::driver`] takes care of the line, this module only knows
//! how to turn a configuration intent into bytes.
//!
//! Commands with a restricted operand domain are validated in
//! [`Command::encode`]; an out-of-domain operand produces a [`CommandError`]
//! and no bytes at all.
//!
//! # Example
//! ```rust
//! use ssd1306_framebuffer::command::{Command, CommandError};
//!
//! let encoded = Command::MuxRatio(63).encode().unwrap();
//! assert_eq!(encoded.as_slice(), &[0xA8, 63]);
//!
//! assert_eq!(
//!     Command::MuxRatio(64).encode(),
//!     Err(CommandError::MuxRatioOutOfRange(64))
//! );
//! ```

use bitfield::bitfield;

/// Set memory addressing mode (0x20), followed by the mode byte.
pub const SET_MEMORY_ADDRESSING_MODE: u8 = 0x20;
/// Set display RAM start line (0x40 | line).
pub const SET_START_LINE: u8 = 0x40;
/// Set contrast control (0x81), followed by the level byte.
pub const SET_CONTRAST: u8 = 0x81;
/// Charge pump setting (0x8D), followed by the pump byte.
pub const SET_CHARGE_PUMP: u8 = 0x8D;
/// Segment remap (0xA0 | reversed).
pub const SET_SEGMENT_REMAP: u8 = 0xA0;
/// Entire display on (0xA4 | test). 0xA4 follows RAM, 0xA5 lights every pixel.
pub const SET_ENTIRE_DISPLAY_ON: u8 = 0xA4;
/// Normal / inverse display (0xA6 | inverted).
pub const SET_INVERT: u8 = 0xA6;
/// Set multiplex ratio (0xA8), followed by the ratio byte.
pub const SET_MUX_RATIO: u8 = 0xA8;
/// Display off / on (0xAE | on).
pub const SET_DISPLAY_ON: u8 = 0xAE;
/// COM output scan direction (0xC0, bit 3 set when reversed).
pub const SET_COM_SCAN_DIRECTION: u8 = 0xC0;
/// Set display offset (0xD3), followed by the offset byte.
pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
/// Set display clock divide ratio / oscillator frequency (0xD5).
pub const SET_OSCILLATOR: u8 = 0xD5;
/// Set pre-charge period (0xD9).
pub const SET_PRE_CHARGE_PERIOD: u8 = 0xD9;
/// Set COM pins hardware configuration (0xDA).
pub const SET_COM_PIN_CONFIG: u8 = 0xDA;
/// Set VCOMH deselect level (0xDB).
pub const SET_VCOM_DESELECT_LEVEL: u8 = 0xDB;

/// Highest RAM start line, display offset and mux ratio the controller accepts.
pub const MAX_LINE: u8 = 63;
/// Smallest accepted multiplex ratio.
pub const MIN_MUX_RATIO: u8 = 16;
/// Largest value that fits a 4-bit operand nibble.
pub const MAX_NIBBLE: u8 = 0xF;
/// Largest VCOMH deselect level code.
pub const MAX_VCOM_LEVEL: u8 = 0b11;

bitfield! {
    /// Operand of [`SET_COM_PIN_CONFIG`].
    ///
    /// The bit layout is as follows:
    /// - Bit 5: COM left/right remap
    /// - Bit 4: alternative (interleaved) COM pin configuration
    /// - Bit 1: always set
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[repr(transparent)]
    pub struct ComPins(u8);
    impl Debug;
    pub remap, set_remap: 5;
    pub alternative, set_alternative: 4;
}

impl ComPins {
    /// Operand with only the mandatory bit set.
    pub const fn new() -> Self {
        Self(0b10)
    }
}

bitfield! {
    /// Operand of [`SET_OSCILLATOR`].
    ///
    /// - Bits 7-4: oscillator frequency index
    /// - Bits 3-0: display clock divide ratio
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[repr(transparent)]
    pub struct ClockDivide(u8);
    impl Debug;
    pub frequency, set_frequency: 7, 4;
    pub divide_ratio, set_divide_ratio: 3, 0;
}

bitfield! {
    /// Operand of [`SET_PRE_CHARGE_PERIOD`].
    ///
    /// - Bits 7-4: phase 2 period in display clocks
    /// - Bits 3-0: phase 1 period in display clocks
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[repr(transparent)]
    pub struct PreCharge(u8);
    impl Debug;
    pub phase2, set_phase2: 7, 4;
    pub phase1, set_phase1: 3, 0;
}

bitfield! {
    /// Operand of [`SET_VCOM_DESELECT_LEVEL`]. Only bits 5-4 are meaningful.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[repr(transparent)]
    pub struct VcomDeselect(u8);
    impl Debug;
    pub level, set_level: 5, 4;
}

bitfield! {
    /// Operand of [`SET_CHARGE_PUMP`].
    ///
    /// - Bit 4: always set
    /// - Bit 2: pump enable
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[repr(transparent)]
    pub struct ChargePump(u8);
    impl Debug;
    pub enable, set_enable: 2;
}

impl ChargePump {
    /// Operand with only the mandatory bit set (pump disabled).
    pub const fn new() -> Self {
        Self(0b1_0000)
    }
}

/// Reasons a command operand is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Addressing mode is not horizontal (0), vertical (1) or page (2)
    InvalidAddressingMode(u8),
    /// RAM start line above 63
    StartLineOutOfRange(u8),
    /// Mux ratio outside 16..=63
    MuxRatioOutOfRange(u8),
    /// Display offset above 63
    DisplayOffsetOutOfRange(u8),
    /// Clock divide ratio above 0xF
    DivideRatioOutOfRange(u8),
    /// Oscillator frequency index above 0xF
    FrequencyOutOfRange(u8),
    /// A pre-charge phase of zero clocks or above 0xF
    PreChargeOutOfRange {
        /// Requested phase 1 period
        phase1: u8,
        /// Requested phase 2 period
        phase2: u8,
    },
    /// VCOMH level code above 0b11
    VcomLevelOutOfRange(u8),
}

impl core::fmt::Display for CommandError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidAddressingMode(mode) => write!(f, "invalid addressing mode {mode}"),
            Self::StartLineOutOfRange(line) => write!(f, "start line {line} above {MAX_LINE}"),
            Self::MuxRatioOutOfRange(ratio) => {
                write!(f, "mux ratio {ratio} outside {MIN_MUX_RATIO}..={MAX_LINE}")
            }
            Self::DisplayOffsetOutOfRange(offset) => {
                write!(f, "display offset {offset} above {MAX_LINE}")
            }
            Self::DivideRatioOutOfRange(div) => write!(f, "divide ratio {div} above 15"),
            Self::FrequencyOutOfRange(freq) => write!(f, "oscillator frequency {freq} above 15"),
            Self::PreChargeOutOfRange { phase1, phase2 } => {
                write!(f, "pre-charge phases {phase1}/{phase2} must be 1..=15")
            }
            Self::VcomLevelOutOfRange(level) => write!(f, "VCOMH level {level} above 3"),
        }
    }
}

impl core::error::Error for CommandError {}

/// A single controller command with its operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Power the panel on (`true`) or put it to sleep (`false`)
    DisplayOn(bool),
    /// Light every pixel regardless of RAM (`true`), or follow RAM (`false`)
    EntireDisplayOn(bool),
    /// Memory addressing mode: 0 horizontal, 1 vertical, 2 page
    AddressingMode(u8),
    /// RAM row mapped to the first display line
    StartLine(u8),
    /// Map column 127 to SEG0 when `true`
    SegmentRemap(bool),
    /// Number of active rows minus one
    MuxRatio(u8),
    /// Scan from the last COM line back to COM0 when `true`
    ComScanReversed(bool),
    /// Vertical shift of the display start
    DisplayOffset(u8),
    /// COM pin wiring
    ComPinConfig {
        /// Alternative (interleaved) wiring
        alternative: bool,
        /// Left/right remap
        remap: bool,
    },
    /// Display clock setup
    Oscillator {
        /// Divide ratio minus one
        divide_ratio: u8,
        /// Oscillator frequency index
        frequency: u8,
    },
    /// Pre-charge timing in display clocks
    PreChargePeriod {
        /// Phase 1 period, 1..=15
        phase1: u8,
        /// Phase 2 period, 1..=15
        phase2: u8,
    },
    /// VCOMH deselect level code
    VcomDeselectLevel(u8),
    /// Contrast level
    Contrast(u8),
    /// Swap lit and unlit pixels when `true`
    Invert(bool),
    /// Internal charge pump enable
    ChargePump(bool),
}

/// The bytes of an encoded [`Command`], opcode first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncodedCommand {
    bytes: [u8; 2],
    len: usize,
}

impl EncodedCommand {
    const fn single(opcode: u8) -> Self {
        Self {
            bytes: [opcode, 0],
            len: 1,
        }
    }

    const fn with_operand(opcode: u8, operand: u8) -> Self {
        Self {
            bytes: [opcode, operand],
            len: 2,
        }
    }

    /// The encoded bytes, one or two long.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

impl Command {
    /// Validate the operand and encode the command.
    ///
    /// # Errors
    ///
    /// Returns the matching [`CommandError`] when the operand is outside the
    /// domain the controller accepts for this command.
    pub fn encode(self) -> Result<EncodedCommand, CommandError> {
        let encoded = match self {
            Self::DisplayOn(on) => EncodedCommand::single(SET_DISPLAY_ON | u8::from(on)),
            Self::EntireDisplayOn(test) => {
                EncodedCommand::single(SET_ENTIRE_DISPLAY_ON | u8::from(test))
            }
            Self::AddressingMode(mode) => {
                if mode > 0b10 {
                    return Err(CommandError::InvalidAddressingMode(mode));
                }
                EncodedCommand::with_operand(SET_MEMORY_ADDRESSING_MODE, mode)
            }
            Self::StartLine(line) => {
                if line > MAX_LINE {
                    return Err(CommandError::StartLineOutOfRange(line));
                }
                EncodedCommand::single(SET_START_LINE | line)
            }
            Self::SegmentRemap(reversed) => {
                EncodedCommand::single(SET_SEGMENT_REMAP | u8::from(reversed))
            }
            Self::MuxRatio(ratio) => {
                if !(MIN_MUX_RATIO..=MAX_LINE).contains(&ratio) {
                    return Err(CommandError::MuxRatioOutOfRange(ratio));
                }
                EncodedCommand::with_operand(SET_MUX_RATIO, ratio)
            }
            Self::ComScanReversed(reversed) => {
                EncodedCommand::single(SET_COM_SCAN_DIRECTION | (u8::from(reversed) << 3))
            }
            Self::DisplayOffset(offset) => {
                if offset > MAX_LINE {
                    return Err(CommandError::DisplayOffsetOutOfRange(offset));
                }
                EncodedCommand::with_operand(SET_DISPLAY_OFFSET, offset)
            }
            Self::ComPinConfig { alternative, remap } => {
                let mut pins = ComPins::new();
                pins.set_alternative(alternative);
                pins.set_remap(remap);
                EncodedCommand::with_operand(SET_COM_PIN_CONFIG, pins.0)
            }
            Self::Oscillator {
                divide_ratio,
                frequency,
            } => {
                if divide_ratio > MAX_NIBBLE {
                    return Err(CommandError::DivideRatioOutOfRange(divide_ratio));
                }
                if frequency > MAX_NIBBLE {
                    return Err(CommandError::FrequencyOutOfRange(frequency));
                }
                let mut clock = ClockDivide::default();
                clock.set_divide_ratio(divide_ratio);
                clock.set_frequency(frequency);
                EncodedCommand::with_operand(SET_OSCILLATOR, clock.0)
            }
            Self::PreChargePeriod { phase1, phase2 } => {
                let valid = |phase: u8| (1..=MAX_NIBBLE).contains(&phase);
                if !valid(phase1) || !valid(phase2) {
                    return Err(CommandError::PreChargeOutOfRange { phase1, phase2 });
                }
                let mut period = PreCharge::default();
                period.set_phase1(phase1);
                period.set_phase2(phase2);
                EncodedCommand::with_operand(SET_PRE_CHARGE_PERIOD, period.0)
            }
            Self::VcomDeselectLevel(level) => {
                if level > MAX_VCOM_LEVEL {
                    return Err(CommandError::VcomLevelOutOfRange(level));
                }
                let mut vcom = VcomDeselect::default();
                vcom.set_level(level);
                EncodedCommand::with_operand(SET_VCOM_DESELECT_LEVEL, vcom.0)
            }
            Self::Contrast(level) => EncodedCommand::with_operand(SET_CONTRAST, level),
            Self::Invert(inverted) => EncodedCommand::single(SET_INVERT | u8::from(inverted)),
            Self::ChargePump(enable) => {
                let mut pump = ChargePump::new();
                pump.set_enable(enable);
                EncodedCommand::with_operand(SET_CHARGE_PUMP, pump.0)
            }
        };
        Ok(encoded)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::format;

    use super::*;

    fn bytes(cmd: Command) -> std::vec::Vec<u8> {
        cmd.encode().unwrap().as_slice().to_vec()
    }

    #[test]
    fn test_single_byte_flags() {
        assert_eq!(bytes(Command::DisplayOn(false)), [0xAE]);
        assert_eq!(bytes(Command::DisplayOn(true)), [0xAF]);
        assert_eq!(bytes(Command::EntireDisplayOn(false)), [0xA4]);
        assert_eq!(bytes(Command::EntireDisplayOn(true)), [0xA5]);
        assert_eq!(bytes(Command::SegmentRemap(false)), [0xA0]);
        assert_eq!(bytes(Command::SegmentRemap(true)), [0xA1]);
        assert_eq!(bytes(Command::Invert(false)), [0xA6]);
        assert_eq!(bytes(Command::Invert(true)), [0xA7]);
    }

    #[test]
    fn test_com_scan_direction_uses_bit_three() {
        assert_eq!(bytes(Command::ComScanReversed(false)), [0xC0]);
        assert_eq!(bytes(Command::ComScanReversed(true)), [0xC8]);
    }

    #[test]
    fn test_addressing_mode_domain() {
        for mode in 0..=2 {
            assert_eq!(bytes(Command::AddressingMode(mode)), [0x20, mode]);
        }
        assert_eq!(
            Command::AddressingMode(3).encode(),
            Err(CommandError::InvalidAddressingMode(3))
        );
    }

    #[test]
    fn test_start_line_is_or_ed_into_opcode() {
        assert_eq!(bytes(Command::StartLine(0)), [0x40]);
        assert_eq!(bytes(Command::StartLine(63)), [0x7F]);
        assert_eq!(
            Command::StartLine(64).encode(),
            Err(CommandError::StartLineOutOfRange(64))
        );
    }

    #[test]
    fn test_mux_ratio_boundaries() {
        assert!(Command::MuxRatio(15).encode().is_err());
        assert!(Command::MuxRatio(64).encode().is_err());
        assert_eq!(bytes(Command::MuxRatio(16)), [0xA8, 16]);
        assert_eq!(bytes(Command::MuxRatio(63)), [0xA8, 63]);
    }

    #[test]
    fn test_display_offset_boundaries() {
        assert_eq!(bytes(Command::DisplayOffset(63)), [0xD3, 63]);
        assert_eq!(
            Command::DisplayOffset(64).encode(),
            Err(CommandError::DisplayOffsetOutOfRange(64))
        );
    }

    #[test]
    fn test_com_pin_config() {
        let cfg = |alternative, remap| bytes(Command::ComPinConfig { alternative, remap });
        assert_eq!(cfg(false, false), [0xDA, 0x02]);
        assert_eq!(cfg(true, false), [0xDA, 0x12]);
        assert_eq!(cfg(false, true), [0xDA, 0x22]);
        assert_eq!(cfg(true, true), [0xDA, 0x32]);
    }

    #[test]
    fn test_oscillator_nibbles() {
        assert_eq!(
            bytes(Command::Oscillator {
                divide_ratio: 0,
                frequency: 8
            }),
            [0xD5, 0x80]
        );
        assert_eq!(
            bytes(Command::Oscillator {
                divide_ratio: 0xF,
                frequency: 0x1
            }),
            [0xD5, 0x1F]
        );
        assert_eq!(
            Command::Oscillator {
                divide_ratio: 16,
                frequency: 0
            }
            .encode(),
            Err(CommandError::DivideRatioOutOfRange(16))
        );
        assert_eq!(
            Command::Oscillator {
                divide_ratio: 0,
                frequency: 16
            }
            .encode(),
            Err(CommandError::FrequencyOutOfRange(16))
        );
    }

    #[test]
    fn test_pre_charge_rejects_zero_and_wide_phases() {
        let pre = |phase1, phase2| Command::PreChargePeriod { phase1, phase2 }.encode();
        assert!(pre(0, 5).is_err());
        assert!(pre(5, 0).is_err());
        assert!(pre(16, 1).is_err());
        assert!(pre(1, 16).is_err());
        assert_eq!(pre(1, 15).unwrap().as_slice(), &[0xD9, 0xF1]);
    }

    #[test]
    fn test_vcom_level_shifted_into_high_nibble() {
        assert_eq!(bytes(Command::VcomDeselectLevel(0)), [0xDB, 0x00]);
        assert_eq!(bytes(Command::VcomDeselectLevel(0b11)), [0xDB, 0x30]);
        assert_eq!(
            Command::VcomDeselectLevel(4).encode(),
            Err(CommandError::VcomLevelOutOfRange(4))
        );
    }

    #[test]
    fn test_contrast_accepts_any_byte() {
        for level in [0x00, 0x7F, 0xFF] {
            assert_eq!(bytes(Command::Contrast(level)), [0x81, level]);
        }
    }

    #[test]
    fn test_charge_pump() {
        assert_eq!(bytes(Command::ChargePump(true)), [0x8D, 0x14]);
        assert_eq!(bytes(Command::ChargePump(false)), [0x8D, 0x10]);
    }

    #[test]
    fn test_bitfield_layouts() {
        let mut clock = ClockDivide::default();
        clock.set_frequency(0xA);
        clock.set_divide_ratio(0x3);
        assert_eq!(clock.0, 0xA3);
        assert_eq!(clock.frequency(), 0xA);
        assert_eq!(clock.divide_ratio(), 0x3);

        let pins = ComPins::new();
        assert!(!pins.alternative());
        assert!(!pins.remap());
        assert_eq!(pins.0, 0b10);
    }

    #[test]
    fn test_error_display() {
        let msg = format!("{}", CommandError::MuxRatioOutOfRange(64));
        assert_eq!(msg, "mux ratio 64 outside 16..=63");
    }
}
