//! SSD1306 panel driver.
//!
//! [`Ssd1306`] owns a [`Transport`] and speaks the controller's command
//! protocol over it. Construction brings the panel from reset to a powered,
//! RAM-following display:
//!
//! 1. data/command line to its idle (data) level
//! 2. display off
//! 3. reset pulse: reset low, wait 1 ms, reset high
//! 4. the fourteen [`PanelConfig`] commands, see [`PanelConfig::commands`]
//! 5. display on
//!
//! Panel RAM content is undefined after bring-up; write a frame straight away
//! if the first image matters.
//!
//! # Protocol framing
//! Each command byte is written on its own with the data/command line driven
//! low immediately before it. Pixel data goes out in one block with the line
//! driven high. The line is left wherever the last write put it.
//!
//! # Example
//! ```rust
//! use ssd1306_framebuffer::compute_pages;
//! use ssd1306_framebuffer::driver::Ssd1306;
//! use ssd1306_framebuffer::framebuffer::FrameBuffer;
//! use ssd1306_framebuffer::interface::Transport;
//!
//! struct NullTransport;
//!
//! impl Transport for NullTransport {
//!     type Line = u8;
//!     fn write(&mut self, _bytes: &[u8]) {}
//!     fn set_line(&mut self, _line: u8, _high: bool) {}
//!     fn delay_ms(&mut self, _ms: u32) {}
//! }
//!
//! const DC_PIN: u8 = 15;
//! const RESET_PIN: u8 = 9;
//! const PAGES: usize = compute_pages(64);
//!
//! let mut oled = Ssd1306::new(NullTransport, DC_PIN, RESET_PIN, 128, 64).unwrap();
//! let mut fb = FrameBuffer::<128, 64, PAGES>::new();
//! fb.set_rect(0, 0, 16, 16, true);
//! oled.flush(&mut fb).unwrap();
//!
//! oled.set_contrast(0x40);
//! assert!(oled.set_mux_ratio(64).is_err());
//! ```

use crate::command::{Command, CommandError, EncodedCommand};
use crate::config::PanelConfig;
use crate::framebuffer::{DrawError, FrameBuffer};
use crate::interface::Transport;

/// How long the reset line is held low.
pub const RESET_PULSE_MS: u32 = 1;

/// Driver for an SSD1306 panel behind a [`Transport`].
pub struct Ssd1306<T: Transport> {
    transport: T,
    dc: T::Line,
    reset: T::Line,
    width: usize,
    height: usize,
}

impl<T: Transport> Ssd1306<T> {
    /// Bring the panel up with [`PanelConfig::DEFAULT`].
    ///
    /// `dc` and `reset` name the data/command select and reset lines on the
    /// transport.
    ///
    /// # Errors
    ///
    /// Never fails with the stock configuration; the signature matches
    /// [`Ssd1306::with_config`].
    pub fn new(
        transport: T,
        dc: T::Line,
        reset: T::Line,
        width: usize,
        height: usize,
    ) -> Result<Self, CommandError> {
        Self::with_config(transport, dc, reset, width, height, &PanelConfig::DEFAULT)
    }

    /// Bring the panel up with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns the first invalid parameter of `config`. The configuration is
    /// checked before anything is sent, so on error the transport has not been
    /// touched.
    pub fn with_config(
        transport: T,
        dc: T::Line,
        reset: T::Line,
        width: usize,
        height: usize,
        config: &PanelConfig,
    ) -> Result<Self, CommandError> {
        config.validate()?;
        let mut driver = Self {
            transport,
            dc,
            reset,
            width,
            height,
        };
        driver.init(config)?;
        Ok(driver)
    }

    fn init(&mut self, config: &PanelConfig) -> Result<(), CommandError> {
        self.transport.set_line(self.dc, true);
        self.set_display_on(false);
        self.reset();
        for command in config.commands() {
            self.send(command)?;
        }
        self.set_display_on(true);
        Ok(())
    }

    /// Panel width in pixels, as given at construction.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Panel height in pixels, as given at construction.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Pulse the reset line. The controller returns to its power-on defaults.
    pub fn reset(&mut self) {
        self.transport.set_line(self.reset, false);
        self.transport.delay_ms(RESET_PULSE_MS);
        self.transport.set_line(self.reset, true);
    }

    /// Validate and send a command.
    ///
    /// # Errors
    ///
    /// The [`CommandError`] from [`Command::encode`]; nothing is written.
    pub fn send(&mut self, command: Command) -> Result<(), CommandError> {
        let encoded = command.encode()?;
        self.write_encoded(encoded);
        Ok(())
    }

    // For commands whose operand cannot be out of domain.
    fn send_unchecked(&mut self, command: Command) {
        if let Ok(encoded) = command.encode() {
            self.write_encoded(encoded);
        }
    }

    fn write_encoded(&mut self, encoded: EncodedCommand) {
        for &byte in encoded.as_slice() {
            self.transport.set_line(self.dc, false);
            self.transport.write(&[byte]);
        }
    }

    /// Stream pixel data into panel RAM.
    pub fn write_data(&mut self, data: &[u8]) {
        self.transport.set_line(self.dc, true);
        self.transport.write(data);
    }

    /// Pack `framebuffer` and send the whole frame.
    ///
    /// The frame is packed column-major (byte `x * PAGES + page`). The
    /// controller places incoming bytes according to its addressing mode, and
    /// [`PanelConfig::DEFAULT`] uses horizontal addressing, which fills page 0
    /// left to right before moving to page 1. A pixel-exact image needs
    /// [`AddressingMode::Vertical`](crate::config::AddressingMode::Vertical):
    ///
    /// ```rust
    /// use ssd1306_framebuffer::config::{AddressingMode, PanelConfig};
    /// use ssd1306_framebuffer::driver::Ssd1306;
    /// use ssd1306_framebuffer::framebuffer::FrameBuffer;
    /// use ssd1306_framebuffer::interface::Transport;
    ///
    /// struct NullTransport;
    ///
    /// impl Transport for NullTransport {
    ///     type Line = u8;
    ///     fn write(&mut self, _bytes: &[u8]) {}
    ///     fn set_line(&mut self, _line: u8, _high: bool) {}
    ///     fn delay_ms(&mut self, _ms: u32) {}
    /// }
    ///
    /// let config = PanelConfig {
    ///     addressing_mode: AddressingMode::Vertical,
    ///     ..PanelConfig::DEFAULT
    /// };
    /// let mut oled = Ssd1306::with_config(NullTransport, 15, 9, 128, 64, &config).unwrap();
    /// let mut fb = FrameBuffer::<128, 64, 8>::new();
    /// oled.flush(&mut fb).unwrap();
    /// ```
    ///
    /// # Errors
    ///
    /// [`DrawError::GeometryMismatch`] if the framebuffer is not the size the
    /// driver was built for; nothing is sent.
    pub fn flush<const WIDTH: usize, const HEIGHT: usize, const PAGES: usize>(
        &mut self,
        framebuffer: &mut FrameBuffer<'_, WIDTH, HEIGHT, PAGES>,
    ) -> Result<(), DrawError> {
        if (WIDTH, HEIGHT) != (self.width, self.height) {
            return Err(DrawError::GeometryMismatch {
                panel: (self.width, self.height),
                frame: (WIDTH, HEIGHT),
            });
        }
        let packed = framebuffer.buffer();
        self.write_data(packed);
        Ok(())
    }

    /// Turn the panel on, or put it to sleep.
    pub fn set_display_on(&mut self, on: bool) {
        self.send_unchecked(Command::DisplayOn(on));
    }

    /// Light every pixel (`true`) or show RAM (`false`).
    pub fn set_test_mode(&mut self, test: bool) {
        self.send_unchecked(Command::EntireDisplayOn(test));
    }

    /// Set the memory addressing mode: 0 horizontal, 1 vertical, 2 page.
    ///
    /// # Errors
    ///
    /// [`CommandError::InvalidAddressingMode`] for any other value.
    pub fn set_memory_addressing_mode(&mut self, mode: u8) -> Result<(), CommandError> {
        self.send(Command::AddressingMode(mode))
    }

    /// Select the RAM row shown on the first display line.
    ///
    /// # Errors
    ///
    /// [`CommandError::StartLineOutOfRange`] above 63.
    pub fn set_start_line(&mut self, line: u8) -> Result<(), CommandError> {
        self.send(Command::StartLine(line))
    }

    /// Map column 127 to SEG0 when `reversed`.
    pub fn set_segment_remap(&mut self, reversed: bool) {
        self.send_unchecked(Command::SegmentRemap(reversed));
    }

    /// Set the multiplex ratio (active rows minus one).
    ///
    /// # Errors
    ///
    /// [`CommandError::MuxRatioOutOfRange`] outside 16..=63.
    pub fn set_mux_ratio(&mut self, ratio: u8) -> Result<(), CommandError> {
        self.send(Command::MuxRatio(ratio))
    }

    /// Scan the COM lines in reverse when `reversed`.
    pub fn set_com_scan_reversed(&mut self, reversed: bool) {
        self.send_unchecked(Command::ComScanReversed(reversed));
    }

    /// Shift the display vertically.
    ///
    /// # Errors
    ///
    /// [`CommandError::DisplayOffsetOutOfRange`] above 63.
    pub fn set_display_offset(&mut self, offset: u8) -> Result<(), CommandError> {
        self.send(Command::DisplayOffset(offset))
    }

    /// Describe how the COM pins are wired.
    pub fn set_com_pin_config(&mut self, alternative: bool, remap: bool) {
        self.send_unchecked(Command::ComPinConfig { alternative, remap });
    }

    /// Set the display clock divide ratio and oscillator frequency index.
    ///
    /// # Errors
    ///
    /// [`CommandError::DivideRatioOutOfRange`] or
    /// [`CommandError::FrequencyOutOfRange`] above 0xF.
    pub fn set_oscillator(&mut self, divide_ratio: u8, frequency: u8) -> Result<(), CommandError> {
        self.send(Command::Oscillator {
            divide_ratio,
            frequency,
        })
    }

    /// Set the pre-charge phases in display clocks.
    ///
    /// # Errors
    ///
    /// [`CommandError::PreChargeOutOfRange`] if either phase is 0 or above 0xF.
    pub fn set_pre_charge_period(&mut self, phase1: u8, phase2: u8) -> Result<(), CommandError> {
        self.send(Command::PreChargePeriod { phase1, phase2 })
    }

    /// Set the VCOMH deselect level code, see [`crate::config::VcomLevel`].
    ///
    /// # Errors
    ///
    /// [`CommandError::VcomLevelOutOfRange`] above 0b11.
    pub fn set_vcom_deselect_level(&mut self, level: u8) -> Result<(), CommandError> {
        self.send(Command::VcomDeselectLevel(level))
    }

    /// Set the contrast.
    pub fn set_contrast(&mut self, level: u8) {
        self.send_unchecked(Command::Contrast(level));
    }

    /// Inverse video when `inverted`.
    pub fn set_invert(&mut self, inverted: bool) {
        self.send_unchecked(Command::Invert(inverted));
    }

    /// Enable or disable the internal charge pump.
    pub fn enable_charge_pump(&mut self, enable: bool) {
        self.send_unchecked(Command::ChargePump(enable));
    }

    /// Give the transport back.
    pub fn release(self) -> T {
        self.transport
    }
}

impl<T: Transport> core::fmt::Debug for Ssd1306<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Ssd1306")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "defmt")]
impl<T: Transport> defmt::Format for Ssd1306<T> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Ssd1306 {}x{}", self.width, self.height);
    }
}
