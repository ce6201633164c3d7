//! PWM divider arithmetic for a backlight or auxiliary output pin.
//!
//! A typical PWM slice counts from 0 to `wrap` at `clock / divider` and holds
//! its output high while the counter is below `level`. The divider is a 12.4
//! fixed point value: an 8-bit integer part and a 4-bit fraction.
//!
//! [`PwmConfig`] only does the arithmetic; the caller programs the resulting
//! [`PwmParams`] into whatever peripheral it owns.
//!
//! # Example
//! ```rust
//! use ssd1306_framebuffer::pwm::PwmConfig;
//!
//! let mut pwm = PwmConfig::new(125_000_000);
//! pwm.set_frequency(1_000).unwrap();
//! pwm.set_duty(50).unwrap();
//!
//! let params = pwm.params();
//! assert_eq!((params.div_int, params.div_frac), (1, 15));
//! assert_eq!(params.wrap, 64_515);
//! assert_eq!(params.level, 32_257);
//! ```

/// Counter steps one divider unit covers before the fraction is applied.
const COUNTER_SPAN: u64 = 4096;
/// Smallest divider, 1.0 in 12.4 fixed point.
const MIN_DIVIDER16: u64 = 16;
/// Largest divider, 255 + 15/16 in 12.4 fixed point.
const MAX_DIVIDER16: u64 = 0xFFF;

/// Highest accepted duty cycle in percent.
pub const MAX_DUTY: u8 = 100;

/// Errors from [`PwmConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwmError {
    /// A frequency of 0 Hz was requested
    ZeroFrequency,
    /// Duty cycle above [`MAX_DUTY`]
    DutyOutOfRange(u8),
    /// The divider would exceed its 8-bit integer part
    FrequencyTooLow,
    /// The requested frequency is above the clock
    FrequencyTooHigh,
}

impl core::fmt::Display for PwmError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ZeroFrequency => write!(f, "frequency must be non-zero"),
            Self::DutyOutOfRange(duty) => write!(f, "duty {duty}% outside 0..={MAX_DUTY}"),
            Self::FrequencyTooLow => write!(f, "frequency too low for the clock divider"),
            Self::FrequencyTooHigh => write!(f, "frequency above the system clock"),
        }
    }
}

impl core::error::Error for PwmError {}

/// Register values for one PWM output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmParams {
    /// Integer part of the clock divider
    pub div_int: u8,
    /// Fractional part of the clock divider, sixteenths
    pub div_frac: u8,
    /// Counter top
    pub wrap: u16,
    /// Compare level
    pub level: u16,
}

/// Frequency and duty state for one PWM output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmConfig {
    clock_hz: u32,
    frequency: u32,
    duty: u8,
    divider16: u16,
    wrap: u16,
}

impl PwmConfig {
    /// A config for a slice clocked at `clock_hz`. No frequency is set yet,
    /// so [`PwmConfig::params`] reports a stopped counter.
    #[must_use]
    pub const fn new(clock_hz: u32) -> Self {
        Self {
            clock_hz,
            frequency: 0,
            duty: 0,
            divider16: MIN_DIVIDER16 as u16,
            wrap: 0,
        }
    }

    /// System clock the divider is computed against.
    #[must_use]
    pub const fn clock_hz(&self) -> u32 {
        self.clock_hz
    }

    /// Last accepted frequency in Hz, 0 if none.
    #[must_use]
    pub const fn frequency(&self) -> u32 {
        self.frequency
    }

    /// Last accepted duty cycle in percent.
    #[must_use]
    pub const fn duty(&self) -> u8 {
        self.duty
    }

    /// Change the system clock and recompute the current frequency against it.
    ///
    /// # Errors
    ///
    /// As [`PwmConfig::set_frequency`]; the previous clock is kept.
    pub fn set_clock_hz(&mut self, clock_hz: u32) -> Result<(), PwmError> {
        if self.frequency == 0 {
            self.clock_hz = clock_hz;
            return Ok(());
        }
        let (divider16, wrap) = Self::divide(clock_hz, self.frequency)?;
        self.clock_hz = clock_hz;
        self.divider16 = divider16;
        self.wrap = wrap;
        Ok(())
    }

    /// Set the output frequency in Hz.
    ///
    /// # Errors
    ///
    /// [`PwmError::ZeroFrequency`] for 0, [`PwmError::FrequencyTooLow`] when
    /// the divider overflows, [`PwmError::FrequencyTooHigh`] above the clock.
    /// The previous frequency is kept on error.
    pub fn set_frequency(&mut self, hz: u32) -> Result<(), PwmError> {
        let (divider16, wrap) = Self::divide(self.clock_hz, hz)?;
        self.frequency = hz;
        self.divider16 = divider16;
        self.wrap = wrap;
        Ok(())
    }

    /// Set the duty cycle in percent.
    ///
    /// # Errors
    ///
    /// [`PwmError::DutyOutOfRange`] above [`MAX_DUTY`]; the previous duty is
    /// kept.
    pub fn set_duty(&mut self, percent: u8) -> Result<(), PwmError> {
        if percent > MAX_DUTY {
            return Err(PwmError::DutyOutOfRange(percent));
        }
        self.duty = percent;
        Ok(())
    }

    /// Register values for the current frequency and duty.
    #[must_use]
    pub fn params(&self) -> PwmParams {
        let level = u32::from(self.wrap) * u32::from(self.duty) / u32::from(MAX_DUTY);
        PwmParams {
            div_int: (self.divider16 >> 4) as u8,
            div_frac: (self.divider16 & 0xF) as u8,
            wrap: self.wrap,
            level: level as u16,
        }
    }

    fn divide(clock_hz: u32, hz: u32) -> Result<(u16, u16), PwmError> {
        if hz == 0 {
            return Err(PwmError::ZeroFrequency);
        }
        let clock = u64::from(clock_hz);
        let freq = u64::from(hz);

        let divider16 = clock.div_ceil(freq * COUNTER_SPAN).max(MIN_DIVIDER16);
        if divider16 > MAX_DIVIDER16 {
            return Err(PwmError::FrequencyTooLow);
        }
        let ticks = clock * 16 / divider16 / freq;
        let wrap = ticks.checked_sub(1).ok_or(PwmError::FrequencyTooHigh)?;
        let wrap = u16::try_from(wrap).map_err(|_| PwmError::FrequencyTooLow)?;
        Ok((divider16 as u16, wrap))
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::string::ToString;

    use super::*;

    const CLOCK: u32 = 125_000_000;

    #[test]
    fn test_new_is_stopped() {
        let pwm = PwmConfig::new(CLOCK);
        assert_eq!(pwm.clock_hz(), CLOCK);
        assert_eq!(pwm.frequency(), 0);
        assert_eq!(
            pwm.params(),
            PwmParams {
                div_int: 1,
                div_frac: 0,
                wrap: 0,
                level: 0
            }
        );
    }

    #[test]
    fn test_one_khz() {
        let mut pwm = PwmConfig::new(CLOCK);
        pwm.set_frequency(1_000).unwrap();
        pwm.set_duty(50).unwrap();
        let params = pwm.params();
        assert_eq!(params.div_int, 1);
        assert_eq!(params.div_frac, 15);
        assert_eq!(params.wrap, 64_515);
        assert_eq!(params.level, 32_257);
    }

    #[test]
    fn test_high_frequency_uses_minimum_divider() {
        let mut pwm = PwmConfig::new(CLOCK);
        pwm.set_frequency(0xFFFF).unwrap();
        let params = pwm.params();
        assert_eq!((params.div_int, params.div_frac), (1, 0));
        assert_eq!(params.wrap, 1_906);
    }

    #[test]
    fn test_lowest_frequency_boundary() {
        let mut pwm = PwmConfig::new(CLOCK);
        pwm.set_frequency(8).unwrap();
        assert_eq!(pwm.params().wrap, 65_529);

        assert_eq!(pwm.set_frequency(7), Err(PwmError::FrequencyTooLow));
        assert_eq!(pwm.frequency(), 8);
        assert_eq!(pwm.params().wrap, 65_529);
    }

    #[test]
    fn test_zero_and_excessive_frequency() {
        let mut pwm = PwmConfig::new(1_000);
        assert_eq!(pwm.set_frequency(0), Err(PwmError::ZeroFrequency));
        assert_eq!(pwm.set_frequency(2_000), Err(PwmError::FrequencyTooHigh));
        assert_eq!(pwm.frequency(), 0);
    }

    #[test]
    fn test_duty_range() {
        let mut pwm = PwmConfig::new(CLOCK);
        pwm.set_frequency(1_000).unwrap();

        pwm.set_duty(100).unwrap();
        assert_eq!(pwm.params().level, pwm.params().wrap);

        assert_eq!(pwm.set_duty(101), Err(PwmError::DutyOutOfRange(101)));
        assert_eq!(pwm.duty(), 100);

        pwm.set_duty(0).unwrap();
        assert_eq!(pwm.params().level, 0);
    }

    #[test]
    fn test_level_follows_frequency_change() {
        let mut pwm = PwmConfig::new(CLOCK);
        pwm.set_duty(50).unwrap();
        pwm.set_frequency(0xFFFF).unwrap();
        assert_eq!(pwm.params().level, 953);
    }

    #[test]
    fn test_clock_change_recomputes() {
        let mut pwm = PwmConfig::new(CLOCK);
        pwm.set_frequency(1_000).unwrap();
        pwm.set_clock_hz(1_000_000).unwrap();
        assert_eq!(pwm.params().wrap, 999);

        assert_eq!(pwm.set_clock_hz(500), Err(PwmError::FrequencyTooHigh));
        assert_eq!(pwm.clock_hz(), 1_000_000);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            PwmError::DutyOutOfRange(120).to_string(),
            "duty 120% outside 0..=100"
        );
    }
}
