//! The transport the panel driver talks through.
//!
//! The driver never touches a bus or a pin directly. It needs exactly three
//! blocking primitives, captured by [`Transport`]: write a block of bytes,
//! drive a control line, and wait. Anything that can do those three things
//! can host the driver, including a recording fake in tests.
//!
//! With the `hal` feature (enabled by default) [`SpiTransport`] provides the
//! usual wiring: an `embedded-hal` [`SpiDevice`](embedded_hal::spi::SpiDevice)
//! for the serial channel plus two [`OutputPin`](embedded_hal::digital::OutputPin)s
//! for data/command select and reset.

/// Blocking byte transport plus control lines.
///
/// There is no error channel: the driver assumes the transport is reliable
/// and every call completes before returning.
pub trait Transport {
    /// Identifier for a control line (data/command select, reset).
    type Line: Copy;

    /// Clock out `bytes` in order.
    fn write(&mut self, bytes: &[u8]);

    /// Drive `line` high (`true`) or low (`false`).
    fn set_line(&mut self, line: Self::Line, high: bool);

    /// Block for at least `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Line = T::Line;

    fn write(&mut self, bytes: &[u8]) {
        (**self).write(bytes);
    }

    fn set_line(&mut self, line: Self::Line, high: bool) {
        (**self).set_line(line, high);
    }

    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms);
    }
}

/// Control lines driven by [`SpiTransport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlLine {
    /// Data/command select: low for commands, high for pixel data
    DataCommand,
    /// Active-low reset
    Reset,
}

#[cfg(feature = "hal")]
pub use self::hal::SpiTransport;

#[cfg(feature = "hal")]
mod hal {
    use embedded_hal::delay::DelayNs;
    use embedded_hal::digital::{OutputPin, PinState};
    use embedded_hal::spi::SpiDevice;

    use super::{ControlLine, Transport};

    /// [`Transport`] over an `embedded-hal` SPI device and two output pins.
    ///
    /// Bus and pin errors are discarded; the panel protocol has no way to
    /// report them back.
    ///
    /// # Example
    /// ```rust,ignore
    /// use ssd1306_framebuffer::driver::Ssd1306;
    /// use ssd1306_framebuffer::interface::{ControlLine, SpiTransport};
    ///
    /// let transport = SpiTransport::new(spi, dc_pin, reset_pin, delay);
    /// let mut oled = Ssd1306::new(
    ///     transport,
    ///     ControlLine::DataCommand,
    ///     ControlLine::Reset,
    ///     128,
    ///     64,
    /// )
    /// .unwrap();
    /// ```
    pub struct SpiTransport<SPI, DC, RST, DELAY> {
        spi: SPI,
        dc: DC,
        rst: RST,
        delay: DELAY,
    }

    impl<SPI, DC, RST, DELAY> SpiTransport<SPI, DC, RST, DELAY>
    where
        SPI: SpiDevice,
        DC: OutputPin,
        RST: OutputPin,
        DELAY: DelayNs,
    {
        /// Bundle the bus, the two control pins and a delay provider.
        pub fn new(spi: SPI, dc: DC, rst: RST, delay: DELAY) -> Self {
            Self {
                spi,
                dc,
                rst,
                delay,
            }
        }

        /// Give the peripherals back.
        pub fn release(self) -> (SPI, DC, RST, DELAY) {
            (self.spi, self.dc, self.rst, self.delay)
        }
    }

    impl<SPI, DC, RST, DELAY> Transport for SpiTransport<SPI, DC, RST, DELAY>
    where
        SPI: SpiDevice,
        DC: OutputPin,
        RST: OutputPin,
        DELAY: DelayNs,
    {
        type Line = ControlLine;

        fn write(&mut self, bytes: &[u8]) {
            let _ = self.spi.write(bytes);
        }

        fn set_line(&mut self, line: ControlLine, high: bool) {
            let state = PinState::from(high);
            match line {
                ControlLine::DataCommand => {
                    let _ = self.dc.set_state(state);
                }
                ControlLine::Reset => {
                    let _ = self.rst.set_state(state);
                }
            }
        }

        fn delay_ms(&mut self, ms: u32) {
            self.delay.delay_ms(ms);
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::vec::Vec;

    use super::*;

    #[derive(Debug, PartialEq)]
    enum Event {
        Write(Vec<u8>),
        Line(u8, bool),
        Delay(u32),
    }

    #[derive(Default)]
    struct Recorder(Vec<Event>);

    impl Transport for Recorder {
        type Line = u8;

        fn write(&mut self, bytes: &[u8]) {
            self.0.push(Event::Write(bytes.to_vec()));
        }

        fn set_line(&mut self, line: u8, high: bool) {
            self.0.push(Event::Line(line, high));
        }

        fn delay_ms(&mut self, ms: u32) {
            self.0.push(Event::Delay(ms));
        }
    }

    fn drive<T: Transport<Line = u8>>(mut transport: T) {
        transport.set_line(7, false);
        transport.write(&[1, 2]);
        transport.delay_ms(3);
    }

    #[test]
    fn test_mut_ref_forwards() {
        let mut recorder = Recorder::default();
        drive(&mut recorder);
        assert_eq!(
            recorder.0,
            [
                Event::Line(7, false),
                Event::Write([1, 2].to_vec()),
                Event::Delay(3)
            ]
        );
    }

    #[cfg(feature = "hal")]
    mod spi {
        extern crate std;

        use core::cell::RefCell;
        use core::convert::Infallible;
        use std::rc::Rc;
        use std::vec::Vec;

        use embedded_hal::delay::DelayNs;
        use embedded_hal::digital::{ErrorKind, OutputPin};
        use embedded_hal::spi::{Operation, SpiDevice};

        use crate::interface::{ControlLine, SpiTransport, Transport};

        #[derive(Debug, PartialEq)]
        enum Event {
            Spi(Vec<u8>),
            Dc(bool),
            Rst(bool),
            DelayNs(u32),
        }

        type Log = Rc<RefCell<Vec<Event>>>;

        struct MockSpi(Log);

        impl embedded_hal::spi::ErrorType for MockSpi {
            type Error = Infallible;
        }

        impl SpiDevice for MockSpi {
            fn transaction(
                &mut self,
                operations: &mut [Operation<'_, u8>],
            ) -> Result<(), Self::Error> {
                for op in operations {
                    if let Operation::Write(bytes) = op {
                        self.0.borrow_mut().push(Event::Spi(bytes.to_vec()));
                    }
                }
                Ok(())
            }
        }

        struct MockPin {
            log: Log,
            is_dc: bool,
        }

        impl embedded_hal::digital::ErrorType for MockPin {
            type Error = Infallible;
        }

        impl OutputPin for MockPin {
            fn set_low(&mut self) -> Result<(), Self::Error> {
                self.push(false);
                Ok(())
            }

            fn set_high(&mut self) -> Result<(), Self::Error> {
                self.push(true);
                Ok(())
            }
        }

        impl MockPin {
            fn push(&self, high: bool) {
                let event = if self.is_dc {
                    Event::Dc(high)
                } else {
                    Event::Rst(high)
                };
                self.log.borrow_mut().push(event);
            }
        }

        struct MockDelay(Log);

        impl DelayNs for MockDelay {
            fn delay_ns(&mut self, ns: u32) {
                self.0.borrow_mut().push(Event::DelayNs(ns));
            }
        }

        #[test]
        fn test_spi_transport_routes_lines_and_bytes() {
            let log: Log = Rc::default();
            let mut transport = SpiTransport::new(
                MockSpi(log.clone()),
                MockPin {
                    log: log.clone(),
                    is_dc: true,
                },
                MockPin {
                    log: log.clone(),
                    is_dc: false,
                },
                MockDelay(log.clone()),
            );

            transport.set_line(ControlLine::DataCommand, false);
            transport.write(&[0xAE]);
            transport.set_line(ControlLine::Reset, false);
            transport.set_line(ControlLine::Reset, true);
            transport.set_line(ControlLine::DataCommand, true);

            let events = log.borrow();
            assert_eq!(
                *events,
                [
                    Event::Dc(false),
                    Event::Spi([0xAE].to_vec()),
                    Event::Rst(false),
                    Event::Rst(true),
                    Event::Dc(true),
                ]
            );
        }

        struct FailingPin;

        impl embedded_hal::digital::ErrorType for FailingPin {
            type Error = ErrorKind;
        }

        impl OutputPin for FailingPin {
            fn set_low(&mut self) -> Result<(), Self::Error> {
                Err(ErrorKind::Other)
            }

            fn set_high(&mut self) -> Result<(), Self::Error> {
                Err(ErrorKind::Other)
            }
        }

        #[test]
        fn test_spi_transport_pins_with_distinct_error_types() {
            let log: Log = Rc::default();
            let mut transport = SpiTransport::new(
                MockSpi(log.clone()),
                MockPin {
                    log: log.clone(),
                    is_dc: true,
                },
                FailingPin,
                MockDelay(log.clone()),
            );

            transport.set_line(ControlLine::Reset, false);
            transport.set_line(ControlLine::DataCommand, false);
            transport.write(&[0xAF]);

            assert_eq!(
                *log.borrow(),
                [Event::Dc(false), Event::Spi([0xAF].to_vec())]
            );
        }

        #[test]
        fn test_spi_transport_delay_reaches_provider() {
            let log: Log = Rc::default();
            let mut transport = SpiTransport::new(
                MockSpi(log.clone()),
                MockPin {
                    log: log.clone(),
                    is_dc: true,
                },
                MockPin {
                    log: log.clone(),
                    is_dc: false,
                },
                MockDelay(log.clone()),
            );

            transport.delay_ms(1);

            let total: u32 = log
                .borrow()
                .iter()
                .map(|event| match event {
                    Event::DelayNs(ns) => *ns,
                    _ => 0,
                })
                .sum();
            assert!(total >= 1_000_000);
        }
    }
}
