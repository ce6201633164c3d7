//! Driver and framebuffer for SSD1306 monochrome OLED panels.
//!
//! ## How SSD1306 Panels Work
//!
//! The SSD1306 is a single-chip controller for passive-matrix OLED panels of up
//! to 128 × 64 pixels. Unlike a scanned LED matrix, the controller owns its own
//! graphics RAM (GDDRAM) and refreshes the glass by itself; the host only has to
//! write new pixel data when the image changes.
//!
//! ### Signal names (4-wire SPI)
//! - **SCLK / SDIN** – Serial clock and data; bytes are shifted in MSB first
//! - **CS** – Chip select (active LOW), normally handled by the SPI device
//! - **D/C** – Data/Command select: LOW means the byte is a command or command
//!   operand, HIGH means the byte is pixel data for GDDRAM
//! - **RES** – Reset (active LOW); a short LOW pulse returns every register to
//!   its power-on default
//!
//! ### Memory layout
//! GDDRAM is split into *pages* of 8 rows. One byte covers one column of one
//! page, with bit 0 as the top row of the page and bit 7 as the bottom row. In
//! horizontal addressing mode the controller walks the columns of a page and
//! then moves to the next page; in vertical mode it walks the pages of a column
//! and then moves to the next column. [`framebuffer::FrameBuffer`] packs its
//! pixels column by column (byte `x * PAGES + page`), the order vertical mode
//! streams. The default configuration uses horizontal addressing, so a
//! pixel-exact image needs [`config::AddressingMode::Vertical`]; see
//! [`driver::Ssd1306::flush`].
//!
//! ### Bring-up
//! 1. Display off.
//! 2. Reset pulse.
//! 3. Addressing mode, start line, segment remap, multiplex ratio, COM scan
//!    direction, display offset, COM pin wiring, oscillator, pre-charge, VCOMH,
//!    contrast, RAM/test mode, normal/inverse video, charge pump.
//! 4. Display on.
//!
//! The panel timing parameters (multiplex ratio, COM pins, charge pump) depend
//! on how the glass is wired to the controller. [`config::PanelConfig`] carries
//! them; its default matches the common 128 × 64 modules.
//!
//! ## Crate Layout
//!
//! - [`driver::Ssd1306`] speaks the command protocol over a [`interface::Transport`]
//! - [`framebuffer::FrameBuffer`] is the in-memory pixel grid, with glyph text
//!   rendering and an `embedded-graphics` [`DrawTarget`](embedded_graphics::draw_target::DrawTarget)
//! - [`command`] encodes and validates individual commands
//! - [`pwm`] computes divider settings for a PWM pin, e.g. a backlight or buzzer
//!
//! ```rust
//! use embedded_graphics::pixelcolor::BinaryColor;
//! use embedded_graphics::prelude::*;
//! use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
//! use ssd1306_framebuffer::{compute_pages, FrameBuffer};
//!
//! const WIDTH: usize = 128;
//! const HEIGHT: usize = 64;
//! const PAGES: usize = compute_pages(HEIGHT);
//!
//! let mut fb = FrameBuffer::<WIDTH, HEIGHT, PAGES>::new();
//! Rectangle::new(Point::new(4, 4), Size::new(8, 8))
//!     .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
//!     .draw(&mut fb)
//!     .unwrap();
//! assert!(fb.get_pixel(4, 4));
//! assert_eq!(fb.buffer().len(), WIDTH * PAGES);
//! ```
//!
//! ## Available Feature Flags
//!
//! ### `hal` Feature (enabled by default)
//! Provides [`interface::SpiTransport`], a [`interface::Transport`] built from
//! an `embedded-hal` 1.0 `SpiDevice`, two `OutputPin`s and a `DelayNs`.
//! Disable it if you bring your own transport:
//!
//! ```toml
//! [dependencies]
//! ssd1306-framebuffer = { version = "0.1.0", default-features = false }
//! ```
//!
//! ### `defmt` Feature
//! Implements `defmt::Format` for the framebuffer, driver, configuration and
//! error types so they can be emitted with the `defmt` logging framework. No
//! functional changes; purely adds trait impls.
//!
//! ```toml
//! [dependencies]
//! ssd1306-framebuffer = { version = "0.1.0", features = ["defmt"] }
//! ```
#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use embedded_graphics::pixelcolor::BinaryColor;

pub mod command;
pub mod config;
pub mod driver;
pub mod framebuffer;
pub mod glyph;
pub mod interface;
pub mod pwm;

pub use config::PanelConfig;
pub use driver::Ssd1306;
pub use framebuffer::{DrawError, FrameBuffer, PageBuffer};
pub use glyph::{Glyph, GlyphTable};
pub use interface::Transport;

/// Color type used in the framebuffer
pub type Color = BinaryColor;

/// Rows covered by one byte of panel RAM.
pub const ROWS_PER_PAGE: usize = 8;

/// Computes the PAGES value from HEIGHT for `FrameBuffer`
///
/// # Arguments
///
/// * `height` - Total number of rows in the display
///
/// # Returns
///
/// Number of 8-row pages, the `PAGES` parameter of `FrameBuffer`
#[must_use]
pub const fn compute_pages(height: usize) -> usize {
    height / ROWS_PER_PAGE
}

/// Computes the size of a packed frame in bytes
///
/// # Arguments
///
/// * `width` - Number of columns in the display
/// * `height` - Total number of rows in the display
///
/// # Returns
///
/// Number of bytes the panel expects for a full frame
#[must_use]
pub const fn compute_buffer_size(width: usize, height: usize) -> usize {
    width * compute_pages(height)
}
