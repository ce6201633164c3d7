//! Monochrome framebuffer with SSD1306 page packing.
//!
//! The framebuffer keeps the true pixel state as a `WIDTH x HEIGHT` grid of
//! booleans and packs it on demand into the column-major page layout of the
//! controller RAM.
//!
//! # Memory Layout
//! The panel RAM is split into `PAGES` horizontal bands, each 8 pixels tall.
//! One byte holds one column of one page, least significant bit on top:
//!
//! ```text
//! byte index = x * PAGES + page
//! bit b      = pixel (x, page * 8 + b)
//! ```
//!
//! so the packed buffer is column-major within the page grid and exactly
//! `WIDTH * HEIGHT / 8` bytes long.
//!
//! # Example
//! ```rust
//! use ssd1306_framebuffer::compute_pages;
//! use ssd1306_framebuffer::framebuffer::FrameBuffer;
//!
//! const WIDTH: usize = 128;
//! const HEIGHT: usize = 64;
//! const PAGES: usize = compute_pages(HEIGHT);
//!
//! let mut fb = FrameBuffer::<WIDTH, HEIGHT, PAGES>::new();
//! fb.set_pixel(3, 9, true).unwrap();
//!
//! let packed = fb.buffer();
//! assert_eq!(packed.len(), WIDTH * HEIGHT / 8);
//! assert_eq!(packed[3 * PAGES + 1], 0b0000_0010);
//! ```
//!
//! Drawing with `embedded-graphics` works as well; pixels outside the panel
//! are dropped:
//! ```rust
//! use embedded_graphics::pixelcolor::BinaryColor;
//! use embedded_graphics::prelude::*;
//! use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
//! use ssd1306_framebuffer::compute_pages;
//! use ssd1306_framebuffer::framebuffer::FrameBuffer;
//!
//! const PAGES: usize = compute_pages(64);
//! let mut fb = FrameBuffer::<128, 64, PAGES>::new();
//!
//! Rectangle::new(Point::new(120, 60), Size::new(20, 20))
//!     .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
//!     .draw(&mut fb)
//!     .unwrap();
//! assert!(fb.get_pixel(127, 63));
//! ```

use core::convert::Infallible;
use core::ops::Deref;

use embedded_dma::ReadBuffer;
use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::geometry::{Dimensions, OriginDimensions, Size};
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::Pixel;

use crate::glyph::{GlyphTable, ADVANCE};
use crate::Color;

/// Reasons a drawing operation is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DrawError {
    /// The coordinate is outside the grid
    OutOfBounds {
        /// Requested column
        x: usize,
        /// Requested row
        y: usize,
    },
    /// No glyph table installed
    NoFont,
    /// The glyph table has no entry for this character
    MissingGlyph(char),
    /// A packed buffer of the wrong length
    BufferSize {
        /// `WIDTH * HEIGHT / 8`
        expected: usize,
        /// Length that was supplied
        actual: usize,
    },
    /// A frame whose dimensions differ from the panel's
    GeometryMismatch {
        /// Panel width and height
        panel: (usize, usize),
        /// Framebuffer width and height
        frame: (usize, usize),
    },
}

impl core::fmt::Display for DrawError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::OutOfBounds { x, y } => write!(f, "({x}, {y}) is outside the framebuffer"),
            Self::NoFont => f.write_str("no glyph table installed"),
            Self::MissingGlyph(c) => write!(f, "no glyph for {c:?}"),
            Self::BufferSize { expected, actual } => {
                write!(f, "expected {expected} packed bytes, got {actual}")
            }
            Self::GeometryMismatch { panel, frame } => write!(
                f,
                "{}x{} frame does not fit a {}x{} panel",
                frame.0, frame.1, panel.0, panel.1
            ),
        }
    }
}

impl core::error::Error for DrawError {}

/// Packed page data, ready to stream to the panel.
///
/// Dereferences to the flat `&[u8]` the controller consumes and implements
/// [`ReadBuffer`] so it can be handed to a DMA engine directly.
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct PageBuffer<const WIDTH: usize, const PAGES: usize> {
    columns: [[u8; PAGES]; WIDTH],
}

impl<const WIDTH: usize, const PAGES: usize> PageBuffer<WIDTH, PAGES> {
    const fn new() -> Self {
        Self {
            columns: [[0; PAGES]; WIDTH],
        }
    }

    /// The packed bytes of column `x`, one per page, top page first.
    #[must_use]
    pub fn column(&self, x: usize) -> Option<&[u8; PAGES]> {
        self.columns.get(x)
    }
}

impl<const WIDTH: usize, const PAGES: usize> Deref for PageBuffer<WIDTH, PAGES> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.columns.as_flattened()
    }
}

impl<const WIDTH: usize, const PAGES: usize> AsRef<[u8]> for PageBuffer<WIDTH, PAGES> {
    fn as_ref(&self) -> &[u8] {
        self
    }
}

impl<const WIDTH: usize, const PAGES: usize> core::fmt::Debug for PageBuffer<WIDTH, PAGES> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PageBuffer")
            .field("columns", &WIDTH)
            .field("pages", &PAGES)
            .field("size", &core::mem::size_of_val(&self.columns))
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl<const WIDTH: usize, const PAGES: usize> defmt::Format for PageBuffer<WIDTH, PAGES> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "PageBuffer<{}, {}>", WIDTH, PAGES);
        defmt::write!(f, " size: {}", core::mem::size_of_val(&self.columns));
    }
}

unsafe impl<const WIDTH: usize, const PAGES: usize> ReadBuffer for PageBuffer<WIDTH, PAGES> {
    type Word = u8;

    unsafe fn read_buffer(&self) -> (*const u8, usize) {
        let ptr = &self.columns as *const _ as *const u8;
        let len = core::mem::size_of_val(&self.columns);
        (ptr, len)
    }
}

unsafe impl<const WIDTH: usize, const PAGES: usize> ReadBuffer for &PageBuffer<WIDTH, PAGES> {
    type Word = u8;

    unsafe fn read_buffer(&self) -> (*const u8, usize) {
        let ptr = &self.columns as *const _ as *const u8;
        let len = core::mem::size_of_val(&self.columns);
        (ptr, len)
    }
}

/// Pixel grid plus its packed page representation.
///
/// # Type Parameters
/// - `WIDTH`: Number of columns
/// - `HEIGHT`: Number of rows, a multiple of 8
/// - `PAGES`: `HEIGHT / 8`, use [`crate::compute_pages`]
///
/// A mismatched `PAGES` is rejected at compile time.
///
/// The optional glyph table is borrowed for `'f`; text operations fail with
/// [`DrawError::NoFont`] until one is installed with [`FrameBuffer::set_font`].
pub struct FrameBuffer<'f, const WIDTH: usize, const HEIGHT: usize, const PAGES: usize> {
    pixels: [[bool; HEIGHT]; WIDTH],
    pages: PageBuffer<WIDTH, PAGES>,
    font: Option<&'f dyn GlyphTable>,
}

impl<const WIDTH: usize, const HEIGHT: usize, const PAGES: usize> Default
    for FrameBuffer<'_, WIDTH, HEIGHT, PAGES>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<'f, const WIDTH: usize, const HEIGHT: usize, const PAGES: usize>
    FrameBuffer<'f, WIDTH, HEIGHT, PAGES>
{
    const GEOMETRY: () = assert!(
        HEIGHT == PAGES * 8,
        "HEIGHT must be a multiple of 8 and PAGES must equal HEIGHT / 8"
    );

    /// Create a blank framebuffer with no glyph table.
    #[must_use]
    pub const fn new() -> Self {
        let () = Self::GEOMETRY;
        Self {
            pixels: [[false; HEIGHT]; WIDTH],
            pages: PageBuffer::new(),
            font: None,
        }
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> usize {
        WIDTH
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> usize {
        HEIGHT
    }

    /// Length of the packed buffer in bytes.
    #[must_use]
    pub const fn buffer_size(&self) -> usize {
        WIDTH * PAGES
    }

    /// Read a pixel. Anything outside the grid reads as off.
    #[must_use]
    pub fn get_pixel(&self, x: usize, y: usize) -> bool {
        self.pixels
            .get(x)
            .and_then(|column| column.get(y))
            .copied()
            .unwrap_or(false)
    }

    /// Set a pixel.
    ///
    /// # Errors
    ///
    /// [`DrawError::OutOfBounds`] if `(x, y)` is outside the grid; nothing is
    /// changed in that case.
    pub fn set_pixel(&mut self, x: usize, y: usize, on: bool) -> Result<(), DrawError> {
        let cell = self
            .pixels
            .get_mut(x)
            .and_then(|column| column.get_mut(y))
            .ok_or(DrawError::OutOfBounds { x, y })?;
        *cell = on;
        Ok(())
    }

    /// Fill the half-open rectangle `[x0, x1) x [y0, y1)`, clipped to the grid.
    pub fn set_rect(&mut self, x0: usize, y0: usize, x1: usize, y1: usize, on: bool) {
        let x1 = x1.min(WIDTH);
        let y1 = y1.min(HEIGHT);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        for column in &mut self.pixels[x0..x1] {
            column[y0..y1].fill(on);
        }
    }

    /// Turn every pixel off.
    pub fn clear_screen(&mut self) {
        self.set_rect(0, 0, WIDTH, HEIGHT, false);
    }

    /// Pack the grid into page layout and return it.
    ///
    /// The whole grid is repacked on every call, so the result always
    /// reflects the current pixels.
    pub fn buffer(&mut self) -> &PageBuffer<WIDTH, PAGES> {
        for (column, packed) in self.pixels.iter().zip(self.pages.columns.iter_mut()) {
            for (rows, byte) in column.chunks_exact(8).zip(packed.iter_mut()) {
                *byte = rows
                    .iter()
                    .enumerate()
                    .fold(0u8, |acc, (bit, &on)| acc | (u8::from(on) << bit));
            }
        }
        &self.pages
    }

    /// Replace the grid with a packed buffer in the layout [`FrameBuffer::buffer`]
    /// produces.
    ///
    /// # Errors
    ///
    /// [`DrawError::BufferSize`] if `data` is not exactly
    /// `WIDTH * HEIGHT / 8` bytes; the grid is left untouched.
    pub fn load_buffer(&mut self, data: &[u8]) -> Result<(), DrawError> {
        let expected = self.buffer_size();
        if data.len() != expected {
            return Err(DrawError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        for (column, packed) in self.pixels.iter_mut().zip(data.chunks_exact(PAGES)) {
            for (rows, byte) in column.chunks_exact_mut(8).zip(packed) {
                for (bit, pixel) in rows.iter_mut().enumerate() {
                    *pixel = *byte & (1u8 << bit) != 0;
                }
            }
        }
        Ok(())
    }

    /// Install the glyph table used by [`FrameBuffer::set_char`], or remove it
    /// with `None`.
    pub fn set_font(&mut self, font: Option<&'f dyn GlyphTable>) {
        self.font = font;
    }

    /// Draw the glyph for `c` with its top-left corner at `(x, y)`.
    ///
    /// The glyph is laid down bottom row of the bitmap first, so glyph row
    /// `i` of `n` lands on grid row `y + (n - 1 - i)`. Columns past the right
    /// edge are skipped; drawing stops at the bottom edge.
    ///
    /// # Errors
    ///
    /// - [`DrawError::OutOfBounds`] if `(x, y)` is outside the grid
    /// - [`DrawError::NoFont`] if no glyph table is installed
    /// - [`DrawError::MissingGlyph`] if the table has no entry for `c`
    ///
    /// Nothing is drawn when an error is returned.
    pub fn set_char(&mut self, c: char, x: usize, y: usize) -> Result<(), DrawError> {
        if x >= WIDTH || y >= HEIGHT {
            return Err(DrawError::OutOfBounds { x, y });
        }
        let font = self.font.ok_or(DrawError::NoFont)?;
        let glyph = font.glyph(c).ok_or(DrawError::MissingGlyph(c))?;

        for (dy, row) in (0..glyph.height()).rev().enumerate() {
            let py = y + dy;
            if py >= HEIGHT {
                break;
            }
            for (dx, on) in glyph.row_bits(row).enumerate() {
                if let Some(column) = self.pixels.get_mut(x + dx) {
                    column[py] = on;
                }
            }
        }
        Ok(())
    }

    /// Draw `text` left to right from `(x, y)`, advancing 8 columns per
    /// character.
    ///
    /// # Errors
    ///
    /// Stops at the first character [`FrameBuffer::set_char`] refuses and
    /// returns its error. Characters drawn before it stay drawn.
    pub fn set_text(&mut self, x: usize, y: usize, text: &str) -> Result<(), DrawError> {
        for (i, c) in text.chars().enumerate() {
            self.set_char(c, x + i * ADVANCE, y)?;
        }
        Ok(())
    }
}

impl<const WIDTH: usize, const HEIGHT: usize, const PAGES: usize> OriginDimensions
    for FrameBuffer<'_, WIDTH, HEIGHT, PAGES>
{
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl<const WIDTH: usize, const HEIGHT: usize, const PAGES: usize> DrawTarget
    for FrameBuffer<'_, WIDTH, HEIGHT, PAGES>
{
    type Color = Color;

    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let (Ok(x), Ok(y)) = (usize::try_from(point.x), usize::try_from(point.y)) {
                let _ = self.set_pixel(x, y, color.is_on());
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        if let Some(bottom_right) = area.bottom_right() {
            self.set_rect(
                area.top_left.x as usize,
                area.top_left.y as usize,
                bottom_right.x as usize + 1,
                bottom_right.y as usize + 1,
                color.is_on(),
            );
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.set_rect(0, 0, WIDTH, HEIGHT, color.is_on());
        Ok(())
    }
}

impl<const WIDTH: usize, const HEIGHT: usize, const PAGES: usize> core::fmt::Debug
    for FrameBuffer<'_, WIDTH, HEIGHT, PAGES>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("width", &WIDTH)
            .field("height", &HEIGHT)
            .field("pages", &PAGES)
            .field("buffer_size", &(WIDTH * PAGES))
            .field("font", &self.font.is_some())
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl<const WIDTH: usize, const HEIGHT: usize, const PAGES: usize> defmt::Format
    for FrameBuffer<'_, WIDTH, HEIGHT, PAGES>
{
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "FrameBuffer<{}, {}, {}>", WIDTH, HEIGHT, PAGES);
        defmt::write!(f, " buffer_size: {}", WIDTH * PAGES);
        defmt::write!(f, " font: {}", self.font.is_some());
    }
}
