//! Monospace glyph bitmaps.
//!
//! A [`Glyph`] is a stack of bit-rows, top row first. Each row takes
//! `ceil(width / 8)` consecutive bytes, most significant bit leftmost, and only
//! the first [`Glyph::width`] bits of a row are drawn. Glyph data is owned by
//! the caller; the framebuffer only borrows a [`GlyphTable`] to look
//! characters up.
//!
//! # Example
//! ```rust
//! use ssd1306_framebuffer::glyph::{Glyph, GlyphTable};
//!
//! const BAR: [u8; 3] = [0b1000_0000, 0b1000_0000, 0b1000_0000];
//! const FONT: [(char, Glyph<'static>); 1] = [('|', Glyph::new(1, &BAR))];
//!
//! assert!(FONT.glyph('|').is_some());
//! assert!(FONT.glyph('x').is_none());
//! ```

/// Horizontal advance between characters of a line of text.
pub const ADVANCE: usize = 8;

/// Bitmap for a single character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Glyph<'a> {
    width: u8,
    rows: &'a [u8],
}

impl<'a> Glyph<'a> {
    /// Create a glyph `width` pixels wide from `rows`, top row first, each row
    /// [`Glyph::stride`] bytes long. A trailing partial row is ignored.
    #[must_use]
    pub const fn new(width: u8, rows: &'a [u8]) -> Self {
        Self { width, rows }
    }

    /// Columns drawn per row.
    #[must_use]
    pub const fn width(&self) -> u8 {
        self.width
    }

    /// Bytes per row.
    #[must_use]
    pub const fn stride(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> usize {
        match self.stride() {
            0 => 0,
            stride => self.rows.len() / stride,
        }
    }

    /// Raw row bytes, top row first.
    #[must_use]
    pub const fn rows(&self) -> &'a [u8] {
        self.rows
    }

    /// Pixels of `row`, left to right. Empty if `row` is past the bottom.
    pub fn row_bits(&self, row: usize) -> impl Iterator<Item = bool> + 'a {
        let stride = self.stride();
        let rows = self.rows;
        let bytes: &'a [u8] = row
            .checked_mul(stride)
            .and_then(|start| rows.get(start..start.checked_add(stride)?))
            .unwrap_or(&[]);
        let width = if bytes.is_empty() {
            0
        } else {
            usize::from(self.width)
        };
        (0..width).map(move |col| bytes[col / 8] & (0x80 >> (col % 8)) != 0)
    }
}

/// Character to [`Glyph`] lookup.
pub trait GlyphTable {
    /// The glyph for `c`, or `None` if the table has no entry.
    fn glyph(&self, c: char) -> Option<Glyph<'_>>;
}

impl GlyphTable for [(char, Glyph<'_>)] {
    fn glyph(&self, c: char) -> Option<Glyph<'_>> {
        self.iter()
            .find(|(key, _)| *key == c)
            .map(|(_, glyph)| *glyph)
    }
}

impl<const N: usize> GlyphTable for [(char, Glyph<'_>); N] {
    fn glyph(&self, c: char) -> Option<Glyph<'_>> {
        self.as_slice().glyph(c)
    }
}
