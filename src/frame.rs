// Motion Logger - Monochrome Frame Buffer
//
// Off-screen buffer in SSD1306 page layout: byte `x + page * WIDTH` holds
// the 8 vertical pixels of column `x` in rows `page * 8 .. page * 8 + 8`,
// LSB on top. The OLED driver ships the pages as-is.

use core::convert::Infallible;

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};

use crate::config::{DISPLAY_BUFFER_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH};

pub struct MonoFrame {
    buffer: [u8; DISPLAY_BUFFER_SIZE],
}

impl Default for MonoFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl MonoFrame {
    pub const fn new() -> Self {
        Self {
            buffer: [0; DISPLAY_BUFFER_SIZE],
        }
    }

    pub fn clear(&mut self) {
        self.buffer.fill(0);
    }

    /// Draw `text` with its top-left corner at (`x`, `y`). Glyphs falling
    /// outside the screen are clipped.
    pub fn draw_text(&mut self, text: &str, x: i32, y: i32) {
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        let _ = Text::with_baseline(text, Point::new(x, y), style, Baseline::Top).draw(self);
    }

    #[cfg(test)]
    fn pixel(&self, x: u32, y: u32) -> bool {
        Self::locate(x, y).is_some_and(|(index, mask)| self.buffer[index] & mask != 0)
    }

    /// One `SCREEN_WIDTH`-byte slice per 8-row page, top to bottom.
    pub fn pages(&self) -> impl Iterator<Item = &[u8]> {
        self.buffer.chunks(SCREEN_WIDTH as usize)
    }

    fn locate(x: u32, y: u32) -> Option<(usize, u8)> {
        if x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
            return None;
        }
        let index = x as usize + (y as usize / 8) * SCREEN_WIDTH as usize;
        Some((index, 1 << (y % 8)))
    }
}

impl OriginDimensions for MonoFrame {
    fn size(&self) -> Size {
        Size::new(SCREEN_WIDTH, SCREEN_HEIGHT)
    }
}

impl DrawTarget for MonoFrame {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) else {
                continue;
            };
            if let Some((index, mask)) = Self::locate(x, y) {
                match color {
                    BinaryColor::On => self.buffer[index] |= mask,
                    BinaryColor::Off => self.buffer[index] &= !mask,
                }
            }
        }
        Ok(())
    }
}
