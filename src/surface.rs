//! Off-screen pixel surface.
//!
//! Renderers compose text, images and route lines into a [`Surface`] once and
//! the host blits the result onto the display every frame. Pixels are
//! `Option<Rgb565>`: `None` is transparent and is skipped when blitting, which
//! is how the footer's brand text and pictograms sit on top of whatever the
//! display already shows.
//!
//! `Surface` implements [`DrawTarget`], so every embedded-graphics primitive
//! and text style can draw into it directly.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::{Rgb565, Rgb888};
use embedded_graphics::prelude::*;
use image::RgbaImage;

/// Alpha values below this are treated as fully transparent.
const ALPHA_CUTOFF: u8 = 128;

/// An owned, fixed-size RGB565 pixel buffer with per-pixel transparency.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    size: Size,
    pixels: Vec<Option<Rgb565>>,
}

impl Surface {
    /// Create a fully transparent surface.
    pub fn new(size: Size) -> Self {
        Self {
            size,
            pixels: vec![None; (size.width * size.height) as usize],
        }
    }

    /// Create a surface filled with an opaque color.
    pub fn filled(size: Size, color: Rgb565) -> Self {
        Self {
            size,
            pixels: vec![Some(color); (size.width * size.height) as usize],
        }
    }

    /// Convert a decoded RGBA image. Pixels with alpha below 50 % become transparent.
    pub fn from_rgba_image(image: &RgbaImage) -> Self {
        let size = Size::new(image.width(), image.height());
        let pixels = image
            .pixels()
            .map(|px| {
                let [r, g, b, a] = px.0;
                (a >= ALPHA_CUTOFF).then(|| Rgb565::from(Rgb888::new(r, g, b)))
            })
            .collect();
        Self { size, pixels }
    }

    /// Color at `point`, or `None` when transparent or out of bounds.
    pub fn pixel(&self, point: Point) -> Option<Rgb565> {
        self.index_of(point).and_then(|idx| self.pixels[idx])
    }

    /// Number of opaque pixels. Mostly useful for asserting something was drawn.
    pub fn opaque_pixel_count(&self) -> usize {
        self.pixels.iter().filter(|px| px.is_some()).count()
    }

    /// Draw every opaque pixel onto `target` with the surface's top-left at `origin`.
    pub fn blit<D>(&self, target: &mut D, origin: Point) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let width = self.size.width as usize;
        target.draw_iter(self.pixels.iter().enumerate().filter_map(|(idx, px)| {
            px.map(|color| {
                let offset = Point::new((idx % width) as i32, (idx / width) as i32);
                Pixel(origin + offset, color)
            })
        }))
    }

    #[inline]
    fn index_of(&self, point: Point) -> Option<usize> {
        let (x, y) = (point.x, point.y);
        if x < 0 || y < 0 || x >= self.size.width as i32 || y >= self.size.height as i32 {
            return None;
        }
        Some(y as usize * self.size.width as usize + x as usize)
    }
}

impl OriginDimensions for Surface {
    fn size(&self) -> Size { self.size }
}

impl DrawTarget for Surface {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            // Out-of-bounds pixels are clipped silently
            if let Some(idx) = self.index_of(point) {
                self.pixels[idx] = Some(color);
            }
        }
        Ok(())
    }
}
