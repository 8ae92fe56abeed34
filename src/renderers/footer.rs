//! Footer: `nysse.fi` brand text followed by the service pictograms.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │                  nysse.fi  [bus][tram]  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! The pictograms are scaled to 70 % of the footer height and pinned to the
//! right edge. The text sits to their left, separated by a gap proportional
//! to the text width. The composed footer is cached until the size changes.

use std::path::PathBuf;

use embedded_graphics::prelude::*;
use image::RgbaImage;
use image::imageops::{self, FilterType};
use tracing::{debug, warn};

use crate::colors::WHITE;
use crate::fonts::{SizedFont, render_text};
use crate::surface::Surface;

/// Default pictogram asset, relative to the working directory.
pub const PICTOGRAMS_PATH: &str = "resources/textures/elements/footer/footer_pictograms.png";

const BRAND_TEXT: &str = "nysse.fi";

/// Pictogram height relative to the footer height. Also scales the text gap.
const PICTOGRAM_SCALE: f32 = 0.7;

pub struct FooterRenderer {
    font: SizedFont,
    pictograms_path: PathBuf,
    pictograms: Option<RgbaImage>,
    load_attempted: bool,
    cached: Option<Surface>,
    renders: u32,
}

impl FooterRenderer {
    pub fn new() -> Self { Self::with_pictograms(PICTOGRAMS_PATH) }

    pub fn with_pictograms(path: impl Into<PathBuf>) -> Self {
        Self {
            font: SizedFont::new("footer"),
            pictograms_path: path.into(),
            pictograms: None,
            load_attempted: false,
            cached: None,
            renders: 0,
        }
    }

    /// Footer of exactly `size`, re-rendered only when `size` changes.
    pub fn render_footer(&mut self, size: Size) -> &Surface {
        if self.cached.as_ref().is_some_and(|s| s.size() != size) {
            self.cached = None;
        }
        let surface = match self.cached.take() {
            Some(surface) => surface,
            None => {
                debug!(width = size.width, height = size.height, "rendering new footer");
                self.renders += 1;
                self.compose(size)
            }
        };
        self.cached.insert(surface)
    }

    /// How many times the footer has actually been composed.
    pub fn render_count(&self) -> u32 { self.renders }

    fn compose(&mut self, size: Size) -> Surface {
        let mut surface = Surface::new(size);
        let mid_y = size.height as i32 / 2;

        let font = self.font.get_size(size.height);
        let text = render_text(BRAND_TEXT, font, WHITE);

        let mut pictograms_x = size.width as i32;
        if let Some(pictograms) = self.scaled_pictograms(size.height) {
            let picto_size = pictograms.size();
            pictograms_x -= picto_size.width as i32;
            let origin = Point::new(pictograms_x, mid_y - picto_size.height as i32 / 2);
            pictograms.blit(&mut surface, origin).ok();
        }

        let text_size = text.size();
        let gap = (text_size.width / 5) as f32 * PICTOGRAM_SCALE;
        let text_x = pictograms_x - gap as i32 - text_size.width as i32;
        text.blit(&mut surface, Point::new(text_x, mid_y - text_size.height as i32 / 2))
            .ok();

        surface
    }

    /// Pictograms scaled to the footer height, keeping the aspect ratio.
    fn scaled_pictograms(&mut self, footer_height: u32) -> Option<Surface> {
        let source = self.load_pictograms()?;
        let height = footer_height as f32 * PICTOGRAM_SCALE;
        let width = source.width() as f32 / source.height() as f32 * height;
        let (width, height) = (width.round() as u32, height.round() as u32);
        if width == 0 || height == 0 {
            return None;
        }
        let scaled = imageops::resize(source, width, height, FilterType::Triangle);
        Some(Surface::from_rgba_image(&scaled))
    }

    fn load_pictograms(&mut self) -> Option<&RgbaImage> {
        if !self.load_attempted {
            self.load_attempted = true;
            match image::open(&self.pictograms_path) {
                Ok(img) if img.height() > 0 => self.pictograms = Some(img.into_rgba8()),
                Ok(_) => warn!(path = %self.pictograms_path.display(), "footer pictograms are empty"),
                Err(e) => warn!(
                    path = %self.pictograms_path.display(),
                    "footer pictograms unavailable, rendering text only: {e}"
                ),
            }
        }
        self.pictograms.as_ref()
    }
}

impl Default for FooterRenderer {
    fn default() -> Self { Self::new() }
}
