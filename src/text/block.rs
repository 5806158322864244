use image::RgbImage;

use crate::foundation::core::{PixelPoint, PixelRect};
use crate::foundation::error::ReelResult;
use crate::render::raster::fill_rect;
use crate::text::{TextExtent, TextRenderer};

/// Fixed-metric renderer that paints each non-space character as a solid block.
///
/// Needs no font file, so it serves layout previews (`--block-text`) and deterministic tests.
#[derive(Clone, Copy, Debug)]
pub struct BlockTextRenderer {
    pub advance: u32,
    pub ascent: u32,
    pub descent: u32,
}

impl Default for BlockTextRenderer {
    fn default() -> Self {
        Self {
            advance: 12,
            ascent: 16,
            descent: 4,
        }
    }
}

impl TextRenderer for BlockTextRenderer {
    fn measure(&mut self, text: &str) -> ReelResult<TextExtent> {
        Ok(TextExtent {
            width: self.advance * text.chars().count() as u32,
            ascent: self.ascent,
            descent: self.descent,
        })
    }

    fn draw(
        &mut self,
        target: &mut RgbImage,
        text: &str,
        origin: PixelPoint,
        color: [u8; 3],
    ) -> ReelResult<()> {
        let glyph_w = self.advance.saturating_sub(2).max(1);
        for (i, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let x = origin.x + i64::from(self.advance) * i as i64 + 1;
            let cell = PixelRect::new(x, origin.y - i64::from(self.ascent), glyph_w, self.ascent);
            fill_rect(target, cell, color);
        }
        Ok(())
    }
}
