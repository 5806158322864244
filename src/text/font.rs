use std::borrow::Cow;

use image::RgbImage;

use crate::foundation::core::{PixelPoint, PixelRect, PixelSize};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::blend::premul_over_rgb;
use crate::text::{TextExtent, TextRenderer};

/// Brush carried through Parley layouts. Color is chosen at draw time, so it stays default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextBrush;

/// Antialiasing can spill past the metric box; rasterize with this much slack on every side.
const RASTER_SLACK_PX: i64 = 2;

/// Text renderer backed by one font file: Parley shapes, `vello_cpu` rasterizes.
pub struct FontTextRenderer {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    family_name: String,
    font: vello_cpu::peniko::FontData,
    size_px: f32,
}

impl FontTextRenderer {
    /// Register `font_bytes` and prepare to lay out text at `size_px`.
    pub fn new(font_bytes: Vec<u8>, size_px: f32) -> ReelResult<Self> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(ReelError::validation("text size_px must be finite and > 0"));
        }

        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| ReelError::render("no font families registered from font bytes"))?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| ReelError::render("registered font family has no name"))?
            .to_string();

        let font = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), 0);
        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font,
            size_px,
        })
    }

    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    fn layout(&mut self, text: &str) -> parley::Layout<TextBrush> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(self.size_px));
        builder.push_default(parley::style::StyleProperty::Brush(TextBrush));

        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }
}

fn extent_of(layout: &parley::Layout<TextBrush>) -> (TextExtent, f32) {
    let Some(line) = layout.lines().next() else {
        return (TextExtent::default(), 0.0);
    };
    let m = line.metrics();
    let extent = TextExtent {
        width: m.advance.max(0.0).ceil() as u32,
        ascent: m.ascent.max(0.0).ceil() as u32,
        descent: m.descent.max(0.0).ceil() as u32,
    };
    (extent, m.baseline)
}

impl TextRenderer for FontTextRenderer {
    fn measure(&mut self, text: &str) -> ReelResult<TextExtent> {
        let layout = self.layout(text);
        Ok(extent_of(&layout).0)
    }

    fn draw(
        &mut self,
        target: &mut RgbImage,
        text: &str,
        origin: PixelPoint,
        color: [u8; 3],
    ) -> ReelResult<()> {
        let layout = self.layout(text);
        let (extent, baseline) = extent_of(&layout);
        if extent.width == 0 {
            return Ok(());
        }

        let ink = PixelRect::new(
            origin.x - RASTER_SLACK_PX,
            origin.y - i64::from(extent.ascent) - RASTER_SLACK_PX,
            extent.width + 2 * RASTER_SLACK_PX as u32,
            extent.ascent + extent.descent + 2 * RASTER_SLACK_PX as u32,
        );
        let Some(ink) = ink.clip_to(PixelSize::new(target.width(), target.height())) else {
            return Ok(());
        };
        let w: u16 = ink
            .width
            .try_into()
            .map_err(|_| ReelError::render("text raster width exceeds u16"))?;
        let h: u16 = ink
            .height
            .try_into()
            .map_err(|_| ReelError::render("text raster height exceeds u16"))?;

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((
            (origin.x - ink.x) as f64,
            (origin.y - ink.y) as f64 - f64::from(baseline),
        )));
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            color[0], color[1], color[2], 255,
        ));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&self.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        ctx.flush();

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);
        premul_over_rgb(
            target,
            PixelPoint::new(ink.x, ink.y),
            pixmap.data_as_u8_slice(),
            PixelSize::new(ink.width, ink.height),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_size() {
        assert!(matches!(
            FontTextRenderer::new(Vec::new(), 0.0),
            Err(ReelError::Validation(_))
        ));
    }

    #[test]
    fn rejects_bytes_that_are_not_a_font() {
        assert!(FontTextRenderer::new(b"definitely not a font".to_vec(), 20.0).is_err());
    }
}
