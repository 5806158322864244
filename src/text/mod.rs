//! Text measurement, rasterization, and the two annotation primitives drawn with them.

mod block;
mod font;

pub use block::BlockTextRenderer;
pub use font::FontTextRenderer;

use image::RgbImage;

use crate::config::{Corner, Label, LabelStyle, TitleBox, TitleBoxStyle};
use crate::foundation::core::{PixelPoint, PixelRect};
use crate::foundation::error::ReelResult;
use crate::render::{blend, blur, raster};

/// Metric box of a single line of text, in whole pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextExtent {
    /// Advance width.
    pub width: u32,
    /// Height above the baseline.
    pub ascent: u32,
    /// Depth below the baseline.
    pub descent: u32,
}

/// Measures and draws single-line text.
pub trait TextRenderer {
    fn measure(&mut self, text: &str) -> ReelResult<TextExtent>;

    /// Draw `text` with the left end of its baseline at `origin` (in `target` pixels). Glyphs
    /// outside `target` are clipped.
    fn draw(
        &mut self,
        target: &mut RgbImage,
        text: &str,
        origin: PixelPoint,
        color: [u8; 3],
    ) -> ReelResult<()>;
}

/// Padded box the label routine rewrites: the text box grown by `padding` on every side.
pub fn label_box(extent: TextExtent, at: PixelPoint, padding: u32) -> PixelRect {
    let pad = i64::from(padding);
    PixelRect::new(
        at.x - pad,
        at.y - i64::from(extent.ascent) - pad,
        extent.width + 2 * padding,
        extent.ascent + 2 * padding,
    )
}

/// Draw `label` over a blurred, whitened backdrop.
///
/// Only pixels inside [`label_box`] (clipped to the canvas) change; the result depends only on
/// the pixels already inside that box.
pub fn draw_label(
    canvas: &mut RgbImage,
    renderer: &mut dyn TextRenderer,
    label: &Label,
    style: &LabelStyle,
    color: [u8; 3],
) -> ReelResult<()> {
    let extent = renderer.measure(&label.text)?;
    let Some((rect, region)) = raster::extract(canvas, label_box(extent, label.at, style.padding))
    else {
        return Ok(());
    };

    let mut region = blur::gaussian_blur_rgb(&region, style.blur_kernel)?;
    blend::mix_toward(&mut region, [255, 255, 255], style.white_mix);
    let local = PixelPoint::new(label.at.x - rect.x, label.at.y - rect.y);
    renderer.draw(&mut region, &label.text, local, color)?;

    raster::paste(canvas, &region, PixelPoint::new(rect.x, rect.y));
    Ok(())
}

/// Rectangle of a title box of `extent` pinned to `corner` of a `canvas_w x canvas_h` canvas.
pub fn title_box_rect(
    extent: TextExtent,
    corner: Corner,
    style: &TitleBoxStyle,
    canvas_w: u32,
    canvas_h: u32,
) -> PixelRect {
    let w = extent.width + 2 * style.padding_x;
    let h = extent.ascent + 2 * style.padding_y;
    let margin = i64::from(style.margin);
    let x = match corner {
        Corner::TopLeft | Corner::BottomLeft => margin,
        Corner::TopRight | Corner::BottomRight => i64::from(canvas_w) - margin - i64::from(w),
    };
    let y = match corner {
        Corner::TopLeft | Corner::TopRight => margin,
        Corner::BottomLeft | Corner::BottomRight => i64::from(canvas_h) - margin - i64::from(h),
    };
    PixelRect::new(x, y, w, h)
}

/// Filled caption box with text inset by the style padding.
pub fn draw_title_box(
    canvas: &mut RgbImage,
    renderer: &mut dyn TextRenderer,
    title: &TitleBox,
    style: &TitleBoxStyle,
    text_color: [u8; 3],
) -> ReelResult<()> {
    let extent = renderer.measure(&title.text)?;
    let rect = title_box_rect(
        extent,
        title.corner,
        style,
        canvas.width(),
        canvas.height(),
    );
    raster::fill_rect(canvas, rect, style.fill);
    let origin = PixelPoint::new(
        rect.x + i64::from(style.padding_x),
        rect.y + i64::from(style.padding_y) + i64::from(extent.ascent),
    );
    renderer.draw(canvas, &title.text, origin, text_color)
}
