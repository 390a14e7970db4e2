//! Frame composition: background + caption (with drop shadow) + watermark.

use std::path::{Path, PathBuf};

use hookreel_core::frame::FrameBuffer;
use hookreel_core::{
    CompositionStep, FontsConfig, HookreelConfig, HookreelError, HookreelResult, LayoutColors,
    LayoutConfig,
};

use crate::font::{FontResolver, FontSpec, LoadedFont};
use crate::image_loader;
use crate::text::{self, center_horizontally, RasterizedText};

/// Where a piece of text ended up on the frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TextPlacement {
    /// The text as drawn, after wrapping.
    pub text: String,
    /// Left edge of the text block. May be negative.
    pub x: f32,
    /// Top edge of the text block.
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub font_px: f32,
    pub font_source: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameLayout {
    pub caption: TextPlacement,
    pub watermark: TextPlacement,
}

/// A finished frame and the layout that produced it.
#[derive(Debug, Clone)]
pub struct ComposedFrame {
    pub frame: FrameBuffer,
    pub layout: FrameLayout,
}

impl ComposedFrame {
    pub fn dimensions(&self) -> (u32, u32) {
        self.frame.dimensions()
    }

    pub fn save_png(&self, path: &Path) -> HookreelResult<()> {
        image_loader::save_png(&self.frame, path)
    }
}

/// Lays caption and watermark text over a background image.
#[derive(Debug, Clone)]
pub struct FrameComposer {
    layout: LayoutConfig,
    colors: LayoutColors,
    fonts: FontsConfig,
    resolver: FontResolver,
}

impl FrameComposer {
    pub fn new(layout: LayoutConfig, fonts: FontsConfig) -> HookreelResult<Self> {
        let colors = layout.validate()?;
        let resolver = FontResolver::new(fonts.search_dirs.clone());
        Ok(Self {
            layout,
            colors,
            fonts,
            resolver,
        })
    }

    pub fn from_config(config: &HookreelConfig) -> HookreelResult<Self> {
        Self::new(config.layout.clone(), config.fonts.clone())
    }

    /// Decode `background_path` and compose onto it.
    pub fn compose_file(
        &self,
        background_path: &Path,
        caption: &str,
        watermark: &str,
    ) -> HookreelResult<ComposedFrame> {
        let background = image_loader::load_image(background_path)?;
        self.compose(background, caption, watermark)
    }

    /// Compose caption and watermark onto `background`. The result has the
    /// background's dimensions.
    pub fn compose(
        &self,
        background: FrameBuffer,
        caption: &str,
        watermark: &str,
    ) -> HookreelResult<ComposedFrame> {
        let (width, height) = background.dimensions();
        if width == 0 || height == 0 {
            return Err(HookreelError::composition(
                CompositionStep::Decode,
                format!("background has no pixels ({}x{})", width, height),
            ));
        }
        let (frame_w, frame_h) = (width as f32, height as f32);

        let mut overlay = FrameBuffer::new(width, height);

        // Caption: wrapped, shadow pass first so the foreground lands on top.
        let caption_font = self.resolve_font(
            &self.fonts.caption,
            height,
            self.layout.caption_size_ratio,
        )?;
        let caption_block = text::layout(
            caption,
            &caption_font,
            frame_w * self.layout.caption_width_ratio,
        );
        let caption_x = center_horizontally(caption_block.width, frame_w);
        let caption_y = frame_h * self.layout.caption_anchor_ratio;
        let offset = self.layout.shadow_offset as f32;

        for (color, dx) in [(&self.colors.shadow, offset), (&self.colors.caption, 0.0)] {
            let pass = text::rasterize(&caption_block.text, &caption_font, color);
            draw_at(&mut overlay, &pass, caption_x + dx, caption_y + dx);
        }

        // Watermark: one line, no shadow.
        let watermark_font = self.resolve_font(
            &self.fonts.watermark,
            height,
            self.layout.watermark_size_ratio,
        )?;
        let watermark_block = text::measure(watermark, &watermark_font);
        let watermark_x = center_horizontally(watermark_block.width, frame_w);
        let watermark_y = frame_h * self.layout.watermark_anchor_ratio;
        let mark = text::rasterize(watermark, &watermark_font, &self.colors.watermark);
        draw_at(&mut overlay, &mark, watermark_x, watermark_y);

        let mut frame = background;
        frame.composite_over(&overlay, 0, 0);

        tracing::info!(
            "composed {}x{} frame: caption {} line(s) at {:.0},{:.0}, watermark at {:.0},{:.0}",
            width,
            height,
            caption_block.line_count(),
            caption_x,
            caption_y,
            watermark_x,
            watermark_y
        );

        Ok(ComposedFrame {
            frame,
            layout: FrameLayout {
                caption: placement(caption_block, caption_x, caption_y, &caption_font),
                watermark: placement(watermark_block, watermark_x, watermark_y, &watermark_font),
            },
        })
    }

    fn resolve_font(
        &self,
        candidates: &hookreel_core::FontCandidates,
        frame_height: u32,
        ratio: f32,
    ) -> HookreelResult<LoadedFont> {
        let spec = FontSpec::relative_to_height(candidates.clone(), frame_height, ratio);
        let font = self.resolver.resolve(&spec)?;
        tracing::debug!("using font {} at {}px", font.source().display(), font.px());
        Ok(font)
    }
}

fn draw_at(overlay: &mut FrameBuffer, text: &RasterizedText, x: f32, y: f32) {
    overlay.composite_over(
        &text.buffer,
        x.round() as i32 - text.pad,
        y.round() as i32 - text.pad,
    );
}

fn placement(block: text::LayoutResult, x: f32, y: f32, font: &LoadedFont) -> TextPlacement {
    TextPlacement {
        text: block.text,
        x,
        y,
        width: block.width,
        height: block.height,
        font_px: font.px(),
        font_source: font.source().to_path_buf(),
    }
}
