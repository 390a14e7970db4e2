//! Text layout: greedy word wrapping against a pixel budget, block
//! measurement, horizontal centering and rasterization.
//!
//! Wrapping only needs advance widths, so it is written against the
//! [`GlyphMetrics`] trait rather than a concrete font.

use hookreel_core::frame::FrameBuffer;
use hookreel_core::Color;

use crate::font::LoadedFont;

/// Glyph measurements needed for layout.
pub trait GlyphMetrics {
    /// Rendered advance width of a single line of text, in pixels.
    fn advance_width(&self, text: &str) -> f32;
    /// Distance between consecutive baselines, in pixels.
    fn line_height(&self) -> f32;
}

/// A wrapped string and the size of the block it occupies.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResult {
    pub text: String,
    pub width: f32,
    pub height: f32,
}

impl LayoutResult {
    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }
}

/// Wrap `text` so no line is wider than `max_width`.
///
/// Every `\n` is a hard break and each segment is wrapped on its own. Words
/// are separated by ASCII whitespace and packed greedily, so a no-break space
/// keeps its neighbours together; a word that is wider than
/// `max_width` by itself still gets a line of its own.
pub fn wrap<M: GlyphMetrics + ?Sized>(text: &str, metrics: &M, max_width: f32) -> String {
    let mut lines: Vec<String> = Vec::new();

    for segment in text.split('\n') {
        let mut current = String::new();
        for word in segment.split_ascii_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{} {}", current, word);
            if metrics.advance_width(&candidate) <= max_width {
                current = candidate;
            } else {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            }
        }
        lines.push(current);
    }

    lines.join("\n")
}

/// Measure an already wrapped block: widest line by line count.
pub fn measure<M: GlyphMetrics + ?Sized>(text: &str, metrics: &M) -> LayoutResult {
    let lines: Vec<&str> = text.split('\n').collect();
    let width = lines
        .iter()
        .map(|line| metrics.advance_width(line))
        .fold(0.0_f32, f32::max);
    LayoutResult {
        text: text.to_string(),
        width,
        height: metrics.line_height() * lines.len() as f32,
    }
}

/// Wrap and measure in one go.
pub fn layout<M: GlyphMetrics + ?Sized>(text: &str, metrics: &M, max_width: f32) -> LayoutResult {
    measure(&wrap(text, metrics, max_width), metrics)
}

/// Left offset that centers a block of `measured_width` in `frame_width`.
/// Negative when the block is wider than the frame.
pub fn center_horizontally(measured_width: f32, frame_width: f32) -> f32 {
    (frame_width - measured_width) / 2.0
}

/// Text drawn into its own transparent buffer.
///
/// The buffer is padded so glyph overhang is not clipped; `(pad, pad)` in
/// the buffer is the top-left corner of the measured block.
#[derive(Debug, Clone)]
pub struct RasterizedText {
    pub buffer: FrameBuffer,
    pub pad: i32,
}

/// Draw a wrapped block with every line centered inside the block.
pub fn rasterize(text: &str, font: &LoadedFont, color: &Color) -> RasterizedText {
    let block = measure(text, font);
    let pad = (font.px() / 4.0).ceil() as i32;
    let width = block.width.ceil() as i32 + 2 * pad;
    let height = block.height.ceil() as i32 + 2 * pad;

    let mut buffer = FrameBuffer::new(width.max(1) as u32, height.max(1) as u32);
    if text.trim().is_empty() {
        return RasterizedText { buffer, pad };
    }

    let line_height = font.line_height();
    let ascent = font.ascent();
    for (i, line) in text.split('\n').enumerate() {
        let line_width = font.advance_width(line);
        let x = pad as f32 + (block.width - line_width) / 2.0;
        let baseline = pad as f32 + i as f32 * line_height + ascent;
        draw_line(&mut buffer, font, line, color, x, baseline);
    }

    RasterizedText { buffer, pad }
}

fn draw_line(
    fb: &mut FrameBuffer,
    font: &LoadedFont,
    text: &str,
    color: &Color,
    x: f32,
    baseline: f32,
) {
    let [r, g, b, a] = color.to_rgba8();
    let mut cursor_x = x;

    for ch in text.chars() {
        let (metrics, bitmap) = font.font().rasterize(ch, font.px());
        let glyph_x = cursor_x.round() as i32 + metrics.xmin;
        let glyph_y = baseline.round() as i32 - (metrics.height as i32 + metrics.ymin);

        for gy in 0..metrics.height {
            for gx in 0..metrics.width {
                let coverage = bitmap[gy * metrics.width + gx];
                if coverage == 0 {
                    continue;
                }
                let px = glyph_x + gx as i32;
                let py = glyph_y + gy as i32;
                if px < 0 || py < 0 {
                    continue;
                }
                let alpha = ((coverage as u32 * a as u32 + 127) / 255) as u8;
                // Neighbouring glyphs may overlap by a pixel; keep the stronger coverage.
                let existing = fb.get_pixel(px as u32, py as u32).map_or(0, |p| p[3]);
                if alpha > existing {
                    fb.set_pixel(px as u32, py as u32, [r, g, b, alpha]);
                }
            }
        }

        cursor_x += metrics.advance_width;
    }
}
