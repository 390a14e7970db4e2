//! # hookreel-render
//!
//! Turns a background image plus caption and watermark text into a single
//! composed frame. Text is wrapped and measured with fontdue glyph metrics,
//! drawn onto a transparent overlay and flattened onto the background.

pub mod compositor;
pub mod font;
pub mod image_loader;
pub mod text;

pub use compositor::{ComposedFrame, FrameComposer, FrameLayout, TextPlacement};
pub use font::{FontResolver, FontSpec, LoadedFont, BUILTIN_FONT_SOURCE};
pub use text::{center_horizontally, layout, measure, wrap, GlyphMetrics, LayoutResult};
