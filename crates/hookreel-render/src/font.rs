//! Font resolution.
//!
//! A [`FontSpec`] names two candidate files. The preferred one is tried
//! first; if it is missing or unparsable the fallback is used instead and a
//! warning is logged. When both fail the embedded DejaVu Sans face is used,
//! so resolution degrades glyph fidelity but never stops a render.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use fontdue::{Font, FontSettings};
use hookreel_core::{CompositionStep, FontCandidates, HookreelError, HookreelResult};

use crate::text::GlyphMetrics;

/// Reported as [`LoadedFont::source`] for the embedded face.
pub const BUILTIN_FONT_SOURCE: &str = "builtin:DejaVuSans.ttf";

static BUILTIN_FONT: OnceLock<Result<Font, &'static str>> = OnceLock::new();

fn builtin_font() -> HookreelResult<Font> {
    BUILTIN_FONT
        .get_or_init(|| {
            Font::from_bytes(
                include_bytes!("../assets/DejaVuSans.ttf") as &[u8],
                FontSettings::default(),
            )
        })
        .clone()
        .map_err(|e| {
            HookreelError::composition(
                CompositionStep::Font,
                format!("embedded font is unusable: {}", e),
            )
        })
}

/// A font request: which files to try and at what pixel size.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub candidates: FontCandidates,
    pub px: f32,
}

impl FontSpec {
    pub fn new(candidates: FontCandidates, px: f32) -> Self {
        Self { candidates, px }
    }

    /// Size the font as a fraction of the frame height, truncated to whole
    /// pixels and never below 1.
    pub fn relative_to_height(candidates: FontCandidates, frame_height: u32, ratio: f32) -> Self {
        let px = (frame_height as f32 * ratio).floor().max(1.0);
        Self::new(candidates, px)
    }
}

/// A parsed font bound to a pixel size.
pub struct LoadedFont {
    font: Font,
    px: f32,
    source: PathBuf,
}

impl LoadedFont {
    /// Load a font from a file path.
    pub fn from_file(path: &Path, px: f32) -> HookreelResult<Self> {
        let data = std::fs::read(path).map_err(|e| {
            HookreelError::composition(
                CompositionStep::Font,
                format!("failed to read font file {}: {}", path.display(), e),
            )
        })?;
        let font = Font::from_bytes(data, FontSettings::default()).map_err(|e| {
            HookreelError::composition(
                CompositionStep::Font,
                format!("failed to parse font {}: {}", path.display(), e),
            )
        })?;
        Ok(Self {
            font,
            px,
            source: path.to_path_buf(),
        })
    }

    /// The embedded face, always available.
    pub fn builtin(px: f32) -> HookreelResult<Self> {
        Ok(Self {
            font: builtin_font()?,
            px,
            source: PathBuf::from(BUILTIN_FONT_SOURCE),
        })
    }

    pub fn is_builtin(&self) -> bool {
        self.source == Path::new(BUILTIN_FONT_SOURCE)
    }

    pub fn px(&self) -> f32 {
        self.px
    }

    /// The file this font was loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub(crate) fn font(&self) -> &Font {
        &self.font
    }

    /// Distance from the top of a line box to the baseline.
    pub fn ascent(&self) -> f32 {
        self.font
            .horizontal_line_metrics(self.px)
            .map(|m| m.ascent)
            .unwrap_or(self.px * 0.8)
    }
}

impl std::fmt::Debug for LoadedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedFont")
            .field("source", &self.source)
            .field("px", &self.px)
            .finish()
    }
}

impl GlyphMetrics for LoadedFont {
    fn advance_width(&self, text: &str) -> f32 {
        text.chars()
            .map(|ch| self.font.metrics(ch, self.px).advance_width)
            .sum()
    }

    fn line_height(&self) -> f32 {
        self.font
            .horizontal_line_metrics(self.px)
            .map(|m| m.new_line_size)
            .unwrap_or(self.px * 1.2)
    }
}

/// Locates font files and applies the preferred → fallback order.
#[derive(Debug, Clone, Default)]
pub struct FontResolver {
    search_dirs: Vec<PathBuf>,
}

impl FontResolver {
    pub fn new(search_dirs: Vec<PathBuf>) -> Self {
        Self { search_dirs }
    }

    /// Find a font file. Paths that exist as given win; otherwise relative
    /// paths are looked up in each search directory in order.
    pub fn locate(&self, path: &Path) -> Option<PathBuf> {
        if path.is_file() {
            return Some(path.to_path_buf());
        }
        if path.is_absolute() {
            return None;
        }
        self.search_dirs
            .iter()
            .map(|dir| dir.join(path))
            .find(|candidate| candidate.is_file())
    }

    fn load(&self, path: &Path, px: f32) -> HookreelResult<LoadedFont> {
        let located = self.locate(path).ok_or_else(|| {
            HookreelError::composition(
                CompositionStep::Font,
                format!("font file {} not found", path.display()),
            )
        })?;
        LoadedFont::from_file(&located, px)
    }

    /// Load the preferred font, then the fallback, then the embedded face.
    pub fn resolve(&self, spec: &FontSpec) -> HookreelResult<LoadedFont> {
        let FontCandidates {
            preferred,
            fallback,
        } = &spec.candidates;

        let preferred_err = match self.load(preferred, spec.px) {
            Ok(font) => return Ok(font),
            Err(e) => e,
        };
        tracing::warn!(
            "preferred font {} unavailable ({}), falling back to {}",
            preferred.display(),
            preferred_err,
            fallback.display()
        );

        let fallback_err = match self.load(fallback, spec.px) {
            Ok(font) => return Ok(font),
            Err(e) => e,
        };
        tracing::warn!(
            "fallback font {} unavailable ({}), using the built-in face",
            fallback.display(),
            fallback_err
        );
        LoadedFont::builtin(spec.px)
    }
}
