use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Color, HookreelError, HookreelResult};

/// Language model endpoint settings. The API key itself never lives in the
/// config file, only the name of the environment variable holding it.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    pub base_url: String,
    pub model: String,
    pub api_key_env: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
        }
    }
}

/// A preferred font and the fallback used when it cannot be loaded.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct FontCandidates {
    pub preferred: PathBuf,
    pub fallback: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FontsConfig {
    /// Bold face for the caption.
    pub caption: FontCandidates,
    /// Regular face for the watermark.
    pub watermark: FontCandidates,
    /// Directories searched for relative font paths.
    pub search_dirs: Vec<PathBuf>,
}

impl Default for FontsConfig {
    fn default() -> Self {
        Self {
            caption: FontCandidates {
                preferred: PathBuf::from("arialbd.ttf"),
                fallback: PathBuf::from("DejaVuSans-Bold.ttf"),
            },
            watermark: FontCandidates {
                preferred: PathBuf::from("arial.ttf"),
                fallback: PathBuf::from("DejaVuSans.ttf"),
            },
            search_dirs: vec![
                PathBuf::from("/usr/share/fonts/truetype/msttcorefonts"),
                PathBuf::from("/usr/share/fonts/truetype/dejavu"),
                PathBuf::from("/usr/share/fonts/TTF"),
                PathBuf::from("/Library/Fonts"),
                PathBuf::from("/System/Library/Fonts/Supplemental"),
                PathBuf::from("C:\\Windows\\Fonts"),
            ],
        }
    }
}

/// Placement of the caption and watermark, expressed as fractions of the
/// frame so the same settings work for any background size.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub caption_size_ratio: f32,
    pub caption_width_ratio: f32,
    pub caption_anchor_ratio: f32,
    pub watermark_size_ratio: f32,
    pub watermark_anchor_ratio: f32,
    /// Shadow offset in pixels, applied on both axes.
    pub shadow_offset: i32,
    pub caption_color: String,
    pub shadow_color: String,
    pub watermark_color: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            caption_size_ratio: 0.045,
            caption_width_ratio: 0.9,
            caption_anchor_ratio: 0.1,
            watermark_size_ratio: 0.025,
            watermark_anchor_ratio: 0.9,
            shadow_offset: 2,
            caption_color: "#FFFFFF".to_string(),
            shadow_color: "#000000B4".to_string(),
            watermark_color: "#FFFFFFB4".to_string(),
        }
    }
}

/// The three layout colors, parsed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutColors {
    pub caption: Color,
    pub shadow: Color,
    pub watermark: Color,
}

impl LayoutConfig {
    /// Parse the hex colors and check every ratio lies in (0, 1].
    pub fn validate(&self) -> HookreelResult<LayoutColors> {
        let ratios = [
            ("caption_size_ratio", self.caption_size_ratio),
            ("caption_width_ratio", self.caption_width_ratio),
            ("caption_anchor_ratio", self.caption_anchor_ratio),
            ("watermark_size_ratio", self.watermark_size_ratio),
            ("watermark_anchor_ratio", self.watermark_anchor_ratio),
        ];
        for (name, value) in ratios {
            if !(value > 0.0 && value <= 1.0) {
                return Err(HookreelError::Config(format!(
                    "layout.{} must be in (0, 1], got {}",
                    name, value
                )));
            }
        }

        let parse = |name: &str, hex: &str| {
            Color::from_hex(hex).map_err(|e| {
                HookreelError::Config(format!("layout.{} '{}': {}", name, hex, e))
            })
        };
        Ok(LayoutColors {
            caption: parse("caption_color", &self.caption_color)?,
            shadow: parse("shadow_color", &self.shadow_color)?,
            watermark: parse("watermark_color", &self.watermark_color)?,
        })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EncodeConfig {
    pub ffmpeg_path: PathBuf,
    pub codec: String,
    pub pixel_format: String,
    pub preset: String,
    pub crf: u8,
    /// Where the intermediate still image is written. System temp dir if unset.
    pub work_dir: Option<PathBuf>,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            codec: "libx264".to_string(),
            pixel_format: "yuv420p".to_string(),
            preset: "medium".to_string(),
            crf: 23,
            work_dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct HookreelConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub fonts: FontsConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub encode: EncodeConfig,
}

impl HookreelConfig {
    /// Name of the config file picked up from the working directory.
    pub const DEFAULT_FILE: &'static str = "hookreel.toml";

    pub fn load_from_file(path: &Path) -> HookreelResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
            .map_err(|e| HookreelError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml_str(contents: &str) -> HookreelResult<Self> {
        let config: HookreelConfig =
            toml::from_str(contents).map_err(|e| HookreelError::Config(e.to_string()))?;
        config.layout.validate()?;
        Ok(config)
    }
}
