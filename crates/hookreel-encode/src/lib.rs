//! # hookreel-encode
//!
//! Encoding module: turns one composed frame into a fixed-duration video.
//! Shells out to FFmpeg (H.264, yuv420p, mp4 by default).

pub mod ffmpeg;

pub use ffmpeg::{even_dimensions, FfmpegEncoder, VideoArtifact};
