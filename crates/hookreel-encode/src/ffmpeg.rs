use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use hookreel_core::frame::FrameBuffer;
use hookreel_core::{EncodeConfig, HookreelError, HookreelResult};
use hookreel_render::image_loader;

/// A finished video file. The caller owns it from here on.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoArtifact {
    pub path: PathBuf,
    /// Encoded width; the frame width rounded up to even.
    pub width: u32,
    /// Encoded height; the frame height rounded up to even.
    pub height: u32,
    pub duration_secs: f64,
}

impl VideoArtifact {
    pub fn read(&self) -> HookreelResult<Vec<u8>> {
        Ok(std::fs::read(&self.path)?)
    }

    /// Delete the file once the caller is done with it.
    pub fn remove(self) -> HookreelResult<()> {
        std::fs::remove_file(&self.path)?;
        Ok(())
    }
}

/// yuv420p subsamples chroma 2x2, so both dimensions must be even. Odd
/// dimensions are padded by one pixel rather than cropped or scaled.
pub fn even_dimensions(width: u32, height: u32) -> (u32, u32) {
    (width + (width & 1), height + (height & 1))
}

/// Encoder that shells out to FFmpeg to loop a single still image.
#[derive(Debug, Clone, Default)]
pub struct FfmpegEncoder {
    config: EncodeConfig,
}

impl FfmpegEncoder {
    pub fn new(config: EncodeConfig) -> Self {
        Self { config }
    }

    /// Check if the configured FFmpeg binary can be run.
    pub fn is_available(&self) -> bool {
        Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// FFmpeg arguments for looping `still` for `duration_secs` into `output`.
    pub fn build_args(
        &self,
        still: &Path,
        width: u32,
        height: u32,
        duration_secs: f64,
        output: &Path,
    ) -> Vec<OsString> {
        let (even_w, even_h) = even_dimensions(width, height);
        let filter = format!("scale={}:{},pad={}:{}:0:0", width, height, even_w, even_h);

        let mut args: Vec<OsString> = ["-y", "-hide_banner", "-loglevel", "error"]
            .into_iter()
            .map(OsString::from)
            .collect();

        // Input: the still, looped for exactly the requested duration.
        args.extend(["-loop", "1", "-t"].map(OsString::from));
        args.push(duration_secs.to_string().into());
        args.push("-i".into());
        args.push(still.as_os_str().to_owned());

        let mut opts = vec![
            "-vf".to_string(),
            filter,
            "-c:v".to_string(),
            self.config.codec.clone(),
            "-pix_fmt".to_string(),
            self.config.pixel_format.clone(),
        ];
        if !self.config.preset.is_empty() {
            opts.extend(["-preset".to_string(), self.config.preset.clone()]);
        }
        opts.extend(["-crf".to_string(), self.config.crf.to_string(), "-an".to_string()]);
        if matches!(container_extension(output).as_str(), "mp4" | "mov" | "m4v") {
            opts.extend(["-movflags".to_string(), "+faststart".to_string()]);
        }
        args.extend(opts.into_iter().map(OsString::from));

        args.push(output.as_os_str().to_owned());
        args
    }

    /// Encode `frame` as a video of exactly `duration_secs` at `output_path`.
    ///
    /// The intermediate still image is removed on every path. FFmpeg writes
    /// into a temporary file beside `output_path` that is only renamed into
    /// place once encoding succeeded, so a failed run leaves no output.
    /// Output directories created for this call are removed again on failure.
    pub fn encode(
        &self,
        frame: &FrameBuffer,
        duration_secs: f64,
        output_path: &Path,
    ) -> HookreelResult<VideoArtifact> {
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return Err(HookreelError::InvalidArgument(format!(
                "duration must be a positive number of seconds, got {}",
                duration_secs
            )));
        }
        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            return Err(HookreelError::InvalidArgument(format!(
                "cannot encode an empty {}x{} frame",
                width, height
            )));
        }

        let out_dir = match output_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let created = create_missing_dirs(&out_dir)?;

        let result = self.encode_into(frame, duration_secs, &out_dir, output_path);
        if result.is_err() {
            // Deepest first; remove_dir refuses anything that is not empty.
            for dir in &created {
                if let Err(e) = std::fs::remove_dir(dir) {
                    tracing::warn!("failed to remove directory {}: {}", dir.display(), e);
                }
            }
        }
        result
    }

    fn encode_into(
        &self,
        frame: &FrameBuffer,
        duration_secs: f64,
        out_dir: &Path,
        output_path: &Path,
    ) -> HookreelResult<VideoArtifact> {
        let (width, height) = frame.dimensions();
        let still = image_loader::materialize_png(frame, self.config.work_dir.as_deref())?;

        let partial = tempfile::Builder::new()
            .prefix(".hookreel-partial-")
            .suffix(&format!(".{}", container_extension(output_path)))
            .tempfile_in(out_dir)?
            .into_temp_path();

        let args = self.build_args(&still, width, height, duration_secs, &partial);
        tracing::debug!(
            "running {} {}",
            self.config.ffmpeg_path.display(),
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let output = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                HookreelError::Encode(format!(
                    "failed to start {}: {}. Install FFmpeg: https://ffmpeg.org/download.html",
                    self.config.ffmpeg_path.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HookreelError::Encode(format!(
                "ffmpeg failed with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        partial.persist(output_path).map_err(|e| {
            HookreelError::Encode(format!(
                "failed to move encoded video to {}: {}",
                output_path.display(),
                e.error
            ))
        })?;

        if let Err(e) = still.close() {
            tracing::warn!("failed to remove temporary still image: {}", e);
        }

        let (even_w, even_h) = even_dimensions(width, height);
        tracing::info!(
            "Encoded {}s video to {} ({}x{})",
            duration_secs,
            output_path.display(),
            even_w,
            even_h
        );

        Ok(VideoArtifact {
            path: output_path.to_path_buf(),
            width: even_w,
            height: even_h,
            duration_secs,
        })
    }
}

/// Create `dir` and every missing ancestor. Returns the directories that
/// did not exist before, deepest first.
fn create_missing_dirs(dir: &Path) -> HookreelResult<Vec<PathBuf>> {
    let missing: Vec<PathBuf> = dir
        .ancestors()
        .take_while(|d| !d.as_os_str().is_empty() && !d.exists())
        .map(Path::to_path_buf)
        .collect();
    std::fs::create_dir_all(dir)?;
    Ok(missing)
}

fn container_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_else(|| "mp4".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_as_strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn test_even_dimensions() {
        assert_eq!(even_dimensions(1080, 1920), (1080, 1920));
        assert_eq!(even_dimensions(1081, 1919), (1082, 1920));
        assert_eq!(even_dimensions(1, 1), (2, 2));
    }

    #[test]
    fn test_build_args_loops_still_for_duration() {
        let encoder = FfmpegEncoder::default();
        let args = args_as_strings(&encoder.build_args(
            Path::new("/tmp/still.png"),
            1080,
            1920,
            10.0,
            Path::new("out.mp4"),
        ));

        let joined = args.join(" ");
        assert!(joined.contains("-loop 1 -t 10 -i /tmp/still.png"), "{joined}");
        assert!(joined.contains("-vf scale=1080:1920,pad=1080:1920:0:0"), "{joined}");
        assert!(joined.contains("-c:v libx264"));
        assert!(joined.contains("-pix_fmt yuv420p"));
        assert!(joined.contains("-movflags +faststart"));
        assert!(args.contains(&"-an".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("out.mp4"));
    }

    #[test]
    fn test_build_args_pads_odd_frames() {
        let encoder = FfmpegEncoder::default();
        let args = args_as_strings(&encoder.build_args(
            Path::new("s.png"),
            333,
            555,
            7.5,
            Path::new("o.mp4"),
        ));
        assert!(args.contains(&"scale=333:555,pad=334:556:0:0".to_string()));
        assert!(args.contains(&"7.5".to_string()));
    }

    #[test]
    fn test_build_args_respects_config() {
        let encoder = FfmpegEncoder::new(EncodeConfig {
            codec: "libx265".to_string(),
            preset: String::new(),
            crf: 28,
            ..EncodeConfig::default()
        });
        let args = args_as_strings(&encoder.build_args(
            Path::new("s.png"),
            64,
            64,
            5.0,
            Path::new("o.mkv"),
        ));
        assert!(args.contains(&"libx265".to_string()));
        assert!(args.contains(&"28".to_string()));
        assert!(!args.contains(&"-preset".to_string()));
        assert!(!args.contains(&"-movflags".to_string()));
    }

    #[test]
    fn test_rejects_non_positive_duration() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.mp4");
        let frame = FrameBuffer::new(4, 4);
        let encoder = FfmpegEncoder::default();
        for duration in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            let err = encoder.encode(&frame, duration, &out).unwrap_err();
            assert!(matches!(err, HookreelError::InvalidArgument(_)));
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_rejects_empty_frame() {
        let encoder = FfmpegEncoder::default();
        let result = encoder.encode(&FrameBuffer::new(0, 0), 10.0, Path::new("/tmp/x.mp4"));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_binary_is_reported_and_cleaned_up() {
        let work = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let encoder = FfmpegEncoder::new(EncodeConfig {
            ffmpeg_path: PathBuf::from("/nonexistent/ffmpeg"),
            work_dir: Some(work.path().to_path_buf()),
            ..EncodeConfig::default()
        });
        assert!(!encoder.is_available());

        let out = out_dir.path().join("video.mp4");
        let err = encoder.encode(&FrameBuffer::new(8, 8), 5.0, &out).unwrap_err();
        assert!(matches!(err, HookreelError::Encode(_)));
        assert!(!out.exists());
        assert_eq!(std::fs::read_dir(work.path()).unwrap().count(), 0);
        assert_eq!(std::fs::read_dir(out_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_failed_encode_removes_directories_it_created() {
        let root = tempfile::tempdir().unwrap();
        let encoder = FfmpegEncoder::new(EncodeConfig {
            ffmpeg_path: PathBuf::from("/nonexistent/ffmpeg"),
            work_dir: Some(root.path().to_path_buf()),
            ..EncodeConfig::default()
        });

        let existing = root.path().join("existing");
        std::fs::create_dir(&existing).unwrap();
        let out = existing.join("new/deeper/video.mp4");
        assert!(encoder.encode(&FrameBuffer::new(8, 8), 5.0, &out).is_err());

        assert!(!existing.join("new").exists());
        assert!(existing.is_dir());
    }

    #[test]
    fn test_create_missing_dirs_reports_deepest_first() {
        let root = tempfile::tempdir().unwrap();
        let target = root.path().join("a/b");
        let created = create_missing_dirs(&target).unwrap();
        assert_eq!(created, vec![target.clone(), root.path().join("a")]);
        assert!(target.is_dir());
        assert!(create_missing_dirs(&target).unwrap().is_empty());
    }

    #[test]
    fn test_artifact_remove() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("v.mp4");
        std::fs::write(&path, b"data").unwrap();
        let artifact = VideoArtifact {
            path: path.clone(),
            width: 2,
            height: 2,
            duration_secs: 1.0,
        };
        assert_eq!(artifact.read().unwrap(), b"data");
        artifact.remove().unwrap();
        assert!(!path.exists());
    }
}
