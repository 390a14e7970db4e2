use std::path::Path;
use std::process::Command;

use hookreel_core::{Color, EncodeConfig, FrameBuffer, HookreelError};
use hookreel_encode::FfmpegEncoder;

/// Returns (duration_secs, width, height) of the first video stream.
fn probe(path: &Path) -> Option<(f64, u32, u32)> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "format=duration:stream=width,height",
            "-of",
            "json",
        ])
        .arg(path)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).ok()?;
    let duration = value["format"]["duration"].as_str()?.parse().ok()?;
    let stream = &value["streams"][0];
    Some((
        duration,
        stream["width"].as_u64()? as u32,
        stream["height"].as_u64()? as u32,
    ))
}

fn encoder_in(work: &Path) -> FfmpegEncoder {
    FfmpegEncoder::new(EncodeConfig {
        work_dir: Some(work.to_path_buf()),
        ..EncodeConfig::default()
    })
}

#[test]
fn test_portrait_frame_encodes_to_exact_duration() {
    let work = tempfile::tempdir().unwrap();
    let encoder = encoder_in(work.path());
    if !encoder.is_available() {
        eprintln!("skipping: ffmpeg not available");
        return;
    }

    let out = work.path().join("short.mp4");
    let frame = FrameBuffer::solid(1080, 1920, &Color::BLUE);
    let artifact = encoder.encode(&frame, 10.0, &out).unwrap();

    assert_eq!(artifact.path, out);
    assert_eq!((artifact.width, artifact.height), (1080, 1920));
    assert!(out.exists());

    // Only the finished video remains; the still and the partial file are gone.
    let entries: Vec<_> = std::fs::read_dir(work.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("short.mp4")]);

    if let Some((duration, width, height)) = probe(&out) {
        assert!((duration - 10.0).abs() < 0.1, "duration {duration}");
        assert_eq!((width, height), (1080, 1920));
        assert_eq!(width % 2, 0);
        assert_eq!(height % 2, 0);
    }
}

#[test]
fn test_odd_frame_is_padded_to_even() {
    let work = tempfile::tempdir().unwrap();
    let encoder = encoder_in(work.path());
    if !encoder.is_available() {
        eprintln!("skipping: ffmpeg not available");
        return;
    }

    let out = work.path().join("odd.mp4");
    let frame = FrameBuffer::solid(101, 57, &Color::RED);
    let artifact = encoder.encode(&frame, 1.0, &out).unwrap();
    assert_eq!((artifact.width, artifact.height), (102, 58));

    if let Some((_, width, height)) = probe(&out) {
        assert_eq!((width, height), (102, 58));
    }
}

#[test]
fn test_failed_encode_leaves_no_files() {
    let work = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let encoder = FfmpegEncoder::new(EncodeConfig {
        codec: "definitely-not-a-codec".to_string(),
        work_dir: Some(work.path().to_path_buf()),
        ..EncodeConfig::default()
    });

    let out = out_dir.path().join("broken.mp4");
    let frame = FrameBuffer::solid(64, 64, &Color::WHITE);
    let err = encoder.encode(&frame, 5.0, &out).unwrap_err();

    // Without ffmpeg on the host this fails at spawn time instead; the
    // cleanup guarantees are the same either way.
    assert!(matches!(err, HookreelError::Encode(_)), "{err}");
    assert!(!out.exists());
    assert_eq!(std::fs::read_dir(work.path()).unwrap().count(), 0);
    assert_eq!(std::fs::read_dir(out_dir.path()).unwrap().count(), 0);
}

#[test]
fn test_output_directory_is_created() {
    let work = tempfile::tempdir().unwrap();
    let encoder = encoder_in(work.path());
    if !encoder.is_available() {
        eprintln!("skipping: ffmpeg not available");
        return;
    }

    let out = work.path().join("nested/dir/clip.mp4");
    encoder
        .encode(&FrameBuffer::solid(32, 32, &Color::BLACK), 1.0, &out)
        .unwrap();
    assert!(out.exists());
}
