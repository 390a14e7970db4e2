//! Image loading module.
//! Decodes PNG, JPEG and the other formats `image` supports into FrameBuffers
//! and writes composed frames back out as PNG.

use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use hookreel_core::frame::FrameBuffer;
use hookreel_core::{CompositionStep, HookreelError, HookreelResult};
use image::{ImageFormat, RgbaImage};
use tempfile::TempPath;

/// Load an image file and convert it to an RGBA FrameBuffer.
pub fn load_image(path: &Path) -> HookreelResult<FrameBuffer> {
    let img = image::open(path).map_err(|e| {
        HookreelError::composition(
            CompositionStep::Decode,
            format!("failed to load image '{}': {}", path.display(), e),
        )
    })?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    FrameBuffer::from_rgba8(width, height, rgba.into_raw()).ok_or_else(|| {
        HookreelError::composition(
            CompositionStep::Decode,
            format!("decoded '{}' has an inconsistent pixel buffer", path.display()),
        )
    })
}

fn to_rgba_image(fb: &FrameBuffer) -> HookreelResult<RgbaImage> {
    RgbaImage::from_raw(fb.width, fb.height, fb.data.clone()).ok_or_else(|| {
        HookreelError::composition(
            CompositionStep::Materialize,
            format!(
                "frame buffer holds {} bytes, expected {} for {}x{}",
                fb.data.len(),
                fb.pixel_count() * 4,
                fb.width,
                fb.height
            ),
        )
    })
}

/// Encode a FrameBuffer as PNG into any writer.
pub fn write_png<W: Write + Seek>(fb: &FrameBuffer, writer: &mut W) -> HookreelResult<()> {
    to_rgba_image(fb)?
        .write_to(writer, ImageFormat::Png)
        .map_err(|e| {
            HookreelError::composition(
                CompositionStep::Materialize,
                format!("failed to encode PNG: {}", e),
            )
        })
}

/// Save a FrameBuffer as a PNG file.
pub fn save_png(fb: &FrameBuffer, path: &Path) -> HookreelResult<()> {
    to_rgba_image(fb)?
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| {
            HookreelError::composition(
                CompositionStep::Materialize,
                format!("failed to write '{}': {}", path.display(), e),
            )
        })
}

/// Write `fb` to a fresh temporary PNG in `dir` (or the system temp dir).
///
/// The file lives exactly as long as the returned [`TempPath`]; if writing
/// fails the partial file is removed before the error is returned.
pub fn materialize_png(fb: &FrameBuffer, dir: Option<&Path>) -> HookreelResult<TempPath> {
    let io_err = |e: std::io::Error| {
        HookreelError::composition(
            CompositionStep::Materialize,
            format!("failed to write temporary still image: {}", e),
        )
    };

    let mut builder = tempfile::Builder::new();
    builder.prefix("hookreel-still-").suffix(".png");
    let mut file = match dir {
        Some(dir) => builder.tempfile_in(dir),
        None => builder.tempfile(),
    }
    .map_err(io_err)?;

    {
        let mut writer = BufWriter::new(file.as_file_mut());
        write_png(fb, &mut writer)?;
        writer.flush().map_err(io_err)?;
    }

    let path = file.into_temp_path();
    tracing::debug!("materialized still image at {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookreel_core::Color;

    #[test]
    fn test_load_image_missing_file() {
        let result = load_image(Path::new("/nonexistent/image.png"));
        assert!(matches!(
            result,
            Err(HookreelError::Composition {
                step: CompositionStep::Decode,
                ..
            })
        ));
    }

    #[test]
    fn test_load_garbage_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.jpg");
        std::fs::write(&path, b"not an image at all").unwrap();
        assert!(load_image(&path).is_err());
    }

    #[test]
    fn test_png_save_then_load_keeps_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let mut fb = FrameBuffer::solid(3, 2, &Color::BLUE);
        fb.set_pixel(2, 1, [10, 20, 30, 255]);

        save_png(&fb, &path).unwrap();
        let loaded = load_image(&path).unwrap();
        assert_eq!(loaded, fb);
    }

    #[test]
    fn test_materialize_writes_png_and_cleans_up_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let fb = FrameBuffer::solid(4, 6, &Color::RED);

        let path = materialize_png(&fb, Some(dir.path())).unwrap();
        assert_eq!(load_image(&path).unwrap(), fb);

        let kept = path.to_path_buf();
        drop(path);
        assert!(!kept.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_materialize_into_missing_dir_fails() {
        let fb = FrameBuffer::solid(2, 2, &Color::RED);
        let err = materialize_png(&fb, Some(Path::new("/nonexistent/dir"))).unwrap_err();
        assert!(matches!(
            err,
            HookreelError::Composition {
                step: CompositionStep::Materialize,
                ..
            }
        ));
    }

    #[test]
    fn test_write_png_rejects_inconsistent_buffer() {
        let fb = FrameBuffer {
            data: vec![0; 5],
            width: 2,
            height: 2,
        };
        let mut out = std::io::Cursor::new(Vec::new());
        assert!(write_png(&fb, &mut out).is_err());
    }
}
