//! SVG rasterization to the grayscale PNG the Kindle displays.
//!
//! The panels only show true 8-bit grayscale; RGB or palette PNGs come out
//! distorted, so every export goes through a single luma channel.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ColorType, DynamicImage, ImageEncoder, RgbaImage};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

use weather_common::{DisplayError, DisplayResult};

/// Renders substituted SVG documents to PNG files.
pub struct RasterExporter {
    fontdb: Arc<usvg::fontdb::Database>,
}

impl Default for RasterExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl RasterExporter {
    /// Create an exporter with the system fonts loaded.
    pub fn new() -> Self {
        let mut fontdb = usvg::fontdb::Database::new();
        fontdb.load_system_fonts();
        debug!(faces = fontdb.len(), "Loaded system fonts");
        Self {
            fontdb: Arc::new(fontdb),
        }
    }

    /// Rasterize `svg` onto a white canvas of its intrinsic size and encode
    /// it as an 8-bit grayscale PNG.
    ///
    /// Relative image references resolve against `resources_dir`.
    pub fn rasterize(&self, svg: &str, resources_dir: Option<&Path>) -> DisplayResult<Vec<u8>> {
        let options = usvg::Options {
            resources_dir: resources_dir.map(Path::to_path_buf),
            fontdb: Arc::clone(&self.fontdb),
            ..usvg::Options::default()
        };

        let tree = usvg::Tree::from_str(svg, &options)
            .map_err(|e| DisplayError::Render(format!("Invalid SVG: {}", e)))?;

        let size = tree.size().to_int_size();
        let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height()).ok_or_else(|| {
            DisplayError::Render(format!("Invalid canvas size {}x{}", size.width(), size.height()))
        })?;
        pixmap.fill(tiny_skia::Color::WHITE);

        resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());

        // The canvas is opaque, so premultiplied and straight alpha agree
        let rgba = RgbaImage::from_raw(size.width(), size.height(), pixmap.take())
            .ok_or_else(|| DisplayError::Render("Pixmap buffer size mismatch".to_string()))?;
        let luma = DynamicImage::ImageRgba8(rgba).into_luma8();

        let mut png = Vec::new();
        PngEncoder::new_with_quality(&mut png, CompressionType::Best, FilterType::Adaptive)
            .write_image(luma.as_raw(), luma.width(), luma.height(), ColorType::L8)
            .map_err(|e| DisplayError::Render(format!("PNG encoding failed: {}", e)))?;

        Ok(png)
    }

    /// Rasterize `svg` and atomically replace `dest` with the result.
    #[instrument(skip(self, svg), fields(dest = %dest.display()))]
    pub fn export(&self, svg: &str, resources_dir: Option<&Path>, dest: &Path) -> DisplayResult<()> {
        let png = self.rasterize(svg, resources_dir)?;
        write_atomic(dest, &png)?;
        info!(bytes = png.len(), "Exported display image");
        Ok(())
    }
}

/// Write `bytes` to a temp file next to `dest`, then rename it over `dest`.
pub fn write_atomic(dest: &Path, bytes: &[u8]) -> DisplayResult<()> {
    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;

    let mut tmp = NamedTempFile::new_in(&dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(dest)
        .map_err(|e| DisplayError::Io(format!("{}: {}", dest.display(), e.error)))?;
    Ok(())
}

/// Output path for a room, `{dir}/{prefix}-{room lowercase}.png`.
pub fn output_path(dir: &Path, prefix: &str, room: &str) -> PathBuf {
    dir.join(format!("{}-{}.png", prefix, room.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(Path::new("/srv/kindle"), "weatherdata", "Wohnzimmer"),
            PathBuf::from("/srv/kindle/weatherdata-wohnzimmer.png")
        );
        assert_eq!(
            output_path(Path::new("out"), "weatherdata", "DG-Whz"),
            PathBuf::from("out/weatherdata-dg-whz.png")
        );
    }

    #[test]
    fn test_invalid_svg_is_render_error() {
        let exporter = RasterExporter::new();
        let err = exporter.rasterize("<svg><text>unterminated", None).unwrap_err();
        assert!(matches!(err, DisplayError::Render(_)));
    }
}
