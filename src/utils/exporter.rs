use crate::canvas::canvas::Canvas;
use crate::canvas::surface::PixelSurface;
use crate::config::ExportSettings;
use crate::error::Result;
use crate::utils::profiler::ScopeTimer;
use chrono::Local;
use eframe::egui::Color32;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, RgbaImage};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
}

impl ExportFormat {
    /// Map a user-supplied token to a format. Unknown tokens fall back to PNG.
    pub fn from_token(token: &str) -> Self {
        match token.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => ExportFormat::Jpeg,
            "png" => ExportFormat::Png,
            other => {
                log::debug!("unknown export format {other:?}, using PNG");
                ExportFormat::default()
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Png => "PNG",
            ExportFormat::Jpeg => "JPEG",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
        }
    }

    pub fn all() -> &'static [ExportFormat] {
        &[ExportFormat::Png, ExportFormat::Jpeg]
    }
}

/// Composite all layers into a freshly allocated surface.
pub fn flatten(canvas: &Canvas) -> PixelSurface {
    let mut out = PixelSurface::new(canvas.width(), canvas.height(), Color32::TRANSPARENT);
    canvas.composite_to(&mut out);
    out
}

/// Convert a premultiplied surface into straight-alpha RGBA bytes.
pub fn to_rgba_image(surface: &PixelSurface) -> RgbaImage {
    let mut bytes = Vec::with_capacity(surface.width() * surface.height() * 4);
    for px in surface.pixels() {
        bytes.extend_from_slice(&px.to_srgba_unmultiplied());
    }
    RgbaImage::from_raw(surface.width() as u32, surface.height() as u32, bytes)
        .unwrap_or_else(|| RgbaImage::new(surface.width() as u32, surface.height() as u32))
}

/// Encode `surface` and write it to `path`, creating the parent directory.
pub fn save_surface(
    surface: &PixelSurface,
    path: &Path,
    format: ExportFormat,
    jpeg_quality: u8,
) -> Result<()> {
    let _timer = ScopeTimer::new("save_surface");

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let rgba = to_rgba_image(surface);
    let mut writer = BufWriter::new(File::create(path)?);
    match format {
        ExportFormat::Png => rgba.write_to(&mut writer, ImageFormat::Png)?,
        ExportFormat::Jpeg => {
            // JPEG has no alpha channel.
            let rgb = image::DynamicImage::ImageRgba8(rgba).to_rgb8();
            JpegEncoder::new_with_quality(&mut writer, jpeg_quality.clamp(1, 100))
                .encode_image(&rgb)?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Generate a filename based on the chrono template and current time.
pub fn generate_filename(template: &str, format: ExportFormat) -> String {
    let stamp = Local::now().format(template).to_string();
    format!("{}.{}", stamp, format.extension())
}

/// `dir/file_name`, or the first free `dir/<stem>_<n>.<ext>` when a file
/// with that name already exists.
pub fn unique_path(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }
    let (stem, ext) = file_name.rsplit_once('.').unwrap_or((file_name, ""));
    let mut n = 1u32;
    loop {
        let name = if ext.is_empty() {
            format!("{stem}_{n}")
        } else {
            format!("{stem}_{n}.{ext}")
        };
        let path = dir.join(name);
        if !path.exists() {
            return path;
        }
        n += 1;
    }
}

/// Flatten the canvas and save it under the configured output directory.
///
/// Returns the path of the written file.
pub fn export_canvas(
    canvas: &Canvas,
    settings: &ExportSettings,
    format: ExportFormat,
) -> Result<PathBuf> {
    let flattened = flatten(canvas);
    let path = unique_path(
        &settings.output_dir,
        &generate_filename(&settings.filename_template, format),
    );

    log::info!("Saving {} canvas to {}", format.label(), path.display());
    save_surface(&flattened, &path, format, settings.jpeg_quality)?;
    log::info!("Canvas saved: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PaintError;
    use crate::utils::vector::Vec2;

    fn sample_canvas() -> Canvas {
        let mut canvas = Canvas::new(48, 32, 3, Color32::WHITE);
        canvas.set_active_layer(1).unwrap();
        canvas.active_mut().draw_line(
            Vec2::new(4.0, 4.0),
            Vec2::new(40.0, 28.0),
            Color32::from_rgb(200, 30, 30),
            3.0,
            true,
        );
        canvas
    }

    #[test]
    fn format_tokens_fall_back_to_png() {
        assert_eq!(ExportFormat::from_token("JPG"), ExportFormat::Jpeg);
        assert_eq!(ExportFormat::from_token(".jpeg"), ExportFormat::Jpeg);
        assert_eq!(ExportFormat::from_token("png"), ExportFormat::Png);
        assert_eq!(ExportFormat::from_token("bmp"), ExportFormat::Png);
        assert_eq!(ExportFormat::from_token(""), ExportFormat::Png);
    }

    #[test]
    fn filename_uses_template_and_extension() {
        let name = generate_filename("sketch_%Y", ExportFormat::Jpeg);
        assert!(name.starts_with("sketch_"));
        assert!(name.ends_with(".jpg"));
    }

    #[test]
    fn png_round_trip_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.png");
        let flat = flatten(&sample_canvas());

        save_surface(&flat, &path, ExportFormat::Png, 90).unwrap();
        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(loaded, to_rgba_image(&flat));
    }

    #[test]
    fn jpeg_round_trip_is_close() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jpg");
        let flat = flatten(&sample_canvas());

        save_surface(&flat, &path, ExportFormat::Jpeg, 95).unwrap();
        let loaded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(loaded.dimensions(), (48, 32));
        // a background pixel far from the stroke
        let px = loaded.get_pixel(44, 2);
        assert!(px.0.iter().all(|c| *c > 235), "{px:?}");
    }

    #[test]
    fn export_canvas_writes_timestamped_file() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ExportSettings {
            output_dir: dir.path().join("exports"),
            filename_template: "test_%Y%m%d".to_string(),
            ..ExportSettings::default()
        };
        let path = export_canvas(&sample_canvas(), &settings, ExportFormat::Png).unwrap();
        assert!(path.exists());
        assert!(path.starts_with(dir.path().join("exports")));
        assert_eq!(path.extension().unwrap(), "png");
    }

    #[test]
    fn unwritable_target_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        // a regular file where a directory is expected
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"x").unwrap();
        let path = blocker.join("out.png");

        let err = save_surface(&flatten(&sample_canvas()), &path, ExportFormat::Png, 90)
            .unwrap_err();
        assert!(matches!(err, PaintError::Io(_)));
    }

    #[test]
    fn saves_in_the_same_second_do_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ExportSettings {
            output_dir: dir.path().to_path_buf(),
            filename_template: "fixed".to_string(),
            ..ExportSettings::default()
        };
        let canvas = sample_canvas();
        let first = export_canvas(&canvas, &settings, ExportFormat::Png).unwrap();
        let second = export_canvas(&canvas, &settings, ExportFormat::Png).unwrap();
        let third = export_canvas(&canvas, &settings, ExportFormat::Png).unwrap();

        assert_eq!(first.file_name().unwrap(), "fixed.png");
        assert_eq!(second.file_name().unwrap(), "fixed_1.png");
        assert_eq!(third.file_name().unwrap(), "fixed_2.png");
        assert!(first.exists() && second.exists() && third.exists());
    }
}
