//! Shared plumbing for the OOXML document writers.
//!
//! Both output formats are ZIP containers of XML parts plus PNG media. The
//! package is assembled fully in memory, so assembly failures surface as
//! [`ReportError::DocumentComposeFailed`] before anything touches disk and
//! only the final write can produce [`ReportError::OutputWrite`].

use crate::error::{ReportError, Result};
use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// English Metric Units per inch, the OOXML coordinate unit.
pub(crate) const EMU_PER_INCH: f64 = 914_400.0;

/// Assumed raster density when converting chart pixels to display inches.
pub(crate) const PIXELS_PER_INCH: f64 = 96.0;

pub(crate) fn inches_to_emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH).round() as i64
}

/// Escape text for embedding in XML element content or attribute values.
pub(crate) fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Display size in EMU for a PNG, scaled down (never up) to fit the given
/// bounding box while preserving aspect ratio.
pub(crate) fn scaled_image_emu(png: &[u8], max_width_in: f64, max_height_in: f64) -> Result<(i64, i64)> {
    let image = image::load_from_memory(png)
        .map_err(|e| ReportError::DocumentComposeFailed(format!("invalid chart image: {}", e)))?;

    let natural_w_in = image.width() as f64 / PIXELS_PER_INCH;
    let natural_h_in = image.height() as f64 / PIXELS_PER_INCH;
    let scale = (max_width_in / natural_w_in)
        .min(max_height_in / natural_h_in)
        .min(1.0);

    Ok((
        inches_to_emu(natural_w_in * scale),
        inches_to_emu(natural_h_in * scale),
    ))
}

/// In-memory ZIP package under construction.
pub(crate) struct PackageBuilder {
    zip: ZipWriter<Cursor<Vec<u8>>>,
}

impl PackageBuilder {
    pub(crate) fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    /// Add one part (XML or media) at the given package path.
    pub(crate) fn add_part(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.zip
            .start_file(name, options)
            .map_err(|e| ReportError::DocumentComposeFailed(format!("part '{}': {}", name, e)))?;
        self.zip
            .write_all(bytes)
            .map_err(|e| ReportError::DocumentComposeFailed(format!("part '{}': {}", name, e)))?;
        Ok(())
    }

    /// Finalize the container and return its bytes.
    pub(crate) fn finish(self) -> Result<Vec<u8>> {
        let cursor = self
            .zip
            .finish()
            .map_err(|e| ReportError::DocumentComposeFailed(format!("finalizing container: {}", e)))?;
        Ok(cursor.into_inner())
    }
}

/// Write a finished package to disk.
pub(crate) fn write_package(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).map_err(|e| ReportError::OutputWrite {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Read;

    fn png_fixture(width: u32, height: u32) -> Vec<u8> {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::new(width, height));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageOutputFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_xml_escape() {
        assert_eq!(xml_escape("a < b & c > \"d\""), "a &lt; b &amp; c &gt; &quot;d&quot;");
        assert_eq!(xml_escape("plain"), "plain");
    }

    #[test]
    fn test_inches_to_emu() {
        assert_eq!(inches_to_emu(1.0), 914_400);
        assert_eq!(inches_to_emu(7.0), 6_400_800);
    }

    #[test]
    fn test_scaled_image_caps_width() {
        // 960px at 96 DPI is 10 inches wide; cap at 7.
        let png = png_fixture(960, 480);
        let (w, h) = scaled_image_emu(&png, 7.0, 10.0).unwrap();
        assert_eq!(w, inches_to_emu(7.0));
        assert_eq!(h, inches_to_emu(3.5));
    }

    #[test]
    fn test_scaled_image_never_upscales() {
        // 192px is 2 inches; a 7-inch cap must not enlarge it.
        let png = png_fixture(192, 96);
        let (w, h) = scaled_image_emu(&png, 7.0, 10.0).unwrap();
        assert_eq!(w, inches_to_emu(2.0));
        assert_eq!(h, inches_to_emu(1.0));
    }

    #[test]
    fn test_scaled_image_caps_height() {
        let png = png_fixture(96, 960);
        let (w, h) = scaled_image_emu(&png, 7.0, 5.0).unwrap();
        assert_eq!(h, inches_to_emu(5.0));
        assert_eq!(w, inches_to_emu(0.5));
    }

    #[test]
    fn test_scaled_image_rejects_non_png() {
        let err = scaled_image_emu(b"not an image", 7.0, 10.0).unwrap_err();
        assert_eq!(err.error_code(), "DOCUMENT_COMPOSE_FAILED");
    }

    #[test]
    fn test_package_round_trip() {
        let mut builder = PackageBuilder::new();
        builder.add_part("hello.xml", b"<x/>").unwrap();
        let bytes = builder.finish().unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut content = String::new();
        archive
            .by_name("hello.xml")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "<x/>");
    }

    #[test]
    fn test_write_package_bad_path() {
        let err = write_package(Path::new("/nonexistent-dir/out.docx"), b"bytes").unwrap_err();
        assert_eq!(err.error_code(), "OUTPUT_WRITE_ERROR");
        assert!(err.is_output_error());
    }
}
