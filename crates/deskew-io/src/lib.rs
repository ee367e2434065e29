//! deskew-io - Image I/O for deskew-rs
//!
//! Reads and writes the two formats the pipeline's shells exchange:
//!
//! - **BMP** ([`bmp`]): 24-bit BGR and 8-bit gray, feature `bmp`
//! - **PNG** ([`png`]): 8-bit gray and RGB (RGBA read), feature `png-format`
//!
//! Formats are sniffed from the leading bytes on read; on write the caller
//! names the format, or [`write_image_auto`] picks it from the extension.

#[cfg(feature = "bmp")]
pub mod bmp;
pub mod error;
pub mod format;
#[cfg(feature = "png-format")]
pub mod png;

pub use deskew_core::ImageFormat;
pub use error::{IoError, IoResult};
pub use format::{detect_format, detect_format_from_bytes, format_from_extension};

use deskew_core::Pix;
use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;
use tracing::debug;

/// Read an image from a file, detecting its format.
pub fn read_image<P: AsRef<Path>>(path: P) -> IoResult<Pix> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    debug!(path = %path.display(), bytes = data.len(), "reading image");
    read_image_mem(&data)
}

/// Decode an image held in memory, detecting its format.
pub fn read_image_mem(data: &[u8]) -> IoResult<Pix> {
    match detect_format_from_bytes(data)? {
        #[cfg(feature = "bmp")]
        ImageFormat::Bmp => crate::bmp::read_bmp(Cursor::new(data)),
        #[cfg(feature = "png-format")]
        ImageFormat::Png => crate::png::read_png(Cursor::new(data)),
        other => Err(IoError::UnsupportedFormat(format!(
            "cannot read {other:?} images"
        ))),
    }
}

/// Write an image to a file in the given format.
pub fn write_image<P: AsRef<Path>>(pix: &Pix, path: P, format: ImageFormat) -> IoResult<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    write_image_to(pix, &mut writer, format)?;
    writer.flush()?;
    debug!(path = %path.display(), ?format, "image written");
    Ok(())
}

/// Write an image to a file, choosing the format from its extension.
pub fn write_image_auto<P: AsRef<Path>>(pix: &Pix, path: P) -> IoResult<()> {
    let format = format_from_extension(&path);
    write_image(pix, path, format)
}

/// Encode an image into a byte vector.
pub fn write_image_mem(pix: &Pix, format: ImageFormat) -> IoResult<Vec<u8>> {
    let mut out = Vec::new();
    write_image_to(pix, &mut out, format)?;
    Ok(out)
}

fn write_image_to<W: Write>(pix: &Pix, writer: W, format: ImageFormat) -> IoResult<()> {
    match format {
        #[cfg(feature = "bmp")]
        ImageFormat::Bmp => crate::bmp::write_bmp(pix, writer),
        #[cfg(feature = "png-format")]
        ImageFormat::Png => crate::png::write_png(pix, writer),
        other => Err(IoError::UnsupportedFormat(format!(
            "cannot write {other:?} images"
        ))),
    }
}
