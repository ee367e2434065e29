//! PNG image format support
//!
//! Decoding normalizes every PNG to 8 bits per sample: palettes are
//! expanded, 16-bit samples stripped and alpha dropped. Gray images decode
//! to [`PixelFormat::Gray8`], colour images to [`PixelFormat::Bgr24`].

use crate::{IoError, IoResult};
use deskew_core::{ImageFormat, Pix, PixelFormat};
use png::{BitDepth, ColorType, Decoder, Encoder, Transformations};
use std::io::{BufRead, Seek, Write};
use tracing::debug;

/// Read a PNG image
pub fn read_png<R: BufRead + Seek>(reader: R) -> IoResult<Pix> {
    let mut decoder = Decoder::new(reader);
    decoder.set_transformations(Transformations::EXPAND | Transformations::STRIP_16);
    let mut reader = decoder
        .read_info()
        .map_err(|e| IoError::DecodeError(format!("PNG decode error: {e}")))?;

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("failed to get output buffer size".to_string()))?;
    let mut buf = vec![0; buf_size];
    let output_info = reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::DecodeError(format!("PNG frame error: {e}")))?;

    let width = output_info.width;
    let height = output_info.height;
    let line_size = output_info.line_size;
    let (color_type, bit_depth) = (output_info.color_type, output_info.bit_depth);
    if bit_depth != BitDepth::Eight {
        return Err(IoError::UnsupportedFormat(format!(
            "unsupported PNG bit depth after expansion: {bit_depth:?}"
        )));
    }
    let (format, samples) = match color_type {
        ColorType::Grayscale => (PixelFormat::Gray8, 1),
        ColorType::GrayscaleAlpha => (PixelFormat::Gray8, 2),
        ColorType::Rgb => (PixelFormat::Bgr24, 3),
        ColorType::Rgba => (PixelFormat::Bgr24, 4),
        other => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported PNG color type: {other:?}"
            )));
        }
    };

    let mut pix = Pix::new(width, height, format)?;
    pix.set_informat(ImageFormat::Png);
    let mut view = pix.view_mut();

    for y in 0..height {
        let start = y as usize * line_size;
        let src = buf
            .get(start..start + width as usize * samples)
            .ok_or_else(|| IoError::DecodeError(format!("PNG row {y} truncated")))?;
        let dst = view.row_mut(y)?;
        match format {
            PixelFormat::Gray8 => {
                for (out, px) in dst.iter_mut().zip(src.chunks_exact(samples)) {
                    *out = px[0];
                }
            }
            PixelFormat::Bgr24 => {
                for (out, px) in dst.chunks_exact_mut(3).zip(src.chunks_exact(samples)) {
                    out.copy_from_slice(&[px[2], px[1], px[0]]);
                }
            }
        }
    }

    debug!(width, height, ?color_type, ?format, "PNG decoded");
    Ok(pix)
}

/// Write a PNG image
///
/// [`PixelFormat::Bgr24`] is written as 8-bit RGB, [`PixelFormat::Gray8`]
/// as 8-bit grayscale.
pub fn write_png<W: Write>(pix: &Pix, writer: W) -> IoResult<()> {
    let width = pix.width();
    let height = pix.height();
    let color_type = match pix.format() {
        PixelFormat::Bgr24 => ColorType::Rgb,
        PixelFormat::Gray8 => ColorType::Grayscale,
    };

    let mut encoder = Encoder::new(writer, width, height);
    encoder.set_color(color_type);
    encoder.set_depth(BitDepth::Eight);
    let mut writer = encoder
        .write_header()
        .map_err(|e| IoError::EncodeError(format!("PNG header error: {e}")))?;

    let view = pix.view();
    let row_bytes = width as usize * pix.format().channels();
    let mut data = Vec::with_capacity(row_bytes * height as usize);
    for y in 0..height {
        let row = view.row(y)?;
        match pix.format() {
            PixelFormat::Gray8 => data.extend_from_slice(row),
            PixelFormat::Bgr24 => {
                for px in row.chunks_exact(3) {
                    data.extend_from_slice(&[px[2], px[1], px[0]]);
                }
            }
        }
    }

    writer
        .write_image_data(&data)
        .map_err(|e| IoError::EncodeError(format!("PNG write error: {e}")))?;
    writer
        .finish()
        .map_err(|e| IoError::EncodeError(format!("PNG finish error: {e}")))?;

    debug!(width, height, ?color_type, "PNG encoded");
    Ok(())
}
