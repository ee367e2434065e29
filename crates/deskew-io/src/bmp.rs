//! BMP image format support
//!
//! Reads uncompressed 8-bit (palette), 24-bit and 32-bit Windows bitmaps
//! and writes 24-bit BGR or 8-bit gray. Both orientations are read; rows
//! are always written bottom-up.
//!
//! BMP rows are padded to 4 bytes and store pixels blue, green, red, the
//! same layout a [`PixelFormat::Bgr24`] row uses in memory.

use crate::{IoError, IoResult};
use deskew_core::{Bgr, ImageFormat, Pix, PixelFormat};
use std::io::{Read, Write};
use tracing::debug;

/// BMP file header size
const BMP_FILE_HEADER_SIZE: usize = 14;

/// BMP info header size (BITMAPINFOHEADER)
const BMP_INFO_HEADER_SIZE: u32 = 40;

/// Refuse headers that would allocate more than this many pixels
const MAX_PIXELS: u64 = 1 << 28;

fn le_u16(b: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([b[at], b[at + 1]])
}

fn le_u32(b: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]])
}

fn le_i32(b: &[u8], at: usize) -> i32 {
    i32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]])
}

/// Bytes in one stored row, padded to 4.
#[inline]
fn stored_row_bytes(width: u32, bits_per_pixel: u16) -> usize {
    (width as usize * bits_per_pixel as usize).div_ceil(32) * 4
}

/// Read a BMP image
///
/// An 8-bit image whose palette is all gray decodes to
/// [`PixelFormat::Gray8`]; every other image decodes to
/// [`PixelFormat::Bgr24`]. Alpha in 32-bit files is dropped.
pub fn read_bmp<R: Read>(mut reader: R) -> IoResult<Pix> {
    let mut file_header = [0u8; BMP_FILE_HEADER_SIZE];
    reader.read_exact(&mut file_header)?;
    if &file_header[0..2] != b"BM" {
        return Err(IoError::InvalidData("not a BMP file".to_string()));
    }
    let pixel_offset = le_u32(&file_header, 10) as usize;

    let mut info = [0u8; BMP_INFO_HEADER_SIZE as usize];
    reader.read_exact(&mut info)?;
    let header_size = le_u32(&info, 0);
    if header_size < BMP_INFO_HEADER_SIZE {
        return Err(IoError::InvalidData(format!(
            "unsupported BMP header size: {header_size}"
        )));
    }

    let raw_width = le_i32(&info, 4);
    let raw_height = le_i32(&info, 8);
    let planes = le_u16(&info, 12);
    let bits_per_pixel = le_u16(&info, 14);
    let compression = le_u32(&info, 16);
    let colors_used = le_u32(&info, 32);

    if planes != 1 {
        return Err(IoError::InvalidData(format!(
            "unsupported number of planes: {planes}"
        )));
    }
    // 3 = BI_BITFIELDS, accepted for 32-bit files with the standard masks
    if compression != 0 && !(compression == 3 && bits_per_pixel == 32) {
        return Err(IoError::UnsupportedFormat(format!(
            "unsupported BMP compression: {compression}"
        )));
    }
    if raw_width <= 0 || raw_height == 0 {
        return Err(IoError::InvalidData(format!(
            "invalid BMP dimensions: {raw_width}x{raw_height}"
        )));
    }
    let width = raw_width.unsigned_abs();
    let top_down = raw_height < 0;
    let height = raw_height.unsigned_abs();
    if width as u64 * height as u64 > MAX_PIXELS {
        return Err(IoError::InvalidData(format!(
            "BMP too large: {width}x{height}"
        )));
    }

    let mut consumed = BMP_FILE_HEADER_SIZE + BMP_INFO_HEADER_SIZE as usize;
    skip(&mut reader, header_size as usize - BMP_INFO_HEADER_SIZE as usize)?;
    consumed += header_size as usize - BMP_INFO_HEADER_SIZE as usize;

    let palette = match bits_per_pixel {
        8 => {
            let count = match colors_used {
                0 => 256,
                n if n <= 256 => n as usize,
                n => {
                    return Err(IoError::InvalidData(format!(
                        "BMP palette too large: {n}"
                    )));
                }
            };
            let mut raw = vec![0u8; count * 4];
            reader.read_exact(&mut raw)?;
            consumed += raw.len();
            raw.chunks_exact(4)
                .map(|c| Bgr::from_bytes([c[0], c[1], c[2]]))
                .collect::<Vec<_>>()
        }
        24 | 32 => Vec::new(),
        _ => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported BMP bit depth: {bits_per_pixel}"
            )));
        }
    };

    if pixel_offset < consumed {
        return Err(IoError::InvalidData(format!(
            "BMP pixel offset {pixel_offset} inside header"
        )));
    }
    skip(&mut reader, pixel_offset - consumed)?;

    let gray_palette = !palette.is_empty()
        && palette
            .iter()
            .enumerate()
            .all(|(i, c)| c.is_gray() && c.b as usize == i);
    let format = if gray_palette {
        PixelFormat::Gray8
    } else {
        PixelFormat::Bgr24
    };

    let mut pix = Pix::new(width, height, format)?;
    pix.set_informat(ImageFormat::Bmp);
    let mut view = pix.view_mut();
    let mut row_buffer = vec![0u8; stored_row_bytes(width, bits_per_pixel)];

    for row in 0..height {
        reader.read_exact(&mut row_buffer)?;
        let y = if top_down { row } else { height - 1 - row };
        let dst = view.row_mut(y)?;
        let n = dst.len();

        match (bits_per_pixel, format) {
            (24, _) => dst.copy_from_slice(&row_buffer[..n]),
            (32, _) => {
                for (out, src) in dst.chunks_exact_mut(3).zip(row_buffer.chunks_exact(4)) {
                    out.copy_from_slice(&src[..3]);
                }
            }
            (_, PixelFormat::Gray8) => dst.copy_from_slice(&row_buffer[..n]),
            _ => {
                for (out, &index) in dst.chunks_exact_mut(3).zip(row_buffer.iter()) {
                    let color = palette.get(index as usize).copied().ok_or_else(|| {
                        IoError::InvalidData(format!("palette index {index} out of range"))
                    })?;
                    out.copy_from_slice(&color.to_bytes());
                }
            }
        }
    }

    debug!(width, height, bits_per_pixel, ?format, "BMP decoded");
    Ok(pix)
}

/// Write a BMP image
///
/// [`PixelFormat::Bgr24`] is written as 24-bit; [`PixelFormat::Gray8`] as
/// 8-bit with a linear gray palette.
pub fn write_bmp<W: Write>(pix: &Pix, mut writer: W) -> IoResult<()> {
    let width = pix.width();
    let height = pix.height();
    let (bits_per_pixel, palette_entries): (u16, usize) = match pix.format() {
        PixelFormat::Bgr24 => (24, 0),
        PixelFormat::Gray8 => (8, 256),
    };

    let row_stride = stored_row_bytes(width, bits_per_pixel);
    let pixel_data_size = row_stride * height as usize;
    let pixel_offset = BMP_FILE_HEADER_SIZE + BMP_INFO_HEADER_SIZE as usize + palette_entries * 4;
    let file_size = pixel_offset + pixel_data_size;
    let file_size = u32::try_from(file_size)
        .map_err(|_| IoError::EncodeError(format!("image too large for BMP: {file_size} bytes")))?;

    // File header
    writer.write_all(b"BM")?;
    writer.write_all(&file_size.to_le_bytes())?;
    writer.write_all(&[0u8; 4])?; // Reserved
    writer.write_all(&(pixel_offset as u32).to_le_bytes())?;

    // Info header
    writer.write_all(&BMP_INFO_HEADER_SIZE.to_le_bytes())?;
    writer.write_all(&(width as i32).to_le_bytes())?;
    writer.write_all(&(height as i32).to_le_bytes())?; // Bottom-up
    writer.write_all(&1u16.to_le_bytes())?; // Planes
    writer.write_all(&bits_per_pixel.to_le_bytes())?;
    writer.write_all(&0u32.to_le_bytes())?; // Compression
    writer.write_all(&(pixel_data_size as u32).to_le_bytes())?;
    writer.write_all(&2835i32.to_le_bytes())?; // 72 dpi
    writer.write_all(&2835i32.to_le_bytes())?;
    writer.write_all(&(palette_entries as u32).to_le_bytes())?; // Colors used
    writer.write_all(&0u32.to_le_bytes())?; // Important colors

    for i in 0..palette_entries {
        let v = i as u8;
        writer.write_all(&[v, v, v, 0])?;
    }

    let view = pix.view();
    let mut row_buffer = vec![0u8; row_stride];
    for row in 0..height {
        let src = view.row(height - 1 - row)?;
        row_buffer[..src.len()].copy_from_slice(src);
        writer.write_all(&row_buffer)?;
    }

    debug!(width, height, bits_per_pixel, "BMP encoded");
    Ok(())
}

fn skip<R: Read>(reader: &mut R, count: usize) -> IoResult<()> {
    if count > 0 {
        std::io::copy(&mut reader.take(count as u64), &mut std::io::sink())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_bmp_roundtrip_24bit() {
        // Width 5 exercises row padding (15 -> 16 bytes)
        let mut pix = Pix::new(5, 3, PixelFormat::Bgr24).unwrap();
        pix.set(0, 0, Bgr::rgb(255, 0, 0)).unwrap();
        pix.set(1, 1, Bgr::rgb(0, 255, 0)).unwrap();
        pix.set(4, 2, Bgr::rgb(0, 0, 255)).unwrap();

        let mut buffer = Vec::new();
        write_bmp(&pix, &mut buffer).unwrap();
        assert_eq!(buffer.len(), 14 + 40 + 16 * 3);

        let pix2 = read_bmp(Cursor::new(buffer)).unwrap();
        assert_eq!(pix2.format(), PixelFormat::Bgr24);
        assert_eq!(pix2.informat(), ImageFormat::Bmp);
        assert!(pix2.equals(&pix));
    }

    #[test]
    fn test_bmp_roundtrip_gray() {
        let mut pix = Pix::new(10, 4, PixelFormat::Gray8).unwrap();
        for y in 0..4 {
            for x in 0..10 {
                pix.view_mut().set_gray(x, y, (x * 20 + y) as u8).unwrap();
            }
        }
        let mut buffer = Vec::new();
        write_bmp(&pix, &mut buffer).unwrap();
        let pix2 = read_bmp(Cursor::new(buffer)).unwrap();
        assert_eq!(pix2.format(), PixelFormat::Gray8);
        assert!(pix2.equals(&pix));
    }

    #[test]
    fn test_bmp_bottom_up_order() {
        let mut pix = Pix::new_filled(2, 2, PixelFormat::Bgr24, Bgr::WHITE).unwrap();
        pix.set(0, 0, Bgr::BLACK).unwrap();
        let mut buffer = Vec::new();
        write_bmp(&pix, &mut buffer).unwrap();
        // First stored row is the bottom one: all white
        assert_eq!(&buffer[54..60], &[255; 6]);
        // Second stored row starts with the black top-left pixel
        assert_eq!(&buffer[62..65], &[0, 0, 0]);
    }

    #[test]
    fn test_bmp_top_down_and_color_palette() {
        // 2x1 8-bit, top-down, two-entry colour palette
        let mut data = Vec::new();
        data.extend_from_slice(b"BM");
        data.extend_from_slice(&(14u32 + 40 + 8 + 4).to_le_bytes());
        data.extend_from_slice(&[0; 4]);
        data.extend_from_slice(&(14u32 + 40 + 8).to_le_bytes());
        data.extend_from_slice(&40u32.to_le_bytes());
        data.extend_from_slice(&2i32.to_le_bytes());
        data.extend_from_slice(&(-1i32).to_le_bytes());
        data.extend_from_slice(&1u16.to_le_bytes());
        data.extend_from_slice(&8u16.to_le_bytes());
        data.extend_from_slice(&[0; 16]);
        data.extend_from_slice(&2u32.to_le_bytes());
        data.extend_from_slice(&[0; 4]);
        data.extend_from_slice(&[0, 0, 255, 0, 255, 0, 0, 0]); // red, blue
        data.extend_from_slice(&[1, 0, 0, 0]);

        let pix = read_bmp(Cursor::new(data)).unwrap();
        assert_eq!(pix.format(), PixelFormat::Bgr24);
        assert_eq!(pix.get(0, 0).unwrap(), Bgr::rgb(0, 0, 255));
        assert_eq!(pix.get(1, 0).unwrap(), Bgr::rgb(255, 0, 0));
    }

    #[test]
    fn test_bmp_rejects_garbage() {
        assert!(read_bmp(Cursor::new(b"PK\x03\x04".to_vec())).is_err());
        let mut pix_bytes = Vec::new();
        write_bmp(&Pix::new(3, 3, PixelFormat::Bgr24).unwrap(), &mut pix_bytes).unwrap();
        pix_bytes.truncate(60);
        assert!(matches!(read_bmp(Cursor::new(pix_bytes)), Err(IoError::Io(_))));
    }
}
