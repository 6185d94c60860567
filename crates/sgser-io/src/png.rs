//! PNG format support.
//!
//! Reads 8-bit and 16-bit grayscale, grayscale+alpha, RGB and RGBA files
//! into [`Image`]s (`GL_LUMINANCE`, `GL_LUMINANCE_ALPHA`, `GL_RGB`,
//! `GL_RGBA`). Palette and low bit depth files are expanded on read.
//! 16-bit samples are stored in native byte order, as GL expects for
//! `GL_UNSIGNED_SHORT`.
//!
//! Only the base level is written; mipmaps are dropped.

use crate::{IoError, IoResult};
use sgser_core::format::row_width_in_bytes;
use sgser_core::{DataType, Image, Origin, PixelBuffer, PixelFormat};
use std::io::Cursor;
use std::path::Path;

/// Decodes a PNG file held in memory.
pub fn read_from_memory(bytes: &[u8]) -> IoResult<Image> {
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::EXPAND);
    let mut reader = decoder
        .read_info()
        .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("cannot determine output buffer size".into()))?;
    let mut buf = Vec::new();
    buf.try_reserve_exact(buf_size)
        .map_err(|_| IoError::DecodeError(format!("cannot allocate {buf_size} bytes")))?;
    buf.resize(buf_size, 0);
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;
    buf.truncate(info.buffer_size());

    let pixel_format = match info.color_type {
        png::ColorType::Grayscale => PixelFormat::LUMINANCE,
        png::ColorType::GrayscaleAlpha => PixelFormat::LUMINANCE_ALPHA,
        png::ColorType::Rgb => PixelFormat::RGB,
        png::ColorType::Rgba => PixelFormat::RGBA,
        other => return Err(IoError::DecodeError(format!("unexpected color type {other:?}"))),
    };
    let data_type = match info.bit_depth {
        png::BitDepth::Eight => DataType::UNSIGNED_BYTE,
        png::BitDepth::Sixteen => {
            for pair in buf.chunks_exact_mut(2) {
                let v = u16::from_be_bytes([pair[0], pair[1]]);
                pair.copy_from_slice(&v.to_ne_bytes());
            }
            DataType::UNSIGNED_SHORT
        }
        other => return Err(IoError::DecodeError(format!("unexpected bit depth {other:?}"))),
    };

    let (width, height) = dimensions(info.width, info.height)?;
    let mut image = Image::new();
    image.set_image(
        width,
        height,
        1,
        pixel_format.0 as i32,
        pixel_format,
        data_type,
        PixelBuffer::from_vec(buf),
        1,
    );
    image.origin = Origin::TopLeft;
    image.validate()?;
    Ok(image)
}

fn dimensions(width: u32, height: u32) -> IoResult<(i32, i32)> {
    match (i32::try_from(width), i32::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(IoError::DecodeError(format!("image too large: {width}x{height}"))),
    }
}

/// Encodes the base level of an image as PNG.
pub fn write_to_memory(image: &Image) -> IoResult<Vec<u8>> {
    let data = image
        .data()
        .ok_or_else(|| IoError::EncodeError("image has no pixel data".into()))?;
    if image.r() != 1 {
        return Err(IoError::EncodeError(format!("cannot write a {} deep image as PNG", image.r())));
    }
    if image.s() <= 0 || image.t() <= 0 {
        return Err(IoError::EncodeError(format!(
            "cannot write a {}x{} image as PNG",
            image.s(),
            image.t()
        )));
    }

    let color_type = match image.pixel_format {
        PixelFormat::LUMINANCE => png::ColorType::Grayscale,
        PixelFormat::LUMINANCE_ALPHA => png::ColorType::GrayscaleAlpha,
        PixelFormat::RGB => png::ColorType::Rgb,
        PixelFormat::RGBA => png::ColorType::Rgba,
        other => {
            return Err(IoError::UnsupportedFormat(format!("PNG cannot store pixel format 0x{:X}", other.0)));
        }
    };
    let (bit_depth, sample_bytes) = match image.data_type {
        DataType::UNSIGNED_BYTE => (png::BitDepth::Eight, 1),
        DataType::UNSIGNED_SHORT => (png::BitDepth::Sixteen, 2),
        other => {
            return Err(IoError::UnsupportedFormat(format!("PNG cannot store data type 0x{:X}", other.0)));
        }
    };

    let width = image.s() as usize;
    let height = image.t() as usize;
    let tight_row = width * image.pixel_format.num_components() as usize * sample_bytes;
    let stride = row_width_in_bytes(image.s(), image.pixel_format, image.data_type, image.packing)?;
    let needed = stride
        .checked_mul(height)
        .ok_or_else(|| IoError::EncodeError(format!("{}x{} image is too large", image.s(), image.t())))?;
    if data.len() < needed {
        return Err(IoError::EncodeError(format!(
            "pixel buffer holds {} bytes, expected {needed}",
            data.len()
        )));
    }

    let mut rows = Vec::with_capacity(tight_row * height);
    for row in data.chunks(stride).take(height) {
        let row = &row[..tight_row];
        if sample_bytes == 2 {
            rows.extend(
                row.chunks_exact(2)
                    .flat_map(|p| u16::from_ne_bytes([p[0], p[1]]).to_be_bytes()),
            );
        } else {
            rows.extend_from_slice(row);
        }
    }

    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, image.s() as u32, image.t() as u32);
        encoder.set_color(color_type);
        encoder.set_depth(bit_depth);
        encoder.set_compression(png::Compression::default());
        let mut writer = encoder
            .write_header()
            .map_err(|e| IoError::EncodeError(e.to_string()))?;
        writer
            .write_image_data(&rows)
            .map_err(|e| IoError::EncodeError(e.to_string()))?;
        writer.finish().map_err(|e| IoError::EncodeError(e.to_string()))?;
    }
    Ok(out)
}

/// Reads a PNG file from the given path.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<Image> {
    read_from_memory(&std::fs::read(path.as_ref())?)
}

/// Writes the base level of an image to a PNG file.
pub fn write<P: AsRef<Path>>(path: P, image: &Image) -> IoResult<()> {
    std::fs::write(path.as_ref(), write_to_memory(image)?)?;
    Ok(())
}
