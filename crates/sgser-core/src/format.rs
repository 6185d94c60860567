//! GL pixel formats, data types and image size arithmetic.
//!
//! Images are described the way OpenGL describes texture uploads: a pixel
//! format (which components are present), a data type (how each component
//! or packed pixel is stored) and a row packing alignment. The functions
//! in this module compute byte sizes from that description. They are the
//! single source of truth for buffer sizes: both the encoder's mipmap
//! offsets and [`Image::validate`](crate::Image::validate) use
//! [`compute_image_size_in_bytes`].
//!
//! # Usage
//!
//! ```rust
//! use sgser_core::format::{compute_image_size_in_bytes, DataType, PixelFormat};
//!
//! // 4x4 RGBA8, 4-byte packing
//! let size = compute_image_size_in_bytes(4, 4, 1, PixelFormat::RGBA, DataType::UNSIGNED_BYTE, 4)?;
//! assert_eq!(size, 64);
//! # Ok::<(), sgser_core::Error>(())
//! ```
//!
//! Dimensions come straight from streams, so every size computation is
//! checked and reports overflow as [`Error::InvalidDimensions`].

use crate::{Error, Result};

/// GL pixel format (`GLenum`), e.g. `GL_RGBA`.
///
/// Stored as the raw enum value so that formats this crate has no name
/// for still round-trip through a stream unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelFormat(pub u32);

impl PixelFormat {
    /// `GL_NONE`.
    pub const NONE: Self = Self(0);
    /// `GL_COLOR_INDEX`.
    pub const COLOR_INDEX: Self = Self(0x1900);
    /// `GL_STENCIL_INDEX`.
    pub const STENCIL_INDEX: Self = Self(0x1901);
    /// `GL_DEPTH_COMPONENT`.
    pub const DEPTH_COMPONENT: Self = Self(0x1902);
    /// `GL_RED`.
    pub const RED: Self = Self(0x1903);
    /// `GL_GREEN`.
    pub const GREEN: Self = Self(0x1904);
    /// `GL_BLUE`.
    pub const BLUE: Self = Self(0x1905);
    /// `GL_ALPHA`.
    pub const ALPHA: Self = Self(0x1906);
    /// `GL_RGB`.
    pub const RGB: Self = Self(0x1907);
    /// `GL_RGBA`.
    pub const RGBA: Self = Self(0x1908);
    /// `GL_LUMINANCE`.
    pub const LUMINANCE: Self = Self(0x1909);
    /// `GL_LUMINANCE_ALPHA`.
    pub const LUMINANCE_ALPHA: Self = Self(0x190A);
    /// `GL_BGR`.
    pub const BGR: Self = Self(0x80E0);
    /// `GL_BGRA`.
    pub const BGRA: Self = Self(0x80E1);
    /// `GL_RG`.
    pub const RG: Self = Self(0x8227);
    /// `GL_COMPRESSED_RGB_S3TC_DXT1_EXT`.
    pub const COMPRESSED_RGB_S3TC_DXT1: Self = Self(0x83F0);
    /// `GL_COMPRESSED_RGBA_S3TC_DXT1_EXT`.
    pub const COMPRESSED_RGBA_S3TC_DXT1: Self = Self(0x83F1);
    /// `GL_COMPRESSED_RGBA_S3TC_DXT3_EXT`.
    pub const COMPRESSED_RGBA_S3TC_DXT3: Self = Self(0x83F2);
    /// `GL_COMPRESSED_RGBA_S3TC_DXT5_EXT`.
    pub const COMPRESSED_RGBA_S3TC_DXT5: Self = Self(0x83F3);
    /// `GL_COMPRESSED_RED_RGTC1`.
    pub const COMPRESSED_RED_RGTC1: Self = Self(0x8DBB);
    /// `GL_COMPRESSED_RG_RGTC2`.
    pub const COMPRESSED_RG_RGTC2: Self = Self(0x8DBD);

    /// Number of components per pixel, 0 if unknown.
    pub const fn num_components(self) -> u32 {
        match self {
            Self::COLOR_INDEX
            | Self::STENCIL_INDEX
            | Self::DEPTH_COMPONENT
            | Self::RED
            | Self::GREEN
            | Self::BLUE
            | Self::ALPHA
            | Self::LUMINANCE
            | Self::COMPRESSED_RED_RGTC1 => 1,
            Self::LUMINANCE_ALPHA | Self::RG | Self::COMPRESSED_RG_RGTC2 => 2,
            Self::RGB | Self::BGR | Self::COMPRESSED_RGB_S3TC_DXT1 => 3,
            Self::RGBA
            | Self::BGRA
            | Self::COMPRESSED_RGBA_S3TC_DXT1
            | Self::COMPRESSED_RGBA_S3TC_DXT3
            | Self::COMPRESSED_RGBA_S3TC_DXT5 => 4,
            _ => 0,
        }
    }

    /// Bytes per 4x4 block for block-compressed formats.
    pub const fn block_size(self) -> Option<u32> {
        match self {
            Self::COMPRESSED_RGB_S3TC_DXT1
            | Self::COMPRESSED_RGBA_S3TC_DXT1
            | Self::COMPRESSED_RED_RGTC1 => Some(8),
            Self::COMPRESSED_RGBA_S3TC_DXT3
            | Self::COMPRESSED_RGBA_S3TC_DXT5
            | Self::COMPRESSED_RG_RGTC2 => Some(16),
            _ => None,
        }
    }

    /// Whether this is a block-compressed format.
    #[inline]
    pub const fn is_compressed(self) -> bool {
        self.block_size().is_some()
    }
}

/// GL data type (`GLenum`), e.g. `GL_UNSIGNED_BYTE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DataType(pub u32);

impl DataType {
    /// `GL_NONE`.
    pub const NONE: Self = Self(0);
    /// `GL_BYTE`.
    pub const BYTE: Self = Self(0x1400);
    /// `GL_UNSIGNED_BYTE`.
    pub const UNSIGNED_BYTE: Self = Self(0x1401);
    /// `GL_SHORT`.
    pub const SHORT: Self = Self(0x1402);
    /// `GL_UNSIGNED_SHORT`.
    pub const UNSIGNED_SHORT: Self = Self(0x1403);
    /// `GL_INT`.
    pub const INT: Self = Self(0x1404);
    /// `GL_UNSIGNED_INT`.
    pub const UNSIGNED_INT: Self = Self(0x1405);
    /// `GL_FLOAT`.
    pub const FLOAT: Self = Self(0x1406);
    /// `GL_DOUBLE`.
    pub const DOUBLE: Self = Self(0x140A);
    /// `GL_HALF_FLOAT`.
    pub const HALF_FLOAT: Self = Self(0x140B);
    /// `GL_UNSIGNED_BYTE_3_3_2`.
    pub const UNSIGNED_BYTE_3_3_2: Self = Self(0x8032);
    /// `GL_UNSIGNED_SHORT_4_4_4_4`.
    pub const UNSIGNED_SHORT_4_4_4_4: Self = Self(0x8033);
    /// `GL_UNSIGNED_SHORT_5_5_5_1`.
    pub const UNSIGNED_SHORT_5_5_5_1: Self = Self(0x8034);
    /// `GL_UNSIGNED_INT_8_8_8_8`.
    pub const UNSIGNED_INT_8_8_8_8: Self = Self(0x8035);
    /// `GL_UNSIGNED_INT_10_10_10_2`.
    pub const UNSIGNED_INT_10_10_10_2: Self = Self(0x8036);
    /// `GL_UNSIGNED_SHORT_5_6_5`.
    pub const UNSIGNED_SHORT_5_6_5: Self = Self(0x8363);
    /// `GL_UNSIGNED_INT_2_10_10_10_REV`.
    pub const UNSIGNED_INT_2_10_10_10_REV: Self = Self(0x8368);

    /// Bits of a whole packed pixel for packed types.
    pub const fn packed_bits(self) -> Option<u32> {
        match self {
            Self::UNSIGNED_BYTE_3_3_2 => Some(8),
            Self::UNSIGNED_SHORT_4_4_4_4
            | Self::UNSIGNED_SHORT_5_5_5_1
            | Self::UNSIGNED_SHORT_5_6_5 => Some(16),
            Self::UNSIGNED_INT_8_8_8_8
            | Self::UNSIGNED_INT_10_10_10_2
            | Self::UNSIGNED_INT_2_10_10_10_REV => Some(32),
            _ => None,
        }
    }

    /// Bits per component for plain types, 0 if unknown.
    pub const fn component_bits(self) -> u32 {
        match self {
            Self::BYTE | Self::UNSIGNED_BYTE => 8,
            Self::SHORT | Self::UNSIGNED_SHORT | Self::HALF_FLOAT => 16,
            Self::INT | Self::UNSIGNED_INT | Self::FLOAT => 32,
            Self::DOUBLE => 64,
            _ => 0,
        }
    }
}

/// Symbolic names for GL enums used by the text stream.
///
/// Pixel formats, internal formats and data types share one namespace in
/// GL, so a single table serves all three.
const GL_ENUM_NAMES: &[(u32, &str)] = &[
    (0x0000, "GL_NONE"),
    (0x1900, "GL_COLOR_INDEX"),
    (0x1901, "GL_STENCIL_INDEX"),
    (0x1902, "GL_DEPTH_COMPONENT"),
    (0x1903, "GL_RED"),
    (0x1904, "GL_GREEN"),
    (0x1905, "GL_BLUE"),
    (0x1906, "GL_ALPHA"),
    (0x1907, "GL_RGB"),
    (0x1908, "GL_RGBA"),
    (0x1909, "GL_LUMINANCE"),
    (0x190A, "GL_LUMINANCE_ALPHA"),
    (0x80E0, "GL_BGR"),
    (0x80E1, "GL_BGRA"),
    (0x8227, "GL_RG"),
    (0x8040, "GL_LUMINANCE8"),
    (0x8045, "GL_LUMINANCE8_ALPHA8"),
    (0x8051, "GL_RGB8"),
    (0x8058, "GL_RGBA8"),
    (0x805B, "GL_RGBA16"),
    (0x8229, "GL_R8"),
    (0x822B, "GL_RG8"),
    (0x8814, "GL_RGBA32F_ARB"),
    (0x8815, "GL_RGB32F_ARB"),
    (0x83F0, "GL_COMPRESSED_RGB_S3TC_DXT1_EXT"),
    (0x83F1, "GL_COMPRESSED_RGBA_S3TC_DXT1_EXT"),
    (0x83F2, "GL_COMPRESSED_RGBA_S3TC_DXT3_EXT"),
    (0x83F3, "GL_COMPRESSED_RGBA_S3TC_DXT5_EXT"),
    (0x8DBB, "GL_COMPRESSED_RED_RGTC1_EXT"),
    (0x8DBD, "GL_COMPRESSED_RED_GREEN_RGTC2_EXT"),
    (0x1400, "GL_BYTE"),
    (0x1401, "GL_UNSIGNED_BYTE"),
    (0x1402, "GL_SHORT"),
    (0x1403, "GL_UNSIGNED_SHORT"),
    (0x1404, "GL_INT"),
    (0x1405, "GL_UNSIGNED_INT"),
    (0x1406, "GL_FLOAT"),
    (0x140A, "GL_DOUBLE"),
    (0x140B, "GL_HALF_FLOAT"),
    (0x8032, "GL_UNSIGNED_BYTE_3_3_2"),
    (0x8033, "GL_UNSIGNED_SHORT_4_4_4_4"),
    (0x8034, "GL_UNSIGNED_SHORT_5_5_5_1"),
    (0x8035, "GL_UNSIGNED_INT_8_8_8_8"),
    (0x8036, "GL_UNSIGNED_INT_10_10_10_2"),
    (0x8363, "GL_UNSIGNED_SHORT_5_6_5"),
    (0x8368, "GL_UNSIGNED_INT_2_10_10_10_REV"),
];

/// Returns the symbolic name of a GL enum value, if known.
pub fn gl_enum_name(value: u32) -> Option<&'static str> {
    GL_ENUM_NAMES
        .iter()
        .find(|(v, _)| *v == value)
        .map(|(_, name)| *name)
}

/// Looks up a GL enum value by its symbolic name.
pub fn gl_enum_value(name: &str) -> Option<u32> {
    GL_ENUM_NAMES
        .iter()
        .find(|(_, n)| *n == name)
        .map(|(v, _)| *v)
}

/// Size of one pixel in bits.
///
/// Block-compressed formats report their average bits per pixel (4 or 8).
/// Returns 0 when the combination is unknown.
pub fn pixel_size_in_bits(format: PixelFormat, data_type: DataType) -> u32 {
    if let Some(block) = format.block_size() {
        // 16 pixels per block
        return block * 8 / 16;
    }
    if let Some(bits) = data_type.packed_bits() {
        return bits;
    }
    format.num_components() * data_type.component_bits()
}

fn size_overflow(s: i32, t: i32, r: i32) -> Error {
    Error::invalid_dimensions(s, t, r, "byte size overflows")
}

/// Byte width of one row, rounded up to a multiple of `packing`.
///
/// A packing of 0 is treated as 1; a negative width counts as 0.
pub fn row_width_in_bytes(width: i32, format: PixelFormat, data_type: DataType, packing: u32) -> Result<usize> {
    let pixel_bits = pixel_size_in_bits(format, data_type) as usize;
    let packing = packing.max(1) as usize;
    (width.max(0) as usize)
        .checked_mul(pixel_bits)
        .and_then(|bits| bits.div_ceil(8).checked_next_multiple_of(packing))
        .ok_or_else(|| size_overflow(width, 1, 1))
}

/// Byte size of one image level with dimensions `s` x `t` x `r`.
///
/// Returns 0 if any dimension is not positive. Block-compressed formats
/// are measured in whole 4x4 blocks.
pub fn compute_image_size_in_bytes(
    s: i32,
    t: i32,
    r: i32,
    format: PixelFormat,
    data_type: DataType,
    packing: u32,
) -> Result<usize> {
    if s <= 0 || t <= 0 || r <= 0 {
        return Ok(0);
    }
    let (row, rows) = match format.block_size() {
        Some(block) => {
            let row = (block as usize)
                .checked_mul((s as usize).div_ceil(4))
                .and_then(|bytes| bytes.checked_next_multiple_of(packing.max(1) as usize))
                .ok_or_else(|| size_overflow(s, t, r))?;
            (row, (t as usize).div_ceil(4))
        }
        None => (row_width_in_bytes(s, format, data_type, packing)?, t as usize),
    };
    row.checked_mul(rows)
        .and_then(|bytes| bytes.checked_mul(r as usize))
        .ok_or_else(|| size_overflow(s, t, r))
}

/// Dimensions of the next mipmap level: each axis halved, floor at 1.
#[inline]
pub fn next_mipmap_dimensions(s: i32, t: i32, r: i32) -> (i32, i32, i32) {
    ((s >> 1).max(1), (t >> 1).max(1), (r >> 1).max(1))
}

/// Cumulative byte offsets of `reduced_levels` mipmap levels.
///
/// Entry `k` is the byte offset at which reduced level `k + 1` starts,
/// i.e. the summed sizes of levels `0..=k`.
pub fn compute_mipmap_offsets(
    s: i32,
    t: i32,
    r: i32,
    format: PixelFormat,
    data_type: DataType,
    packing: u32,
    reduced_levels: usize,
) -> Result<Vec<u32>> {
    let mut offsets = Vec::with_capacity(reduced_levels);
    let (mut s, mut t, mut r) = (s, t, r);
    let mut offset = 0usize;
    for _ in 0..reduced_levels {
        offset = compute_image_size_in_bytes(s, t, r, format, data_type, packing)?
            .checked_add(offset)
            .ok_or_else(|| size_overflow(s, t, r))?;
        let value = u32::try_from(offset)
            .map_err(|_| Error::other(format!("mipmap offset {offset} exceeds 32 bits")))?;
        offsets.push(value);
        (s, t, r) = next_mipmap_dimensions(s, t, r);
    }
    Ok(offsets)
}
