//! Image model: dimensions, GL format description, pixel buffer and mipmaps.
//!
//! An [`Image`] holds one contiguous byte buffer containing the base level
//! followed by every reduced mipmap level. The level boundaries are stored
//! as cumulative byte offsets, one per reduced level:
//!
//! ```text
//! buffer:  [ level 0 ........ | level 1 .... | level 2 .. | level 3 ]
//! offsets:                    ^ offsets[0]   ^ offsets[1] ^ offsets[2]
//! ```
//!
//! The buffer itself is a [`PixelBuffer`], a single-owner allocation that
//! is moved into the image. Allocation is fallible so a bogus size read
//! from a stream becomes an [`Error::AllocationFailed`] instead of an abort.
//!
//! # Usage
//!
//! ```rust
//! use sgser_core::{DataType, Image, PixelBuffer, PixelFormat};
//!
//! let mut image = Image::new();
//! image.set_image(4, 4, 1, 0, PixelFormat::LUMINANCE, DataType::UNSIGNED_BYTE,
//!     PixelBuffer::from_vec(vec![0u8; 16]), 1);
//! assert_eq!(image.num_mipmap_levels(), 1);
//! assert!(image.validate().is_ok());
//! ```

use crate::format::{compute_image_size_in_bytes, compute_mipmap_offsets, next_mipmap_dimensions};
use crate::{DataType, Error, PixelFormat, Result};
use std::ops::{Deref, DerefMut};

/// Owned pixel storage handed from a decoder to an [`Image`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PixelBuffer(Vec<u8>);

impl PixelBuffer {
    /// Wraps an existing byte vector.
    #[inline]
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self(data)
    }

    /// Allocates a zero-filled buffer of exactly `len` bytes.
    ///
    /// Fails with [`Error::AllocationFailed`] instead of aborting when the
    /// allocator cannot satisfy the request.
    pub fn try_zeroed(len: usize) -> Result<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|e| Error::allocation_failed(len, e.to_string()))?;
        data.resize(len, 0);
        Ok(Self(data))
    }

    /// Consumes the buffer, returning the bytes.
    #[inline]
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl Deref for PixelBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl DerefMut for PixelBuffer {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }
}

impl From<Vec<u8>> for PixelBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self(data)
    }
}

/// Per-image hint on how the pixel data prefers to be stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WriteHint {
    /// Let the stream decide.
    #[default]
    NoPreference,
    /// Embed pixel data in the stream.
    StoreInline,
    /// Reference an external file by name.
    ExternalFile,
}

impl WriteHint {
    /// All variants in serialized order.
    pub const ALL: [Self; 3] = [Self::NoPreference, Self::StoreInline, Self::ExternalFile];

    /// Serialized integer value.
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Variant for a serialized integer value.
    pub fn from_i32(value: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_i32() == value)
    }

    /// Symbolic name used by the text stream.
    pub const fn name(self) -> &'static str {
        match self {
            Self::NoPreference => "NO_PREFERENCE",
            Self::StoreInline => "STORE_INLINE",
            Self::ExternalFile => "EXTERNAL_FILE",
        }
    }

    /// Variant for a symbolic name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.name() == name)
    }
}

/// Row order of the pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Origin {
    /// First row is the bottom of the image (GL convention).
    #[default]
    BottomLeft,
    /// First row is the top of the image (most file formats).
    TopLeft,
}

impl Origin {
    /// All variants in serialized order.
    pub const ALL: [Self; 2] = [Self::BottomLeft, Self::TopLeft];

    /// Serialized integer value.
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Variant for a serialized integer value.
    pub fn from_i32(value: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_i32() == value)
    }

    /// Symbolic name used by the text stream.
    pub const fn name(self) -> &'static str {
        match self {
            Self::BottomLeft => "BOTTOM_LEFT",
            Self::TopLeft => "TOP_LEFT",
        }
    }

    /// Variant for a symbolic name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.name() == name)
    }
}

/// An image with an optional pixel buffer and mipmap chain.
///
/// Format metadata (`pixel_format`, `data_type`, `packing`, ...) is public
/// because serializers fill it property by property before the pixel data
/// arrives. Dimensions, buffer and mipmap offsets change together and are
/// only reachable through methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// Source file name, used for external references and codec lookup.
    pub file_name: String,
    /// Storage preference.
    pub write_hint: WriteHint,
    /// GL internal texture format (`GLint`).
    pub internal_texture_format: i32,
    /// GL pixel format.
    pub pixel_format: PixelFormat,
    /// GL data type.
    pub data_type: DataType,
    /// Row length override (`GL_UNPACK_ROW_LENGTH`), 0 for tightly packed.
    pub row_length: i32,
    /// Row alignment in bytes.
    pub packing: u32,
    /// Row order.
    pub origin: Origin,
    s: i32,
    t: i32,
    r: i32,
    data: Option<PixelBuffer>,
    mipmap_offsets: Vec<u32>,
}

impl Default for Image {
    fn default() -> Self {
        Self {
            file_name: String::new(),
            write_hint: WriteHint::NoPreference,
            internal_texture_format: 0,
            pixel_format: PixelFormat::NONE,
            data_type: DataType::NONE,
            row_length: 0,
            packing: 1,
            origin: Origin::BottomLeft,
            s: 0,
            t: 0,
            r: 0,
            data: None,
            mipmap_offsets: Vec::new(),
        }
    }
}

impl Image {
    /// Creates an empty image without pixel data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an image from a complete buffer, validating its size.
    ///
    /// `mipmap_levels` is the number of reduced levels contained in `data`
    /// after the base level.
    #[allow(clippy::too_many_arguments)]
    pub fn from_pixels(
        s: i32,
        t: i32,
        r: i32,
        pixel_format: PixelFormat,
        data_type: DataType,
        packing: u32,
        mipmap_levels: usize,
        data: Vec<u8>,
    ) -> Result<Self> {
        if s <= 0 || t <= 0 || r <= 0 {
            return Err(Error::invalid_dimensions(s, t, r, "dimensions must be positive"));
        }
        let mut image = Self::new();
        image.set_image(
            s,
            t,
            r,
            pixel_format.0 as i32,
            pixel_format,
            data_type,
            PixelBuffer::from_vec(data),
            packing,
        );
        if mipmap_levels > 0 {
            let offsets = compute_mipmap_offsets(s, t, r, pixel_format, data_type, packing, mipmap_levels)?;
            image.set_mipmap_levels(offsets);
        }
        image.validate()?;
        Ok(image)
    }

    /// Sets the file name, builder style.
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// Width.
    #[inline]
    pub fn s(&self) -> i32 {
        self.s
    }

    /// Height.
    #[inline]
    pub fn t(&self) -> i32 {
        self.t
    }

    /// Depth.
    #[inline]
    pub fn r(&self) -> i32 {
        self.r
    }

    /// Installs a pixel buffer and its description.
    ///
    /// Ownership of `data` moves into the image. Existing mipmap offsets
    /// are cleared; install new ones with [`set_mipmap_levels`](Self::set_mipmap_levels).
    #[allow(clippy::too_many_arguments)]
    pub fn set_image(
        &mut self,
        s: i32,
        t: i32,
        r: i32,
        internal_texture_format: i32,
        pixel_format: PixelFormat,
        data_type: DataType,
        data: PixelBuffer,
        packing: u32,
    ) {
        self.s = s;
        self.t = t;
        self.r = r;
        self.internal_texture_format = internal_texture_format;
        self.pixel_format = pixel_format;
        self.data_type = data_type;
        self.packing = packing;
        self.data = Some(data);
        self.mipmap_offsets.clear();
    }

    /// Allocates a zeroed base-level buffer for the given description.
    ///
    /// A description with zero size leaves the image without data.
    pub fn allocate_image(
        &mut self,
        s: i32,
        t: i32,
        r: i32,
        pixel_format: PixelFormat,
        data_type: DataType,
        packing: u32,
    ) -> Result<()> {
        let size = compute_image_size_in_bytes(s, t, r, pixel_format, data_type, packing)?;
        self.s = s;
        self.t = t;
        self.r = r;
        self.pixel_format = pixel_format;
        self.data_type = data_type;
        self.packing = packing;
        self.mipmap_offsets.clear();
        self.data = if size > 0 {
            Some(PixelBuffer::try_zeroed(size)?)
        } else {
            None
        };
        Ok(())
    }

    /// Replaces this image's pixel payload with a copy of `source`'s.
    ///
    /// Copies dimensions, format, data type, packing, the whole buffer
    /// including mipmaps, and the mipmap offsets. Row length is reset to 0.
    /// File name, write hint and origin are left untouched, and the
    /// internal texture format is only taken over when unset.
    pub fn copy_pixels_from(&mut self, source: &Image) -> Result<()> {
        let data = match source.data() {
            Some(src) => {
                let len = source.total_size_in_bytes_including_mipmaps()?.min(src.len());
                let mut buffer = PixelBuffer::try_zeroed(len)?;
                buffer.copy_from_slice(&src[..len]);
                Some(buffer)
            }
            None => None,
        };
        self.s = source.s;
        self.t = source.t;
        self.r = source.r;
        if self.internal_texture_format == 0 {
            self.internal_texture_format = source.internal_texture_format;
        }
        self.pixel_format = source.pixel_format;
        self.data_type = source.data_type;
        self.packing = source.packing;
        self.row_length = 0;
        self.mipmap_offsets = match data {
            Some(_) => source.mipmap_offsets.clone(),
            None => Vec::new(),
        };
        self.data = data;
        Ok(())
    }

    /// Installs cumulative mipmap offsets, one per reduced level.
    pub fn set_mipmap_levels(&mut self, offsets: Vec<u32>) {
        self.mipmap_offsets = offsets;
    }

    /// Cumulative mipmap offsets, one per reduced level.
    #[inline]
    pub fn mipmap_offsets(&self) -> &[u32] {
        &self.mipmap_offsets
    }

    /// Number of levels including the base level.
    #[inline]
    pub fn num_mipmap_levels(&self) -> usize {
        self.mipmap_offsets.len() + 1
    }

    /// Pixel bytes, base level first.
    #[inline]
    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    /// Mutable pixel bytes.
    #[inline]
    pub fn data_mut(&mut self) -> Option<&mut [u8]> {
        self.data.as_deref_mut()
    }

    /// Whether a pixel buffer is present.
    #[inline]
    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    /// Removes and returns the pixel buffer, clearing mipmaps.
    pub fn take_data(&mut self) -> Option<PixelBuffer> {
        self.mipmap_offsets.clear();
        self.data.take()
    }

    /// Byte size of the base level.
    pub fn image_size_in_bytes(&self) -> Result<usize> {
        compute_image_size_in_bytes(self.s, self.t, self.r, self.pixel_format, self.data_type, self.packing)
    }

    /// Dimensions of mipmap `level` (0 = base).
    pub fn level_dimensions(&self, level: usize) -> (i32, i32, i32) {
        let (mut s, mut t, mut r) = (self.s, self.t, self.r);
        for _ in 0..level {
            (s, t, r) = next_mipmap_dimensions(s, t, r);
        }
        (s, t, r)
    }

    /// Byte size of the base level plus every reduced level.
    pub fn total_size_in_bytes_including_mipmaps(&self) -> Result<usize> {
        let (mut s, mut t, mut r) = (self.s, self.t, self.r);
        let mut total = 0usize;
        for _ in 0..self.num_mipmap_levels() {
            let size = compute_image_size_in_bytes(s, t, r, self.pixel_format, self.data_type, self.packing)?;
            total = total
                .checked_add(size)
                .ok_or_else(|| Error::invalid_dimensions(self.s, self.t, self.r, "total byte size overflows"))?;
            (s, t, r) = next_mipmap_dimensions(s, t, r);
        }
        Ok(total)
    }

    /// Iterates the byte span of each level, base level first.
    ///
    /// Spans are clamped to the buffer, so a short buffer yields short
    /// (possibly empty) trailing spans. A level whose size overflows runs
    /// to the end of the buffer. Yields nothing without data.
    pub fn levels(&self) -> Levels<'_> {
        Levels {
            image: self,
            level: 0,
        }
    }

    /// Checks the buffer length against the computed total size.
    pub fn validate(&self) -> Result<()> {
        let Some(data) = self.data() else {
            return Ok(());
        };
        let expected = self.total_size_in_bytes_including_mipmaps()?;
        if data.len() != expected {
            return Err(Error::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(())
    }
}

/// Iterator over per-level byte spans of an [`Image`].
pub struct Levels<'a> {
    image: &'a Image,
    level: usize,
}

impl<'a> Iterator for Levels<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        let data = self.image.data()?;
        if self.level >= self.image.num_mipmap_levels() {
            return None;
        }
        let start = match self.level {
            0 => 0,
            n => self.image.mipmap_offsets[n - 1] as usize,
        };
        let (s, t, r) = self.image.level_dimensions(self.level);
        let size = compute_image_size_in_bytes(s, t, r, self.image.pixel_format, self.image.data_type, self.image.packing)
            .unwrap_or(usize::MAX);
        self.level += 1;

        let start = start.min(data.len());
        let end = start.saturating_add(size).min(data.len());
        Some(&data[start..end])
    }
}
