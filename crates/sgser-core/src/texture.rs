//! Buffer-backed texture model.
//!
//! A [`TextureBuffer`] references a block of [`BufferData`] and exposes it
//! to shaders as a one-dimensional texel buffer of `texture_width` texels.

use crate::Image;

/// Payload of a [`TextureBuffer`].
///
/// The set of buffer kinds is closed: a texture buffer is fed either by an
/// image or by a plain unsigned-byte array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferData {
    /// Image-backed buffer.
    Image(Box<Image>),
    /// Raw unsigned-byte array.
    UByteArray(Vec<u8>),
}

impl BufferData {
    /// Byte size of the payload.
    pub fn size_in_bytes(&self) -> usize {
        match self {
            Self::Image(image) => image.data().map_or(0, <[u8]>::len),
            Self::UByteArray(bytes) => bytes.len(),
        }
    }

    /// The image, if this buffer is image-backed.
    pub fn as_image(&self) -> Option<&Image> {
        match self {
            Self::Image(image) => Some(image),
            Self::UByteArray(_) => None,
        }
    }
}

impl From<Image> for BufferData {
    fn from(image: Image) -> Self {
        Self::Image(Box::new(image))
    }
}

/// Texture whose texels live in a [`BufferData`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextureBuffer {
    /// Backing data, if any.
    pub buffer_data: Option<BufferData>,
    /// Number of texels exposed to shaders.
    pub texture_width: i32,
}

impl TextureBuffer {
    /// Creates a texture buffer over `data`.
    pub fn new(data: impl Into<BufferData>, texture_width: i32) -> Self {
        Self {
            buffer_data: Some(data.into()),
            texture_width,
        }
    }
}
