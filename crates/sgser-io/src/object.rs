//! Polymorphic object framing.
//!
//! An object is written as its class name, an opening bracket, a
//! `UniqueID`, the wrapper's properties and a closing bracket. A missing
//! object is written as the bare string `NULL`.
//!
//! ```text
//! osg::Image {
//!   UniqueID 1
//!   FileName "brick.png"
//!   ...
//! }
//! ```
//!
//! Objects are owned values, so every object is written in full and the
//! id is informational only.

use crate::stream::{InputStream, OutputStream};
use crate::wrappers::{array, image, texture_buffer};
use crate::{IoError, IoResult};
use sgser_core::{Image, TextureBuffer};
use tracing::trace;

/// Marker written in place of a missing object.
pub const NULL_OBJECT: &str = "NULL";

/// Any object this crate can serialize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Object {
    /// An image.
    Image(Image),
    /// A raw unsigned-byte array.
    UByteArray(Vec<u8>),
    /// A buffer-backed texture.
    TextureBuffer(TextureBuffer),
}

impl Object {
    /// Serialized class name.
    pub fn class_name(&self) -> &'static str {
        self.as_object_ref().class_name()
    }

    /// Borrowed view for writing.
    pub fn as_object_ref(&self) -> ObjectRef<'_> {
        match self {
            Self::Image(image) => ObjectRef::Image(image),
            Self::UByteArray(values) => ObjectRef::UByteArray(values),
            Self::TextureBuffer(texture) => ObjectRef::TextureBuffer(texture),
        }
    }
}

impl From<Image> for Object {
    fn from(image: Image) -> Self {
        Self::Image(image)
    }
}

impl From<TextureBuffer> for Object {
    fn from(texture: TextureBuffer) -> Self {
        Self::TextureBuffer(texture)
    }
}

/// Borrowed object, as accepted by [`write_object`].
#[derive(Debug, Clone, Copy)]
pub enum ObjectRef<'a> {
    /// An image.
    Image(&'a Image),
    /// A raw unsigned-byte array.
    UByteArray(&'a [u8]),
    /// A buffer-backed texture.
    TextureBuffer(&'a TextureBuffer),
}

impl ObjectRef<'_> {
    /// Serialized class name.
    pub fn class_name(&self) -> &'static str {
        match self {
            Self::Image(_) => image::CLASS_NAME,
            Self::UByteArray(_) => array::CLASS_NAME,
            Self::TextureBuffer(_) => texture_buffer::CLASS_NAME,
        }
    }
}

impl<'a> From<&'a Image> for ObjectRef<'a> {
    fn from(image: &'a Image) -> Self {
        Self::Image(image)
    }
}

impl<'a> From<&'a TextureBuffer> for ObjectRef<'a> {
    fn from(texture: &'a TextureBuffer) -> Self {
        Self::TextureBuffer(texture)
    }
}

/// Writes an object, or `NULL` for `None`.
pub fn write_object(os: &mut OutputStream<'_>, object: Option<ObjectRef<'_>>) -> IoResult<()> {
    let Some(object) = object else {
        os.write_string(NULL_OBJECT)?;
        return os.write_endl();
    };

    os.write_string(object.class_name())?;
    os.write_begin_bracket()?;
    os.write_endl()?;

    let id = os.next_unique_id();
    os.write_property("UniqueID")?;
    os.write_u32(id)?;
    os.write_endl()?;

    match object {
        ObjectRef::Image(image) => image::write(os, image)?,
        ObjectRef::UByteArray(values) => array::write(os, values)?,
        ObjectRef::TextureBuffer(texture) => texture_buffer::write(os, texture)?,
    }

    os.write_end_bracket()?;
    os.write_endl()
}

/// Reads an object written by [`write_object`].
pub fn read_object(is: &mut InputStream<'_>) -> IoResult<Option<Object>> {
    let class_name = is.read_string()?;
    if class_name == NULL_OBJECT {
        return Ok(None);
    }

    is.read_begin_bracket()?;
    is.read_property("UniqueID")?;
    let id = is.read_u32()?;
    trace!("reading {class_name} #{id}");

    let object = match class_name.as_str() {
        image::CLASS_NAME => Object::Image(image::read(is)?),
        array::CLASS_NAME => Object::UByteArray(array::read(is)?),
        texture_buffer::CLASS_NAME => Object::TextureBuffer(texture_buffer::read(is)?),
        _ => return Err(IoError::UnknownClass(class_name)),
    };

    is.read_end_bracket()?;
    Ok(Some(object))
}
