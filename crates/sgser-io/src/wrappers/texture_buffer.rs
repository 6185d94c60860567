//! `osg::TextureBuffer` wrapper.

use super::{read_field, read_user_field, write_field, write_user_field};
use crate::object::{read_object, write_object, Object, ObjectRef};
use crate::stream::{InputStream, OutputStream};
use crate::{IoError, IoResult};
use sgser_core::{BufferData, TextureBuffer};

/// Serialized class name.
pub const CLASS_NAME: &str = "osg::TextureBuffer";

/// Writes the properties of `texture`.
pub fn write(os: &mut OutputStream<'_>, texture: &TextureBuffer) -> IoResult<()> {
    let data = texture.buffer_data.as_ref();
    write_user_field(os, "BufferData", data.is_some(), |os| {
        let object = data.map(|data| match data {
            BufferData::Image(image) => ObjectRef::Image(image),
            BufferData::UByteArray(values) => ObjectRef::UByteArray(values),
        });
        if os.is_binary() {
            write_object(os, object)
        } else {
            os.write_begin_bracket()?;
            os.write_endl()?;
            write_object(os, object)?;
            os.write_end_bracket()?;
            os.write_endl()
        }
    })?;
    write_field(os, "TextureWidth", texture.texture_width == 0, |os| {
        os.write_i32(texture.texture_width)
    })
}

/// Reads a texture buffer's properties.
pub fn read(is: &mut InputStream<'_>) -> IoResult<TextureBuffer> {
    let mut texture = TextureBuffer::default();
    let data = read_user_field(is, "BufferData", |is| {
        if is.is_binary() {
            read_object(is)
        } else {
            is.read_begin_bracket()?;
            let object = read_object(is)?;
            is.read_end_bracket()?;
            Ok(object)
        }
    })?;
    texture.buffer_data = match data.flatten() {
        None => None,
        Some(Object::Image(image)) => Some(BufferData::Image(Box::new(image))),
        Some(Object::UByteArray(values)) => Some(BufferData::UByteArray(values)),
        Some(other) => {
            return Err(IoError::unexpected("buffer data object", other.class_name()));
        }
    };
    if let Some(width) = read_field(is, "TextureWidth", |is| is.read_i32())? {
        texture.texture_width = width;
    }
    Ok(texture)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{Options, WriteImageHint};
    use sgser_core::{DataType, Image, PixelFormat};

    fn roundtrip_binary(texture: &TextureBuffer) -> TextureBuffer {
        let mut buf = Vec::new();
        let mut os = OutputStream::binary(&mut buf, Options::default());
        write(&mut os, texture).unwrap();
        drop(os);
        let mut is = InputStream::binary(buf.as_slice(), Options::default());
        read(&mut is).unwrap()
    }

    fn roundtrip_text(texture: &TextureBuffer) -> (String, TextureBuffer) {
        let options = Options::default().with_write_image_hint(WriteImageHint::IncludeData);
        let mut buf = Vec::new();
        let mut os = OutputStream::text(&mut buf, options.clone());
        write(&mut os, texture).unwrap();
        drop(os);
        let text = String::from_utf8(buf).unwrap();
        let loaded = {
            let mut is = InputStream::text(text.as_bytes(), options).unwrap();
            read(&mut is).unwrap()
        };
        (text, loaded)
    }

    fn rgba_strip() -> Image {
        Image::from_pixels(4, 1, 1, PixelFormat::RGBA, DataType::UNSIGNED_BYTE, 1, 0, (0..16).collect()).unwrap()
    }

    #[test]
    fn test_image_payload() {
        let texture = TextureBuffer::new(rgba_strip(), 4);
        assert_eq!(roundtrip_binary(&texture), texture);

        let (text, loaded) = roundtrip_text(&texture);
        assert!(text.starts_with("BufferData {\n  osg::Image {\n"), "{text}");
        assert!(text.contains("TextureWidth 4"));
        assert_eq!(loaded, texture);
    }

    #[test]
    fn test_array_payload() {
        let texture = TextureBuffer::new(BufferData::UByteArray(vec![9, 8, 7]), 3);
        assert_eq!(roundtrip_binary(&texture), texture);
        assert_eq!(roundtrip_text(&texture).1, texture);
    }

    #[test]
    fn test_no_payload() {
        let texture = TextureBuffer::default();
        assert_eq!(roundtrip_binary(&texture), texture);

        let (text, loaded) = roundtrip_text(&texture);
        assert!(text.is_empty());
        assert_eq!(loaded, texture);
    }

    #[test]
    fn test_rejects_nested_texture() {
        let text = "BufferData {\n osg::TextureBuffer {\n UniqueID 1\n }\n}\n";
        let mut is = InputStream::text(text.as_bytes(), Options::default()).unwrap();
        assert!(matches!(read(&mut is), Err(IoError::UnexpectedToken { .. })));
    }
}
