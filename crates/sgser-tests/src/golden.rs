//! Golden layout tests.
//!
//! These pin the exact bytes and text written for a small image so that
//! documents stay readable by other implementations of the format.
//!
//! ```bash
//! cargo test --package sgser-tests golden
//! ```

use sgser_core::{DataType, Image, PixelFormat};
use sgser_io::{read_document, write_document, Object, Options, WriteImageHint};

const GL_UNSIGNED_BYTE: u32 = 0x1401;
const GL_LUMINANCE: u32 = 0x1909;

/// 2x1 luminance image, one byte per pixel.
fn pair() -> Image {
    Image::from_pixels(2, 1, 1, PixelFormat::LUMINANCE, DataType::UNSIGNED_BYTE, 1, 0, vec![5, 6]).unwrap()
}

/// Little-endian byte builder mirroring the binary stream primitives.
#[derive(Default)]
struct Expected(Vec<u8>);

impl Expected {
    fn u32(mut self, value: u32) -> Self {
        self.0.extend_from_slice(&value.to_le_bytes());
        self
    }

    fn i32(mut self, value: i32) -> Self {
        self.0.extend_from_slice(&value.to_le_bytes());
        self
    }

    fn bool(mut self, value: bool) -> Self {
        self.0.push(u8::from(value));
        self
    }

    fn string(self, value: &str) -> Self {
        let mut this = self.u32(value.len() as u32);
        this.0.extend_from_slice(value.as_bytes());
        this
    }

    fn bytes(mut self, value: &[u8]) -> Self {
        self.0.extend_from_slice(value);
        self
    }
}

#[test]
fn golden_binary_inline_image() {
    let mut buf = Vec::new();
    write_document(&mut buf, (&pair()).into(), &Options::default()).unwrap();

    let expected = Expected::default()
        // header
        .u32(0x1AFB_4545)
        .u32(0x6C91_0EA1)
        .u32(3)
        .u32(146)
        // object frame
        .string("osg::Image")
        .u32(1)
        // properties
        .string("")
        .i32(0)
        .i32(1)
        .u32(GL_LUMINANCE)
        .u32(GL_UNSIGNED_BYTE)
        .u32(GL_LUMINANCE)
        .i32(0)
        .u32(1)
        .i32(0)
        // Data: present, INLINE_DATA, size, payload, no reduced levels
        .bool(true)
        .i32(1)
        .i32(2)
        .i32(1)
        .i32(1)
        .u32(2)
        .bytes(&[5, 6])
        .u32(0);
    assert_eq!(buf, expected.0);

    let loaded = read_document(buf.as_slice(), &Options::default()).unwrap();
    assert_eq!(loaded, Some(Object::Image(pair())));
}

#[test]
fn golden_text_inline_image() {
    let options = Options::default().with_ascii(true).with_write_image_hint(WriteImageHint::IncludeData);
    let mut buf = Vec::new();
    write_document(&mut buf, (&pair()).into(), &options).unwrap();
    let text = String::from_utf8(buf).unwrap();

    let (header, body) = text.split_once("\n\n").unwrap();
    assert!(header.starts_with("#Ascii Object\n#Version 146\n#Generator sgser "), "{header}");
    assert_eq!(
        body,
        "osg::Image {\n\
         \x20 UniqueID 1\n\
         \x20 InternalTextureFormat GL_LUMINANCE\n\
         \x20 DataType GL_UNSIGNED_BYTE\n\
         \x20 PixelFormat GL_LUMINANCE\n\
         \x20 Packing 1\n\
         \x20 Data 1 {\n\
         \x20   Size 2 1 1\n\
         \x20   LevelSize 1\n\
         \x20   \"BQY=\"\n\
         \x20 }\n\
         }\n"
    );

    let loaded = read_document(text.as_bytes(), &options).unwrap();
    assert_eq!(loaded, Some(Object::Image(pair())));
}

#[test]
fn golden_text_external_reference() {
    let image = pair().with_file_name("pair.png");
    let options = Options::default().with_ascii(true);
    let mut buf = Vec::new();
    write_document(&mut buf, (&image).into(), &options).unwrap();
    let text = String::from_utf8(buf).unwrap();

    let body = text.split_once("\n\n").unwrap().1;
    assert!(body.contains("  FileName \"pair.png\"\n"), "{body}");
    assert!(body.ends_with("  Data 0\n}\n"), "{body}");
}
