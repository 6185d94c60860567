//! Document info command.
//!
//! Prints the stored object's class and, for images, the GL format
//! description, mipmap chain and where the pixel data came from.

use crate::InfoArgs;
use anyhow::{Context, Result};
use serde::Serialize;
use sgser_core::format::gl_enum_name;
use sgser_core::{BufferData, Image};
use sgser_io::{read_file, Object, Options};
use std::fs;
use std::io::Read;
use std::path::Path;

/// Summary of one document, as printed by `--json`.
#[derive(Debug, Serialize)]
struct DocumentInfo {
    file: String,
    size_bytes: u64,
    encoding: &'static str,
    class: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<ImageInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    array_len: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    texture_width: Option<i32>,
}

#[derive(Debug, Serialize)]
struct ImageInfo {
    file_name: String,
    size: [i32; 3],
    pixel_format: String,
    data_type: String,
    internal_format: String,
    packing: u32,
    origin: &'static str,
    write_hint: &'static str,
    mipmap_levels: usize,
    data_bytes: Option<usize>,
}

impl ImageInfo {
    fn new(image: &Image) -> Self {
        Self {
            file_name: image.file_name.clone(),
            size: [image.s(), image.t(), image.r()],
            pixel_format: gl_name(image.pixel_format.0),
            data_type: gl_name(image.data_type.0),
            internal_format: gl_name(image.internal_texture_format as u32),
            packing: image.packing,
            origin: image.origin.name(),
            write_hint: image.write_hint.name(),
            mipmap_levels: image.num_mipmap_levels(),
            data_bytes: image.data().map(<[u8]>::len),
        }
    }
}

fn gl_name(value: u32) -> String {
    gl_enum_name(value).map_or_else(|| format!("0x{value:X}"), str::to_string)
}

/// Runs the info command.
pub fn run(args: InfoArgs, options: Options) -> Result<()> {
    for (idx, path) in args.input.iter().enumerate() {
        let info = describe(path, &options)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&info)?);
        } else {
            if idx > 0 {
                println!();
            }
            print_text(&info);
        }
    }
    Ok(())
}

fn describe(path: &Path, options: &Options) -> Result<DocumentInfo> {
    let size_bytes = fs::metadata(path)
        .with_context(|| format!("Failed to stat: {}", path.display()))?
        .len();
    let object = read_file(path, options).with_context(|| format!("Failed to read: {}", path.display()))?;

    // The header was accepted above, so the first byte is present.
    let mut first = [0u8; 1];
    fs::File::open(path)
        .and_then(|mut file| file.read_exact(&mut first))
        .with_context(|| format!("Failed to read: {}", path.display()))?;
    let encoding = if first[0] == b'#' { "text" } else { "binary" };
    let mut info = DocumentInfo {
        file: path.display().to_string(),
        size_bytes,
        encoding,
        class: object.as_ref().map(Object::class_name),
        image: None,
        array_len: None,
        texture_width: None,
    };
    match &object {
        Some(Object::Image(image)) => info.image = Some(ImageInfo::new(image)),
        Some(Object::UByteArray(values)) => info.array_len = Some(values.len()),
        Some(Object::TextureBuffer(texture)) => {
            info.texture_width = Some(texture.texture_width);
            match &texture.buffer_data {
                Some(BufferData::Image(image)) => info.image = Some(ImageInfo::new(image)),
                Some(BufferData::UByteArray(values)) => info.array_len = Some(values.len()),
                None => {}
            }
        }
        None => {}
    }
    Ok(info)
}

fn print_text(info: &DocumentInfo) {
    println!("{}", info.file);
    println!("  Encoding:   {}", info.encoding);
    println!("  File size:  {}", super::format_size(info.size_bytes));
    println!("  Object:     {}", info.class.unwrap_or("NULL"));
    if let Some(width) = info.texture_width {
        println!("  Tex width:  {}", width);
    }
    if let Some(len) = info.array_len {
        println!("  Array:      {} bytes", len);
    }
    if let Some(image) = &info.image {
        if !image.file_name.is_empty() {
            println!("  File name:  {}", image.file_name);
        }
        println!("  Size:       {}x{}x{}", image.size[0], image.size[1], image.size[2]);
        println!("  Format:     {} / {}", image.pixel_format, image.data_type);
        println!("  Internal:   {}", image.internal_format);
        println!("  Packing:    {}", image.packing);
        println!("  Origin:     {}", image.origin);
        println!("  Write hint: {}", image.write_hint);
        println!("  Mipmaps:    {}", image.mipmap_levels);
        match image.data_bytes {
            Some(bytes) => println!("  Data:       {}", super::format_size(bytes as u64)),
            None => println!("  Data:       none"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sgser_core::{DataType, PixelFormat};
    use sgser_io::{write_file, WriteImageHint};

    #[test]
    fn test_describe_inline_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.osgb");
        let image =
            Image::from_pixels(2, 2, 1, PixelFormat::RGB, DataType::UNSIGNED_BYTE, 1, 0, vec![0; 12]).unwrap();
        let options = Options::default().with_write_image_hint(WriteImageHint::IncludeData);
        write_file(&path, (&image).into(), &options).unwrap();

        let info = describe(&path, &Options::default()).unwrap();
        assert_eq!(info.encoding, "binary");
        assert_eq!(info.class, Some("osg::Image"));
        let image = info.image.unwrap();
        assert_eq!(image.size, [2, 2, 1]);
        assert_eq!(image.pixel_format, "GL_RGB");
        assert_eq!(image.data_bytes, Some(12));
    }

    #[test]
    fn test_describe_text_and_empty_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.osgt");
        let image =
            Image::from_pixels(1, 1, 1, PixelFormat::LUMINANCE, DataType::UNSIGNED_BYTE, 1, 0, vec![9]).unwrap();
        write_file(&path, (&image).into(), &Options::default()).unwrap();
        assert_eq!(describe(&path, &Options::default()).unwrap().encoding, "text");

        let empty = dir.path().join("empty.osgb");
        fs::write(&empty, b"").unwrap();
        assert!(describe(&empty, &Options::default()).is_err());
    }
}
