//! `osg::Image` wrapper.

use super::{read_field, read_user_field, write_field, write_user_field};
use crate::codec::ImageDataCodec;
use crate::stream::{EnumNames, InputStream, OutputStream};
use crate::{IoError, IoResult};
use sgser_core::{DataType, Image, Origin, PixelFormat, WriteHint};
use tracing::warn;

/// Serialized class name.
pub const CLASS_NAME: &str = "osg::Image";

/// First version carrying the property table.
pub const PROPERTIES_VERSION: u32 = 112;

/// First version carrying the `Data` property.
pub const DATA_VERSION: u32 = 146;

const WRITE_HINTS: &EnumNames = &[
    (WriteHint::NoPreference.as_i32(), WriteHint::NoPreference.name()),
    (WriteHint::StoreInline.as_i32(), WriteHint::StoreInline.name()),
    (WriteHint::ExternalFile.as_i32(), WriteHint::ExternalFile.name()),
];

const ORIGINS: &EnumNames = &[
    (Origin::BottomLeft.as_i32(), Origin::BottomLeft.name()),
    (Origin::TopLeft.as_i32(), Origin::TopLeft.name()),
];

// Pixel buffers are always owned, so only USE_NEW_DELETE is ever written.
const USE_NEW_DELETE: i32 = 1;
const ALLOCATION_MODES: &EnumNames = &[(0, "NO_DELETE"), (USE_NEW_DELETE, "USE_NEW_DELETE"), (2, "USE_MALLOC_FREE")];

/// Writes the properties of `image`.
pub fn write(os: &mut OutputStream<'_>, image: &Image) -> IoResult<()> {
    let version = os.file_version();
    if version >= PROPERTIES_VERSION {
        write_field(os, "FileName", image.file_name.is_empty(), |os| {
            os.write_wrapped_string(&image.file_name)
        })?;
        write_field(os, "WriteHint", image.write_hint == WriteHint::NoPreference, |os| {
            os.write_enum(image.write_hint.as_i32(), WRITE_HINTS)
        })?;
        write_field(os, "AllocationMode", true, |os| os.write_enum(USE_NEW_DELETE, ALLOCATION_MODES))?;
        write_field(os, "InternalTextureFormat", image.internal_texture_format == 0, |os| {
            os.write_gl_enum(image.internal_texture_format as u32)
        })?;
        write_field(os, "DataType", image.data_type == DataType::NONE, |os| {
            os.write_gl_enum(image.data_type.0)
        })?;
        write_field(os, "PixelFormat", image.pixel_format == PixelFormat::NONE, |os| {
            os.write_gl_enum(image.pixel_format.0)
        })?;
        write_field(os, "RowLength", image.row_length == 0, |os| os.write_i32(image.row_length))?;
        write_field(os, "Packing", image.packing == 0, |os| os.write_u32(image.packing))?;
        write_field(os, "Origin", image.origin == Origin::BottomLeft, |os| {
            os.write_enum(image.origin.as_i32(), ORIGINS)
        })?;
    }
    if version >= DATA_VERSION {
        write_user_field(os, "Data", image.has_data(), |os| write_data(os, image))?;
    }
    Ok(())
}

fn write_data(os: &mut OutputStream<'_>, image: &Image) -> IoResult<()> {
    let options = os.options().clone();
    let services = options.services();
    if ImageDataCodec::new(&services).encode(os, image)? {
        Ok(())
    } else {
        Err(IoError::EncodeError(format!(
            "cannot write image data for '{}'",
            image.file_name
        )))
    }
}

/// Reads an image's properties.
pub fn read(is: &mut InputStream<'_>) -> IoResult<Image> {
    let mut image = Image::new();
    let version = is.file_version();
    if version >= PROPERTIES_VERSION {
        if let Some(name) = read_field(is, "FileName", |is| is.read_wrapped_string())? {
            image.file_name = name;
        }
        if let Some(value) = read_field(is, "WriteHint", |is| is.read_enum(WRITE_HINTS))? {
            image.write_hint = WriteHint::from_i32(value).unwrap_or_else(|| {
                warn!("unknown WriteHint {value}");
                WriteHint::default()
            });
        }
        read_field(is, "AllocationMode", |is| is.read_enum(ALLOCATION_MODES))?;
        if let Some(value) = read_field(is, "InternalTextureFormat", |is| is.read_gl_enum())? {
            image.internal_texture_format = value as i32;
        }
        if let Some(value) = read_field(is, "DataType", |is| is.read_gl_enum())? {
            image.data_type = DataType(value);
        }
        if let Some(value) = read_field(is, "PixelFormat", |is| is.read_gl_enum())? {
            image.pixel_format = PixelFormat(value);
        }
        if let Some(value) = read_field(is, "RowLength", |is| is.read_i32())? {
            image.row_length = value;
        }
        if let Some(value) = read_field(is, "Packing", |is| is.read_u32())? {
            image.packing = value;
        }
        if let Some(value) = read_field(is, "Origin", |is| is.read_enum(ORIGINS))? {
            image.origin = Origin::from_i32(value).unwrap_or_else(|| {
                warn!("unknown Origin {value}");
                Origin::default()
            });
        }
    }
    if version >= DATA_VERSION {
        let options = is.options().clone();
        let services = options.services();
        read_user_field(is, "Data", |is| ImageDataCodec::new(&services).decode(is, &mut image))?;
    }
    Ok(image)
}
