//! Object wrappers: per-class property tables.
//!
//! Each wrapper writes its properties in a fixed order. Binary streams
//! write every property positionally. Text streams label each property
//! and skip values equal to the property default, so readers match labels
//! optionally. User properties (`Data`, `BufferData`) are guarded by a
//! presence check instead: a leading bool in binary, the label itself in
//! text.

pub mod array;
pub mod image;
pub mod texture_buffer;

use crate::stream::{InputStream, OutputStream};
use crate::IoResult;

/// Writes a plain property.
pub(crate) fn write_field<F>(os: &mut OutputStream<'_>, name: &str, is_default: bool, write: F) -> IoResult<()>
where
    F: FnOnce(&mut OutputStream<'_>) -> IoResult<()>,
{
    if os.is_binary() {
        return write(os);
    }
    if is_default {
        return Ok(());
    }
    os.write_property(name)?;
    write(os)?;
    os.write_endl()
}

/// Reads a plain property, `None` if a text stream omitted it.
pub(crate) fn read_field<T, F>(is: &mut InputStream<'_>, name: &str, read: F) -> IoResult<Option<T>>
where
    F: FnOnce(&mut InputStream<'_>) -> IoResult<T>,
{
    if is.is_binary() || is.match_property(name)? {
        read(is).map(Some)
    } else {
        Ok(None)
    }
}

/// Writes a user property guarded by a presence check.
pub(crate) fn write_user_field<F>(os: &mut OutputStream<'_>, name: &str, present: bool, write: F) -> IoResult<()>
where
    F: FnOnce(&mut OutputStream<'_>) -> IoResult<()>,
{
    if os.is_binary() {
        os.write_bool(present)?;
    } else if present {
        os.write_property(name)?;
    }
    if present { write(os) } else { Ok(()) }
}

/// Reads a user property, `None` if it was absent.
pub(crate) fn read_user_field<T, F>(is: &mut InputStream<'_>, name: &str, read: F) -> IoResult<Option<T>>
where
    F: FnOnce(&mut InputStream<'_>) -> IoResult<T>,
{
    let present = if is.is_binary() {
        is.read_bool()?
    } else {
        is.match_property(name)?
    };
    if present { read(is).map(Some) } else { Ok(None) }
}
