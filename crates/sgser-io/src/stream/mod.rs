//! Object streams with a binary and a text personality.
//!
//! A stream is created once in either mode and keeps it for its whole
//! life. The mode is a strategy object ([`StreamReader`] /
//! [`StreamWriter`]) behind the [`InputStream`] / [`OutputStream`]
//! wrappers; serializers call the same primitives in both modes and only
//! branch on [`is_binary`](StreamWriter::is_binary) where the two layouts
//! genuinely differ.
//!
//! | Primitive | Binary | Text |
//! |-----------|--------|------|
//! | `i32`, `u32`, size | 4 bytes, little-endian | decimal token |
//! | bool | 1 byte | `TRUE` / `FALSE` |
//! | string | `u32` length + UTF-8 | bare token, quoted if needed |
//! | wrapped string | same as string | always quoted |
//! | byte array | raw bytes | one decimal token per byte |
//! | enum | `i32` | symbolic name |
//! | GL enum | `u32` | `GL_*` name or `0x` hex |
//! | property name | nothing | bare token |
//! | brackets | nothing | `{` / `}` with indentation |
//! | line end | nothing | newline |

mod binary;
mod text;

pub use binary::{BinaryReader, BinaryWriter};
pub use text::{TextReader, TextWriter};

use crate::options::Options;
use crate::IoResult;
use std::io::{Read, Write};
use std::ops::{Deref, DerefMut};

/// Document version written by this crate.
pub const CURRENT_VERSION: u32 = 146;

/// Symbolic names for a serialized enum: `(value, name)` pairs.
pub type EnumNames = [(i32, &'static str)];

/// Primitive writes of one stream personality.
pub trait StreamWriter {
    /// Whether this is the binary personality.
    fn is_binary(&self) -> bool;
    /// Writes a boolean.
    fn write_bool(&mut self, value: bool) -> IoResult<()>;
    /// Writes a signed integer.
    fn write_i32(&mut self, value: i32) -> IoResult<()>;
    /// Writes an unsigned integer.
    fn write_u32(&mut self, value: u32) -> IoResult<()>;
    /// Writes a size or count (`u32` on the wire).
    fn write_size(&mut self, value: usize) -> IoResult<()>;
    /// Writes a string.
    fn write_string(&mut self, value: &str) -> IoResult<()>;
    /// Writes a string that is always delimited, even in text mode.
    fn write_wrapped_string(&mut self, value: &str) -> IoResult<()>;
    /// Writes raw bytes.
    fn write_bytes(&mut self, bytes: &[u8]) -> IoResult<()>;
    /// Writes an enum value, by name where the text format allows it.
    fn write_enum(&mut self, value: i32, names: &EnumNames) -> IoResult<()>;
    /// Writes a GL enum.
    fn write_gl_enum(&mut self, value: u32) -> IoResult<()>;
    /// Writes a property label.
    fn write_property(&mut self, name: &str) -> IoResult<()>;
    /// Opens a block.
    fn write_begin_bracket(&mut self) -> IoResult<()>;
    /// Closes a block.
    fn write_end_bracket(&mut self) -> IoResult<()>;
    /// Ends a line.
    fn write_endl(&mut self) -> IoResult<()>;
    /// Flushes the underlying writer.
    fn flush(&mut self) -> IoResult<()>;
}

/// Primitive reads of one stream personality.
pub trait StreamReader {
    /// Whether this is the binary personality.
    fn is_binary(&self) -> bool;
    /// Reads a boolean.
    fn read_bool(&mut self) -> IoResult<bool>;
    /// Reads a signed integer.
    fn read_i32(&mut self) -> IoResult<i32>;
    /// Reads an unsigned integer.
    fn read_u32(&mut self) -> IoResult<u32>;
    /// Reads a size or count.
    fn read_size(&mut self) -> IoResult<usize>;
    /// Reads a string.
    fn read_string(&mut self) -> IoResult<String>;
    /// Reads a delimited string.
    fn read_wrapped_string(&mut self) -> IoResult<String>;
    /// Reads exactly `buf.len()` bytes.
    fn read_bytes(&mut self, buf: &mut [u8]) -> IoResult<()>;
    /// Reads an enum value written by [`StreamWriter::write_enum`].
    fn read_enum(&mut self, names: &EnumNames) -> IoResult<i32>;
    /// Reads a GL enum.
    fn read_gl_enum(&mut self) -> IoResult<u32>;
    /// Consumes a required property label.
    fn read_property(&mut self, name: &str) -> IoResult<()>;
    /// Consumes an optional property label, returning whether it was present.
    ///
    /// Binary streams carry no labels and always report `true`.
    fn match_property(&mut self, name: &str) -> IoResult<bool>;
    /// Consumes an opening bracket.
    fn read_begin_bracket(&mut self) -> IoResult<()>;
    /// Consumes a closing bracket.
    fn read_end_bracket(&mut self) -> IoResult<()>;
}

/// Output stream: a writer personality plus per-document state.
pub struct OutputStream<'a> {
    writer: Box<dyn StreamWriter + 'a>,
    options: Options,
    next_id: u32,
}

impl<'a> OutputStream<'a> {
    /// Creates a binary output stream.
    pub fn binary<W: Write + 'a>(writer: W, options: Options) -> Self {
        Self::with_writer(Box::new(BinaryWriter::new(writer)), options)
    }

    /// Creates a text output stream.
    pub fn text<W: Write + 'a>(writer: W, options: Options) -> Self {
        Self::with_writer(Box::new(TextWriter::new(writer)), options)
    }

    /// Creates a stream in the mode selected by `options.ascii`.
    pub fn new<W: Write + 'a>(writer: W, options: Options) -> Self {
        if options.ascii {
            Self::text(writer, options)
        } else {
            Self::binary(writer, options)
        }
    }

    /// Creates a stream over a custom personality.
    pub fn with_writer(writer: Box<dyn StreamWriter + 'a>, options: Options) -> Self {
        Self {
            writer,
            options,
            next_id: 1,
        }
    }

    /// Stream options.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Document version being written.
    pub fn file_version(&self) -> u32 {
        self.options.file_version
    }

    /// Allocates the next object id.
    pub fn next_unique_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl<'a> Deref for OutputStream<'a> {
    type Target = dyn StreamWriter + 'a;

    fn deref(&self) -> &Self::Target {
        self.writer.as_ref()
    }
}

impl<'a> DerefMut for OutputStream<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.writer.as_mut()
    }
}

/// Input stream: a reader personality plus per-document state.
pub struct InputStream<'a> {
    reader: Box<dyn StreamReader + 'a>,
    options: Options,
    file_version: u32,
}

impl<'a> InputStream<'a> {
    /// Creates a binary input stream.
    pub fn binary<R: Read + 'a>(reader: R, options: Options) -> Self {
        Self::with_reader(Box::new(BinaryReader::new(reader)), options)
    }

    /// Creates a text input stream. The whole input is read up front.
    pub fn text<R: Read + 'a>(reader: R, options: Options) -> IoResult<Self> {
        Ok(Self::with_reader(Box::new(TextReader::new(reader)?), options))
    }

    /// Creates a stream over a custom personality.
    pub fn with_reader(reader: Box<dyn StreamReader + 'a>, options: Options) -> Self {
        Self {
            reader,
            options,
            file_version: CURRENT_VERSION,
        }
    }

    /// Stream options.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Version of the document being read.
    pub fn file_version(&self) -> u32 {
        self.file_version
    }

    /// Sets the document version, normally from the header.
    pub fn set_file_version(&mut self, version: u32) {
        self.file_version = version;
    }
}

impl<'a> Deref for InputStream<'a> {
    type Target = dyn StreamReader + 'a;

    fn deref(&self) -> &Self::Target {
        self.reader.as_ref()
    }
}

impl<'a> DerefMut for InputStream<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.reader.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLORS: &EnumNames = &[(0, "RED"), (1, "GREEN")];

    fn write_sample(os: &mut OutputStream<'_>) -> IoResult<()> {
        os.write_property("Name")?;
        os.write_string("two words")?;
        os.write_endl()?;
        os.write_property("Block")?;
        os.write_begin_bracket()?;
        os.write_endl()?;
        os.write_i32(-7)?;
        os.write_u32(42)?;
        os.write_bool(true)?;
        os.write_enum(1, COLORS)?;
        os.write_gl_enum(0x1908)?;
        os.write_gl_enum(0xBEEF)?;
        os.write_wrapped_string("say \"hi\"")?;
        os.write_bytes(&[0, 255, 7])?;
        os.write_endl()?;
        os.write_end_bracket()?;
        os.write_endl()?;
        os.flush()
    }

    fn read_sample(is: &mut InputStream<'_>) -> IoResult<()> {
        is.read_property("Name")?;
        assert_eq!(is.read_string()?, "two words");
        is.read_property("Block")?;
        is.read_begin_bracket()?;
        assert_eq!(is.read_i32()?, -7);
        assert_eq!(is.read_u32()?, 42);
        assert!(is.read_bool()?);
        assert_eq!(is.read_enum(COLORS)?, 1);
        assert_eq!(is.read_gl_enum()?, 0x1908);
        assert_eq!(is.read_gl_enum()?, 0xBEEF);
        assert_eq!(is.read_wrapped_string()?, "say \"hi\"");
        let mut bytes = [0u8; 3];
        is.read_bytes(&mut bytes)?;
        assert_eq!(bytes, [0, 255, 7]);
        is.read_end_bracket()
    }

    #[test]
    fn test_binary_primitives() {
        let mut buf = Vec::new();
        {
            let mut os = OutputStream::binary(&mut buf, Options::default());
            assert!(os.is_binary());
            write_sample(&mut os).unwrap();
        }
        let mut is = InputStream::binary(buf.as_slice(), Options::default());
        read_sample(&mut is).unwrap();
    }

    #[test]
    fn test_text_primitives() {
        let mut buf = Vec::new();
        {
            let mut os = OutputStream::text(&mut buf, Options::default());
            assert!(!os.is_binary());
            write_sample(&mut os).unwrap();
        }
        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.contains("Name \"two words\""));
        assert!(text.contains("GREEN GL_RGBA 0xBEEF"));

        let mut is = InputStream::text(buf.as_slice(), Options::default()).unwrap();
        read_sample(&mut is).unwrap();
    }

    #[test]
    fn test_new_follows_ascii_option() {
        let mut buf = Vec::new();
        let os = OutputStream::new(&mut buf, Options::default().with_ascii(true));
        assert!(!os.is_binary());
    }

    #[test]
    fn test_unique_ids_increase() {
        let mut buf = Vec::new();
        let mut os = OutputStream::binary(&mut buf, Options::default());
        assert_eq!(os.next_unique_id(), 1);
        assert_eq!(os.next_unique_id(), 2);
    }
}
