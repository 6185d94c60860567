//! Binary stream personality: little-endian fixed-width fields.

use super::{EnumNames, StreamReader, StreamWriter};
use crate::{IoError, IoResult};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{ErrorKind, Read, Write};

fn map_eof(e: std::io::Error) -> IoError {
    if e.kind() == ErrorKind::UnexpectedEof {
        IoError::UnexpectedEof
    } else {
        IoError::Io(e)
    }
}

fn size_to_u32(value: usize) -> IoResult<u32> {
    u32::try_from(value).map_err(|_| IoError::EncodeError(format!("size {value} does not fit in 32 bits")))
}

/// Writes primitives as raw little-endian fields.
pub struct BinaryWriter<W: Write> {
    inner: W,
}

impl<W: Write> BinaryWriter<W> {
    /// Wraps a writer.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> StreamWriter for BinaryWriter<W> {
    fn is_binary(&self) -> bool {
        true
    }

    fn write_bool(&mut self, value: bool) -> IoResult<()> {
        self.inner.write_u8(u8::from(value))?;
        Ok(())
    }

    fn write_i32(&mut self, value: i32) -> IoResult<()> {
        self.inner.write_i32::<LittleEndian>(value)?;
        Ok(())
    }

    fn write_u32(&mut self, value: u32) -> IoResult<()> {
        self.inner.write_u32::<LittleEndian>(value)?;
        Ok(())
    }

    fn write_size(&mut self, value: usize) -> IoResult<()> {
        self.write_u32(size_to_u32(value)?)
    }

    fn write_string(&mut self, value: &str) -> IoResult<()> {
        self.write_size(value.len())?;
        self.inner.write_all(value.as_bytes())?;
        Ok(())
    }

    fn write_wrapped_string(&mut self, value: &str) -> IoResult<()> {
        self.write_string(value)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> IoResult<()> {
        self.inner.write_all(bytes)?;
        Ok(())
    }

    fn write_enum(&mut self, value: i32, _names: &EnumNames) -> IoResult<()> {
        self.write_i32(value)
    }

    fn write_gl_enum(&mut self, value: u32) -> IoResult<()> {
        self.write_u32(value)
    }

    fn write_property(&mut self, _name: &str) -> IoResult<()> {
        Ok(())
    }

    fn write_begin_bracket(&mut self) -> IoResult<()> {
        Ok(())
    }

    fn write_end_bracket(&mut self) -> IoResult<()> {
        Ok(())
    }

    fn write_endl(&mut self) -> IoResult<()> {
        Ok(())
    }

    fn flush(&mut self) -> IoResult<()> {
        self.inner.flush()?;
        Ok(())
    }
}

/// Reads primitives written by [`BinaryWriter`].
pub struct BinaryReader<R: Read> {
    inner: R,
}

impl<R: Read> BinaryReader<R> {
    /// Wraps a reader.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Read> StreamReader for BinaryReader<R> {
    fn is_binary(&self) -> bool {
        true
    }

    fn read_bool(&mut self) -> IoResult<bool> {
        Ok(self.inner.read_u8().map_err(map_eof)? != 0)
    }

    fn read_i32(&mut self) -> IoResult<i32> {
        self.inner.read_i32::<LittleEndian>().map_err(map_eof)
    }

    fn read_u32(&mut self) -> IoResult<u32> {
        self.inner.read_u32::<LittleEndian>().map_err(map_eof)
    }

    fn read_size(&mut self) -> IoResult<usize> {
        Ok(self.read_u32()? as usize)
    }

    fn read_string(&mut self) -> IoResult<String> {
        let len = self.read_size()?;
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(len)
            .map_err(|_| IoError::DecodeError(format!("string length {len} is too large")))?;
        (&mut self.inner)
            .take(len as u64)
            .read_to_end(&mut bytes)
            .map_err(map_eof)?;
        if bytes.len() != len {
            return Err(IoError::UnexpectedEof);
        }
        String::from_utf8(bytes).map_err(|e| IoError::DecodeError(format!("invalid UTF-8 string: {e}")))
    }

    fn read_wrapped_string(&mut self) -> IoResult<String> {
        self.read_string()
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> IoResult<()> {
        self.inner.read_exact(buf).map_err(map_eof)
    }

    fn read_enum(&mut self, _names: &EnumNames) -> IoResult<i32> {
        self.read_i32()
    }

    fn read_gl_enum(&mut self) -> IoResult<u32> {
        self.read_u32()
    }

    fn read_property(&mut self, _name: &str) -> IoResult<()> {
        Ok(())
    }

    fn match_property(&mut self, _name: &str) -> IoResult<bool> {
        Ok(true)
    }

    fn read_begin_bracket(&mut self) -> IoResult<()> {
        Ok(())
    }

    fn read_end_bracket(&mut self) -> IoResult<()> {
        Ok(())
    }
}
