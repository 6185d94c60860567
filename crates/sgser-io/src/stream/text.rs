//! Text stream personality: whitespace separated tokens with brace blocks.

use super::{EnumNames, StreamReader, StreamWriter};
use crate::{IoError, IoResult};
use sgser_core::format::{gl_enum_name, gl_enum_value};
use std::io::{Read, Write};

const INDENT: &str = "  ";

fn needs_quotes(value: &str) -> bool {
    value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\\' | '{' | '}'))
}

fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Writes primitives as indented text tokens.
pub struct TextWriter<W: Write> {
    inner: W,
    indent: usize,
    at_line_start: bool,
}

impl<W: Write> TextWriter<W> {
    /// Wraps a writer.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            indent: 0,
            at_line_start: true,
        }
    }

    fn token(&mut self, token: &str) -> IoResult<()> {
        if self.at_line_start {
            for _ in 0..self.indent {
                self.inner.write_all(INDENT.as_bytes())?;
            }
            self.at_line_start = false;
        } else {
            self.inner.write_all(b" ")?;
        }
        self.inner.write_all(token.as_bytes())?;
        Ok(())
    }
}

impl<W: Write> StreamWriter for TextWriter<W> {
    fn is_binary(&self) -> bool {
        false
    }

    fn write_bool(&mut self, value: bool) -> IoResult<()> {
        self.token(if value { "TRUE" } else { "FALSE" })
    }

    fn write_i32(&mut self, value: i32) -> IoResult<()> {
        self.token(&value.to_string())
    }

    fn write_u32(&mut self, value: u32) -> IoResult<()> {
        self.token(&value.to_string())
    }

    fn write_size(&mut self, value: usize) -> IoResult<()> {
        if u32::try_from(value).is_err() {
            return Err(IoError::EncodeError(format!("size {value} does not fit in 32 bits")));
        }
        self.token(&value.to_string())
    }

    fn write_string(&mut self, value: &str) -> IoResult<()> {
        if needs_quotes(value) {
            self.token(&quote(value))
        } else {
            self.token(value)
        }
    }

    fn write_wrapped_string(&mut self, value: &str) -> IoResult<()> {
        self.token(&quote(value))
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> IoResult<()> {
        for b in bytes {
            self.token(&b.to_string())?;
        }
        Ok(())
    }

    fn write_enum(&mut self, value: i32, names: &EnumNames) -> IoResult<()> {
        match names.iter().find(|(v, _)| *v == value) {
            Some((_, name)) => self.token(name),
            None => self.token(&value.to_string()),
        }
    }

    fn write_gl_enum(&mut self, value: u32) -> IoResult<()> {
        match gl_enum_name(value) {
            Some(name) => self.token(name),
            None => self.token(&format!("0x{value:X}")),
        }
    }

    fn write_property(&mut self, name: &str) -> IoResult<()> {
        self.token(name)
    }

    fn write_begin_bracket(&mut self) -> IoResult<()> {
        self.token("{")?;
        self.indent += 1;
        Ok(())
    }

    fn write_end_bracket(&mut self) -> IoResult<()> {
        if !self.at_line_start {
            self.write_endl()?;
        }
        self.indent = self.indent.saturating_sub(1);
        self.token("}")
    }

    fn write_endl(&mut self) -> IoResult<()> {
        self.inner.write_all(b"\n")?;
        self.at_line_start = true;
        Ok(())
    }

    fn flush(&mut self) -> IoResult<()> {
        self.inner.flush()?;
        Ok(())
    }
}

/// A lexed text token.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Bare(String),
    Quoted(String),
}

impl Token {
    fn into_string(self) -> String {
        match self {
            Token::Bare(s) | Token::Quoted(s) => s,
        }
    }

    fn as_str(&self) -> &str {
        match self {
            Token::Bare(s) | Token::Quoted(s) => s,
        }
    }
}

/// Reads primitives written by [`TextWriter`].
///
/// The input is buffered whole so optional properties can be peeked.
pub struct TextReader {
    data: Vec<u8>,
    pos: usize,
}

impl TextReader {
    /// Reads all of `reader` into the token buffer.
    pub fn new<R: Read>(mut reader: R) -> IoResult<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(Self { data, pos: 0 })
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.data.len() && self.data[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn next_token(&mut self) -> IoResult<Token> {
        self.skip_whitespace();
        if self.pos >= self.data.len() {
            return Err(IoError::UnexpectedEof);
        }
        if self.data[self.pos] == b'"' {
            self.pos += 1;
            let mut bytes = Vec::new();
            loop {
                let Some(&b) = self.data.get(self.pos) else {
                    return Err(IoError::UnexpectedEof);
                };
                self.pos += 1;
                match b {
                    b'"' => break,
                    b'\\' => {
                        let escaped = *self.data.get(self.pos).ok_or(IoError::UnexpectedEof)?;
                        self.pos += 1;
                        bytes.push(escaped);
                    }
                    _ => bytes.push(b),
                }
            }
            Ok(Token::Quoted(utf8(bytes)?))
        } else {
            let start = self.pos;
            while self.pos < self.data.len() && !self.data[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            Ok(Token::Bare(utf8(self.data[start..self.pos].to_vec())?))
        }
    }

    fn expect(&mut self, expected: &str) -> IoResult<()> {
        match self.next_token()? {
            Token::Bare(s) if s == expected => Ok(()),
            other => Err(IoError::unexpected(expected, other.into_string())),
        }
    }

    fn parse_number<T: std::str::FromStr>(&mut self, what: &str) -> IoResult<T> {
        let token = self.next_token()?;
        token
            .as_str()
            .parse()
            .map_err(|_| IoError::unexpected(what, token.into_string()))
    }
}

fn utf8(bytes: Vec<u8>) -> IoResult<String> {
    String::from_utf8(bytes).map_err(|e| IoError::DecodeError(format!("invalid UTF-8 token: {e}")))
}

impl StreamReader for TextReader {
    fn is_binary(&self) -> bool {
        false
    }

    fn read_bool(&mut self) -> IoResult<bool> {
        match self.next_token()? {
            Token::Bare(s) if s == "TRUE" => Ok(true),
            Token::Bare(s) if s == "FALSE" => Ok(false),
            other => Err(IoError::unexpected("TRUE or FALSE", other.into_string())),
        }
    }

    fn read_i32(&mut self) -> IoResult<i32> {
        self.parse_number("integer")
    }

    fn read_u32(&mut self) -> IoResult<u32> {
        self.parse_number("unsigned integer")
    }

    fn read_size(&mut self) -> IoResult<usize> {
        Ok(self.parse_number::<u32>("size")? as usize)
    }

    fn read_string(&mut self) -> IoResult<String> {
        Ok(self.next_token()?.into_string())
    }

    fn read_wrapped_string(&mut self) -> IoResult<String> {
        self.read_string()
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> IoResult<()> {
        for b in buf.iter_mut() {
            *b = self.parse_number("byte")?;
        }
        Ok(())
    }

    fn read_enum(&mut self, names: &EnumNames) -> IoResult<i32> {
        let token = self.next_token()?;
        if let Some((value, _)) = names.iter().find(|(_, name)| *name == token.as_str()) {
            return Ok(*value);
        }
        token
            .as_str()
            .parse()
            .map_err(|_| IoError::unexpected("enum name", token.into_string()))
    }

    fn read_gl_enum(&mut self) -> IoResult<u32> {
        let token = self.next_token()?;
        let s = token.as_str();
        let value = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            u32::from_str_radix(hex, 16).ok()
        } else {
            gl_enum_value(s).or_else(|| s.parse().ok())
        };
        value.ok_or_else(|| IoError::unexpected("GL enum", token.into_string()))
    }

    fn read_property(&mut self, name: &str) -> IoResult<()> {
        self.expect(name)
    }

    fn match_property(&mut self, name: &str) -> IoResult<bool> {
        let saved = self.pos;
        self.skip_whitespace();
        if self.pos >= self.data.len() {
            self.pos = saved;
            return Ok(false);
        }
        if matches!(self.next_token()?, Token::Bare(s) if s == name) {
            Ok(true)
        } else {
            self.pos = saved;
            Ok(false)
        }
    }

    fn read_begin_bracket(&mut self) -> IoResult<()> {
        self.expect("{")
    }

    fn read_end_bracket(&mut self) -> IoResult<()> {
        self.expect("}")
    }
}
