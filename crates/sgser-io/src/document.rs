//! Whole documents: a header followed by one object.
//!
//! Binary documents start with two magic words, the document type and
//! the version. Text documents start with comment-style header lines:
//!
//! ```text
//! #Ascii Object
//! #Version 146
//! #Generator sgser 0.1.0
//! ```
//!
//! [`read_document`] sniffs the first byte to pick the stream mode. Files
//! with an `.osgt` extension are always written as text.

use crate::object::{read_object, write_object, Object, ObjectRef};
use crate::options::Options;
use crate::stream::{InputStream, OutputStream, CURRENT_VERSION};
use crate::{IoError, IoResult};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::{debug, warn};

/// First binary magic word.
pub const MAGIC_HIGH: u32 = 0x1AFB_4545;
/// Second binary magic word.
pub const MAGIC_LOW: u32 = 0x6C91_0EA1;
/// Document type for a single object.
pub const TYPE_OBJECT: u32 = 3;
/// Extension of text documents.
pub const TEXT_EXTENSION: &str = "osgt";

const GENERATOR: &str = "sgser";
const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Writes a header and `object`.
pub fn write_document<W: Write>(writer: W, object: ObjectRef<'_>, options: &Options) -> IoResult<()> {
    let mut os = OutputStream::new(writer, options.clone());
    let version = os.file_version();
    if os.is_binary() {
        os.write_u32(MAGIC_HIGH)?;
        os.write_u32(MAGIC_LOW)?;
        os.write_u32(TYPE_OBJECT)?;
        os.write_u32(version)?;
    } else {
        os.write_string("#Ascii")?;
        os.write_string("Object")?;
        os.write_endl()?;
        os.write_string("#Version")?;
        os.write_u32(version)?;
        os.write_endl()?;
        os.write_string("#Generator")?;
        os.write_string(GENERATOR)?;
        os.write_string(GENERATOR_VERSION)?;
        os.write_endl()?;
        os.write_endl()?;
    }
    write_object(&mut os, Some(object))?;
    os.flush()
}

/// Reads a header and one object.
///
/// Returns `None` when the document holds a `NULL` object.
pub fn read_document<R: Read>(reader: R, options: &Options) -> IoResult<Option<Object>> {
    let mut reader = BufReader::new(reader);
    let first = reader.fill_buf()?.first().copied();
    let mut is = match first {
        None => return Err(IoError::InvalidHeader("empty document".into())),
        Some(b'#') => {
            let mut is = InputStream::text(reader, options.clone())?;
            read_text_header(&mut is)?;
            is
        }
        Some(_) => {
            let mut is = InputStream::binary(reader, options.clone());
            read_binary_header(&mut is)?;
            is
        }
    };
    let version = is.file_version();
    if version > CURRENT_VERSION {
        warn!("document version {version} is newer than supported version {CURRENT_VERSION}");
    }
    read_object(&mut is)
}

fn read_binary_header(is: &mut InputStream<'_>) -> IoResult<()> {
    let high = is.read_u32()?;
    let low = is.read_u32()?;
    if high != MAGIC_HIGH || low != MAGIC_LOW {
        return Err(IoError::InvalidHeader(format!("bad magic {high:#010x} {low:#010x}")));
    }
    let kind = is.read_u32()?;
    if kind != TYPE_OBJECT {
        return Err(IoError::InvalidHeader(format!("unsupported document type {kind}")));
    }
    let version = is.read_u32()?;
    is.set_file_version(version);
    Ok(())
}

fn read_text_header(is: &mut InputStream<'_>) -> IoResult<()> {
    for expected in ["#Ascii", "Object"] {
        let found = is.read_string()?;
        if found != expected {
            return Err(IoError::InvalidHeader(format!("expected '{expected}', found '{found}'")));
        }
    }
    is.read_property("#Version")?;
    let version = is.read_u32()?;
    is.set_file_version(version);
    if is.match_property("#Generator")? {
        let name = is.read_string()?;
        let generator_version = is.read_string()?;
        debug!("document written by {name} {generator_version}");
    }
    Ok(())
}

/// Writes `object` to a file. `.osgt` files are always text.
pub fn write_file(path: &Path, object: ObjectRef<'_>, options: &Options) -> IoResult<()> {
    let is_text = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(TEXT_EXTENSION));
    let options = if is_text && !options.ascii {
        options.clone().with_ascii(true)
    } else {
        options.clone()
    };
    let file = File::create(path)?;
    write_document(BufWriter::new(file), object, &options)
}

/// Reads a document file.
///
/// The file's directory is appended to the search path so relative image
/// names resolve next to the document.
pub fn read_file(path: &Path, options: &Options) -> IoResult<Option<Object>> {
    let mut options = options.clone();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        options.data_file_paths.push(dir);
    }
    let file = File::open(path)?;
    read_document(file, &options)
}
