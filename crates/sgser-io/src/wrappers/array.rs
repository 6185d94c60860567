//! `osg::UByteArray` wrapper.

use crate::stream::{InputStream, OutputStream};
use crate::{IoError, IoResult};

/// Serialized class name.
pub const CLASS_NAME: &str = "osg::UByteArray";

/// Values per line in text streams.
const VALUES_PER_LINE: usize = 16;

/// Writes the array contents.
pub fn write(os: &mut OutputStream<'_>, values: &[u8]) -> IoResult<()> {
    os.write_property("Data")?;
    os.write_size(values.len())?;
    if os.is_binary() {
        return os.write_bytes(values);
    }
    os.write_begin_bracket()?;
    os.write_endl()?;
    for line in values.chunks(VALUES_PER_LINE) {
        os.write_bytes(line)?;
        os.write_endl()?;
    }
    os.write_end_bracket()?;
    os.write_endl()
}

/// Reads the array contents.
pub fn read(is: &mut InputStream<'_>) -> IoResult<Vec<u8>> {
    is.read_property("Data")?;
    let len = is.read_size()?;
    let mut values = Vec::new();
    values
        .try_reserve_exact(len)
        .map_err(|_| IoError::Exception(format!("out of memory reading {len} array values")))?;
    values.resize(len, 0);
    if is.is_binary() {
        is.read_bytes(&mut values)?;
    } else {
        is.read_begin_bracket()?;
        is.read_bytes(&mut values)?;
        is.read_end_bracket()?;
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;

    #[test]
    fn test_text_layout() {
        let values: Vec<u8> = (0..20).collect();
        let mut buf = Vec::new();
        let mut os = OutputStream::text(&mut buf, Options::default());
        write(&mut os, &values).unwrap();
        drop(os);

        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("Data 20 {\n  0 1 2"));
        assert_eq!(text.lines().count(), 4);

        let mut is = InputStream::text(text.as_bytes(), Options::default()).unwrap();
        assert_eq!(read(&mut is).unwrap(), values);
    }

    #[test]
    fn test_binary_layout() {
        let mut buf = Vec::new();
        let mut os = OutputStream::binary(&mut buf, Options::default());
        write(&mut os, &[7, 8, 9]).unwrap();
        drop(os);
        assert_eq!(buf, [3, 0, 0, 0, 7, 8, 9]);

        let mut is = InputStream::binary(buf.as_slice(), Options::default());
        assert_eq!(read(&mut is).unwrap(), [7, 8, 9]);
    }

    #[test]
    fn test_empty_text_array() {
        let mut buf = Vec::new();
        let mut os = OutputStream::text(&mut buf, Options::default());
        write(&mut os, &[]).unwrap();
        drop(os);

        let text = String::from_utf8(buf).unwrap();
        let mut is = InputStream::text(text.as_bytes(), Options::default()).unwrap();
        assert!(read(&mut is).unwrap().is_empty());
    }
}
