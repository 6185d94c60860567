//! Image pixel/mipmap data codec.
//!
//! Encodes and decodes the `Data` property of an image. The first value
//! written is a decision marker ([`ImageDecision`]) that selects how the
//! pixels travel:
//!
//! | Marker | Binary payload | Text payload |
//! |--------|----------------|--------------|
//! | `0` external | none | none |
//! | `1` inline data | `s t r`, byte count, bytes, level count, offsets | `{ Size s t r LevelSize n "b64"... }` |
//! | `2` inline file | byte count, encoded file bytes | none |
//! | `3` write out | none | none |
//!
//! When no inline payload was consumed the image is loaded from its file
//! name through the [`FileLoader`].
//!
//! Failures come in two severities. Allocation failure and undecodable
//! base64 abort the read with [`IoError::Exception`]. A missing codec, a
//! failed decode or an unreadable external file only log a warning and
//! leave the image without pixels.

use crate::registry::file_extension;
use crate::stream::{InputStream, OutputStream};
use crate::traits::{FileLoader, FileLocator, ImageDecoder, ImageFileWriter};
use crate::options::WriteImageHint;
use crate::{IoError, IoResult};
use base64::prelude::*;
use sgser_core::format::compute_mipmap_offsets;
use sgser_core::{Image, PixelBuffer, WriteHint};
use std::path::Path;
use tracing::{debug, info, warn};

/// Largest slice read from the stream at once while filling a payload.
const READ_CHUNK: usize = 64 * 1024;

/// How an image's pixels are stored in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ImageDecision {
    /// Referenced by file name only.
    External = 0,
    /// Raw pixels (binary) or base64 levels (text).
    InlineData = 1,
    /// The original encoded image file.
    InlineFile = 2,
    /// Written to its file name, then referenced.
    WriteOut = 3,
}

impl ImageDecision {
    /// Parses a marker value.
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::External),
            1 => Some(Self::InlineData),
            2 => Some(Self::InlineFile),
            3 => Some(Self::WriteOut),
            _ => None,
        }
    }

    /// Picks the storage mode for one image.
    ///
    /// A stream-level hint wins. Otherwise an image asking for an external
    /// file is referenced, binary streams inline the pixels and text
    /// streams reference the file.
    pub fn resolve(stream_hint: WriteImageHint, image_hint: WriteHint, binary: bool) -> Self {
        match stream_hint {
            WriteImageHint::IncludeData => Self::InlineData,
            WriteImageHint::IncludeFile => Self::InlineFile,
            WriteImageHint::WriteOut => Self::WriteOut,
            WriteImageHint::UseExternal => Self::External,
            WriteImageHint::Default => {
                if image_hint == WriteHint::ExternalFile {
                    Self::External
                } else if binary {
                    Self::InlineData
                } else {
                    Self::External
                }
            }
        }
    }
}

/// Encoder/decoder for an image's `Data` property.
///
/// Holds no state of its own; the collaborators are borrowed for the
/// duration of the codec.
#[derive(Clone, Copy)]
pub struct ImageDataCodec<'a> {
    decoder: &'a dyn ImageDecoder,
    loader: &'a dyn FileLoader,
    writer: &'a dyn ImageFileWriter,
    locator: &'a dyn FileLocator,
}

impl<'a> ImageDataCodec<'a> {
    /// Builds a codec from one object providing every collaborator.
    pub fn new<S>(services: &'a S) -> Self
    where
        S: ImageDecoder + FileLoader + ImageFileWriter + FileLocator,
    {
        Self::with_parts(services, services, services, services)
    }

    /// Builds a codec from separate collaborators.
    pub fn with_parts(
        decoder: &'a dyn ImageDecoder,
        loader: &'a dyn FileLoader,
        writer: &'a dyn ImageFileWriter,
        locator: &'a dyn FileLocator,
    ) -> Self {
        Self {
            decoder,
            loader,
            writer,
            locator,
        }
    }

    /// Reads the `Data` property into `image`.
    ///
    /// `image` must already carry its format metadata (pixel format, data
    /// type, packing, file name). Returns `Ok(true)` unless the stream
    /// itself failed.
    pub fn decode(&self, is: &mut InputStream<'_>, image: &mut Image) -> IoResult<bool> {
        let marker = is.read_i32()?;
        let mut read_from_external = true;

        match ImageDecision::from_i32(marker) {
            Some(ImageDecision::InlineData) => {
                if is.is_binary() {
                    self.decode_inline_binary(is, image)?;
                } else {
                    self.decode_inline_text(is, image)?;
                }
                read_from_external = false;
            }
            Some(ImageDecision::InlineFile) => {
                if is.is_binary() {
                    self.decode_inline_file(is, image)?;
                    read_from_external = false;
                }
            }
            Some(ImageDecision::External | ImageDecision::WriteOut) => {}
            None => debug!("unknown image decision marker {marker}"),
        }

        if read_from_external && !image.file_name.is_empty() {
            match self.loader.load(Path::new(&image.file_name)) {
                Ok(loaded) => install(image, &loaded)?,
                Err(e) => warn!("failed to read image {}: {e}", image.file_name),
            }
        }
        Ok(true)
    }

    fn decode_inline_binary(&self, is: &mut InputStream<'_>, image: &mut Image) -> IoResult<()> {
        let s = is.read_i32()?;
        let t = is.read_i32()?;
        let r = is.read_i32()?;

        let size = is.read_size()?;
        if size > 0 {
            let data = read_payload(is, size)?;
            image.set_image(
                s,
                t,
                r,
                image.internal_texture_format,
                image.pixel_format,
                image.data_type,
                PixelBuffer::from_vec(data),
                image.packing,
            );
        }

        let count = is.read_size()?;
        let mut levels = Vec::new();
        levels
            .try_reserve_exact(count)
            .map_err(|_| IoError::Exception(format!("out of memory reading {count} mipmap offsets")))?;
        for _ in 0..count {
            levels.push(is.read_u32()?);
        }
        if count > 0 {
            image.set_mipmap_levels(levels);
        }
        Ok(())
    }

    fn decode_inline_text(&self, is: &mut InputStream<'_>, image: &mut Image) -> IoResult<()> {
        is.read_begin_bracket()?;
        is.read_property("Size")?;
        let s = is.read_i32()?;
        let t = is.read_i32()?;
        let r = is.read_i32()?;

        is.read_property("LevelSize")?;
        let count = is.read_size()?;
        if count == 0 {
            return Err(IoError::Exception("LevelSize must be at least 1".into()));
        }

        let mut encoded = Vec::new();
        encoded
            .try_reserve_exact(count)
            .map_err(|_| IoError::Exception(format!("out of memory reading {count} mipmap levels")))?;
        for _ in 0..count {
            encoded.push(is.read_wrapped_string()?);
        }
        is.read_end_bracket()?;

        let (data, mut levels) = decode_levels(&encoded)?;
        // The last offset is the total size.
        levels.pop();

        if data.is_empty() {
            return Ok(());
        }
        image.set_image(
            s,
            t,
            r,
            image.internal_texture_format,
            image.pixel_format,
            image.data_type,
            PixelBuffer::from_vec(data),
            image.packing,
        );
        if !levels.is_empty() {
            image.set_mipmap_levels(levels);
        }
        Ok(())
    }

    fn decode_inline_file(&self, is: &mut InputStream<'_>, image: &mut Image) -> IoResult<()> {
        let size = is.read_size()?;
        if size == 0 {
            return Ok(());
        }
        let bytes = read_payload(is, size)?;
        let ext = file_extension(&image.file_name);
        match self.decoder.decode(&ext, &bytes) {
            Ok(decoded) => install(image, &decoded)?,
            Err(IoError::UnsupportedFormat(_)) => warn!("unable to find a plugin for '{ext}'"),
            Err(e) => warn!("failed to decode embedded {} file: {e}", image.file_name),
        }
        Ok(())
    }

    /// Writes the `Data` property of `image`.
    ///
    /// Returns `Ok(false)`, without writing anything, when the image must
    /// be written out to a file and that fails or the file name is empty.
    pub fn encode(&self, os: &mut OutputStream<'_>, image: &Image) -> IoResult<bool> {
        let stream_hint = os.options().write_image_hint;
        let decision = ImageDecision::resolve(stream_hint, image.write_hint, os.is_binary());

        if decision == ImageDecision::WriteOut {
            if image.file_name.is_empty() {
                warn!("cannot write image data out: empty file name");
                return Ok(false);
            }
            if let Err(e) = self.writer.write_image(image, Path::new(&image.file_name)) {
                warn!("failed to write {}: {e}", image.file_name);
                return Ok(false);
            }
            info!("wrote image data to external file {}", image.file_name);
        }

        os.write_i32(decision as i32)?;

        match decision {
            ImageDecision::InlineData => {
                if let Err(e) = image.validate() {
                    warn!("inline image data is inconsistent: {e}");
                }
                if os.is_binary() {
                    encode_inline_binary(os, image)?;
                } else {
                    encode_inline_text(os, image)?;
                }
            }
            ImageDecision::InlineFile if os.is_binary() => self.encode_inline_file(os, image)?,
            _ => {
                if !os.is_binary() {
                    os.write_endl()?;
                }
            }
        }
        Ok(true)
    }

    fn encode_inline_file(&self, os: &mut OutputStream<'_>, image: &Image) -> IoResult<()> {
        let contents = self
            .locator
            .find_data_file(&image.file_name)
            .and_then(|path| std::fs::read(&path).map_err(|e| debug!("{}: {e}", path.display())).ok());
        match contents {
            Some(bytes) => {
                os.write_size(bytes.len())?;
                os.write_bytes(&bytes)?;
            }
            None => {
                warn!("failed to open image file {}", image.file_name);
                os.write_u32(0)?;
            }
        }
        Ok(())
    }
}

fn encode_inline_binary(os: &mut OutputStream<'_>, image: &Image) -> IoResult<()> {
    os.write_i32(image.s())?;
    os.write_i32(image.t())?;
    os.write_i32(image.r())?;

    let total: usize = image.levels().map(<[u8]>::len).sum();
    os.write_size(total)?;
    for level in image.levels() {
        os.write_bytes(level)?;
    }

    let reduced = if image.has_data() {
        image.num_mipmap_levels() - 1
    } else {
        0
    };
    os.write_size(reduced)?;
    if reduced > 0 {
        let offsets = compute_mipmap_offsets(
            image.s(),
            image.t(),
            image.r(),
            image.pixel_format,
            image.data_type,
            image.packing,
            reduced,
        )?;
        for offset in offsets {
            os.write_u32(offset)?;
        }
    }
    Ok(())
}

fn encode_inline_text(os: &mut OutputStream<'_>, image: &Image) -> IoResult<()> {
    os.write_begin_bracket()?;
    os.write_endl()?;

    os.write_property("Size")?;
    os.write_i32(image.s())?;
    os.write_i32(image.t())?;
    os.write_i32(image.r())?;
    os.write_endl()?;

    os.write_property("LevelSize")?;
    if image.has_data() {
        os.write_size(image.num_mipmap_levels())?;
        os.write_endl()?;
        for level in image.levels() {
            os.write_wrapped_string(&BASE64_STANDARD.encode(level))?;
            os.write_endl()?;
        }
    } else {
        os.write_size(1)?;
        os.write_endl()?;
        os.write_wrapped_string("")?;
        os.write_endl()?;
    }

    os.write_end_bracket()?;
    os.write_endl()
}

/// Reads `size` payload bytes, reserving the buffer fallibly up front.
fn read_payload(is: &mut InputStream<'_>, size: usize) -> IoResult<Vec<u8>> {
    let mut data = Vec::new();
    data.try_reserve_exact(size)
        .map_err(|_| IoError::Exception(format!("out of memory reading {size} bytes of image data")))?;
    while data.len() < size {
        let start = data.len();
        let end = size.min(start + READ_CHUNK);
        data.resize(end, 0);
        is.read_bytes(&mut data[start..end])?;
    }
    Ok(data)
}

/// Decodes base64 level strings into one buffer plus the cumulative end
/// offset of every string.
fn decode_levels(encoded: &[String]) -> IoResult<(Vec<u8>, Vec<u32>)> {
    let estimate: usize = encoded
        .iter()
        .map(|s| base64::decoded_len_estimate(s.len()))
        .sum();
    let mut data = Vec::new();
    data.try_reserve(estimate)
        .map_err(|_| IoError::Exception("decoding of stream failed: out of memory".into()))?;

    let mut offsets = Vec::with_capacity(encoded.len());
    for (level, text) in encoded.iter().enumerate() {
        BASE64_STANDARD
            .decode_vec(text, &mut data)
            .map_err(|e| IoError::Exception(format!("decoding of mipmap level {level} failed: {e}")))?;
        let end = u32::try_from(data.len())
            .map_err(|_| IoError::Exception("decoded image data exceeds 4 GiB".into()))?;
        offsets.push(end);
    }
    Ok((data, offsets))
}

/// Copies a loaded or decoded image's pixels into the target.
fn install(image: &mut Image, source: &Image) -> IoResult<()> {
    image.copy_pixels_from(source).map_err(|e| {
        if e.is_allocation_error() {
            IoError::Exception(e.to_string())
        } else {
            IoError::Core(e)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;
    use sgser_core::{DataType, PixelFormat};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::PathBuf;

    /// Collaborators backed by in-memory maps.
    #[derive(Default)]
    struct Services {
        decoded: HashMap<&'static str, Image>,
        files: HashMap<String, Image>,
        located: HashMap<String, PathBuf>,
        fail_writes: bool,
        written: RefCell<Vec<PathBuf>>,
    }

    impl ImageDecoder for Services {
        fn decode(&self, extension: &str, _bytes: &[u8]) -> IoResult<Image> {
            match self.decoded.get(extension) {
                Some(image) => Ok(image.clone()),
                None => Err(IoError::UnsupportedFormat(extension.to_string())),
            }
        }
    }

    impl FileLoader for Services {
        fn load(&self, path: &Path) -> IoResult<Image> {
            self.files
                .get(path.to_string_lossy().as_ref())
                .cloned()
                .ok_or_else(|| IoError::DecodeError("no such file".into()))
        }
    }

    impl ImageFileWriter for Services {
        fn write_image(&self, _image: &Image, path: &Path) -> IoResult<()> {
            if self.fail_writes {
                return Err(IoError::EncodeError("disk full".into()));
            }
            self.written.borrow_mut().push(path.to_path_buf());
            Ok(())
        }
    }

    impl FileLocator for Services {
        fn find_data_file(&self, name: &str) -> Option<PathBuf> {
            self.located.get(name).cloned()
        }
    }

    fn l8(s: i32, t: i32, reduced: usize) -> Image {
        let offsets =
            compute_mipmap_offsets(s, t, 1, PixelFormat::LUMINANCE, DataType::UNSIGNED_BYTE, 1, reduced).unwrap();
        let base = (s * t) as usize;
        let total = offsets
            .last()
            .map_or(base, |&last| last as usize + tail_size(s, t, reduced));
        let data = (0..total).map(|i| (i * 31 % 251) as u8).collect();
        Image::from_pixels(s, t, 1, PixelFormat::LUMINANCE, DataType::UNSIGNED_BYTE, 1, reduced, data).unwrap()
    }

    fn tail_size(s: i32, t: i32, level: usize) -> usize {
        let (mut s, mut t) = (s, t);
        for _ in 0..level {
            s = (s / 2).max(1);
            t = (t / 2).max(1);
        }
        (s * t) as usize
    }

    /// An empty image carrying only the metadata the wrapper reads first.
    fn target_like(image: &Image) -> Image {
        let mut target = Image::new().with_file_name(image.file_name.clone());
        target.pixel_format = image.pixel_format;
        target.data_type = image.data_type;
        target.packing = image.packing;
        target
    }

    fn encode_binary(services: &Services, image: &Image, options: Options) -> (bool, Vec<u8>) {
        let mut buf = Vec::new();
        let written = {
            let mut os = OutputStream::binary(&mut buf, options);
            ImageDataCodec::new(services).encode(&mut os, image).unwrap()
        };
        (written, buf)
    }

    fn encode_text(services: &Services, image: &Image, options: Options) -> String {
        let mut buf = Vec::new();
        {
            let mut os = OutputStream::text(&mut buf, options);
            assert!(ImageDataCodec::new(services).encode(&mut os, image).unwrap());
        }
        String::from_utf8(buf).unwrap()
    }

    fn decode_binary(services: &Services, bytes: &[u8], target: &mut Image) -> IoResult<bool> {
        let mut is = InputStream::binary(bytes, Options::default());
        ImageDataCodec::new(services).decode(&mut is, target)
    }

    fn decode_text(services: &Services, text: &str, target: &mut Image) -> IoResult<bool> {
        let mut is = InputStream::text(text.as_bytes(), Options::default()).unwrap();
        ImageDataCodec::new(services).decode(&mut is, target)
    }

    #[test]
    fn test_resolve_decision() {
        use ImageDecision::*;
        use WriteImageHint as H;

        assert_eq!(ImageDecision::resolve(H::IncludeData, WriteHint::ExternalFile, false), InlineData);
        assert_eq!(ImageDecision::resolve(H::IncludeFile, WriteHint::NoPreference, true), InlineFile);
        assert_eq!(ImageDecision::resolve(H::WriteOut, WriteHint::StoreInline, true), WriteOut);
        assert_eq!(ImageDecision::resolve(H::UseExternal, WriteHint::StoreInline, true), External);
        assert_eq!(ImageDecision::resolve(H::Default, WriteHint::ExternalFile, true), External);
        assert_eq!(ImageDecision::resolve(H::Default, WriteHint::StoreInline, true), InlineData);
        assert_eq!(ImageDecision::resolve(H::Default, WriteHint::NoPreference, false), External);
        assert_eq!(ImageDecision::from_i32(9), None);
    }

    #[test]
    fn test_binary_layout_4x4() {
        let services = Services::default();
        let image = l8(4, 4, 0);
        let (written, bytes) = encode_binary(&services, &image, Options::default());
        assert!(written);

        let mut expected = Vec::new();
        for v in [1u32, 4, 4, 1, 16] {
            expected.extend(v.to_le_bytes());
        }
        expected.extend(image.data().unwrap());
        expected.extend(0u32.to_le_bytes());
        assert_eq!(bytes.len(), 40);
        assert_eq!(bytes, expected);

        let mut target = target_like(&image);
        assert!(decode_binary(&services, &bytes, &mut target).unwrap());
        assert_eq!(target.data(), image.data());
        assert!(target.mipmap_offsets().is_empty());
        assert_eq!((target.s(), target.t(), target.r()), (4, 4, 1));
    }

    #[test]
    fn test_binary_mipmap_roundtrip() {
        let services = Services::default();
        for reduced in [0, 1, 3] {
            let image = l8(8, 4, reduced);
            let (_, bytes) = encode_binary(&services, &image, Options::default());

            let mut target = target_like(&image);
            decode_binary(&services, &bytes, &mut target).unwrap();
            assert_eq!(target.data(), image.data(), "reduced levels: {reduced}");
            assert_eq!(target.mipmap_offsets(), image.mipmap_offsets());
            assert_eq!(target.num_mipmap_levels(), reduced + 1);
        }
    }

    #[test]
    fn test_binary_offsets_are_cumulative() {
        let services = Services::default();
        let image = l8(8, 4, 3);
        let (_, bytes) = encode_binary(&services, &image, Options::default());

        // Level sizes: 32, 8, 2, 1.
        let tail = &bytes[bytes.len() - 16..];
        let words: Vec<u32> = tail
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        assert_eq!(words, [3, 32, 40, 42]);
    }

    #[test]
    fn test_text_mipmap_roundtrip() {
        let services = Services::default();
        let options = Options::default().with_write_image_hint(WriteImageHint::IncludeData);
        for reduced in [0, 1, 3] {
            let image = l8(8, 4, reduced);
            let text = encode_text(&services, &image, options.clone());
            assert!(text.contains(&format!("LevelSize {}", reduced + 1)), "{text}");
            assert_eq!(text.matches('"').count(), 2 * (reduced + 1));

            let mut target = target_like(&image);
            decode_text(&services, &text, &mut target).unwrap();
            assert_eq!(target.data(), image.data());
            assert_eq!(target.mipmap_offsets(), image.mipmap_offsets());
        }
    }

    #[test]
    fn test_text_levels_follow_string_count() {
        let services = Services::default();
        let text = "1 {\n Size 2 1 1\n LevelSize 3\n \"AAE=\"\n \"Ag==\"\n \"Aw==\"\n}\n";
        let mut target = Image::new();
        target.pixel_format = PixelFormat::LUMINANCE;
        target.data_type = DataType::UNSIGNED_BYTE;
        decode_text(&services, text, &mut target).unwrap();

        assert_eq!(target.data(), Some(&[0u8, 1, 2, 3][..]));
        assert_eq!(target.mipmap_offsets(), [2, 3]);
    }

    #[test]
    fn test_text_without_data() {
        let services = Services::default();
        let mut image = Image::new();
        image.pixel_format = PixelFormat::RGBA;
        image.data_type = DataType::UNSIGNED_BYTE;
        let options = Options::default().with_write_image_hint(WriteImageHint::IncludeData);
        let text = encode_text(&services, &image, options);
        assert!(text.contains("LevelSize 1"));
        assert!(text.contains("\"\""));

        let mut target = target_like(&image);
        assert!(decode_text(&services, &text, &mut target).unwrap());
        assert!(!target.has_data());
    }

    #[test]
    fn test_binary_without_data() {
        let services = Services::default();
        let (_, bytes) = encode_binary(&services, &Image::new(), Options::default());
        assert_eq!(bytes, [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_text_zero_levels_is_fatal() {
        let services = Services::default();
        let err = decode_text(&services, "1 { Size 1 1 1 LevelSize 0 }", &mut Image::new()).unwrap_err();
        assert!(err.is_exception());
    }

    #[test]
    fn test_text_bad_base64_is_fatal() {
        let services = Services::default();
        let err = decode_text(&services, "1 { Size 1 1 1 LevelSize 1 \"@@@\" }", &mut Image::new()).unwrap_err();
        assert!(err.is_exception());
    }

    #[test]
    fn test_inline_file_missing_source() {
        let services = Services::default();
        let image = l8(2, 2, 0).with_file_name("gone.png");
        let options = Options::default().with_write_image_hint(WriteImageHint::IncludeFile);
        let (written, bytes) = encode_binary(&services, &image, options);
        assert!(written);
        assert_eq!(bytes, [2, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_inline_file_embeds_located_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brick.png");
        std::fs::write(&path, b"encoded").unwrap();

        let mut services = Services::default();
        services.located.insert("brick.png".into(), path);
        services.decoded.insert("png", l8(2, 2, 0));

        let image = Image::new().with_file_name("brick.png");
        let options = Options::default().with_write_image_hint(WriteImageHint::IncludeFile);
        let (_, bytes) = encode_binary(&services, &image, options);
        assert_eq!(&bytes[..8], [2, 0, 0, 0, 7, 0, 0, 0]);
        assert_eq!(&bytes[8..], b"encoded");

        let mut target = Image::new().with_file_name("brick.png");
        decode_binary(&services, &bytes, &mut target).unwrap();
        assert_eq!(target.data(), l8(2, 2, 0).data());
    }

    #[test]
    fn test_inline_file_without_reader() {
        let services = Services::default();
        let bytes = [2, 0, 0, 0, 3, 0, 0, 0, b'a', b'b', b'c'];
        let mut target = Image::new().with_file_name("photo.tga");
        assert!(decode_binary(&services, &bytes, &mut target).unwrap());
        assert!(!target.has_data());
    }

    #[test]
    fn test_inline_file_in_text_loads_external() {
        let mut services = Services::default();
        services.files.insert("wall.png".into(), l8(4, 2, 0));

        let mut target = Image::new().with_file_name("wall.png");
        decode_text(&services, "2\n", &mut target).unwrap();
        assert_eq!(target.data(), l8(4, 2, 0).data());
    }

    #[test]
    fn test_write_out_empty_name() {
        let services = Services::default();
        let options = Options::default().with_write_image_hint(WriteImageHint::WriteOut);
        let (written, bytes) = encode_binary(&services, &l8(2, 2, 0), options);
        assert!(!written);
        assert!(bytes.is_empty());
        assert!(services.written.borrow().is_empty());
    }

    #[test]
    fn test_write_out_failure() {
        let services = Services {
            fail_writes: true,
            ..Default::default()
        };
        let options = Options::default().with_write_image_hint(WriteImageHint::WriteOut);
        let (written, bytes) = encode_binary(&services, &l8(2, 2, 0).with_file_name("out.png"), options);
        assert!(!written);
        assert!(bytes.is_empty());
    }

    #[test]
    fn test_write_out_then_reference() {
        let services = Services::default();
        let options = Options::default().with_write_image_hint(WriteImageHint::WriteOut);
        let (written, bytes) = encode_binary(&services, &l8(2, 2, 0).with_file_name("out.png"), options);
        assert!(written);
        assert_eq!(bytes, [3, 0, 0, 0]);
        assert_eq!(*services.written.borrow(), [PathBuf::from("out.png")]);
    }

    #[test]
    fn test_external_reference() {
        let mut services = Services::default();
        let mut image = l8(4, 4, 1).with_file_name("tree.png");
        image.write_hint = WriteHint::ExternalFile;
        let (_, bytes) = encode_binary(&services, &image, Options::default());
        assert_eq!(bytes, [0, 0, 0, 0]);

        let mut target = target_like(&image);
        decode_binary(&services, &bytes, &mut target).unwrap();
        assert!(!target.has_data());

        services.files.insert("tree.png".into(), image.clone());
        decode_binary(&services, &bytes, &mut target).unwrap();
        assert_eq!(target.data(), image.data());
        assert_eq!(target.mipmap_offsets(), image.mipmap_offsets());
    }

    #[test]
    fn test_oversized_dimensions_pass_through() {
        let services = Services::default();
        let mut bytes = Vec::new();
        for v in [1, i32::MAX, i32::MAX, i32::MAX] {
            bytes.extend(v.to_le_bytes());
        }
        bytes.extend(1u32.to_le_bytes());
        bytes.push(7);
        bytes.extend(0u32.to_le_bytes());

        let mut target = Image::new();
        target.pixel_format = PixelFormat::RGBA;
        target.data_type = DataType::FLOAT;
        assert!(decode_binary(&services, &bytes, &mut target).unwrap());
        assert!(target.validate().is_err());

        // Levels clamp to the buffer, so the payload is written back as read.
        let (written, encoded) = encode_binary(&services, &target, Options::default());
        assert!(written);
        assert_eq!(encoded, bytes);
    }

    #[test]
    fn test_truncated_payload() {
        let services = Services::default();
        let bytes = [1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 9, 0, 0, 0, 1, 2];
        let err = decode_binary(&services, &bytes, &mut Image::new()).unwrap_err();
        assert!(matches!(err, IoError::UnexpectedEof));
    }
}
