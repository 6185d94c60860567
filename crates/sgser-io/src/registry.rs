//! Format registry for image codec lookup.
//!
//! The registry provides a centralized way to:
//! - Register codecs as plain function pointers
//! - Find a codec by file extension (case-insensitive) or magic bytes
//! - Read and write image files by path
//!
//! The global instance ([`FormatRegistry::global()`]) is built once with
//! the codecs enabled by crate features and is immutable afterwards, so
//! it can be shared across threads.
//!
//! # Example
//!
//! ```rust
//! use sgser_io::FormatRegistry;
//!
//! let registry = FormatRegistry::global();
//! # #[cfg(feature = "png")]
//! assert!(registry.supports_extension("PNG"));
//! ```

use crate::search::DataFilePathList;
use crate::traits::{FileLoader, FileLocator, ImageDecoder, ImageFileWriter};
use crate::{IoError, IoResult};
use sgser_core::Image;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Number of leading bytes inspected by [`FormatRegistry::detect_format`].
const MAGIC_LEN: usize = 16;

/// Format information entry in the registry.
#[derive(Clone)]
pub struct FormatInfo {
    /// Human-readable format name (e.g. "PNG").
    pub name: &'static str,
    /// File extensions without dots, lowercase.
    pub extensions: &'static [&'static str],
    /// Checks whether header bytes belong to this format.
    pub can_read: fn(&[u8]) -> bool,
    /// Decodes an in-memory file.
    pub read_memory: fn(&[u8]) -> IoResult<Image>,
    /// Encodes an image to an in-memory file (None if write not supported).
    pub write_memory: Option<fn(&Image) -> IoResult<Vec<u8>>>,
}

impl fmt::Debug for FormatInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatInfo")
            .field("name", &self.name)
            .field("extensions", &self.extensions)
            .field("writable", &self.write_memory.is_some())
            .finish()
    }
}

/// Central registry of image codecs.
pub struct FormatRegistry {
    formats: HashMap<&'static str, Arc<FormatInfo>>,
    by_extension: HashMap<&'static str, &'static str>,
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.format_names().collect();
        names.sort_unstable();
        f.debug_struct("FormatRegistry").field("formats", &names).finish()
    }
}

impl FormatRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            formats: HashMap::new(),
            by_extension: HashMap::new(),
        }
    }

    /// Returns the global registry instance with built-in formats.
    pub fn global() -> &'static FormatRegistry {
        static INSTANCE: OnceLock<FormatRegistry> = OnceLock::new();
        INSTANCE.get_or_init(|| {
            let mut registry = FormatRegistry::new();
            registry.register_builtin_formats();
            registry
        })
    }

    /// Creates a registry holding only the built-in formats.
    pub fn with_builtin_formats() -> Self {
        let mut registry = Self::new();
        registry.register_builtin_formats();
        registry
    }

    fn register_builtin_formats(&mut self) {
        #[cfg(feature = "png")]
        self.register(FormatInfo {
            name: "PNG",
            extensions: &["png"],
            can_read: |h| h.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
            read_memory: crate::png::read_from_memory,
            write_memory: Some(crate::png::write_to_memory),
        });
    }

    /// Registers a format, replacing any format with the same name or
    /// extension.
    pub fn register(&mut self, info: FormatInfo) {
        let name = info.name;
        for ext in info.extensions {
            self.by_extension.insert(ext, name);
        }
        self.formats.insert(name, Arc::new(info));
    }

    /// Returns an iterator over registered format names.
    pub fn format_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.formats.keys().copied()
    }

    /// Returns format info by name.
    pub fn get(&self, name: &str) -> Option<&FormatInfo> {
        self.formats.get(name).map(|arc| arc.as_ref())
    }

    /// Returns format info by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<&FormatInfo> {
        let ext_lower = ext.to_lowercase();
        self.by_extension
            .get(ext_lower.as_str())
            .and_then(|name| self.formats.get(name))
            .map(|arc| arc.as_ref())
    }

    /// Checks if an extension is supported.
    pub fn supports_extension(&self, ext: &str) -> bool {
        self.by_extension.contains_key(ext.to_lowercase().as_str())
    }

    /// Detects format from file header bytes.
    pub fn detect_format(&self, header: &[u8]) -> Option<&'static str> {
        let header = &header[..header.len().min(MAGIC_LEN)];
        self.formats
            .iter()
            .find(|(_, info)| (info.can_read)(header))
            .map(|(name, _)| *name)
    }

    /// Reads an image file, detecting the format by magic bytes first and
    /// falling back to the extension.
    pub fn read(&self, path: &Path) -> IoResult<Image> {
        let bytes = std::fs::read(path)?;
        if let Some(info) = self.detect_format(&bytes).and_then(|name| self.get(name)) {
            debug!("{}: detected {}", path.display(), info.name);
            return (info.read_memory)(&bytes);
        }
        let ext = extension_of(path);
        match self.get_by_extension(&ext) {
            Some(info) => (info.read_memory)(&bytes),
            None => Err(IoError::UnsupportedFormat(unknown_if_empty(ext))),
        }
    }

    /// Writes an image file, choosing the codec by extension.
    pub fn write(&self, path: &Path, image: &Image) -> IoResult<()> {
        let ext = extension_of(path);
        let write_fn = self
            .get_by_extension(&ext)
            .and_then(|info| info.write_memory)
            .ok_or_else(|| IoError::UnsupportedFormat(unknown_if_empty(ext)))?;
        let bytes = write_fn(image)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default()
}

fn unknown_if_empty(ext: String) -> String {
    if ext.is_empty() { "unknown".to_string() } else { ext }
}

/// Lowercase extension of a file name, without the dot.
pub fn file_extension(name: &str) -> String {
    extension_of(Path::new(name))
}

impl ImageDecoder for FormatRegistry {
    fn decode(&self, extension: &str, bytes: &[u8]) -> IoResult<Image> {
        let info = self
            .get_by_extension(extension)
            .ok_or_else(|| IoError::UnsupportedFormat(extension.to_string()))?;
        (info.read_memory)(bytes)
    }
}

impl ImageFileWriter for FormatRegistry {
    fn write_image(&self, image: &Image, path: &Path) -> IoResult<()> {
        self.write(path, image)
    }
}

/// A registry paired with a data-file search path.
///
/// Implements every collaborator trait the image data codec needs.
#[derive(Debug, Clone)]
pub struct RegistryServices<'a> {
    /// Codec registry.
    pub registry: &'a FormatRegistry,
    /// Search path for relative file names.
    pub paths: DataFilePathList,
}

impl<'a> RegistryServices<'a> {
    /// Pairs a registry with a search path.
    pub fn new(registry: &'a FormatRegistry, paths: DataFilePathList) -> Self {
        Self { registry, paths }
    }
}

impl ImageDecoder for RegistryServices<'_> {
    fn decode(&self, extension: &str, bytes: &[u8]) -> IoResult<Image> {
        self.registry.decode(extension, bytes)
    }
}

impl FileLoader for RegistryServices<'_> {
    fn load(&self, path: &Path) -> IoResult<Image> {
        let name = path.to_string_lossy();
        let resolved = self
            .paths
            .find_data_file(&name)
            .ok_or_else(|| IoError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, format!("{name} not found"))))?;
        self.registry.read(&resolved)
    }
}

impl ImageFileWriter for RegistryServices<'_> {
    fn write_image(&self, image: &Image, path: &Path) -> IoResult<()> {
        self.registry.write(path, image)
    }
}

impl FileLocator for RegistryServices<'_> {
    fn find_data_file(&self, name: &str) -> Option<PathBuf> {
        self.paths.find_data_file(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sgser_core::{DataType, PixelFormat};

    fn raw_format() -> FormatInfo {
        FormatInfo {
            name: "RAW8",
            extensions: &["raw8"],
            can_read: |h| h.starts_with(b"RAW8"),
            read_memory: |d| {
                let pixels = d.get(4..).unwrap_or_default().to_vec();
                let len = pixels.len() as i32;
                Ok(Image::from_pixels(len.max(1), 1, 1, PixelFormat::LUMINANCE, DataType::UNSIGNED_BYTE, 1, 0, pixels)?)
            },
            write_memory: None,
        }
    }

    #[test]
    fn test_global_registry() {
        let registry = FormatRegistry::global();

        #[cfg(feature = "png")]
        {
            assert!(registry.supports_extension("png"));
            assert!(registry.supports_extension("PNG"));
            let png_header = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
            assert_eq!(registry.detect_format(png_header), Some("PNG"));
        }
        assert!(!registry.supports_extension("xyz"));
    }

    #[test]
    fn test_custom_format() {
        let mut registry = FormatRegistry::new();
        registry.register(raw_format());

        assert_eq!(registry.detect_format(b"RAW8\x01\x02"), Some("RAW8"));
        assert_eq!(registry.get_by_extension("Raw8").map(|i| i.name), Some("RAW8"));

        let image = registry.decode("raw8", b"RAW8\x01\x02\x03").unwrap();
        assert_eq!(image.s(), 3);
        assert_eq!(image.data(), Some(&[1u8, 2, 3][..]));

        assert!(matches!(registry.decode("tga", b""), Err(IoError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_write_without_writer() {
        let mut registry = FormatRegistry::new();
        registry.register(raw_format());
        let dir = tempfile::tempdir().unwrap();
        let result = registry.write(&dir.path().join("out.raw8"), &Image::new());
        assert!(matches!(result, Err(IoError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_services_resolve_through_search_path() {
        let mut registry = FormatRegistry::new();
        registry.register(raw_format());
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("strip.raw8"), b"RAW8\x09\x08").unwrap();

        let services = RegistryServices::new(&registry, [dir.path().to_path_buf()].into_iter().collect());
        let image = services.load(Path::new("strip.raw8")).unwrap();
        assert_eq!(image.data(), Some(&[9u8, 8][..]));
        assert!(services.load(Path::new("gone.raw8")).is_err());
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("dir/Brick.PNG"), "png");
        assert_eq!(file_extension("noext"), "");
    }
}
