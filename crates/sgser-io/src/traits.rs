//! Collaborator traits used by the image data codec.
//!
//! The codec never talks to a concrete registry; it is handed trait
//! objects so tests and embedders can swap any of them out.

use crate::IoResult;
use sgser_core::Image;
use std::path::{Path, PathBuf};

/// Decodes an in-memory encoded image (e.g. PNG bytes).
pub trait ImageDecoder {
    /// Decodes `bytes` using the codec registered for `extension`.
    ///
    /// Returns [`IoError::UnsupportedFormat`](crate::IoError::UnsupportedFormat)
    /// when no codec handles the extension.
    fn decode(&self, extension: &str, bytes: &[u8]) -> IoResult<Image>;
}

/// Loads an image file from disk.
pub trait FileLoader {
    /// Loads the image named `path`, applying any search path.
    fn load(&self, path: &Path) -> IoResult<Image>;
}

/// Writes an image to an encoded file.
pub trait ImageFileWriter {
    /// Writes `image` to `path`, picking the codec by extension.
    fn write_image(&self, image: &Image, path: &Path) -> IoResult<()>;
}

/// Resolves relative data-file names.
pub trait FileLocator {
    /// Returns the path of an existing file for `name`.
    fn find_data_file(&self, name: &str) -> Option<PathBuf>;
}
