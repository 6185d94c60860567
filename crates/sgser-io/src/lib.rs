//! # sgser-io
//!
//! Binary and text object streams for scene-graph images.
//!
//! This crate reads and writes `osg::Image`, `osg::UByteArray` and
//! `osg::TextureBuffer` objects in the versioned stream format used by
//! scene-graph plugins:
//!
//! - [`stream`] - Binary and text stream personalities
//! - [`codec`] - The image `Data` codec: inline pixels, embedded files or
//!   external references, with mipmap chains
//! - [`wrappers`] - Per-class property tables
//! - [`object`] / [`document`] - Object framing and file headers
//! - [`registry`] - Image codec lookup by extension or magic bytes
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sgser_io::{read_file, write_file, Object, ObjectRef, Options};
//!
//! let options: Options = "WriteImageHint=IncludeData".parse()?;
//! write_file("brick.osgb".as_ref(), ObjectRef::Image(&image), &options)?;
//!
//! if let Some(Object::Image(image)) = read_file("brick.osgb".as_ref(), &options)? {
//!     println!("{}x{}", image.s(), image.t());
//! }
//! ```
//!
//! # Storage Decision
//!
//! | Stream hint | Result |
//! |-------------|--------|
//! | `IncludeData` | Inline pixels |
//! | `IncludeFile` | Embedded encoded file (binary only) |
//! | `UseExternal` | File name reference |
//! | `WriteOut` | Image written to its file name, then referenced |
//! | `Default` | External if the image asks for it, else inline in binary and external in text |
//!
//! # Feature Flags
//!
//! - `png` - Built-in PNG codec (default)

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod codec;
pub mod document;
mod error;
pub mod object;
pub mod options;
#[cfg(feature = "png")]
pub mod png;
pub mod registry;
pub mod search;
pub mod stream;
pub mod traits;
pub mod wrappers;

pub use codec::{ImageDataCodec, ImageDecision};
pub use document::{read_document, read_file, write_document, write_file};
pub use error::{IoError, IoResult};
pub use object::{read_object, write_object, Object, ObjectRef};
pub use options::{Options, WriteImageHint, FILE_PATH_ENV};
pub use registry::{FormatInfo, FormatRegistry, RegistryServices};
pub use search::DataFilePathList;
pub use stream::{InputStream, OutputStream, StreamReader, StreamWriter, CURRENT_VERSION};
pub use traits::{FileLoader, FileLocator, ImageDecoder, ImageFileWriter};
