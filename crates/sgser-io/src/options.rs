//! Stream options.
//!
//! Options control how streams are written and where external files are
//! searched. They are usually built from an option string, the same
//! `Key=Value` tokens reader/writer plugins accept:
//!
//! ```rust
//! use sgser_io::{Options, WriteImageHint};
//!
//! let options: Options = "WriteImageHint=IncludeFile Ascii".parse().unwrap();
//! assert_eq!(options.write_image_hint, WriteImageHint::IncludeFile);
//! assert!(options.ascii);
//! ```
//!
//! # Recognized tokens
//!
//! | Token | Effect |
//! |-------|--------|
//! | `Ascii` | Write the text format instead of binary |
//! | `WriteImageHint=IncludeData` | Embed raw pixel data |
//! | `WriteImageHint=IncludeFile` | Embed the original image file |
//! | `WriteImageHint=UseExternal` | Reference the image file by name |
//! | `WriteImageHint=WriteOut` | Write the image to its file name, then reference it |
//! | `FileVersion=N` | Write an older document version |
//!
//! Unknown tokens are ignored so option strings can be shared with other
//! plugins.

use crate::registry::{FormatRegistry, RegistryServices};
use crate::search::DataFilePathList;
use crate::stream::CURRENT_VERSION;
use crate::{IoError, IoResult};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Environment variable holding the default data-file search path.
pub const FILE_PATH_ENV: &str = "SGSER_FILE_PATH";

/// Stream-level override of how image pixel data is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WriteImageHint {
    /// Decide per image (image hint, then stream mode).
    #[default]
    Default,
    /// Embed raw pixel data.
    IncludeData,
    /// Embed the original encoded image file.
    IncludeFile,
    /// Reference the image file by name only.
    UseExternal,
    /// Write the image to its file name, then reference it.
    WriteOut,
}

impl FromStr for WriteImageHint {
    type Err = IoError;

    fn from_str(s: &str) -> IoResult<Self> {
        match s {
            "IncludeData" => Ok(Self::IncludeData),
            "IncludeFile" => Ok(Self::IncludeFile),
            "UseExternal" => Ok(Self::UseExternal),
            "WriteOut" => Ok(Self::WriteOut),
            "Default" => Ok(Self::Default),
            other => Err(IoError::Parse(format!("unknown WriteImageHint value '{other}'"))),
        }
    }
}

/// Options shared by input and output streams.
#[derive(Debug, Clone)]
pub struct Options {
    /// Stream-level image storage override.
    pub write_image_hint: WriteImageHint,
    /// Write the text format.
    pub ascii: bool,
    /// Document version to write.
    pub file_version: u32,
    /// Directories searched for relative file names.
    pub data_file_paths: DataFilePathList,
    /// Format registry; `None` uses [`FormatRegistry::global`].
    pub registry: Option<Arc<FormatRegistry>>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            write_image_hint: WriteImageHint::Default,
            ascii: false,
            file_version: CURRENT_VERSION,
            data_file_paths: DataFilePathList::default(),
            registry: None,
        }
    }
}

impl Options {
    /// Creates default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends directories from [`FILE_PATH_ENV`], if set.
    pub fn with_env_paths(mut self) -> Self {
        if let Some(paths) = DataFilePathList::from_env(FILE_PATH_ENV) {
            self.data_file_paths.extend(paths);
        }
        self
    }

    /// Sets the write image hint, builder style.
    pub fn with_write_image_hint(mut self, hint: WriteImageHint) -> Self {
        self.write_image_hint = hint;
        self
    }

    /// Selects text output, builder style.
    pub fn with_ascii(mut self, ascii: bool) -> Self {
        self.ascii = ascii;
        self
    }

    /// Uses a custom format registry, builder style.
    pub fn with_registry(mut self, registry: Arc<FormatRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// The registry to use for codec lookups.
    pub fn registry(&self) -> &FormatRegistry {
        self.registry.as_deref().unwrap_or_else(|| FormatRegistry::global())
    }

    /// Codec collaborators for these options: the registry plus the search
    /// path.
    pub fn services(&self) -> RegistryServices<'_> {
        RegistryServices::new(self.registry(), self.data_file_paths.clone())
    }
}

impl FromStr for Options {
    type Err = IoError;

    fn from_str(s: &str) -> IoResult<Self> {
        let mut options = Options::default();
        for token in s.split_whitespace() {
            match token.split_once('=') {
                Some(("WriteImageHint", value)) => options.write_image_hint = value.parse()?,
                Some(("FileVersion", value)) => {
                    options.file_version = value
                        .parse()
                        .map_err(|_| IoError::Parse(format!("invalid FileVersion '{value}'")))?;
                }
                None if token == "Ascii" => options.ascii = true,
                _ => debug!("ignoring unknown option '{token}'"),
            }
        }
        Ok(options)
    }
}
