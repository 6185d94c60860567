//! # sgser-core
//!
//! Core types for scene-graph image serialization.
//!
//! This crate provides the in-memory model the serializers in `sgser-io`
//! read and write:
//!
//! - [`Image`] - Dimensions, GL format description, owned pixel buffer and
//!   mipmap offsets
//! - [`PixelBuffer`] - Single-owner pixel storage moved into an image
//! - [`PixelFormat`], [`DataType`] - GL enum newtypes
//! - [`format`] - Image and mipmap size arithmetic
//! - [`TextureBuffer`], [`BufferData`] - Buffer-backed textures
//!
//! ## Crate Structure
//!
//! ```text
//! sgser-core (this crate)
//!    ^
//!    |
//!    +-- sgser-io (streams, registry, image data codec, wrappers)
//!          ^
//!          +-- sgser-cli
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod format;
pub mod image;
pub mod texture;

pub use error::{Error, Result};
pub use format::{DataType, PixelFormat};
pub use image::{Image, Levels, Origin, PixelBuffer, WriteHint};
pub use texture::{BufferData, TextureBuffer};
