//! Integration tests for sgser crates.
//!
//! End-to-end checks of documents on disk: inline pixel data with mipmap
//! chains, embedded image files, external references resolved through the
//! search path, and images written out next to the document.

#[cfg(test)]
mod golden;
