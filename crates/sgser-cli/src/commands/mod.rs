//! CLI command implementations

pub mod info;
pub mod pack;
pub mod unpack;

use anyhow::{Context, Result};
use sgser_core::Image;
use sgser_io::Options;
use std::path::Path;

/// Load an image file through the options' format registry
pub fn load_image(path: &Path, options: &Options) -> Result<Image> {
    options
        .registry()
        .read(path)
        .with_context(|| format!("Failed to load: {}", path.display()))
}

/// Save an image file through the options' format registry
pub fn save_image(path: &Path, image: &Image, options: &Options) -> Result<()> {
    options
        .registry()
        .write(path, image)
        .with_context(|| format!("Failed to save: {}", path.display()))
}

/// Format a byte count for display
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(12), "12 B");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }
}
