//! Pack command: image file in, object document out.

use crate::PackArgs;
use anyhow::{Context, Result};
use sgser_core::TextureBuffer;
use sgser_io::{write_file, ObjectRef, Options};
use tracing::info;

/// Runs the pack command.
pub fn run(args: PackArgs, options: Options) -> Result<()> {
    let mut options = options;
    if args.ascii {
        options.ascii = true;
    }
    if let Some(hint) = args.hint {
        options.write_image_hint = hint.into();
    }

    let name = args
        .name
        .clone()
        .unwrap_or_else(|| args.input.to_string_lossy().into_owned());
    let image = super::load_image(&args.input, &options)?.with_file_name(name);
    info!(
        "loaded {} ({}x{}x{}, {} bytes)",
        args.input.display(),
        image.s(),
        image.t(),
        image.r(),
        image.data().map_or(0, <[u8]>::len)
    );

    let result = if args.texture_buffer {
        let width = image.s();
        let texture = TextureBuffer::new(image, width);
        write_file(&args.output, ObjectRef::TextureBuffer(&texture), &options)
    } else {
        write_file(&args.output, ObjectRef::Image(&image), &options)
    };
    result.with_context(|| format!("Failed to write: {}", args.output.display()))?;

    println!("{} -> {}", args.input.display(), args.output.display());
    Ok(())
}
