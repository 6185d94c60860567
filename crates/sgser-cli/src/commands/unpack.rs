//! Unpack command: object document in, image file out.

use crate::UnpackArgs;
use anyhow::{bail, Context, Result};
use sgser_core::{BufferData, Image};
use sgser_io::{read_file, Object, Options};

/// Runs the unpack command.
pub fn run(args: UnpackArgs, options: Options) -> Result<()> {
    let object = read_file(&args.input, &options)
        .with_context(|| format!("Failed to read: {}", args.input.display()))?;

    let image = match object {
        Some(object) => image_of(object)?,
        None => bail!("{} holds a NULL object", args.input.display()),
    };
    if !image.has_data() {
        bail!(
            "{} has no pixel data (external file '{}' not found)",
            args.input.display(),
            image.file_name
        );
    }

    super::save_image(&args.output, &image, &options)?;
    println!("{} -> {}", args.input.display(), args.output.display());
    Ok(())
}

fn image_of(object: Object) -> Result<Image> {
    match object {
        Object::Image(image) => Ok(image),
        Object::TextureBuffer(texture) => match texture.buffer_data {
            Some(BufferData::Image(image)) => Ok(*image),
            _ => bail!("texture buffer does not hold an image"),
        },
        other => bail!("{} is not an image", other.class_name()),
    }
}
