//! sgser - pack images into scene-graph object documents and inspect them

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use sgser_io::{Options, WriteImageHint};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "sgser")]
#[command(author, version, about = "Scene-graph image serializer")]
#[command(long_about = "
Packs images into .osgb/.osgt object documents and unpacks them again.

Examples:
  sgser pack brick.png -o brick.osgb                  # Inline pixels
  sgser pack brick.png -o brick.osgb --hint include-file
  sgser pack brick.png -o brick.osgt                  # Text, external reference
  sgser pack brick.png -o brick.osgt --hint include-data
  sgser unpack brick.osgb -o copy.png
  sgser info brick.osgb --json
  sgser -I textures info scene.osgt
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Plugin option string, e.g. "WriteImageHint=IncludeFile Ascii"
    #[arg(short = 'O', long, global = true)]
    options: Option<String>,

    /// Extra directory searched for external image files
    #[arg(short = 'I', long = "search-path", global = true)]
    search_paths: Vec<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack an image file into an object document
    #[command(visible_alias = "p")]
    Pack(PackArgs),

    /// Extract the image of an object document to an image file
    #[command(visible_alias = "u")]
    Unpack(UnpackArgs),

    /// Describe the object stored in a document
    #[command(visible_alias = "i")]
    Info(InfoArgs),
}

/// How image pixels are stored, as a command-line value.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum HintArg {
    /// Embed raw pixel data
    IncludeData,
    /// Embed the original image file (binary documents only)
    IncludeFile,
    /// Reference the image file by name
    UseExternal,
    /// Write the image to its file name, then reference it
    WriteOut,
}

impl From<HintArg> for WriteImageHint {
    fn from(hint: HintArg) -> Self {
        match hint {
            HintArg::IncludeData => Self::IncludeData,
            HintArg::IncludeFile => Self::IncludeFile,
            HintArg::UseExternal => Self::UseExternal,
            HintArg::WriteOut => Self::WriteOut,
        }
    }
}

#[derive(Args)]
struct PackArgs {
    /// Input image
    input: PathBuf,

    /// Output document (.osgb or .osgt)
    #[arg(short, long)]
    output: PathBuf,

    /// Write a text document
    #[arg(short, long)]
    ascii: bool,

    /// Pixel storage, overriding the option string
    #[arg(long)]
    hint: Option<HintArg>,

    /// File name stored in the document (defaults to the input path)
    #[arg(long)]
    name: Option<String>,

    /// Wrap the image in a texture buffer object
    #[arg(long)]
    texture_buffer: bool,
}

#[derive(Args)]
struct UnpackArgs {
    /// Input document
    input: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Args)]
struct InfoArgs {
    /// Input document(s)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_options(cli: &Cli) -> Result<Options> {
    let options: Options = match &cli.options {
        Some(text) => text
            .parse()
            .with_context(|| format!("Invalid option string: {text}"))?,
        None => Options::default(),
    };
    let mut options = options.with_env_paths();
    for dir in &cli.search_paths {
        options.data_file_paths.push(dir.clone());
    }
    Ok(options)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let options = build_options(&cli)?;

    match cli.command {
        Commands::Pack(args) => commands::pack::run(args, options),
        Commands::Unpack(args) => commands::unpack::run(args, options),
        Commands::Info(args) => commands::info::run(args, options),
    }
}
