use anyhow::{bail, Context, Result};
use clap::Parser;
use icopack::scale::render_sizes;
use icopack::{IconDir, IconImage};
use image::ImageReader;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Converts a PNG or JPEG image into a multi-size Windows icon file.
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Input image path (.png, .jpg or .jpeg)
    #[clap(short)]
    input: Option<PathBuf>,

    /// Output icon path (defaults to the input file name with an .ico
    /// extension, in the current directory)
    #[clap(short)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    run(&args)
}

fn run(args: &Args) -> Result<()> {
    let input = args
        .input
        .as_deref()
        .context("no input file given (use -i <path>)")?;
    check_extension(input)?;
    let output = match &args.output {
        Some(path) => path.clone(),
        None => default_output(input),
    };

    let file = File::open(input)
        .with_context(|| format!("failed to open input file '{}'", input.display()))?;
    let source = ImageReader::new(BufReader::new(file))
        .with_guessed_format()
        .with_context(|| format!("failed to read input file '{}'", input.display()))?
        .decode()
        .with_context(|| format!("failed to decode '{}' as an image", input.display()))?
        .into_rgba8();
    log::debug!("decoded {}x{} source image", source.width(), source.height());

    let mut dir = IconDir::new();
    for canvas in render_sizes(&source) {
        let (width, height) = canvas.dimensions();
        let frame = IconImage::from_rgba_data(width, height, canvas.into_raw());
        dir.add_icon(&frame)
            .with_context(|| format!("failed to encode the {}x{} frame", width, height))?;
    }

    let out_file = File::create(&output)
        .with_context(|| format!("failed to create output file '{}'", output.display()))?;
    let mut writer = BufWriter::new(out_file);
    dir.write(&mut writer)
        .with_context(|| format!("failed to write icon file '{}'", output.display()))?;
    writer
        .flush()
        .with_context(|| format!("failed to write icon file '{}'", output.display()))?;

    println!("converted '{}' to '{}'", input.display(), output.display());
    Ok(())
}

/// The input extension decides whether we accept the file at all; the
/// match is exact and case-sensitive.
fn check_extension(path: &Path) -> Result<()> {
    match path.extension().and_then(OsStr::to_str) {
        Some("png" | "jpg" | "jpeg") => Ok(()),
        _ => bail!(
            "unsupported input format '{}' (only .png, .jpg and .jpeg are \
             supported)",
            path.display()
        ),
    }
}

/// Default output path: the input's base name with the extension
/// replaced by `.ico`, in the current working directory.
fn default_output(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_else(|| input.as_os_str());
    PathBuf::from(stem).with_extension("ico")
}
