//! ninepatch CLI - inspect, render and (de)serialize nine-patch images

use clap::{Parser, Subcommand, ValueEnum};
use image::imageops::FilterType;
use log::{error, info};
use ninepatch::{parse, Chunk, NinePatch, NinePatchError, Remainder};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ninepatch", about = "Inspect and render nine-patch images")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify images and print their stretch chunk
    Inspect {
        /// Input image files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Print the chunk as JSON
        #[arg(short, long)]
        json: bool,
    },
    /// Stretch a raw nine-patch to a new size
    Render {
        /// Raw nine-patch image (with the marker frame)
        input: PathBuf,
        /// Output width in pixels
        #[arg(short = 'W', long)]
        width: u32,
        /// Output height in pixels
        #[arg(short = 'H', long)]
        height: u32,
        /// Output image file
        #[arg(short, long)]
        output: PathBuf,
        /// Resampling filter for stretched regions
        #[arg(short, long, value_enum, default_value = "linear")]
        filter: Filter,
        /// Put rounding slack on the middle stretch region instead of the last segment
        #[arg(long)]
        centered: bool,
        /// Scale the source before stretching (display density / asset density)
        #[arg(short, long, default_value = "1.0")]
        scale: f32,
    },
    /// Write the serialized chunk of a raw nine-patch
    Encode {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print a serialized chunk as JSON
    Decode { input: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum Filter {
    Nearest,
    Linear,
    Cubic,
}

impl From<Filter> for FilterType {
    fn from(filter: Filter) -> Self {
        match filter {
            Filter::Nearest => FilterType::Nearest,
            Filter::Linear => FilterType::Triangle,
            Filter::Cubic => FilterType::CatmullRom,
        }
    }
}

fn main() -> Result<(), NinePatchError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match args.command {
        Command::Inspect { inputs, json } => {
            let reports: Vec<_> = inputs.par_iter().map(|path| (path, inspect(path, json))).collect();
            for (path, report) in reports {
                match report {
                    Ok(text) => println!("{}: {}", path.display(), text),
                    Err(e) => error!("{}: {}", path.display(), e),
                }
            }
        }
        Command::Render { input, width, height, output, filter, centered, scale } => {
            let image = image::open(&input)?.to_rgba8();
            let remainder = if centered { Remainder::Centered } else { Remainder::Last };
            let patch = NinePatch::from_raw(&image)
                .with_filter(filter.into())
                .with_remainder(remainder)
                .scaled(scale);
            if patch.chunk().is_empty() {
                info!("{} has no nine-patch frame, scaling it whole", input.display());
            }
            patch.render(width, height).save(&output)?;
            info!("wrote {}x{} image to {}", width, height, output.display());
        }
        Command::Encode { input, output } => {
            let image = image::open(&input)?.to_rgba8();
            let chunk = ninepatch::scan::analyze(&image)?;
            std::fs::write(&output, chunk.to_bytes()?)?;
            info!("wrote chunk of {} to {}", input.display(), output.display());
        }
        Command::Decode { input } => {
            let chunk = Chunk::parse(&std::fs::read(&input)?)?;
            println!("{}", to_json(&chunk));
        }
    }
    Ok(())
}

fn inspect(path: &Path, json: bool) -> Result<String, NinePatchError> {
    let image = image::open(path)?;
    let parsed = parse(Some(&image), None)?;
    let Some(chunk) = parsed.chunk else {
        return Ok("plain image".to_string());
    };
    if json {
        return Ok(to_json(&chunk));
    }
    let p = chunk.padding;
    Ok(format!(
        "{:?}, x divs {:?}, y divs {:?}, padding [{}, {}, {}, {}], {} colors",
        parsed.kind,
        chunk.x_divs.iter().map(|d| (d.start, d.stop)).collect::<Vec<_>>(),
        chunk.y_divs.iter().map(|d| (d.start, d.stop)).collect::<Vec<_>>(),
        p.left,
        p.top,
        p.right,
        p.bottom,
        chunk.colors.len()
    ))
}

fn to_json(chunk: &Chunk) -> String {
    serde_json::to_string_pretty(chunk).unwrap_or_else(|e| format!("<unserializable chunk: {e}>"))
}
