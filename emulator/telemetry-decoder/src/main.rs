// Licensed under the Apache-2.0 license

use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;
use telemetry_decoder::{decode_file, decode_hex, DecodedFrame};

/// Telemetry Decoder
///
/// Decodes the 12-byte telemetry uplinks sent by the device into readable
/// values.
///
/// # Examples
///
/// ```bash
/// telemetry-decoder 098B0F1C279E000AFFFB2652
/// telemetry-decoder --json --file uplinks.txt
/// ```
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Frames as hex strings
    frames: Vec<String>,

    /// Read frames from a file, one hex frame per line
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, default_value_t = false)]
    json: bool,

    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    SimpleLogger::new().with_level(level).init()?;

    let mut frames: Vec<DecodedFrame> = Vec::new();
    if let Some(path) = &cli.file {
        frames.extend(decode_file(path)?);
    }
    for text in &cli.frames {
        frames.push(decode_hex(text)?);
    }
    if frames.is_empty() {
        bail!("no frames given; pass hex frames or --file");
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&frames)?);
    } else {
        for frame in &frames {
            println!("{}", frame);
        }
    }
    Ok(())
}
