use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use opwire_tools::{
    decode_client_capture, decode_server_capture, inspect_client_capture, inspect_server_capture,
    score_to_json,
};
use track::{decode_score, encode_score};

#[derive(Parser)]
#[command(
    name = "opwire-tools",
    version,
    about = "opwire inspection and decoding tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Split a capture into frames and report sizes.
    Inspect {
        /// Path to the captured bytes.
        capture: PathBuf,
        /// Which direction the capture was taken from.
        #[arg(long, value_enum, default_value_t = DirectionArg::Clientbound)]
        direction: DirectionArg,
    },
    /// Decode a capture into structured JSON.
    Decode {
        /// Path to the captured bytes.
        capture: PathBuf,
        /// Which direction the capture was taken from.
        #[arg(long, value_enum, default_value_t = DirectionArg::Clientbound)]
        direction: DirectionArg,
        /// Output format.
        #[arg(long, value_enum, default_value_t = DecodeFormat::Json)]
        format: DecodeFormat,
    },
    /// Dump an exported track file as JSON.
    Track {
        /// Path to the track file.
        file: PathBuf,
    },
    /// Decode a track file, re-encode it and verify byte identity.
    TrackVerify {
        /// Path to the track file.
        file: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DirectionArg {
    Serverbound,
    Clientbound,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DecodeFormat {
    Json,
    Pretty,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Inspect { capture, direction } => {
            let bytes = read_file(&capture)?;
            let reports = match direction {
                DirectionArg::Serverbound => inspect_client_capture(&bytes)?,
                DirectionArg::Clientbound => inspect_server_capture(&bytes)?,
            };
            for report in &reports {
                println!(
                    "{:>8}  opcode {:>3}  {:<20} {} bytes",
                    report.offset, report.opcode, report.kind, report.body_bytes
                );
            }
            println!("{} frames, {} bytes", reports.len(), bytes.len());
        }
        Command::Decode {
            capture,
            direction,
            format,
        } => {
            let bytes = read_file(&capture)?;
            let value = match direction {
                DirectionArg::Serverbound => serde_json::to_value(decode_client_capture(&bytes)?)?,
                DirectionArg::Clientbound => serde_json::to_value(decode_server_capture(&bytes)?)?,
            };
            match format {
                DecodeFormat::Json => println!("{}", serde_json::to_string(&value)?),
                DecodeFormat::Pretty => println!("{}", serde_json::to_string_pretty(&value)?),
            }
        }
        Command::Track { file } => {
            let bytes = read_file(&file)?;
            let score = decode_score(&bytes).context("decode track")?;
            println!("{}", serde_json::to_string_pretty(&score_to_json(&score))?);
        }
        Command::TrackVerify { file } => {
            let bytes = read_file(&file)?;
            let score = decode_score(&bytes).context("decode track")?;
            let reencoded = encode_score(&score).context("re-encode track")?;
            if reencoded != bytes {
                bail!(
                    "re-encode differs: {} bytes in, {} bytes out",
                    bytes.len(),
                    reencoded.len()
                );
            }
            println!(
                "ok: {} tracks, {} bytes, byte-identical re-encode",
                score.tracks.len(),
                bytes.len()
            );
        }
    }
    Ok(())
}

fn read_file(path: &PathBuf) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("read {}", path.display()))
}
