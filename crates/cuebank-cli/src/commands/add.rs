//! Add command implementation
//!
//! Appends one streamed asset to a payload and finalizes it.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use cuebank::{timing, CueBank, FinalizeConfig, StreamAsset};
use cuebank_table::JsonTableCodec;
use log::debug;
use std::fs;
use std::process::ExitCode;

use super::payload;

/// Where the new waveforms stream from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamTarget {
    /// An existing stream entry id.
    Port(u16),
    /// A new stream entry with this name, appended first.
    NewEntry(String),
}

impl StreamTarget {
    /// Build from the `--port` / `--stream` arguments; exactly one must be set.
    pub fn from_args(port: Option<u16>, stream: Option<String>) -> Result<Self> {
        match (port, stream) {
            (Some(port), None) => Ok(StreamTarget::Port(port)),
            (None, Some(name)) => Ok(StreamTarget::NewEntry(name)),
            _ => bail!("exactly one of --port or --stream is required"),
        }
    }
}

/// Sample count and cue length of the new asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamLength {
    /// Both given directly.
    Explicit { sample_count: u32, length_ms: u32 },
    /// Derived from the encoded frame count. `sample_count` overrides the
    /// default of one full frame per 1024 samples.
    Frames {
        frame_count: u32,
        sample_rate: u32,
        sample_count: Option<u32>,
    },
}

impl StreamLength {
    /// Build from the `--samples`, `--length-ms`, `--frames` and
    /// `--sample-rate` arguments.
    pub fn from_args(
        samples: Option<u32>,
        length_ms: Option<u32>,
        frames: Option<u32>,
        sample_rate: Option<u32>,
    ) -> Result<Self> {
        match (frames, sample_rate, length_ms) {
            (Some(frame_count), Some(sample_rate), None) => Ok(StreamLength::Frames {
                frame_count,
                sample_rate,
                sample_count: samples,
            }),
            (None, None, Some(length_ms)) => match samples {
                Some(sample_count) => Ok(StreamLength::Explicit {
                    sample_count,
                    length_ms,
                }),
                None => bail!("--samples is required with --length-ms"),
            },
            _ => bail!("give either --length-ms, or --frames with --sample-rate"),
        }
    }

    /// Returns `(sample_count, length_ms)`.
    pub fn resolve(&self) -> Result<(u32, u32)> {
        match *self {
            StreamLength::Explicit {
                sample_count,
                length_ms,
            } => Ok((sample_count, length_ms)),
            StreamLength::Frames {
                frame_count,
                sample_rate,
                sample_count,
            } => {
                if sample_rate == 0 {
                    bail!("sample rate must be non-zero");
                }
                let sample_count = match sample_count {
                    Some(count) => count,
                    None => u32::try_from(timing::frames_to_samples(frame_count))
                        .with_context(|| format!("{} frames overflow the sample count", frame_count))?,
                };
                Ok((sample_count, timing::frames_to_ms(frame_count, sample_rate)))
            }
        }
    }
}

/// The asset to append.
#[derive(Debug, Clone)]
pub struct AddRequest {
    pub cue_name: String,
    pub stream_slot: u16,
    pub target: StreamTarget,
    pub length: StreamLength,
}

/// Run the add command
///
/// # Arguments
/// * `payload_path` - Path to the input payload file
/// * `out_path` - Path to write the finalized payload to
/// * `request` - The asset to append
/// * `envelope` - Input and output carry the container prefix record
/// * `config_path` - Optional finalize config file (JSON)
///
/// # Returns
/// Exit code: 0 success, 1 error
pub fn run(
    payload_path: &str,
    out_path: &str,
    request: &AddRequest,
    envelope: bool,
    config_path: Option<&str>,
) -> Result<ExitCode> {
    println!(
        "{} {} -> {}",
        "Adding:".cyan().bold(),
        request.cue_name,
        out_path
    );

    let (sample_count, length_ms) = request.length.resolve()?;
    debug!(
        "'{}': {} samples, {} ms",
        request.cue_name, sample_count, length_ms
    );

    let config = match config_path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path))?;
            FinalizeConfig::from_json(&text)
                .with_context(|| format!("Failed to parse config file: {}", path))?
        }
        None => FinalizeConfig::default(),
    };

    let bytes = payload::read(payload_path, envelope)?;
    let mut bank = CueBank::load_with_config(JsonTableCodec, &bytes, config)
        .with_context(|| format!("Failed to load cue bank: {}", payload_path))?;

    let stream_port = match &request.target {
        StreamTarget::Port(port) => *port,
        StreamTarget::NewEntry(name) => {
            let port = bank
                .add_stream_entry(name)
                .with_context(|| format!("Failed to add stream entry '{}'", name))?;
            println!("  {} {} (port {})", "stream entry:".dimmed(), name, port);
            port
        }
    };

    let added = bank
        .add_stream_asset(&StreamAsset {
            cue_name: request.cue_name.clone(),
            stream_slot: request.stream_slot,
            stream_port,
            sample_count,
            length_ms,
        })
        .with_context(|| format!("Failed to add cue '{}'", request.cue_name))?;

    let finalized = bank.finalize().context("Failed to finalize cue bank")?;
    payload::write(out_path, &finalized, envelope)?;

    println!(
        "  {} speaker {}, headphone {}",
        "tracks:".dimmed(),
        added.speaker_track,
        added.headphone_track
    );
    println!(
        "{} Added cue {} as id {}",
        "SUCCESS".green().bold(),
        request.cue_name,
        added.cue_id
    );

    Ok(ExitCode::SUCCESS)
}
