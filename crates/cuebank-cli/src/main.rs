//! Cue bank CLI - inspect and extend cue bank payloads
//!
//! Payloads are root tables in the JSON table encoding, optionally wrapped in
//! the 20-byte container prefix record (`--envelope`).
//!
//! Set `RUST_LOG=debug` to trace every row appended.

use clap::{Parser, Subcommand};
use std::process::ExitCode;

// Use modules from the library crate
use cuebank_cli::commands;

/// Cue bank - audio cue table assembly
#[derive(Parser)]
#[command(name = "cuebank")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print table row counts, cue ids, and the cue name index of a payload
    Inspect {
        /// Path to the payload file
        #[arg(short, long)]
        payload: String,

        /// The file starts with the container prefix record
        #[arg(long)]
        envelope: bool,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Append one streamed asset (speaker track, headphone track, cue) and finalize
    Add {
        /// Path to the input payload file
        #[arg(short, long)]
        payload: String,

        /// Path to write the finalized payload to
        #[arg(short, long)]
        out: String,

        /// Cue name
        #[arg(long)]
        cue: String,

        /// Entry id of the sample within its archive
        #[arg(long)]
        slot: u16,

        /// Stream entry id of the archive (omit when adding a new entry with --stream)
        #[arg(long, required_unless_present = "stream", conflicts_with = "stream")]
        port: Option<u16>,

        /// Add a new stream entry with this name and play from it
        #[arg(long)]
        stream: Option<String>,

        /// Total decoded samples of the stream (default with --frames: frames x 1024)
        #[arg(long, required_unless_present = "frames")]
        samples: Option<u32>,

        /// Cue length in milliseconds
        #[arg(long, required_unless_present = "frames", conflicts_with = "frames")]
        length_ms: Option<u32>,

        /// Encoded frame count of the stream (1024 samples per frame)
        #[arg(long, requires = "sample_rate")]
        frames: Option<u32>,

        /// Sample rate of the stream in Hz
        #[arg(long, requires = "frames")]
        sample_rate: Option<u32>,

        /// Input and output carry the container prefix record
        #[arg(long)]
        envelope: bool,

        /// Path to a finalize config file (JSON)
        #[arg(long)]
        config: Option<String>,
    },

    /// Set a stream entry's hash and/or store a stream bank header, then finalize
    Stream {
        /// Path to the input payload file
        #[arg(short, long)]
        payload: String,

        /// Path to write the finalized payload to
        #[arg(short, long)]
        out: String,

        /// Stream entry name whose hash to set
        #[arg(long, requires = "hash")]
        name: Option<String>,

        /// Content hash of the archive, 32 hex digits
        #[arg(long, requires = "name")]
        hash: Option<String>,

        /// Stream bank index of the header
        #[arg(long, requires = "header")]
        index: Option<u16>,

        /// Path to the archive header file
        #[arg(long, requires = "index")]
        header: Option<String>,

        /// Input and output carry the container prefix record
        #[arg(long)]
        envelope: bool,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Inspect {
            payload,
            envelope,
            json,
        } => commands::inspect::run(&payload, envelope, json),
        Commands::Add {
            payload,
            out,
            cue,
            slot,
            port,
            stream,
            samples,
            length_ms,
            frames,
            sample_rate,
            envelope,
            config,
        } => commands::add::StreamTarget::from_args(port, stream).and_then(|target| {
            let length =
                commands::add::StreamLength::from_args(samples, length_ms, frames, sample_rate)?;
            commands::add::run(
                &payload,
                &out,
                &commands::add::AddRequest {
                    cue_name: cue,
                    stream_slot: slot,
                    target,
                    length,
                },
                envelope,
                config.as_deref(),
            )
        }),
        Commands::Stream {
            payload,
            out,
            name,
            hash,
            index,
            header,
            envelope,
        } => commands::stream::run(
            &payload,
            &out,
            name.as_deref().zip(hash.as_deref()),
            index.zip(header.as_deref()),
            envelope,
        ),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
