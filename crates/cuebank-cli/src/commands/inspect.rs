//! Inspect command implementation
//!
//! Loads a payload and reports what the bank holds.

use anyhow::{Context, Result};
use colored::Colorize;
use cuebank::{BankSummary, CueBank};
use cuebank_table::JsonTableCodec;
use serde_json::json;
use std::process::ExitCode;

use super::payload;

/// Run the inspect command
///
/// # Arguments
/// * `payload_path` - Path to the payload file
/// * `envelope` - Strip the container prefix record first
/// * `json` - Print a JSON report instead of colored text
///
/// # Returns
/// Exit code: 0 success, 1 error
pub fn run(payload_path: &str, envelope: bool, json: bool) -> Result<ExitCode> {
    let bytes = payload::read(payload_path, envelope)?;
    let digest = blake3::hash(&bytes).to_hex().to_string();
    let bank = CueBank::load(JsonTableCodec, &bytes)
        .with_context(|| format!("Failed to load cue bank: {}", payload_path))?;
    let cues = bank.cue_listing().context("Failed to read cue name index")?;

    if json {
        let report = json!({
            "payload": payload_path,
            "blake3": digest,
            "size": bytes.len(),
            "summary": bank.summary(),
            "slot_count": bank.slot_count(),
            "cues": cues
                .iter()
                .map(|(entry, cue)| json!({
                    "name": entry.name,
                    "cue_id": cue.cue_id,
                    "length_ms": cue.length_ms,
                }))
                .collect::<Vec<_>>(),
        });
        let text = serde_json::to_string_pretty(&report).context("Failed to format report")?;
        println!("{}", text);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{} {}", "Inspecting:".cyan().bold(), payload_path);
    println!("  {} {} ({} bytes)", "blake3:".dimmed(), digest, bytes.len());
    print_summary(&bank.summary());
    println!("  {} {}", "slot count:".dimmed(), bank.slot_count());

    if cues.is_empty() {
        println!("{}", "No cues".yellow());
    } else {
        println!("{}", "Cues:".cyan().bold());
        for (entry, cue) in &cues {
            println!(
                "  {:>6}  {}  ({} ms)",
                cue.cue_id,
                entry.name.bold(),
                cue.length_ms
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_summary(summary: &BankSummary) {
    for (label, count) in summary_rows(summary) {
        println!("  {:<16} {}", format!("{}:", label).dimmed(), count);
    }
    println!(
        "  {:<16} {}",
        "last cue id:".dimmed(),
        summary.last_cue_id.to_string().bold()
    );
}

fn summary_rows(summary: &BankSummary) -> [(&'static str, usize); 9] {
    [
        ("waveforms", summary.waveforms),
        ("synths", summary.synths),
        ("track events", summary.track_events),
        ("tracks", summary.tracks),
        ("sequences", summary.sequences),
        ("cues", summary.cues),
        ("cue names", summary.cue_names),
        ("stream entries", summary.stream_entries),
        ("stream headers", summary.stream_headers),
    ]
}
