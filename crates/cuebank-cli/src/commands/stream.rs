//! Stream command implementation
//!
//! Patches a stream entry's content hash and stores a stream bank header once
//! the sample archive has been written.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use cuebank::rows::STREAM_HASH_LEN;
use cuebank::CueBank;
use cuebank_table::JsonTableCodec;
use std::fs;
use std::process::ExitCode;

use super::payload;

/// Parse a stream hash given as hex digits.
pub fn parse_hash(text: &str) -> Result<[u8; STREAM_HASH_LEN]> {
    let bytes = hex::decode(text.trim()).with_context(|| format!("Invalid hex hash: {}", text))?;
    <[u8; STREAM_HASH_LEN]>::try_from(bytes.as_slice()).map_err(|_| {
        anyhow::anyhow!(
            "hash must be {} bytes ({} hex digits), got {} bytes",
            STREAM_HASH_LEN,
            STREAM_HASH_LEN * 2,
            bytes.len()
        )
    })
}

/// Run the stream command
///
/// # Arguments
/// * `payload_path` - Path to the input payload file
/// * `out_path` - Path to write the finalized payload to
/// * `hash` - Stream entry name and hex hash to set
/// * `header` - Stream bank index and path of the header file to store
/// * `envelope` - Input and output carry the container prefix record
///
/// # Returns
/// Exit code: 0 success, 1 error
pub fn run(
    payload_path: &str,
    out_path: &str,
    hash: Option<(&str, &str)>,
    header: Option<(u16, &str)>,
    envelope: bool,
) -> Result<ExitCode> {
    if hash.is_none() && header.is_none() {
        bail!("nothing to patch: give --name with --hash, or --index with --header");
    }
    println!(
        "{} {} -> {}",
        "Patching streams:".cyan().bold(),
        payload_path,
        out_path
    );

    let hash = match hash {
        Some((name, text)) => Some((name, parse_hash(text)?)),
        None => None,
    };
    let header = match header {
        Some((index, path)) => {
            let bytes = fs::read(path)
                .with_context(|| format!("Failed to read header file: {}", path))?;
            Some((index, bytes))
        }
        None => None,
    };

    let bytes = payload::read(payload_path, envelope)?;
    let mut bank = CueBank::load(JsonTableCodec, &bytes)
        .with_context(|| format!("Failed to load cue bank: {}", payload_path))?;

    if let Some((name, digest)) = hash {
        let found = bank
            .set_stream_hash(name, digest)
            .with_context(|| format!("Failed to set hash of '{}'", name))?;
        if found {
            println!("  {} {} = {}", "hash:".dimmed(), name, hex::encode(digest));
        } else {
            println!(
                "{} no stream entry named '{}'; hash not set",
                "WARNING".yellow().bold(),
                name
            );
        }
    }

    if let Some((index, header)) = header {
        let len = header.len();
        bank.set_stream_header(index, header)
            .with_context(|| format!("Failed to set header {}", index))?;
        println!("  {} {} ({} bytes)", "header:".dimmed(), index, len);
    }

    let finalized = bank.finalize().context("Failed to finalize cue bank")?;
    payload::write(out_path, &finalized, envelope)?;

    println!("{} Wrote {}", "SUCCESS".green().bold(), out_path);
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuebank::schema;
    use pretty_assertions::assert_eq;
    use std::path::Path;
    use tempfile::tempdir;

    const HASH_HEX: &str = "00112233445566778899aabbccddeeff";

    fn path_str(path: &Path) -> &str {
        path.to_str().unwrap()
    }

    fn bank_with_entry(path: &Path, envelope: bool) {
        let mut bank = CueBank::new(JsonTableCodec);
        bank.add_stream_entry("BGM_V01").unwrap();
        let payload = bank.finalize().unwrap();
        payload::write(path_str(path), &payload, envelope).unwrap();
    }

    fn load(path: &Path, envelope: bool) -> CueBank<JsonTableCodec> {
        let bytes = payload::read(path_str(path), envelope).unwrap();
        CueBank::load(JsonTableCodec, &bytes).unwrap()
    }

    #[test]
    fn test_parse_hash() {
        let hash = parse_hash(HASH_HEX).unwrap();
        assert_eq!(hash[0], 0x00);
        assert_eq!(hash[15], 0xFF);
        assert!(parse_hash("0011").is_err());
        assert!(parse_hash("zz112233445566778899aabbccddeeff").is_err());
    }

    #[test]
    fn test_stream_sets_hash_and_header() {
        let tmp = tempdir().unwrap();
        let input = tmp.path().join("in.bin");
        let output = tmp.path().join("out.bin");
        let header = tmp.path().join("header.bin");
        bank_with_entry(&input, true);
        fs::write(&header, b"AFS2\x01\x04\x02\x00").unwrap();

        run(
            path_str(&input),
            path_str(&output),
            Some(("BGM_V01", HASH_HEX)),
            Some((2, path_str(&header))),
            true,
        )
        .unwrap();

        let bank = load(&output, true);
        assert_eq!(bank.stream_entry(0).unwrap().hash, parse_hash(HASH_HEX).unwrap());
        assert_eq!(bank.summary().stream_headers, 3);
        assert_eq!(bank.stream_header(0).unwrap().header, None);
        assert_eq!(
            bank.stream_header(2).unwrap().header,
            Some(b"AFS2\x01\x04\x02\x00".to_vec())
        );
    }

    #[test]
    fn test_stream_unknown_name_leaves_hashes_unchanged() {
        let tmp = tempdir().unwrap();
        let input = tmp.path().join("in.json");
        let output = tmp.path().join("out.json");
        bank_with_entry(&input, false);

        run(
            path_str(&input),
            path_str(&output),
            Some(("BGM_V99", HASH_HEX)),
            None,
            false,
        )
        .unwrap();

        let bank = load(&output, false);
        assert_eq!(bank.stream_entry(0).unwrap().hash, [0; STREAM_HASH_LEN]);
        assert_eq!(
            bank.table(schema::nested::STREAM_HEADER).unwrap().len(),
            0
        );
    }

    #[test]
    fn test_stream_requires_a_patch() {
        let tmp = tempdir().unwrap();
        let input = tmp.path().join("in.json");
        bank_with_entry(&input, false);
        let err = run(
            path_str(&input),
            path_str(&tmp.path().join("out.json")),
            None,
            None,
            false,
        )
        .unwrap_err();
        assert!(err.to_string().contains("nothing to patch"));
    }

    #[test]
    fn test_stream_bad_hash_writes_nothing() {
        let tmp = tempdir().unwrap();
        let input = tmp.path().join("in.json");
        let output = tmp.path().join("out.json");
        bank_with_entry(&input, false);
        assert!(run(
            path_str(&input),
            path_str(&output),
            Some(("BGM_V01", "abcd")),
            None,
            false,
        )
        .is_err());
        assert!(!output.exists());
    }
}
