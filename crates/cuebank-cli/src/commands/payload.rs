//! Reading and writing payload files, with or without the container prefix.

use anyhow::{Context, Result};
use cuebank::envelope;
use log::debug;
use std::fs;

/// Read a payload file, stripping the prefix record when `wrapped` is set.
pub fn read(path: &str, wrapped: bool) -> Result<Vec<u8>> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read payload: {}", path))?;
    if !wrapped {
        return Ok(bytes);
    }
    let payload = envelope::unwrap_payload(&bytes)
        .with_context(|| format!("Failed to strip container prefix: {}", path))?;
    debug!("{}: stripped {}-byte prefix", path, envelope::PREFIX_LEN);
    Ok(payload.to_vec())
}

/// Write a payload file, prepending the prefix record when `wrapped` is set.
pub fn write(path: &str, payload: &[u8], wrapped: bool) -> Result<()> {
    let bytes = if wrapped {
        debug!("{}: adding {}-byte prefix", path, envelope::PREFIX_LEN);
        envelope::wrap_payload(payload).context("Failed to build container prefix")?
    } else {
        payload.to_vec()
    };
    fs::write(path, bytes).with_context(|| format!("Failed to write to: {}", path))
}
