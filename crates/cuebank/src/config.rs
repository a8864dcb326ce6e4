//! Finalize configuration.

use serde::{Deserialize, Serialize};

use crate::error::{CueBankError, Result};
use crate::schema::{nested, SCRATCH_COLUMN};

/// Bytes of engine working memory pre-allocated per cue added.
///
/// Measured against shipping banks; the engine gives no formula for it.
pub const SCRATCH_BYTES_PER_ENTRY: usize = 172;

/// Settings applied when a bank is finalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FinalizeConfig {
    /// Root column grown by [`FinalizeConfig::scratch_bytes_per_entry`] per cue added.
    pub scratch_column: String,
    /// Scratch growth per cue added.
    pub scratch_bytes_per_entry: usize,
}

impl Default for FinalizeConfig {
    fn default() -> Self {
        Self {
            scratch_column: SCRATCH_COLUMN.to_string(),
            scratch_bytes_per_entry: SCRATCH_BYTES_PER_ENTRY,
        }
    }
}

impl FinalizeConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the scratch column does not alias a nested table column.
    pub fn validate(&self) -> Result<()> {
        if nested::ALL.contains(&self.scratch_column.as_str()) {
            return Err(CueBankError::ScratchColumnConflict(
                self.scratch_column.clone(),
            ));
        }
        Ok(())
    }

    /// Scratch growth for `entries` new cues.
    pub fn scratch_growth(&self, entries: usize) -> usize {
        entries.saturating_mul(self.scratch_bytes_per_entry)
    }
}
