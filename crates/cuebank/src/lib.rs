//! Cue Bank Assembly
//!
//! This crate builds playable audio cue banks: the relational tables that tell
//! a game's sound engine which streamed samples play under which named cue,
//! with what loop/channel metadata, and through which output (speaker or
//! headphone).
//!
//! # Data Model
//!
//! A bank is nine tables nested in one root row. Rows reference each other by
//! position (16-bit), so rows are only ever appended:
//!
//! - **Waveform**: one decodable stream (channels, samples, loop, archive slot)
//! - **Synth**: plays one waveform
//! - **TrackEvent**: engine command blob invoking one synth
//! - **Track**: routes one event to the speaker or headphone output
//! - **Sequence**: tracks played together
//! - **Cue** / **CueName**: a playable id and its sorted name index
//! - **StreamAwb** / **StreamAwbAfs2Header**: sample archives and their headers
//!
//! The binary table codec and the asset container are outside this crate; the
//! codec is reached through [`cuebank_table::TableCodec`].
//!
//! # Example
//!
//! ```
//! use cuebank::{CueBank, Routing};
//! use cuebank_table::JsonTableCodec;
//!
//! let mut bank = CueBank::new(JsonTableCodec);
//! let port = bank.add_stream_entry("BGM_V01").unwrap();
//! let speaker = bank.add_track(0, port, 441_000, Routing::Speaker).unwrap();
//! let headphone = bank.add_track(0, port, 441_000, Routing::Headphone).unwrap();
//! let cue_id = bank.add_cue("BGM_S01_001", &[speaker, headphone], 10_000).unwrap();
//! assert_eq!(cue_id, 1);
//!
//! bank.set_stream_hash("BGM_V01", [0xAB; 16]).unwrap();
//! let payload = bank.finalize().unwrap();
//! let wrapped = cuebank::envelope::wrap_payload(&payload).unwrap();
//! assert_eq!(wrapped.len(), payload.len() + cuebank::envelope::PREFIX_LEN);
//! ```
//!
//! # Module Structure
//!
//! - [`bank`]: the [`CueBank`] itself
//! - [`rows`]: typed records for each table
//! - [`arena`]: append-only table storage
//! - [`command`]: byte-exact command and reference blobs
//! - [`schema`]: table and column names, empty schemas
//! - [`envelope`]: the container prefix record
//! - [`timing`]: stream length helpers
//! - [`config`]: finalize settings

pub mod arena;
pub mod bank;
pub mod command;
pub mod config;
pub mod envelope;
pub mod error;
pub mod rows;
pub mod schema;
pub mod timing;

// Re-export main types
pub use arena::{Arena, RowId};
pub use bank::{AddedAsset, BankSummary, CueBank, ResolvedTrack, StreamAsset};
pub use config::{FinalizeConfig, SCRATCH_BYTES_PER_ENTRY};
pub use error::{CueBankError, Result};
pub use rows::{
    CueNameRow, CueRow, Routing, SequenceRow, StreamEntryRow, StreamHeaderRow, SynthRow,
    TrackEventRow, TrackRow, WaveformRow,
};
