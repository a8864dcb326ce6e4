//! Table and column names of a cue bank, and empty-table schemas.
//!
//! A cue bank payload is a root table with a single row. Each sub-table is
//! stored as a binary cell of that row, under the column names below.

use cuebank_table::{ColumnType, Table, TableError, Value};

/// Root table name.
pub const ROOT_TABLE: &str = "Header";

/// Root columns holding nested tables.
pub mod nested {
    pub const WAVEFORM: &str = "WaveformTable";
    pub const SYNTH: &str = "SynthTable";
    pub const TRACK_EVENT: &str = "TrackEventTable";
    pub const TRACK: &str = "TrackTable";
    pub const SEQUENCE: &str = "SequenceTable";
    pub const CUE: &str = "CueTable";
    pub const CUE_NAME: &str = "CueNameTable";
    pub const STREAM_ENTRY: &str = "StreamAwbHash";
    pub const STREAM_HEADER: &str = "StreamAwbAfs2Header";

    /// All nested table columns, in the order they are serialized.
    pub const ALL: [&str; 9] = [
        WAVEFORM,
        SYNTH,
        TRACK_EVENT,
        TRACK,
        SEQUENCE,
        CUE,
        CUE_NAME,
        STREAM_ENTRY,
        STREAM_HEADER,
    ];
}

/// Root column holding the engine's per-entry scratch region.
pub const SCRATCH_COLUMN: &str = "StreamAwbTocWork";

pub mod waveform {
    pub const TABLE: &str = "Waveform";
    pub const NUM_CHANNELS: &str = "NumChannels";
    pub const LOOP_FLAG: &str = "LoopFlag";
    pub const NUM_SAMPLES: &str = "NumSamples";
    pub const EXTENSION_DATA: &str = "ExtensionData";
    pub const STREAM_PORT: &str = "StreamAwbPortNo";
    pub const STREAM_SLOT: &str = "StreamAwbId";
}

pub mod synth {
    pub const TABLE: &str = "Synth";
    pub const REFERENCE_ITEMS: &str = "ReferenceItems";
    pub const CONTROL_WORK_AREA_1: &str = "ControlWorkArea1";
    pub const CONTROL_WORK_AREA_2: &str = "ControlWorkArea2";
    pub const VOICE_LIMIT_GROUP_NAME: &str = "VoiceLimitGroupName";
}

pub mod track_event {
    pub const TABLE: &str = "TrackEvent";
    pub const COMMAND: &str = "Command";
}

pub mod track {
    pub const TABLE: &str = "Track";
    /// Routing selector: speaker or headphone output.
    pub const COMMAND_INDEX: &str = "CommandIndex";
    pub const EVENT_INDEX: &str = "EventIndex";
    pub const TARGET_NAME: &str = "TargetName";
    pub const TARGET_ACB_NAME: &str = "TargetAcbName";
}

pub mod sequence {
    pub const TABLE: &str = "Sequence";
    pub const NUM_TRACKS: &str = "NumTracks";
    pub const TRACK_INDEX: &str = "TrackIndex";
    pub const COMMAND_INDEX: &str = "CommandIndex";
}

pub mod cue {
    pub const TABLE: &str = "Cue";
    pub const CUE_ID: &str = "CueId";
    pub const REFERENCE_INDEX: &str = "ReferenceIndex";
    pub const LENGTH: &str = "Length";
    pub const USER_DATA: &str = "UserData";
}

pub mod cue_name {
    pub const TABLE: &str = "CueName";
    pub const CUE_NAME: &str = "CueName";
    pub const CUE_INDEX: &str = "CueIndex";
}

pub mod stream_entry {
    pub const TABLE: &str = "StreamAwb";
    pub const NAME: &str = "Name";
    pub const HASH: &str = "Hash";
}

pub mod stream_header {
    pub const TABLE: &str = "StreamAwbAfs2Header";
    pub const HEADER: &str = "Header";
}

/// String columns that older banks may leave null. They default to `""` so
/// rows created here serialize an empty string rather than a null.
pub const OPTIONAL_STRINGS: [(&str, &str); 4] = [
    (nested::CUE, cue::USER_DATA),
    (nested::SYNTH, synth::VOICE_LIMIT_GROUP_NAME),
    (nested::TRACK, track::TARGET_NAME),
    (nested::TRACK, track::TARGET_ACB_NAME),
];

fn empty_string() -> Value {
    Value::String(String::new())
}

/// Apply the empty-string defaults of [`OPTIONAL_STRINGS`] that belong to the
/// table stored under `nested_column`. Columns the table lacks are skipped.
pub fn apply_optional_defaults(nested_column: &str, table: &mut Table) -> Result<(), TableError> {
    for (owner, column) in OPTIONAL_STRINGS {
        if owner == nested_column && table.has_column(column) {
            table.set_default(column, empty_string())?;
        }
    }
    Ok(())
}

/// Empty Waveform table.
pub fn waveform_table() -> Table {
    Table::new(waveform::TABLE)
        .with_column(waveform::NUM_CHANNELS, ColumnType::U8)
        .with_column(waveform::LOOP_FLAG, ColumnType::U8)
        .with_column(waveform::NUM_SAMPLES, ColumnType::U32)
        .with_column(waveform::EXTENSION_DATA, ColumnType::U16)
        .with_column(waveform::STREAM_PORT, ColumnType::U16)
        .with_column(waveform::STREAM_SLOT, ColumnType::U16)
}

/// Empty Synth table.
pub fn synth_table() -> Table {
    Table::new(synth::TABLE)
        .with_column(synth::REFERENCE_ITEMS, ColumnType::Data)
        .with_column(synth::CONTROL_WORK_AREA_1, ColumnType::U16)
        .with_column(synth::CONTROL_WORK_AREA_2, ColumnType::U16)
        .with_column(synth::VOICE_LIMIT_GROUP_NAME, ColumnType::String)
        .with_default(synth::VOICE_LIMIT_GROUP_NAME, empty_string())
}

/// Empty TrackEvent table.
pub fn track_event_table() -> Table {
    Table::new(track_event::TABLE).with_column(track_event::COMMAND, ColumnType::Data)
}

/// Empty Track table.
pub fn track_table() -> Table {
    Table::new(track::TABLE)
        .with_column(track::COMMAND_INDEX, ColumnType::U16)
        .with_column(track::EVENT_INDEX, ColumnType::U16)
        .with_column(track::TARGET_NAME, ColumnType::String)
        .with_column(track::TARGET_ACB_NAME, ColumnType::String)
        .with_default(track::TARGET_NAME, empty_string())
        .with_default(track::TARGET_ACB_NAME, empty_string())
}

/// Empty Sequence table.
pub fn sequence_table() -> Table {
    Table::new(sequence::TABLE)
        .with_column(sequence::NUM_TRACKS, ColumnType::U16)
        .with_column(sequence::TRACK_INDEX, ColumnType::Data)
        .with_column(sequence::COMMAND_INDEX, ColumnType::U16)
}

/// Empty Cue table.
pub fn cue_table() -> Table {
    Table::new(cue::TABLE)
        .with_column(cue::CUE_ID, ColumnType::U32)
        .with_column(cue::REFERENCE_INDEX, ColumnType::U16)
        .with_column(cue::LENGTH, ColumnType::U32)
        .with_column(cue::USER_DATA, ColumnType::String)
        .with_default(cue::USER_DATA, empty_string())
}

/// Empty CueName table.
pub fn cue_name_table() -> Table {
    Table::new(cue_name::TABLE)
        .with_column(cue_name::CUE_NAME, ColumnType::String)
        .with_column(cue_name::CUE_INDEX, ColumnType::U16)
}

/// Empty stream entry table.
pub fn stream_entry_table() -> Table {
    Table::new(stream_entry::TABLE)
        .with_column(stream_entry::NAME, ColumnType::String)
        .with_column(stream_entry::HASH, ColumnType::Data)
}

/// Empty stream header table.
pub fn stream_header_table() -> Table {
    Table::new(stream_header::TABLE).with_column(stream_header::HEADER, ColumnType::Data)
}

/// Root table with one row, a binary column per nested table, and the
/// scratch column set to an empty blob.
///
/// # Panics
/// Panics if `scratch_column` names a nested table column; see
/// [`crate::FinalizeConfig::validate`].
pub fn root_table(scratch_column: &str) -> Table {
    let mut table = Table::new(ROOT_TABLE);
    for column in nested::ALL {
        table = table.with_column(column, ColumnType::Data);
    }
    let mut table = table.with_column(scratch_column, ColumnType::Data);
    let mut row = table.new_row();
    if let Some(cell) = row.cells.last_mut() {
        *cell = Some(Value::Data(Vec::new()));
    }
    table.push_row(row);
    table
}
