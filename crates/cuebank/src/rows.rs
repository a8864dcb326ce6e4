//! Typed records for the cue bank tables.
//!
//! Each record reads and writes only the columns it owns; any other columns
//! of a loaded table keep their defaults on new rows and their stored values
//! on existing ones.

use cuebank_table::{Row, Table, Value};

use crate::command::{decode_track_indices, encode_track_indices, PlaySynthCommand, ReferenceItem};
use crate::error::{CueBankError, Result};
use crate::schema::{
    cue, cue_name, sequence, stream_entry, stream_header, synth, track, track_event, waveform,
};

/// Channel count of every waveform this crate creates.
pub const STEREO_CHANNELS: u8 = 2;

/// `ExtensionData` value meaning "no extension record".
pub const NO_EXTENSION: u16 = 0xFFFF;

/// Sequence command index written on new sequences.
pub const SEQUENCE_COMMAND_INDEX: u16 = 1;

/// Length of a stream entry content hash.
pub const STREAM_HASH_LEN: usize = 16;

/// Hash stored on a stream entry until the sample archive is finalized.
pub const PLACEHOLDER_HASH: [u8; STREAM_HASH_LEN] = [0; STREAM_HASH_LEN];

/// A typed view of one table row.
pub trait Record: Sized {
    /// Write this record's columns into a detached row of `table`.
    fn fill(&self, table: &Table, row: &mut Row) -> Result<()>;

    /// Read the record stored at `index`.
    fn read(table: &Table, index: usize) -> Result<Self>;
}

fn required<T>(value: Option<T>, table: &Table, row: usize, column: &str) -> Result<T> {
    value.ok_or_else(|| CueBankError::MissingValue {
        table: table.name.clone(),
        row,
        column: column.to_string(),
    })
}

fn invalid_blob(table: &Table, row: usize, column: &str, reason: &str) -> CueBankError {
    CueBankError::InvalidBlob {
        table: table.name.clone(),
        row,
        column: column.to_string(),
        reason: reason.to_string(),
    }
}

/// Metadata for one decodable audio stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveformRow {
    pub num_channels: u8,
    pub looping: bool,
    pub sample_count: u32,
    pub extension_data: u16,
    /// Entry id within the sample archive.
    pub stream_slot: u16,
    /// Stream entry (archive) the sample lives in.
    pub stream_port: u16,
}

impl WaveformRow {
    /// A looping stereo stream waveform.
    pub fn stream(stream_slot: u16, stream_port: u16, sample_count: u32) -> Self {
        Self {
            num_channels: STEREO_CHANNELS,
            looping: true,
            sample_count,
            extension_data: NO_EXTENSION,
            stream_slot,
            stream_port,
        }
    }
}

impl Record for WaveformRow {
    fn fill(&self, table: &Table, row: &mut Row) -> Result<()> {
        table.fill(row, waveform::NUM_CHANNELS, Value::U8(self.num_channels))?;
        table.fill(row, waveform::LOOP_FLAG, Value::U8(u8::from(self.looping)))?;
        table.fill(row, waveform::NUM_SAMPLES, Value::U32(self.sample_count))?;
        table.fill(row, waveform::EXTENSION_DATA, Value::U16(self.extension_data))?;
        table.fill(row, waveform::STREAM_PORT, Value::U16(self.stream_port))?;
        table.fill(row, waveform::STREAM_SLOT, Value::U16(self.stream_slot))?;
        Ok(())
    }

    fn read(table: &Table, index: usize) -> Result<Self> {
        let get_u16 = |column: &str| -> Result<u16> {
            required(table.get_u16(index, column)?, table, index, column)
        };
        Ok(Self {
            num_channels: required(
                table.get_u8(index, waveform::NUM_CHANNELS)?,
                table,
                index,
                waveform::NUM_CHANNELS,
            )?,
            looping: required(
                table.get_u8(index, waveform::LOOP_FLAG)?,
                table,
                index,
                waveform::LOOP_FLAG,
            )? != 0,
            sample_count: required(
                table.get_u32(index, waveform::NUM_SAMPLES)?,
                table,
                index,
                waveform::NUM_SAMPLES,
            )?,
            extension_data: get_u16(waveform::EXTENSION_DATA)?,
            stream_slot: get_u16(waveform::STREAM_SLOT)?,
            stream_port: get_u16(waveform::STREAM_PORT)?,
        })
    }
}

/// A sounding node referencing one waveform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthRow {
    pub reference: ReferenceItem,
    pub control_work_area_1: u16,
    pub control_work_area_2: u16,
}

impl SynthRow {
    /// A synth at position `synth_id` playing waveform `waveform_id`.
    ///
    /// The control work areas hold the synth's own position.
    pub fn for_waveform(synth_id: u16, waveform_id: u16) -> Self {
        Self {
            reference: ReferenceItem::waveform(waveform_id),
            control_work_area_1: synth_id,
            control_work_area_2: synth_id,
        }
    }
}

impl Record for SynthRow {
    fn fill(&self, table: &Table, row: &mut Row) -> Result<()> {
        table.fill(
            row,
            synth::REFERENCE_ITEMS,
            Value::Data(self.reference.encode().to_vec()),
        )?;
        table.fill(row, synth::CONTROL_WORK_AREA_1, Value::U16(self.control_work_area_1))?;
        table.fill(row, synth::CONTROL_WORK_AREA_2, Value::U16(self.control_work_area_2))?;
        Ok(())
    }

    fn read(table: &Table, index: usize) -> Result<Self> {
        let items = required(
            table.get_data(index, synth::REFERENCE_ITEMS)?,
            table,
            index,
            synth::REFERENCE_ITEMS,
        )?;
        let reference = ReferenceItem::decode(items)
            .ok_or_else(|| invalid_blob(table, index, synth::REFERENCE_ITEMS, "shorter than 4 bytes"))?;
        Ok(Self {
            reference,
            control_work_area_1: required(
                table.get_u16(index, synth::CONTROL_WORK_AREA_1)?,
                table,
                index,
                synth::CONTROL_WORK_AREA_1,
            )?,
            control_work_area_2: required(
                table.get_u16(index, synth::CONTROL_WORK_AREA_2)?,
                table,
                index,
                synth::CONTROL_WORK_AREA_2,
            )?,
        })
    }
}

/// An opaque engine command blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackEventRow {
    pub command: Vec<u8>,
}

impl TrackEventRow {
    /// An event whose single command plays synth `synth_id`.
    pub fn play_synth(synth_id: u16) -> Self {
        Self {
            command: PlaySynthCommand::new(synth_id).encode().to_vec(),
        }
    }

    /// Synth played by this event, if the command is a play-synth command.
    pub fn synth(&self) -> Option<u16> {
        PlaySynthCommand::decode(&self.command).map(|c| c.synth)
    }
}

impl Record for TrackEventRow {
    fn fill(&self, table: &Table, row: &mut Row) -> Result<()> {
        table.fill(row, track_event::COMMAND, Value::Data(self.command.clone()))?;
        Ok(())
    }

    fn read(table: &Table, index: usize) -> Result<Self> {
        let command = table.get_data(index, track_event::COMMAND)?.unwrap_or_default();
        Ok(Self {
            command: command.to_vec(),
        })
    }
}

/// Output a track is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Routing {
    Speaker,
    Headphone,
}

impl Routing {
    /// Selector value stored in the track's command index column.
    pub fn selector(self) -> u16 {
        match self {
            Routing::Speaker => 0,
            Routing::Headphone => 1,
        }
    }

    pub fn from_selector(selector: u16) -> Option<Self> {
        match selector {
            0 => Some(Routing::Speaker),
            1 => Some(Routing::Headphone),
            _ => None,
        }
    }

    pub fn from_headphone(headphone: bool) -> Self {
        if headphone {
            Routing::Headphone
        } else {
            Routing::Speaker
        }
    }
}

/// A routing/event pairing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRow {
    pub routing_selector: u16,
    pub event_index: u16,
}

impl TrackRow {
    pub fn new(routing: Routing, event_index: u16) -> Self {
        Self {
            routing_selector: routing.selector(),
            event_index,
        }
    }

    /// Decoded routing; `None` for selectors this crate does not create.
    pub fn routing(&self) -> Option<Routing> {
        Routing::from_selector(self.routing_selector)
    }
}

impl Record for TrackRow {
    fn fill(&self, table: &Table, row: &mut Row) -> Result<()> {
        table.fill(row, track::COMMAND_INDEX, Value::U16(self.routing_selector))?;
        table.fill(row, track::EVENT_INDEX, Value::U16(self.event_index))?;
        Ok(())
    }

    fn read(table: &Table, index: usize) -> Result<Self> {
        Ok(Self {
            routing_selector: required(
                table.get_u16(index, track::COMMAND_INDEX)?,
                table,
                index,
                track::COMMAND_INDEX,
            )?,
            event_index: required(
                table.get_u16(index, track::EVENT_INDEX)?,
                table,
                index,
                track::EVENT_INDEX,
            )?,
        })
    }
}

/// Ordered tracks played together for one cue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRow {
    pub tracks: Vec<u16>,
    pub command_index: u16,
}

impl SequenceRow {
    pub fn new(tracks: &[u16]) -> Self {
        Self {
            tracks: tracks.to_vec(),
            command_index: SEQUENCE_COMMAND_INDEX,
        }
    }
}

impl Record for SequenceRow {
    fn fill(&self, table: &Table, row: &mut Row) -> Result<()> {
        let count = u16::try_from(self.tracks.len()).map_err(|_| CueBankError::IndexOverflow {
            table: table.name.clone(),
        })?;
        table.fill(row, sequence::NUM_TRACKS, Value::U16(count))?;
        table.fill(
            row,
            sequence::TRACK_INDEX,
            Value::Data(encode_track_indices(&self.tracks)),
        )?;
        table.fill(row, sequence::COMMAND_INDEX, Value::U16(self.command_index))?;
        Ok(())
    }

    fn read(table: &Table, index: usize) -> Result<Self> {
        let count = required(
            table.get_u16(index, sequence::NUM_TRACKS)?,
            table,
            index,
            sequence::NUM_TRACKS,
        )?;
        let blob = table.get_data(index, sequence::TRACK_INDEX)?.unwrap_or_default();
        let tracks = decode_track_indices(blob)
            .ok_or_else(|| invalid_blob(table, index, sequence::TRACK_INDEX, "odd length"))?;
        if tracks.len() != usize::from(count) {
            return Err(invalid_blob(
                table,
                index,
                sequence::TRACK_INDEX,
                &format!("{} tracks listed, NumTracks is {}", tracks.len(), count),
            ));
        }
        Ok(Self {
            tracks,
            command_index: required(
                table.get_u16(index, sequence::COMMAND_INDEX)?,
                table,
                index,
                sequence::COMMAND_INDEX,
            )?,
        })
    }
}

/// A playable cue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CueRow {
    pub cue_id: u32,
    /// Sequence row played by this cue.
    pub reference_index: u16,
    pub length_ms: u32,
}

impl Record for CueRow {
    fn fill(&self, table: &Table, row: &mut Row) -> Result<()> {
        table.fill(row, cue::CUE_ID, Value::U32(self.cue_id))?;
        table.fill(row, cue::REFERENCE_INDEX, Value::U16(self.reference_index))?;
        table.fill(row, cue::LENGTH, Value::U32(self.length_ms))?;
        Ok(())
    }

    fn read(table: &Table, index: usize) -> Result<Self> {
        Ok(Self {
            cue_id: required(table.get_u32(index, cue::CUE_ID)?, table, index, cue::CUE_ID)?,
            reference_index: required(
                table.get_u16(index, cue::REFERENCE_INDEX)?,
                table,
                index,
                cue::REFERENCE_INDEX,
            )?,
            length_ms: required(table.get_u32(index, cue::LENGTH)?, table, index, cue::LENGTH)?,
        })
    }
}

/// Name index entry for a cue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CueNameRow {
    pub name: String,
    /// Cue row this name resolves to.
    pub cue_index: u16,
}

impl Record for CueNameRow {
    fn fill(&self, table: &Table, row: &mut Row) -> Result<()> {
        table.fill(row, cue_name::CUE_NAME, Value::String(self.name.clone()))?;
        table.fill(row, cue_name::CUE_INDEX, Value::U16(self.cue_index))?;
        Ok(())
    }

    fn read(table: &Table, index: usize) -> Result<Self> {
        Ok(Self {
            name: required(
                table.get_str(index, cue_name::CUE_NAME)?,
                table,
                index,
                cue_name::CUE_NAME,
            )?
            .to_string(),
            cue_index: required(
                table.get_u16(index, cue_name::CUE_INDEX)?,
                table,
                index,
                cue_name::CUE_INDEX,
            )?,
        })
    }
}

/// A stream bank (sample archive) and its content hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEntryRow {
    pub name: String,
    pub hash: [u8; STREAM_HASH_LEN],
}

impl StreamEntryRow {
    /// An entry whose hash is not known yet.
    pub fn placeholder(name: &str) -> Self {
        Self {
            name: name.to_string(),
            hash: PLACEHOLDER_HASH,
        }
    }
}

impl Record for StreamEntryRow {
    fn fill(&self, table: &Table, row: &mut Row) -> Result<()> {
        table.fill(row, stream_entry::NAME, Value::String(self.name.clone()))?;
        table.fill(row, stream_entry::HASH, Value::Data(self.hash.to_vec()))?;
        Ok(())
    }

    fn read(table: &Table, index: usize) -> Result<Self> {
        let name = required(
            table.get_str(index, stream_entry::NAME)?,
            table,
            index,
            stream_entry::NAME,
        )?;
        let blob = required(
            table.get_data(index, stream_entry::HASH)?,
            table,
            index,
            stream_entry::HASH,
        )?;
        let hash = <[u8; STREAM_HASH_LEN]>::try_from(blob)
            .map_err(|_| invalid_blob(table, index, stream_entry::HASH, "expected 16 bytes"))?;
        Ok(Self {
            name: name.to_string(),
            hash,
        })
    }
}

/// Table-of-contents blob of one sample archive. `None` for padding rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamHeaderRow {
    pub header: Option<Vec<u8>>,
}

impl Record for StreamHeaderRow {
    fn fill(&self, table: &Table, row: &mut Row) -> Result<()> {
        if let Some(header) = &self.header {
            table.fill(row, stream_header::HEADER, Value::Data(header.clone()))?;
        }
        Ok(())
    }

    fn read(table: &Table, index: usize) -> Result<Self> {
        Ok(Self {
            header: table
                .get_data(index, stream_header::HEADER)?
                .map(<[u8]>::to_vec),
        })
    }
}
