//! The cue bank: load, append, finalize.
//!
//! A [`CueBank`] owns the nine sub-tables of a cue bank payload. Rows are only
//! ever appended; every append returns the new row's position, which other
//! tables use as a 16-bit reference.
//!
//! ```text
//! CueName --CueIndex--> Cue --ReferenceIndex--> Sequence --TrackIndex[]--> Track
//! Track --EventIndex--> TrackEvent --(play synth N)--> Synth --ReferenceItems--> Waveform
//! Waveform --StreamAwbPortNo--> StreamAwb (stream entry)
//! ```
//!
//! Typical session: load a bank, then per audio asset add two tracks
//! (speaker and headphone) and one cue over them, patch the stream entry hash
//! and header once the sample archive is written, and finalize exactly once.

use std::cmp::Ordering;

use cuebank_table::{Row, Table, TableCodec, TableError, Value};
use log::{debug, info, warn};
use serde::Serialize;

use crate::arena::{Arena, RowId, MAX_ROWS};
use crate::config::FinalizeConfig;
use crate::error::{CueBankError, Result};
use crate::rows::{
    CueNameRow, CueRow, Routing, SequenceRow, StreamEntryRow, StreamHeaderRow, SynthRow,
    TrackEventRow, TrackRow, WaveformRow, STREAM_HASH_LEN,
};
use crate::schema::{self, cue, cue_name, nested, stream_entry, stream_header};

/// One audio asset to add: a speaker track, a headphone track, and a cue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamAsset {
    pub cue_name: String,
    /// Entry id of the sample within its archive.
    pub stream_slot: u16,
    /// Stream entry id of the archive.
    pub stream_port: u16,
    pub sample_count: u32,
    pub length_ms: u32,
}

/// Ids created by [`CueBank::add_stream_asset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddedAsset {
    pub speaker_track: RowId,
    pub headphone_track: RowId,
    pub cue_id: u32,
}

/// A track followed through its event and synth to the waveform it plays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTrack {
    pub track: TrackRow,
    pub event: TrackEventRow,
    pub synth_id: RowId,
    pub synth: SynthRow,
    pub waveform_id: RowId,
    pub waveform: WaveformRow,
}

/// Row counts of every sub-table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BankSummary {
    pub waveforms: usize,
    pub synths: usize,
    pub track_events: usize,
    pub tracks: usize,
    pub sequences: usize,
    pub cues: usize,
    pub cue_names: usize,
    pub stream_entries: usize,
    pub stream_headers: usize,
    pub last_cue_id: u32,
}

/// An in-memory cue bank bound to a table codec.
#[derive(Debug)]
pub struct CueBank<C: TableCodec> {
    codec: C,
    config: FinalizeConfig,
    root: Table,
    waveforms: Arena,
    synths: Arena,
    track_events: Arena,
    tracks: Arena,
    sequences: Arena,
    cues: Arena,
    cue_names: Arena,
    stream_entries: Arena,
    stream_headers: Arena,
    last_cue_id: u32,
    /// Cues added since the last finalize.
    pending_entries: usize,
}

impl<C: TableCodec> CueBank<C> {
    /// Create an empty bank with the default finalize config.
    pub fn new(codec: C) -> Self {
        Self::empty(codec, FinalizeConfig::default())
    }

    /// Create an empty bank.
    ///
    /// Fails with [`CueBankError::ScratchColumnConflict`] if the config's
    /// scratch column names a nested table.
    pub fn new_with_config(codec: C, config: FinalizeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::empty(codec, config))
    }

    fn empty(codec: C, config: FinalizeConfig) -> Self {
        let root = schema::root_table(&config.scratch_column);
        Self {
            codec,
            config,
            root,
            waveforms: Arena::new(schema::waveform_table()),
            synths: Arena::new(schema::synth_table()),
            track_events: Arena::new(schema::track_event_table()),
            tracks: Arena::new(schema::track_table()),
            sequences: Arena::new(schema::sequence_table()),
            cues: Arena::new(schema::cue_table()),
            cue_names: Arena::new(schema::cue_name_table()),
            stream_entries: Arena::new(schema::stream_entry_table()),
            stream_headers: Arena::new(schema::stream_header_table()),
            last_cue_id: 0,
            pending_entries: 0,
        }
    }

    /// Load a bank from a container payload with the default finalize config.
    pub fn load(codec: C, payload: &[u8]) -> Result<Self> {
        Self::load_with_config(codec, payload, FinalizeConfig::default())
    }

    /// Load a bank from a container payload.
    ///
    /// Fails with [`CueBankError::MalformedContainer`] if the root table has
    /// no row, or a nested table or the scratch column is missing, and with
    /// [`CueBankError::ScratchColumnConflict`] if the config's scratch column
    /// names a nested table.
    pub fn load_with_config(codec: C, payload: &[u8], config: FinalizeConfig) -> Result<Self> {
        config.validate()?;
        let root = codec.parse(payload).map_err(CueBankError::codec)?;
        if root.is_empty() {
            return Err(CueBankError::MalformedContainer(format!(
                "root table '{}' has no rows",
                root.name
            )));
        }
        if !root.has_column(&config.scratch_column) {
            return Err(CueBankError::MalformedContainer(format!(
                "root table has no scratch column '{}'",
                config.scratch_column
            )));
        }

        let load_nested = |column: &str| -> Result<Arena> {
            let bytes = match root.get_data(0, column) {
                Ok(Some(bytes)) => bytes,
                Ok(None) => {
                    return Err(CueBankError::MalformedContainer(format!(
                        "nested table '{}' is missing",
                        column
                    )))
                }
                Err(err) => {
                    return Err(CueBankError::MalformedContainer(format!(
                        "nested table '{}': {}",
                        column, err
                    )))
                }
            };
            let mut table = codec.parse(bytes).map_err(CueBankError::codec)?;
            if table.len() > MAX_ROWS {
                return Err(CueBankError::MalformedContainer(format!(
                    "nested table '{}' has {} rows, more than 16-bit references can address",
                    column,
                    table.len()
                )));
            }
            schema::apply_optional_defaults(column, &mut table)?;
            debug!("loaded {} ({} rows)", column, table.len());
            Ok(Arena::new(table))
        };

        let waveforms = load_nested(nested::WAVEFORM)?;
        let synths = load_nested(nested::SYNTH)?;
        let track_events = load_nested(nested::TRACK_EVENT)?;
        let tracks = load_nested(nested::TRACK)?;
        let sequences = load_nested(nested::SEQUENCE)?;
        let cues = load_nested(nested::CUE)?;
        let cue_names = load_nested(nested::CUE_NAME)?;
        let stream_entries = load_nested(nested::STREAM_ENTRY)?;
        let stream_headers = load_nested(nested::STREAM_HEADER)?;

        let last_cue_id = max_cue_id(cues.table())?;
        info!(
            "loaded cue bank: {} cues, {} tracks, {} stream entries, last cue id {}",
            cues.len(),
            tracks.len(),
            stream_entries.len(),
            last_cue_id
        );

        Ok(Self {
            codec,
            config,
            root,
            waveforms,
            synths,
            track_events,
            tracks,
            sequences,
            cues,
            cue_names,
            stream_entries,
            stream_headers,
            last_cue_id,
            pending_entries: 0,
        })
    }

    /// Append a stream entry with a zeroed placeholder hash.
    ///
    /// Names are not checked for uniqueness; [`CueBank::set_stream_hash`]
    /// patches the first entry with a matching name.
    pub fn add_stream_entry(&mut self, name: &str) -> Result<RowId> {
        let id = self.stream_entries.append(&StreamEntryRow::placeholder(name))?;
        debug!("stream entry {} '{}'", id, name);
        Ok(id)
    }

    /// Overwrite the hash of the first stream entry named `name`.
    ///
    /// Returns `false`, leaving the bank unchanged, if no entry has that name.
    pub fn set_stream_hash(&mut self, name: &str, hash: [u8; STREAM_HASH_LEN]) -> Result<bool> {
        match self.stream_entries.position_str(stream_entry::NAME, name)? {
            Some(id) => {
                self.stream_entries
                    .set(id, stream_entry::HASH, Value::Data(hash.to_vec()))?;
                debug!("stream entry {} '{}' hash set", id, name);
                Ok(true)
            }
            None => {
                warn!("no stream entry named '{}'; hash not set", name);
                Ok(false)
            }
        }
    }

    /// Store the archive header for stream bank `index`, growing the header
    /// table with empty rows if it is shorter than `index + 1`.
    ///
    /// The table is left unchanged if it has no header column.
    pub fn set_stream_header(&mut self, index: RowId, header: Vec<u8>) -> Result<()> {
        let table = self.stream_headers.table();
        if !table.has_column(stream_header::HEADER) {
            return Err(TableError::UnknownColumn {
                table: table.name.clone(),
                column: stream_header::HEADER.to_string(),
            }
            .into());
        }
        self.stream_headers.ensure_len(usize::from(index) + 1)?;
        self.stream_headers
            .set(index, stream_header::HEADER, Value::Data(header))?;
        Ok(())
    }

    /// Add one playable track: a waveform, a synth playing it, an event
    /// invoking the synth, and a track routing the event. Returns the track id.
    ///
    /// Either all four rows are appended or none are.
    pub fn add_track(
        &mut self,
        stream_slot: u16,
        stream_port: u16,
        sample_count: u32,
        routing: Routing,
    ) -> Result<RowId> {
        let waveform_id = self.waveforms.next_id()?;
        let synth_id = self.synths.next_id()?;
        let event_id = self.track_events.next_id()?;
        self.tracks.next_id()?;

        let waveform_row = self
            .waveforms
            .prepare(&WaveformRow::stream(stream_slot, stream_port, sample_count))?;
        let synth_row = self
            .synths
            .prepare(&SynthRow::for_waveform(synth_id, waveform_id))?;
        let event_row = self.track_events.prepare(&TrackEventRow::play_synth(synth_id))?;
        let track_row = self.tracks.prepare(&TrackRow::new(routing, event_id))?;

        self.waveforms.commit(waveform_row)?;
        self.synths.commit(synth_row)?;
        self.track_events.commit(event_row)?;
        let track_id = self.tracks.commit(track_row)?;

        debug!(
            "track {} ({:?}): event {}, synth {}, waveform {} (slot {}, port {}, {} samples)",
            track_id, routing, event_id, synth_id, waveform_id, stream_slot, stream_port, sample_count
        );
        Ok(track_id)
    }

    /// Add a named cue playing `track_ids` together. Returns the new cue id,
    /// one past the largest cue id seen so far.
    ///
    /// Cue ids and row positions are separate numbering spaces.
    pub fn add_cue(&mut self, name: &str, track_ids: &[RowId], length_ms: u32) -> Result<u32> {
        let cue_id = self
            .last_cue_id
            .checked_add(1)
            .ok_or(CueBankError::CueIdExhausted {
                last: self.last_cue_id,
            })?;
        let sequence_id = self.sequences.next_id()?;
        let cue_index = self.cues.next_id()?;
        self.cue_names.next_id()?;

        let sequence_row = self.sequences.prepare(&SequenceRow::new(track_ids))?;
        let cue_row = self.cues.prepare(&CueRow {
            cue_id,
            reference_index: sequence_id,
            length_ms,
        })?;
        let name_row = self.cue_names.prepare(&CueNameRow {
            name: name.to_string(),
            cue_index,
        })?;

        self.sequences.commit(sequence_row)?;
        self.cues.commit(cue_row)?;
        self.cue_names.commit(name_row)?;
        self.last_cue_id = cue_id;
        self.pending_entries += 1;

        debug!(
            "cue {} '{}': row {}, sequence {} over tracks {:?}, {} ms",
            cue_id, name, cue_index, sequence_id, track_ids, length_ms
        );
        Ok(cue_id)
    }

    /// Add a speaker track, a headphone track, and a cue over both.
    pub fn add_stream_asset(&mut self, asset: &StreamAsset) -> Result<AddedAsset> {
        let speaker_track = self.add_track(
            asset.stream_slot,
            asset.stream_port,
            asset.sample_count,
            Routing::Speaker,
        )?;
        let headphone_track = self.add_track(
            asset.stream_slot,
            asset.stream_port,
            asset.sample_count,
            Routing::Headphone,
        )?;
        let cue_id = self.add_cue(
            &asset.cue_name,
            &[speaker_track, headphone_track],
            asset.length_ms,
        )?;
        Ok(AddedAsset {
            speaker_track,
            headphone_track,
            cue_id,
        })
    }

    /// Serialize the bank into a container payload.
    ///
    /// Sorts the cue name index, stores every sub-table back into the root
    /// row, grows the scratch column for the cues added since the previous
    /// finalize, and saves the root table. Codec errors propagate unchanged.
    pub fn finalize(&mut self) -> Result<Vec<u8>> {
        self.sort_cue_names();

        let mut saved = Vec::with_capacity(nested::ALL.len());
        for (column, arena) in self.nested_tables() {
            let bytes = self.codec.save(arena.table()).map_err(CueBankError::codec)?;
            saved.push((column, bytes));
        }
        for (column, bytes) in saved {
            self.root.set(0, column, Value::Data(bytes))?;
        }

        let growth = self.config.scratch_growth(self.pending_entries);
        if growth > 0 {
            let column = self.config.scratch_column.as_str();
            let mut scratch = self
                .root
                .get_data(0, column)?
                .map(<[u8]>::to_vec)
                .unwrap_or_default();
            scratch.resize(scratch.len() + growth, 0);
            self.root.set(0, column, Value::Data(scratch))?;
        }
        let entries = std::mem::take(&mut self.pending_entries);

        let payload = self.codec.save(&self.root).map_err(CueBankError::codec)?;
        info!(
            "finalized cue bank: {} bytes, {} new cues, scratch +{} bytes",
            payload.len(),
            entries,
            growth
        );
        Ok(payload)
    }

    /// Sort the cue name index by name, ordinal byte order. The engine
    /// binary-searches this table.
    fn sort_cue_names(&mut self) {
        let Some(column) = self.cue_names.table().column_index(cue_name::CUE_NAME) else {
            return;
        };
        self.cue_names
            .sort_by(|a, b| row_name(a, column).cmp(row_name(b, column)));
    }

    fn nested_tables(&self) -> [(&'static str, &Arena); 9] {
        [
            (nested::WAVEFORM, &self.waveforms),
            (nested::SYNTH, &self.synths),
            (nested::TRACK_EVENT, &self.track_events),
            (nested::TRACK, &self.tracks),
            (nested::SEQUENCE, &self.sequences),
            (nested::CUE, &self.cues),
            (nested::CUE_NAME, &self.cue_names),
            (nested::STREAM_ENTRY, &self.stream_entries),
            (nested::STREAM_HEADER, &self.stream_headers),
        ]
    }

    /// Look a cue up by name the way the engine does, by binary search.
    ///
    /// Only meaningful once the name index is sorted, i.e. after
    /// [`CueBank::finalize`] or on a freshly loaded bank.
    pub fn find_cue(&self, name: &str) -> Result<Option<CueRow>> {
        let (mut lo, mut hi) = (0usize, self.cue_names.len());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let entry: CueNameRow = self.cue_names.get(mid as RowId)?;
            match entry.name.as_str().cmp(name) {
                Ordering::Less => lo = mid + 1,
                Ordering::Greater => hi = mid,
                Ordering::Equal => return self.cues.get(entry.cue_index).map(Some),
            }
        }
        Ok(None)
    }

    /// Follow a track through its event and synth to its waveform.
    pub fn resolve_track(&self, track_id: RowId) -> Result<ResolvedTrack> {
        let track: TrackRow = self.tracks.get(track_id)?;
        let event: TrackEventRow = self.track_events.get(track.event_index)?;
        let synth_id = event.synth().ok_or_else(|| CueBankError::InvalidBlob {
            table: self.track_events.table().name.clone(),
            row: usize::from(track.event_index),
            column: schema::track_event::COMMAND.to_string(),
            reason: "not a play-synth command".to_string(),
        })?;
        let synth: SynthRow = self.synths.get(synth_id)?;
        let waveform_id =
            synth
                .reference
                .waveform_index()
                .ok_or_else(|| CueBankError::InvalidBlob {
                    table: self.synths.table().name.clone(),
                    row: usize::from(synth_id),
                    column: schema::synth::REFERENCE_ITEMS.to_string(),
                    reason: format!("reference tag {} is not a waveform", synth.reference.tag),
                })?;
        let waveform: WaveformRow = self.waveforms.get(waveform_id)?;
        Ok(ResolvedTrack {
            track,
            event,
            synth_id,
            synth,
            waveform_id,
            waveform,
        })
    }

    /// Every cue name with the cue it resolves to, in index order.
    pub fn cue_listing(&self) -> Result<Vec<(CueNameRow, CueRow)>> {
        let mut listing = Vec::with_capacity(self.cue_names.len());
        for index in 0..self.cue_names.len() {
            let entry: CueNameRow = self.cue_names.get(index as RowId)?;
            let cue = self.cues.get(entry.cue_index)?;
            listing.push((entry, cue));
        }
        Ok(listing)
    }

    pub fn waveform(&self, id: RowId) -> Result<WaveformRow> {
        self.waveforms.get(id)
    }

    pub fn synth(&self, id: RowId) -> Result<SynthRow> {
        self.synths.get(id)
    }

    pub fn track_event(&self, id: RowId) -> Result<TrackEventRow> {
        self.track_events.get(id)
    }

    pub fn track(&self, id: RowId) -> Result<TrackRow> {
        self.tracks.get(id)
    }

    pub fn sequence(&self, id: RowId) -> Result<SequenceRow> {
        self.sequences.get(id)
    }

    pub fn cue(&self, id: RowId) -> Result<CueRow> {
        self.cues.get(id)
    }

    pub fn cue_name(&self, id: RowId) -> Result<CueNameRow> {
        self.cue_names.get(id)
    }

    pub fn stream_entry(&self, id: RowId) -> Result<StreamEntryRow> {
        self.stream_entries.get(id)
    }

    pub fn stream_header(&self, id: RowId) -> Result<StreamHeaderRow> {
        self.stream_headers.get(id)
    }

    /// The sub-table stored under a nested root column, e.g. [`nested::CUE`].
    pub fn table(&self, nested_column: &str) -> Option<&Table> {
        self.nested_tables()
            .into_iter()
            .find(|(column, _)| *column == nested_column)
            .map(|(_, arena)| arena.table())
    }

    /// The root table as last finalized (or loaded).
    pub fn root(&self) -> &Table {
        &self.root
    }

    /// Largest cue id in the bank; the next cue gets this plus one.
    pub fn last_cue_id(&self) -> u32 {
        self.last_cue_id
    }

    /// Cues added since load or the previous finalize.
    pub fn pending_entries(&self) -> usize {
        self.pending_entries
    }

    /// Slot count the container must declare: one per stream entry.
    pub fn slot_count(&self) -> usize {
        self.stream_entries.len()
    }

    pub fn config(&self) -> &FinalizeConfig {
        &self.config
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn summary(&self) -> BankSummary {
        BankSummary {
            waveforms: self.waveforms.len(),
            synths: self.synths.len(),
            track_events: self.track_events.len(),
            tracks: self.tracks.len(),
            sequences: self.sequences.len(),
            cues: self.cues.len(),
            cue_names: self.cue_names.len(),
            stream_entries: self.stream_entries.len(),
            stream_headers: self.stream_headers.len(),
            last_cue_id: self.last_cue_id,
        }
    }
}

fn row_name(row: &Row, column: usize) -> &str {
    row.cell(column).and_then(Value::as_str).unwrap_or("")
}

fn max_cue_id(cues: &Table) -> Result<u32> {
    if !cues.has_column(cue::CUE_ID) {
        return Err(CueBankError::MalformedContainer(format!(
            "cue table has no '{}' column",
            cue::CUE_ID
        )));
    }
    let mut last = 0;
    for index in 0..cues.len() {
        if let Some(id) = cues.get_u32(index, cue::CUE_ID)? {
            last = last.max(id);
        }
    }
    Ok(last)
}
