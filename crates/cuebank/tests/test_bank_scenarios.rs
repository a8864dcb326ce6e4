//! End-to-end tests for cue bank assembly.
//!
//! These tests drive a [`CueBank`] through load, append, and finalize using
//! the JSON table codec, and check the cross-table wiring, cue id numbering,
//! name ordering, and payload round-trips.

use cuebank::schema::{self, cue, nested, stream_header};
use cuebank::{CueBank, CueBankError, Routing, StreamAsset};
use cuebank_table::{JsonCodecError, JsonTableCodec, Table, TableCodec, Value};
use pretty_assertions::assert_eq;

// =============================================================================
// Helper Functions
// =============================================================================

/// Build a payload whose cue table holds the given cue ids (one sequence row
/// each, no tracks).
fn payload_with_cue_ids(ids: &[u32]) -> Vec<u8> {
    let codec = JsonTableCodec;
    let mut cues = schema::cue_table();
    for (index, id) in ids.iter().enumerate() {
        let row = cues.push_row(cues.new_row());
        cues.set(row, cue::CUE_ID, Value::U32(*id)).unwrap();
        cues.set(row, cue::REFERENCE_INDEX, Value::U16(index as u16)).unwrap();
        cues.set(row, cue::LENGTH, Value::U32(1000)).unwrap();
    }

    let tables: [(&str, Table); 9] = [
        (nested::WAVEFORM, schema::waveform_table()),
        (nested::SYNTH, schema::synth_table()),
        (nested::TRACK_EVENT, schema::track_event_table()),
        (nested::TRACK, schema::track_table()),
        (nested::SEQUENCE, schema::sequence_table()),
        (nested::CUE, cues),
        (nested::CUE_NAME, schema::cue_name_table()),
        (nested::STREAM_ENTRY, schema::stream_entry_table()),
        (nested::STREAM_HEADER, schema::stream_header_table()),
    ];
    let mut root = schema::root_table(schema::SCRATCH_COLUMN);
    for (column, table) in tables {
        let bytes = codec.save(&table).unwrap();
        root.set(0, column, Value::Data(bytes)).unwrap();
    }
    root.set(0, schema::SCRATCH_COLUMN, Value::Data(vec![0; 64]))
        .unwrap();
    codec.save(&root).unwrap()
}

fn nested_bytes(payload: &[u8], column: &str) -> Vec<u8> {
    let root = JsonTableCodec.parse(payload).unwrap();
    root.get_data(0, column).unwrap().unwrap().to_vec()
}

fn scratch_len(payload: &[u8]) -> usize {
    nested_bytes(payload, schema::SCRATCH_COLUMN).len()
}

/// A codec that parses JSON but refuses to save.
struct ReadOnlyCodec;

#[derive(Debug, thiserror::Error)]
#[error("read-only codec")]
struct ReadOnlyError;

impl TableCodec for ReadOnlyCodec {
    type Error = ReadOnlyError;

    fn parse(&self, bytes: &[u8]) -> Result<Table, Self::Error> {
        JsonTableCodec.parse(bytes).map_err(|_| ReadOnlyError)
    }

    fn save(&self, _table: &Table) -> Result<Vec<u8>, Self::Error> {
        Err(ReadOnlyError)
    }
}

// =============================================================================
// 1. Cue Id Numbering
// =============================================================================

#[test]
fn test_cue_ids_continue_after_loaded_maximum() {
    let payload = payload_with_cue_ids(&[5, 12, 7]);
    let mut bank = CueBank::load(JsonTableCodec, &payload).unwrap();
    assert_eq!(bank.last_cue_id(), 12);

    let a = bank.add_cue("A", &[0, 1], 1000).unwrap();
    let b = bank.add_cue("B", &[2, 3], 2000).unwrap();
    assert_eq!((a, b), (13, 14));

    // New name rows follow the three loaded cue rows, in insertion order.
    let first = bank.cue_name(0).unwrap();
    let second = bank.cue_name(1).unwrap();
    assert_eq!((first.name.as_str(), first.cue_index), ("A", 3));
    assert_eq!((second.name.as_str(), second.cue_index), ("B", 4));
    assert_eq!(bank.cue(3).unwrap().cue_id, 13);
    assert_eq!(bank.cue(4).unwrap().cue_id, 14);
}

#[test]
fn test_cue_ids_strictly_increase_and_never_repeat_loaded_ids() {
    let loaded = [3, 9, 1];
    let payload = payload_with_cue_ids(&loaded);
    let mut bank = CueBank::load(JsonTableCodec, &payload).unwrap();

    let mut previous = 0;
    for i in 0..20 {
        let id = bank.add_cue(&format!("cue_{:02}", 19 - i), &[], 1).unwrap();
        assert!(id > previous);
        assert!(!loaded.contains(&id));
        previous = id;
    }
}

#[test]
fn test_cue_ids_are_independent_of_row_positions() {
    let payload = payload_with_cue_ids(&[100]);
    let mut bank = CueBank::load(JsonTableCodec, &payload).unwrap();
    let id = bank.add_cue("x", &[], 1).unwrap();
    assert_eq!(id, 101);
    let entry = bank.cue_name(0).unwrap();
    assert_eq!(entry.cue_index, 1);
    let sequence = bank.cue(entry.cue_index).unwrap().reference_index;
    assert_eq!(sequence, 0);
}

#[test]
fn test_banks_do_not_share_cue_counters() {
    let mut first = CueBank::new(JsonTableCodec);
    let mut second = CueBank::new(JsonTableCodec);
    assert_eq!(first.add_cue("a", &[], 1).unwrap(), 1);
    assert_eq!(first.add_cue("b", &[], 1).unwrap(), 2);
    assert_eq!(second.add_cue("a", &[], 1).unwrap(), 1);
}

// =============================================================================
// 2. Track Wiring
// =============================================================================

#[test]
fn test_speaker_and_headphone_tracks_on_empty_bank() {
    let mut bank = CueBank::new(JsonTableCodec);
    let speaker = bank.add_track(0, 7, 44100, Routing::Speaker).unwrap();
    let headphone = bank.add_track(0, 7, 44100, Routing::Headphone).unwrap();
    assert_eq!((speaker, headphone), (0, 1));

    let speaker_row = bank.track(speaker).unwrap();
    let headphone_row = bank.track(headphone).unwrap();
    assert_eq!(speaker_row.routing_selector, 0);
    assert_eq!(headphone_row.routing_selector, 1);
    assert_eq!(speaker_row.event_index, 0);
    assert_eq!(headphone_row.event_index, 1);

    // Each track gets its own synth and waveform.
    let s = bank.resolve_track(speaker).unwrap();
    let h = bank.resolve_track(headphone).unwrap();
    assert_eq!((s.synth_id, s.waveform_id), (0, 0));
    assert_eq!((h.synth_id, h.waveform_id), (1, 1));
    assert_eq!(bank.summary().waveforms, 2);
}

#[test]
fn test_resolved_track_matches_inputs() {
    let mut bank = CueBank::new(JsonTableCodec);
    bank.add_track(1, 2, 10, Routing::Speaker).unwrap();
    let track = bank.add_track(4, 3, 123_456, Routing::Headphone).unwrap();

    let resolved = bank.resolve_track(track).unwrap();
    assert_eq!(resolved.track.routing(), Some(Routing::Headphone));
    assert_eq!(resolved.waveform.sample_count, 123_456);
    assert_eq!(resolved.waveform.stream_slot, 4);
    assert_eq!(resolved.waveform.stream_port, 3);
    assert_eq!(resolved.waveform.num_channels, 2);
    assert!(resolved.waveform.looping);
    assert_eq!(resolved.synth.control_work_area_1, resolved.synth_id);
    assert_eq!(resolved.synth.control_work_area_2, resolved.synth_id);
}

#[test]
fn test_track_event_command_bytes() {
    let mut bank = CueBank::new(JsonTableCodec);
    bank.add_track(0, 0, 1, Routing::Speaker).unwrap();
    bank.add_track(0, 0, 1, Routing::Speaker).unwrap();
    let event = bank.track_event(1).unwrap();
    assert_eq!(event.command, vec![0x07, 0xD0, 0x04, 0x00, 0x02, 0x00, 0x01, 0x00, 0x00, 0x00]);
}

#[test]
fn test_sequence_lists_tracks_in_order() {
    let mut bank = CueBank::new(JsonTableCodec);
    bank.add_cue("seq", &[9, 2, 300], 1).unwrap();
    let sequence = bank.sequence(0).unwrap();
    assert_eq!(sequence.tracks, vec![9, 2, 300]);
    assert_eq!(sequence.command_index, 1);

    let raw = bank.table(nested::SEQUENCE).unwrap();
    assert_eq!(
        raw.get_data(0, schema::sequence::TRACK_INDEX).unwrap(),
        Some(&[0x00, 0x09, 0x00, 0x02, 0x01, 0x2C][..])
    );
}

#[test]
fn test_add_stream_asset_creates_pair_and_cue() {
    let mut bank = CueBank::new(JsonTableCodec);
    let port = bank.add_stream_entry("BGM_V01").unwrap();
    let added = bank
        .add_stream_asset(&StreamAsset {
            cue_name: "BGM_S01_001".to_string(),
            stream_slot: 0,
            stream_port: port,
            sample_count: 48_000,
            length_ms: 1_000,
        })
        .unwrap();
    assert_eq!(added.cue_id, 1);
    assert_eq!(bank.sequence(0).unwrap().tracks, vec![added.speaker_track, added.headphone_track]);
    assert_eq!(
        bank.resolve_track(added.headphone_track).unwrap().track.routing(),
        Some(Routing::Headphone)
    );
    assert_eq!(bank.slot_count(), 1);
}

// =============================================================================
// 3. Stream Entries and Headers
// =============================================================================

#[test]
fn test_stream_header_sparse_growth() {
    let mut bank = CueBank::new(JsonTableCodec);
    bank.set_stream_header(5, vec![0xAF, 0x53, 0x32]).unwrap();
    assert_eq!(bank.summary().stream_headers, 6);
    for id in 0..5 {
        assert_eq!(bank.stream_header(id).unwrap().header, None);
    }
    assert_eq!(bank.stream_header(5).unwrap().header, Some(vec![0xAF, 0x53, 0x32]));

    // Lower indices overwrite in place.
    bank.set_stream_header(2, vec![1]).unwrap();
    assert_eq!(bank.summary().stream_headers, 6);
    assert_eq!(bank.stream_header(2).unwrap().header, Some(vec![1]));
}

#[test]
fn test_stream_hash_patches_first_match() {
    let mut bank = CueBank::new(JsonTableCodec);
    bank.add_stream_entry("dup").unwrap();
    bank.add_stream_entry("dup").unwrap();
    assert_eq!(bank.stream_entry(0).unwrap().hash, [0; 16]);

    assert!(bank.set_stream_hash("dup", [7; 16]).unwrap());
    assert_eq!(bank.stream_entry(0).unwrap().hash, [7; 16]);
    assert_eq!(bank.stream_entry(1).unwrap().hash, [0; 16]);
}

#[test]
fn test_stream_hash_without_entry_is_noop() {
    let mut bank = CueBank::new(JsonTableCodec);
    bank.add_stream_entry("present").unwrap();
    assert!(!bank.set_stream_hash("absent", [1; 16]).unwrap());
    assert_eq!(bank.stream_entry(0).unwrap().hash, [0; 16]);
}

// =============================================================================
// 4. Finalize
// =============================================================================

#[test]
fn test_finalize_sorts_cue_names() {
    let mut bank = CueBank::new(JsonTableCodec);
    for name in ["MER_BGM_S03", "MER_BGM_S01", "Zeta", "MER_BGM_S02", "alpha"] {
        bank.add_cue(name, &[], 1).unwrap();
    }
    let payload = bank.finalize().unwrap();

    let loaded = CueBank::load(JsonTableCodec, &payload).unwrap();
    let names: Vec<String> = loaded
        .cue_listing()
        .unwrap()
        .into_iter()
        .map(|(entry, _)| entry.name)
        .collect();
    // Ordinal order: uppercase sorts before lowercase.
    assert_eq!(
        names,
        vec!["MER_BGM_S01", "MER_BGM_S02", "MER_BGM_S03", "Zeta", "alpha"]
    );

    // Each name still resolves to the cue it was added with.
    for (entry, cue) in loaded.cue_listing().unwrap() {
        let expected = match entry.name.as_str() {
            "MER_BGM_S03" => 1,
            "MER_BGM_S01" => 2,
            "Zeta" => 3,
            "MER_BGM_S02" => 4,
            _ => 5,
        };
        assert_eq!(cue.cue_id, expected, "{}", entry.name);
    }
}

#[test]
fn test_round_trip_without_mutation_is_byte_identical() {
    let payload = payload_with_cue_ids(&[1, 2, 3]);
    let mut bank = CueBank::load(JsonTableCodec, &payload).unwrap();
    let output = bank.finalize().unwrap();

    for column in nested::ALL {
        assert_eq!(nested_bytes(&output, column), nested_bytes(&payload, column), "{}", column);
    }
    assert_eq!(scratch_len(&output), 64);
    assert_eq!(output, payload);
}

#[test]
fn test_scratch_grows_per_cue_added() {
    let payload = payload_with_cue_ids(&[1]);
    let mut bank = CueBank::load(JsonTableCodec, &payload).unwrap();
    for i in 0..3 {
        bank.add_cue(&format!("c{}", i), &[], 1).unwrap();
    }
    let output = bank.finalize().unwrap();
    assert_eq!(scratch_len(&output), 64 + 3 * 172);
}

#[test]
fn test_scratch_growth_is_configurable() {
    let payload = payload_with_cue_ids(&[]);
    let config = cuebank::FinalizeConfig::from_json(r#"{"scratch_bytes_per_entry": 10}"#).unwrap();
    let mut bank = CueBank::load_with_config(JsonTableCodec, &payload, config).unwrap();
    bank.add_cue("a", &[], 1).unwrap();
    bank.add_cue("b", &[], 1).unwrap();
    assert_eq!(scratch_len(&bank.finalize().unwrap()), 64 + 20);
}

#[test]
fn test_finalized_payload_reloads_with_new_rows() {
    let mut bank = CueBank::new(JsonTableCodec);
    let port = bank.add_stream_entry("bank").unwrap();
    let speaker = bank.add_track(0, port, 500, Routing::Speaker).unwrap();
    let headphone = bank.add_track(0, port, 500, Routing::Headphone).unwrap();
    bank.add_cue("song", &[speaker, headphone], 250).unwrap();
    bank.set_stream_hash("bank", [0x11; 16]).unwrap();
    bank.set_stream_header(port, vec![1, 2, 3]).unwrap();
    let payload = bank.finalize().unwrap();

    let reloaded = CueBank::load(JsonTableCodec, &payload).unwrap();
    assert_eq!(reloaded.summary(), bank.summary());
    assert_eq!(reloaded.last_cue_id(), 1);
    assert_eq!(reloaded.stream_entry(0).unwrap().hash, [0x11; 16]);
    assert_eq!(reloaded.resolve_track(1).unwrap(), bank.resolve_track(1).unwrap());
    assert_eq!(reloaded.find_cue("song").unwrap().unwrap().length_ms, 250);
}

#[test]
fn test_new_rows_carry_empty_optional_strings() {
    let mut bank = CueBank::new(JsonTableCodec);
    bank.add_track(0, 0, 1, Routing::Speaker).unwrap();
    bank.add_cue("x", &[0], 1).unwrap();
    let tracks = bank.table(nested::TRACK).unwrap();
    assert_eq!(
        tracks.rows()[0].cell(tracks.column_index(schema::track::TARGET_NAME).unwrap()),
        Some(&Value::String(String::new()))
    );
    let cues = bank.table(nested::CUE).unwrap();
    assert_eq!(cues.get_str(0, cue::USER_DATA).unwrap(), Some(""));
}

// =============================================================================
// 5. Errors
// =============================================================================

#[test]
fn test_load_rejects_root_without_rows() {
    let root = Table::new(schema::ROOT_TABLE);
    let payload = JsonTableCodec.save(&root).unwrap();
    let err = CueBank::load(JsonTableCodec, &payload).unwrap_err();
    assert!(matches!(err, CueBankError::MalformedContainer(_)), "{}", err);
}

#[test]
fn test_load_rejects_missing_nested_table() {
    let root = JsonTableCodec.parse(&payload_with_cue_ids(&[])).unwrap();
    let mut stripped = Table::new(schema::ROOT_TABLE);
    for column in root.columns().iter().filter(|c| c.name != nested::SYNTH) {
        stripped.add_column(&column.name, column.ty).unwrap();
    }
    let row = stripped.push_row(stripped.new_row());
    for column in nested::ALL.iter().filter(|c| **c != nested::SYNTH) {
        let value = root.get(0, column).unwrap().cloned().unwrap();
        stripped.set(row, column, value).unwrap();
    }

    let payload = JsonTableCodec.save(&stripped).unwrap();
    match CueBank::load(JsonTableCodec, &payload).unwrap_err() {
        CueBankError::MalformedContainer(message) => assert!(message.contains("SynthTable")),
        other => panic!("expected MalformedContainer, got {:?}", other),
    }
}

#[test]
fn test_load_rejects_null_nested_table() {
    let root = JsonTableCodec.parse(&payload_with_cue_ids(&[])).unwrap();
    let mut row = root.rows()[0].clone();
    row.cells[root.column_index(nested::CUE).unwrap()] = None;
    let mut rebuilt = Table::new(schema::ROOT_TABLE);
    for column in root.columns() {
        rebuilt.add_column(&column.name, column.ty).unwrap();
    }
    rebuilt.push_row(row);

    let payload = JsonTableCodec.save(&rebuilt).unwrap();
    let err = CueBank::load(JsonTableCodec, &payload).unwrap_err();
    assert!(matches!(err, CueBankError::MalformedContainer(_)));
}

#[test]
fn test_load_rejects_scratch_column_naming_a_nested_table() {
    let payload = payload_with_cue_ids(&[1]);
    let config = cuebank::FinalizeConfig {
        scratch_column: nested::CUE.to_string(),
        ..cuebank::FinalizeConfig::default()
    };
    match CueBank::load_with_config(JsonTableCodec, &payload, config) {
        Err(CueBankError::ScratchColumnConflict(column)) => assert_eq!(column, "CueTable"),
        other => panic!("expected ScratchColumnConflict, got {:?}", other.map(|b| b.summary())),
    }
}

#[test]
fn test_load_propagates_codec_errors_unchanged() {
    let err = CueBank::load(JsonTableCodec, b"not a table").unwrap_err();
    match err {
        CueBankError::Codec(inner) => {
            assert!(inner.downcast_ref::<JsonCodecError>().is_some());
        }
        other => panic!("expected Codec, got {:?}", other),
    }
}

#[test]
fn test_finalize_propagates_codec_errors_unchanged() {
    let payload = payload_with_cue_ids(&[1]);
    let mut bank = CueBank::load(ReadOnlyCodec, &payload).unwrap();
    match bank.finalize().unwrap_err() {
        CueBankError::Codec(inner) => assert!(inner.downcast_ref::<ReadOnlyError>().is_some()),
        other => panic!("expected Codec, got {:?}", other),
    }
}

#[test]
fn test_stream_header_index_limit() {
    let mut bank = CueBank::new(JsonTableCodec);
    bank.set_stream_header(u16::MAX, vec![]).unwrap();
    assert_eq!(bank.summary().stream_headers, 65536);
    assert!(bank.stream_header(u16::MAX).unwrap().header.is_some());
    let raw = bank.table(nested::STREAM_HEADER).unwrap();
    assert_eq!(raw.get_data(0, stream_header::HEADER).unwrap(), None);
}

// =============================================================================
// 6. Container Prefix
// =============================================================================

#[test]
fn test_wrapped_payload_loads_after_unwrap() {
    let mut bank = CueBank::new(JsonTableCodec);
    bank.add_cue("wrapped", &[], 42).unwrap();
    let payload = bank.finalize().unwrap();

    let wrapped = cuebank::envelope::wrap_payload(&payload).unwrap();
    let len = (payload.len() as u32).to_le_bytes();
    assert_eq!(&wrapped[..4], &[0, 0, 0, 0]);
    assert_eq!(&wrapped[4..8], &len);
    assert_eq!(&wrapped[8..12], &len);
    assert_eq!(&wrapped[12..16], &[0x0C, 0x04, 0x00, 0x00]);
    assert_eq!(&wrapped[16..20], &[0, 0, 0, 0]);

    let inner = cuebank::envelope::unwrap_payload(&wrapped).unwrap();
    assert_eq!(inner, &payload[..]);
    let reloaded = CueBank::load(JsonTableCodec, inner).unwrap();
    assert_eq!(reloaded.find_cue("wrapped").unwrap().unwrap().length_ms, 42);
}
