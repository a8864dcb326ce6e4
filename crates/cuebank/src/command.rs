//! Binary blobs stored inside cue bank cells.
//!
//! These layouts are defined by the playback engine and must be reproduced
//! byte for byte. All multi-byte fields are big-endian.
//!
//! # Play-synth command (TrackEvent `Command`, 10 bytes)
//!
//! ```text
//! offset  size  field
//! 0       2     opcode       = 2000 (invoke referenced synth)
//! 2       1     arg count    = 4
//! 3       2     param tag    = 2
//! 5       2     synth index
//! 7       1     pad          = 0
//! 8       2     reserved     = 0
//! ```
//!
//! Offsets 7 and 8 have no confirmed meaning; they are kept as opaque zeros.

use byteorder::{BigEndian, ByteOrder};

/// Opcode that invokes a referenced synth.
pub const PLAY_SYNTH_OPCODE: u16 = 2000;

/// Argument byte count following the opcode header.
pub const PLAY_SYNTH_ARG_COUNT: u8 = 4;

/// Parameter tag marking the synth index argument.
pub const PLAY_SYNTH_PARAM_TAG: u16 = 2;

/// Size of an encoded play-synth command.
pub const PLAY_SYNTH_COMMAND_LEN: usize = 10;

/// Reference item tag for a waveform target.
pub const WAVEFORM_REFERENCE_TAG: u16 = 1;

/// Size of an encoded reference item.
pub const REFERENCE_ITEM_LEN: usize = 4;

/// A synth's reference item: what kind of node it plays, and which one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceItem {
    pub tag: u16,
    pub target: u16,
}

impl ReferenceItem {
    /// Reference to a waveform row.
    pub fn waveform(index: u16) -> Self {
        Self {
            tag: WAVEFORM_REFERENCE_TAG,
            target: index,
        }
    }

    /// Returns the waveform index if this references a waveform.
    pub fn waveform_index(&self) -> Option<u16> {
        (self.tag == WAVEFORM_REFERENCE_TAG).then_some(self.target)
    }

    /// Encode as `[tag BE16][target BE16]`.
    pub fn encode(&self) -> [u8; REFERENCE_ITEM_LEN] {
        let mut buf = [0u8; REFERENCE_ITEM_LEN];
        BigEndian::write_u16(&mut buf[0..2], self.tag);
        BigEndian::write_u16(&mut buf[2..4], self.target);
        buf
    }

    /// Decode the first reference item of a blob.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < REFERENCE_ITEM_LEN {
            return None;
        }
        Some(Self {
            tag: BigEndian::read_u16(&bytes[0..2]),
            target: BigEndian::read_u16(&bytes[2..4]),
        })
    }
}

/// The single command of a track event created by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaySynthCommand {
    pub synth: u16,
}

impl PlaySynthCommand {
    pub fn new(synth: u16) -> Self {
        Self { synth }
    }

    /// Encode the fixed 10-byte layout.
    pub fn encode(&self) -> [u8; PLAY_SYNTH_COMMAND_LEN] {
        let mut buf = [0u8; PLAY_SYNTH_COMMAND_LEN];
        BigEndian::write_u16(&mut buf[0..2], PLAY_SYNTH_OPCODE);
        buf[2] = PLAY_SYNTH_ARG_COUNT;
        BigEndian::write_u16(&mut buf[3..5], PLAY_SYNTH_PARAM_TAG);
        BigEndian::write_u16(&mut buf[5..7], self.synth);
        buf[7] = 0;
        BigEndian::write_u16(&mut buf[8..10], 0);
        buf
    }

    /// Decode a command blob. Returns `None` unless the blob is exactly a
    /// play-synth command with the fixed constants in place.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != PLAY_SYNTH_COMMAND_LEN
            || BigEndian::read_u16(&bytes[0..2]) != PLAY_SYNTH_OPCODE
            || bytes[2] != PLAY_SYNTH_ARG_COUNT
            || BigEndian::read_u16(&bytes[3..5]) != PLAY_SYNTH_PARAM_TAG
            || bytes[7] != 0
            || BigEndian::read_u16(&bytes[8..10]) != 0
        {
            return None;
        }
        Some(Self {
            synth: BigEndian::read_u16(&bytes[5..7]),
        })
    }
}

/// Encode a sequence's track list, one BE16 per track, in order.
pub fn encode_track_indices(tracks: &[u16]) -> Vec<u8> {
    let mut buf = vec![0u8; tracks.len() * 2];
    BigEndian::write_u16_into(tracks, &mut buf);
    buf
}

/// Decode a sequence's track list. Fails on odd-length blobs.
pub fn decode_track_indices(bytes: &[u8]) -> Option<Vec<u16>> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let mut tracks = vec![0u16; bytes.len() / 2];
    BigEndian::read_u16_into(bytes, &mut tracks);
    Some(tracks)
}
