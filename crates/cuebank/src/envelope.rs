//! Prefix record of the asset container that embeds a cue bank payload.
//!
//! The container stores the payload after a fixed 20-byte record of five
//! little-endian `u32` fields:
//!
//! ```text
//! offset  field
//! 0       flags          = 0
//! 4       element count  = payload length
//! 8       size on disk   = payload length
//! 12      self offset    = 0x40C (position of the record in the combined asset)
//! 16      reserved       = 0
//! ```

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{CueBankError, Result};

/// Size of the prefix record.
pub const PREFIX_LEN: usize = 20;

/// Offset of the prefix record within the combined asset.
pub const DEFAULT_SELF_OFFSET: u32 = 0x40C;

/// The container prefix record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetPrefix {
    pub flags: u32,
    pub element_count: u32,
    pub size_on_disk: u32,
    pub self_offset: u32,
    pub reserved: u32,
}

impl AssetPrefix {
    /// Prefix for a payload of `len` bytes.
    pub fn for_payload(len: usize) -> Result<Self> {
        let len32 = u32::try_from(len).map_err(|_| CueBankError::PayloadTooLarge(len))?;
        Ok(Self {
            flags: 0,
            element_count: len32,
            size_on_disk: len32,
            self_offset: DEFAULT_SELF_OFFSET,
            reserved: 0,
        })
    }

    pub fn encode(&self) -> [u8; PREFIX_LEN] {
        let mut buf = [0u8; PREFIX_LEN];
        LittleEndian::write_u32_into(
            &[
                self.flags,
                self.element_count,
                self.size_on_disk,
                self.self_offset,
                self.reserved,
            ],
            &mut buf,
        );
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < PREFIX_LEN {
            return Err(CueBankError::MalformedContainer(format!(
                "prefix record needs {} bytes, got {}",
                PREFIX_LEN,
                bytes.len()
            )));
        }
        let mut fields = [0u32; 5];
        LittleEndian::read_u32_into(&bytes[..PREFIX_LEN], &mut fields);
        Ok(Self {
            flags: fields[0],
            element_count: fields[1],
            size_on_disk: fields[2],
            self_offset: fields[3],
            reserved: fields[4],
        })
    }
}

/// Prepend the prefix record to a finalized payload.
pub fn wrap_payload(payload: &[u8]) -> Result<Vec<u8>> {
    let prefix = AssetPrefix::for_payload(payload.len())?;
    let mut out = Vec::with_capacity(PREFIX_LEN + payload.len());
    out.extend_from_slice(&prefix.encode());
    out.extend_from_slice(payload);
    Ok(out)
}

/// Strip the prefix record, returning the payload it describes.
pub fn unwrap_payload(bytes: &[u8]) -> Result<&[u8]> {
    let prefix = AssetPrefix::decode(bytes)?;
    let payload = &bytes[PREFIX_LEN..];
    if prefix.element_count as usize != payload.len() {
        return Err(CueBankError::MalformedContainer(format!(
            "prefix declares {} payload bytes, found {}",
            prefix.element_count,
            payload.len()
        )));
    }
    Ok(payload)
}
