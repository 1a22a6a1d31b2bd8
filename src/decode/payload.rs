//! Typed extraction of attribute payloads

use crate::types::{AttributeTag, PhyStatus};
use crate::{Result, ThroughputError};

/// Trait for values that can be read from an attribute payload.
pub trait PayloadValue: Sized {
    /// Parse this value from the start of `payload`, which belongs to `tag`.
    fn from_payload(payload: &[u8], tag: AttributeTag) -> Result<Self>;
}

fn require(payload: &[u8], tag: AttributeTag, len: usize) -> Result<&[u8]> {
    payload.get(..len).ok_or(ThroughputError::malformed(tag, len, payload.len()))
}

impl PayloadValue for u8 {
    fn from_payload(payload: &[u8], tag: AttributeTag) -> Result<Self> {
        Ok(require(payload, tag, 1)?[0])
    }
}

/// `1` is on, anything else is off.
impl PayloadValue for bool {
    fn from_payload(payload: &[u8], tag: AttributeTag) -> Result<Self> {
        Ok(u8::from_payload(payload, tag)? == 1)
    }
}

impl PayloadValue for u16 {
    fn from_payload(payload: &[u8], tag: AttributeTag) -> Result<Self> {
        let bytes = require(payload, tag, 2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }
}

/// Variable-width little-endian integer: at least 2 bytes, at most the first 4 are used.
impl PayloadValue for u32 {
    fn from_payload(payload: &[u8], tag: AttributeTag) -> Result<Self> {
        require(payload, tag, 2)?;
        let mut bytes = [0u8; 4];
        let width = payload.len().min(4);
        bytes[..width].copy_from_slice(&payload[..width]);
        Ok(u32::from_le_bytes(bytes))
    }
}

impl PayloadValue for PhyStatus {
    fn from_payload(payload: &[u8], tag: AttributeTag) -> Result<Self> {
        Ok(PhyStatus::from_code(u8::from_payload(payload, tag)?))
    }
}
