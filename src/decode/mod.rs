//! Attribute payload decoding.
//!
//! [`decode`] is pure: it turns a tagged payload into a [`DecodedAttribute`]
//! or a [`ThroughputError::MalformedPayload`](crate::ThroughputError) when the
//! payload is too short for its tag. It never panics on truncated input.
//!
//! ## Wire formats
//!
//! | tag | payload | decoded |
//! |---|---|---|
//! | `phy_status` | 1 byte | [`PhyStatus`], unknown codes kept as `Unknown` |
//! | `mtu_size`, `pdu_size` | 1 byte | `u8` |
//! | `transmission_toggle` | 1 byte | `1` = on |
//! | `connection_interval` | >= 2 bytes LE | raw x 1.25 ms |
//! | `slave_latency` | >= 2 bytes LE | raw x 1.25 ms |
//! | `supervision_timeout` | >= 2 bytes LE | raw x 10 ms |
//! | `indication_data`, `notification_data` | any | byte count and preview |
//!
//! ```rust
//! use throughput::decode::{decode, DecodedAttribute};
//! use throughput::AttributeTag;
//!
//! let decoded = decode(AttributeTag::ConnectionInterval, &80u16.to_le_bytes()).unwrap();
//! assert_eq!(decoded, DecodedAttribute::ConnectionInterval(100.0));
//! ```

mod payload;
mod preview;

pub use payload::PayloadValue;
pub use preview::{FLOAT_PACKET_LEN, packet_floats, packet_preview};

use crate::Result;
use crate::types::{AttributeTag, PhyStatus, TransferMode};

/// Connection interval and slave latency unit, in milliseconds.
pub const INTERVAL_UNIT_MS: f64 = 1.25;

/// Supervision timeout unit, in milliseconds.
pub const SUPERVISION_TIMEOUT_UNIT_MS: u64 = 10;

/// Result of decoding one attribute payload.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedAttribute {
    PhyStatus(PhyStatus),
    MtuSize(u8),
    PduSize(u8),
    ConnectionInterval(f64),
    SlaveLatency(f64),
    SupervisionTimeout(u64),
    TransmissionToggle(bool),
    Packet(PacketDecode),
}

/// Decoded test traffic packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketDecode {
    /// Bytes to count toward throughput
    pub byte_count: usize,
    /// Display preview, see [`packet_preview`]
    pub preview: String,
    pub mode: TransferMode,
}

/// Decode a tagged attribute payload.
pub fn decode(tag: AttributeTag, payload: &[u8]) -> Result<DecodedAttribute> {
    let decoded = match tag {
        AttributeTag::PhyStatus => {
            DecodedAttribute::PhyStatus(PhyStatus::from_payload(payload, tag)?)
        }
        AttributeTag::MtuSize => DecodedAttribute::MtuSize(u8::from_payload(payload, tag)?),
        AttributeTag::PduSize => DecodedAttribute::PduSize(u8::from_payload(payload, tag)?),
        AttributeTag::TransmissionToggle => {
            DecodedAttribute::TransmissionToggle(bool::from_payload(payload, tag)?)
        }
        AttributeTag::ConnectionInterval => {
            let raw = u32::from_payload(payload, tag)?;
            DecodedAttribute::ConnectionInterval(raw as f64 * INTERVAL_UNIT_MS)
        }
        AttributeTag::SlaveLatency => {
            let raw = u32::from_payload(payload, tag)?;
            DecodedAttribute::SlaveLatency(raw as f64 * INTERVAL_UNIT_MS)
        }
        AttributeTag::SupervisionTimeout => {
            let raw = u32::from_payload(payload, tag)?;
            DecodedAttribute::SupervisionTimeout(raw as u64 * SUPERVISION_TIMEOUT_UNIT_MS)
        }
        AttributeTag::IndicationData => {
            DecodedAttribute::Packet(decode_packet(payload, TransferMode::Indications))
        }
        AttributeTag::NotificationData => {
            DecodedAttribute::Packet(decode_packet(payload, TransferMode::Notifications))
        }
    };

    Ok(decoded)
}

fn decode_packet(payload: &[u8], mode: TransferMode) -> PacketDecode {
    PacketDecode { byte_count: payload.len(), preview: packet_preview(payload), mode }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ThroughputError;
    use proptest::prelude::*;

    #[test]
    fn connection_interval_scales_by_1_25() {
        let decoded = decode(AttributeTag::ConnectionInterval, &[0x50, 0x00]).unwrap();
        assert_eq!(decoded, DecodedAttribute::ConnectionInterval(100.0));
    }

    #[test]
    fn slave_latency_uses_interval_unit() {
        let decoded = decode(AttributeTag::SlaveLatency, &[0x04, 0x00]).unwrap();
        assert_eq!(decoded, DecodedAttribute::SlaveLatency(5.0));
    }

    #[test]
    fn supervision_timeout_scales_by_10() {
        let decoded = decode(AttributeTag::SupervisionTimeout, &500u16.to_le_bytes()).unwrap();
        assert_eq!(decoded, DecodedAttribute::SupervisionTimeout(5000));
    }

    #[test]
    fn single_byte_attributes() {
        assert_eq!(decode(AttributeTag::MtuSize, &[247]).unwrap(), DecodedAttribute::MtuSize(247));
        assert_eq!(decode(AttributeTag::PduSize, &[251]).unwrap(), DecodedAttribute::PduSize(251));
        assert_eq!(
            decode(AttributeTag::TransmissionToggle, &[1]).unwrap(),
            DecodedAttribute::TransmissionToggle(true)
        );
        assert_eq!(
            decode(AttributeTag::PhyStatus, &[0x42]).unwrap(),
            DecodedAttribute::PhyStatus(PhyStatus::Unknown(0x42))
        );
    }

    #[test]
    fn packets_report_mode_count_and_preview() {
        let decoded = decode(AttributeTag::NotificationData, &[0x0A, 0xFF]).unwrap();
        assert_eq!(
            decoded,
            DecodedAttribute::Packet(PacketDecode {
                byte_count: 2,
                preview: "Hex: 0A FF".to_string(),
                mode: TransferMode::Notifications,
            })
        );

        match decode(AttributeTag::IndicationData, &[]).unwrap() {
            DecodedAttribute::Packet(packet) => {
                assert_eq!(packet.byte_count, 0);
                assert_eq!(packet.mode, TransferMode::Indications);
            }
            other => panic!("Expected packet, got {:?}", other),
        }
    }

    #[test]
    fn truncated_payloads_are_malformed() {
        for tag in AttributeTag::ALL {
            let required = tag.min_payload_len();
            if required == 0 {
                continue;
            }
            let short = vec![0u8; required - 1];
            let err = decode(tag, &short).unwrap_err();
            assert!(
                matches!(err, ThroughputError::MalformedPayload { tag: t, expected, actual }
                    if t == tag && expected == required && actual == required - 1),
                "unexpected error for {}: {:?}",
                tag,
                err
            );
        }
    }

    proptest! {
        #[test]
        fn decode_never_panics(tag_index in 0usize..9, payload in prop::collection::vec(any::<u8>(), 0..40)) {
            let tag = AttributeTag::ALL[tag_index];
            let result = decode(tag, &payload);
            prop_assert_eq!(result.is_ok(), payload.len() >= tag.min_payload_len());
        }

        #[test]
        fn interval_matches_raw_times_unit(raw in any::<u16>()) {
            let decoded = decode(AttributeTag::ConnectionInterval, &raw.to_le_bytes()).unwrap();
            prop_assert_eq!(decoded, DecodedAttribute::ConnectionInterval(raw as f64 * 1.25));
        }
    }
}
