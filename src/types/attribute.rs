//! Attribute tags and raw updates delivered by the transport layer

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ThroughputError;

/// Characteristics of the throughput test service this crate understands.
///
/// The set is closed: anything else the peer exposes is ignored at ingress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum AttributeTag {
    PhyStatus,
    ConnectionInterval,
    SlaveLatency,
    SupervisionTimeout,
    MtuSize,
    PduSize,
    TransmissionToggle,
    IndicationData,
    NotificationData,
}

impl AttributeTag {
    /// Every tag, in service declaration order.
    pub const ALL: [AttributeTag; 9] = [
        AttributeTag::PhyStatus,
        AttributeTag::ConnectionInterval,
        AttributeTag::SlaveLatency,
        AttributeTag::SupervisionTimeout,
        AttributeTag::MtuSize,
        AttributeTag::PduSize,
        AttributeTag::TransmissionToggle,
        AttributeTag::IndicationData,
        AttributeTag::NotificationData,
    ];

    /// Minimum payload length in bytes for this tag.
    pub const fn min_payload_len(&self) -> usize {
        match self {
            AttributeTag::PhyStatus
            | AttributeTag::MtuSize
            | AttributeTag::PduSize
            | AttributeTag::TransmissionToggle => 1,
            AttributeTag::ConnectionInterval
            | AttributeTag::SlaveLatency
            | AttributeTag::SupervisionTimeout => 2,
            AttributeTag::IndicationData | AttributeTag::NotificationData => 0,
        }
    }

    /// Whether this tag carries counted test traffic rather than a link parameter.
    pub const fn is_test_data(&self) -> bool {
        matches!(self, AttributeTag::IndicationData | AttributeTag::NotificationData)
    }

    /// Snake-case wire name.
    pub const fn name(&self) -> &'static str {
        match self {
            AttributeTag::PhyStatus => "phy_status",
            AttributeTag::ConnectionInterval => "connection_interval",
            AttributeTag::SlaveLatency => "slave_latency",
            AttributeTag::SupervisionTimeout => "supervision_timeout",
            AttributeTag::MtuSize => "mtu_size",
            AttributeTag::PduSize => "pdu_size",
            AttributeTag::TransmissionToggle => "transmission_toggle",
            AttributeTag::IndicationData => "indication_data",
            AttributeTag::NotificationData => "notification_data",
        }
    }
}

impl fmt::Display for AttributeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AttributeTag {
    type Err = ThroughputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AttributeTag::ALL
            .into_iter()
            .find(|tag| tag.name() == s)
            .ok_or_else(|| ThroughputError::unknown_tag(s))
    }
}

/// One inbound attribute update, consumed synchronously by the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAttributeUpdate {
    pub tag: AttributeTag,
    pub payload: Vec<u8>,
}

impl RawAttributeUpdate {
    pub fn new(tag: AttributeTag, payload: impl Into<Vec<u8>>) -> Self {
        Self { tag, payload: payload.into() }
    }
}

/// Which side of the link a throughput test runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum Direction {
    /// Local device sends test traffic to the peer.
    Upload,
    /// Peer pushes test traffic to the local device.
    Download,
}

/// Delivery mode of the most recent download test packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum TransferMode {
    /// Unacknowledged pushes.
    Notifications,
    /// Acknowledged pushes.
    Indications,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for tag in AttributeTag::ALL {
            assert_eq!(tag.name().parse::<AttributeTag>().unwrap(), tag);
        }
    }

    #[test]
    fn unknown_name_is_unknown_tag() {
        let err = "battery_level".parse::<AttributeTag>().unwrap_err();
        assert!(matches!(err, ThroughputError::UnknownTag { ref name } if name == "battery_level"));
    }

    #[test]
    fn serde_names_match_wire_names() {
        let yaml = serde_yaml_ng::to_string(&AttributeTag::SupervisionTimeout).unwrap();
        assert_eq!(yaml.trim(), "supervision_timeout");
    }

    #[test]
    fn payload_requirements() {
        assert_eq!(AttributeTag::PhyStatus.min_payload_len(), 1);
        assert_eq!(AttributeTag::SlaveLatency.min_payload_len(), 2);
        assert_eq!(AttributeTag::NotificationData.min_payload_len(), 0);
        assert!(AttributeTag::IndicationData.is_test_data());
        assert!(!AttributeTag::TransmissionToggle.is_test_data());
    }
}
