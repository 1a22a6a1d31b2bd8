//! PHY status reported by the peer

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw PHY codes as reported by the throughput service.
pub mod codes {
    pub const PHY_1M: u8 = 0x01;
    pub const PHY_2M: u8 = 0x02;
    pub const PHY_CODED_125K: u8 = 0x04;
    pub const PHY_CODED_500K: u8 = 0x08;
}

/// Physical-layer mode of the radio link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum PhyStatus {
    Phy1M,
    Phy2M,
    /// Coded PHY, S=2 (500 kbit/s)
    CodedS2,
    /// Coded PHY, S=8 (125 kbit/s)
    CodedS8,
    /// Code with no known mapping, kept for diagnostics
    Unknown(u8),
}

impl PhyStatus {
    /// Map a raw status byte. Never fails.
    pub const fn from_code(code: u8) -> Self {
        match code {
            codes::PHY_1M => PhyStatus::Phy1M,
            codes::PHY_2M => PhyStatus::Phy2M,
            codes::PHY_CODED_125K => PhyStatus::CodedS8,
            codes::PHY_CODED_500K => PhyStatus::CodedS2,
            other => PhyStatus::Unknown(other),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, PhyStatus::Unknown(_))
    }
}

impl fmt::Display for PhyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhyStatus::Phy1M => f.write_str("1M"),
            PhyStatus::Phy2M => f.write_str("2M"),
            PhyStatus::CodedS2 => f.write_str("Coded S=2"),
            PhyStatus::CodedS8 => f.write_str("Coded S=8"),
            PhyStatus::Unknown(code) => write!(f, "Unknown ({:#04x})", code),
        }
    }
}
