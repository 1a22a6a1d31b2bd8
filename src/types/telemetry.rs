//! Published telemetry fields

use serde::{Deserialize, Serialize};

use super::{PhyStatus, TransferMode};

/// Latest known value of every published field.
///
/// Fields are replaced independently; `None` means nothing has been received yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct TelemetrySnapshot {
    pub phy_status: Option<PhyStatus>,
    pub mtu_size: Option<u8>,
    pub pdu_size: Option<u8>,
    pub connection_interval_ms: Option<f64>,
    pub slave_latency_ms: Option<f64>,
    pub supervision_timeout_ms: Option<u64>,
    pub throughput_bits_per_second: Option<u64>,
    pub last_packet_preview: Option<String>,
    pub transfer_mode: Option<TransferMode>,
    pub upload_active: Option<bool>,
    pub download_active: Option<bool>,
}

/// Names of the published fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum TelemetryField {
    PhyStatus,
    MtuSize,
    PduSize,
    ConnectionInterval,
    SlaveLatency,
    SupervisionTimeout,
    Throughput,
    LastPacketPreview,
    TransferMode,
    UploadActive,
    DownloadActive,
}

/// A new value for exactly one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum TelemetryUpdate {
    PhyStatus(PhyStatus),
    MtuSize(u8),
    PduSize(u8),
    ConnectionInterval(f64),
    SlaveLatency(f64),
    SupervisionTimeout(u64),
    Throughput(u64),
    LastPacketPreview(String),
    TransferMode(TransferMode),
    UploadActive(bool),
    DownloadActive(bool),
}

impl TelemetryUpdate {
    /// The field this update targets.
    pub fn field(&self) -> TelemetryField {
        match self {
            TelemetryUpdate::PhyStatus(_) => TelemetryField::PhyStatus,
            TelemetryUpdate::MtuSize(_) => TelemetryField::MtuSize,
            TelemetryUpdate::PduSize(_) => TelemetryField::PduSize,
            TelemetryUpdate::ConnectionInterval(_) => TelemetryField::ConnectionInterval,
            TelemetryUpdate::SlaveLatency(_) => TelemetryField::SlaveLatency,
            TelemetryUpdate::SupervisionTimeout(_) => TelemetryField::SupervisionTimeout,
            TelemetryUpdate::Throughput(_) => TelemetryField::Throughput,
            TelemetryUpdate::LastPacketPreview(_) => TelemetryField::LastPacketPreview,
            TelemetryUpdate::TransferMode(_) => TelemetryField::TransferMode,
            TelemetryUpdate::UploadActive(_) => TelemetryField::UploadActive,
            TelemetryUpdate::DownloadActive(_) => TelemetryField::DownloadActive,
        }
    }
}
