//! Core types for throughput telemetry.
//!
//! - [`AttributeTag`] and [`RawAttributeUpdate`] describe what arrives from the peer
//! - [`PhyStatus`], [`Direction`] and [`TransferMode`] are the decoded enumerations
//! - [`TelemetrySnapshot`], [`TelemetryField`] and [`TelemetryUpdate`] describe what is published
//! - [`UpdateRate`] controls how fast subscribers observe changes
//!
//! ```rust
//! use throughput::types::{AttributeTag, RawAttributeUpdate};
//!
//! let tag: AttributeTag = "mtu_size".parse().unwrap();
//! let update = RawAttributeUpdate::new(tag, [247u8]);
//! assert_eq!(update.tag.min_payload_len(), 1);
//! ```

mod attribute;
mod phy;
mod telemetry;
mod update_rate;

pub use attribute::{AttributeTag, Direction, RawAttributeUpdate, TransferMode};
pub use phy::{PhyStatus, codes as phy_codes};
pub use telemetry::{TelemetryField, TelemetrySnapshot, TelemetryUpdate};
pub use update_rate::UpdateRate;
