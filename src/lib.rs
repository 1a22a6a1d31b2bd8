//! Telemetry aggregator for BLE link throughput tests.
//!
//! Throughput consumes the attribute updates a throughput test peripheral
//! pushes (PHY, connection parameters, MTU/PDU sizes, test traffic), decodes
//! them into typed link readings, samples a rolling bit-rate counter every
//! 200 ms and tracks which test direction is active.
//!
//! # Features
//!
//! - **Decoding**: fixed-format payloads to typed values, truncated input is an error, never a panic
//! - **Sampling**: race-free start/stop of a periodic rate sampler shared by producer and timer
//! - **Publishing**: latest-value watch channels per field, optionally throttled streams
//! - **Feed driving**: pump any [`AttributeFeed`] into a monitor with backoff and cancellation
//!
//! The transport itself is out of scope: updates arrive as [`RawAttributeUpdate`]
//! values and leave as published telemetry fields.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use throughput::{AttributeTag, ChannelFeed, FeedDriver, RawAttributeUpdate, ThroughputMonitor};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> throughput::Result<()> {
//!     let monitor = Arc::new(ThroughputMonitor::new()?);
//!     let (tx, feed) = ChannelFeed::channel(64);
//!     let driver = FeedDriver::spawn(feed, Arc::clone(&monitor));
//!
//!     tx.send(Ok(RawAttributeUpdate::new(AttributeTag::MtuSize, [247u8]))).await.ok();
//!     drop(tx);
//!     driver.join().await;
//!
//!     assert_eq!(monitor.snapshot().mtu_size, Some(247));
//!     Ok(())
//! }
//! ```

mod error;

pub mod config;
pub mod controller;
pub mod decode;
pub mod driver;
pub mod feed;
pub mod monitor;
pub mod publisher;
pub mod sampler;
pub mod stream;
pub mod types;

// Core exports
pub use error::*;
pub use types::*;

pub use config::MonitorConfig;
pub use controller::TestStateController;
pub use decode::{DecodedAttribute, PacketDecode, decode};
pub use driver::{FeedDriver, FeedEnd, FeedHandle, FeedSummary};
pub use feed::{AttributeFeed, ChannelFeed, FeedSender};
pub use monitor::{ThroughputMonitor, UpdateOutcome};
pub use publisher::{TelemetryChannel, TelemetryPublisher};
pub use sampler::{DEFAULT_SAMPLE_PERIOD_MS, MAX_SAMPLE_PERIOD_MS, RateSampler};
