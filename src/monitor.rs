//! Attribute ingress: decoder, sampler, test state and publisher wired together

use std::sync::Arc;

use futures::stream::BoxStream;
use tokio::runtime::Handle;
use tracing::{debug, trace};

use crate::config::MonitorConfig;
use crate::controller::TestStateController;
use crate::decode::{DecodedAttribute, decode};
use crate::publisher::TelemetryPublisher;
use crate::sampler::RateSampler;
use crate::types::{
    AttributeTag, Direction, RawAttributeUpdate, TelemetryField, TelemetrySnapshot,
    TelemetryUpdate, UpdateRate,
};
use crate::{Result, ThroughputError};

/// What an accepted attribute update did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// A link parameter field was replaced
    Published(TelemetryField),
    /// A test packet was counted toward throughput
    Counted { bytes: usize },
    /// The peer switched the download test on or off
    Toggled { active: bool },
    /// The attribute is not part of the throughput service
    Ignored,
}

/// Telemetry aggregator for one throughput test link.
///
/// Feed it every attribute update the transport delivers; observe results
/// through [`ThroughputMonitor::publisher`].
pub struct ThroughputMonitor {
    publisher: Arc<TelemetryPublisher>,
    controller: TestStateController,
    config: MonitorConfig,
}

impl ThroughputMonitor {
    /// Monitor with default configuration on the current tokio runtime.
    pub fn new() -> Result<Self> {
        Self::with_config(MonitorConfig::default())
    }

    /// Monitor with `config` on the current tokio runtime.
    pub fn with_config(config: MonitorConfig) -> Result<Self> {
        let runtime = Handle::try_current()
            .map_err(|e| ThroughputError::runtime_unavailable(e.to_string()))?;
        Self::with_runtime(config, runtime)
    }

    /// Monitor whose sampler ticks on `runtime`.
    pub fn with_runtime(config: MonitorConfig, runtime: Handle) -> Result<Self> {
        config.validate()?;
        let period = config.sample_period()?;

        let publisher = Arc::new(TelemetryPublisher::new());
        let sampler = Arc::new(RateSampler::with_runtime(Arc::clone(&publisher), period, runtime));
        let controller = TestStateController::new(sampler, Arc::clone(&publisher));

        debug!("Throughput monitor created ({}ms sample period)", period);
        Ok(Self { publisher, controller, config })
    }

    /// Decode and apply one attribute update.
    ///
    /// A payload too short for its tag returns
    /// [`ThroughputError::MalformedPayload`] and changes nothing.
    pub fn handle_update(&self, update: &RawAttributeUpdate) -> Result<UpdateOutcome> {
        trace!("Attribute update {} ({} bytes)", update.tag, update.payload.len());

        let outcome = match decode(update.tag, &update.payload)? {
            DecodedAttribute::PhyStatus(v) => self.publish(TelemetryUpdate::PhyStatus(v)),
            DecodedAttribute::MtuSize(v) => self.publish(TelemetryUpdate::MtuSize(v)),
            DecodedAttribute::PduSize(v) => self.publish(TelemetryUpdate::PduSize(v)),
            DecodedAttribute::ConnectionInterval(v) => {
                self.publish(TelemetryUpdate::ConnectionInterval(v))
            }
            DecodedAttribute::SlaveLatency(v) => self.publish(TelemetryUpdate::SlaveLatency(v)),
            DecodedAttribute::SupervisionTimeout(v) => {
                self.publish(TelemetryUpdate::SupervisionTimeout(v))
            }
            DecodedAttribute::TransmissionToggle(active) => {
                self.controller.toggle(Direction::Download, active);
                UpdateOutcome::Toggled { active }
            }
            DecodedAttribute::Packet(packet) => {
                self.publisher.set(TelemetryUpdate::TransferMode(packet.mode));
                self.controller.sampler().add_bits(packet.byte_count);
                self.publisher.set(TelemetryUpdate::LastPacketPreview(packet.preview));
                UpdateOutcome::Counted { bytes: packet.byte_count }
            }
        };

        Ok(outcome)
    }

    /// Apply an update identified by attribute name; unknown names are ignored.
    pub fn handle_named(&self, name: &str, payload: &[u8]) -> Result<UpdateOutcome> {
        match name.parse::<AttributeTag>() {
            Ok(tag) => self.handle_update(&RawAttributeUpdate::new(tag, payload)),
            Err(ThroughputError::UnknownTag { .. }) => {
                trace!("Ignoring attribute '{}'", name);
                Ok(UpdateOutcome::Ignored)
            }
            Err(e) => Err(e),
        }
    }

    /// Start or stop a user-initiated upload test.
    pub fn toggle_upload(&self, turn_on: bool) {
        self.controller.toggle(Direction::Upload, turn_on);
    }

    pub fn toggle(&self, direction: Direction, turn_on: bool) {
        self.controller.toggle(direction, turn_on);
    }

    /// Count bytes written by the upload test.
    pub fn record_sent(&self, byte_count: usize) {
        self.controller.sampler().add_bits(byte_count);
    }

    pub fn is_active(&self, direction: Direction) -> bool {
        self.controller.is_active(direction)
    }

    /// Stop any running test sampling.
    pub fn stop_sampling(&self) {
        self.controller.sampler().stop();
    }

    pub fn publisher(&self) -> &Arc<TelemetryPublisher> {
        &self.publisher
    }

    pub fn sampler(&self) -> &Arc<RateSampler> {
        self.controller.sampler()
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        self.publisher.snapshot()
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Packet previews at the configured preview rate.
    pub fn packet_previews(&self) -> BoxStream<'static, String> {
        self.publisher.last_packet_preview().stream(self.config.preview_rate)
    }

    /// Sampled throughput in bits per second, latest value on each poll.
    pub fn throughput_updates(&self) -> BoxStream<'static, u64> {
        self.publisher.throughput().stream(UpdateRate::Native)
    }

    fn publish(&self, update: TelemetryUpdate) -> UpdateOutcome {
        let field = update.field();
        self.publisher.set(update);
        UpdateOutcome::Published(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PhyStatus, TransferMode};
    use std::time::Duration;

    fn monitor() -> ThroughputMonitor {
        ThroughputMonitor::new().expect("runtime available")
    }

    #[tokio::test(start_paused = true)]
    async fn link_parameters_are_published() {
        let monitor = monitor();
        let updates = [
            (AttributeTag::PhyStatus, vec![0x02]),
            (AttributeTag::MtuSize, vec![247]),
            (AttributeTag::PduSize, vec![251]),
            (AttributeTag::ConnectionInterval, 80u16.to_le_bytes().to_vec()),
            (AttributeTag::SlaveLatency, vec![0x00, 0x00]),
            (AttributeTag::SupervisionTimeout, 500u16.to_le_bytes().to_vec()),
        ];
        for (tag, payload) in updates {
            let outcome = monitor.handle_update(&RawAttributeUpdate::new(tag, payload)).unwrap();
            assert!(matches!(outcome, UpdateOutcome::Published(_)));
        }

        let snapshot = monitor.snapshot();
        assert_eq!(snapshot.phy_status, Some(PhyStatus::Phy2M));
        assert_eq!(snapshot.mtu_size, Some(247));
        assert_eq!(snapshot.pdu_size, Some(251));
        assert_eq!(snapshot.connection_interval_ms, Some(100.0));
        assert_eq!(snapshot.slave_latency_ms, Some(0.0));
        assert_eq!(snapshot.supervision_timeout_ms, Some(5000));
        assert_eq!(snapshot.throughput_bits_per_second, None);
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_update_mutates_nothing() {
        let monitor = monitor();
        let before = monitor.snapshot();

        for tag in AttributeTag::ALL.into_iter().filter(|t| t.min_payload_len() > 0) {
            let err = monitor.handle_update(&RawAttributeUpdate::new(tag, vec![])).unwrap_err();
            assert!(matches!(err, ThroughputError::MalformedPayload { .. }));
        }

        assert_eq!(monitor.snapshot(), before);
        assert!(!monitor.sampler().is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_names_are_ignored() {
        let monitor = monitor();
        let outcome = monitor.handle_named("battery_level", &[100]).unwrap();
        assert_eq!(outcome, UpdateOutcome::Ignored);

        let outcome = monitor.handle_named("mtu_size", &[185]).unwrap();
        assert_eq!(outcome, UpdateOutcome::Published(TelemetryField::MtuSize));
    }

    #[tokio::test(start_paused = true)]
    async fn peer_driven_download_test() {
        let monitor = monitor();
        let on = RawAttributeUpdate::new(AttributeTag::TransmissionToggle, [1u8]);
        assert_eq!(monitor.handle_update(&on).unwrap(), UpdateOutcome::Toggled { active: true });
        assert!(monitor.is_active(Direction::Download));

        let packet = RawAttributeUpdate::new(AttributeTag::IndicationData, vec![0xAB; 100]);
        assert_eq!(monitor.handle_update(&packet).unwrap(), UpdateOutcome::Counted { bytes: 100 });
        assert_eq!(monitor.publisher().transfer_mode().get(), Some(TransferMode::Indications));

        tokio::time::sleep(Duration::from_millis(210)).await;
        assert_eq!(monitor.snapshot().throughput_bits_per_second, Some(4_000));

        let off = RawAttributeUpdate::new(AttributeTag::TransmissionToggle, [0u8]);
        assert_eq!(monitor.handle_update(&off).unwrap(), UpdateOutcome::Toggled { active: false });
        assert!(!monitor.is_active(Direction::Download));
        assert_eq!(monitor.snapshot().throughput_bits_per_second, Some(0));
        assert_eq!(monitor.snapshot().download_active, Some(false));
    }

    #[tokio::test(start_paused = true)]
    async fn upload_test_counts_sent_bytes() {
        let monitor = monitor();
        monitor.toggle_upload(true);
        monitor.record_sent(250);
        tokio::time::sleep(Duration::from_millis(210)).await;

        assert!(monitor.is_active(Direction::Upload));
        assert_eq!(monitor.snapshot().throughput_bits_per_second, Some(10_000));
        assert_eq!(monitor.snapshot().upload_active, Some(true));

        monitor.toggle_upload(false);
        assert_eq!(monitor.snapshot().throughput_bits_per_second, Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn notification_preview_is_published() {
        let monitor = monitor();
        let packet = RawAttributeUpdate::new(AttributeTag::NotificationData, [0x0A, 0xFF]);
        monitor.handle_update(&packet).unwrap();

        let snapshot = monitor.snapshot();
        assert_eq!(snapshot.last_packet_preview.as_deref(), Some("Hex: 0A FF"));
        assert_eq!(snapshot.transfer_mode, Some(TransferMode::Notifications));
        assert_eq!(monitor.sampler().pending_bits(), 16);
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_config_is_rejected() {
        let config = MonitorConfig { sample_period_ms: 0, ..Default::default() };
        let err = ThroughputMonitor::with_config(config).err().expect("zero period rejected");
        assert!(matches!(err, ThroughputError::Config { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn custom_period_changes_rate_scale() {
        let config = MonitorConfig { sample_period_ms: 1_000, ..Default::default() };
        let monitor = ThroughputMonitor::with_config(config).unwrap();
        monitor.toggle_upload(true);
        monitor.record_sent(10);
        tokio::time::sleep(Duration::from_millis(1_010)).await;
        assert_eq!(monitor.snapshot().throughput_bits_per_second, Some(80));
    }
}
