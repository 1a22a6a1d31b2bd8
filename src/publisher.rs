//! Latest-value telemetry publishing

use futures::stream::{BoxStream, StreamExt};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::trace;

use crate::stream::ThrottleExt;
use crate::types::{PhyStatus, TelemetrySnapshot, TelemetryUpdate, TransferMode, UpdateRate};

/// One published field.
///
/// Backed by a watch channel: writes never block, never fail without
/// subscribers, and the latest value is visible to anyone subscribing later.
/// `None` means no value has been published yet.
#[derive(Debug)]
pub struct TelemetryChannel<T> {
    tx: watch::Sender<Option<T>>,
}

impl<T> TelemetryChannel<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Replace the current value and notify subscribers.
    pub fn set(&self, value: T) {
        self.tx.send_replace(Some(value));
    }

    /// Current value, if any
    pub fn get(&self) -> Option<T> {
        self.tx.borrow().clone()
    }

    /// Raw watch receiver, marked as seen at the current value
    pub fn subscribe(&self) -> watch::Receiver<Option<T>> {
        self.tx.subscribe()
    }

    /// Stream of values, starting with the current one once something has been published.
    ///
    /// Values set between two polls coalesce: the stream yields the newest
    /// one only. The stream ends when the publisher is dropped.
    pub fn stream(&self, rate: UpdateRate) -> BoxStream<'static, T> {
        let values = WatchStream::new(self.tx.subscribe()).filter_map(|opt| async move { opt });

        match rate.throttle_interval() {
            None => values.boxed(),
            Some(period) => values.throttle(period).boxed(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Holds the latest value of every telemetry field and hands them out to observers.
#[derive(Debug)]
pub struct TelemetryPublisher {
    phy_status: TelemetryChannel<PhyStatus>,
    mtu_size: TelemetryChannel<u8>,
    pdu_size: TelemetryChannel<u8>,
    connection_interval_ms: TelemetryChannel<f64>,
    slave_latency_ms: TelemetryChannel<f64>,
    supervision_timeout_ms: TelemetryChannel<u64>,
    throughput: TelemetryChannel<u64>,
    last_packet_preview: TelemetryChannel<String>,
    transfer_mode: TelemetryChannel<TransferMode>,
    upload_active: TelemetryChannel<bool>,
    download_active: TelemetryChannel<bool>,
}

impl Default for TelemetryPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryPublisher {
    pub fn new() -> Self {
        Self {
            phy_status: TelemetryChannel::new(),
            mtu_size: TelemetryChannel::new(),
            pdu_size: TelemetryChannel::new(),
            connection_interval_ms: TelemetryChannel::new(),
            slave_latency_ms: TelemetryChannel::new(),
            supervision_timeout_ms: TelemetryChannel::new(),
            throughput: TelemetryChannel::new(),
            last_packet_preview: TelemetryChannel::new(),
            transfer_mode: TelemetryChannel::new(),
            upload_active: TelemetryChannel::new(),
            download_active: TelemetryChannel::new(),
        }
    }

    /// Apply a single field update.
    pub fn set(&self, update: TelemetryUpdate) {
        trace!("Publishing {:?}", update);
        match update {
            TelemetryUpdate::PhyStatus(v) => self.phy_status.set(v),
            TelemetryUpdate::MtuSize(v) => self.mtu_size.set(v),
            TelemetryUpdate::PduSize(v) => self.pdu_size.set(v),
            TelemetryUpdate::ConnectionInterval(v) => self.connection_interval_ms.set(v),
            TelemetryUpdate::SlaveLatency(v) => self.slave_latency_ms.set(v),
            TelemetryUpdate::SupervisionTimeout(v) => self.supervision_timeout_ms.set(v),
            TelemetryUpdate::Throughput(v) => self.throughput.set(v),
            TelemetryUpdate::LastPacketPreview(v) => self.last_packet_preview.set(v),
            TelemetryUpdate::TransferMode(v) => self.transfer_mode.set(v),
            TelemetryUpdate::UploadActive(v) => self.upload_active.set(v),
            TelemetryUpdate::DownloadActive(v) => self.download_active.set(v),
        }
    }

    /// Current value of every field.
    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            phy_status: self.phy_status.get(),
            mtu_size: self.mtu_size.get(),
            pdu_size: self.pdu_size.get(),
            connection_interval_ms: self.connection_interval_ms.get(),
            slave_latency_ms: self.slave_latency_ms.get(),
            supervision_timeout_ms: self.supervision_timeout_ms.get(),
            throughput_bits_per_second: self.throughput.get(),
            last_packet_preview: self.last_packet_preview.get(),
            transfer_mode: self.transfer_mode.get(),
            upload_active: self.upload_active.get(),
            download_active: self.download_active.get(),
        }
    }

    pub fn phy_status(&self) -> &TelemetryChannel<PhyStatus> {
        &self.phy_status
    }

    pub fn mtu_size(&self) -> &TelemetryChannel<u8> {
        &self.mtu_size
    }

    pub fn pdu_size(&self) -> &TelemetryChannel<u8> {
        &self.pdu_size
    }

    pub fn connection_interval_ms(&self) -> &TelemetryChannel<f64> {
        &self.connection_interval_ms
    }

    pub fn slave_latency_ms(&self) -> &TelemetryChannel<f64> {
        &self.slave_latency_ms
    }

    pub fn supervision_timeout_ms(&self) -> &TelemetryChannel<u64> {
        &self.supervision_timeout_ms
    }

    /// Sampled throughput in bits per second
    pub fn throughput(&self) -> &TelemetryChannel<u64> {
        &self.throughput
    }

    pub fn last_packet_preview(&self) -> &TelemetryChannel<String> {
        &self.last_packet_preview
    }

    pub fn transfer_mode(&self) -> &TelemetryChannel<TransferMode> {
        &self.transfer_mode
    }

    pub fn upload_active(&self) -> &TelemetryChannel<bool> {
        &self.upload_active
    }

    pub fn download_active(&self) -> &TelemetryChannel<bool> {
        &self.download_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn set_without_subscribers_is_kept() {
        let publisher = TelemetryPublisher::new();
        assert_eq!(publisher.mtu_size().subscriber_count(), 0);

        publisher.set(TelemetryUpdate::MtuSize(247));
        assert_eq!(publisher.mtu_size().get(), Some(247));
        assert_eq!(publisher.snapshot().mtu_size, Some(247));
    }

    #[test]
    fn last_write_wins_per_field() {
        let publisher = TelemetryPublisher::new();
        publisher.set(TelemetryUpdate::PhyStatus(PhyStatus::Phy1M));
        publisher.set(TelemetryUpdate::PhyStatus(PhyStatus::Phy2M));
        publisher.set(TelemetryUpdate::PduSize(27));

        let snapshot = publisher.snapshot();
        assert_eq!(snapshot.phy_status, Some(PhyStatus::Phy2M));
        assert_eq!(snapshot.pdu_size, Some(27));
        assert_eq!(snapshot.mtu_size, None);
        assert_eq!(snapshot.throughput_bits_per_second, None);
    }

    #[tokio::test]
    async fn late_subscriber_sees_latest_value() {
        let publisher = TelemetryPublisher::new();
        publisher.set(TelemetryUpdate::Throughput(8_000));
        publisher.set(TelemetryUpdate::Throughput(16_000));

        let mut stream = publisher.throughput().stream(UpdateRate::Native);
        assert_eq!(stream.next().await, Some(16_000));
    }

    #[tokio::test]
    async fn receiver_is_notified_on_change() {
        let publisher = TelemetryPublisher::new();
        let mut rx = publisher.download_active().subscribe();
        assert_eq!(*rx.borrow(), None);

        publisher.set(TelemetryUpdate::DownloadActive(true));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Some(true));
    }

    #[tokio::test]
    async fn stream_waits_for_first_value() {
        let publisher = TelemetryPublisher::new();
        let mut stream = publisher.last_packet_preview().stream(UpdateRate::Native);

        let pending = tokio::time::timeout(Duration::from_millis(20), stream.next()).await;
        assert!(pending.is_err(), "no value published yet");

        publisher.set(TelemetryUpdate::LastPacketPreview("Hex: 0A FF".into()));
        assert_eq!(stream.next().await.as_deref(), Some("Hex: 0A FF"));
    }

    #[tokio::test]
    async fn unthrottled_stream_coalesces_to_latest() {
        let publisher = TelemetryPublisher::new();
        let mut stream = publisher.mtu_size().stream(UpdateRate::Native);

        for mtu in [23, 185, 247] {
            publisher.set(TelemetryUpdate::MtuSize(mtu));
        }
        assert_eq!(stream.next().await, Some(247));

        let pending = tokio::time::timeout(Duration::from_millis(20), stream.next()).await;
        assert!(pending.is_err(), "intermediate values are not replayed");
    }

    #[tokio::test]
    async fn stream_ends_when_publisher_dropped() {
        let publisher = TelemetryPublisher::new();
        publisher.set(TelemetryUpdate::MtuSize(23));
        let mut stream = publisher.mtu_size().stream(UpdateRate::Native);
        assert_eq!(stream.next().await, Some(23));

        drop(publisher);
        assert_eq!(stream.next().await, None);
    }
}
