//! Periodic bit-rate sampling
//!
//! The sampler is shared by two execution contexts: producers calling
//! [`RateSampler::add_bits`] from wherever updates arrive, and the tick task
//! running on the tokio timer. The counter is an atomic that the tick swaps
//! to zero in one operation. Start, stop and the publishing half of a tick
//! all run under the same state lock, and a tick only publishes while its own
//! cancellation token is live, so once `stop()` returns no stale rate can
//! overwrite the zero it published.

use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::publisher::TelemetryPublisher;
use crate::types::TelemetryUpdate;
use crate::{Result, ThroughputError};

/// Sampling period used unless configured otherwise, in milliseconds.
pub const DEFAULT_SAMPLE_PERIOD_MS: NonZeroU64 = match NonZeroU64::new(200) {
    Some(period) => period,
    None => unreachable!(),
};

/// Longest sampling period accepted, one hour in milliseconds.
pub const MAX_SAMPLE_PERIOD_MS: NonZeroU64 = match NonZeroU64::new(3_600_000) {
    Some(period) => period,
    None => unreachable!(),
};

/// Bits per second for `bits` accumulated over one `period_ms`.
pub fn rate_bits_per_second(bits: u64, period_ms: NonZeroU64) -> u64 {
    bits.saturating_mul(1000) / period_ms.get()
}

enum SamplerState {
    Stopped,
    Running { cancel: CancellationToken, task: JoinHandle<()> },
}

struct Shared {
    bits: AtomicU64,
    ticks: AtomicU64,
    state: Mutex<SamplerState>,
    publisher: Arc<TelemetryPublisher>,
    period_ms: NonZeroU64,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, SamplerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish one sample. Returns false if the owning run was cancelled.
    fn tick(&self, cancel: &CancellationToken) -> bool {
        let _state = self.lock_state();
        if cancel.is_cancelled() {
            return false;
        }

        let bits = self.bits.swap(0, Ordering::AcqRel);
        let rate = rate_bits_per_second(bits, self.period_ms);
        self.publisher.set(TelemetryUpdate::Throughput(rate));
        let tick = self.ticks.fetch_add(1, Ordering::Relaxed) + 1;

        trace!("Sample {}: {} bits -> {} bit/s", tick, bits, rate);
        true
    }
}

/// Rolling bit counter sampled on a fixed period.
pub struct RateSampler {
    shared: Arc<Shared>,
    runtime: Handle,
}

impl RateSampler {
    /// Create a sampler with the default 200 ms period on the current tokio runtime.
    ///
    /// Fails with [`ThroughputError::Runtime`] when called outside a runtime.
    pub fn new(publisher: Arc<TelemetryPublisher>) -> Result<Self> {
        Self::with_period(publisher, DEFAULT_SAMPLE_PERIOD_MS)
    }

    /// Create a sampler with a custom period on the current tokio runtime.
    pub fn with_period(publisher: Arc<TelemetryPublisher>, period_ms: NonZeroU64) -> Result<Self> {
        let runtime = Handle::try_current()
            .map_err(|e| ThroughputError::runtime_unavailable(e.to_string()))?;
        Ok(Self::with_runtime(publisher, period_ms, runtime))
    }

    /// Create a sampler whose tick task is spawned on `runtime`.
    ///
    /// Periods above [`MAX_SAMPLE_PERIOD_MS`] are clamped to it.
    pub fn with_runtime(
        publisher: Arc<TelemetryPublisher>,
        period_ms: NonZeroU64,
        runtime: Handle,
    ) -> Self {
        if period_ms > MAX_SAMPLE_PERIOD_MS {
            warn!("Sample period {}ms clamped to {}ms", period_ms, MAX_SAMPLE_PERIOD_MS);
        }
        let period_ms = period_ms.min(MAX_SAMPLE_PERIOD_MS);

        let shared = Arc::new(Shared {
            bits: AtomicU64::new(0),
            ticks: AtomicU64::new(0),
            state: Mutex::new(SamplerState::Stopped),
            publisher,
            period_ms,
        });

        Self { shared, runtime }
    }

    /// Count a received or sent packet of `byte_count` bytes.
    pub fn add_bits(&self, byte_count: usize) {
        let bits = (byte_count as u64).saturating_mul(8);
        self.shared.bits.fetch_add(bits, Ordering::AcqRel);
    }

    /// Begin periodic sampling. No effect if already running.
    pub fn start(&self) {
        let mut state = self.shared.lock_state();
        if let SamplerState::Running { .. } = *state {
            trace!("Rate sampler already running");
            return;
        }

        let cancel = CancellationToken::new();
        let task = self.runtime.spawn(tick_task(Arc::clone(&self.shared), cancel.clone()));
        *state = SamplerState::Running { cancel, task };

        debug!("Rate sampler started ({}ms period)", self.shared.period_ms);
    }

    /// Stop sampling, clear the counter and publish a rate of zero.
    ///
    /// Safe to call when already stopped; the counter is cleared and zero is
    /// published again.
    pub fn stop(&self) {
        let mut state = self.shared.lock_state();
        if let SamplerState::Running { cancel, task } =
            std::mem::replace(&mut *state, SamplerState::Stopped)
        {
            cancel.cancel();
            task.abort();
            debug!("Rate sampler stopped");
        }

        self.shared.bits.store(0, Ordering::Release);
        self.shared.publisher.set(TelemetryUpdate::Throughput(0));
    }

    pub fn is_running(&self) -> bool {
        matches!(*self.shared.lock_state(), SamplerState::Running { .. })
    }

    /// Bits accumulated since the last sample
    pub fn pending_bits(&self) -> u64 {
        self.shared.bits.load(Ordering::Acquire)
    }

    /// Number of samples published since construction
    pub fn ticks(&self) -> u64 {
        self.shared.ticks.load(Ordering::Relaxed)
    }

    pub fn period(&self) -> Duration {
        Duration::from_millis(self.shared.period_ms.get())
    }
}

impl Drop for RateSampler {
    fn drop(&mut self) {
        if let SamplerState::Running { cancel, task } = &*self.shared.lock_state() {
            debug!("Dropping running rate sampler");
            cancel.cancel();
            task.abort();
        }
    }
}

async fn tick_task(shared: Arc<Shared>, cancel: CancellationToken) {
    let period = Duration::from_millis(shared.period_ms.get());
    let start = Instant::now().checked_add(period).unwrap_or_else(Instant::now);
    let mut ticker = interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                if !shared.tick(&cancel) {
                    break;
                }
            }
        }
    }

    trace!("Rate sampler task exited");
}
