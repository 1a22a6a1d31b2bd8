//! Upload/download test state

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::publisher::TelemetryPublisher;
use crate::sampler::RateSampler;
use crate::types::{Direction, TelemetryUpdate};

/// Tracks which test directions are active and drives the rate sampler.
///
/// Both directions share one sampler: turning either direction on starts it,
/// turning either direction off stops it and publishes a zero rate. The
/// direction only decides which active flag is set and published.
///
/// Toggles are serialized, so the stored flag, the published flag and the
/// sampler state always come from the same call.
pub struct TestStateController {
    toggle_lock: Mutex<()>,
    upload: AtomicBool,
    download: AtomicBool,
    sampler: Arc<RateSampler>,
    publisher: Arc<TelemetryPublisher>,
}

impl TestStateController {
    /// Both directions start inactive.
    pub fn new(sampler: Arc<RateSampler>, publisher: Arc<TelemetryPublisher>) -> Self {
        Self {
            toggle_lock: Mutex::new(()),
            upload: AtomicBool::new(false),
            download: AtomicBool::new(false),
            sampler,
            publisher,
        }
    }

    /// Activate or deactivate a test direction.
    pub fn toggle(&self, direction: Direction, turn_on: bool) {
        let _guard = self.toggle_lock.lock().unwrap_or_else(PoisonError::into_inner);
        debug!("Toggle test state: active={}, direction={:?}", turn_on, direction);

        self.flag(direction).store(turn_on, Ordering::Release);
        self.publisher.set(match direction {
            Direction::Upload => TelemetryUpdate::UploadActive(turn_on),
            Direction::Download => TelemetryUpdate::DownloadActive(turn_on),
        });

        if turn_on {
            self.sampler.start();
        } else {
            self.sampler.stop();
        }
    }

    pub fn is_active(&self, direction: Direction) -> bool {
        self.flag(direction).load(Ordering::Acquire)
    }

    pub fn any_active(&self) -> bool {
        self.is_active(Direction::Upload) || self.is_active(Direction::Download)
    }

    pub fn sampler(&self) -> &Arc<RateSampler> {
        &self.sampler
    }

    fn flag(&self, direction: Direction) -> &AtomicBool {
        match direction {
            Direction::Upload => &self.upload,
            Direction::Download => &self.download,
        }
    }
}
