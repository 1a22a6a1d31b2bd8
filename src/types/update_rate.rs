//! Delivery rate control for telemetry subscriptions

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How often a subscriber observes a field that may change faster than it can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum UpdateRate {
    /// Unthrottled. A subscriber sees the latest value each time it polls;
    /// changes published between two polls coalesce into the newest one.
    #[default]
    Native,

    /// At most this many emissions per second, latest value wins.
    /// `Max(0)` is treated as `Native`; rates above [`UpdateRate::MAX_HZ`]
    /// are capped to it.
    Max(u32),
}

impl UpdateRate {
    /// Highest throttled rate, one emission per millisecond.
    pub const MAX_HZ: u32 = 1_000;

    /// Minimum spacing between emissions, if throttled. Never zero.
    pub fn throttle_interval(self) -> Option<Duration> {
        match self {
            UpdateRate::Native | UpdateRate::Max(0) => None,
            UpdateRate::Max(hz) => {
                let hz = hz.min(Self::MAX_HZ);
                Some(Duration::from_micros(1_000_000 / u64::from(hz)))
            }
        }
    }

    pub fn is_throttled(self) -> bool {
        self.throttle_interval().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_is_unthrottled() {
        assert_eq!(UpdateRate::Native.throttle_interval(), None);
        assert!(!UpdateRate::Max(0).is_throttled());
    }

    #[test]
    fn max_rate_maps_to_interval() {
        assert_eq!(UpdateRate::Max(5).throttle_interval(), Some(Duration::from_millis(200)));
        assert!(UpdateRate::Max(10).is_throttled());
        assert_eq!(UpdateRate::Max(3).throttle_interval(), Some(Duration::from_micros(333_333)));
    }

    #[test]
    fn huge_rate_is_capped() {
        let floor = Some(Duration::from_millis(1));
        assert_eq!(UpdateRate::Max(UpdateRate::MAX_HZ).throttle_interval(), floor);
        assert_eq!(UpdateRate::Max(UpdateRate::MAX_HZ + 1).throttle_interval(), floor);
        assert_eq!(UpdateRate::Max(u32::MAX).throttle_interval(), floor);
    }
}
