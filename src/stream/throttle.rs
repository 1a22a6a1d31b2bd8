//! Latest-wins throttling for telemetry streams

use futures::Stream;
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior, interval};

/// Extension trait adding throttling to any Stream
pub trait ThrottleExt: Stream {
    /// Emit at most once per `period`, keeping only the newest item.
    ///
    /// The first item passes straight through. Items arriving while the
    /// period is running replace each other; the survivor is emitted when it
    /// elapses. An idle source keeps the throttled stream pending rather than
    /// ending it, and a final buffered item is flushed when the source ends.
    fn throttle(self, period: Duration) -> Throttle<Self>
    where
        Self: Sized,
    {
        Throttle::new(self, period)
    }
}

impl<T: Stream> ThrottleExt for T {}

pin_project! {
    /// Stream returned by [`ThrottleExt::throttle`]
    pub struct Throttle<S: Stream> {
        #[pin]
        source: S,
        gate: Interval,
        latest: Option<S::Item>,
        source_done: bool,
    }
}

impl<S: Stream> Throttle<S> {
    /// A zero `period` is raised to one nanosecond.
    pub fn new(source: S, period: Duration) -> Self {
        let mut gate = interval(period.max(Duration::from_nanos(1)));
        gate.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self { source, gate, latest: None, source_done: false }
    }

    pub fn period(&self) -> Duration {
        self.gate.period()
    }
}

impl<S: Stream> Stream for Throttle<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        while !*this.source_done {
            match this.source.as_mut().poll_next(cx) {
                Poll::Ready(Some(item)) => *this.latest = Some(item),
                Poll::Ready(None) => *this.source_done = true,
                Poll::Pending => break,
            }
        }

        if this.latest.is_none() {
            return if *this.source_done { Poll::Ready(None) } else { Poll::Pending };
        }

        if !*this.source_done && this.gate.poll_tick(cx).is_pending() {
            return Poll::Pending;
        }

        Poll::Ready(this.latest.take())
    }
}
