//! # Frame Scheduling
//!
//! The redraw loop never sleeps on its own; it asks a [`FrameScheduler`] for the next frame and
//! cancels that request when it no longer needs it.
//!
//! - [`ManualScheduler`]: frames fire only when the driver says so. Used by tests and by
//!   deterministic offline drivers.
//! - [`TickScheduler`]: a `crossbeam-channel` ticker at a fixed refresh rate for the live loop.

use crossbeam_channel::{tick, Receiver};
use std::time::{Duration, Instant};
use tracing::trace;

/// Handle for one requested frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FrameRequest(u64);

impl FrameRequest {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Source of frame callbacks.
pub trait FrameScheduler {
    /// Requests one future frame.
    fn request_frame(&mut self) -> FrameRequest;
    /// Cancels a pending request. Unknown or already fired requests are ignored.
    fn cancel_frame(&mut self, request: FrameRequest);
    /// Number of requests that have neither fired nor been cancelled.
    fn pending(&self) -> usize;
}

/// Hand-driven scheduler. Keeps counters so tests can check the loop never leaks requests.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    pending: Vec<FrameRequest>,
    requested: u64,
    cancelled: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires every pending request, oldest first.
    pub fn take_due(&mut self) -> Vec<FrameRequest> {
        std::mem::take(&mut self.pending)
    }

    pub fn total_requested(&self) -> u64 {
        self.requested
    }

    pub fn total_cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        self.next_id += 1;
        let request = FrameRequest(self.next_id);
        self.pending.push(request);
        self.requested += 1;
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        let before = self.pending.len();
        self.pending.retain(|r| *r != request);
        if self.pending.len() != before {
            self.cancelled += 1;
        }
    }

    fn pending(&self) -> usize {
        self.pending.len()
    }
}

/// Fixed-rate scheduler backed by a `crossbeam_channel::tick` receiver.
pub struct TickScheduler {
    ticker: Receiver<Instant>,
    origin: Instant,
    next_id: u64,
    pending: Vec<FrameRequest>,
}

impl TickScheduler {
    pub fn new(refresh_hz: u32) -> Self {
        let interval = Duration::from_secs_f64(1.0 / refresh_hz.max(1) as f64);
        Self {
            ticker: tick(interval),
            origin: Instant::now(),
            next_id: 0,
            pending: Vec::new(),
        }
    }

    /// Blocks until the next tick and returns the requests due on it with the tick timestamp
    /// in seconds since the scheduler was created.
    ///
    /// Returns `None` when nothing is pending (the loop has stopped).
    pub fn wait_for_frame(&mut self) -> Option<(Vec<FrameRequest>, f64)> {
        if self.pending.is_empty() {
            return None;
        }
        let at = self.ticker.recv().ok()?;
        let due = std::mem::take(&mut self.pending);
        let now = at.saturating_duration_since(self.origin).as_secs_f64();
        trace!(count = due.len(), now, "tick");
        Some((due, now))
    }
}

impl FrameScheduler for TickScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        self.next_id += 1;
        let request = FrameRequest(self.next_id);
        self.pending.push(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.pending.retain(|r| *r != request);
    }

    fn pending(&self) -> usize {
        self.pending.len()
    }
}
