//! One-shot frame timer
//!
//! The frame loop never sleeps. Each tick arms a single deadline and asks
//! egui to repaint when it is due.

use std::time::{Duration, Instant};

/// A cancellable one-shot timer. Arming it again replaces the pending
/// deadline.
pub trait Scheduler {
    fn schedule(&mut self, delay: Duration);
    fn cancel(&mut self);
    fn is_pending(&self) -> bool;
}

/// Deadline timer driven by egui repaint requests
pub struct FrameTimer {
    ctx: egui::Context,
    deadline: Option<Instant>,
}

impl FrameTimer {
    pub fn new(ctx: egui::Context) -> Self {
        Self { ctx, deadline: None }
    }

    /// Disarm and return true if the deadline has passed at `now`
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Time left until the deadline
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Ask egui to wake up for the pending deadline, if any
    pub fn request_wakeup(&self, now: Instant) {
        if let Some(remaining) = self.remaining(now) {
            self.ctx.request_repaint_after(remaining);
        }
    }
}

impl Scheduler for FrameTimer {
    fn schedule(&mut self, delay: Duration) {
        self.deadline = Some(Instant::now() + delay);
        self.ctx.request_repaint_after(delay);
    }

    fn cancel(&mut self) {
        self.deadline = None;
    }

    fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}
