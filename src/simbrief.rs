use std::time::{Duration, Instant};

use crate::model::FlightPlan;

pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(20);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlanRequest {
    pub username: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PlanMessage {
    Plan(FlightPlan),
    Error(String),
}

/// Allows one trigger per rolling window, measured from the last accepted one.
#[derive(Clone, Debug)]
pub struct RefreshGate {
    window: Duration,
    last: Option<Instant>,
}

impl RefreshGate {
    /// A gate that accepts its first trigger immediately.
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// A gate whose window starts at `now`, so nothing fires right after load.
    pub fn cooling_from(window: Duration, now: Instant) -> Self {
        Self {
            window,
            last: Some(now),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last {
            Some(last) => self.window.saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }

    pub fn try_acquire(&mut self, now: Instant) -> bool {
        if !self.remaining(now).is_zero() {
            return false;
        }
        self.last = Some(now);
        true
    }
}
