// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Temporal debouncing of per-frame fall decisions.
//!
//! A fall is confirmed only after a run of consecutive positive frames, or immediately by
//! an instant signal from an independent detector. Once confirmed, the event stands until
//! it is cancelled; further positive input does not produce another confirmation.

use serde::{Deserialize, Serialize};

/// Observable state of a [`Debouncer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebounceState {
    /// No confirmed event and no pending positive frames.
    Idle,
    /// This many consecutive positive frames seen, below the threshold.
    Accumulating(u32),
    /// An event is active.
    Confirmed,
}

/// What confirmed a fall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// Enough consecutive positive pose frames.
    PoseDebounced,
    /// A high-confidence object-classifier detection.
    ObjectInstant,
}

/// A transition into [`DebounceState::Confirmed`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Confirmation {
    /// Confidence of the confirming signal, in `[0, 1]`.
    pub confidence: f64,
    /// Which signal confirmed it.
    pub trigger: Trigger,
}

/// Consecutive-frame debouncer.
///
/// The counter saturates at the threshold and is reset by any negative frame.
#[derive(Debug, Clone)]
pub struct Debouncer {
    threshold: u32,
    counter: u32,
    confirmed: bool,
}

impl Debouncer {
    /// Create a debouncer confirming after `threshold` consecutive positive frames.
    ///
    /// A threshold of `0` is treated as `1`.
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            counter: 0,
            confirmed: false,
        }
    }

    /// Positive frames required for confirmation.
    pub const fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Current consecutive positive frame count.
    pub const fn counter(&self) -> u32 {
        self.counter
    }

    /// Current state.
    pub const fn state(&self) -> DebounceState {
        if self.confirmed {
            DebounceState::Confirmed
        } else if self.counter > 0 {
            DebounceState::Accumulating(self.counter)
        } else {
            DebounceState::Idle
        }
    }

    /// Whether an event is active.
    pub const fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    /// Feed one frame decision.
    ///
    /// Returns a confirmation only on the frame that completes the run.
    pub fn observe(&mut self, positive: bool, score: f64) -> Option<Confirmation> {
        if !positive {
            if self.counter > 0 {
                tracing::debug!(counter = self.counter, "negative frame, run reset");
            }
            self.counter = 0;
            return None;
        }

        self.counter = self.counter.saturating_add(1).min(self.threshold);
        if self.confirmed || self.counter < self.threshold {
            return None;
        }

        self.confirmed = true;
        let confidence = clamp_unit(score);
        tracing::debug!(frames = self.threshold, confidence, "fall confirmed by pose");
        Some(Confirmation {
            confidence,
            trigger: Trigger::PoseDebounced,
        })
    }

    /// Confirm immediately from an independent detector, bypassing the counter.
    ///
    /// No-op while an event is already active.
    pub fn instant(&mut self, confidence: f64) -> Option<Confirmation> {
        if self.confirmed {
            return None;
        }

        self.confirmed = true;
        let confidence = clamp_unit(confidence);
        tracing::debug!(counter = self.counter, confidence, "fall confirmed by instant signal");
        Some(Confirmation {
            confidence,
            trigger: Trigger::ObjectInstant,
        })
    }

    /// Clear any active event and the counter.
    pub fn reset(&mut self) {
        if self.confirmed || self.counter > 0 {
            tracing::debug!(state = ?self.state(), "debouncer reset");
        }
        self.counter = 0;
        self.confirmed = false;
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(5)
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
