//! Trace events raised while healing
//!
//! The pipeline never prints; it reports through an injected `HealObserver`.

use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HealEvent {
    Started {
        locator: String,
    },
    /// Locator syntax the resolver does not understand
    UnsupportedLocator {
        locator: String,
    },
    BaselineNotFound {
        locator: String,
    },
    NoCandidates {
        tag: String,
    },
    CandidatesScored {
        found: usize,
        kept: usize,
    },
    Completed {
        results: usize,
        #[serde(serialize_with = "serialize_millis")]
        duration: Duration,
    },
    Faulted {
        reason: String,
    },
}

fn serialize_millis<S: serde::Serializer>(duration: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(duration.as_micros() as f64 / 1000.0)
}

pub trait HealObserver: Send + Sync {
    fn on_event(&self, event: &HealEvent);
}

/// Forwards events to `tracing` under the `locator.heal` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl HealObserver for TracingObserver {
    fn on_event(&self, event: &HealEvent) {
        match event {
            HealEvent::Started { locator } => {
                debug!(target: "locator.heal", %locator, "heal.started");
            }
            HealEvent::UnsupportedLocator { locator } => {
                debug!(target: "locator.heal", %locator, "heal.unsupported_locator");
            }
            HealEvent::BaselineNotFound { locator } => {
                debug!(target: "locator.heal", %locator, "heal.baseline_not_found");
            }
            HealEvent::NoCandidates { tag } => {
                debug!(target: "locator.heal", %tag, "heal.no_candidates");
            }
            HealEvent::CandidatesScored { found, kept } => {
                debug!(target: "locator.heal", found, kept, "heal.candidates_scored");
            }
            HealEvent::Completed { results, duration } => {
                debug!(
                    target: "locator.heal",
                    results,
                    elapsed_ms = duration.as_micros() as f64 / 1000.0,
                    "heal.completed"
                );
            }
            HealEvent::Faulted { reason } => {
                warn!(target: "locator.heal", %reason, "heal.faulted");
            }
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<HealEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<HealEvent> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl HealObserver for RecordingObserver {
    fn on_event(&self, event: &HealEvent) {
        self.events.lock().push(event.clone());
    }
}
