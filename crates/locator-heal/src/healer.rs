//! Heal orchestration
//!
//! resolve baseline element -> find candidates -> score -> synthesize -> rank

use std::any::Any;
use std::cmp::Ordering;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use dom_snapshot::{DomNode, DomTree, Snapshot};
use tracing::{debug, warn};

use crate::errors::HealError;
use crate::events::{HealEvent, HealObserver, TracingObserver};
use crate::finder::find_candidates;
use crate::metrics;
use crate::policy::HealOptions;
use crate::scorer::score_similarity;
use crate::synthesizer::synthesize;
use crate::types::{Candidate, HealingResult};

/// Self-healer trait
pub trait SelfHealer: Send + Sync {
    /// Propose replacement locators for `original_locator`.
    ///
    /// Never fails: anything that goes wrong yields an empty vector.
    fn heal(
        &self,
        original_locator: &str,
        baseline: &Snapshot,
        current: &Snapshot,
    ) -> Vec<HealingResult>;
}

/// Extract the id from a plain `#id` locator.
///
/// Compound selectors (`#a .b`, `#a.b`, `#a[x]`, ...) are not `#id` locators.
pub fn parse_id_locator(locator: &str) -> Option<&str> {
    let id = locator.trim().strip_prefix('#')?;
    let compound = id.chars().any(|c| {
        c.is_whitespace()
            || matches!(
                c,
                '#' | '.' | '[' | ']' | ':' | '>' | '+' | '~' | ',' | '(' | ')'
            )
    });
    if id.is_empty() || compound {
        None
    } else {
        Some(id)
    }
}

/// Default single-pass healer.
pub struct HealingOrchestrator {
    options: HealOptions,
    observer: Arc<dyn HealObserver>,
}

impl Default for HealingOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl HealingOrchestrator {
    pub fn new() -> Self {
        Self::with_options(HealOptions::default())
    }

    pub fn with_options(options: HealOptions) -> Self {
        Self {
            options,
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn HealObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn options(&self) -> &HealOptions {
        &self.options
    }

    /// Like [`SelfHealer::heal`] but reports faults instead of hiding them.
    pub fn try_heal(
        &self,
        original_locator: &str,
        baseline: &Snapshot,
        current: &Snapshot,
    ) -> Result<Vec<HealingResult>, HealError> {
        let started = Instant::now();
        self.observer.on_event(&HealEvent::Started {
            locator: original_locator.to_string(),
        });

        let outcome = if self.options.catch_panics {
            panic::catch_unwind(AssertUnwindSafe(|| {
                self.run(original_locator, baseline, current)
            }))
            .unwrap_or_else(|payload| Err(HealError::Panicked(panic_message(payload))))
        } else {
            self.run(original_locator, baseline, current)
        };

        let elapsed = started.elapsed();
        match &outcome {
            Ok(results) => {
                metrics::record_heal(results.len(), elapsed);
                self.observer.on_event(&HealEvent::Completed {
                    results: results.len(),
                    duration: elapsed,
                });
            }
            Err(_) => metrics::record_fault(elapsed),
        }
        outcome
    }

    /// Score every candidate for `reference` in `current`, threshold not applied.
    pub fn score_candidates(&self, reference: &DomNode, current: &DomTree) -> Vec<Candidate> {
        find_candidates(reference, current)
            .into_iter()
            .map(|node| {
                let report = score_similarity(reference, current.node(node));
                Candidate {
                    node,
                    score: report.score,
                    matched: report.matched,
                }
            })
            .collect()
    }

    /// Heal against trees that are already flattened.
    pub fn heal_trees(
        &self,
        original_locator: &str,
        baseline: &DomTree,
        current: &DomTree,
    ) -> Result<Vec<HealingResult>, HealError> {
        self.options.validate()?;

        let Some(id) = parse_id_locator(original_locator) else {
            self.observer.on_event(&HealEvent::UnsupportedLocator {
                locator: original_locator.to_string(),
            });
            return Ok(Vec::new());
        };

        let Some(reference_id) = baseline.find_by_id(id) else {
            self.observer.on_event(&HealEvent::BaselineNotFound {
                locator: original_locator.to_string(),
            });
            return Ok(Vec::new());
        };
        let reference = baseline.node(reference_id);

        let candidates = self.score_candidates(reference, current);
        if candidates.is_empty() {
            self.observer.on_event(&HealEvent::NoCandidates {
                tag: reference.tag_name.clone(),
            });
            return Ok(Vec::new());
        }

        let found = candidates.len();
        let kept: Vec<Candidate> = candidates
            .into_iter()
            .filter(|c| c.score >= self.options.min_candidate_score)
            .collect();
        metrics::record_candidates(found, kept.len());
        self.observer.on_event(&HealEvent::CandidatesScored {
            found,
            kept: kept.len(),
        });

        let mut results: Vec<HealingResult> = kept
            .iter()
            .flat_map(|candidate| {
                debug!(
                    node = %candidate.node,
                    score = candidate.score,
                    matched = ?candidate.matched,
                    "synthesizing locators for candidate"
                );
                synthesize(current, candidate.node)
                    .into_iter()
                    .map(move |selector| HealingResult::local(&selector, candidate.score))
            })
            .collect();

        rank(&mut results);
        if let Some(max) = self.options.max_results {
            results.truncate(max);
        }
        Ok(results)
    }

    fn run(
        &self,
        original_locator: &str,
        baseline: &Snapshot,
        current: &Snapshot,
    ) -> Result<Vec<HealingResult>, HealError> {
        let baseline_tree = baseline.tree()?;
        let current_tree = current.tree()?;
        self.heal_trees(original_locator, &baseline_tree, &current_tree)
    }
}

impl SelfHealer for HealingOrchestrator {
    fn heal(
        &self,
        original_locator: &str,
        baseline: &Snapshot,
        current: &Snapshot,
    ) -> Vec<HealingResult> {
        match self.try_heal(original_locator, baseline, current) {
            Ok(results) => results,
            Err(err) => {
                warn!(
                    locator = original_locator,
                    error = %err,
                    "self-heal faulted; returning no results"
                );
                self.observer.on_event(&HealEvent::Faulted {
                    reason: err.to_string(),
                });
                Vec::new()
            }
        }
    }
}

/// Descending score; ties go to the preferred strategy, then emission order.
fn rank(results: &mut [HealingResult]) {
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.strategy.priority().cmp(&b.strategy.priority()))
    });
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
