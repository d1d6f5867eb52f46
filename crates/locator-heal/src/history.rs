//! Healing history
//!
//! Remembers which replacement locators were accepted or rejected for a
//! `(locator, url)` pair so a later failure of the same locator can be
//! answered without running the pipeline, and so rejected locators are not
//! proposed again.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::Utc;
use dom_snapshot::Snapshot;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::healer::SelfHealer;
use crate::types::HealingResult;

pub trait HealingHistory: Send + Sync {
    /// Accepted results for this pair, most recent first.
    fn lookup(&self, locator: &str, url: &str) -> Vec<HealingResult>;

    fn record_accepted(&self, locator: &str, url: &str, result: HealingResult);

    fn record_rejected(&self, locator: &str, url: &str, selector: &str);

    fn is_rejected(&self, locator: &str, url: &str, selector: &str) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryKey {
    pub locator: String,
    pub url: String,
}

impl HistoryKey {
    pub fn new(locator: &str, url: &str) -> Self {
        Self {
            locator: locator.to_string(),
            url: url.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptedHealing {
    pub result: HealingResult,
    /// Epoch milliseconds
    pub recorded_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub accepted: Vec<AcceptedHealing>,
    #[serde(default)]
    pub rejected: BTreeSet<String>,
    pub updated_at: i64,
}

/// Flat form used to persist the history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    #[serde(flatten)]
    pub key: HistoryKey,
    #[serde(flatten)]
    pub entry: HistoryEntry,
}

#[derive(Debug, Default)]
pub struct InMemoryHealingHistory {
    entries: RwLock<HashMap<HistoryKey, HistoryEntry>>,
}

impl InMemoryHealingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<HistoryRecord>) -> Self {
        let entries = records
            .into_iter()
            .map(|record| (record.key, record.entry))
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Sorted by url then locator, for stable output.
    pub fn records(&self) -> Vec<HistoryRecord> {
        let mut records: Vec<HistoryRecord> = self
            .entries
            .read()
            .iter()
            .map(|(key, entry)| HistoryRecord {
                key: key.clone(),
                entry: entry.clone(),
            })
            .collect();
        records.sort_by(|a, b| {
            (a.key.url.as_str(), a.key.locator.as_str())
                .cmp(&(b.key.url.as_str(), b.key.locator.as_str()))
        });
        records
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl HealingHistory for InMemoryHealingHistory {
    fn lookup(&self, locator: &str, url: &str) -> Vec<HealingResult> {
        let guard = self.entries.read();
        let Some(entry) = guard.get(&HistoryKey::new(locator, url)) else {
            return Vec::new();
        };
        entry
            .accepted
            .iter()
            .rev()
            .filter(|accepted| !entry.rejected.contains(&accepted.result.selector))
            .map(|accepted| accepted.result.clone())
            .collect()
    }

    fn record_accepted(&self, locator: &str, url: &str, result: HealingResult) {
        let now = Utc::now().timestamp_millis();
        let mut guard = self.entries.write();
        let entry = guard.entry(HistoryKey::new(locator, url)).or_default();
        entry.rejected.remove(&result.selector);
        entry
            .accepted
            .retain(|accepted| accepted.result.selector != result.selector);
        entry.accepted.push(AcceptedHealing {
            result,
            recorded_at: now,
        });
        entry.updated_at = now;
    }

    fn record_rejected(&self, locator: &str, url: &str, selector: &str) {
        let now = Utc::now().timestamp_millis();
        let mut guard = self.entries.write();
        let entry = guard.entry(HistoryKey::new(locator, url)).or_default();
        entry
            .accepted
            .retain(|accepted| accepted.result.selector != selector);
        entry.rejected.insert(selector.to_string());
        entry.updated_at = now;
    }

    fn is_rejected(&self, locator: &str, url: &str, selector: &str) -> bool {
        self.entries
            .read()
            .get(&HistoryKey::new(locator, url))
            .map_or(false, |entry| entry.rejected.contains(selector))
    }
}

/// Consults the history before healing and hides rejected locators after.
pub struct HistoryAwareHealer {
    inner: Arc<dyn SelfHealer>,
    history: Arc<dyn HealingHistory>,
}

impl HistoryAwareHealer {
    pub fn new(inner: Arc<dyn SelfHealer>, history: Arc<dyn HealingHistory>) -> Self {
        Self { inner, history }
    }

    pub fn history(&self) -> &Arc<dyn HealingHistory> {
        &self.history
    }
}

impl SelfHealer for HistoryAwareHealer {
    fn heal(
        &self,
        original_locator: &str,
        baseline: &Snapshot,
        current: &Snapshot,
    ) -> Vec<HealingResult> {
        let remembered = self.history.lookup(original_locator, &current.url);
        if !remembered.is_empty() {
            debug!(
                locator = original_locator,
                url = %current.url,
                count = remembered.len(),
                "answering from healing history"
            );
            return remembered;
        }

        self.inner
            .heal(original_locator, baseline, current)
            .into_iter()
            .filter(|result| {
                !self
                    .history
                    .is_rejected(original_locator, &current.url, &result.selector)
            })
            .collect()
    }
}
