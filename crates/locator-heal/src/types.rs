//! Core types for the heal pipeline

use dom_snapshot::NodeId;
use serde::{Deserialize, Serialize};

/// Locator strategy enumeration
///
/// Variants are declared in preference order; `priority()` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocatorStrategy {
    /// `#id`
    #[serde(rename = "id-based")]
    IdBased,

    /// `.a.b`, `.a`, `tag.a`
    #[serde(rename = "class-based")]
    ClassBased,

    /// `[name="value"]`, `tag[name="value"]`
    #[serde(rename = "attribute")]
    Attribute,

    /// `tag:contains("text")`
    #[serde(rename = "text-based")]
    TextBased,

    /// `tag#id`, `tag.class`, `tag:nth-child(n)`
    #[serde(rename = "css-path")]
    CssPath,

    /// `//tag[...]`
    #[serde(rename = "xpath")]
    XPath,
}

impl LocatorStrategy {
    /// Get strategy name as string
    pub fn name(&self) -> &'static str {
        match self {
            LocatorStrategy::IdBased => "id-based",
            LocatorStrategy::ClassBased => "class-based",
            LocatorStrategy::Attribute => "attribute",
            LocatorStrategy::TextBased => "text-based",
            LocatorStrategy::CssPath => "css-path",
            LocatorStrategy::XPath => "xpath",
        }
    }

    /// Tie-break rank, lower is preferred.
    pub fn priority(&self) -> u8 {
        match self {
            LocatorStrategy::IdBased => 0,
            LocatorStrategy::ClassBased => 1,
            LocatorStrategy::Attribute => 2,
            LocatorStrategy::TextBased => 3,
            LocatorStrategy::CssPath => 4,
            LocatorStrategy::XPath => 5,
        }
    }

    /// All strategies in preference order
    pub fn all() -> [LocatorStrategy; 6] {
        [
            LocatorStrategy::IdBased,
            LocatorStrategy::ClassBased,
            LocatorStrategy::Attribute,
            LocatorStrategy::TextBased,
            LocatorStrategy::CssPath,
            LocatorStrategy::XPath,
        ]
    }
}

/// Who produced a healing result. The pipeline itself always reports `Local`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealSource {
    Local,
    Server,
}

/// A node of the current tree that plausibly succeeds the baseline element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    /// Arena index in the current tree
    pub node: NodeId,

    /// Similarity to the baseline element (0.0-1.0)
    pub score: f64,

    /// Tags of the scoring rules that credited this node
    pub matched: Vec<String>,
}

impl Candidate {
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            score: 0.0,
            matched: Vec::new(),
        }
    }
}

/// One synthesized locator string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedSelector {
    pub value: String,
    pub strategy: LocatorStrategy,

    /// Heuristic estimate (0.0-1.0), never a measured match count
    pub specificity: f64,
}

impl GeneratedSelector {
    pub fn new(value: impl Into<String>, strategy: LocatorStrategy, specificity: f64) -> Self {
        Self {
            value: value.into(),
            strategy,
            specificity,
        }
    }
}

/// A ranked replacement locator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealingResult {
    pub selector: String,

    /// Candidate score times selector specificity (0.0-1.0)
    pub score: f64,

    pub strategy: LocatorStrategy,
    pub source: HealSource,
}

impl HealingResult {
    pub fn local(selector: &GeneratedSelector, candidate_score: f64) -> Self {
        Self {
            selector: selector.value.clone(),
            score: candidate_score * selector.specificity,
            strategy: selector.strategy,
            source: HealSource::Local,
        }
    }

    /// Check if this is a high-confidence result (>= 0.8)
    pub fn is_high_confidence(&self) -> bool {
        self.score >= 0.8
    }
}
