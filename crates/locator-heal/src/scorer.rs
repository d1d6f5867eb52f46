//! Similarity scoring between the baseline element and a candidate
//!
//! Additive: every rule that applies to the reference raises the attainable
//! maximum, and the candidate earns part or all of it. The score is
//! `total / max`.

use std::collections::HashSet;

use dom_snapshot::DomNode;
use serde::Serialize;

const TAG_POINTS: f64 = 10.0;
const ID_POINTS: f64 = 30.0;
const CLASS_POINTS: f64 = 20.0;
const TEXT_POINTS: f64 = 15.0;
const TEXT_PARTIAL_POINTS: f64 = 10.0;
const IMPORTANT_ATTR_POINTS: f64 = 10.0;
const OTHER_ATTR_POINTS: f64 = 5.0;
const STRUCTURE_POINTS: f64 = 10.0;
const STRUCTURE_NEAR_POINTS: f64 = 5.0;
const STRUCTURE_NEAR_DELTA: usize = 2;

/// Attributes that usually survive restyling.
pub const IMPORTANT_ATTRIBUTES: [&str; 13] = [
    "name",
    "data-testid",
    "data-cy",
    "data-test",
    "href",
    "src",
    "alt",
    "title",
    "aria-label",
    "type",
    "role",
    "placeholder",
    "value",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreReport {
    /// Normalized similarity (0.0-1.0)
    pub score: f64,
    pub total: f64,
    pub max: f64,
    pub matched: Vec<String>,
}

impl ScoreReport {
    fn veto() -> Self {
        Self::default()
    }
}

pub fn is_important_attribute(name: &str) -> bool {
    IMPORTANT_ATTRIBUTES.contains(&name)
}

/// Score `candidate` against `reference`. Different tag names score 0.
pub fn score_similarity(reference: &DomNode, candidate: &DomNode) -> ScoreReport {
    if reference.tag_name != candidate.tag_name {
        return ScoreReport::veto();
    }

    let mut total = TAG_POINTS;
    let mut max = TAG_POINTS;
    let mut matched = vec!["tag".to_string()];

    if let Some(id) = reference.id() {
        max += ID_POINTS;
        if candidate.id() == Some(id) {
            total += ID_POINTS;
            matched.push("id".to_string());
        }
    }

    let classes = reference.class_tokens();
    if !classes.is_empty() {
        max += CLASS_POINTS;
        let hits = classes.iter().filter(|token| candidate.has_class(token)).count();
        total += CLASS_POINTS * (hits as f64 / classes.len() as f64);
        if hits > 0 {
            matched.push(format!("classes:{}/{}", hits, classes.len()));
        }
    }

    if let Some(text) = reference.raw_text().filter(|t| !t.trim().is_empty()) {
        max += TEXT_POINTS;
        let sim = text_similarity(text, candidate.raw_text().unwrap_or_default());
        if sim > 0.8 {
            total += TEXT_POINTS * sim;
            matched.push(format!("text:{:.2}", sim));
        } else if sim > 0.5 {
            total += TEXT_PARTIAL_POINTS * sim;
            matched.push(format!("text~{:.2}", sim));
        }
    }

    for (name, value) in &reference.attributes {
        if matches!(name.as_str(), "id" | "class") {
            continue;
        }
        let points = if is_important_attribute(name) {
            IMPORTANT_ATTR_POINTS
        } else {
            OTHER_ATTR_POINTS
        };
        max += points;
        if candidate.attribute(name) == Some(value.as_str()) {
            total += points;
            matched.push(format!("attr:{}", name));
        }
    }

    max += STRUCTURE_POINTS;
    let delta = reference.child_count().abs_diff(candidate.child_count());
    if delta == 0 {
        total += STRUCTURE_POINTS;
        matched.push("structure".to_string());
    } else if delta <= STRUCTURE_NEAR_DELTA {
        total += STRUCTURE_NEAR_POINTS;
        matched.push("structure~".to_string());
    }

    let score = if max > 0.0 { total / max } else { 0.0 };
    ScoreReport {
        score,
        total,
        max,
        matched,
    }
}

/// Jaccard similarity of the lowercase word sets of two texts.
pub fn text_similarity(a: &str, b: &str) -> f64 {
    let left = word_set(a);
    let right = word_set(b);
    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = left.intersection(&right).count();
    intersection as f64 / union as f64
}

fn word_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
