//! Command reports and their human/json/yaml renderings

use std::fmt::Write as _;

use clap::ValueEnum;
use dom_snapshot::DomNode;
use locator_heal::metrics::HealMetricSnapshot;
use locator_heal::{GeneratedSelector, HealEvent, HealSource, HealingResult, HistoryRecord};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
    Yaml,
}

pub trait HumanReadable {
    fn to_human(&self) -> String;
}

pub fn render<T>(format: OutputFormat, report: &T) -> Result<String, AppError>
where
    T: Serialize + HumanReadable,
{
    match format {
        OutputFormat::Human => Ok(report.to_human()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(report)?),
    }
}

/// `tag#id.class1.class2`, for listings.
pub fn node_label(node: &DomNode) -> String {
    let mut label = node.tag_name.clone();
    if let Some(id) = node.id() {
        let _ = write!(label, "#{id}");
    }
    for class in node.class_tokens() {
        let _ = write!(label, ".{class}");
    }
    label
}

fn source_name(source: HealSource) -> &'static str {
    match source {
        HealSource::Local => "local",
        HealSource::Server => "server",
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct HealReport {
    pub locator: String,
    pub baseline_url: String,
    pub current_url: String,
    pub duration_ms: f64,
    pub results: Vec<HealingResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<HealEvent>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<HealMetricSnapshot>,
}

impl HumanReadable for HealReport {
    fn to_human(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Locator:  {}", self.locator);
        let _ = writeln!(out, "Baseline: {}", self.baseline_url);
        let _ = writeln!(out, "Current:  {}", self.current_url);
        if self.results.is_empty() {
            let _ = writeln!(out, "No replacement locator found ({:.1} ms)", self.duration_ms);
        } else {
            let _ = writeln!(
                out,
                "{} replacement locator(s) in {:.1} ms:",
                self.results.len(),
                self.duration_ms
            );
            for (rank, result) in self.results.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "  {:>2}. {:<48} {:.3}  {:<11} {}",
                    rank + 1,
                    result.selector,
                    result.score,
                    result.strategy.name(),
                    source_name(result.source)
                );
            }
        }
        if let Some(events) = &self.events {
            let _ = writeln!(out, "Trace:");
            for event in events {
                let _ = writeln!(out, "  {}", describe_event(event));
            }
        }
        if let Some(metrics) = &self.metrics {
            let _ = writeln!(
                out,
                "Process totals: {} heal(s), {} empty, {} faulted, avg {:.3} ms",
                metrics.heals, metrics.empty, metrics.faulted, metrics.avg_ms
            );
        }
        out
    }
}

fn describe_event(event: &HealEvent) -> String {
    match event {
        HealEvent::Started { locator } => format!("started {locator}"),
        HealEvent::UnsupportedLocator { locator } => {
            format!("unsupported locator {locator} (only #id is resolved)")
        }
        HealEvent::BaselineNotFound { locator } => format!("{locator} not found in baseline"),
        HealEvent::NoCandidates { tag } => format!("no <{tag}> candidate in current snapshot"),
        HealEvent::CandidatesScored { found, kept } => {
            format!("{found} candidate(s) scored, {kept} above threshold")
        }
        HealEvent::Completed { results, duration } => format!(
            "completed with {results} result(s) in {:.3} ms",
            duration.as_secs_f64() * 1000.0
        ),
        HealEvent::Faulted { reason } => format!("faulted: {reason}"),
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct CandidateRow {
    pub node: String,
    pub label: String,
    pub score: f64,
    pub kept: bool,
    pub matched: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CandidateReport {
    pub locator: String,
    pub reference: String,
    pub min_candidate_score: f64,
    pub candidates: Vec<CandidateRow>,
}

impl HumanReadable for CandidateReport {
    fn to_human(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Baseline element for {}: {}", self.locator, self.reference);
        if self.candidates.is_empty() {
            let _ = writeln!(out, "No candidates in current snapshot");
            return out;
        }
        let _ = writeln!(
            out,
            "{} candidate(s), threshold {:.2}:",
            self.candidates.len(),
            self.min_candidate_score
        );
        for row in &self.candidates {
            let _ = writeln!(
                out,
                "  {} {:<9} {:<40} {:.3}  [{}]",
                if row.kept { "+" } else { "-" },
                row.node,
                row.label,
                row.score,
                row.matched.join(", ")
            );
        }
        out
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct SelectorReport {
    pub node: String,
    pub label: String,
    pub selectors: Vec<GeneratedSelector>,
}

impl HumanReadable for SelectorReport {
    fn to_human(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} ({})", self.label, self.node);
        for selector in &self.selectors {
            let _ = writeln!(
                out,
                "  {:<48} {:.2}  {}",
                selector.value,
                selector.specificity,
                selector.strategy.name()
            );
        }
        out
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(transparent)]
pub struct HistoryReport {
    pub records: Vec<HistoryRecord>,
}

impl HumanReadable for HistoryReport {
    fn to_human(&self) -> String {
        let mut out = String::new();
        if self.records.is_empty() {
            let _ = writeln!(out, "Healing history is empty");
            return out;
        }
        for record in &self.records {
            let updated = chrono::DateTime::from_timestamp_millis(record.entry.updated_at)
                .map(|at| at.to_rfc3339())
                .unwrap_or_else(|| record.entry.updated_at.to_string());
            let _ = writeln!(
                out,
                "{} @ {} (updated {})",
                record.key.locator, record.key.url, updated
            );
            for accepted in record.entry.accepted.iter().rev() {
                let _ = writeln!(
                    out,
                    "  accepted {:<40} {:.3}  {}",
                    accepted.result.selector,
                    accepted.result.score,
                    accepted.result.strategy.name()
                );
            }
            for rejected in &record.entry.rejected {
                let _ = writeln!(out, "  rejected {rejected}");
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom_snapshot::{DomTree, Node};
    use locator_heal::LocatorStrategy;
    use std::time::Duration;

    fn report() -> HealReport {
        HealReport {
            locator: "#submit".into(),
            baseline_url: "https://a.test".into(),
            current_url: "https://a.test".into(),
            duration_ms: 1.25,
            results: vec![HealingResult {
                selector: "#submit-button".into(),
                score: 0.647,
                strategy: LocatorStrategy::IdBased,
                source: HealSource::Local,
            }],
            events: Some(vec![HealEvent::Completed {
                results: 1,
                duration: Duration::from_micros(1250),
            }]),
            metrics: None,
        }
    }

    #[test]
    fn json_uses_wire_names() {
        let json = render(OutputFormat::Json, &report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["results"][0]["strategy"], "id-based");
        assert_eq!(value["results"][0]["source"], "local");
        assert_eq!(value["events"][0]["kind"], "completed");
        assert_eq!(value["events"][0]["duration"], 1.25);
    }

    #[test]
    fn human_lists_ranked_results() {
        let text = render(OutputFormat::Human, &report()).unwrap();
        assert!(text.contains("1 replacement locator(s)"));
        assert!(text.contains("#submit-button"));
        assert!(text.contains("id-based"));
        assert!(text.contains("completed with 1 result(s)"));
    }

    #[test]
    fn yaml_renders() {
        let yaml = render(OutputFormat::Yaml, &report()).unwrap();
        assert!(yaml.contains("#submit-button"));
        assert!(yaml.contains("strategy: id-based"));
    }

    #[test]
    fn labels_nodes() {
        let tree = DomTree::from_node(
            &Node::new("button")
                .with_id("go")
                .with_class(" btn  primary "),
        )
        .unwrap();
        assert_eq!(node_label(tree.node(tree.root())), "button#go.btn.primary");
    }
}
