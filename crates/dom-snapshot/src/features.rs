//! Weighted node features used to shortlist candidates

use serde::{Deserialize, Serialize};

use crate::arena::DomNode;

const ID_WEIGHT: f64 = 1.0;
const CLASS_WEIGHT: f64 = 0.7;
const TEXT_WEIGHT: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    Id,
    Class,
    Text,
    Attribute,
}

impl FeatureKind {
    pub fn name(&self) -> &'static str {
        match self {
            FeatureKind::Id => "id",
            FeatureKind::Class => "class",
            FeatureKind::Text => "text",
            FeatureKind::Attribute => "attribute",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feature {
    Id(String),
    Class(String),
    /// Trimmed text content
    Text(String),
    Attribute { name: String, value: String },
}

impl Feature {
    pub fn kind(&self) -> FeatureKind {
        match self {
            Feature::Id(_) => FeatureKind::Id,
            Feature::Class(_) => FeatureKind::Class,
            Feature::Text(_) => FeatureKind::Text,
            Feature::Attribute { .. } => FeatureKind::Attribute,
        }
    }

    pub fn weight(&self) -> f64 {
        match self {
            Feature::Id(_) => ID_WEIGHT,
            Feature::Class(_) => CLASS_WEIGHT,
            Feature::Text(_) => TEXT_WEIGHT,
            Feature::Attribute { name, .. } => attribute_weight(name),
        }
    }

    /// Attribute features encode as `name="value"`.
    pub fn value(&self) -> String {
        match self {
            Feature::Id(value) | Feature::Class(value) | Feature::Text(value) => value.clone(),
            Feature::Attribute { name, value } => format!("{}=\"{}\"", name, value),
        }
    }

    pub fn matches(&self, node: &DomNode) -> bool {
        match self {
            Feature::Id(id) => node.id() == Some(id.as_str()),
            Feature::Class(token) => node.has_class(token),
            Feature::Text(text) => node
                .raw_text()
                .map_or(false, |content| content.contains(text.as_str())),
            Feature::Attribute { name, value } => node.attribute(name) == Some(value.as_str()),
        }
    }

    pub fn descriptor(&self) -> FeatureDescriptor {
        FeatureDescriptor {
            kind: self.kind(),
            value: self.value(),
            weight: self.weight(),
        }
    }
}

/// Serializable form of a feature, for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDescriptor {
    #[serde(rename = "type")]
    pub kind: FeatureKind,
    pub value: String,
    pub weight: f64,
}

/// Fixed weight table for attribute features, case-insensitive on the name.
pub fn attribute_weight(name: &str) -> f64 {
    let lower = name.to_ascii_lowercase();
    match lower.as_str() {
        "name" | "data-testid" | "data-cy" | "data-test" => 0.8,
        "href" | "src" | "alt" | "title" | "aria-label" => 0.7,
        "type" | "role" | "placeholder" | "value" => 0.6,
        other if other.starts_with("data-") => 0.5,
        _ => 0.3,
    }
}

/// Extract features in rule order: id, classes, text, then attributes by name.
pub fn extract_features(node: &DomNode) -> Vec<Feature> {
    let mut features = Vec::new();

    if let Some(id) = node.id() {
        features.push(Feature::Id(id.to_string()));
    }

    features.extend(
        node.class_tokens()
            .iter()
            .map(|token| Feature::Class(token.clone())),
    );

    if let Some(text) = node.text() {
        features.push(Feature::Text(text.to_string()));
    }

    features.extend(
        node.attributes
            .iter()
            .filter(|(name, _)| !matches!(name.as_str(), "id" | "class"))
            .map(|(name, value)| Feature::Attribute {
                name: name.clone(),
                value: value.clone(),
            }),
    );

    features
}
