//! DOM snapshot model for locator healing
//!
//! - `model`: the JSON boundary shapes produced by the capturing side
//! - `arena`: flat, index-addressed tree built from a captured root node
//! - `features`: weighted facts extracted from a node for candidate matching

pub mod arena;
pub mod errors;
pub mod features;
pub mod model;

pub use arena::{DomNode, DomTree, NodeId};
pub use errors::SnapshotError;
pub use features::{attribute_weight, extract_features, Feature, FeatureDescriptor, FeatureKind};
pub use model::{Node, Snapshot};
