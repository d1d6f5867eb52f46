//! Candidate search over the current tree

use dom_snapshot::{extract_features, DomNode, DomTree, Feature, NodeId};
use tracing::trace;

/// Nodes of `target` sharing the reference's tag name and at least one
/// weighted feature, in pre-order.
pub fn find_candidates(reference: &DomNode, target: &DomTree) -> Vec<NodeId> {
    let features = extract_features(reference);
    let candidates: Vec<NodeId> = target
        .preorder()
        .filter(|(_, node)| node.tag_name == reference.tag_name)
        .filter(|(_, node)| overlap_weight(&features, node) > 0.0)
        .map(|(id, _)| id)
        .collect();

    trace!(
        tag = %reference.tag_name,
        features = features.len(),
        visited = target.len(),
        found = candidates.len(),
        "candidate search finished"
    );
    candidates
}

/// Sum of the weights of `features` that match `node`.
pub fn overlap_weight(features: &[Feature], node: &DomNode) -> f64 {
    features
        .iter()
        .filter(|feature| feature.matches(node))
        .map(Feature::weight)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom_snapshot::Node;

    fn tree(root: Node) -> DomTree {
        DomTree::from_node(&root).unwrap()
    }

    fn reference() -> DomTree {
        tree(
            Node::new("button")
                .with_id("submit")
                .with_class("btn primary")
                .with_text("Submit"),
        )
    }

    #[test]
    fn finds_renamed_element_through_class_and_text() {
        let baseline = reference();
        let current = tree(Node::new("form").with_children([
            Node::new("input").with_class("btn"),
            Node::new("button").with_id("cancel").with_text("Cancel"),
            Node::new("button")
                .with_id("submit-button")
                .with_class("btn primary")
                .with_text("Submit"),
        ]));

        let found = find_candidates(baseline.node(baseline.root()), &current);
        assert_eq!(found, vec![NodeId(3)]);
    }

    #[test]
    fn empty_when_tag_is_absent() {
        let baseline = reference();
        let current = tree(Node::new("div").with_child(Node::new("a").with_class("btn primary")));
        assert!(find_candidates(baseline.node(baseline.root()), &current).is_empty());
    }

    #[test]
    fn same_tag_without_overlap_is_skipped() {
        let baseline = reference();
        let current = tree(Node::new("div").with_child(Node::new("button").with_class("other")));
        assert!(find_candidates(baseline.node(baseline.root()), &current).is_empty());
    }

    #[test]
    fn keeps_traversal_order() {
        let baseline = reference();
        let current = tree(Node::new("div").with_children([
            Node::new("section").with_child(Node::new("button").with_class("btn")),
            Node::new("button").with_class("primary"),
        ]));
        let found = find_candidates(baseline.node(baseline.root()), &current);
        assert_eq!(found, vec![NodeId(2), NodeId(3)]);
    }

    #[test]
    fn overlap_sums_matching_weights() {
        let baseline = tree(
            Node::new("input")
                .with_class("field")
                .with_attr("name", "email")
                .with_attr("style", "x"),
        );
        let features = extract_features(baseline.node(baseline.root()));
        let current = tree(
            Node::new("input")
                .with_class("field")
                .with_attr("name", "email")
                .with_attr("style", "y"),
        );
        let weight = overlap_weight(&features, current.node(current.root()));
        assert!((weight - 1.5).abs() < 1e-9);
    }
}
