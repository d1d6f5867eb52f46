//! Flat node arena
//!
//! The captured tree is copied into a `Vec` in depth-first pre-order, so a
//! node's index doubles as its traversal position. Children are referenced by
//! index and the walk uses an explicit stack, which keeps very deep documents
//! off the call stack.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::errors::SnapshotError;
use crate::model::Node;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

#[derive(Clone, Debug)]
pub struct DomNode {
    pub tag_name: String,
    pub id: Option<String>,
    pub class_name: Option<String>,
    pub attributes: BTreeMap<String, String>,
    pub text_content: Option<String>,
    class_tokens: Vec<String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    depth: usize,
}

impl DomNode {
    fn from_source(source: &Node, parent: Option<NodeId>, depth: usize) -> Self {
        let class_tokens = source
            .class_name
            .as_deref()
            .map(|raw| raw.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        Self {
            tag_name: source.tag_name.clone(),
            id: source.id.clone(),
            class_name: source.class_name.clone(),
            attributes: source.attributes.clone(),
            text_content: source.text_content.clone(),
            class_tokens,
            children: Vec::with_capacity(source.children.len()),
            parent,
            depth,
        }
    }

    /// Element id, `None` when absent or empty.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn class_tokens(&self) -> &[String] {
        &self.class_tokens
    }

    pub fn has_class(&self, token: &str) -> bool {
        self.class_tokens.iter().any(|t| t == token)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Trimmed text content, `None` when absent or blank.
    pub fn text(&self) -> Option<&str> {
        self.text_content
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    /// Untrimmed text content as captured.
    pub fn raw_text(&self) -> Option<&str> {
        self.text_content.as_deref()
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

#[derive(Clone, Debug)]
pub struct DomTree {
    nodes: Vec<DomNode>,
}

impl DomTree {
    /// Flatten an owned tree into the arena.
    ///
    /// Fails on nodes without a tag name; everything downstream assumes every
    /// node carries one.
    pub fn from_node(root: &Node) -> Result<Self, SnapshotError> {
        let mut nodes: Vec<DomNode> = Vec::new();
        let mut stack: Vec<(&Node, Option<NodeId>, usize)> = vec![(root, None, 0)];

        while let Some((source, parent, depth)) = stack.pop() {
            if source.tag_name.trim().is_empty() {
                return Err(SnapshotError::malformed(format!(
                    "node #{} at depth {} has an empty tagName",
                    nodes.len(),
                    depth
                )));
            }

            let id = NodeId(nodes.len());
            nodes.push(DomNode::from_source(source, parent, depth));
            if let Some(parent) = parent {
                nodes[parent.0].children.push(id);
            }

            // Reversed so the first child is popped next.
            for child in source.children.iter().rev() {
                stack.push((child, Some(id), depth + 1));
            }
        }

        trace!(nodes = nodes.len(), "dom tree flattened");
        Ok(Self { nodes })
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Panics on an id from another tree that is out of range.
    pub fn node(&self, id: NodeId) -> &DomNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&DomNode> {
        self.nodes.get(id.0)
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &DomNode)> + '_ {
        self.node(id)
            .children
            .iter()
            .map(move |child| (*child, self.node(*child)))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(DomNode::parent)
    }

    /// Every node exactly once, depth-first pre-order.
    pub fn preorder(&self) -> impl Iterator<Item = (NodeId, &DomNode)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (NodeId(idx), node))
    }

    /// First node in pre-order carrying this id.
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.preorder()
            .find(|(_, node)| node.id() == Some(id))
            .map(|(node_id, _)| node_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node {
        Node::new("body").with_children([
            Node::new("header").with_child(Node::new("h1").with_text("Shop")),
            Node::new("main").with_children([
                Node::new("button").with_id("submit").with_class("btn  primary"),
                Node::new("a").with_attr("href", "/help"),
            ]),
        ])
    }

    #[test]
    fn preorder_matches_recursive_walk() {
        let tree = DomTree::from_node(&sample()).unwrap();
        let tags: Vec<_> = tree.preorder().map(|(_, n)| n.tag_name.as_str()).collect();
        assert_eq!(tags, ["body", "header", "h1", "main", "button", "a"]);
    }

    #[test]
    fn links_parents_and_children() {
        let tree = DomTree::from_node(&sample()).unwrap();
        let main = NodeId(3);
        let kids: Vec<_> = tree.children(main).map(|(id, _)| id).collect();
        assert_eq!(kids, vec![NodeId(4), NodeId(5)]);
        assert_eq!(tree.parent(NodeId(4)), Some(main));
        assert_eq!(tree.parent(tree.root()), None);
        assert_eq!(tree.node(NodeId(2)).depth(), 2);
    }

    #[test]
    fn class_tokens_drop_empty_entries() {
        let tree = DomTree::from_node(&sample()).unwrap();
        let button = tree.node(NodeId(4));
        assert_eq!(button.class_tokens(), ["btn", "primary"]);
        assert!(button.has_class("primary"));
        assert!(!button.has_class("btn primary"));
    }

    #[test]
    fn find_by_id_returns_first_match() {
        let root = Node::new("div").with_children([
            Node::new("span").with_id("dup"),
            Node::new("p").with_id("dup"),
        ]);
        let tree = DomTree::from_node(&root).unwrap();
        assert_eq!(tree.find_by_id("dup"), Some(NodeId(1)));
        assert_eq!(tree.find_by_id("missing"), None);
    }

    #[test]
    fn empty_id_and_blank_text_read_as_absent() {
        let root = Node::new("div").with_id("").with_text("   ");
        let tree = DomTree::from_node(&root).unwrap();
        assert_eq!(tree.node(tree.root()).id(), None);
        assert_eq!(tree.node(tree.root()).text(), None);
        assert_eq!(tree.find_by_id(""), None);
    }

    #[test]
    fn empty_tag_is_malformed() {
        let root = Node::new("div").with_child(Node::new(" "));
        let err = DomTree::from_node(&root).unwrap_err();
        assert!(matches!(err, SnapshotError::Malformed(_)));
    }

    #[test]
    fn deep_documents_do_not_recurse() {
        let mut node = Node::new("span");
        for _ in 0..20_000 {
            node = Node::new("div").with_child(node);
        }
        let tree = DomTree::from_node(&node).unwrap();
        assert_eq!(tree.len(), 20_001);
        assert_eq!(tree.node(NodeId(20_000)).tag_name, "span");
    }
}
