use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Deserializer;

use crate::arena::DomTree;
use crate::errors::SnapshotError;

/// One captured element, exactly as the capturing side serializes it.
///
/// Children are owned by their parent, so a `Node` is always the root of an
/// acyclic subtree.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub tag_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Space separated class tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,

    #[serde(default)]
    pub attributes: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,

    #[serde(default)]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            id: None,
            class_name: None,
            attributes: BTreeMap::new(),
            text_content: None,
            children: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_content = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }
}

// Dropping children one level at a time keeps deep captures off the stack.
impl Drop for Node {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Point-in-time document state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Capture time in epoch milliseconds
    pub timestamp: i64,

    pub root_node: Node,
}

impl Snapshot {
    pub fn new(url: impl Into<String>, timestamp: i64, root_node: Node) -> Self {
        Self {
            url: url.into(),
            title: None,
            timestamp,
            root_node,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Parse a capture payload. Nesting depth is not limited; the parser
    /// grows its stack on demand instead.
    pub fn from_json(raw: &str) -> Result<Self, SnapshotError> {
        let mut de = Deserializer::from_str(raw);
        de.disable_recursion_limit();
        let snapshot = Self::deserialize(serde_stacker::Deserializer::new(&mut de))?;
        de.end()?;
        Ok(snapshot)
    }

    /// Flatten the captured tree into an arena.
    pub fn tree(&self) -> Result<DomTree, SnapshotError> {
        DomTree::from_node(&self.root_node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn snapshot_parses_capture_payload() {
        let raw = json!({
            "url": "https://shop.test/cart",
            "timestamp": 1_700_000_000_000i64,
            "rootNode": {
                "tagName": "body",
                "attributes": {},
                "children": [
                    {
                        "tagName": "button",
                        "id": "submit",
                        "className": "btn primary",
                        "attributes": { "type": "submit" },
                        "textContent": "Submit",
                        "children": []
                    }
                ]
            }
        })
        .to_string();

        let snapshot = Snapshot::from_json(&raw).unwrap();
        assert_eq!(snapshot.url, "https://shop.test/cart");
        assert!(snapshot.title.is_none());
        let button = &snapshot.root_node.children[0];
        assert_eq!(button.tag_name, "button");
        assert_eq!(button.class_name.as_deref(), Some("btn primary"));
        assert_eq!(button.attributes.get("type").map(String::as_str), Some("submit"));
    }

    #[test]
    fn optional_fields_are_omitted_when_serialized() {
        let node = Node::new("div");
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value, json!({ "tagName": "div", "attributes": {}, "children": [] }));
    }

    fn nested_payload(depth: usize) -> String {
        let mut raw = String::from(r#"{"url":"https://deep.test","timestamp":1,"rootNode":"#);
        for _ in 0..depth {
            raw.push_str(r#"{"tagName":"div","children":["#);
        }
        raw.push_str(r#"{"tagName":"button","id":"deep"}"#);
        for _ in 0..depth {
            raw.push_str("]}");
        }
        raw.push('}');
        raw
    }

    #[test]
    fn deeply_nested_payload_parses_and_drops() {
        let snapshot = Snapshot::from_json(&nested_payload(1_000)).unwrap();
        let tree = snapshot.tree().unwrap();
        assert_eq!(tree.len(), 1_001);
        let button = tree.find_by_id("deep").unwrap();
        assert_eq!(tree.node(button).depth(), 1_000);
        drop(snapshot);

        let mut chain = Node::new("span");
        for _ in 0..100_000 {
            chain = Node::new("div").with_child(chain);
        }
        drop(chain);
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        let raw = format!("{} x", nested_payload(1));
        assert!(matches!(
            Snapshot::from_json(&raw),
            Err(SnapshotError::Parse(_))
        ));
    }

    #[test]
    fn missing_root_is_a_parse_error() {
        let err = Snapshot::from_json(r#"{"url":"x","timestamp":1}"#).unwrap_err();
        assert!(matches!(err, SnapshotError::Parse(_)));
    }
}
