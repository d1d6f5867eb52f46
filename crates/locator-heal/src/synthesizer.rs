//! Locator synthesis
//!
//! Produces candidate locator strings for one node, each tagged with the
//! strategy that built it and an estimated specificity. Specificity comes from
//! the shape of the string alone; the tree is never queried to check how many
//! elements a locator would really match.

use std::cmp::Ordering;
use std::collections::HashMap;

use dom_snapshot::{DomNode, DomTree, NodeId};
use tracing::trace;

use crate::types::{GeneratedSelector, LocatorStrategy};

const TEXT_MAX_CHARS: usize = 100;
const TEXT_SHORT_CHARS: usize = 30;
const TEXT_SHORT_FACTOR: f64 = 0.9;
const TEXT_TRUNCATED_FACTOR: f64 = 0.8;
const SINGLE_CLASS_MIN: f64 = 0.5;
const ATTRIBUTE_MIN: f64 = 0.7;
const QUALIFIED_ATTRIBUTE_MIN: f64 = 0.8;
const CSS_PATH_SPECIFICITY: f64 = 0.7;
const XPATH_SPECIFICITY: f64 = 0.6;

/// Utility and state classes that say little about which element is meant.
pub const COMMON_CLASSES: [&str; 35] = [
    "active", "disabled", "selected", "hidden", "visible", "container", "wrapper", "row", "col",
    "item", "btn", "button", "input", "form", "header", "footer", "content", "panel", "card",
    "modal", "dialog", "text", "title", "label", "icon", "image", "large", "small", "medium",
    "primary", "secondary", "success", "error", "warning", "info",
];

/// Attributes worth building a locator from, besides any `data-*`.
pub const STABLE_ATTRIBUTES: [&str; 15] = [
    "name",
    "data-testid",
    "data-cy",
    "data-test",
    "data-automation",
    "aria-label",
    "role",
    "title",
    "alt",
    "href",
    "src",
    "type",
    "placeholder",
    "value",
    "for",
];

pub fn is_common_class(token: &str) -> bool {
    COMMON_CLASSES.contains(&token)
}

pub fn is_stable_attribute(name: &str) -> bool {
    STABLE_ATTRIBUTES.contains(&name) || name.starts_with("data-")
}

/// Pattern-based specificity estimate for a locator string.
///
/// First matching rule wins.
pub fn estimate_specificity(selector: &str) -> f64 {
    let dots = selector.matches('.').count();
    if is_bare_id(selector) {
        1.0
    } else if selector.contains("[data-testid=") || selector.contains("[data-cy=") {
        0.95
    } else if selector.contains("[data-") {
        0.9
    } else if selector.contains("[name=") || selector.contains("[role=") {
        0.85
    } else if selector.starts_with("//") {
        0.8
    } else if dots > 0 && selector.contains('[') {
        0.85
    } else if selector.contains(":contains(") {
        0.75
    } else if dots > 1 {
        0.8
    } else if selector.contains('[') && selector.contains('=') {
        0.75
    } else if selector.contains(" > ") {
        0.7
    } else if selector.contains(' ') {
        0.65
    } else if dots == 1 {
        0.6
    } else {
        0.5
    }
}

fn is_bare_id(selector: &str) -> bool {
    selector.strip_prefix('#').map_or(false, |id| {
        !id.is_empty()
            && !id
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, '.' | '[' | ':' | '>' | '+' | '~' | ','))
    })
}

/// Generate locators for `target`, deduplicated by value and sorted by
/// descending specificity.
///
/// Ties keep emission order: id, combined classes, single classes,
/// attributes, tag-qualified attributes, tag-qualified class, text, css path,
/// xpath.
pub fn synthesize(tree: &DomTree, target: NodeId) -> Vec<GeneratedSelector> {
    let node = tree.node(target);
    let mut emitted = Vec::new();
    let tag = node.tag_name.to_ascii_lowercase();

    emit_id(node, &mut emitted);
    emit_classes(node, &mut emitted);
    emit_attributes(node, &tag, &mut emitted);
    emit_qualified_class(node, &tag, &mut emitted);
    emit_text(node, &tag, &mut emitted);
    emitted.push(css_path(node, &tag));
    emitted.push(xpath(node, &tag));

    let raw = emitted.len();
    let selectors = rank(dedup(emitted));
    trace!(%target, raw, kept = selectors.len(), "locators synthesized");
    selectors
}

fn emit_id(node: &DomNode, out: &mut Vec<GeneratedSelector>) {
    if let Some(id) = node.id() {
        out.push(GeneratedSelector::new(
            format!("#{}", id),
            LocatorStrategy::IdBased,
            1.0,
        ));
    }
}

fn emit_classes(node: &DomNode, out: &mut Vec<GeneratedSelector>) {
    let tokens = node.class_tokens();
    if tokens.is_empty() {
        return;
    }

    let combined = format!(".{}", tokens.join("."));
    let specificity = estimate_specificity(&combined);
    out.push(GeneratedSelector::new(
        combined,
        LocatorStrategy::ClassBased,
        specificity,
    ));

    if tokens.len() > 1 {
        for token in tokens.iter().filter(|t| !is_common_class(t)) {
            let single = format!(".{}", token);
            let specificity = estimate_specificity(&single);
            if specificity > SINGLE_CLASS_MIN {
                out.push(GeneratedSelector::new(
                    single,
                    LocatorStrategy::ClassBased,
                    specificity,
                ));
            }
        }
    }
}

fn emit_attributes(node: &DomNode, tag: &str, out: &mut Vec<GeneratedSelector>) {
    let stable: Vec<(&String, &String)> = node
        .attributes
        .iter()
        .filter(|(name, _)| !matches!(name.as_str(), "id" | "class"))
        .filter(|(name, _)| is_stable_attribute(name))
        .collect();

    for (name, value) in &stable {
        let selector = format!("[{}=\"{}\"]", name, escape_quotes(value));
        let specificity = estimate_specificity(&selector);
        if specificity > ATTRIBUTE_MIN {
            out.push(GeneratedSelector::new(
                selector,
                LocatorStrategy::Attribute,
                specificity,
            ));
        }
    }

    for (name, value) in &stable {
        let selector = format!("{}[{}=\"{}\"]", tag, name, escape_quotes(value));
        let specificity = estimate_specificity(&selector);
        if specificity > QUALIFIED_ATTRIBUTE_MIN {
            out.push(GeneratedSelector::new(
                selector,
                LocatorStrategy::Attribute,
                specificity,
            ));
        }
    }
}

fn emit_qualified_class(node: &DomNode, tag: &str, out: &mut Vec<GeneratedSelector>) {
    let best = node
        .class_tokens()
        .iter()
        .map(|token| (token, estimate_specificity(&format!(".{}", token))))
        .fold(None::<(&String, f64)>, |best, (token, score)| match best {
            Some((_, top)) if top >= score => best,
            _ => Some((token, score)),
        });

    if let Some((token, _)) = best {
        let selector = format!("{}.{}", tag, token);
        let specificity = estimate_specificity(&selector);
        out.push(GeneratedSelector::new(
            selector,
            LocatorStrategy::ClassBased,
            specificity,
        ));
    }
}

fn emit_text(node: &DomNode, tag: &str, out: &mut Vec<GeneratedSelector>) {
    let Some(text) = node.text() else {
        return;
    };
    let length = text.chars().count();
    if length >= TEXT_MAX_CHARS {
        return;
    }

    let (shown, factor) = if length < TEXT_SHORT_CHARS {
        (text.to_string(), TEXT_SHORT_FACTOR)
    } else {
        (prefix(text, TEXT_SHORT_CHARS), TEXT_TRUNCATED_FACTOR)
    };
    let selector = format!("{}:contains(\"{}\")", tag, escape_quotes(&shown));
    let specificity = estimate_specificity(&selector) * factor;
    out.push(GeneratedSelector::new(
        selector,
        LocatorStrategy::TextBased,
        specificity,
    ));
}

fn css_path(node: &DomNode, tag: &str) -> GeneratedSelector {
    let value = if let Some(id) = node.id() {
        format!("{}#{}", tag, id)
    } else if let Some(token) = node.class_tokens().first() {
        format!("{}.{}", tag, token)
    } else {
        format!("{}:nth-child(1)", tag)
    };
    GeneratedSelector::new(value, LocatorStrategy::CssPath, CSS_PATH_SPECIFICITY)
}

fn xpath(node: &DomNode, tag: &str) -> GeneratedSelector {
    let predicate = if let Some(id) = node.id() {
        format!("[@id={}]", xpath_literal(id))
    } else if let Some(token) = node.class_tokens().first() {
        format!("[contains(@class, {})]", xpath_literal(token))
    } else if let Some(text) = node.text() {
        if text.chars().count() < TEXT_SHORT_CHARS {
            format!("[text()={}]", xpath_literal(text))
        } else {
            format!(
                "[contains(text(), {})]",
                xpath_literal(&prefix(text, TEXT_SHORT_CHARS))
            )
        }
    } else {
        String::new()
    };
    GeneratedSelector::new(
        format!("//{}{}", tag, predicate),
        LocatorStrategy::XPath,
        XPATH_SPECIFICITY,
    )
}

/// Keep the most specific entry per value; equal specificity keeps the first.
fn dedup(selectors: Vec<GeneratedSelector>) -> Vec<GeneratedSelector> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut kept: Vec<GeneratedSelector> = Vec::with_capacity(selectors.len());
    for selector in selectors {
        match index.get(&selector.value) {
            Some(&slot) => {
                if selector.specificity > kept[slot].specificity {
                    kept[slot] = selector;
                }
            }
            None => {
                index.insert(selector.value.clone(), kept.len());
                kept.push(selector);
            }
        }
    }
    kept
}

fn rank(mut selectors: Vec<GeneratedSelector>) -> Vec<GeneratedSelector> {
    selectors.sort_by(|a, b| {
        b.specificity
            .partial_cmp(&a.specificity)
            .unwrap_or(Ordering::Equal)
    });
    selectors
}

fn prefix(text: &str, chars: usize) -> String {
    text.chars().take(chars).collect()
}

fn escape_quotes(value: &str) -> String {
    value.replace('"', "\\\"")
}

fn xpath_literal(value: &str) -> String {
    if !value.contains('"') {
        format!("\"{}\"", value)
    } else if !value.contains('\'') {
        format!("'{}'", value)
    } else {
        let parts: Vec<String> = value
            .split('"')
            .map(|part| format!("\"{}\"", part))
            .collect();
        format!("concat({})", parts.join(", '\"', "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom_snapshot::Node;
    use std::collections::HashSet;

    fn synth(source: Node) -> Vec<GeneratedSelector> {
        let tree = DomTree::from_node(&source).unwrap();
        synthesize(&tree, tree.root())
    }

    fn values(selectors: &[GeneratedSelector]) -> Vec<&str> {
        selectors.iter().map(|s| s.value.as_str()).collect()
    }

    #[test]
    fn estimator_rule_order() {
        assert_eq!(estimate_specificity("#submit"), 1.0);
        assert_eq!(estimate_specificity("[data-testid=\"x\"]"), 0.95);
        assert_eq!(estimate_specificity("[data-role=\"x\"]"), 0.9);
        assert_eq!(estimate_specificity("input[name=\"q\"]"), 0.85);
        assert_eq!(estimate_specificity("//button[@id=\"x\"]"), 0.8);
        assert_eq!(estimate_specificity("a[href=\"/a.html\"]"), 0.85);
        assert_eq!(estimate_specificity("button:contains(\"Go\")"), 0.75);
        assert_eq!(estimate_specificity(".btn.primary"), 0.8);
        assert_eq!(estimate_specificity("[href=\"/\"]"), 0.75);
        assert_eq!(estimate_specificity("ul > li"), 0.7);
        assert_eq!(estimate_specificity("ul li"), 0.65);
        assert_eq!(estimate_specificity(".btn"), 0.6);
        assert_eq!(estimate_specificity("button"), 0.5);
        assert_eq!(estimate_specificity("#a .b"), 0.65);
    }

    #[test]
    fn button_with_id_classes_and_text() {
        let selectors = synth(
            Node::new("BUTTON")
                .with_id("submit-button")
                .with_class("btn primary")
                .with_text("Submit"),
        );
        assert_eq!(
            values(&selectors),
            [
                "#submit-button",
                ".btn.primary",
                "button#submit-button",
                "button:contains(\"Submit\")",
                "button.btn",
                "//button[@id=\"submit-button\"]",
            ]
        );
        assert_eq!(selectors[0].strategy, LocatorStrategy::IdBased);
        assert_eq!(selectors[1].specificity, 0.8);
        assert!((selectors[3].specificity - 0.675).abs() < 1e-12);
    }

    #[test]
    fn single_classes_skip_common_tokens() {
        let selectors = synth(Node::new("div").with_class("card checkout-summary"));
        let found = values(&selectors);
        assert!(found.contains(&".checkout-summary"));
        assert!(!found.contains(&".card"));
        // a lone token yields only the combined form
        let selectors = synth(Node::new("div").with_class("checkout-summary"));
        assert_eq!(
            selectors
                .iter()
                .filter(|s| s.value == ".checkout-summary")
                .count(),
            1
        );
    }

    #[test]
    fn attribute_thresholds() {
        let selectors = synth(
            Node::new("input")
                .with_attr("data-testid", "email")
                .with_attr("placeholder", "you@example")
                .with_attr("autocomplete", "off"),
        );
        let found = values(&selectors);
        assert_eq!(selectors[0].value, "[data-testid=\"email\"]");
        assert_eq!(selectors[0].specificity, 0.95);
        assert!(found.contains(&"input[data-testid=\"email\"]"));
        assert!(found.contains(&"[placeholder=\"you@example\"]"));
        // 0.75 does not clear the tag-qualified bar
        assert!(!found.contains(&"input[placeholder=\"you@example\"]"));
        assert!(!found.iter().any(|v| v.contains("autocomplete")));
    }

    #[test]
    fn long_text_is_truncated_and_very_long_text_skipped() {
        let text = "Proceed to the secure checkout page now";
        let selectors = synth(Node::new("a").with_text(text));
        let text_based: Vec<_> = selectors
            .iter()
            .filter(|s| s.strategy == LocatorStrategy::TextBased)
            .collect();
        assert_eq!(text_based.len(), 1);
        assert_eq!(
            text_based[0].value,
            "a:contains(\"Proceed to the secure checkout\")"
        );
        assert!((text_based[0].specificity - 0.6).abs() < 1e-12);
        assert!(values(&selectors)
            .contains(&"//a[contains(text(), \"Proceed to the secure checkout\")]"));

        let long = "x".repeat(120);
        let selectors = synth(Node::new("p").with_text(long));
        assert!(!selectors
            .iter()
            .any(|s| s.strategy == LocatorStrategy::TextBased));
    }

    #[test]
    fn text_length_boundaries() {
        let text_selector = |length: usize| {
            synth(Node::new("p").with_text("w".repeat(length)))
                .into_iter()
                .find(|s| s.strategy == LocatorStrategy::TextBased)
        };

        let short = text_selector(29).unwrap();
        assert_eq!(short.value, format!("p:contains(\"{}\")", "w".repeat(29)));
        assert!((short.specificity - 0.675).abs() < 1e-12);

        let at_limit = text_selector(30).unwrap();
        assert_eq!(at_limit.value, format!("p:contains(\"{}\")", "w".repeat(30)));
        assert!((at_limit.specificity - 0.6).abs() < 1e-12);

        let longest = text_selector(99).unwrap();
        assert_eq!(longest.value, format!("p:contains(\"{}\")", "w".repeat(30)));
        assert!((longest.specificity - 0.6).abs() < 1e-12);

        assert!(text_selector(100).is_none());
    }

    #[test]
    fn bare_node_still_gets_fallbacks() {
        let selectors = synth(Node::new("span"));
        assert_eq!(values(&selectors), ["span:nth-child(1)", "//span"]);
        assert_eq!(selectors[0].strategy, LocatorStrategy::CssPath);
        assert_eq!(selectors[1].strategy, LocatorStrategy::XPath);
    }

    #[test]
    fn duplicate_values_keep_highest_specificity() {
        // `li.nav-home` is produced by both the tag-qualified class (0.6) and
        // the css path (0.7).
        let selectors = synth(Node::new("li").with_class("nav-home"));
        let dupes: Vec<_> = selectors.iter().filter(|s| s.value == "li.nav-home").collect();
        assert_eq!(dupes.len(), 1);
        assert_eq!(dupes[0].strategy, LocatorStrategy::CssPath);
        assert_eq!(dupes[0].specificity, 0.7);

        let unique: HashSet<_> = selectors.iter().map(|s| &s.value).collect();
        assert_eq!(unique.len(), selectors.len());
    }

    #[test]
    fn output_sorted_by_specificity() {
        let selectors = synth(
            Node::new("a")
                .with_class("nav-link external")
                .with_attr("href", "https://docs.test/a.html")
                .with_attr("data-track", "docs")
                .with_text("Docs"),
        );
        assert!(selectors
            .windows(2)
            .all(|pair| pair[0].specificity >= pair[1].specificity));
    }

    #[test]
    fn xpath_literal_quoting() {
        assert_eq!(xpath_literal("a"), "\"a\"");
        assert_eq!(xpath_literal("say \"hi\""), "'say \"hi\"'");
        assert_eq!(
            xpath_literal("it's \"x\""),
            "concat(\"it's \", '\"', \"x\", '\"', \"\")"
        );
    }
}
