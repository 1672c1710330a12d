//! In-memory element tree.
//!
//! Nodes are addressed by their child-index path from the document root.
//! Paths compare lexicographically in document (pre-)order, which is the
//! order `querySelectorAll` returns.

use super::css::{Matchable, SelectorList};
use crate::locator::{Locator, LocatorStep};
use crate::result::ShopResult;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use tokio::time::Instant;

/// Child-index path from the document root
pub type NodePath = Vec<usize>;

/// One element of the fake DOM
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Lowercase tag name
    pub tag: String,
    /// Attributes (`id` and `class` included)
    pub attributes: BTreeMap<String, String>,
    /// Own text (concatenated before children's text)
    pub text: Option<String>,
    /// Child elements
    pub children: Vec<Element>,
    /// `display: none`
    pub hidden: bool,
    /// Hidden until this instant (tokio clock)
    pub hidden_until: Option<Instant>,
    /// `disabled` flag for form controls
    pub disabled: bool,
    /// Current value for inputs and selects
    pub value: Option<String>,
    /// Properties returned by `evaluate`
    pub properties: Map<String, Value>,
}

impl Element {
    /// Create an element
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: BTreeMap::new(),
            text: None,
            children: Vec::new(),
            hidden: false,
            hidden_until: None,
            disabled: false,
            value: None,
            properties: Map::new(),
        }
    }

    /// Set the `id` attribute
    #[must_use]
    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    /// Add a class
    #[must_use]
    pub fn class(mut self, class: &str) -> Self {
        let entry = self.attributes.entry("class".to_string()).or_default();
        if !entry.is_empty() {
            entry.push(' ');
        }
        entry.push_str(class);
        self
    }

    /// Set the `data-test` attribute
    #[must_use]
    pub fn data_test(self, value: &str) -> Self {
        self.attr("data-test", value)
    }

    /// Set an attribute
    #[must_use]
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    /// Set own text
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Append a child
    #[must_use]
    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Append children
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    /// Mark as `display: none`
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Stay hidden for `delay` from now
    #[must_use]
    pub fn hidden_for(self, delay: Duration) -> Self {
        self.hidden_until(Instant::now() + delay)
    }

    /// Stay hidden until `at`
    #[must_use]
    pub fn hidden_until(mut self, at: Instant) -> Self {
        self.hidden_until = Some(at);
        self
    }

    /// Mark as disabled
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Set the current value
    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set a property visible to `evaluate`
    #[must_use]
    pub fn property(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(name.to_string(), value.into());
        self
    }

    /// Whether the element itself is rendered at `now`
    #[must_use]
    pub fn renders_at(&self, now: Instant) -> bool {
        !self.hidden && self.hidden_until.map_or(true, |until| now >= until)
    }

    /// DOM `textContent`: own text then descendants' in order, `None` if
    /// no node in the subtree carries text
    #[must_use]
    pub fn text_content(&self) -> Option<String> {
        let mut out = self.text.clone();
        for child in &self.children {
            if let Some(t) = child.text_content() {
                out.get_or_insert_with(String::new).push_str(&t);
            }
        }
        out
    }

    /// Whether this is a form control accepting typed input
    #[must_use]
    pub fn is_text_input(&self) -> bool {
        self.tag == "textarea"
            || (self.tag == "input"
                && !matches!(
                    self.attributes.get("type").map(String::as_str),
                    Some("submit" | "button" | "checkbox" | "radio")
                ))
    }

    /// Values of `<option>` children
    #[must_use]
    pub fn option_values(&self) -> Vec<String> {
        self.children
            .iter()
            .filter(|c| c.tag == "option")
            .filter_map(|c| c.attributes.get("value").cloned())
            .collect()
    }
}

impl Matchable for Element {
    fn tag_name(&self) -> &str {
        &self.tag
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// A document: a root element whose descendants are queryable
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Document title
    pub title: String,
    /// Root element (`<body>`)
    pub root: Element,
}

impl Default for Document {
    fn default() -> Self {
        Self::new("", Vec::new())
    }
}

impl Document {
    /// Create a document with a `<body>` holding `children`
    #[must_use]
    pub fn new(title: &str, children: Vec<Element>) -> Self {
        Self {
            title: title.to_string(),
            root: Element::new("body").children(children),
        }
    }

    /// Element at `path`
    #[must_use]
    pub fn get(&self, path: &[usize]) -> Option<&Element> {
        let mut node = &self.root;
        for &i in path {
            node = node.children.get(i)?;
        }
        Some(node)
    }

    /// Mutable element at `path`
    pub fn get_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let mut node = &mut self.root;
        for &i in path {
            node = node.children.get_mut(i)?;
        }
        Some(node)
    }

    /// Ancestors of `path`, nearest first, root included
    fn ancestors(&self, path: &[usize]) -> Vec<&Element> {
        (0..path.len())
            .rev()
            .filter_map(|len| self.get(&path[..len]))
            .collect()
    }

    /// Resolve every node matching the locator chain, in document order
    pub fn resolve(&self, locator: &Locator) -> ShopResult<Vec<NodePath>> {
        let mut scopes: Vec<NodePath> = vec![Vec::new()];
        for step in locator.steps() {
            scopes = match step {
                LocatorStep::Css(css) => {
                    let selector = SelectorList::parse(css)?;
                    let mut found = BTreeSet::new();
                    for scope in &scopes {
                        self.collect_matches(scope, &selector, &mut found);
                    }
                    found.into_iter().collect()
                }
                LocatorStep::Nth(i) => scopes.get(*i).cloned().into_iter().collect(),
            };
        }
        Ok(scopes)
    }

    /// First match of the locator chain
    pub fn first(&self, locator: &Locator) -> ShopResult<Option<NodePath>> {
        Ok(self.resolve(locator)?.into_iter().next())
    }

    fn collect_matches(&self, scope: &[usize], selector: &SelectorList, out: &mut BTreeSet<NodePath>) {
        let Some(scope_el) = self.get(scope) else {
            return;
        };
        let mut stack: Vec<NodePath> = (0..scope_el.children.len())
            .rev()
            .map(|i| {
                let mut p = scope.to_vec();
                p.push(i);
                p
            })
            .collect();
        while let Some(path) = stack.pop() {
            let Some(el) = self.get(&path) else {
                continue;
            };
            let ancestors = self.ancestors(&path);
            if selector.matches(el, ancestors.iter().copied()) {
                out.insert(path.clone());
            }
            for i in (0..el.children.len()).rev() {
                let mut child = path.clone();
                child.push(i);
                stack.push(child);
            }
        }
    }

    /// Whether the node and all its ancestors render at `now`
    #[must_use]
    pub fn is_visible(&self, path: &[usize], now: Instant) -> bool {
        (0..=path.len()).all(|len| self.get(&path[..len]).is_some_and(|el| el.renders_at(now)))
    }
}
