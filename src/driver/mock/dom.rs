//! In-memory DOM backing the mock driver
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. Removing a subtree
//! detaches it instead of freeing it, so handles that still point at it report
//! a stale element the way a browser does after a re-render.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use super::selector;
use crate::driver::keys::Key;
use crate::driver::locator::By;
use crate::{Error, Result};

/// Arena index of a node
pub type NodeId = usize;

/// Callback run when an event reaches a node
///
/// The handler receives the DOM mutably and the id of the node it is
/// registered on, so it can re-render any part of the tree.
pub type EventHandler = Arc<dyn Fn(&mut MockDom, NodeId) + Send + Sync>;

/// DOM events the mock dispatches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomEvent {
    Click,
    DoubleClick,
    Submit,
    Change,
    Input,
}

/// One dispatched event, kept for assertions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    /// Node the event was dispatched at
    pub target: NodeId,
    pub event: DomEvent,
}

struct MockNode {
    tag: String,
    attrs: BTreeMap<String, String>,
    text: String,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    attached: bool,
    displayed: bool,
    select_all: bool,
    handlers: HashMap<DomEvent, EventHandler>,
}

/// Declarative description of a subtree to insert
#[derive(Clone, Default)]
pub struct NodeSpec {
    tag: String,
    attrs: BTreeMap<String, String>,
    text: String,
    hidden: bool,
    children: Vec<NodeSpec>,
    handlers: Vec<(DomEvent, EventHandler)>,
}

impl NodeSpec {
    pub fn new<S: Into<String>>(tag: S) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Default::default()
        }
    }

    /// Append one or more space separated class tokens
    pub fn class(mut self, class: &str) -> Self {
        let merged = match self.attrs.get("class") {
            Some(existing) if !existing.is_empty() => format!("{} {}", existing, class),
            _ => class.to_string(),
        };
        self.attrs.insert("class".to_string(), merged);
        self
    }

    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    pub fn attr<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn text<S: Into<String>>(mut self, text: S) -> Self {
        self.text = text.into();
        self
    }

    /// Render the node with `display: none`
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn child(mut self, child: NodeSpec) -> Self {
        self.children.push(child);
        self
    }

    pub fn children<I: IntoIterator<Item = NodeSpec>>(mut self, children: I) -> Self {
        self.children.extend(children);
        self
    }

    pub fn on<F>(mut self, event: DomEvent, handler: F) -> Self
    where
        F: Fn(&mut MockDom, NodeId) + Send + Sync + 'static,
    {
        self.handlers.push((event, Arc::new(handler)));
        self
    }
}

impl fmt::Debug for NodeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeSpec")
            .field("tag", &self.tag)
            .field("attrs", &self.attrs)
            .field("text", &self.text)
            .field("children", &self.children.len())
            .finish()
    }
}

/// In-memory document
pub struct MockDom {
    nodes: Vec<MockNode>,
    root: NodeId,
    focused: Option<NodeId>,
    events: Vec<EventRecord>,
    sent_keys: Vec<String>,
}

impl MockDom {
    /// Create a document holding an empty `<html>` root
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            root: 0,
            focused: None,
            events: Vec::new(),
            sent_keys: Vec::new(),
        };
        dom.root = dom.insert(None, NodeSpec::new("html"));
        dom
    }

    /// Root node
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Append a subtree under `parent` and return the id of its top node
    pub fn append(&mut self, parent: NodeId, spec: NodeSpec) -> NodeId {
        let id = self.insert(Some(parent), spec);
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(id);
        }
        id
    }

    fn insert(&mut self, parent: Option<NodeId>, spec: NodeSpec) -> NodeId {
        let id = self.nodes.len();
        let attached = parent.map_or(true, |p| self.is_attached(p));
        self.nodes.push(MockNode {
            tag: spec.tag,
            attrs: spec.attrs,
            text: spec.text,
            children: Vec::new(),
            parent,
            attached,
            displayed: !spec.hidden,
            select_all: false,
            handlers: spec.handlers.into_iter().collect(),
        });
        for child in spec.children {
            let child_id = self.insert(Some(id), child);
            self.nodes[id].children.push(child_id);
        }
        id
    }

    /// Detach every child of `parent`
    pub fn clear_children(&mut self, parent: NodeId) {
        let children = match self.nodes.get_mut(parent) {
            Some(node) => std::mem::take(&mut node.children),
            None => return,
        };
        for child in children {
            self.detach(child);
        }
    }

    /// Detach one node and its subtree
    pub fn remove(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes.get(node).and_then(|n| n.parent) {
            self.nodes[parent].children.retain(|c| *c != node);
        }
        self.detach(node);
    }

    fn detach(&mut self, node: NodeId) {
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let entry = &mut self.nodes[current];
            entry.attached = false;
            stack.extend(entry.children.iter().copied());
            if self.focused == Some(current) {
                self.focused = None;
            }
        }
    }

    pub fn is_attached(&self, node: NodeId) -> bool {
        self.nodes.get(node).map_or(false, |n| n.attached)
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node).map(|n| n.tag.as_str())
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|n| n.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes.get(node).map_or(&[], |n| n.children.as_slice())
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes
            .get(node)
            .and_then(|n| n.attrs.get(name))
            .map(String::as_str)
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.attrs.insert(name.to_string(), value.to_string());
        }
    }

    pub fn remove_attr(&mut self, node: NodeId, name: &str) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.attrs.remove(name);
        }
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.attr(node, "class")
            .map_or(false, |c| c.split_whitespace().any(|t| t == class))
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if self.has_class(node, class) {
            return;
        }
        let merged = match self.attr(node, "class") {
            Some(existing) if !existing.is_empty() => format!("{} {}", existing, class),
            _ => class.to_string(),
        };
        self.set_attr(node, "class", &merged);
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(existing) = self.attr(node, "class") {
            let kept: Vec<&str> = existing.split_whitespace().filter(|t| *t != class).collect();
            let kept = kept.join(" ");
            self.set_attr(node, "class", &kept);
        }
    }

    /// Own text of the node, without descendants
    pub fn own_text(&self, node: NodeId) -> &str {
        self.nodes.get(node).map_or("", |n| n.text.as_str())
    }

    pub fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.text = text.to_string();
        }
    }

    pub fn set_displayed(&mut self, node: NodeId, displayed: bool) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.displayed = displayed;
        }
    }

    /// Whether the node and all of its ancestors are displayed
    pub fn is_displayed(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            match self.nodes.get(id) {
                Some(n) if n.displayed => current = n.parent,
                _ => return false,
            }
        }
        true
    }

    pub fn is_enabled(&self, node: NodeId) -> bool {
        self.attr(node, "disabled").is_none()
    }

    /// Rendered text: visible own and descendant text, one line per node
    pub fn rendered_text(&self, node: NodeId) -> String {
        if !self.is_displayed(node) {
            return String::new();
        }
        let mut lines = Vec::new();
        self.collect_text(node, true, &mut lines);
        lines.join("\n")
    }

    /// Concatenated text of the subtree including hidden nodes
    pub fn text_content(&self, node: NodeId) -> String {
        let mut parts = Vec::new();
        self.collect_text(node, false, &mut parts);
        parts.concat()
    }

    fn collect_text(&self, node: NodeId, visible_only: bool, out: &mut Vec<String>) {
        let Some(n) = self.nodes.get(node) else {
            return;
        };
        if visible_only && !n.displayed {
            return;
        }
        let own = n.text.trim();
        if !own.is_empty() {
            out.push(own.to_string());
        }
        for child in &n.children {
            self.collect_text(*child, visible_only, out);
        }
    }

    pub fn on<F>(&mut self, node: NodeId, event: DomEvent, handler: F)
    where
        F: Fn(&mut MockDom, NodeId) + Send + Sync + 'static,
    {
        if let Some(n) = self.nodes.get_mut(node) {
            n.handlers.insert(event, Arc::new(handler));
        }
    }

    /// Nodes under `scope` (or the whole document) matching the locator
    pub fn find(&self, scope: Option<NodeId>, by: &By) -> Result<Vec<NodeId>> {
        selector::select(self, scope, by)
    }

    /// First node in the document matching the locator
    pub fn find_first(&self, by: &By) -> Option<NodeId> {
        self.find(None, by).ok().and_then(|found| found.into_iter().next())
    }

    /// Attached nodes below `node` in document order
    pub(crate) fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Dispatch an event at `target`, bubbling to the nearest handler
    pub fn dispatch(&mut self, target: NodeId, event: DomEvent) {
        self.events.push(EventRecord { target, event });
        let mut current = Some(target);
        while let Some(id) = current {
            let handler = self.nodes.get(id).and_then(|n| n.handlers.get(&event).cloned());
            if let Some(handler) = handler {
                handler(self, id);
                return;
            }
            current = self.parent(id);
        }
    }

    pub(crate) fn ensure_attached(&self, node: NodeId) -> Result<()> {
        if self.is_attached(node) {
            Ok(())
        } else {
            Err(Error::stale_element(format!("mock-{}", node)))
        }
    }

    /// Click a node the way a pointer does: focus it, then dispatch
    pub fn click(&mut self, node: NodeId) -> Result<()> {
        self.ensure_attached(node)?;
        if !self.is_displayed(node) {
            return Err(Error::element_not_interactable(format!(
                "mock-{} is not displayed",
                node
            )));
        }
        self.focus(node);
        self.dispatch(node, DomEvent::Click);
        Ok(())
    }

    pub fn focus(&mut self, node: NodeId) {
        if self.focused != Some(node) {
            if let Some(previous) = self.focused.and_then(|f| self.nodes.get_mut(f)) {
                previous.select_all = false;
            }
        }
        self.focused = Some(node);
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// Current `value` of a form field
    pub fn value(&self, node: NodeId) -> &str {
        self.attr(node, "value").unwrap_or("")
    }

    /// Type a key sequence into the focused node
    pub fn type_keys(&mut self, keys: &str) {
        self.sent_keys.push(keys.to_string());
        let Some(target) = self.focused else {
            return;
        };

        let mut modifier_held = false;
        for ch in keys.chars() {
            match Key::from_code_point(ch) {
                Some(Key::Null) => modifier_held = false,
                Some(Key::Control) | Some(Key::Command) => modifier_held = true,
                Some(key) if key.is_modifier() => {}
                Some(Key::Enter) => self.dispatch(target, DomEvent::Submit),
                Some(Key::Delete) | Some(Key::Backspace) => {
                    let mut value = self.value(target).to_string();
                    if self.take_select_all(target) {
                        value.clear();
                    } else if Key::from_code_point(ch) == Some(Key::Backspace) {
                        value.pop();
                    }
                    self.set_attr(target, "value", &value);
                    self.dispatch(target, DomEvent::Input);
                }
                Some(_) => {}
                None if modifier_held => {
                    if ch.eq_ignore_ascii_case(&'a') {
                        if let Some(n) = self.nodes.get_mut(target) {
                            n.select_all = true;
                        }
                    }
                }
                None => {
                    let mut value = if self.take_select_all(target) {
                        String::new()
                    } else {
                        self.value(target).to_string()
                    };
                    value.push(ch);
                    self.set_attr(target, "value", &value);
                    self.dispatch(target, DomEvent::Input);
                }
            }
        }
    }

    fn take_select_all(&mut self, node: NodeId) -> bool {
        self.nodes
            .get_mut(node)
            .map_or(false, |n| std::mem::replace(&mut n.select_all, false))
    }

    /// Select an `<option>` of a `<select>` by its visible text
    pub fn select_option(&mut self, select: NodeId, text: &str) -> Result<bool> {
        self.ensure_attached(select)?;
        let options = self.options(select);
        let Some(option) = options
            .into_iter()
            .find(|o| self.own_text(*o).trim() == text)
        else {
            return Ok(false);
        };

        for other in self.options(select) {
            self.remove_attr(other, "selected");
        }
        self.set_attr(option, "selected", "true");
        let value = self
            .attr(option, "value")
            .map(str::to_string)
            .unwrap_or_else(|| text.to_string());
        self.set_attr(select, "value", &value);
        self.dispatch(select, DomEvent::Change);
        Ok(true)
    }

    /// `<option>` descendants of a `<select>`
    pub fn options(&self, select: NodeId) -> Vec<NodeId> {
        self.descendants(select)
            .into_iter()
            .filter(|n| self.tag(*n) == Some("option"))
            .collect()
    }

    /// Every event dispatched so far
    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    /// Number of times `event` was dispatched at `node`
    pub fn count_events(&self, node: NodeId, event: DomEvent) -> usize {
        self.events
            .iter()
            .filter(|r| r.target == node && r.event == event)
            .count()
    }

    /// Targets of every click, in order
    pub fn clicked(&self) -> Vec<NodeId> {
        self.events
            .iter()
            .filter(|r| r.event == DomEvent::Click)
            .map(|r| r.target)
            .collect()
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Raw key sequences received, in order
    pub fn sent_keys(&self) -> &[String] {
        &self.sent_keys
    }
}

impl Default for MockDom {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MockDom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockDom")
            .field("nodes", &self.nodes.len())
            .field("focused", &self.focused)
            .field("events", &self.events.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_clear_children_detaches_subtree() {
        let mut dom = MockDom::new();
        let list = dom.append(dom.root(), NodeSpec::new("ul"));
        let item = dom.append(list, NodeSpec::new("li").child(NodeSpec::new("span").text("a")));
        let span = dom.children(item)[0];

        dom.clear_children(list);

        assert!(dom.is_attached(list));
        assert!(!dom.is_attached(item));
        assert!(!dom.is_attached(span));
        assert!(matches!(dom.click(item), Err(Error::StaleElement(_))));
    }

    #[test]
    fn test_click_bubbles_to_nearest_handler() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let mut dom = MockDom::new();
        let button = dom.append(
            dom.root(),
            NodeSpec::new("div")
                .on(DomEvent::Click, move |_, _| {
                    counter.fetch_add(1, Ordering::SeqCst);
                })
                .child(NodeSpec::new("span").text("Save")),
        );
        let label = dom.children(button)[0];

        dom.click(label).unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(dom.clicked(), vec![label]);
    }

    #[test]
    fn test_hidden_node_is_not_clickable_and_has_no_text() {
        let mut dom = MockDom::new();
        let node = dom.append(dom.root(), NodeSpec::new("div").text("secret").hidden());

        assert!(matches!(dom.click(node), Err(Error::ElementNotInteractable(_))));
        assert_eq!(dom.rendered_text(node), "");
        assert_eq!(dom.text_content(node), "secret");
    }

    #[test]
    fn test_select_all_then_type_replaces_value() {
        let mut dom = MockDom::new();
        let input = dom.append(dom.root(), NodeSpec::new("input").attr("value", "41"));
        dom.focus(input);

        dom.type_keys(&format!("{}a{}", Key::Control, Key::Null));
        dom.type_keys(&Key::Delete.to_string());
        assert_eq!(dom.value(input), "");

        dom.type_keys("7");
        dom.type_keys("5");
        assert_eq!(dom.value(input), "75");
    }

    #[test]
    fn test_select_option_sets_value_and_fires_change() {
        let mut dom = MockDom::new();
        let select = dom.append(
            dom.root(),
            NodeSpec::new("select").children([
                NodeSpec::new("option").attr("value", "10").text("10"),
                NodeSpec::new("option").attr("value", "25").text("25"),
            ]),
        );

        assert!(dom.select_option(select, "25").unwrap());
        assert!(!dom.select_option(select, "50").unwrap());
        assert_eq!(dom.value(select), "25");
        assert_eq!(dom.count_events(select, DomEvent::Change), 1);
    }
}
