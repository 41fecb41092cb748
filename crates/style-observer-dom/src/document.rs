//! The element tree, its declared styles and transition-start delivery.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use style_observer_core::{TransitionListener, TransitionStart};
use tracing::trace;

use super::error::{DomError, Result};
use super::style::{StyleDeclarations, initial_value, is_inherited, normalize_name};
use super::transition::{TransitionBehavior, TransitionList};

/// Identity of an element within one [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(u32);

impl ElementId {
    /// Build an id from its raw index. Ids not handed out by the document
    /// are rejected with [`DomError::UnknownElement`].
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw index.
    pub fn raw(self) -> u32 {
        self.0
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A transition that has started but not been delivered to listeners.
#[derive(Debug)]
struct PendingTransition {
    element: ElementId,
    property: String,
}

#[derive(Debug)]
struct ElementNode {
    tag: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    style: StyleDeclarations,
}

#[derive(Debug, Default)]
struct DocumentState {
    nodes: Vec<ElementNode>,
    queue: VecDeque<PendingTransition>,
}

impl DocumentState {
    fn node(&self, id: ElementId) -> Result<&ElementNode> {
        self.nodes.get(id.index()).ok_or(DomError::UnknownElement(id))
    }

    fn node_mut(&mut self, id: ElementId) -> Result<&mut ElementNode> {
        self.nodes
            .get_mut(id.index())
            .ok_or(DomError::UnknownElement(id))
    }

    /// `id` followed by all of its descendants.
    fn subtree(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            if let Some(node) = self.nodes.get(next.index()) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    fn resolve(&self, id: ElementId, name: &str) -> String {
        let Some(node) = self.nodes.get(id.index()) else {
            return String::new();
        };
        match node.style.get(name) {
            Some(value) if value.eq_ignore_ascii_case("inherit") => self.inherited(node, name),
            Some(value) if value.eq_ignore_ascii_case("initial") => initial_value(name).to_string(),
            Some(value) => value.to_string(),
            None if is_inherited(name) => self.inherited(node, name),
            None => initial_value(name).to_string(),
        }
    }

    fn inherited(&self, node: &ElementNode, name: &str) -> String {
        match node.parent {
            Some(parent) => self.resolve(parent, name),
            None => initial_value(name).to_string(),
        }
    }

    fn starts_transition(&self, id: ElementId, name: &str, before: &str, after: &str) -> bool {
        let Some(node) = self.nodes.get(id.index()) else {
            return false;
        };
        let Some(transition) = node.style.get("transition") else {
            return false;
        };
        let behaviors = node
            .style
            .get("transition-behavior")
            .map(TransitionBehavior::parse_list)
            .unwrap_or_default();
        TransitionList::parse(transition).starts_transition(&behaviors, name, before, after)
    }
}

/// An in-memory element tree with declared styles and transition events.
///
/// Style mutations never call listeners directly: transitions they start
/// are queued and delivered by [`Document::dispatch_pending`]. Tree changes
/// (`append_child`) do not start transitions.
#[derive(Default)]
pub struct Document {
    state: RefCell<DocumentState>,
    listeners: RefCell<HashMap<ElementId, Vec<TransitionListener<ElementId>>>>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Document")
            .field("elements", &state.nodes.len())
            .field("pending", &state.queue.len())
            .finish()
    }
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached element.
    pub fn create_element(&self, tag: &str) -> ElementId {
        let mut state = self.state.borrow_mut();
        let id = ElementId(state.nodes.len() as u32);
        state.nodes.push(ElementNode {
            tag: tag.to_ascii_lowercase(),
            parent: None,
            children: Vec::new(),
            style: StyleDeclarations::new(),
        });
        id
    }

    /// Number of elements ever created.
    pub fn element_count(&self) -> usize {
        self.state.borrow().nodes.len()
    }

    /// Make `child` the last child of `parent`, detaching it from any
    /// previous parent.
    pub fn append_child(&self, parent: ElementId, child: ElementId) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.node(parent)?;
        state.node(child)?;

        let mut ancestor = Some(parent);
        while let Some(id) = ancestor {
            if id == child {
                return Err(DomError::CyclicAppend { parent, child });
            }
            ancestor = state.node(id)?.parent;
        }

        if let Some(old_parent) = state.node(child)?.parent {
            state.node_mut(old_parent)?.children.retain(|c| *c != child);
        }
        state.node_mut(parent)?.children.push(child);
        state.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Tag name of `element`.
    pub fn tag_name(&self, element: ElementId) -> Result<String> {
        Ok(self.state.borrow().node(element)?.tag.clone())
    }

    /// Parent of `element`, if attached.
    pub fn parent(&self, element: ElementId) -> Result<Option<ElementId>> {
        Ok(self.state.borrow().node(element)?.parent)
    }

    /// Children of `element`, in order.
    pub fn children(&self, element: ElementId) -> Result<Vec<ElementId>> {
        Ok(self.state.borrow().node(element)?.children.clone())
    }

    /// Declare `name: value` on `element`.
    pub fn set_property(&self, element: ElementId, name: &str, value: &str) -> Result<()> {
        self.mutate(element, name, Some(value.trim()))
    }

    /// Remove the declaration of `name` from `element`.
    pub fn remove_property(&self, element: ElementId, name: &str) -> Result<()> {
        self.mutate(element, name, None)
    }

    /// Replace all of `element`'s declarations with those parsed from an
    /// inline style string.
    pub fn set_style_text(&self, element: ElementId, text: &str) -> Result<()> {
        let next = StyleDeclarations::parse(text);
        let stale: Vec<String> = self
            .state
            .borrow()
            .node(element)?
            .style
            .iter()
            .filter(|(name, _)| next.get(name).is_none())
            .map(|(name, _)| name.to_string())
            .collect();
        for name in stale {
            self.mutate(element, &name, None)?;
        }
        for (name, value) in next.iter() {
            self.mutate(element, name, Some(value))?;
        }
        Ok(())
    }

    /// `element`'s declarations as an inline style string.
    pub fn style_text(&self, element: ElementId) -> Result<String> {
        Ok(self.state.borrow().node(element)?.style.to_css_text())
    }

    /// The value declared on `element` itself.
    pub fn declared_value(&self, element: ElementId, name: &str) -> Result<Option<String>> {
        let name = normalize_name(name);
        Ok(self
            .state
            .borrow()
            .node(element)?
            .style
            .get(&name)
            .map(str::to_string))
    }

    /// The resolved value of `name` on `element`; empty if nothing applies.
    pub fn computed_value(&self, element: ElementId, name: &str) -> Result<String> {
        let state = self.state.borrow();
        state.node(element)?;
        Ok(state.resolve(element, &normalize_name(name)))
    }

    /// Number of queued transition starts.
    pub fn pending_count(&self) -> usize {
        self.state.borrow().queue.len()
    }

    /// Number of queued transition starts for `element`.
    pub fn pending_for(&self, element: ElementId) -> usize {
        self.state
            .borrow()
            .queue
            .iter()
            .filter(|pending| pending.element == element)
            .count()
    }

    /// Drop every queued transition start, returning how many there were.
    pub fn discard_pending(&self) -> usize {
        let mut state = self.state.borrow_mut();
        let count = state.queue.len();
        state.queue.clear();
        count
    }

    /// Deliver queued transition starts, including any queued by listeners
    /// along the way. Returns the number delivered.
    ///
    /// A listener error stops delivery and is returned; events not yet
    /// delivered stay queued.
    pub fn dispatch_pending(&self) -> anyhow::Result<usize> {
        let mut delivered = 0;
        loop {
            let Some(pending) = self.state.borrow_mut().queue.pop_front() else {
                break;
            };
            self.deliver(&TransitionStart::new(pending.element, pending.property))?;
            delivered += 1;
        }
        Ok(delivered)
    }

    /// Deliver a transition start to `element`'s listeners right away,
    /// whether or not any value changed.
    pub fn dispatch_transition_start(
        &self,
        element: ElementId,
        property: Option<&str>,
    ) -> anyhow::Result<()> {
        self.state.borrow().node(element)?;
        let event = TransitionStart {
            target: element,
            property_name: property.map(normalize_name),
        };
        self.deliver(&event)
    }

    /// Subscribe `listener` to transition starts on `element`. Adding the
    /// same `Rc` twice has no effect.
    pub fn add_transition_start_listener(
        &self,
        element: ElementId,
        listener: TransitionListener<ElementId>,
    ) -> Result<()> {
        self.state.borrow().node(element)?;
        let mut listeners = self.listeners.borrow_mut();
        let list = listeners.entry(element).or_default();
        if !list.iter().any(|existing| Rc::ptr_eq(existing, &listener)) {
            list.push(listener);
        }
        Ok(())
    }

    /// Unsubscribe `listener` from `element`.
    pub fn remove_transition_start_listener(
        &self,
        element: ElementId,
        listener: &TransitionListener<ElementId>,
    ) -> Result<()> {
        self.state.borrow().node(element)?;
        let mut listeners = self.listeners.borrow_mut();
        if let Some(list) = listeners.get_mut(&element) {
            list.retain(|existing| !Rc::ptr_eq(existing, listener));
            if list.is_empty() {
                listeners.remove(&element);
            }
        }
        Ok(())
    }

    /// Number of transition-start listeners on `element`.
    pub fn listener_count(&self, element: ElementId) -> usize {
        self.listeners.borrow().get(&element).map_or(0, Vec::len)
    }

    fn mutate(&self, element: ElementId, name: &str, value: Option<&str>) -> Result<()> {
        let name = normalize_name(name);
        let mut state = self.state.borrow_mut();
        state.node(element)?;

        let affected = if is_inherited(&name) {
            state.subtree(element)
        } else {
            vec![element]
        };
        let before: Vec<String> = affected.iter().map(|id| state.resolve(*id, &name)).collect();

        let style = &mut state.node_mut(element)?.style;
        match value {
            Some(value) => {
                style.set(&name, value);
            }
            None => {
                style.remove(&name);
            }
        }

        for (id, before) in affected.into_iter().zip(before) {
            let after = state.resolve(id, &name);
            if state.starts_transition(id, &name, &before, &after) {
                trace!(
                    element = %id,
                    property = %name,
                    from = %before,
                    to = %after,
                    "transition started"
                );
                state.queue.push_back(PendingTransition {
                    element: id,
                    property: name.clone(),
                });
            }
        }
        Ok(())
    }

    fn deliver(&self, event: &TransitionStart<ElementId>) -> anyhow::Result<()> {
        let snapshot = self
            .listeners
            .borrow()
            .get(&event.target)
            .cloned()
            .unwrap_or_default();
        for listener in snapshot {
            // Skip listeners removed by an earlier listener in this dispatch.
            let registered = self
                .listeners
                .borrow()
                .get(&event.target)
                .is_some_and(|list| list.iter().any(|l| Rc::ptr_eq(l, &listener)));
            if registered {
                listener(event)?;
            }
        }
        Ok(())
    }
}
