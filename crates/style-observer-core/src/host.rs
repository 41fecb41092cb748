//! The environment an observer runs against.
//!
//! The observer never touches elements directly. Everything it needs (style
//! mutation, computed values, transition events) goes through [`StyleHost`].

use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

/// A transition-start notification delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionStart<E> {
    /// The element whose transition started.
    pub target: E,
    /// The property that transitioned, if the host reports it.
    pub property_name: Option<String>,
}

impl<E> TransitionStart<E> {
    /// Create an event for a specific property.
    pub fn new(target: E, property_name: impl Into<String>) -> Self {
        Self {
            target,
            property_name: Some(property_name.into()),
        }
    }

    /// Create an event that does not name a property.
    pub fn anonymous(target: E) -> Self {
        Self {
            target,
            property_name: None,
        }
    }
}

/// Handler for transition-start events.
///
/// Hosts compare listeners by `Rc` identity, so removing a listener requires
/// the same `Rc` that was added.
pub type TransitionListener<E> = Rc<dyn Fn(&TransitionStart<E>) -> anyhow::Result<()>>;

/// Resolved style values for one element.
pub trait ComputedStyle {
    /// Resolved value of `name`, or an empty string if it is unset or
    /// does not apply.
    fn property_value(&self, name: &str) -> String;
}

/// Style and event primitives supplied by the embedding environment.
pub trait StyleHost {
    /// Element identity. Used as a map key by the observer.
    type Element: Clone + Eq + Hash + fmt::Debug;

    /// Computed-style view returned by [`StyleHost::computed_style`].
    type Computed<'a>: ComputedStyle
    where
        Self: 'a;

    /// Set a declaration in the element's own style.
    fn set_style_property(&self, element: &Self::Element, name: &str, value: &str);

    /// Remove a declaration from the element's own style.
    fn remove_style_property(&self, element: &Self::Element, name: &str);

    /// Query the element's computed style.
    fn computed_style<'a>(&'a self, element: &Self::Element) -> Self::Computed<'a>;

    /// Subscribe `listener` to transition-start events on `element`.
    ///
    /// Fails if the host cannot deliver events for `element`, for example
    /// because it does not know the element.
    fn add_transition_start_listener(
        &self,
        element: &Self::Element,
        listener: TransitionListener<Self::Element>,
    ) -> anyhow::Result<()>;

    /// Unsubscribe a listener previously passed to
    /// [`StyleHost::add_transition_start_listener`].
    fn remove_transition_start_listener(
        &self,
        element: &Self::Element,
        listener: &TransitionListener<Self::Element>,
    );
}

impl<H: StyleHost> StyleHost for Rc<H> {
    type Element = H::Element;
    type Computed<'a>
        = H::Computed<'a>
    where
        Self: 'a;

    fn set_style_property(&self, element: &Self::Element, name: &str, value: &str) {
        (**self).set_style_property(element, name, value);
    }

    fn remove_style_property(&self, element: &Self::Element, name: &str) {
        (**self).remove_style_property(element, name);
    }

    fn computed_style<'a>(&'a self, element: &Self::Element) -> Self::Computed<'a> {
        (**self).computed_style(element)
    }

    fn add_transition_start_listener(
        &self,
        element: &Self::Element,
        listener: TransitionListener<Self::Element>,
    ) -> anyhow::Result<()> {
        (**self).add_transition_start_listener(element, listener)
    }

    fn remove_transition_start_listener(
        &self,
        element: &Self::Element,
        listener: &TransitionListener<Self::Element>,
    ) {
        (**self).remove_transition_start_listener(element, listener);
    }
}
