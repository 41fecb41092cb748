//! The style observer.
//!
//! # Usage
//!
//! ```ignore
//! use style_observer_core::{ObserverOptions, StyleObserver};
//!
//! let observer = StyleObserver::new(
//!     host.clone(),
//!     |changes| {
//!         println!("{:?}", changes.property_names());
//!         Ok(())
//!     },
//!     ObserverOptions::new(["--theme", "display"]),
//! )?;
//!
//! // Fires the callback once with the initial values.
//! observer.observe(&element)?;
//!
//! // Later changes arrive through the host's transition-start events.
//! observer.unobserve(&element);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use super::changes::{ChangeRecord, StyleChanges};
use super::error::{ObserverError, Result};
use super::host::{ComputedStyle, StyleHost, TransitionListener, TransitionStart};
use super::options::{NotificationMode, ObserverOptions};
use super::tracking;

/// Last seen value per tracked property. A missing key means the property
/// has not been read yet, which is distinct from an empty value.
type PropertyCache = HashMap<String, String>;

type Callback<E> = Box<dyn Fn(&StyleChanges<E>) -> anyhow::Result<()>>;

/// Watches computed style values on a set of elements.
///
/// Dropping the observer unobserves every element.
pub struct StyleObserver<H: StyleHost + 'static> {
    inner: Rc<ObserverInner<H>>,
}

struct ObserverInner<H: StyleHost + 'static> {
    host: H,
    options: ObserverOptions,
    /// `transition` value injected on every observed element.
    transition: String,
    callback: Callback<H::Element>,
    /// Shared by every subscription so removal always finds it.
    listener: TransitionListener<H::Element>,
    /// Registered elements. An element has a cache iff it is registered.
    elements: RefCell<HashMap<H::Element, PropertyCache>>,
}

impl<H: StyleHost + 'static> StyleObserver<H> {
    /// Create an observer that reports changes to `callback`.
    ///
    /// Fails if `options` tracks no properties. Standard property names are
    /// lowercased, and repeated names are collapsed.
    pub fn new<F>(host: H, callback: F, mut options: ObserverOptions) -> Result<Self>
    where
        F: Fn(&StyleChanges<H::Element>) -> anyhow::Result<()> + 'static,
    {
        options.normalize_properties();
        if options.properties.is_empty() {
            return Err(ObserverError::NoProperties);
        }
        let transition = tracking::transition_value(&options.properties);

        let inner = Rc::new_cyclic(|weak: &Weak<ObserverInner<H>>| {
            let weak = weak.clone();
            let listener: TransitionListener<H::Element> =
                Rc::new(move |event: &TransitionStart<H::Element>| match weak.upgrade() {
                    Some(inner) => inner.handle_transition_start(event),
                    None => Ok(()),
                });

            ObserverInner {
                host,
                options,
                transition,
                callback: Box::new(callback),
                listener,
                elements: RefCell::new(HashMap::new()),
            }
        });

        Ok(Self { inner })
    }

    /// Start observing `element`.
    ///
    /// Runs one update cycle immediately, so the callback receives the
    /// initial values (with no previous value). Observing an element that is
    /// already observed does nothing.
    ///
    /// Fails if the host refuses the subscription, in which case the element
    /// is left unobserved and untouched, or if the callback fails.
    pub fn observe(&self, element: &H::Element) -> anyhow::Result<()> {
        let inner = &self.inner;
        {
            let mut elements = inner.elements.borrow_mut();
            if elements.contains_key(element) {
                trace!(element = ?element, "already observing");
                return Ok(());
            }
            elements.insert(element.clone(), PropertyCache::new());
        }

        if let Err(err) = inner
            .host
            .add_transition_start_listener(element, Rc::clone(&inner.listener))
        {
            inner.elements.borrow_mut().remove(element);
            debug!(element = ?element, error = %err, "subscription refused");
            return Err(err);
        }
        tracking::apply(&inner.host, element, &inner.transition);
        debug!(element = ?element, properties = ?inner.options.properties, "observing element");

        inner.update(element)
    }

    /// Stop observing `element`, clearing its tracking style and cache.
    ///
    /// Does nothing if the element is not observed.
    pub fn unobserve(&self, element: &H::Element) {
        let removed = self.inner.elements.borrow_mut().remove(element).is_some();
        if removed {
            self.inner.detach(element);
        }
    }

    /// Stop observing every element.
    pub fn unobserve_all(&self) {
        // Drain first so events dispatched during teardown see nothing registered.
        let drained: Vec<H::Element> = self
            .inner
            .elements
            .borrow_mut()
            .drain()
            .map(|(element, _)| element)
            .collect();
        for element in &drained {
            self.inner.detach(element);
        }
    }

    /// Check if `element` is currently observed.
    pub fn is_observing(&self, element: &H::Element) -> bool {
        self.inner.elements.borrow().contains_key(element)
    }

    /// Number of observed elements.
    pub fn observed_count(&self) -> usize {
        self.inner.elements.borrow().len()
    }

    /// Last value seen for `property` on `element`.
    pub fn cached_value(&self, element: &H::Element, property: &str) -> Option<String> {
        self.inner
            .elements
            .borrow()
            .get(element)
            .and_then(|cache| cache.get(property))
            .cloned()
    }

    /// The options this observer was built with.
    pub fn options(&self) -> &ObserverOptions {
        &self.inner.options
    }

    /// Tracked property names, in reporting order.
    pub fn properties(&self) -> &[String] {
        &self.inner.options.properties
    }

    /// The host this observer mutates.
    pub fn host(&self) -> &H {
        &self.inner.host
    }
}

impl<H: StyleHost + 'static> Drop for StyleObserver<H> {
    fn drop(&mut self) {
        self.unobserve_all();
    }
}

impl<H: StyleHost + 'static> fmt::Debug for StyleObserver<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleObserver")
            .field("options", &self.inner.options)
            .field("observed", &self.observed_count())
            .finish()
    }
}

impl<H: StyleHost + 'static> ObserverInner<H> {
    fn detach(&self, element: &H::Element) {
        tracking::clear(&self.host, element);
        self.host.remove_transition_start_listener(element, &self.listener);
        debug!(element = ?element, "stopped observing element");
    }

    fn handle_transition_start(&self, event: &TransitionStart<H::Element>) -> anyhow::Result<()> {
        if !self.elements.borrow().contains_key(&event.target) {
            trace!(element = ?event.target, "transition on unobserved element");
            return Ok(());
        }
        if let Some(name) = event.property_name.as_deref() {
            if !self.options.tracks(name) {
                trace!(element = ?event.target, property = %name, "untracked transition");
                return Ok(());
            }
        }
        self.update(&event.target)
    }

    /// One update cycle: read, diff, cache, report.
    fn update(&self, element: &H::Element) -> anyhow::Result<()> {
        let computed = self.host.computed_style(element);
        let report_all = self.options.notification_mode == NotificationMode::All;

        let records = {
            let mut elements = self.elements.borrow_mut();
            let Some(cache) = elements.get_mut(element) else {
                return Ok(());
            };

            let mut records = Vec::new();
            for name in &self.options.properties {
                let value = computed.property_value(name);
                let previous_value = cache.get(name).cloned();
                let changed = previous_value.as_deref() != Some(value.as_str());
                if report_all || changed {
                    cache.insert(name.clone(), value.clone());
                    records.push(ChangeRecord {
                        name: name.clone(),
                        value,
                        previous_value,
                        changed,
                        element: element.clone(),
                    });
                }
            }
            records
        };

        if records.is_empty() {
            trace!(element = ?element, "no tracked property changed");
            return Ok(());
        }

        trace!(element = ?element, count = records.len(), "reporting style changes");
        let changes = StyleChanges::from_records(records, self.options.return_format);
        (self.callback)(&changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ReturnFormat;

    #[derive(Default)]
    struct FakeHost {
        declared: RefCell<HashMap<(u32, String), String>>,
        listeners: RefCell<HashMap<u32, Vec<TransitionListener<u32>>>>,
        /// Elements the host refuses to subscribe listeners on.
        foreign: RefCell<Vec<u32>>,
    }

    struct FakeComputed<'a> {
        host: &'a FakeHost,
        element: u32,
    }

    impl ComputedStyle for FakeComputed<'_> {
        fn property_value(&self, name: &str) -> String {
            self.host
                .declared
                .borrow()
                .get(&(self.element, name.to_string()))
                .cloned()
                .unwrap_or_default()
        }
    }

    impl FakeHost {
        fn declared(&self, element: u32, name: &str) -> Option<String> {
            self.declared
                .borrow()
                .get(&(element, name.to_string()))
                .cloned()
        }

        fn listener_count(&self, element: u32) -> usize {
            self.listeners.borrow().get(&element).map_or(0, Vec::len)
        }

        /// Set a value and fire a transition-start for it.
        fn change(&self, element: u32, name: &str, value: &str) -> anyhow::Result<()> {
            self.set_style_property(&element, name, value);
            self.fire(element, Some(name))
        }

        fn fire(&self, element: u32, name: Option<&str>) -> anyhow::Result<()> {
            let listeners = self
                .listeners
                .borrow()
                .get(&element)
                .cloned()
                .unwrap_or_default();
            let event = TransitionStart {
                target: element,
                property_name: name.map(str::to_string),
            };
            for listener in listeners {
                listener(&event)?;
            }
            Ok(())
        }
    }

    impl StyleHost for FakeHost {
        type Element = u32;
        type Computed<'a> = FakeComputed<'a>;

        fn set_style_property(&self, element: &u32, name: &str, value: &str) {
            self.declared
                .borrow_mut()
                .insert((*element, name.to_string()), value.to_string());
        }

        fn remove_style_property(&self, element: &u32, name: &str) {
            self.declared
                .borrow_mut()
                .remove(&(*element, name.to_string()));
        }

        fn computed_style<'a>(&'a self, element: &u32) -> FakeComputed<'a> {
            FakeComputed {
                host: self,
                element: *element,
            }
        }

        fn add_transition_start_listener(
            &self,
            element: &u32,
            listener: TransitionListener<u32>,
        ) -> anyhow::Result<()> {
            if self.foreign.borrow().contains(element) {
                anyhow::bail!("unknown element {element}");
            }
            let mut listeners = self.listeners.borrow_mut();
            let list = listeners.entry(*element).or_default();
            if !list.iter().any(|l| Rc::ptr_eq(l, &listener)) {
                list.push(listener);
            }
            Ok(())
        }

        fn remove_transition_start_listener(
            &self,
            element: &u32,
            listener: &TransitionListener<u32>,
        ) {
            if let Some(list) = self.listeners.borrow_mut().get_mut(element) {
                list.retain(|l| !Rc::ptr_eq(l, listener));
            }
        }
    }

    type Calls = Rc<RefCell<Vec<StyleChanges<u32>>>>;

    fn observer(
        host: &Rc<FakeHost>,
        options: ObserverOptions,
    ) -> (StyleObserver<Rc<FakeHost>>, Calls) {
        let calls: Calls = Rc::default();
        let sink = Rc::clone(&calls);
        let observer = StyleObserver::new(
            Rc::clone(host),
            move |changes| {
                sink.borrow_mut().push(changes.clone());
                Ok(())
            },
            options,
        )
        .unwrap();
        (observer, calls)
    }

    #[test]
    fn test_rejects_empty_properties() {
        let host = Rc::new(FakeHost::default());
        let options = ObserverOptions::new(Vec::<String>::new());
        let result = StyleObserver::new(host, |_| Ok(()), options);
        assert_eq!(result.err(), Some(ObserverError::NoProperties));
    }

    #[test]
    fn test_observe_applies_tracking_style() {
        let host = Rc::new(FakeHost::default());
        let (observer, _calls) = observer(&host, ObserverOptions::new(["--a", "display"]));

        observer.observe(&1).unwrap();

        assert_eq!(
            host.declared(1, "transition").as_deref(),
            Some("--a 0.001ms step-start, display 0.001ms step-start")
        );
        assert_eq!(host.declared(1, "transition-behavior").as_deref(), Some("allow-discrete"));
        assert_eq!(host.listener_count(1), 1);
        assert!(observer.is_observing(&1));
    }

    #[test]
    fn test_refused_subscription_leaves_element_unobserved() {
        let host = Rc::new(FakeHost::default());
        host.foreign.borrow_mut().push(7);
        let (observer, calls) = observer(&host, ObserverOptions::new(["--a"]));

        let err = observer.observe(&7).unwrap_err();
        assert_eq!(err.to_string(), "unknown element 7");
        assert!(!observer.is_observing(&7));
        assert_eq!(host.declared(7, "transition"), None);
        assert!(calls.borrow().is_empty());

        // The element can be observed once the host accepts it.
        host.foreign.borrow_mut().clear();
        observer.observe(&7).unwrap();
        assert!(observer.is_observing(&7));
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn test_observe_is_idempotent() {
        let host = Rc::new(FakeHost::default());
        host.set_style_property(&1, "--a", "0");
        let (observer, calls) = observer(&host, ObserverOptions::new(["--a"]));

        observer.observe(&1).unwrap();
        observer.observe(&1).unwrap();

        assert_eq!(calls.borrow().len(), 1);
        assert_eq!(host.listener_count(1), 1);
        assert_eq!(observer.observed_count(), 1);
        assert_eq!(observer.cached_value(&1, "--a").as_deref(), Some("0"));
    }

    #[test]
    fn test_first_observation_has_no_previous_value() {
        let host = Rc::new(FakeHost::default());
        host.set_style_property(&1, "--a", "0");
        let (observer, calls) = observer(&host, ObserverOptions::new(["--a", "--unset"]));

        observer.observe(&1).unwrap();

        let calls = calls.borrow();
        let details = calls[0].details().unwrap();
        let a = details.get("--a").unwrap();
        assert_eq!(a.value, "0");
        assert_eq!(a.previous_value, None);
        assert!(a.changed);

        // An unset property is still reported once, as an empty value.
        let unset = details.get("--unset").unwrap();
        assert_eq!(unset.value, "");
        assert!(unset.changed);
    }

    #[test]
    fn test_never_observed_differs_from_empty() {
        let host = Rc::new(FakeHost::default());
        let (observer, calls) = observer(&host, ObserverOptions::new(["--a"]));

        assert_eq!(observer.cached_value(&1, "--a"), None);
        observer.observe(&1).unwrap();
        assert_eq!(observer.cached_value(&1, "--a").as_deref(), Some(""));

        host.fire(1, Some("--a")).unwrap();
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn test_changed_only_suppresses_unchanged() {
        let host = Rc::new(FakeHost::default());
        host.set_style_property(&1, "--a", "0");
        host.set_style_property(&1, "--b", "x");
        let (observer, calls) = observer(&host, ObserverOptions::new(["--a", "--b"]));
        observer.observe(&1).unwrap();

        host.change(1, "--a", "0").unwrap();
        assert_eq!(calls.borrow().len(), 1);

        host.change(1, "--a", "1").unwrap();
        let calls = calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].property_names(), vec!["--a"]);
    }

    #[test]
    fn test_all_mode_reports_every_property() {
        let host = Rc::new(FakeHost::default());
        host.set_style_property(&1, "--a", "0");
        host.set_style_property(&1, "--b", "x");
        let options = ObserverOptions::new(["--a", "--b"])
            .with_notification_mode(NotificationMode::All);
        let (observer, calls) = observer(&host, options);
        observer.observe(&1).unwrap();

        host.change(1, "--a", "1").unwrap();
        host.fire(1, Some("--b")).unwrap();

        let calls = calls.borrow();
        assert_eq!(calls.len(), 3);
        for call in calls.iter() {
            assert_eq!(call.property_names(), vec!["--a", "--b"]);
        }
        let details = calls[1].details().unwrap();
        assert!(details.get("--a").unwrap().changed);
        assert!(!details.get("--b").unwrap().changed);
        assert_eq!(details.get("--b").unwrap().previous_value.as_deref(), Some("x"));
    }

    #[test]
    fn test_value_only_format() {
        let host = Rc::new(FakeHost::default());
        host.set_style_property(&1, "--x", "1");
        let options = ObserverOptions::new(["--x"]).with_return_format(ReturnFormat::ValueOnly);
        let (observer, calls) = observer(&host, options);
        observer.observe(&1).unwrap();

        host.change(1, "--x", "2").unwrap();

        let calls = calls.borrow();
        let values = calls[1].values().unwrap();
        assert_eq!(values.get("--x").map(String::as_str), Some("2"));
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn test_untracked_event_is_ignored() {
        let host = Rc::new(FakeHost::default());
        let (observer, calls) = observer(&host, ObserverOptions::new(["--a"]));
        observer.observe(&1).unwrap();

        // --a changes without its own event; an untracked event must not pick it up.
        host.set_style_property(&1, "--a", "changed");
        host.fire(1, Some("opacity")).unwrap();
        assert_eq!(calls.borrow().len(), 1);
        assert_eq!(observer.cached_value(&1, "--a").as_deref(), Some(""));

        // An event without a property name runs a cycle.
        host.fire(1, None).unwrap();
        assert_eq!(calls.borrow().len(), 2);
    }

    #[test]
    fn test_per_element_isolation() {
        let host = Rc::new(FakeHost::default());
        host.set_style_property(&1, "--a", "one");
        host.set_style_property(&2, "--a", "two");
        let (observer, calls) = observer(&host, ObserverOptions::new(["--a"]));
        observer.observe(&1).unwrap();
        observer.observe(&2).unwrap();

        host.change(2, "--a", "two-b").unwrap();

        let calls = calls.borrow();
        assert_eq!(calls.len(), 3);
        let change = calls[2].details().unwrap().get("--a").unwrap();
        assert_eq!(change.element, 2);
        assert_eq!(change.previous_value.as_deref(), Some("two"));
        assert_eq!(observer.cached_value(&1, "--a").as_deref(), Some("one"));
    }

    #[test]
    fn test_unobserve_tears_down() {
        let host = Rc::new(FakeHost::default());
        let (observer, calls) = observer(&host, ObserverOptions::new(["--a"]));
        observer.observe(&1).unwrap();

        observer.unobserve(&1);
        observer.unobserve(&1);

        assert!(!observer.is_observing(&1));
        assert_eq!(observer.cached_value(&1, "--a"), None);
        assert_eq!(host.declared(1, "transition"), None);
        assert_eq!(host.declared(1, "transition-behavior"), None);
        assert_eq!(host.listener_count(1), 0);

        host.change(1, "--a", "1").unwrap();
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn test_late_event_after_unobserve_is_ignored() {
        let host = Rc::new(FakeHost::default());
        let (observer, calls) = observer(&host, ObserverOptions::new(["--a"]));
        observer.observe(&1).unwrap();
        let listener = host.listeners.borrow()[&1][0].clone();

        observer.unobserve(&1);
        host.set_style_property(&1, "--a", "1");
        listener(&TransitionStart::new(1, "--a")).unwrap();

        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn test_unobserve_all() {
        let host = Rc::new(FakeHost::default());
        let (observer, calls) = observer(&host, ObserverOptions::new(["--a"]));
        observer.observe(&1).unwrap();
        observer.observe(&2).unwrap();

        observer.unobserve_all();

        assert_eq!(observer.observed_count(), 0);
        host.change(1, "--a", "1").unwrap();
        host.change(2, "--a", "1").unwrap();
        assert_eq!(calls.borrow().len(), 2);
        assert_eq!(host.listener_count(1) + host.listener_count(2), 0);
    }

    #[test]
    fn test_drop_detaches() {
        let host = Rc::new(FakeHost::default());
        {
            let (observer, _calls) = observer(&host, ObserverOptions::new(["--a"]));
            observer.observe(&1).unwrap();
        }
        assert_eq!(host.listener_count(1), 0);
        assert_eq!(host.declared(1, "transition"), None);
    }

    #[test]
    fn test_callback_error_propagates() {
        let host = Rc::new(FakeHost::default());
        let observer = StyleObserver::new(
            Rc::clone(&host),
            |changes| match changes.value("--a") {
                Some("bad") => anyhow::bail!("rejected --a"),
                _ => Ok(()),
            },
            ObserverOptions::new(["--a"]),
        )
        .unwrap();
        observer.observe(&1).unwrap();

        let err = host.change(1, "--a", "bad").unwrap_err();
        assert_eq!(err.to_string(), "rejected --a");
        // The cache was updated before the callback ran.
        assert_eq!(observer.cached_value(&1, "--a").as_deref(), Some("bad"));
    }

    #[test]
    fn test_callback_may_reenter_observer() {
        let host = Rc::new(FakeHost::default());
        let slot: Rc<RefCell<Option<Rc<StyleObserver<Rc<FakeHost>>>>>> = Rc::default();
        let handle = Rc::clone(&slot);
        let observer = Rc::new(
            StyleObserver::new(
                Rc::clone(&host),
                move |changes| {
                    if changes.value("--a") == Some("stop") {
                        if let Some(observer) = handle.borrow().as_ref() {
                            observer.unobserve(&1);
                        }
                    }
                    Ok(())
                },
                ObserverOptions::new(["--a"]),
            )
            .unwrap(),
        );
        *slot.borrow_mut() = Some(Rc::clone(&observer));

        observer.observe(&1).unwrap();
        host.change(1, "--a", "stop").unwrap();

        assert!(!observer.is_observing(&1));
        slot.borrow_mut().take();
    }

    #[test]
    fn test_duplicate_properties_reported_once() {
        let host = Rc::new(FakeHost::default());
        let options = ObserverOptions::new(["--a", "--a"])
            .with_notification_mode(NotificationMode::All);
        let (observer, calls) = observer(&host, options);
        observer.observe(&1).unwrap();

        assert_eq!(observer.properties(), ["--a".to_string()]);
        assert_eq!(calls.borrow()[0].len(), 1);
    }

    #[test]
    fn test_blank_properties_are_rejected() {
        let host = Rc::new(FakeHost::default());
        let result = StyleObserver::new(host, |_| Ok(()), ObserverOptions::new(["", "  "]));
        assert_eq!(result.err(), Some(ObserverError::NoProperties));
    }

    #[test]
    fn test_mixed_case_standard_name_tracks_host_events() {
        let host = Rc::new(FakeHost::default());
        host.set_style_property(&1, "display", "block");
        let (observer, calls) = observer(&host, ObserverOptions::new(["Display"]));
        observer.observe(&1).unwrap();
        assert_eq!(observer.properties(), ["display".to_string()]);

        host.change(1, "display", "none").unwrap();

        let calls = calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].value("display"), Some("none"));
    }
}
