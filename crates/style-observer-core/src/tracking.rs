//! The transition declarations that turn value changes into events.
//!
//! Each tracked property gets `<property> 0.001ms step-start`. The value
//! switches at the very start of the interval, so a transition-start event
//! fires almost immediately after any change. `allow-discrete` extends this
//! to properties that cannot interpolate (custom properties, `display`, ...).
//!
//! Any `transition` or `transition-behavior` already declared on the element
//! is overwritten on observe and removed on unobserve; prior values are not
//! restored.

use super::host::StyleHost;

/// Duration of the injected transitions.
pub const TRANSITION_DURATION: &str = "0.001ms";

/// Timing function of the injected transitions.
pub const TRANSITION_TIMING_FUNCTION: &str = "step-start";

/// `transition-behavior` value applied while observing.
pub const TRANSITION_BEHAVIOR: &str = "allow-discrete";

/// Build the `transition` value for `properties`.
pub fn transition_value(properties: &[String]) -> String {
    properties
        .iter()
        .map(|property| format!("{property} {TRANSITION_DURATION} {TRANSITION_TIMING_FUNCTION}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Apply the tracking declarations to `element`.
pub(crate) fn apply<H: StyleHost>(host: &H, element: &H::Element, transition: &str) {
    host.set_style_property(element, "transition", transition);
    host.set_style_property(element, "transition-behavior", TRANSITION_BEHAVIOR);
}

/// Remove the tracking declarations from `element`.
pub(crate) fn clear<H: StyleHost>(host: &H, element: &H::Element) {
    host.remove_style_property(element, "transition");
    host.remove_style_property(element, "transition-behavior");
}
