//! Change detection for computed style values, driven by transition events.
//!
//! A [`StyleObserver`] watches a fixed list of style properties (custom
//! properties included) on any number of elements. Instead of polling, it
//! gives every observed element a near-instant `step-start` transition on the
//! tracked properties, so the host emits a transition-start event whenever a
//! computed value changes. Each event triggers one update cycle: the computed
//! style is re-read, diffed against a per-element cache, and the callback is
//! invoked with the result.
//!
//! # Architecture
//!
//! ```text
//! StyleObserver
//!   ├── ObserverOptions (properties, notification mode, return format)
//!   ├── element → PropertyCache (registration + last seen values)
//!   └── TransitionListener (built once, shared by every subscription)
//!
//! StyleHost (implemented by the embedder)
//!   ├── declared style mutation
//!   ├── ComputedStyle view
//!   └── transition-start listeners
//! ```

pub mod changes;
pub mod error;
pub mod host;
pub mod observer;
pub mod options;
pub mod tracking;

pub use changes::{PropertyChange, PropertyMap, StyleChanges};
pub use error::{ObserverError, Result};
pub use host::{ComputedStyle, StyleHost, TransitionListener, TransitionStart};
pub use observer::StyleObserver;
pub use options::{NotificationMode, ObserverOptions, ReturnFormat};
pub use tracking::{TRANSITION_BEHAVIOR, TRANSITION_DURATION, TRANSITION_TIMING_FUNCTION};
