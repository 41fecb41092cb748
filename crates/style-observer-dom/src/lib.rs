//! In-memory element tree that implements [`StyleHost`].
//!
//! This is a reference host for driving a
//! [`StyleObserver`](style_observer_core::StyleObserver) without a browser:
//! - **Declared style**: per-element declarations, set one at a time or from
//!   an inline `style` string
//! - **Computed style**: declared value, inheritance for inherited properties,
//!   then a small table of initial values
//! - **Transitions**: a declaration change that alters a computed value
//!   queues a transition-start when the element's `transition` list covers it
//! - **Events**: queued transition-starts are delivered by
//!   [`Document::dispatch_pending`]
//!
//! # Usage
//!
//! ```ignore
//! use std::rc::Rc;
//! use style_observer_dom::Document;
//!
//! let document = Rc::new(Document::new());
//! let panel = document.create_element("div");
//! document.set_property(panel, "--state", "idle")?;
//!
//! // ... observe `panel` ...
//!
//! document.set_property(panel, "--state", "busy")?;
//! document.dispatch_pending()?;
//! ```

pub mod document;
pub mod error;
pub mod host;
pub mod style;
pub mod transition;

pub use document::{Document, ElementId};
pub use error::{DomError, Result};
pub use host::ComputedStyleView;
pub use style::StyleDeclarations;
pub use transition::{TransitionBehavior, TransitionEntry, TransitionList, TransitionProperty};

pub use style_observer_core::StyleHost;
