//! Demo driver: builds a small document, observes it and replays the
//! configured style mutations, printing each callback payload as JSON.

use std::collections::HashMap;
use std::rc::Rc;

use anyhow::{Context, Result};
use style_observer_config::{DemoStep, StyleObserverConfig};
use style_observer_core::{NotificationMode, ObserverOptions, ReturnFormat, StyleObserver};
use style_observer_dom::{Document, ElementId};

fn main() -> Result<()> {
    let config = StyleObserverConfig::load();
    init_logging(config.logging.filter.as_deref());

    let document = Rc::new(Document::new());
    let elements = build_document(&document)?;

    let options = observer_options(&config);
    log::info!(
        "tracking {:?} (mode: {}, format: {})",
        options.properties,
        options.notification_mode.as_str(),
        options.return_format.as_str()
    );

    let observer = StyleObserver::new(
        Rc::clone(&document),
        |changes| {
            println!("{}", serde_json::to_string(changes)?);
            Ok(())
        },
        options,
    )?;

    for name in &config.demo.observe {
        let element = lookup(&elements, name)?;
        log::info!("observe {name}");
        observer.observe(&element)?;
    }

    for step in &config.demo.steps {
        match step {
            DemoStep::Set {
                element,
                property,
                value,
            } => {
                log::info!("set {element} {property}: {value}");
                document.set_property(lookup(&elements, element)?, property, value)?;
            }
            DemoStep::Remove { element, property } => {
                log::info!("remove {element} {property}");
                document.remove_property(lookup(&elements, element)?, property)?;
            }
            DemoStep::Unobserve {
                element: Some(element),
            } => {
                log::info!("unobserve {element}");
                observer.unobserve(&lookup(&elements, element)?);
            }
            DemoStep::Unobserve { element: None } => {
                log::info!("unobserve all");
                observer.unobserve_all();
            }
        }
        let delivered = document.dispatch_pending()?;
        log::debug!("delivered {delivered} transition event(s)");
    }

    Ok(())
}

fn init_logging(filter: Option<&str>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(filter) = filter {
        builder.parse_filters(filter);
    }
    let _ = builder.try_init();
}

/// `panel` (a section) containing `badge` (a span).
fn build_document(document: &Document) -> Result<HashMap<String, ElementId>> {
    let panel = document.create_element("section");
    let badge = document.create_element("span");
    document.append_child(panel, badge)?;
    document.set_style_text(panel, "--state: idle; display: block")?;
    document.set_style_text(badge, "display: inline-block")?;

    Ok(HashMap::from([
        ("panel".to_string(), panel),
        ("badge".to_string(), badge),
    ]))
}

fn observer_options(config: &StyleObserverConfig) -> ObserverOptions {
    let mut options = ObserverOptions::new(config.observer.properties.iter().cloned());
    if let Some(mode) = config.observer.notification_mode.as_deref() {
        options = options.with_notification_mode(NotificationMode::from(mode));
    }
    if let Some(format) = config.observer.return_format.as_deref() {
        options = options.with_return_format(ReturnFormat::from(format));
    }
    options
}

fn lookup(elements: &HashMap<String, ElementId>, name: &str) -> Result<ElementId> {
    elements
        .get(name)
        .copied()
        .with_context(|| format!("unknown demo element `{name}`"))
}
