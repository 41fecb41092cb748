/// Example program to print the loaded configuration
///
/// Run with: cargo run -p style-observer-config --example print_config

use style_observer_config::{DemoStep, StyleObserverConfig};

fn main() {
    let config = StyleObserverConfig::load();

    println!("=== Style Observer Configuration ===\n");

    println!("Observer Settings:");
    println!("  Properties: {:?}", config.observer.properties);
    println!("  Notification Mode: {:?}", config.observer.notification_mode);
    println!("  Return Format: {:?}", config.observer.return_format);
    println!();

    println!("Demo Settings:");
    println!("  Observe: {:?}", config.demo.observe);
    for (index, step) in config.demo.steps.iter().enumerate() {
        let line = match step {
            DemoStep::Set {
                element,
                property,
                value,
            } => format!("set {element} {property}: {value}"),
            DemoStep::Remove { element, property } => format!("remove {element} {property}"),
            DemoStep::Unobserve { element: Some(element) } => format!("unobserve {element}"),
            DemoStep::Unobserve { element: None } => "unobserve all".to_string(),
        };
        println!("  {:>2}. {}", index + 1, line);
    }
    println!();

    println!("Logging Settings:");
    println!("  Filter: {:?}", config.logging.filter);
}
