//! Integration tests for tracing and event monitoring.
//!
//! This test demonstrates how to use the tracing callback system to monitor
//! registry operations, which is useful for debugging and logging.

use service_registry::{Lifetime, Registry, RegistryConfig, RegistryEvent};
use std::sync::{Arc, Mutex};

fn collect_events(registry: &Registry) -> Arc<Mutex<Vec<String>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let events_clone = events.clone();
    registry.set_trace_callback(move |event| {
        events_clone.lock().unwrap().push(format!("{}", event));
    });
    events
}

#[test]
fn test_basic_tracing() {
    let registry = Registry::new();
    let events = collect_events(&registry);

    registry.register("answer", || 42i32, Lifetime::Singleton);
    registry.resolve("answer").unwrap();
    registry.resolve("answer").unwrap();
    registry.destroy("answer");

    let captured = events.lock().unwrap();
    assert_eq!(
        *captured,
        vec![
            "register { name: answer, lifetime: Singleton, replaced: false }",
            "construct { name: answer }",
            "resolve { name: answer, found: true }",
            "resolve { name: answer, found: true }",
            "destroy { name: answer, found: true, had_instance: true }",
        ]
    );
}

#[test]
fn test_transient_emits_no_construct_event() {
    let registry = Registry::new();
    let events = collect_events(&registry);

    registry.register("job", || 1u8, Lifetime::Transient);
    registry.resolve("job").unwrap();

    let captured = events.lock().unwrap();
    assert_eq!(captured.len(), 2);
    assert!(captured.iter().all(|e| !e.starts_with("construct")));
}

#[test]
fn test_trace_resolve_found_and_not_found() {
    let registry = Registry::new();
    let events = collect_events(&registry);

    registry.register("present", || 123i64, Lifetime::Transient);
    let _ = registry.resolve("present");
    let _ = registry.resolve("absent");

    let captured = events.lock().unwrap();
    assert_eq!(captured.len(), 3);
    assert!(captured[1].contains("found: true"));
    assert!(captured[2].contains("found: false"));
}

#[test]
fn test_trace_replacement_and_unknown_destroy() {
    let registry = Registry::new();
    let events = collect_events(&registry);

    registry.register("svc", || 1u8, Lifetime::Singleton);
    registry.register("svc", || 2u8, Lifetime::Transient);
    registry.destroy("ghost");

    let captured = events.lock().unwrap();
    assert_eq!(
        *captured,
        vec![
            "register { name: svc, lifetime: Singleton, replaced: false }",
            "register { name: svc, lifetime: Transient, replaced: true }",
            "destroy { name: ghost, found: false, had_instance: false }",
        ]
    );
}

#[test]
fn test_clear_trace_callback() {
    let registry = Registry::new();
    let events = collect_events(&registry);

    // Perform operation (should be traced)
    registry.register("a", || 1u8, Lifetime::Singleton);

    registry.clear_trace_callback();

    // Perform more operations (should NOT be traced)
    registry.register("b", || 2u8, Lifetime::Singleton);
    registry.resolve("b").unwrap();

    assert_eq!(events.lock().unwrap().len(), 1);
}

#[test]
fn test_trace_callback_with_structured_matching() {
    let registry = Registry::new();
    let constructed = Arc::new(Mutex::new(Vec::new()));
    let constructed_clone = constructed.clone();

    registry.set_trace_callback(move |event| {
        if let RegistryEvent::Construct { name } = event {
            constructed_clone.lock().unwrap().push(name.clone());
        }
    });

    registry.register("db", || "conn".to_string(), Lifetime::Singleton);
    registry.register("cache", || "redis".to_string(), Lifetime::Singleton);
    registry.register("job", || 0u32, Lifetime::Transient);
    for name in ["db", "db", "job", "cache", "job"] {
        registry.resolve(name).unwrap();
    }

    assert_eq!(*constructed.lock().unwrap(), vec!["db", "cache"]);
}

#[test]
fn test_trace_callback_replacement() {
    let registry = Registry::new();
    let events1 = collect_events(&registry);
    registry.register("first", || 100usize, Lifetime::Singleton);

    let events2 = collect_events(&registry);
    registry.register("second", || 200usize, Lifetime::Singleton);

    assert_eq!(events1.lock().unwrap().len(), 1);
    assert_eq!(events2.lock().unwrap().len(), 1);
}

#[test]
fn test_clear_event_counts_services() {
    let registry = Registry::new();
    registry.register("a", || (), Lifetime::Singleton);
    registry.register("b", || (), Lifetime::Transient);
    let events = collect_events(&registry);

    registry.clear();

    assert_eq!(
        *events.lock().unwrap(),
        vec!["clear { count: 2 }"]
    );
}

#[test]
fn test_callback_can_use_the_same_registry() {
    // The callback runs with no registry lock held, so reading back is safe.
    let registry = Arc::new(Registry::new());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let (inner, seen_clone) = (registry.clone(), seen.clone());

    registry.set_trace_callback(move |event| {
        if let RegistryEvent::Register { name, .. } = event {
            seen_clone.lock().unwrap().push(inner.contains(name));
        }
    });

    registry.register("svc", || 1u8, Lifetime::Singleton);
    registry.clear_trace_callback();

    assert_eq!(*seen.lock().unwrap(), vec![true]);
}

#[test]
fn test_logging_with_subscriber_installed() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("service_registry=debug")
        .with_test_writer()
        .try_init();

    let registry = Registry::with_config(
        RegistryConfig::default()
            .label("logged")
            .log_resolutions(true),
    );
    registry.register("svc", || 1u8, Lifetime::Singleton);
    registry.resolve("svc").unwrap();
    let _ = registry.resolve("missing");
    registry.destroy("svc");
    registry.destroy("svc");

    assert!(registry.is_empty());
}
