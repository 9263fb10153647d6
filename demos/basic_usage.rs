//! Basic usage example for service-registry.
//!
//! Demonstrates:
//! - Registering singleton and transient services
//! - Attaching init and destroy hooks
//! - Typed retrieval with `resolve_as()` (returns `Arc<T>`)
//! - Tearing services down with `destroy()`
//!
//! Run with: `cargo run --example basic_usage`

use service_registry::{define_registry, Lifetime, RegistryApi, RegistryConfig, ServiceHook};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

// Process-wide registry for this example, set up explicitly in main
define_registry!(app);

#[derive(Debug)]
struct AppConfig {
    name: String,
    debug_mode: bool,
}

#[derive(Debug)]
struct RequestId(u32);

static NEXT_REQUEST: AtomicU32 = AtomicU32::new(1);

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("service_registry=debug")
        .init();

    println!("=== service-registry: Basic Usage ===\n");

    let registry = match app::init(RegistryConfig::default().label("demo").log_resolutions(true)) {
        Ok(registry) => registry,
        Err(err) => {
            eprintln!("{err}");
            return;
        }
    };
    registry.set_trace_callback(|event| println!("   [trace] {event}"));

    // -------------------------------------------------------------------------
    // 1. Register a singleton with hooks
    // -------------------------------------------------------------------------
    println!("1. Registering a singleton...");

    registry.register_with_hooks(
        "config",
        || AppConfig {
            name: "MyApp".to_string(),
            debug_mode: true,
        },
        Lifetime::Singleton,
        [
            ServiceHook::init(|| println!("   init hook: loading config")),
            ServiceHook::destroy(|| println!("   destroy hook: releasing config")),
        ],
    );

    // -------------------------------------------------------------------------
    // 2. Register a transient
    // -------------------------------------------------------------------------
    println!("\n2. Registering a transient...");

    registry.register(
        "request_id",
        || RequestId(NEXT_REQUEST.fetch_add(1, Ordering::SeqCst)),
        Lifetime::Transient,
    );

    // -------------------------------------------------------------------------
    // 3. Resolve
    // -------------------------------------------------------------------------
    println!("\n3. Resolving...");

    let first: Arc<AppConfig> = app::API.must_resolve_as("config");
    let second: Arc<AppConfig> = app::API.must_resolve_as("config");
    println!(
        "   config: {} (debug: {}), same instance: {}",
        first.name,
        first.debug_mode,
        Arc::ptr_eq(&first, &second)
    );

    for _ in 0..2 {
        match app::API.resolve_as::<RequestId>("request_id") {
            Ok(id) => println!("   request id: {}", id.0),
            Err(err) => println!("   error: {err}"),
        }
    }

    // -------------------------------------------------------------------------
    // 4. Destroy
    // -------------------------------------------------------------------------
    println!("\n4. Destroying config...");

    registry.destroy("config");
    match registry.resolve("config") {
        Ok(_) => println!("   unexpected: config still resolvable"),
        Err(err) => println!("   after destroy: {err}"),
    }

    println!("\n=== Example completed successfully! ===");
}
