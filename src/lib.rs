//! # Service Registry
//!
//! A thread-safe registry mapping string names to constructible services.
//!
//! Each service is registered with a constructor and a [`Lifetime`]:
//!
//! - **Singleton**: built once on first resolution, shared until destroyed
//! - **Transient**: built on every resolution
//! - **Scoped**: reserved; resolution fails with [`RegistryError::UnsupportedLifetime`]
//!
//! Optional init hooks run before construction and destroy hooks run before a
//! cached singleton is discarded.
//!
//! ## Quick Start
//!
//! ```rust
//! use service_registry::{Lifetime, Registry, RegistryApi, ServiceHook};
//! use std::sync::Arc;
//!
//! let registry = Registry::new();
//!
//! registry.register_with_hooks(
//!     "db",
//!     || "postgres://localhost".to_string(),
//!     Lifetime::Singleton,
//!     [ServiceHook::destroy(|| println!("closing db"))],
//! );
//!
//! let url: Arc<String> = registry.resolve_as("db").unwrap();
//! assert_eq!(&*url, "postgres://localhost");
//!
//! registry.destroy("db");
//! assert!(registry.resolve("db").unwrap_err().is_not_found());
//! ```
//!
//! ## Main Types
//!
//! - [`Registry`] - the registry itself: register, resolve, destroy
//! - [`RegistryApi`] - typed accessors (`resolve_as`, `resolve_cloned`)
//! - [`ServiceDescriptor`] / [`ServiceHook`] - registration recipes and hooks
//! - [`RegistryEvent`] - events passed to the trace callback
//! - [`define_registry!`] - opt-in process-wide registry with explicit `init`

mod config;
mod descriptor;
mod lifetime;
mod macros;
mod registry;
mod registry_error;
mod registry_event;
mod registry_trait;

pub use config::RegistryConfig;
pub use descriptor::{Hook, Instance, ServiceDescriptor, ServiceHook};
pub use lifetime::Lifetime;
pub use registry::{Registry, TraceCallback};
pub use registry_error::{BoxError, RegistryError};
pub use registry_event::RegistryEvent;
pub use registry_trait::RegistryApi;
