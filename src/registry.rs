//! A thread-safe, name-keyed service registry.
//!
//! Services are registered under a string name together with a constructor and a
//! [`Lifetime`]. Singletons are built on first resolution and cached until they are
//! destroyed; transients are built on every resolution.
//!
//! # Lock discipline
//!
//! One `parking_lot::RwLock` guards both the descriptor table and the instance
//! table.
//!
//! - Cached singletons and transient descriptors are looked up under a read lock.
//!   Transient hooks and constructors run after the lock is released.
//! - An uncached singleton is built under an upgradable read lock: the cache is
//!   re-checked, the init hook and constructor run, and the guard is upgraded to
//!   insert the instance. Only one upgradable guard can exist at a time, so the
//!   constructor of a singleton never runs twice for the same cached entry.
//! - `register`, `destroy` and `clear` hold the write lock while they edit the
//!   tables and run destroy hooks. Removed instances are dropped after it is released.
//! - Lifetime-checked accessors compare the lifetime under the guard that serves
//!   the instance.
//!
//! Singleton constructors and all hooks run while a lock is held and must not call
//! back into the same registry's mutating or first-construction paths.
//!
//! # Examples
//!
//! ```
//! use service_registry::{Lifetime, Registry};
//!
//! let registry = Registry::new();
//! registry.register("greeting", || "Hello, World!".to_string(), Lifetime::Singleton);
//!
//! let greeting = registry.resolve("greeting").unwrap();
//! assert_eq!(greeting.downcast_ref::<String>().unwrap(), "Hello, World!");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock, RwLockUpgradableReadGuard};
use tracing::{debug, info, warn};

use crate::descriptor::{Instance, ServiceDescriptor, ServiceHook};
use crate::{BoxError, Lifetime, RegistryConfig, RegistryError, RegistryEvent};

/// Type alias for the user-supplied tracing callback.
///
/// The callback receives a reference to a `RegistryEvent` every time the registry is
/// interacted with. It is invoked with no registry lock held.
pub type TraceCallback = dyn Fn(&RegistryEvent) + Send + Sync + 'static;

#[derive(Default)]
struct RegistryState {
    descriptors: HashMap<String, ServiceDescriptor>,
    instances: HashMap<String, Instance>,
}

/// Registry of named services.
///
/// Share it between threads behind an `Arc` or a `'static` reference; every
/// method takes `&self`.
pub struct Registry {
    config: RegistryConfig,
    state: RwLock<RegistryState>,
    trace: Mutex<Option<Arc<TraceCallback>>>,
}

impl Registry {
    /// Creates an empty registry with the default configuration.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Creates an empty registry. The config label tags every log line it emits.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            state: RwLock::new(RegistryState::default()),
            trace: Mutex::new(None),
        }
    }

    /// The configuration this registry was created with.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // -------------------------------------------------------------------------------------------------
    // Tracing
    // -------------------------------------------------------------------------------------------------

    /// Sets a tracing callback that will be invoked on every registry interaction.
    ///
    /// Replaces any previously set callback.
    ///
    /// # Example
    /// ```rust
    /// use service_registry::Registry;
    ///
    /// let registry = Registry::new();
    /// registry.set_trace_callback(|event| println!("[registry-trace] {event}"));
    /// ```
    pub fn set_trace_callback(&self, callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
        *self.trace.lock() = Some(Arc::new(callback));
    }

    /// Clears the tracing callback. Registered services are not affected.
    pub fn clear_trace_callback(&self) {
        *self.trace.lock() = None;
    }

    fn emit_event(&self, event: RegistryEvent) {
        // Clone the callback out so it runs without the trace lock held.
        let callback = self.trace.lock().clone();
        if let Some(callback) = callback {
            callback(&event);
        }
    }

    // -------------------------------------------------------------------------------------------------
    // Registration
    // -------------------------------------------------------------------------------------------------

    /// Registers a service under `name`, replacing any earlier registration.
    ///
    /// A singleton instance cached under the old registration is evicted without
    /// running its destroy hook. The next resolution builds a fresh instance.
    ///
    /// # Examples
    ///
    /// ```
    /// use service_registry::{Lifetime, Registry};
    ///
    /// let registry = Registry::new();
    /// registry.register("answer", || 42i32, Lifetime::Transient);
    /// assert!(registry.contains("answer"));
    /// ```
    pub fn register<T, F>(&self, name: impl Into<String>, constructor: F, lifetime: Lifetime)
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.register_descriptor(name, ServiceDescriptor::new(constructor, lifetime));
    }

    /// Registers a service with zero or more hook attachments.
    ///
    /// # Examples
    ///
    /// ```
    /// use service_registry::{Lifetime, Registry, ServiceHook};
    ///
    /// let registry = Registry::new();
    /// registry.register_with_hooks(
    ///     "pool",
    ///     || vec![0u8; 16],
    ///     Lifetime::Singleton,
    ///     [
    ///         ServiceHook::init(|| println!("opening pool")),
    ///         ServiceHook::destroy(|| println!("closing pool")),
    ///     ],
    /// );
    /// ```
    pub fn register_with_hooks<T, F>(
        &self,
        name: impl Into<String>,
        constructor: F,
        lifetime: Lifetime,
        hooks: impl IntoIterator<Item = ServiceHook>,
    ) where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let descriptor = hooks
            .into_iter()
            .fold(ServiceDescriptor::new(constructor, lifetime), ServiceDescriptor::with_hook);
        self.register_descriptor(name, descriptor);
    }

    /// Registers a service whose constructor may fail.
    ///
    /// A constructor error is returned from [`Registry::resolve`] as
    /// [`RegistryError::ConstructorFailure`]; a failed singleton is not cached.
    pub fn register_fallible<T, E, F>(
        &self,
        name: impl Into<String>,
        constructor: F,
        lifetime: Lifetime,
        hooks: impl IntoIterator<Item = ServiceHook>,
    ) where
        T: Send + Sync + 'static,
        E: Into<BoxError>,
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        let descriptor = hooks.into_iter().fold(
            ServiceDescriptor::fallible(constructor, lifetime),
            ServiceDescriptor::with_hook,
        );
        self.register_descriptor(name, descriptor);
    }

    /// Registers an already built value as a singleton.
    ///
    /// The instance is cached immediately. After a `destroy` the name is gone; it is
    /// not rebuilt.
    pub fn register_instance<T: Send + Sync + 'static>(&self, name: impl Into<String>, value: T) {
        self.register_instance_arc(name, Arc::new(value));
    }

    /// Registers an `Arc`-wrapped value as a singleton without re-wrapping it.
    pub fn register_instance_arc<T: Send + Sync + 'static>(
        &self,
        name: impl Into<String>,
        value: Arc<T>,
    ) {
        let instance: Instance = value;
        let cached = instance.clone();
        let descriptor = ServiceDescriptor::from_constructor(
            Arc::new(move || -> Result<Instance, BoxError> { Ok(cached.clone()) }),
            Lifetime::Singleton,
        );
        self.store(name.into(), descriptor, Some(instance));
    }

    /// Registers a prebuilt [`ServiceDescriptor`].
    pub fn register_descriptor(&self, name: impl Into<String>, descriptor: ServiceDescriptor) {
        self.store(name.into(), descriptor, None);
    }

    fn store(&self, name: String, descriptor: ServiceDescriptor, instance: Option<Instance>) {
        let lifetime = descriptor.lifetime;

        let (previous, evicted) = {
            let mut state = self.state.write();
            let previous = state.descriptors.insert(name.clone(), descriptor);
            let evicted = match instance {
                Some(instance) => state.instances.insert(name.clone(), instance),
                None => state.instances.remove(&name),
            };
            (previous, evicted)
        };
        let replaced = previous.is_some();

        if lifetime == Lifetime::Scoped {
            warn!(
                registry = %self.config.label,
                service_name = %name,
                "Scoped lifetime is not supported, resolution will fail"
            );
        }
        if evicted.is_some() {
            warn!(
                registry = %self.config.label,
                service_name = %name,
                "Stale singleton instance evicted by re-registration"
            );
        }
        info!(
            registry = %self.config.label,
            service_name = %name,
            lifetime = %lifetime,
            replaced,
            "Service registered"
        );

        self.emit_event(RegistryEvent::Register {
            name,
            lifetime,
            replaced,
        });

        // The stale instance is dropped here, outside the lock.
        drop(evicted);
        drop(previous);
    }

    /// Attaches an init hook to an already registered service.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] if nothing is registered under `name`.
    pub fn set_init_hook(
        &self,
        name: &str,
        hook: impl Fn() + Send + Sync + 'static,
    ) -> Result<(), RegistryError> {
        self.attach_hook(name, ServiceHook::init(hook))
    }

    /// Attaches a destroy hook to an already registered service.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] if nothing is registered under `name`.
    pub fn set_destroy_hook(
        &self,
        name: &str,
        hook: impl Fn() + Send + Sync + 'static,
    ) -> Result<(), RegistryError> {
        self.attach_hook(name, ServiceHook::destroy(hook))
    }

    /// Attaches any [`ServiceHook`] to an already registered service.
    pub fn attach_hook(&self, name: &str, hook: ServiceHook) -> Result<(), RegistryError> {
        let kind = match hook {
            ServiceHook::Init(_) => "init",
            ServiceHook::Destroy(_) => "destroy",
        };

        {
            let mut state = self.state.write();
            let descriptor = state
                .descriptors
                .get_mut(name)
                .ok_or_else(|| RegistryError::not_found(name))?;
            *descriptor = descriptor.clone().with_hook(hook);
        }

        info!(
            registry = %self.config.label,
            service_name = %name,
            hook = kind,
            "Hook attached"
        );
        Ok(())
    }

    // -------------------------------------------------------------------------------------------------
    // Resolution
    // -------------------------------------------------------------------------------------------------

    /// Resolves the service registered under `name`.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotFound`] when nothing is registered under `name`
    /// - [`RegistryError::UnsupportedLifetime`] for a [`Lifetime::Scoped`] service
    /// - [`RegistryError::InitHookFailure`] / [`RegistryError::ConstructorFailure`]
    ///   when a fallible hook or constructor fails
    ///
    /// # Examples
    ///
    /// ```
    /// use service_registry::{Lifetime, Registry};
    /// use std::sync::Arc;
    ///
    /// let registry = Registry::new();
    /// registry.register("config", || vec!["a", "b"], Lifetime::Singleton);
    ///
    /// let first = registry.resolve("config").unwrap();
    /// let second = registry.resolve("config").unwrap();
    /// assert!(Arc::ptr_eq(&first, &second));
    ///
    /// assert!(registry.resolve("missing").unwrap_err().is_not_found());
    /// ```
    pub fn resolve(&self, name: &str) -> Result<Instance, RegistryError> {
        self.resolve_checked(name, None)
    }

    fn resolve_checked(
        &self,
        name: &str,
        expected: Option<Lifetime>,
    ) -> Result<Instance, RegistryError> {
        let result = self.lookup(name, expected);

        if self.config.log_resolutions {
            debug!(
                registry = %self.config.label,
                service_name = %name,
                found = result.is_ok(),
                "Service resolved"
            );
        }
        self.emit_event(RegistryEvent::Resolve {
            name: name.to_owned(),
            found: result.is_ok(),
        });

        result
    }

    /// Resolves `name`, panicking if resolution fails.
    ///
    /// Use only for services whose absence is a startup configuration defect.
    ///
    /// # Panics
    ///
    /// Panics with the underlying error's description on any resolution failure.
    #[track_caller]
    pub fn must_resolve(&self, name: &str) -> Instance {
        match self.resolve(name) {
            Ok(instance) => instance,
            Err(err) => panic!("failed to resolve service: {err}"),
        }
    }

    /// Resolves `name`, requiring it to be registered as a singleton.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnsupportedOperation`] if the service has another lifetime,
    /// plus everything [`Registry::resolve`] returns.
    pub fn resolve_singleton(&self, name: &str) -> Result<Instance, RegistryError> {
        self.resolve_checked(name, Some(Lifetime::Singleton))
    }

    /// Resolves `name`, requiring it to be registered as a transient.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnsupportedOperation`] if the service has another lifetime,
    /// plus everything [`Registry::resolve`] returns.
    pub fn resolve_transient(&self, name: &str) -> Result<Instance, RegistryError> {
        self.resolve_checked(name, Some(Lifetime::Transient))
    }

    // The lifetime is checked against the descriptor read under the same guard that
    // serves the instance, so a concurrent re-registration cannot slip in between.
    fn lookup(&self, name: &str, expected: Option<Lifetime>) -> Result<Instance, RegistryError> {
        let descriptor = {
            let state = self.state.read();
            let descriptor = state
                .descriptors
                .get(name)
                .ok_or_else(|| RegistryError::not_found(name))?;
            check_lifetime(name, expected, descriptor.lifetime)?;
            // Only singletons ever have an instance entry.
            if let Some(instance) = state.instances.get(name) {
                return Ok(instance.clone());
            }
            descriptor.clone()
        };

        self.build(name, descriptor, expected)
    }

    fn build(
        &self,
        name: &str,
        descriptor: ServiceDescriptor,
        expected: Option<Lifetime>,
    ) -> Result<Instance, RegistryError> {
        match descriptor.lifetime {
            Lifetime::Singleton => self.build_singleton(name, expected),
            Lifetime::Transient => build_unlocked(name, &descriptor),
            Lifetime::Scoped => Err(RegistryError::UnsupportedLifetime {
                name: name.to_owned(),
                lifetime: Lifetime::Scoped,
            }),
        }
    }

    fn build_singleton(
        &self,
        name: &str,
        expected: Option<Lifetime>,
    ) -> Result<Instance, RegistryError> {
        let state = self.state.upgradable_read();

        // The descriptor may have been replaced or destroyed between our read and
        // this lock.
        let descriptor = match state.descriptors.get(name) {
            Some(descriptor) => descriptor.clone(),
            None => return Err(RegistryError::not_found(name)),
        };
        check_lifetime(name, expected, descriptor.lifetime)?;

        // Another caller may have built it in that window.
        if let Some(instance) = state.instances.get(name) {
            return Ok(instance.clone());
        }
        if descriptor.lifetime != Lifetime::Singleton {
            drop(state);
            return self.build(name, descriptor, expected);
        }

        descriptor
            .run_init_hook()
            .map_err(|source| RegistryError::InitHookFailure {
                name: name.to_owned(),
                source,
            })?;
        let instance = descriptor
            .construct()
            .map_err(|source| RegistryError::ConstructorFailure {
                name: name.to_owned(),
                source,
            })?;

        let mut state = RwLockUpgradableReadGuard::upgrade(state);
        state.instances.insert(name.to_owned(), instance.clone());
        drop(state);

        info!(
            registry = %self.config.label,
            service_name = %name,
            lifetime = %Lifetime::Singleton,
            "Singleton service initialized"
        );
        self.emit_event(RegistryEvent::Construct {
            name: name.to_owned(),
        });

        Ok(instance)
    }

    // -------------------------------------------------------------------------------------------------
    // Teardown
    // -------------------------------------------------------------------------------------------------

    /// Removes the service registered under `name`.
    ///
    /// If a singleton instance is cached, the destroy hook runs before the instance
    /// is discarded. Unknown names are a no-op. A failing destroy hook is logged and
    /// teardown still completes.
    ///
    /// # Examples
    ///
    /// ```
    /// use service_registry::{Lifetime, Registry};
    ///
    /// let registry = Registry::new();
    /// registry.register("db", || "conn".to_string(), Lifetime::Singleton);
    /// registry.destroy("db");
    /// registry.destroy("db"); // no-op
    /// assert!(registry.resolve("db").unwrap_err().is_not_found());
    /// ```
    pub fn destroy(&self, name: &str) {
        let mut state = self.state.write();

        let Some(descriptor) = state.descriptors.remove(name) else {
            drop(state);
            warn!(
                registry = %self.config.label,
                service_name = %name,
                "Service not found during destroy"
            );
            self.emit_event(RegistryEvent::Destroy {
                name: name.to_owned(),
                found: false,
                had_instance: false,
            });
            return;
        };

        let had_instance = state.instances.contains_key(name);
        let instance = if had_instance {
            self.run_destroy_hook(name, &descriptor);
            state.instances.remove(name)
        } else {
            None
        };
        drop(state);
        // Instance drop glue may read the registry, so it runs unlocked.
        drop(instance);

        info!(
            registry = %self.config.label,
            service_name = %name,
            lifetime = %descriptor.lifetime,
            had_instance,
            "Service destroyed"
        );
        self.emit_event(RegistryEvent::Destroy {
            name: name.to_owned(),
            found: true,
            had_instance,
        });
    }

    /// Destroys every registered service.
    ///
    /// Destroy hooks run for every cached singleton instance. The tracing callback is
    /// kept.
    pub fn clear(&self) {
        let (descriptors, instances) = {
            let mut state = self.state.write();
            let descriptors = std::mem::take(&mut state.descriptors);
            let instances = std::mem::take(&mut state.instances);

            for (name, descriptor) in &descriptors {
                if instances.contains_key(name) {
                    self.run_destroy_hook(name, descriptor);
                }
            }
            (descriptors, instances)
        };
        let count = descriptors.len();
        drop(instances);
        drop(descriptors);

        info!(registry = %self.config.label, count, "Registry cleared");
        self.emit_event(RegistryEvent::Clear { count });
    }

    fn run_destroy_hook(&self, name: &str, descriptor: &ServiceDescriptor) {
        if let Err(err) = descriptor.run_destroy_hook() {
            warn!(
                registry = %self.config.label,
                service_name = %name,
                error = %err,
                "Destroy hook failed, continuing teardown"
            );
        }
    }

    // -------------------------------------------------------------------------------------------------
    // Introspection
    // -------------------------------------------------------------------------------------------------

    /// Whether a descriptor is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.state.read().descriptors.contains_key(name)
    }

    /// Lifetime of the service registered under `name`.
    pub fn lifetime_of(&self, name: &str) -> Option<Lifetime> {
        self.state
            .read()
            .descriptors
            .get(name)
            .map(ServiceDescriptor::lifetime)
    }

    /// Whether a singleton instance is currently cached under `name`.
    pub fn is_instantiated(&self, name: &str) -> bool {
        self.state.read().instances.contains_key(name)
    }

    /// Registered service names, sorted.
    pub fn service_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state.read().descriptors.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Number of registered services, instantiated or not.
    pub fn len(&self) -> usize {
        self.state.read().descriptors.len()
    }

    /// Whether no service is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn check_lifetime(
    name: &str,
    expected: Option<Lifetime>,
    actual: Lifetime,
) -> Result<(), RegistryError> {
    match expected {
        Some(expected) if expected != actual => Err(RegistryError::UnsupportedOperation {
            name: name.to_owned(),
            expected,
            actual,
        }),
        _ => Ok(()),
    }
}

fn build_unlocked(name: &str, descriptor: &ServiceDescriptor) -> Result<Instance, RegistryError> {
    descriptor
        .run_init_hook()
        .map_err(|source| RegistryError::InitHookFailure {
            name: name.to_owned(),
            source,
        })?;
    descriptor
        .construct()
        .map_err(|source| RegistryError::ConstructorFailure {
            name: name.to_owned(),
            source,
        })
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("Registry")
            .field("label", &self.config.label)
            .field("services", &state.descriptors.len())
            .field("instances", &state.instances.len())
            .finish()
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
