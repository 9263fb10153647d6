//! Macro for declaring an opt-in, process-wide registry.
//!
//! Registries are normally plain values passed to whoever needs them. When a host
//! application wants a global one, this macro isolates it behind an explicit
//! one-time `init` call instead of an implicit static.

/// Declares a module holding a process-wide [`Registry`](crate::Registry).
///
/// The macro generates a module containing:
/// - Storage for the registry (module-private, empty until `init`)
/// - `init(config)`: one-time setup, returns the registry
/// - `get()`: the registry, or [`RegistryError::Uninitialized`](crate::RegistryError::Uninitialized)
/// - An `Api` handle implementing [`RegistryApi`](crate::RegistryApi)
///
/// # Examples
///
/// ```rust
/// use service_registry::{define_registry, Lifetime, RegistryApi, RegistryConfig};
/// use std::sync::Arc;
///
/// define_registry!(global);
///
/// assert!(global::get().is_err());
///
/// let registry = global::init(RegistryConfig::default()).unwrap();
/// registry.register("answer", || 42i32, Lifetime::Singleton);
///
/// let value: Arc<i32> = global::API.resolve_as("answer").unwrap();
/// assert_eq!(*value, 42);
///
/// // A second init is rejected.
/// assert!(global::init(RegistryConfig::default()).is_err());
/// ```
///
/// # Multiple Registries
///
/// Each invocation owns separate storage:
///
/// ```rust
/// use service_registry::{define_registry, Lifetime, RegistryConfig};
///
/// define_registry!(database);
/// define_registry!(cache);
///
/// database::init(RegistryConfig::default().label("database")).unwrap();
/// cache::init(RegistryConfig::default().label("cache")).unwrap();
///
/// database::get().unwrap().register("url", || "postgres://".to_string(), Lifetime::Singleton);
///
/// assert!(database::get().unwrap().contains("url"));
/// assert!(!cache::get().unwrap().contains("url"));
/// ```
#[macro_export]
macro_rules! define_registry {
    ($name:ident) => {
        pub mod $name {
            use std::sync::OnceLock;

            // Empty until `init` runs (module-private)
            static REGISTRY: OnceLock<$crate::Registry> = OnceLock::new();

            /// Initializes the registry. Only the first call succeeds.
            pub fn init(
                config: $crate::RegistryConfig,
            ) -> Result<&'static $crate::Registry, $crate::RegistryError> {
                let mut fresh = false;
                let registry = REGISTRY.get_or_init(|| {
                    fresh = true;
                    $crate::Registry::with_config(config)
                });
                if fresh {
                    Ok(registry)
                } else {
                    Err($crate::RegistryError::AlreadyInitialized {
                        registry: stringify!($name),
                    })
                }
            }

            /// Returns the registry set up by `init`.
            pub fn get() -> Result<&'static $crate::Registry, $crate::RegistryError> {
                REGISTRY
                    .get()
                    .ok_or($crate::RegistryError::Uninitialized {
                        registry: stringify!($name),
                    })
            }

            /// Zero-sized handle for trait-based access.
            ///
            /// # Panics
            ///
            /// Its `RegistryApi` methods panic if `init` has not been called.
            pub struct Api;

            impl $crate::RegistryApi for Api {
                fn registry(&self) -> &$crate::Registry {
                    match get() {
                        Ok(registry) => registry,
                        Err(err) => panic!("{err}"),
                    }
                }
            }

            /// Convenient constant for accessing the registry API.
            pub const API: Api = Api;
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::{Lifetime, RegistryApi, RegistryConfig, RegistryError};
    use std::sync::Arc;

    #[test]
    fn test_define_registry_macro() {
        define_registry!(test_reg);

        assert!(matches!(
            test_reg::get(),
            Err(RegistryError::Uninitialized { registry: "test_reg" })
        ));

        let registry = test_reg::init(RegistryConfig::default().label("test_reg")).unwrap();
        registry.register("value", || 100i32, Lifetime::Singleton);

        let value: Arc<i32> = test_reg::API.resolve_as("value").unwrap();
        assert_eq!(*value, 100);
        assert_eq!(test_reg::get().unwrap().config().label, "test_reg");
    }

    #[test]
    fn test_init_only_once() {
        define_registry!(once_reg);

        once_reg::init(RegistryConfig::default()).unwrap();
        let err = once_reg::init(RegistryConfig::default().label("second")).unwrap_err();

        assert!(matches!(
            err,
            RegistryError::AlreadyInitialized { registry: "once_reg" }
        ));
        assert_eq!(once_reg::get().unwrap().config().label, "default");
    }

    #[test]
    fn test_multiple_registries() {
        define_registry!(reg_a);
        define_registry!(reg_b);

        reg_a::init(RegistryConfig::default()).unwrap();
        reg_b::init(RegistryConfig::default()).unwrap();

        reg_a::get().unwrap().register_instance("n", 1i32);
        reg_b::get().unwrap().register_instance("n", 2i32);

        assert_eq!(*reg_a::API.resolve_as::<i32>("n").unwrap(), 1);
        assert_eq!(*reg_b::API.resolve_as::<i32>("n").unwrap(), 2);
    }

    #[test]
    #[should_panic(expected = "registry `cold` used before init()")]
    fn test_api_panics_before_init() {
        define_registry!(cold);
        let _ = cold::API.resolve_as::<i32>("n");
    }
}
