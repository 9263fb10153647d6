//! Typed access to a registry.
//!
//! This module provides the `RegistryApi` trait with default implementations that
//! recover concrete types from the registry's type-erased instances. A stored value
//! whose type differs from the caller's expectation yields
//! [`RegistryError::TypeMismatch`] instead of an unchecked cast.

use std::sync::Arc;

use crate::{Registry, RegistryError};

/// Typed accessors over a [`Registry`].
///
/// Only [`RegistryApi::registry`] must be implemented. `Registry` implements it for
/// itself, and registries created with [`define_registry!`](crate::define_registry)
/// expose an `Api` handle implementing it.
///
/// # Examples
///
/// ```rust
/// use service_registry::{Lifetime, Registry, RegistryApi};
/// use std::sync::Arc;
///
/// let registry = Registry::new();
/// registry.register("port", || 8080u16, Lifetime::Singleton);
///
/// let port: Arc<u16> = registry.resolve_as("port").unwrap();
/// assert_eq!(*port, 8080);
/// assert!(registry.resolve_as::<String>("port").is_err());
/// ```
pub trait RegistryApi {
    /// Access the underlying registry.
    fn registry(&self) -> &Registry;

    /// Resolve `name` and downcast it to `T`.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::TypeMismatch`] when the stored value is not a `T`
    /// - everything [`Registry::resolve`] returns
    fn resolve_as<T: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>, RegistryError> {
        self.registry()
            .resolve(name)?
            .downcast::<T>()
            .map_err(|_| RegistryError::TypeMismatch {
                name: name.to_owned(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Resolve `name` as `T`, panicking on any failure.
    ///
    /// # Panics
    ///
    /// Panics with the error's description when resolution or the downcast fails.
    #[track_caller]
    fn must_resolve_as<T: Send + Sync + 'static>(&self, name: &str) -> Arc<T> {
        match self.resolve_as::<T>(name) {
            Ok(value) => value,
            Err(err) => panic!("failed to resolve service: {err}"),
        }
    }

    /// Resolve `name` as `T` and return an owned clone of the value.
    fn resolve_cloned<T: Send + Sync + Clone + 'static>(
        &self,
        name: &str,
    ) -> Result<T, RegistryError> {
        let arc = self.resolve_as::<T>(name)?;
        Ok((*arc).clone())
    }
}

impl RegistryApi for Registry {
    fn registry(&self) -> &Registry {
        self
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
