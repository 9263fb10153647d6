//! Service descriptors: the registered recipe for producing a service.
//!
//! A descriptor pairs a type-erased constructor with a [`Lifetime`] and two
//! optional hooks. Everything inside is reference counted so the registry can
//! clone a descriptor out of its lock and run the constructor unlocked.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::{BoxError, Lifetime};

/// A type-erased service instance as stored and returned by the registry.
pub type Instance = Arc<dyn Any + Send + Sync>;

pub(crate) type Constructor = Arc<dyn Fn() -> Result<Instance, BoxError> + Send + Sync>;

/// A zero-argument init or destroy procedure.
pub type Hook = Arc<dyn Fn() -> Result<(), BoxError> + Send + Sync>;

/// An optional hook attachment passed to
/// [`Registry::register_with_hooks`](crate::Registry::register_with_hooks).
#[derive(Clone)]
pub enum ServiceHook {
    /// Runs before every construction of the service.
    Init(Hook),
    /// Runs when a cached singleton instance is destroyed.
    Destroy(Hook),
}

impl ServiceHook {
    pub fn init(hook: impl Fn() + Send + Sync + 'static) -> Self {
        ServiceHook::Init(infallible(hook))
    }

    /// Init hook that may fail. A failure aborts the resolution with
    /// [`RegistryError::InitHookFailure`](crate::RegistryError::InitHookFailure).
    pub fn try_init<E>(hook: impl Fn() -> Result<(), E> + Send + Sync + 'static) -> Self
    where
        E: Into<BoxError>,
    {
        ServiceHook::Init(fallible(hook))
    }

    pub fn destroy(hook: impl Fn() + Send + Sync + 'static) -> Self {
        ServiceHook::Destroy(infallible(hook))
    }

    /// Destroy hook that may fail. Failures are logged and teardown continues.
    pub fn try_destroy<E>(hook: impl Fn() -> Result<(), E> + Send + Sync + 'static) -> Self
    where
        E: Into<BoxError>,
    {
        ServiceHook::Destroy(fallible(hook))
    }
}

impl fmt::Debug for ServiceHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceHook::Init(_) => f.write_str("ServiceHook::Init"),
            ServiceHook::Destroy(_) => f.write_str("ServiceHook::Destroy"),
        }
    }
}

fn infallible(hook: impl Fn() + Send + Sync + 'static) -> Hook {
    Arc::new(move || -> Result<(), BoxError> {
        hook();
        Ok(())
    })
}

fn fallible<E: Into<BoxError>>(hook: impl Fn() -> Result<(), E> + Send + Sync + 'static) -> Hook {
    Arc::new(move || -> Result<(), BoxError> { hook().map_err(Into::into) })
}

/// Constructor, lifetime and hooks registered under one service name.
///
/// # Examples
///
/// ```rust
/// use service_registry::{Lifetime, Registry, ServiceDescriptor};
///
/// let registry = Registry::new();
/// let descriptor = ServiceDescriptor::new(|| 8080u16, Lifetime::Singleton)
///     .with_init_hook(|| println!("binding port"));
/// registry.register_descriptor("port", descriptor);
/// assert!(registry.contains("port"));
/// ```
#[derive(Clone)]
pub struct ServiceDescriptor {
    pub(crate) constructor: Constructor,
    pub(crate) lifetime: Lifetime,
    pub(crate) init_hook: Option<Hook>,
    pub(crate) destroy_hook: Option<Hook>,
}

impl ServiceDescriptor {
    pub fn new<T, F>(constructor: F, lifetime: Lifetime) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::from_constructor(
            Arc::new(move || -> Result<Instance, BoxError> {
                Ok(Arc::new(constructor()) as Instance)
            }),
            lifetime,
        )
    }

    /// Descriptor whose constructor may fail. The error surfaces as
    /// [`RegistryError::ConstructorFailure`](crate::RegistryError::ConstructorFailure).
    pub fn fallible<T, E, F>(constructor: F, lifetime: Lifetime) -> Self
    where
        T: Send + Sync + 'static,
        E: Into<BoxError>,
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        Self::from_constructor(
            Arc::new(move || -> Result<Instance, BoxError> {
                constructor()
                    .map(|value| Arc::new(value) as Instance)
                    .map_err(Into::into)
            }),
            lifetime,
        )
    }

    pub(crate) fn from_constructor(constructor: Constructor, lifetime: Lifetime) -> Self {
        Self {
            constructor,
            lifetime,
            init_hook: None,
            destroy_hook: None,
        }
    }

    pub fn with_init_hook(self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.with_hook(ServiceHook::init(hook))
    }

    pub fn with_destroy_hook(self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.with_hook(ServiceHook::destroy(hook))
    }

    /// Attach a hook. A later hook of the same kind replaces the earlier one.
    pub fn with_hook(mut self, hook: ServiceHook) -> Self {
        match hook {
            ServiceHook::Init(hook) => self.init_hook = Some(hook),
            ServiceHook::Destroy(hook) => self.destroy_hook = Some(hook),
        }
        self
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    pub fn has_init_hook(&self) -> bool {
        self.init_hook.is_some()
    }

    pub fn has_destroy_hook(&self) -> bool {
        self.destroy_hook.is_some()
    }

    pub(crate) fn run_init_hook(&self) -> Result<(), BoxError> {
        match &self.init_hook {
            Some(hook) => hook(),
            None => Ok(()),
        }
    }

    pub(crate) fn run_destroy_hook(&self) -> Result<(), BoxError> {
        match &self.destroy_hook {
            Some(hook) => hook(),
            None => Ok(()),
        }
    }

    pub(crate) fn construct(&self) -> Result<Instance, BoxError> {
        (self.constructor)()
    }
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("lifetime", &self.lifetime)
            .field("init_hook", &self.has_init_hook())
            .field("destroy_hook", &self.has_destroy_hook())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_construct_wraps_value() {
        let descriptor = ServiceDescriptor::new(|| 7u8, Lifetime::Transient);
        let instance = descriptor.construct().unwrap();
        assert_eq!(*instance.downcast::<u8>().unwrap(), 7);
    }

    #[test]
    fn test_fallible_constructor_error() {
        let descriptor =
            ServiceDescriptor::fallible(|| Err::<u8, _>("boom"), Lifetime::Singleton);
        let err = descriptor.construct().unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_hooks_replace_same_kind() {
        static FIRST: AtomicUsize = AtomicUsize::new(0);
        static SECOND: AtomicUsize = AtomicUsize::new(0);

        let descriptor = ServiceDescriptor::new(|| (), Lifetime::Singleton)
            .with_init_hook(|| {
                FIRST.fetch_add(1, Ordering::SeqCst);
            })
            .with_init_hook(|| {
                SECOND.fetch_add(1, Ordering::SeqCst);
            });

        descriptor.run_init_hook().unwrap();
        assert_eq!(FIRST.load(Ordering::SeqCst), 0);
        assert_eq!(SECOND.load(Ordering::SeqCst), 1);
        assert!(!descriptor.has_destroy_hook());
    }

    #[test]
    fn test_missing_hooks_are_ok() {
        let descriptor = ServiceDescriptor::new(|| (), Lifetime::Transient);
        assert!(descriptor.run_init_hook().is_ok());
        assert!(descriptor.run_destroy_hook().is_ok());
    }

    #[test]
    fn test_try_destroy_hook_error() {
        let descriptor = ServiceDescriptor::new(|| (), Lifetime::Singleton)
            .with_hook(ServiceHook::try_destroy(|| Err("disk full")));
        assert_eq!(
            descriptor.run_destroy_hook().unwrap_err().to_string(),
            "disk full"
        );
    }

    #[test]
    fn test_debug_hides_closures() {
        let descriptor =
            ServiceDescriptor::new(|| (), Lifetime::Singleton).with_destroy_hook(|| {});
        assert_eq!(
            format!("{:?}", descriptor),
            "ServiceDescriptor { lifetime: Singleton, init_hook: false, destroy_hook: true, .. }"
        );
    }
}
