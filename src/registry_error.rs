use thiserror::Error;

use crate::Lifetime;

/// Boxed error returned by fallible constructors and hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("service not found in registry: {name}")]
    NotFound { name: String },

    #[error("service `{name}` is registered as {actual}, not {expected}")]
    UnsupportedOperation {
        name: String,
        expected: Lifetime,
        actual: Lifetime,
    },

    #[error("service `{name}` has unsupported lifetime {lifetime}")]
    UnsupportedLifetime { name: String, lifetime: Lifetime },

    #[error("type mismatch for service `{name}`: expected {expected}")]
    TypeMismatch { name: String, expected: &'static str },

    #[error("constructor for service `{name}` failed: {source}")]
    ConstructorFailure {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("init hook for service `{name}` failed: {source}")]
    InitHookFailure {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("registry `{registry}` is already initialized")]
    AlreadyInitialized { registry: &'static str },

    #[error("registry `{registry}` used before init()")]
    Uninitialized { registry: &'static str },
}

impl RegistryError {
    pub(crate) fn not_found(name: &str) -> Self {
        RegistryError::NotFound {
            name: name.to_owned(),
        }
    }

    /// Returns `true` for [`RegistryError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistryError::NotFound { .. })
    }
}
