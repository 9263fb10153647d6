use crate::Lifetime;

/// Events emitted by the registry during operations.
///
/// These events are passed to the tracing callback set via
/// [`Registry::set_trace_callback`](crate::Registry::set_trace_callback).
/// The `Clone` derive allows callbacks to store or forward events if needed.
///
/// # Examples
///
/// ```rust
/// use service_registry::{Lifetime, RegistryEvent};
///
/// let event = RegistryEvent::Register {
///     name: "db".to_string(),
///     lifetime: Lifetime::Singleton,
///     replaced: false,
/// };
/// assert_eq!(
///     event.to_string(),
///     "register { name: db, lifetime: Singleton, replaced: false }"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    /// A descriptor was stored.
    Register {
        name: String,
        lifetime: Lifetime,
        /// Whether an earlier descriptor under the same name was overwritten.
        replaced: bool,
    },

    /// A singleton instance was built and cached.
    Construct { name: String },

    /// A service was requested.
    Resolve {
        name: String,
        /// Whether the resolution produced an instance
        found: bool,
    },

    /// A service was removed.
    Destroy {
        name: String,
        /// Whether a descriptor existed under the name
        found: bool,
        /// Whether a cached singleton instance was discarded
        had_instance: bool,
    },

    /// The registry was cleared.
    Clear {
        /// Number of descriptors removed
        count: usize,
    },
}

impl std::fmt::Display for RegistryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryEvent::Register {
                name,
                lifetime,
                replaced,
            } => write!(
                f,
                "register {{ name: {name}, lifetime: {lifetime}, replaced: {replaced} }}"
            ),
            RegistryEvent::Construct { name } => write!(f, "construct {{ name: {name} }}"),
            RegistryEvent::Resolve { name, found } => {
                write!(f, "resolve {{ name: {name}, found: {found} }}")
            }
            RegistryEvent::Destroy {
                name,
                found,
                had_instance,
            } => write!(
                f,
                "destroy {{ name: {name}, found: {found}, had_instance: {had_instance} }}"
            ),
            RegistryEvent::Clear { count } => write!(f, "clear {{ count: {count} }}"),
        }
    }
}
