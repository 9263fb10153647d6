//! Per-registry configuration.

/// Settings for a [`Registry`](crate::Registry).
///
/// # Examples
///
/// ```rust
/// use service_registry::{Registry, RegistryConfig};
///
/// let registry = Registry::with_config(
///     RegistryConfig::default()
///         .label("http")
///         .log_resolutions(true),
/// );
/// assert_eq!(registry.config().label, "http");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Tag attached to every log line emitted by the registry.
    pub label: String,
    /// Emit a `debug` log line on every resolution, cached or not.
    pub log_resolutions: bool,
}

impl RegistryConfig {
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn log_resolutions(mut self, enabled: bool) -> Self {
        self.log_resolutions = enabled;
        self
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            label: "default".to_string(),
            log_resolutions: false,
        }
    }
}
