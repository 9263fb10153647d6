use std::fmt;

/// Lifetime policy of a registered service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// One shared instance per name, built on first resolution and cached
    /// until the service is destroyed.
    Singleton,
    /// A fresh instance on every resolution. Never cached.
    Transient,
    /// Reserved for per-scope instances. Resolving a scoped service fails with
    /// [`RegistryError::UnsupportedLifetime`](crate::RegistryError::UnsupportedLifetime).
    Scoped,
}

impl Lifetime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lifetime::Singleton => "Singleton",
            Lifetime::Transient => "Transient",
            Lifetime::Scoped => "Scoped",
        }
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Lifetime::Singleton.to_string(), "Singleton");
        assert_eq!(Lifetime::Transient.to_string(), "Transient");
        assert_eq!(Lifetime::Scoped.to_string(), "Scoped");
    }

    #[test]
    fn test_equality() {
        assert_eq!(Lifetime::Singleton, Lifetime::Singleton);
        assert_ne!(Lifetime::Singleton, Lifetime::Transient);
    }
}
