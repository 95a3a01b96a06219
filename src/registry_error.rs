use std::fmt;

/// Errors returned by the `Result`-returning access path of a singleton registry.
///
/// [`SingletonRegistry::get_instance`](crate::SingletonRegistry::get_instance) never
/// returns these; it logs and hands back `None` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SingletonError {
    /// The type's instance was torn down; it will not be recreated.
    Destroyed { type_name: &'static str },
    /// The application quit hook already ran.
    Quitting { type_name: &'static str },
    /// `Singleton::create` failed.
    Construction {
        type_name: &'static str,
        reason: String,
    },
}

impl SingletonError {
    /// Name of the singleton type the error refers to.
    pub fn type_name(&self) -> &'static str {
        match self {
            SingletonError::Destroyed { type_name }
            | SingletonError::Quitting { type_name }
            | SingletonError::Construction { type_name, .. } => type_name,
        }
    }

    /// True for the tombstone errors (`Destroyed`, `Quitting`).
    pub fn is_stale_access(&self) -> bool {
        matches!(
            self,
            SingletonError::Destroyed { .. } | SingletonError::Quitting { .. }
        )
    }
}

impl fmt::Display for SingletonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SingletonError::Destroyed { type_name } => {
                write!(f, "Singleton {type_name} was already destroyed")
            }
            SingletonError::Quitting { type_name } => {
                write!(f, "Singleton {type_name} is unavailable while the application is quitting")
            }
            SingletonError::Construction { type_name, reason } => {
                write!(f, "Failed to construct singleton {type_name}: {reason}")
            }
        }
    }
}

impl std::error::Error for SingletonError {}
