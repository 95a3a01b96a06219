//! The trait a type implements to be served by a singleton registry.

use std::sync::Arc;

use crate::SingletonError;

/// Boxed error a constructor may return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A type restricted to at most one live instance per registry.
///
/// Only [`create`](Singleton::create) is required. The provided `instance`-style
/// functions go through the process-wide registry returned by [`crate::global`].
///
/// # Examples
///
/// ```rust
/// use lifecycle_singleton::{BoxError, Singleton};
///
/// struct Settings {
///     volume: u8,
/// }
///
/// impl Singleton for Settings {
///     fn create() -> Result<Self, BoxError> {
///         Ok(Settings { volume: 7 })
///     }
/// }
///
/// let settings = Settings::instance().unwrap();
/// assert_eq!(settings.volume, 7);
/// assert!(Settings::has_instance());
/// ```
pub trait Singleton: Send + Sync + 'static {
    /// Builds a new instance. Called at most once per registry unless it fails.
    fn create() -> Result<Self, BoxError>
    where
        Self: Sized;

    /// Runs once the instance has been adopted by the host and stored.
    ///
    /// Called with no registry lock held, so it may read its own type's instance
    /// or use other singletons. Other threads can see the instance before this
    /// returns.
    fn initialized(&self) {}

    /// Runs when the instance is released by teardown or application quit.
    fn torn_down(&self) {}

    /// The instance held by the process-wide registry, created on first use.
    fn instance() -> Option<Arc<Self>>
    where
        Self: Sized,
    {
        crate::global().get_instance::<Self>()
    }

    /// Constructs the process-wide instance ahead of its first read.
    fn instantiate() -> Result<(), SingletonError>
    where
        Self: Sized,
    {
        crate::global().instantiate::<Self>()
    }

    /// Whether the process-wide registry currently holds an instance.
    fn has_instance() -> bool
    where
        Self: Sized,
    {
        crate::global().has_instance::<Self>()
    }

    /// Whether the process-wide instance was torn down.
    fn is_destroyed() -> bool
    where
        Self: Sized,
    {
        crate::global().is_destroyed::<Self>()
    }
}
