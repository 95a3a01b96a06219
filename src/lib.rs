//! # Lifecycle Singleton
//!
//! Lazy per-type singletons for engine-style object lifecycles.
//!
//! A registry holds at most one instance of each [`Singleton`] type. The first
//! read locates an instance that already exists in the host's object graph, or
//! constructs one; either way the host adopts it so it survives scene changes.
//! Once the instance is torn down, or the application quit hook has run, the
//! type is tombstoned: reads log an error and return `None` instead of
//! recreating a ghost object nobody will clean up.
//!
//! ## Quick Start
//!
//! ```rust
//! use lifecycle_singleton::{BoxError, Singleton};
//!
//! struct Inventory {
//!     slots: usize,
//! }
//!
//! impl Singleton for Inventory {
//!     fn create() -> Result<Self, BoxError> {
//!         Ok(Inventory { slots: 24 })
//!     }
//! }
//!
//! assert_eq!(Inventory::instance().unwrap().slots, 24);
//!
//! lifecycle_singleton::on_application_quit();
//! assert!(Inventory::is_destroyed());
//! assert!(Inventory::instance().is_none());
//! ```
//!
//! ## Main Functions
//!
//! - [`get_instance`] / [`try_get_instance`] - Read the process-wide instance
//! - [`instantiate`] - Construct ahead of the first read
//! - [`has_instance`] / [`is_destroyed`] / [`is_quitting`] - Non-constructing queries
//! - [`on_teardown`] / [`on_application_quit`] / [`destroy`] - Lifecycle hooks
//! - [`set_host`] - Inject the object graph used for discovery and adoption
//! - [`set_trace_callback`] - Observe lifecycle events
//! - [`define_singletons!`] - Create an isolated registry

mod host;
mod macros;
mod registry;
mod registry_error;
mod registry_event;
mod scene;
mod singleton;

// Re-export the main public API
pub use host::{Detached, Host, Instance, TypeKey};
pub use registry::{
    clear_trace_callback, destroy, get_instance, global, has_instance, instantiate, is_destroyed,
    is_quitting, on_application_quit, on_teardown, set_host, set_trace_callback, try_get_instance,
    SingletonRegistry, TraceCallback,
};
pub use registry_error::SingletonError;
pub use registry_event::SingletonEvent;
pub use scene::{Scene, DEFAULT_HOLDER};
pub use singleton::{BoxError, Singleton};
