//! The singleton registry: at most one instance per type, located or created on
//! first access and tombstoned once torn down.
//!
//! # Examples
//!
//! ```
//! use lifecycle_singleton::{BoxError, Singleton, SingletonRegistry};
//!
//! struct Clock(u64);
//!
//! impl Singleton for Clock {
//!     fn create() -> Result<Self, BoxError> {
//!         Ok(Clock(0))
//!     }
//! }
//!
//! let registry = SingletonRegistry::detached();
//! let first = registry.get_instance::<Clock>().unwrap();
//! let second = registry.get_instance::<Clock>().unwrap();
//! assert!(std::sync::Arc::ptr_eq(&first, &second));
//!
//! registry.on_teardown::<Clock>();
//! assert!(registry.is_destroyed::<Clock>());
//! assert!(registry.get_instance::<Clock>().is_none());
//! ```

use std::{
    any::TypeId,
    collections::HashMap,
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, LazyLock, Mutex, MutexGuard,
    },
};

use crate::{Detached, Host, Instance, Singleton, SingletonError, SingletonEvent, TypeKey};

/// Type alias for the user-supplied tracing callback.
///
/// The callback receives every [`SingletonEvent`] the registry emits. It is invoked
/// with no registry lock held, so it may call back into the registry.
pub type TraceCallback = dyn Fn(&SingletonEvent) + Send + Sync + 'static;

/// Runs `Singleton::torn_down` on a type-erased instance of a known type.
type ReleaseHook = fn(&Instance);

fn release_hook<T: Singleton>(instance: &Instance) {
    if let Some(value) = instance.downcast_ref::<T>() {
        value.torn_down();
    }
}

/// Lock a mutex, recovering the inner value if a previous holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Per-type state: the instance slot and its tombstone.
struct Slot {
    key: TypeKey,
    instance: Option<Instance>,
    release: Option<ReleaseHook>,
    destroyed: bool,
}

impl Slot {
    fn new(key: TypeKey) -> Self {
        Self {
            key,
            instance: None,
            release: None,
            destroyed: false,
        }
    }

    fn take(&mut self) -> Option<(Instance, Option<ReleaseHook>)> {
        let release = self.release.take();
        self.instance.take().map(|instance| (instance, release))
    }
}

/// A registry holding at most one instance of each [`Singleton`] type.
///
/// Every type has its own lock; the check-then-create sequence for a type runs
/// under it, so concurrent first reads construct exactly once. The registry-wide
/// map lock is only held to look a slot up.
///
/// Once a type is torn down (or the application quit hook has run) the registry
/// refuses to serve it again: reads log an error and return nothing.
pub struct SingletonRegistry {
    host: Mutex<Arc<dyn Host>>,
    slots: Mutex<HashMap<TypeId, Arc<Mutex<Slot>>>>,
    quitting: AtomicBool,
    trace: Mutex<Option<Arc<TraceCallback>>>,
}

impl SingletonRegistry {
    /// Creates an empty registry that discovers and adopts through `host`.
    pub fn new(host: Arc<dyn Host>) -> Self {
        Self {
            host: Mutex::new(host),
            slots: Mutex::new(HashMap::new()),
            quitting: AtomicBool::new(false),
            trace: Mutex::new(None),
        }
    }

    /// Creates an empty registry with the [`Detached`] host.
    pub fn detached() -> Self {
        Self::new(Arc::new(Detached))
    }

    // -------------------------------------------------------------------------------------------------
    // Host and tracing
    // -------------------------------------------------------------------------------------------------

    /// Replaces the host. Instances already served keep the host that adopted them.
    pub fn set_host(&self, host: Arc<dyn Host>) {
        *lock(&self.host) = host;
    }

    /// The host currently in use.
    pub fn host(&self) -> Arc<dyn Host> {
        lock(&self.host).clone()
    }

    /// Set a tracing callback for lifecycle operations.
    pub fn set_trace_callback(&self, callback: impl Fn(&SingletonEvent) + Send + Sync + 'static) {
        *lock(&self.trace) = Some(Arc::new(callback));
    }

    /// Clear the tracing callback.
    pub fn clear_trace_callback(&self) {
        *lock(&self.trace) = None;
    }

    fn emit_events(&self, events: Vec<SingletonEvent>) {
        if events.is_empty() {
            return;
        }
        let callback = lock(&self.trace).clone();
        if let Some(callback) = callback {
            for event in &events {
                callback(event);
            }
        }
    }

    // -------------------------------------------------------------------------------------------------
    // Access
    // -------------------------------------------------------------------------------------------------

    fn slot(&self, key: TypeKey) -> Arc<Mutex<Slot>> {
        lock(&self.slots)
            .entry(key.id())
            .or_insert_with(|| Arc::new(Mutex::new(Slot::new(key))))
            .clone()
    }

    fn existing_slot(&self, key: TypeKey) -> Option<Arc<Mutex<Slot>>> {
        lock(&self.slots).get(&key.id()).cloned()
    }

    /// Returns the tombstone error for `slot`, logging the refused access.
    fn refuse(&self, slot: &Slot, events: &mut Vec<SingletonEvent>) -> Option<SingletonError> {
        let type_name = slot.key.name();
        let quitting = self.quitting.load(Ordering::SeqCst);
        if quitting {
            log::error!(
                "{type_name} singleton is unavailable because the application is quitting; \
                 check has_instance() or is_destroyed() before accessing it"
            );
        } else if slot.destroyed {
            log::error!(
                "{type_name} singleton was already destroyed; \
                 check has_instance() or is_destroyed() before accessing it"
            );
        } else {
            return None;
        }

        events.push(SingletonEvent::StaleAccess {
            type_name,
            quitting,
        });
        Some(if quitting {
            SingletonError::Quitting { type_name }
        } else {
            SingletonError::Destroyed { type_name }
        })
    }

    /// Looks for a pre-placed instance of `T` through the host.
    fn discover<T: Singleton>(&self, host: &dyn Host, key: TypeKey) -> Option<Arc<T>> {
        let found = host.find_existing(key)?;
        match found.downcast::<T>() {
            Ok(value) => Some(value),
            Err(_) => {
                log::warn!("Host returned an object that is not a {key}; constructing one instead");
                None
            }
        }
    }

    /// Fills an empty slot, by discovery first when `discover` is set, then by construction.
    ///
    /// The caller runs `Singleton::initialized` on the result once the slot lock is released.
    fn populate<T: Singleton>(
        &self,
        slot: &mut Slot,
        discover: bool,
        events: &mut Vec<SingletonEvent>,
    ) -> Result<Arc<T>, SingletonError> {
        let key = slot.key;
        let type_name = key.name();
        let host = self.host();

        let discovered = if discover {
            self.discover::<T>(host.as_ref(), key)
        } else {
            None
        };

        let (value, event) = match discovered {
            Some(value) => {
                log::debug!("Discovered existing {type_name} singleton");
                (value, SingletonEvent::Discovered { type_name })
            }
            None => match T::create() {
                Ok(value) => {
                    log::debug!("Constructed {type_name} singleton");
                    (Arc::new(value), SingletonEvent::Constructed { type_name })
                }
                Err(err) => {
                    let reason = err.to_string();
                    log::error!("Failed to construct {type_name} singleton: {reason}");
                    events.push(SingletonEvent::ConstructionFailed {
                        type_name,
                        reason: reason.clone(),
                    });
                    return Err(SingletonError::Construction { type_name, reason });
                }
            },
        };

        let instance: Instance = value.clone();
        host.adopt(key, &instance);
        slot.instance = Some(instance);
        slot.release = Some(release_hook::<T>);

        events.push(event);
        Ok(value)
    }

    /// Returns the instance of `T`, creating it on first access.
    ///
    /// An existing object found through the host is preferred over construction.
    /// After teardown or application quit this logs an error and returns `None`;
    /// use [`has_instance`](Self::has_instance) or [`is_destroyed`](Self::is_destroyed)
    /// first when a missing instance is expected. A failed construction also
    /// yields `None` and leaves the slot empty.
    pub fn get_instance<T: Singleton>(&self) -> Option<Arc<T>> {
        self.try_get_instance::<T>().ok()
    }

    /// Like [`get_instance`](Self::get_instance), reporting why no instance was served.
    ///
    /// # Errors
    ///
    /// - `Destroyed` / `Quitting` once the type is tombstoned
    /// - `Construction` when `Singleton::create` fails
    pub fn try_get_instance<T: Singleton>(&self) -> Result<Arc<T>, SingletonError> {
        let key = TypeKey::of::<T>();
        let slot = self.slot(key);
        let mut events = Vec::new();

        let (result, fresh) = {
            let mut guard = lock(&slot);
            let live = guard
                .instance
                .clone()
                .and_then(|instance| instance.downcast::<T>().ok());
            if let Some(err) = self.refuse(&guard, &mut events) {
                (Err(err), false)
            } else if let Some(value) = live {
                (Ok(value), false)
            } else {
                (self.populate::<T>(&mut guard, true, &mut events), true)
            }
        };

        if let (Ok(value), true) = (&result, fresh) {
            value.initialized();
        }
        self.emit_events(events);
        result
    }

    /// Constructs the instance of `T` ahead of its first read.
    ///
    /// If an instance already exists this logs a warning and does nothing.
    /// Construction skips discovery.
    ///
    /// # Errors
    ///
    /// - `Destroyed` / `Quitting` once the type is tombstoned
    /// - `Construction` when `Singleton::create` fails
    pub fn instantiate<T: Singleton>(&self) -> Result<(), SingletonError> {
        let key = TypeKey::of::<T>();
        let slot = self.slot(key);
        let mut events = Vec::new();

        let result = {
            let mut guard = lock(&slot);
            if let Some(err) = self.refuse(&guard, &mut events) {
                Err(err)
            } else if guard.instance.is_some() {
                log::warn!(
                    "{} singleton already has an instance; instantiate() ignored",
                    key.name()
                );
                events.push(SingletonEvent::RedundantInstantiate {
                    type_name: key.name(),
                });
                Ok(None)
            } else {
                self.populate::<T>(&mut guard, false, &mut events).map(Some)
            }
        };

        let result = result.map(|fresh| {
            if let Some(value) = fresh {
                value.initialized();
            }
        });
        self.emit_events(events);
        result
    }

    // -------------------------------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------------------------------

    /// Whether the slot for `T` currently holds an instance. Never constructs.
    pub fn has_instance<T: Singleton>(&self) -> bool {
        self.existing_slot(TypeKey::of::<T>()).is_some_and(|slot| {
            let guard = lock(&slot);
            guard.instance.is_some()
        })
    }

    /// Whether `T` was torn down, or the application is quitting. Never constructs.
    pub fn is_destroyed<T: Singleton>(&self) -> bool {
        self.is_quitting()
            || self.existing_slot(TypeKey::of::<T>()).is_some_and(|slot| {
                let guard = lock(&slot);
                guard.destroyed
            })
    }

    /// Whether the application quit hook has run.
    pub fn is_quitting(&self) -> bool {
        self.quitting.load(Ordering::SeqCst)
    }

    // -------------------------------------------------------------------------------------------------
    // Lifecycle hooks
    // -------------------------------------------------------------------------------------------------

    /// Teardown hook for `T`: clears the slot and tombstones the type.
    ///
    /// Safe to call more than once and for types that were never served.
    pub fn on_teardown<T: Singleton>(&self) {
        let key = TypeKey::of::<T>();
        let slot = self.slot(key);

        let released = {
            let mut guard = lock(&slot);
            guard.destroyed = true;
            guard.take()
        };

        log::debug!("Tore down {} singleton", key.name());
        let had_instance = released.is_some();
        if let Some((instance, Some(release))) = released {
            release(&instance);
        }

        self.emit_events(vec![SingletonEvent::TornDown {
            type_name: key.name(),
            had_instance,
        }]);
    }

    /// Application quit hook: tombstones every type and releases every instance.
    ///
    /// Only the first call has an effect.
    pub fn on_application_quit(&self) {
        if self.quitting.swap(true, Ordering::SeqCst) {
            return;
        }

        let slots: Vec<_> = lock(&self.slots).values().cloned().collect();
        let released: Vec<_> = slots
            .iter()
            .filter_map(|slot| {
                let mut guard = lock(slot);
                guard.destroyed = true;
                guard.take()
            })
            .collect();

        log::debug!(
            "Application quitting; released {} singleton(s)",
            released.len()
        );
        let count = released.len();
        for (instance, release) in released {
            if let Some(release) = release {
                release(&instance);
            }
        }

        self.emit_events(vec![SingletonEvent::ApplicationQuit { released: count }]);
    }

    /// Releases `T`'s object from the host, then runs [`on_teardown`](Self::on_teardown).
    pub fn destroy<T: Singleton>(&self) {
        self.host().release(TypeKey::of::<T>());
        self.on_teardown::<T>();
    }

    /// Drops every slot, tombstone and the quitting flag.
    ///
    /// This is intended for tests sharing one registry. Instances already handed
    /// out stay valid; their `torn_down` hooks do not run.
    #[doc(hidden)]
    pub fn clear(&self) {
        lock(&self.slots).clear();
        self.quitting.store(false, Ordering::SeqCst);
    }
}

impl Default for SingletonRegistry {
    fn default() -> Self {
        Self::detached()
    }
}

impl fmt::Debug for SingletonRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots: Vec<_> = lock(&self.slots).values().cloned().collect();
        let types: Vec<TypeKey> = slots.iter().map(|slot| lock(slot).key).collect();
        f.debug_struct("SingletonRegistry")
            .field("types", &types)
            .field("quitting", &self.is_quitting())
            .finish_non_exhaustive()
    }
}

// -------------------------------------------------------------------------------------------------
// Process-wide registry
// -------------------------------------------------------------------------------------------------

/// The process-wide registry, created on first use with the [`Detached`] host.
static GLOBAL_REGISTRY: LazyLock<SingletonRegistry> = LazyLock::new(SingletonRegistry::detached);

/// The process-wide registry used by the free functions and by `Singleton::instance`.
pub fn global() -> &'static SingletonRegistry {
    &GLOBAL_REGISTRY
}

/// Installs the host of the process-wide registry. Call before the first access.
pub fn set_host(host: Arc<dyn Host>) {
    global().set_host(host);
}

/// Returns the process-wide instance of `T`, creating it on first access.
pub fn get_instance<T: Singleton>() -> Option<Arc<T>> {
    global().get_instance::<T>()
}

/// Returns the process-wide instance of `T` or the reason none was served.
pub fn try_get_instance<T: Singleton>() -> Result<Arc<T>, SingletonError> {
    global().try_get_instance::<T>()
}

/// Constructs the process-wide instance of `T` if there is none yet.
pub fn instantiate<T: Singleton>() -> Result<(), SingletonError> {
    global().instantiate::<T>()
}

/// Whether the process-wide registry holds an instance of `T`.
pub fn has_instance<T: Singleton>() -> bool {
    global().has_instance::<T>()
}

/// Whether the process-wide instance of `T` was torn down.
pub fn is_destroyed<T: Singleton>() -> bool {
    global().is_destroyed::<T>()
}

/// Whether the process-wide application quit hook has run.
pub fn is_quitting() -> bool {
    global().is_quitting()
}

/// Teardown hook for the process-wide instance of `T`.
pub fn on_teardown<T: Singleton>() {
    global().on_teardown::<T>()
}

/// Application quit hook for the process-wide registry.
pub fn on_application_quit() {
    global().on_application_quit()
}

/// Releases `T` from the process-wide host and tears it down.
pub fn destroy<T: Singleton>() {
    global().destroy::<T>()
}

/// Sets the tracing callback of the process-wide registry.
pub fn set_trace_callback(callback: impl Fn(&SingletonEvent) + Send + Sync + 'static) {
    global().set_trace_callback(callback)
}

/// Clears the tracing callback of the process-wide registry.
pub fn clear_trace_callback() {
    global().clear_trace_callback()
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
