//! The host collaborator a registry calls into.
//!
//! A host owns the object graph singletons live in. The registry only needs three
//! things from it: find an object that is already there, adopt a singleton it is
//! about to serve, and release one that is being destroyed.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A type-erased singleton instance as stored by registries and hosts.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Identifies a singleton type: its `TypeId` plus its name for diagnostics.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully-qualified type name, as `std::any::type_name` reports it.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Services a registry consumes from the environment its singletons live in.
///
/// Implementations must be thread-safe; a registry may call them from any thread.
/// `find_existing` and `adopt` run while the registry holds the lock of the type
/// identified by `key`. A host must not call back into the registry from these
/// methods.
pub trait Host: Send + Sync {
    /// Look for an object of the given type that already exists in the graph.
    fn find_existing(&self, key: TypeKey) -> Option<Instance>;

    /// Take ownership of a singleton the registry is about to serve.
    ///
    /// Called for both discovered and constructed instances. A host marks the
    /// object to survive scene changes and attaches it under its singleton holder.
    fn adopt(&self, key: TypeKey, instance: &Instance);

    /// Remove the singleton's object from the graph. Called by `destroy`.
    fn release(&self, _key: TypeKey) {}
}

/// A host with no object graph: discovery never finds anything and adoption is a no-op.
///
/// This is the host of every registry that was not given one explicitly.
#[derive(Debug, Default, Clone, Copy)]
pub struct Detached;

impl Host for Detached {
    fn find_existing(&self, _key: TypeKey) -> Option<Instance> {
        None
    }

    fn adopt(&self, _key: TypeKey, _instance: &Instance) {}
}
