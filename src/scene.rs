//! A minimal object graph that can host singletons.
//!
//! Objects are either placed at the scene root (for example by a level loader)
//! or adopted by a registry, which marks them persistent and moves them under the
//! singleton holder. Unloading the scene drops everything that is not persistent.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::{Host, Instance, TypeKey};

/// Name of the holder container when none is given.
pub const DEFAULT_HOLDER: &str = "[Singletons]";

struct SceneObject {
    key: TypeKey,
    instance: Instance,
    persistent: bool,
    held: bool,
}

fn same_object(a: &Instance, b: &Instance) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

/// A thread-safe object graph implementing [`Host`].
///
/// # Examples
///
/// ```rust
/// use lifecycle_singleton::{BoxError, Scene, Singleton, SingletonRegistry};
/// use std::sync::Arc;
///
/// struct Music;
///
/// impl Singleton for Music {
///     fn create() -> Result<Self, BoxError> {
///         Ok(Music)
///     }
/// }
///
/// let scene = Arc::new(Scene::new());
/// let registry = SingletonRegistry::new(scene.clone());
///
/// registry.get_instance::<Music>().unwrap();
/// assert!(scene.is_persistent::<Music>());
/// assert_eq!(scene.unload(), 0);
/// assert!(scene.contains::<Music>());
/// ```
pub struct Scene {
    holder: String,
    objects: Mutex<Vec<SceneObject>>,
}

impl Scene {
    pub fn new() -> Self {
        Self::with_holder(DEFAULT_HOLDER)
    }

    /// Creates an empty scene whose singleton holder has the given name.
    pub fn with_holder(holder: impl Into<String>) -> Self {
        Self {
            holder: holder.into(),
            objects: Mutex::new(Vec::new()),
        }
    }

    fn objects(&self) -> MutexGuard<'_, Vec<SceneObject>> {
        self.objects.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn holder_name(&self) -> &str {
        &self.holder
    }

    /// Places a value at the scene root and returns a handle to it.
    pub fn place<T: Send + Sync + 'static>(&self, value: T) -> Arc<T> {
        let value = Arc::new(value);
        self.place_arc(value.clone());
        value
    }

    /// Places an `Arc`-wrapped value at the scene root.
    pub fn place_arc<T: Send + Sync + 'static>(&self, value: Arc<T>) {
        self.objects().push(SceneObject {
            key: TypeKey::of::<T>(),
            instance: value,
            persistent: false,
            held: false,
        });
    }

    /// The first object of type `T`, if any.
    pub fn find<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        let key = TypeKey::of::<T>();
        let instance = self
            .objects()
            .iter()
            .find(|o| o.key == key)
            .map(|o| o.instance.clone())?;
        instance.downcast::<T>().ok()
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.count::<T>() > 0
    }

    /// Number of objects of type `T`.
    pub fn count<T: 'static>(&self) -> usize {
        let key = TypeKey::of::<T>();
        self.objects().iter().filter(|o| o.key == key).count()
    }

    pub fn len(&self) -> usize {
        self.objects().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects().is_empty()
    }

    /// Whether some object of type `T` survives [`unload`](Self::unload).
    pub fn is_persistent<T: 'static>(&self) -> bool {
        let key = TypeKey::of::<T>();
        self.objects().iter().any(|o| o.key == key && o.persistent)
    }

    /// Name of the container an object of type `T` sits under, `None` for the scene root.
    pub fn parent_of<T: 'static>(&self) -> Option<String> {
        let key = TypeKey::of::<T>();
        self.objects()
            .iter()
            .find(|o| o.key == key && o.held)
            .map(|_| self.holder.clone())
    }

    /// Type names of the objects attached under the singleton holder, in adoption order.
    pub fn holder_children(&self) -> Vec<&'static str> {
        self.objects()
            .iter()
            .filter(|o| o.held)
            .map(|o| o.key.name())
            .collect()
    }

    /// Scene transition: drops every object not marked persistent.
    ///
    /// Returns the number of objects dropped.
    pub fn unload(&self) -> usize {
        let mut objects = self.objects();
        let before = objects.len();
        objects.retain(|o| o.persistent);
        let dropped = before - objects.len();
        log::debug!("Unloaded scene; dropped {dropped} object(s), kept {}", objects.len());
        dropped
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let objects: Vec<TypeKey> = self.objects().iter().map(|o| o.key).collect();
        f.debug_struct("Scene")
            .field("holder", &self.holder)
            .field("objects", &objects)
            .finish()
    }
}

impl Host for Scene {
    fn find_existing(&self, key: TypeKey) -> Option<Instance> {
        self.objects()
            .iter()
            .find(|o| o.key == key)
            .map(|o| o.instance.clone())
    }

    fn adopt(&self, key: TypeKey, instance: &Instance) {
        let mut objects = self.objects();
        match objects
            .iter_mut()
            .find(|o| same_object(&o.instance, instance))
        {
            Some(object) => {
                object.persistent = true;
                object.held = true;
            }
            None => objects.push(SceneObject {
                key,
                instance: instance.clone(),
                persistent: true,
                held: true,
            }),
        }
        log::debug!("Attached {key} under {}", self.holder);
    }

    fn release(&self, key: TypeKey) {
        self.objects().retain(|o| !(o.key == key && o.held));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Marker(u32);

    #[test]
    fn test_place_and_find() {
        let scene = Scene::new();
        let placed = scene.place(Marker(3));

        let found = scene.find::<Marker>().unwrap();
        assert!(Arc::ptr_eq(&placed, &found));
        assert_eq!(scene.count::<Marker>(), 1);
        assert!(!scene.is_persistent::<Marker>());
        assert_eq!(scene.parent_of::<Marker>(), None);
    }

    #[test]
    fn test_adopt_existing_object_moves_it_under_holder() {
        let scene = Scene::with_holder("Managers");
        let placed = scene.place(Marker(1));
        let instance: Instance = placed;

        scene.adopt(TypeKey::of::<Marker>(), &instance);

        assert_eq!(scene.len(), 1);
        assert!(scene.is_persistent::<Marker>());
        assert_eq!(scene.parent_of::<Marker>().as_deref(), Some("Managers"));
        assert_eq!(scene.holder_children(), vec![std::any::type_name::<Marker>()]);
    }

    #[test]
    fn test_adopt_new_object_adds_it() {
        let scene = Scene::new();
        let instance: Instance = Arc::new(Marker(9));

        scene.adopt(TypeKey::of::<Marker>(), &instance);

        assert_eq!(scene.len(), 1);
        assert_eq!(scene.holder_name(), DEFAULT_HOLDER);
        assert_eq!(*scene.find::<Marker>().unwrap(), Marker(9));
    }

    #[test]
    fn test_unload_keeps_persistent_objects() {
        let scene = Scene::new();
        scene.place(1u8);
        scene.place(2u16);
        let kept: Instance = Arc::new(Marker(0));
        scene.adopt(TypeKey::of::<Marker>(), &kept);

        assert_eq!(scene.unload(), 2);
        assert_eq!(scene.len(), 1);
        assert!(scene.contains::<Marker>());
        assert!(!scene.contains::<u8>());
    }

    #[test]
    fn test_release_removes_only_held_objects() {
        let scene = Scene::new();
        scene.place(Marker(1));
        let held: Instance = Arc::new(Marker(2));
        scene.adopt(TypeKey::of::<Marker>(), &held);

        scene.release(TypeKey::of::<Marker>());

        assert_eq!(scene.count::<Marker>(), 1);
        assert_eq!(*scene.find::<Marker>().unwrap(), Marker(1));
        assert!(scene.holder_children().is_empty());
    }
}
