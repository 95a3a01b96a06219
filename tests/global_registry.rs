//! Integration tests for the process-wide registry behind the free functions
//! and the `Singleton` accessors.
//!
//! NOTE: All tests use #[serial] because they share the same static registry.
//! Each one starts by clearing it, since tombstones would otherwise carry over.

use lifecycle_singleton as singletons;
use lifecycle_singleton::{BoxError, Detached, Scene, Singleton, SingletonError};
use serial_test::serial;
use std::sync::Arc;

#[derive(Debug)]
struct SaveSystem {
    slot: u8,
}

impl Singleton for SaveSystem {
    fn create() -> Result<Self, BoxError> {
        Ok(SaveSystem { slot: 0 })
    }
}

fn reset() {
    singletons::global().clear();
    singletons::clear_trace_callback();
    singletons::set_host(Arc::new(Detached));
}

#[test]
#[serial]
fn test_trait_accessors_use_global_registry() {
    reset();

    assert!(!SaveSystem::has_instance());
    let first = SaveSystem::instance().unwrap();
    let second = singletons::get_instance::<SaveSystem>().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert!(SaveSystem::has_instance());
    assert_eq!(first.slot, 0);
}

#[test]
#[serial]
fn test_instantiate_through_trait() {
    reset();

    SaveSystem::instantiate().unwrap();
    assert!(singletons::has_instance::<SaveSystem>());

    // Redundant call is a no-op
    let before = SaveSystem::instance().unwrap();
    SaveSystem::instantiate().unwrap();
    assert!(Arc::ptr_eq(&before, &SaveSystem::instance().unwrap()));
}

#[test]
#[serial]
fn test_global_teardown() {
    reset();

    SaveSystem::instance().unwrap();
    singletons::on_teardown::<SaveSystem>();

    assert!(SaveSystem::is_destroyed());
    assert!(SaveSystem::instance().is_none());
    assert_eq!(
        singletons::try_get_instance::<SaveSystem>().unwrap_err(),
        SingletonError::Destroyed {
            type_name: std::any::type_name::<SaveSystem>()
        }
    );
}

#[test]
#[serial]
fn test_global_application_quit() {
    reset();

    SaveSystem::instance().unwrap();
    singletons::on_application_quit();

    assert!(singletons::is_quitting());
    assert!(singletons::is_destroyed::<SaveSystem>());
    assert!(SaveSystem::instantiate().is_err());
}

#[test]
#[serial]
fn test_global_host_discovery_and_destroy() {
    reset();

    let scene = Arc::new(Scene::new());
    let placed = scene.place(SaveSystem { slot: 3 });
    singletons::set_host(scene.clone());

    let served = SaveSystem::instance().unwrap();
    assert!(Arc::ptr_eq(&placed, &served));
    assert_eq!(served.slot, 3);

    singletons::destroy::<SaveSystem>();
    assert!(scene.is_empty());
    assert!(SaveSystem::is_destroyed());
}

#[test]
#[serial]
fn test_global_trace_callback() {
    reset();

    let events = Arc::new(std::sync::Mutex::new(Vec::new()));
    let events_clone = events.clone();
    singletons::set_trace_callback(move |event| {
        events_clone.lock().unwrap().push(event.to_string());
    });

    SaveSystem::instance().unwrap();
    singletons::clear_trace_callback();
    SaveSystem::instance().unwrap();
    singletons::on_teardown::<SaveSystem>();

    let captured = events.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert!(captured[0].starts_with("constructed"));
}
