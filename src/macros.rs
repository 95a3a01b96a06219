//! Macros for creating isolated singleton registries.

/// Creates an isolated singleton registry with a single macro invocation.
///
/// The macro generates a module containing:
/// - A lazily created, module-private `SingletonRegistry` static
/// - `registry()`, returning that registry (for host injection or tracing)
/// - Free functions mirroring the registry's lifecycle API
///
/// Instances, tombstones and the quitting flag of one generated registry are
/// invisible to every other registry, including the process-wide one.
///
/// # Examples
///
/// ```rust
/// use lifecycle_singleton::{define_singletons, BoxError, Singleton};
///
/// struct Mixer;
///
/// impl Singleton for Mixer {
///     fn create() -> Result<Self, BoxError> {
///         Ok(Mixer)
///     }
/// }
///
/// define_singletons!(audio);
/// define_singletons!(ui);
///
/// audio::get_instance::<Mixer>().unwrap();
/// audio::on_teardown::<Mixer>();
///
/// assert!(audio::is_destroyed::<Mixer>());
/// assert!(!ui::is_destroyed::<Mixer>());
/// assert!(ui::get_instance::<Mixer>().is_some());
/// ```
#[macro_export]
macro_rules! define_singletons {
    ($name:ident) => {
        pub mod $name {
            use std::sync::{Arc, LazyLock};

            // Registry storage (module-private)
            static REGISTRY: LazyLock<$crate::SingletonRegistry> =
                LazyLock::new($crate::SingletonRegistry::detached);

            /// The registry behind this module's free functions.
            pub fn registry() -> &'static $crate::SingletonRegistry {
                &REGISTRY
            }

            /// Install the host this registry discovers and adopts through.
            pub fn set_host(host: Arc<dyn $crate::Host>) {
                REGISTRY.set_host(host)
            }

            /// Return the instance of `T`, creating it on first access.
            pub fn get_instance<T: $crate::Singleton>() -> Option<Arc<T>> {
                REGISTRY.get_instance::<T>()
            }

            /// Return the instance of `T` or the reason none was served.
            pub fn try_get_instance<T: $crate::Singleton>(
            ) -> Result<Arc<T>, $crate::SingletonError> {
                REGISTRY.try_get_instance::<T>()
            }

            /// Construct the instance of `T` if there is none yet.
            pub fn instantiate<T: $crate::Singleton>() -> Result<(), $crate::SingletonError> {
                REGISTRY.instantiate::<T>()
            }

            /// Check whether an instance of `T` is held.
            pub fn has_instance<T: $crate::Singleton>() -> bool {
                REGISTRY.has_instance::<T>()
            }

            /// Check whether `T` was torn down.
            pub fn is_destroyed<T: $crate::Singleton>() -> bool {
                REGISTRY.is_destroyed::<T>()
            }

            /// Check whether the quit hook has run.
            pub fn is_quitting() -> bool {
                REGISTRY.is_quitting()
            }

            /// Teardown hook for `T`.
            pub fn on_teardown<T: $crate::Singleton>() {
                REGISTRY.on_teardown::<T>()
            }

            /// Application quit hook.
            pub fn on_application_quit() {
                REGISTRY.on_application_quit()
            }

            /// Release `T` from the host and tear it down.
            pub fn destroy<T: $crate::Singleton>() {
                REGISTRY.destroy::<T>()
            }

            /// Set a tracing callback for lifecycle operations.
            pub fn set_trace_callback(
                callback: impl Fn(&$crate::SingletonEvent) + Send + Sync + 'static,
            ) {
                REGISTRY.set_trace_callback(callback)
            }

            /// Clear the tracing callback.
            pub fn clear_trace_callback() {
                REGISTRY.clear_trace_callback()
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::{BoxError, Singleton};
    use std::sync::Arc;

    struct Probe;

    impl Singleton for Probe {
        fn create() -> Result<Self, BoxError> {
            Ok(Probe)
        }
    }

    #[test]
    fn test_define_singletons_macro() {
        define_singletons!(test_reg);

        assert!(!test_reg::has_instance::<Probe>());
        let first = test_reg::get_instance::<Probe>().unwrap();
        let second = test_reg::get_instance::<Probe>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(test_reg::has_instance::<Probe>());
    }

    #[test]
    fn test_multiple_registries() {
        define_singletons!(reg_a);
        define_singletons!(reg_b);

        let a = reg_a::get_instance::<Probe>().unwrap();
        let b = reg_b::get_instance::<Probe>().unwrap();
        assert!(!Arc::ptr_eq(&a, &b));

        reg_a::on_application_quit();
        assert!(reg_a::is_quitting());
        assert!(!reg_b::is_quitting());
        assert!(reg_b::has_instance::<Probe>());
    }

    #[test]
    fn test_tracing() {
        define_singletons!(trace_test);

        use std::sync::Mutex;
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();

        trace_test::set_trace_callback(move |event| {
            events_clone.lock().unwrap().push(format!("{}", event));
        });

        trace_test::instantiate::<Probe>().unwrap();
        trace_test::instantiate::<Probe>().unwrap();
        trace_test::destroy::<Probe>();

        let recorded = events.lock().unwrap();
        assert_eq!(recorded.len(), 3);
        assert!(recorded[0].contains("constructed"));
        assert!(recorded[1].contains("redundant_instantiate"));
        assert!(recorded[2].contains("torn_down"));
    }
}
