/// Events emitted by a singleton registry during lifecycle operations.
///
/// These events are passed to the tracing callback set via `set_trace_callback`.
/// Each one mirrors a `log` record the registry writes at the same point.
///
/// # Examples
///
/// ```rust
/// use lifecycle_singleton::SingletonEvent;
///
/// let event = SingletonEvent::Constructed { type_name: "game::Audio" };
/// assert_eq!(event.to_string(), "constructed { type_name: game::Audio }");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SingletonEvent {
    /// An existing object was found through the host and took the slot.
    Discovered {
        /// The type name of the singleton
        type_name: &'static str,
    },

    /// A new instance was built with `Singleton::create`.
    Constructed {
        /// The type name of the singleton
        type_name: &'static str,
    },

    /// `Singleton::create` returned an error.
    ConstructionFailed {
        /// The type name of the singleton
        type_name: &'static str,
        /// The error message returned by the constructor
        reason: String,
    },

    /// An instance was requested after teardown or quit.
    StaleAccess {
        /// The type name that was requested
        type_name: &'static str,
        /// Whether the refusal came from the quitting flag
        quitting: bool,
    },

    /// `instantiate` was called while an instance already existed.
    RedundantInstantiate {
        /// The type name of the singleton
        type_name: &'static str,
    },

    /// The type was tombstoned by `on_teardown`.
    TornDown {
        /// The type name of the singleton
        type_name: &'static str,
        /// Whether a live instance was released
        had_instance: bool,
    },

    /// The application quit hook ran.
    ApplicationQuit {
        /// Number of live instances released
        released: usize,
    },
}

impl std::fmt::Display for SingletonEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SingletonEvent::Discovered { type_name } => {
                write!(f, "discovered {{ type_name: {} }}", type_name)
            }
            SingletonEvent::Constructed { type_name } => {
                write!(f, "constructed {{ type_name: {} }}", type_name)
            }
            SingletonEvent::ConstructionFailed { type_name, reason } => {
                write!(
                    f,
                    "construction_failed {{ type_name: {}, reason: {} }}",
                    type_name, reason
                )
            }
            SingletonEvent::StaleAccess {
                type_name,
                quitting,
            } => {
                write!(
                    f,
                    "stale_access {{ type_name: {}, quitting: {} }}",
                    type_name, quitting
                )
            }
            SingletonEvent::RedundantInstantiate { type_name } => {
                write!(f, "redundant_instantiate {{ type_name: {} }}", type_name)
            }
            SingletonEvent::TornDown {
                type_name,
                had_instance,
            } => {
                write!(
                    f,
                    "torn_down {{ type_name: {}, had_instance: {} }}",
                    type_name, had_instance
                )
            }
            SingletonEvent::ApplicationQuit { released } => {
                write!(f, "application_quit {{ released: {} }}", released)
            }
        }
    }
}
