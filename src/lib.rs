pub mod errors;
pub mod hosting;
pub mod inject;

// Re-export commonly used items for convenience
pub use errors::{BoxError, HostError, InjectError};
pub use hosting::{
    FacadeLogSink, Host, HostBuilder, HostEnvironment, HostState, LifecyclePhase, LogLevel,
    LogSink, NullLogSink, Service,
};
pub use inject::{BindingBuilder, Injectable, Injector, Key, Module, Resolver, Scope};
