//! Hosting module (lifecycle-managed services on top of the injector)

pub mod builder;
pub mod environment;
pub mod host;
pub mod logging;
pub mod service;

// Re-export primary types
pub use builder::HostBuilder;
pub use environment::HostEnvironment;
pub use host::{Host, HostState, LifecyclePhase};
pub use logging::{FacadeLogSink, LogLevel, LogSink, NullLogSink};
pub use service::Service;
