use thiserror::Error;

use crate::hosting::host::{HostState, LifecyclePhase};
use crate::inject::key::Key;

/// Boxed error type carried across provider and lifecycle hook boundaries
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised by binding registration and resolution
#[derive(Debug, Error)]
pub enum InjectError {
    #[error("no binding registered for {key}{}", chain_suffix(.chain))]
    UnboundKey { key: Key, chain: Vec<Key> },

    #[error("{key} is already bound")]
    DuplicateBinding { key: Key },

    #[error("circular dependency detected: {}", key_path(.cycle))]
    CircularDependency { cycle: Vec<Key> },

    #[error("stored instance for {key} does not match the bound capability type")]
    TypeMismatch { key: Key },

    #[error("failed to produce {key}: {source}")]
    Production {
        key: Key,
        #[source]
        source: BoxError,
    },
}

impl InjectError {
    /// Wraps a provider failure, unwrapping nested resolution errors so that
    /// cycle and unbound failures keep their kind across provider boundaries.
    pub(crate) fn production(key: Key, source: BoxError) -> InjectError {
        match source.downcast::<InjectError>() {
            Ok(nested) => *nested,
            Err(source) => InjectError::Production { key, source },
        }
    }
}

/// Errors raised by the hosting layer
#[derive(Debug, Error)]
pub enum HostError {
    #[error("service {key} is already registered")]
    DuplicateService { key: Key },

    #[error("{operation} is not permitted while the host is {state:?}")]
    InvalidTransition {
        state: HostState,
        operation: &'static str,
    },

    #[error("failed to resolve service {key}: {source}")]
    ServiceResolution {
        key: Key,
        #[source]
        source: InjectError,
    },

    #[error("service {key} failed during {phase}: {source}")]
    ServiceHook {
        key: Key,
        phase: LifecyclePhase,
        #[source]
        source: BoxError,
    },

    #[error("{} service(s) failed while stopping: {}", .failures.len(), failure_summary(.failures))]
    Shutdown { failures: Vec<HostError> },
}

fn chain_suffix(chain: &[Key]) -> String {
    if chain.is_empty() {
        String::new()
    } else {
        format!(" (requested while resolving {})", key_path(chain))
    }
}

fn key_path(keys: &[Key]) -> String {
    keys.iter()
        .map(|key| key.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn failure_summary(failures: &[HostError]) -> String {
    failures
        .iter()
        .map(|failure| failure.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
