//! Injection module (bindings, injector, modules)

pub mod binding;
pub mod injector;
pub mod key;
pub mod module;

// Re-export primary types
pub use binding::{BindingBuilder, Injectable};
pub use injector::{Injector, Resolver};
pub use key::Key;
pub use module::Module;

// Scope enum kept at module level so binding/injector can reference it via `super::Scope`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// New instance on every resolution
    Unscoped,
    /// One instance per owning injector, created once and cached
    Singleton,
}
