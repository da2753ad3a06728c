//! Service layer: dispatch orchestration and background tasks.
//!
//! [`Dispatcher`] coordinates the registries and request table and emits
//! events through the [`super::domain::EventBus`]; [`sweeper`] hosts the
//! periodic liveness sweeps.

pub mod dispatcher;
pub mod selector;
pub mod sweeper;

pub use dispatcher::Dispatcher;
