//! Shared types used across the event-sourcing workspace.

pub mod context;
pub mod types;

pub use context::{Context, ContextError};
pub use types::AggregateId;
