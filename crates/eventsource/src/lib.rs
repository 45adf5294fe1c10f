//! Event-sourced repositories.
//!
//! This crate provides:
//! - the Event trait and the embeddable Model carrying id, version and timestamp
//! - the Aggregate trait for state rebuilt by folding events
//! - a type registry and JSON serializer mapping events to storage records
//! - Repository, which saves events to an event store and replays them on load

pub mod aggregate;
pub mod builder;
pub mod debug;
pub mod error;
pub mod event;
mod finite;
pub mod registry;
pub mod repository;
pub mod serializer;

pub use aggregate::Aggregate;
pub use builder::RepositoryBuilder;
pub use common::{AggregateId, Context, ContextError};
pub use debug::DebugLog;
pub use error::{RepositoryError, Result, SerializerError};
pub use event::{Event, EventData, Model};
pub use event_store::{EventStore, EventStoreError, History, InMemoryEventStore, Record, Version};
pub use registry::TypeRegistry;
pub use repository::Repository;
pub use serializer::{JsonSerializer, Serializer};
