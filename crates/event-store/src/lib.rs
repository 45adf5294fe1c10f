pub mod error;
pub mod memory;
pub mod record;
pub mod store;

pub use common::{AggregateId, Context, ContextError};
pub use error::{EventStoreError, Result};
pub use memory::InMemoryEventStore;
pub use record::{History, Record, Version};
pub use store::{EventStore, EventStoreExt};
