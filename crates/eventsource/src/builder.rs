//! Repository configuration.

use std::io::Write;
use std::marker::PhantomData;

use event_store::{EventStore, InMemoryEventStore};
use serde::de::DeserializeOwned;

use crate::aggregate::Aggregate;
use crate::debug::DebugLog;
use crate::event::Event;
use crate::repository::Repository;
use crate::serializer::{JsonSerializer, Serializer};

/// Builder for [`Repository`].
///
/// Starts from the JSON serializer and a fresh in-memory store. Replacing
/// the store or serializer changes the builder's type parameters.
///
/// ```ignore
/// let repository = Repository::<Order>::builder()
///     .store(shared_store.clone())
///     .bind(&OrderPlaced::default())
///     .debug(std::io::stderr())
///     .build();
/// ```
pub struct RepositoryBuilder<A, S = JsonSerializer, St = InMemoryEventStore> {
    serializer: S,
    store: St,
    debug: Option<DebugLog>,
    _aggregate: PhantomData<fn() -> A>,
}

impl<A: Aggregate> RepositoryBuilder<A> {
    /// Creates a builder with the default serializer and store.
    pub fn new() -> Self {
        Self {
            serializer: JsonSerializer::new(),
            store: InMemoryEventStore::new(),
            debug: None,
            _aggregate: PhantomData,
        }
    }
}

impl<A: Aggregate> Default for RepositoryBuilder<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, St> RepositoryBuilder<A, JsonSerializer, St> {
    /// Binds `E` on the JSON serializer.
    pub fn bind<E>(mut self, prototype: &E) -> Self
    where
        E: Event + DeserializeOwned,
    {
        self.serializer.bind(prototype);
        self
    }
}

impl<A, S, St> RepositoryBuilder<A, S, St>
where
    A: Aggregate,
    S: Serializer,
    St: EventStore,
{
    /// Replaces the event store.
    pub fn store<T: EventStore>(self, store: T) -> RepositoryBuilder<A, S, T> {
        RepositoryBuilder {
            serializer: self.serializer,
            store,
            debug: self.debug,
            _aggregate: PhantomData,
        }
    }

    /// Replaces the serializer.
    pub fn serializer<T: Serializer>(self, serializer: T) -> RepositoryBuilder<A, T, St> {
        RepositoryBuilder {
            serializer,
            store: self.store,
            debug: self.debug,
            _aggregate: PhantomData,
        }
    }

    /// Writes timestamped diagnostic lines to `writer`.
    pub fn debug(self, writer: impl Write + Send + 'static) -> Self {
        self.debug_log(DebugLog::new(writer))
    }

    /// Writes diagnostic lines to an existing sink.
    pub fn debug_log(mut self, log: DebugLog) -> Self {
        self.debug = Some(log);
        self
    }

    /// Builds the repository.
    pub fn build(self) -> Repository<A, S, St> {
        Repository {
            serializer: self.serializer,
            store: self.store,
            debug: self.debug,
            _aggregate: PhantomData,
        }
    }
}
