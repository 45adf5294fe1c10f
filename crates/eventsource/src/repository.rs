//! Event-sourced repository.

use std::fmt;
use std::marker::PhantomData;

use common::{AggregateId, Context};
use event_store::{EventStore, History, InMemoryEventStore};
use serde::de::DeserializeOwned;

use crate::aggregate::Aggregate;
use crate::builder::RepositoryBuilder;
use crate::debug::DebugLog;
use crate::error::{RepositoryError, Result};
use crate::event::Event;
use crate::serializer::{JsonSerializer, Serializer};

/// Saves events and rebuilds aggregates by replaying them.
///
/// The repository owns no aggregate state. Every [`load`](Self::load) starts
/// from `A::default()` and folds the aggregate's full history into it.
///
/// By default events are encoded with [`JsonSerializer`] and kept in an
/// [`InMemoryEventStore`]; use [`Repository::builder`] to swap either.
pub struct Repository<A, S = JsonSerializer, St = InMemoryEventStore> {
    pub(crate) serializer: S,
    pub(crate) store: St,
    pub(crate) debug: Option<DebugLog>,
    pub(crate) _aggregate: PhantomData<fn() -> A>,
}

impl<A: Aggregate> Repository<A> {
    /// Creates a repository using the JSON serializer and an in-memory store.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Returns a builder for configuring the store, serializer and debug output.
    pub fn builder() -> RepositoryBuilder<A> {
        RepositoryBuilder::new()
    }
}

impl<A: Aggregate> Default for Repository<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, St> Repository<A, JsonSerializer, St> {
    /// Binds `E` so records of its type can be decoded on load.
    ///
    /// Binding requires exclusive access, so it necessarily happens before
    /// the repository is shared between tasks.
    pub fn bind<E>(&mut self, prototype: &E) -> &mut Self
    where
        E: Event + DeserializeOwned,
    {
        self.serializer.bind(prototype);
        self
    }
}

impl<A, S, St> Repository<A, S, St>
where
    A: Aggregate,
    S: Serializer,
    St: EventStore,
{
    /// Returns a new, empty aggregate.
    pub fn new_aggregate(&self) -> A {
        A::default()
    }

    /// Returns the serializer.
    pub fn serializer(&self) -> &S {
        &self.serializer
    }

    /// Returns the event store.
    pub fn store(&self) -> &St {
        &self.store
    }

    /// Serializes `events` and appends them to their aggregate's history in
    /// one store call.
    ///
    /// Saving nothing succeeds without touching the store. All events must
    /// belong to the same aggregate. Any failure aborts the whole batch.
    #[tracing::instrument(skip(self, ctx, events), fields(count = events.len()))]
    pub async fn save(&self, ctx: &Context, events: &[&dyn Event]) -> Result<()> {
        let Some(first) = events.first() else {
            return Ok(());
        };
        ctx.check()?;

        let aggregate_id = AggregateId::from(first.aggregate_id());
        let mut history = History::with_capacity(events.len());
        for event in events {
            let record = self.serializer.serialize(*event)?;
            if event.aggregate_id() != aggregate_id.as_str() {
                return Err(RepositoryError::MixedAggregates {
                    expected: aggregate_id,
                    found: AggregateId::from(event.aggregate_id()),
                });
            }
            history.push(record);
        }

        // No context check after a completed append: the batch is already committed.
        ctx.run(self.store.append(ctx, &aggregate_id, history))
            .await?
            .map_err(|e| RepositoryError::store(&aggregate_id, e))?;

        metrics::counter!("eventsource_events_saved_total").increment(events.len() as u64);
        tracing::debug!(%aggregate_id, "events saved");
        self.debug(format_args!(
            "Saved {} event(s) for aggregate id, {}",
            events.len(),
            aggregate_id
        ));

        Ok(())
    }

    /// Rebuilds the aggregate with the given id from its full history.
    ///
    /// Fails with [`RepositoryError::NotFound`] when nothing is stored for the
    /// id, and with [`RepositoryError::UnhandledEvent`] when the aggregate
    /// rejects one of its events. A failed load never yields an aggregate.
    #[tracing::instrument(skip(self, ctx, aggregate_id), fields(aggregate_id = tracing::field::Empty))]
    pub async fn load(&self, ctx: &Context, aggregate_id: impl Into<AggregateId>) -> Result<A> {
        let aggregate_id = aggregate_id.into();
        tracing::Span::current().record("aggregate_id", tracing::field::display(&aggregate_id));

        metrics::counter!("eventsource_loads_total").increment(1);
        let result = self.replay(ctx, &aggregate_id).await;
        if let Err(err) = &result {
            metrics::counter!("eventsource_load_failures_total").increment(1);
            tracing::debug!(error = %err, "load failed");
        }
        result
    }

    async fn replay(&self, ctx: &Context, aggregate_id: &AggregateId) -> Result<A> {
        let history = ctx
            .run(self.store.fetch(ctx, aggregate_id, None))
            .await?
            .map_err(|e| RepositoryError::store(aggregate_id, e))?;
        ctx.check()?;

        if history.is_empty() {
            return Err(RepositoryError::NotFound {
                aggregate_id: aggregate_id.clone(),
            });
        }

        self.debug(format_args!(
            "Loaded {} event(s) for aggregate id, {}",
            history.len(),
            aggregate_id
        ));

        let mut aggregate = self.new_aggregate();
        for record in &history {
            let event = self.serializer.deserialize(record)?;
            if !aggregate.on(&*event) {
                let event_type = event.event_type();
                tracing::warn!(event_type, version = %record.version, "aggregate rejected event");
                return Err(RepositoryError::UnhandledEvent {
                    event_type: event_type.to_string(),
                });
            }
        }

        metrics::histogram!("eventsource_replayed_events").record(history.len() as f64);
        Ok(aggregate)
    }

    fn debug(&self, args: fmt::Arguments<'_>) {
        if let Some(log) = &self.debug {
            log.log(args);
        }
    }
}
