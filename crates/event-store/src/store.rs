use std::sync::Arc;

use async_trait::async_trait;

use crate::{AggregateId, Context, History, Record, Result, Version};

/// Core trait for event store implementations.
///
/// An event store keeps one append-only log of records per aggregate id.
/// All implementations must be thread-safe (Send + Sync).
///
/// Version conflict detection is not part of this contract. Concurrent
/// appends for the same aggregate may interleave; a store that wants
/// optimistic concurrency can enforce it inside `append`.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Appends records to the log of `aggregate_id`.
    ///
    /// Records are stored in the order given, and the call is atomic: either
    /// every record becomes visible or none does.
    async fn append(
        &self,
        ctx: &Context,
        aggregate_id: &AggregateId,
        records: Vec<Record>,
    ) -> Result<()>;

    /// Retrieves the records of `aggregate_id` with a version greater than
    /// `after`, or every record when `after` is `None`.
    ///
    /// Records are returned in ascending version order. An unknown aggregate
    /// yields an empty history rather than an error.
    async fn fetch(
        &self,
        ctx: &Context,
        aggregate_id: &AggregateId,
        after: Option<Version>,
    ) -> Result<History>;
}

/// Extension trait providing convenience methods for event stores.
#[async_trait]
pub trait EventStoreExt: EventStore {
    /// Retrieves the complete history of an aggregate.
    async fn fetch_all(&self, ctx: &Context, aggregate_id: &AggregateId) -> Result<History> {
        self.fetch(ctx, aggregate_id, None).await
    }

    /// Gets the version of the latest record of an aggregate.
    ///
    /// Returns None if the aggregate has no records.
    async fn current_version(
        &self,
        ctx: &Context,
        aggregate_id: &AggregateId,
    ) -> Result<Option<Version>> {
        let history = self.fetch_all(ctx, aggregate_id).await?;
        Ok(history.iter().map(|r| r.version).max())
    }

    /// Checks if an aggregate has any records.
    async fn aggregate_exists(&self, ctx: &Context, aggregate_id: &AggregateId) -> Result<bool> {
        Ok(self.current_version(ctx, aggregate_id).await?.is_some())
    }
}

// Blanket implementation for all EventStore implementations
impl<T: EventStore + ?Sized> EventStoreExt for T {}

#[async_trait]
impl<T: EventStore + ?Sized> EventStore for Arc<T> {
    async fn append(
        &self,
        ctx: &Context,
        aggregate_id: &AggregateId,
        records: Vec<Record>,
    ) -> Result<()> {
        (**self).append(ctx, aggregate_id, records).await
    }

    async fn fetch(
        &self,
        ctx: &Context,
        aggregate_id: &AggregateId,
        after: Option<Version>,
    ) -> Result<History> {
        (**self).fetch(ctx, aggregate_id, after).await
    }
}

#[async_trait]
impl<T: EventStore + ?Sized> EventStore for Box<T> {
    async fn append(
        &self,
        ctx: &Context,
        aggregate_id: &AggregateId,
        records: Vec<Record>,
    ) -> Result<()> {
        (**self).append(ctx, aggregate_id, records).await
    }

    async fn fetch(
        &self,
        ctx: &Context,
        aggregate_id: &AggregateId,
        after: Option<Version>,
    ) -> Result<History> {
        (**self).fetch(ctx, aggregate_id, after).await
    }
}
