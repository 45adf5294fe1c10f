use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{AggregateId, Context, EventStore, History, Record, Result, Version};

/// In-memory event store implementation.
///
/// Cloning the store yields another handle onto the same logs, so several
/// repositories can share one store. Appends are serialized by the write lock.
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    streams: Arc<RwLock<HashMap<AggregateId, Vec<Record>>>>,
}

impl InMemoryEventStore {
    /// Creates a new empty in-memory event store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of records stored across all aggregates.
    pub async fn event_count(&self) -> usize {
        self.streams.read().await.values().map(Vec::len).sum()
    }

    /// Returns the number of aggregates with at least one record.
    pub async fn aggregate_count(&self) -> usize {
        self.streams.read().await.len()
    }

    /// Clears all records.
    pub async fn clear(&self) {
        self.streams.write().await.clear();
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(
        &self,
        ctx: &Context,
        aggregate_id: &AggregateId,
        records: Vec<Record>,
    ) -> Result<()> {
        ctx.check()?;
        if records.is_empty() {
            return Ok(());
        }

        let mut streams = self.streams.write().await;
        // The lock wait is the only suspension point; re-check before mutating.
        ctx.check()?;

        tracing::trace!(%aggregate_id, count = records.len(), "appending records");
        streams
            .entry(aggregate_id.clone())
            .or_default()
            .extend(records);

        Ok(())
    }

    async fn fetch(
        &self,
        ctx: &Context,
        aggregate_id: &AggregateId,
        after: Option<Version>,
    ) -> Result<History> {
        ctx.check()?;

        let streams = self.streams.read().await;
        let Some(stream) = streams.get(aggregate_id) else {
            return Ok(History::new());
        };

        let mut history: History = stream
            .iter()
            .filter(|r| after.is_none_or(|after| r.version > after))
            .cloned()
            .collect();
        // Stable sort keeps append order for equal versions.
        history.sort_by_key(|r| r.version);
        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{EventStoreError, EventStoreExt};
    use common::ContextError;

    fn create_test_record(version: i64, data: &str) -> Record {
        Record::new(Version::new(version), Utc::now(), data.as_bytes())
    }

    fn payloads(history: &History) -> Vec<&[u8]> {
        history.iter().map(|r| r.data.as_slice()).collect()
    }

    #[tokio::test]
    async fn append_single_record() {
        let store = InMemoryEventStore::new();
        let ctx = Context::background();
        let id = AggregateId::from("order-1");

        store
            .append(&ctx, &id, vec![create_test_record(1, "a")])
            .await
            .unwrap();

        let history = store.fetch_all(&ctx, &id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(store.event_count().await, 1);
    }

    #[tokio::test]
    async fn append_preserves_call_order() {
        let store = InMemoryEventStore::new();
        let ctx = Context::background();
        let id = AggregateId::from("order-1");

        store
            .append(
                &ctx,
                &id,
                vec![create_test_record(0, "a"), create_test_record(1, "b")],
            )
            .await
            .unwrap();
        store
            .append(&ctx, &id, vec![create_test_record(2, "c")])
            .await
            .unwrap();

        let history = store.fetch_all(&ctx, &id).await.unwrap();
        assert_eq!(payloads(&history), vec![&b"a"[..], &b"b"[..], &b"c"[..]]);
    }

    #[tokio::test]
    async fn fetch_sorts_by_version() {
        let store = InMemoryEventStore::new();
        let ctx = Context::background();
        let id = AggregateId::from("order-1");

        store
            .append(
                &ctx,
                &id,
                vec![create_test_record(3, "c"), create_test_record(1, "a")],
            )
            .await
            .unwrap();
        store
            .append(&ctx, &id, vec![create_test_record(2, "b")])
            .await
            .unwrap();

        let history = store.fetch_all(&ctx, &id).await.unwrap();
        let versions: Vec<i64> = history.iter().map(|r| r.version.as_i64()).collect();
        assert_eq!(versions, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn fetch_after_version_is_exclusive() {
        let store = InMemoryEventStore::new();
        let ctx = Context::background();
        let id = AggregateId::from("order-1");

        let records = (0..4).map(|v| create_test_record(v, "x")).collect();
        store.append(&ctx, &id, records).await.unwrap();

        let after = store
            .fetch(&ctx, &id, Some(Version::first()))
            .await
            .unwrap();
        assert_eq!(after.len(), 2);
        assert_eq!(after[0].version, Version::new(2));
        assert_eq!(after[1].version, Version::new(3));

        let all = store.fetch(&ctx, &id, None).await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].version, Version::initial());
    }

    #[tokio::test]
    async fn fetch_unknown_aggregate_is_empty() {
        let store = InMemoryEventStore::new();
        let ctx = Context::background();

        let history = store
            .fetch_all(&ctx, &AggregateId::from("missing"))
            .await
            .unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn aggregates_are_isolated() {
        let store = InMemoryEventStore::new();
        let ctx = Context::background();
        let id1 = AggregateId::from("a");
        let id2 = AggregateId::from("b");

        store
            .append(&ctx, &id1, vec![create_test_record(1, "one")])
            .await
            .unwrap();
        store
            .append(&ctx, &id2, vec![create_test_record(1, "two")])
            .await
            .unwrap();

        let history = store.fetch_all(&ctx, &id1).await.unwrap();
        assert_eq!(payloads(&history), vec![&b"one"[..]]);
        assert_eq!(store.aggregate_count().await, 2);
    }

    #[tokio::test]
    async fn empty_append_creates_nothing() {
        let store = InMemoryEventStore::new();
        let ctx = Context::background();

        store
            .append(&ctx, &AggregateId::from("a"), Vec::new())
            .await
            .unwrap();
        assert_eq!(store.aggregate_count().await, 0);
    }

    #[tokio::test]
    async fn cancelled_context_rejects_operations() {
        let store = InMemoryEventStore::new();
        let ctx = Context::background();
        let id = AggregateId::from("a");
        ctx.cancel();

        let result = store
            .append(&ctx, &id, vec![create_test_record(1, "a")])
            .await;
        assert!(matches!(
            result,
            Err(EventStoreError::Cancelled(ContextError::Canceled))
        ));
        assert_eq!(store.event_count().await, 0);

        let result = store.fetch_all(&ctx, &id).await;
        assert!(matches!(result, Err(EventStoreError::Cancelled(_))));
    }

    #[tokio::test]
    async fn current_version_and_exists() {
        let store = InMemoryEventStore::new();
        let ctx = Context::background();
        let id = AggregateId::from("a");

        assert!(store.current_version(&ctx, &id).await.unwrap().is_none());
        assert!(!store.aggregate_exists(&ctx, &id).await.unwrap());

        let records = vec![create_test_record(1, "a"), create_test_record(2, "b")];
        store.append(&ctx, &id, records).await.unwrap();

        assert_eq!(
            store.current_version(&ctx, &id).await.unwrap(),
            Some(Version::new(2))
        );
        assert!(store.aggregate_exists(&ctx, &id).await.unwrap());
    }

    #[tokio::test]
    async fn clones_share_state_and_clear() {
        let store = InMemoryEventStore::new();
        let handle = store.clone();
        let ctx = Context::background();
        let id = AggregateId::from("a");

        handle
            .append(&ctx, &id, vec![create_test_record(1, "a")])
            .await
            .unwrap();
        assert_eq!(store.event_count().await, 1);

        store.clear().await;
        assert_eq!(handle.event_count().await, 0);
    }

    #[tokio::test]
    async fn shared_through_arc_dyn() {
        let store: Arc<dyn EventStore> = Arc::new(InMemoryEventStore::new());
        let ctx = Context::background();
        let id = AggregateId::from("a");

        store
            .append(&ctx, &id, vec![create_test_record(1, "a")])
            .await
            .unwrap();
        assert!(store.aggregate_exists(&ctx, &id).await.unwrap());
    }
}
