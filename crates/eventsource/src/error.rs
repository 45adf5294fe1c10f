//! Serializer and repository error types.

use common::{AggregateId, ContextError};
use event_store::EventStoreError;
use thiserror::Error;

/// Errors produced while encoding or decoding events.
#[derive(Debug, Error)]
pub enum SerializerError {
    /// The event payload could not be produced or parsed.
    #[error("{hint}: {source}")]
    Encoding {
        hint: String,
        #[source]
        source: serde_json::Error,
    },

    /// A record carried a type tag that no event type is bound to.
    #[error("unbound event type, {event_type}")]
    UnboundType { event_type: String },
}

impl SerializerError {
    pub(crate) fn encoding(hint: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Encoding {
            hint: hint.into(),
            source,
        }
    }
}

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// An event could not be serialized or a record could not be decoded.
    #[error(transparent)]
    Serializer(#[from] SerializerError),

    /// No events are stored for the aggregate.
    #[error("aggregate not found: {aggregate_id}")]
    NotFound { aggregate_id: AggregateId },

    /// The aggregate rejected an event from its own history.
    #[error("aggregate was unable to handle event - {event_type}")]
    UnhandledEvent { event_type: String },

    /// Events passed to one save belong to different aggregates.
    #[error("events in one save must share an aggregate id: expected {expected}, found {found}")]
    MixedAggregates {
        expected: AggregateId,
        found: AggregateId,
    },

    /// The operation context was cancelled or expired.
    #[error(transparent)]
    Cancelled(#[from] ContextError),

    /// The event store failed.
    #[error("event store error for aggregate {aggregate_id}: {source}")]
    Store {
        aggregate_id: AggregateId,
        #[source]
        source: EventStoreError,
    },
}

impl RepositoryError {
    /// Wraps a store error with the aggregate id being accessed.
    ///
    /// Cancellation reported by the store is surfaced as [`Cancelled`](Self::Cancelled).
    pub(crate) fn store(aggregate_id: &AggregateId, source: EventStoreError) -> Self {
        match source {
            EventStoreError::Cancelled(err) => Self::Cancelled(err),
            source => Self::Store {
                aggregate_id: aggregate_id.clone(),
                source,
            },
        }
    }

    /// Returns true if no events exist for the requested aggregate.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if the operation was cancelled or timed out.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_cancellation_is_surfaced_as_cancelled() {
        let id = AggregateId::from("a");
        let err = RepositoryError::store(
            &id,
            EventStoreError::Cancelled(ContextError::DeadlineExceeded),
        );
        assert!(matches!(
            err,
            RepositoryError::Cancelled(ContextError::DeadlineExceeded)
        ));
        assert!(err.is_cancelled());
    }

    #[test]
    fn store_error_carries_aggregate_id() {
        let id = AggregateId::from("order-9");
        let err = RepositoryError::store(&id, EventStoreError::backend("disk full"));
        assert_eq!(
            err.to_string(),
            "event store error for aggregate order-9: Event store backend error: disk full"
        );
    }

    #[test]
    fn unhandled_event_message_names_type() {
        let err = RepositoryError::UnhandledEvent {
            event_type: "EntityRenamed".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "aggregate was unable to handle event - EntityRenamed"
        );
        assert!(!err.is_not_found());
    }

    #[test]
    fn encoding_error_keeps_hint_and_cause() {
        let cause = serde_json::from_str::<u8>("\"x\"").unwrap_err();
        let err = SerializerError::encoding("unable to unmarshal event", cause);
        assert!(err.to_string().starts_with("unable to unmarshal event: "));
        assert!(std::error::Error::source(&err).is_some());
    }
}
