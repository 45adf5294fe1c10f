//! Domain event traits and the embeddable [`Model`].

use std::any::Any;
use std::fmt;

use chrono::{DateTime, Utc};
use common::AggregateId;
use event_store::Version;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::finite::ensure_finite;

/// Type-erased access to an event's concrete value and its field encoding.
///
/// Implemented automatically for every `Serialize + 'static` type, so event
/// types only ever implement [`Event`].
pub trait EventData: Any + Send + Sync {
    /// Returns the event as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Encodes the event's fields as JSON.
    fn to_raw_json(&self) -> serde_json::Result<Box<RawValue>>;
}

impl<T> EventData for T
where
    T: Serialize + Any + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn to_raw_json(&self) -> serde_json::Result<Box<RawValue>> {
        // serde_json would silently write NaN and infinities as null.
        ensure_finite(self)?;
        serde_json::value::to_raw_value(self)
    }
}

/// Trait for domain events.
///
/// An event is an immutable fact about one aggregate. Events are stored under
/// a type name: by default the short name of the concrete Rust type
/// (`EntityCreated` for `my_app::events::EntityCreated`); override
/// [`event_type`](Event::event_type) to pin a stable name independent of the
/// Rust type.
pub trait Event: EventData + fmt::Debug + 'static {
    /// Returns the id of the aggregate this event belongs to.
    fn aggregate_id(&self) -> &str;

    /// Returns the version of the event within its aggregate.
    fn event_version(&self) -> Version;

    /// Returns when the event happened.
    fn event_at(&self) -> DateTime<Utc>;

    /// Returns the event type name used as the serialized type tag.
    fn event_type(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }
}

impl dyn Event {
    /// Returns true if the event is of type `T`.
    pub fn is<T: Event>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Downcasts the event to a concrete type.
    pub fn downcast_ref<T: Event>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Strips module paths and generic arguments from a Rust type name.
pub(crate) fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Fields shared by most events: aggregate id, version and timestamp.
///
/// Embed it in an event struct and delegate the [`Event`] accessors to it.
/// The default is an empty id at the initial version, stamped at the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    /// Aggregate the event belongs to.
    pub id: AggregateId,

    /// Version of the event within the aggregate.
    pub version: Version,

    /// When the event happened.
    pub at: DateTime<Utc>,
}

impl Model {
    /// Creates a model for the given aggregate, version and timestamp.
    pub fn new(id: impl Into<AggregateId>, version: Version, at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            version,
            at,
        }
    }

    /// Creates a model stamped with the current time.
    pub fn now(id: impl Into<AggregateId>, version: Version) -> Self {
        Self::new(id, version, Utc::now())
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new("", Version::initial(), DateTime::<Utc>::UNIX_EPOCH)
    }
}
