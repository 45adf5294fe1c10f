//! Event serialization.

use std::sync::Arc;

use event_store::Record;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::SerializerError;
use crate::event::Event;
use crate::registry::TypeRegistry;

/// Converts events to storage records and back.
pub trait Serializer: Send + Sync {
    /// Encodes an event into a record carrying the event's version and timestamp.
    fn serialize(&self, event: &dyn Event) -> Result<Record, SerializerError>;

    /// Decodes a record into the concrete event type bound to its type tag.
    fn deserialize(&self, record: &Record) -> Result<Box<dyn Event>, SerializerError>;
}

impl<T: Serializer + ?Sized> Serializer for Arc<T> {
    fn serialize(&self, event: &dyn Event) -> Result<Record, SerializerError> {
        (**self).serialize(event)
    }

    fn deserialize(&self, record: &Record) -> Result<Box<dyn Event>, SerializerError> {
        (**self).deserialize(record)
    }
}

impl<T: Serializer + ?Sized> Serializer for Box<T> {
    fn serialize(&self, event: &dyn Event) -> Result<Record, SerializerError> {
        (**self).serialize(event)
    }

    fn deserialize(&self, record: &Record) -> Result<Box<dyn Event>, SerializerError> {
        (**self).deserialize(record)
    }
}

/// Stored JSON envelope: `{"t": <type name>, "d": <event fields>}`.
#[derive(Serialize)]
struct EnvelopeOut<'a> {
    t: &'a str,
    d: &'a RawValue,
}

#[derive(Deserialize)]
struct EnvelopeIn<'a> {
    t: String,
    #[serde(borrow)]
    d: &'a RawValue,
}

/// JSON serializer resolving type tags through a [`TypeRegistry`].
#[derive(Debug, Clone, Default)]
pub struct JsonSerializer {
    registry: TypeRegistry,
}

impl JsonSerializer {
    /// Creates a serializer with no bound event types.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a serializer from an already populated registry.
    pub fn with_registry(registry: TypeRegistry) -> Self {
        Self { registry }
    }

    /// Binds `E` under the type name reported by `prototype`.
    pub fn bind<E>(&mut self, prototype: &E) -> &mut Self
    where
        E: Event + DeserializeOwned,
    {
        self.registry.bind(prototype);
        self
    }

    /// Binds `E` under an explicit type name.
    pub fn bind_as<E>(&mut self, name: impl Into<String>) -> &mut Self
    where
        E: Event + DeserializeOwned,
    {
        self.registry.bind_as::<E>(name);
        self
    }

    /// Returns the registry used for decoding.
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }
}

impl Serializer for JsonSerializer {
    fn serialize(&self, event: &dyn Event) -> Result<Record, SerializerError> {
        let event_type = event.event_type();

        let data = event
            .to_raw_json()
            .map_err(|e| SerializerError::encoding(format!("unable to encode {event_type}"), e))?;

        let envelope = EnvelopeOut {
            t: event_type,
            d: &data,
        };
        let bytes = serde_json::to_vec(&envelope)
            .map_err(|e| SerializerError::encoding("unable to encode event", e))?;

        Ok(Record::new(event.event_version(), event.event_at(), bytes))
    }

    fn deserialize(&self, record: &Record) -> Result<Box<dyn Event>, SerializerError> {
        let envelope: EnvelopeIn<'_> = serde_json::from_slice(&record.data)
            .map_err(|e| SerializerError::encoding("unable to unmarshal event", e))?;

        let decode =
            self.registry
                .resolve(&envelope.t)
                .ok_or_else(|| SerializerError::UnboundType {
                    event_type: envelope.t.clone(),
                })?;

        decode(envelope.d).map_err(|e| {
            SerializerError::encoding(
                format!("unable to unmarshal event data into {}", envelope.t),
                e,
            )
        })
    }
}
