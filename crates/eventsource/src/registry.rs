//! Event type registry.
//!
//! Maps serialized type names to decode factories for the concrete event
//! types. The registry is an ordinary owned value: each serializer carries
//! its own, so repositories with different event sets never interfere.

use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::value::RawValue;

use crate::event::Event;

/// Decodes a raw JSON payload into a boxed event of a fixed concrete type.
pub type DecodeFn = fn(&RawValue) -> serde_json::Result<Box<dyn Event>>;

#[derive(Clone, Copy)]
struct Binding {
    rust_type: &'static str,
    decode: DecodeFn,
}

fn decode_as<E>(raw: &RawValue) -> serde_json::Result<Box<dyn Event>>
where
    E: Event + DeserializeOwned,
{
    let event: E = serde_json::from_str(raw.get())?;
    Ok(Box::new(event))
}

/// Mapping from event type name to concrete event type.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    bindings: HashMap<String, Binding>,
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.bindings.iter().map(|(name, b)| (name, b.rust_type)))
            .finish()
    }
}

impl TypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `E` under the type name reported by `prototype`.
    ///
    /// Rebinding a name replaces the previous mapping.
    pub fn bind<E>(&mut self, prototype: &E) -> &mut Self
    where
        E: Event + DeserializeOwned,
    {
        self.bind_as::<E>(prototype.event_type())
    }

    /// Binds `E` under an explicit type name.
    pub fn bind_as<E>(&mut self, name: impl Into<String>) -> &mut Self
    where
        E: Event + DeserializeOwned,
    {
        let name = name.into();
        let binding = Binding {
            rust_type: std::any::type_name::<E>(),
            decode: decode_as::<E>,
        };
        if let Some(previous) = self.bindings.insert(name.clone(), binding)
            && previous.rust_type != binding.rust_type
        {
            tracing::debug!(
                event_type = %name,
                previous = previous.rust_type,
                current = binding.rust_type,
                "event type rebound"
            );
        }
        self
    }

    /// Returns the decode factory registered for `name`.
    pub fn resolve(&self, name: &str) -> Option<DecodeFn> {
        self.bindings.get(name).map(|b| b.decode)
    }

    /// Returns the Rust type bound to `name`.
    pub fn rust_type(&self, name: &str) -> Option<&'static str> {
        self.bindings.get(name).map(|b| b.rust_type)
    }

    /// Returns true if `name` is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Returns the bound type names in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    /// Returns the number of bound type names.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
