//! A named entity and its events.

use chrono::{DateTime, Utc};
use eventsource::{Aggregate, Event, Model, Version};
use serde::{Deserialize, Serialize};

/// The entity was created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityCreated {
    #[serde(flatten)]
    pub model: Model,
}

/// The entity's name was set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityNameSet {
    #[serde(flatten)]
    pub model: Model,
    pub name: String,
}

impl Event for EntityCreated {
    fn aggregate_id(&self) -> &str {
        self.model.id.as_str()
    }

    fn event_version(&self) -> Version {
        self.model.version
    }

    fn event_at(&self) -> DateTime<Utc> {
        self.model.at
    }
}

impl Event for EntityNameSet {
    fn aggregate_id(&self) -> &str {
        self.model.id.as_str()
    }

    fn event_version(&self) -> Version {
        self.model.version
    }

    fn event_at(&self) -> DateTime<Utc> {
        self.model.at
    }
}

/// Entity state rebuilt from its events.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Entity {
    pub id: String,
    pub name: String,
    pub version: Version,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Aggregate for Entity {
    fn on(&mut self, event: &dyn Event) -> bool {
        if let Some(created) = event.downcast_ref::<EntityCreated>() {
            self.id = created.model.id.to_string();
            self.created_at = Some(created.model.at);
        } else if let Some(set) = event.downcast_ref::<EntityNameSet>() {
            self.name = set.name.clone();
        } else {
            return false;
        }
        self.version = event.event_version();
        self.updated_at = Some(event.event_at());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_then_named() {
        let mut entity = Entity::default();
        let created = EntityCreated {
            model: Model::now("e-1", Version::initial()),
        };
        let named = EntityNameSet {
            model: Model::now("e-1", Version::first()),
            name: "Jones".to_string(),
        };

        assert!(entity.on(&created));
        assert!(entity.on(&named));
        assert_eq!(entity.id, "e-1");
        assert_eq!(entity.name, "Jones");
        assert_eq!(entity.version, Version::first());
        assert_eq!(entity.updated_at, Some(named.model.at));
    }

    #[test]
    fn events_flatten_model_fields() {
        let named = EntityNameSet {
            model: Model::now("e-1", Version::first()),
            name: "Jones".to_string(),
        };
        let value = serde_json::to_value(&named).unwrap();
        assert_eq!(value["id"], "e-1");
        assert_eq!(value["name"], "Jones");
    }
}
