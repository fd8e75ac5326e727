//! Event: an immutable record of something that happened.

use serde::{Deserialize, Serialize};

use crate::id::{EntityId, EventId};
use crate::time::{Timestamp, now};

/// What kind of thing happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// An entity's state or attributes changed.
    StateChanged,
    /// An entity was seen for the first time.
    EntityCreated,
    /// A device was registered or its metadata refreshed.
    DeviceUpdated,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::StateChanged => "state_changed",
            Self::EntityCreated => "entity_created",
            Self::DeviceUpdated => "device_updated",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub event_type: EventType,
    pub entity_id: Option<EntityId>,
    pub data: serde_json::Value,
    pub timestamp: Timestamp,
}

impl Event {
    /// Create an event stamped with the current time.
    #[must_use]
    pub fn new(event_type: EventType, entity_id: Option<EntityId>, data: serde_json::Value) -> Self {
        Self {
            id: EventId::new(),
            event_type,
            entity_id,
            data,
            timestamp: now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_serialize_event_type_as_snake_case() {
        let json = serde_json::to_string(&EventType::StateChanged).unwrap();
        assert_eq!(json, "\"state_changed\"");
        assert_eq!(EventType::DeviceUpdated.to_string(), "device_updated");
    }

    #[test]
    fn should_assign_fresh_id_to_each_event() {
        let a = Event::new(EventType::StateChanged, None, serde_json::json!({}));
        let b = Event::new(EventType::StateChanged, None, serde_json::json!({}));
        assert_ne!(a.id, b.id);
    }
}
