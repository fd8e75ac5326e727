//! Typed identifier newtypes backed by UUIDs.
//!
//! Identifiers for things that come from a physical device are derived from
//! the device's own unique id with [`from_name`](EntityId::from_name), so
//! they stay stable across restarts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Namespace for name-based (v5) identifiers.
const NAMESPACE: uuid::Uuid = uuid::Uuid::from_u128(0x6f1e_4c2a_9b3d_4e8f_a1c5_d7e9_0b2f_4a6c);

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident, $kind:literal) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl Default for $name {
            fn default() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl $name {
            /// Generate a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            /// Derive a stable identifier from an external unique name.
            ///
            /// The same name always yields the same identifier, and the
            /// identifier kinds never collide with each other.
            #[must_use]
            pub fn from_name(name: &str) -> Self {
                let scoped = format!("{}:{name}", $kind);
                Self(uuid::Uuid::new_v5(&NAMESPACE, scoped.as_bytes()))
            }

            #[must_use]
            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            #[must_use]
            pub fn as_uuid(self) -> uuid::Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s).map(Self)
            }
        }
    };
}

define_id!(
    /// Unique identifier for an [`Entity`](crate::entity::Entity).
    EntityId,
    "entity"
);

define_id!(
    /// Unique identifier for a [`Device`](crate::device::Device).
    DeviceId,
    "device"
);

define_id!(
    /// Unique identifier for an [`Event`](crate::event::Event).
    EventId,
    "event"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_generate_unique_ids_when_called_twice() {
        assert_ne!(EntityId::new(), EntityId::new());
    }

    #[test]
    fn should_derive_same_id_from_same_name() {
        assert_eq!(
            DeviceId::from_name("DAIKIN123456"),
            DeviceId::from_name("DAIKIN123456")
        );
    }

    #[test]
    fn should_derive_distinct_ids_for_distinct_kinds() {
        let entity = EntityId::from_name("DAIKIN123456");
        let device = DeviceId::from_name("DAIKIN123456");
        assert_ne!(entity.as_uuid(), device.as_uuid());
    }

    #[test]
    fn should_parse_displayed_id() {
        let id = DeviceId::new();
        let parsed: DeviceId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn should_serialize_as_bare_uuid_string() {
        let uuid = uuid::Uuid::nil();
        let json = serde_json::to_string(&EventId::from_uuid(uuid)).unwrap();
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000000\"");
    }

    #[test]
    fn should_return_error_when_parsing_invalid_uuid() {
        assert!(EntityId::from_str("not-a-uuid").is_err());
    }
}
