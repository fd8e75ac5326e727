//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`AcBridgeError`] via `From` at port boundaries.

/// Top-level error returned across port boundaries.
#[derive(Debug, thiserror::Error)]
pub enum AcBridgeError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("service call rejected")]
    ServiceCall(#[from] ServiceCallError),

    /// Failure reported by an integration adapter (transport, protocol, …).
    #[error("integration error")]
    Integration(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A domain invariant was violated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("entity_id must not be empty")]
    EmptyEntityId,

    #[error("entity_id {0:?} must have the form <domain>.<object_id>")]
    InvalidEntityId(String),

    #[error("unique_id must not be empty")]
    EmptyUniqueId,

    #[error("missing required field {0}")]
    MissingField(&'static str),

    #[error("{field} = {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}

/// A requested resource does not exist.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// A service call could not be carried out.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceCallError {
    #[error("unknown service {0:?}")]
    UnknownService(String),

    #[error("missing service field {0}")]
    MissingField(&'static str),

    #[error("invalid value {value:?} for {field}")]
    InvalidValue { field: &'static str, value: String },

    #[error("{field} = {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("operation not permitted: {0}")]
    NotPermitted(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_validation_error_into_top_level() {
        let err: AcBridgeError = ValidationError::EmptyName.into();
        assert!(matches!(
            err,
            AcBridgeError::Validation(ValidationError::EmptyName)
        ));
    }

    #[test]
    fn should_display_not_found_with_kind_and_id() {
        let err = NotFoundError {
            entity: "Entity",
            id: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "Entity abc not found");
    }

    #[test]
    fn should_display_out_of_range_bounds() {
        let err = ValidationError::OutOfRange {
            field: "poll_interval_secs",
            value: 90,
            min: 5,
            max: 60,
        };
        assert_eq!(err.to_string(), "poll_interval_secs = 90 is outside 5..=60");
    }

    #[test]
    fn should_display_invalid_service_value() {
        let err = ServiceCallError::InvalidValue {
            field: "fan_mode",
            value: "turbo".to_string(),
        };
        assert_eq!(err.to_string(), "invalid value \"turbo\" for fan_mode");
    }

    #[test]
    fn should_wrap_foreign_error_as_integration() {
        let io = std::io::Error::other("boom");
        let err = AcBridgeError::Integration(Box::new(io));
        assert_eq!(err.to_string(), "integration error");
        assert!(std::error::Error::source(&err).is_some());
    }
}
