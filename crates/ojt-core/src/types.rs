//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types and timer transitions.
///
/// Every variant is recoverable: the rejected operation leaves prior state
/// untouched and the message is suitable for showing to the user.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// No activity was chosen before starting or logging a session.
    #[error("select an activity before starting a session")]
    MissingActivity,

    /// The session has not reached the one-minute minimum.
    #[error("sessions must run for at least one minute (elapsed {elapsed_seconds}s)")]
    TooShort { elapsed_seconds: u64 },

    /// A duration was not a finite, positive number of minutes.
    #[error("duration must be a positive number of minutes, got {value}")]
    InvalidDuration { value: f64 },

    /// A training target was not a finite, positive number of hours.
    #[error("target must be a positive number of hours, got {value}")]
    InvalidTarget { value: f64 },
}

impl ValidationError {
    /// Stable machine-readable reason code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Empty { .. } => "empty",
            Self::MissingActivity => "missing-activity",
            Self::TooShort { .. } => "too-short",
            Self::InvalidDuration { .. } => "invalid-duration",
            Self::InvalidTarget { .. } => "invalid-target",
        }
    }
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated time entry identifier.
    ///
    /// Entry IDs are assigned by the entry store and must be non-empty.
    EntryId, "entry ID"
);

/// Returns `None` for blank strings, otherwise the trimmed value.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
