//! FIDE identifier validation.
//!
//! Rosters are checked by collaborators before they reach the engine; this
//! type gives them one place to do it.

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// An eight-digit FIDE identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FideId(String);

impl FideId {
    /// Required number of digits.
    pub const LEN: usize = 8;

    /// Parses a FIDE id, accepting exactly eight ASCII digits.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        if s.len() != Self::LEN || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidFideId(s.to_string()));
        }
        Ok(FideId(s.to_string()))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FideId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for FideId {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        FideId::parse(&s)
    }
}

impl From<FideId> for String {
    fn from(id: FideId) -> Self {
        id.0
    }
}
