// Copyright 2025 Fondazione LINKS

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at

//     http://www.apache.org/licenses/LICENSE-2.0

// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde::{Deserialize, Serialize};

/// ASCII unit separator, the delimiter of the canonical message layout.
pub const UNIT_SEPARATOR: u8 = 0x1F;

/// A claim value: a tagged union over strings, integers and booleans.
/// Nulls are unrepresentable at this layer by construction.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClaimValue {
    /// UTF-8 string value
    String(String),
    /// Signed integer value
    Integer(i64),
    /// Boolean value
    Boolean(bool),
}

impl ClaimValue {
    /// The canonical byte encoding of the value, pinned for the life of the
    /// deployment: the JSON encoding (strings quoted and escaped, integers in
    /// decimal without superfluous zeros, booleans `true`/`false`). The signed
    /// message bytes and the test vectors depend on this choice.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        // serde_json is deterministic over these three scalar shapes.
        serde_json::to_vec(self).unwrap_or_default()
    }
}

impl From<&str> for ClaimValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<i64> for ClaimValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for ClaimValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// A single named claim in a credential.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Claim {
    /// Claim name, unique within one credential.
    pub key: String,
    /// Claim value.
    pub value: ClaimValue,
}

impl Claim {
    /// Builds a claim.
    pub fn new(key: impl Into<String>, value: impl Into<ClaimValue>) -> Self {
        Self { key: key.into(), value: value.into() }
    }

    /// The canonical message bytes of the claim:
    /// `key || 0x1F || canonical_value_bytes`.
    pub fn message_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.key.len() + 1 + 16);
        bytes.extend_from_slice(self.key.as_bytes());
        bytes.push(UNIT_SEPARATOR);
        bytes.extend_from_slice(&self.value.canonical_bytes());
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_bytes_are_pinned() {
        assert_eq!(ClaimValue::from("An").canonical_bytes(), b"\"An\"");
        assert_eq!(ClaimValue::from(18i64).canonical_bytes(), b"18");
        assert_eq!(ClaimValue::from(true).canonical_bytes(), b"true");
        assert_eq!(ClaimValue::from(false).canonical_bytes(), b"false");
        assert_eq!(ClaimValue::from(-7i64).canonical_bytes(), b"-7");
    }

    #[test]
    fn message_bytes_use_unit_separator() {
        let claim = Claim::new("ageOver18", true);
        assert_eq!(claim.message_bytes(), b"ageOver18\x1ftrue");
    }

    #[test]
    fn envelope_round_trip() {
        let claims = vec![
            Claim::new("firstName", "An"),
            Claim::new("age", 25i64),
            Claim::new("ageOver18", true),
        ];
        let json = serde_json::to_string(&claims).unwrap();
        let back: Vec<Claim> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, claims);
    }
}
