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

use super::claim::{Claim, UNIT_SEPARATOR};
use crate::bbsplus::signature::BBSplusSignature;
use crate::errors::{Error, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Proof type of a credential-level envelope: carries the BBS+ signature
/// itself, never a derived form.
pub const SIGNATURE_PROOF_TYPE: &str = "BbsBlsSignature2020";

/// The signature envelope attached to a credential.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct CredentialProof {
    /// Always [`SIGNATURE_PROOF_TYPE`].
    #[serde(rename = "type")]
    pub proof_type: String,
    /// Creation time of the proof.
    pub created: DateTime<Utc>,
    /// Key reference, `<issuer did>#bbs-key-1`.
    pub verification_method: String,
    /// Base64 (standard alphabet) of the 112-byte signature.
    pub proof_value: String,
}

/// A verifiable credential: an ordered claim list signed, together with a
/// binding header, under the issuer's BBS+ key.
///
/// The signed message vector has length `claims.len() + 1`; layout index 0 is
/// the header, layout index `k >= 1` is the k-th claim. Primitive (1-based)
/// message indices are layout indices shifted by one. Credentials are
/// immutable once issued; changing the claim order invalidates the signature.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Credential {
    /// Credential id (UUID).
    pub id: String,
    /// DID of the issuer.
    pub issuer: String,
    /// DID of the holder the credential is about.
    pub subject_id: String,
    /// Issuance time, bound into the signed header.
    pub issued_at: DateTime<Utc>,
    /// Ordered claim list; the order defines the message indices.
    pub claims: Vec<Claim>,
    /// The signature envelope.
    pub proof: CredentialProof,
}

impl Credential {
    /// The canonical header bytes, always message layout index 0:
    /// `issuer || 0x1F || subject || 0x1F || issued_at RFC 3339 || 0x1F || id`.
    pub fn header_bytes(&self) -> Vec<u8> {
        header_bytes(&self.issuer, &self.subject_id, &self.issued_at, &self.id)
    }

    /// The full signed message vector: header followed by the claims in order.
    pub fn message_vector(&self) -> Vec<Vec<u8>> {
        let mut messages = Vec::with_capacity(self.claims.len() + 1);
        messages.push(self.header_bytes());
        for claim in &self.claims {
            messages.push(claim.message_bytes());
        }
        messages
    }

    /// Number of signed messages, claims plus the header.
    pub fn message_count(&self) -> usize {
        self.claims.len() + 1
    }

    /// The position of a claim in the claim list, by name.
    pub fn claim_position(&self, name: &str) -> Option<usize> {
        self.claims.iter().position(|c| c.key == name)
    }

    /// Decodes the enclosed BBS+ signature from the envelope.
    pub fn signature(&self) -> Result<BBSplusSignature> {
        if self.proof.proof_type != SIGNATURE_PROOF_TYPE {
            return Err(Error::InvalidEncoding(format!(
                "unexpected credential proof type {}",
                self.proof.proof_type
            )));
        }
        let bytes = BASE64
            .decode(&self.proof.proof_value)
            .map_err(|_| Error::InvalidEncoding("credential proof is not valid base64".to_owned()))?;
        let bytes: [u8; BBSplusSignature::BYTES] = bytes
            .try_into()
            .map_err(|_| Error::InvalidEncoding("credential signature must be 112 bytes".to_owned()))?;
        BBSplusSignature::from_bytes(&bytes)
    }
}

/// Canonical header bytes from the individual fields. The verifier rebuilds
/// these from the disclosed credential's declared issuer/subject/id/time, so
/// the timestamp format (RFC 3339, seconds precision, `Z` offset) is pinned.
pub fn header_bytes(
    issuer: &str,
    subject_id: &str,
    issued_at: &DateTime<Utc>,
    credential_id: &str,
) -> Vec<u8> {
    let issued_at = issued_at.to_rfc3339_opts(SecondsFormat::Secs, true);
    let mut bytes = Vec::with_capacity(
        issuer.len() + subject_id.len() + issued_at.len() + credential_id.len() + 3,
    );
    bytes.extend_from_slice(issuer.as_bytes());
    bytes.push(UNIT_SEPARATOR);
    bytes.extend_from_slice(subject_id.as_bytes());
    bytes.push(UNIT_SEPARATOR);
    bytes.extend_from_slice(issued_at.as_bytes());
    bytes.push(UNIT_SEPARATOR);
    bytes.extend_from_slice(credential_id.as_bytes());
    bytes
}

/// Encodes a signature into a credential envelope proof.
pub(crate) fn signature_envelope(
    signature: &BBSplusSignature,
    issuer_did: &str,
    created: DateTime<Utc>,
) -> CredentialProof {
    CredentialProof {
        proof_type: SIGNATURE_PROOF_TYPE.to_owned(),
        created,
        verification_method: format!("{issuer_did}#bbs-key-1"),
        proof_value: BASE64.encode(signature.to_bytes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Credential {
        Credential {
            id: "9d5af910-55b8-4a91-8c70-6f4683e3a96d".to_owned(),
            issuer: "did:example:issuer".to_owned(),
            subject_id: "did:example:holder".to_owned(),
            issued_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
            claims: vec![Claim::new("dateOfBirth", "2000-01-20"), Claim::new("ageOver18", true)],
            proof: CredentialProof {
                proof_type: SIGNATURE_PROOF_TYPE.to_owned(),
                created: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
                verification_method: "did:example:issuer#bbs-key-1".to_owned(),
                proof_value: String::new(),
            },
        }
    }

    #[test]
    fn header_binds_all_fields() {
        let credential = sample();
        let header = credential.header_bytes();
        assert_eq!(
            header,
            b"did:example:issuer\x1fdid:example:holder\x1f2025-06-01T12:00:00Z\x1f9d5af910-55b8-4a91-8c70-6f4683e3a96d"
        );

        // the rebuilt header matches the credential's own
        let rebuilt = header_bytes(
            &credential.issuer,
            &credential.subject_id,
            &credential.issued_at,
            &credential.id,
        );
        assert_eq!(rebuilt, header);
    }

    #[test]
    fn message_vector_is_header_then_claims() {
        let credential = sample();
        let messages = credential.message_vector();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0], credential.header_bytes());
        assert_eq!(messages[1], b"dateOfBirth\x1f\"2000-01-20\"");
        assert_eq!(messages[2], b"ageOver18\x1ftrue");
        assert_eq!(credential.message_count(), 3);
    }

    #[test]
    fn claim_positions_follow_list_order() {
        let credential = sample();
        assert_eq!(credential.claim_position("dateOfBirth"), Some(0));
        assert_eq!(credential.claim_position("ageOver18"), Some(1));
        assert_eq!(credential.claim_position("unknown"), None);
    }

    #[test]
    fn envelope_json_round_trip() {
        let credential = sample();
        let json = serde_json::to_string(&credential).unwrap();
        assert!(json.contains("\"type\":\"BbsBlsSignature2020\""));
        let back: Credential = serde_json::from_str(&json).unwrap();
        assert_eq!(back, credential);
    }
}
