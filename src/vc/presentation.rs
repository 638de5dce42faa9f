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

use super::claim::Claim;
use crate::bbsplus::proof::BBSplusPoKSignature;
use crate::errors::{Error, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Proof type of a presentation-level envelope: carries a selective-disclosure
/// proof derived from a credential signature.
pub const DISCLOSURE_PROOF_TYPE: &str = "BbsBlsSignatureProof2020";

/// What a holder is asked to reveal from one credential.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct SelectiveDisclosureRequest {
    /// The credential to disclose from.
    pub credential_id: String,
    /// Names of the claims to reveal.
    pub revealed_attributes: Vec<String>,
    /// Verifier challenge nonce. All credentials inside one presentation share
    /// the same nonce; an empty field inherits the presentation-level nonce.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nonce: Vec<u8>,
}

/// The proof envelope attached to one disclosed credential.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct PresentationProof {
    /// Always [`DISCLOSURE_PROOF_TYPE`].
    #[serde(rename = "type")]
    pub proof_type: String,
    /// Creation time of the proof.
    pub created: DateTime<Utc>,
    /// Key reference, `<issuer did>#bbs-key-1`.
    pub verification_method: String,
    /// Base64 (standard alphabet) of the serialized selective-disclosure proof.
    pub proof_value: String,
    /// Base64 of the challenge nonce the proof was bound to.
    pub nonce: String,
}

/// One credential's disclosed view inside a presentation: the declared header
/// fields, the revealed claims with their layout indices, and the proof.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct DisclosedCredential {
    /// Id of the source credential.
    pub credential_id: String,
    /// DID of the issuer.
    pub issuer: String,
    /// DID of the subject; revealed through the header by default.
    pub subject_id: String,
    /// Declared issuance time, needed to rebuild the header message.
    pub issued_at: DateTime<Utc>,
    /// Total number of signed messages (claims + header) of the source credential.
    pub total_messages: usize,
    /// Layout indices (1-based claim positions; the header's index 0 is always
    /// revealed and therefore implicit) of the revealed claims, ascending.
    pub revealed_indexes: Vec<usize>,
    /// The revealed claims, aligned with `revealed_indexes`.
    pub revealed_claims: Vec<Claim>,
    /// The selective-disclosure proof envelope.
    pub proof: PresentationProof,
}

impl DisclosedCredential {
    /// Decodes the enclosed selective-disclosure proof.
    pub fn proof_signature(&self) -> Result<BBSplusPoKSignature> {
        if self.proof.proof_type != DISCLOSURE_PROOF_TYPE {
            return Err(Error::InvalidEncoding(format!(
                "unexpected presentation proof type {}",
                self.proof.proof_type
            )));
        }
        let bytes = BASE64
            .decode(&self.proof.proof_value)
            .map_err(|_| Error::InvalidEncoding("presentation proof is not valid base64".to_owned()))?;
        BBSplusPoKSignature::from_bytes(&bytes)
    }
}

/// A verifiable presentation: one or more disclosed credentials bound to a
/// single verifier challenge nonce. Presentations are created per verification
/// event and never mutated afterwards.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Presentation {
    /// Presentation id (UUID).
    pub id: String,
    /// DID of the holder.
    pub holder: String,
    /// Creation time.
    pub created: DateTime<Utc>,
    /// The disclosed credentials.
    pub disclosed_credentials: Vec<DisclosedCredential>,
    /// Base64 of the verifier challenge nonce, identical for every enclosed proof.
    pub nonce: String,
}

impl Presentation {
    /// Decodes the challenge nonce.
    pub fn nonce_bytes(&self) -> Result<Vec<u8>> {
        BASE64
            .decode(&self.nonce)
            .map_err(|_| Error::InvalidEncoding("presentation nonce is not valid base64".to_owned()))
    }
}

/// Base64-encodes a nonce for embedding into an envelope.
pub(crate) fn encode_nonce(nonce: &[u8]) -> String {
    BASE64.encode(nonce)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonce_round_trip() {
        let presentation = Presentation {
            id: "p-1".to_owned(),
            holder: "did:example:holder".to_owned(),
            created: Utc::now(),
            disclosed_credentials: vec![],
            nonce: encode_nonce(&[7u8; 32]),
        };
        assert_eq!(presentation.nonce_bytes().unwrap(), vec![7u8; 32]);
    }

    #[test]
    fn malformed_nonce_is_rejected() {
        let presentation = Presentation {
            id: "p-1".to_owned(),
            holder: "did:example:holder".to_owned(),
            created: Utc::now(),
            disclosed_credentials: vec![],
            nonce: "not-base64!".to_owned(),
        };
        assert!(matches!(presentation.nonce_bytes(), Err(Error::InvalidEncoding(_))));
    }
}
