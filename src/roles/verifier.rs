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

use crate::did::{Did, DidDocument, Ed25519KeyPair, IdentityService};
use crate::errors::{Error, Result};
use crate::utils::util::generate_nonce;
use crate::vc::claim::{Claim, ClaimValue};
use crate::vc::credential::header_bytes;
use crate::vc::presentation::{DisclosedCredential, Presentation};
use crate::vc::repository::{IssuerKeyStore, PresentationRepository};
use crate::vc::DeploymentSuite;
use elliptic_curve::subtle::ConstantTimeEq;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// The verifier role: issues challenge nonces, checks presentations against
/// the issuers' published public keys and enforces policy (trusted issuers,
/// required claims). Verified presentations are appended to the audit log.
pub struct Verifier {
    identity: Arc<dyn IdentityService>,
    keys: Arc<dyn IssuerKeyStore>,
    presentations: Arc<dyn PresentationRepository>,
}

/// The result of verifier setup.
pub struct VerifierSetup {
    /// The freshly allocated verifier DID.
    pub did: Did,
    /// The published DID document.
    pub document: DidDocument,
    /// The DID-level Ed25519 keypair.
    pub signing_keys: Ed25519KeyPair,
}

/// A verification challenge: the policy plus a fresh 32-byte nonce the holder
/// must bind every proof to.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct VerificationRequest {
    /// Claim names every valid presentation must reveal.
    pub required_claims: Vec<String>,
    /// Issuer DIDs the verifier accepts. An empty list disables the issuer
    /// check entirely: any issuer with a resolvable key is accepted.
    pub trusted_issuers: Vec<String>,
    /// The challenge nonce.
    pub nonce: Vec<u8>,
}

/// The outcome of presentation verification: a single boolean plus
/// human-readable error strings per failing credential.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Whether every check passed.
    pub valid: bool,
    /// Human-readable failure descriptions; empty when valid.
    pub errors: Vec<String>,
    /// Revealed claims, keyed by credential id then claim name.
    pub revealed_claims: BTreeMap<String, BTreeMap<String, ClaimValue>>,
    /// The holder DID declared by the presentation.
    pub holder_did: String,
    /// The issuer DIDs of the disclosed credentials.
    pub issuer_dids: Vec<String>,
    /// The ids of the disclosed credentials.
    pub credential_ids: Vec<String>,
}

impl Verifier {
    /// Creates a verifier over the shared identity service, (public-key-only)
    /// issuer key store and presentation log.
    pub fn new(
        identity: Arc<dyn IdentityService>,
        keys: Arc<dyn IssuerKeyStore>,
        presentations: Arc<dyn PresentationRepository>,
    ) -> Self {
        Self { identity, keys, presentations }
    }

    /// Allocates a DID and publishes its document.
    pub fn setup_verifier(&self, method: &str) -> Result<VerifierSetup> {
        let (did, signing_keys) = self.identity.allocate_did(method)?;
        let document = self.identity.create_document(&did, &signing_keys)?;
        debug!("verifier setup complete for {did}");
        Ok(VerifierSetup { did, document, signing_keys })
    }

    /// Builds a verification request with a fresh 32-byte random nonce.
    pub fn create_verification_request(
        &self,
        required_claims: Vec<String>,
        trusted_issuers: Vec<String>,
    ) -> VerificationRequest {
        VerificationRequest { required_claims, trusted_issuers, nonce: generate_nonce() }
    }

    /// Verifies a presentation against a previously created request:
    /// nonce equality (constant time), per-credential issuer trust, proof
    /// validity over the rebuilt header and revealed messages, and finally the
    /// required-claims policy. Cryptographic failures are terminal and reported
    /// per credential; a failing store of the audit record is reported without
    /// invalidating the verification.
    pub fn verify_presentation(
        &self,
        presentation: &Presentation,
        request: &VerificationRequest,
    ) -> VerificationResult {
        let mut result = VerificationResult {
            valid: true,
            errors: Vec::new(),
            revealed_claims: BTreeMap::new(),
            holder_did: presentation.holder.clone(),
            issuer_dids: Vec::new(),
            credential_ids: Vec::new(),
        };

        let nonce = match presentation.nonce_bytes() {
            Ok(nonce) => nonce,
            Err(e) => {
                result.valid = false;
                result.errors.push(format!("presentation nonce: {e}"));
                return result;
            }
        };
        if !bool::from(nonce.as_slice().ct_eq(request.nonce.as_slice())) {
            result.valid = false;
            result.errors.push(Error::NonceMismatch.to_string());
            return result;
        }

        for (index, disclosed) in presentation.disclosed_credentials.iter().enumerate() {
            result.issuer_dids.push(disclosed.issuer.clone());
            result.credential_ids.push(disclosed.credential_id.clone());

            if !request.trusted_issuers.is_empty()
                && !request.trusted_issuers.contains(&disclosed.issuer)
            {
                result.valid = false;
                result
                    .errors
                    .push(format!("credential {index}: {}", Error::UntrustedIssuer(disclosed.issuer.clone())));
                continue;
            }

            match self.verify_disclosed(disclosed, &nonce) {
                Ok(claims) => {
                    let entry = result
                        .revealed_claims
                        .entry(disclosed.credential_id.clone())
                        .or_default();
                    for claim in claims {
                        entry.insert(claim.key, claim.value);
                    }
                }
                Err(e) => {
                    result.valid = false;
                    result.errors.push(format!("credential {index}: {e}"));
                }
            }
        }

        let revealed_names: BTreeSet<&String> =
            result.revealed_claims.values().flat_map(|m| m.keys()).collect();
        for required in &request.required_claims {
            if !revealed_names.contains(required) {
                result.valid = false;
                result
                    .errors
                    .push(Error::MissingRequiredClaim(required.clone()).to_string());
            }
        }

        if result.valid {
            if let Err(e) = self.presentations.store(presentation) {
                // Reported but the verification outcome stands; the caller decides.
                result.errors.push(format!("failed to store presentation: {e}"));
            }
        }

        debug!(
            "verified presentation {}: valid={} errors={}",
            presentation.id,
            result.valid,
            result.errors.len()
        );
        result
    }

    /// Lists the audit log of verified presentations for a holder.
    pub fn list_verified_presentations(&self, holder_did: &str) -> Result<Vec<Presentation>> {
        self.presentations.list(holder_did)
    }

    /// Checks one disclosed credential: rebuilds the header from the declared
    /// fields, canonicalizes the revealed claims at their claimed indices and
    /// verifies the selective-disclosure proof under the issuer's public key.
    fn verify_disclosed(&self, disclosed: &DisclosedCredential, nonce: &[u8]) -> Result<Vec<Claim>> {
        let n = disclosed.total_messages;
        if n < 2 {
            return Err(Error::InvalidProof);
        }
        if disclosed.revealed_indexes.len() != disclosed.revealed_claims.len() {
            return Err(Error::InvalidProof);
        }
        // Layout indices are 1-based claim positions, strictly ascending,
        // at most n - 1 (index 0 is the header and stays implicit).
        for pair in disclosed.revealed_indexes.windows(2) {
            if pair[0] >= pair[1] {
                return Err(Error::InvalidProof);
            }
        }
        if let Some(&last) = disclosed.revealed_indexes.last() {
            if last >= n {
                return Err(Error::InvalidProof);
            }
        }
        if disclosed.revealed_indexes.iter().any(|&i| i == 0) {
            return Err(Error::InvalidProof);
        }

        let header = header_bytes(
            &disclosed.issuer,
            &disclosed.subject_id,
            &disclosed.issued_at,
            &disclosed.credential_id,
        );

        // Primitive message indices: header at 1, layout index k at k + 1.
        let mut revealed: Vec<(usize, Vec<u8>)> = Vec::with_capacity(disclosed.revealed_claims.len() + 1);
        revealed.push((1, header));
        for (layout, claim) in disclosed.revealed_indexes.iter().zip(&disclosed.revealed_claims) {
            revealed.push((layout + 1, claim.message_bytes()));
        }

        let pk = self.keys.get_pk(&disclosed.issuer).map_err(|e| match e {
            Error::NotFound(_) => Error::UnknownIssuer(disclosed.issuer.clone()),
            other => other,
        })?;

        let proof = disclosed.proof_signature()?;
        proof.proof_verify::<DeploymentSuite>(&pk, &revealed, nonce, n)?;

        Ok(disclosed.revealed_claims.clone())
    }
}
