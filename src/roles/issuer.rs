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

use crate::bbsplus::keys::{BBSplusPublicKey, KeyPair};
use crate::bbsplus::signature::BBSplusSignature;
use crate::did::{Did, DidDocument, Ed25519KeyPair, IdentityService};
use crate::errors::{Error, Result};
use crate::vc::claim::Claim;
use crate::vc::credential::{header_bytes, signature_envelope, Credential};
use crate::vc::repository::IssuerKeyStore;
use crate::vc::DeploymentSuite;
use chrono::Utc;
use log::debug;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// The issuer role: allocates an identity, keeps the BBS+ signing key in the
/// key store, and signs credentials. The secret key never leaves this
/// component.
pub struct Issuer {
    identity: Arc<dyn IdentityService>,
    keys: Arc<dyn IssuerKeyStore>,
}

/// The result of issuer setup.
pub struct IssuerSetup {
    /// The freshly allocated issuer DID.
    pub did: Did,
    /// The published DID document.
    pub document: DidDocument,
    /// The DID-level Ed25519 keypair.
    pub signing_keys: Ed25519KeyPair,
    /// The issuer's published BBS+ public key.
    pub public_key: BBSplusPublicKey,
}

impl Issuer {
    /// Creates an issuer over the shared identity service and key store.
    pub fn new(identity: Arc<dyn IdentityService>, keys: Arc<dyn IssuerKeyStore>) -> Self {
        Self { identity, keys }
    }

    /// Allocates a DID, publishes its document, generates a BBS+ keypair and
    /// registers it in the key store under the new DID.
    pub fn setup_issuer(&self, method: &str) -> Result<IssuerSetup> {
        let (did, signing_keys) = self.identity.allocate_did(method)?;
        let document = self.identity.create_document(&did, &signing_keys)?;

        let keypair = KeyPair::random()?;
        let public_key = keypair.public_key().clone();
        self.keys.put(&did.to_string(), keypair)?;

        debug!("issuer setup complete for {did}");
        Ok(IssuerSetup { did, document, signing_keys, public_key })
    }

    /// Issues a credential over an ordered claim list. The claim order is fixed
    /// here and significant from then on. Fails with
    /// [`Error::UnknownIssuer`] when no keypair is registered for `issuer_did`.
    pub fn issue_credential(
        &self,
        issuer_did: &str,
        subject_id: &str,
        claims: Vec<Claim>,
    ) -> Result<Credential> {
        if issuer_did.is_empty() {
            return Err(Error::InvalidArgument("issuer DID is required".to_owned()));
        }
        if subject_id.is_empty() {
            return Err(Error::InvalidArgument("subject DID is required".to_owned()));
        }
        if claims.is_empty() {
            return Err(Error::InvalidArgument("at least one claim is required".to_owned()));
        }
        let mut seen = HashSet::new();
        for claim in &claims {
            if !seen.insert(claim.key.as_str()) {
                return Err(Error::InvalidArgument(format!("duplicate claim name {}", claim.key)));
            }
        }

        let sk = self.keys.get_sk(issuer_did).map_err(|e| match e {
            Error::NotFound(_) => Error::UnknownIssuer(issuer_did.to_owned()),
            other => other,
        })?;

        let id = Uuid::new_v4().to_string();
        let issued_at = Utc::now();

        let mut messages = Vec::with_capacity(claims.len() + 1);
        messages.push(header_bytes(issuer_did, subject_id, &issued_at, &id));
        for claim in &claims {
            messages.push(claim.message_bytes());
        }

        let signature = BBSplusSignature::sign::<DeploymentSuite>(&messages, &sk)?;

        debug!("issued credential {id} for {subject_id} with {} claims", claims.len());
        Ok(Credential {
            id,
            issuer: issuer_did.to_owned(),
            subject_id: subject_id.to_owned(),
            issued_at,
            claims,
            proof: signature_envelope(&signature, issuer_did, issued_at),
        })
    }

    /// Validates a credential's enclosed signature against the issuer's
    /// published public key.
    pub fn verify_credential(&self, credential: &Credential) -> Result<()> {
        let pk = self.keys.get_pk(&credential.issuer).map_err(|e| match e {
            Error::NotFound(_) => Error::UnknownIssuer(credential.issuer.clone()),
            other => other,
        })?;
        let signature = credential.signature()?;
        signature.verify::<DeploymentSuite>(&pk, &credential.message_vector())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::did::Ed25519IdentityService;
    use crate::vc::repository::InMemoryIssuerKeyStore;

    fn issuer() -> Issuer {
        Issuer::new(
            Arc::new(Ed25519IdentityService::new()),
            Arc::new(InMemoryIssuerKeyStore::new()),
        )
    }

    #[test]
    fn setup_registers_keys() {
        let issuer = issuer();
        let setup = issuer.setup_issuer("example").unwrap();
        assert!(setup.did.to_string().starts_with("did:example:"));

        let credential = issuer
            .issue_credential(&setup.did.to_string(), "did:example:subject", vec![Claim::new("k", "v")])
            .unwrap();
        assert!(issuer.verify_credential(&credential).is_ok());
    }

    #[test]
    fn unknown_issuer_is_rejected() {
        let issuer = issuer();
        assert_eq!(
            issuer.issue_credential("did:example:ghost", "did:example:subject", vec![Claim::new("k", "v")]),
            Err(Error::UnknownIssuer("did:example:ghost".to_owned()))
        );
    }

    #[test]
    fn empty_claim_list_is_rejected() {
        let issuer = issuer();
        let setup = issuer.setup_issuer("example").unwrap();
        assert!(matches!(
            issuer.issue_credential(&setup.did.to_string(), "did:example:subject", vec![]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn duplicate_claim_names_are_rejected() {
        let issuer = issuer();
        let setup = issuer.setup_issuer("example").unwrap();
        assert!(matches!(
            issuer.issue_credential(
                &setup.did.to_string(),
                "did:example:subject",
                vec![Claim::new("k", "a"), Claim::new("k", "b")],
            ),
            Err(Error::InvalidArgument(_))
        ));
    }
}
