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

use super::credential::Credential;
use super::presentation::Presentation;
use crate::bbsplus::keys::{BBSplusPublicKey, BBSplusSecretKey, KeyPair};
use crate::errors::{Error, Result};
use std::collections::HashMap;
use std::sync::RwLock;

/// Storage of credentials held by holders. Concurrent reads; writes serialized.
pub trait CredentialRepository: Send + Sync {
    /// Stores a credential under its id.
    fn store(&self, credential: &Credential) -> Result<()>;
    /// Retrieves a credential by id.
    fn retrieve(&self, id: &str) -> Result<Credential>;
    /// Lists all credentials whose subject is the given holder DID.
    fn list(&self, holder_did: &str) -> Result<Vec<Credential>>;
}

/// Append-only log of verified presentations, kept for audit.
pub trait PresentationRepository: Send + Sync {
    /// Appends a presentation.
    fn store(&self, presentation: &Presentation) -> Result<()>;
    /// Retrieves a presentation by id.
    fn retrieve(&self, id: &str) -> Result<Presentation>;
    /// Lists all presentations created by the given holder DID.
    fn list(&self, holder_did: &str) -> Result<Vec<Presentation>>;
}

/// Issuer key material, keyed by issuer DID. Only issuer setup writes; the
/// secret-key read exists for the issuer component alone and the secret never
/// travels beyond it.
pub trait IssuerKeyStore: Send + Sync {
    /// Registers a key pair for an issuer DID.
    fn put(&self, issuer_did: &str, keypair: KeyPair) -> Result<()>;
    /// The issuer's published public key.
    fn get_pk(&self, issuer_did: &str) -> Result<BBSplusPublicKey>;
    /// The issuer's secret key. Issuer-component use only.
    fn get_sk(&self, issuer_did: &str) -> Result<BBSplusSecretKey>;
}

/// In-memory credential store backed by a reader-writer lock.
#[derive(Default)]
pub struct InMemoryCredentialRepository {
    credentials: RwLock<HashMap<String, Credential>>,
}

impl InMemoryCredentialRepository {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialRepository for InMemoryCredentialRepository {
    fn store(&self, credential: &Credential) -> Result<()> {
        let mut credentials = self.credentials.write().unwrap_or_else(|e| e.into_inner());
        credentials.insert(credential.id.clone(), credential.clone());
        Ok(())
    }

    fn retrieve(&self, id: &str) -> Result<Credential> {
        let credentials = self.credentials.read().unwrap_or_else(|e| e.into_inner());
        credentials
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("credential {id}")))
    }

    fn list(&self, holder_did: &str) -> Result<Vec<Credential>> {
        let credentials = self.credentials.read().unwrap_or_else(|e| e.into_inner());
        Ok(credentials
            .values()
            .filter(|c| c.subject_id == holder_did)
            .cloned()
            .collect())
    }
}

/// In-memory presentation log backed by a reader-writer lock.
#[derive(Default)]
pub struct InMemoryPresentationRepository {
    presentations: RwLock<HashMap<String, Presentation>>,
}

impl InMemoryPresentationRepository {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PresentationRepository for InMemoryPresentationRepository {
    fn store(&self, presentation: &Presentation) -> Result<()> {
        let mut presentations = self.presentations.write().unwrap_or_else(|e| e.into_inner());
        presentations.insert(presentation.id.clone(), presentation.clone());
        Ok(())
    }

    fn retrieve(&self, id: &str) -> Result<Presentation> {
        let presentations = self.presentations.read().unwrap_or_else(|e| e.into_inner());
        presentations
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("presentation {id}")))
    }

    fn list(&self, holder_did: &str) -> Result<Vec<Presentation>> {
        let presentations = self.presentations.read().unwrap_or_else(|e| e.into_inner());
        Ok(presentations
            .values()
            .filter(|p| p.holder == holder_did)
            .cloned()
            .collect())
    }
}

/// In-memory issuer key store. Writers are rare (issuer setup only); readers
/// fetch the public key for issuance validation and proof verification.
#[derive(Default)]
pub struct InMemoryIssuerKeyStore {
    keys: RwLock<HashMap<String, KeyPair>>,
}

impl InMemoryIssuerKeyStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl IssuerKeyStore for InMemoryIssuerKeyStore {
    fn put(&self, issuer_did: &str, keypair: KeyPair) -> Result<()> {
        let mut keys = self.keys.write().unwrap_or_else(|e| e.into_inner());
        keys.insert(issuer_did.to_owned(), keypair);
        Ok(())
    }

    fn get_pk(&self, issuer_did: &str) -> Result<BBSplusPublicKey> {
        let keys = self.keys.read().unwrap_or_else(|e| e.into_inner());
        keys.get(issuer_did)
            .map(|kp| kp.public_key().clone())
            .ok_or_else(|| Error::NotFound(format!("issuer key for {issuer_did}")))
    }

    fn get_sk(&self, issuer_did: &str) -> Result<BBSplusSecretKey> {
        let keys = self.keys.read().unwrap_or_else(|e| e.into_inner());
        keys.get(issuer_did)
            .map(|kp| kp.private_key().clone())
            .ok_or_else(|| Error::NotFound(format!("issuer key for {issuer_did}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vc::claim::Claim;
    use crate::vc::credential::{CredentialProof, SIGNATURE_PROOF_TYPE};
    use chrono::Utc;

    fn sample_credential(id: &str, subject: &str) -> Credential {
        Credential {
            id: id.to_owned(),
            issuer: "did:example:issuer".to_owned(),
            subject_id: subject.to_owned(),
            issued_at: Utc::now(),
            claims: vec![Claim::new("k", "v")],
            proof: CredentialProof {
                proof_type: SIGNATURE_PROOF_TYPE.to_owned(),
                created: Utc::now(),
                verification_method: "did:example:issuer#bbs-key-1".to_owned(),
                proof_value: String::new(),
            },
        }
    }

    #[test]
    fn credential_store_round_trip() {
        let repo = InMemoryCredentialRepository::new();
        let credential = sample_credential("c-1", "did:example:alice");
        repo.store(&credential).unwrap();

        assert_eq!(repo.retrieve("c-1").unwrap(), credential);
        assert!(matches!(repo.retrieve("missing"), Err(Error::NotFound(_))));
    }

    #[test]
    fn list_filters_by_holder() {
        let repo = InMemoryCredentialRepository::new();
        repo.store(&sample_credential("c-1", "did:example:alice")).unwrap();
        repo.store(&sample_credential("c-2", "did:example:alice")).unwrap();
        repo.store(&sample_credential("c-3", "did:example:bob")).unwrap();

        assert_eq!(repo.list("did:example:alice").unwrap().len(), 2);
        assert_eq!(repo.list("did:example:bob").unwrap().len(), 1);
        assert!(repo.list("did:example:carol").unwrap().is_empty());
    }

    #[test]
    fn key_store_round_trip() {
        let store = InMemoryIssuerKeyStore::new();
        let keypair = KeyPair::random().unwrap();
        store.put("did:example:issuer", keypair.clone()).unwrap();

        assert_eq!(&store.get_pk("did:example:issuer").unwrap(), keypair.public_key());
        assert_eq!(&store.get_sk("did:example:issuer").unwrap(), keypair.private_key());
        assert!(matches!(store.get_pk("did:example:other"), Err(Error::NotFound(_))));
    }
}
