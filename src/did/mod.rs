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

//! A minimal identity layer: DIDs as opaque naming handles for issuers,
//! holders and verifiers. The default implementation generates an Ed25519
//! keypair, base58-encodes the public key and forms `did:<method>:<base58>`.
//! Credentials are signed with BBS+ keys regardless of the DID method; this
//! interface is orthogonal to the signature scheme.

use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

/// A decentralized identifier, `did:<method>:<identifier>`.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Did {
    /// DID method name.
    pub method: String,
    /// Method-specific identifier.
    pub identifier: String,
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "did:{}:{}", self.method, self.identifier)
    }
}

/// The Ed25519 keypair behind a DID, with its verification-method key id.
#[derive(Clone, Debug)]
pub struct Ed25519KeyPair {
    /// Signing key; never serialized.
    pub signing_key: SigningKey,
    /// Public key.
    pub verifying_key: VerifyingKey,
    /// Key id, `<did>#key-1`.
    pub key_id: String,
}

/// A verification method inside a DID document.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct VerificationMethod {
    /// Key id.
    pub id: String,
    /// Always `Ed25519VerificationKey2020` for the default implementation.
    #[serde(rename = "type")]
    pub method_type: String,
    /// The DID controlling the key.
    pub controller: String,
    /// Multibase encoding of the public key (`z` + base58).
    pub public_key_multibase: String,
}

/// A DID document recording the public key material of a DID.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct DidDocument {
    /// JSON-LD contexts.
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    /// The DID.
    pub id: String,
    /// Verification methods.
    pub verification_method: Vec<VerificationMethod>,
    /// Key ids usable for authentication.
    pub authentication: Vec<String>,
    /// Key ids usable for assertions.
    pub assertion_method: Vec<String>,
    /// Creation time.
    pub created: DateTime<Utc>,
    /// Last update time.
    pub updated: DateTime<Utc>,
}

/// The identity interface consumed by the role workflows.
pub trait IdentityService: Send + Sync {
    /// Allocates a DID under the given method together with its signing keypair.
    fn allocate_did(&self, method: &str) -> Result<(Did, Ed25519KeyPair)>;
    /// Builds and registers the DID document for an allocated DID.
    fn create_document(&self, did: &Did, keys: &Ed25519KeyPair) -> Result<DidDocument>;
    /// Resolves a DID string to its document.
    fn resolve(&self, did: &str) -> Result<DidDocument>;
}

/// Default identity service: Ed25519 keys, base58 identifiers, in-memory
/// document registry.
#[derive(Default)]
pub struct Ed25519IdentityService {
    documents: RwLock<HashMap<String, DidDocument>>,
}

impl Ed25519IdentityService {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Structural check of a DID document: a non-empty id, at least one
    /// verification method, and every authentication reference resolving to a
    /// listed verification method.
    pub fn verify_document(document: &DidDocument) -> Result<()> {
        if document.id.is_empty() {
            return Err(Error::InvalidArgument("DID document id is empty".to_owned()));
        }
        if document.verification_method.is_empty() {
            return Err(Error::InvalidArgument(
                "DID document must have at least one verification method".to_owned(),
            ));
        }
        for auth in &document.authentication {
            if !document.verification_method.iter().any(|vm| &vm.id == auth) {
                return Err(Error::InvalidArgument(format!(
                    "authentication method {auth} not found in verification methods"
                )));
            }
        }
        Ok(())
    }
}

impl IdentityService for Ed25519IdentityService {
    fn allocate_did(&self, method: &str) -> Result<(Did, Ed25519KeyPair)> {
        if method.is_empty() {
            return Err(Error::InvalidArgument("DID method is empty".to_owned()));
        }

        let signing_key = SigningKey::generate(&mut OsRng);
        let verifying_key = signing_key.verifying_key();

        let did = Did {
            method: method.to_owned(),
            identifier: bs58::encode(verifying_key.to_bytes()).into_string(),
        };
        let key_id = format!("{did}#key-1");

        Ok((did, Ed25519KeyPair { signing_key, verifying_key, key_id }))
    }

    fn create_document(&self, did: &Did, keys: &Ed25519KeyPair) -> Result<DidDocument> {
        let now = Utc::now();
        let verification_method = VerificationMethod {
            id: keys.key_id.clone(),
            method_type: "Ed25519VerificationKey2020".to_owned(),
            controller: did.to_string(),
            public_key_multibase: format!("z{}", bs58::encode(keys.verifying_key.to_bytes()).into_string()),
        };

        let document = DidDocument {
            context: vec![
                "https://www.w3.org/ns/did/v1".to_owned(),
                "https://w3id.org/security/suites/ed25519-2020/v1".to_owned(),
            ],
            id: did.to_string(),
            verification_method: vec![verification_method],
            authentication: vec![keys.key_id.clone()],
            assertion_method: vec![keys.key_id.clone()],
            created: now,
            updated: now,
        };

        let mut documents = self.documents.write().unwrap_or_else(|e| e.into_inner());
        documents.insert(document.id.clone(), document.clone());

        Ok(document)
    }

    fn resolve(&self, did: &str) -> Result<DidDocument> {
        let documents = self.documents.read().unwrap_or_else(|e| e.into_inner());
        documents
            .get(did)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("DID document {did}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocated_did_has_base58_identifier() {
        let service = Ed25519IdentityService::new();
        let (did, keys) = service.allocate_did("example").unwrap();

        assert_eq!(did.method, "example");
        assert_eq!(
            bs58::decode(&did.identifier).into_vec().unwrap(),
            keys.verifying_key.to_bytes()
        );
        assert!(did.to_string().starts_with("did:example:"));
        assert_eq!(keys.key_id, format!("{did}#key-1"));
    }

    #[test]
    fn document_registers_and_resolves() {
        let service = Ed25519IdentityService::new();
        let (did, keys) = service.allocate_did("example").unwrap();
        let document = service.create_document(&did, &keys).unwrap();

        assert!(Ed25519IdentityService::verify_document(&document).is_ok());
        assert_eq!(service.resolve(&did.to_string()).unwrap(), document);
        assert!(matches!(service.resolve("did:example:missing"), Err(Error::NotFound(_))));
    }

    #[test]
    fn dangling_authentication_is_rejected() {
        let service = Ed25519IdentityService::new();
        let (did, keys) = service.allocate_did("example").unwrap();
        let mut document = service.create_document(&did, &keys).unwrap();
        document.authentication.push(format!("{did}#key-2"));

        assert!(Ed25519IdentityService::verify_document(&document).is_err());
    }

    #[test]
    fn distinct_allocations_yield_distinct_dids() {
        let service = Ed25519IdentityService::new();
        let (a, _) = service.allocate_did("example").unwrap();
        let (b, _) = service.allocate_did("example").unwrap();
        assert_ne!(a, b);
    }
}
