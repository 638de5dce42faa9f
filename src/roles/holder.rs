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

use crate::bbsplus::proof::BBSplusPoKSignature;
use crate::did::{Did, DidDocument, Ed25519KeyPair, IdentityService};
use crate::errors::{Error, Result};
use crate::vc::credential::Credential;
use crate::vc::presentation::{
    encode_nonce, DisclosedCredential, Presentation, PresentationProof, SelectiveDisclosureRequest,
    DISCLOSURE_PROOF_TYPE,
};
use crate::vc::repository::{CredentialRepository, IssuerKeyStore};
use crate::vc::DeploymentSuite;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use log::debug;
use std::sync::Arc;
use uuid::Uuid;

/// The holder role: keeps received credentials (validating their signatures on
/// receipt) and derives selective-disclosure presentations from them. A holder
/// has a DID but no BBS+ key.
pub struct Holder {
    identity: Arc<dyn IdentityService>,
    credentials: Arc<dyn CredentialRepository>,
    keys: Arc<dyn IssuerKeyStore>,
}

/// The result of holder setup.
pub struct HolderSetup {
    /// The freshly allocated holder DID.
    pub did: Did,
    /// The published DID document.
    pub document: DidDocument,
    /// The DID-level Ed25519 keypair.
    pub signing_keys: Ed25519KeyPair,
}

/// A request to derive a presentation from stored credentials. Every enclosed
/// credential is proven against the same verifier nonce.
pub struct PresentationRequest {
    /// The holder deriving the presentation.
    pub holder_did: String,
    /// Which credentials to disclose from, and which claims to reveal.
    pub disclosures: Vec<SelectiveDisclosureRequest>,
    /// The verifier challenge nonce, echoed into every proof.
    pub nonce: Vec<u8>,
}

impl Holder {
    /// Creates a holder over the shared identity service, credential store and
    /// (read-only) issuer key store.
    pub fn new(
        identity: Arc<dyn IdentityService>,
        credentials: Arc<dyn CredentialRepository>,
        keys: Arc<dyn IssuerKeyStore>,
    ) -> Self {
        Self { identity, credentials, keys }
    }

    /// Allocates a DID and publishes its document. No BBS+ key is generated.
    pub fn setup_holder(&self, method: &str) -> Result<HolderSetup> {
        let (did, signing_keys) = self.identity.allocate_did(method)?;
        let document = self.identity.create_document(&did, &signing_keys)?;
        debug!("holder setup complete for {did}");
        Ok(HolderSetup { did, document, signing_keys })
    }

    /// Validates the credential's signature under the issuer's published public
    /// key, then stores it. A tampered credential is rejected with
    /// [`Error::InvalidSignature`] and never stored.
    pub fn store_credential(&self, credential: &Credential) -> Result<()> {
        let pk = self.keys.get_pk(&credential.issuer).map_err(|e| match e {
            Error::NotFound(_) => Error::UnknownIssuer(credential.issuer.clone()),
            other => other,
        })?;
        credential
            .signature()?
            .verify::<DeploymentSuite>(&pk, &credential.message_vector())?;

        self.credentials.store(credential)?;
        debug!("stored credential {}", credential.id);
        Ok(())
    }

    /// Lists the stored credentials belonging to a holder DID.
    pub fn list_credentials(&self, holder_did: &str) -> Result<Vec<Credential>> {
        self.credentials.list(holder_did)
    }

    /// Retrieves one stored credential.
    pub fn get_credential(&self, credential_id: &str) -> Result<Credential> {
        self.credentials.retrieve(credential_id)
    }

    /// Derives a presentation: for every disclosure request, resolves the
    /// revealed attribute names to message indices, generates a
    /// selective-disclosure proof bound to the verifier nonce, and emits a
    /// record carrying only the revealed claims. The header (issuer, subject,
    /// id, issuance time) is always revealed.
    pub fn create_presentation(&self, request: &PresentationRequest) -> Result<Presentation> {
        if request.holder_did.is_empty() {
            return Err(Error::InvalidArgument("holder DID is required".to_owned()));
        }
        if request.disclosures.is_empty() {
            return Err(Error::InvalidArgument("at least one disclosure is required".to_owned()));
        }
        if request.nonce.is_empty() {
            return Err(Error::InvalidArgument("verifier nonce is required".to_owned()));
        }

        let mut disclosed = Vec::with_capacity(request.disclosures.len());
        for disclosure in &request.disclosures {
            if !disclosure.nonce.is_empty() && disclosure.nonce != request.nonce {
                return Err(Error::InvalidArgument(
                    "all credentials in a presentation share the verifier nonce".to_owned(),
                ));
            }
            disclosed.push(self.disclose(disclosure, &request.holder_did, &request.nonce)?);
        }

        let presentation = Presentation {
            id: Uuid::new_v4().to_string(),
            holder: request.holder_did.clone(),
            created: Utc::now(),
            disclosed_credentials: disclosed,
            nonce: encode_nonce(&request.nonce),
        };
        debug!(
            "created presentation {} over {} credentials",
            presentation.id,
            presentation.disclosed_credentials.len()
        );
        Ok(presentation)
    }

    fn disclose(
        &self,
        disclosure: &SelectiveDisclosureRequest,
        holder_did: &str,
        nonce: &[u8],
    ) -> Result<DisclosedCredential> {
        let credential = self.credentials.retrieve(&disclosure.credential_id)?;
        if credential.subject_id != holder_did {
            return Err(Error::InvalidArgument(format!(
                "credential {} does not belong to {holder_did}",
                credential.id
            )));
        }

        // Resolve names to claim positions, deduplicating repeated names.
        let mut positions: Vec<usize> = Vec::with_capacity(disclosure.revealed_attributes.len());
        for name in &disclosure.revealed_attributes {
            let position = credential
                .claim_position(name)
                .ok_or_else(|| Error::UnknownAttribute(name.clone()))?;
            if !positions.contains(&position) {
                positions.push(position);
            }
        }
        positions.sort_unstable();

        // Primitive (1-based) message indices: the header at index 1 is always
        // revealed; the claim at list position p sits at index p + 2.
        let mut revealed_indexes = vec![1usize];
        revealed_indexes.extend(positions.iter().map(|p| p + 2));

        let pk = self.keys.get_pk(&credential.issuer).map_err(|e| match e {
            Error::NotFound(_) => Error::UnknownIssuer(credential.issuer.clone()),
            other => other,
        })?;
        let signature = credential.signature()?;
        let messages = credential.message_vector();

        let proof = BBSplusPoKSignature::proof_gen::<DeploymentSuite>(
            &signature,
            &pk,
            &messages,
            &revealed_indexes,
            nonce,
        )?;

        Ok(DisclosedCredential {
            credential_id: credential.id.clone(),
            issuer: credential.issuer.clone(),
            subject_id: credential.subject_id.clone(),
            issued_at: credential.issued_at,
            total_messages: credential.message_count(),
            revealed_indexes: positions.iter().map(|p| p + 1).collect(),
            revealed_claims: positions.iter().map(|p| credential.claims[*p].clone()).collect(),
            proof: PresentationProof {
                proof_type: DISCLOSURE_PROOF_TYPE.to_owned(),
                created: Utc::now(),
                verification_method: format!("{}#bbs-key-1", credential.issuer),
                proof_value: BASE64.encode(proof.to_bytes()),
                nonce: encode_nonce(nonce),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::did::Ed25519IdentityService;
    use crate::roles::issuer::Issuer;
    use crate::vc::claim::Claim;
    use crate::vc::repository::{InMemoryCredentialRepository, InMemoryIssuerKeyStore};

    struct Fixture {
        issuer: Issuer,
        holder: Holder,
        issuer_did: String,
        holder_did: String,
    }

    fn fixture() -> Fixture {
        let identity = Arc::new(Ed25519IdentityService::new());
        let keys = Arc::new(InMemoryIssuerKeyStore::new());
        let credentials = Arc::new(InMemoryCredentialRepository::new());

        let issuer = Issuer::new(identity.clone(), keys.clone());
        let holder = Holder::new(identity.clone(), credentials, keys);

        let issuer_did = issuer.setup_issuer("example").unwrap().did.to_string();
        let holder_did = holder.setup_holder("example").unwrap().did.to_string();
        Fixture { issuer, holder, issuer_did, holder_did }
    }

    fn claims() -> Vec<Claim> {
        vec![
            Claim::new("firstName", "An"),
            Claim::new("lastName", "Nguyen Van"),
            Claim::new("dateOfBirth", "2000-01-20"),
            Claim::new("nationality", "Vietnamese"),
        ]
    }

    #[test]
    fn store_accepts_valid_credential() {
        let fx = fixture();
        let credential = fx.issuer.issue_credential(&fx.issuer_did, &fx.holder_did, claims()).unwrap();
        assert!(fx.holder.store_credential(&credential).is_ok());
        assert_eq!(fx.holder.list_credentials(&fx.holder_did).unwrap().len(), 1);
        assert_eq!(fx.holder.get_credential(&credential.id).unwrap(), credential);
    }

    #[test]
    fn store_rejects_tampered_claim() {
        let fx = fixture();
        let mut credential =
            fx.issuer.issue_credential(&fx.issuer_did, &fx.holder_did, claims()).unwrap();
        credential.claims[2].value = "1990-01-20".into();

        assert_eq!(fx.holder.store_credential(&credential), Err(Error::InvalidSignature));
        assert!(fx.holder.list_credentials(&fx.holder_did).unwrap().is_empty());
    }

    #[test]
    fn presentation_reveals_selected_names_only() {
        let fx = fixture();
        let credential = fx.issuer.issue_credential(&fx.issuer_did, &fx.holder_did, claims()).unwrap();
        fx.holder.store_credential(&credential).unwrap();

        let presentation = fx
            .holder
            .create_presentation(&PresentationRequest {
                holder_did: fx.holder_did.clone(),
                disclosures: vec![SelectiveDisclosureRequest {
                    credential_id: credential.id.clone(),
                    revealed_attributes: vec!["dateOfBirth".to_owned(), "nationality".to_owned()],
                    nonce: vec![],
                }],
                nonce: vec![9u8; 32],
            })
            .unwrap();

        let disclosed = &presentation.disclosed_credentials[0];
        let revealed_names: Vec<&str> =
            disclosed.revealed_claims.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(revealed_names, ["dateOfBirth", "nationality"]);
        assert_eq!(disclosed.revealed_indexes, [3, 4]);
        assert_eq!(disclosed.total_messages, 5);
        assert!(!serde_json::to_string(&presentation).unwrap().contains("Nguyen Van"));
    }

    #[test]
    fn unknown_attribute_is_rejected() {
        let fx = fixture();
        let credential = fx.issuer.issue_credential(&fx.issuer_did, &fx.holder_did, claims()).unwrap();
        fx.holder.store_credential(&credential).unwrap();

        let result = fx.holder.create_presentation(&PresentationRequest {
            holder_did: fx.holder_did.clone(),
            disclosures: vec![SelectiveDisclosureRequest {
                credential_id: credential.id.clone(),
                revealed_attributes: vec!["shoeSize".to_owned()],
                nonce: vec![],
            }],
            nonce: vec![9u8; 32],
        });
        assert_eq!(result, Err(Error::UnknownAttribute("shoeSize".to_owned())));
    }

    #[test]
    fn foreign_credential_is_rejected() {
        let fx = fixture();
        let credential = fx
            .issuer
            .issue_credential(&fx.issuer_did, "did:example:someone-else", claims())
            .unwrap();
        fx.holder.credentials.store(&credential).unwrap();

        let result = fx.holder.create_presentation(&PresentationRequest {
            holder_did: fx.holder_did.clone(),
            disclosures: vec![SelectiveDisclosureRequest {
                credential_id: credential.id.clone(),
                revealed_attributes: vec!["firstName".to_owned()],
                nonce: vec![],
            }],
            nonce: vec![9u8; 32],
        });
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn empty_nonce_is_rejected() {
        let fx = fixture();
        let credential = fx.issuer.issue_credential(&fx.issuer_did, &fx.holder_did, claims()).unwrap();
        fx.holder.store_credential(&credential).unwrap();

        let result = fx.holder.create_presentation(&PresentationRequest {
            holder_did: fx.holder_did.clone(),
            disclosures: vec![SelectiveDisclosureRequest {
                credential_id: credential.id,
                revealed_attributes: vec!["firstName".to_owned()],
                nonce: vec![],
            }],
            nonce: vec![],
        });
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }
}
