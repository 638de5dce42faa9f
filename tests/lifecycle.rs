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

//! Full credential lifecycle: issuer setup, issuance, holder custody,
//! selective-disclosure presentation and verification.

use std::sync::Arc;

use zkcred::did::Ed25519IdentityService;
use zkcred::errors::Error;
use zkcred::roles::{Holder, Issuer, PresentationRequest, Verifier};
use zkcred::vc::claim::{Claim, ClaimValue};
use zkcred::vc::presentation::SelectiveDisclosureRequest;
use zkcred::vc::repository::{
    InMemoryCredentialRepository, InMemoryIssuerKeyStore, InMemoryPresentationRepository,
};

struct World {
    issuer: Issuer,
    holder: Holder,
    verifier: Verifier,
    issuer_did: String,
    holder_did: String,
}

fn world() -> World {
    let identity = Arc::new(Ed25519IdentityService::new());
    let keys = Arc::new(InMemoryIssuerKeyStore::new());
    let credentials = Arc::new(InMemoryCredentialRepository::new());
    let presentations = Arc::new(InMemoryPresentationRepository::new());

    let issuer = Issuer::new(identity.clone(), keys.clone());
    let holder = Holder::new(identity.clone(), credentials, keys.clone());
    let verifier = Verifier::new(identity, keys, presentations);

    let issuer_did = issuer.setup_issuer("example").unwrap().did.to_string();
    let holder_did = holder.setup_holder("example").unwrap().did.to_string();

    World { issuer, holder, verifier, issuer_did, holder_did }
}

fn identity_claims() -> Vec<Claim> {
    vec![
        Claim::new("firstName", "An"),
        Claim::new("lastName", "Nguyen Van"),
        Claim::new("dateOfBirth", "2000-01-20"),
        Claim::new("nationality", "Vietnamese"),
        Claim::new("address", "123 Nguyen Trai, Ha Noi"),
        Claim::new("idNumber", "012345678901"),
    ]
}

fn disclose(credential_id: &str, attributes: &[&str]) -> SelectiveDisclosureRequest {
    SelectiveDisclosureRequest {
        credential_id: credential_id.to_owned(),
        revealed_attributes: attributes.iter().map(|s| s.to_string()).collect(),
        nonce: vec![],
    }
}

#[test]
fn cinema_age_check_reveals_only_birth_date_and_nationality() {
    let w = world();
    let credential =
        w.issuer.issue_credential(&w.issuer_did, &w.holder_did, identity_claims()).unwrap();
    w.holder.store_credential(&credential).unwrap();

    let request = w.verifier.create_verification_request(
        vec!["dateOfBirth".to_owned(), "nationality".to_owned()],
        vec![w.issuer_did.clone()],
    );

    let presentation = w
        .holder
        .create_presentation(&PresentationRequest {
            holder_did: w.holder_did.clone(),
            disclosures: vec![disclose(&credential.id, &["dateOfBirth", "nationality"])],
            nonce: request.nonce.clone(),
        })
        .unwrap();

    let result = w.verifier.verify_presentation(&presentation, &request);
    assert!(result.valid, "errors: {:?}", result.errors);

    let revealed = &result.revealed_claims[&credential.id];
    assert_eq!(revealed.len(), 2);
    assert_eq!(revealed["dateOfBirth"], ClaimValue::from("2000-01-20"));
    assert_eq!(revealed["nationality"], ClaimValue::from("Vietnamese"));
    for hidden in ["firstName", "lastName", "address", "idNumber"] {
        assert!(!revealed.contains_key(hidden));
    }

    // the hidden values never appear in the serialized presentation either
    let envelope = serde_json::to_string(&presentation).unwrap();
    for hidden in ["Nguyen Van", "123 Nguyen Trai", "012345678901"] {
        assert!(!envelope.contains(hidden));
    }
}

#[test]
fn untrusted_issuer_is_rejected() {
    let w = world();
    let credential =
        w.issuer.issue_credential(&w.issuer_did, &w.holder_did, identity_claims()).unwrap();
    w.holder.store_credential(&credential).unwrap();

    let request = w.verifier.create_verification_request(
        vec!["dateOfBirth".to_owned(), "nationality".to_owned()],
        vec!["did:example:some-other-issuer".to_owned()],
    );

    let presentation = w
        .holder
        .create_presentation(&PresentationRequest {
            holder_did: w.holder_did.clone(),
            disclosures: vec![disclose(&credential.id, &["dateOfBirth", "nationality"])],
            nonce: request.nonce.clone(),
        })
        .unwrap();

    let result = w.verifier.verify_presentation(&presentation, &request);
    assert!(!result.valid);
    assert!(result
        .errors
        .iter()
        .any(|e| e.contains(&Error::UntrustedIssuer(w.issuer_did.clone()).to_string())));
}

#[test]
fn missing_required_claim_is_rejected() {
    let w = world();
    let credential =
        w.issuer.issue_credential(&w.issuer_did, &w.holder_did, identity_claims()).unwrap();
    w.holder.store_credential(&credential).unwrap();

    let request = w.verifier.create_verification_request(
        vec!["dateOfBirth".to_owned(), "nationality".to_owned()],
        vec![w.issuer_did.clone()],
    );

    let presentation = w
        .holder
        .create_presentation(&PresentationRequest {
            holder_did: w.holder_did.clone(),
            disclosures: vec![disclose(&credential.id, &["nationality"])],
            nonce: request.nonce.clone(),
        })
        .unwrap();

    let result = w.verifier.verify_presentation(&presentation, &request);
    assert!(!result.valid);
    assert!(result
        .errors
        .iter()
        .any(|e| e.contains(&Error::MissingRequiredClaim("dateOfBirth".to_owned()).to_string())));
}

#[test]
fn age_gating_via_boolean_claims() {
    let w = world();
    let claims = vec![
        Claim::new("firstName", "An"),
        Claim::new("dateOfBirth", "2000-01-20"),
        Claim::new("ageOver18", true),
        Claim::new("ageOver21", true),
        Claim::new("ageOver65", false),
    ];
    let credential = w.issuer.issue_credential(&w.issuer_did, &w.holder_did, claims).unwrap();
    w.holder.store_credential(&credential).unwrap();

    let request = w
        .verifier
        .create_verification_request(vec!["ageOver18".to_owned()], vec![w.issuer_did.clone()]);

    let presentation = w
        .holder
        .create_presentation(&PresentationRequest {
            holder_did: w.holder_did.clone(),
            disclosures: vec![disclose(&credential.id, &["ageOver18"])],
            nonce: request.nonce.clone(),
        })
        .unwrap();

    let result = w.verifier.verify_presentation(&presentation, &request);
    assert!(result.valid, "errors: {:?}", result.errors);

    let revealed = &result.revealed_claims[&credential.id];
    assert_eq!(revealed.len(), 1);
    assert_eq!(revealed["ageOver18"], ClaimValue::from(true));
    assert!(!revealed.contains_key("dateOfBirth"));
    assert!(!revealed.contains_key("ageOver65"));
}

#[test]
fn tampered_credential_is_rejected_at_storage() {
    let w = world();
    let mut credential =
        w.issuer.issue_credential(&w.issuer_did, &w.holder_did, identity_claims()).unwrap();
    credential.claims[3].value = "French".into();

    assert_eq!(w.holder.store_credential(&credential), Err(Error::InvalidSignature));
    assert!(w.holder.list_credentials(&w.holder_did).unwrap().is_empty());
}

#[test]
fn nonce_replay_is_rejected() {
    let w = world();
    let credential =
        w.issuer.issue_credential(&w.issuer_did, &w.holder_did, identity_claims()).unwrap();
    w.holder.store_credential(&credential).unwrap();

    // presentation bound to the first challenge
    let first = w
        .verifier
        .create_verification_request(vec!["nationality".to_owned()], vec![w.issuer_did.clone()]);
    let presentation = w
        .holder
        .create_presentation(&PresentationRequest {
            holder_did: w.holder_did.clone(),
            disclosures: vec![disclose(&credential.id, &["nationality"])],
            nonce: first.nonce.clone(),
        })
        .unwrap();

    // replayed against a fresh challenge
    let second = w
        .verifier
        .create_verification_request(vec!["nationality".to_owned()], vec![w.issuer_did.clone()]);
    let result = w.verifier.verify_presentation(&presentation, &second);
    assert!(!result.valid);
    assert_eq!(result.errors, [Error::NonceMismatch.to_string()]);
}

#[test]
fn one_presentation_can_span_multiple_credentials() {
    let w = world();
    let identity_credential =
        w.issuer.issue_credential(&w.issuer_did, &w.holder_did, identity_claims()).unwrap();
    let diploma = w
        .issuer
        .issue_credential(
            &w.issuer_did,
            &w.holder_did,
            vec![
                Claim::new("degree", "Engineering"),
                Claim::new("graduationYear", 2022i64),
            ],
        )
        .unwrap();
    w.holder.store_credential(&identity_credential).unwrap();
    w.holder.store_credential(&diploma).unwrap();

    let request = w.verifier.create_verification_request(
        vec!["nationality".to_owned(), "degree".to_owned()],
        vec![w.issuer_did.clone()],
    );

    let presentation = w
        .holder
        .create_presentation(&PresentationRequest {
            holder_did: w.holder_did.clone(),
            disclosures: vec![
                disclose(&identity_credential.id, &["nationality"]),
                disclose(&diploma.id, &["degree"]),
            ],
            nonce: request.nonce.clone(),
        })
        .unwrap();

    let result = w.verifier.verify_presentation(&presentation, &request);
    assert!(result.valid, "errors: {:?}", result.errors);
    assert_eq!(result.credential_ids.len(), 2);
    assert_eq!(
        result.revealed_claims[&diploma.id]["degree"],
        ClaimValue::from("Engineering")
    );
}

#[test]
fn revealing_nothing_still_proves_possession() {
    let w = world();
    let credential =
        w.issuer.issue_credential(&w.issuer_did, &w.holder_did, identity_claims()).unwrap();
    w.holder.store_credential(&credential).unwrap();

    let request = w.verifier.create_verification_request(vec![], vec![w.issuer_did.clone()]);
    let presentation = w
        .holder
        .create_presentation(&PresentationRequest {
            holder_did: w.holder_did.clone(),
            disclosures: vec![disclose(&credential.id, &[])],
            nonce: request.nonce.clone(),
        })
        .unwrap();

    // only the header (issuer, subject, id, issuance time) is revealed
    let result = w.verifier.verify_presentation(&presentation, &request);
    assert!(result.valid, "errors: {:?}", result.errors);
    assert!(result.revealed_claims[&credential.id].is_empty());
    assert!(presentation.disclosed_credentials[0].revealed_claims.is_empty());
}

#[test]
fn presentations_over_the_same_credential_are_unlinkable() {
    let w = world();
    let credential =
        w.issuer.issue_credential(&w.issuer_did, &w.holder_did, identity_claims()).unwrap();
    w.holder.store_credential(&credential).unwrap();

    let mut proofs = Vec::new();
    for _ in 0..2 {
        let request = w
            .verifier
            .create_verification_request(vec!["nationality".to_owned()], vec![w.issuer_did.clone()]);
        let presentation = w
            .holder
            .create_presentation(&PresentationRequest {
                holder_did: w.holder_did.clone(),
                disclosures: vec![disclose(&credential.id, &["nationality"])],
                nonce: request.nonce.clone(),
            })
            .unwrap();

        let result = w.verifier.verify_presentation(&presentation, &request);
        assert!(result.valid, "errors: {:?}", result.errors);
        proofs.push(presentation.disclosed_credentials[0].proof.proof_value.clone());
    }

    // fresh randomizers and nonces: the serialized proofs never coincide
    assert_ne!(proofs[0], proofs[1]);
}
