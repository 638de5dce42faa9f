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

//! Credential and presentation envelopes binding BBS+ outputs to named claims.
//!
//! A credential signs the vector `[header, claim_1, .., claim_n]` where the
//! header binds issuer, subject, credential id and issuance time. Claim order
//! is fixed by the issuer and significant: it defines the message indices the
//! selective-disclosure proofs speak about. The deployment ciphersuite is
//! pinned to [`crate::bbsplus::ciphersuites::Bls12381Sha256`].

/// Claim values and their canonical encoding
pub mod claim;
/// The credential envelope and canonical message layout
pub mod credential;
/// Presentations and selective-disclosure requests
pub mod presentation;
/// Repository interfaces and in-memory implementations
pub mod repository;

pub(crate) use crate::bbsplus::ciphersuites::Bls12381Sha256 as DeploymentSuite;
