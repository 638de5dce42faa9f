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

//! The three protocol roles, built on the BBS+ primitives and the credential
//! model. Each role owns references to the shared stores; the cryptography is
//! synchronous and a request is handled on a single worker from start to end.

/// Issuer: key setup and credential issuance
pub mod issuer;

/// Holder: credential custody and presentation derivation
pub mod holder;

/// Verifier: challenge creation and presentation verification
pub mod verifier;

pub use holder::{Holder, HolderSetup, PresentationRequest};
pub use issuer::{Issuer, IssuerSetup};
pub use verifier::{VerificationRequest, VerificationResult, Verifier, VerifierSetup};
