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

use thiserror::Error;

/// The errors returned by the library. Cryptographic failures are terminal:
/// a failing proof is a proof, not a transient condition, and is never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// A caller bug: wrong-sized key material, empty message list, duplicate or
    /// out-of-range revealed index, empty nonce.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Malformed scalar, point, envelope or base64 input.
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    /// A group point decoded onto the curve but outside the prime-order subgroup.
    #[error("point not in the prime-order subgroup")]
    NotInSubgroup,

    /// The pairing equation does not hold for the signature.
    #[error("signature verification failed")]
    InvalidSignature,

    /// Challenge mismatch or pairing relation failure on proof verification.
    #[error("proof verification failed")]
    InvalidProof,

    /// No BBS+ key pair is registered for the issuer DID.
    #[error("unknown issuer: {0}")]
    UnknownIssuer(String),

    /// A revealed attribute name is not present in the credential's claim list.
    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),

    /// The credential's issuer is not in the verifier's trusted set.
    #[error("untrusted issuer: {0}")]
    UntrustedIssuer(String),

    /// A required claim name is missing from the union of revealed claims.
    #[error("missing required claim: {0}")]
    MissingRequiredClaim(String),

    /// Repository lookup miss.
    #[error("not found: {0}")]
    NotFound(String),

    /// The presentation nonce differs from the expected challenge nonce.
    #[error("nonce mismatch")]
    NonceMismatch,
}

/// Results returned from library components.
pub type Result<T> = core::result::Result<T, Error>;
