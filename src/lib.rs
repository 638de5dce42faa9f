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

//! # zkcred
//!
//! ## Description
//! `zkcred` is the cryptographic core of a privacy-preserving verifiable-credential
//! system built around **BBS+ multi-message signatures** on the BLS12-381
//! pairing-friendly curve. A holder of a signature over `n` messages can derive a
//! non-interactive zero-knowledge proof that convinces a verifier of the signature's
//! validity and of the values of a chosen subset of the signed messages, while the
//! remaining messages stay hidden.
//!
//! The library provides:
//! * BBS+ key generation, signing and verification
//! * Selective-disclosure proof creation and verification
//! * A credential/presentation object model binding BBS+ outputs to claim names
//! * The issuer / holder / verifier role workflows built on the primitives above
//! * In-memory repositories and a minimal `did:<method>` identity service (Ed25519)
//!
//! Transport, UI, persistent storage backends, and authentication are explicitly
//! out of scope; the crate is a pure library with no CLI and no environment state.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! zkcred = "0.1"
//! ```

#![warn(missing_docs)]
#![allow(non_snake_case)]
#![allow(non_upper_case_globals)]

/// Errors module
pub mod errors;

/// BBS+ signature scheme module
pub mod bbsplus;
/// Identity (DID) interface and default Ed25519 implementation
pub mod did;
/// Issuer, holder and verifier role workflows
pub mod roles;
/// Utils module
pub mod utils;
/// Credential and presentation model
pub mod vc;
