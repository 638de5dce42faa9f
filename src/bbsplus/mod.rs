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

//! The BBS+ signature scheme is a pairing-based protocol that signs a vector of
//! messages at once, producing a single short signature, and admits
//! zero-knowledge proofs of knowledge of that signature in which any subset of
//! the signed messages can be revealed while the rest stay hidden.
//!
//! Key characteristics:
//! - **Multi-message signatures**: one 112-byte signature authenticates an
//!   ordered vector of messages; reordering the vector invalidates it.
//! - **Selective disclosure**: a holder derives a proof for a chosen subset of
//!   message indices; the verifier learns nothing about the hidden messages.
//! - **Unlinkable proofs**: each derived proof is re-randomized, so two proofs
//!   over the same signature cannot be correlated under distinct nonces.

/// Module for ciphersuites
pub mod ciphersuites;
/// Module for generators
pub mod generators;
/// Module for keys
pub mod keys;
/// Module for proofs
pub mod proof;
/// Module for signatures
pub mod signature;
