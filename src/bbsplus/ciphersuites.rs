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

use elliptic_curve::hash2curve::{ExpandMsg, ExpandMsgXmd};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

/// The parameters a BBS+ deployment pins for its lifetime: the hash-to-curve
/// expander, the expansion length, and the domain-separation tags. Changing any
/// of these changes every message scalar and every challenge, so they are fixed
/// constants rather than runtime configuration.
pub trait BbsCiphersuite: Eq + 'static {
    /// Ciphersuite identifier, doubling as the hash-to-curve DST.
    const ID: &'static [u8];
    /// DST for deriving the indexed message generators `H_i` in G1.
    const GENERATOR_DST: &'static [u8] = Self::ID;
    /// DST for mapping message bytes to scalars.
    const MSG_DST: &'static [u8] = b"BBS_H2S_MSG_";
    /// DST for the proof challenge scalar.
    const CHALLENGE_DST: &'static [u8] = b"BBS_H2S_CHALLENGE_";

    /// The `expand_message` variant backing hash-to-scalar and hash-to-curve.
    type Expander: for<'a> ExpandMsg<'a>;
    /// Output length of `expand_message` before reduction into Fr. At least 48
    /// octets so the reduced scalar is statistically uniform.
    const EXPAND_LEN: usize = 48;
    /// Length of a serialized scalar.
    const OCTET_SCALAR_LEN: usize = 32;
}

/// BLS12-381 ciphersuite with SHA-256 `expand_message_xmd` and the SSWU
/// random-oracle map to G1.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Bls12381Sha256 {}

impl BbsCiphersuite for Bls12381Sha256 {
    const ID: &'static [u8] = b"BBS_BLS12381G1_XMD:SHA-256_SSWU_RO_";
    type Expander = ExpandMsgXmd<Sha256>;
}
