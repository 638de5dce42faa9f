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

use super::ciphersuites::BbsCiphersuite;
use super::generators::message_generators;
use super::keys::{BBSplusPublicKey, BBSplusSecretKey};
use crate::errors::{Error, Result};
use crate::utils::util::{
    calculate_random_scalars, hash_to_scalar, parse_g1_projective, parse_scalar,
    random_nonzero_scalar, zeroize_scalars,
};
use bls12_381_plus::{multi_miller_loop, G1Projective, G2Prepared, G2Projective, Gt, Scalar};
use elliptic_curve::group::Curve;
use elliptic_curve::hash2curve::ExpandMsg;
use serde::{Deserialize, Serialize};

/// A BBS+ signature over an ordered vector of `n` messages: the triple
/// `(A, e, s)` with `A in G1` and `e, s in Fr`, satisfying
/// `e(A, pk + g2*e) = e(B, g2)` where
/// `B = g1 + g1*s + H_1*m_1 + ... + H_n*m_n`.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BBSplusSignature {
    pub(crate) A: G1Projective,
    pub(crate) e: Scalar,
    pub(crate) s: Scalar,
}

impl BBSplusSignature {
    /// Length of a serialized signature: compressed G1 (48) || e (32) || s (32).
    pub const BYTES: usize = 112;

    /// # Description
    /// Signs an ordered vector of messages. The message order is part of what is
    /// signed: reordering the vector invalidates the signature.
    ///
    /// # Inputs:
    /// * `messages` (REQUIRED), the message byte strings; must be non-empty.
    /// * `sk` (REQUIRED), the signer secret key.
    ///
    /// # Output:
    /// * a new [`BBSplusSignature`] or [`Error`]
    pub fn sign<CS>(messages: &[Vec<u8>], sk: &BBSplusSecretKey) -> Result<Self>
    where
        CS: BbsCiphersuite,
        CS::Expander: for<'a> ExpandMsg<'a>,
    {
        if messages.is_empty() {
            return Err(Error::InvalidArgument("cannot sign an empty message vector".to_owned()));
        }

        let mut message_scalars = messages_to_scalars::<CS>(messages)?;
        let generators = message_generators::<CS>(messages.len());

        let s = calculate_random_scalars(1)[0];
        let B = compute_B(&s, &message_scalars, &generators);
        zeroize_scalars(&mut message_scalars);

        // sk + e = 0 and A = identity only happen with negligible probability;
        // redrawing e keeps the signature well formed without leaking anything.
        loop {
            let e = random_nonzero_scalar();
            let sk_e = sk.0 + e;
            let sk_e_inv = match Option::<Scalar>::from(sk_e.invert()) {
                Some(inv) => inv,
                None => continue,
            };
            let A = B * sk_e_inv;
            if bool::from(A.is_identity()) {
                continue;
            }
            return Ok(Self { A, e, s });
        }
    }

    /// # Description
    /// Validates the signature against a public key and the full message vector,
    /// supplied in the same order used at signing.
    ///
    /// # Inputs:
    /// * `pk` (REQUIRED), the signer public key.
    /// * `messages` (REQUIRED), the message byte strings.
    ///
    /// # Output:
    /// * `Ok(())` or [`Error::InvalidSignature`]
    pub fn verify<CS>(&self, pk: &BBSplusPublicKey, messages: &[Vec<u8>]) -> Result<()>
    where
        CS: BbsCiphersuite,
        CS::Expander: for<'a> ExpandMsg<'a>,
    {
        if messages.is_empty() {
            return Err(Error::InvalidArgument("cannot verify an empty message vector".to_owned()));
        }
        if bool::from(self.A.is_identity()) {
            return Err(Error::InvalidSignature);
        }

        let message_scalars = messages_to_scalars::<CS>(messages)?;
        let generators = message_generators::<CS>(messages.len());
        let B = compute_B(&self.s, &message_scalars, &generators);

        // e(A, pk + g2*e) = e(B, g2)
        let BP2 = G2Projective::GENERATOR;
        let A2 = pk.0 + BP2 * self.e;

        let term1 = (&self.A.to_affine(), &G2Prepared::from(A2.to_affine()));
        let term2 = (&B.to_affine(), &G2Prepared::from(-BP2.to_affine()));

        let pairing = multi_miller_loop(&[term1, term2]).final_exponentiation();

        if pairing == Gt::IDENTITY {
            Ok(())
        } else {
            Err(Error::InvalidSignature)
        }
    }

    /// # Description
    /// Replaces the signed message at one index, producing a signature valid for
    /// the updated vector. Signer-side only: requires the secret key.
    ///
    /// # Inputs:
    /// * `sk` (REQUIRED), the signer secret key.
    /// * `old_message` / `new_message` (REQUIRED), old and new message bytes.
    /// * `update_index` (REQUIRED), 1-based index of the message to replace.
    /// * `n` (REQUIRED), total number of signed messages.
    ///
    /// # Output:
    /// * a new [`BBSplusSignature`] or [`Error`]
    pub fn update_signature<CS>(
        &self,
        sk: &BBSplusSecretKey,
        old_message: &[u8],
        new_message: &[u8],
        update_index: usize,
        n: usize,
    ) -> Result<Self>
    where
        CS: BbsCiphersuite,
        CS::Expander: for<'a> ExpandMsg<'a>,
    {
        if update_index == 0 || update_index > n {
            return Err(Error::InvalidArgument(format!(
                "update index {update_index} out of range [1,{n}]"
            )));
        }

        let old_scalar = hash_to_scalar::<CS>(old_message, CS::MSG_DST)?;
        let new_scalar = hash_to_scalar::<CS>(new_message, CS::MSG_DST)?;
        let generators = message_generators::<CS>(n);
        let H_i = generators[update_index - 1];

        let sk_e = sk.0 + self.e;
        let mut B = self.A * sk_e;
        B += -H_i * old_scalar;
        B += H_i * new_scalar;

        let sk_e_inv = Option::<Scalar>::from(sk_e.invert())
            .ok_or_else(|| Error::InvalidArgument("sk + e is not invertible".to_owned()))?;
        let A = B * sk_e_inv;

        if bool::from(A.is_identity()) {
            return Err(Error::InvalidArgument("updated signature degenerated to the identity".to_owned()));
        }

        Ok(Self { A, e: self.e, s: self.s })
    }

    /// Serializes to the 112-byte wire form.
    pub fn to_bytes(&self) -> [u8; Self::BYTES] {
        let mut bytes = [0u8; Self::BYTES];
        bytes[0..48].copy_from_slice(&self.A.to_affine().to_compressed());
        bytes[48..80].copy_from_slice(&self.e.to_be_bytes());
        bytes[80..112].copy_from_slice(&self.s.to_be_bytes());
        bytes
    }

    /// Deserializes from the 112-byte wire form, rejecting malformed points,
    /// out-of-subgroup points, the identity `A` and non-canonical scalars.
    pub fn from_bytes(data: &[u8; Self::BYTES]) -> Result<Self> {
        let A = parse_g1_projective(&data[0..48])?;
        if bool::from(A.is_identity()) {
            return Err(Error::InvalidEncoding("signature point is the identity".to_owned()));
        }
        let e = parse_scalar(&data[48..80])?;
        let s = parse_scalar(&data[80..112])?;
        Ok(Self { A, e, s })
    }
}

/// Maps each message byte string into `Fr \ {0}` under the message DST.
pub(crate) fn messages_to_scalars<CS>(messages: &[Vec<u8>]) -> Result<Vec<Scalar>>
where
    CS: BbsCiphersuite,
    CS::Expander: for<'a> ExpandMsg<'a>,
{
    messages
        .iter()
        .map(|m| hash_to_scalar::<CS>(m, CS::MSG_DST))
        .collect()
}

/// B = g1 + g1*s + H_1*m_1 + ... + H_n*m_n
pub(crate) fn compute_B(
    s: &Scalar,
    message_scalars: &[Scalar],
    generators: &[G1Projective],
) -> G1Projective {
    let mut B = G1Projective::GENERATOR + G1Projective::GENERATOR * s;
    for (H_i, m_i) in generators.iter().zip(message_scalars) {
        B += H_i * m_i;
    }
    B
}
