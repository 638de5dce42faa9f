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
use super::keys::BBSplusPublicKey;
use super::signature::{compute_B, messages_to_scalars, BBSplusSignature};
use crate::errors::{Error, Result};
use crate::utils::util::{
    calculate_random_scalars, hash_to_scalar, i2osp, parse_g1_projective, parse_scalar,
    random_nonzero_scalar, zeroize_scalars,
};
use bls12_381_plus::{multi_miller_loop, G1Projective, G2Prepared, G2Projective, Gt, Scalar};
use elliptic_curve::group::Curve;
use elliptic_curve::hash2curve::ExpandMsg;
use elliptic_curve::subtle::ConstantTimeEq;
use serde::{Deserialize, Serialize};

/// A selective-disclosure proof of knowledge of a BBS+ signature.
///
/// `(A', Abar, D)` re-randomize the signature, `c` is the Fiat-Shamir challenge
/// over the complete protocol transcript, and the scalar responses prove
/// knowledge of `e`, of the randomizers, of the blinded `s` term and of every
/// hidden message. Proof size grows linearly with the number of hidden messages.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BBSplusPoKSignature {
    pub(crate) A_prime: G1Projective,
    pub(crate) A_bar: G1Projective,
    pub(crate) D: G1Projective,
    pub(crate) c: Scalar,
    pub(crate) e_cap: Scalar,
    pub(crate) s_cap: Scalar,
    pub(crate) r2_cap: Scalar,
    pub(crate) r3_cap: Scalar,
    pub(crate) m_cap: Vec<Scalar>,
    pub(crate) nonce: Vec<u8>,
}

impl BBSplusPoKSignature {
    /// Serialized length of the fixed part: three compressed G1 points, the
    /// challenge and the `e`/`s` responses, before the response vector.
    pub const FIXED_BYTES: usize = 3 * 48 + 3 * 32;

    /// # Description
    /// Creates a selective-disclosure proof for a signature over `n` messages,
    /// revealing exactly the 1-based indices in `revealed_message_indexes`.
    /// The verifier-supplied nonce is bound into the challenge; replaying the
    /// proof under another nonce fails verification.
    ///
    /// # Inputs:
    /// * `signature` (REQUIRED), the BBS+ signature being proven.
    /// * `pk` (REQUIRED), the signer public key (bound via the pairing check).
    /// * `messages` (REQUIRED), all `n` signed message byte strings, in order.
    /// * `revealed_message_indexes` (REQUIRED), distinct indices in `[1, n]`;
    ///   may be empty (proves bare possession of a valid signature).
    /// * `nonce` (REQUIRED), the verifier challenge nonce; must be non-empty.
    ///
    /// # Output:
    /// * a new [`BBSplusPoKSignature`] or [`Error`]
    pub fn proof_gen<CS>(
        signature: &BBSplusSignature,
        pk: &BBSplusPublicKey,
        messages: &[Vec<u8>],
        revealed_message_indexes: &[usize],
        nonce: &[u8],
    ) -> Result<Self>
    where
        CS: BbsCiphersuite,
        CS::Expander: for<'a> ExpandMsg<'a>,
    {
        let n = messages.len();
        if n == 0 {
            return Err(Error::InvalidArgument("no messages to prove".to_owned()));
        }
        if nonce.is_empty() {
            return Err(Error::InvalidArgument("nonce must not be empty".to_owned()));
        }

        let revealed = checked_index_set(revealed_message_indexes, n, |msg| {
            Error::InvalidArgument(msg)
        })?;
        let unrevealed: Vec<usize> = (1..=n).filter(|i| !revealed.contains(i)).collect();
        let U = unrevealed.len();

        let mut message_scalars = messages_to_scalars::<CS>(messages)?;
        let generators = message_generators::<CS>(n);
        let P1 = G1Projective::GENERATOR;

        let B = compute_B(&signature.s, &message_scalars, &generators);

        // A' must never be the identity; redraw the randomizer in the negligible
        // case it is.
        let (r1, r3, A_prime) = loop {
            let r1 = random_nonzero_scalar();
            let r3 = match Option::<Scalar>::from(r1.invert()) {
                Some(inv) => inv,
                None => continue,
            };
            let A_prime = signature.A * r1;
            if bool::from(A_prime.is_identity()) {
                continue;
            }
            break (r1, r3, A_prime);
        };
        let r2 = random_nonzero_scalar();

        let A_bar = A_prime * (-signature.e) + B * r1;
        let D = B * r1 + P1 * r2;
        let s_prime = signature.s + r2 * r3;

        let mut random_scalars = calculate_random_scalars(4 + U);
        let e_tilde = random_scalars[0];
        let r2_tilde = random_scalars[1];
        let r3_tilde = random_scalars[2];
        let s_tilde = random_scalars[3];
        let m_tilde = &random_scalars[4..4 + U];

        let T1 = A_prime * e_tilde + P1 * r2_tilde;
        let mut T2 = D * (-r3_tilde) + P1 * s_tilde;
        for (j, idx) in unrevealed.iter().enumerate() {
            T2 += generators[idx - 1] * m_tilde[j];
        }

        let revealed_scalars: Vec<Scalar> =
            revealed.iter().map(|i| message_scalars[i - 1]).collect();
        let c = calculate_challenge::<CS>(
            &A_prime, &A_bar, &D, &T1, &T2, nonce, n, &revealed, &revealed_scalars,
        )?;

        let e_cap = e_tilde + c * signature.e;
        let r2_cap = r2_tilde + c * r2;
        let r3_cap = r3_tilde + c * r3;
        let s_cap = s_tilde + c * s_prime;
        let m_cap: Vec<Scalar> = unrevealed
            .iter()
            .enumerate()
            .map(|(j, idx)| m_tilde[j] + c * message_scalars[idx - 1])
            .collect();

        // The blinders and the hidden-message scalars are secret; wipe them
        // before the buffers are released.
        zeroize_scalars(&mut random_scalars);
        zeroize_scalars(&mut message_scalars);
        let mut ephemeral = [r1, r2, r3, s_prime];
        zeroize_scalars(&mut ephemeral);

        Ok(Self {
            A_prime,
            A_bar,
            D,
            c,
            e_cap,
            s_cap,
            r2_cap,
            r3_cap,
            m_cap,
            nonce: nonce.to_vec(),
        })
    }

    /// # Description
    /// Verifies a selective-disclosure proof against the signer public key, the
    /// revealed `(index, message bytes)` pairs, the expected nonce and the total
    /// message count `n`. The challenge comparison is constant-time, and the
    /// pairing relation `e(A', pk) = e(Abar, g2)` must hold.
    ///
    /// # Output:
    /// * `Ok(())` or [`Error::InvalidProof`]
    pub fn proof_verify<CS>(
        &self,
        pk: &BBSplusPublicKey,
        revealed_messages: &[(usize, Vec<u8>)],
        nonce: &[u8],
        n: usize,
    ) -> Result<()>
    where
        CS: BbsCiphersuite,
        CS::Expander: for<'a> ExpandMsg<'a>,
    {
        if n == 0 {
            return Err(Error::InvalidArgument("message count must be positive".to_owned()));
        }
        if nonce.is_empty() {
            return Err(Error::InvalidArgument("nonce must not be empty".to_owned()));
        }

        let indexes: Vec<usize> = revealed_messages.iter().map(|(i, _)| *i).collect();
        let revealed = checked_index_set(&indexes, n, |_| Error::InvalidProof)?;
        if revealed != indexes {
            // The revealed list must come sorted by index.
            return Err(Error::InvalidProof);
        }

        let U = n - revealed.len();
        if self.m_cap.len() != U {
            return Err(Error::InvalidProof);
        }
        if bool::from(self.A_prime.is_identity()) {
            return Err(Error::InvalidProof);
        }

        let unrevealed: Vec<usize> = (1..=n).filter(|i| !revealed.contains(i)).collect();
        let generators = message_generators::<CS>(n);
        let P1 = G1Projective::GENERATOR;

        let revealed_scalars: Vec<Scalar> = revealed_messages
            .iter()
            .map(|(_, m)| hash_to_scalar::<CS>(m, CS::MSG_DST))
            .collect::<Result<_>>()?;

        let T1 = (self.A_bar - self.D) * self.c + self.A_prime * self.e_cap + P1 * self.r2_cap;

        let mut T = P1;
        for (i, m_i) in revealed.iter().zip(&revealed_scalars) {
            T += generators[i - 1] * m_i;
        }

        let mut T2 = T * self.c + self.D * (-self.r3_cap) + P1 * self.s_cap;
        for (j, idx) in unrevealed.iter().enumerate() {
            T2 += generators[idx - 1] * self.m_cap[j];
        }

        let cv = calculate_challenge::<CS>(
            &self.A_prime, &self.A_bar, &self.D, &T1, &T2, nonce, n, &revealed,
            &revealed_scalars,
        )?;

        // Constant-time comparison: no early exit on the first differing byte.
        if !bool::from(self.c.to_be_bytes().ct_eq(&cv.to_be_bytes())) {
            return Err(Error::InvalidProof);
        }

        // e(A', pk) = e(Abar, g2)
        let P2 = G2Projective::GENERATOR;
        let term1 = (&self.A_prime.to_affine(), &G2Prepared::from(pk.0.to_affine()));
        let term2 = (&self.A_bar.to_affine(), &G2Prepared::from(-P2.to_affine()));

        let pairing = multi_miller_loop(&[term1, term2]).final_exponentiation();

        if pairing == Gt::IDENTITY {
            Ok(())
        } else {
            Err(Error::InvalidProof)
        }
    }

    /// Serializes the proof:
    /// `A' || Abar || D` compressed, `c`, `e^`, `s^` big-endian, a little-endian
    /// u32 count followed by the response vector `[r2^, r3^, m^_1 .. m^_U]`, and
    /// a big-endian u32 nonce length followed by the nonce bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let count = self.m_cap.len() + 2;
        let mut bytes =
            Vec::with_capacity(Self::FIXED_BYTES + 4 + count * 32 + 4 + self.nonce.len());

        bytes.extend_from_slice(&self.A_prime.to_affine().to_compressed());
        bytes.extend_from_slice(&self.A_bar.to_affine().to_compressed());
        bytes.extend_from_slice(&self.D.to_affine().to_compressed());
        bytes.extend_from_slice(&self.c.to_be_bytes());
        bytes.extend_from_slice(&self.e_cap.to_be_bytes());
        bytes.extend_from_slice(&self.s_cap.to_be_bytes());

        bytes.extend_from_slice(&(count as u32).to_le_bytes());
        bytes.extend_from_slice(&self.r2_cap.to_be_bytes());
        bytes.extend_from_slice(&self.r3_cap.to_be_bytes());
        for m in &self.m_cap {
            bytes.extend_from_slice(&m.to_be_bytes());
        }

        bytes.extend_from_slice(&(self.nonce.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&self.nonce);

        bytes
    }

    /// Deserializes a proof, rejecting truncated or over-long inputs, malformed
    /// or out-of-subgroup points and non-canonical scalars.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::FIXED_BYTES + 4 {
            return Err(Error::InvalidEncoding("proof too short".to_owned()));
        }

        let A_prime = parse_g1_projective(&bytes[0..48])?;
        let A_bar = parse_g1_projective(&bytes[48..96])?;
        let D = parse_g1_projective(&bytes[96..144])?;
        let c = parse_scalar(&bytes[144..176])?;
        let e_cap = parse_scalar(&bytes[176..208])?;
        let s_cap = parse_scalar(&bytes[208..240])?;

        let count_bytes: [u8; 4] = bytes[240..244]
            .try_into()
            .map_err(|_| Error::InvalidEncoding("truncated response count".to_owned()))?;
        let count = u32::from_le_bytes(count_bytes) as usize;
        if count < 2 {
            return Err(Error::InvalidEncoding("response vector too short".to_owned()));
        }

        let mut offset = 244;
        if bytes.len() < offset + count * 32 + 4 {
            return Err(Error::InvalidEncoding("truncated response vector".to_owned()));
        }

        let r2_cap = parse_scalar(&bytes[offset..offset + 32])?;
        let r3_cap = parse_scalar(&bytes[offset + 32..offset + 64])?;
        offset += 64;

        let mut m_cap = Vec::with_capacity(count - 2);
        for _ in 0..count - 2 {
            m_cap.push(parse_scalar(&bytes[offset..offset + 32])?);
            offset += 32;
        }

        let nonce_len_bytes: [u8; 4] = bytes[offset..offset + 4]
            .try_into()
            .map_err(|_| Error::InvalidEncoding("truncated nonce length".to_owned()))?;
        let nonce_len = u32::from_be_bytes(nonce_len_bytes) as usize;
        offset += 4;

        if bytes.len() != offset + nonce_len {
            return Err(Error::InvalidEncoding("proof length mismatch".to_owned()));
        }
        let nonce = bytes[offset..].to_vec();

        Ok(Self {
            A_prime,
            A_bar,
            D,
            c,
            e_cap,
            s_cap,
            r2_cap,
            r3_cap,
            m_cap,
            nonce,
        })
    }
}

/// Validates a revealed index set: all 1-based indices in `[1, n]`, no
/// duplicates. Returns the set in sorted order.
fn checked_index_set(
    indexes: &[usize],
    n: usize,
    on_error: impl Fn(String) -> Error,
) -> Result<Vec<usize>> {
    let mut sorted = indexes.to_vec();
    sorted.sort_unstable();
    for pair in sorted.windows(2) {
        if pair[0] == pair[1] {
            return Err(on_error(format!("duplicate revealed index {}", pair[0])));
        }
    }
    for &i in &sorted {
        if i == 0 || i > n {
            return Err(on_error(format!("revealed index {i} out of range [1,{n}]")));
        }
    }
    Ok(sorted)
}

/// The Fiat-Shamir challenge over the complete protocol transcript:
/// `A' || Abar || D || T1 || T2 || len(nonce) || nonce || n || |R| ||
/// sorted(R) || revealed message scalars`, points compressed and every integer
/// 8-byte big-endian. Both sides must build this byte string identically.
fn calculate_challenge<CS>(
    A_prime: &G1Projective,
    A_bar: &G1Projective,
    D: &G1Projective,
    T1: &G1Projective,
    T2: &G1Projective,
    nonce: &[u8],
    n: usize,
    revealed_indexes: &[usize],
    revealed_scalars: &[Scalar],
) -> Result<Scalar>
where
    CS: BbsCiphersuite,
    CS::Expander: for<'a> ExpandMsg<'a>,
{
    let mut c_array: Vec<u8> = Vec::new();
    c_array.extend_from_slice(&A_prime.to_affine().to_compressed());
    c_array.extend_from_slice(&A_bar.to_affine().to_compressed());
    c_array.extend_from_slice(&D.to_affine().to_compressed());
    c_array.extend_from_slice(&T1.to_affine().to_compressed());
    c_array.extend_from_slice(&T2.to_affine().to_compressed());
    c_array.extend_from_slice(&i2osp::<8>(nonce.len()));
    c_array.extend_from_slice(nonce);
    c_array.extend_from_slice(&i2osp::<8>(n));
    c_array.extend_from_slice(&i2osp::<8>(revealed_indexes.len()));
    for i in revealed_indexes {
        c_array.extend_from_slice(&i2osp::<8>(*i));
    }
    for m in revealed_scalars {
        c_array.extend_from_slice(&m.to_be_bytes());
    }

    hash_to_scalar::<CS>(&c_array, CS::CHALLENGE_DST)
}
