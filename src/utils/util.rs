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

use crate::bbsplus::ciphersuites::BbsCiphersuite;
use crate::errors::{Error, Result};
use bls12_381_plus::{G1Affine, G1Projective, G2Affine, G2Projective, Scalar};
use elliptic_curve::hash2curve::{ExpandMsg, Expander};
use ff::Field;
use rand::rngs::OsRng;
use rand::RngCore;

/// hash_to_scalar(msg, dst): `expand_message` with [`BbsCiphersuite::EXPAND_LEN`]
/// octets of output, reduced into Fr via `from_okm`. A zero result is mapped away
/// by appending a one-byte counter and re-expanding, so the output is always in
/// `Fr \ {0}`. The expansion length and hash are fixed for the life of a
/// deployment: changing either changes every message scalar and every challenge.
pub fn hash_to_scalar<CS: BbsCiphersuite>(msg_octets: &[u8], dst: &[u8]) -> Result<Scalar>
where
    CS::Expander: for<'a> ExpandMsg<'a>,
{
    let mut uniform_bytes = vec![0u8; CS::EXPAND_LEN];
    let mut counter = 0u8;

    loop {
        let msg_prime = [msg_octets, &[counter]].concat();
        CS::Expander::expand_message(&[&msg_prime], &[dst], CS::EXPAND_LEN)
            .map_err(|_| Error::InvalidArgument("hash_to_scalar: expand_message failed".to_owned()))?
            .fill_bytes(&mut uniform_bytes);

        let hashed_scalar = Scalar::from_okm(
            uniform_bytes
                .as_slice()
                .try_into()
                .map_err(|_| Error::InvalidArgument("hash_to_scalar: bad expand length".to_owned()))?,
        );

        if hashed_scalar != Scalar::ZERO {
            return Ok(hashed_scalar);
        }

        counter = counter.wrapping_add(1);
    }
}

/// Draws `count` uniformly random scalars. The caller is responsible for wiping
/// them with [`zeroize_scalars`] when they blind secret material.
pub fn calculate_random_scalars(count: usize) -> Vec<Scalar> {
    let mut rng = rand::thread_rng();
    (0..count).map(|_| Scalar::random(&mut rng)).collect()
}

/// Draws a uniformly random scalar in `Fr \ {0}`. Rejection sampling is the only
/// place where control flow may depend on random (never secret) data.
pub fn random_nonzero_scalar() -> Scalar {
    let mut rng = rand::thread_rng();
    loop {
        let s = Scalar::random(&mut rng);
        if s != Scalar::ZERO {
            return s;
        }
    }
}

/// Generates a fresh 32-byte random nonce, passed as raw bytes end-to-end.
pub fn generate_nonce() -> Vec<u8> {
    let mut nonce = vec![0u8; 32];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

/// I2OSP: big-endian, fixed-width integer encoding.
pub fn i2osp<const N: usize>(x: usize) -> [u8; N] {
    let be = (x as u64).to_be_bytes();
    let mut out = [0u8; N];
    out.copy_from_slice(&be[8 - N..]);
    out
}

/// Parses a compressed G1 point. Rejects malformed encodings and points outside
/// the prime-order subgroup; the identity is accepted here and rejected at the
/// call sites that disallow it.
pub fn parse_g1_projective(bytes: &[u8]) -> Result<G1Projective> {
    let bytes: &[u8; G1Affine::COMPRESSED_BYTES] = bytes
        .try_into()
        .map_err(|_| Error::InvalidEncoding("G1 point must be 48 compressed bytes".to_owned()))?;

    let p = Option::<G1Affine>::from(G1Affine::from_compressed_unchecked(bytes))
        .ok_or_else(|| Error::InvalidEncoding("malformed G1 point".to_owned()))?;

    if !bool::from(p.is_torsion_free()) {
        return Err(Error::NotInSubgroup);
    }

    Ok(G1Projective::from(p))
}

/// Parses a compressed G2 point with the same checks as [`parse_g1_projective`].
pub fn parse_g2_projective(bytes: &[u8]) -> Result<G2Projective> {
    let bytes: &[u8; G2Affine::COMPRESSED_BYTES] = bytes
        .try_into()
        .map_err(|_| Error::InvalidEncoding("G2 point must be 96 compressed bytes".to_owned()))?;

    let p = Option::<G2Affine>::from(G2Affine::from_compressed_unchecked(bytes))
        .ok_or_else(|| Error::InvalidEncoding("malformed G2 point".to_owned()))?;

    if !bool::from(p.is_torsion_free()) {
        return Err(Error::NotInSubgroup);
    }

    Ok(G2Projective::from(p))
}

/// Parses a scalar from 32 big-endian bytes, strictly less than the group order.
pub fn parse_scalar(bytes: &[u8]) -> Result<Scalar> {
    let bytes: &[u8; Scalar::BYTES] = bytes
        .try_into()
        .map_err(|_| Error::InvalidEncoding("scalar must be 32 bytes".to_owned()))?;

    Option::<Scalar>::from(Scalar::from_be_bytes(bytes))
        .ok_or_else(|| Error::InvalidEncoding("scalar not canonical".to_owned()))
}

/// Overwrites scalars that held secret material. The volatile writes and the
/// compiler fence keep the stores from being elided as dead.
pub fn zeroize_scalars(scalars: &mut [Scalar]) {
    for s in scalars.iter_mut() {
        unsafe { core::ptr::write_volatile(s, Scalar::ZERO) };
    }
    core::sync::atomic::compiler_fence(core::sync::atomic::Ordering::SeqCst);
}
