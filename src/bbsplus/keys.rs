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

use crate::errors::{Error, Result};
use crate::utils::util::{parse_g2_projective, parse_scalar};
use bls12_381_plus::{G2Affine, G2Projective, Scalar};
use elliptic_curve::group::Curve;
use elliptic_curve::subtle::ConstantTimeEq;
use ff::Field;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A BBS+ public key: a point in G2, `pk = g2 * sk`.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BBSplusPublicKey(pub G2Projective);

impl BBSplusPublicKey {
    /// Compressed G2 encoding, 96 bytes.
    pub fn to_bytes(&self) -> [u8; G2Affine::COMPRESSED_BYTES] {
        self.0.to_affine().to_compressed()
    }

    /// Hex encoding of the compressed point.
    pub fn encode(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Decodes a compressed G2 point, rejecting malformed encodings, points
    /// outside the prime-order subgroup and the identity.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let pk = parse_g2_projective(bytes)?;
        if bool::from(pk.is_identity()) {
            return Err(Error::InvalidEncoding("public key is the identity".to_owned()));
        }
        Ok(Self(pk))
    }
}

/// A BBS+ secret key: a non-zero scalar. The backing memory is wiped on drop.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BBSplusSecretKey(pub(crate) Scalar);

impl BBSplusSecretKey {
    /// Big-endian scalar encoding, 32 bytes.
    pub fn to_bytes(&self) -> [u8; Scalar::BYTES] {
        self.0.to_be_bytes()
    }

    /// Hex encoding of the scalar.
    pub fn encode(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// The corresponding [`BBSplusPublicKey`].
    pub fn public_key(&self) -> BBSplusPublicKey {
        BBSplusPublicKey(sk_to_pk(&self.0))
    }

    /// Decodes a 32-byte big-endian scalar, rejecting non-canonical values and zero.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let sk = parse_scalar(bytes)?;
        if sk == Scalar::ZERO {
            return Err(Error::InvalidEncoding("secret key is zero".to_owned()));
        }
        Ok(Self(sk))
    }
}

impl Zeroize for BBSplusSecretKey {
    fn zeroize(&mut self) {
        // Volatile store so the wipe survives dead-store elimination.
        unsafe { core::ptr::write_volatile(&mut self.0, Scalar::ZERO) };
        core::sync::atomic::compiler_fence(core::sync::atomic::Ordering::SeqCst);
    }
}

impl Drop for BBSplusSecretKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ZeroizeOnDrop for BBSplusSecretKey {}

/// A BBS+ key pair.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct KeyPair {
    pub(crate) public: BBSplusPublicKey,
    pub(crate) private: BBSplusSecretKey,
}

impl KeyPair {
    /// Generates a random key pair: 32 uniformly random bytes are interpreted as
    /// a big-endian integer and reduced mod the group order; a zero result is
    /// rejected and redrawn. `pk = g2 * sk`.
    pub fn random() -> Result<Self> {
        let mut ikm = [0u8; 32];
        let sk = loop {
            OsRng.fill_bytes(&mut ikm);
            let candidate = scalar_from_be_bytes_mod_r(&ikm);
            if candidate != Scalar::ZERO {
                break candidate;
            }
        };
        ikm.zeroize();

        let pk = sk_to_pk(&sk);
        Ok(Self {
            public: BBSplusPublicKey(pk),
            private: BBSplusSecretKey(sk),
        })
    }

    /// Returns a reference to the public key.
    pub fn public_key(&self) -> &BBSplusPublicKey {
        &self.public
    }

    /// Returns a reference to the private key.
    pub fn private_key(&self) -> &BBSplusSecretKey {
        &self.private
    }

    /// Returns the couple `(sk, pk)`.
    pub fn into_parts(self) -> (BBSplusSecretKey, BBSplusPublicKey) {
        (self.private, self.public)
    }

    /// Recomputes `g2 * sk` and compares it with the stored public key
    /// byte-for-byte. Fails with [`Error::InvalidArgument`] on mismatch.
    pub fn validate(&self) -> Result<()> {
        let expected = sk_to_pk(&self.private.0).to_affine().to_compressed();
        let actual = self.public.to_bytes();
        if bool::from(expected.ct_eq(&actual)) {
            Ok(())
        } else {
            Err(Error::InvalidArgument("public key does not match secret key".to_owned()))
        }
    }

    /// Rebuilds a key pair from a 32-byte secret scalar.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self> {
        let private = BBSplusSecretKey::from_bytes(bytes)?;
        let public = private.public_key();
        Ok(Self { public, private })
    }
}

/// PK = SkToPk(SK): scalar multiplication of the G2 base point.
fn sk_to_pk(sk: &Scalar) -> G2Projective {
    G2Affine::generator() * sk
}

/// OS2IP of 32 big-endian bytes reduced mod r, via a 64-byte wide reduction.
fn scalar_from_be_bytes_mod_r(bytes: &[u8; 32]) -> Scalar {
    let mut wide = [0u8; 64];
    for (i, b) in bytes.iter().enumerate() {
        wide[31 - i] = *b;
    }
    let s = Scalar::from_bytes_wide(&wide);
    wide.zeroize();
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_keypair_validates() {
        let keypair = KeyPair::random().unwrap();
        assert!(keypair.validate().is_ok());
        assert_ne!(keypair.private_key().0, Scalar::ZERO);
    }

    #[test]
    fn validate_rejects_foreign_public_key() {
        let a = KeyPair::random().unwrap();
        let b = KeyPair::random().unwrap();
        let forged = KeyPair {
            public: b.public_key().clone(),
            private: a.private_key().clone(),
        };
        assert!(forged.validate().is_err());
    }

    #[test]
    fn key_encoding_round_trip() {
        let keypair = KeyPair::random().unwrap();

        let sk = BBSplusSecretKey::from_bytes(&keypair.private_key().to_bytes()).unwrap();
        assert_eq!(&sk, keypair.private_key());

        let pk = BBSplusPublicKey::from_bytes(&keypair.public_key().to_bytes()).unwrap();
        assert_eq!(&pk, keypair.public_key());
    }

    #[test]
    fn public_key_rejects_identity() {
        let identity = G2Projective::IDENTITY.to_affine().to_compressed();
        assert!(BBSplusPublicKey::from_bytes(&identity).is_err());
    }

    #[test]
    fn secret_key_rejects_zero() {
        assert!(BBSplusSecretKey::from_bytes(&[0u8; 32]).is_err());
    }

    #[test]
    fn wide_reduction_matches_small_integers() {
        let mut bytes = [0u8; 32];
        bytes[31] = 42;
        assert_eq!(scalar_from_be_bytes_mod_r(&bytes), Scalar::from(42u64));
    }
}
