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
use bls12_381_plus::G1Projective;
use elliptic_curve::hash2curve::ExpandMsg;
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::RwLock;

lazy_static! {
    // Process-wide cache of message generators, keyed by (ciphersuite id, index).
    // Entries are immutable after first write; the double-checked insert under the
    // write lock gives single-flight behavior per index.
    static ref GENERATOR_CACHE: RwLock<HashMap<(&'static [u8], u32), G1Projective>> =
        RwLock::new(HashMap::new());
}

/// The message generator `H_i` for a 1-based message index, derived as
/// hash-to-curve of the 4-byte big-endian index under the ciphersuite DST.
/// The family is public and every party derives identical points.
pub fn message_generator<CS>(index: u32) -> G1Projective
where
    CS: BbsCiphersuite,
    CS::Expander: for<'a> ExpandMsg<'a>,
{
    let key = (CS::ID, index);

    {
        let cache = GENERATOR_CACHE.read().unwrap_or_else(|e| e.into_inner());
        if let Some(generator) = cache.get(&key) {
            return *generator;
        }
    }

    let mut cache = GENERATOR_CACHE.write().unwrap_or_else(|e| e.into_inner());
    *cache
        .entry(key)
        .or_insert_with(|| G1Projective::hash::<CS::Expander>(&index.to_be_bytes(), CS::GENERATOR_DST))
}

/// The generators `H_1 .. H_n` for a vector of `n` messages.
pub fn message_generators<CS>(count: usize) -> Vec<G1Projective>
where
    CS: BbsCiphersuite,
    CS::Expander: for<'a> ExpandMsg<'a>,
{
    (1..=count as u32).map(message_generator::<CS>).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbsplus::ciphersuites::Bls12381Sha256;

    #[test]
    fn generators_are_deterministic() {
        let first = message_generators::<Bls12381Sha256>(8);
        let second = message_generators::<Bls12381Sha256>(8);
        assert_eq!(first, second);
    }

    #[test]
    fn generators_are_distinct() {
        let generators = message_generators::<Bls12381Sha256>(16);
        for (i, a) in generators.iter().enumerate() {
            assert!(!bool::from(a.is_identity()));
            assert!(*a != G1Projective::GENERATOR);
            for b in generators.iter().skip(i + 1) {
                assert!(a != b);
            }
        }
    }

    #[test]
    fn cache_extends_consistently() {
        let short = message_generators::<Bls12381Sha256>(3);
        let long = message_generators::<Bls12381Sha256>(6);
        assert_eq!(short, long[..3]);
    }
}
