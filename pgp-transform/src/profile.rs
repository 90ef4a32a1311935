use std::sync::LazyLock;

use pgp::{
    crypto::{hash::HashAlgorithm, public_key::PublicKeyAlgorithm, sym::SymmetricKeyAlgorithm},
    types::CompressionAlgorithm,
};
use rand::{CryptoRng, Rng};
use smallvec::{smallvec, SmallVec};

/// Lifetime of the synthesized encryption subkey binding.
pub const SUBKEY_LIFETIME_DAYS: u64 = 365;

const SECONDS_PER_DAY: u64 = 86_400;

/// Gzip level applied to message payloads before encryption.
///
/// This is independent of the `OpenPGP` compression preference advertised by an entity.
const MESSAGE_GZIP_LEVEL: u32 = 6;

pub static DEFAULT_PROFILE: LazyLock<Profile> = LazyLock::new(Profile::new);

/// The fixed algorithm profile every entity is built with.
///
/// The values are negotiation defaults embedded in the identity and subkey bindings.
/// The message pipeline does not consult the compression preference, it always gzips.
#[derive(Debug, Clone)]
pub struct Profile {
    /// Gzip level for the outer payload compression.
    pub message_gzip_level: u32,
}

impl Profile {
    pub fn new() -> Self {
        Self {
            message_gzip_level: MESSAGE_GZIP_LEVEL,
        }
    }

    pub fn rng(&self) -> impl Rng + CryptoRng {
        rand::thread_rng()
    }

    pub fn key_algorithm(&self) -> PublicKeyAlgorithm {
        PublicKeyAlgorithm::RSA
    }

    /// Accepted primary key algorithms.
    pub fn accepts_key_algorithm(&self, algorithm: PublicKeyAlgorithm) -> bool {
        matches!(
            algorithm,
            PublicKeyAlgorithm::RSA | PublicKeyAlgorithm::RSAEncrypt | PublicKeyAlgorithm::RSASign
        )
    }

    pub fn hash_algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Sha256
    }

    pub fn symmetric_algorithm(&self) -> SymmetricKeyAlgorithm {
        SymmetricKeyAlgorithm::AES256
    }

    pub fn compression_algorithm(&self) -> CompressionAlgorithm {
        CompressionAlgorithm::ZLIB
    }

    /// Declared ZLIB level, metadata only.
    pub fn compression_level(&self) -> u32 {
        9
    }

    pub fn subkey_lifetime_seconds(&self) -> u64 {
        SUBKEY_LIFETIME_DAYS * SECONDS_PER_DAY
    }

    pub fn preferred_hash_algorithms(&self) -> SmallVec<[HashAlgorithm; 8]> {
        smallvec![self.hash_algorithm()]
    }

    pub fn preferred_symmetric_algorithms(&self) -> SmallVec<[SymmetricKeyAlgorithm; 8]> {
        smallvec![self.symmetric_algorithm()]
    }

    pub fn preferred_compression_algorithms(&self) -> SmallVec<[CompressionAlgorithm; 8]> {
        smallvec![self.compression_algorithm()]
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_values() {
        let profile = Profile::default();
        assert_eq!(profile.hash_algorithm(), HashAlgorithm::Sha256);
        assert_eq!(
            profile.symmetric_algorithm(),
            SymmetricKeyAlgorithm::AES256
        );
        assert_eq!(profile.compression_algorithm(), CompressionAlgorithm::ZLIB);
        assert_eq!(profile.compression_level(), 9);
        assert_eq!(profile.subkey_lifetime_seconds(), 31_536_000);
    }

    #[test]
    fn only_rsa_is_accepted() {
        let profile = Profile::default();
        assert!(profile.accepts_key_algorithm(PublicKeyAlgorithm::RSA));
        assert!(!profile.accepts_key_algorithm(PublicKeyAlgorithm::EdDSALegacy));
    }
}
