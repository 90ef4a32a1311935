use log::debug;
use pgp::{
    armor::BlockType,
    composed::StandaloneSignature,
    packet::{Signature, SignatureConfig, SignatureType, Subpacket, SubpacketData},
    types::{KeyDetails, Password},
};

use crate::{
    armor, issuer_subpackets, Entity, Profile, SignError, UnixTime, UnlockedEntity,
    DEFAULT_PROFILE,
};

/// Creates detached signatures with the primary key of an unlocked entity.
#[derive(Debug)]
pub struct Signer<'a> {
    signing_key: &'a UnlockedEntity<'a>,
    date: Option<UnixTime>,
    profile: &'a Profile,
}

impl<'a> Signer<'a> {
    pub fn new(signing_key: &'a UnlockedEntity<'a>) -> Self {
        Self {
            signing_key,
            date: None,
            profile: &DEFAULT_PROFILE,
        }
    }

    /// Set the signature creation time. Defaults to the current time.
    pub fn at_date(mut self, date: UnixTime) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_profile(mut self, profile: &'a Profile) -> Self {
        self.profile = profile;
        self
    }

    /// Signs the exact bytes of `message` and returns an armored `PGP SIGNATURE` block.
    pub fn sign_detached(&self, message: impl AsRef<[u8]>) -> Result<Vec<u8>, SignError> {
        let signature = self.sign_data(message.as_ref())?;
        let signature = StandaloneSignature::new(signature);
        let mut armored = Vec::new();
        armor::encode_to_buffer(&signature, BlockType::Signature, true, &mut armored)?;
        Ok(armored)
    }

    fn sign_data(&self, data: &[u8]) -> Result<Signature, SignError> {
        let private_key = self.signing_key.primary_secret_key();
        let at_date = self.date.unwrap_or_else(UnixTime::now_unchecked);
        let hash_algorithm = self.profile.hash_algorithm();

        let mut config = SignatureConfig::v4(
            SignatureType::Binary,
            private_key.algorithm(),
            hash_algorithm,
        );
        let mut hashed_subpackets =
            issuer_subpackets(at_date, private_key.key_id()).map_err(SignError::Subpacket)?;
        hashed_subpackets.push(
            Subpacket::regular(SubpacketData::IssuerFingerprint(private_key.fingerprint()))
                .map_err(SignError::Subpacket)?,
        );
        config.hashed_subpackets = hashed_subpackets;

        let signature = config
            .sign(private_key, &Password::empty(), data)
            .map_err(SignError::Sign)?;
        debug!(
            "Signed {} bytes with key {} using {:?}",
            data.len(),
            private_key.key_id(),
            hash_algorithm
        );
        Ok(signature)
    }
}

/// Unlocks `entity` with `passphrase` and signs `message` with its primary key.
pub fn sign_with_passphrase(
    entity: &Entity,
    passphrase: &[u8],
    message: impl AsRef<[u8]>,
) -> Result<Vec<u8>, SignError> {
    let unlocked = entity.unlock(passphrase)?;
    Signer::new(&unlocked).sign_detached(message)
}

#[cfg(test)]
mod tests {
    use pgp::{
        crypto::hash::HashAlgorithm,
        packet::{Packet, PacketParser},
    };

    use super::*;
    use crate::build_entity;

    const PUBLIC_KEY: &str = include_str!("../test-data/keys/public_key_rsa4096.asc");
    const PRIVATE_KEY: &str = include_str!("../test-data/keys/locked_private_key_rsa4096.asc");

    fn load_signature(armored: &[u8]) -> Signature {
        let binary = armor::unarmor(armored, BlockType::Signature).expect("Failed to unarmor");
        let packet = PacketParser::new(binary.as_slice())
            .next()
            .expect("No packet")
            .expect("Failed to parse packet");
        let Packet::Signature(signature) = packet else {
            panic!("Expected a signature packet");
        };
        signature
    }

    #[test]
    fn detached_signature_uses_sha256_and_issuer() {
        let date = UnixTime::new(1_752_476_259);
        let entity = build_entity(PUBLIC_KEY.as_bytes(), PRIVATE_KEY.as_bytes())
            .expect("Failed to build entity");
        let unlocked = entity.unlock(b"password").expect("Failed to unlock");

        let armored = Signer::new(&unlocked)
            .at_date(date)
            .sign_detached(b"hello world")
            .expect("Failed to sign");
        assert!(armored.starts_with(b"-----BEGIN PGP SIGNATURE-----"));

        let signature = load_signature(&armored);
        assert_eq!(signature.hash_alg(), Some(HashAlgorithm::Sha256));
        assert_eq!(signature.typ(), Some(SignatureType::Binary));
        assert_eq!(signature.issuer().first().copied(), Some(&entity.key_id()));
        assert_eq!(signature.created().map(UnixTime::from), Some(date));
    }

    #[test]
    fn sign_with_wrong_passphrase_fails() {
        let entity = build_entity(PUBLIC_KEY.as_bytes(), PRIVATE_KEY.as_bytes())
            .expect("Failed to build entity");
        let err = sign_with_passphrase(&entity, b"wrong", b"hello world")
            .expect_err("Wrong passphrase must fail");
        assert!(matches!(err, SignError::Unlock(_)));
    }
}
