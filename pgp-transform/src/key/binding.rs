use chrono::Duration;
use pgp::{
    crypto::{hash::HashAlgorithm, public_key::PublicKeyAlgorithm, sym::SymmetricKeyAlgorithm},
    packet::{KeyFlags, SignatureConfig, SignatureType, Subpacket, SubpacketData},
    types::{CompressionAlgorithm, KeyId},
};
use smallvec::SmallVec;

use crate::{PrettyKeyFlags, Profile, UnixTime};

/// The placeholder user id every entity is bound to.
pub const PLACEHOLDER_USER_ID: &str = "";

/// Self-certification of the placeholder identity.
///
/// Asserts that the primary key may certify and sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityBinding {
    pub user_id: String,
    pub signature_type: SignatureType,
    pub public_key_algorithm: PublicKeyAlgorithm,
    pub hash_algorithm: HashAlgorithm,
    pub created: UnixTime,
    pub issuer: KeyId,
    pub is_primary: bool,
    pub key_flags: KeyFlags,
    pub preferred_hash_algorithms: SmallVec<[HashAlgorithm; 8]>,
    pub preferred_symmetric_algorithms: SmallVec<[SymmetricKeyAlgorithm; 8]>,
    pub preferred_compression_algorithms: SmallVec<[CompressionAlgorithm; 8]>,
}

impl IdentityBinding {
    pub(crate) fn new(issuer: KeyId, created: UnixTime, profile: &Profile) -> Self {
        let mut key_flags = KeyFlags::default();
        key_flags.set_certify(true);
        key_flags.set_sign(true);
        Self {
            user_id: PLACEHOLDER_USER_ID.to_string(),
            signature_type: SignatureType::CertPositive,
            public_key_algorithm: profile.key_algorithm(),
            hash_algorithm: profile.hash_algorithm(),
            created,
            issuer,
            is_primary: false,
            key_flags,
            preferred_hash_algorithms: profile.preferred_hash_algorithms(),
            preferred_symmetric_algorithms: profile.preferred_symmetric_algorithms(),
            preferred_compression_algorithms: profile.preferred_compression_algorithms(),
        }
    }

    /// Returns the v4 signature config describing this binding.
    pub fn signature_config(&self) -> Result<SignatureConfig, pgp::errors::Error> {
        let mut config =
            SignatureConfig::v4(self.signature_type, self.public_key_algorithm, self.hash_algorithm);
        let mut hashed_subpackets = issuer_subpackets(self.created, self.issuer)?;
        hashed_subpackets.push(Subpacket::regular(SubpacketData::KeyFlags(
            self.key_flags.clone(),
        ))?);
        hashed_subpackets.push(Subpacket::regular(SubpacketData::IsPrimary(
            self.is_primary,
        ))?);
        hashed_subpackets.push(Subpacket::regular(
            SubpacketData::PreferredSymmetricAlgorithms(self.preferred_symmetric_algorithms.clone()),
        )?);
        hashed_subpackets.push(Subpacket::regular(SubpacketData::PreferredHashAlgorithms(
            self.preferred_hash_algorithms.clone(),
        ))?);
        hashed_subpackets.push(Subpacket::regular(
            SubpacketData::PreferredCompressionAlgorithms(
                self.preferred_compression_algorithms.clone(),
            ),
        )?);
        config.hashed_subpackets = hashed_subpackets;
        Ok(config)
    }

    pub fn pretty_key_flags(&self) -> PrettyKeyFlags {
        PrettyKeyFlags(self.key_flags.clone())
    }
}

/// Binding of the encryption subkey to the primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubkeyBinding {
    pub signature_type: SignatureType,
    pub public_key_algorithm: PublicKeyAlgorithm,
    pub hash_algorithm: HashAlgorithm,
    pub created: UnixTime,
    pub issuer: KeyId,
    pub key_flags: KeyFlags,
    pub key_lifetime_seconds: u64,
    pub preferred_hash_algorithms: SmallVec<[HashAlgorithm; 8]>,
}

impl SubkeyBinding {
    pub(crate) fn new(issuer: KeyId, created: UnixTime, profile: &Profile) -> Self {
        let mut key_flags = KeyFlags::default();
        key_flags.set_encrypt_storage(true);
        key_flags.set_encrypt_comms(true);
        Self {
            signature_type: SignatureType::SubkeyBinding,
            public_key_algorithm: profile.key_algorithm(),
            hash_algorithm: profile.hash_algorithm(),
            created,
            issuer,
            key_flags,
            key_lifetime_seconds: profile.subkey_lifetime_seconds(),
            preferred_hash_algorithms: profile.preferred_hash_algorithms(),
        }
    }

    /// The time at which the subkey stops being valid, if representable.
    pub fn expires_at(&self) -> Option<UnixTime> {
        self.created.checked_add_seconds(self.key_lifetime_seconds)
    }

    /// Returns the v4 signature config describing this binding.
    pub fn signature_config(&self) -> Result<SignatureConfig, pgp::errors::Error> {
        let mut config =
            SignatureConfig::v4(self.signature_type, self.public_key_algorithm, self.hash_algorithm);
        let mut hashed_subpackets = issuer_subpackets(self.created, self.issuer)?;
        hashed_subpackets.push(Subpacket::regular(SubpacketData::KeyFlags(
            self.key_flags.clone(),
        ))?);
        let lifetime = i64::try_from(self.key_lifetime_seconds).unwrap_or(i64::MAX);
        hashed_subpackets.push(Subpacket::regular(SubpacketData::KeyExpirationTime(
            Duration::seconds(lifetime),
        ))?);
        hashed_subpackets.push(Subpacket::regular(SubpacketData::PreferredHashAlgorithms(
            self.preferred_hash_algorithms.clone(),
        ))?);
        config.hashed_subpackets = hashed_subpackets;
        Ok(config)
    }

    pub fn pretty_key_flags(&self) -> PrettyKeyFlags {
        PrettyKeyFlags(self.key_flags.clone())
    }
}

/// Creation time and issuer key id, the subpackets every signature of an entity carries.
pub(crate) fn issuer_subpackets(
    created: UnixTime,
    issuer: KeyId,
) -> Result<Vec<Subpacket>, pgp::errors::Error> {
    Ok(vec![
        Subpacket::critical(SubpacketData::SignatureCreationTime(created.into()))?,
        Subpacket::regular(SubpacketData::Issuer(issuer))?,
    ])
}
