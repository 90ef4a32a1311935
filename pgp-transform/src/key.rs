use std::fmt;

use log::debug;
use pgp::{
    armor::BlockType,
    packet::{self, Packet, PacketParser},
    types::{Fingerprint, KeyDetails, KeyId, Password, PublicKeyTrait, PublicParams},
};
use rsa::traits::PublicKeyParts;

use crate::{
    armor, types::packet_kind, DataEncoding, KeyImportError, Profile, ResolvedDataEncoding,
    UnixTime, UnlockError, DEFAULT_PROFILE,
};

mod binding;
pub use binding::*;

/// Builds an [`Entity`] from raw public key bytes and optional private key bytes.
///
/// An empty `private_key` yields a public-only entity.
pub fn build_entity(public_key: &[u8], private_key: &[u8]) -> Result<Entity, KeyImportError> {
    EntityBuilder::new(public_key)
        .with_private_key(private_key)
        .build()
}

/// Builder turning bare key packets into an [`Entity`] with the fixed profile.
#[derive(Debug, Clone)]
pub struct EntityBuilder<'a> {
    public_key: &'a [u8],
    private_key: &'a [u8],
    encoding: DataEncoding,
    date: Option<UnixTime>,
    profile: &'a Profile,
}

impl<'a> EntityBuilder<'a> {
    pub fn new(public_key: &'a [u8]) -> Self {
        Self {
            public_key,
            private_key: &[],
            encoding: DataEncoding::Auto,
            date: None,
            profile: &DEFAULT_PROFILE,
        }
    }

    /// Attach private key material. The key stays locked.
    pub fn with_private_key(mut self, private_key: &'a [u8]) -> Self {
        self.private_key = private_key;
        self
    }

    /// Force the encoding of the key inputs instead of detecting it.
    pub fn with_encoding(mut self, encoding: DataEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Pin the creation time of the bindings. Defaults to the build time.
    pub fn at_date(mut self, date: UnixTime) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_profile(mut self, profile: &'a Profile) -> Self {
        self.profile = profile;
        self
    }

    pub fn build(self) -> Result<Entity, KeyImportError> {
        if self.public_key.is_empty() {
            return Err(KeyImportError::EmptyPublicKey);
        }
        let primary_key = self.import_public_key()?;
        check_key_requirements(&primary_key, self.profile)?;

        let private_key = if self.private_key.is_empty() {
            None
        } else {
            let private_key = self.import_private_key()?;
            if private_key.key_id() != primary_key.key_id() {
                return Err(KeyImportError::KeyMismatch {
                    public: primary_key.key_id(),
                    private: private_key.key_id(),
                });
            }
            Some(private_key)
        };

        let created = self.date.unwrap_or_else(UnixTime::now_unchecked);
        let issuer = primary_key.key_id();
        let identity = IdentityBinding::new(issuer, created, self.profile);
        let subkey = Subkey {
            public_key: primary_key.clone(),
            private_key: private_key.clone(),
            binding: SubkeyBinding::new(issuer, created, self.profile),
        };

        debug!(
            "Built entity for key {issuer} (RSA {} bits): identity flags {}, subkey flags {}, private key {}",
            rsa_bits(&primary_key).unwrap_or_default(),
            identity.pretty_key_flags(),
            subkey.binding.pretty_key_flags(),
            if private_key.is_some() { "locked" } else { "absent" },
        );

        Ok(Entity {
            primary_key,
            private_key,
            identity,
            subkey,
        })
    }

    fn import_public_key(&self) -> Result<packet::PublicKey, KeyImportError> {
        match first_packet(self.public_key, self.encoding, BlockType::PublicKey)? {
            Packet::PublicKey(public_key) => Ok(public_key),
            other => Err(KeyImportError::UnexpectedPacket {
                expected: "public key",
                found: packet_kind(&other),
            }),
        }
    }

    fn import_private_key(&self) -> Result<packet::SecretKey, KeyImportError> {
        match first_packet(self.private_key, self.encoding, BlockType::PrivateKey)? {
            Packet::SecretKey(secret_key) => Ok(secret_key),
            other => Err(KeyImportError::UnexpectedPacket {
                expected: "private key",
                found: packet_kind(&other),
            }),
        }
    }
}

/// Reads the first packet of armored or binary key material.
fn first_packet(
    input: &[u8],
    encoding: DataEncoding,
    block_type: BlockType,
) -> Result<Packet, KeyImportError> {
    let mut buffer = Vec::new();
    let data = match encoding.resolve_for_read(input) {
        ResolvedDataEncoding::Armored => {
            armor::decode_to_buffer(input, Some(block_type), &mut buffer)?;
            buffer.as_slice()
        }
        ResolvedDataEncoding::Unarmored => input,
    };
    match PacketParser::new(data).next() {
        Some(Ok(packet)) => Ok(packet),
        Some(Err(err)) => Err(KeyImportError::Decode(err)),
        None => Err(KeyImportError::NoKeyPacket),
    }
}

/// Checks that the primary key uses an algorithm of the profile.
fn check_key_requirements(
    public_key: &packet::PublicKey,
    profile: &Profile,
) -> Result<(), KeyImportError> {
    let algorithm = public_key.algorithm();
    if !profile.accepts_key_algorithm(algorithm) {
        return Err(KeyImportError::UnsupportedAlgorithm(algorithm));
    }
    Ok(())
}

/// Modulus size of an RSA key.
fn rsa_bits(public_key: &packet::PublicKey) -> Option<usize> {
    match public_key.public_params() {
        PublicParams::RSA(params) => Some(params.key.n().bits()),
        _ => None,
    }
}

/// The encryption subkey of an entity.
///
/// It shares its key material with the primary key.
#[derive(Debug, Clone)]
pub struct Subkey {
    public_key: packet::PublicKey,
    private_key: Option<packet::SecretKey>,
    binding: SubkeyBinding,
}

impl Subkey {
    pub fn public_key(&self) -> &packet::PublicKey {
        &self.public_key
    }

    pub fn binding(&self) -> &SubkeyBinding {
        &self.binding
    }
}

/// A primary key with one placeholder identity and one encryption subkey.
///
/// The entity is immutable. Private key material, if present, stays locked inside it;
/// [`Entity::unlock`] returns a separate [`UnlockedEntity`] handle instead.
#[derive(Debug, Clone)]
pub struct Entity {
    primary_key: packet::PublicKey,
    private_key: Option<packet::SecretKey>,
    identity: IdentityBinding,
    subkey: Subkey,
}

impl Entity {
    pub fn primary_key(&self) -> &packet::PublicKey {
        &self.primary_key
    }

    pub fn key_id(&self) -> KeyId {
        self.primary_key.key_id()
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.primary_key.fingerprint()
    }

    /// Lowercase hex encoding of the primary key fingerprint.
    pub fn fingerprint_hex(&self) -> String {
        hex::encode(self.fingerprint().as_bytes())
    }

    pub fn identity(&self) -> &IdentityBinding {
        &self.identity
    }

    pub fn subkey(&self) -> &Subkey {
        &self.subkey
    }

    /// The key messages are encrypted to.
    pub fn encryption_key(&self) -> &packet::PublicKey {
        &self.subkey.public_key
    }

    pub fn has_private_key(&self) -> bool {
        self.private_key.is_some()
    }

    /// Indicates if any private key material is protected by a passphrase.
    pub fn is_locked(&self) -> bool {
        self.private_key
            .iter()
            .chain(self.subkey.private_key.iter())
            .any(|key| key.secret_params().is_encrypted())
    }

    /// Unlock the primary key and the subkey with a passphrase.
    ///
    /// Works on copies of the key material, the entity itself is not modified.
    pub fn unlock(&self, passphrase: &[u8]) -> Result<UnlockedEntity<'_>, UnlockError> {
        let (Some(primary_key), Some(subkey)) = (&self.private_key, &self.subkey.private_key)
        else {
            return Err(UnlockError::MissingPrivateKey);
        };
        let local_password = Password::from(passphrase);
        let mut primary_copy = primary_key.clone();
        primary_copy
            .remove_password(&local_password)
            .map_err(|err| UnlockError::Unlock(primary_copy.key_id(), err))?;
        let mut subkey_copy = subkey.clone();
        subkey_copy
            .remove_password(&local_password)
            .map_err(|err| UnlockError::Unlock(subkey_copy.key_id(), err))?;
        debug!("Unlocked private key material of entity {}", self.key_id());
        Ok(UnlockedEntity {
            entity: self,
            primary_key: primary_copy,
            subkey: subkey_copy,
        })
    }
}

/// Unlocked private key material of an [`Entity`].
///
/// Required for signing and decryption. Dropping the handle discards the plain key material.
pub struct UnlockedEntity<'a> {
    entity: &'a Entity,
    primary_key: packet::SecretKey,
    subkey: packet::SecretKey,
}

impl fmt::Debug for UnlockedEntity<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnlockedEntity")
            .field("key_id", &self.entity.key_id())
            .finish_non_exhaustive()
    }
}

impl UnlockedEntity<'_> {
    pub fn entity(&self) -> &Entity {
        self.entity
    }

    pub(crate) fn primary_secret_key(&self) -> &packet::SecretKey {
        &self.primary_key
    }

    /// Secret keys that may decrypt messages, subkey first.
    ///
    /// The primary key is skipped when it is the same key as the subkey.
    pub(crate) fn decryption_keys(&self) -> Vec<&packet::SecretKey> {
        let mut keys = vec![&self.subkey];
        if self.primary_key.key_id() != self.subkey.key_id() {
            keys.push(&self.primary_key);
        }
        keys
    }
}
