use std::io;

use log::debug;
use pgp::{
    composed::{ArmorOptions, MessageBuilder},
    types::KeyDetails,
};

use crate::{compression, EncryptionError, Entity, Profile, DEFAULT_PROFILE};

/// Encrypts buffers to the encryption subkey of a single [`Entity`].
///
/// The plaintext is gzip-compressed first, then encrypted with AES-256 (SEIPD v1)
/// under a fresh session key and armored as `PGP MESSAGE`. No `OpenPGP` compression
/// packet is added, the entity's ZLIB preference is not consulted.
#[derive(Debug, Clone)]
pub struct Encryptor<'a> {
    entity: &'a Entity,
    profile: &'a Profile,
}

impl<'a> Encryptor<'a> {
    pub fn new(entity: &'a Entity) -> Self {
        Self {
            entity,
            profile: &DEFAULT_PROFILE,
        }
    }

    pub fn with_profile(mut self, profile: &'a Profile) -> Self {
        self.profile = profile;
        self
    }

    /// Encrypts `plaintext` and returns the armored message.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pgp_transform::{build_entity, Encryptor};
    ///
    /// # let public_key: &[u8] = &[];
    /// let entity = build_entity(public_key, &[]).unwrap();
    /// let armored = Encryptor::new(&entity).encrypt(b"hello world").unwrap();
    /// assert!(armored.starts_with(b"-----BEGIN PGP MESSAGE-----"));
    /// ```
    pub fn encrypt(&self, plaintext: impl AsRef<[u8]>) -> Result<Vec<u8>, EncryptionError> {
        let compressed = compression::gzip(plaintext.as_ref(), self.profile.message_gzip_level)?;
        let mut output = Vec::with_capacity(compressed.len() * 2 + 1024);
        self.encrypt_to_writer(&compressed, &mut output)?;
        debug!(
            "Encrypted {} bytes to key {} into {} armored bytes",
            plaintext.as_ref().len(),
            self.entity.encryption_key().key_id(),
            output.len()
        );
        Ok(output)
    }

    fn encrypt_to_writer(&self, data: &[u8], output: impl io::Write) -> Result<(), EncryptionError> {
        let mut rng = self.profile.rng();
        let message_builder = MessageBuilder::from_reader("", data);
        let mut seipd_v1_builder =
            message_builder.seipd_v1(&mut rng, self.profile.symmetric_algorithm());
        seipd_v1_builder
            .encrypt_to_key(&mut rng, self.entity.encryption_key())
            .map_err(EncryptionError::PkeskEncryption)?;
        seipd_v1_builder
            .to_armored_writer(
                rng,
                ArmorOptions {
                    headers: None,
                    include_checksum: true,
                },
                output,
            )
            .map_err(EncryptionError::DataEncryption)
    }
}
