use std::io::Read;

use log::debug;
use pgp::{
    armor::BlockType,
    composed::{Esk, Message, PlainSessionKey, TheRing},
    packet::{self, PublicKeyEncryptedSessionKey},
    types::{EskType, KeyDetails, PkeskVersion, PublicKeyTrait, SecretParams},
};

use crate::{armor, compression, DecryptionError, Entity, UnlockedEntity};

/// Decrypts armored messages produced for a single [`Entity`].
///
/// Embedded signatures are not verified: the holder of the private key is trusted
/// to be the only legitimate reader of the message.
#[derive(Debug, Clone)]
pub struct Decryptor<'a> {
    entity: &'a Entity,
}

impl<'a> Decryptor<'a> {
    pub fn new(entity: &'a Entity) -> Self {
        Self { entity }
    }

    /// Unlocks the entity with `passphrase` and decrypts `armored`.
    ///
    /// The unlock happens before the armor is looked at, so a wrong passphrase is
    /// reported even for malformed input.
    pub fn decrypt(
        &self,
        passphrase: &[u8],
        armored: impl AsRef<[u8]>,
    ) -> Result<Vec<u8>, DecryptionError> {
        let unlocked = self.entity.unlock(passphrase)?;
        decrypt_unlocked(&unlocked, armored)
    }
}

/// Decrypts `armored` with already unlocked key material and gunzips the result.
pub fn decrypt_unlocked(
    unlocked: &UnlockedEntity<'_>,
    armored: impl AsRef<[u8]>,
) -> Result<Vec<u8>, DecryptionError> {
    let armored = armored.as_ref();
    let mut dearmor = armor::decode_to_reader(armored, Some(BlockType::Message))?;
    let mut binary = Vec::with_capacity(armored.len());
    dearmor
        .read_to_end(&mut binary)
        .map_err(DecryptionError::ArmorBody)?;

    let message = Message::from_bytes(binary.as_slice()).map_err(DecryptionError::MessageParsing)?;
    let compressed = read_decrypted_body(message, unlocked)?;
    let plaintext = compression::gunzip(&compressed)?;
    debug!(
        "Decrypted message for key {} into {} bytes",
        unlocked.entity().key_id(),
        plaintext.len()
    );
    Ok(plaintext)
}

fn read_decrypted_body(
    message: Message<'_>,
    unlocked: &UnlockedEntity<'_>,
) -> Result<Vec<u8>, DecryptionError> {
    let Message::Encrypted { esk, .. } = &message else {
        return Err(DecryptionError::UnexpectedPlaintext);
    };

    let key_id = unlocked.entity().key_id();
    let mut session_keys = Vec::with_capacity(1);
    let mut last_error = None;
    for esk_packet in esk {
        let Esk::PublicKeyEncryptedSessionKey(pkesk) = esk_packet else {
            continue;
        };
        if !pkesk_matches(pkesk, unlocked) {
            continue;
        }
        match handle_pkesk_decryption(pkesk, unlocked) {
            Ok(session_key) => {
                session_keys.push(session_key);
                break;
            }
            Err(err) => last_error = Some(err),
        }
    }
    if session_keys.is_empty() {
        return Err(last_error.unwrap_or(DecryptionError::PkeskNoMatchingKey(key_id)));
    }

    let the_ring = TheRing {
        secret_keys: Vec::new(),
        key_passwords: Vec::new(),
        message_password: Vec::new(),
        session_keys,
        allow_legacy: false,
    };
    let (decrypted, _) = message
        .decrypt_the_ring(the_ring, false)
        .map_err(DecryptionError::InvalidSessionKey)?;

    // Payloads from other producers may carry an OpenPGP compression layer below the gzip one.
    let mut decrypted = if matches!(decrypted, Message::Compressed { .. }) {
        decrypted
            .decompress()
            .map_err(DecryptionError::Decompression)?
    } else {
        decrypted
    };

    let mut body = Vec::new();
    decrypted
        .read_to_end(&mut body)
        .map_err(DecryptionError::Read)?;
    Ok(body)
}

/// Checks if the PKESK is addressed to the entity or is anonymous.
fn pkesk_matches(pkesk: &PublicKeyEncryptedSessionKey, unlocked: &UnlockedEntity<'_>) -> bool {
    match pkesk.id() {
        Ok(key_id) => {
            key_id.is_wildcard()
                || unlocked
                    .decryption_keys()
                    .iter()
                    .any(|key| key.key_id() == *key_id)
        }
        Err(_) => false,
    }
}

fn handle_pkesk_decryption(
    pkesk: &PublicKeyEncryptedSessionKey,
    unlocked: &UnlockedEntity<'_>,
) -> Result<PlainSessionKey, DecryptionError> {
    let mut last_error = None;
    for secret_key in unlocked.decryption_keys() {
        match decrypt_session_key(secret_key, pkesk) {
            Ok(session_key) => return Ok(session_key),
            Err(err) => last_error = Some(err),
        }
    }
    Err(last_error.unwrap_or(DecryptionError::PkeskNoMatchingKey(
        unlocked.entity().key_id(),
    )))
}

fn decrypt_session_key(
    secret_key: &packet::SecretKey,
    pkesk: &PublicKeyEncryptedSessionKey,
) -> Result<PlainSessionKey, DecryptionError> {
    let esk_type = match pkesk.version() {
        PkeskVersion::V3 => EskType::V3_4,
        v => return Err(DecryptionError::InvalidPkesk(v)),
    };
    let SecretParams::Plain(plain_secret_params) = secret_key.secret_params() else {
        return Err(DecryptionError::LockedKey(secret_key.key_id()));
    };
    let public_key = secret_key.public_key();
    let values = pkesk
        .values()
        .map_err(|err| DecryptionError::PkeskDecryption(secret_key.key_id(), err))?;
    plain_secret_params
        .decrypt(public_key.public_params(), values, esk_type, public_key)
        .map_err(|err| DecryptionError::PkeskDecryption(secret_key.key_id(), err))
}
