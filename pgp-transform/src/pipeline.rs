use log::debug;

use crate::{
    Decryptor, Encryptor, Entity, KeyProvider, Result, Signer, VerificationInformation, Verifier,
};

/// Runs the four transforms against the key material of a [`KeyProvider`].
///
/// The entity is rebuilt from the provider on every call and dropped afterwards,
/// unlocked key material never outlives the call that needed it.
#[derive(Debug, Clone)]
pub struct TransformPipeline<P> {
    provider: P,
}

impl<P: KeyProvider> TransformPipeline<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Gzips, encrypts and armors `plaintext`.
    pub fn encrypt(&self, plaintext: impl AsRef<[u8]>) -> Result<Vec<u8>> {
        let entity = self.entity()?;
        Ok(Encryptor::new(&entity).encrypt(plaintext)?)
    }

    /// Decrypts and gunzips an armored message.
    pub fn decrypt(&self, armored: impl AsRef<[u8]>) -> Result<Vec<u8>> {
        let entity = self.entity()?;
        Ok(Decryptor::new(&entity).decrypt(self.provider.passphrase(), armored)?)
    }

    /// Produces an armored detached signature over `message`.
    pub fn sign(&self, message: impl AsRef<[u8]>) -> Result<Vec<u8>> {
        let entity = self.entity()?;
        let unlocked = entity.unlock(self.provider.passphrase())?;
        Ok(Signer::new(&unlocked).sign_detached(message)?)
    }

    pub fn verify(
        &self,
        message: impl AsRef<[u8]>,
        armored_signature: impl AsRef<[u8]>,
    ) -> Result<VerificationInformation> {
        let entity = self.entity()?;
        Ok(Verifier::new(&entity).verify_detached(message, armored_signature)?)
    }

    fn entity(&self) -> Result<Entity> {
        let entity = Entity::from_provider(&self.provider)?;
        debug!("Pipeline entity {} ready", entity.fingerprint_hex());
        Ok(entity)
    }
}
