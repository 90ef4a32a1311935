use std::{
    env::{self, VarError},
    fmt::{self, Debug},
    io,
};

use log::debug;
use serde::Deserialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{Entity, EntityBuilder, Error, ProviderError};

pub const PUBLIC_KEY_VARIABLE: &str = "PGP_TRANSFORM_PUBLIC_KEY";
pub const PRIVATE_KEY_VARIABLE: &str = "PGP_TRANSFORM_PRIVATE_KEY";
pub const PASSPHRASE_VARIABLE: &str = "PGP_TRANSFORM_PASSPHRASE";

/// Supplies key material and the passphrase at call time.
///
/// Implementations decide where secrets live (environment, configuration file,
/// secret manager). Nothing in this crate keeps secrets beyond a single call.
pub trait KeyProvider {
    /// Public key bytes, armored or binary.
    fn public_key(&self) -> &[u8];

    /// Private key bytes, armored or binary, if this provider holds any.
    fn private_key(&self) -> Option<&[u8]>;

    /// Passphrase protecting the private key.
    fn passphrase(&self) -> &[u8];
}

impl Entity {
    /// Builds an entity from the key material of a provider.
    pub fn from_provider(provider: &impl KeyProvider) -> Result<Self, Error> {
        let entity = EntityBuilder::new(provider.public_key())
            .with_private_key(provider.private_key().unwrap_or_default())
            .build()?;
        Ok(entity)
    }
}

/// Key configuration loaded from the environment or a JSON document.
///
/// The private key and the passphrase are zeroized on drop and never printed.
#[derive(Clone, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct KeyConfig {
    public_key: String,
    #[serde(default)]
    private_key: Option<String>,
    #[serde(default)]
    passphrase: String,
}

impl KeyConfig {
    pub fn new(
        public_key: impl Into<String>,
        private_key: Option<String>,
        passphrase: impl Into<String>,
    ) -> Self {
        Self {
            public_key: public_key.into(),
            private_key,
            passphrase: passphrase.into(),
        }
    }

    /// Reads the configuration from the process environment.
    ///
    /// `PGP_TRANSFORM_PUBLIC_KEY` is required. `PGP_TRANSFORM_PRIVATE_KEY` and
    /// `PGP_TRANSFORM_PASSPHRASE` are optional.
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::from_env_with(|name| env::var(name))
    }

    /// Reads the configuration through a custom variable lookup.
    pub fn from_env_with(
        lookup: impl Fn(&str) -> Result<String, VarError>,
    ) -> Result<Self, ProviderError> {
        let optional = |name: &'static str| match lookup(name) {
            Ok(value) if value.is_empty() => Ok(None),
            Ok(value) => Ok(Some(value)),
            Err(VarError::NotPresent) => Ok(None),
            Err(err) => Err(ProviderError::Variable(name, err)),
        };
        let public_key = optional(PUBLIC_KEY_VARIABLE)?
            .ok_or(ProviderError::MissingVariable(PUBLIC_KEY_VARIABLE))?;
        let private_key = optional(PRIVATE_KEY_VARIABLE)?;
        let passphrase = optional(PASSPHRASE_VARIABLE)?.unwrap_or_default();
        debug!(
            "Loaded key configuration from environment, private key {}",
            if private_key.is_some() { "present" } else { "absent" }
        );
        Ok(Self {
            public_key,
            private_key,
            passphrase,
        })
    }

    /// Parses a JSON document of the form
    /// `{"public_key": "...", "private_key": "...", "passphrase": "..."}`.
    pub fn from_json_slice(data: &[u8]) -> Result<Self, ProviderError> {
        Ok(serde_json::from_slice(data)?)
    }

    pub fn from_json_reader(reader: impl io::Read) -> Result<Self, ProviderError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn has_private_key(&self) -> bool {
        self.private_key.is_some()
    }
}

impl KeyProvider for KeyConfig {
    fn public_key(&self) -> &[u8] {
        self.public_key.as_bytes()
    }

    fn private_key(&self) -> Option<&[u8]> {
        self.private_key.as_deref().map(str::as_bytes)
    }

    fn passphrase(&self) -> &[u8] {
        self.passphrase.as_bytes()
    }
}

impl Debug for KeyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyConfig")
            .field("public_key", &format_args!("{} bytes", self.public_key.len()))
            .field(
                "private_key",
                &self.private_key.as_ref().map(|_| "[CONFIDENTIAL]"),
            )
            .field("passphrase", &"[CONFIDENTIAL]")
            .finish()
    }
}
