use std::{
    env::VarError,
    fmt::{self, Display},
    io,
};

use pgp::{
    armor::BlockType,
    crypto::public_key::PublicKeyAlgorithm,
    types::{KeyId, PkeskVersion},
};

pub type Result<T> = std::result::Result<T, Error>;

pub(crate) const ERROR_PREFIX: &str = "pgp-transform";

/// Coarse classification of every failure returned by this crate.
///
/// Callers that map failures onto an outer surface (status codes, retries,
/// alerts) should match on the kind rather than on the concrete error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or unsupported key encoding.
    KeyParse,
    /// A private key could not be unlocked.
    Passphrase,
    /// Wrong, missing or corrupt armor block type.
    ArmorFormat,
    /// The first packet of a detached signature is not a signature.
    SignatureParse,
    /// The cryptographic signature check failed.
    SignatureInvalid,
    /// Underlying encryption or decryption failure not otherwise classified.
    CryptoOperation,
    /// Gzip compressor or decompressor failure.
    Compression,
    /// Key material or passphrase could not be provided.
    Provider,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::KeyParse => "KeyParseError",
            ErrorKind::Passphrase => "PassphraseError",
            ErrorKind::ArmorFormat => "ArmorFormatError",
            ErrorKind::SignatureParse => "SignatureParseError",
            ErrorKind::SignatureInvalid => "SignatureInvalid",
            ErrorKind::CryptoOperation => "CryptoOperationError",
            ErrorKind::Compression => "CompressionError",
            ErrorKind::Provider => "ProviderError",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    KeyImport(#[from] KeyImportError),

    #[error(transparent)]
    Unlock(#[from] UnlockError),

    #[error(transparent)]
    Encryption(#[from] EncryptionError),

    #[error(transparent)]
    Decryption(#[from] DecryptionError),

    #[error(transparent)]
    Sign(#[from] SignError),

    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error(transparent)]
    Armor(#[from] ArmorError),

    #[error(transparent)]
    Compression(#[from] CompressionError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::KeyImport(err) => err.kind(),
            Error::Unlock(err) => err.kind(),
            Error::Encryption(err) => err.kind(),
            Error::Decryption(err) => err.kind(),
            Error::Sign(err) => err.kind(),
            Error::Verification(err) => err.kind(),
            Error::Armor(err) => err.kind(),
            Error::Compression(err) => err.kind(),
            Error::Provider(err) => err.kind(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum KeyImportError {
    #[error("{ERROR_PREFIX}: No public key material provided")]
    EmptyPublicKey,

    #[error("{ERROR_PREFIX}: Failed to unarmor key: {0}")]
    Armor(#[from] ArmorError),

    #[error("{ERROR_PREFIX}: Failed to decode key packet: {0}")]
    Decode(pgp::errors::Error),

    #[error("{ERROR_PREFIX}: No key packet found")]
    NoKeyPacket,

    #[error("{ERROR_PREFIX}: Expected a {expected} packet, found: {found}")]
    UnexpectedPacket {
        expected: &'static str,
        found: &'static str,
    },

    #[error("{ERROR_PREFIX}: Unsupported public key algorithm: {0:?}")]
    UnsupportedAlgorithm(PublicKeyAlgorithm),

    #[error("{ERROR_PREFIX}: Private key {private} does not belong to public key {public}")]
    KeyMismatch { public: KeyId, private: KeyId },
}

impl KeyImportError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::KeyParse
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UnlockError {
    #[error("{ERROR_PREFIX}: Entity has no private key to unlock")]
    MissingPrivateKey,

    #[error("{ERROR_PREFIX}: Failed to unlock private OpenPGP key with key id {0}: {1}")]
    Unlock(KeyId, pgp::errors::Error),
}

impl UnlockError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Passphrase
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EncryptionError {
    #[error("{ERROR_PREFIX}: Failed to compress plaintext before encryption: {0}")]
    Compression(#[from] CompressionError),

    #[error("{ERROR_PREFIX}: Failed to encrypt session key with a public key: {0}")]
    PkeskEncryption(pgp::errors::Error),

    #[error("{ERROR_PREFIX}: Failed to encrypt data: {0}")]
    DataEncryption(pgp::errors::Error),
}

impl EncryptionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EncryptionError::Compression(_) => ErrorKind::Compression,
            EncryptionError::PkeskEncryption(_) | EncryptionError::DataEncryption(_) => {
                ErrorKind::CryptoOperation
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DecryptionError {
    #[error(transparent)]
    Unlock(#[from] UnlockError),

    #[error("{ERROR_PREFIX}: Invalid message armor: {0}")]
    Armor(#[from] ArmorError),

    #[error("{ERROR_PREFIX}: Failed to read armored message body: {0}")]
    ArmorBody(io::Error),

    #[error("{ERROR_PREFIX}: Failed to parse message: {0}")]
    MessageParsing(pgp::errors::Error),

    #[error("{ERROR_PREFIX}: Message is not encrypted")]
    UnexpectedPlaintext,

    #[error("{ERROR_PREFIX}: Unexpected locked key {0}")]
    LockedKey(KeyId),

    #[error("{ERROR_PREFIX}: No session key packet addressed to key {0}")]
    PkeskNoMatchingKey(KeyId),

    #[error("{ERROR_PREFIX}: Invalid PKESK version: {0:?}")]
    InvalidPkesk(PkeskVersion),

    #[error("{ERROR_PREFIX}: PKESK decryption for key {0} failed: {1}")]
    PkeskDecryption(KeyId, pgp::errors::Error),

    #[error("{ERROR_PREFIX}: Failed to decrypt with session key: {0}")]
    InvalidSessionKey(pgp::errors::Error),

    #[error("{ERROR_PREFIX}: Failed to decompress OpenPGP compressed data: {0}")]
    Decompression(pgp::errors::Error),

    #[error("{ERROR_PREFIX}: Failed to read decrypted data: {0}")]
    Read(io::Error),

    #[error("{ERROR_PREFIX}: Failed to gunzip decrypted data: {0}")]
    Compression(#[from] CompressionError),
}

impl DecryptionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecryptionError::Unlock(err) => err.kind(),
            DecryptionError::LockedKey(_) => ErrorKind::Passphrase,
            DecryptionError::Armor(err) => err.kind(),
            DecryptionError::Compression(err) => err.kind(),
            DecryptionError::ArmorBody(_)
            | DecryptionError::MessageParsing(_)
            | DecryptionError::UnexpectedPlaintext
            | DecryptionError::PkeskNoMatchingKey(_)
            | DecryptionError::InvalidPkesk(_)
            | DecryptionError::PkeskDecryption(_, _)
            | DecryptionError::InvalidSessionKey(_)
            | DecryptionError::Decompression(_)
            | DecryptionError::Read(_) => ErrorKind::CryptoOperation,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SignError {
    #[error(transparent)]
    Unlock(#[from] UnlockError),

    #[error("{ERROR_PREFIX}: Failed to create signature subpacket: {0}")]
    Subpacket(pgp::errors::Error),

    #[error("{ERROR_PREFIX}: Failed to sign data: {0}")]
    Sign(pgp::errors::Error),

    #[error("{ERROR_PREFIX}: Failed to armor signature: {0}")]
    Armor(#[from] ArmorError),
}

impl SignError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SignError::Unlock(err) => err.kind(),
            SignError::Subpacket(_) | SignError::Sign(_) | SignError::Armor(_) => {
                ErrorKind::CryptoOperation
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("{ERROR_PREFIX}: Invalid signature armor: {0}")]
    Armor(#[from] ArmorError),

    #[error("{ERROR_PREFIX}: No packet found in signature data")]
    NoPacket,

    #[error("{ERROR_PREFIX}: Signature data does not start with a packet header: {0:#04x}")]
    InvalidHeader(u8),

    #[error("{ERROR_PREFIX}: Failed to parse signature packet: {0}")]
    Parse(pgp::errors::Error),

    #[error("{ERROR_PREFIX}: First packet is not a signature, found: {0}")]
    NotASignature(&'static str),

    #[error("{ERROR_PREFIX}: Signature issuer {0} does not match verification key {1}")]
    IssuerMismatch(KeyId, KeyId),

    #[error("{ERROR_PREFIX}: Signature verification failed: {0}")]
    Invalid(pgp::errors::Error),

    #[error("{ERROR_PREFIX}: Malformed signature packet: {0}")]
    Malformed(pgp::errors::Error),

    #[error("{ERROR_PREFIX}: Truncated signature packet")]
    Truncated,
}

impl VerificationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            VerificationError::Armor(err) => err.kind(),
            VerificationError::NoPacket
            | VerificationError::InvalidHeader(_)
            | VerificationError::Parse(_)
            | VerificationError::NotASignature(_) => ErrorKind::SignatureParse,
            VerificationError::IssuerMismatch(_, _)
            | VerificationError::Invalid(_)
            | VerificationError::Malformed(_)
            | VerificationError::Truncated => ErrorKind::SignatureInvalid,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ArmorError {
    #[error("No armor header found")]
    DecodeHeader,

    #[error("Wrong header, got: {0} expected {1}")]
    DecodeWrongHeader(String, BlockType),

    #[error("Failed to decode armor due to io: {0}")]
    Decode(io::Error),

    #[error("Failed to armor: {0}")]
    Encode(pgp::errors::Error),
}

impl ArmorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ArmorError::DecodeHeader | ArmorError::DecodeWrongHeader(_, _) | ArmorError::Decode(_) => {
                ErrorKind::ArmorFormat
            }
            ArmorError::Encode(_) => ErrorKind::CryptoOperation,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CompressionError {
    #[error("Failed to write data to the gzip compressor: {0}")]
    Write(io::Error),

    #[error("Failed to finish the gzip stream: {0}")]
    Finish(io::Error),

    #[error("Data is not a gzip stream")]
    InvalidHeader,

    #[error("Failed to read from the gzip decompressor: {0}")]
    Read(io::Error),

    #[error("Failed to release the gzip decompressor: {0} unread bytes left")]
    Release(usize),
}

impl CompressionError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Compression
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{ERROR_PREFIX}: Missing required environment variable {0}")]
    MissingVariable(&'static str),

    #[error("{ERROR_PREFIX}: Failed to read environment variable {0}: {1}")]
    Variable(&'static str, VarError),

    #[error("{ERROR_PREFIX}: Failed to parse key configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{ERROR_PREFIX}: Failed to read key configuration: {0}")]
    Io(#[from] io::Error),
}

impl ProviderError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Provider
    }
}
