use std::fmt::{self, Display};

use chrono::{DateTime, Utc};
use pgp::packet::{KeyFlags, Packet};

use crate::armor;

/// Possible encodings of `OpenPGP` key material.
///
/// The data is either armored i.e., base64 encoded with a header
/// -----BEGIN PGP ... -----
/// ...
/// -----END PGP ... -----
/// or encoded as raw packet bytes.
/// Auto is used to indicate that encoding is unknown and the function
/// should detect the encoding automatically.
#[derive(Default, PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum DataEncoding {
    /// The data is armored.
    Armored,
    /// The data is encoded as raw bytes.
    Unarmored,
    /// Try to detect the encoding automatically.
    #[default]
    Auto,
}

impl DataEncoding {
    pub(crate) fn resolve_for_read(self, data: &[u8]) -> ResolvedDataEncoding {
        match self {
            DataEncoding::Armored => ResolvedDataEncoding::Armored,
            DataEncoding::Unarmored => ResolvedDataEncoding::Unarmored,
            DataEncoding::Auto => armor::detect_encoding(data),
        }
    }
}

#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum ResolvedDataEncoding {
    /// The data is armored.
    Armored,
    /// The data is encoded as raw bytes.
    Unarmored,
}

/// `UnixTime` represents a unix timestamp within `OpenPGP`.
#[derive(Ord, PartialOrd, PartialEq, Eq, Hash, Clone, Copy, Debug, Default)]
pub struct UnixTime(u64);

impl UnixTime {
    /// Creates a new unix timestamp.
    pub fn new(unix_time: u64) -> Self {
        Self(unix_time)
    }

    pub fn now() -> Option<Self> {
        use web_time::{SystemTime, UNIX_EPOCH};
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(n) => Some(UnixTime::new(n.as_secs())),
            Err(_) => None,
        }
    }

    pub fn now_unchecked() -> Self {
        Self::now().unwrap_or_default()
    }

    /// Returns the Unix timestamp as a u64.
    pub fn unix_seconds(&self) -> u64 {
        self.0
    }

    /// Returns the timestamp moved forward by the given number of seconds.
    pub fn checked_add_seconds(&self, seconds: u64) -> Option<Self> {
        self.0.checked_add(seconds).map(Self)
    }
}

impl Display for UnixTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&DateTime<Utc>> for UnixTime {
    fn from(value: &DateTime<Utc>) -> Self {
        // Signature and key timestamps are never before the epoch.
        #[allow(clippy::cast_sign_loss)]
        Self(value.timestamp() as u64)
    }
}

impl From<DateTime<Utc>> for UnixTime {
    fn from(value: DateTime<Utc>) -> Self {
        Self::from(&value)
    }
}

impl From<UnixTime> for DateTime<Utc> {
    fn from(value: UnixTime) -> Self {
        let seconds = i64::try_from(value.unix_seconds()).unwrap_or_default();
        DateTime::from_timestamp(seconds, 0).unwrap_or_default()
    }
}

/// Human readable rendering of `OpenPGP` key flags, e.g. `[certify, sign]`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PrettyKeyFlags(pub KeyFlags);

impl Display for PrettyKeyFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::with_capacity(4);
        if self.0.certify() {
            names.push("certify");
        }
        if self.0.sign() {
            names.push("sign");
        }
        if self.0.encrypt_comms() {
            names.push("encrypt-communications");
        }
        if self.0.encrypt_storage() {
            names.push("encrypt-storage");
        }
        write!(f, "[{}]", names.join(", "))
    }
}

/// Short name of a packet for error messages.
pub(crate) fn packet_kind(packet: &Packet) -> &'static str {
    match packet {
        Packet::PublicKey(_) => "public key",
        Packet::SecretKey(_) => "secret key",
        Packet::Signature(_) => "signature",
        Packet::UserId(_) => "user id",
        Packet::LiteralData(_) => "literal data",
        Packet::PublicKeyEncryptedSessionKey(_) => "public key encrypted session key",
        Packet::SymKeyEncryptedSessionKey(_) => "symmetric key encrypted session key",
        Packet::SymEncryptedProtectedData(_) => "encrypted data",
        _ => "other packet",
    }
}
