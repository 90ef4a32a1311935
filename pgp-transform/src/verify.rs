use log::debug;
use pgp::{
    armor::BlockType,
    crypto::hash::HashAlgorithm,
    packet::{Packet, PacketParser, Signature},
    types::KeyId,
};

use crate::{armor, types::packet_kind, Entity, UnixTime, VerificationError};

/// Details of a successfully verified detached signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationInformation {
    /// Key id of the primary key the signature was checked against.
    pub key_id: KeyId,
    /// Hash algorithm declared inside the signature packet.
    pub hash_algorithm: Option<HashAlgorithm>,
    /// Signature creation time, if present.
    pub created: Option<UnixTime>,
}

/// Verifies detached signatures against the primary public key of an [`Entity`].
#[derive(Debug, Clone)]
pub struct Verifier<'a> {
    entity: &'a Entity,
}

impl<'a> Verifier<'a> {
    pub fn new(entity: &'a Entity) -> Self {
        Self { entity }
    }

    /// Verifies an armored detached signature over the exact bytes of `message`.
    ///
    /// The message is hashed with the algorithm declared in the signature packet.
    pub fn verify_detached(
        &self,
        message: impl AsRef<[u8]>,
        armored_signature: impl AsRef<[u8]>,
    ) -> Result<VerificationInformation, VerificationError> {
        let binary = armor::unarmor(armored_signature, BlockType::Signature)?;
        let signature = first_signature(&binary)?;

        let key_id = self.entity.key_id();
        let issuers = signature.issuer();
        if let Some(issuer) = issuers.first() {
            if !issuers.contains(&&key_id) {
                return Err(VerificationError::IssuerMismatch(**issuer, key_id));
            }
        }

        signature
            .verify(self.entity.primary_key(), message.as_ref())
            .map_err(VerificationError::Invalid)?;

        let info = VerificationInformation {
            key_id,
            hash_algorithm: signature.hash_alg(),
            created: signature.created().map(UnixTime::from),
        };
        debug!(
            "Verified signature by {} over {} bytes with {:?}",
            info.key_id,
            message.as_ref().len(),
            info.hash_algorithm
        );
        Ok(info)
    }
}

const SIGNATURE_TAG: u8 = 2;

/// Parses the first packet and requires it to be a signature.
///
/// The header tag decides the error class. A packet tagged as a signature whose
/// body does not parse counts as an invalid signature.
fn first_signature(data: &[u8]) -> Result<Signature, VerificationError> {
    let Some(&header) = data.first() else {
        return Err(VerificationError::NoPacket);
    };
    let tag = packet_tag(header).ok_or(VerificationError::InvalidHeader(header))?;
    let first = PacketParser::new(data).next();
    if tag != SIGNATURE_TAG {
        return match first {
            Some(Ok(other)) => Err(VerificationError::NotASignature(packet_kind(&other))),
            Some(Err(err)) => Err(VerificationError::Parse(err)),
            None => Err(VerificationError::NoPacket),
        };
    }
    match first {
        Some(Ok(Packet::Signature(signature))) => Ok(signature),
        Some(Ok(other)) => Err(VerificationError::NotASignature(packet_kind(&other))),
        Some(Err(err)) => Err(VerificationError::Malformed(err)),
        None => Err(VerificationError::Truncated),
    }
}

/// Tag of an `OpenPGP` packet header byte, `None` if the byte is not a header.
fn packet_tag(header: u8) -> Option<u8> {
    if header & 0x80 == 0 {
        return None;
    }
    if header & 0x40 == 0 {
        // Old format: tag in bits 5..2, length type in bits 1..0.
        Some((header >> 2) & 0x0f)
    } else {
        Some(header & 0x3f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_is_a_parse_error() {
        let err = first_signature(&[]).expect_err("Empty data has no signature");
        assert!(matches!(err, VerificationError::NoPacket));
    }

    #[test]
    fn literal_packet_is_not_a_signature() {
        // Literal data packet (new format, tag 11) with binary mode and empty name.
        let literal = [0xcb, 0x08, b'b', 0x00, 0x00, 0x00, 0x00, 0x00, b'h', b'i'];
        let err = first_signature(&literal).expect_err("Literal packet is not a signature");
        assert!(matches!(err, VerificationError::NotASignature(_)));
    }

    #[test]
    fn non_header_byte_is_a_parse_error() {
        let err = first_signature(b"hi").expect_err("Text is not a packet");
        assert!(matches!(err, VerificationError::InvalidHeader(b'h')));
        assert_eq!(err.kind(), crate::ErrorKind::SignatureParse);
    }

    #[test]
    fn corrupt_signature_body_is_invalid() {
        // Old format signature header with a one byte body.
        let err = first_signature(&[0x88, 0x01, 0x04]).expect_err("Body is not a signature");
        assert_eq!(err.kind(), crate::ErrorKind::SignatureInvalid);
    }

    #[test]
    fn packet_tags() {
        assert_eq!(packet_tag(0x89), Some(SIGNATURE_TAG));
        assert_eq!(packet_tag(0xc2), Some(SIGNATURE_TAG));
        assert_eq!(packet_tag(0xcb), Some(11));
        assert_eq!(packet_tag(0x99), Some(6));
        assert_eq!(packet_tag(0x42), None);
    }
}
