use std::io::{self, BufRead, Read};

use pgp::{
    armor::{self, BlockType, Dearmor},
    ser::Serialize,
};

use crate::{ArmorError, ResolvedDataEncoding};

const INCLUDE_CHECKSUM: bool = true;

const ARMOR_PREFIX: &str = "-----BEGIN PGP ";

/// Armors an encrypted message.
///
/// Produces data of the form:
/// ```skip
/// -----BEGIN PGP MESSAGE-----
///
/// ...
/// -----END PGP MESSAGE-----
/// ```
pub fn armor_message(message: impl AsRef<[u8]>) -> Result<Vec<u8>, ArmorError> {
    armor_binary(message.as_ref(), BlockType::Message)
}

/// Armors a detached signature.
///
/// Produces data of the form:
/// ```skip
/// -----BEGIN PGP SIGNATURE-----
///
/// ...
/// -----END PGP SIGNATURE-----
/// ```
pub fn armor_signature(signature: impl AsRef<[u8]>) -> Result<Vec<u8>, ArmorError> {
    armor_binary(signature.as_ref(), BlockType::Signature)
}

/// Unarmors the input and checks that the block has the expected type.
pub fn unarmor(
    armored: impl AsRef<[u8]>,
    expected_type: BlockType,
) -> Result<Vec<u8>, ArmorError> {
    let mut output = Vec::with_capacity(armored.as_ref().len());
    decode_to_buffer(armored.as_ref(), Some(expected_type), &mut output)?;
    Ok(output)
}

fn armor_binary(data: &[u8], block_type: BlockType) -> Result<Vec<u8>, ArmorError> {
    let mut armored = Vec::with_capacity(data.len() * 4 / 3 + 128);
    encode_to_buffer(
        &BinaryArmorSource { data },
        block_type,
        INCLUDE_CHECKSUM,
        &mut armored,
    )?;
    Ok(armored)
}

pub(crate) fn encode_to_buffer(
    input: &impl Serialize,
    block_type: BlockType,
    include_checksum: bool,
    mut output: impl io::Write,
) -> Result<(), ArmorError> {
    armor::write(input, block_type, &mut output, None, include_checksum)
        .map_err(ArmorError::Encode)
}

/// Unarmor the input into the output buffer.
///
/// If the `expected_type` is set, it checks if the armor header matches.
pub(crate) fn decode_to_buffer(
    input: &[u8],
    expected_type: Option<BlockType>,
    output: &mut Vec<u8>,
) -> Result<(), ArmorError> {
    let mut dearmor = decode_to_reader(input, expected_type)?;
    dearmor.read_to_end(output).map_err(ArmorError::Decode)?;
    Ok(())
}

/// Reads the armor header and returns a reader over the decoded body.
///
/// Only the header is validated here. Errors in the body surface while reading.
pub(crate) fn decode_to_reader<R>(
    input: R,
    expected_type: Option<BlockType>,
) -> Result<Dearmor<R>, ArmorError>
where
    R: BufRead,
{
    let mut dearmor = Dearmor::new(input);
    dearmor
        .read_header()
        .map_err(|_| ArmorError::DecodeHeader)?;
    if let Some(expected_type) = expected_type {
        let typ = dearmor.typ.ok_or(ArmorError::DecodeHeader)?;
        if typ != expected_type {
            return Err(ArmorError::DecodeWrongHeader(
                typ.to_string(),
                expected_type,
            ));
        }
    }
    Ok(dearmor)
}

/// Tries to heuristically detect if the input is armored.
pub(crate) fn detect_encoding(input: impl AsRef<[u8]>) -> ResolvedDataEncoding {
    let buffer = input.as_ref();

    if buffer.len() < ARMOR_PREFIX.len() {
        return ResolvedDataEncoding::Unarmored;
    }

    if std::str::from_utf8(buffer).is_ok_and(|s| s.trim_start().starts_with(ARMOR_PREFIX)) {
        ResolvedDataEncoding::Armored
    } else {
        ResolvedDataEncoding::Unarmored
    }
}

pub(crate) struct BinaryArmorSource<'a> {
    data: &'a [u8],
}

impl Serialize for BinaryArmorSource<'_> {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> pgp::errors::Result<()> {
        writer.write_all(self.data)?;
        Ok(())
    }

    fn write_len(&self) -> usize {
        self.data.len()
    }
}
