use nom::bytes::streaming::take;
use nom::error::{ErrorKind, ParseError};
use nom::{Err, IResult};
use rusticata_macros::newtype_enum;

use crate::endianness::PcapEndianness;

use super::option::{parse_options, PcapNGOption};
use super::pad4;

#[derive(Clone, Copy, Eq, PartialEq)]
pub struct SecretsType(pub u32);

newtype_enum! {
    impl debug SecretsType {
        TlsKeyLog = 0x544c_534b, // TLSK
        WireguardKeyLog = 0x5747_4b4c,
        ZigbeeNwkKey = 0x5a4e_574b,
        ZigbeeApsKey = 0x5a41_5053,
    }
}

/// A Decryption Secrets Block (DSB) stores keying material harvested during
/// capture. The payload is carried as-is and never interpreted.
#[derive(Debug)]
pub struct DecryptionSecretsBlock<'a> {
    pub secrets_type: SecretsType,
    pub secrets_len: u32,
    pub data: &'a [u8],
    pub options: Vec<PcapNGOption<'a>>,
}

pub(crate) fn parse_decryptionsecrets_content<'a, En: PcapEndianness, E: ParseError<&'a [u8]>>(
    i: &'a [u8],
) -> IResult<&'a [u8], DecryptionSecretsBlock<'a>, E> {
    let (i, secrets_type) = En::parse_u32(i)?;
    let (i, secrets_len) = En::parse_u32(i)?;
    // padded length computation can overflow
    if secrets_len >= u32::MAX - 4 {
        return Err(Err::Error(E::from_error_kind(i, ErrorKind::Verify)));
    }
    let (i, data) = take(secrets_len as usize)(i)?;
    let (i, _) = take(pad4(secrets_len as usize))(i)?;
    let (i, options) = parse_options::<En, E>(i)?;
    let block = DecryptionSecretsBlock {
        secrets_type: SecretsType(secrets_type),
        secrets_len,
        data,
        options,
    };
    Ok((i, block))
}
