use nom::error::ParseError;
use nom::IResult;

use crate::endianness::PcapEndianness;

use super::DCB_MAGIC;

/// A Custom Block (CB) carries vendor data identified by a Private
/// Enterprise Number.
///
/// There is no way to distinguish custom data from trailing options, since
/// the data length is not stored; everything after the PEN is kept opaque.
#[derive(Debug)]
pub struct CustomBlock<'a> {
    pub block_type: u32,
    /// Private Enterprise Number (PEN)
    pub pen: u32,
    pub data: &'a [u8],
}

impl<'a> CustomBlock<'a> {
    /// True for the `0x40000BAD` variant, which must not be copied when the
    /// capture is rewritten.
    pub fn do_not_copy(&self) -> bool {
        self.block_type == DCB_MAGIC
    }
}

pub(crate) fn parse_custom_content<'a, En: PcapEndianness, E: ParseError<&'a [u8]>>(
    block_type: u32,
    i: &'a [u8],
) -> IResult<&'a [u8], CustomBlock<'a>, E> {
    let (i, pen) = En::parse_u32(i)?;
    let block = CustomBlock {
        block_type,
        pen,
        data: i,
    };
    Ok((&[], block))
}
