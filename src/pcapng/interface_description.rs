use nom::error::ParseError;
use nom::IResult;

use crate::endianness::PcapEndianness;
use crate::linktype::Linktype;

use super::option::{parse_options, PcapNGOption};

/// An Interface Description Block (IDB) is the container for information
/// describing an interface on which packet data is captured.
#[derive(Debug)]
pub struct InterfaceDescriptionBlock<'a> {
    pub linktype: Linktype,
    pub reserved: u16,
    pub snaplen: u32,
    pub options: Vec<PcapNGOption<'a>>,
}

pub(crate) fn parse_interfacedescription_content<'a, En: PcapEndianness, E: ParseError<&'a [u8]>>(
    i: &'a [u8],
) -> IResult<&'a [u8], InterfaceDescriptionBlock<'a>, E> {
    let (i, linktype) = En::parse_u16(i)?;
    let (i, reserved) = En::parse_u16(i)?;
    let (i, snaplen) = En::parse_u32(i)?;
    let (i, options) = parse_options::<En, E>(i)?;
    let block = InterfaceDescriptionBlock {
        linktype: Linktype(i32::from(linktype)),
        reserved,
        snaplen,
        options,
    };
    Ok((i, block))
}
