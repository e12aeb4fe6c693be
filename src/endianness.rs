use nom::error::ParseError;
use nom::number::streaming::{be_i64, be_u16, be_u32, le_i64, le_u16, le_u32};
use nom::IResult;

/// Byte order of a capture section.
///
/// PCAPNG establishes it per section through the byte-order magic of the
/// Section Header Block; legacy PCAP infers it from the file magic.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Endianness {
    Big,
    Little,
}

impl Endianness {
    #[inline]
    pub fn is_big(self) -> bool {
        self == Endianness::Big
    }
}

pub(crate) struct PcapBE;
pub(crate) struct PcapLE;

pub(crate) trait PcapEndianness {
    const ENDIANNESS: Endianness;

    fn parse_u16<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], u16, E>;
    fn parse_u32<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], u32, E>;
    fn parse_i64<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], i64, E>;

    fn u32_from_bytes(i: [u8; 4]) -> u32;
    fn u64_from_bytes(i: [u8; 8]) -> u64;
}

impl PcapEndianness for PcapBE {
    const ENDIANNESS: Endianness = Endianness::Big;

    #[inline]
    fn parse_u16<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], u16, E> {
        be_u16(i)
    }

    #[inline]
    fn parse_u32<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], u32, E> {
        be_u32(i)
    }

    #[inline]
    fn parse_i64<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], i64, E> {
        be_i64(i)
    }

    #[inline]
    fn u32_from_bytes(i: [u8; 4]) -> u32 {
        u32::from_be_bytes(i)
    }

    #[inline]
    fn u64_from_bytes(i: [u8; 8]) -> u64 {
        u64::from_be_bytes(i)
    }
}

impl PcapEndianness for PcapLE {
    const ENDIANNESS: Endianness = Endianness::Little;

    #[inline]
    fn parse_u16<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], u16, E> {
        le_u16(i)
    }

    #[inline]
    fn parse_u32<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], u32, E> {
        le_u32(i)
    }

    #[inline]
    fn parse_i64<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], i64, E> {
        le_i64(i)
    }

    #[inline]
    fn u32_from_bytes(i: [u8; 4]) -> u32 {
        u32::from_le_bytes(i)
    }

    #[inline]
    fn u64_from_bytes(i: [u8; 8]) -> u64 {
        u64::from_le_bytes(i)
    }
}
