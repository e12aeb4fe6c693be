use nom::error::ParseError;
use nom::number::streaming::le_u32;
use nom::IResult;

use crate::endianness::PcapEndianness;

use super::option::{parse_options, PcapNGOption};
use super::BOM_MAGIC;

/// The Section Header Block (SHB) identifies the beginning of a section of
/// the capture file.
///
/// The Section Header Block does not contain data but it rather identifies a
/// list of blocks (interfaces, packets) that are logically correlated.
#[derive(Debug)]
pub struct SectionHeaderBlock<'a> {
    /// Byte-order magic
    pub bom: u32,
    pub major_version: u16,
    pub minor_version: u16,
    /// Declared section length; -1 means "unknown"
    pub section_len: i64,
    pub options: Vec<PcapNGOption<'a>>,
}

impl<'a> SectionHeaderBlock<'a> {
    pub fn big_endian(&self) -> bool {
        self.bom != BOM_MAGIC
    }
}

pub(crate) fn parse_sectionheader_content<'a, En: PcapEndianness, E: ParseError<&'a [u8]>>(
    i: &'a [u8],
) -> IResult<&'a [u8], SectionHeaderBlock<'a>, E> {
    // the byte-order magic is what *defines* the endianness, read it raw
    let (i, bom) = le_u32(i)?;
    let (i, major_version) = En::parse_u16(i)?;
    let (i, minor_version) = En::parse_u16(i)?;
    let (i, section_len) = En::parse_i64(i)?;
    let (i, options) = parse_options::<En, E>(i)?;
    let block = SectionHeaderBlock {
        bom,
        major_version,
        minor_version,
        section_len,
        options,
    };
    Ok((i, block))
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;
    use nom::error::Error;

    use crate::endianness::{PcapBE, PcapLE};

    use super::*;

    #[test]
    fn shb_content_be() {
        let input = &hex!("1A2B3C4D 0001 0000 FFFFFFFFFFFFFFFF");
        let (rem, shb) = parse_sectionheader_content::<PcapBE, Error<&[u8]>>(input).unwrap();
        assert!(rem.is_empty());
        assert!(shb.big_endian());
        assert_eq!(shb.major_version, 1);
        assert_eq!(shb.minor_version, 0);
        assert_eq!(shb.section_len, -1);
        assert!(shb.options.is_empty());
    }

    #[test]
    fn shb_content_le() {
        let input = &hex!("4D3C2B1A 0100 0000 FFFFFFFFFFFFFFFF");
        let (rem, shb) = parse_sectionheader_content::<PcapLE, Error<&[u8]>>(input).unwrap();
        assert!(rem.is_empty());
        assert!(!shb.big_endian());
        assert_eq!(shb.major_version, 1);
        assert_eq!(shb.section_len, -1);
    }
}
