use nom::error::ParseError;
use nom::IResult;

use crate::endianness::PcapEndianness;

/// The Simple Packet Block (SPB) is a lightweight container for storing the
/// packets coming from the network.
///
/// The block carries no interface ID (interface 0 is implied), no timestamp
/// and no options; `data` is the rest of the body, padding included, since
/// the captured length is not stored on the wire.
#[derive(Debug)]
pub struct SimplePacketBlock<'a> {
    /// Original packet length
    pub origlen: u32,
    pub data: &'a [u8],
}

pub(crate) fn parse_simplepacket_content<'a, En: PcapEndianness, E: ParseError<&'a [u8]>>(
    i: &'a [u8],
) -> IResult<&'a [u8], SimplePacketBlock<'a>, E> {
    let (i, origlen) = En::parse_u32(i)?;
    let block = SimplePacketBlock { origlen, data: i };
    Ok((&[], block))
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;
    use nom::error::Error;

    use crate::endianness::PcapBE;

    use super::*;

    #[test]
    fn spb_content() {
        let input = &hex!("00000003 01020300");
        let (_, spb) = parse_simplepacket_content::<PcapBE, Error<&[u8]>>(input).unwrap();
        assert_eq!(spb.origlen, 3);
        assert_eq!(spb.data, &hex!("01020300"));
    }
}
