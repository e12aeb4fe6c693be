use nom::bytes::streaming::take;
use nom::error::{ErrorKind, ParseError};
use nom::{Err, IResult};

use crate::endianness::PcapEndianness;

use super::option::{parse_options, PcapNGOption};
use super::pad4;

/// An Enhanced Packet Block (EPB) is the standard container for storing the
/// packets coming from the network.
#[derive(Debug)]
pub struct EnhancedPacketBlock<'a> {
    pub if_id: u32,
    pub ts_high: u32,
    pub ts_low: u32,
    /// Captured packet length
    pub caplen: u32,
    /// Original packet length
    pub origlen: u32,
    /// Captured data, without padding
    pub data: &'a [u8],
    pub options: Vec<PcapNGOption<'a>>,
}

pub(crate) fn parse_enhancedpacket_content<'a, En: PcapEndianness, E: ParseError<&'a [u8]>>(
    i: &'a [u8],
) -> IResult<&'a [u8], EnhancedPacketBlock<'a>, E> {
    let (i, if_id) = En::parse_u32(i)?;
    let (i, ts_high) = En::parse_u32(i)?;
    let (i, ts_low) = En::parse_u32(i)?;
    let (i, caplen) = En::parse_u32(i)?;
    let (i, origlen) = En::parse_u32(i)?;
    // padded length computation can overflow
    if caplen >= u32::MAX - 4 {
        return Err(Err::Error(E::from_error_kind(i, ErrorKind::Verify)));
    }
    let (i, data) = take(caplen as usize)(i)?;
    let (i, _) = take(pad4(caplen as usize))(i)?;
    let (i, options) = parse_options::<En, E>(i)?;
    let block = EnhancedPacketBlock {
        if_id,
        ts_high,
        ts_low,
        caplen,
        origlen,
        data,
        options,
    };
    Ok((i, block))
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;
    use nom::error::Error;

    use crate::endianness::PcapLE;
    use crate::pcapng::OptionCode;

    use super::*;

    // OpenVPN_UDP_tls-auth.pcapng EPB content (first data block, file block 3)
    const EPB_CONTENT_LE: &[u8] = &hex!(
        "
01 00 00 00 E9 D3 04 00 48 EE 39 44 54 00 00 00
54 00 00 00 08 00 27 4A BE 45 08 00 27 BB 22 84
08 00 45 00 00 46 00 00 40 00 40 11 48 89 C0 A8
38 67 C0 A8 38 66 81 AE 04 AA 00 32 53 B4 38 81
38 14 62 1D 67 46 2D DE 86 73 4D 2C BF F1 51 B2
B1 23 1B 61 E4 23 08 A2 72 81 8E 00 00 00 01 50
FF 26 2C 00 00 00 00 00"
    );

    #[test]
    fn epb_content_le() {
        let (rem, epb) = parse_enhancedpacket_content::<PcapLE, Error<&[u8]>>(EPB_CONTENT_LE)
            .expect("packet parsing failed");
        assert!(rem.is_empty());
        assert_eq!(epb.if_id, 1);
        assert_eq!(epb.caplen, 84);
        assert_eq!(epb.origlen, 84);
        assert_eq!(epb.data.len(), 84);
        assert!(epb.options.is_empty());
    }

    #[test]
    fn epb_content_with_options() {
        // caplen 2, 2 bytes padding, one flags option
        let input = &hex!("00000000 00000000 00000000 02000000 02000000 aabb0000 0200 0400 65000000");
        let (rem, epb) =
            parse_enhancedpacket_content::<PcapLE, Error<&[u8]>>(input).expect("parse failed");
        assert!(rem.is_empty());
        assert_eq!(epb.data, &hex!("aabb"));
        assert_eq!(epb.options.len(), 1);
        assert_eq!(epb.options[0].code, OptionCode(2));
        assert_eq!(epb.options[0].value, &hex!("65000000"));
    }
}
