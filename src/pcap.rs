//! Legacy PCAP format
//!
//! See <https://wiki.wireshark.org/Development/LibpcapFileFormat> for details.
//!
//! A legacy capture is a fixed 24-byte global header followed by packet
//! records. Four file magics are recognized, combining big/little byte order
//! with microsecond/nanosecond timestamp precision.

use nom::bytes::streaming::take;
use nom::error::ParseError;
use nom::number::streaming::be_u32;
use nom::{Err, IResult, Needed};

use crate::endianness::{PcapBE, PcapEndianness, PcapLE};
use crate::error::PcapError;
use crate::linktype::Linktype;

/// Big-endian, microsecond-resolution magic.
pub const PCAP_MAGIC_BE: u32 = 0xa1b2_c3d4;
/// Little-endian, microsecond-resolution magic.
pub const PCAP_MAGIC_LE: u32 = 0xd4c3_b2a1;
/// Big-endian, nanosecond-resolution magic.
pub const PCAP_MAGIC_NSEC_BE: u32 = 0xa1b2_3c4d;
/// Little-endian, nanosecond-resolution magic.
pub const PCAP_MAGIC_NSEC_LE: u32 = 0x4d3c_b2a1;

/// Legacy PCAP global header.
#[derive(Clone, Debug)]
pub struct PcapHeader {
    /// File magic, as read big-endian from the stream.
    pub magic_number: u32,
    /// Version major number (currently 2)
    pub version_major: u16,
    /// Version minor number (currently 4)
    pub version_minor: u16,
    pub reserved1: u32,
    pub reserved2: u32,
    /// max len of captured packets, in octets
    pub snaplen: u32,
    /// Data link type, with FCS information in the upper bits
    pub network: u32,
}

impl PcapHeader {
    pub const fn size(&self) -> usize {
        24
    }

    pub fn is_bigendian(&self) -> bool {
        self.magic_number == PCAP_MAGIC_BE || self.magic_number == PCAP_MAGIC_NSEC_BE
    }

    pub fn is_nanosecond_precision(&self) -> bool {
        self.magic_number == PCAP_MAGIC_NSEC_BE || self.magic_number == PCAP_MAGIC_NSEC_LE
    }

    /// The link-layer type, from the low 16 bits of the `network` field.
    pub fn linktype(&self) -> Linktype {
        Linktype((self.network & 0xffff) as i32)
    }

    /// FCS length in bits, when the capturing system recorded it (bit 26 of
    /// the `network` field; the length itself lives in the top nibble).
    pub fn fcs_bits(&self) -> Option<u32> {
        if self.network & 0x0400_0000 != 0 {
            Some((self.network >> 28) * 16)
        } else {
            None
        }
    }
}

/// Container for network data in legacy Pcap files
#[derive(Debug)]
pub struct LegacyPcapBlock<'a> {
    /// Seconds since the Unix epoch
    pub ts_sec: u32,
    /// Sub-second ticks (microseconds or nanoseconds, per the file magic)
    pub ts_frac: u32,
    pub caplen: u32,
    pub origlen: u32,
    pub data: &'a [u8],
}

fn parse_pcap_header_fields<'a, En: PcapEndianness, E: ParseError<&'a [u8]>>(
    magic_number: u32,
    i: &'a [u8],
) -> IResult<&'a [u8], PcapHeader, E> {
    let (i, version_major) = En::parse_u16(i)?;
    let (i, version_minor) = En::parse_u16(i)?;
    let (i, reserved1) = En::parse_u32(i)?;
    let (i, reserved2) = En::parse_u32(i)?;
    let (i, snaplen) = En::parse_u32(i)?;
    let (i, network) = En::parse_u32(i)?;
    let header = PcapHeader {
        magic_number,
        version_major,
        version_minor,
        reserved1,
        reserved2,
        snaplen,
        network,
    };
    Ok((i, header))
}

/// Read the PCAP global header, dispatching on the file magic.
pub fn parse_pcap_header(i: &[u8]) -> IResult<&[u8], PcapHeader, PcapError> {
    let (i, magic_number) = be_u32(i)?;
    match magic_number {
        PCAP_MAGIC_BE | PCAP_MAGIC_NSEC_BE => {
            parse_pcap_header_fields::<PcapBE, _>(magic_number, i)
        }
        PCAP_MAGIC_LE | PCAP_MAGIC_NSEC_LE => {
            parse_pcap_header_fields::<PcapLE, _>(magic_number, i)
        }
        _ => Err(Err::Error(PcapError::InvalidFileFormat)),
    }
}

/// Read a PCAP record header and data.
///
/// Each PCAP record starts with a small header, and is followed by packet
/// data. The packet data format depends on the LinkType.
pub(crate) fn parse_pcap_frame<'a, En: PcapEndianness, E: ParseError<&'a [u8]>>(
    i: &'a [u8],
) -> IResult<&'a [u8], LegacyPcapBlock<'a>, E> {
    if i.len() < 16 {
        return Err(Err::Incomplete(Needed::new(16 - i.len())));
    }
    let (i, ts_sec) = En::parse_u32(i)?;
    let (i, ts_frac) = En::parse_u32(i)?;
    let (i, caplen) = En::parse_u32(i)?;
    let (i, origlen) = En::parse_u32(i)?;
    let (i, data) = take(caplen as usize)(i)?;
    let block = LegacyPcapBlock {
        ts_sec,
        ts_frac,
        caplen,
        origlen,
        data,
    };
    Ok((i, block))
}
