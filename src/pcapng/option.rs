use std::convert::TryFrom;
use std::net::{Ipv4Addr, Ipv6Addr};

use chrono::{DateTime, Utc};
use nom::bytes::streaming::take;
use nom::error::ParseError;
use nom::IResult;
use rusticata_macros::newtype_enum;

use crate::endianness::PcapEndianness;
use crate::error::BlockError;

use super::time::InterfaceClock;
use super::{pad4, EPB_MAGIC, IDB_MAGIC, ISB_MAGIC, NRB_MAGIC, SHB_MAGIC};

#[derive(Clone, Copy, Eq, PartialEq)]
pub struct OptionCode(pub u16);

newtype_enum! {
impl debug OptionCode {
    EndOfOpt = 0,
    Comment = 1,
    IfTsresol = 9,
    IfTsoffset = 14,
    Custom2988 = 2988,
    Custom2989 = 2989,
    Custom19372 = 19372,
    Custom19373 = 19373,
}
}

/// A raw option, as read from the wire: code, declared length and the value
/// bytes (padding excluded).
#[derive(Debug)]
pub struct PcapNGOption<'a> {
    pub code: OptionCode,
    pub len: u16,
    pub value: &'a [u8],
}

/// Parse the option list at the tail of a block body.
///
/// The list ends at the end-of-options sentinel (code 0) or when the body
/// runs out; each value is followed by padding to a 32-bit boundary.
pub(crate) fn parse_options<'a, En: PcapEndianness, E: ParseError<&'a [u8]>>(
    mut i: &'a [u8],
) -> IResult<&'a [u8], Vec<PcapNGOption<'a>>, E> {
    let mut options = Vec::new();
    while !i.is_empty() {
        let (rem, code) = En::parse_u16(i)?;
        let (rem, len) = En::parse_u16(rem)?;
        if code == 0 {
            return Ok((rem, options));
        }
        let (rem, value) = take(len as usize)(rem)?;
        let (rem, _) = take(pad4(len as usize))(rem)?;
        options.push(PcapNGOption {
            code: OptionCode(code),
            len,
            value,
        });
        i = rem;
    }
    Ok((i, options))
}

/// How the value bytes of a known option are to be interpreted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum OptionKind {
    Str,
    Bytes,
    Byte,
    U32,
    U64,
    Ipv4,
    Ipv6,
    Ipv4Mask,
    Ipv6Prefix,
    Eui,
    Timestamp,
}

struct OptionSpec {
    code: u16,
    name: &'static str,
    kind: OptionKind,
    has_pen: bool,
}

impl OptionSpec {
    const fn new(code: u16, name: &'static str, kind: OptionKind) -> OptionSpec {
        OptionSpec {
            code,
            name,
            kind,
            has_pen: false,
        }
    }

    const fn with_pen(code: u16, name: &'static str, kind: OptionKind) -> OptionSpec {
        OptionSpec {
            code,
            name,
            kind,
            has_pen: true,
        }
    }
}

// Options valid in any block. Custom options lead with a Private Enterprise
// Number in the first four value bytes.
static OPTIONS_ANY: &[OptionSpec] = &[
    OptionSpec::new(1, "opt_comment", OptionKind::Str),
    OptionSpec::with_pen(2988, "opt_custom", OptionKind::Str),
    OptionSpec::with_pen(2989, "opt_custom", OptionKind::Bytes),
    OptionSpec::with_pen(19372, "opt_custom", OptionKind::Str),
    OptionSpec::with_pen(19373, "opt_custom", OptionKind::Bytes),
];

static OPTIONS_SHB: &[OptionSpec] = &[
    OptionSpec::new(2, "shb_hardware", OptionKind::Str),
    OptionSpec::new(3, "shb_os", OptionKind::Str),
    OptionSpec::new(4, "shb_userappl", OptionKind::Str),
];

static OPTIONS_IDB: &[OptionSpec] = &[
    OptionSpec::new(2, "if_name", OptionKind::Str),
    OptionSpec::new(3, "if_description", OptionKind::Str),
    OptionSpec::new(4, "if_IPv4addr", OptionKind::Ipv4Mask),
    OptionSpec::new(5, "if_IPv6addr", OptionKind::Ipv6Prefix),
    OptionSpec::new(6, "if_MACaddr", OptionKind::Eui),
    OptionSpec::new(7, "if_EUIaddr", OptionKind::Eui),
    OptionSpec::new(8, "if_speed", OptionKind::U64),
    OptionSpec::new(9, "if_tsresol", OptionKind::Byte),
    OptionSpec::new(10, "if_tzone", OptionKind::U32),
    OptionSpec::new(11, "if_filter", OptionKind::Bytes),
    OptionSpec::new(12, "if_os", OptionKind::Str),
    OptionSpec::new(13, "if_fcslen", OptionKind::Byte),
    OptionSpec::new(14, "if_tsoffset", OptionKind::U64),
    OptionSpec::new(15, "if_hardware", OptionKind::Str),
    OptionSpec::new(16, "if_txspeed", OptionKind::U64),
    OptionSpec::new(17, "if_rxspeed", OptionKind::U64),
];

static OPTIONS_EPB: &[OptionSpec] = &[
    // flags are re-interpreted separately into PacketFlags
    OptionSpec::new(2, "epb_flags", OptionKind::Bytes),
    OptionSpec::new(3, "epb_hash", OptionKind::Bytes),
    OptionSpec::new(4, "epb_dropcount", OptionKind::U64),
    OptionSpec::new(5, "epb_packetid", OptionKind::U64),
    OptionSpec::new(6, "epb_queue", OptionKind::U32),
    OptionSpec::new(7, "epb_verdict", OptionKind::Bytes),
];

static OPTIONS_ISB: &[OptionSpec] = &[
    OptionSpec::new(2, "isb_starttime", OptionKind::Timestamp),
    OptionSpec::new(3, "isb_endtime", OptionKind::Timestamp),
    OptionSpec::new(4, "isb_ifrecv", OptionKind::U64),
    OptionSpec::new(5, "isb_ifdrop", OptionKind::U64),
    OptionSpec::new(6, "isb_filteraccept", OptionKind::U64),
    OptionSpec::new(7, "isb_osdrop", OptionKind::U64),
    OptionSpec::new(8, "isb_usrdeliv", OptionKind::U64),
];

static OPTIONS_NRB: &[OptionSpec] = &[
    OptionSpec::new(2, "ns_dnsname", OptionKind::Str),
    OptionSpec::new(3, "ns_dnsIP4addr", OptionKind::Ipv4),
    OptionSpec::new(4, "ns_dnsIP6addr", OptionKind::Ipv6),
];

fn option_spec(block_type: u32, code: u16) -> Option<&'static OptionSpec> {
    let per_block: &[OptionSpec] = match block_type {
        SHB_MAGIC => OPTIONS_SHB,
        IDB_MAGIC => OPTIONS_IDB,
        EPB_MAGIC => OPTIONS_EPB,
        ISB_MAGIC => OPTIONS_ISB,
        NRB_MAGIC => OPTIONS_NRB,
        _ => &[],
    };
    per_block
        .iter()
        .find(|spec| spec.code == code)
        .or_else(|| OPTIONS_ANY.iter().find(|spec| spec.code == code))
}

/// The interpreted value of an option.
#[derive(Clone, Debug, PartialEq)]
pub enum OptionValue {
    Str(String),
    Number(u64),
    Timestamp(DateTime<Utc>),
    Bytes(Vec<u8>),
}

/// An option resolved against the per-block vocabulary.
///
/// Unknown codes keep their raw bytes; codes with bit 15 set are private
/// extensions and flagged as such.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedOption {
    pub code: u16,
    pub name: Option<&'static str>,
    pub value: OptionValue,
    pub pen: Option<u32>,
    pub private: bool,
}

fn clean_string(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .replace('\0', "")
        .trim()
        .to_string()
}

pub(crate) fn format_eui(bytes: &[u8]) -> String {
    let parts: Vec<String> = bytes.iter().map(|b| format!("{:02x}", b)).collect();
    parts.join(":")
}

fn decode_value<En: PcapEndianness>(
    kind: OptionKind,
    value: &[u8],
    clock: Option<&InterfaceClock>,
) -> Result<OptionValue, BlockError> {
    let decoded = match kind {
        OptionKind::Str => OptionValue::Str(clean_string(value)),
        OptionKind::Byte if value.len() == 1 => OptionValue::Number(u64::from(value[0])),
        OptionKind::U32 if value.len() == 4 => {
            let bytes = <[u8; 4]>::try_from(value).expect("4-byte option");
            OptionValue::Number(u64::from(En::u32_from_bytes(bytes)))
        }
        OptionKind::U64 if value.len() == 8 => {
            let bytes = <[u8; 8]>::try_from(value).expect("8-byte option");
            OptionValue::Number(En::u64_from_bytes(bytes))
        }
        OptionKind::Ipv4 if value.len() == 4 => {
            OptionValue::Str(Ipv4Addr::new(value[0], value[1], value[2], value[3]).to_string())
        }
        OptionKind::Ipv6 if value.len() == 16 => {
            let bytes = <[u8; 16]>::try_from(value).expect("16-byte option");
            OptionValue::Str(Ipv6Addr::from(bytes).to_string())
        }
        OptionKind::Ipv4Mask => {
            if value.len() != 8 {
                return Err(BlockError::InvalidOption("ipv4mask"));
            }
            let addr = Ipv4Addr::new(value[0], value[1], value[2], value[3]);
            let mask = Ipv4Addr::new(value[4], value[5], value[6], value[7]);
            OptionValue::Str(format!("{}/{}", addr, mask))
        }
        OptionKind::Ipv6Prefix => {
            if value.len() != 17 {
                return Err(BlockError::InvalidOption("ipv6prefix"));
            }
            let bytes = <[u8; 16]>::try_from(&value[..16]).expect("16-byte prefix");
            OptionValue::Str(format!("{}/{}", Ipv6Addr::from(bytes), value[16]))
        }
        OptionKind::Eui => OptionValue::Str(format_eui(value)),
        OptionKind::Timestamp if value.len() == 8 => match clock {
            Some(clock) => {
                let high = <[u8; 4]>::try_from(&value[..4]).expect("timestamp high");
                let low = <[u8; 4]>::try_from(&value[4..8]).expect("timestamp low");
                match clock.timestamp(En::u32_from_bytes(high), En::u32_from_bytes(low)) {
                    Some(ts) => OptionValue::Timestamp(ts),
                    None => OptionValue::Bytes(value.to_vec()),
                }
            }
            None => OptionValue::Bytes(value.to_vec()),
        },
        // unknown vocabulary or unexpected value length
        _ => OptionValue::Bytes(value.to_vec()),
    };
    Ok(decoded)
}

/// Resolve a raw option list against the vocabulary of `block_type`.
///
/// `clock` is the clock of the interface the block refers to, needed for
/// timestamp-typed options; blocks without an interface pass `None`.
pub(crate) fn decode_options<En: PcapEndianness>(
    block_type: u32,
    raw: &[PcapNGOption],
    clock: Option<&InterfaceClock>,
) -> Result<Vec<DecodedOption>, BlockError> {
    let mut decoded = Vec::with_capacity(raw.len());
    for opt in raw {
        let OptionCode(code) = opt.code;
        let spec = option_spec(block_type, code);
        let (pen, value) = match spec {
            Some(spec) if spec.has_pen && opt.value.len() >= 4 => {
                let bytes = <[u8; 4]>::try_from(&opt.value[..4]).expect("PEN bytes");
                (Some(En::u32_from_bytes(bytes)), &opt.value[4..])
            }
            _ => (None, opt.value),
        };
        let value = match spec {
            // a PEN-carrying option too short for its PEN keeps its raw bytes
            Some(spec) if !(spec.has_pen && pen.is_none()) => {
                decode_value::<En>(spec.kind, value, clock)?
            }
            _ => OptionValue::Bytes(value.to_vec()),
        };
        decoded.push(DecodedOption {
            code,
            name: spec.map(|spec| spec.name),
            value,
            pen,
            private: code & 0x8000 != 0,
        });
    }
    Ok(decoded)
}
