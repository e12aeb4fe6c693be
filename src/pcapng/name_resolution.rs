use std::convert::TryFrom;
use std::net::{Ipv4Addr, Ipv6Addr};

use nom::bytes::streaming::take;
use nom::error::ParseError;
use nom::IResult;
use rusticata_macros::newtype_enum;

use crate::endianness::PcapEndianness;
use crate::error::BlockError;

use super::option::{format_eui, parse_options, PcapNGOption};
use super::pad4;

#[derive(Clone, Copy, Eq, PartialEq)]
pub struct NameRecordType(pub u16);

newtype_enum! {
    impl debug NameRecordType {
        End = 0,
        Ipv4 = 1,
        Ipv6 = 2,
        Eui48 = 3,
        Eui64 = 4
    }
}

/// A raw name record: type tag and value bytes (padding excluded).
#[derive(Debug)]
pub struct RawNameRecord<'a> {
    pub record_type: NameRecordType,
    pub value: &'a [u8],
}

/// A resolved address-to-names mapping from a Name Resolution Block.
///
/// Addresses are pretty-printed; the name list drops the empty token that
/// terminates the wire encoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NameRecord {
    Ipv4 { addr: Ipv4Addr, names: Vec<String> },
    Ipv6 { addr: Ipv6Addr, names: Vec<String> },
    Eui48 { addr: String, names: Vec<String> },
    Eui64 { addr: String, names: Vec<String> },
}

/// A Name Resolution Block (NRB) maps addresses to host names.
#[derive(Debug)]
pub struct NameResolutionBlock<'a> {
    pub records: Vec<RawNameRecord<'a>>,
    pub options: Vec<PcapNGOption<'a>>,
}

fn parse_name_record_list<'a, En: PcapEndianness, E: ParseError<&'a [u8]>>(
    mut i: &'a [u8],
) -> IResult<&'a [u8], Vec<RawNameRecord<'a>>, E> {
    let mut records = Vec::new();
    while !i.is_empty() {
        let (rem, record_type) = En::parse_u16(i)?;
        let (rem, record_len) = En::parse_u16(rem)?;
        if record_type == 0 {
            return Ok((rem, records));
        }
        let (rem, value) = take(record_len as usize)(rem)?;
        let (rem, _) = take(pad4(record_len as usize))(rem)?;
        records.push(RawNameRecord {
            record_type: NameRecordType(record_type),
            value,
        });
        i = rem;
    }
    Ok((i, records))
}

pub(crate) fn parse_nameresolution_content<'a, En: PcapEndianness, E: ParseError<&'a [u8]>>(
    i: &'a [u8],
) -> IResult<&'a [u8], NameResolutionBlock<'a>, E> {
    let (i, records) = parse_name_record_list::<En, E>(i)?;
    let (i, options) = parse_options::<En, E>(i)?;
    Ok((i, NameResolutionBlock { records, options }))
}

/// Split a record tail into its NUL-terminated names, dropping the final
/// empty token.
fn split_names(bytes: &[u8]) -> Vec<String> {
    let mut parts: Vec<&[u8]> = bytes.split(|&b| b == 0).collect();
    if parts.last().map_or(false, |last| last.is_empty()) {
        parts.pop();
    }
    parts
        .iter()
        .map(|part| String::from_utf8_lossy(part).into_owned())
        .collect()
}

/// Resolve raw records into typed ones. Unknown record types are skipped.
pub(crate) fn decode_name_records(raw: &[RawNameRecord]) -> Result<Vec<NameRecord>, BlockError> {
    let mut records = Vec::with_capacity(raw.len());
    for record in raw {
        let value = record.value;
        let decoded = match record.record_type {
            NameRecordType::Ipv4 => {
                if value.len() < 6 {
                    return Err(BlockError::InvalidNameRecord("ipv4"));
                }
                let addr = <[u8; 4]>::try_from(&value[..4]).expect("IPv4 address bytes");
                NameRecord::Ipv4 {
                    addr: Ipv4Addr::from(addr),
                    names: split_names(&value[4..]),
                }
            }
            NameRecordType::Ipv6 => {
                if value.len() < 18 {
                    return Err(BlockError::InvalidNameRecord("ipv6"));
                }
                let addr = <[u8; 16]>::try_from(&value[..16]).expect("IPv6 address bytes");
                NameRecord::Ipv6 {
                    addr: Ipv6Addr::from(addr),
                    names: split_names(&value[16..]),
                }
            }
            NameRecordType::Eui48 => {
                if value.len() < 8 {
                    return Err(BlockError::InvalidNameRecord("eui48"));
                }
                NameRecord::Eui48 {
                    addr: format_eui(&value[..6]),
                    names: split_names(&value[6..]),
                }
            }
            NameRecordType::Eui64 => {
                if value.len() < 10 {
                    return Err(BlockError::InvalidNameRecord("eui64"));
                }
                NameRecord::Eui64 {
                    addr: format_eui(&value[..8]),
                    names: split_names(&value[8..]),
                }
            }
            _ => continue,
        };
        records.push(decoded);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;
    use nom::error::Error;

    use crate::endianness::PcapBE;

    use super::*;

    #[test]
    fn one_record_of_each_type() {
        let input = &hex!(
            // ipv4: 127.0.0.1 "localhost\0"
            "0001 000e 7f000001 6c6f63616c686f737400 0000"
            // ipv6: ::1 "localhost\0"
            "0002 001a 00000000000000000000000000000001 6c6f63616c686f737400 0000"
            // eui48 + "localhost\0"
            "0003 0010 000b8201fc42 6c6f63616c686f737400"
            // eui64 + "localhost\0"
            "0004 0012 000b8201fc420102 6c6f63616c686f737400 0000"
            // end of records
            "0000 0000"
        );
        let (rem, block) = parse_nameresolution_content::<PcapBE, Error<&[u8]>>(input).unwrap();
        assert!(rem.is_empty());
        assert_eq!(block.records.len(), 4);
        let records = decode_name_records(&block.records).unwrap();
        let names = vec!["localhost".to_string()];
        assert_eq!(
            records[0],
            NameRecord::Ipv4 {
                addr: Ipv4Addr::new(127, 0, 0, 1),
                names: names.clone(),
            }
        );
        assert_eq!(
            records[1],
            NameRecord::Ipv6 {
                addr: "::1".parse().unwrap(),
                names: names.clone(),
            }
        );
        assert_eq!(
            records[2],
            NameRecord::Eui48 {
                addr: "00:0b:82:01:fc:42".to_string(),
                names: names.clone(),
            }
        );
        assert_eq!(
            records[3],
            NameRecord::Eui64 {
                addr: "00:0b:82:01:fc:42:01:02".to_string(),
                names,
            }
        );
    }

    #[test]
    fn multiple_names_per_record() {
        let value = b"\x7f\x00\x00\x01a\0b\0";
        let raw = RawNameRecord {
            record_type: NameRecordType::Ipv4,
            value,
        };
        let records = decode_name_records(&[raw]).unwrap();
        match &records[0] {
            NameRecord::Ipv4 { names, .. } => {
                assert_eq!(names, &["a".to_string(), "b".to_string()])
            }
            other => panic!("unexpected record {:?}", other),
        }
    }

    #[test]
    fn short_record_rejected() {
        let raw = RawNameRecord {
            record_type: NameRecordType::Ipv4,
            value: &[127, 0, 0, 1],
        };
        let err = decode_name_records(&[raw]).unwrap_err();
        assert_eq!(err, BlockError::InvalidNameRecord("ipv4"));
    }

    #[test]
    fn unknown_record_type_skipped() {
        let raw = RawNameRecord {
            record_type: NameRecordType(99),
            value: &[1, 2, 3, 4],
        };
        let records = decode_name_records(&[raw]).unwrap();
        assert!(records.is_empty());
    }
}
