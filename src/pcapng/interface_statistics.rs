use nom::error::ParseError;
use nom::IResult;

use crate::endianness::PcapEndianness;

use super::option::{parse_options, PcapNGOption};

/// An Interface Statistics Block (ISB) carries capture counters for one
/// interface; the counters themselves are options.
#[derive(Debug)]
pub struct InterfaceStatisticsBlock<'a> {
    pub if_id: u32,
    pub ts_high: u32,
    pub ts_low: u32,
    pub options: Vec<PcapNGOption<'a>>,
}

pub(crate) fn parse_interfacestatistics_content<'a, En: PcapEndianness, E: ParseError<&'a [u8]>>(
    i: &'a [u8],
) -> IResult<&'a [u8], InterfaceStatisticsBlock<'a>, E> {
    let (i, if_id) = En::parse_u32(i)?;
    let (i, ts_high) = En::parse_u32(i)?;
    let (i, ts_low) = En::parse_u32(i)?;
    let (i, options) = parse_options::<En, E>(i)?;
    let block = InterfaceStatisticsBlock {
        if_id,
        ts_high,
        ts_low,
        options,
    };
    Ok((i, block))
}
