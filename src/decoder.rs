//! Push-driven capture decoder.
//!
//! [`PcapDecoder`] accepts input as arbitrary byte chunks and turns them
//! into a stream of [`PcapEvent`]s. The caller loop mirrors the usual
//! streaming-reader protocol:
//!
//! ```rust
//! use pcap_events::{PcapDecoder, DecoderConfig, PcapError, PcapEvent};
//!
//! # let chunks: Vec<Vec<u8>> = Vec::new();
//! let mut decoder = PcapDecoder::new(DecoderConfig::default());
//! let mut chunks = chunks.into_iter();
//! loop {
//!     match decoder.next_event() {
//!         Ok(PcapEvent::Packet(packet)) => println!("{} bytes", packet.data.len()),
//!         Ok(_other) => (),
//!         Err(PcapError::Incomplete(_)) => match chunks.next() {
//!             Some(chunk) => decoder.feed(&chunk),
//!             None => decoder.end(),
//!         },
//!         Err(PcapError::Eof) => break,
//!         Err(e) => {
//!             eprintln!("stream failed: {}", e);
//!             break;
//!         }
//!     }
//! }
//! ```
//!
//! Errors split in two classes. Block-local faults (bad interface
//! reference, malformed option, short name record) are delivered as
//! [`PcapEvent::Error`] and decoding resumes at the next block; framing
//! faults (unknown magic, length mismatch, truncation) end the stream.

use std::convert::TryFrom;

use chrono::{TimeZone, Utc};
use log::{debug, trace, warn};
use nom::error::Error as NomError;
use nom::Needed;

use crate::buffer::ChunkBuffer;
use crate::endianness::{PcapBE, PcapEndianness, PcapLE};
use crate::error::{BlockError, PcapError, RecoverableError};
use crate::event::{
    CustomEvent, InterfaceEvent, NameResolutionEvent, PacketEvent, PcapEvent, SecretsEvent,
    SectionEvent, StatisticsEvent,
};
use crate::flags::PacketFlags;
use crate::pcap::{
    parse_pcap_frame, parse_pcap_header, PCAP_MAGIC_BE, PCAP_MAGIC_LE, PCAP_MAGIC_NSEC_BE,
    PCAP_MAGIC_NSEC_LE,
};
use crate::pcapng::{
    decode_name_records, decode_options, extract_clock, pad4, parse_custom_content,
    parse_decryptionsecrets_content, parse_enhancedpacket_content,
    parse_interfacedescription_content, parse_interfacestatistics_content,
    parse_nameresolution_content, parse_sectionheader_content, parse_simplepacket_content,
    DecodedOption, InterfaceClock, OptionCode, OptionValue, BOM_MAGIC, CB_MAGIC, DCB_MAGIC,
    DSB_MAGIC, EPB_MAGIC, IDB_MAGIC, ISB_MAGIC, NRB_MAGIC, SHB_MAGIC, SPB_MAGIC,
};

const DEFAULT_CAPACITY: usize = 65536;

// the SHB type is a byte-order palindrome
const SHB_SENTINEL: [u8; 4] = [0x0a, 0x0d, 0x0d, 0x0a];

/// Decoder configuration switches.
#[derive(Clone, Copy, Debug, Default)]
pub struct DecoderConfig {
    /// Fail on legacy PCAP input instead of decoding it.
    pub reject_legacy: bool,
    /// Fail on PCAPNG input instead of decoding it.
    pub reject_pcapng: bool,
}

#[derive(Clone, Copy)]
enum State {
    Detect,
    Ng,
    Legacy { ticks_per_milli: u32 },
    Closed,
}

struct InterfaceContext {
    snaplen: u32,
    clock: InterfaceClock,
}

/// Streaming decoder over both capture formats.
///
/// The format is chosen once from the first four bytes; PCAPNG streams may
/// still switch endianness at every Section Header Block. The interface
/// table lives for the duration of its section and is rebuilt when a new
/// section starts.
pub struct PcapDecoder {
    config: DecoderConfig,
    buffer: ChunkBuffer,
    state: State,
    big_endian: bool,
    interfaces: Vec<InterfaceContext>,
    aborted: bool,
}

impl PcapDecoder {
    pub fn new(config: DecoderConfig) -> PcapDecoder {
        Self::with_capacity(config, DEFAULT_CAPACITY)
    }

    /// Create a decoder with a chosen initial buffer capacity. The buffer
    /// grows on demand, so the capacity only tunes reallocation behavior.
    pub fn with_capacity(config: DecoderConfig, capacity: usize) -> PcapDecoder {
        PcapDecoder {
            config,
            buffer: ChunkBuffer::with_capacity(capacity),
            state: State::Detect,
            big_endian: false,
            interfaces: Vec::new(),
            aborted: false,
        }
    }

    /// Append a chunk of input.
    pub fn feed(&mut self, chunk: &[u8]) {
        if self.buffer.ended() {
            warn!("feed after end of input, ignoring {} bytes", chunk.len());
            return;
        }
        self.buffer.push(chunk);
    }

    /// Declare the end of input. A record left incomplete at this point is
    /// reported as truncation.
    pub fn end(&mut self) {
        self.buffer.end();
    }

    /// Abort the stream: the next poll fails with [`PcapError::Aborted`].
    pub fn abort(&mut self) {
        self.aborted = true;
    }

    /// Decode the next event.
    ///
    /// `Err(Incomplete)` asks for more input; `Err(Eof)` is the clean close
    /// and is sticky. Any other error is fatal and closes the stream, so
    /// the call after a fatal error reports `Eof`.
    pub fn next_event(&mut self) -> Result<PcapEvent, PcapError> {
        let result = self.poll();
        let fatal = match &result {
            Ok(_) | Err(PcapError::Eof) | Err(PcapError::Incomplete(_)) => false,
            Err(_) => true,
        };
        if fatal {
            self.state = State::Closed;
        }
        result
    }

    fn poll(&mut self) -> Result<PcapEvent, PcapError> {
        loop {
            match self.state {
                State::Closed => return Err(PcapError::Eof),
                _ if self.aborted => return Err(PcapError::Aborted),
                State::Detect => {
                    if let Some(event) = self.detect()? {
                        return Ok(event);
                    }
                }
                State::Ng => return self.ng_event(),
                State::Legacy { ticks_per_milli } => return self.legacy_event(ticks_per_milli),
            }
        }
    }

    fn need(&self, missing: usize) -> PcapError {
        if self.buffer.ended() {
            PcapError::UnexpectedEof(missing)
        } else {
            PcapError::Incomplete(missing)
        }
    }

    /// Look at the first four bytes and commit to a format.
    fn detect(&mut self) -> Result<Option<PcapEvent>, PcapError> {
        let available = self.buffer.len();
        if available == 0 && self.buffer.ended() {
            return Err(PcapError::Eof);
        }
        if available < 4 {
            return Err(self.need(4 - available));
        }
        let magic = u32_at::<PcapBE>(self.buffer.data(), 0);
        match magic {
            SHB_MAGIC => {
                if self.config.reject_pcapng {
                    return Err(PcapError::PcapNgRejected);
                }
                debug!("detected PCAPNG stream");
                self.state = State::Ng;
                Ok(None)
            }
            PCAP_MAGIC_BE | PCAP_MAGIC_LE | PCAP_MAGIC_NSEC_BE | PCAP_MAGIC_NSEC_LE => {
                if self.config.reject_legacy {
                    return Err(PcapError::LegacyRejected);
                }
                self.legacy_header().map(Some)
            }
            _ => Err(PcapError::InvalidFileFormat),
        }
    }

    /// Read the legacy global header and synthesize the single interface of
    /// the capture.
    fn legacy_header(&mut self) -> Result<PcapEvent, PcapError> {
        let available = self.buffer.len();
        if available < 24 {
            return Err(self.need(24 - available));
        }
        let header = match parse_pcap_header(self.buffer.data()) {
            Ok((_, header)) => header,
            Err(_) => return Err(PcapError::InvalidFileFormat),
        };
        let ticks_per_milli: u32 = if header.is_nanosecond_precision() {
            1_000_000
        } else {
            1_000
        };
        let clock = InterfaceClock {
            offset_millis: 0,
            ticks_per_milli: u64::from(ticks_per_milli),
        };
        let mut options = Vec::new();
        if let Some(bits) = header.fcs_bits() {
            options.push(DecodedOption {
                code: 13,
                name: Some("if_fcslen"),
                value: OptionValue::Number(u64::from(bits)),
                pen: None,
                private: false,
            });
        }
        debug!(
            "legacy pcap stream: version {}.{}, linktype {}",
            header.version_major,
            header.version_minor,
            header.linktype()
        );
        self.big_endian = header.is_bigendian();
        self.interfaces.push(InterfaceContext {
            snaplen: header.snaplen,
            clock,
        });
        self.state = State::Legacy { ticks_per_milli };
        self.buffer.consume(header.size());
        Ok(PcapEvent::Interface(InterfaceEvent {
            linktype: header.linktype(),
            snaplen: header.snaplen,
            name: None,
            clock,
            options,
        }))
    }

    fn legacy_event(&mut self, ticks_per_milli: u32) -> Result<PcapEvent, PcapError> {
        if self.buffer.is_empty() && self.buffer.ended() {
            return Err(PcapError::Eof);
        }
        let data = self.buffer.data();
        let result = if self.big_endian {
            parse_pcap_frame::<PcapBE, NomError<&[u8]>>(data)
        } else {
            parse_pcap_frame::<PcapLE, NomError<&[u8]>>(data)
        };
        match result {
            Ok((rem, frame)) => {
                let consumed = data.len() - rem.len();
                // seconds scaled to milliseconds, plus the fractional part
                // floored to milliseconds
                let millis =
                    i64::from(frame.ts_sec) * 1000 + i64::from(frame.ts_frac / ticks_per_milli);
                let event = PacketEvent {
                    if_id: 0,
                    timestamp: Utc.timestamp_millis_opt(millis).single(),
                    flags: None,
                    origlen: frame.origlen,
                    data: frame.data.to_vec(),
                    options: Vec::new(),
                };
                self.buffer.consume(consumed);
                Ok(PcapEvent::Packet(event))
            }
            Err(nom::Err::Incomplete(needed)) => Err(self.need(needed_size(needed))),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
                Err(PcapError::NomError(e.code))
            }
        }
    }

    fn ng_event(&mut self) -> Result<PcapEvent, PcapError> {
        loop {
            let available = self.buffer.len();
            if available == 0 && self.buffer.ended() {
                return Err(PcapError::Eof);
            }
            if available < 8 {
                return Err(self.need(8 - available));
            }
            // A Section Header Block re-establishes endianness: sniff its
            // byte-order magic before reading any length field.
            if self.buffer.data()[..4] == SHB_SENTINEL {
                if available < 12 {
                    return Err(self.need(12 - available));
                }
                let bom = u32_at::<PcapLE>(self.buffer.data(), 8);
                if bom == BOM_MAGIC {
                    self.big_endian = false;
                } else if bom == BOM_MAGIC.swap_bytes() {
                    self.big_endian = true;
                } else {
                    return Err(PcapError::UnknownEndianness);
                }
            }
            let event = if self.big_endian {
                self.ng_block::<PcapBE>()?
            } else {
                self.ng_block::<PcapLE>()?
            };
            if let Some(event) = event {
                return Ok(event);
            }
        }
    }

    /// Frame one block and run its processor.
    ///
    /// Framing faults are fatal; everything behind the bounded body view is
    /// a block-local fault, reported as a recoverable event.
    fn ng_block<En: PcapEndianness>(&mut self) -> Result<Option<PcapEvent>, PcapError> {
        let Self {
            buffer, interfaces, ..
        } = self;
        let data = buffer.data();
        let block_type = u32_at::<En>(data, 0);
        let block_len = u32_at::<En>(data, 4);
        if block_len < 12 {
            return Err(PcapError::InvalidBlockLength(block_len));
        }
        let content_len = (block_len - 12) as usize;
        let padding = pad4(content_len);
        let total = 8 + content_len + padding + 4;
        if data.len() < total {
            let missing = total - data.len();
            return Err(if buffer.ended() {
                PcapError::UnexpectedEof(missing)
            } else {
                PcapError::Incomplete(missing)
            });
        }
        let trailer = u32_at::<En>(data, 8 + content_len + padding);
        if trailer != block_len {
            return Err(PcapError::LengthMismatch {
                header: block_len,
                trailer,
            });
        }
        if (block_type as i32) < 0 {
            trace!("ignoring local-use block type {:#010x}", block_type);
            buffer.consume(total);
            return Ok(None);
        }
        let content = &data[8..8 + content_len];
        let event = match process_block::<En>(interfaces, block_type, content) {
            Ok(event) => event,
            Err(cause) => {
                warn!("skipping block type {:#010x}: {}", block_type, cause);
                PcapEvent::Error(RecoverableError { block_type, cause })
            }
        };
        buffer.consume(total);
        Ok(Some(event))
    }
}

fn process_block<En: PcapEndianness>(
    interfaces: &mut Vec<InterfaceContext>,
    block_type: u32,
    content: &[u8],
) -> Result<PcapEvent, BlockError> {
    match block_type {
        SHB_MAGIC => {
            let shb = content_block(parse_sectionheader_content::<En, _>(content))?;
            debug!(
                "new section: version {}.{}, {:?}-endian",
                shb.major_version,
                shb.minor_version,
                En::ENDIANNESS
            );
            interfaces.clear();
            let options = decode_options::<En>(SHB_MAGIC, &shb.options, None)?;
            Ok(PcapEvent::Section(SectionEvent {
                endianness: En::ENDIANNESS,
                major_version: shb.major_version,
                minor_version: shb.minor_version,
                section_len: shb.section_len,
                options,
            }))
        }
        IDB_MAGIC => {
            let idb = content_block(parse_interfacedescription_content::<En, _>(content))?;
            let clock = extract_clock::<En>(&idb.options);
            let options = decode_options::<En>(IDB_MAGIC, &idb.options, None)?;
            let name = options.iter().find(|opt| opt.code == 2).and_then(|opt| {
                match &opt.value {
                    OptionValue::Str(name) => Some(name.clone()),
                    _ => None,
                }
            });
            trace!(
                "interface #{}: linktype {}, snaplen {}",
                interfaces.len(),
                idb.linktype,
                idb.snaplen
            );
            interfaces.push(InterfaceContext {
                snaplen: idb.snaplen,
                clock,
            });
            Ok(PcapEvent::Interface(InterfaceEvent {
                linktype: idb.linktype,
                snaplen: idb.snaplen,
                name,
                clock,
                options,
            }))
        }
        SPB_MAGIC => {
            let spb = content_block(parse_simplepacket_content::<En, _>(content))?;
            let iface = interfaces.first().ok_or(BlockError::NoInterface)?;
            let caplen = spb.origlen.min(iface.snaplen) as usize;
            if spb.data.len() < caplen {
                return Err(BlockError::Malformed);
            }
            Ok(PcapEvent::Packet(PacketEvent {
                if_id: 0,
                timestamp: None,
                flags: None,
                origlen: spb.origlen,
                data: spb.data[..caplen].to_vec(),
                options: Vec::new(),
            }))
        }
        EPB_MAGIC => {
            let epb = content_block(parse_enhancedpacket_content::<En, _>(content))?;
            let iface = interfaces
                .get(epb.if_id as usize)
                .ok_or(BlockError::InvalidInterfaceId(epb.if_id))?;
            let timestamp = iface.clock.timestamp(epb.ts_high, epb.ts_low);
            let flags = epb
                .options
                .iter()
                .find(|opt| opt.code == OptionCode(2) && opt.value.len() == 4)
                .map(|opt| {
                    let bytes = <[u8; 4]>::try_from(opt.value).expect("4-byte flags option");
                    PacketFlags::from_word(En::u32_from_bytes(bytes))
                });
            let options = decode_options::<En>(EPB_MAGIC, &epb.options, Some(&iface.clock))?;
            Ok(PcapEvent::Packet(PacketEvent {
                if_id: epb.if_id,
                timestamp,
                flags,
                origlen: epb.origlen,
                data: epb.data.to_vec(),
                options,
            }))
        }
        NRB_MAGIC => {
            let nrb = content_block(parse_nameresolution_content::<En, _>(content))?;
            let records = decode_name_records(&nrb.records)?;
            let options = decode_options::<En>(NRB_MAGIC, &nrb.options, None)?;
            Ok(PcapEvent::NameResolution(NameResolutionEvent {
                records,
                options,
            }))
        }
        ISB_MAGIC => {
            let isb = content_block(parse_interfacestatistics_content::<En, _>(content))?;
            let iface = interfaces
                .get(isb.if_id as usize)
                .ok_or(BlockError::InvalidInterfaceId(isb.if_id))?;
            let timestamp = iface.clock.timestamp(isb.ts_high, isb.ts_low);
            let options = decode_options::<En>(ISB_MAGIC, &isb.options, Some(&iface.clock))?;
            Ok(PcapEvent::InterfaceStatistics(StatisticsEvent {
                if_id: isb.if_id,
                timestamp,
                options,
            }))
        }
        DSB_MAGIC => {
            let dsb = content_block(parse_decryptionsecrets_content::<En, _>(content))?;
            let options = decode_options::<En>(DSB_MAGIC, &dsb.options, None)?;
            Ok(PcapEvent::DecryptionSecrets(SecretsEvent {
                secrets_type: dsb.secrets_type,
                data: dsb.data.to_vec(),
                options,
            }))
        }
        CB_MAGIC | DCB_MAGIC => {
            let cb = content_block(parse_custom_content::<En, _>(block_type, content))?;
            Ok(PcapEvent::Custom(CustomEvent {
                pen: cb.pen,
                data: cb.data.to_vec(),
                copy: !cb.do_not_copy(),
            }))
        }
        _ => {
            trace!("unknown block type {:#010x}", block_type);
            Ok(PcapEvent::Unknown { block_type })
        }
    }
}

fn content_block<'a, O>(result: nom::IResult<&'a [u8], O, NomError<&'a [u8]>>) -> Result<O, BlockError> {
    match result {
        Ok((_, block)) => Ok(block),
        Err(_) => Err(BlockError::Malformed),
    }
}

fn needed_size(needed: Needed) -> usize {
    match needed {
        Needed::Size(n) => n.get(),
        Needed::Unknown => 1,
    }
}

#[inline]
fn u32_at<En: PcapEndianness>(data: &[u8], offset: usize) -> u32 {
    En::u32_from_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}
