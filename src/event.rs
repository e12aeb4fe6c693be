use chrono::{DateTime, Utc};

use crate::endianness::Endianness;
use crate::error::RecoverableError;
use crate::flags::PacketFlags;
use crate::linktype::Linktype;
use crate::pcapng::{DecodedOption, InterfaceClock, NameRecord, SecretsType};

/// A new section started. The interface table of the previous section is no
/// longer valid.
#[derive(Clone, Debug, PartialEq)]
pub struct SectionEvent {
    pub endianness: Endianness,
    pub major_version: u16,
    pub minor_version: u16,
    /// Declared section length; -1 means "unknown"
    pub section_len: i64,
    pub options: Vec<DecodedOption>,
}

/// A capture interface was described. Interfaces are numbered by order of
/// appearance within their section, starting at 0.
#[derive(Clone, Debug, PartialEq)]
pub struct InterfaceEvent {
    pub linktype: Linktype,
    pub snaplen: u32,
    /// From the `if_name` option, when present
    pub name: Option<String>,
    pub clock: InterfaceClock,
    pub options: Vec<DecodedOption>,
}

/// A captured packet, from an Enhanced Packet Block, a Simple Packet Block
/// or a legacy record.
#[derive(Clone, Debug, PartialEq)]
pub struct PacketEvent {
    pub if_id: u32,
    pub timestamp: Option<DateTime<Utc>>,
    /// Decoded `epb_flags`, when the option is present
    pub flags: Option<PacketFlags>,
    /// Original packet length; `data` may be shorter when the capture was
    /// truncated at the snap length
    pub origlen: u32,
    pub data: Vec<u8>,
    pub options: Vec<DecodedOption>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NameResolutionEvent {
    pub records: Vec<NameRecord>,
    pub options: Vec<DecodedOption>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StatisticsEvent {
    pub if_id: u32,
    pub timestamp: Option<DateTime<Utc>>,
    pub options: Vec<DecodedOption>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SecretsEvent {
    pub secrets_type: SecretsType,
    pub data: Vec<u8>,
    pub options: Vec<DecodedOption>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CustomEvent {
    pub pen: u32,
    pub data: Vec<u8>,
    /// False for the do-not-copy block variant
    pub copy: bool,
}

/// One decoded record from the capture stream.
///
/// Events own their payloads: nothing borrows from the decoder's input
/// buffer once an event has been returned.
#[derive(Clone, Debug, PartialEq)]
pub enum PcapEvent {
    Section(SectionEvent),
    Interface(InterfaceEvent),
    Packet(PacketEvent),
    NameResolution(NameResolutionEvent),
    InterfaceStatistics(StatisticsEvent),
    DecryptionSecrets(SecretsEvent),
    Custom(CustomEvent),
    /// A well-formed block of a type this decoder does not know.
    Unknown { block_type: u32 },
    /// A block-local fault; the stream continues at the next block.
    Error(RecoverableError),
}
