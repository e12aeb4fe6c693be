use nom::error::{ErrorKind, ParseError};
use thiserror::Error;

/// Stream-level errors.
///
/// Everything here except [`PcapError::Incomplete`] and [`PcapError::Eof`] is
/// fatal: the decoder refuses to go past a framing fault, since block
/// boundaries can no longer be trusted.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum PcapError {
    /// Clean end of stream. Always the last result returned by the decoder.
    #[error("End of stream")]
    Eof,
    /// Not enough buffered bytes to complete the current record. Feed more
    /// data (or declare the end of input) and poll again.
    #[error("Incomplete data: need {0} more bytes")]
    Incomplete(usize),
    /// The producer declared end of input in the middle of a record.
    #[error("Truncated capture: {0} bytes missing")]
    UnexpectedEof(usize),
    /// The first bytes match none of the five known file magics.
    #[error("Invalid file format")]
    InvalidFileFormat,
    /// A Section Header Block carried an unknown byte-order magic.
    #[error("Unable to determine endian")]
    UnknownEndianness,
    /// The redundant trailing block length disagrees with the leading one.
    #[error("Length mismatch: block declared {header} bytes, trailer says {trailer}")]
    LengthMismatch { header: u32, trailer: u32 },
    /// A block declared a total length smaller than its fixed framing.
    #[error("Invalid block length {0}")]
    InvalidBlockLength(u32),
    #[error("Old PCAP format detected and rejected")]
    LegacyRejected,
    #[error("PCAPng format detected and rejected")]
    PcapNgRejected,
    /// The producer aborted the stream.
    #[error("Stream aborted")]
    Aborted,
    #[error("Parser error: {0:?}")]
    NomError(ErrorKind),
}

impl<I> ParseError<I> for PcapError {
    fn from_error_kind(_input: I, kind: ErrorKind) -> Self {
        PcapError::NomError(kind)
    }
    fn append(_input: I, kind: ErrorKind, _other: Self) -> Self {
        PcapError::NomError(kind)
    }
}

/// Faults confined to a single PCAPNG block.
///
/// The body of every block is decoded against a bounded view, so a failing
/// block cannot corrupt the framing of its successors. These errors are
/// reported and the stream resumes at the next block.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BlockError {
    #[error("No interface for simple packet")]
    NoInterface,
    #[error("Invalid interface ID {0}")]
    InvalidInterfaceId(u32),
    #[error("Invalid {0} option")]
    InvalidOption(&'static str),
    #[error("Invalid nrb_record_{0}")]
    InvalidNameRecord(&'static str),
    #[error("Malformed block content")]
    Malformed,
}

/// A recoverable per-block fault, wrapping the original cause.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("Recoverable error in block type {block_type:#010x}: {cause}")]
pub struct RecoverableError {
    pub block_type: u32,
    #[source]
    pub cause: BlockError,
}
