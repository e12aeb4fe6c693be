//! # Streaming PCAP and PCAPNG event decoder
//!
//! This crate decodes packet-capture streams in both the legacy PCAP format
//! and the block-structured PCAPNG format, without requiring the capture to
//! be loaded in memory or even to come from a file: input is pushed as
//! arbitrary byte chunks, and a typed event is produced as soon as each
//! record is complete.
//!
//! The format is auto-detected from the first four bytes (all five known
//! file magics are recognized, covering both byte orders and both legacy
//! timestamp precisions), and PCAPNG sections may switch endianness
//! mid-stream.
//!
//! # Example
//!
//! ```rust,no_run
//! use pcap_events::{DecoderConfig, PcapDecoder, PcapError, PcapEvent};
//! use std::fs::File;
//! use std::io::Read;
//!
//! let mut file = File::open("capture.pcapng").unwrap();
//! let mut decoder = PcapDecoder::new(DecoderConfig::default());
//! let mut chunk = [0u8; 8192];
//! let mut num_packets = 0;
//! loop {
//!     match decoder.next_event() {
//!         Ok(PcapEvent::Packet(_packet)) => num_packets += 1,
//!         Ok(_other) => (),
//!         Err(PcapError::Incomplete(_)) => {
//!             let sz = file.read(&mut chunk).unwrap();
//!             if sz == 0 {
//!                 decoder.end();
//!             } else {
//!                 decoder.feed(&chunk[..sz]);
//!             }
//!         }
//!         Err(PcapError::Eof) => break,
//!         Err(e) => panic!("error while decoding: {}", e),
//!     }
//! }
//! println!("num_packets: {}", num_packets);
//! ```
//!
//! Errors are split in two classes: faults local to one PCAPNG block are
//! delivered as [`PcapEvent::Error`] and decoding continues with the next
//! block, while framing faults (unknown magic, length mismatch, truncated
//! input) are returned as `Err` and close the stream. Legacy PCAP has no
//! recoverable layer. See [`PcapDecoder::next_event`] for the protocol.

mod buffer;
mod decoder;
mod endianness;
mod error;
mod event;
mod flags;
mod linktype;

pub mod pcap;
pub mod pcapng;

pub use buffer::ChunkBuffer;
pub use decoder::{DecoderConfig, PcapDecoder};
pub use endianness::Endianness;
pub use error::{BlockError, PcapError, RecoverableError};
pub use event::*;
pub use flags::{Direction, LinkLayerErrors, PacketFlags, Reception};
pub use linktype::Linktype;
pub use pcap::{LegacyPcapBlock, PcapHeader};
pub use pcapng::*;
