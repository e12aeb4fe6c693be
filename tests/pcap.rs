use chrono::{TimeZone, Utc};
use hex_literal::hex;
use pcap_events::*;

// big-endian, microsecond resolution, one 1-byte packet at t = 1000 us
const PCAP_MICRO_BE: &[u8] = &hex!(
    "A1B2C3D4 0002 0004 00000000 00000000 0000FFFF 0000FFFF"
    "00000000 000003e8 00000001 00000001 61"
);
// little-endian, nanosecond resolution, same packet at t = 1000000 ns
const PCAP_NANO_LE: &[u8] = &hex!(
    "4D3CB2A1 0200 0400 00000000 00000000 FFFF0000 01000000"
    "00000000 40420f00 01000000 01000000 61"
);

fn drain(decoder: &mut PcapDecoder) -> (Vec<PcapEvent>, PcapError) {
    let mut events = Vec::new();
    loop {
        match decoder.next_event() {
            Ok(event) => events.push(event),
            Err(e) => return (events, e),
        }
    }
}

fn decode_all(input: &[u8]) -> (Vec<PcapEvent>, PcapError) {
    let mut decoder = PcapDecoder::new(DecoderConfig::default());
    decoder.feed(input);
    decoder.end();
    drain(&mut decoder)
}

#[test]
fn microsecond_big_endian() {
    let (events, err) = decode_all(PCAP_MICRO_BE);
    assert_eq!(err, PcapError::Eof);
    assert_eq!(events.len(), 2);
    match &events[0] {
        PcapEvent::Interface(interface) => {
            assert_eq!(interface.linktype, Linktype(0xffff));
            assert_eq!(interface.snaplen, 0xffff);
            assert_eq!(interface.clock.ticks_per_milli, 1000);
            assert_eq!(interface.clock.offset_millis, 0);
            assert!(interface.options.is_empty());
        }
        other => panic!("expected interface, got {:?}", other),
    }
    match &events[1] {
        PcapEvent::Packet(packet) => {
            assert_eq!(packet.if_id, 0);
            assert_eq!(packet.origlen, 1);
            assert_eq!(packet.data, b"a".to_vec());
            assert_eq!(packet.timestamp, Utc.timestamp_millis_opt(1).single());
        }
        other => panic!("expected packet, got {:?}", other),
    }
}

#[test]
fn nanosecond_little_endian() {
    let (events, err) = decode_all(PCAP_NANO_LE);
    assert_eq!(err, PcapError::Eof);
    assert_eq!(events.len(), 2);
    match &events[0] {
        PcapEvent::Interface(interface) => {
            assert_eq!(interface.linktype, Linktype::ETHERNET);
            assert_eq!(interface.snaplen, 0xffff);
            assert_eq!(interface.clock.ticks_per_milli, 1_000_000);
        }
        other => panic!("expected interface, got {:?}", other),
    }
    match &events[1] {
        PcapEvent::Packet(packet) => {
            assert_eq!(packet.data, b"a".to_vec());
            assert_eq!(packet.timestamp, Utc.timestamp_millis_opt(1).single());
        }
        other => panic!("expected packet, got {:?}", other),
    }
}

#[test]
fn fcs_length_reported_as_option() {
    let mut input = PCAP_MICRO_BE.to_vec();
    // set the FCS-present bit and an FCS length of 2 in the linktype word
    input[20..24].copy_from_slice(&0x2400_0001u32.to_be_bytes());
    let (events, err) = decode_all(&input);
    assert_eq!(err, PcapError::Eof);
    match &events[0] {
        PcapEvent::Interface(interface) => {
            assert_eq!(interface.linktype, Linktype::ETHERNET);
            assert_eq!(interface.options.len(), 1);
            assert_eq!(interface.options[0].code, 13);
            assert_eq!(interface.options[0].name, Some("if_fcslen"));
            assert_eq!(interface.options[0].value, OptionValue::Number(32));
        }
        other => panic!("expected interface, got {:?}", other),
    }
}

#[test]
fn reject_legacy_switch() {
    let config = DecoderConfig {
        reject_legacy: true,
        ..DecoderConfig::default()
    };
    let mut decoder = PcapDecoder::new(config);
    decoder.feed(PCAP_MICRO_BE);
    decoder.end();
    let (events, err) = drain(&mut decoder);
    assert!(events.is_empty());
    assert_eq!(err, PcapError::LegacyRejected);
    assert_eq!(err.to_string(), "Old PCAP format detected and rejected");
}

#[test]
fn truncated_record_is_fatal() {
    let input = &PCAP_MICRO_BE[..PCAP_MICRO_BE.len() - 1];
    let (events, err) = decode_all(input);
    assert_eq!(events.len(), 1);
    assert_eq!(err, PcapError::UnexpectedEof(1));
    assert!(err.to_string().contains("Truncated"));
}

#[test]
fn truncated_header_is_fatal() {
    let (events, err) = decode_all(&PCAP_MICRO_BE[..10]);
    assert!(events.is_empty());
    assert_eq!(err, PcapError::UnexpectedEof(14));
}

#[test]
fn waits_for_more_input_before_end() {
    let mut decoder = PcapDecoder::new(DecoderConfig::default());
    decoder.feed(&PCAP_MICRO_BE[..10]);
    match decoder.next_event() {
        Err(PcapError::Incomplete(n)) => assert_eq!(n, 14),
        other => panic!("expected incomplete, got {:?}", other),
    }
    decoder.feed(&PCAP_MICRO_BE[10..]);
    decoder.end();
    let (events, err) = drain(&mut decoder);
    assert_eq!(events.len(), 2);
    assert_eq!(err, PcapError::Eof);
}

#[test]
fn empty_legacy_capture_closes_cleanly() {
    // header only, no records
    let (events, err) = decode_all(&PCAP_MICRO_BE[..24]);
    assert_eq!(events.len(), 1);
    assert_eq!(err, PcapError::Eof);
}
