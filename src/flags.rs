use bitflags::bitflags;

/// Direction of a captured packet, from `epb_flags` bits 0-1.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    NotAvailable,
    Inbound,
    Outbound,
    Invalid,
}

/// Reception class of a captured packet, from `epb_flags` bits 2-4.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Reception {
    NotSpecified,
    Unicast,
    Multicast,
    Broadcast,
    Promiscuous,
    Invalid,
}

bitflags! {
    /// Link-layer error summary carried in `epb_flags` bits 16-23.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct LinkLayerErrors: u8 {
        const SYMBOL = 0x01;
        const PREAMBLE = 0x02;
        const START_FRAME_DELIMITER = 0x04;
        const UNALIGNED_FRAME = 0x08;
        const WRONG_INTER_FRAME_GAP = 0x10;
        const PACKET_TOO_SHORT = 0x20;
        const PACKET_TOO_LONG = 0x40;
        const CRC = 0x80;
    }
}

/// Decoded view of the 32-bit `epb_flags` option value.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PacketFlags {
    pub direction: Direction,
    pub reception: Reception,
    /// FCS length, 0 when not reported.
    pub fcs_len: u8,
    pub no_checksum: bool,
    pub checksum_valid: bool,
    pub tcp_segmentation_offload: bool,
    pub link_layer_errors: LinkLayerErrors,
}

impl PacketFlags {
    /// Decode the flags word, read in the endianness of its section.
    pub fn from_word(word: u32) -> PacketFlags {
        let direction = match word & 0b11 {
            0 => Direction::NotAvailable,
            1 => Direction::Inbound,
            2 => Direction::Outbound,
            _ => Direction::Invalid,
        };
        let reception = match (word >> 2) & 0b111 {
            0 => Reception::NotSpecified,
            1 => Reception::Unicast,
            2 => Reception::Multicast,
            3 => Reception::Broadcast,
            4 => Reception::Promiscuous,
            _ => Reception::Invalid,
        };
        PacketFlags {
            direction,
            reception,
            fcs_len: ((word >> 5) & 0x0f) as u8,
            no_checksum: word & (1 << 9) != 0,
            checksum_valid: word & (1 << 10) != 0,
            tcp_segmentation_offload: word & (1 << 11) != 0,
            link_layer_errors: LinkLayerErrors::from_bits_truncate(((word >> 16) & 0xff) as u8),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_all_fields() {
        let flags = PacketFlags::from_word(0x00ff_0e65);
        assert_eq!(flags.direction, Direction::Inbound);
        assert_eq!(flags.reception, Reception::Unicast);
        assert_eq!(flags.fcs_len, 3);
        assert!(flags.no_checksum);
        assert!(flags.checksum_valid);
        assert!(flags.tcp_segmentation_offload);
        assert_eq!(flags.link_layer_errors, LinkLayerErrors::all());
    }

    #[test]
    fn decode_empty_word() {
        let flags = PacketFlags::from_word(0);
        assert_eq!(flags.direction, Direction::NotAvailable);
        assert_eq!(flags.reception, Reception::NotSpecified);
        assert_eq!(flags.fcs_len, 0);
        assert!(!flags.no_checksum);
        assert!(flags.link_layer_errors.is_empty());
    }

    #[test]
    fn decode_direction_and_reception_variants() {
        assert_eq!(PacketFlags::from_word(2).direction, Direction::Outbound);
        assert_eq!(PacketFlags::from_word(3).direction, Direction::Invalid);
        assert_eq!(PacketFlags::from_word(3 << 2).reception, Reception::Broadcast);
        assert_eq!(PacketFlags::from_word(6 << 2).reception, Reception::Invalid);
    }
}
