use std::convert::TryFrom;

use chrono::{DateTime, TimeZone, Utc};

use crate::endianness::PcapEndianness;

use super::{OptionCode, PcapNGOption};

/// Compute the timestamp resolution, in ticks per millisecond.
///
/// The raw `if_tsresol` byte encodes either a negative power of ten (high
/// bit clear) or a negative power of two (high bit set), counted per second.
/// Resolutions coarser than one millisecond floor to zero under that scheme,
/// so the result is clamped to at least one tick; resolutions too large to
/// represent return `None`.
pub fn ticks_per_milli(if_tsresol: u8) -> Option<u64> {
    if if_tsresol & 0x80 != 0 {
        let power = if_tsresol & 0x7f;
        if power > 63 {
            return None;
        }
        Some(((1u64 << power) / 1000).max(1))
    } else if if_tsresol > 22 {
        // 10^19 is the largest power of 10 to fit in a u64
        None
    } else if if_tsresol < 3 {
        Some(1)
    } else {
        Some(10u64.pow(u32::from(if_tsresol) - 3))
    }
}

/// Timestamp clock parameters of a capture interface.
///
/// `offset_millis` is added to every decoded timestamp; `ticks_per_milli`
/// scales the raw 64-bit counter. The default matches the PCAPNG default of
/// microsecond resolution with no offset.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InterfaceClock {
    pub offset_millis: i64,
    pub ticks_per_milli: u64,
}

impl Default for InterfaceClock {
    fn default() -> Self {
        InterfaceClock {
            offset_millis: 0,
            ticks_per_milli: 1000,
        }
    }
}

impl InterfaceClock {
    /// Combine the split 64-bit counter into an absolute instant.
    ///
    /// The division is integral: precision below one millisecond is dropped.
    /// Returns `None` if the result is outside the representable range.
    pub fn timestamp(&self, ts_high: u32, ts_low: u32) -> Option<DateTime<Utc>> {
        let stamp = (u64::from(ts_high) << 32) | u64::from(ts_low);
        let ticks = self.ticks_per_milli.max(1);
        let millis = i64::try_from(stamp / ticks)
            .ok()?
            .checked_add(self.offset_millis)?;
        Utc.timestamp_millis_opt(millis).single()
    }
}

/// Extract the clock parameters from the raw options of an Interface
/// Description Block. Both options are optional; missing or out-of-range
/// values keep the defaults.
pub(crate) fn extract_clock<En: PcapEndianness>(options: &[PcapNGOption]) -> InterfaceClock {
    let mut clock = InterfaceClock::default();
    for opt in options {
        match opt.code {
            OptionCode::IfTsresol => {
                if let Some(&b) = opt.value.first() {
                    if let Some(ticks) = ticks_per_milli(b) {
                        clock.ticks_per_milli = ticks;
                    }
                }
            }
            OptionCode::IfTsoffset => {
                if opt.value.len() >= 8 {
                    let int_bytes =
                        <[u8; 8]>::try_from(&opt.value[..8]).expect("Convert bytes to u64");
                    let seconds = En::u64_from_bytes(int_bytes);
                    clock.offset_millis = (seconds as i64).saturating_mul(1000);
                }
            }
            _ => (),
        }
    }
    clock
}
