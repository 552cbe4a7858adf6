//! Latched time capture.
//!
//! Reading current time is a two-step sequence: a latch command freezes the
//! live counters into a stable shadow register pair, then the pair is read
//! back through register access. The latch is what keeps the seconds word and
//! the sub-second fields consistent with each other; reading the live
//! counters directly could tear between the two words.

use crate::channel::DriverChannel;
use crate::commands::TimeFormat;
use crate::constants::{self, Opcode};
use crate::device::Device;
use crate::error::{Error, Result};
use crate::wire::{self, CommandBlock};

/// Capture channels. The primary channel follows the card's own clock; the
/// event channels freeze on their external event inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureChannel {
    Primary,
    Event2,
    Event3,
}

impl CaptureChannel {
    pub(crate) const fn code(self) -> u8 {
        match self {
            CaptureChannel::Primary => 0,
            CaptureChannel::Event2 => 1,
            CaptureChannel::Event3 => 2,
        }
    }

    /// Shadow register pair (word0, word1) holding this channel's latched
    /// time.
    pub(crate) const fn register_pair(self) -> (u8, u8) {
        match self {
            CaptureChannel::Primary => (constants::REG_TIME0, constants::REG_TIME1),
            CaptureChannel::Event2 => (constants::REG_EVENT2_TIME0, constants::REG_EVENT2_TIME1),
            CaptureChannel::Event3 => (constants::REG_EVENT3_TIME0, constants::REG_EVENT3_TIME1),
        }
    }
}

/// Tracking status captured together with the time words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureStatus(u8);

impl CaptureStatus {
    pub(crate) fn from_wire(bits: u8) -> Self {
        Self(bits)
    }

    pub fn raw(self) -> u8 {
        self.0
    }

    /// The oscillator is flywheeling rather than tracking its reference.
    pub fn is_flywheeling(self) -> bool {
        self.0 & 0x01 != 0
    }

    pub fn phase_error_exceeded(self) -> bool {
        self.0 & 0x02 != 0
    }

    pub fn frequency_error_exceeded(self) -> bool {
        self.0 & 0x04 != 0
    }
}

/// Time captured while the card is in binary (UNIX) format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryTime {
    /// Whole UNIX seconds.
    pub seconds: u32,
    pub microseconds: u32,
    /// Sub-microsecond remainder, a multiple of 100 ns.
    pub nanoseconds: u32,
    pub status: CaptureStatus,
}

/// Time captured in decimal (calendar) format. The year is not part of the
/// register pair and is queried separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalTime {
    pub year: u16,
    pub day_of_year: u16,
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    pub microseconds: u32,
    pub nanoseconds: u32,
    pub status: CaptureStatus,
}

impl<C: DriverChannel> Device<C> {
    /// Captures the current time on `channel` in binary format.
    ///
    /// The card must already be in binary time format; this call verifies the
    /// format first and fails with [`Error::FormatMismatch`] rather than
    /// converting decimal register contents.
    pub fn read_time(&mut self, channel: CaptureChannel) -> Result<BinaryTime> {
        let format = self.time_format()?;
        if format != TimeFormat::Binary {
            return Err(Error::FormatMismatch {
                expected: TimeFormat::Binary,
                actual: format,
            });
        }

        let (word0, word1) = self.latch_and_read(channel)?;
        let fields = wire::unpack_word0(word0);
        Ok(BinaryTime {
            seconds: word1,
            microseconds: fields.microseconds,
            nanoseconds: 100 * u32::from(fields.hundred_ns),
            status: CaptureStatus::from_wire(fields.status),
        })
    }

    /// Captures the current time on `channel` in decimal format.
    ///
    /// Side effect: this call writes the card's time-format register to
    /// decimal before latching, so a card previously in binary format stays
    /// in decimal format afterwards. The year completing the date comes from
    /// a separate query and can disagree with the latched words across a
    /// year rollover.
    pub fn read_decimal_time(&mut self, channel: CaptureChannel) -> Result<DecimalTime> {
        self.set_time_format(TimeFormat::Decimal)?;

        let (word0, word1) = self.latch_and_read(channel)?;
        let year = self.year()?;
        let sub = wire::unpack_word0(word0);
        let fields = wire::unpack_decimal_word1(word1);
        Ok(DecimalTime {
            year,
            day_of_year: fields.day_of_year,
            hours: fields.hours,
            minutes: fields.minutes,
            seconds: fields.seconds,
            microseconds: sub.microseconds,
            nanoseconds: 100 * u32::from(sub.hundred_ns),
            status: CaptureStatus::from_wire(sub.status),
        })
    }

    fn latch_and_read(&mut self, channel: CaptureChannel) -> Result<(u32, u32)> {
        let mut block = CommandBlock::new(Opcode::LatchTime);
        block.push_u8(channel.code());
        self.send(&block)?;

        let (reg0, reg1) = channel.register_pair();
        let word0 = self.read_register(reg0)?;
        let word1 = self.read_register(reg1)?;
        Ok((word0, word1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::testing::MockChannel;

    const BINARY: &[u8] = &[0];
    const DECIMAL: &[u8] = &[1];

    fn device() -> Device<MockChannel> {
        Device::with_channel(MockChannel::new())
    }

    #[test]
    fn binary_read_latches_then_reads_shadow_pair() {
        let mut device = device();
        {
            let channel = device.channel_for_tests();
            channel.preload(Opcode::TimeFormat.id(), BINARY);
            channel.registers.insert(constants::REG_TIME0, 0x0010_0032);
            channel.registers.insert(constants::REG_TIME1, 1_700_000_000);
        }

        let time = device.read_time(CaptureChannel::Primary).unwrap();
        assert_eq!(time.seconds, 1_700_000_000);
        assert_eq!(time.microseconds, 50);
        assert_eq!(time.nanoseconds, 100);
        assert_eq!(time.status.raw(), 0);
        assert!(!time.status.is_flywheeling());

        let channel = device.channel_for_tests();
        assert_eq!(channel.sent, vec![vec![Opcode::LatchTime.id(), 0]]);
        assert_eq!(
            channel.register_reads,
            vec![constants::REG_TIME0, constants::REG_TIME1]
        );
    }

    #[test]
    fn binary_read_fails_when_card_reports_decimal() {
        let mut device = device();
        {
            let channel = device.channel_for_tests();
            channel.preload(Opcode::TimeFormat.id(), DECIMAL);
            // Registers hold a perfectly valid word pair; it must not be read.
            channel.registers.insert(constants::REG_TIME0, 0x0010_0032);
        }

        assert!(matches!(
            device.read_time(CaptureChannel::Primary),
            Err(Error::FormatMismatch {
                expected: TimeFormat::Binary,
                actual: TimeFormat::Decimal,
            })
        ));
        let channel = device.channel_for_tests();
        assert!(channel.sent.is_empty());
        assert!(channel.register_reads.is_empty());
    }

    #[test]
    fn event_channels_read_their_own_register_pairs() {
        let mut device = device();
        {
            let channel = device.channel_for_tests();
            channel.preload(Opcode::TimeFormat.id(), BINARY);
            channel
                .registers
                .insert(constants::REG_EVENT3_TIME0, 0x0420_0010);
            channel.registers.insert(constants::REG_EVENT3_TIME1, 42);
        }

        let time = device.read_time(CaptureChannel::Event3).unwrap();
        assert_eq!(time.seconds, 42);
        assert_eq!(time.microseconds, 0x10);
        assert_eq!(time.nanoseconds, 200);
        assert!(time.status.frequency_error_exceeded());

        let channel = device.channel_for_tests();
        assert_eq!(channel.sent, vec![vec![Opcode::LatchTime.id(), 2]]);
        assert_eq!(
            channel.register_reads,
            vec![constants::REG_EVENT3_TIME0, constants::REG_EVENT3_TIME1]
        );
    }

    #[test]
    fn status_bits_decode_individually() {
        let status = CaptureStatus::from_wire(0x03);
        assert!(status.is_flywheeling());
        assert!(status.phase_error_exceeded());
        assert!(!status.frequency_error_exceeded());
    }

    #[test]
    fn decimal_read_forces_decimal_format_and_queries_year() {
        let mut device = device();
        {
            let channel = device.channel_for_tests();
            channel.preload(Opcode::Year.id(), &[0x07, 0xe8]);
            // day 200, 13:21:07
            channel.registers.insert(constants::REG_TIME0, 0x0010_0032);
            channel.registers.insert(constants::REG_TIME1, 0xc80d_1507);
        }

        let time = device.read_decimal_time(CaptureChannel::Primary).unwrap();
        assert_eq!(time.year, 2024);
        assert_eq!(time.day_of_year, 200);
        assert_eq!(time.hours, 13);
        assert_eq!(time.minutes, 21);
        assert_eq!(time.seconds, 7);
        assert_eq!(time.microseconds, 50);
        assert_eq!(time.nanoseconds, 100);

        // The documented side effect: the format register now reads decimal.
        let channel = device.channel_for_tests();
        assert_eq!(channel.stored(Opcode::TimeFormat.id()), Some(DECIMAL));
        assert_eq!(
            channel.sent[0],
            vec![Opcode::TimeFormat.id(), TimeFormat::Decimal.to_wire()]
        );
    }
}
