//! Configuration setters and getters.
//!
//! Every setter validates its own domain, then issues exactly one block; every
//! getter issues one request and decodes the echoed reply. Both go through the
//! generic dispatch in [`crate::device`], so operations this hardware revision
//! does not implement fail uniformly from the same opcode table before any
//! I/O happens.

use crate::channel::DriverChannel;
use crate::constants::Opcode;
use crate::device::Device;
use crate::error::{Error, Result};
use crate::wire::CommandBlock;
use byteorder::{BigEndian, ByteOrder};

/// On-card representation of the time register pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFormat {
    /// Word1 holds whole UNIX seconds.
    Binary,
    /// Word1 holds packed seconds/minutes/hours/day-of-year fields.
    Decimal,
}

impl TimeFormat {
    pub(crate) fn to_wire(self) -> u8 {
        match self {
            TimeFormat::Binary => 0,
            TimeFormat::Decimal => 1,
        }
    }

    pub(crate) fn from_wire(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(TimeFormat::Binary),
            1 => Ok(TimeFormat::Decimal),
            _ => Err(Error::UnexpectedResponse("time_format")),
        }
    }
}

/// How the card steers its clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingMode {
    TimecodeInput = 0,
    FreeRunning = 1,
    Gps = 2,
    ExternalPps = 3,
}

impl TimingMode {
    fn from_wire(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(TimingMode::TimecodeInput),
            1 => Ok(TimingMode::FreeRunning),
            2 => Ok(TimingMode::Gps),
            3 => Ok(TimingMode::ExternalPps),
            _ => Err(Error::UnexpectedResponse("timing_mode")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSource {
    Internal = 0,
    External = 1,
}

impl ClockSource {
    fn from_wire(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(ClockSource::Internal),
            1 => Ok(ClockSource::External),
            _ => Err(Error::UnexpectedResponse("clock_source")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimecodeKind {
    IrigA = 0,
    IrigB = 1,
    Nasa36 = 2,
}

impl TimecodeKind {
    fn from_wire(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(TimecodeKind::IrigA),
            1 => Ok(TimecodeKind::IrigB),
            2 => Ok(TimecodeKind::Nasa36),
            _ => Err(Error::UnexpectedResponse("timecode_kind")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimecodeModulation {
    /// Amplitude-modulated sine carrier.
    Am = 0,
    /// DC level shift.
    Dcls = 1,
}

impl TimecodeModulation {
    fn from_wire(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(TimecodeModulation::Am),
            1 => Ok(TimecodeModulation::Dcls),
            _ => Err(Error::UnexpectedResponse("timecode_modulation")),
        }
    }
}

/// Time-code format plus subtype, used for both the reader and the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimecodeFormat {
    pub kind: TimecodeKind,
    pub modulation: TimecodeModulation,
}

/// Whole-hour offset with an independent half-hour flag. Magnitude is limited
/// to 16 hours by the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourOffset {
    pub hours: i8,
    pub half_hour: bool,
}

/// Divisors for the two heartbeat outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatDivisors {
    pub divisor1: u16,
    pub divisor2: u16,
}

/// Miscellaneous card flags packed into one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlFlags(u8);

impl ControlFlags {
    const DST_OBSERVED: u8 = 0x01;
    const LOCAL_TIME_OBSERVED: u8 = 0x02;

    pub fn new() -> Self {
        Self(0)
    }

    pub(crate) fn from_wire(byte: u8) -> Self {
        Self(byte)
    }

    pub fn raw(self) -> u8 {
        self.0
    }

    pub fn daylight_saving_observed(self) -> bool {
        self.0 & Self::DST_OBSERVED != 0
    }

    pub fn with_daylight_saving_observed(self, observed: bool) -> Self {
        self.with_bit(Self::DST_OBSERVED, observed)
    }

    pub fn local_time_observed(self) -> bool {
        self.0 & Self::LOCAL_TIME_OBSERVED != 0
    }

    pub fn with_local_time_observed(self, observed: bool) -> Self {
        self.with_bit(Self::LOCAL_TIME_OBSERVED, observed)
    }

    fn with_bit(self, mask: u8, set: bool) -> Self {
        if set {
            Self(self.0 | mask)
        } else {
            Self(self.0 & !mask)
        }
    }
}

/// Synchronization mode of the frequency synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthSyncMode {
    /// Output phase-locked to whole-cycle boundaries; only integer-related
    /// frequencies stay aligned.
    Integer = 0,
    /// Fractional resynchronization, safe for non-integer tuning words.
    Fractional = 1,
}

impl SynthSyncMode {
    fn from_wire(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(SynthSyncMode::Integer),
            1 => Ok(SynthSyncMode::Fractional),
            _ => Err(Error::UnexpectedResponse("synth_sync_mode")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthDividerSource {
    Oscillator = 0,
    Pps = 1,
    External = 2,
}

impl SynthDividerSource {
    fn from_wire(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(SynthDividerSource::Oscillator),
            1 => Ok(SynthDividerSource::Pps),
            2 => Ok(SynthDividerSource::External),
            _ => Err(Error::UnexpectedResponse("synth_divider_source")),
        }
    }
}

fn check_range(field: &'static str, value: i64, min: i64, max: i64) -> Result<()> {
    if value < min || value > max {
        return Err(Error::OutOfRange { field, value });
    }
    Ok(())
}

impl<C: DriverChannel> Device<C> {
    pub fn set_timing_mode(&mut self, mode: TimingMode) -> Result<()> {
        let mut block = CommandBlock::new(Opcode::TimingMode);
        block.push_u8(mode as u8);
        self.send(&block)
    }

    pub fn timing_mode(&mut self) -> Result<TimingMode> {
        let mut payload = [0u8; 1];
        self.request(Opcode::TimingMode, &mut payload)?;
        TimingMode::from_wire(payload[0])
    }

    pub fn set_time_format(&mut self, format: TimeFormat) -> Result<()> {
        let mut block = CommandBlock::new(Opcode::TimeFormat);
        block.push_u8(format.to_wire());
        self.send(&block)
    }

    pub fn time_format(&mut self) -> Result<TimeFormat> {
        let mut payload = [0u8; 1];
        self.request(Opcode::TimeFormat, &mut payload)?;
        TimeFormat::from_wire(payload[0])
    }

    pub fn set_timecode_input(&mut self, format: TimecodeFormat) -> Result<()> {
        let mut block = CommandBlock::new(Opcode::TimecodeInput);
        block.push_u8(format.kind as u8).push_u8(format.modulation as u8);
        self.send(&block)
    }

    pub fn timecode_input(&mut self) -> Result<TimecodeFormat> {
        self.timecode_format(Opcode::TimecodeInput)
    }

    pub fn set_timecode_output(&mut self, format: TimecodeFormat) -> Result<()> {
        let mut block = CommandBlock::new(Opcode::TimecodeOutput);
        block.push_u8(format.kind as u8).push_u8(format.modulation as u8);
        self.send(&block)
    }

    pub fn timecode_output(&mut self) -> Result<TimecodeFormat> {
        self.timecode_format(Opcode::TimecodeOutput)
    }

    fn timecode_format(&mut self, op: Opcode) -> Result<TimecodeFormat> {
        let mut payload = [0u8; 2];
        self.request(op, &mut payload)?;
        Ok(TimecodeFormat {
            kind: TimecodeKind::from_wire(payload[0])?,
            modulation: TimecodeModulation::from_wire(payload[1])?,
        })
    }

    pub fn set_clock_source(&mut self, source: ClockSource) -> Result<()> {
        let mut block = CommandBlock::new(Opcode::ClockSource);
        block.push_u8(source as u8);
        self.send(&block)
    }

    pub fn clock_source(&mut self) -> Result<ClockSource> {
        let mut payload = [0u8; 1];
        self.request(Opcode::ClockSource, &mut payload)?;
        ClockSource::from_wire(payload[0])
    }

    pub fn set_jam_sync_enabled(&mut self, enabled: bool) -> Result<()> {
        let mut block = CommandBlock::new(Opcode::JamSync);
        block.push_u8(u8::from(enabled));
        self.send(&block)
    }

    pub fn jam_sync_enabled(&mut self) -> Result<bool> {
        let mut payload = [0u8; 1];
        self.request(Opcode::JamSync, &mut payload)?;
        Ok(payload[0] != 0)
    }

    pub fn set_year(&mut self, year: u16) -> Result<()> {
        check_range("year", i64::from(year), 1990, 2036)?;
        let mut block = CommandBlock::new(Opcode::Year);
        block.push_u16(year);
        self.send(&block)
    }

    pub fn year(&mut self) -> Result<u16> {
        let mut payload = [0u8; 2];
        self.request(Opcode::Year, &mut payload)?;
        Ok(BigEndian::read_u16(&payload))
    }

    /// Pending leap-second event: -1 deletion, 0 none, 1 insertion.
    pub fn set_leap_second(&mut self, pending: i8) -> Result<()> {
        check_range("leap_second", i64::from(pending), -1, 1)?;
        let mut block = CommandBlock::new(Opcode::LeapSecond);
        block.push_i8(pending);
        self.send(&block)
    }

    pub fn leap_second(&mut self) -> Result<i8> {
        let mut payload = [0u8; 1];
        self.request(Opcode::LeapSecond, &mut payload)?;
        Ok(payload[0] as i8)
    }

    pub fn set_local_offset(&mut self, offset: HourOffset) -> Result<()> {
        self.set_hour_offset(Opcode::LocalOffset, "local_offset", offset)
    }

    pub fn local_offset(&mut self) -> Result<HourOffset> {
        self.hour_offset(Opcode::LocalOffset)
    }

    pub fn set_generator_offset(&mut self, offset: HourOffset) -> Result<()> {
        self.set_hour_offset(Opcode::GeneratorOffset, "generator_offset", offset)
    }

    pub fn generator_offset(&mut self) -> Result<HourOffset> {
        self.hour_offset(Opcode::GeneratorOffset)
    }

    fn set_hour_offset(
        &mut self,
        op: Opcode,
        field: &'static str,
        offset: HourOffset,
    ) -> Result<()> {
        check_range(field, i64::from(offset.hours), -16, 16)?;
        let mut block = CommandBlock::new(op);
        block.push_i8(offset.hours).push_u8(u8::from(offset.half_hour));
        self.send(&block)
    }

    fn hour_offset(&mut self, op: Opcode) -> Result<HourOffset> {
        let mut payload = [0u8; 2];
        self.request(op, &mut payload)?;
        Ok(HourOffset {
            hours: payload[0] as i8,
            half_hour: payload[1] != 0,
        })
    }

    /// Antenna/cable propagation delay, in hundreds of nanoseconds.
    pub fn set_propagation_delay(&mut self, delay: i32) -> Result<()> {
        let mut block = CommandBlock::new(Opcode::PropagationDelay);
        block.push_i32(delay);
        self.send(&block)
    }

    pub fn propagation_delay(&mut self) -> Result<i32> {
        let mut payload = [0u8; 4];
        self.request(Opcode::PropagationDelay, &mut payload)?;
        Ok(BigEndian::read_i32(&payload))
    }

    pub fn set_discipline_gain(&mut self, gain: i8) -> Result<()> {
        check_range("discipline_gain", i64::from(gain), -100, 100)?;
        let mut block = CommandBlock::new(Opcode::DisciplineGain);
        block.push_i8(gain);
        self.send(&block)
    }

    pub fn discipline_gain(&mut self) -> Result<i8> {
        let mut payload = [0u8; 1];
        self.request(Opcode::DisciplineGain, &mut payload)?;
        Ok(payload[0] as i8)
    }

    /// Raw oscillator steering DAC value.
    pub fn set_dac_value(&mut self, value: u16) -> Result<()> {
        let mut block = CommandBlock::new(Opcode::DacValue);
        block.push_u16(value);
        self.send(&block)
    }

    pub fn dac_value(&mut self) -> Result<u16> {
        let mut payload = [0u8; 2];
        self.request(Opcode::DacValue, &mut payload)?;
        Ok(BigEndian::read_u16(&payload))
    }

    pub fn set_heartbeat_divisors(&mut self, divisors: HeartbeatDivisors) -> Result<()> {
        let mut block = CommandBlock::new(Opcode::HeartbeatDivisors);
        block.push_u16(divisors.divisor1).push_u16(divisors.divisor2);
        self.send(&block)
    }

    pub fn heartbeat_divisors(&mut self) -> Result<HeartbeatDivisors> {
        let mut payload = [0u8; 4];
        self.request(Opcode::HeartbeatDivisors, &mut payload)?;
        Ok(HeartbeatDivisors {
            divisor1: BigEndian::read_u16(&payload[0..2]),
            divisor2: BigEndian::read_u16(&payload[2..4]),
        })
    }

    pub fn set_control_flags(&mut self, flags: ControlFlags) -> Result<()> {
        let mut block = CommandBlock::new(Opcode::ControlFlags);
        block.push_u8(flags.raw());
        self.send(&block)
    }

    pub fn control_flags(&mut self) -> Result<ControlFlags> {
        let mut payload = [0u8; 1];
        self.request(Opcode::ControlFlags, &mut payload)?;
        Ok(ControlFlags::from_wire(payload[0]))
    }

    pub fn set_synth_output_enabled(&mut self, enabled: bool) -> Result<()> {
        let mut block = CommandBlock::new(Opcode::SynthOutput);
        block.push_u8(u8::from(enabled));
        self.send(&block)
    }

    pub fn synth_output_enabled(&mut self) -> Result<bool> {
        let mut payload = [0u8; 1];
        self.request(Opcode::SynthOutput, &mut payload)?;
        Ok(payload[0] != 0)
    }

    pub fn set_synth_sync_mode(&mut self, mode: SynthSyncMode) -> Result<()> {
        let mut block = CommandBlock::new(Opcode::SynthSyncMode);
        block.push_u8(mode as u8);
        self.send(&block)
    }

    pub fn synth_sync_mode(&mut self) -> Result<SynthSyncMode> {
        let mut payload = [0u8; 1];
        self.request(Opcode::SynthSyncMode, &mut payload)?;
        SynthSyncMode::from_wire(payload[0])
    }

    pub fn set_synth_divider_source(&mut self, source: SynthDividerSource) -> Result<()> {
        let mut block = CommandBlock::new(Opcode::SynthDividerSource);
        block.push_u8(source as u8);
        self.send(&block)
    }

    pub fn synth_divider_source(&mut self) -> Result<SynthDividerSource> {
        let mut payload = [0u8; 1];
        self.request(Opcode::SynthDividerSource, &mut payload)?;
        SynthDividerSource::from_wire(payload[0])
    }

    pub fn set_synth_multiplier(&mut self, multiplier: u8) -> Result<()> {
        check_range("synth_multiplier", i64::from(multiplier), 0, 10)?;
        let mut block = CommandBlock::new(Opcode::SynthMultiplier);
        block.push_u8(multiplier);
        self.send(&block)
    }

    pub fn synth_multiplier(&mut self) -> Result<u8> {
        let mut payload = [0u8; 1];
        self.request(Opcode::SynthMultiplier, &mut payload)?;
        Ok(payload[0])
    }

    pub fn set_synth_period(&mut self, period: u16) -> Result<()> {
        let mut block = CommandBlock::new(Opcode::SynthPeriod);
        block.push_u16(period);
        self.send(&block)
    }

    pub fn synth_period(&mut self) -> Result<u16> {
        let mut payload = [0u8; 2];
        self.request(Opcode::SynthPeriod, &mut payload)?;
        Ok(BigEndian::read_u16(&payload))
    }

    pub fn set_synth_tuning_word(&mut self, word: u32) -> Result<()> {
        let mut block = CommandBlock::new(Opcode::SynthTuningWord);
        block.push_u32(word);
        self.send(&block)
    }

    pub fn synth_tuning_word(&mut self) -> Result<u32> {
        let mut payload = [0u8; 4];
        self.request(Opcode::SynthTuningWord, &mut payload)?;
        Ok(BigEndian::read_u32(&payload))
    }

    /// Programs the synthesizer output frequency.
    ///
    /// Compound operation in a fixed order: enable the synthesizer output,
    /// select fractional sync mode (integer mode would drift for non-integer
    /// tuning words), then load `tuning_word = floor(frequency_hz * 32)`. The
    /// first failing step aborts the remainder.
    pub fn set_frequency(&mut self, frequency_hz: f64) -> Result<()> {
        if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
            return Err(Error::OutOfRange {
                field: "frequency_hz",
                value: frequency_hz as i64,
            });
        }
        let tuning = (frequency_hz * 32.0).floor();
        if tuning > f64::from(u32::MAX) {
            return Err(Error::OutOfRange {
                field: "frequency_hz",
                value: frequency_hz as i64,
            });
        }

        self.set_synth_output_enabled(true)?;
        self.set_synth_sync_mode(SynthSyncMode::Fractional)?;
        self.set_synth_tuning_word(tuning as u32)
    }
}

/// Operations present in the firmware command set but rejected by this
/// hardware revision. They route through the same opcode table as everything
/// else, so they fail deterministically before any driver interaction and can
/// never partially succeed.
impl<C: DriverChannel> Device<C> {
    pub fn dual_port_read(&mut self, address: u8) -> Result<u8> {
        let mut payload = [0u8; 1];
        self.request_with(Opcode::DualPortRead, &[address], &mut payload)?;
        Ok(payload[0])
    }

    pub fn dual_port_write(&mut self, address: u8, value: u8) -> Result<()> {
        let mut block = CommandBlock::new(Opcode::DualPortWrite);
        block.push_u8(address).push_u8(value);
        self.send(&block)
    }

    pub fn gps_packet_request(&mut self, packet_id: u8) -> Result<[u8; 4]> {
        let mut payload = [0u8; 4];
        self.request_with(Opcode::GpsPacketRequest, &[packet_id], &mut payload)?;
        Ok(payload)
    }

    pub fn gps_packet_send(&mut self, packet: [u8; 4]) -> Result<()> {
        let mut block = CommandBlock::new(Opcode::GpsPacketSend);
        for byte in packet {
            block.push_u8(byte);
        }
        self.send(&block)
    }

    pub fn gps_packet_manage(&mut self, enabled: bool) -> Result<()> {
        let mut block = CommandBlock::new(Opcode::GpsPacketManage);
        block.push_u8(u8::from(enabled));
        self.send(&block)
    }

    pub fn oscillator_data(&mut self) -> Result<u32> {
        let mut payload = [0u8; 4];
        self.request(Opcode::OscillatorData, &mut payload)?;
        Ok(BigEndian::read_u32(&payload))
    }

    pub fn timecode_data(&mut self) -> Result<[u8; 2]> {
        let mut payload = [0u8; 2];
        self.request(Opcode::TimecodeData, &mut payload)?;
        Ok(payload)
    }

    pub fn other_data(&mut self) -> Result<[u8; 4]> {
        let mut payload = [0u8; 4];
        self.request(Opcode::OtherData, &mut payload)?;
        Ok(payload)
    }

    pub fn version_info(&mut self) -> Result<(u8, u8)> {
        let mut payload = [0u8; 2];
        self.request(Opcode::VersionInfo, &mut payload)?;
        Ok((payload[0], payload[1]))
    }

    pub fn interrupt_start(&mut self, mask: u8) -> Result<()> {
        let mut block = CommandBlock::new(Opcode::InterruptStart);
        block.push_u8(mask);
        self.send(&block)
    }

    pub fn interrupt_stop(&mut self) -> Result<()> {
        let mut block = CommandBlock::new(Opcode::InterruptStop);
        block.push_u8(0);
        self.send(&block)
    }

    pub fn interrupt_mask(&mut self, mask: u8) -> Result<()> {
        let mut block = CommandBlock::new(Opcode::InterruptMask);
        block.push_u8(mask);
        self.send(&block)
    }

    /// Gradual clock slew, in hundreds of nanoseconds.
    pub fn adjust_clock(&mut self, offset: i32) -> Result<()> {
        let mut block = CommandBlock::new(Opcode::AdjustClock);
        block.push_i32(offset);
        self.send(&block)
    }

    pub fn discipline_enable(&mut self) -> Result<()> {
        let mut block = CommandBlock::new(Opcode::DisciplineEnable);
        block.push_u8(1);
        self.send(&block)
    }

    pub fn discipline_disable(&mut self) -> Result<()> {
        let mut block = CommandBlock::new(Opcode::DisciplineDisable);
        block.push_u8(0);
        self.send(&block)
    }
}
