//! Numeric contract shared with the card firmware and the kernel driver.
//!
//! Command ids, request-data subcommand ids, payload sizes and the capture
//! register map are fixed by the hardware; none of these values are free to
//! change.

/// Command byte selecting a read-style operation; byte 1 of the block names
/// the subcommand, and the reply echoes that subcommand in byte 0.
pub const CMD_REQUEST_DATA: u8 = 0x40;

/// Largest command or reply block the driver accepts, command byte included.
pub const MAX_BLOCK_LEN: usize = 6;

/// Character device node the kernel driver registers for the first card.
pub const DEFAULT_DEVICE_PATH: &str = "/dev/tfp0";

/// Latched capture register pairs, one word0/word1 pair per channel.
pub const REG_TIME0: u8 = 0x20;
pub const REG_TIME1: u8 = 0x21;
pub const REG_EVENT2_TIME0: u8 = 0x24;
pub const REG_EVENT2_TIME1: u8 = 0x25;
pub const REG_EVENT3_TIME0: u8 = 0x28;
pub const REG_EVENT3_TIME1: u8 = 0x29;

/// Every protocol operation the card knows about.
///
/// Configuration opcodes double as request-data subcommand ids, so a getter's
/// echo check compares against the same id its setter writes. Entries at
/// `0x50` and above exist in the firmware command set but are rejected by this
/// hardware revision; [`Opcode::is_supported`] keeps them as always-failing
/// leaves of the one dispatch table instead of hand-written stubs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    TimingMode = 0x10,
    TimeFormat = 0x11,
    TimecodeInput = 0x12,
    TimecodeOutput = 0x13,
    ClockSource = 0x14,
    JamSync = 0x15,
    Year = 0x16,
    LeapSecond = 0x17,
    LocalOffset = 0x18,
    GeneratorOffset = 0x19,
    PropagationDelay = 0x1a,
    DisciplineGain = 0x1b,
    DacValue = 0x1c,
    HeartbeatDivisors = 0x1d,
    ControlFlags = 0x1e,
    SynthOutput = 0x20,
    SynthSyncMode = 0x21,
    SynthDividerSource = 0x22,
    SynthMultiplier = 0x23,
    SynthPeriod = 0x24,
    SynthTuningWord = 0x25,
    LatchTime = 0x30,
    DualPortRead = 0x50,
    DualPortWrite = 0x51,
    GpsPacketRequest = 0x52,
    GpsPacketSend = 0x53,
    GpsPacketManage = 0x54,
    OscillatorData = 0x55,
    TimecodeData = 0x56,
    OtherData = 0x57,
    VersionInfo = 0x58,
    InterruptStart = 0x59,
    InterruptStop = 0x5a,
    InterruptMask = 0x5b,
    AdjustClock = 0x5c,
    DisciplineEnable = 0x5d,
    DisciplineDisable = 0x5e,
}

impl Opcode {
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Payload bytes following the command or echo byte. The driver rejects
    /// blocks whose length does not match this exactly.
    pub const fn payload_len(self) -> usize {
        match self {
            Opcode::TimingMode
            | Opcode::TimeFormat
            | Opcode::ClockSource
            | Opcode::JamSync
            | Opcode::LeapSecond
            | Opcode::DisciplineGain
            | Opcode::ControlFlags
            | Opcode::SynthOutput
            | Opcode::SynthSyncMode
            | Opcode::SynthDividerSource
            | Opcode::SynthMultiplier
            | Opcode::LatchTime
            | Opcode::DualPortRead
            | Opcode::GpsPacketManage
            | Opcode::InterruptStart
            | Opcode::InterruptStop
            | Opcode::InterruptMask
            | Opcode::DisciplineEnable
            | Opcode::DisciplineDisable => 1,
            Opcode::TimecodeInput
            | Opcode::TimecodeOutput
            | Opcode::Year
            | Opcode::LocalOffset
            | Opcode::GeneratorOffset
            | Opcode::DacValue
            | Opcode::SynthPeriod
            | Opcode::DualPortWrite
            | Opcode::TimecodeData
            | Opcode::VersionInfo => 2,
            Opcode::PropagationDelay
            | Opcode::HeartbeatDivisors
            | Opcode::SynthTuningWord
            | Opcode::GpsPacketRequest
            | Opcode::GpsPacketSend
            | Opcode::OscillatorData
            | Opcode::OtherData
            | Opcode::AdjustClock => 4,
        }
    }

    /// Whether this hardware revision implements the operation.
    pub const fn is_supported(self) -> bool {
        (self as u8) < 0x50
    }

    pub const fn name(self) -> &'static str {
        match self {
            Opcode::TimingMode => "timing_mode",
            Opcode::TimeFormat => "time_format",
            Opcode::TimecodeInput => "timecode_input",
            Opcode::TimecodeOutput => "timecode_output",
            Opcode::ClockSource => "clock_source",
            Opcode::JamSync => "jam_sync",
            Opcode::Year => "year",
            Opcode::LeapSecond => "leap_second",
            Opcode::LocalOffset => "local_offset",
            Opcode::GeneratorOffset => "generator_offset",
            Opcode::PropagationDelay => "propagation_delay",
            Opcode::DisciplineGain => "discipline_gain",
            Opcode::DacValue => "dac_value",
            Opcode::HeartbeatDivisors => "heartbeat_divisors",
            Opcode::ControlFlags => "control_flags",
            Opcode::SynthOutput => "synth_output",
            Opcode::SynthSyncMode => "synth_sync_mode",
            Opcode::SynthDividerSource => "synth_divider_source",
            Opcode::SynthMultiplier => "synth_multiplier",
            Opcode::SynthPeriod => "synth_period",
            Opcode::SynthTuningWord => "synth_tuning_word",
            Opcode::LatchTime => "latch_time",
            Opcode::DualPortRead => "dual_port_read",
            Opcode::DualPortWrite => "dual_port_write",
            Opcode::GpsPacketRequest => "gps_packet_request",
            Opcode::GpsPacketSend => "gps_packet_send",
            Opcode::GpsPacketManage => "gps_packet_manage",
            Opcode::OscillatorData => "oscillator_data",
            Opcode::TimecodeData => "timecode_data",
            Opcode::OtherData => "other_data",
            Opcode::VersionInfo => "version_info",
            Opcode::InterruptStart => "interrupt_start",
            Opcode::InterruptStop => "interrupt_stop",
            Opcode::InterruptMask => "interrupt_mask",
            Opcode::AdjustClock => "adjust_clock",
            Opcode::DisciplineEnable => "discipline_enable",
            Opcode::DisciplineDisable => "discipline_disable",
        }
    }
}
