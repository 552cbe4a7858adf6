//! # tfp-rs
//!
//! Rust driver for GPS/IRIG-disciplined time and frequency processor cards.
//! The crate talks to the card through its kernel driver's character device
//! and exposes the card's two-tier command/subcommand protocol as typed
//! methods on [`Device`]: configuration setters and getters, latched time
//! capture on three channels, and aggregate queries. The following example
//! opens the first card, checks its year, and captures the current time:
//!
//! ```no_run
//! use tfp_rs::{CaptureChannel, Device, Result};
//!
//! fn main() -> Result<()> {
//!     let mut device = Device::open()?;
//!
//!     device.set_year(2025)?;
//!     let time = device.read_time(CaptureChannel::Primary)?;
//!     println!(
//!         "{}.{:06}{:03} flywheel={}",
//!         time.seconds,
//!         time.microseconds,
//!         time.nanoseconds,
//!         time.status.is_flywheeling()
//!     );
//!
//!     device.close();
//!     Ok(())
//! }
//! ```
//!
//! Programming the frequency synthesizer is one call; the enable, sync-mode
//! and tuning-word commands are sequenced internally:
//!
//! ```no_run
//! use tfp_rs::{Device, Result};
//!
//! fn main() -> Result<()> {
//!     let mut device = Device::open()?;
//!     device.set_frequency(10_000_000.0)?;
//!     Ok(())
//! }
//! ```
//!
//! Both examples are tagged with `no_run`, so they compile during `cargo test`
//! but do not touch live hardware.
pub mod constants;

mod capture;
mod channel;
mod commands;
mod composite;
mod device;
mod error;
mod wire;

pub use capture::{BinaryTime, CaptureChannel, CaptureStatus, DecimalTime};
pub use channel::{CharDeviceChannel, DriverChannel};
pub use commands::{
    ClockSource, ControlFlags, HeartbeatDivisors, HourOffset, SynthDividerSource, SynthSyncMode,
    TimeFormat, TimecodeFormat, TimecodeKind, TimecodeModulation, TimingMode,
};
pub use composite::TimeState;
pub use device::{Device, Verbosity};
pub use error::{Error, Result};
