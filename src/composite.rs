//! Aggregate queries built from the primitive commands.
//!
//! Nothing wraps these sequences in a snapshot or lock; the card can be
//! reconfigured between component calls, and a caller doing that from another
//! process can observe a torn mix. The single-owner-per-process model makes
//! this an accepted limitation.

use crate::channel::DriverChannel;
use crate::commands::{HourOffset, TimeFormat, TimingMode};
use crate::device::Device;
use crate::error::Result;

/// One-call summary of the card's timekeeping configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeState {
    pub timing_mode: TimingMode,
    pub time_format: TimeFormat,
    pub year: u16,
    /// Pending leap-second event: -1 deletion, 0 none, 1 insertion.
    pub leap_second: i8,
    pub local_offset: HourOffset,
    /// Hundreds of nanoseconds.
    pub propagation_delay: i32,
    pub daylight_saving_observed: bool,
    pub local_time_observed: bool,
}

impl<C: DriverChannel> Device<C> {
    /// Queries the aggregate time state, left to right, stopping at the first
    /// failing sub-query.
    pub fn time_state(&mut self) -> Result<TimeState> {
        let timing_mode = self.timing_mode()?;
        let time_format = self.time_format()?;
        let year = self.year()?;
        let leap_second = self.leap_second()?;
        let local_offset = self.local_offset()?;
        let propagation_delay = self.propagation_delay()?;
        let flags = self.control_flags()?;

        Ok(TimeState {
            timing_mode,
            time_format,
            year,
            leap_second,
            local_offset,
            propagation_delay,
            daylight_saving_observed: flags.daylight_saving_observed(),
            local_time_observed: flags.local_time_observed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::testing::MockChannel;
    use crate::commands::ControlFlags;
    use crate::constants::Opcode;
    use crate::error::Error;

    #[test]
    fn time_state_aggregates_all_sub_queries() {
        let mut device = Device::with_channel(MockChannel::new());
        device.set_timing_mode(TimingMode::Gps).unwrap();
        device.set_time_format(TimeFormat::Binary).unwrap();
        device.set_year(2025).unwrap();
        device.set_leap_second(1).unwrap();
        device
            .set_local_offset(HourOffset {
                hours: 5,
                half_hour: true,
            })
            .unwrap();
        device.set_propagation_delay(-250).unwrap();
        device
            .set_control_flags(ControlFlags::new().with_local_time_observed(true))
            .unwrap();

        let state = device.time_state().unwrap();
        assert_eq!(
            state,
            TimeState {
                timing_mode: TimingMode::Gps,
                time_format: TimeFormat::Binary,
                year: 2025,
                leap_second: 1,
                local_offset: HourOffset {
                    hours: 5,
                    half_hour: true,
                },
                propagation_delay: -250,
                daylight_saving_observed: false,
                local_time_observed: true,
            }
        );
    }

    #[test]
    fn time_state_stops_at_first_failing_sub_query() {
        let mut device = Device::with_channel(MockChannel::new());
        device
            .channel_for_tests()
            .failing
            .insert(Opcode::Year.id());

        assert!(matches!(device.time_state(), Err(Error::Driver { .. })));

        // Mode and format were queried, year failed, nothing after it ran.
        let channel = device.channel_for_tests();
        assert_eq!(
            channel.requests,
            vec![
                Opcode::TimingMode.id(),
                Opcode::TimeFormat.id(),
                Opcode::Year.id(),
            ]
        );
    }
}
