use crate::channel::{CharDeviceChannel, DriverChannel};
use crate::constants::{self, Opcode};
use crate::error::{Error, Result};
use crate::wire::CommandBlock;
use tracing::{debug, trace};

/// Diagnostic detail emitted while dispatching protocol operations.
///
/// Carried on the handle rather than in process-global state; levels above
/// `Silent` gate `tracing` events of increasing granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Silent,
    Errors,
    Commands,
    Wire,
}

impl Verbosity {
    /// Maps the card API's numeric levels 0..=3; higher values clamp to
    /// [`Verbosity::Wire`].
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => Verbosity::Silent,
            1 => Verbosity::Errors,
            2 => Verbosity::Commands,
            _ => Verbosity::Wire,
        }
    }

    pub fn level(self) -> u8 {
        self as u8
    }
}

/// Handle to one timing card.
///
/// Owns the driver channel exclusively; `&mut self` on every protocol
/// operation makes the single-user rule a compile-time property within a
/// process. Multi-threaded callers serialize around the handle externally.
/// Calls block until the driver responds; no timeout is applied at this
/// layer.
pub struct Device<C = CharDeviceChannel> {
    channel: Option<C>,
    verbosity: Verbosity,
}

impl Device<CharDeviceChannel> {
    /// Opens the first card at [`constants::DEFAULT_DEVICE_PATH`].
    pub fn open() -> Result<Self> {
        Self::open_path(constants::DEFAULT_DEVICE_PATH)
    }

    pub fn open_path(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Ok(Self {
            channel: Some(CharDeviceChannel::open(path)?),
            verbosity: Verbosity::Silent,
        })
    }
}

impl<C: DriverChannel> Device<C> {
    /// Wraps an already-constructed channel. This is the seam the test suite
    /// uses to drive the protocol against a recording mock.
    pub fn with_channel(channel: C) -> Self {
        Self {
            channel: Some(channel),
            verbosity: Verbosity::Silent,
        }
    }

    pub fn is_open(&self) -> bool {
        self.channel.is_some()
    }

    /// Releases the device unconditionally. Dropping the channel closes the
    /// underlying descriptor; subsequent operations fail with
    /// [`Error::DeviceNotOpen`] without touching the driver.
    pub fn close(&mut self) {
        self.channel = None;
    }

    pub fn set_verbosity(&mut self, level: u8) {
        self.verbosity = Verbosity::from_level(level);
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Raw indexed read of a 32-bit card register. The offset space is 8
    /// bits; no range check is applied beyond what the driver enforces.
    pub fn read_register(&mut self, offset: u8) -> Result<u32> {
        let word = self.channel_mut()?.read_register(offset)?;
        if self.verbosity >= Verbosity::Wire {
            trace!(offset, word, "register read");
        }
        Ok(word)
    }

    pub fn write_register(&mut self, offset: u8, word: u32) -> Result<()> {
        if self.verbosity >= Verbosity::Wire {
            trace!(offset, word, "register write");
        }
        self.channel_mut()?.write_register(offset, word)
    }

    fn channel_mut(&mut self) -> Result<&mut C> {
        self.channel.as_mut().ok_or(Error::DeviceNotOpen)
    }

    /// Submits a write-style block. The driver's status is the result
    /// verbatim; no reply is read back.
    pub(crate) fn send(&mut self, block: &CommandBlock) -> Result<()> {
        let op = block.opcode();
        if !op.is_supported() {
            return Err(Error::Unsupported(op.name()));
        }
        let verbosity = self.verbosity;
        let channel = self.channel_mut()?;
        if verbosity >= Verbosity::Commands {
            debug!(command = op.name(), "issuing command");
        }
        if verbosity >= Verbosity::Wire {
            trace!(block = ?block.as_bytes(), "tx");
        }
        channel.send(block.as_bytes())
    }

    /// Read-style dispatch: `[CMD_REQUEST_DATA, subcmd, args..]` out, echoed
    /// subcommand plus payload back. A reply is trusted only if its echo byte
    /// matches the requested subcommand; a mismatch fails even when the
    /// channel itself reported success.
    pub(crate) fn request_with(
        &mut self,
        op: Opcode,
        args: &[u8],
        reply: &mut [u8],
    ) -> Result<()> {
        if !op.is_supported() {
            return Err(Error::Unsupported(op.name()));
        }
        debug_assert!(2 + args.len() <= constants::MAX_BLOCK_LEN);
        debug_assert_eq!(reply.len(), op.payload_len());

        let verbosity = self.verbosity;
        let channel = self.channel_mut()?;

        let mut request = [0u8; constants::MAX_BLOCK_LEN];
        request[0] = constants::CMD_REQUEST_DATA;
        request[1] = op.id();
        request[2..2 + args.len()].copy_from_slice(args);
        let request = &request[..2 + args.len()];

        if verbosity >= Verbosity::Commands {
            debug!(subcommand = op.name(), "requesting data");
        }
        if verbosity >= Verbosity::Wire {
            trace!(block = ?request, "tx");
        }

        let mut buf = [0u8; constants::MAX_BLOCK_LEN];
        let total = 1 + reply.len();
        channel.transact(request, &mut buf[..total])?;

        if verbosity >= Verbosity::Wire {
            trace!(block = ?&buf[..total], "rx");
        }
        if buf[0] != op.id() {
            return Err(Error::EchoMismatch {
                requested: op.id(),
                received: buf[0],
            });
        }
        reply.copy_from_slice(&buf[1..total]);
        Ok(())
    }

    pub(crate) fn request(&mut self, op: Opcode, reply: &mut [u8]) -> Result<()> {
        self.request_with(op, &[], reply)
    }

    #[cfg(test)]
    pub(crate) fn channel_for_tests(&mut self) -> &mut C {
        self.channel.as_mut().expect("device closed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::testing::MockChannel;

    #[test]
    fn closed_device_fails_fast_without_io() {
        let mut device = Device::with_channel(MockChannel::new());
        device.close();
        assert!(!device.is_open());
        assert!(matches!(device.year(), Err(Error::DeviceNotOpen)));
        assert!(matches!(device.read_register(0x20), Err(Error::DeviceNotOpen)));
    }

    #[test]
    fn verbosity_levels_clamp_to_wire() {
        let mut device = Device::with_channel(MockChannel::new());
        assert_eq!(device.verbosity(), Verbosity::Silent);
        device.set_verbosity(2);
        assert_eq!(device.verbosity(), Verbosity::Commands);
        device.set_verbosity(9);
        assert_eq!(device.verbosity(), Verbosity::Wire);
        assert_eq!(device.verbosity().level(), 3);
    }

    #[test]
    fn echo_mismatch_fails_despite_channel_success() {
        let mut channel = MockChannel::new();
        channel.forced_echo = Some(0x7f);
        let mut device = Device::with_channel(channel);
        assert!(matches!(
            device.year(),
            Err(Error::EchoMismatch {
                requested: 0x16,
                received: 0x7f,
            })
        ));
    }

    #[test]
    fn register_access_passes_through() {
        let mut channel = MockChannel::new();
        channel.registers.insert(0x31, 0xdead_beef);
        let mut device = Device::with_channel(channel);
        assert_eq!(device.read_register(0x31).unwrap(), 0xdead_beef);
        device.write_register(0x32, 7).unwrap();
        assert_eq!(device.read_register(0x32).unwrap(), 7);
    }
}
