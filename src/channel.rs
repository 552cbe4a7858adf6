use crate::constants::MAX_BLOCK_LEN;
use crate::error::{Error, Result};
use std::fs::{File, OpenOptions};
use std::os::fd::AsRawFd;
use std::path::Path;

/// Request/response boundary to the kernel driver.
///
/// The protocol engine only ever talks to this trait, so the whole command
/// layer can be exercised against a recording mock. `send` submits a
/// write-style block and returns the driver's status verbatim; `transact`
/// submits a request block and fills `reply` from the driver's response.
pub trait DriverChannel {
    fn send(&mut self, block: &[u8]) -> Result<()>;
    fn transact(&mut self, request: &[u8], reply: &mut [u8]) -> Result<()>;
    fn read_register(&mut self, offset: u8) -> Result<u32>;
    fn write_register(&mut self, offset: u8, word: u32) -> Result<()>;
}

mod ioctl {
    use super::MAX_BLOCK_LEN;

    const TFP_IOC_MAGIC: u8 = b'T';

    #[repr(C)]
    pub struct CommandArg {
        pub len: u32,
        pub block: [u8; MAX_BLOCK_LEN],
    }

    #[repr(C)]
    pub struct TransactArg {
        pub request_len: u32,
        pub reply_len: u32,
        pub request: [u8; MAX_BLOCK_LEN],
        pub reply: [u8; MAX_BLOCK_LEN],
    }

    #[repr(C)]
    pub struct RegisterArg {
        pub offset: u32,
        pub value: u32,
    }

    nix::ioctl_write_ptr!(tfp_command, TFP_IOC_MAGIC, 0x01, CommandArg);
    nix::ioctl_readwrite!(tfp_transact, TFP_IOC_MAGIC, 0x02, TransactArg);
    nix::ioctl_readwrite!(tfp_register_read, TFP_IOC_MAGIC, 0x03, RegisterArg);
    nix::ioctl_write_ptr!(tfp_register_write, TFP_IOC_MAGIC, 0x04, RegisterArg);
}

/// Channel backed by the driver's character device node.
pub struct CharDeviceChannel {
    file: File,
}

impl CharDeviceChannel {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|_| Error::DeviceUnavailable {
                path: path.display().to_string(),
            })?;
        Ok(Self { file })
    }

    fn fd(&self) -> i32 {
        self.file.as_raw_fd()
    }
}

impl DriverChannel for CharDeviceChannel {
    fn send(&mut self, block: &[u8]) -> Result<()> {
        debug_assert!(block.len() <= MAX_BLOCK_LEN);
        let mut arg = ioctl::CommandArg {
            len: block.len() as u32,
            block: [0u8; MAX_BLOCK_LEN],
        };
        arg.block[..block.len()].copy_from_slice(block);
        unsafe { ioctl::tfp_command(self.fd(), &arg) }
            .map_err(|err| driver_error(err, "tfp_command"))?;
        Ok(())
    }

    fn transact(&mut self, request: &[u8], reply: &mut [u8]) -> Result<()> {
        debug_assert!(request.len() <= MAX_BLOCK_LEN && reply.len() <= MAX_BLOCK_LEN);
        let mut arg = ioctl::TransactArg {
            request_len: request.len() as u32,
            reply_len: reply.len() as u32,
            request: [0u8; MAX_BLOCK_LEN],
            reply: [0u8; MAX_BLOCK_LEN],
        };
        arg.request[..request.len()].copy_from_slice(request);
        unsafe { ioctl::tfp_transact(self.fd(), &mut arg) }
            .map_err(|err| driver_error(err, "tfp_transact"))?;

        let returned = arg.reply_len as usize;
        if returned < reply.len() {
            return Err(Error::ShortReply {
                expected: reply.len(),
                actual: returned,
            });
        }
        reply.copy_from_slice(&arg.reply[..reply.len()]);
        Ok(())
    }

    fn read_register(&mut self, offset: u8) -> Result<u32> {
        let mut arg = ioctl::RegisterArg {
            offset: u32::from(offset),
            value: 0,
        };
        unsafe { ioctl::tfp_register_read(self.fd(), &mut arg) }
            .map_err(|err| driver_error(err, "tfp_register_read"))?;
        Ok(arg.value)
    }

    fn write_register(&mut self, offset: u8, word: u32) -> Result<()> {
        let arg = ioctl::RegisterArg {
            offset: u32::from(offset),
            value: word,
        };
        unsafe { ioctl::tfp_register_write(self.fd(), &arg) }
            .map_err(|err| driver_error(err, "tfp_register_write"))?;
        Ok(())
    }
}

fn driver_error(err: nix::errno::Errno, context: &'static str) -> Error {
    Error::Driver {
        source: err,
        context,
    }
}
