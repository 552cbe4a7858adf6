use crate::commands::TimeFormat;
use nix::errno::Errno;
use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    DeviceNotOpen,
    DeviceUnavailable {
        path: String,
    },
    OutOfRange {
        field: &'static str,
        value: i64,
    },
    Unsupported(&'static str),
    EchoMismatch {
        requested: u8,
        received: u8,
    },
    FormatMismatch {
        expected: TimeFormat,
        actual: TimeFormat,
    },
    ShortReply {
        expected: usize,
        actual: usize,
    },
    UnexpectedResponse(&'static str),
    Driver {
        source: Errno,
        context: &'static str,
    },
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DeviceNotOpen => write!(f, "device is not open"),
            Error::DeviceUnavailable { path } => {
                write!(f, "timing card at `{path}` is unavailable")
            }
            Error::OutOfRange { field, value } => {
                write!(f, "value {value} is out of range for `{field}`")
            }
            Error::Unsupported(op) => write!(
                f,
                "operation `{op}` is not implemented on this hardware revision"
            ),
            Error::EchoMismatch {
                requested,
                received,
            } => write!(
                f,
                "reply echoed subcommand {received:#04x} but {requested:#04x} was requested"
            ),
            Error::FormatMismatch { expected, actual } => write!(
                f,
                "time register format mismatch (expected {expected:?}, card reports {actual:?})"
            ),
            Error::ShortReply { expected, actual } => {
                write!(f, "driver returned {actual} reply bytes, expected {expected}")
            }
            Error::UnexpectedResponse(context) => {
                write!(f, "unexpected response during `{context}`")
            }
            Error::Driver { source, context } => {
                write!(f, "driver error {source} in `{context}`")
            }
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Driver { source, .. } => Some(source),
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
