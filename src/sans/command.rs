//! Encoding of the commands that switch a device into streaming mode.
//!
//! Commands share the data frames' `A5 5A` marker. The length byte counts
//! itself, the payload, the checksum and the `AA` terminator; the checksum is
//! the sum of the length byte and the payload modulo 256.

use thiserror::Error;

use super::check::compute_sum;

const HEADER: [u8; 2] = [0xA5, 0x5A];
const TERMINATOR: u8 = 0xAA;

/// An error encoding a command.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// The device only accepts rates of 10 to 100 Hz in steps of 10.
    #[error("Unsupported output rate ({0} Hz).")]
    UnsupportedRate(u8),
}

/// A device command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Stop continuous output.
    Stop,
    /// Start continuous output.
    StartStream,
    /// Set the output rate in Hz.
    OutputRate(u8),
}

impl Command {
    /// Encode this command for transmission.
    pub fn encode(self) -> Result<Encoded, CommandError> {
        let mut payload = [0; 2];
        let payload = match self {
            Self::Stop => {
                payload[0] = 0x02;
                &payload[..1]
            }
            Self::StartStream => {
                payload[0] = 0x01;
                &payload[..1]
            }
            Self::OutputRate(hz) => {
                if hz == 0 || hz > 100 || hz % 10 != 0 {
                    Err(CommandError::UnsupportedRate(hz))?;
                }
                payload = [0xA8, hz];
                &payload[..]
            }
        };

        let length = payload.len() as u8 + 3;

        let mut buf = [0; Encoded::CAPACITY];
        buf[..2].copy_from_slice(&HEADER);
        buf[2] = length;
        buf[3..3 + payload.len()].copy_from_slice(payload);
        buf[3 + payload.len()] = compute_sum(&buf[2..3 + payload.len()]);
        buf[4 + payload.len()] = TERMINATOR;

        Ok(Encoded {
            buf,
            len: payload.len() + 5,
        })
    }
}

/// An encoded command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoded {
    buf: [u8; Self::CAPACITY],
    len: usize,
}

impl Encoded {
    const CAPACITY: usize = 7;
}

impl AsRef<[u8]> for Encoded {
    fn as_ref(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}
