//! Helpers for the additive checksums guarding each frame.

use thiserror::Error;

/// Calculated and found checksum values do not match.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Calculated ({calculated}) and found ({found}) checksum values do not match.")]
pub struct ChecksumMismatch {
    pub found: u8,
    pub calculated: u16,
}

/// A checksum policy.
///
/// Bytes from `start` up to the checksum byte are summed modulo 256, then
/// `bias` is added without wrapping (a sum of 255 with a bias of one can never
/// match). The checksum byte is the last byte of the frame, or the one before
/// a fixed trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checksum {
    pub start: usize,
    pub bias: u8,
    pub trailer: Option<u8>,
}

impl Checksum {
    /// Position of the checksum byte in a frame of `n` bytes.
    pub const fn position(&self, n: usize) -> usize {
        match self.trailer {
            Some(_) => n.saturating_sub(2),
            None => n.saturating_sub(1),
        }
    }

    /// Compute the expected checksum value for a frame.
    pub fn compute(&self, frame: &[u8]) -> u16 {
        let end = self.position(frame.len());
        let covered = frame.get(self.start..end).unwrap_or(&[]);

        u16::from(compute_sum(covered)) + u16::from(self.bias)
    }

    /// Compare a frame's embedded checksum against the computed value.
    pub fn verify(&self, frame: &[u8]) -> Result<(), ChecksumMismatch> {
        let calculated = self.compute(frame);
        let found = frame.get(self.position(frame.len())).copied().unwrap_or(0);

        if u16::from(found) != calculated {
            Err(ChecksumMismatch { found, calculated })?;
        }

        Ok(())
    }
}

/// Accumulate a slice of bytes into a sum modulo 256.
pub fn compute_sum(r: &[u8]) -> u8 {
    r.iter().fold(0, |acc, b| acc.wrapping_add(*b))
}
