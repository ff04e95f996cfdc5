//! States locating and validating candidate frames.
//!
//! Synchronization is permissive: every byte offset is tried as a frame
//! start. Validation is strict: a candidate must match its sync marker, its
//! type byte (for tagged models), its length and its checksum before any
//! field is decoded.

use either::Either::{self, Left, Right};
use log::{debug, trace};
use thiserror::Error;
use zerocopy::FromBytes;

use super::{
    check::ChecksumMismatch,
    profile::{FrameLength, Message, Profile},
    sample::Samples,
};

use core::time::Duration;

/// Fewer bytes are available than a candidate frame requires.
///
/// The candidate should be retried once more bytes arrive.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Candidate frame needs {needed} bytes, {available} available.")]
pub struct ShortRead {
    pub needed: usize,
    pub available: usize,
}

/// State token to seek a sync marker.
#[derive(Debug)]
pub struct Seeking;

impl Seeking {
    /// Transition to another state by comparing two bytes with the profile's
    /// sync marker.
    ///
    /// Returns a successor state token.
    pub fn advance(self, profile: &Profile, r: [u8; 2]) -> Either<Synced, Seeking> {
        if r == profile.sync {
            Left(Synced(()))
        } else {
            Right(self)
        }
    }
}

/// State token holding a matched sync marker.
#[derive(Debug)]
pub struct Synced(pub(super) ());

impl Synced {
    /// Transition to another state by checking the type byte and length of a
    /// candidate.
    ///
    /// `r` holds every byte available from the sync marker onward. Returns
    /// the candidate frame, or a successor state token if the bytes cannot
    /// start a frame.
    pub fn advance<'a>(
        self,
        profile: &Profile,
        r: &'a [u8],
    ) -> Result<Either<RawFrame<'a>, Seeking>, ShortRead> {
        let short = |needed| ShortRead {
            needed,
            available: r.len(),
        };

        let (n, message) = match profile.length {
            FrameLength::Fixed(n) => (n, &profile.messages[0]),
            FrameLength::Prefixed { extra } => match profile.tag {
                Some(tag) => {
                    if r.len() < tag.min_available {
                        Err(short(tag.min_available))?;
                    }

                    let Preamble { length, code, .. } = zerocopy::transmute!(take::<4>(r));

                    let Some(message) = profile.message(code, length) else {
                        trace!("{}: unknown type {code:#04x} ({length} bytes)", profile.model);
                        return Ok(Right(Seeking));
                    };

                    (usize::from(length) + extra, message)
                }
                None => {
                    let Some(&length) = r.get(2) else {
                        return Err(short(3));
                    };

                    (usize::from(length) + extra, &profile.messages[0])
                }
            },
        };

        // A length too small for the layout cannot be a real frame.
        if n < message.extent() || n < 3 {
            trace!("{}: implausible length {n}", profile.model);
            return Ok(Right(Seeking));
        }

        let Some(bytes) = r.get(..n) else {
            return Err(short(n));
        };

        if let Some(trailer) = profile.checksum.trailer {
            if bytes[n - 1] != trailer {
                trace!("{}: missing trailer", profile.model);
                return Ok(Right(Seeking));
            }
        }

        Ok(Left(RawFrame { bytes, message }))
    }
}

/// Sync marker, length byte and type byte of a tagged frame.
#[repr(C, packed)]
#[derive(Debug, FromBytes)]
struct Preamble {
    _sync: [u8; 2],
    length: u8,
    code: u8,
}

/// State token holding a candidate frame awaiting its checksum.
#[derive(Debug)]
pub struct RawFrame<'a> {
    bytes: &'a [u8],
    message: &'static Message,
}

impl<'a> RawFrame<'a> {
    /// Number of bytes in the candidate.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// The candidate's bytes, sync marker included.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Transition to another state by verifying the candidate's checksum.
    ///
    /// Returns the accepted frame.
    pub fn advance(self, profile: &Profile) -> Result<ValidFrame<'a>, ChecksumMismatch> {
        if let Err(err) = profile.checksum.verify(self.bytes) {
            debug!("{}: rejected {} byte frame: {err}", profile.model, self.len());
            Err(err)?;
        }

        Ok(ValidFrame {
            bytes: self.bytes,
            message: self.message,
        })
    }
}

/// A frame that passed every check.
#[derive(Debug)]
pub struct ValidFrame<'a> {
    bytes: &'a [u8],
    message: &'static Message,
}

impl<'a> ValidFrame<'a> {
    /// Number of bytes in the frame.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// The frame's bytes, sync marker included.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// The layout this frame was matched against.
    pub fn message(&self) -> &'static Message {
        self.message
    }

    /// Decode every sample the frame carries, stamping each with `timestamp`.
    pub fn decode(&self, timestamp: Duration) -> Samples {
        Samples::decode(self.message, self.bytes, timestamp)
    }
}

/// Copy the first `N` bytes of a slice at least that long.
fn take<const N: usize>(r: &[u8]) -> [u8; N] {
    let mut buf = [0; N];
    buf.copy_from_slice(&r[..N]);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sans::profile::Model;

    fn sync<'a>(profile: &Profile, r: &'a [u8]) -> Result<Either<RawFrame<'a>, Seeking>, ShortRead> {
        match Seeking.advance(profile, [r[0], r[1]]) {
            Left(state) => state.advance(profile, r),
            Right(state) => Ok(Right(state)),
        }
    }

    #[test]
    fn test_sync_marker() {
        let profile = Model::M200A.profile();
        assert!(Seeking.advance(profile, [0x55, 0xAA]).is_left());
        assert!(Seeking.advance(profile, [0xAA, 0x55]).is_right());
        assert!(Seeking.advance(profile, [0xA5, 0x5A]).is_right());
    }

    #[test]
    fn test_fixed_length_short() {
        let profile = Model::M200A.profile();
        let r = [0x55, 0xAA, 0x00, 0x00];
        assert_eq!(
            sync(profile, &r).unwrap_err(),
            ShortRead {
                needed: 61,
                available: 4
            }
        );
    }

    #[test]
    fn test_fixed_length_requires_trailer() {
        let profile = Model::M200A.profile();
        let mut r = [0; 61];
        r[..2].copy_from_slice(&[0x55, 0xAA]);
        assert!(sync(profile, &r).unwrap().is_right());

        r[60] = 0xBB;
        let frame = sync(profile, &r).unwrap().left().unwrap();
        assert_eq!(frame.len(), 61);
    }

    #[test]
    fn test_tagged_type_check() {
        let profile = Model::M100S.profile();
        let mut r = [0; 24];
        r[..4].copy_from_slice(&[0xA5, 0x5A, 0x16, 0xA2]);
        let frame = sync(profile, &r).unwrap().left().unwrap();
        assert_eq!(frame.len(), 0x17);

        // Known type, wrong length.
        r[2] = 0x14;
        assert!(sync(profile, &r).unwrap().is_right());

        // Unknown type.
        r[2] = 0x16;
        r[3] = 0xA4;
        assert!(sync(profile, &r).unwrap().is_right());
    }

    #[test]
    fn test_tagged_needs_minimum_before_type_check() {
        let profile = Model::M100S.profile();
        let r = [0xA5, 0x5A, 0x14, 0xA1, 0x00];
        assert_eq!(
            sync(profile, &r).unwrap_err(),
            ShortRead {
                needed: 13,
                available: 5
            }
        );
    }

    #[test]
    fn test_prefixed_length() {
        let profile = Model::M100D2.profile();
        let mut r = [0; 40];
        r[..3].copy_from_slice(&[0xA5, 0x5A, 0x1C]);
        let frame = sync(profile, &r).unwrap().left().unwrap();
        assert_eq!(frame.len(), 0x1C + 2);

        // Too short to hold the layout.
        r[2] = 0x08;
        assert!(sync(profile, &r).unwrap().is_right());

        // Longer than what has arrived.
        r[2] = 0x40;
        assert_eq!(
            sync(profile, &r).unwrap_err(),
            ShortRead {
                needed: 0x42,
                available: 40
            }
        );

        assert_eq!(
            sync(profile, &r[..2]).unwrap_err(),
            ShortRead {
                needed: 3,
                available: 2
            }
        );
    }

    #[test]
    fn test_checksum_gate() {
        let profile = Model::M100D2.profile();
        let mut r = [0u8; 30];
        r[..3].copy_from_slice(&[0xA5, 0x5A, 0x1C]);
        r[10] = 0x42;
        r[29] = 0x1C + 0x42;

        let frame = sync(profile, &r).unwrap().left().unwrap();
        let frame = frame.advance(profile).unwrap();
        assert_eq!(frame.as_bytes(), &r[..]);

        r[11] = 0x01;
        let frame = sync(profile, &r).unwrap().left().unwrap();
        assert_eq!(
            frame.advance(profile).unwrap_err(),
            ChecksumMismatch {
                found: 0x5E,
                calculated: 0x5F
            }
        );
    }
}
