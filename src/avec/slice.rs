//! Slice-based decoder implementation.

use core::time::Duration;

use either::Either::{Left, Right};
use log::trace;

use crate::sans::{profile::Model, sync::{Seeking, ShortRead}};

use super::Sink;

/// The outcome of scanning a slice.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Bytes fully examined. Anything after this offset is either a candidate
    /// frame still arriving or a trailing partial sync marker.
    pub consumed: usize,
    /// Frames accepted and published.
    pub frames: usize,
    /// Candidates before `consumed` that failed their checksum.
    pub rejected: usize,
    /// The candidate at `consumed`, if it is waiting for more bytes.
    pub short: Option<ShortRead>,
}

/// Decode every frame in a slice, publishing samples to a sink.
///
/// Every sample is stamped with `timestamp` and published with `frame_id`.
/// A candidate too long for the remaining bytes does not stop the scan:
/// later offsets are still tried, and a frame accepted after it discards it.
/// Otherwise [`Summary::consumed`] stops at the earliest such candidate; pass
/// the bytes from there onward back in, followed by more data, to resume.
///
/// This method is also re-exported as `sanchi::avec::decode_slice`.
pub fn decode(
    r: &[u8],
    model: Model,
    frame_id: &str,
    timestamp: Duration,
    o: &mut impl Sink,
) -> Summary {
    let profile = model.profile();
    let mut summary = Summary::default();

    let mut k = 0; // Offset of the candidate under examination.
    let mut deferred = None; // Offset of the earliest candidate awaiting bytes.
    let mut rejected = 0; // Rejections since `deferred`, examined again on resume.

    while k + 1 < r.len() {
        let state = match Seeking.advance(profile, [r[k], r[k + 1]]) {
            Left(state) => state,
            Right(_) => {
                k += 1;
                continue;
            }
        };

        let frame = match state.advance(profile, &r[k..]) {
            Ok(Left(frame)) => frame,
            Ok(Right(_)) => {
                k += 1;
                continue;
            }
            Err(short) => {
                if deferred.is_none() {
                    deferred = Some(k);
                    summary.short = Some(short);
                }
                k += 1;
                continue;
            }
        };

        match frame.advance(profile) {
            Ok(frame) => {
                if let Some(at) = deferred.take() {
                    trace!("{model}: dropped deferred candidate at {at}");
                    summary.short = None;
                }

                for sample in frame.decode(timestamp) {
                    o.publish(sample, frame_id);
                }

                summary.frames += 1;
                summary.rejected += rejected;
                rejected = 0;
                k += frame.len();
            }
            Err(_) => {
                match deferred {
                    Some(_) => rejected += 1,
                    None => summary.rejected += 1,
                }
                k += 1;
            }
        }
    }

    summary.consumed = deferred.unwrap_or(k);
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sans::sample::DecodedSample;

    fn frame_100d2() -> [u8; 30] {
        let mut r = [0u8; 30];
        r[..3].copy_from_slice(&[0xA5, 0x5A, 0x1C]);
        r[29] = 0x1C;
        r
    }

    #[test]
    fn test_empty_and_tiny_slices() {
        let mut samples: Vec<DecodedSample> = Vec::new();
        for r in [&[][..], &[0xA5][..], &[0xA5, 0x5A][..]] {
            let summary = decode(r, Model::M100D2, "world", Duration::ZERO, &mut samples);
            assert_eq!(summary.frames, 0);
            assert!(summary.consumed <= r.len());
        }
        assert!(samples.is_empty());
    }

    #[test]
    fn test_consumes_whole_frames() {
        let mut r = vec![0x00, 0x13];
        r.extend_from_slice(&frame_100d2());
        r.extend_from_slice(&frame_100d2());

        let mut samples: Vec<DecodedSample> = Vec::new();
        let summary = decode(&r, Model::M100D2, "world", Duration::ZERO, &mut samples);

        assert_eq!(summary.frames, 2);
        assert_eq!(summary.rejected, 0);
        assert_eq!(summary.consumed, r.len());
        assert_eq!(summary.short, None);
        assert_eq!(samples.len(), 6);
    }

    #[test]
    fn test_defers_short_candidate() {
        let mut r = frame_100d2().to_vec();
        r.extend_from_slice(&frame_100d2()[..10]);

        let mut samples: Vec<DecodedSample> = Vec::new();
        let summary = decode(&r, Model::M100D2, "world", Duration::ZERO, &mut samples);

        assert_eq!(summary.frames, 1);
        assert_eq!(summary.consumed, 30);
        assert_eq!(
            summary.short,
            Some(ShortRead {
                needed: 30,
                available: 10
            })
        );
    }

    #[test]
    fn test_scans_past_deferred_candidate() {
        let mut r = vec![0xA5, 0x5A, 0xFF, 0x00];
        r.extend_from_slice(&frame_100d2());
        r.extend_from_slice(&frame_100d2()[..10]);

        let mut samples: Vec<DecodedSample> = Vec::new();
        let summary = decode(&r, Model::M100D2, "world", Duration::ZERO, &mut samples);

        assert_eq!(summary.frames, 1);
        assert_eq!(summary.consumed, 34);
        assert_eq!(
            summary.short,
            Some(ShortRead {
                needed: 30,
                available: 10
            })
        );
        assert_eq!(samples.len(), 3);
    }

    #[test]
    fn test_rejections_after_deferred_candidate_are_not_counted_twice() {
        let mut bad = frame_100d2();
        bad[29] ^= 0x01;

        let mut r = vec![0xA5, 0x5A, 0xFF, 0x00];
        r.extend_from_slice(&bad);

        let mut samples: Vec<DecodedSample> = Vec::new();
        let summary = decode(&r, Model::M100D2, "world", Duration::ZERO, &mut samples);
        assert_eq!(summary.rejected, 0);
        assert_eq!(summary.consumed, 0);

        r.extend_from_slice(&frame_100d2());
        let summary = decode(&r, Model::M100D2, "world", Duration::ZERO, &mut samples);
        assert_eq!(summary.frames, 1);
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.consumed, r.len());
        assert_eq!(summary.short, None);
    }

    #[test]
    fn test_keeps_trailing_partial_marker() {
        let mut r = frame_100d2().to_vec();
        r.push(0xA5);

        let mut samples: Vec<DecodedSample> = Vec::new();
        let summary = decode(&r, Model::M100D2, "world", Duration::ZERO, &mut samples);
        assert_eq!(summary.consumed, 30);
    }
}
