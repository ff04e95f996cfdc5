//! Reader-based decoder implementation.
//!
//! _Requires Cargo feature `std`._

use std::{
    io::{ErrorKind, Read},
    time::{SystemTime, UNIX_EPOCH},
};

use log::trace;
use thiserror::Error;

use crate::sans::profile::Model;

use super::{Sink, slice};

/// Errors occurring while decoding from a reader.
#[derive(Debug, Error)]
pub enum Error {
    /// An unrecoverable error from the supplied reader.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Settings for one decoding session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// The device model, fixed for the session.
    pub model: Model,
    /// Coordinate frame label attached to every sample.
    pub frame_id: String,
    /// Bytes requested per read. Defaults to the model's read size.
    pub chunk_size: Option<usize>,
}

impl Config {
    pub fn new(model: Model) -> Self {
        Self {
            model,
            frame_id: String::from("world"),
            chunk_size: None,
        }
    }

    pub fn with_frame_id(mut self, frame_id: impl Into<String>) -> Self {
        self.frame_id = frame_id.into();
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }

    /// Bytes requested per read.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
            .unwrap_or(self.model.profile().read_size)
            .max(1)
    }
}

/// Running counts for a session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    /// Bytes received from the reader.
    pub bytes: usize,
    /// Frames accepted and published.
    pub frames: usize,
    /// Candidates that failed their checksum.
    pub rejected: usize,
}

/// Decode frames from a reader until it ends or `keep_running` returns
/// false, publishing to a sink.
///
/// `keep_running` is checked once before every read. Reads that time out or
/// are interrupted are retried; any other reader error ends the session.
/// Bytes belonging to a frame that straddles two reads are kept and
/// completed by the next read. A false sync marker announcing a long frame
/// does not hold back the valid frames behind it.
///
/// This method is also re-exported as `sanchi::avec::decode_reader`.
///
/// _Requires Cargo feature `std`._
pub fn decode(
    r: &mut impl Read,
    config: &Config,
    mut keep_running: impl FnMut() -> bool,
    o: &mut impl Sink,
) -> Result<Totals, Error> {
    let mut totals = Totals::default();

    let mut chunk = vec![0; config.chunk_size()];
    let mut window = Vec::with_capacity(config.model.profile().max_frame_len() + chunk.len());

    while keep_running() {
        let n = match r.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err)
                if matches!(
                    err.kind(),
                    ErrorKind::Interrupted | ErrorKind::TimedOut | ErrorKind::WouldBlock
                ) =>
            {
                trace!("{}: transient read error: {err}", config.model);
                continue;
            }
            Err(err) => Err(err)?,
        };

        totals.bytes += n;
        window.extend_from_slice(&chunk[..n]);

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();

        let summary = slice::decode(&window, config.model, &config.frame_id, timestamp, o);

        totals.frames += summary.frames;
        totals.rejected += summary.rejected;

        window.drain(..summary.consumed);
    }

    // Every offset after a deferred candidate has already been tried, so
    // nothing left here can still complete.
    if !window.is_empty() {
        trace!("{}: {} bytes left undecoded", config.model, window.len());
    }

    Ok(totals)
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor};

    use super::*;
    use crate::sans::sample::DecodedSample;

    /// Yields its data in pieces of a fixed size, then fails.
    struct Trickle {
        data: Vec<u8>,
        step: usize,
        fail_with: Option<ErrorKind>,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.data.is_empty() {
                return match self.fail_with.take() {
                    Some(kind) => Err(io::Error::from(kind)),
                    None => Ok(0),
                };
            }

            let n = self.step.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data.drain(..n);
            Ok(n)
        }
    }

    fn frame_100d2() -> Vec<u8> {
        let mut r = vec![0u8; 30];
        r[..3].copy_from_slice(&[0xA5, 0x5A, 0x1C]);
        r[29] = 0x1C;
        r
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::new(Model::M200S);
        assert_eq!(config.frame_id, "world");
        assert_eq!(config.chunk_size(), 92);
        assert_eq!(config.with_chunk_size(0).chunk_size(), 1);
    }

    #[test]
    fn test_frames_straddling_reads() {
        let data: Vec<u8> = (0..4).flat_map(|_| frame_100d2()).collect();
        let mut r = Trickle {
            data,
            step: 7,
            fail_with: None,
        };

        let mut samples: Vec<DecodedSample> = Vec::new();
        let config = Config::new(Model::M100D2);
        let totals = decode(&mut r, &config, || true, &mut samples).unwrap();

        assert_eq!(totals.bytes, 120);
        assert_eq!(totals.frames, 4);
        assert_eq!(samples.len(), 12);
    }

    #[test]
    fn test_transient_errors_are_retried() {
        let mut r = Trickle {
            data: frame_100d2(),
            step: 40,
            fail_with: Some(ErrorKind::TimedOut),
        };

        let mut samples: Vec<DecodedSample> = Vec::new();
        let config = Config::new(Model::M100D2);
        let mut reads = 0;
        let totals = decode(
            &mut r,
            &config,
            || {
                reads += 1;
                reads < 4
            },
            &mut samples,
        )
        .unwrap();

        assert_eq!(totals.frames, 1);
    }

    #[test]
    fn test_transport_failure_ends_session() {
        let mut r = Trickle {
            data: frame_100d2(),
            step: 40,
            fail_with: Some(ErrorKind::BrokenPipe),
        };

        let mut samples: Vec<DecodedSample> = Vec::new();
        let config = Config::new(Model::M100D2);
        let err = decode(&mut r, &config, || true, &mut samples).unwrap_err();

        assert!(matches!(err, Error::Io(e) if e.kind() == ErrorKind::BrokenPipe));
        assert_eq!(samples.len(), 3);
    }

    #[test]
    fn test_long_false_candidate_does_not_stall() {
        let mut data = vec![0xA5, 0x5A, 0xFF, 0x00];
        data.extend(frame_100d2());
        data.extend(frame_100d2());

        let mut r = Trickle {
            data,
            step: 40,
            fail_with: None,
        };

        let mut samples: Vec<DecodedSample> = Vec::new();
        let config = Config::new(Model::M100D2);
        let totals = decode(&mut r, &config, || true, &mut samples).unwrap();

        assert_eq!(totals.bytes, 64);
        assert_eq!(totals.frames, 2);
        assert_eq!(samples.len(), 6);
    }

    #[test]
    fn test_keep_running_is_checked_first() {
        let mut r = Cursor::new(frame_100d2());
        let mut samples: Vec<DecodedSample> = Vec::new();
        let config = Config::new(Model::M100D2);
        let totals = decode(&mut r, &config, || false, &mut samples).unwrap();

        assert_eq!(totals, Totals::default());
        assert!(samples.is_empty());
    }
}
