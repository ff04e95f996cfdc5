//! I/O-free core: frame synchronization, validation and field decoding.
//!
//! This module is intended for applications that manage their own buffers,
//! such as firmware reading from a UART. See [`crate::avec`] for
//! implementations covering common patterns.
//!
//! # Architecture
//!
//! Locating a frame is a finite-state machine whose states are represented by
//! non-copy tokens. Calling a token's `advance` method with the bytes it needs
//! returns a successor state:
//!
//! 1. [`sync::Seeking`] compares two bytes with the model's sync marker.
//! 2. [`sync::Synced`] checks the type byte (tagged models) and the length,
//!    yielding a [`sync::RawFrame`], falling back to `Seeking`, or reporting a
//!    [`sync::ShortRead`] when more bytes are needed.
//! 3. [`sync::RawFrame`] verifies the checksum, yielding a
//!    [`sync::ValidFrame`] whose samples can be decoded.
//!
//! The model is chosen once, as a [`profile::Model`], and every state is
//! advanced against its constant [`profile::Profile`].
//!
//! Some parts of the process are not represented in the state machine and
//! must be carefully written:
//!
//! - Choosing where to try next. After any rejection, move one byte forward;
//!   a false sync marker can appear anywhere, including inside the candidate
//!   just rejected. After an accepted frame, move past all of it.
//!
//! - Keeping unconsumed bytes when a candidate is short, so it can be retried
//!   once the transport delivers more. Later offsets must still be tried
//!   meanwhile; a false marker can announce a frame far longer than the
//!   frames queued behind it.
//!
//! Implementers are recommended to begin by studying
//! [`crate::avec::slice::decode`].

pub mod check;
pub mod command;
pub mod field;
pub mod profile;
pub mod sample;
pub mod sync;

/// Entrypoint to the finite-state machine.
pub type Synchronizer = sync::Seeking;
