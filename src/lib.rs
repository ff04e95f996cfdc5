#![cfg_attr(not(any(test, feature = "std")), no_std)]

//! A decoder for the binary telemetry of Sanchi inertial and GNSS measurement
//! units.
//!
//! Each supported model speaks its own framing: a sync marker, a fixed or
//! self-described length, an additive checksum and a model-specific layout of
//! accelerometer, gyroscope, magnetometer, Euler angle and GPS fields.
//! Sanchi finds valid frames in an unaligned byte stream and converts them to
//! orientation quaternions, SI-unit inertial measurements, magnetic field
//! vectors and position fixes.
//!
//! Most users should begin with the functions in the [`avec`] module, passing
//! a [`sans::profile::Model`] and an implementation of [`avec::Sink`]. If
//! these prove insufficient, consider driving the state machine described in
//! the [`sans`] module directly.
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `std`: enable the reader-based driver (default).
//! - `cli`: build the `listen_imu` command-line tool.

pub mod avec;
pub mod sans;
