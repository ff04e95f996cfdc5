//! Convenience interfaces for common decoding patterns.
//!
//! The functions in this module scan slices and readers for frames,
//! publishing decoded samples to a [`Sink`].

#[cfg(feature = "std")]
pub mod reader;
pub mod slice;

#[cfg(feature = "std")]
pub use reader::decode as decode_reader;
pub use slice::decode as decode_slice;

use core::time::Duration;

use nalgebra::{UnitQuaternion, Vector3};

use crate::sans::sample::DecodedSample;

/// Receive decoded samples.
///
/// Values arrive already converted: acceleration in m/s², angular rate in
/// rad/s, position in degrees and meters. `frame_id` is passed through from
/// the session's configuration unchanged.
///
/// The default implementation of each method ignores received values.
#[allow(unused_variables)]
pub trait Sink {
    /// Receive an orientation.
    fn publish_orientation(
        &mut self,
        orientation: UnitQuaternion<f64>,
        frame_id: &str,
        timestamp: Duration,
    ) {
    }

    /// Receive an accelerometer and gyroscope reading.
    fn publish_inertial(
        &mut self,
        linear_acceleration: Vector3<f64>,
        angular_velocity: Vector3<f64>,
        frame_id: &str,
        timestamp: Duration,
    ) {
    }

    /// Receive a magnetometer reading.
    fn publish_magnetic(&mut self, field: Vector3<f64>, frame_id: &str, timestamp: Duration) {}

    /// Receive a position fix.
    fn publish_gps(
        &mut self,
        latitude: f64,
        longitude: f64,
        altitude: f64,
        frame_id: &str,
        timestamp: Duration,
    ) {
    }

    /// Route a sample to the matching `publish_` method.
    fn publish(&mut self, sample: DecodedSample, frame_id: &str) {
        match sample {
            DecodedSample::Orientation {
                orientation,
                timestamp,
            } => self.publish_orientation(orientation, frame_id, timestamp),
            DecodedSample::Inertial {
                linear_acceleration,
                angular_velocity,
                timestamp,
            } => self.publish_inertial(linear_acceleration, angular_velocity, frame_id, timestamp),
            DecodedSample::Magnetic { field, timestamp } => {
                self.publish_magnetic(field, frame_id, timestamp)
            }
            DecodedSample::Gps {
                latitude,
                longitude,
                altitude,
                timestamp,
            } => self.publish_gps(latitude, longitude, altitude, frame_id, timestamp),
        }
    }
}

/// Collect samples, discarding the frame identifier.
#[cfg(feature = "std")]
impl Sink for std::vec::Vec<DecodedSample> {
    fn publish_orientation(&mut self, orientation: UnitQuaternion<f64>, _: &str, timestamp: Duration) {
        self.push(DecodedSample::Orientation {
            orientation,
            timestamp,
        });
    }

    fn publish_inertial(
        &mut self,
        linear_acceleration: Vector3<f64>,
        angular_velocity: Vector3<f64>,
        _: &str,
        timestamp: Duration,
    ) {
        self.push(DecodedSample::Inertial {
            linear_acceleration,
            angular_velocity,
            timestamp,
        });
    }

    fn publish_magnetic(&mut self, field: Vector3<f64>, _: &str, timestamp: Duration) {
        self.push(DecodedSample::Magnetic { field, timestamp });
    }

    fn publish_gps(&mut self, latitude: f64, longitude: f64, altitude: f64, _: &str, timestamp: Duration) {
        self.push(DecodedSample::Gps {
            latitude,
            longitude,
            altitude,
            timestamp,
        });
    }
}
