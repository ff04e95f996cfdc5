//! Samples decoded from accepted frames.

use core::time::Duration;

use nalgebra::{Rotation3, UnitQuaternion, Vector3};

use super::{
    field::FieldRule,
    profile::{Axis, Gps, Inertial, Message, Orientation},
};

/// A single decoded measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecodedSample {
    Orientation {
        orientation: UnitQuaternion<f64>,
        timestamp: Duration,
    },
    Inertial {
        /// m/s²
        linear_acceleration: Vector3<f64>,
        /// rad/s
        angular_velocity: Vector3<f64>,
        timestamp: Duration,
    },
    Magnetic {
        field: Vector3<f64>,
        timestamp: Duration,
    },
    Gps {
        /// Degrees, north positive.
        latitude: f64,
        /// Degrees, east positive.
        longitude: f64,
        /// Meters.
        altitude: f64,
        timestamp: Duration,
    },
}

/// Every sample carried by one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Samples {
    pub orientation: Option<DecodedSample>,
    pub inertial: Option<DecodedSample>,
    pub magnetic: Option<DecodedSample>,
    pub gps: Option<DecodedSample>,
}

impl Samples {
    /// Decode the fields `message` describes from an accepted frame.
    pub fn decode(message: &Message, frame: &[u8], timestamp: Duration) -> Self {
        let orientation = message
            .orientation
            .map(|o| DecodedSample::Orientation {
                orientation: compose(&o, frame),
                timestamp,
            });

        let inertial = message.inertial.map(
            |Inertial {
                 linear_acceleration,
                 angular_velocity,
             }| DecodedSample::Inertial {
                linear_acceleration: triad(&linear_acceleration, frame),
                angular_velocity: triad(&angular_velocity, frame),
                timestamp,
            },
        );

        let magnetic = message.magnetic.map(|m| DecodedSample::Magnetic {
            field: triad(&m, frame),
            timestamp,
        });

        let gps = message.gps.map(|g| {
            let (latitude, longitude, altitude) = fix(&g, frame);
            DecodedSample::Gps {
                latitude,
                longitude,
                altitude,
                timestamp,
            }
        });

        Self {
            orientation,
            inertial,
            magnetic,
            gps,
        }
    }

    /// Number of samples present.
    pub fn len(&self) -> usize {
        self.into_iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IntoIterator for Samples {
    type Item = DecodedSample;
    type IntoIter = core::iter::Flatten<core::array::IntoIter<Option<DecodedSample>, 4>>;

    /// Samples in publication order: orientation, inertial, magnetic, GPS.
    fn into_iter(self) -> Self::IntoIter {
        [self.orientation, self.inertial, self.magnetic, self.gps]
            .into_iter()
            .flatten()
    }
}

impl IntoIterator for &Samples {
    type Item = DecodedSample;
    type IntoIter = <Samples as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        (*self).into_iter()
    }
}

fn triad(rules: &[FieldRule; 3], frame: &[u8]) -> Vector3<f64> {
    Vector3::new(
        rules[0].decode(frame),
        rules[1].decode(frame),
        rules[2].decode(frame),
    )
}

/// Build an orientation from a frame's Euler angles.
pub fn compose(orientation: &Orientation, frame: &[u8]) -> UnitQuaternion<f64> {
    compose_angles(orientation.rotations.map(|(axis, rule)| (axis, rule.decode(frame))))
}

/// Compose elemental rotations (radians) left to right into a quaternion.
pub fn compose_angles(rotations: [(Axis, f64); 3]) -> UnitQuaternion<f64> {
    let rotation = rotations
        .into_iter()
        .fold(Rotation3::identity(), |acc, (axis, angle)| {
            let axis = match axis {
                Axis::X => Vector3::x_axis(),
                Axis::Y => Vector3::y_axis(),
                Axis::Z => Vector3::z_axis(),
            };

            acc * Rotation3::from_axis_angle(&axis, angle)
        });

    UnitQuaternion::from_rotation_matrix(&rotation)
}

/// Decode a position fix, applying the hemisphere byte if the model has one.
fn fix(gps: &Gps, frame: &[u8]) -> (f64, f64, f64) {
    let mut latitude = gps.latitude.decode(frame);
    let mut longitude = gps.longitude.decode(frame);
    let altitude = gps.altitude.decode(frame);

    if let Some(offset) = gps.hemisphere {
        let (lat_sign, lon_sign) = hemisphere_signs(frame[offset]);
        latitude *= lat_sign;
        longitude *= lon_sign;
    }

    (latitude, longitude, altitude)
}

/// Signs for latitude and longitude selected by a hemisphere status byte.
///
/// Only the four values the device sends select a sign combination; any
/// other value leaves both signs unchanged.
pub fn hemisphere_signs(status: u8) -> (f64, f64) {
    match status {
        0x22 => (1.0, 1.0),   // North, east.
        0x12 => (-1.0, 1.0),  // South, east.
        0x11 => (-1.0, -1.0), // South, west.
        0x21 => (1.0, -1.0),  // North, west.
        _ => (1.0, 1.0),
    }
}
