//! Wire descriptions of the supported device models.
//!
//! Each model is a constant [`Profile`]: its sync marker, how a frame's length
//! is known, how it is checksummed, and the field layout of every message it
//! sends. Offsets are measured from the first sync byte.

use core::{f64::consts::PI, fmt, str::FromStr};

use thiserror::Error;

use super::{
    check::Checksum,
    command::Command,
    field::{Decoder, FieldRule},
};

/// Standard gravity as used by the device firmware, in m/s².
pub const GRAVITY: f64 = 9.81;

const DEG: f64 = PI / 180.0;

/// A supported device model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Model {
    /// 100S: tagged frames with separate orientation, sensor and GPS messages.
    M100S,
    /// 200A: fixed 61-byte frames of single-precision floats.
    M200A,
    /// 300A: the 200A layout with a different mounting convention.
    M300A,
    /// 200S: fixed 92-byte frames including a GNSS fix.
    M200S,
    /// 100D2: length-prefixed frames of 16-bit integers.
    M100D2,
}

impl Model {
    pub const ALL: [Model; 5] = [
        Model::M100S,
        Model::M200A,
        Model::M300A,
        Model::M200S,
        Model::M100D2,
    ];

    /// The wire description for this model.
    pub const fn profile(self) -> &'static Profile {
        match self {
            Self::M100S => &M100S,
            Self::M200A => &M200A,
            Self::M300A => &M300A,
            Self::M200S => &M200S,
            Self::M100D2 => &M100D2,
        }
    }

    /// The name printed on the device.
    pub const fn name(self) -> &'static str {
        match self {
            Self::M100S => "100S",
            Self::M200A => "200A",
            Self::M300A => "300A",
            Self::M200S => "200S",
            Self::M100D2 => "100D2",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A configuration value does not name a supported model.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Unknown device model (expected one of 100S, 200A, 300A, 200S, 100D2).")]
pub struct UnknownModel;

impl FromStr for Model {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Model::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or(UnknownModel)
    }
}

/// How the length of a frame is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameLength {
    /// Every frame has this many bytes.
    Fixed(usize),
    /// The byte after the sync marker holds the length; the frame spans that
    /// many bytes plus `extra`.
    Prefixed { extra: usize },
}

/// A message type byte following the length byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeTag {
    /// Bytes that must be available from the sync marker before the type
    /// byte is trusted.
    pub min_available: usize,
}

/// The type byte and length byte identifying a tagged message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subtype {
    pub code: u8,
    pub length: u8,
}

/// An elemental rotation axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Euler angles, applied as elemental rotations left to right.
///
/// Each rule yields an angle in radians, sign included.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    pub rotations: [(Axis, FieldRule); 3],
}

/// Accelerometer (m/s²) and gyroscope (rad/s) triads, ordered x, y, z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inertial {
    pub linear_acceleration: [FieldRule; 3],
    pub angular_velocity: [FieldRule; 3],
}

/// A position fix in degrees and meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gps {
    pub latitude: FieldRule,
    pub longitude: FieldRule,
    pub altitude: FieldRule,
    /// Offset of a status byte holding the hemispheres, if the magnitudes
    /// are unsigned.
    pub hemisphere: Option<usize>,
}

/// The layout of one kind of frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Message {
    pub subtype: Option<Subtype>,
    pub orientation: Option<Orientation>,
    pub inertial: Option<Inertial>,
    /// Magnetic field triad, ordered x, y, z.
    pub magnetic: Option<[FieldRule; 3]>,
    pub gps: Option<Gps>,
}

impl Message {
    const EMPTY: Message = Message {
        subtype: None,
        orientation: None,
        inertial: None,
        magnetic: None,
        gps: None,
    };

    /// The smallest frame holding every field of this message.
    pub fn extent(&self) -> usize {
        let orientation = self.orientation.iter().flat_map(|o| o.rotations.map(|(_, r)| r));
        let inertial = self
            .inertial
            .iter()
            .flat_map(|i| i.linear_acceleration.into_iter().chain(i.angular_velocity));
        let magnetic = self.magnetic.into_iter().flatten();
        let gps = self
            .gps
            .iter()
            .flat_map(|g| [g.latitude, g.longitude, g.altitude]);

        let fields = orientation
            .chain(inertial)
            .chain(magnetic)
            .chain(gps)
            .map(|r| r.end());
        let hemisphere = self.gps.and_then(|g| g.hemisphere).map(|h| h + 1);

        fields.chain(hemisphere).max().unwrap_or(0)
    }
}

/// The wire description of a device model.
#[derive(Debug, PartialEq)]
pub struct Profile {
    pub model: Model,
    pub sync: [u8; 2],
    pub length: FrameLength,
    pub tag: Option<TypeTag>,
    pub checksum: Checksum,
    /// Every message the model sends. Untagged models have exactly one.
    pub messages: &'static [Message],
    /// Bytes requested from the transport per read.
    pub read_size: usize,
    /// Commands that put the device into streaming mode, in order.
    pub setup: &'static [Command],
}

impl Profile {
    /// Find the tagged message matching a type byte and length byte.
    pub fn message(&self, code: u8, length: u8) -> Option<&'static Message> {
        self.messages
            .iter()
            .find(|m| m.subtype == Some(Subtype { code, length }))
    }

    /// The largest frame this model can produce.
    pub const fn max_frame_len(&self) -> usize {
        match self.length {
            FrameLength::Fixed(n) => n,
            FrameLength::Prefixed { extra } => u8::MAX as usize + extra,
        }
    }
}

const fn be_accel(offset: usize) -> FieldRule {
    FieldRule::new(offset, Decoder::BeI16(16384.0), GRAVITY)
}

const fn be_gyro(offset: usize) -> FieldRule {
    FieldRule::new(offset, Decoder::BeI16(32.8), DEG)
}

const fn be_euler(offset: usize, sign: f64) -> FieldRule {
    FieldRule::new(offset, Decoder::BeI16(10.0), sign * DEG)
}

const fn le(offset: usize, scale: f64) -> FieldRule {
    FieldRule::new(offset, Decoder::LeI16, scale)
}

const fn float(offset: usize, scale: f64) -> FieldRule {
    FieldRule::new(offset, Decoder::F32, scale)
}

const SYNC_A55A: [u8; 2] = [0xA5, 0x5A];
const SYNC_55AA: [u8; 2] = [0x55, 0xAA];

const FLOAT_TRAILED: Checksum = Checksum {
    start: 2,
    bias: 0,
    trailer: Some(0xBB),
};

const FLOAT_INERTIAL: Inertial = Inertial {
    linear_acceleration: [
        float(3, 1e-3 * GRAVITY),
        float(7, 1e-3 * GRAVITY),
        float(11, 1e-3 * GRAVITY),
    ],
    angular_velocity: [float(15, DEG), float(19, DEG), float(23, DEG)],
};

const FLOAT_MAGNETIC: [FieldRule; 3] = [float(27, 1.0), float(31, 1.0), float(35, 1.0)];

static M100S: Profile = Profile {
    model: Model::M100S,
    sync: SYNC_A55A,
    length: FrameLength::Prefixed { extra: 1 },
    tag: Some(TypeTag { min_available: 13 }),
    checksum: Checksum {
        start: 0,
        bias: 1,
        trailer: None,
    },
    messages: &[
        Message {
            subtype: Some(Subtype {
                code: 0xA1,
                length: 0x14,
            }),
            orientation: Some(Orientation {
                rotations: [
                    (Axis::Z, be_euler(4, 1.0)),
                    (Axis::Y, be_euler(6, 1.0)),
                    (Axis::X, be_euler(8, 1.0)),
                ],
            }),
            ..Message::EMPTY
        },
        Message {
            subtype: Some(Subtype {
                code: 0xA2,
                length: 0x16,
            }),
            inertial: Some(Inertial {
                linear_acceleration: [be_accel(4), be_accel(6), be_accel(8)],
                angular_velocity: [be_gyro(10), be_gyro(12), be_gyro(14)],
            }),
            magnetic: Some([le(16, 1.0), le(18, 1.0), le(20, 1.0)]),
            ..Message::EMPTY
        },
        // Recognised and checksummed, carries nothing decoded.
        Message {
            subtype: Some(Subtype {
                code: 0xA3,
                length: 0x14,
            }),
            ..Message::EMPTY
        },
        Message {
            subtype: Some(Subtype {
                code: 0xA6,
                length: 0x13,
            }),
            gps: Some(Gps {
                latitude: FieldRule::new(4, Decoder::BeU32Pair, 1e-6),
                longitude: FieldRule::new(8, Decoder::BeU32Pair, 1e-6),
                altitude: FieldRule::new(16, Decoder::BeU32Pair, 0.1),
                hemisphere: Some(18),
            }),
            ..Message::EMPTY
        },
    ],
    read_size: 81,
    setup: &[Command::Stop, Command::StartStream],
};

static M200A: Profile = Profile {
    model: Model::M200A,
    sync: SYNC_55AA,
    length: FrameLength::Fixed(61),
    tag: None,
    checksum: FLOAT_TRAILED,
    messages: &[Message {
        orientation: Some(Orientation {
            rotations: [
                (Axis::Z, float(39, DEG)),
                (Axis::Y, float(43, DEG)),
                (Axis::X, float(47, DEG)),
            ],
        }),
        inertial: Some(FLOAT_INERTIAL),
        magnetic: Some(FLOAT_MAGNETIC),
        ..Message::EMPTY
    }],
    read_size: 61,
    setup: &[Command::OutputRate(100)],
};

static M300A: Profile = Profile {
    model: Model::M300A,
    sync: SYNC_55AA,
    length: FrameLength::Fixed(61),
    tag: None,
    checksum: FLOAT_TRAILED,
    messages: &[Message {
        orientation: Some(Orientation {
            rotations: [
                (Axis::Y, float(39, DEG)),
                (Axis::X, float(43, -DEG)),
                (Axis::Z, float(47, -DEG)),
            ],
        }),
        inertial: Some(FLOAT_INERTIAL),
        magnetic: Some(FLOAT_MAGNETIC),
        ..Message::EMPTY
    }],
    read_size: 61,
    setup: &[Command::OutputRate(100)],
};

const LE_ACCEL: f64 = 0.5e-3 * GRAVITY;
const LE_GYRO: f64 = 0.02 * DEG;

static M200S: Profile = Profile {
    model: Model::M200S,
    sync: SYNC_55AA,
    length: FrameLength::Fixed(92),
    tag: None,
    checksum: FLOAT_TRAILED,
    messages: &[Message {
        // The protocol sends pitch, roll, yaw; yaw and pitch are negated.
        orientation: Some(Orientation {
            rotations: [
                (Axis::Z, float(25, -DEG)),
                (Axis::Y, float(17, -DEG)),
                (Axis::X, float(21, DEG)),
            ],
        }),
        // The sensor's x and y axes are swapped, y negated.
        inertial: Some(Inertial {
            linear_acceleration: [le(5, LE_ACCEL), le(3, -LE_ACCEL), le(7, LE_ACCEL)],
            angular_velocity: [le(11, LE_GYRO), le(9, -LE_GYRO), le(13, LE_GYRO)],
        }),
        magnetic: Some([le(70, 0.003), le(72, 0.003), le(74, 0.003)]),
        gps: Some(Gps {
            latitude: FieldRule::new(43, Decoder::F64, 1.0),
            longitude: FieldRule::new(35, Decoder::F64, 1.0),
            altitude: float(51, 1.0),
            hemisphere: None,
        }),
        ..Message::EMPTY
    }],
    read_size: 92,
    setup: &[Command::OutputRate(10)],
};

static M100D2: Profile = Profile {
    model: Model::M100D2,
    sync: SYNC_A55A,
    length: FrameLength::Prefixed { extra: 2 },
    tag: None,
    checksum: Checksum {
        start: 2,
        bias: 0,
        trailer: None,
    },
    messages: &[Message {
        orientation: Some(Orientation {
            rotations: [
                (Axis::Z, be_euler(3, -1.0)),
                (Axis::Y, be_euler(7, 1.0)),
                (Axis::X, be_euler(5, 1.0)),
            ],
        }),
        inertial: Some(Inertial {
            linear_acceleration: [be_accel(9), be_accel(11), be_accel(13)],
            angular_velocity: [be_gyro(15), be_gyro(17), be_gyro(19)],
        }),
        magnetic: Some([le(21, 1.0), le(23, 1.0), le(25, 1.0)]),
        ..Message::EMPTY
    }],
    read_size: 40,
    setup: &[Command::Stop, Command::StartStream],
};
