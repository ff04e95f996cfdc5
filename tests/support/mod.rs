//! Hand-built frames for every model.

#![allow(dead_code)]

use sanchi::sans::profile::{FrameLength, Model, Profile};

/// Length byte sent by the 100D2.
pub const PREFIXED_LENGTH: u8 = 0x1C;

/// A frame under construction: sync marker, length, type and trailer are
/// filled in up front, the checksum by [`Frame::finish`].
pub struct Frame {
    profile: &'static Profile,
    bytes: Vec<u8>,
}

impl Frame {
    /// An all-zero frame for an untagged model.
    pub fn new(model: Model) -> Self {
        let profile = model.profile();
        let message = &profile.messages[0];
        assert!(message.subtype.is_none(), "{model} frames are tagged");

        let bytes = match profile.length {
            FrameLength::Fixed(n) => vec![0; n],
            FrameLength::Prefixed { extra } => {
                let mut bytes = vec![0; usize::from(PREFIXED_LENGTH) + extra];
                bytes[2] = PREFIXED_LENGTH;
                bytes
            }
        };

        Self::with_bytes(profile, bytes)
    }

    /// An all-zero frame of a tagged model's message type.
    pub fn tagged(model: Model, code: u8) -> Self {
        let profile = model.profile();
        let FrameLength::Prefixed { extra } = profile.length else {
            panic!("{model} frames are not tagged");
        };

        let subtype = profile
            .messages
            .iter()
            .filter_map(|m| m.subtype)
            .find(|s| s.code == code)
            .unwrap();

        let mut bytes = vec![0; usize::from(subtype.length) + extra];
        bytes[2] = subtype.length;
        bytes[3] = code;

        Self::with_bytes(profile, bytes)
    }

    fn with_bytes(profile: &'static Profile, mut bytes: Vec<u8>) -> Self {
        bytes[..2].copy_from_slice(&profile.sync);
        if let Some(trailer) = profile.checksum.trailer {
            *bytes.last_mut().unwrap() = trailer;
        }
        Self { profile, bytes }
    }

    pub fn u8(mut self, offset: usize, v: u8) -> Self {
        self.bytes[offset] = v;
        self
    }

    pub fn be_i16(self, offset: usize, v: i16) -> Self {
        self.put(offset, &v.to_be_bytes())
    }

    pub fn le_i16(self, offset: usize, v: i16) -> Self {
        self.put(offset, &v.to_le_bytes())
    }

    pub fn be_u32(self, offset: usize, v: u32) -> Self {
        self.put(offset, &v.to_be_bytes())
    }

    pub fn f32(self, offset: usize, v: f32) -> Self {
        self.put(offset, &v.to_le_bytes())
    }

    pub fn f64(self, offset: usize, v: f64) -> Self {
        self.put(offset, &v.to_le_bytes())
    }

    fn put(mut self, offset: usize, r: &[u8]) -> Self {
        self.bytes[offset..offset + r.len()].copy_from_slice(r);
        self
    }

    /// Write the checksum and return the frame's bytes.
    pub fn finish(mut self) -> Vec<u8> {
        let checksum = self.profile.checksum;
        let calculated = checksum.compute(&self.bytes);
        let position = checksum.position(self.bytes.len());

        self.bytes[position] = u8::try_from(calculated)
            .expect("payload sums to a value no checksum byte can hold");
        self.bytes
    }
}

/// A minimal valid frame for every model, one message type each.
pub fn any_frame(model: Model) -> Vec<u8> {
    match model {
        Model::M100S => Frame::tagged(model, 0xA2).finish(),
        _ => Frame::new(model).finish(),
    }
}
