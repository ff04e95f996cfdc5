//! Decoders mapping fixed-width byte groups to physical values.
//!
//! Every decoder is total over its input array. Choosing the right offset is
//! the caller's concern; see [`FieldRule`].

/// Two's-complement big-endian 16-bit integer, divided by `divisor`.
pub fn be_i16_scaled(r: [u8; 2], divisor: f64) -> f64 {
    f64::from(i16::from_be_bytes(r)) / divisor
}

/// Two's-complement little-endian 16-bit integer, unscaled.
pub fn le_i16_raw(r: [u8; 2]) -> f64 {
    f64::from(i16::from_le_bytes(r))
}

/// Two big-endian 16-bit halves, high half first, joined into one magnitude.
pub fn be_u32_from_two_u16(r: [u8; 4]) -> i64 {
    let high = i64::from(u16::from_be_bytes([r[0], r[1]]));
    let low = i64::from(u16::from_be_bytes([r[2], r[3]]));

    (high << 16) | low
}

/// IEEE-754 single precision, little-endian.
pub fn ieee754_f32(r: [u8; 4]) -> f64 {
    f64::from(f32::from_le_bytes(r))
}

/// IEEE-754 double precision, little-endian.
pub fn ieee754_f64(r: [u8; 8]) -> f64 {
    f64::from_le_bytes(r)
}

/// The wire encoding of a single field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decoder {
    /// [`be_i16_scaled`] with the given divisor.
    BeI16(f64),
    /// [`le_i16_raw`].
    LeI16,
    /// [`be_u32_from_two_u16`].
    BeU32Pair,
    /// [`ieee754_f32`].
    F32,
    /// [`ieee754_f64`].
    F64,
}

impl Decoder {
    /// Number of bytes this encoding occupies.
    pub const fn width(self) -> usize {
        match self {
            Self::BeI16(_) | Self::LeI16 => 2,
            Self::BeU32Pair | Self::F32 => 4,
            Self::F64 => 8,
        }
    }
}

/// Where a field lives in a frame and how to turn it into a physical value.
///
/// The decoded value is multiplied by `scale`, which also carries any sign
/// flip the model applies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRule {
    pub offset: usize,
    pub decoder: Decoder,
    pub scale: f64,
}

impl FieldRule {
    pub const fn new(offset: usize, decoder: Decoder, scale: f64) -> Self {
        Self {
            offset,
            decoder,
            scale,
        }
    }

    /// One past the last byte this field reads.
    pub const fn end(&self) -> usize {
        self.offset + self.decoder.width()
    }

    /// Extract this field from a frame.
    ///
    /// The frame must extend at least to [`Self::end`].
    pub fn decode(&self, frame: &[u8]) -> f64 {
        debug_assert!(self.end() <= frame.len(), "field outside frame");

        let value = match self.decoder {
            Decoder::BeI16(divisor) => be_i16_scaled(take(frame, self.offset), divisor),
            Decoder::LeI16 => le_i16_raw(take(frame, self.offset)),
            Decoder::BeU32Pair => be_u32_from_two_u16(take(frame, self.offset)) as f64,
            Decoder::F32 => ieee754_f32(take(frame, self.offset)),
            Decoder::F64 => ieee754_f64(take(frame, self.offset)),
        };

        value * self.scale
    }
}

/// Copy `N` bytes starting at an offset.
fn take<const N: usize>(r: &[u8], offset: usize) -> [u8; N] {
    let mut buf = [0; N];
    buf.copy_from_slice(&r[offset..offset + N]);
    buf
}
