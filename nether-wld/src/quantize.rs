//! Fixed-point codecs for mesh vertex data
//!
//! - positions: i16 components with a per-mesh power-of-two scale exponent
//! - normals: i8 components over 128
//! - texture coordinates: raw f32 (new world) or i16 over 256 (old world)
//!
//! Decoding followed by encoding reproduces the stored integers exactly, since
//! every step is a power-of-two multiply. Positions are scaled in f64 and hold
//! this up to [`MAX_VERTEX_SCALE`]. Encoding arbitrary floats is lossy and
//! only bounded by half a quantization step.

use glam::{Vec2, Vec3};

// ============================================================================
// Constants
// ============================================================================

/// Normal component divisor
pub const NORMAL_SCALE: f32 = 128.0;

/// Old-world texture coordinate divisor
pub const LEGACY_UV_SCALE: f32 = 256.0;

// ============================================================================
// Positions
// ============================================================================

/// Largest scale exponent whose step (`2^-scale`) is still an exact f32 value.
/// Stored positions decode exactly up to this scale.
pub const MAX_VERTEX_SCALE: u16 = 149;

/// Multiplier that maps a real position onto its stored integer (`2^scale`)
#[inline]
pub fn vertex_factor(scale: u16) -> f64 {
    2f64.powi(i32::from(scale))
}

/// Size of one quantization step for a scale exponent (`2^-scale`)
#[inline]
pub fn vertex_step(scale: u16) -> f32 {
    (1.0 / vertex_factor(scale)) as f32
}

/// Decode one stored position component: `raw * 2^-scale`
#[inline]
pub fn decode_vertex(raw: i16, scale: u16) -> f32 {
    (f64::from(raw) / vertex_factor(scale)) as f32
}

/// Encode one position component to the nearest stored integer, clamped to i16
#[inline]
pub fn encode_vertex(value: f32, scale: u16) -> i16 {
    (f64::from(value) * vertex_factor(scale))
        .round()
        .clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16
}

pub fn decode_position(raw: [i16; 3], scale: u16) -> Vec3 {
    Vec3::new(
        decode_vertex(raw[0], scale),
        decode_vertex(raw[1], scale),
        decode_vertex(raw[2], scale),
    )
}

pub fn encode_position(value: Vec3, scale: u16) -> [i16; 3] {
    [
        encode_vertex(value.x, scale),
        encode_vertex(value.y, scale),
        encode_vertex(value.z, scale),
    ]
}

// ============================================================================
// Normals
// ============================================================================

#[inline]
pub fn decode_normal_component(raw: i8) -> f32 {
    f32::from(raw) / NORMAL_SCALE
}

/// Encode one normal component as `round(value * 128)`, clamped to i8
#[inline]
pub fn encode_normal_component(value: f32) -> i8 {
    (value * NORMAL_SCALE)
        .round()
        .clamp(f32::from(i8::MIN), f32::from(i8::MAX)) as i8
}

pub fn decode_normal(raw: [i8; 3]) -> Vec3 {
    Vec3::new(
        decode_normal_component(raw[0]),
        decode_normal_component(raw[1]),
        decode_normal_component(raw[2]),
    )
}

pub fn encode_normal(value: Vec3) -> [i8; 3] {
    [
        encode_normal_component(value.x),
        encode_normal_component(value.y),
        encode_normal_component(value.z),
    ]
}

// ============================================================================
// Texture Coordinates
// ============================================================================

/// Decode an old-world texture coordinate pair stored as i16 over 256
pub fn decode_legacy_uv(raw: [i16; 2]) -> Vec2 {
    Vec2::new(
        f32::from(raw[0]) / LEGACY_UV_SCALE,
        f32::from(raw[1]) / LEGACY_UV_SCALE,
    )
}

/// Encode an old-world texture coordinate pair as `round(value * 256)`
pub fn encode_legacy_uv(value: Vec2) -> [i16; 2] {
    [
        round_to_i16(value.x * LEGACY_UV_SCALE),
        round_to_i16(value.y * LEGACY_UV_SCALE),
    ]
}

#[inline]
fn round_to_i16(value: f32) -> i16 {
    value
        .round()
        .clamp(f32::from(i16::MIN), f32::from(i16::MAX)) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_quantization_bound() {
        for scale in 0..=14u16 {
            let step = vertex_step(scale);
            let max = f32::from(i16::MAX) * step;
            let min = f32::from(i16::MIN) * step;
            let samples = 997;
            for i in 0..=samples {
                let t = i as f32 / samples as f32;
                let value = min + (max - min) * t;
                let decoded = decode_vertex(encode_vertex(value, scale), scale);
                assert!(
                    (decoded - value).abs() <= step / 2.0,
                    "scale {scale}: {value} decoded as {decoded}"
                );
            }
        }
    }

    #[test]
    fn test_vertex_stored_values_are_exact() {
        for scale in [0u16, 4, 8, 15, 127, 128, 130, MAX_VERTEX_SCALE] {
            for raw in [i16::MIN, -1234, -1, 0, 1, 777, i16::MAX] {
                assert_eq!(encode_vertex(decode_vertex(raw, scale), scale), raw);
            }
        }
    }

    #[test]
    fn test_vertex_past_f32_exponent_range() {
        let raw = [1, -5, 300];
        let decoded = decode_position(raw, 130);
        assert!(decoded.x > 0.0 && decoded.z > decoded.x, "{decoded}");
        assert_eq!(encode_position(decoded, 130), raw);
    }

    #[test]
    fn test_vertex_clamps_out_of_range() {
        assert_eq!(encode_vertex(1.0e9, 0), i16::MAX);
        assert_eq!(encode_vertex(-1.0e9, 0), i16::MIN);
        assert_eq!(encode_vertex(f32::NAN, 3), 0);
    }

    #[test]
    fn test_normal_round_trip_and_clamp() {
        for raw in i8::MIN..=i8::MAX {
            assert_eq!(encode_normal_component(decode_normal_component(raw)), raw);
        }
        // 1.0 * 128 does not fit an i8
        assert_eq!(encode_normal_component(1.0), i8::MAX);
        assert_eq!(encode_normal(Vec3::new(0.0, -1.0, 0.5)), [0, -128, 64]);
    }

    #[test]
    fn test_legacy_uv() {
        assert_eq!(decode_legacy_uv([256, -128]), Vec2::new(1.0, -0.5));
        assert_eq!(encode_legacy_uv(Vec2::new(1.0, -0.5)), [256, -128]);
        assert_eq!(encode_legacy_uv(Vec2::new(0.0019, 0.0)), [0, 0]);
    }
}
