//! Small numeric helpers shared by the layout, animation and particle code.
//!
//! ## Sine Hash
//! `fract(sin(x) * 10000)` turns any seed into a value in `[0, 1)`. It is not
//! a good random source, but it is a pure function of its input, which is what
//! stable dot placement needs: the same seed always lands on the same spot.
//!
//! ## Sqrt Elimination
//! Spacing checks compare squared distances: |a| < |b|  ↔  a² < b².

/// Pseudo-random value in `[0, 1)` derived from `seed`.
///
/// Computed in f64: in f32, `sin(x) * 10000` loses most of its fractional
/// bits once `x` grows past a few thousand.
#[inline]
pub fn sine_hash(seed: f64) -> f64 {
    let v = seed.sin() * 10000.0;
    let f = v - v.floor();
    // fract of a value just below an integer can round up to 1.0
    if f >= 1.0 {
        0.0
    } else {
        f
    }
}

/// FNV-1a over the UTF-8 bytes of `s`.
#[inline]
pub fn fnv1a(s: &str) -> u64 {
    fnv1a_bytes(0xcbf2_9ce4_8422_2325, s.as_bytes())
}

/// Continue an FNV-1a hash with more bytes.
#[inline]
pub fn fnv1a_bytes(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

/// Fused multiply-add: a * b + c
#[inline(always)]
pub fn fma(a: f32, b: f32, c: f32) -> f32 {
    a.mul_add(b, c)
}

/// Squared distance between two points (no sqrt).
#[inline(always)]
pub fn distance_squared(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    fma(dx, dx, dy * dy)
}

/// lerp(a, b, t) = a + t * (b - a)
#[inline(always)]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    fma(t, b - a, a)
}

/// Cubic ease-in-out on `t` clamped to `[0, 1]`.
#[inline]
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u * u * 0.5
    }
}

/// Quadratic ease-out on `t` clamped to `[0, 1]`.
#[inline]
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sine_hash_range() {
        for i in 0..10_000 {
            let h = sine_hash(i as f64 * 0.37 + 12345.0);
            assert!((0.0..1.0).contains(&h), "sine_hash out of range: {}", h);
        }
    }

    #[test]
    fn test_sine_hash_is_pure() {
        assert_eq!(sine_hash(9999.0 + 17.0), sine_hash(9999.0 + 17.0));
        assert_ne!(sine_hash(1.0), sine_hash(2.0));
    }

    #[test]
    fn test_fnv1a_known_values() {
        // Reference vectors for 64-bit FNV-1a
        assert_eq!(fnv1a(""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(fnv1a("a"), 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn test_distance_squared() {
        let d2 = distance_squared(0.0, 0.0, 3.0, 4.0);
        assert!((d2 - 25.0).abs() < 1e-6);
    }

    #[test]
    fn test_lerp() {
        assert!((lerp(0.0, 10.0, 0.5) - 5.0).abs() < 1e-6);
        assert!((lerp(0.0, 10.0, 0.0) - 0.0).abs() < 1e-6);
        assert!((lerp(0.0, 10.0, 1.0) - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_easing_endpoints() {
        assert!(ease_in_out(0.0).abs() < 1e-6);
        assert!((ease_in_out(1.0) - 1.0).abs() < 1e-6);
        assert!((ease_in_out(0.5) - 0.5).abs() < 1e-6);
        assert!((ease_out(1.0) - 1.0).abs() < 1e-6);
        // clamped outside [0, 1]
        assert!((ease_in_out(2.0) - 1.0).abs() < 1e-6);
        assert!(ease_out(-1.0).abs() < 1e-6);
    }
}
