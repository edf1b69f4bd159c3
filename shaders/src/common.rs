//! Helpers shared by several catalog units: hashing, value noise, fbm,
//! rotations, distance functions and palettes.

use crate::prelude::*;

pub const TAU: f32 = 6.2831855;

/// Pseudo-random value in `0..1` for a 2D point.
pub fn hash12(p: Vec2) -> f32 {
    let mut p3 = (vec3(p.x, p.y, p.x) * 0.1031).gl_fract();
    p3 += Vec3::splat(p3.dot(p3.yzx() + Vec3::splat(33.33)));
    ((p3.x + p3.y) * p3.z).gl_fract()
}

/// Two pseudo-random values in `0..1` for a 2D point.
pub fn hash22(p: Vec2) -> Vec2 {
    let mut p3 = (vec3(p.x, p.y, p.x) * vec3(0.1031, 0.1030, 0.0973)).gl_fract();
    p3 += Vec3::splat(p3.dot(p3.yzx() + Vec3::splat(33.33)));
    ((p3.xx() + p3.yz()) * p3.zy()).gl_fract()
}

/// Smooth value noise in `0..1`.
pub fn value_noise(p: Vec2) -> f32 {
    let i = p.floor();
    let f = p.gl_fract();
    let u = f * f * (Vec2::splat(3.0) - 2.0 * f);

    let a = hash12(i);
    let b = hash12(i + vec2(1.0, 0.0));
    let c = hash12(i + vec2(0.0, 1.0));
    let d = hash12(i + vec2(1.0, 1.0));

    mix(mix(a, b, u.x), mix(c, d, u.x), u.y)
}

/// Fractional Brownian motion over [`value_noise`], rotating each octave.
pub fn fbm(mut p: Vec2, octaves: i32) -> f32 {
    let m = rot(0.5) * 2.02;
    let mut amplitude = 0.5;
    let mut sum = 0.0;
    let mut norm = 0.0;
    let mut i = 0;
    while i < octaves {
        sum += amplitude * value_noise(p);
        norm += amplitude;
        amplitude *= 0.5;
        p = m * p;
        i += 1;
    }
    if norm > 0.0 {
        sum / norm
    } else {
        0.0
    }
}

pub fn rot(a: f32) -> Mat2 {
    let (s, c) = (a.sin(), a.cos());
    Mat2::from_cols_array(&[c, s, -s, c])
}

/// Inigo Quilez's cosine palette.
pub fn palette(t: f32, a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> Vec3 {
    a + b * ((c * t + d) * TAU).cos()
}

pub fn hsv_to_rgb(c: Vec3) -> Vec3 {
    let k = vec3(1.0, 2.0 / 3.0, 1.0 / 3.0);
    let p = ((Vec3::splat(c.x) + k).gl_fract() * 6.0 - Vec3::splat(3.0)).abs();
    c.z * mix(
        Vec3::ONE,
        (p - Vec3::ONE).clamp(Vec3::ZERO, Vec3::ONE),
        c.y,
    )
}

pub fn sd_sphere(p: Vec3, r: f32) -> f32 {
    p.length() - r
}

pub fn sd_box(p: Vec3, b: Vec3) -> f32 {
    let q = p.abs() - b;
    q.max(Vec3::ZERO).length() + q.x.max(q.y.max(q.z)).min(0.0)
}

pub fn sd_torus(p: Vec3, t: Vec2) -> f32 {
    let q = vec2(p.xz().length() - t.x, p.y);
    q.length() - t.y
}

/// Polynomial smooth minimum.
pub fn smin(a: f32, b: f32, k: f32) -> f32 {
    let h = saturate(0.5 + 0.5 * (b - a) / k);
    mix(b, a, h) - k * h * (1.0 - h)
}

/// Pixel coordinates centred on the screen, scaled so the short side spans `-1..1`.
pub fn centered_uv(frag_coord: Vec2, resolution: Vec3) -> Vec2 {
    (2.0 * frag_coord - resolution.xy()) / resolution.x.min(resolution.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_stay_in_unit_range() {
        for i in 0..64 {
            let p = vec2(i as f32 * 13.7 - 200.0, i as f32 * -3.1);
            let h = hash12(p);
            assert!((0.0..=1.0).contains(&h), "hash12({p}) = {h}");
            let h2 = hash22(p);
            assert!((0.0..=1.0).contains(&h2.x) && (0.0..=1.0).contains(&h2.y));
        }
    }

    #[test]
    fn value_noise_is_continuous_across_cells() {
        let left = value_noise(vec2(2.0 - 1e-4, 0.5));
        let right = value_noise(vec2(2.0 + 1e-4, 0.5));
        assert!((left - right).abs() < 1e-2);
    }

    #[test]
    fn fbm_is_normalised() {
        for i in 0..32 {
            let v = fbm(vec2(i as f32 * 0.37, i as f32 * 0.11), 5);
            assert!((0.0..=1.0).contains(&v));
        }
        assert_eq!(fbm(Vec2::ZERO, 0), 0.0);
    }

    #[test]
    fn distance_functions_are_signed() {
        assert!(sd_sphere(Vec3::ZERO, 1.0) < 0.0);
        assert!((sd_box(vec3(2.0, 0.0, 0.0), Vec3::ONE) - 1.0).abs() < 1e-6);
        assert!((sd_torus(vec3(1.0, 0.0, 0.0), vec2(1.0, 0.25)) + 0.25).abs() < 1e-6);
        assert!(smin(1.0, 1.0, 0.5) < 1.0);
    }

    #[test]
    fn hsv_primaries() {
        let red = hsv_to_rgb(vec3(0.0, 1.0, 1.0));
        assert!((red - vec3(1.0, 0.0, 0.0)).abs().max_element() < 1e-5);
    }
}
