//! GLSL built-ins that glam doesn't provide, or provides with different
//! semantics (`mod`, `fract`, `step`).

use core::ops::{Add, Mul, Sub};
use spirv_std::glam::{vec2, vec3, vec4, Vec2, Vec3, Vec4};

// Note: This cfg is incorrect on its surface, it really should be "are we compiling with std", but
// we tie #[no_std] above to the same condition, so it's fine.
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

pub fn saturate(x: f32) -> f32 {
    x.max(0.0).min(1.0)
}

pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    // Scale, bias and saturate x to 0..1 range
    let x = saturate((x - edge0) / (edge1 - edge0));
    // Evaluate polynomial
    x * x * (3.0 - 2.0 * x)
}

pub fn mix<X: Copy + Mul<A, Output = X> + Add<Output = X> + Sub<Output = X>, A: Copy>(
    x: X,
    y: X,
    a: A,
) -> X {
    x - x * a + y * a
}

pub trait FloatExt {
    fn gl_fract(self) -> Self;
    fn gl_mod(self, rhs: Self) -> Self;
    fn step(self, x: Self) -> Self;
}

impl FloatExt for f32 {
    fn gl_fract(self) -> f32 {
        self - self.floor()
    }

    /// GLSL `mod`: the result takes the sign of `rhs`.
    fn gl_mod(self, rhs: f32) -> f32 {
        self - rhs * (self / rhs).floor()
    }

    fn step(self, x: f32) -> f32 {
        if x < self {
            0.0
        } else {
            1.0
        }
    }
}

pub trait VecExt {
    fn gl_fract(self) -> Self;
    fn gl_mod(self, m: f32) -> Self;
    fn sin(self) -> Self;
    fn cos(self) -> Self;
    fn step(self, other: Self) -> Self;
    fn reflect(self, normal: Self) -> Self;
}

impl VecExt for Vec2 {
    fn gl_fract(self) -> Vec2 {
        vec2(self.x.gl_fract(), self.y.gl_fract())
    }

    fn gl_mod(self, m: f32) -> Vec2 {
        vec2(self.x.gl_mod(m), self.y.gl_mod(m))
    }

    fn sin(self) -> Vec2 {
        vec2(self.x.sin(), self.y.sin())
    }

    fn cos(self) -> Vec2 {
        vec2(self.x.cos(), self.y.cos())
    }

    fn step(self, other: Vec2) -> Vec2 {
        vec2(self.x.step(other.x), self.y.step(other.y))
    }

    fn reflect(self, normal: Vec2) -> Vec2 {
        self - 2.0 * normal.dot(self) * normal
    }
}

impl VecExt for Vec3 {
    fn gl_fract(self) -> Vec3 {
        vec3(self.x.gl_fract(), self.y.gl_fract(), self.z.gl_fract())
    }

    fn gl_mod(self, m: f32) -> Vec3 {
        vec3(self.x.gl_mod(m), self.y.gl_mod(m), self.z.gl_mod(m))
    }

    fn sin(self) -> Vec3 {
        vec3(self.x.sin(), self.y.sin(), self.z.sin())
    }

    fn cos(self) -> Vec3 {
        vec3(self.x.cos(), self.y.cos(), self.z.cos())
    }

    fn step(self, other: Vec3) -> Vec3 {
        vec3(
            self.x.step(other.x),
            self.y.step(other.y),
            self.z.step(other.z),
        )
    }

    fn reflect(self, normal: Vec3) -> Vec3 {
        self - 2.0 * normal.dot(self) * normal
    }
}

impl VecExt for Vec4 {
    fn gl_fract(self) -> Vec4 {
        vec4(
            self.x.gl_fract(),
            self.y.gl_fract(),
            self.z.gl_fract(),
            self.w.gl_fract(),
        )
    }

    fn gl_mod(self, m: f32) -> Vec4 {
        vec4(
            self.x.gl_mod(m),
            self.y.gl_mod(m),
            self.z.gl_mod(m),
            self.w.gl_mod(m),
        )
    }

    fn sin(self) -> Vec4 {
        vec4(self.x.sin(), self.y.sin(), self.z.sin(), self.w.sin())
    }

    fn cos(self) -> Vec4 {
        vec4(self.x.cos(), self.y.cos(), self.z.cos(), self.w.cos())
    }

    fn step(self, other: Vec4) -> Vec4 {
        vec4(
            self.x.step(other.x),
            self.y.step(other.y),
            self.z.step(other.z),
            self.w.step(other.w),
        )
    }

    fn reflect(self, normal: Vec4) -> Vec4 {
        self - 2.0 * normal.dot(self) * normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gl_mod_follows_divisor_sign() {
        assert_eq!((-1.0f32).gl_mod(3.0), 2.0);
        assert_eq!(4.0f32.gl_mod(3.0), 1.0);
        assert_eq!(vec2(-0.25, 1.25).gl_mod(1.0), vec2(0.75, 0.25));
    }

    #[test]
    fn fract_is_never_negative() {
        assert_eq!((-0.25f32).gl_fract(), 0.75);
        assert_eq!(vec3(1.5, -1.5, 0.0).gl_fract(), vec3(0.5, 0.5, 0.0));
    }

    #[test]
    fn step_and_smoothstep_edges() {
        assert_eq!(0.5f32.step(0.4), 0.0);
        assert_eq!(0.5f32.step(0.5), 1.0);
        assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
        assert_eq!(smoothstep(0.0, 1.0, 0.5), 0.5);
    }

    #[test]
    fn mix_interpolates_vectors() {
        let a = vec3(0.0, 1.0, 2.0);
        let b = vec3(2.0, 3.0, 4.0);
        assert_eq!(mix(a, b, 0.5), vec3(1.0, 2.0, 3.0));
    }

    #[test]
    fn reflect_flips_normal_component() {
        let v = vec2(1.0, -1.0);
        assert_eq!(v.reflect(vec2(0.0, 1.0)), vec2(1.0, 1.0));
    }
}
