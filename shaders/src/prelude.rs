pub use crate::common;
pub use shared::glam::{
    ivec2, vec2, vec3, vec4, IVec2, Mat2, Mat3, Vec2, Vec2Swizzles, Vec3, Vec3Swizzles, Vec4,
    Vec4Swizzles,
};
pub use shared::meta::*;
pub use shared::{
    mix, saturate, smoothstep, Channel, Channels, FloatExt, ShaderInput, VecExt,
};

// Note: This cfg is incorrect on its surface, it really should be "are we compiling with std", but
// we tie #[no_std] above to the same condition, so it's fine.
#[cfg(target_arch = "spirv")]
pub use spirv_std::num_traits::Float;
