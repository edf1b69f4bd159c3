//! Ray-marched still life: a sphere melting into a torus above a checkered
//! floor, soft shadows, ambient occlusion. Drag with the mouse to orbit.

use crate::prelude::*;

const BLEND: usize = 0;
const SHADOW_HARDNESS: usize = 1;

pub const DEFINITION: ShaderDefinition = ShaderDefinition {
    key: "sdf-scene",
    name: "SDF Still Life",
    sort: 40,
    buffer_format: BufferFormat::Unorm8,
    passes: IMAGE_ONLY,
    params: &[
        ParamDefinition::float(BLEND as u32, "blend", "Blend radius", 0.3, 0.01, 1.0, 0.05),
        ParamDefinition::float(
            SHADOW_HARDNESS as u32,
            "shadow_hardness",
            "Shadow hardness",
            8.0,
            2.0,
            32.0,
            1.0,
        ),
    ],
};

pub fn render<C: Channel>(
    _pass: u32,
    input: &ShaderInput,
    _channels: &Channels<C>,
    frag_coord: Vec2,
) -> Vec4 {
    let mut color = Vec4::ZERO;
    Inputs {
        resolution: input.resolution,
        time: input.time,
        mouse: input.mouse,
        blend: input.param(BLEND),
        shadow_hardness: input.param(SHADOW_HARDNESS),
    }
    .main_image(&mut color, frag_coord);
    color
}

struct Inputs {
    resolution: Vec3,
    time: f32,
    mouse: Vec4,
    blend: f32,
    shadow_hardness: f32,
}

const MAX_STEPS: i32 = 96;
const FAR: f32 = 30.0;

impl Inputs {
    /// Distance and material id (0 floor, 1 object).
    fn map(&self, p: Vec3) -> Vec2 {
        let bob = 0.25 * (self.time * 1.3).sin();
        let sphere = common::sd_sphere(p - vec3(0.0, 1.0 + bob, 0.0), 0.6);

        let mut q = p - vec3(0.0, 0.8, 0.0);
        let tq = common::rot(self.time * 0.5) * q.xy();
        q = vec3(tq.x, tq.y, q.z);
        let torus = common::sd_torus(q, vec2(1.0, 0.2));
        let cube = common::sd_box(p - vec3(1.8, 0.35, -0.6), Vec3::splat(0.35)) - 0.05;

        let object = common::smin(sphere, torus, self.blend).min(cube);
        let floor = p.y;
        if floor < object {
            vec2(floor, 0.0)
        } else {
            vec2(object, 1.0)
        }
    }

    fn cast_ray(&self, ro: Vec3, rd: Vec3) -> Vec2 {
        let mut t = 0.01;
        let mut material = -1.0;
        let mut i = 0;
        while i < MAX_STEPS {
            let h = self.map(ro + rd * t);
            if h.x.abs() < 0.0005 * t {
                material = h.y;
                break;
            }
            t += h.x;
            if t > FAR {
                break;
            }
            i += 1;
        }
        vec2(t, material)
    }

    fn normal(&self, p: Vec3) -> Vec3 {
        let e = vec2(1.0, -1.0) * 0.5773 * 0.0005;
        (e.xyy() * self.map(p + e.xyy()).x
            + e.yyx() * self.map(p + e.yyx()).x
            + e.yxy() * self.map(p + e.yxy()).x
            + e.xxx() * self.map(p + e.xxx()).x)
            .normalize()
    }

    fn soft_shadow(&self, ro: Vec3, rd: Vec3) -> f32 {
        let mut res: f32 = 1.0;
        let mut t = 0.02;
        let mut i = 0;
        while i < 48 {
            let h = self.map(ro + rd * t).x;
            res = res.min(self.shadow_hardness * h / t);
            t += h.clamp(0.02, 0.25);
            if res < 0.001 || t > 8.0 {
                break;
            }
            i += 1;
        }
        saturate(res)
    }

    fn ambient_occlusion(&self, p: Vec3, n: Vec3) -> f32 {
        let mut occ = 0.0;
        let mut scale = 1.0;
        let mut i = 0;
        while i < 5 {
            let h = 0.01 + 0.12 * i as f32 / 4.0;
            let d = self.map(p + h * n).x;
            occ += (h - d) * scale;
            scale *= 0.95;
            i += 1;
        }
        saturate(1.0 - 3.0 * occ)
    }

    fn camera(&self, ro: Vec3, ta: Vec3) -> Mat3 {
        let cw = (ta - ro).normalize();
        let cu = cw.cross(Vec3::Y).normalize();
        let cv = cu.cross(cw);
        Mat3::from_cols(cu, cv, cw)
    }

    fn main_image(&self, frag_color: &mut Vec4, frag_coord: Vec2) {
        let p = (2.0 * frag_coord - self.resolution.xy()) / self.resolution.y;

        let mut yaw = 0.2 * self.time;
        let mut pitch = 0.35;
        if self.mouse.z > 0.0 {
            let m = self.mouse.xy() / self.resolution.xy();
            yaw = common::TAU * m.x;
            pitch = 0.05 + 1.2 * m.y;
        }
        let ta = vec3(0.0, 0.7, 0.0);
        let ro = ta + 5.0 * vec3(pitch.cos() * yaw.cos(), pitch.sin(), pitch.cos() * yaw.sin());
        let rd = self.camera(ro, ta) * p.extend(2.0).normalize();

        let sky = vec3(0.55, 0.7, 0.9) - 0.4 * rd.y.max(0.0);
        let mut col = sky;

        let hit = self.cast_ray(ro, rd);
        if hit.y >= 0.0 {
            let pos = ro + hit.x * rd;
            let nor = self.normal(pos);
            let light = vec3(0.6, 0.7, -0.4).normalize();

            let albedo = if hit.y < 0.5 {
                let checker = ((pos.x.floor() + pos.z.floor()).gl_mod(2.0)).abs();
                Vec3::splat(0.25 + 0.2 * checker)
            } else {
                vec3(0.8, 0.35, 0.2)
            };

            let diffuse = saturate(nor.dot(light)) * self.soft_shadow(pos, light);
            let occlusion = self.ambient_occlusion(pos, nor);
            let ambient = 0.5 + 0.5 * nor.y;
            let half = (light - rd).normalize();
            let specular = saturate(nor.dot(half)).powf(32.0) * diffuse;

            col = albedo * (1.3 * diffuse * vec3(1.0, 0.9, 0.7) + 0.35 * ambient * occlusion * sky)
                + Vec3::splat(0.5 * specular);

            // distance fog
            col = mix(col, sky, 1.0 - (-0.002 * hit.x * hit.x).exp());
        }

        *frag_color = col.max(Vec3::ZERO).extend(1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sky_is_written_without_gamma() {
        let inputs = Inputs {
            resolution: vec3(32.0, 18.0, 1.0),
            time: 0.0,
            mouse: Vec4::ZERO,
            blend: 0.3,
            shadow_hardness: 8.0,
        };
        // the top row looks above the scene, so it only sees sky
        let mut color = Vec4::ZERO;
        inputs.main_image(&mut color, vec2(16.5, 17.5));

        // the sky gradient shifts every channel equally, so the linear
        // channel differences survive unchanged
        assert!((color.z - color.x - 0.35).abs() < 1e-5, "{color}");
        assert!((color.y - color.x - 0.15).abs() < 1e-5, "{color}");
        assert_eq!(color.w, 1.0);
    }
}
