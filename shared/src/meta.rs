//! Static description of a catalog unit: identity, passes, channel bindings and
//! GUI parameters. Units declare one `ShaderDefinition` constant each; the host
//! reads these to plan frames, build the parameter panel and lint the catalog.

/// Offscreen render target slots, in Shadertoy's "Buffer A..D" order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BufferSlot {
    A,
    B,
    C,
    D,
}

impl BufferSlot {
    pub const ALL: [BufferSlot; 4] = [BufferSlot::A, BufferSlot::B, BufferSlot::C, BufferSlot::D];

    pub fn index(self) -> usize {
        match self {
            BufferSlot::A => 0,
            BufferSlot::B => 1,
            BufferSlot::C => 2,
            BufferSlot::D => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BufferSlot::A => "Buffer A",
            BufferSlot::B => "Buffer B",
            BufferSlot::C => "Buffer C",
            BufferSlot::D => "Buffer D",
        }
    }
}

/// Where a pass writes its output.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PassTarget {
    Buffer(BufferSlot),
    /// The on-screen pass; always last.
    Image,
}

/// Textures a channel can be bound to besides other passes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TextureSource {
    /// Generated RGBA noise.
    Noise,
    /// A texture (or image sequence) the host resolves by name from its config.
    Named(&'static str),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChannelInput {
    Empty,
    Buffer(BufferSlot),
    Texture(TextureSource),
}

/// Precision of offscreen buffers a unit needs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BufferFormat {
    /// Half-float RGBA, for simulations that store signed or unbounded state.
    Float16,
    /// 8-bit normalized RGBA; values are clamped to `0..1` and quantized.
    Unorm8,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ParamKind {
    Float { min: f32, max: f32, step: f32 },
    Int { min: i32, max: i32 },
    Bool,
}

/// A GUI-controlled uniform, stored in `ShaderConstants::params[slot]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ParamDefinition {
    pub slot: u32,
    pub name: &'static str,
    pub label: &'static str,
    pub kind: ParamKind,
    pub default: f32,
}

impl ParamDefinition {
    pub const fn float(
        slot: u32,
        name: &'static str,
        label: &'static str,
        default: f32,
        min: f32,
        max: f32,
        step: f32,
    ) -> ParamDefinition {
        ParamDefinition {
            slot,
            name,
            label,
            kind: ParamKind::Float { min, max, step },
            default,
        }
    }

    pub const fn int(
        slot: u32,
        name: &'static str,
        label: &'static str,
        default: i32,
        min: i32,
        max: i32,
    ) -> ParamDefinition {
        ParamDefinition {
            slot,
            name,
            label,
            kind: ParamKind::Int { min, max },
            default: default as f32,
        }
    }

    pub const fn toggle(
        slot: u32,
        name: &'static str,
        label: &'static str,
        default: bool,
    ) -> ParamDefinition {
        ParamDefinition {
            slot,
            name,
            label,
            kind: ParamKind::Bool,
            default: if default { 1.0 } else { 0.0 },
        }
    }

    /// Inclusive value range.
    pub fn range(&self) -> (f32, f32) {
        match self.kind {
            ParamKind::Float { min, max, .. } => (min, max),
            ParamKind::Int { min, max } => (min as f32, max as f32),
            ParamKind::Bool => (0.0, 1.0),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PassDefinition {
    pub target: PassTarget,
    pub channels: [ChannelInput; 4],
}

impl PassDefinition {
    pub const fn image(channels: [ChannelInput; 4]) -> PassDefinition {
        PassDefinition {
            target: PassTarget::Image,
            channels,
        }
    }

    pub const fn buffer(slot: BufferSlot, channels: [ChannelInput; 4]) -> PassDefinition {
        PassDefinition {
            target: PassTarget::Buffer(slot),
            channels,
        }
    }
}

/// Channels of a pass that samples nothing.
pub const NO_CHANNELS: [ChannelInput; 4] = [ChannelInput::Empty; 4];

/// A single-pass unit with no inputs.
pub const IMAGE_ONLY: &[PassDefinition] = &[PassDefinition::image(NO_CHANNELS)];

#[derive(Copy, Clone, Debug)]
pub struct ShaderDefinition {
    /// Stable identifier used for lookup and config sections.
    pub key: &'static str,
    pub name: &'static str,
    pub sort: u32,
    pub buffer_format: BufferFormat,
    /// Passes in execution order; the image pass comes last.
    pub passes: &'static [PassDefinition],
    pub params: &'static [ParamDefinition],
}

impl ShaderDefinition {
    pub fn has_buffers(&self) -> bool {
        self.passes
            .iter()
            .any(|pass| matches!(pass.target, PassTarget::Buffer(_)))
    }

    pub fn param(&self, name: &str) -> Option<&ParamDefinition> {
        self.params.iter().find(|param| param.name == name)
    }
}
