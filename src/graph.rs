//! Frame planning for multi-pass units.
//!
//! A unit's passes run in declaration order every frame. Each pass writes the
//! back half of its own buffer and reads the front half of every slot, then the
//! written slot is swapped. That means a channel bound to a buffer sees this
//! frame's output when the writer ran earlier in the frame, and last frame's
//! output when the writer is the pass itself or a later pass.

use shared::meta::{BufferSlot, ChannelInput, PassTarget, ShaderDefinition, TextureSource};
use shared::CHANNEL_COUNT;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PlanError {
    #[error("{key} has no image pass")]
    MissingImagePass { key: &'static str },
    #[error("{key}: pass {pass} reads {buffer}, which no pass writes")]
    UnresolvedBuffer {
        key: &'static str,
        pass: usize,
        buffer: &'static str,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrameRef {
    /// Written earlier in the same frame.
    Current,
    /// Written by this pass or a later one; the read sees last frame's result.
    Previous,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Binding {
    Empty,
    Texture(TextureSource),
    Buffer { slot: BufferSlot, frame: FrameRef },
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlannedPass {
    /// Position in the unit's pass list; pushed as `ShaderConstants::pass`.
    pub index: u32,
    pub target: PassTarget,
    pub bindings: [Binding; CHANNEL_COUNT],
}

#[derive(Clone, Debug, PartialEq)]
pub struct FramePlan {
    pub passes: Vec<PlannedPass>,
    /// Slots some pass writes, in slot order.
    pub buffers: Vec<BufferSlot>,
}

impl FramePlan {
    pub fn build(definition: &ShaderDefinition) -> Result<FramePlan, PlanError> {
        let key = definition.key;
        let writer = |slot: BufferSlot| {
            definition
                .passes
                .iter()
                .position(|pass| pass.target == PassTarget::Buffer(slot))
        };

        if !definition
            .passes
            .iter()
            .any(|pass| pass.target == PassTarget::Image)
        {
            return Err(PlanError::MissingImagePass { key });
        }

        let mut passes = Vec::with_capacity(definition.passes.len());
        for (index, pass) in definition.passes.iter().enumerate() {
            let mut bindings = [Binding::Empty; CHANNEL_COUNT];
            for (binding, input) in bindings.iter_mut().zip(pass.channels.iter()) {
                *binding = match *input {
                    ChannelInput::Empty => Binding::Empty,
                    ChannelInput::Texture(source) => Binding::Texture(source),
                    ChannelInput::Buffer(slot) => {
                        let written_at = writer(slot).ok_or(PlanError::UnresolvedBuffer {
                            key,
                            pass: index,
                            buffer: slot.name(),
                        })?;
                        let frame = if written_at < index {
                            FrameRef::Current
                        } else {
                            FrameRef::Previous
                        };
                        Binding::Buffer { slot, frame }
                    }
                };
            }
            passes.push(PlannedPass {
                index: index as u32,
                target: pass.target,
                bindings,
            });
        }

        let buffers = BufferSlot::ALL
            .into_iter()
            .filter(|&slot| writer(slot).is_some())
            .collect();

        Ok(FramePlan { passes, buffers })
    }

    pub fn has_buffers(&self) -> bool {
        !self.buffers.is_empty()
    }
}

/// A front/back pair. Readers see `front`; the pass writing this slot renders
/// into `back` and then calls [`PingPong::swap`].
#[derive(Debug)]
pub struct PingPong<T> {
    front: T,
    back: T,
}

impl<T> PingPong<T> {
    pub fn new(front: T, back: T) -> Self {
        Self { front, back }
    }

    pub fn front(&self) -> &T {
        &self.front
    }

    pub fn back(&self) -> &T {
        &self.back
    }

    pub fn back_mut(&mut self) -> &mut T {
        &mut self.back
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.front, &mut self.back);
    }

    pub fn both_mut(&mut self) -> [&mut T; 2] {
        [&mut self.front, &mut self.back]
    }
}

/// Ping-pong pairs for every buffer slot a plan writes.
#[derive(Debug)]
pub struct BufferTargets<T> {
    slots: [Option<PingPong<T>>; 4],
}

impl<T> BufferTargets<T> {
    pub fn new(plan: &FramePlan, mut make: impl FnMut(BufferSlot) -> T) -> Self {
        let mut slots = [None, None, None, None];
        for &slot in &plan.buffers {
            slots[slot.index()] = Some(PingPong::new(make(slot), make(slot)));
        }
        Self { slots }
    }

    pub fn get(&self, slot: BufferSlot) -> Option<&PingPong<T>> {
        self.slots[slot.index()].as_ref()
    }

    pub fn get_mut(&mut self, slot: BufferSlot) -> Option<&mut PingPong<T>> {
        self.slots[slot.index()].as_mut()
    }

    /// What a reader of `slot` sees right now.
    pub fn front(&self, slot: BufferSlot) -> Option<&T> {
        self.get(slot).map(PingPong::front)
    }

    pub fn swap(&mut self, slot: BufferSlot) {
        if let Some(pair) = self.get_mut(slot) {
            pair.swap();
        }
    }

    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut T)) {
        for pair in self.slots.iter_mut().flatten() {
            for target in pair.both_mut() {
                f(target);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::meta::{BufferFormat, PassDefinition, IMAGE_ONLY, NO_CHANNELS};

    fn unit(passes: &'static [PassDefinition]) -> ShaderDefinition {
        ShaderDefinition {
            key: "test",
            name: "Test",
            sort: 0,
            buffer_format: BufferFormat::Float16,
            passes,
            params: &[],
        }
    }

    #[test]
    fn single_pass_plan_has_no_buffers() {
        let plan = FramePlan::build(&unit(IMAGE_ONLY)).unwrap();
        assert_eq!(plan.passes.len(), 1);
        assert!(!plan.has_buffers());
        assert_eq!(plan.passes[0].bindings, [Binding::Empty; 4]);
    }

    #[test]
    fn buffer_reads_resolve_to_current_or_previous_frame() {
        use ChannelInput::{Buffer, Empty};
        static PASSES: [PassDefinition; 3] = [
            PassDefinition::buffer(BufferSlot::A, [Buffer(BufferSlot::B), Empty, Empty, Empty]),
            PassDefinition::buffer(BufferSlot::B, [Buffer(BufferSlot::A), Buffer(BufferSlot::B), Empty, Empty]),
            PassDefinition::image([Buffer(BufferSlot::B), Buffer(BufferSlot::A), Empty, Empty]),
        ];
        let plan = FramePlan::build(&unit(&PASSES)).unwrap();

        let previous = |slot| Binding::Buffer { slot, frame: FrameRef::Previous };
        let current = |slot| Binding::Buffer { slot, frame: FrameRef::Current };
        assert_eq!(plan.passes[0].bindings[0], previous(BufferSlot::B));
        assert_eq!(plan.passes[1].bindings[0], current(BufferSlot::A));
        assert_eq!(plan.passes[1].bindings[1], previous(BufferSlot::B));
        assert_eq!(plan.passes[2].bindings[0], current(BufferSlot::B));
        assert_eq!(plan.passes[2].bindings[1], current(BufferSlot::A));
        assert_eq!(plan.buffers, vec![BufferSlot::A, BufferSlot::B]);
    }

    #[test]
    fn unresolved_buffer_fails_planning() {
        static PASSES: [PassDefinition; 1] = [PassDefinition::image([
            ChannelInput::Empty,
            ChannelInput::Buffer(BufferSlot::D),
            ChannelInput::Empty,
            ChannelInput::Empty,
        ])];
        assert_eq!(
            FramePlan::build(&unit(&PASSES)),
            Err(PlanError::UnresolvedBuffer {
                key: "test",
                pass: 0,
                buffer: "Buffer D"
            })
        );
    }

    #[test]
    fn missing_image_pass_fails_planning() {
        static PASSES: [PassDefinition; 1] = [PassDefinition::buffer(BufferSlot::A, NO_CHANNELS)];
        assert_eq!(
            FramePlan::build(&unit(&PASSES)),
            Err(PlanError::MissingImagePass { key: "test" })
        );
    }

    #[test]
    fn builtin_units_all_plan() {
        for definition in catalog_shaders::SHADER_DEFINITIONS {
            let plan = FramePlan::build(definition).unwrap();
            assert_eq!(plan.has_buffers(), definition.has_buffers(), "{}", definition.key);
        }
    }

    #[test]
    fn ping_pong_swaps_front_and_back() {
        let mut pair = PingPong::new(1, 2);
        *pair.back_mut() = 3;
        assert_eq!(*pair.front(), 1);
        pair.swap();
        assert_eq!(*pair.front(), 3);
    }

    #[test]
    fn buffer_targets_only_allocate_written_slots() {
        static PASSES: [PassDefinition; 2] = [
            PassDefinition::buffer(BufferSlot::C, NO_CHANNELS),
            PassDefinition::image(NO_CHANNELS),
        ];
        let plan = FramePlan::build(&unit(&PASSES)).unwrap();
        let mut made = Vec::new();
        let mut targets = BufferTargets::new(&plan, |slot| {
            made.push(slot);
            slot.index()
        });
        assert_eq!(made, vec![BufferSlot::C, BufferSlot::C]);
        assert!(targets.front(BufferSlot::A).is_none());
        assert_eq!(targets.front(BufferSlot::C), Some(&2));

        let mut count = 0;
        targets.for_each_mut(|_| count += 1);
        assert_eq!(count, 2);
    }
}
