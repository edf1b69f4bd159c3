//! Content checks over the catalog's definitions.
//!
//! None of these are enforced by the type system: keys are free-form strings,
//! pass lists are slices, and parameter slots are plain integers. Everything
//! here is reported rather than fixed so that `shadertoys lint` can print the
//! whole list at once.

use std::collections::HashSet;

use shared::meta::{ChannelInput, ParamDefinition, ParamKind, PassTarget, ShaderDefinition, TextureSource};
use shared::MAX_PARAMS;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LintIssue {
    #[error("{key}: duplicate shader key")]
    DuplicateKey { key: String },
    #[error("{key:?}: key must be non-empty and use only a-z, 0-9 and '-'")]
    InvalidKey { key: String },
    #[error("{key}: no passes")]
    NoPasses { key: String },
    #[error("{key}: no image pass")]
    MissingImagePass { key: String },
    #[error("{key}: image pass {pass} is not the last pass")]
    ImagePassNotLast { key: String, pass: usize },
    #[error("{key}: more than one image pass")]
    MultipleImagePasses { key: String },
    #[error("{key}: {buffer} is written by more than one pass")]
    BufferWrittenTwice { key: String, buffer: &'static str },
    #[error("{key}: pass {pass} channel {channel} reads {buffer}, which no pass writes")]
    UnresolvedBuffer {
        key: String,
        pass: usize,
        channel: usize,
        buffer: &'static str,
    },
    #[error("{key}: pass {pass} channel {channel} names an empty texture")]
    EmptyTextureName { key: String, pass: usize, channel: usize },
    #[error("{key}: parameter `{param}` uses slot {slot}, limit is {}", MAX_PARAMS)]
    ParamSlotOutOfRange { key: String, param: String, slot: u32 },
    #[error("{key}: parameter `{param}` reuses slot {slot}")]
    DuplicateParamSlot { key: String, param: String, slot: u32 },
    #[error("{key}: parameter name `{param}` is declared twice")]
    DuplicateParamName { key: String, param: String },
    #[error("{key}: parameter `{param}` has an invalid range or step")]
    InvalidParamRange { key: String, param: String },
    #[error("{key}: parameter `{param}` default {default} is outside its range")]
    DefaultOutOfRange { key: String, param: String, default: f32 },
    #[error("{key}: integer parameter `{param}` default {default} is not integral")]
    NonIntegralDefault { key: String, param: String, default: f32 },
}

pub fn lint(definitions: &[ShaderDefinition]) -> Vec<LintIssue> {
    let mut issues = Vec::new();
    let mut keys = HashSet::new();

    for definition in definitions {
        let key = definition.key.to_string();
        if !is_valid_key(definition.key) {
            issues.push(LintIssue::InvalidKey { key: key.clone() });
        }
        if !keys.insert(definition.key) {
            issues.push(LintIssue::DuplicateKey { key: key.clone() });
        }
        lint_passes(definition, &mut issues);
        lint_params(definition, &mut issues);
    }

    issues
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

fn lint_passes(definition: &ShaderDefinition, issues: &mut Vec<LintIssue>) {
    let key = || definition.key.to_string();
    let passes = definition.passes;

    if passes.is_empty() {
        issues.push(LintIssue::NoPasses { key: key() });
        return;
    }

    let image_passes: Vec<usize> = passes
        .iter()
        .enumerate()
        .filter(|(_, pass)| pass.target == PassTarget::Image)
        .map(|(index, _)| index)
        .collect();
    match image_passes.as_slice() {
        [] => issues.push(LintIssue::MissingImagePass { key: key() }),
        [only] if *only != passes.len() - 1 => {
            issues.push(LintIssue::ImagePassNotLast { key: key(), pass: *only })
        }
        [_] => {}
        _ => issues.push(LintIssue::MultipleImagePasses { key: key() }),
    }

    let mut written = HashSet::new();
    for pass in passes {
        if let PassTarget::Buffer(slot) = pass.target {
            if !written.insert(slot) {
                issues.push(LintIssue::BufferWrittenTwice {
                    key: key(),
                    buffer: slot.name(),
                });
            }
        }
    }

    for (index, pass) in passes.iter().enumerate() {
        for (channel, input) in pass.channels.iter().enumerate() {
            match *input {
                ChannelInput::Buffer(slot) if !written.contains(&slot) => {
                    issues.push(LintIssue::UnresolvedBuffer {
                        key: key(),
                        pass: index,
                        channel,
                        buffer: slot.name(),
                    })
                }
                ChannelInput::Texture(TextureSource::Named(name)) if name.trim().is_empty() => {
                    issues.push(LintIssue::EmptyTextureName {
                        key: key(),
                        pass: index,
                        channel,
                    })
                }
                _ => {}
            }
        }
    }
}

fn lint_params(definition: &ShaderDefinition, issues: &mut Vec<LintIssue>) {
    let mut slots = HashSet::new();
    let mut names = HashSet::new();

    for param in definition.params {
        let key = definition.key.to_string();
        let name = param.name.to_string();

        if param.slot as usize >= MAX_PARAMS {
            issues.push(LintIssue::ParamSlotOutOfRange {
                key: key.clone(),
                param: name.clone(),
                slot: param.slot,
            });
        } else if !slots.insert(param.slot) {
            issues.push(LintIssue::DuplicateParamSlot {
                key: key.clone(),
                param: name.clone(),
                slot: param.slot,
            });
        }
        if !names.insert(param.name) {
            issues.push(LintIssue::DuplicateParamName {
                key: key.clone(),
                param: name.clone(),
            });
        }

        if !has_valid_range(param) {
            issues.push(LintIssue::InvalidParamRange { key, param: name });
            continue;
        }
        let (min, max) = param.range();
        if !(min..=max).contains(&param.default) {
            issues.push(LintIssue::DefaultOutOfRange {
                key: key.clone(),
                param: name.clone(),
                default: param.default,
            });
        }
        let integral = match param.kind {
            ParamKind::Int { .. } => param.default.fract() == 0.0,
            ParamKind::Bool => param.default == 0.0 || param.default == 1.0,
            ParamKind::Float { .. } => true,
        };
        if !integral {
            issues.push(LintIssue::NonIntegralDefault {
                key,
                param: name,
                default: param.default,
            });
        }
    }
}

fn has_valid_range(param: &ParamDefinition) -> bool {
    match param.kind {
        ParamKind::Float { min, max, step } => {
            min.is_finite() && max.is_finite() && min < max && step > 0.0 && step <= max - min
        }
        ParamKind::Int { min, max } => min < max,
        ParamKind::Bool => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::meta::{BufferFormat, BufferSlot, PassDefinition, IMAGE_ONLY, NO_CHANNELS};

    fn unit(key: &'static str) -> ShaderDefinition {
        ShaderDefinition {
            key,
            name: "Unit",
            sort: 0,
            buffer_format: BufferFormat::Unorm8,
            passes: IMAGE_ONLY,
            params: &[],
        }
    }

    #[test]
    fn builtin_catalog_is_clean() {
        let issues = lint(catalog_shaders::SHADER_DEFINITIONS);
        assert!(issues.is_empty(), "{issues:#?}");
    }

    #[test]
    fn reports_duplicate_and_malformed_keys() {
        let issues = lint(&[unit("wave"), unit("wave"), unit("Bad Key"), unit("")]);
        assert_eq!(
            issues,
            vec![
                LintIssue::DuplicateKey { key: "wave".into() },
                LintIssue::InvalidKey { key: "Bad Key".into() },
                LintIssue::InvalidKey { key: "".into() },
            ]
        );
    }

    #[test]
    fn reports_pass_structure_problems() {
        static BUFFER_LAST: [PassDefinition; 2] = [
            PassDefinition::image(NO_CHANNELS),
            PassDefinition::buffer(BufferSlot::A, NO_CHANNELS),
        ];
        static NO_IMAGE: [PassDefinition; 1] = [PassDefinition::buffer(BufferSlot::A, NO_CHANNELS)];
        static TWO_IMAGES: [PassDefinition; 2] =
            [PassDefinition::image(NO_CHANNELS), PassDefinition::image(NO_CHANNELS)];

        let mut empty = unit("empty");
        empty.passes = &[];
        let mut buffer_last = unit("buffer-last");
        buffer_last.passes = &BUFFER_LAST;
        let mut no_image = unit("no-image");
        no_image.passes = &NO_IMAGE;
        let mut two_images = unit("two-images");
        two_images.passes = &TWO_IMAGES;

        let issues = lint(&[empty, buffer_last, no_image, two_images]);
        assert_eq!(
            issues,
            vec![
                LintIssue::NoPasses { key: "empty".into() },
                LintIssue::ImagePassNotLast { key: "buffer-last".into(), pass: 0 },
                LintIssue::MissingImagePass { key: "no-image".into() },
                LintIssue::MultipleImagePasses { key: "two-images".into() },
            ]
        );
    }

    #[test]
    fn reports_unresolved_buffers_and_double_writes() {
        static PASSES: [PassDefinition; 3] = [
            PassDefinition::buffer(BufferSlot::A, NO_CHANNELS),
            PassDefinition::buffer(BufferSlot::A, NO_CHANNELS),
            PassDefinition::image([
                ChannelInput::Buffer(BufferSlot::A),
                ChannelInput::Buffer(BufferSlot::C),
                ChannelInput::Texture(TextureSource::Named(" ")),
                ChannelInput::Empty,
            ]),
        ];
        let mut definition = unit("feedback");
        definition.passes = &PASSES;

        let issues = lint(&[definition]);
        assert_eq!(
            issues,
            vec![
                LintIssue::BufferWrittenTwice { key: "feedback".into(), buffer: "Buffer A" },
                LintIssue::UnresolvedBuffer {
                    key: "feedback".into(),
                    pass: 2,
                    channel: 1,
                    buffer: "Buffer C",
                },
                LintIssue::EmptyTextureName { key: "feedback".into(), pass: 2, channel: 2 },
            ]
        );
    }

    #[test]
    fn reports_parameter_problems() {
        static PARAMS: [ParamDefinition; 6] = [
            ParamDefinition::float(0, "speed", "Speed", 1.0, 0.0, 2.0, 0.1),
            ParamDefinition::float(0, "scale", "Scale", 1.0, 0.0, 2.0, 0.1),
            ParamDefinition::float(1, "speed", "Speed again", 1.0, 0.0, 2.0, 0.1),
            ParamDefinition::float(2, "inverted", "Inverted", 1.0, 2.0, 0.0, 0.1),
            ParamDefinition::int(3, "count", "Count", 40, 1, 16),
            ParamDefinition::toggle(9, "flag", "Flag", true),
        ];
        let mut definition = unit("params");
        definition.params = &PARAMS;

        let issues = lint(&[definition]);
        let key = || "params".to_string();
        assert_eq!(
            issues,
            vec![
                LintIssue::DuplicateParamSlot { key: key(), param: "scale".into(), slot: 0 },
                LintIssue::DuplicateParamName { key: key(), param: "speed".into() },
                LintIssue::InvalidParamRange { key: key(), param: "inverted".into() },
                LintIssue::DefaultOutOfRange { key: key(), param: "count".into(), default: 40.0 },
                LintIssue::ParamSlotOutOfRange { key: key(), param: "flag".into(), slot: 9 },
            ]
        );
    }

    #[test]
    fn non_integral_int_default_is_reported() {
        static PARAMS: [ParamDefinition; 1] = [ParamDefinition {
            slot: 0,
            name: "steps",
            label: "Steps",
            kind: ParamKind::Int { min: 0, max: 10 },
            default: 2.5,
        }];
        let mut definition = unit("steps");
        definition.params = &PARAMS;
        assert_eq!(
            lint(&[definition]),
            vec![LintIssue::NonIntegralDefault {
                key: "steps".into(),
                param: "steps".into(),
                default: 2.5,
            }]
        );
    }
}
