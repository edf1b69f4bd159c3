//! The unit currently on screen and everything allocated for it.

use anyhow::Context;
use shared::meta::ShaderDefinition;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::gpu::{GpuContext, UnitTargets};
use crate::graph::FramePlan;
use crate::params::ParamPanel;
use crate::textures::TextureLibrary;

pub struct Session {
    pub index: usize,
    pub definition: &'static ShaderDefinition,
    pub plan: FramePlan,
    pub panel: ParamPanel,
    pub targets: UnitTargets,
}

impl Session {
    pub fn start(
        catalog: &Catalog,
        index: usize,
        config: &Config,
        library: &mut TextureLibrary,
        gpu: &GpuContext,
    ) -> anyhow::Result<Self> {
        let definition = catalog.definition(index);
        let plan = FramePlan::build(definition)
            .with_context(|| format!("Cannot run {}", definition.key))?;

        let mut panel = ParamPanel::new(definition);
        if let Some(overrides) = config.params_for(definition.key) {
            panel.apply_overrides(overrides);
        }

        let targets = UnitTargets::new(
            &gpu.device,
            &gpu.queue,
            &plan,
            definition.buffer_format,
            gpu.size(),
            library,
        );

        log::info!(
            "Started {} ({} pass(es), {} parameter(s))",
            definition.key,
            plan.passes.len(),
            definition.params.len()
        );
        Ok(Self {
            index,
            definition,
            plan,
            panel,
            targets,
        })
    }

    /// Releases the unit's parameter panel and GPU targets.
    pub fn teardown(self) {
        let Session {
            definition,
            panel,
            targets,
            ..
        } = self;
        panel.teardown();
        drop(targets);
        log::info!("Stopped {}", definition.key);
    }

    pub fn title(&self, prefix: &str, paused: bool) -> String {
        window_title(prefix, self.definition, &self.panel, paused)
    }
}

pub fn window_title(
    prefix: &str,
    definition: &ShaderDefinition,
    panel: &ParamPanel,
    paused: bool,
) -> String {
    let mut title = format!("{prefix} - {}", definition.name);
    if let Some(param) = panel.describe() {
        title.push_str(" | ");
        title.push_str(&param);
    }
    if paused {
        title.push_str(" (paused)");
    }
    title
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_shows_unit_parameter_and_pause() {
        let catalog = Catalog::builtin();
        let definition = catalog.get("plasma").unwrap();
        let panel = ParamPanel::new(definition);
        let title = window_title("Shadertoys", definition, &panel, true);
        assert!(title.starts_with("Shadertoys - Plasma | [1/"), "{title}");
        assert!(title.ends_with(" (paused)"));

        let plain = catalog.get("hue-wheel").unwrap();
        let title = window_title("Shadertoys", plain, &ParamPanel::new(plain), false);
        assert_eq!(title, format!("Shadertoys - {}", plain.name));
    }
}
