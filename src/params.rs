//! Keyboard-driven parameter panel for the active unit.

use std::collections::HashMap;

use shared::meta::{ParamDefinition, ParamKind, ShaderDefinition};
use shared::ShaderConstants;

#[derive(Debug)]
pub struct ParamPanel {
    key: &'static str,
    params: &'static [ParamDefinition],
    values: Vec<f32>,
    selected: usize,
}

impl ParamPanel {
    /// Registers every parameter of `definition` at its default.
    pub fn new(definition: &'static ShaderDefinition) -> Self {
        log::debug!(
            "{}: binding {} parameter(s)",
            definition.key,
            definition.params.len()
        );
        Self {
            key: definition.key,
            params: definition.params,
            values: definition.params.iter().map(|p| p.default).collect(),
            selected: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn selected(&self) -> Option<&'static ParamDefinition> {
        self.params.get(self.selected)
    }

    pub fn value(&self, name: &str) -> Option<f32> {
        self.position(name).map(|index| self.values[index])
    }

    /// Applies configured values; unknown names are logged and skipped.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, f32>) {
        let mut names: Vec<_> = overrides.keys().collect();
        names.sort();
        for name in names {
            let value = overrides[name];
            if self.set(name, value).is_none() {
                log::warn!("{}: no parameter named `{}`, ignoring override", self.key, name);
            }
        }
    }

    pub fn select_next(&mut self) {
        if !self.params.is_empty() {
            self.selected = (self.selected + 1) % self.params.len();
        }
    }

    pub fn select_previous(&mut self) {
        if !self.params.is_empty() {
            self.selected = (self.selected + self.params.len() - 1) % self.params.len();
        }
    }

    pub fn increase(&mut self) {
        self.nudge(1.0);
    }

    pub fn decrease(&mut self) {
        self.nudge(-1.0);
    }

    fn nudge(&mut self, direction: f32) {
        let Some(param) = self.selected() else {
            return;
        };
        let current = self.values[self.selected];
        let next = match param.kind {
            ParamKind::Float { step, .. } => current + direction * step,
            ParamKind::Int { .. } => current + direction,
            ParamKind::Bool => 1.0 - current,
        };
        self.values[self.selected] = constrain(param, next);
    }

    /// Sets a parameter by name, returning the stored (clamped) value.
    pub fn set(&mut self, name: &str, value: f32) -> Option<f32> {
        let index = self.position(name)?;
        let stored = constrain(&self.params[index], value);
        self.values[index] = stored;
        Some(stored)
    }

    /// Restores every default.
    pub fn reset(&mut self) {
        for (value, param) in self.values.iter_mut().zip(self.params) {
            *value = param.default;
        }
    }

    pub fn write_into(&self, constants: &mut ShaderConstants) {
        for (param, &value) in self.params.iter().zip(&self.values) {
            if let Some(slot) = constants.params.get_mut(param.slot as usize) {
                *slot = value;
            }
        }
    }

    /// One-line summary of the selected parameter, e.g. `[2/3] Speed: 1.50`.
    pub fn describe(&self) -> Option<String> {
        let param = self.selected()?;
        let value = self.values[self.selected];
        let shown = match param.kind {
            ParamKind::Float { .. } => format!("{value:.3}"),
            ParamKind::Int { .. } => format!("{}", value as i32),
            ParamKind::Bool => (if value > 0.5 { "on" } else { "off" }).to_string(),
        };
        Some(format!(
            "[{}/{}] {}: {}",
            self.selected + 1,
            self.params.len(),
            param.label,
            shown
        ))
    }

    pub fn teardown(self) {
        log::debug!("{}: releasing parameter panel", self.key);
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|param| param.name == name)
    }
}

fn constrain(param: &ParamDefinition, value: f32) -> f32 {
    let (min, max) = param.range();
    let value = match param.kind {
        ParamKind::Float { .. } => value,
        ParamKind::Int { .. } => value.round(),
        ParamKind::Bool => {
            if value > 0.5 {
                1.0
            } else {
                0.0
            }
        }
    };
    value.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::meta::{BufferFormat, IMAGE_ONLY};

    static PARAMS: [ParamDefinition; 3] = [
        ParamDefinition::float(2, "speed", "Speed", 1.0, 0.0, 2.0, 0.25),
        ParamDefinition::int(0, "count", "Count", 4, 1, 8),
        ParamDefinition::toggle(5, "invert", "Invert", false),
    ];

    static UNIT: ShaderDefinition = ShaderDefinition {
        key: "panel-test",
        name: "Panel Test",
        sort: 0,
        buffer_format: BufferFormat::Unorm8,
        passes: IMAGE_ONLY,
        params: &PARAMS,
    };

    #[test]
    fn starts_at_defaults_and_writes_slots() {
        let panel = ParamPanel::new(&UNIT);
        let mut constants = ShaderConstants::default();
        panel.write_into(&mut constants);
        assert_eq!(constants.params[2], 1.0);
        assert_eq!(constants.params[0], 4.0);
        assert_eq!(constants.params[5], 0.0);
    }

    #[test]
    fn adjusts_by_kind() {
        let mut panel = ParamPanel::new(&UNIT);
        panel.increase();
        assert_eq!(panel.value("speed"), Some(1.25));
        for _ in 0..10 {
            panel.increase();
        }
        assert_eq!(panel.value("speed"), Some(2.0));

        panel.select_next();
        panel.decrease();
        assert_eq!(panel.value("count"), Some(3.0));

        panel.select_next();
        panel.increase();
        assert_eq!(panel.value("invert"), Some(1.0));
        panel.decrease();
        assert_eq!(panel.value("invert"), Some(0.0));
    }

    #[test]
    fn selection_wraps() {
        let mut panel = ParamPanel::new(&UNIT);
        panel.select_previous();
        assert_eq!(panel.selected().map(|p| p.name), Some("invert"));
        panel.select_next();
        assert_eq!(panel.selected().map(|p| p.name), Some("speed"));
    }

    #[test]
    fn set_clamps_and_rounds() {
        let mut panel = ParamPanel::new(&UNIT);
        assert_eq!(panel.set("count", 6.6), Some(7.0));
        assert_eq!(panel.set("count", 100.0), Some(8.0));
        assert_eq!(panel.set("speed", -3.0), Some(0.0));
        assert_eq!(panel.set("missing", 1.0), None);
        panel.reset();
        assert_eq!(panel.value("count"), Some(4.0));
    }

    #[test]
    fn overrides_skip_unknown_names() {
        let mut panel = ParamPanel::new(&UNIT);
        let overrides = HashMap::from([("speed".to_string(), 0.5), ("nope".to_string(), 3.0)]);
        panel.apply_overrides(&overrides);
        assert_eq!(panel.value("speed"), Some(0.5));
    }

    #[test]
    fn describes_selected_param() {
        let mut panel = ParamPanel::new(&UNIT);
        assert_eq!(panel.describe().as_deref(), Some("[1/3] Speed: 1.000"));
        panel.select_next();
        assert_eq!(panel.describe().as_deref(), Some("[2/3] Count: 4"));
        panel.select_next();
        assert_eq!(panel.describe().as_deref(), Some("[3/3] Invert: off"));
    }

    #[test]
    fn empty_panel_is_inert() {
        let unit = &catalog_shaders::hue_wheel::DEFINITION;
        let mut panel = ParamPanel::new(unit);
        panel.increase();
        panel.select_next();
        assert!(panel.is_empty());
        assert_eq!(panel.describe(), None);
    }
}
