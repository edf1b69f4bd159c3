use shadertoy_catalog::catalog::Catalog;
use shadertoy_catalog::config::{Config, TextureEntry};
use shadertoy_catalog::cpu::{save_png, CpuRenderer, FrameInputs};
use shadertoy_catalog::graph::{Binding, FramePlan, FrameRef};
use shadertoy_catalog::lint::lint;
use shadertoy_catalog::params::ParamPanel;
use shadertoy_catalog::textures::{TextureData, TextureLibrary};
use shadertoy_catalog::uniforms::DateStamp;
use shared::meta::BufferSlot;

fn date() -> DateStamp {
    DateStamp {
        year: 2024.0,
        month: 6.0,
        day: 14.0,
        seconds: 10.0 * 3600.0 + 9.0 * 60.0 + 30.0,
    }
}

fn render(key: &str, config: &Config, size: (u32, u32), frames: u32) -> TextureData {
    let catalog = Catalog::builtin();
    let index = catalog.index_of(key).unwrap();
    let mut library = TextureLibrary::new(config);
    let mut renderer = CpuRenderer::new(index, size.0, size.1, &mut library).unwrap();
    let panel = ParamPanel::new(renderer.definition());

    let mut last = None;
    for frame in 0..frames {
        last = Some(
            renderer
                .render_frame(&FrameInputs::fixed_rate(frame, 30.0, date(), &panel))
                .clone(),
        );
    }
    last.unwrap()
}

#[test]
fn catalog_lints_clean() {
    let catalog = Catalog::builtin();
    assert_eq!(lint(catalog.definitions()), vec![]);
}

#[test]
fn keys_are_unique_and_navigation_visits_every_unit() {
    let catalog = Catalog::builtin();
    let start = catalog.first().unwrap();
    let mut seen = vec![start];
    let mut index = catalog.next(start);
    while index != start {
        seen.push(index);
        index = catalog.next(index);
    }
    assert_eq!(seen.len(), catalog.len());
}

#[test]
fn every_unit_renders_on_the_cpu() {
    let config = Config::default();
    for (_, definition) in Catalog::builtin().sorted() {
        let image = render(definition.key, &config, (24, 16), 3);
        assert_eq!(image.size(), (24, 16));
        assert!(
            image.pixels.iter().flatten().all(|v| v.is_finite()),
            "{} produced non-finite pixels",
            definition.key
        );
        assert!(
            image.pixels.iter().all(|p| p[3] == 1.0),
            "{} image pass is not opaque",
            definition.key
        );
    }
}

#[test]
fn particle_trails_reads_buffers_in_pass_order() {
    let catalog = Catalog::builtin();
    let plan = FramePlan::build(catalog.get("particle-trails").unwrap()).unwrap();
    let buffer = |slot, frame| Binding::Buffer { slot, frame };

    assert_eq!(plan.passes.len(), 3);
    assert_eq!(plan.passes[0].bindings, [Binding::Empty; 4]);
    assert_eq!(plan.passes[1].bindings[0], buffer(BufferSlot::A, FrameRef::Current));
    assert_eq!(plan.passes[1].bindings[1], buffer(BufferSlot::B, FrameRef::Previous));
    assert_eq!(plan.passes[2].bindings[0], buffer(BufferSlot::B, FrameRef::Current));
    assert_eq!(plan.passes[2].bindings[1], buffer(BufferSlot::A, FrameRef::Current));
}

#[test]
fn feedback_units_evolve_between_frames() {
    let config = Config::default();
    for key in ["game-of-life", "reaction-diffusion", "particle-trails"] {
        let early = render(key, &config, (32, 32), 2);
        let later = render(key, &config, (32, 32), 8);
        assert_ne!(early, later, "{key} did not change over time");
    }
}

#[test]
fn configured_texture_replaces_noise() {
    let dir = tempfile::tempdir().unwrap();
    let flat = TextureData::filled(4, 4, [0.2, 0.6, 0.9, 1.0]);
    save_png(&flat, &dir.path().join("swirl.png")).unwrap();

    let mut config = Config::default();
    config.base_dir = dir.path().to_path_buf();
    config.textures.insert(
        "swirl-source".to_string(),
        TextureEntry::Image("swirl.png".into()),
    );

    let with_texture = render("texture-warp", &config, (16, 16), 1);
    let with_noise = render("texture-warp", &Config::default(), (16, 16), 1);
    assert_ne!(with_texture, with_noise);
}

#[test]
fn render_writes_a_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plasma.png");
    let image = render("plasma", &Config::default(), (20, 10), 1);
    save_png(&image, &path).unwrap();

    let decoded = TextureData::load(&path).unwrap();
    assert_eq!(decoded.size(), (20, 10));
}
