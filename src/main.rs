use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};

use shadertoy_catalog::catalog::Catalog;
use shadertoy_catalog::config::Config;
use shadertoy_catalog::cpu::{save_png, CpuRenderer, FrameInputs};
use shadertoy_catalog::lint::lint;
use shadertoy_catalog::params::ParamPanel;
use shadertoy_catalog::textures::TextureLibrary;
use shadertoy_catalog::uniforms::DateStamp;

#[derive(Parser)]
#[command(name = "shadertoys", version, about, long_about = None)]
struct Cli {
    /// Config file to use instead of the one in the user config directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Lists every unit in display order
    List,
    /// Checks the catalog's definitions and exits non-zero on problems
    Lint,
    /// Opens the catalog in a window
    Run {
        /// Unit to start with
        #[arg(long)]
        shader: Option<String>,
    },
    /// Renders a unit on the CPU and writes the last frame as a PNG
    Render {
        #[arg(long)]
        shader: String,
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value_t = 640)]
        width: u32,
        #[arg(long, default_value_t = 360)]
        height: u32,
        /// Frames to simulate; feedback units need more than one
        #[arg(long, default_value_t = 1)]
        frames: u32,
        #[arg(long, default_value_t = 60.0)]
        fps: f32,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };

    match cli.command.unwrap_or(Commands::Run { shader: None }) {
        Commands::List => {
            let catalog = Catalog::builtin();
            for (_, definition) in catalog.sorted() {
                let passes = definition.passes.len();
                println!(
                    "{:<20} {:<24} {} pass{}",
                    definition.key,
                    definition.name,
                    passes,
                    if passes == 1 { "" } else { "es" }
                );
            }
        }
        Commands::Lint => {
            let issues = lint(Catalog::builtin().definitions());
            for issue in &issues {
                println!("{issue}");
            }
            if !issues.is_empty() {
                log::error!("{} issue(s) found", issues.len());
                return Ok(ExitCode::FAILURE);
            }
            log::info!("Catalog is clean");
        }
        Commands::Run { shader } => shadertoy_catalog::app::run(config, shader.as_deref())?,
        Commands::Render {
            shader,
            out,
            width,
            height,
            frames,
            fps,
        } => render(&config, &shader, &out, (width, height), frames, fps)?,
    }
    Ok(ExitCode::SUCCESS)
}

fn render(
    config: &Config,
    key: &str,
    out: &std::path::Path,
    (width, height): (u32, u32),
    frames: u32,
    fps: f32,
) -> anyhow::Result<()> {
    anyhow::ensure!(fps > 0.0, "--fps must be positive");
    let catalog = Catalog::builtin();
    let index = catalog.index_of(key)?;
    let mut library = TextureLibrary::new(config);
    let mut renderer = CpuRenderer::new(index, width, height, &mut library)?;

    let mut panel = ParamPanel::new(renderer.definition());
    if let Some(overrides) = config.params_for(key) {
        panel.apply_overrides(overrides);
    }

    let date = DateStamp::now();
    let frames = frames.max(1);
    for frame in 0..frames - 1 {
        renderer.render_frame(&FrameInputs::fixed_rate(frame, fps, date, &panel));
    }
    let image = renderer.render_frame(&FrameInputs::fixed_rate(frames - 1, fps, date, &panel));
    save_png(image, out).with_context(|| format!("Rendering {key}"))?;
    panel.teardown();
    Ok(())
}
