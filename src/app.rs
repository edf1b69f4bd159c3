//! Windowed host: one window, one unit at a time.

use std::sync::Arc;

use anyhow::Context;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, ModifiersState, NamedKey},
    window::{Window, WindowId},
};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::gpu::{encode_frame, load_shader_module, FrameRequest, GpuContext, ShaderPipelines};
use crate::session::Session;
use crate::textures::TextureLibrary;
use crate::uniforms::{DateStamp, FrameClock, MouseTracker, StandardUniforms};

/// A user action, independent of how it was triggered.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    NextShader,
    PreviousShader,
    NextParam,
    PreviousParam,
    IncreaseParam,
    DecreaseParam,
    TogglePause,
    Reset,
    Quit,
}

pub fn command_for_key(key: &Key, shift: bool) -> Option<Command> {
    match key {
        Key::Named(NamedKey::ArrowRight) => Some(Command::NextShader),
        Key::Named(NamedKey::ArrowLeft) => Some(Command::PreviousShader),
        Key::Named(NamedKey::Tab) if shift => Some(Command::PreviousParam),
        Key::Named(NamedKey::Tab) => Some(Command::NextParam),
        Key::Named(NamedKey::ArrowUp) => Some(Command::IncreaseParam),
        Key::Named(NamedKey::ArrowDown) => Some(Command::DecreaseParam),
        Key::Named(NamedKey::Space) => Some(Command::TogglePause),
        Key::Named(NamedKey::Escape) => Some(Command::Quit),
        Key::Character(c) if c.eq_ignore_ascii_case("r") => Some(Command::Reset),
        _ => None,
    }
}

struct Running {
    window: Arc<Window>,
    gpu: GpuContext,
    pipelines: ShaderPipelines,
    session: Option<Session>,
    clock: FrameClock,
    mouse: MouseTracker,
    modifiers: ModifiersState,
    title: String,
}

struct App {
    config: Config,
    catalog: Catalog,
    library: TextureLibrary,
    initial: usize,
    running: Option<Running>,
    error: Option<anyhow::Error>,
}

/// Opens the window and runs until it is closed. `shader` overrides the
/// configured startup unit.
pub fn run(config: Config, shader: Option<&str>) -> anyhow::Result<()> {
    let catalog = Catalog::builtin();
    let initial = match shader.or(config.startup.shader.as_deref()) {
        Some(key) => catalog.index_of(key)?,
        None => catalog.first()?,
    };

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        library: TextureLibrary::new(&config),
        config,
        catalog,
        initial,
        running: None,
        error: None,
    };
    event_loop.run_app(&mut app)?;

    match app.error {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

impl App {
    fn start(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<Running> {
        let window_config = &self.config.window;
        let attributes = Window::default_attributes()
            .with_title(&window_config.title)
            .with_inner_size(LogicalSize::new(window_config.width, window_config.height));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .context("Failed to create window")?,
        );

        let gpu = GpuContext::new(window.clone(), window_config.vsync)?;
        let module = load_shader_module(&gpu.device, self.config.shader_binary().as_deref())?;
        let pipelines = ShaderPipelines::new(&gpu.device, &gpu.queue, &module, gpu.render_format)?;
        let session = Session::start(
            &self.catalog,
            self.initial,
            &self.config,
            &mut self.library,
            &gpu,
        )?;

        let mut clock = FrameClock::new();
        if self.config.startup.paused {
            clock.pause();
        }
        let (_, height) = gpu.size();

        Ok(Running {
            window,
            gpu,
            pipelines,
            session: Some(session),
            clock,
            mouse: MouseTracker::new(height),
            modifiers: ModifiersState::default(),
            title: String::new(),
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{error:#}");
        self.error = Some(error);
        event_loop.exit();
    }

    fn execute(&mut self, command: Command, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let Some(running) = self.running.as_mut() else {
            return Ok(());
        };
        let Some(session) = running.session.as_mut() else {
            return Ok(());
        };

        match command {
            Command::NextShader | Command::PreviousShader => {
                let index = if command == Command::NextShader {
                    self.catalog.next(session.index)
                } else {
                    self.catalog.previous(session.index)
                };
                if let Some(old) = running.session.take() {
                    old.teardown();
                }
                running.session = Some(Session::start(
                    &self.catalog,
                    index,
                    &self.config,
                    &mut self.library,
                    &running.gpu,
                )?);
                running.clock.reset();
                running.mouse.reset();
            }
            Command::NextParam => session.panel.select_next(),
            Command::PreviousParam => session.panel.select_previous(),
            Command::IncreaseParam => session.panel.increase(),
            Command::DecreaseParam => session.panel.decrease(),
            Command::TogglePause => running.clock.toggle_pause(),
            Command::Reset => {
                running.clock.reset();
                session.targets.reset(&running.gpu.device);
                log::info!("Reset {}", session.definition.key);
            }
            Command::Quit => event_loop.exit(),
        }
        Ok(())
    }
}

impl Running {
    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.gpu.resize(width, height);
        self.mouse.resize(height);
        if let Some(session) = self.session.as_mut() {
            session.targets.resize(&self.gpu.device, (width, height));
        }
        self.clock.restart_frames();
    }

    fn render(&mut self, title_prefix: &str) -> anyhow::Result<()> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };

        self.clock.tick();
        let uniforms = StandardUniforms::from_clock(
            session.index as u32,
            self.gpu.size(),
            &self.clock,
            &self.mouse,
            DateStamp::now(),
        );
        let mut constants = uniforms.constants();
        session.panel.write_into(&mut constants);

        let frame = self.gpu.acquire()?;
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor {
            format: Some(self.gpu.render_format),
            ..Default::default()
        });
        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame"),
            });
        encode_frame(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &self.pipelines,
            &mut session.targets,
            &view,
            &FrameRequest {
                plan: &session.plan,
                buffer_format: session.definition.buffer_format,
                constants,
                time: self.clock.time(),
                run_buffers: !self.clock.is_paused() || self.clock.frame() == 0,
            },
        );
        self.gpu.queue.submit(Some(encoder.finish()));
        self.window.pre_present_notify();
        frame.present();

        self.clock.end_frame();
        self.mouse.end_frame();

        let title = session.title(title_prefix, self.clock.is_paused());
        if title != self.title {
            self.window.set_title(&title);
            self.title = title;
        }
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        match self.start(event_loop) {
            Ok(running) => self.running = Some(running),
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(running) = self.running.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => running.resize(size.width, size.height),
            WindowEvent::ModifiersChanged(modifiers) => running.modifiers = modifiers.state(),
            WindowEvent::CursorMoved { position, .. } => running.mouse.moved(position.x, position.y),
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => running.mouse.pressed(),
                ElementState::Released => running.mouse.released(),
            },
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                let shift = running.modifiers.shift_key();
                if let Some(command) = command_for_key(&event.logical_key, shift) {
                    if let Err(e) = self.execute(command, event_loop) {
                        self.fail(event_loop, e);
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = running.render(&self.config.window.title) {
                    self.fail(event_loop, e);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(running) = &self.running {
            running.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(session) = self.running.as_mut().and_then(|r| r.session.take()) {
            session.teardown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_commands() {
        let named = |key| Key::Named(key);
        assert_eq!(command_for_key(&named(NamedKey::ArrowRight), false), Some(Command::NextShader));
        assert_eq!(command_for_key(&named(NamedKey::ArrowLeft), false), Some(Command::PreviousShader));
        assert_eq!(command_for_key(&named(NamedKey::Tab), false), Some(Command::NextParam));
        assert_eq!(command_for_key(&named(NamedKey::Tab), true), Some(Command::PreviousParam));
        assert_eq!(command_for_key(&named(NamedKey::ArrowUp), false), Some(Command::IncreaseParam));
        assert_eq!(command_for_key(&named(NamedKey::ArrowDown), false), Some(Command::DecreaseParam));
        assert_eq!(command_for_key(&named(NamedKey::Space), false), Some(Command::TogglePause));
        assert_eq!(command_for_key(&named(NamedKey::Escape), false), Some(Command::Quit));
        assert_eq!(command_for_key(&Key::Character("R".into()), true), Some(Command::Reset));
        assert_eq!(command_for_key(&Key::Character("x".into()), false), None);
    }
}
