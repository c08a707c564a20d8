//! Ember3D demo - loads a glTF model and plays its first animation
//!
//! ```text
//! ember3d_demo <model.gltf> [--frames N] [--no-validation] [--shaders DIR] [--exit-after N]
//! ```

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use ember_3d_engine::{engine_error, engine_info, engine_warn};
use ember_3d_engine_renderer_vulkan::ember3d::device::Extent2D;
use ember_3d_engine_renderer_vulkan::ember3d::render::{Config, FrameStatus, Renderer};
use ember_3d_engine_renderer_vulkan::ember3d::scene::Camera;
use ember_3d_engine_renderer_vulkan::ember3d::{print_validation_stats_report, VulkanDevice};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

#[derive(Parser, Debug)]
#[command(name = "ember3d_demo", about = "Render a glTF model and play its first animation")]
struct CliArgs {
    /// glTF 2.0 file to display
    model: PathBuf,
    /// Frames in flight
    #[arg(long, default_value_t = 3)]
    frames: usize,
    /// Run without the Vulkan validation layer
    #[arg(long)]
    no_validation: bool,
    /// Directory holding skinned.vert.spv and skinned.frag.spv
    #[arg(long, default_value = "shaders")]
    shaders: PathBuf,
    /// Exit after this many presented frames
    #[arg(long)]
    exit_after: Option<u64>,
}

impl CliArgs {
    /// Renderer configuration requested on the command line
    fn config(&self) -> Config {
        Config {
            app_name: "Ember3D Demo".to_string(),
            enable_validation: !self.no_validation,
            frames_in_flight: self.frames,
            shader_dir: self.shaders.clone(),
            ..Config::default()
        }
    }
}

struct App {
    args: CliArgs,
    /// Declared before the window: the surface must go first
    renderer: Option<Renderer<VulkanDevice>>,
    window: Option<Window>,
    camera: Camera,
    last_frame: Instant,
    frames_presented: u64,
    fps_timer: Instant,
    fps_frames: u32,
    failed: bool,
}

impl App {
    fn new(args: CliArgs) -> Self {
        Self {
            args,
            renderer: None,
            window: None,
            camera: Camera::default(),
            last_frame: Instant::now(),
            frames_presented: 0,
            fps_timer: Instant::now(),
            fps_frames: 0,
            failed: false,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> eyre::Result<()> {
        let attributes = Window::default_attributes()
            .with_title("Ember3D")
            .with_inner_size(LogicalSize::new(1280, 720));
        let window = event_loop.create_window(attributes)?;

        let config = self.args.config();
        let size = window.inner_size();
        let device = VulkanDevice::new(&window, &config)?;
        let mut renderer = Renderer::new(device, config, Extent2D::new(size.width, size.height))?;

        let model = renderer.load_model(&self.args.model)?;
        if let Some(model) = renderer.model_mut(model) {
            if let Err(error) = model.play_animation(0) {
                engine_warn!("ember3d::Demo", "No animation to play: {}", error);
            }
        }

        engine_info!(
            "ember3d::Demo",
            "Loaded '{}' on {}",
            self.args.model.display(),
            renderer.device().device_name()
        );
        self.renderer = Some(renderer);
        self.window = Some(window);
        self.last_frame = Instant::now();
        self.fps_timer = Instant::now();
        Ok(())
    }

    fn draw_frame(&mut self) -> eyre::Result<bool> {
        let (Some(renderer), Some(window)) = (self.renderer.as_mut(), self.window.as_ref()) else {
            return Ok(true);
        };

        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        let size = window.inner_size();
        let status = renderer.render(&self.camera, Extent2D::new(size.width, size.height), dt)?;
        if let FrameStatus::Presented(stats) = status {
            self.frames_presented += 1;
            self.fps_frames += 1;
            let elapsed = self.fps_timer.elapsed().as_secs_f32();
            if elapsed >= 1.0 {
                engine_info!(
                    "ember3d::Demo",
                    "{:.1} fps, {} draws, {} triangles",
                    self.fps_frames as f32 / elapsed,
                    stats.draw_calls,
                    stats.triangles
                );
                self.fps_frames = 0;
                self.fps_timer = Instant::now();
            }
        }

        Ok(self
            .args
            .exit_after
            .map_or(true, |limit| self.frames_presented < limit))
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        // Renderer waits for the device and releases GPU objects before the window goes
        self.renderer = None;
        self.window = None;
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(error) = self.init(event_loop) {
            engine_error!("ember3d::Demo", "Initialization failed: {}", error);
            self.failed = true;
            self.shutdown(event_loop);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => self.shutdown(event_loop),
            WindowEvent::RedrawRequested => match self.draw_frame() {
                Ok(true) => {}
                Ok(false) => self.shutdown(event_loop),
                Err(error) => {
                    engine_error!("ember3d::Demo", "Frame failed: {}", error);
                    self.failed = true;
                    self.shutdown(event_loop);
                }
            },
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> eyre::Result<()> {
    let args = CliArgs::parse();

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(args);
    event_loop.run_app(&mut app)?;

    print_validation_stats_report();
    if app.failed {
        eyre::bail!("demo stopped on an error");
    }
    Ok(())
}
