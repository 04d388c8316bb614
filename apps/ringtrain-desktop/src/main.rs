mod startup;

use anyhow::Context;
use clap::Parser;
use egui::Context as EguiContext;
use ringtrain_assets::TextureImage;
use ringtrain_common::WindowConfig;
use ringtrain_input::{Action, InputSampler, InputTuning, KeyBindings, ScrollDelta};
use ringtrain_kernel::{FrameTransforms, Scene};
use ringtrain_render_wgpu::{ShaderPass, ShaderSources, WgpuRenderer};
use ringtrain_tools::SceneInspector;
use startup::{Prepared, StartupError};
use std::collections::HashSet;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "ringtrain-desktop", about = "Ring of cars running around a circular track")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene configuration file (YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overlay texture image
    #[arg(long, default_value = "assets/info.png")]
    texture: PathBuf,

    /// Directory holding cube.wgsl, overlay.wgsl and track.wgsl
    #[arg(long)]
    shader_dir: Option<PathBuf>,

    /// Advance time by measured frame duration instead of a fixed step
    #[arg(long)]
    wall_clock: bool,
}

fn default_bindings() -> KeyBindings<KeyCode> {
    KeyBindings::new()
        .bind(KeyCode::KeyW, Action::Accelerate)
        .bind(KeyCode::KeyS, Action::Decelerate)
        .bind(KeyCode::Space, Action::TogglePause)
        .bind(KeyCode::KeyA, Action::RotateLeft)
        .bind(KeyCode::KeyD, Action::RotateRight)
        .bind(KeyCode::KeyC, Action::ToggleCulling)
        .bind(KeyCode::Escape, Action::Exit)
}

/// Application state.
struct AppState {
    scene: Scene,
    sampler: InputSampler,
    bindings: KeyBindings<KeyCode>,
    keys_held: HashSet<KeyCode>,
    show_inspector: bool,
    exit_requested: bool,
    last_frame: Instant,
}

impl AppState {
    fn new(scene: Scene, tuning: InputTuning) -> Self {
        Self {
            scene,
            sampler: InputSampler::new(tuning),
            bindings: default_bindings(),
            keys_held: HashSet::new(),
            show_inspector: false,
            exit_requested: false,
            last_frame: Instant::now(),
        }
    }

    /// One frame of simulation: input, clock, then transforms.
    fn update(&mut self) -> FrameTransforms {
        let now = Instant::now();
        let elapsed = now - self.last_frame;
        self.last_frame = now;

        let snapshot = self.bindings.snapshot(&self.keys_held);
        let outcome = self.sampler.sample_scene(snapshot, &mut self.scene);
        if outcome.pause_toggled {
            tracing::info!(paused = self.scene.sim.paused(), "pause toggled");
        }
        if outcome.culling_toggled {
            tracing::info!(enabled = self.scene.flags.culling_enabled, "culling toggled");
        }
        if outcome.exit_requested {
            tracing::info!("exit requested");
            self.exit_requested = true;
        }

        self.scene.advance(elapsed);
        self.scene.frame_transforms()
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool, repeat: bool) {
        if pressed {
            self.keys_held.insert(key);
        } else {
            self.keys_held.remove(&key);
        }

        if pressed && !repeat && key == KeyCode::F1 {
            self.show_inspector = !self.show_inspector;
        }
    }

    /// Forget every held key. Platforms that do not synthesize releases on
    /// focus loss would otherwise leave them held.
    fn release_all_keys(&mut self) {
        self.keys_held.clear();
    }

    fn handle_scroll(&mut self, delta: MouseScrollDelta) {
        let delta = match delta {
            MouseScrollDelta::LineDelta(_, y) => ScrollDelta::Lines(y),
            MouseScrollDelta::PixelDelta(pos) => ScrollDelta::Pixels(pos.y as f32),
        };
        self.sampler.scroll(&mut self.scene.camera_state, delta);
    }

    fn draw_ui(&mut self, ctx: &EguiContext, passes: &[(ShaderPass, bool)]) {
        if !self.show_inspector {
            return;
        }

        let summary = SceneInspector::summary(&self.scene);

        egui::SidePanel::left("inspector")
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.heading("Ring Train");
                ui.separator();
                ui.label(format!(
                    "Frame: {}  Time: {:.2}",
                    summary.frames, summary.simulated_time
                ));
                ui.label(format!(
                    "Speed: {:.3}{}",
                    summary.speed,
                    if summary.paused { " (paused)" } else { "" }
                ));
                ui.label(format!(
                    "FOV: {:.1}°  Orbit: {:.1}°",
                    summary.fov_degrees, summary.orbit_degrees
                ));
                ui.label(format!(
                    "Anchor: ({:.2}, {:.2}, {:.2})",
                    summary.anchor[0], summary.anchor[1], summary.anchor[2]
                ));
                ui.label(format!(
                    "Culling: {}",
                    if summary.culling_enabled { "on" } else { "off" }
                ));
                ui.separator();

                ui.heading("Cars");
                for index in 0..summary.cars {
                    if let Some(car) = SceneInspector::inspect_car(&self.scene, index) {
                        ui.monospace(car.to_string());
                    }
                }
                ui.separator();

                ui.heading("Passes");
                for (pass, enabled) in passes {
                    ui.label(format!(
                        "{}: {}",
                        pass.file_stem(),
                        if *enabled { "ok" } else { "disabled" }
                    ));
                }
                ui.separator();

                ui.heading("Tools");
                ui.horizontal(|ui| {
                    if ui.button("Pause").clicked() {
                        self.scene.sim.toggle_pause();
                    }
                    if ui.button("Culling").clicked() {
                        self.scene.flags.toggle_culling();
                    }
                });

                ui.separator();
                ui.small("F1: Inspector | W/S: Speed | A/D: Orbit | Space: Pause");
                ui.small("C: Culling | Wheel: Zoom | Esc: Quit");
            });
    }
}

/// GPU objects that exist once the window is up.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }
}

fn request_gpu(
    window: Arc<Window>,
) -> anyhow::Result<(wgpu::Surface<'static>, wgpu::Adapter, wgpu::Device, wgpu::Queue)> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });

    let surface = instance
        .create_surface(window)
        .context("create surface")?;

    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface: Some(&surface),
        force_fallback_adapter: false,
    }))
    .context("no compatible GPU adapter")?;

    let (device, queue) = pollster::block_on(adapter.request_device(
        &wgpu::DeviceDescriptor {
            label: Some("ringtrain_device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
        },
        None,
    ))
    .context("create device")?;

    device.on_uncaptured_error(Box::new(|err| {
        tracing::error!("uncaptured GPU error: {err}");
    }));

    Ok((surface, adapter, device, queue))
}

struct GpuApp {
    state: AppState,
    texture: TextureImage,
    shaders: ShaderSources,
    window_config: WindowConfig,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
    startup_error: Option<StartupError>,
}

impl GpuApp {
    fn new(prepared: Prepared) -> Self {
        let tuning = InputTuning::from(&prepared.config.motion);
        Self {
            state: AppState::new(prepared.scene, tuning),
            texture: prepared.texture,
            shaders: prepared.shaders,
            window_config: prepared.config.window,
            gpu: None,
            egui_ctx: EguiContext::default(),
            startup_error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<Gpu, StartupError> {
        let attrs = Window::default_attributes()
            .with_title(self.window_config.title.clone())
            .with_inner_size(PhysicalSize::new(
                self.window_config.width,
                self.window_config.height,
            ));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let (surface, adapter, device, queue) =
            request_gpu(window.clone()).map_err(|e| StartupError::Gpu(format!("{e:#}")))?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(surface_caps.formats.first())
            .copied()
            .ok_or_else(|| StartupError::Gpu("surface reports no formats".into()))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        self.state.scene.set_viewport(config.width, config.height);

        let renderer = WgpuRenderer::new(
            &device,
            &queue,
            surface_format,
            config.width,
            config.height,
            &self.shaders,
            &self.texture,
            self.state.scene.track(),
            self.state.scene.formation().count(),
        )?;

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Gpu {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn redraw(&mut self) {
        let frame = self.state.update();

        let Some(gpu) = &mut self.gpu else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gpu.renderer.render(&gpu.device, &gpu.queue, &view, &frame);

        let passes: Vec<(ShaderPass, bool)> = ShaderPass::ALL
            .iter()
            .map(|&pass| (pass, gpu.renderer.pass_enabled(pass)))
            .collect();
        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.state.draw_ui(ctx, &passes);
        });
        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        gpu.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() || self.startup_error.is_some() {
            return;
        }
        match self.init(event_loop) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => {
                self.startup_error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let WindowEvent::Focused(false) = event {
            self.state.release_all_keys();
        }

        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                // A release egui swallowed must still lift the key.
                if let Some(key) = released_key(&event) {
                    self.state.handle_key(key, false, false);
                }
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("window closed");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                    self.state
                        .scene
                        .set_viewport(gpu.config.width, gpu.config.height);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        repeat,
                        ..
                    },
                ..
            } => {
                self.state
                    .handle_key(key, key_state == ElementState::Pressed, repeat);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.state.handle_scroll(delta);
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
                if self.state.exit_requested {
                    event_loop.exit();
                } else if let Some(gpu) = &self.gpu {
                    gpu.window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn released_key(event: &WindowEvent) -> Option<KeyCode> {
    match event {
        WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    physical_key: PhysicalKey::Code(key),
                    state: ElementState::Released,
                    ..
                },
            ..
        } => Some(*key),
        _ => None,
    }
}

fn run(cli: Cli) -> Result<(), StartupError> {
    let prepared = startup::prepare(
        cli.config.as_deref(),
        &cli.texture,
        cli.shader_dir.as_deref(),
        cli.wall_clock,
    )?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(prepared);
    event_loop.run_app(&mut app)?;

    match app.startup_error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("ringtrain-desktop starting");

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}
