mod audio;

use anyhow::{Context, Result};
use cavern_common::CaveConfig;
use cavern_input::{InputEvent, pointer_to_ndc};
use audio::RodioAudio;
use cavern_interact::{DisplaySink, Session};
use cavern_populate::generate;
use cavern_render_wgpu::WgpuRenderer;
use clap::Parser;
use egui::Context as EguiContext;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

const WELCOME_DURATION: Duration = Duration::from_millis(1500);

#[derive(Parser)]
#[command(name = "cavern-desktop", about = "Torch-lit cave explorer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// RNG seed; random when omitted
    #[arg(short, long)]
    seed: Option<u64>,

    /// Explorer profiles offered on the start screen
    #[arg(long, value_delimiter = ',', default_value = "Explorer,Speleologist,Biologist")]
    profiles: Vec<String>,
}

/// The info card overlay. Selection writes into it; egui reads it.
#[derive(Debug, Default)]
struct InfoCard {
    title: String,
    text: String,
    visible: bool,
}

impl DisplaySink for InfoCard {
    fn show(&mut self, title: &str, text: &str) {
        self.title = title.to_owned();
        self.text = text.to_owned();
        self.visible = true;
    }

    fn hide(&mut self) {
        self.visible = false;
    }
}

/// Start screen flow: pick a profile, greet, then offer the Enter button.
enum Stage {
    Profiles,
    Welcome { name: String, since: Instant },
    Ready { name: String },
    Exploring { since: Instant },
}

struct AppState {
    session: Session<InfoCard, RodioAudio>,
    scenery: Vec<cavern_populate::SceneryPiece>,
    stage: Stage,
    profiles: Vec<String>,
    cursor: (f32, f32),
    viewport: (u32, u32),
}

impl AppState {
    fn new(config: &CaveConfig, seed: u64, profiles: Vec<String>) -> Self {
        let cave = generate(&config.population, &mut SmallRng::seed_from_u64(seed));
        Self {
            session: Session::new(
                cave.population,
                config,
                InfoCard::default(),
                RodioAudio::new(seed),
            ),
            scenery: cave.scenery,
            stage: Stage::Profiles,
            profiles,
            cursor: (0.0, 0.0),
            viewport: (1, 1),
        }
    }

    fn exploring(&self) -> bool {
        matches!(self.stage, Stage::Exploring { .. })
    }

    fn enter(&mut self) {
        self.session.start();
        self.stage = Stage::Exploring {
            since: Instant::now(),
        };
    }

    fn update(&mut self) {
        if let Stage::Welcome { name, since } = &self.stage {
            if since.elapsed() >= WELCOME_DURATION {
                self.stage = Stage::Ready { name: name.clone() };
            }
        }
        if let Stage::Exploring { since } = self.stage {
            let report = self.session.tick(since.elapsed().as_secs_f32());
            if let Some(hit) = &report.hit {
                tracing::trace!(node = %hit.node, distance = hit.distance, "pointer hit");
            }
        }
    }

    fn pointer_moved(&mut self, x: f32, y: f32) {
        self.cursor = (x, y);
        if let Some(ndc) = pointer_to_ndc(x, y, self.viewport.0, self.viewport.1) {
            self.session.input(InputEvent::PointerMoved(ndc));
        }
    }

    fn resized(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
        self.session.input(InputEvent::Resized { width, height });
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        match &self.stage {
            Stage::Profiles => {
                let mut picked = None;
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(ui.available_height() * 0.3);
                        ui.heading("Into the Cave");
                        ui.label("Choose your explorer");
                        ui.add_space(12.0);
                        for name in &self.profiles {
                            if ui.button(name).clicked() {
                                picked = Some(name.clone());
                            }
                        }
                    });
                });
                if let Some(name) = picked {
                    tracing::info!(profile = %name, "profile selected");
                    self.stage = Stage::Welcome {
                        name,
                        since: Instant::now(),
                    };
                }
            }
            Stage::Welcome { name, .. } => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(ui.available_height() * 0.4);
                        ui.heading(format!("Welcome {name}!"));
                    });
                });
            }
            Stage::Ready { name } => {
                let mut entered = false;
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(ui.available_height() * 0.4);
                        ui.label(format!("Ready, {name}?"));
                        ui.add_space(8.0);
                        entered = ui.button("Enter the cave").clicked();
                    });
                });
                if entered {
                    self.enter();
                }
            }
            Stage::Exploring { .. } => self.draw_info_card(ctx),
        }
    }

    fn draw_info_card(&mut self, ctx: &EguiContext) {
        let card = self.session.display();
        if !card.visible {
            return;
        }
        let mut close = false;
        egui::Window::new(card.title.as_str())
            .id(egui::Id::new("info_card"))
            .anchor(egui::Align2::RIGHT_BOTTOM, [-16.0, -16.0])
            .resizable(false)
            .collapsible(false)
            .default_width(320.0)
            .show(ctx, |ui| {
                ui.label(card.text.as_str());
                ui.add_space(6.0);
                close = ui.button("Close").clicked();
            });
        if close {
            self.session.dismiss_info();
        }
    }
}

/// Window, surface and device, created together once the event loop resumes.
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
    fn create(event_loop: &ActiveEventLoop, egui_ctx: &EguiContext) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Cavern")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("cavern_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
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

        let renderer = WgpuRenderer::new(&device, surface_format, config.width, config.height);
        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
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

        Ok(Self {
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

    fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }
}

struct CaveApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl CaveApp {
    fn new(state: AppState) -> Self {
        Self {
            state,
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn redraw(&mut self) {
        self.state.update();

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

        gpu.renderer.render(
            &gpu.device,
            &gpu.queue,
            &view,
            self.state.session.population(),
            &self.state.session.view(),
        );

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.state.draw_ui(ctx);
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
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for CaveApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match Gpu::create(event_loop, &self.egui_ctx) {
            Ok(mut gpu) => {
                gpu.renderer.set_scenery(&gpu.device, &self.state.scenery);
                self.state.resized(gpu.config.width, gpu.config.height);
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("failed to initialize graphics: {e:#}");
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
        let Some(gpu) = &mut self.gpu else {
            return;
        };
        let response = gpu.egui_winit.on_window_event(&gpu.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                gpu.resize(new_size.width, new_size.height);
                self.state.resized(new_size.width, new_size.height);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.state
                    .pointer_moved(position.x as f32, position.y as f32);
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: ElementState::Pressed,
                ..
            } => {
                if self.state.exploring() && !response.consumed {
                    self.state.session.input(InputEvent::Click);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
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

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => CaveConfig::load(path)?,
        None => CaveConfig::default(),
    };
    let seed = cli.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, "cavern-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = CaveApp::new(AppState::new(&config, seed, cli.profiles));
    event_loop.run_app(&mut app)?;

    Ok(())
}
