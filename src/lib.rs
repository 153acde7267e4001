// src/lib.rs
//! Desktop viewer for a Casio A158W watch model with a live, procedurally
//! synthesized LCD screen.
//!
//! The library splits into a CPU core (glyph painting, the screen store and
//! its binding protocol, the repaint driver) that never touches the GPU, and
//! a thin wgpu/winit shell that uploads the synthesized frames and blits
//! them to a window.

pub mod assets;
pub mod canvas;
pub mod error;
pub mod font;
pub mod glyphs;
pub mod material;
pub mod mode;
pub mod preview;
pub mod screen;
pub mod texture;
pub mod theme;
pub mod tick;
pub mod transform;

pub use error::{Error, Result};
pub use material::{DisplayMaterial, RawMaterial, ScreenSource};
pub use mode::DisplayMode;
pub use screen::{RendererCaps, ScreenDisplay, SCREEN_SIZE};
pub use theme::{Theme, ThemeController};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use log::{info, warn};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::font::FontLibrary;
use crate::preview::PreviewPipeline;
use crate::texture::ScreenTextureGpu;

const FRAME_EXPORT_PATH: &str = "lcd-frame.png";

/// Startup options resolved by the binary from CLI and environment.
pub struct ViewerConfig {
    pub mode: DisplayMode,
    pub model_path: PathBuf,
    pub assets_dir: PathBuf,
    pub theme_file: PathBuf,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            mode: DisplayMode::default(),
            model_path: PathBuf::from("assets/models/casio_A158W.glb"),
            assets_dir: PathBuf::from("assets"),
            theme_file: PathBuf::from(theme::THEME_FILE),
        }
    }
}

// ----------------------------------------------------------------------------
// winit 0.30 + wgpu 22 App State
// ----------------------------------------------------------------------------
struct ViewerApp {
    instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,

    screen: ScreenDisplay,
    bound_materials: Vec<DisplayMaterial>,
    theme: ThemeController,

    // Created inside the `resumed` event
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    config: Option<wgpu::SurfaceConfiguration>,
    screen_gpu: Option<ScreenTextureGpu>,
    preview: Option<PreviewPipeline>,
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Poll);

        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes().with_title("A158W Watch Viewer");
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        let surface = match self.instance.create_surface(window.clone()) {
            Ok(surface) => surface,
            Err(err) => {
                log::error!("failed to create surface: {err}");
                event_loop.exit();
                return;
            }
        };
        let size = window.inner_size();
        let caps = surface.get_capabilities(&self.adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: caps.present_modes[0],
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2u32,
        };

        surface.configure(&self.device, &config);

        let screen_gpu = ScreenTextureGpu::new(&self.device, RendererCaps::default());
        let preview = PreviewPipeline::new(&self.device, config.format, &screen_gpu);
        preview.update_view(&self.queue, config.width, config.height, self.theme.current());

        self.surface = Some(surface);
        self.config = Some(config);
        self.screen_gpu = Some(screen_gpu);
        self.preview = Some(preview);

        log::debug!(
            "presenting {} bound screen material(s)",
            self.bound_materials.len()
        );
        window.request_redraw();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        if window.id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if new_size.width > 0 && new_size.height > 0 {
                    if let (Some(surface), Some(config)) =
                        (self.surface.as_ref(), self.config.as_mut())
                    {
                        config.width = new_size.width;
                        config.height = new_size.height;
                        surface.configure(&self.device, config);
                    }
                    if let Some(preview) = self.preview.as_ref() {
                        preview.update_view(
                            &self.queue,
                            new_size.width,
                            new_size.height,
                            self.theme.current(),
                        );
                    }
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => self.handle_key(event_loop, code),
            WindowEvent::RedrawRequested => {
                self.render_frame();
                if let Some(window) = self.window.as_ref() {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

impl ViewerApp {
    fn handle_key(&mut self, event_loop: &ActiveEventLoop, code: KeyCode) {
        match code {
            KeyCode::Escape => event_loop.exit(),
            KeyCode::KeyT => {
                let theme = self.theme.toggle();
                info!("theme switched to {theme:?}");
                if let (Some(preview), Some(config)) = (self.preview.as_ref(), self.config.as_ref())
                {
                    preview.update_view(&self.queue, config.width, config.height, theme);
                }
            }
            KeyCode::KeyS => match self.screen.save_frame(FRAME_EXPORT_PATH) {
                Ok(()) => info!("saved LCD frame to {FRAME_EXPORT_PATH}"),
                Err(err) => warn!("could not save LCD frame: {err}"),
            },
            _ => {}
        }
    }

    fn render_frame(&mut self) {
        let (Some(surface), Some(config)) = (self.surface.as_ref(), self.config.as_ref()) else {
            return;
        };

        // Advance the LCD clock and push any fresh frame to the GPU before
        // drawing. take_dirty hands the buffer over at most once per repaint.
        self.screen.pump(Instant::now());
        if let Some(gpu) = self.screen_gpu.as_ref() {
            if let Some(pixels) = self.screen.take_dirty() {
                gpu.upload(&self.queue, pixels);
            }
        }

        let frame = match surface.get_current_texture() {
            Ok(frame) => frame,
            Err(err) => {
                warn!("failed to acquire swap chain texture: {err:?}, reconfiguring");
                surface.configure(&self.device, config);
                match surface.get_current_texture() {
                    Ok(frame) => frame,
                    Err(err) => {
                        log::error!("failed to acquire frame after reconfigure: {err:?}");
                        return;
                    }
                }
            }
        };

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("viewer_encoder"),
            });

        if let Some(preview) = self.preview.as_ref() {
            preview.draw(&mut encoder, &view, self.theme.current());
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();
    }
}

// ----------------------------------------------------------------------------
// Async Runner
// ----------------------------------------------------------------------------
pub fn run_native(config: ViewerConfig) -> Result<()> {
    pollster::block_on(run_inner(config))
}

async fn run_inner(config: ViewerConfig) -> Result<()> {
    let event_loop = EventLoop::new()
        .map_err(|e| Error::custom(format!("failed to create event loop: {e}")))?;

    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        dx12_shader_compiler: Default::default(),
        flags: wgpu::InstanceFlags::empty(),
        gles_minor_version: wgpu::Gles3MinorVersion::Automatic,
    });

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .await
        .ok_or_else(|| Error::custom("no suitable GPU adapter"))?;

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("viewer_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        )
        .await
        .map_err(|e| Error::custom(format!("failed to request device: {e}")))?;

    let fonts = Arc::new(FontLibrary::load(&config.assets_dir));
    let mut screen = ScreenDisplay::new(config.mode, RendererCaps::default(), fonts);

    // Bind every screen material the model carries. A missing or screenless
    // model degrades to a bare synthetic screen so the LCD still shows.
    let mut bound_materials = Vec::new();
    match assets::load_watch_model(&config.model_path) {
        Ok(model) if !model.screen_materials.is_empty() => {
            for raw in model.screen_materials {
                bound_materials.push(screen.bind(ScreenSource::Raw(raw)));
            }
        }
        Ok(_) => {
            warn!(
                "{} has no screen material, using a synthetic one",
                config.model_path.display()
            );
            bound_materials.push(screen.bind(ScreenSource::Raw(RawMaterial::new("Screen"))));
        }
        Err(err) => {
            warn!(
                "could not load {}: {err}, using a synthetic screen material",
                config.model_path.display()
            );
            bound_materials.push(screen.bind(ScreenSource::Raw(RawMaterial::new("Screen"))));
        }
    }
    info!(
        "screen bound in {:?} mode ({} material(s))",
        screen.mode(),
        bound_materials.len()
    );

    let theme = ThemeController::load(config.theme_file);

    let mut app = ViewerApp {
        instance,
        adapter,
        device: Arc::new(device),
        queue: Arc::new(queue),
        screen,
        bound_materials,
        theme,
        window: None,
        surface: None,
        config: None,
        screen_gpu: None,
        preview: None,
    };

    event_loop
        .run_app(&mut app)
        .map_err(|e| Error::custom(format!("event loop failed: {e}")))
}
