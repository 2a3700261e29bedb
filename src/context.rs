use std::{collections::HashSet, sync::Arc};

use winit::{keyboard::KeyCode, window::Window};

use crate::{render::OverlayTarget, stopwatch::Stopwatch, texture::Texture};

/// Window and loop settings handed to [`run`](crate::app::run).
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
    pub fullscreen: bool,
    pub vsync: bool,
    /// Frames per second the native loop sleeps down to, `0` for no limit.
    pub target_fps: u32,
    /// Log the FPS and the stopwatch report once per second.
    pub print_debug: bool,
    pub clear_colour: wgpu::Color,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Demo".to_string(),
            width: 800,
            height: 600,
            resizable: true,
            fullscreen: false,
            vsync: true,
            target_fps: 60,
            print_debug: false,
            clear_colour: wgpu::Color::BLACK,
        }
    }
}

/// Everything a demo renders with: the window, the wgpu device and surface,
/// the depth buffer and the per-frame bookkeeping of the loop.
#[derive(Debug)]
pub struct Context {
    pub window: Arc<Window>,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub depth_texture: Texture,
    pub clear_colour: wgpu::Color,
    pub stopwatch: Stopwatch,
    /// Frames rendered during the last full second.
    pub last_fps: u32,
    pub app_config: AppConfig,
    pub(crate) keys_down: HashSet<KeyCode>,
    pub(crate) is_surface_configured: bool,
}

impl Context {
    pub async fn new(window: Arc<Window>, app_config: AppConfig) -> anyhow::Result<Self> {
        let size = window.inner_size();

        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("Surface is incompatible with the adapter"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: if app_config.vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let depth_texture =
            Texture::create_depth_texture(&device, [config.width, config.height], "depth_texture");

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            depth_texture,
            clear_colour: app_config.clear_colour,
            stopwatch: Stopwatch::new(),
            last_fps: 0,
            app_config,
            keys_down: HashSet::new(),
            is_surface_configured: false,
        })
    }

    /// Reconfigures the surface and the depth buffer. Zero sizes, as reported
    /// for minimized windows, are ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            Texture::create_depth_texture(&self.device, [width, height], "depth_texture");
        self.is_surface_configured = true;
        true
    }

    pub fn size(&self) -> [u32; 2] {
        [self.config.width, self.config.height]
    }

    pub fn aspect(&self) -> f32 {
        self.config.width.max(1) as f32 / self.config.height.max(1) as f32
    }

    /// Attachment formats of the frame's render pass.
    pub fn overlay_target(&self) -> OverlayTarget {
        OverlayTarget::new(self.config.format, Some(Texture::DEPTH_FORMAT))
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }
}
