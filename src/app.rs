//! The demo loop.
//!
//! [`run`] opens the window, creates the [`Context`] and drives a [`DemoApp`]
//! until it asks to stop or the window is closed. Every frame:
//! 1. Dispatch window and keyboard events
//! 2. `update` with the frame delta, timed as "Update"
//! 3. `prepare` and `render` into one render pass, timed as "Render"
//! 4. Present the frame, timed as "Present"
//! 5. Once per second store the FPS and roll the stopwatch over
//! 6. Sleep down to the target FPS on native platforms

use std::{iter, sync::Arc};

use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Fullscreen, Window},
};

use crate::{
    context::{AppConfig, Context},
    stopwatch::Stopwatch,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// A demo driven by [`run`]. Only [`init`](Self::init),
/// [`update`](Self::update) and [`render`](Self::render) are required.
pub trait DemoApp {
    /// Called once the context exists, before the first frame.
    fn init(&mut self, ctx: &mut Context) -> anyhow::Result<()>;

    /// Called after `init` and whenever the surface changed size.
    fn resized(&mut self, _ctx: &mut Context, _width: u32, _height: u32) {}

    /// Sees every window event before the loop handles it.
    fn window_event(&mut self, _ctx: &mut Context, _event: &WindowEvent) {}

    fn key_pressed(&mut self, _ctx: &mut Context, _key: KeyCode) {}

    fn key_released(&mut self, _ctx: &mut Context, _key: KeyCode) {}

    fn update(&mut self, ctx: &mut Context, dt: Duration);

    /// Uploads whatever the next render pass needs.
    fn prepare(&mut self, _ctx: &mut Context) {}

    fn render(&self, ctx: &Context, pass: &mut wgpu::RenderPass<'_>);

    /// Checked after every update. Stops on Escape by default.
    fn should_stop(&self, ctx: &Context) -> bool {
        ctx.is_key_down(KeyCode::Escape)
    }

    fn destroy(&mut self, _ctx: &mut Context) {}
}

fn start_section(stopwatch: &mut Stopwatch, name: &str) {
    if let Err(e) = stopwatch.start(name) {
        log::warn!("{}", e);
    }
}

fn stop_section(stopwatch: &mut Stopwatch) {
    if let Err(e) = stopwatch.stop() {
        log::warn!("{}", e);
    }
}

fn draw<A: DemoApp>(ctx: &mut Context, app: &mut A) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
    app.prepare(ctx);

    let output = ctx.surface.get_current_texture()?;
    let view = output
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());

    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });
    {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(ctx.clear_colour),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &ctx.depth_texture.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        app.render(ctx, &mut render_pass);
    }

    ctx.queue.submit(iter::once(encoder.finish()));
    Ok(output)
}

pub(crate) enum AppEvent {
    #[allow(dead_code)]
    Initialized(Box<Context>),
}

struct App<A: DemoApp> {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    proxy: winit::event_loop::EventLoopProxy<AppEvent>,
    config: AppConfig,
    app: A,
    ctx: Option<Context>,
    creating: bool,
    stopped: bool,
    last_time: Instant,
    since_report: Duration,
    frames: u32,
}

impl<A: DemoApp> App<A> {
    fn finish_init(&mut self, event_loop: &ActiveEventLoop, mut ctx: Context) {
        if let Err(e) = self.app.init(&mut ctx) {
            log::error!("Demo initialization failed: {:#}", e);
            event_loop.exit();
            return;
        }
        let size = ctx.window.inner_size();
        if ctx.resize(size.width, size.height) {
            self.app.resized(&mut ctx, size.width, size.height);
        }
        ctx.window.request_redraw();
        self.last_time = Instant::now();
        self.ctx = Some(ctx);
    }

    fn stop(&mut self, event_loop: &ActiveEventLoop) {
        if !self.stopped {
            self.stopped = true;
            if let Some(ctx) = &mut self.ctx {
                self.app.destroy(ctx);
            }
        }
        event_loop.exit();
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let Some(ctx) = &mut self.ctx else {
            return;
        };
        let frame_start = Instant::now();
        let dt = frame_start.duration_since(self.last_time);
        self.last_time = frame_start;

        ctx.window.request_redraw();
        if !ctx.is_surface_configured {
            return;
        }

        start_section(&mut ctx.stopwatch, "Update");
        self.app.update(ctx, dt);
        stop_section(&mut ctx.stopwatch);

        if self.app.should_stop(ctx) {
            self.stop(event_loop);
            return;
        }

        start_section(&mut ctx.stopwatch, "Render");
        let drawn = draw(ctx, &mut self.app);
        stop_section(&mut ctx.stopwatch);

        match drawn {
            Ok(output) => {
                start_section(&mut ctx.stopwatch, "Present");
                output.present();
                stop_section(&mut ctx.stopwatch);
            }
            // Reconfigure the surface if it's lost or outdated
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = ctx.window.inner_size();
                if ctx.resize(size.width, size.height) {
                    self.app.resized(ctx, size.width, size.height);
                }
            }
            Err(e) => {
                log::error!("Unable to render {}", e);
            }
        }

        self.frames += 1;
        self.since_report += dt;
        if self.since_report >= Duration::from_secs(1) {
            self.since_report = Duration::ZERO;
            ctx.last_fps = self.frames;
            self.frames = 0;
            let report = ctx.stopwatch.report_to_string();
            if ctx.app_config.print_debug {
                log::info!("FPS: {}", ctx.last_fps);
                log::info!("\n{}", report);
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        if ctx.app_config.target_fps > 0 && !ctx.app_config.vsync {
            let frame_time = Duration::from_secs_f64(1.0 / ctx.app_config.target_fps as f64);
            let spent = frame_start.elapsed();
            if spent < frame_time {
                std::thread::sleep(frame_time - spent);
            }
        }
    }

    fn key(&mut self, event: &KeyEvent) {
        let (Some(ctx), PhysicalKey::Code(code)) = (&mut self.ctx, event.physical_key) else {
            return;
        };
        match event.state {
            ElementState::Pressed if !event.repeat => {
                ctx.keys_down.insert(code);
                self.app.key_pressed(ctx, code);
            }
            ElementState::Released => {
                ctx.keys_down.remove(&code);
                self.app.key_released(ctx, code);
            }
            _ => {}
        }
    }
}

impl<A: DemoApp> ApplicationHandler<AppEvent> for App<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.ctx.is_some() || self.creating {
            return;
        }

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height))
            .with_resizable(self.config.resizable);
        if self.config.fullscreen {
            window_attributes = window_attributes.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let canvas = wgpu::web_sys::window()
                .and_then(|window| window.document())
                .and_then(|document| document.get_element_by_id(CANVAS_ID));
            if let Some(canvas) = canvas {
                window_attributes = window_attributes.with_canvas(Some(canvas.unchecked_into()));
            }
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Could not create the window: {}", e);
                event_loop.exit();
                return;
            }
        };
        self.creating = true;

        let init_future = Context::new(window, self.config.clone());

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(init_future) {
                Ok(ctx) => self.finish_init(event_loop, ctx),
                Err(e) => {
                    log::error!("Cannot create the main context: {:#}", e);
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match init_future.await {
                    Ok(ctx) => {
                        if proxy.send_event(AppEvent::Initialized(Box::new(ctx))).is_err() {
                            log::error!("Event loop closed before the context was ready");
                        }
                    }
                    Err(e) => log::error!("Cannot create the main context: {:#}", e),
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: AppEvent) {
        match event {
            // This is the message from our wasm `spawn_local`
            AppEvent::Initialized(ctx) => self.finish_init(event_loop, *ctx),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(ctx) = &mut self.ctx else {
            return;
        };
        self.app.window_event(ctx, &event);

        match event {
            WindowEvent::CloseRequested => self.stop(event_loop),
            WindowEvent::Resized(size) => {
                if ctx.resize(size.width, size.height) {
                    self.app.resized(ctx, size.width, size.height);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => self.key(&event),
            WindowEvent::RedrawRequested => self.frame(event_loop),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if !self.stopped {
            self.stopped = true;
            if let Some(ctx) = &mut self.ctx {
                self.app.destroy(ctx);
            }
        }
    }
}

/// Runs `app` until it stops or its window is closed.
pub fn run<A: DemoApp + 'static>(config: AppConfig, app: A) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    #[cfg(all(feature = "integration-tests", target_os = "linux"))]
    let event_loop: EventLoop<AppEvent> = {
        use winit::platform::wayland::EventLoopBuilderExtWayland;

        EventLoop::with_user_event().with_any_thread(true).build()?
    };

    #[cfg(all(feature = "integration-tests", target_os = "windows"))]
    let event_loop: EventLoop<AppEvent> = {
        use winit::platform::windows::EventLoopBuilderExtWindows;

        EventLoop::with_user_event().with_any_thread(true).build()?
    };

    #[cfg(not(all(
        feature = "integration-tests",
        any(target_os = "linux", target_os = "windows")
    )))]
    let event_loop: EventLoop<AppEvent> = EventLoop::with_user_event().build()?;

    let mut app = App {
        #[cfg(not(target_arch = "wasm32"))]
        async_runtime: tokio::runtime::Runtime::new()?,
        proxy: event_loop.create_proxy(),
        config,
        app,
        ctx: None,
        creating: false,
        stopped: false,
        last_time: Instant::now(),
        since_report: Duration::ZERO,
        frames: 0,
    };

    event_loop.run_app(&mut app)?;

    Ok(())
}
