//! demo-kit
//!
//! A small cross-platform toolkit for writing interactive 3D graphics demos on
//! top of wgpu, natively and on the web. It bundles the pieces every demo
//! ends up rewriting: a window and frame loop, shader programs with named
//! uniforms, value-type math, mesh loading, mouse driven cameras, profiling
//! and text overlays.
//!
//! High-level modules
//! - `app`: the [`DemoApp`] trait and the [`run`] loop driving it
//! - `buffers`: strategies for streaming vertex data every frame
//! - `context`: window, device, surface and per-frame bookkeeping
//! - `interpolators`: keyframe interpolation for animations
//! - `loader`: XML mesh files and generated cubes and planes
//! - `math`: vectors, matrices, quaternions, matrix stacks and frustums
//! - `mesh`: vertex attributes, render commands and GPU meshes
//! - `poles`: mouse driven view and object controllers
//! - `render`: performance graphs and monospace text overlays
//! - `resources`: asset loading for native and WASM targets
//! - `shader`: WGSL programs with reflected uniform locations
//! - `stopwatch`, `timer`: frame section profiling and looping timers
//! - `uniforms`: typed uniforms bound to a program by name
//!

pub mod app;
pub mod buffers;
pub mod context;
pub mod interpolators;
pub mod loader;
pub mod math;
pub mod mesh;
pub mod poles;
pub mod render;
pub mod resources;
pub mod shader;
pub mod stopwatch;
pub mod texture;
pub mod timer;
pub mod uniforms;

// Re-exports commonly used types for convenience in downstream code.
pub use app::{DemoApp, run};
pub use context::{AppConfig, Context};
pub use instant::Duration;
pub use winit::event::WindowEvent;
pub use winit::keyboard::KeyCode;
pub use wgpu;
