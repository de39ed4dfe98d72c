//! GPU orchestration for the accumulation pipeline.
//!
//! - `context` owns wgpu instance/device/surface wiring and swapchain
//!   reconfiguration on resize.
//! - `targets` holds the two ping-pong accumulation render targets behind an
//!   explicit 0/1 index toggle.
//! - `pipeline` compiles the GLSL passes (naga front-end) into the garden
//!   and present render pipelines sharing one pair of bind group layouts.
//! - `uniforms` mirrors the std140 `GardenParams` block and writes changes
//!   through the queue each frame.
//! - `state` glues everything together behind the `GpuState` API used by the
//!   window event loop.

mod context;
mod pipeline;
mod state;
mod targets;
mod uniforms;

pub use context::GardenInitError;
pub(crate) use state::GpuState;
pub(crate) use uniforms::FrameInput;
