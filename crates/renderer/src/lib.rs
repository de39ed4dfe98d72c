//! Petalfall renderer: a feedback-driven flower garden.
//!
//! The crate glues pointer input, per-click session state, and a wgpu
//! ping-pong compositing pipeline together. The overall flow is:
//!
//! ```text
//!   CLI / petalfall
//!          │ RendererConfig
//!          ▼
//!   Renderer::run ──▶ WindowState ──▶ winit event loop ──▶ render_frame()
//!          ▲                │                                   │
//!          │       click/resize/reset                 garden pass (reads
//!          │        mutate Session                    history, writes the
//!          │                                          other target) ─▶
//!          │                                          present pass ─▶ swap
//! ```
//!
//! Each click plants one flower: the session clock restarts, two fresh seeds
//! are drawn, and the fragment shader grows a stem and petals over a fraction
//! of a second. Because every frame is rendered on top of the previous
//! frame's accumulated image and then becomes the next frame's history, a
//! settled flower costs nothing — it simply persists in the buffer.

mod canvas;
mod flower;
mod gpu;
mod session;

pub use canvas::PixelCanvas;
pub use flower::{
    flower_color, flower_shape, shade, snoise, stem_color, stem_shape, StrokeParams,
    FLOWER_GATE, SETTLE_TIME, STEM_CUTOFF,
};
pub use gpu::GardenInitError;
pub use session::{GrowthPhase, PointerTracker, Session, SUPPRESS_WINDOW};

use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, MouseButton, TouchPhase, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Fullscreen, Window, WindowBuilder};

use gpu::{FrameInput, GpuState};

/// Immutable configuration handed to the renderer at start-up.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Window size in physical pixels (ignored when fullscreen).
    pub surface_size: (u32, u32),
    /// Use a borderless fullscreen window on the current monitor.
    pub fullscreen: bool,
    /// Fixed seed for the per-click randomizer; None draws from entropy.
    pub rng_seed: Option<u64>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            surface_size: (1280, 800),
            fullscreen: false,
            rng_seed: None,
        }
    }
}

/// High-level entry point owning the chosen configuration.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Opens the garden window and drives the winit event loop until the
    /// user closes it. Initialization failures that mean "no GPU here"
    /// surface as [`GardenInitError`] inside the returned error chain so
    /// callers can degrade to a no-op instead of reporting a crash.
    pub fn run(&self) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to initialize event loop")?;
        let window_size =
            PhysicalSize::new(self.config.surface_size.0, self.config.surface_size.1);
        let mut builder = WindowBuilder::new()
            .with_title("Petalfall")
            .with_inner_size(window_size);
        if self.config.fullscreen {
            builder = builder.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }
        let window = builder
            .build(&event_loop)
            .context("failed to create garden window")?;
        let window = Arc::new(window);

        let mut state = WindowState::new(window.clone(), &self.config)?;
        state.window().request_redraw();

        event_loop
            .run(move |event, elwt| {
                elwt.set_control_flow(ControlFlow::Wait);

                match event {
                    Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
                        match event {
                            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                                elwt.exit();
                            }
                            WindowEvent::CursorMoved { position, .. } => {
                                state.tracker.handle_cursor_moved(position);
                            }
                            WindowEvent::MouseInput {
                                state: button_state,
                                button,
                                ..
                            } => {
                                if button == MouseButton::Left
                                    && button_state == ElementState::Pressed
                                {
                                    state.plant_at_pointer();
                                }
                            }
                            WindowEvent::Touch(touch) => {
                                if matches!(
                                    touch.phase,
                                    TouchPhase::Started | TouchPhase::Moved
                                ) {
                                    state.plant_at(touch.location.x, touch.location.y);
                                }
                            }
                            WindowEvent::KeyboardInput { event, .. } => {
                                if event.state == ElementState::Pressed {
                                    match event.logical_key {
                                        Key::Named(NamedKey::Escape) => elwt.exit(),
                                        Key::Character(ref c)
                                            if c.as_str().eq_ignore_ascii_case("r") =>
                                        {
                                            state.request_reset();
                                        }
                                        _ => {}
                                    }
                                }
                            }
                            WindowEvent::Resized(new_size) => {
                                state.resize(new_size);
                            }
                            WindowEvent::ScaleFactorChanged {
                                mut inner_size_writer,
                                ..
                            } => {
                                // Keep the current logical size when the scale factor changes.
                                let _ = inner_size_writer.request_inner_size(state.size());
                            }
                            WindowEvent::RedrawRequested => match state.render_frame() {
                                Ok(()) => {}
                                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                                    state.gpu.recover_surface();
                                }
                                Err(wgpu::SurfaceError::OutOfMemory) => {
                                    tracing::error!("surface out of memory; exiting");
                                    elwt.exit();
                                }
                                Err(other) => {
                                    tracing::warn!(error = ?other, "surface error; retrying next frame");
                                }
                            },
                            _ => {}
                        }
                    }
                    Event::AboutToWait => {
                        // Schedule the next frame once winit is about to wait again.
                        state.window().request_redraw();
                    }
                    _ => {}
                }
            })
            .map_err(|err| anyhow!("event loop error: {err}"))
    }
}

/// Everything the event loop needs per window: GPU resources, session state,
/// pointer tracking, and the frame clock.
struct WindowState {
    window: Arc<Window>,
    gpu: GpuState,
    session: Session,
    tracker: PointerTracker,
    /// External reset interface: a monotonically increasing counter; any
    /// observed increase blanks the garden (bound to the `R` key here).
    reset_requests: u64,
    started: Instant,
    last_tick: Instant,
}

impl WindowState {
    fn new(window: Arc<Window>, config: &RendererConfig) -> Result<Self> {
        let size = window.inner_size();
        let gpu = GpuState::new(window.as_ref(), size)?;
        let now = Instant::now();
        Ok(Self {
            window,
            gpu,
            session: Session::new(config.rng_seed),
            tracker: PointerTracker::default(),
            reset_requests: 0,
            started: now,
            last_tick: now,
        })
    }

    fn window(&self) -> &Window {
        self.window.as_ref()
    }

    fn size(&self) -> PhysicalSize<u32> {
        self.gpu.size()
    }

    fn plant_at_pointer(&mut self) {
        if let Some((x, y)) = self.tracker.normalized(self.size()) {
            self.session.plant(x, y);
        }
    }

    fn plant_at(&mut self, px: f64, py: f64) {
        let size = self.size();
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.session.plant(
            (px / size.width as f64) as f32,
            (py / size.height as f64) as f32,
        );
    }

    fn request_reset(&mut self) {
        self.reset_requests += 1;
        self.session.notice_reset(self.reset_requests, Instant::now());
    }

    /// Resize recreates the accumulation targets (losing their content), so
    /// the transition is covered with a suppression window rather than ever
    /// presenting a stretched or stale frame.
    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.gpu.resize(new_size);
        self.session.begin_suppression(Instant::now());
    }

    fn render_frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        let now = Instant::now();
        let delta = now.duration_since(self.last_tick);
        self.last_tick = now;
        self.session.advance(delta.as_secs_f32());

        let (cursor_x, cursor_y) = self.session.cursor();
        let (seed_a, seed_b) = self.session.seeds();
        let frame = FrameInput {
            cursor: [cursor_x, cursor_y],
            randomizer: [seed_a, seed_b],
            stop_time: self.session.elapsed(),
            clean: self.session.clean(now),
            clock: now.duration_since(self.started).as_secs_f32(),
        };
        self.gpu.render_frame(frame)
    }
}
