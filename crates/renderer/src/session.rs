//! Per-click session state and the pointer bookkeeping that feeds it.
//!
//! The session is the single mutable record the frame loop reads once per
//! frame: last cursor position, the two per-click seeds, elapsed time
//! since the click, and the suppression window used to hide resize/reset
//! artifacts. Input handlers never touch GPU state; they only call the named
//! mutators here.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use winit::dpi::{PhysicalPosition, PhysicalSize};

use crate::flower::{FLOWER_GATE, SETTLE_TIME};

/// How long output stays blanked after a resize or external reset. One blank
/// frame is enough to keep a stretched or stale image out of the feedback
/// chain; 50ms is short enough to be imperceptible.
pub const SUPPRESS_WINDOW: Duration = Duration::from_millis(50);

/// Conceptual growth state, derived from elapsed time rather than stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthPhase {
    /// Stem is drawing (petals not yet gated in).
    Stem,
    /// Petals are popping toward full size.
    Flower,
    /// Growth finished; the shape lives only in the accumulated buffer.
    Settled,
}

pub struct Session {
    cursor: (f32, f32),
    seed_a: f32,
    seed_b: f32,
    elapsed: f32,
    suppress_until: Option<Instant>,
    reset_seen: u64,
    rng: StdRng,
}

impl Session {
    /// Creates a session; a fixed seed makes every click's randomizer draw
    /// reproducible, otherwise the RNG is seeded from entropy.
    pub fn new(rng_seed: Option<u64>) -> Self {
        let rng = match rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            cursor: (0.0, 0.0),
            seed_a: 0.0,
            seed_b: 0.0,
            // Born settled: nothing draws until the first click.
            elapsed: SETTLE_TIME,
            suppress_until: None,
            reset_seen: 0,
            rng,
        }
    }

    /// Starts a new growth at the given normalized window position (origin
    /// top-left, as delivered by the windowing system). The Y axis is flipped
    /// here so the stored cursor matches the shader's bottom-left origin.
    /// Resets the clock and redraws both seeds, abandoning any in-flight
    /// animation; its already-baked pixels persist in the accumulated buffer.
    pub fn plant(&mut self, x: f32, y: f32) {
        self.cursor = (x, 1.0 - y);
        self.seed_a = self.rng.gen::<f32>();
        self.seed_b = self.rng.gen::<f32>();
        self.elapsed = 0.0;
        tracing::debug!(
            x = self.cursor.0,
            y = self.cursor.1,
            seed_a = self.seed_a,
            seed_b = self.seed_b,
            "planted flower"
        );
    }

    /// Advances the growth clock by the real frame delta. A long pause simply
    /// shows up as one large delta and the pending flower jumps to settled.
    pub fn advance(&mut self, delta_seconds: f32) {
        self.elapsed += delta_seconds.max(0.0);
    }

    /// Arms the suppression window: output is forced blank until the deadline.
    pub fn begin_suppression(&mut self, now: Instant) {
        self.suppress_until = Some(now + SUPPRESS_WINDOW);
    }

    /// Observes the external reset counter; any increase arms suppression.
    /// Returns true when a reset was triggered.
    pub fn notice_reset(&mut self, counter: u64, now: Instant) -> bool {
        if counter <= self.reset_seen {
            return false;
        }
        self.reset_seen = counter;
        self.begin_suppression(now);
        tracing::info!(counter, "external reset: blanking garden");
        true
    }

    /// The `u_clean` multiplier for this frame: 0.0 while suppression is
    /// active, 1.0 otherwise. An expired deadline is cleared on observation.
    pub fn clean(&mut self, now: Instant) -> f32 {
        match self.suppress_until {
            Some(deadline) if now < deadline => 0.0,
            Some(_) => {
                self.suppress_until = None;
                1.0
            }
            None => 1.0,
        }
    }

    pub fn cursor(&self) -> (f32, f32) {
        self.cursor
    }

    pub fn seeds(&self) -> (f32, f32) {
        (self.seed_a, self.seed_b)
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn phase(&self) -> GrowthPhase {
        if self.elapsed < FLOWER_GATE {
            GrowthPhase::Stem
        } else if self.elapsed < SETTLE_TIME {
            GrowthPhase::Flower
        } else {
            GrowthPhase::Settled
        }
    }
}

/// Tracks the cursor position so a button press can be resolved into a
/// normalized plant position.
#[derive(Default)]
pub struct PointerTracker {
    position: Option<PhysicalPosition<f64>>,
}

impl PointerTracker {
    pub fn handle_cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        self.position = Some(position);
    }

    /// Normalizes the last known position against the surface size. Returns
    /// None when no motion has been observed yet or the surface is degenerate.
    pub fn normalized(&self, size: PhysicalSize<u32>) -> Option<(f32, f32)> {
        let position = self.position?;
        if size.width == 0 || size.height == 0 {
            return None;
        }
        Some((
            (position.x / size.width as f64) as f32,
            (position.y / size.height as f64) as f32,
        ))
    }
}
