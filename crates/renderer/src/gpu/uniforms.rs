//! CPU mirror of the garden uniform block.

use bytemuck::{Pod, Zeroable};

#[cfg(test)]
use crate::flower::StrokeParams;

/// Per-frame values read by the frame loop and handed to the GPU.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FrameInput {
    pub cursor: [f32; 2],
    pub randomizer: [f32; 2],
    pub stop_time: f32,
    pub clean: f32,
    /// Wall-clock seconds since startup, driving the aurora backdrop only.
    pub clock: f32,
}

/// Must observe std140 layout; mirrors the `GardenParams` block declared in
/// both fragment shaders.
#[repr(C, align(16))]
#[derive(Clone, Copy)]
pub(crate) struct GardenUniforms {
    pub cursor: [f32; 2],
    pub randomizer: [f32; 2],
    pub stop_time: f32,
    pub ratio: f32,
    pub clean: f32,
    pub clock: f32,
}

unsafe impl Zeroable for GardenUniforms {}
unsafe impl Pod for GardenUniforms {}

impl GardenUniforms {
    pub fn new(width: u32, height: u32) -> Self {
        let mut uniforms = Self {
            cursor: [0.0, 0.0],
            randomizer: [0.0, 0.0],
            // Born settled: nothing draws before the first click.
            stop_time: crate::flower::SETTLE_TIME,
            ratio: 1.0,
            clean: 1.0,
            clock: 0.0,
        };
        uniforms.set_resolution(width as f32, height as f32);
        uniforms
    }

    pub fn set_resolution(&mut self, width: f32, height: f32) {
        self.ratio = width / height.max(1.0);
    }

    pub fn apply(&mut self, frame: &FrameInput) {
        self.cursor = frame.cursor;
        self.randomizer = frame.randomizer;
        self.stop_time = frame.stop_time;
        self.clean = frame.clean;
        self.clock = frame.clock;
    }

    /// The parameters this uniform block would hand to the CPU mirror of the
    /// shader; keeps the two paths trivially comparable.
    #[cfg(test)]
    pub fn as_stroke(&self) -> StrokeParams {
        StrokeParams {
            cursor: self.cursor,
            seed: self.randomizer,
            time: self.stop_time,
            ratio: self.ratio,
            clean: self.clean,
        }
    }
}
