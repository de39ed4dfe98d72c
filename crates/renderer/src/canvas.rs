//! CPU reference compositor for the accumulation pipeline.
//!
//! Mirrors the GPU path one-to-one: two equally sized pixel buffers, the
//! read buffer feeding [`crate::flower::shade`] as history while the write
//! buffer collects the result, then an index flip. This is what makes the
//! feedback-loop properties (occlusion, persistence, suppression, clearing
//! on resize) testable without a GPU device.

use crate::flower::{shade, StrokeParams};

pub struct PixelCanvas {
    width: usize,
    height: usize,
    buffers: [Vec<[f32; 3]>; 2],
    index: usize,
}

impl PixelCanvas {
    pub fn new(width: usize, height: usize) -> Self {
        let len = width * height;
        Self {
            width,
            height,
            buffers: [vec![[0.0; 3]; len], vec![[0.0; 3]; len]],
            index: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Recreates both buffers at the new size. Prior content is lost, exactly
    /// as GPU render targets lose theirs on reallocation; callers are expected
    /// to cover the transition with a suppression window.
    pub fn resize(&mut self, width: usize, height: usize) {
        let len = width * height;
        self.width = width;
        self.height = height;
        self.buffers = [vec![[0.0; 3]; len], vec![[0.0; 3]; len]];
        self.index = 0;
    }

    /// Runs one shader pass: shades every pixel of the write buffer from the
    /// read buffer, then swaps roles. The write buffer of frame N is the read
    /// buffer of frame N+1, so no pass ever reads the buffer it writes.
    pub fn step(&mut self, params: &StrokeParams) {
        let read_index = self.index;
        let write_index = self.index ^ 1;
        let (first, second) = self.buffers.split_at_mut(1);
        let (read, write) = if read_index == 0 {
            (&first[0], &mut second[0])
        } else {
            (&second[0], &mut first[0])
        };

        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                let uv = [
                    (x as f32 + 0.5) / self.width as f32,
                    (y as f32 + 0.5) / self.height as f32,
                ];
                write[idx] = shade(read[idx], uv, params);
            }
        }

        self.index = write_index;
    }

    /// The most recently presented color at pixel (x, y), with y measured
    /// from the bottom edge like the shader's coordinate convention.
    pub fn pixel(&self, x: usize, y: usize) -> [f32; 3] {
        self.buffers[self.index][y * self.width + x]
    }

    /// Snapshot of the presented buffer, for whole-frame comparisons.
    pub fn snapshot(&self) -> Vec<[f32; 3]> {
        self.buffers[self.index].clone()
    }

    /// True when every presented pixel is exactly black.
    pub fn is_blank(&self) -> bool {
        self.buffers[self.index]
            .iter()
            .all(|px| *px == [0.0, 0.0, 0.0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: usize = 48;

    fn stroke(cursor: [f32; 2], seed: [f32; 2], time: f32, clean: f32) -> StrokeParams {
        StrokeParams {
            cursor,
            seed,
            time,
            ratio: 1.0,
            clean,
        }
    }

    /// Steps the canvas through a full growth animation at ~60fps until the
    /// stroke settles.
    fn grow(canvas: &mut PixelCanvas, cursor: [f32; 2], seed: [f32; 2]) {
        let mut t = 0.0;
        while t < 1.2 {
            canvas.step(&stroke(cursor, seed, t, 1.0));
            t += 1.0 / 60.0;
        }
    }

    fn brightest_channel(canvas: &PixelCanvas, channel: usize) -> (usize, usize, f32) {
        let mut best = (0, 0, -1.0);
        for y in 0..canvas.height() {
            for x in 0..canvas.width() {
                let v = canvas.pixel(x, y)[channel];
                if v > best.2 {
                    best = (x, y, v);
                }
            }
        }
        best
    }

    #[test]
    fn growth_bakes_content_into_the_buffer() {
        let mut canvas = PixelCanvas::new(SIZE, SIZE);
        assert!(canvas.is_blank());
        grow(&mut canvas, [0.5, 0.55], [0.4, 0.4]);
        assert!(!canvas.is_blank(), "a grown flower must leave pixels behind");
    }

    #[test]
    fn settled_content_is_pixel_stable_across_frames() {
        let mut canvas = PixelCanvas::new(SIZE, SIZE);
        let seed = [0.3, 0.55];
        grow(&mut canvas, [0.5, 0.6], seed);

        let settled = canvas.snapshot();
        // Many further frames with no new input: the settled footprint must
        // be carried forward bit-for-bit.
        let mut t = 1.3;
        for _ in 0..20 {
            canvas.step(&stroke([0.5, 0.6], seed, t, 1.0));
            t += 1.0 / 60.0;
        }
        assert_eq!(canvas.snapshot(), settled);
    }

    #[test]
    fn second_flower_occludes_the_first() {
        let mut canvas = PixelCanvas::new(SIZE, SIZE);
        let cursor = [0.5, 0.55];
        // Orange family first, blue family second, same geometry seed.
        grow(&mut canvas, cursor, [0.3, 0.40]);
        let (x, y, red_before) = brightest_channel(&canvas, 0);
        assert!(red_before > 0.3, "first flower should read strongly red");

        grow(&mut canvas, cursor, [0.3, 0.75]);
        let after = canvas.pixel(x, y);
        assert!(
            after[0] < red_before,
            "overlapped pixels must be masked before the new color lands: {} !< {}",
            after[0],
            red_before
        );
        let (_, _, blue_after) = brightest_channel(&canvas, 2);
        assert!(blue_after > 0.3, "second flower's blue must be visible");
    }

    #[test]
    fn suppressed_frame_presents_blank_and_clears_history() {
        let mut canvas = PixelCanvas::new(SIZE, SIZE);
        let seed = [0.6, 0.2];
        grow(&mut canvas, [0.45, 0.5], seed);
        assert!(!canvas.is_blank());

        // One frame inside the suppression window: fully blank output.
        canvas.step(&stroke([0.45, 0.5], seed, 2.0, 0.0));
        assert!(canvas.is_blank());

        // The blank frame is now the history; once suppression lifts with the
        // stroke settled, the garden stays cleared rather than reappearing.
        canvas.step(&stroke([0.45, 0.5], seed, 2.1, 1.0));
        assert!(canvas.is_blank());
    }

    #[test]
    fn resize_recreates_cleared_buffers() {
        let mut canvas = PixelCanvas::new(SIZE, SIZE);
        grow(&mut canvas, [0.5, 0.5], [0.1, 0.9]);
        assert!(!canvas.is_blank());
        canvas.resize(SIZE * 2, SIZE);
        assert_eq!(canvas.width(), SIZE * 2);
        assert_eq!(canvas.height(), SIZE);
        assert!(canvas.is_blank());
    }

    #[test]
    fn ping_pong_never_reads_the_buffer_it_writes() {
        // After one step the presented buffer is the one just written; the
        // untouched buffer becomes the next write target. Stepping twice with
        // a settled stroke must therefore reproduce the same presented image.
        let mut canvas = PixelCanvas::new(16, 16);
        let seed = [0.8, 0.5];
        grow(&mut canvas, [0.5, 0.5], seed);
        let first = canvas.snapshot();
        canvas.step(&stroke([0.5, 0.5], seed, 2.0, 1.0));
        canvas.step(&stroke([0.5, 0.5], seed, 2.02, 1.0));
        assert_eq!(canvas.snapshot(), first);
    }
}
