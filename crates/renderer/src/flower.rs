//! Procedural flower and stem math, mirrored from `shaders/garden.frag`.
//!
//! Everything here is a pure function of the per-click stroke parameters so
//! the growth envelopes, palette buckets, and occlusion blending can be unit
//! tested on the CPU. The fragment shader carries the same expressions with
//! the same constants; any change must land in both places.

/// Per-click inputs consumed by one shader pass.
///
/// `cursor` is in normalized [0,1]² coordinates with the origin at the bottom
/// left, matching the shader convention. `seed` holds the two uniform draws
/// made at click time; `time` is seconds since that click. `clean` is 1.0 in
/// normal operation and 0.0 during a suppression window, in which case the
/// whole output collapses to black and that blank frame is what gets baked
/// into the accumulation chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeParams {
    pub cursor: [f32; 2],
    pub seed: [f32; 2],
    pub time: f32,
    pub ratio: f32,
    pub clean: f32,
}

/// Seconds after a click during which the stem is still being drawn.
pub const STEM_CUTOFF: f32 = 0.17;
/// Seconds after a click before any petal becomes visible.
pub const FLOWER_GATE: f32 = 0.25;
/// Seconds after a click at which the flower pop finishes and the shader
/// stops contributing; the shape lives on only in the accumulated buffer.
pub const SETTLE_TIME: f32 = 1.0;

// GLSL-style scalar helpers. `fract` uses floor semantics (not `f32::fract`,
// which truncates toward zero for negatives).

fn fract(x: f32) -> f32 {
    x - x.floor()
}

fn step(edge: f32, x: f32) -> f32 {
    if x >= edge {
        1.0
    } else {
        0.0
    }
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn dot2(a: [f32; 2], b: [f32; 2]) -> f32 {
    a[0] * b[0] + a[1] * b[1]
}

fn mod289_2(x: [f32; 2]) -> [f32; 2] {
    [
        x[0] - (x[0] * (1.0 / 289.0)).floor() * 289.0,
        x[1] - (x[1] * (1.0 / 289.0)).floor() * 289.0,
    ]
}

fn mod289_3(x: [f32; 3]) -> [f32; 3] {
    [
        x[0] - (x[0] * (1.0 / 289.0)).floor() * 289.0,
        x[1] - (x[1] * (1.0 / 289.0)).floor() * 289.0,
        x[2] - (x[2] * (1.0 / 289.0)).floor() * 289.0,
    ]
}

fn permute(x: [f32; 3]) -> [f32; 3] {
    mod289_3([
        ((x[0] * 34.0) + 1.0) * x[0],
        ((x[1] * 34.0) + 1.0) * x[1],
        ((x[2] * 34.0) + 1.0) * x[2],
    ])
}

/// 2D simplex noise (Ashima/McEwan), ported expression for expression from
/// the fragment shader so stem sway matches between CPU and GPU.
pub fn snoise(v: [f32; 2]) -> f32 {
    const C: [f32; 4] = [
        0.211_324_865_405_187,
        0.366_025_403_784_439,
        -0.577_350_269_189_626,
        0.024_390_243_902_439,
    ];

    let skew = dot2(v, [C[1], C[1]]);
    let mut i = [(v[0] + skew).floor(), (v[1] + skew).floor()];
    let unskew = dot2(i, [C[0], C[0]]);
    let x0 = [v[0] - i[0] + unskew, v[1] - i[1] + unskew];

    let i1 = if x0[0] > x0[1] {
        [1.0, 0.0]
    } else {
        [0.0, 1.0]
    };

    // x12.xy holds the middle corner offset, x12.zw the far corner.
    let x12 = [
        x0[0] + C[0] - i1[0],
        x0[1] + C[0] - i1[1],
        x0[0] + C[2],
        x0[1] + C[2],
    ];

    i = mod289_2(i);
    let inner = permute([i[1], i[1] + i1[1], i[1] + 1.0]);
    let p = permute([
        inner[0] + i[0],
        inner[1] + i[0] + i1[0],
        inner[2] + i[0] + 1.0,
    ]);

    let mut m = [
        (0.5 - dot2(x0, x0)).max(0.0),
        (0.5 - dot2([x12[0], x12[1]], [x12[0], x12[1]])).max(0.0),
        (0.5 - dot2([x12[2], x12[3]], [x12[2], x12[3]])).max(0.0),
    ];
    for v in &mut m {
        *v = *v * *v;
        *v = *v * *v;
    }

    let x = [
        2.0 * fract(p[0] * C[3]) - 1.0,
        2.0 * fract(p[1] * C[3]) - 1.0,
        2.0 * fract(p[2] * C[3]) - 1.0,
    ];
    let h = [x[0].abs() - 0.5, x[1].abs() - 0.5, x[2].abs() - 0.5];
    let ox = [
        (x[0] + 0.5).floor(),
        (x[1] + 0.5).floor(),
        (x[2] + 0.5).floor(),
    ];
    let a0 = [x[0] - ox[0], x[1] - ox[1], x[2] - ox[2]];

    for (idx, v) in m.iter_mut().enumerate() {
        *v *= 1.792_842_914_001_59 - 0.853_734_720_953_14 * (a0[idx] * a0[idx] + h[idx] * h[idx]);
    }

    let g = [
        a0[0] * x0[0] + h[0] * x0[1],
        a0[1] * x12[0] + h[1] * x12[1],
        a0[2] * x12[2] + h[2] * x12[3],
    ];

    130.0 * (m[0] * g[0] + m[1] * g[1] + m[2] * g[2])
}

/// Petal silhouette in polar coordinates around the cursor point.
///
/// Returns a coverage value in [0,1]. Invisible until `time` passes
/// [`FLOWER_GATE`], then pops toward full size and vanishes from the live
/// computation once the growth factor reaches 1.0.
pub fn flower_shape(
    p: [f32; 2],
    petal_count: f32,
    angle: f32,
    outline: f32,
    seed_a: f32,
    time: f32,
) -> f32 {
    let angle = angle * 3.0;
    let p = [
        p[0] * angle.cos() - p[1] * angle.sin(),
        p[0] * angle.sin() + p[1] * angle.cos(),
    ];

    let a = p[1].atan2(p[0]);
    let sectoral = (a * petal_count).sin().abs().powf(0.4) + 0.25;

    let size = 0.04 + seed_a * 0.15;
    let mut radial = (dot2(p, p).sqrt() / size).powi(2);
    radial -= 0.1 * (8.0 * a).sin();
    radial = radial.max(0.1);
    radial += smoothstep(0.0, 0.03, -p[1] + 0.2 * p[0].abs());

    let grow = step(FLOWER_GATE, time) * time.powf(0.3);
    let mut shape = 1.0 - smoothstep(0.0, sectoral, outline * radial / grow);
    shape *= 1.0 - step(1.0, grow);
    shape
}

/// Swaying vertical stem band below the cursor point.
///
/// `p` is the pixel position relative to the cursor (aspect-corrected),
/// `uv` the absolute aspect-corrected coordinate used for the noise field.
pub fn stem_shape(p: [f32; 2], uv: [f32; 2], w: f32, angle: f32, seed_a: f32, time: f32) -> f32 {
    let w = w.max(0.004);

    let mut px = p[0];
    let mut x_offset = p[1] * angle.sin();
    x_offset *= (3.0 * uv[1]).powi(2);
    px -= x_offset;

    // Coherent sway, attenuated to zero at the cursor and at the bottom edge.
    let noise_power = 0.5;
    let mut sway = noise_power * snoise([2.0 * uv[0] * seed_a, 2.0 * uv[1] * seed_a]);
    sway *= (p[1] * p[1]).powf(0.6);
    sway *= (uv[1] * uv[1]).powf(0.3);
    px += sway;

    let left = smoothstep(-w, 0.0, px);
    let right = 1.0 - smoothstep(0.0, w, px);
    let mut shape = left * right;

    // Growth envelope: fast early, exhausted by t = 0.2. The envelope root is
    // floored so the smoothstep edges never collapse to a 0/0.
    let grow = 1.0 - smoothstep(0.0, 0.2, time);
    let top_mask = smoothstep(0.0, grow.sqrt().max(1e-4), 0.03 - p[1]);
    shape *= top_mask;

    shape *= 1.0 - step(STEM_CUTOFF, time);
    shape
}

/// Maps `seed_b` into one of six fixed hue families, with `seed_a` perturbing
/// a channel inside the family. Thresholds: 0.16, 0.32, 0.48, 0.64, 0.80.
pub fn flower_color(seed_a: f32, seed_b: f32) -> [f32; 3] {
    if seed_b < 0.16 {
        // Deep pink/magenta
        [0.9, 0.1 + seed_a * 0.2, 0.8]
    } else if seed_b < 0.32 {
        // Vibrant purple
        [0.7 + seed_a * 0.3, 0.2, 0.95]
    } else if seed_b < 0.48 {
        // Bright orange
        [1.0, 0.5 + seed_a * 0.3, 0.1]
    } else if seed_b < 0.64 {
        // Sunny yellow
        [1.0, 0.9, 0.2 + seed_a * 0.2]
    } else if seed_b < 0.80 {
        // Sky blue
        [0.2 + seed_a * 0.3, 0.6, 0.95]
    } else {
        // White with a hint of color
        [0.95, 0.9 + seed_a * 0.1, 1.0]
    }
}

pub fn stem_color(seed_a: f32, seed_b: f32) -> [f32; 3] {
    [0.1 + seed_a * 0.7, 0.55 + seed_b * 0.3, 0.2]
}

/// Full per-pixel pass: masks the accumulated color under the new stroke's
/// footprint (new occludes old), adds the stem and the two petal layers, and
/// applies the suppression flag.
///
/// `frag_uv` is the pixel's normalized position with a bottom-left origin;
/// `base` is the previously accumulated color at that pixel.
pub fn shade(base: [f32; 3], frag_uv: [f32; 2], params: &StrokeParams) -> [f32; 3] {
    let seed_a = params.seed[0];
    let seed_b = params.seed[1];
    let t = params.time;

    let uv = [frag_uv[0] * params.ratio, frag_uv[1]];
    let cursor = [
        (frag_uv[0] - params.cursor[0]) * params.ratio,
        frag_uv[1] - params.cursor[1],
    ];

    let stem_color = stem_color(seed_a, seed_b);
    let flower_color = flower_color(seed_a, seed_b);

    let angle = 0.5 * (seed_a - 0.5);
    let lower = [cursor[0], cursor[1] + 0.2 + 0.5 * seed_a];

    let stem = stem_shape(cursor, uv, 0.003, angle, seed_a, t)
        + stem_shape(lower, uv, 0.003, angle, seed_a, t);
    let stem_mask = 1.0
        - stem_shape(cursor, uv, 0.004, angle, seed_a, t)
        - stem_shape(lower, uv, 0.004, angle, seed_a, t);

    let petals_back = 1.0 + (seed_a * 2.0).floor();
    let angle_offset = -(2.0 * step(0.0, angle) - 1.0) * 0.1 * t;
    let back = flower_shape(cursor, petals_back, angle + angle_offset, 1.5, seed_a, t);
    let back_mask = 1.0 - flower_shape(cursor, petals_back, angle + angle_offset, 1.6, seed_a, t);

    let petals_front = 2.0 + (seed_b * 2.0).floor();
    let front = flower_shape(cursor, petals_front, angle, 1.0, seed_a, t);
    let front_mask = 1.0 - flower_shape(cursor, petals_front, angle, 0.95, seed_a, t);

    let mut color = base;
    for c in &mut color {
        *c *= stem_mask * back_mask * front_mask;
    }

    for (c, s) in color.iter_mut().zip(stem_color) {
        *c += stem * s;
    }

    let back_tint = [
        flower_color[0],
        flower_color[1] + 0.8 * t,
        flower_color[2],
    ];
    for (c, s) in color.iter_mut().zip(back_tint) {
        *c += back * s;
    }
    for (c, s) in color.iter_mut().zip(flower_color) {
        *c += front * s;
    }

    // Where the two petal layers overlap, damp red and blue for depth.
    color[0] *= 1.0 - 0.5 * back * front;
    color[2] *= 1.0 - back * front;

    for c in &mut color {
        *c *= params.clean;
    }
    color
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(seed_a: f32, seed_b: f32, time: f32) -> StrokeParams {
        StrokeParams {
            cursor: [0.5, 0.6],
            seed: [seed_a, seed_b],
            time,
            ratio: 1.0,
            clean: 1.0,
        }
    }

    #[test]
    fn shade_is_deterministic() {
        let p = params(0.37, 0.52, 0.4);
        let base = [0.1, 0.2, 0.3];
        let uv = [0.48, 0.62];
        let first = shade(base, uv, &p);
        for _ in 0..8 {
            assert_eq!(shade(base, uv, &p), first);
        }
    }

    #[test]
    fn snoise_stays_in_plausible_range() {
        for ix in 0..32 {
            for iy in 0..32 {
                let v = snoise([ix as f32 * 0.37, iy as f32 * 0.29]);
                assert!(v.is_finite());
                assert!((-1.5..=1.5).contains(&v), "snoise out of range: {v}");
            }
        }
    }

    #[test]
    fn stem_grows_monotonically_until_cutoff() {
        let seed_a = 0.42;
        let angle = 0.5 * (seed_a - 0.5);
        let times = [0.0, 0.02, 0.05, 0.08, 0.11, 0.14, 0.16];
        // Sample a column straight below the cursor at (0.5, 0.7).
        for step_y in 1..40 {
            let y = 0.7 - step_y as f32 * 0.015;
            let p = [0.0, y - 0.7];
            let uv = [0.5, y];
            let mut last = -1.0;
            for &t in &times {
                let s = stem_shape(p, uv, 0.003, angle, seed_a, t);
                assert!(s.is_finite());
                assert!(
                    s >= last - 1e-6,
                    "stem coverage regressed at y={y} t={t}: {s} < {last}"
                );
                last = s;
            }
        }
    }

    #[test]
    fn stem_stops_rendering_after_cutoff() {
        let seed_a = 0.8;
        let angle = 0.5 * (seed_a - 0.5);
        for step_y in 0..30 {
            let y = 0.65 - step_y as f32 * 0.02;
            let s = stem_shape([0.0, y - 0.65], [0.5, y], 0.003, angle, seed_a, 0.18);
            assert_eq!(s, 0.0);
        }
    }

    #[test]
    fn flower_is_gated_then_pops_then_vanishes() {
        let seed_a = 0.6;
        let probe = [0.0, 0.02];
        // Before the gate: nothing, anywhere.
        for &t in &[0.0, 0.1, 0.24] {
            assert_eq!(flower_shape(probe, 2.0, 0.05, 1.0, seed_a, t), 0.0);
        }
        // After the gate: visible near the cursor.
        let popped = flower_shape(probe, 2.0, 0.05, 1.0, seed_a, 0.5);
        assert!(popped > 0.1, "expected visible petal, got {popped}");
        // Growth factor reaches 1.0 -> contribution disappears from the live
        // frame (the shape survives only in the accumulated buffer).
        assert_eq!(flower_shape(probe, 2.0, 0.05, 1.0, seed_a, 1.0), 0.0);
        assert_eq!(flower_shape(probe, 2.0, 0.05, 1.0, seed_a, 3.0), 0.0);
    }

    #[test]
    fn flower_growth_is_monotone_between_gate_and_settle() {
        let seed_a = 0.3;
        let probe = [0.01, 0.015];
        let mut last = 0.0;
        for i in 0..12 {
            let t = 0.26 + i as f32 * 0.06;
            let s = flower_shape(probe, 3.0, -0.1, 1.0, seed_a, t);
            assert!(s >= last - 1e-6, "petal coverage regressed at t={t}");
            last = s;
        }
        assert!(last > 0.0);
    }

    #[test]
    fn palette_buckets_match_documented_thresholds() {
        // seed_b probes from the six documented ranges, seed_a pinned to 0.
        let magenta = flower_color(0.0, 0.10);
        let purple = flower_color(0.0, 0.20);
        let orange = flower_color(0.0, 0.40);
        let yellow = flower_color(0.0, 0.60);
        let blue = flower_color(0.0, 0.75);
        let white = flower_color(0.0, 0.90);

        assert_eq!(magenta, [0.9, 0.1, 0.8]);
        assert_eq!(purple, [0.7, 0.2, 0.95]);
        assert_eq!(orange, [1.0, 0.5, 0.1]);
        assert_eq!(yellow, [1.0, 0.9, 0.2]);
        assert_eq!(blue, [0.2, 0.6, 0.95]);
        assert_eq!(white, [0.95, 0.9, 1.0]);

        // Bucket edges belong to the upper family.
        assert_eq!(flower_color(0.0, 0.16), purple);
        assert_eq!(flower_color(0.0, 0.32), orange);
        assert_eq!(flower_color(0.0, 0.48), yellow);
        assert_eq!(flower_color(0.0, 0.64), blue);
        assert_eq!(flower_color(0.0, 0.80), white);
    }

    #[test]
    fn seed_a_perturbs_within_the_family() {
        let low = flower_color(0.0, 0.40);
        let high = flower_color(0.99, 0.40);
        // Orange family: red and blue fixed, green sweeps.
        assert_eq!(low[0], high[0]);
        assert_eq!(low[2], high[2]);
        assert!(high[1] > low[1]);
    }

    #[test]
    fn settled_stroke_leaves_base_untouched() {
        let p = params(0.7, 0.3, 2.5);
        for ix in 0..16 {
            for iy in 0..16 {
                let uv = [ix as f32 / 16.0, iy as f32 / 16.0];
                let base = [0.3, 0.5, 0.7];
                assert_eq!(shade(base, uv, &p), base);
            }
        }
    }

    #[test]
    fn suppression_forces_black_output() {
        let mut p = params(0.2, 0.9, 0.4);
        p.clean = 0.0;
        for ix in 0..12 {
            for iy in 0..12 {
                let uv = [ix as f32 / 12.0, iy as f32 / 12.0];
                assert_eq!(shade([0.8, 0.4, 0.6], uv, &p), [0.0, 0.0, 0.0]);
            }
        }
    }
}
