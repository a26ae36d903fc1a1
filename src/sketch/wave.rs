//! Animated wave field: stacked, noise-textured polylines.
//!
//! `WaveField` owns a fixed set of `WaveLine`s; the only way to change line
//! count or resolution is `rebuild`. All randomness comes from the field's
//! seed, so a frame at time `t` is fully reproducible.

use super::canvas::{Canvas, Surface};
use super::noise::value_noise;
use super::{Sketch, SketchCtx};

/// Vertical distance between neighboring line baselines.
pub const LINE_SPACING: f32 = 22.0;

const THICKNESS_MIN: f32 = 0.6;
const THICKNESS_MAX: f32 = 6.0;

#[derive(Debug, Clone, Copy)]
struct Seg {
    seed: f32,
    /// Strength of the per-vertex micro offset relative to amplitude.
    jitter: f32,
    /// Base length of the perpendicular tick fragment, in pixels.
    micro_len: f32,
}

pub struct WaveLine {
    index: usize,
    resolution: usize,
    segs: Vec<Seg>,
    phase: f32,
    noise_seed: u32,
}

impl WaveLine {
    fn new(index: usize, resolution: usize, noise_seed: u32, rng: &mut fastrand::Rng) -> Self {
        let segs = (0..=resolution)
            .map(|_| Seg {
                seed: rng.f32() * 10_000.0,
                jitter: 0.3 + rng.f32() * 0.9,
                micro_len: 6.0 + rng.f32() * 12.0,
            })
            .collect();
        Self {
            index,
            resolution,
            segs,
            phase: index as f32 * 0.6,
            noise_seed,
        }
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Main displacement in roughly [-1.3, 1.3]: a primary sinusoid plus a
    /// weaker harmonic. Pure in (nx, t).
    pub fn core_displacement(&self, nx: f32, t: f32, speed: f32) -> f32 {
        let main = (nx * 8.0 + t * speed + self.phase).sin();
        let harmonic = (nx * 20.0 + t * (speed * 1.6) + self.phase * 1.3).sin() * 0.3;
        main + harmonic
    }

    fn envelope(&self, t: f32) -> f32 {
        0.6 + 0.4 * (t + self.index as f32).sin()
    }

    fn vertex_y(&self, p: usize, baseline: f32, amp: f32, t: f32, speed: f32) -> f32 {
        let nx = p as f32 / self.resolution as f32;
        let core = self.core_displacement(nx, t, speed);
        let wavey = baseline + core * amp * self.envelope(t);
        let s = self.segs[p];
        let n = value_noise(s.seed, t * 0.25, self.noise_seed);
        wavey + (n - 0.5) * 2.0 * s.jitter * (amp * 0.06)
    }

    pub fn draw(
        &self,
        surface: &mut dyn Surface,
        width: f32,
        baseline: f32,
        amp: f32,
        t: f32,
        speed: f32,
        color: [u8; 4],
        thickness: f32,
    ) {
        surface.set_stroke(color);
        surface.set_stroke_weight(thickness);

        let res = self.resolution;
        let mut points = Vec::with_capacity(res + 1);
        for p in 0..=res {
            let x = p as f32 / res as f32 * width;
            points.push([x, self.vertex_y(p, baseline, amp, t, speed)]);
        }
        surface.polyline(&points);

        // Sparse perpendicular tick fragments for texture. Fixed budget:
        // roughly one per 18th of the line.
        let step = (res / 18).max(2);
        surface.set_stroke([color[0], color[1], color[2], color[3].saturating_sub(40).max(30)]);
        surface.set_stroke_weight((thickness * 0.3).max(0.6));

        let mut p = 0usize;
        while p <= res {
            let px = p as f32 / res as f32 * width;
            let py = self.vertex_y(p, baseline, amp, t, speed);

            // Slope from the neighboring core samples (finite difference).
            let nx_l = (p.saturating_sub(1)) as f32 / res as f32;
            let nx_r = ((p + 1).min(res)) as f32 / res as f32;
            let env = self.envelope(t);
            let y_l = baseline + self.core_displacement(nx_l, t, speed) * amp * env;
            let y_r = baseline + self.core_displacement(nx_r, t, speed) * amp * env;
            let slope = (y_r - y_l) / ((nx_r - nx_l) * width + 1e-4);

            let angle = (-1.0 / if slope.abs() < 1e-4 { 1e-4 } else { slope }).atan2(1.0);
            let s = self.segs[p];
            let len = s.micro_len * (0.6 + value_noise(s.seed + 123.0, t * 0.2, self.noise_seed));

            let (sin, cos) = angle.sin_cos();
            let a = [px - cos * len * 0.5, py - sin * len * 0.5];
            let b = [px + cos * len * 0.5, py + sin * len * 0.5];
            surface.segment(a, b);

            p += step;
        }
    }
}

pub struct WaveField {
    lines: Vec<WaveLine>,
    resolution: usize,
    speed: f32,
    seed: u64,
}

impl WaveField {
    pub fn new(line_count: usize, resolution: usize, speed: f32, seed: u64) -> Self {
        let mut field = Self {
            lines: Vec::new(),
            resolution,
            speed,
            seed,
        };
        field.rebuild(line_count, Some(resolution));
        field
    }

    /// Discard all lines and rebuild from the master seed. The only mutation
    /// path for line count and resolution.
    pub fn rebuild(&mut self, line_count: usize, resolution: Option<usize>) {
        if let Some(res) = resolution {
            self.resolution = res.max(1);
        }
        let mut rng = fastrand::Rng::with_seed(self.seed);
        let noise_seed = rng.u32(..);
        self.lines.clear();
        for i in 0..line_count {
            self.lines
                .push(WaveLine::new(i, self.resolution, noise_seed, &mut rng));
        }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn lines(&self) -> &[WaveLine] {
        &self.lines
    }

    /// Per-line baselines: evenly spaced, centered on `center_y`, ordered by
    /// line index.
    pub fn line_baselines(&self, center_y: f32) -> Vec<f32> {
        let n = self.lines.len();
        (0..n)
            .map(|i| center_y + (i as f32 - (n as f32 - 1.0) / 2.0) * LINE_SPACING)
            .collect()
    }

    pub fn draw(
        &self,
        surface: &mut dyn Surface,
        width: f32,
        center_y: f32,
        amp: f32,
        t: f32,
        color: [u8; 4],
        thickness: f32,
    ) {
        for (line, baseline) in self.lines.iter().zip(self.line_baselines(center_y)) {
            line.draw(surface, width, baseline, amp, t, self.speed, color, thickness);
        }
    }
}

/// Gallery sketch: the wave field surfed by hand gestures. Primary pinch
/// opens up the amplitude, a second hand's pinch sets line thickness, and a
/// thumb flicked above the index re-rolls the stroke color.
pub struct WavesSketch {
    field: WaveField,
    rng: fastrand::Rng,
    color: [u8; 4],
    amp: f32,
    thickness: f32,
    prev_thumb_above: bool,
    w: usize,
    h: usize,
}

impl WavesSketch {
    pub fn new(seed: u64) -> Self {
        Self {
            field: WaveField::new(12, 80, 1.2, seed),
            rng: fastrand::Rng::with_seed(seed ^ 0xC0FF_EE00),
            color: [10, 120, 200, 160],
            amp: 0.0,
            thickness: 1.6,
            prev_thumb_above: false,
            w: 0,
            h: 0,
        }
    }

    fn base_amp(&self) -> f32 {
        (self.h as f32 * 0.10).max(6.0)
    }
}

impl Sketch for WavesSketch {
    fn name(&self) -> &'static str {
        "Wave Field: Pinch Surf"
    }

    fn on_resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        let lines = ((h as f32 / LINE_SPACING) as usize + 2).clamp(3, 40);
        let res = (w / 6).clamp(24, 120);
        self.field.rebuild(lines, Some(res));
        self.amp = self.base_amp();
    }

    fn reset(&mut self) {
        self.color = [10, 120, 200, 160];
        self.thickness = 1.6;
        self.prev_thumb_above = false;
        self.amp = self.base_amp();
    }

    fn render(&mut self, ctx: &SketchCtx, prev: &[u8], out: &mut [u8]) {
        if prev.len() == out.len() {
            out.copy_from_slice(prev);
        }
        let mut canvas = Canvas::new(out, ctx.w, ctx.h);
        canvas.wash([255, 255, 255], 5);

        let base = self.base_amp();
        let input = &ctx.input;

        // No hand: ease back to the resting amplitude rather than snapping.
        let amp_target = if input.hands >= 1 {
            (base * (0.15 + 1.35 * input.pinch)).clamp(base * 0.12, base * 2.0)
        } else {
            base
        };
        self.amp += (amp_target - self.amp) * (1.0 - (0.02f32).powf(ctx.dt));

        if let Some(pinch_b) = input.pinch_secondary {
            self.thickness =
                (THICKNESS_MIN + (THICKNESS_MAX - THICKNESS_MIN) * pinch_b)
                    .clamp(THICKNESS_MIN, THICKNESS_MAX);
        }

        if input.thumb_above && !self.prev_thumb_above {
            self.color = [
                40 + self.rng.u8(..180),
                40 + self.rng.u8(..180),
                40 + self.rng.u8(..180),
                160,
            ];
        }
        self.prev_thumb_above = input.thumb_above;

        self.field.draw(
            &mut canvas,
            ctx.w as f32,
            ctx.h as f32 * 0.5,
            self.amp,
            ctx.t,
            self.color,
            self.thickness,
        );

        if input.from_hand {
            canvas.fill_circle(input.pointer[0], input.pointer[1], 3.0, [0, 255, 255, 220]);
        }
    }
}
