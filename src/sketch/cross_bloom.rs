//! Tap-to-spawn rotating crosses with split, gapped arms.

use super::canvas::{Canvas, Surface};
use super::{Sketch, SketchCtx};

const PALETTE: [[u8; 3]; 6] = [
    [255, 0, 0],
    [0, 255, 0],
    [0, 0, 255],
    [255, 255, 0],
    [255, 0, 255],
    [0, 255, 255],
];

/// Oldest crosses are dropped past this count to keep the frame cost flat.
const MAX_THINGS: usize = 160;

struct Thing {
    x: f32,
    y: f32,
    half_size: f32,
    weight: f32,
    colors: [[u8; 3]; 4],
    gap: f32,
    angle: f32,
    /// Radians per second.
    spin: f32,
}

impl Thing {
    fn new(x: f32, y: f32, scale: f32, rng: &mut fastrand::Rng) -> Self {
        let half_size = (40.0 + rng.f32() * 100.0) * scale;
        let mut order = [0usize, 1, 2, 3, 4, 5];
        // Fisher-Yates, then take the first four.
        for i in (1..order.len()).rev() {
            order.swap(i, rng.usize(..=i));
        }
        Self {
            x,
            y,
            half_size,
            weight: (6.0 * scale).max(1.2).max(half_size * 0.12),
            colors: std::array::from_fn(|i| PALETTE[order[i]]),
            gap: (half_size * 0.45).clamp((10.0 * scale).min(half_size * 0.9), half_size * 0.9),
            angle: rng.f32() * std::f32::consts::TAU,
            spin: (rng.f32() * 2.0 - 1.0) * 1.2,
        }
    }

    fn draw(&self, canvas: &mut Canvas<'_>) {
        let (sin, cos) = self.angle.sin_cos();
        let rot = |x: f32, y: f32| [self.x + x * cos - y * sin, self.y + x * sin + y * cos];
        let s = self.half_size;

        canvas.set_stroke_weight(self.weight);
        let mut split = |x1: f32, y1: f32, x2: f32, y2: f32, c1: [u8; 3], c2: [u8; 3]| {
            let dx = x2 - x1;
            let dy = y2 - y1;
            let len = (dx * dx + dy * dy).sqrt();
            if len <= 0.0 {
                return;
            }
            let gap = self.gap.min(len - 0.001);
            let keep = (len - gap) / 2.0;
            let ux = dx / len;
            let uy = dy / len;
            canvas.set_stroke([c1[0], c1[1], c1[2], 255]);
            canvas.segment(rot(x1, y1), rot(x1 + ux * keep, y1 + uy * keep));
            canvas.set_stroke([c2[0], c2[1], c2[2], 255]);
            canvas.segment(rot(x2 - ux * keep, y2 - uy * keep), rot(x2, y2));
        };

        split(-s, -s, s, s, self.colors[0], self.colors[1]);
        split(s, -s, -s, s, self.colors[2], self.colors[3]);
    }
}

pub struct CrossBloomSketch {
    things: Vec<Thing>,
    rng: fastrand::Rng,
    w: usize,
    h: usize,
}

impl CrossBloomSketch {
    pub fn new(seed: u64) -> Self {
        Self {
            things: Vec::new(),
            rng: fastrand::Rng::with_seed(seed ^ 0xB100_4ED5),
            w: 0,
            h: 0,
        }
    }

    fn scale(&self) -> f32 {
        // The original sketch was tuned against a ~700px window.
        (self.w.min(self.h) as f32 / 700.0).max(0.05)
    }
}

impl Sketch for CrossBloomSketch {
    fn name(&self) -> &'static str {
        "Cross Bloom: Tap Doodler"
    }

    fn on_resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
    }

    fn reset(&mut self) {
        self.things.clear();
    }

    fn render(&mut self, ctx: &SketchCtx, prev: &[u8], out: &mut [u8]) {
        if ctx.input.tap {
            let [x, y] = ctx.input.pointer;
            let scale = self.scale();
            self.things.push(Thing::new(x, y, scale, &mut self.rng));
            if self.things.len() > MAX_THINGS {
                self.things.remove(0);
            }
        }

        if prev.len() == out.len() {
            out.copy_from_slice(prev);
        }
        let mut canvas = Canvas::new(out, ctx.w, ctx.h);
        canvas.wash([255, 255, 255], 50);

        for thing in &mut self.things {
            thing.angle += thing.spin * ctx.dt;
        }
        for thing in &self.things {
            thing.draw(&mut canvas);
        }
    }
}
