//! Grab the razor with your index finger and shave the moustache off.

use super::canvas::Canvas;
use super::{Sketch, SketchCtx};

pub struct MoustacheSketch {
    /// Erasable moustache layer, one alpha byte per pixel.
    mask: Vec<u8>,
    mask_total: u64,
    razor: [f32; 2],
    grabbed: bool,
    w: usize,
    h: usize,
}

impl MoustacheSketch {
    pub fn new() -> Self {
        Self {
            mask: Vec::new(),
            mask_total: 0,
            razor: [0.0, 0.0],
            grabbed: false,
            w: 0,
            h: 0,
        }
    }

    fn unit(&self) -> f32 {
        self.w.min(self.h) as f32
    }

    fn razor_half(&self) -> (f32, f32) {
        let rw = self.unit() * 0.07;
        (rw, rw * 0.45)
    }

    fn grab_radius(&self) -> f32 {
        let (hw, hh) = self.razor_half();
        hw.max(hh) * 1.4
    }

    fn build_mask(&mut self) {
        let w = self.w;
        let h = self.h;
        self.mask = vec![0u8; w * h];
        if w == 0 || h == 0 {
            self.mask_total = 0;
            return;
        }

        // Two soft ellipse lobes meeting under the "nose" at canvas center.
        let cx = w as f32 * 0.5;
        let cy = h as f32 * 0.5;
        let mw = self.unit() * 0.42;
        let mh = mw * 0.28;
        let rx = mw * 0.30;
        let ry = mh * 0.5;

        for y in 0..h {
            for x in 0..w {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let mut alpha = 0.0f32;
                for side in [-1.0f32, 1.0] {
                    let lx = (dx - side * mw * 0.26) / rx;
                    // Lobes droop slightly toward their tips.
                    let ly = (dy - (dx * side * 0.08).max(0.0)) / ry;
                    let d = (lx * lx + ly * ly).sqrt();
                    alpha = alpha.max(((1.0 - d) * 6.0).clamp(0.0, 1.0));
                }
                self.mask[y * w + x] = (alpha * 255.0) as u8;
            }
        }
        self.mask_total = self.mask.iter().map(|&a| a as u64).sum();
    }

    fn erase_under_razor(&mut self) {
        let (hw, hh) = self.razor_half();
        let (ew, eh) = (hw * 1.1, hh * 1.6);
        let x0 = ((self.razor[0] - ew).floor().max(0.0)) as usize;
        let y0 = ((self.razor[1] - eh).floor().max(0.0)) as usize;
        let x1 = ((self.razor[0] + ew).ceil() as usize).min(self.w);
        let y1 = ((self.razor[1] + eh).ceil() as usize).min(self.h);
        for y in y0..y1 {
            for x in x0..x1 {
                self.mask[y * self.w + x] = 0;
            }
        }
    }

    /// Share of the moustache still standing, 0..1.
    pub fn remaining(&self) -> f32 {
        if self.mask_total == 0 {
            return 0.0;
        }
        let left: u64 = self.mask.iter().map(|&a| a as u64).sum();
        left as f32 / self.mask_total as f32
    }
}

impl Sketch for MoustacheSketch {
    fn name(&self) -> &'static str {
        "Moustache: Clean Shave"
    }

    fn on_resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.build_mask();
        self.razor = [w as f32 * 0.15, h as f32 * 0.2];
        self.grabbed = false;
    }

    fn reset(&mut self) {
        self.on_resize(self.w, self.h);
    }

    fn status(&self) -> Option<String> {
        let left = self.remaining();
        if left <= 0.02 {
            Some("clean shave! (r to regrow)".to_string())
        } else {
            Some(format!("moustache left {:>3.0}%", left * 100.0))
        }
    }

    fn render(&mut self, ctx: &SketchCtx, _prev: &[u8], out: &mut [u8]) {
        let input = &ctx.input;

        if !input.pointer_active {
            // Tracker gone: drop the razor so it can be re-grabbed later.
            self.grabbed = false;
        } else {
            let [px, py] = input.pointer;
            if !self.grabbed {
                let d = ((px - self.razor[0]).powi(2) + (py - self.razor[1]).powi(2)).sqrt();
                if d < self.grab_radius() {
                    self.grabbed = true;
                }
            }
            if self.grabbed {
                self.razor = [px, py];
                let target_r = self.unit() * 0.25;
                let dc = ((self.razor[0] - ctx.w as f32 * 0.5).powi(2)
                    + (self.razor[1] - ctx.h as f32 * 0.5).powi(2))
                .sqrt();
                if dc < target_r + self.grab_radius() {
                    self.erase_under_razor();
                }
            }
        }

        let mut canvas = Canvas::new(out, ctx.w, ctx.h);
        canvas.clear([250, 250, 250]);

        // A bare face to shave: head disc, eyes, nose tip.
        let cx = ctx.w as f32 * 0.5;
        let cy = ctx.h as f32 * 0.5;
        let u = self.unit();
        canvas.fill_circle(cx, cy - u * 0.1, u * 0.34, [245, 219, 190, 255]);
        canvas.fill_circle(cx - u * 0.11, cy - u * 0.2, u * 0.025, [40, 40, 40, 255]);
        canvas.fill_circle(cx + u * 0.11, cy - u * 0.2, u * 0.025, [40, 40, 40, 255]);
        canvas.fill_circle(cx, cy - u * 0.06, u * 0.03, [226, 178, 140, 255]);

        // Moustache from the erasable mask.
        for y in 0..ctx.h {
            for x in 0..ctx.w {
                let a = self.mask[y * ctx.w + x];
                if a > 0 {
                    canvas.blend_pixel(x as i32, y as i32, [60, 36, 18], a as f32 / 255.0);
                }
            }
        }

        // Razor: steel head on a colored handle.
        let (hw, hh) = self.razor_half();
        let [rx, ry] = self.razor;
        canvas.fill_round_rect(rx, ry + hh * 3.2, hw * 0.45, hh * 4.5, hw * 0.2, [30, 90, 200, 255]);
        canvas.fill_round_rect(rx, ry, hw * 2.0, hh * 2.0, hh * 0.5, [205, 210, 220, 255]);
        canvas.fill_round_rect(rx, ry - hh * 0.6, hw * 2.0, hh * 0.5, hh * 0.2, [150, 155, 165, 255]);
        if self.grabbed {
            canvas.fill_circle(rx, ry, self.grab_radius(), [80, 180, 255, 60]);
        }

        if self.remaining() <= 0.02 {
            // Victory pulse around the border.
            let pulse = (0.5 + 0.5 * (ctx.t * 6.0).sin()) * 255.0;
            let glow = [30, (pulse * 0.8) as u8, 60];
            for x in 0..ctx.w as i32 {
                for dy in 0..2 {
                    canvas.blend_pixel(x, dy, glow, 0.8);
                    canvas.blend_pixel(x, ctx.h as i32 - 1 - dy, glow, 0.8);
                }
            }
        }
    }
}
