//! Grid of disks whose slots squint toward the pointer.

use super::canvas::Canvas;
use super::{Sketch, SketchCtx};

const COLS: usize = 11;
const ROWS: usize = 11;

pub struct SlotGridSketch;

impl SlotGridSketch {
    pub fn new() -> Self {
        Self
    }
}

impl Sketch for SlotGridSketch {
    fn name(&self) -> &'static str {
        "Slot Grid: Finger Orbit"
    }

    fn render(&mut self, ctx: &SketchCtx, _prev: &[u8], out: &mut [u8]) {
        let w = ctx.w as f32;
        let h = ctx.h as f32;
        let mut canvas = Canvas::new(out, ctx.w, ctx.h);
        canvas.clear([255, 255, 255]);

        let margin = (w.min(h) * 0.06).max(2.0);
        let grid_w = w - margin * 2.0;
        let grid_h = h - margin * 2.0;
        let cell = (grid_w / (COLS as f32 - 1.0)).min(grid_h / (ROWS as f32 - 1.0));
        let disk = cell * 0.9;

        let [cx, cy] = ctx.input.pointer;
        let max_dist = [
            (0.0, 0.0),
            (w, 0.0),
            (0.0, h),
            (w, h),
        ]
        .iter()
        .map(|&(x, y)| ((cx - x).powi(2) + (cy - y).powi(2)).sqrt())
        .fold(1.0f32, f32::max);

        for iy in 0..ROWS {
            for ix in 0..COLS {
                let x = margin + ix as f32 * grid_w / (COLS as f32 - 1.0);
                let y = margin + iy as f32 * grid_h / (ROWS as f32 - 1.0);

                canvas.fill_circle(x, y, disk * 0.5, [0, 0, 0, 255]);

                // Slot: wide open near the pointer, a sliver far away.
                let d = ((x - cx).powi(2) + (y - cy).powi(2)).sqrt();
                let t = (d / max_dist).clamp(0.0, 1.0);
                let slot_w = disk * 0.6;
                let slot_h = disk * 0.30 + (disk * 0.03 - disk * 0.30) * t;
                canvas.fill_round_rect(x, y, slot_w, slot_h, slot_h * 0.6, [255, 255, 255, 255]);
            }
        }

        // Small dots between cells grow with distance, inverting the motif.
        let step_x = grid_w / (COLS as f32 - 1.0);
        let step_y = grid_h / (ROWS as f32 - 1.0);
        let small_max = disk * 0.45;
        let small_min = disk * 0.12;
        for iy in 0..ROWS - 1 {
            for ix in 0..COLS - 1 {
                let sx = margin + (ix as f32 + 0.5) * step_x;
                let sy = margin + (iy as f32 + 0.5) * step_y;
                let t = (((sx - cx).powi(2) + (sy - cy).powi(2)).sqrt() / max_dist).clamp(0.0, 1.0);
                let size = small_min + (small_max - small_min) * t;
                canvas.fill_circle(sx, sy, size * 0.5, [0, 0, 0, 255]);
            }
        }

        canvas.fill_circle(cx, cy, 3.0, [255, 0, 0, 180]);
    }
}
