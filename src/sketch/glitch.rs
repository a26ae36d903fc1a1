//! Face-turn glitch: the more the head turns, the harder the picture tears.

use super::canvas::Canvas;
use super::noise::value_noise;
use super::{Sketch, SketchCtx};

pub struct GlitchSketch {
    rng: fastrand::Rng,
    noise_seed: u32,
    intensity: f32,
    /// Last known face box in pixels, already vertically expanded.
    face_box: Option<[f32; 4]>,
    snapshot: Vec<u8>,
}

impl GlitchSketch {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed ^ 0x611C_7C11),
            noise_seed: (seed >> 17) as u32 | 1,
            intensity: 0.0,
            face_box: None,
            snapshot: Vec::new(),
        }
    }

    fn draw_backdrop(&self, canvas: &mut Canvas<'_>, w: usize, h: usize, t: f32) {
        // Camera stand-in: drifting gray noise with faint scanlines.
        for y in 0..h {
            let scan = if y % 3 == 0 { -14.0 } else { 0.0 };
            for x in 0..w {
                let n = value_noise(
                    x as f32 * 0.035,
                    y as f32 * 0.035 + t * 0.35,
                    self.noise_seed,
                );
                let v = (92.0 + n * 74.0 + scan) as u8;
                canvas.blend_pixel(x as i32, y as i32, [v, v, v], 1.0);
            }
        }
    }
}

impl Sketch for GlitchSketch {
    fn name(&self) -> &'static str {
        "Face Glitch: Don't Turn"
    }

    fn reset(&mut self) {
        self.intensity = 0.0;
        self.face_box = None;
    }

    fn status(&self) -> Option<String> {
        Some(format!(
            "dont turn your face | tear {:>3.0}%",
            self.intensity * 100.0
        ))
    }

    fn render(&mut self, ctx: &SketchCtx, _prev: &[u8], out: &mut [u8]) {
        let w = ctx.w;
        let h = ctx.h;
        let wf = w as f32;
        let hf = h as f32;

        {
            let mut canvas = Canvas::new(out, w, h);
            self.draw_backdrop(&mut canvas, w, h, ctx.t);

            if let Some(face) = &ctx.input.face {
                let bb = face.bbox_px;
                let (bcx, bcy) = ((bb[0] + bb[2]) * 0.5, (bb[1] + bb[3]) * 0.5);
                let (brx, bry) = ((bb[2] - bb[0]) * 0.5, (bb[3] - bb[1]) * 0.5);
                // Landmark stand-ins along the tracked face outline.
                for i in 0..36 {
                    let a = i as f32 / 36.0 * std::f32::consts::TAU;
                    canvas.fill_circle(
                        bcx + a.cos() * brx,
                        bcy + a.sin() * bry,
                        1.2,
                        [0, 220, 90, 230],
                    );
                }
            }
        }

        // Intensity follows |yaw|, smoothed so the tear never clicks on/off.
        let target = ctx.input.face.as_ref().map(|f| f.yaw.abs()).unwrap_or(0.0);
        let k = 1.0 - (1.0 - 0.08f32).powf(ctx.dt * 60.0);
        self.intensity += (target - self.intensity) * k;

        if let Some(face) = &ctx.input.face {
            let bb = face.bbox_px;
            let bh = bb[3] - bb[1];
            if bh >= 4.0 {
                // Cover the whole head: pad up for the forehead, down for the chin.
                let min_y = (bb[1] - bh * 0.6).clamp(0.0, hf);
                let max_y = (bb[3] + bh * 0.35).clamp(0.0, hf);
                self.face_box = Some([bb[0], min_y, bb[2], max_y]);
            }
        }

        let Some([_, min_y, _, max_y]) = self.face_box else {
            return;
        };
        if self.intensity < 0.01 || max_y - min_y < 4.0 {
            return;
        }

        let y0 = min_y as usize;
        let y1 = (max_y as usize).min(h);
        let band_rows = y1.saturating_sub(y0);
        if band_rows == 0 {
            return;
        }

        // Slice the band and shove each slice sideways; chromatic split grows
        // with intensity.
        let intensity = self.intensity.clamp(0.0, 1.0);
        let slices = ((3.0 + intensity * 37.0) as usize).clamp(3, 40);
        let slice_h = (band_rows / slices).max(2);
        let base_freq = 4.0 + intensity * 10.0;
        let max_offset = wf * 0.6;
        let shift = (3.0 * intensity).round() as i32;
        let alpha = 0.75 + 0.25 * intensity;

        self.snapshot.clear();
        self.snapshot.extend_from_slice(&out[y0 * w * 4..y1 * w * 4]);

        for i in 0..slices {
            let sy = y0 + i * slice_h;
            if sy >= y1 {
                break;
            }
            let sh = slice_h.min(y1 - sy);

            let phase = ctx.t * base_freq + i as f32 * 0.45;
            let mut offset = (phase.sin() * intensity * max_offset).round() as i32;
            if self.rng.f32() < intensity * 0.06 {
                offset += ((self.rng.f32() * 2.0 - 1.0) * intensity * max_offset * 0.9) as i32;
            }

            for row in 0..sh {
                let dst_y = sy + row;
                let snap_row = (dst_y - y0) * w * 4;
                for x in 0..w as i32 {
                    let dst = (dst_y * w + x as usize) * 4;
                    // Per-channel source columns; off-canvas samples leave the
                    // destination channel untouched.
                    for (ch, off) in [(0usize, offset + shift), (1, offset - shift), (2, offset)] {
                        let src_x = x - off;
                        if src_x < 0 || src_x >= w as i32 {
                            continue;
                        }
                        let src = snap_row + src_x as usize * 4 + ch;
                        let d = out[dst + ch] as f32;
                        out[dst + ch] = (d + (self.snapshot[src] as f32 - d) * alpha) as u8;
                    }
                }
            }
        }
    }
}
