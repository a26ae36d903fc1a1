use crate::render::{Frame, Renderer, luma_u8, text_frame_begin, text_frame_end, write_bg_rgb, write_fg_rgb};
use std::io::Write;

/// 2x4 pixels per cell via braille dot patterns: per-cell luma threshold
/// picks the dots, the "on" and "off" pixel averages pick fg/bg colors.
pub struct BrailleRenderer {
    last_fg: Option<(u8, u8, u8)>,
    last_bg: Option<(u8, u8, u8)>,
}

impl BrailleRenderer {
    pub fn new() -> Self {
        Self {
            last_fg: None,
            last_bg: None,
        }
    }
}

// Braille dot bit for each (dy*2 + dx) position in the 2x4 cell.
const DOT_BITS: [u8; 8] = [0x01, 0x08, 0x02, 0x10, 0x04, 0x20, 0x40, 0x80];

impl Renderer for BrailleRenderer {
    fn name(&self) -> &'static str {
        "braille"
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        let Some((cols, visual_rows, w, _h)) = text_frame_begin(frame, 2, 4, out)? else {
            return Ok(());
        };

        self.last_fg = None;
        self.last_bg = None;

        for row in 0..visual_rows {
            let base_y = row * 4;
            for col in 0..cols {
                let base_x = col * 2;

                let mut lum = [0u8; 8];
                let mut rgb = [(0u8, 0u8, 0u8); 8];
                for dy in 0..4usize {
                    for dx in 0..2usize {
                        let i = dy * 2 + dx;
                        let idx = ((base_y + dy) * w + base_x + dx) * 4;
                        let (r, g, b) = (
                            frame.pixels_rgba[idx],
                            frame.pixels_rgba[idx + 1],
                            frame.pixels_rgba[idx + 2],
                        );
                        rgb[i] = (r, g, b);
                        lum[i] = luma_u8(r, g, b);
                    }
                }

                let min_l = *lum.iter().min().unwrap_or(&0);
                let max_l = *lum.iter().max().unwrap_or(&0);
                let thr = min_l as u16 + (max_l as u16 - min_l as u16) / 2;

                let mut bits = 0u8;
                let mut on = ColorSum::default();
                let mut off = ColorSum::default();
                for i in 0..8usize {
                    if lum[i] as u16 > thr {
                        bits |= DOT_BITS[i];
                        on.add(rgb[i]);
                    } else {
                        off.add(rgb[i]);
                    }
                }

                let (fg, bg, ch) = if bits == 0 {
                    let c = off.avg_or((0, 0, 0));
                    (c, c, ' ')
                } else {
                    let fg = on.avg_or((0, 0, 0));
                    let bg = off.avg_or(fg);
                    let ch = char::from_u32(0x2800 + bits as u32).unwrap_or(' ');
                    (fg, bg, ch)
                };

                if self.last_fg != Some(fg) {
                    write_fg_rgb(out, fg.0, fg.1, fg.2)?;
                    self.last_fg = Some(fg);
                }
                if self.last_bg != Some(bg) {
                    write_bg_rgb(out, bg.0, bg.1, bg.2)?;
                    self.last_bg = Some(bg);
                }
                write!(out, "{ch}")?;
            }
            out.write_all(b"\r\n")?;
        }

        text_frame_end(frame, cols, visual_rows, out)
    }
}

#[derive(Default)]
struct ColorSum {
    r: u32,
    g: u32,
    b: u32,
    n: u32,
}

impl ColorSum {
    fn add(&mut self, (r, g, b): (u8, u8, u8)) {
        self.r += r as u32;
        self.g += g as u32;
        self.b += b as u32;
        self.n += 1;
    }

    fn avg_or(&self, fallback: (u8, u8, u8)) -> (u8, u8, u8) {
        if self.n == 0 {
            fallback
        } else {
            (
                (self.r / self.n) as u8,
                (self.g / self.n) as u8,
                (self.b / self.n) as u8,
            )
        }
    }
}
