//! Generates a synthetic NDJSON tracking script with staged gestures, for
//! demoing and testing without a real tracker:
//!   1. pinch sweep (amplitude control)
//!   2. two-handed section (thickness control)
//!   3. thumb flicks (color triggers)
//!   4. face turns (glitch intensity)
//!   5. a dropout gap (fallback behavior)

use std::fs;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tui_sketchbook::landmark::{Face, Hand, INDEX_TIP, LandmarkFrame, THUMB_TIP};

struct Args {
    out: PathBuf,
    fps: u32,
    seconds: f32,
}

fn parse_args() -> Args {
    let mut out = PathBuf::from("assets/test/gestures.ndjson");
    let mut fps = 30u32;
    let mut seconds = 40.0f32;

    let mut it = std::env::args().skip(1);
    while let Some(k) = it.next() {
        let v = it.next();
        match (k.as_str(), v) {
            ("--out", Some(p)) => out = PathBuf::from(p),
            ("--fps", Some(v)) => {
                if let Ok(n) = v.parse::<u32>() {
                    fps = n.clamp(5, 120);
                }
            }
            ("--seconds", Some(v)) => {
                if let Ok(s) = v.parse::<f32>() {
                    seconds = s.clamp(1.0, 600.0);
                }
            }
            _ => {}
        }
    }

    Args { out, fps, seconds }
}

fn main() -> Result<()> {
    let args = parse_args();
    if let Some(parent) = args.out.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create dir {}", parent.display()))?;
    }

    let file = fs::File::create(&args.out)
        .with_context(|| format!("create {}", args.out.display()))?;
    let mut w = BufWriter::new(file);

    let frame_ms = 1000.0 / args.fps as f32;
    let total = (args.seconds * args.fps as f32) as u64;
    for i in 0..total {
        let t_ms = (i as f32 * frame_ms) as u64;
        let frame = staged_frame(t_ms as f32 / 1000.0, t_ms);
        writeln!(w, "{}", serde_json::to_string(&frame)?)?;
    }
    w.flush()?;

    println!("generated: {}", args.out.display());
    println!(
        "fps={} duration={:.1}s frames={}",
        args.fps, args.seconds, total
    );
    Ok(())
}

fn staged_frame(t: f32, t_ms: u64) -> LandmarkFrame {
    // Stage boundaries in seconds, cycled.
    let cycle = t % 40.0;

    let mut hands = Vec::new();
    let mut face = None;

    match cycle {
        c if c < 10.0 => {
            // Slow pinch open/close while circling.
            let spread = 0.04 + 0.20 * (0.5 + 0.5 * (c * 0.9).sin());
            hands.push(hand_at(
                0.5 + 0.25 * (c * 0.5).cos(),
                0.5 + 0.22 * (c * 0.4).sin(),
                spread,
                0.05,
            ));
        }
        c if c < 18.0 => {
            // Second hand joins and works its own pinch.
            hands.push(hand_at(0.35, 0.45, 0.12, 0.05));
            let spread_b = 0.03 + 0.22 * (0.5 + 0.5 * ((c - 10.0) * 1.1).cos());
            hands.push(hand_at(0.68, 0.55, spread_b, 0.05));
        }
        c if c < 24.0 => {
            // Thumb flicks above the index in ~1s bursts.
            let above = ((c - 18.0) * 1.2).fract() < 0.25;
            hands.push(hand_at(
                0.5 + 0.15 * (c * 0.8).sin(),
                0.5,
                0.1,
                if above { -0.06 } else { 0.05 },
            ));
        }
        c if c < 36.0 => {
            // Head turns left, center, right while one hand idles.
            hands.push(hand_at(0.3, 0.7, 0.08, 0.05));
            let yaw = 0.55 * ((c - 24.0) * 0.6).sin();
            face = Some(face_at(0.5, 0.4, yaw));
        }
        _ => {
            // Dropout: tracker sees nothing at all.
        }
    }

    if face.is_none() && cycle < 36.0 {
        face = Some(face_at(0.5, 0.38, 0.0));
    }

    LandmarkFrame { t_ms, hands, face }
}

fn hand_at(cx: f32, cy: f32, spread: f32, thumb_dy: f32) -> Hand {
    let mut points = vec![[cx, cy + 0.08, 0.0]; 21];
    points[INDEX_TIP] = [cx + spread * 0.5, cy, -0.02];
    points[THUMB_TIP] = [cx - spread * 0.5, cy + thumb_dy, -0.02];
    Hand { points }
}

fn face_at(cx: f32, cy: f32, yaw: f32) -> Face {
    let (sin, cos) = yaw.sin_cos();
    let points = (0..48)
        .map(|i| {
            let a = i as f32 / 48.0 * std::f32::consts::TAU;
            let ex = 0.09 * a.cos();
            let ey = 0.12 * a.sin();
            [cx + ex * cos, cy + ey, ex * sin]
        })
        .collect();
    Face { points }
}
