//! Offscreen frame-cost report for every sketch, plus an optional budget
//! check for CI smoke runs.

use std::time::Instant;

use anyhow::Result;
use tui_sketchbook::sketch::{FaceInput, FrameInput, SketchBook, SketchCtx, make_sketches};

struct Args {
    frames: usize,
    w: usize,
    h: usize,
    max_ms: f64,
    check: bool,
}

fn parse_args() -> Args {
    let mut args = Args {
        frames: 240,
        w: 240,
        h: 136,
        max_ms: 25.0,
        check: false,
    };

    let argv = std::env::args().skip(1).collect::<Vec<_>>();
    let mut i = 0usize;
    while i < argv.len() {
        let k = argv[i].as_str();
        let v = argv.get(i + 1).map(|s| s.as_str());
        match (k, v) {
            ("--frames", Some(x)) => {
                if let Ok(n) = x.parse::<usize>() {
                    args.frames = n.max(1);
                }
                i += 2;
            }
            ("--size", Some(x)) => {
                if let Some((w, h)) = x.split_once('x') {
                    if let (Ok(w), Ok(h)) = (w.parse(), h.parse()) {
                        args.w = w;
                        args.h = h;
                    }
                }
                i += 2;
            }
            ("--max-ms", Some(x)) => {
                if let Ok(ms) = x.parse::<f64>() {
                    args.max_ms = ms;
                }
                i += 2;
            }
            ("--check", _) => {
                args.check = true;
                i += 1;
            }
            _ => {
                i += 1;
            }
        }
    }
    args
}

fn bench_input(t: f32, w: usize, h: usize) -> FrameInput {
    FrameInput {
        pointer: [
            (0.5 + 0.3 * (t * 0.7).sin()) * w as f32,
            (0.5 + 0.3 * (t * 0.5).cos()) * h as f32,
        ],
        pointer_active: true,
        from_hand: true,
        tap: (t * 2.0).fract() < 0.03,
        hands: 2,
        pinch: 0.5 + 0.5 * (t * 0.9).sin(),
        pinch_secondary: Some(0.5 + 0.5 * (t * 1.3).cos()),
        thumb_above: (t * 0.4).sin() > 0.9,
        face: Some(FaceInput {
            yaw: 0.6 * (t * 0.45).sin(),
            bbox_px: [
                w as f32 * 0.38,
                h as f32 * 0.25,
                w as f32 * 0.62,
                h as f32 * 0.55,
            ],
        }),
    }
}

fn main() -> Result<()> {
    let args = parse_args();
    let count = make_sketches(0).len();
    let mut failed = false;

    println!(
        "benchmark: {} sketches, {}x{} px, {} frames each",
        count, args.w, args.h, args.frames
    );

    for idx in 0..count {
        let mut book = SketchBook::new(make_sketches(0xBEE5), idx);
        book.resize(args.w, args.h);
        let name = book.active_name();

        // Warmup frame before timing.
        let warm = SketchCtx {
            t: 0.0,
            dt: 1.0 / 60.0,
            w: args.w,
            h: args.h,
            input: bench_input(0.0, args.w, args.h),
        };
        let _ = book.render(&warm);

        let start = Instant::now();
        for f in 0..args.frames {
            let t = f as f32 / 60.0;
            let ctx = SketchCtx {
                t,
                dt: 1.0 / 60.0,
                w: args.w,
                h: args.h,
                input: bench_input(t, args.w, args.h),
            };
            let _ = book.render(&ctx);
        }
        let ms = start.elapsed().as_secs_f64() * 1000.0 / args.frames as f64;
        let status = if args.check && ms > args.max_ms {
            failed = true;
            "OVER BUDGET"
        } else {
            "ok"
        };
        println!("  {name:<28} {ms:>7.3} ms/frame  {status}");
    }

    if failed {
        anyhow::bail!("at least one sketch exceeded {:.1} ms/frame", args.max_ms);
    }
    Ok(())
}
