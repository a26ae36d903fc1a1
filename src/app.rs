use crate::config::{Config, RendererMode};
use crate::prefs::{AppPrefs, prefs_storage_path};
use crate::render::{AsciiRenderer, BrailleRenderer, Frame, HalfBlockRenderer, Renderer};
use crate::sketch::{
    FaceInput, FrameInput, Sketch as _, SketchBook, SketchCtx, make_sketches, select_sketch,
};
use crate::terminal::TerminalGuard;
use crate::tracking::TrackingSystem;
use anyhow::Context;
use crossterm::event::{self, Event, KeyCode, KeyModifiers, KeyEventKind, MouseEventKind};
use std::fmt::Write as _;
use std::io::BufWriter;
use std::time::{Duration, Instant};

const HELP_TEXT: &str = "tui-sketchbook keys\n\
    \n\
    tab / right / n   next sketch\n\
    shift-tab / left  previous sketch\n\
    1..9              jump to sketch\n\
    space / click     tap (spawn, where a sketch uses it)\n\
    r                 reset active sketch\n\
    h                 toggle HUD\n\
    ?                 toggle this help\n\
    q / esc           quit\n\
    \n\
    Hands steer the pointer when a tracker is attached;\n\
    the mouse takes over whenever tracking drops out.";

pub fn run(cfg: Config) -> anyhow::Result<()> {
    let seed = cfg.seed.unwrap_or_else(|| fastrand::u64(..));

    let prefs_path = if cfg.prefs { prefs_storage_path() } else { None };
    let mut prefs = match AppPrefs::load(prefs_path.as_deref()) {
        Ok(p) => p,
        Err(err) => {
            eprintln!("prefs load failed ({err}); using defaults");
            AppPrefs::default()
        }
    };

    let renderer_mode = cfg
        .renderer
        .or_else(|| parse_renderer(prefs.renderer.as_deref()))
        .unwrap_or(RendererMode::HalfBlock);
    let mut renderer: Box<dyn Renderer> = match renderer_mode {
        RendererMode::Ascii => Box::new(AsciiRenderer::new()),
        RendererMode::HalfBlock => Box::new(HalfBlockRenderer::new()),
        RendererMode::Braille => Box::new(BrailleRenderer::new()),
    };
    let (px_w_mul, px_h_mul) = renderer_mode.cell_pixels();

    let tracking = TrackingSystem::new(
        cfg.source,
        cfg.script.as_deref(),
        cfg.script_loop,
        cfg.mirror,
    )
    .with_context(|| format!("start tracking (source={:?})", cfg.source))?;
    let features_cell = tracking.features();

    let sketches = make_sketches(seed);
    let names = sketches.iter().map(|s| s.name()).collect::<Vec<_>>();
    let active = select_sketch(cfg.sketch.as_deref(), &names)
        .or_else(|| select_sketch(prefs.sketch.as_deref(), &names))
        .unwrap_or(0);
    let mut book = SketchBook::new(sketches, active);

    let _term = TerminalGuard::new()?;
    let mut out = BufWriter::new(TerminalGuard::stdout());

    let mut last_size = crossterm::terminal::size().context("get terminal size")?;
    if last_size.0 < 4 || last_size.1 < 2 {
        return Err(anyhow::anyhow!(
            "terminal too small (need at least 4x2, got {}x{})",
            last_size.0,
            last_size.1
        ));
    }

    let mut show_hud = prefs.show_hud;
    let mut show_help = false;
    let mut mouse = MousePointer::new();
    let mut fps = FpsCounter::new();

    let start = Instant::now();
    let mut last_frame = start;
    let frame_budget = Duration::from_secs_f32(1.0 / cfg.fps.max(1) as f32);
    let mut last_render_ms = 0.0f32;
    let source_label = format!("{:?}", cfg.source).to_ascii_lowercase();

    loop {
        let now = Instant::now();
        let mut tap = false;

        // Drain input events (non-blocking).
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(k) if k.kind != KeyEventKind::Release => match k.code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        save_prefs(&mut prefs, prefs_path.as_deref(), &book, renderer.name(), show_hud);
                        return Ok(());
                    }
                    KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => {
                        save_prefs(&mut prefs, prefs_path.as_deref(), &book, renderer.name(), show_hud);
                        return Ok(());
                    }
                    KeyCode::Tab | KeyCode::Right | KeyCode::Char('n') => book.next(),
                    KeyCode::BackTab | KeyCode::Left | KeyCode::Char('p') => book.prev(),
                    KeyCode::Char(c @ '1'..='9') => {
                        book.select(c as usize - '1' as usize);
                    }
                    KeyCode::Char('r') => book.reset_active(),
                    KeyCode::Char('h') => show_hud = !show_hud,
                    KeyCode::Char('?') => show_help = !show_help,
                    KeyCode::Char(' ') => tap = true,
                    _ => {}
                },
                Event::Mouse(m) => {
                    let px = (m.column as f32 + 0.5) * px_w_mul as f32;
                    let py = (m.row as f32 + 0.5) * px_h_mul as f32;
                    mouse.observe(px, py);
                    if matches!(m.kind, MouseEventKind::Down(_)) {
                        tap = true;
                    }
                }
                Event::Resize(c, r) => last_size = (c, r),
                _ => {}
            }
        }

        // Resize events can be missed in some terminals; re-check per frame.
        let sz = crossterm::terminal::size()?;
        if sz != last_size {
            last_size = sz;
        }

        let dt = now.duration_since(last_frame).as_secs_f32().max(1e-6);
        last_frame = now;

        let (term_cols, term_rows) = last_size;
        let hud_rows: u16 = if show_hud { 2 } else { 0 };
        let visual_rows = term_rows.saturating_sub(hud_rows).max(1);
        let w = (term_cols as usize) * px_w_mul;
        let h = (visual_rows as usize) * px_h_mul;
        book.resize(w, h);

        let features = features_cell.load();
        let age_ms = features_cell.age_ms();
        let fresh = age_ms <= cfg.stale_ms;
        let hand_live = fresh && features.hand_count > 0;

        mouse.step(dt);
        let input = FrameInput {
            pointer: if hand_live {
                [features.pointer[0] * w as f32, features.pointer[1] * h as f32]
            } else {
                mouse.position()
            },
            pointer_active: hand_live || mouse.active(),
            from_hand: hand_live,
            tap,
            hands: if fresh { features.hand_count } else { 0 },
            pinch: features.pinch,
            pinch_secondary: (fresh && features.hand_count >= 2)
                .then_some(features.pinch_secondary),
            thumb_above: fresh && features.thumb_above,
            face: (fresh && features.face_present).then(|| FaceInput {
                yaw: features.face_yaw,
                bbox_px: [
                    features.face_box[0] * w as f32,
                    features.face_box[1] * h as f32,
                    features.face_box[2] * w as f32,
                    features.face_box[3] * h as f32,
                ],
            }),
        };

        let ctx = SketchCtx {
            t: now.duration_since(start).as_secs_f32(),
            dt,
            w,
            h,
            input,
        };

        // HUD reflects the previous frame's status; built first because the
        // rendered pixel slice keeps the book borrowed.
        let hud = if show_hud {
            build_hud(
                term_cols as usize,
                &book,
                &source_label,
                age_ms,
                features.hand_count,
                input.from_hand,
                renderer.name(),
                fps.fps(),
                last_render_ms,
            )
        } else {
            String::new()
        };

        let render_start = Instant::now();
        let pixels = book.render(&ctx);

        let frame = Frame {
            term_cols,
            term_rows,
            visual_rows,
            pixel_width: w,
            pixel_height: h,
            pixels_rgba: pixels,
            hud: &hud,
            hud_rows,
            overlay: show_help.then_some(HELP_TEXT),
            sync_updates: cfg.sync_updates,
        };
        renderer.render(&frame, &mut out)?;
        last_render_ms = render_start.elapsed().as_secs_f32() * 1000.0;

        fps.tick(now);

        let elapsed = now.elapsed();
        if elapsed < frame_budget {
            std::thread::sleep(frame_budget - elapsed);
        }
    }
}

fn save_prefs(
    prefs: &mut AppPrefs,
    path: Option<&std::path::Path>,
    book: &SketchBook,
    renderer: &str,
    show_hud: bool,
) {
    prefs.sketch = Some(book.active_name().to_string());
    prefs.renderer = Some(renderer.to_string());
    prefs.show_hud = show_hud;
    if let Err(err) = prefs.save(path) {
        eprintln!("prefs save failed: {err}");
    }
}

fn parse_renderer(name: Option<&str>) -> Option<RendererMode> {
    match name? {
        "ascii" => Some(RendererMode::Ascii),
        "halfblock" => Some(RendererMode::HalfBlock),
        "braille" => Some(RendererMode::Braille),
        _ => None,
    }
}

#[allow(clippy::too_many_arguments)]
fn build_hud(
    cols: usize,
    book: &SketchBook,
    source: &str,
    age_ms: f32,
    hands: u32,
    from_hand: bool,
    renderer: &str,
    fps: f32,
    render_ms: f32,
) -> String {
    let mut line1 = String::new();
    let _ = write!(
        line1,
        " [{}/{}] {}  |  {} {}  |  {} {:.0}fps {:.1}ms",
        book.active_index() + 1,
        book.len(),
        book.active_name(),
        source,
        if age_ms.is_finite() {
            if from_hand {
                format!("hands:{hands} {age_ms:.0}ms")
            } else {
                format!("stale {age_ms:.0}ms -> mouse")
            }
        } else {
            "no frames -> mouse".to_string()
        },
        renderer,
        fps,
        render_ms,
    );

    let mut line2 = book
        .active_status()
        .map(|s| format!(" {s}  |  "))
        .unwrap_or_else(|| " ".to_string());
    line2.push_str("[tab] next  [r] reset  [h] hud  [?] help  [q] quit");

    line1.truncate(cols);
    line2.truncate(cols);
    format!("{line1}\n{line2}")
}

struct MousePointer {
    target: Option<[f32; 2]>,
    pos: [f32; 2],
    seen: bool,
}

impl MousePointer {
    fn new() -> Self {
        Self {
            target: None,
            pos: [0.0, 0.0],
            seen: false,
        }
    }

    fn observe(&mut self, x: f32, y: f32) {
        if !self.seen {
            self.pos = [x, y];
        }
        self.target = Some([x, y]);
        self.seen = true;
    }

    /// Ease toward the last mouse position so hand->mouse handover doesn't
    /// snap, mirroring the fingertip smoother.
    fn step(&mut self, dt: f32) {
        if let Some(t) = self.target {
            let k = 1.0 - (1.0 - 0.25f32).powf(dt * 60.0);
            self.pos[0] += (t[0] - self.pos[0]) * k;
            self.pos[1] += (t[1] - self.pos[1]) * k;
        }
    }

    fn position(&self) -> [f32; 2] {
        self.pos
    }

    fn active(&self) -> bool {
        self.seen
    }
}

struct FpsCounter {
    frames: u32,
    last_report: Instant,
    fps: f32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            frames: 0,
            last_report: Instant::now(),
            fps: 0.0,
        }
    }

    fn tick(&mut self, now: Instant) {
        self.frames += 1;
        let span = now.duration_since(self.last_report).as_secs_f32();
        if span >= 0.5 {
            self.fps = self.frames as f32 / span;
            self.frames = 0;
            self.last_report = now;
        }
    }

    fn fps(&self) -> f32 {
        self.fps
    }
}
