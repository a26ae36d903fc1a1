pub mod canvas;
mod cross_bloom;
mod glitch;
mod moustache;
pub mod noise;
mod slot_grid;
pub mod wave;

pub use canvas::{Canvas, Surface};
pub use cross_bloom::CrossBloomSketch;
pub use glitch::GlitchSketch;
pub use moustache::MoustacheSketch;
pub use slot_grid::SlotGridSketch;
pub use wave::{WaveField, WaveLine, WavesSketch};

/// Everything a sketch may react to in one frame, already resolved against
/// the fallback policy (mouse stands in for a lost hand, stale faces are
/// dropped). Sketches never read the tracker or the terminal directly.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput {
    /// Pointer in pixel coordinates.
    pub pointer: [f32; 2],
    /// A live hand or the mouse is currently steering the pointer.
    pub pointer_active: bool,
    /// Pointer comes from a tracked fingertip rather than the mouse.
    pub from_hand: bool,
    /// Click / tap happened this frame.
    pub tap: bool,
    pub hands: u32,
    /// Primary-hand pinch openness, 0..1.
    pub pinch: f32,
    /// Secondary-hand pinch, when a second hand is tracked.
    pub pinch_secondary: Option<f32>,
    pub thumb_above: bool,
    pub face: Option<FaceInput>,
}

#[derive(Debug, Clone, Copy)]
pub struct FaceInput {
    /// Head yaw in -1..1.
    pub yaw: f32,
    /// Face bounding box in pixel coordinates.
    pub bbox_px: [f32; 4],
}

impl Default for FrameInput {
    fn default() -> Self {
        Self {
            pointer: [0.0, 0.0],
            pointer_active: false,
            from_hand: false,
            tap: false,
            hands: 0,
            pinch: 0.5,
            pinch_secondary: None,
            thumb_above: false,
            face: None,
        }
    }
}

pub struct SketchCtx {
    /// Seconds since app start.
    pub t: f32,
    pub dt: f32,
    pub w: usize,
    pub h: usize,
    pub input: FrameInput,
}

pub trait Sketch {
    fn name(&self) -> &'static str;
    fn render(&mut self, ctx: &SketchCtx, prev: &[u8], out: &mut [u8]);
    fn on_resize(&mut self, _w: usize, _h: usize) {}
    fn reset(&mut self) {}
    /// One-line status for the HUD.
    fn status(&self) -> Option<String> {
        None
    }
}

pub fn make_sketches(seed: u64) -> Vec<Box<dyn Sketch>> {
    vec![
        Box::new(SlotGridSketch::new()),
        Box::new(CrossBloomSketch::new(seed)),
        Box::new(WavesSketch::new(seed)),
        Box::new(GlitchSketch::new(seed)),
        Box::new(MoustacheSketch::new()),
    ]
}

/// Owns the gallery, the active selection, and the front/back pixel buffers.
pub struct SketchBook {
    sketches: Vec<Box<dyn Sketch>>,
    active: usize,
    w: usize,
    h: usize,
    front: Vec<u8>,
    back: Vec<u8>,
}

impl SketchBook {
    pub fn new(sketches: Vec<Box<dyn Sketch>>, active: usize) -> Self {
        let active = if sketches.is_empty() {
            0
        } else {
            active.min(sketches.len() - 1)
        };
        Self {
            sketches,
            active,
            w: 0,
            h: 0,
            front: Vec::new(),
            back: Vec::new(),
        }
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        if (w, h) == (self.w, self.h) {
            return;
        }
        self.w = w;
        self.h = h;
        let len = w * h * 4;
        self.front = vec![0u8; len];
        self.back = vec![0u8; len];
        for sketch in &mut self.sketches {
            sketch.on_resize(w, h);
        }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.sketches.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.sketches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sketches.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_name(&self) -> &'static str {
        self.sketches[self.active].name()
    }

    pub fn active_status(&self) -> Option<String> {
        self.sketches[self.active].status()
    }

    pub fn next(&mut self) {
        self.active = (self.active + 1) % self.sketches.len();
        self.clear_buffers();
    }

    pub fn prev(&mut self) {
        self.active = (self.active + self.sketches.len() - 1) % self.sketches.len();
        self.clear_buffers();
    }

    pub fn select(&mut self, index: usize) {
        if index < self.sketches.len() && index != self.active {
            self.active = index;
            self.clear_buffers();
        }
    }

    pub fn reset_active(&mut self) {
        self.sketches[self.active].reset();
        self.clear_buffers();
    }

    fn clear_buffers(&mut self) {
        self.front.fill(0);
        self.back.fill(0);
    }

    /// Render the active sketch into the back buffer (previous frame visible
    /// as `prev`), swap, and expose the result.
    pub fn render(&mut self, ctx: &SketchCtx) -> &[u8] {
        debug_assert_eq!(ctx.w, self.w);
        debug_assert_eq!(ctx.h, self.h);
        self.sketches[self.active].render(ctx, &self.front, &mut self.back);
        std::mem::swap(&mut self.front, &mut self.back);
        &self.front
    }
}

/// Resolve a `--sketch` query by case-insensitive substring match.
pub fn select_sketch(query: Option<&str>, names: &[&str]) -> Option<usize> {
    let query = query?.trim().to_ascii_lowercase();
    if query.is_empty() {
        return None;
    }
    names
        .iter()
        .position(|n| n.to_ascii_lowercase().contains(&query))
}
