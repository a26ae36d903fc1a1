use crate::config::TrackingSource;
use crate::landmark::{self, Hand, INDEX_TIP, LandmarkFrame};
use anyhow::{Context, anyhow};
use ringbuf::HeapRb;
use ringbuf::traits::{Consumer as _, Producer as _, Split as _};
use std::fs;
use std::io::{self, BufRead};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Lerp factor for the fingertip smoother; the sketches were tuned for it.
const POINTER_SMOOTHING: f32 = 0.25;

/// A pinch spanning half of the normalized frame reads as fully open.
const PINCH_REFERENCE: f32 = 0.5;

/// Per-frame scalar view of the latest landmark frame.
///
/// Everything a sketch can react to, already smoothed and normalized; sketches
/// never see raw landmark clouds except through the face box/yaw digest here.
#[derive(Debug, Clone, Copy)]
pub struct TrackingFeatures {
    /// Smoothed primary index fingertip, normalized, mirror already applied.
    pub pointer: [f32; 2],
    /// Unsmoothed fingertip of the same hand.
    pub pointer_raw: [f32; 2],
    pub hand_count: u32,
    /// Primary-hand thumb/index pinch, 0 closed .. 1 fully open.
    pub pinch: f32,
    /// Secondary-hand pinch; only meaningful when `hand_count >= 2`.
    pub pinch_secondary: f32,
    /// Thumb tip above index tip on any hand (with hysteresis).
    pub thumb_above: bool,
    pub face_present: bool,
    /// Head yaw in -1..1, tanh-squashed.
    pub face_yaw: f32,
    /// Face bounding box `[min_x, min_y, max_x, max_y]`, normalized.
    pub face_box: [f32; 4],
}

impl Default for TrackingFeatures {
    fn default() -> Self {
        Self {
            pointer: [0.5, 0.5],
            pointer_raw: [0.5, 0.5],
            hand_count: 0,
            pinch: 0.5,
            pinch_secondary: 0.5,
            thumb_above: false,
            face_present: false,
            face_yaw: 0.0,
            face_box: [0.0; 4],
        }
    }
}

/// Seqlock-style cell: the analyzer thread writes, the draw loop reads.
/// An odd sequence number means a write is in progress.
pub struct AtomicTrackingFeatures {
    seq: AtomicU64,
    pointer: [AtomicU32; 2],
    pointer_raw: [AtomicU32; 2],
    hand_count: AtomicU32,
    pinch: AtomicU32,
    pinch_secondary: AtomicU32,
    thumb_above: AtomicU32,
    face_present: AtomicU32,
    face_yaw: AtomicU32,
    face_box: [AtomicU32; 4],
    updated_ms: AtomicU64,
}

impl AtomicTrackingFeatures {
    pub fn new() -> Self {
        Self {
            seq: AtomicU64::new(0),
            pointer: std::array::from_fn(|_| AtomicU32::new(0.5f32.to_bits())),
            pointer_raw: std::array::from_fn(|_| AtomicU32::new(0.5f32.to_bits())),
            hand_count: AtomicU32::new(0),
            pinch: AtomicU32::new(0.5f32.to_bits()),
            pinch_secondary: AtomicU32::new(0.5f32.to_bits()),
            thumb_above: AtomicU32::new(0),
            face_present: AtomicU32::new(0),
            face_yaw: AtomicU32::new(0),
            face_box: std::array::from_fn(|_| AtomicU32::new(0)),
            updated_ms: AtomicU64::new(0),
        }
    }

    pub fn store(&self, f: TrackingFeatures) {
        self.seq.fetch_add(1, Ordering::Release); // odd => write in progress
        for (dst, src) in self.pointer.iter().zip(f.pointer) {
            dst.store(src.to_bits(), Ordering::Relaxed);
        }
        for (dst, src) in self.pointer_raw.iter().zip(f.pointer_raw) {
            dst.store(src.to_bits(), Ordering::Relaxed);
        }
        self.hand_count.store(f.hand_count, Ordering::Relaxed);
        self.pinch.store(f.pinch.to_bits(), Ordering::Relaxed);
        self.pinch_secondary
            .store(f.pinch_secondary.to_bits(), Ordering::Relaxed);
        self.thumb_above
            .store(if f.thumb_above { 1 } else { 0 }, Ordering::Relaxed);
        self.face_present
            .store(if f.face_present { 1 } else { 0 }, Ordering::Relaxed);
        self.face_yaw.store(f.face_yaw.to_bits(), Ordering::Relaxed);
        for (dst, src) in self.face_box.iter().zip(f.face_box) {
            dst.store(src.to_bits(), Ordering::Relaxed);
        }
        self.updated_ms.store(now_ms(), Ordering::Relaxed);
        self.seq.fetch_add(1, Ordering::Release); // even => stable
    }

    pub fn load(&self) -> TrackingFeatures {
        loop {
            let v1 = self.seq.load(Ordering::Acquire);
            if v1 & 1 == 1 {
                continue;
            }

            let f = TrackingFeatures {
                pointer: std::array::from_fn(|i| {
                    f32::from_bits(self.pointer[i].load(Ordering::Relaxed))
                }),
                pointer_raw: std::array::from_fn(|i| {
                    f32::from_bits(self.pointer_raw[i].load(Ordering::Relaxed))
                }),
                hand_count: self.hand_count.load(Ordering::Relaxed),
                pinch: f32::from_bits(self.pinch.load(Ordering::Relaxed)),
                pinch_secondary: f32::from_bits(self.pinch_secondary.load(Ordering::Relaxed)),
                thumb_above: self.thumb_above.load(Ordering::Relaxed) != 0,
                face_present: self.face_present.load(Ordering::Relaxed) != 0,
                face_yaw: f32::from_bits(self.face_yaw.load(Ordering::Relaxed)),
                face_box: std::array::from_fn(|i| {
                    f32::from_bits(self.face_box[i].load(Ordering::Relaxed))
                }),
            };

            let v2 = self.seq.load(Ordering::Acquire);
            if v1 == v2 {
                return f;
            }
        }
    }

    /// Milliseconds since the last store; 0 until the first store lands.
    pub fn age_ms(&self) -> f32 {
        let t = self.updated_ms.load(Ordering::Relaxed);
        if t == 0 {
            return f32::INFINITY;
        }
        now_ms().saturating_sub(t) as f32
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_millis(0))
        .as_millis() as u64
}

/// Owns the capture + analysis threads for one tracking source.
pub struct TrackingSystem {
    stop: Arc<AtomicBool>,
    analyzer_handle: Option<thread::JoinHandle<()>>,
    features: Arc<AtomicTrackingFeatures>,
}

impl TrackingSystem {
    pub fn new(
        source: TrackingSource,
        script: Option<&str>,
        script_loop: bool,
        mirror: bool,
    ) -> anyhow::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let features = Arc::new(AtomicTrackingFeatures::new());

        if source == TrackingSource::Off {
            return Ok(Self {
                stop,
                analyzer_handle: None,
                features,
            });
        }

        let rb = HeapRb::<LandmarkFrame>::new(256);
        let (mut prod, mut cons) = rb.split();

        let stop_capture = Arc::clone(&stop);
        match source {
            TrackingSource::Synthetic => {
                thread::spawn(move || {
                    let mut t_ms = 0u64;
                    while !stop_capture.load(Ordering::Relaxed) {
                        let _ = prod.try_push(synthetic_frame(t_ms));
                        t_ms += 16;
                        thread::sleep(Duration::from_millis(16));
                    }
                });
            }
            TrackingSource::Script => {
                let path = script
                    .ok_or_else(|| anyhow!("--source script requires --script <file>"))?
                    .to_string();
                let text = fs::read_to_string(&path)
                    .with_context(|| format!("read tracking script {path}"))?;
                let frames = parse_script(&text)
                    .with_context(|| format!("parse tracking script {path}"))?;
                if frames.is_empty() {
                    return Err(anyhow!("tracking script {path} contains no frames"));
                }
                thread::spawn(move || {
                    replay_script(&frames, script_loop, &stop_capture, |frame| {
                        let _ = prod.try_push(frame);
                    });
                });
            }
            TrackingSource::Stdin => {
                // Blocks on stdin; intentionally not joined on shutdown.
                thread::spawn(move || {
                    let stdin = io::stdin();
                    for line in stdin.lock().lines() {
                        if stop_capture.load(Ordering::Relaxed) {
                            break;
                        }
                        let Ok(line) = line else { break };
                        if line.trim().is_empty() {
                            continue;
                        }
                        match landmark::parse_frame(&line) {
                            Ok(frame) => {
                                let _ = prod.try_push(frame);
                            }
                            Err(err) => eprintln!("tracking frame parse error: {err}"),
                        }
                    }
                });
            }
            TrackingSource::Off => unreachable!(),
        }

        let stop_analyzer = Arc::clone(&stop);
        let features_for_thread = Arc::clone(&features);
        let analyzer_handle = thread::spawn(move || {
            let mut analyzer = FrameAnalyzer::new(mirror);
            while !stop_analyzer.load(Ordering::Relaxed) {
                let mut latest = None;
                while let Some(frame) = cons.try_pop() {
                    latest = Some(frame);
                }
                if let Some(frame) = latest {
                    features_for_thread.store(analyzer.analyze(&frame));
                }
                thread::sleep(Duration::from_millis(4));
            }
        });

        Ok(Self {
            stop,
            analyzer_handle: Some(analyzer_handle),
            features,
        })
    }

    pub fn features(&self) -> Arc<AtomicTrackingFeatures> {
        Arc::clone(&self.features)
    }
}

impl Drop for TrackingSystem {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.analyzer_handle.take() {
            let _ = handle.join();
        }
    }
}

fn parse_script(text: &str) -> anyhow::Result<Vec<LandmarkFrame>> {
    let mut frames = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let frame =
            landmark::parse_frame(line).with_context(|| format!("line {}", idx + 1))?;
        frames.push(frame);
    }
    Ok(frames)
}

fn replay_script(
    frames: &[LandmarkFrame],
    script_loop: bool,
    stop: &AtomicBool,
    mut push: impl FnMut(LandmarkFrame),
) {
    let mut epoch = 0u64;
    let span = frames.last().map(|f| f.t_ms + 16).unwrap_or(16);
    loop {
        let mut prev_ms = frames[0].t_ms;
        for frame in frames {
            if stop.load(Ordering::Relaxed) {
                return;
            }
            let gap = frame.t_ms.saturating_sub(prev_ms);
            prev_ms = frame.t_ms;
            if gap > 0 {
                thread::sleep(Duration::from_millis(gap.min(250)));
            }
            let mut shifted = frame.clone();
            shifted.t_ms += epoch;
            push(shifted);
        }
        if !script_loop {
            return;
        }
        epoch += span;
    }
}

/// Turns raw frames into `TrackingFeatures`; the only smoothing state in the
/// pipeline lives here, not in any sketch.
pub struct FrameAnalyzer {
    mirror: bool,
    smooth: Option<[f32; 2]>,
}

impl FrameAnalyzer {
    pub fn new(mirror: bool) -> Self {
        Self {
            mirror,
            smooth: None,
        }
    }

    pub fn analyze(&mut self, frame: &LandmarkFrame) -> TrackingFeatures {
        let mut f = TrackingFeatures {
            hand_count: frame.hands.len() as u32,
            ..TrackingFeatures::default()
        };

        if let Some(primary) = frame.hands.first() {
            if let Some(tip) = primary.point(INDEX_TIP) {
                let raw = [self.mirror_x(tip[0]), tip[1]];
                let smoothed = match self.smooth {
                    Some(prev) => [
                        lerp(prev[0], raw[0], POINTER_SMOOTHING),
                        lerp(prev[1], raw[1], POINTER_SMOOTHING),
                    ],
                    None => raw,
                };
                self.smooth = Some(smoothed);
                f.pointer_raw = raw;
                f.pointer = smoothed;
            }
            f.pinch = pinch01(primary).unwrap_or(0.5);
        }

        if let Some(secondary) = frame.hands.get(1) {
            f.pinch_secondary = pinch01(secondary).unwrap_or(0.5);
        }

        f.thumb_above = frame
            .hands
            .iter()
            .any(|h| h.thumb_above_index() == Some(true));

        if let Some(face) = &frame.face {
            if let Some(bb) = face.bounding_box() {
                f.face_present = true;
                f.face_yaw = face.yaw_normalized();
                f.face_box = if self.mirror {
                    [1.0 - bb[2], bb[1], 1.0 - bb[0], bb[3]]
                } else {
                    bb
                };
                if self.mirror {
                    f.face_yaw = -f.face_yaw;
                }
            }
        }

        f
    }

    fn mirror_x(&self, x: f32) -> f32 {
        if self.mirror { 1.0 - x } else { x }
    }
}

fn pinch01(hand: &Hand) -> Option<f32> {
    hand.pinch_distance()
        .map(|d| (d / PINCH_REFERENCE).clamp(0.0, 1.0))
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Deterministic gesture generator: one hand drifting on a Lissajous path
/// with a slowly breathing pinch, a second hand phasing in and out, a face
/// turning left and right, and a periodic full dropout so consumers exercise
/// their fallback paths.
pub fn synthetic_frame(t_ms: u64) -> LandmarkFrame {
    let t = t_ms as f32 / 1000.0;

    // 1.5s of total dropout every 20s.
    let cycle = t % 20.0;
    if cycle > 18.5 {
        return LandmarkFrame {
            t_ms,
            hands: Vec::new(),
            face: None,
        };
    }

    let mut hands = Vec::new();

    let cx = 0.5 + 0.30 * (t * 0.43).sin();
    let cy = 0.5 + 0.26 * (t * 0.31 + 1.2).cos();
    let spread = 0.05 + 0.17 * (0.5 + 0.5 * (t * 0.7).sin());
    // Thumb dips below the index most of the time, flicking above in bursts.
    let thumb_dy = if (t * 0.21).sin() > 0.82 { -0.06 } else { 0.05 };
    hands.push(synthetic_hand(cx, cy, spread, thumb_dy));

    if (t * 0.13).sin() > 0.2 {
        let spread_b = 0.04 + 0.20 * (0.5 + 0.5 * (t * 0.52 + 0.8).cos());
        hands.push(synthetic_hand(
            0.5 - (cx - 0.5),
            0.55 + 0.2 * (t * 0.27).sin(),
            spread_b,
            0.05,
        ));
    }

    let face = Some(synthetic_face(
        0.5 + 0.08 * (t * 0.12).sin(),
        0.38,
        0.35 * (t * 0.23).sin(),
    ));

    LandmarkFrame { t_ms, hands, face }
}

fn synthetic_hand(cx: f32, cy: f32, spread: f32, thumb_dy: f32) -> Hand {
    let mut points = vec![[cx, cy + 0.08, 0.0]; 21];
    points[INDEX_TIP] = [cx + spread * 0.5, cy, -0.02];
    points[crate::landmark::THUMB_TIP] = [cx - spread * 0.5, cy + thumb_dy, -0.02];
    Hand { points }
}

fn synthetic_face(cx: f32, cy: f32, yaw: f32) -> crate::landmark::Face {
    // A flat elliptical cloud rotated by `yaw` in the x/z plane.
    let (sin, cos) = yaw.sin_cos();
    let points = (0..48)
        .map(|i| {
            let a = i as f32 / 48.0 * std::f32::consts::TAU;
            let ex = 0.09 * a.cos();
            let ey = 0.12 * a.sin();
            [cx + ex * cos, cy + ey, ex * sin]
        })
        .collect();
    crate::landmark::Face { points }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seqlock_roundtrip() {
        let cell = AtomicTrackingFeatures::new();
        let mut f = TrackingFeatures::default();
        f.pointer = [0.25, 0.75];
        f.hand_count = 2;
        f.pinch = 0.9;
        f.thumb_above = true;
        f.face_yaw = -0.4;
        cell.store(f);
        let back = cell.load();
        assert_eq!(back.pointer, [0.25, 0.75]);
        assert_eq!(back.hand_count, 2);
        assert!(back.thumb_above);
        assert!((back.face_yaw + 0.4).abs() < 1e-6);
        assert!(cell.age_ms().is_finite());
    }

    #[test]
    fn analyzer_smooths_pointer() {
        let mut analyzer = FrameAnalyzer::new(false);
        let first = analyzer.analyze(&synthetic_frame(0));
        // First sample snaps, no history yet.
        assert_eq!(first.pointer, first.pointer_raw);

        let mut jump = synthetic_frame(0);
        jump.hands[0].points[INDEX_TIP] = [0.9, 0.9, 0.0];
        let second = analyzer.analyze(&jump);
        // Smoothed pointer lags the raw jump by the lerp factor.
        assert!(second.pointer[0] < second.pointer_raw[0]);
        let expected = first.pointer[0] + (0.9 - first.pointer[0]) * POINTER_SMOOTHING;
        assert!((second.pointer[0] - expected).abs() < 1e-5);
    }

    #[test]
    fn mirror_flips_x_only() {
        let mut plain = FrameAnalyzer::new(false);
        let mut mirrored = FrameAnalyzer::new(true);
        let frame = synthetic_frame(500);
        let a = plain.analyze(&frame);
        let b = mirrored.analyze(&frame);
        assert!((a.pointer_raw[0] + b.pointer_raw[0] - 1.0).abs() < 1e-5);
        assert!((a.pointer_raw[1] - b.pointer_raw[1]).abs() < 1e-6);
    }

    #[test]
    fn synthetic_stream_covers_dropout() {
        let frame = synthetic_frame(19_000);
        assert!(frame.hands.is_empty());
        assert!(frame.face.is_none());

        let frame = synthetic_frame(2_000);
        assert!(!frame.hands.is_empty());
        assert!(frame.face.is_some());
    }
}
