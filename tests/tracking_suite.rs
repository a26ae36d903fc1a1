use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tui_sketchbook::config::TrackingSource;
use tui_sketchbook::landmark::{INDEX_TIP, THUMB_TIP, parse_frame};
use tui_sketchbook::tracking::{
    AtomicTrackingFeatures, FrameAnalyzer, TrackingFeatures, TrackingSystem, synthetic_frame,
};

#[test]
fn ndjson_frames_parse_with_defaults() {
    let doc = r#"
{"t_ms":0,"hands":[],"face":null}
{"t_ms":33,"hands":[{"points":[[0.5,0.5,0.0],[0.4,0.6,-0.01]]}]}
{"t_ms":66}
"#;
    let frames: Vec<_> = doc
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| parse_frame(l).expect("valid frame"))
        .collect();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[1].t_ms, 33);
    assert_eq!(frames[1].hands[0].points.len(), 2);
    assert!(frames[2].hands.is_empty() && frames[2].face.is_none());

    assert!(parse_frame("{not json").is_err());
}

#[test]
fn analyzer_features_stay_in_range_over_a_long_run() {
    let mut analyzer = FrameAnalyzer::new(true);
    let mut saw_two_hands = false;
    let mut saw_thumb_above = false;
    let mut saw_face_turn = false;

    for i in 0..3_000u64 {
        let f = analyzer.analyze(&synthetic_frame(i * 16));
        assert!((0.0..=1.0).contains(&f.pinch), "pinch {}", f.pinch);
        assert!((-1.0..=1.0).contains(&f.face_yaw));
        for v in f.pointer {
            assert!((-0.1..=1.1).contains(&v), "pointer {v}");
        }
        if f.face_present {
            assert!(f.face_box[0] <= f.face_box[2]);
            assert!(f.face_box[1] <= f.face_box[3]);
        }
        saw_two_hands |= f.hand_count >= 2;
        saw_thumb_above |= f.thumb_above;
        saw_face_turn |= f.face_yaw.abs() > 0.2;
    }

    assert!(saw_two_hands, "synthetic stream never produced two hands");
    assert!(saw_thumb_above, "synthetic stream never flicked the thumb");
    assert!(saw_face_turn, "synthetic stream never turned the face");
}

#[test]
fn analyzer_pinch_tracks_finger_spread() {
    let mut analyzer = FrameAnalyzer::new(false);

    let mut closed = synthetic_frame(0);
    closed.hands[0].points[THUMB_TIP] = [0.5, 0.5, 0.0];
    closed.hands[0].points[INDEX_TIP] = [0.5, 0.5, 0.0];
    assert!(analyzer.analyze(&closed).pinch < 1e-6);

    let mut open = synthetic_frame(0);
    open.hands[0].points[THUMB_TIP] = [0.1, 0.5, 0.0];
    open.hands[0].points[INDEX_TIP] = [0.9, 0.5, 0.0];
    // 0.8 of the frame apart: clamped fully open.
    assert!((analyzer.analyze(&open).pinch - 1.0).abs() < 1e-6);
}

#[test]
fn seqlock_snapshots_are_internally_consistent() {
    let cell = Arc::new(AtomicTrackingFeatures::new());
    let stop = Arc::new(AtomicBool::new(false));

    // Writer keeps every field equal to one ramping value; a torn read would
    // show mixed values.
    let writer = {
        let cell = Arc::clone(&cell);
        let stop = Arc::clone(&stop);
        std::thread::spawn(move || {
            let mut k = 0.0f32;
            while !stop.load(Ordering::Relaxed) {
                let f = TrackingFeatures {
                    pointer: [k, k],
                    pointer_raw: [k, k],
                    pinch: k,
                    pinch_secondary: k,
                    face_yaw: k,
                    face_box: [k, k, k, k],
                    ..TrackingFeatures::default()
                };
                cell.store(f);
                k += 0.001;
            }
        })
    };

    let deadline = Instant::now() + Duration::from_millis(200);
    let mut reads = 0u32;
    while Instant::now() < deadline {
        let f = cell.load();
        let k = f.pinch;
        assert_eq!(f.pointer, [k, k], "torn read");
        assert_eq!(f.pointer_raw, [k, k], "torn read");
        assert_eq!(f.face_box, [k, k, k, k], "torn read");
        assert_eq!(f.face_yaw, k, "torn read");
        reads += 1;
    }
    assert!(reads > 100);

    stop.store(true, Ordering::Relaxed);
    writer.join().expect("writer thread");
}

#[test]
fn off_source_publishes_nothing() {
    let system = TrackingSystem::new(TrackingSource::Off, None, false, true).expect("off source");
    let cell = system.features();
    assert!(cell.age_ms().is_infinite());
    let f = cell.load();
    assert_eq!(f.hand_count, 0);
    assert!(!f.face_present);
}

#[test]
fn script_source_replays_frames() {
    let dir = std::env::temp_dir().join(format!("sketchbook-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("tiny.ndjson");

    let mut script = String::from("# tiny fixture\n");
    for i in 0..8u64 {
        let x = 0.2 + i as f32 * 0.05;
        script.push_str(&format!(
            "{{\"t_ms\":{},\"hands\":[{{\"points\":[{}]}}],\"face\":null}}\n",
            i * 16,
            point_list(x)
        ));
    }
    std::fs::write(&path, script).expect("write script");

    let system = TrackingSystem::new(
        TrackingSource::Script,
        Some(path.to_str().expect("utf8 path")),
        true,
        false,
    )
    .expect("script source");
    let cell = system.features();

    let deadline = Instant::now() + Duration::from_secs(3);
    let mut got_hand = false;
    while Instant::now() < deadline {
        let f = cell.load();
        if cell.age_ms().is_finite() && f.hand_count == 1 {
            got_hand = true;
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    assert!(got_hand, "script replay never published a hand");

    drop(system);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_script_is_a_setup_error() {
    let err = TrackingSystem::new(TrackingSource::Script, None, false, false)
        .err()
        .expect("missing --script must fail");
    assert!(err.to_string().contains("--script"));

    assert!(
        TrackingSystem::new(
            TrackingSource::Script,
            Some("/nonexistent/path/frames.ndjson"),
            false,
            false
        )
        .is_err()
    );
}

fn point_list(x: f32) -> String {
    // 21 hand points with the index tip at (x, 0.5).
    let mut parts = Vec::new();
    for i in 0..21 {
        if i == INDEX_TIP {
            parts.push(format!("[{x},0.5,0.0]"));
        } else {
            parts.push("[0.5,0.6,0.0]".to_string());
        }
    }
    parts.join(",")
}
