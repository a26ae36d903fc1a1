//! Wire format and geometry helpers for landmark frames.
//!
//! The tracker itself (camera + ML model) is an external process; all we see
//! is its output: one JSON object per line, all coordinates normalized to
//! 0..1 with the origin at the top-left, z in model units (negative toward
//! the camera for MediaPipe-style hand/face meshes).

use serde::{Deserialize, Serialize};

/// Landmark index of the thumb tip in a 21-point hand.
pub const THUMB_TIP: usize = 4;
/// Landmark index of the index fingertip in a 21-point hand.
pub const INDEX_TIP: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandmarkFrame {
    /// Capture timestamp in milliseconds, monotonic per stream.
    pub t_ms: u64,
    #[serde(default)]
    pub hands: Vec<Hand>,
    #[serde(default)]
    pub face: Option<Face>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hand {
    /// 21 points, `[x, y, z]` each.
    pub points: Vec<[f32; 3]>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Face {
    pub points: Vec<[f32; 3]>,
}

impl Hand {
    pub fn point(&self, idx: usize) -> Option<[f32; 3]> {
        self.points.get(idx).copied()
    }

    /// Normalized thumb-tip to index-tip distance, or None when either
    /// landmark is missing.
    pub fn pinch_distance(&self) -> Option<f32> {
        let a = self.point(THUMB_TIP)?;
        let b = self.point(INDEX_TIP)?;
        let dx = a[0] - b[0];
        let dy = a[1] - b[1];
        Some((dx * dx + dy * dy).sqrt())
    }

    /// True when the thumb tip sits above the index tip (y grows downward).
    /// The 0.01 margin is hysteresis against jitter at the crossover.
    pub fn thumb_above_index(&self) -> Option<bool> {
        let thumb = self.point(THUMB_TIP)?;
        let index = self.point(INDEX_TIP)?;
        Some(thumb[1] < index[1] - 0.01)
    }
}

impl Face {
    /// Yaw of the head estimated from the landmark cloud alone.
    ///
    /// The x/z scatter of a frontal face is a wide, flat ellipse; turning the
    /// head rotates its principal axis. theta = 0.5 * atan2(2*cov, varX - varZ)
    /// is that axis angle, squashed with tanh into -1..1.
    pub fn yaw_normalized(&self) -> f32 {
        let n = self.points.len();
        if n == 0 {
            return 0.0;
        }
        let inv = 1.0 / n as f32;
        let (mut mean_x, mut mean_z) = (0.0f32, 0.0f32);
        for p in &self.points {
            mean_x += p[0];
            mean_z += p[2];
        }
        mean_x *= inv;
        mean_z *= inv;

        let (mut var_x, mut var_z, mut cov_xz) = (0.0f32, 0.0f32, 0.0f32);
        for p in &self.points {
            let dx = p[0] - mean_x;
            let dz = p[2] - mean_z;
            var_x += dx * dx;
            var_z += dz * dz;
            cov_xz += dx * dz;
        }
        var_x *= inv;
        var_z *= inv;
        cov_xz *= inv;

        let theta = 0.5 * (2.0 * cov_xz).atan2(var_x - var_z);
        (theta * 2.0).tanh()
    }

    /// Axis-aligned bounding box `[min_x, min_y, max_x, max_y]` in
    /// normalized coordinates, or None for an empty cloud.
    pub fn bounding_box(&self) -> Option<[f32; 4]> {
        let mut it = self.points.iter();
        let first = it.next()?;
        let mut bb = [first[0], first[1], first[0], first[1]];
        for p in it {
            bb[0] = bb[0].min(p[0]);
            bb[1] = bb[1].min(p[1]);
            bb[2] = bb[2].max(p[0]);
            bb[3] = bb[3].max(p[1]);
        }
        Some(bb)
    }
}

/// Parse one NDJSON line. Blank lines are skipped by the caller.
pub fn parse_frame(line: &str) -> anyhow::Result<LandmarkFrame> {
    Ok(serde_json::from_str(line)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand_with(thumb: [f32; 3], index: [f32; 3]) -> Hand {
        let mut points = vec![[0.5, 0.5, 0.0]; 21];
        points[THUMB_TIP] = thumb;
        points[INDEX_TIP] = index;
        Hand { points }
    }

    #[test]
    fn pinch_distance_is_euclidean() {
        let hand = hand_with([0.1, 0.2, 0.0], [0.4, 0.6, 0.0]);
        let d = hand.pinch_distance().unwrap();
        assert!((d - 0.5).abs() < 1e-6);
    }

    #[test]
    fn thumb_above_needs_margin() {
        let barely = hand_with([0.5, 0.495, 0.0], [0.5, 0.5, 0.0]);
        assert_eq!(barely.thumb_above_index(), Some(false));
        let clearly = hand_with([0.5, 0.40, 0.0], [0.5, 0.5, 0.0]);
        assert_eq!(clearly.thumb_above_index(), Some(true));
    }

    #[test]
    fn frontal_face_has_zero_yaw() {
        // Flat in z: the x/z covariance vanishes and varX > varZ.
        let points = (0..40)
            .map(|i| [i as f32 / 39.0, 0.5, 0.0])
            .collect::<Vec<_>>();
        let face = Face { points };
        assert!(face.yaw_normalized().abs() < 1e-6);
    }

    #[test]
    fn turned_face_yaw_sign_follows_rotation() {
        // Rotate a wide flat cloud by +/-0.3 rad in the x/z plane.
        for (angle, positive) in [(0.3f32, true), (-0.3f32, false)] {
            let points = (0..60)
                .map(|i| {
                    let x = i as f32 / 59.0 - 0.5;
                    [0.5 + x * angle.cos(), 0.5, x * angle.sin()]
                })
                .collect::<Vec<_>>();
            let yaw = Face { points }.yaw_normalized();
            assert!(yaw.abs() > 0.1, "yaw too weak: {yaw}");
            assert_eq!(yaw > 0.0, positive, "angle {angle} gave yaw {yaw}");
            assert!(yaw.abs() <= 1.0);
        }
    }

    #[test]
    fn frame_roundtrips_through_json() {
        let line = r#"{"t_ms":120,"hands":[{"points":[[0.1,0.2,0.0]]}],"face":null}"#;
        let frame = parse_frame(line).unwrap();
        assert_eq!(frame.t_ms, 120);
        assert_eq!(frame.hands.len(), 1);
        assert!(frame.face.is_none());

        let missing_fields = r#"{"t_ms":5}"#;
        let frame = parse_frame(missing_fields).unwrap();
        assert!(frame.hands.is_empty());
    }
}
