use tui_sketchbook::sketch::{Surface, WaveField};

/// Captures issued primitives instead of rasterizing them, so tests can see
/// exactly what a draw call produced.
#[derive(Default)]
struct RecordingSurface {
    stroke: [u8; 4],
    weight: f32,
    /// (vertices, stroke, weight) per polyline.
    polylines: Vec<(Vec<[f32; 2]>, [u8; 4], f32)>,
    segments: Vec<([f32; 2], [f32; 2])>,
}

impl Surface for RecordingSurface {
    fn set_stroke(&mut self, color: [u8; 4]) {
        self.stroke = color;
    }

    fn set_stroke_weight(&mut self, weight: f32) {
        self.weight = weight;
    }

    fn polyline(&mut self, points: &[[f32; 2]]) {
        self.polylines
            .push((points.to_vec(), self.stroke, self.weight));
    }

    fn segment(&mut self, a: [f32; 2], b: [f32; 2]) {
        self.segments.push((a, b));
    }
}

#[test]
fn core_displacement_is_bounded_and_deterministic() {
    let field = WaveField::new(4, 32, 1.2, 99);
    for line in field.lines() {
        for i in 0..=100 {
            let nx = i as f32 / 100.0;
            for t in [0.0f32, 0.37, 2.9, 17.5, 1000.0] {
                let v = line.core_displacement(nx, t, 1.2);
                assert!(
                    (-1.3001..=1.3001).contains(&v),
                    "displacement out of range: {v} at nx={nx} t={t}"
                );
                assert_eq!(v, line.core_displacement(nx, t, 1.2));
            }
        }
    }
}

#[test]
fn baselines_are_symmetric_and_spaced_22() {
    for n in [1usize, 2, 3, 8, 13] {
        let field = WaveField::new(n, 16, 1.0, 5);
        let baselines = field.line_baselines(300.0);
        assert_eq!(baselines.len(), n);

        for pair in baselines.windows(2) {
            assert!((pair[1] - pair[0] - 22.0).abs() < 1e-4, "spacing != 22: {pair:?}");
        }
        let mean = baselines.iter().sum::<f32>() / n as f32;
        assert!((mean - 300.0).abs() < 1e-3, "not centered: mean={mean}");
        // Symmetry: first and last sit equally far from the center.
        let lo = 300.0 - baselines[0];
        let hi = baselines[n - 1] - 300.0;
        assert!((lo - hi).abs() < 1e-3);
    }
}

#[test]
fn rebuild_controls_polyline_count_and_vertex_count() {
    let mut field = WaveField::new(2, 10, 1.0, 1);
    field.rebuild(6, Some(24));
    assert_eq!(field.line_count(), 6);
    assert_eq!(field.resolution(), 24);

    let mut surface = RecordingSurface::default();
    field.draw(&mut surface, 320.0, 150.0, 40.0, 1.7, [200, 40, 90, 200], 1.5);
    assert_eq!(surface.polylines.len(), 6);
    for (points, _, _) in &surface.polylines {
        assert_eq!(points.len(), 25);
    }

    // Omitting the resolution keeps the previous one.
    field.rebuild(3, None);
    assert_eq!(field.resolution(), 24);
    let mut surface = RecordingSurface::default();
    field.draw(&mut surface, 320.0, 150.0, 40.0, 1.7, [200, 40, 90, 200], 1.5);
    assert_eq!(surface.polylines.len(), 3);
}

#[test]
fn identical_time_gives_identical_vertices() {
    let field = WaveField::new(5, 40, 1.2, 77);
    let mut a = RecordingSurface::default();
    let mut b = RecordingSurface::default();
    field.draw(&mut a, 640.0, 200.0, 55.0, 3.21, [10, 120, 200, 160], 2.0);
    field.draw(&mut b, 640.0, 200.0, 55.0, 3.21, [10, 120, 200, 160], 2.0);
    assert_eq!(a.polylines.len(), b.polylines.len());
    for (pa, pb) in a.polylines.iter().zip(&b.polylines) {
        assert_eq!(pa.0, pb.0);
    }
    assert_eq!(a.segments, b.segments);
}

#[test]
fn same_seed_rebuilds_identically() {
    let mut field = WaveField::new(4, 30, 1.0, 1234);
    let mut before = RecordingSurface::default();
    field.draw(&mut before, 400.0, 120.0, 30.0, 0.5, [255, 255, 255, 255], 1.0);

    field.rebuild(4, Some(30));
    let mut after = RecordingSurface::default();
    field.draw(&mut after, 400.0, 120.0, 30.0, 0.5, [255, 255, 255, 255], 1.0);

    for (pa, pb) in before.polylines.iter().zip(&after.polylines) {
        assert_eq!(pa.0, pb.0, "rebuild with same seed changed geometry");
    }
}

#[test]
fn three_line_scenario_matches_expected_shape() {
    let field = WaveField::new(3, 10, 1.0, 42);

    assert_eq!(field.line_baselines(100.0), vec![78.0, 100.0, 122.0]);

    let mut surface = RecordingSurface::default();
    field.draw(&mut surface, 220.0, 100.0, 50.0, 0.0, [10, 120, 200, 160], 2.0);

    assert_eq!(surface.polylines.len(), 3);
    for (points, stroke, weight) in &surface.polylines {
        assert_eq!(points.len(), 11);
        assert_eq!(*stroke, [10, 120, 200, 160]);
        assert!((*weight - 2.0).abs() < 1e-6);
        // Vertices span the full width in order.
        assert!((points[0][0] - 0.0).abs() < 1e-4);
        assert!((points[10][0] - 220.0).abs() < 1e-4);
        for pair in points.windows(2) {
            assert!(pair[1][0] > pair[0][0]);
        }
    }

    // The decorative tick fragments are a separate, sparser pass.
    assert!(!surface.segments.is_empty());
}

#[test]
fn thickness_change_leaves_vertices_unchanged() {
    let field = WaveField::new(3, 24, 1.2, 9);
    let mut thin = RecordingSurface::default();
    let mut thick = RecordingSurface::default();
    field.draw(&mut thin, 500.0, 140.0, 45.0, 2.75, [10, 120, 200, 160], 1.0);
    field.draw(&mut thick, 500.0, 140.0, 45.0, 2.75, [10, 120, 200, 160], 5.0);

    for (pa, pb) in thin.polylines.iter().zip(&thick.polylines) {
        assert_eq!(pa.0, pb.0, "thickness changed vertex positions");
        assert!((pa.2 - 1.0).abs() < 1e-6);
        assert!((pb.2 - 5.0).abs() < 1e-6);
    }
    // Tick fragments keep their geometry too.
    assert_eq!(thin.segments, thick.segments);
}

#[test]
fn tick_fragment_budget_follows_resolution() {
    for res in [10usize, 36, 80, 120] {
        let field = WaveField::new(1, res, 1.0, 3);
        let mut surface = RecordingSurface::default();
        field.draw(&mut surface, 300.0, 80.0, 20.0, 1.0, [255, 255, 255, 255], 1.0);

        let step = (res / 18).max(2);
        let expected = res / step + 1;
        assert_eq!(
            surface.segments.len(),
            expected,
            "unexpected fragment count at resolution {res}"
        );
    }
}
