//! Deterministic hash and value noise shared by the sketches.
//!
//! Every call is a pure function of its inputs; sketches keep their seeds in
//! their own state so a frame at time `t` is reproducible.

/// Integer lattice hash onto 0..1.
pub fn hash01(x: i32, y: i32, seed: u32) -> f32 {
    let mut n = (x as u32).wrapping_mul(374_761_393)
        ^ (y as u32).wrapping_mul(668_265_263)
        ^ seed.wrapping_mul(0x9E37_79B9);
    n = (n ^ (n >> 13)).wrapping_mul(1_274_126_177);
    n = n ^ (n >> 16);
    ((n & 0x00FF_FFFF) as f32) / 16_777_215.0
}

/// Smooth 2D value noise in 0..1: lattice hashes blended with smoothstep.
pub fn value_noise(x: f32, y: f32, seed: u32) -> f32 {
    let xf = x.floor();
    let yf = y.floor();
    let xi = xf as i32;
    let yi = yf as i32;
    let fx = smoothstep(x - xf);
    let fy = smoothstep(y - yf);

    let a = hash01(xi, yi, seed);
    let b = hash01(xi.wrapping_add(1), yi, seed);
    let c = hash01(xi, yi.wrapping_add(1), seed);
    let d = hash01(xi.wrapping_add(1), yi.wrapping_add(1), seed);

    let top = a + (b - a) * fx;
    let bot = c + (d - c) * fx;
    top + (bot - top) * fy
}

fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_is_deterministic_and_bounded() {
        for i in 0..200 {
            let x = i as f32 * 0.173;
            let y = i as f32 * 0.061;
            let v = value_noise(x, y, 7);
            assert!((0.0..=1.0).contains(&v), "out of range: {v}");
            assert_eq!(v, value_noise(x, y, 7));
        }
    }

    #[test]
    fn seeds_decorrelate() {
        let same = (0..64)
            .filter(|i| {
                let x = *i as f32 * 0.31;
                (value_noise(x, 0.4, 1) - value_noise(x, 0.4, 2)).abs() < 1e-3
            })
            .count();
        assert!(same < 8, "seeds look correlated ({same} near-equal samples)");
    }
}
