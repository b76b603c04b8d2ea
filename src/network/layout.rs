//! Node placement and the static connection graph.

use glam::DVec2;
use rand::Rng;

/// Unordered node pair, stored with `a < b`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Connection {
    pub a: usize,
    pub b: usize,
}

/// Uniform random positions inside `[0,width) x [0,height)`.
pub fn scatter_nodes<R: Rng + ?Sized>(rng: &mut R, count: usize, width: f64, height: f64) -> Vec<DVec2> {
    (0..count)
        .map(|_| DVec2::new(rng.gen_range(0.0..1.0) * width, rng.gen_range(0.0..1.0) * height))
        .collect()
}

/// Every pair strictly closer than `threshold`. Computed once at startup.
pub fn compute_connections(positions: &[DVec2], threshold: f64) -> Vec<Connection> {
    let mut out = Vec::new();
    for (i, a) in positions.iter().enumerate() {
        for (j, b) in positions.iter().enumerate().skip(i + 1) {
            if a.distance(*b) < threshold {
                out.push(Connection { a: i, b: j });
            }
        }
    }
    out
}

/// Background grid as line segments every `step` pixels (vertical lines first).
pub fn background_grid(width: f64, height: f64, step: f64) -> Vec<(DVec2, DVec2)> {
    let mut lines = Vec::new();
    if step <= 0.0 {
        return lines;
    }
    let mut x = 0.0;
    while x < width {
        lines.push((DVec2::new(x, 0.0), DVec2::new(x, height)));
        x += step;
    }
    let mut y = 0.0;
    while y < height {
        lines.push((DVec2::new(0.0, y), DVec2::new(width, y)));
        y += step;
    }
    lines
}
