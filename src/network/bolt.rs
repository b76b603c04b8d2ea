//! Electric arcs between two points.
//!
//! A bolt redraws a jittery polyline every frame while its normalized time
//! `t` runs from 0 to 1, then throws sparks at the destination, removes itself
//! and fires its completion.

use glam::DVec2;
use rand::Rng;

use super::scene::Scene;
use super::signal::{Completion, Signal, signal};
use super::sparks::spawn_sparks;

/// `t` gained per frame at speed 1 (~29 frames per bolt).
pub const BOLT_RATE: f64 = 0.035;
pub const BOLT_NOISE_AMPLITUDE: f64 = 10.0;
pub const BOLT_IMPACT_SPARKS: usize = 8;

#[derive(Debug)]
pub struct Bolt {
    pub from: DVec2,
    pub to: DVec2,
    pub t: f64,
    pub speed: f64,
    pub seed: f64,
    done: Signal,
}

impl Bolt {
    /// Current polyline, `segments + 1` points from `from` to `to`.
    pub fn points(&self, segments: usize) -> Vec<DVec2> {
        bolt_polyline(self.from, self.to, self.t, self.seed, segments)
    }
}

/// Noisy polyline between two endpoints. Displacement follows a triangular
/// envelope, so the first and last points are exactly `from` and `to`.
pub fn bolt_polyline(from: DVec2, to: DVec2, t: f64, seed: f64, segments: usize) -> Vec<DVec2> {
    let segments = segments.max(1);
    let mut pts = Vec::with_capacity(segments + 1);
    pts.push(from);
    for i in 1..segments {
        let p = i as f64 / segments as f64;
        let base = from.lerp(to, p);
        let envelope = 1.0 - (0.5 - p).abs() * 2.0;
        let n = ((p * 8.0 + t * 9.0 + seed) * 3.4).sin() * BOLT_NOISE_AMPLITUDE * envelope;
        pts.push(DVec2::new(base.x + n, base.y - n * 0.4));
    }
    pts.push(to);
    pts
}

/// Start a bolt from `from` to `to`. `speed` scales how fast it resolves.
pub fn fire_electric_bolt(scene: &mut Scene, from: DVec2, to: DVec2, speed: f64) -> Completion {
    let (done, completion) = signal();
    let seed = scene.rng.gen_range(0.0..1000.0);
    scene.bolts.push(Bolt { from, to, t: 0.0, speed, seed, done });
    scene.stats.bolts_fired += 1;
    log::trace!("bolt fired ({:.0},{:.0}) -> ({:.0},{:.0})", from.x, from.y, to.x, to.y);
    completion
}

/// Advance every bolt by `dt` frames; finished bolts spark, fire and vanish.
pub fn update_bolts(scene: &mut Scene, dt: f64) {
    let mut impacts = Vec::new();
    scene.bolts.retain_mut(|bolt| {
        bolt.t += dt * BOLT_RATE * bolt.speed;
        if bolt.t <= 1.0 {
            return true;
        }
        impacts.push(bolt.to);
        bolt.done.fire();
        false
    });
    for at in impacts {
        spawn_sparks(scene, at, BOLT_IMPACT_SPARKS);
    }
}
