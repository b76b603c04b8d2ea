//! Short-lived spark particles thrown off by activations and bolt impacts.

use glam::DVec2;
use rand::Rng;

use super::scene::Scene;

/// Opacity lost per 60 Hz frame.
const SPARK_FADE_PER_FRAME: f64 = 0.03;

#[derive(Clone, Debug)]
pub struct Spark {
    pub pos: DVec2,
    pub angle: f64,
    pub speed: f64,
    /// Remaining lifetime in frames.
    pub life: f64,
    pub alpha: f64,
    pub radius: f64,
}

impl Spark {
    pub fn random<R: Rng + ?Sized>(rng: &mut R, origin: DVec2) -> Self {
        Self {
            pos: origin,
            angle: rng.gen_range(0.0..std::f64::consts::TAU),
            speed: rng.gen_range(2.0..6.0),
            life: rng.gen_range(25.0..45.0),
            alpha: 1.0,
            radius: rng.gen_range(1.5..3.5),
        }
    }

    /// Advance by `dt` frames. Returns false once the spark should be removed.
    pub fn update(&mut self, dt: f64) -> bool {
        let dir = DVec2::new(self.angle.cos(), self.angle.sin());
        self.pos += dir * self.speed * dt;
        self.alpha = (self.alpha - SPARK_FADE_PER_FRAME * dt).max(0.0);
        self.life -= dt;
        self.is_alive()
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0 && self.alpha > 0.0
    }
}

/// Throw `count` sparks from `origin` into the scene's particle layer.
pub fn spawn_sparks(scene: &mut Scene, origin: DVec2, count: usize) {
    let Scene { rng, sparks, stats, .. } = scene;
    for _ in 0..count {
        sparks.push(Spark::random(rng, origin));
    }
    stats.sparks_spawned += count as u64;
}

/// Advance every spark and drop the expired ones.
pub fn update_sparks(sparks: &mut Vec<Spark>, dt: f64) {
    sparks.retain_mut(|s| s.update(dt));
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn random_spark_ranges() {
        let mut rng = SmallRng::seed_from_u64(5);
        for _ in 0..100 {
            let s = Spark::random(&mut rng, DVec2::new(10.0, 20.0));
            assert_eq!(s.pos, DVec2::new(10.0, 20.0));
            assert!((2.0..6.0).contains(&s.speed));
            assert!((25.0..45.0).contains(&s.life));
            assert!((1.5..3.5).contains(&s.radius));
            assert_eq!(s.alpha, 1.0);
        }
    }

    #[test]
    fn alpha_and_life_never_increase_and_spark_is_removed() {
        let mut rng = SmallRng::seed_from_u64(9);
        let mut sparks: Vec<Spark> = (0..20).map(|_| Spark::random(&mut rng, DVec2::ZERO)).collect();
        let mut frames = 0;
        while !sparks.is_empty() {
            let before: Vec<(f64, f64)> = sparks.iter().map(|s| (s.alpha, s.life)).collect();
            for (s, (a, l)) in sparks.iter_mut().zip(before) {
                s.update(1.0);
                assert!(s.alpha <= a);
                assert!(s.life <= l);
            }
            sparks.retain(Spark::is_alive);
            frames += 1;
            assert!(frames <= 45, "spark leaked past its lifetime");
        }
    }

    #[test]
    fn fade_removes_before_long_life_expires() {
        let mut s = Spark {
            pos: DVec2::ZERO,
            angle: 0.0,
            speed: 1.0,
            life: 1000.0,
            alpha: 1.0,
            radius: 2.0,
        };
        let mut frames = 0;
        while s.update(1.0) {
            frames += 1;
        }
        // 1.0 / 0.03 = 33.3 frames of fade
        assert_eq!(frames, 33);
        assert_eq!(s.alpha, 0.0);
        assert!(s.life > 0.0);
    }

    #[test]
    fn moves_along_its_angle() {
        let mut s = Spark {
            pos: DVec2::ZERO,
            angle: std::f64::consts::FRAC_PI_2,
            speed: 4.0,
            life: 10.0,
            alpha: 1.0,
            radius: 2.0,
        };
        s.update(0.5);
        assert!(s.pos.x.abs() < 1e-9);
        assert!((s.pos.y - 2.0).abs() < 1e-9);
    }
}
