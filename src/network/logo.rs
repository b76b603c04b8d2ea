//! Logo finale: the shock flicker and the crackling border around the text.

use glam::DVec2;

use super::scene::Scene;
use super::tween::{LogoProp, Target, Tween};

/// Border time gained per frame.
const BORDER_RATE: f64 = 0.08;
const BORDER_NOISE_AMPLITUDE: f64 = 6.0;

/// Per-frame redraw state of the border. Inert until started.
#[derive(Clone, Debug, Default)]
pub struct LogoBorder {
    started: bool,
    t: f64,
    path: Vec<DVec2>,
}

impl LogoBorder {
    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn time(&self) -> f64 {
        self.t
    }

    /// Path traced on the latest frame; empty before the first tick after start.
    pub fn path(&self) -> &[DVec2] {
        &self.path
    }
}

/// Rectangle outline from `origin` (top-left) clockwise: a leading point at the
/// origin followed by `steps` interpolated points, each displaced by
/// `sin(i*0.4 + t*3) * amplitude`.
pub fn border_path(origin: DVec2, size: DVec2, steps: usize, t: f64, amplitude: f64) -> Vec<DVec2> {
    let (x, y, w, h) = (origin.x, origin.y, size.x, size.y);
    let mut pts = Vec::with_capacity(steps + 1);
    pts.push(origin);
    for i in 1..=steps {
        let p = i as f64 / steps as f64;
        let (px, py) = if p < 0.25 {
            (x + p * 4.0 * w, y)
        } else if p < 0.5 {
            (x + w, y + (p - 0.25) * 4.0 * h)
        } else if p < 0.75 {
            (x + w - (p - 0.5) * 4.0 * w, y + h)
        } else {
            (x, y + h - (p - 0.75) * 4.0 * h)
        };
        let noise = (i as f64 * 0.4 + t * 3.0).sin() * amplitude;
        pts.push(DVec2::new(px + noise, py - noise));
    }
    pts
}

/// Begin redrawing the border every frame. Only the first call does anything;
/// returns whether this call started it.
pub fn start_logo_border(scene: &mut Scene) -> bool {
    if scene.border.started {
        log::debug!("logo border already running");
        return false;
    }
    scene.border.started = true;
    scene.stats.border_starts += 1;
    log::debug!("logo border started");
    true
}

pub(crate) fn update_border(scene: &mut Scene, dt: f64) {
    let Scene { border, logo, config, .. } = scene;
    if !border.started {
        return;
    }
    border.t += BORDER_RATE * dt;
    let size = logo.scaled_extent() + DVec2::splat(config.logo_padding);
    let origin = logo.center - size / 2.0;
    border.path = border_path(origin, size, config.border_steps, border.t, BORDER_NOISE_AMPLITUDE);
}

/// Flash the logo in: quick fade up, a rapid flicker, and a scale pop.
pub fn logo_shock(scene: &mut Scene) {
    let alpha = Target::Logo(LogoProp::Alpha);
    let scale = Target::Logo(LogoProp::Scale);
    scene.tweens.push(Tween::from_to(alpha, 0.0, 1.0, 0.12));
    scene.tweens.push(Tween::to(alpha, 0.55, 0.05).repeat(10).yoyo(true));
    scene.tweens.push(Tween::from_to(scale, 0.9, 1.2, 0.3));
    scene.stats.logo_shocks += 1;
}
