//! Node activation: sparks, starburst pop, glow bloom, slow spin and core flash.

use std::f64::consts::TAU;

use super::scene::Scene;
use super::signal::{Completion, signal};
use super::sparks::spawn_sparks;
use super::tween::{Ease, NodeProp, Target, Tween};
use crate::config::ActivationWait;

const ACTIVATION_SPARKS: usize = 6;
/// Core alpha once the flash settles.
const CORE_REST_ALPHA: f64 = 0.8;

/// Play the activation sequence on node `index`.
///
/// With [`ActivationWait::CoreFlash`] the returned completion fires when the
/// core flash peaks (0.15 s) even though the starburst, glow and 20 s rotation
/// keep animating. With [`ActivationWait::AllTweens`] it fires after the last
/// of them. An out-of-range index resolves immediately.
pub fn activate_node(scene: &mut Scene, index: usize) -> Completion {
    let Some(node) = scene.nodes.get_mut(index) else {
        log::warn!("activate_node: no node {}", index);
        return Completion::ready();
    };
    node.activated = true;
    let pos = node.pos;
    let wait_all = scene.config.activation_wait == ActivationWait::AllTweens;
    let active_alpha = scene.config.node_active_alpha;

    spawn_sparks(scene, pos, ACTIVATION_SPARKS);

    let at = |prop| Target::Node(index, prop);
    let (flash_done, flash) = signal();
    let mut waits = vec![flash];
    let mut track = |tween: Tween| {
        if !wait_all {
            return tween;
        }
        let (sig, done) = signal();
        waits.push(done);
        tween.on_complete(sig)
    };
    let tweens = [
        track(Tween::to(at(NodeProp::StarAlpha), 1.0, 0.16)),
        track(Tween::to(at(NodeProp::StarScale), 1.6, 0.2)),
        track(Tween::to(at(NodeProp::StarScale), 0.4, 0.35).delay(0.2)),
        track(Tween::to(at(NodeProp::GlowAlpha), 0.75, 0.22)),
        track(Tween::to(at(NodeProp::GlowScale), 1.8, 0.3)),
        track(Tween::to(at(NodeProp::StarRotation), TAU, 20.0).ease(Ease::Power2Out)),
        Tween::to(at(NodeProp::CoreAlpha), active_alpha, 0.15)
            .on_complete(flash_done)
            .then(track(Tween::to(at(NodeProp::CoreAlpha), CORE_REST_ALPHA, 0.3))),
    ];
    for t in tweens {
        scene.tweens.push(t);
    }
    scene.stats.nodes_activated += 1;
    log::debug!("node {} activated at ({:.0},{:.0})", index, pos.x, pos.y);
    Completion::all(waits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkConfig;
    use futures::FutureExt;
    use glam::DVec2;

    fn scene(wait: ActivationWait) -> Scene {
        let cfg = NetworkConfig { seed: Some(8), activation_wait: wait, ..Default::default() };
        Scene::with_positions(cfg, 400.0, 400.0, &[DVec2::new(100.0, 100.0), DVec2::new(300.0, 300.0)])
    }

    /// Tick until `done` resolves; returns frames taken.
    fn frames_until(scene: &mut Scene, done: &mut Completion, limit: usize) -> Option<usize> {
        for frame in 0..limit {
            if let Some(res) = (&mut *done).now_or_never() {
                res.ok()?;
                return Some(frame);
            }
            scene.tick(1.0);
        }
        None
    }

    #[test]
    fn core_flash_resolves_before_secondary_tweens() {
        let mut s = scene(ActivationWait::CoreFlash);
        let mut done = activate_node(&mut s, 0);
        assert_eq!(s.sparks().len(), 6);
        let frames = frames_until(&mut s, &mut done, 120).expect("activation never resolved");
        // 0.15 s at 60 fps
        assert!((9..=10).contains(&frames), "resolved after {} frames", frames);
        let node = &s.nodes()[0];
        assert!(node.activated);
        assert_eq!(node.core_alpha, 1.0);
        // rotation still running
        assert!(s.tweens().targeting(Target::Node(0, NodeProp::StarRotation)) == 1);
        assert!(node.star_rotation < TAU);
    }

    #[test]
    fn all_tweens_waits_for_rotation() {
        let mut s = scene(ActivationWait::AllTweens);
        let mut done = activate_node(&mut s, 1);
        let frames = frames_until(&mut s, &mut done, 60 * 21).expect("activation never resolved");
        assert!(frames >= 60 * 20, "resolved after {} frames", frames);
        let node = &s.nodes()[1];
        assert!((node.star_rotation - TAU).abs() < 1e-9);
        assert!((node.star_scale - 0.4).abs() < 1e-9);
        assert!((node.glow_alpha - 0.75).abs() < 1e-9);
        assert!((node.core_alpha - CORE_REST_ALPHA).abs() < 1e-9);
        assert!(s.tweens().is_empty());
    }

    #[test]
    fn core_settles_after_flash() {
        let mut s = scene(ActivationWait::CoreFlash);
        let _done = activate_node(&mut s, 0);
        for _ in 0..60 {
            s.tick(1.0);
        }
        let node = &s.nodes()[0];
        assert!((node.core_alpha - CORE_REST_ALPHA).abs() < 1e-9);
        assert!((node.glow_scale - 1.8).abs() < 1e-9);
        assert!(!s.nodes()[1].activated);
    }

    #[test]
    fn out_of_range_node_resolves_immediately() {
        let mut s = scene(ActivationWait::CoreFlash);
        let done = activate_node(&mut s, 7);
        assert!(matches!(done.now_or_never(), Some(Ok(()))));
        assert!(s.tweens().is_empty());
        assert_eq!(s.stats().nodes_activated, 0);
    }
}
