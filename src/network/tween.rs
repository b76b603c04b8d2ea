//! Minimal time-based property tweening for node layers and the logo.
//!
//! Durations and delays are in seconds. A tween created with `to` captures its
//! start value when its delay elapses; `from_to` forces the start value. Tweens
//! are applied in insertion order, so a later tween on the same property wins
//! for the frame.

use super::scene::{Logo, Node};
use super::signal::Signal;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeProp {
    CoreAlpha,
    StarAlpha,
    StarScale,
    StarRotation,
    GlowAlpha,
    GlowScale,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogoProp {
    Alpha,
    Scale,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Node(usize, NodeProp),
    Logo(LogoProp),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Ease {
    Linear,
    #[default]
    Power1Out,
    Power2Out,
}

impl Ease {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::Power1Out => 1.0 - (1.0 - t).powi(2),
            Ease::Power2Out => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// Mutable view of everything a tween can write to.
pub struct Stage<'a> {
    pub nodes: &'a mut [Node],
    pub logo: &'a mut Logo,
}

impl Stage<'_> {
    fn get(&self, target: Target) -> Option<f64> {
        match target {
            Target::Node(i, prop) => self.nodes.get(i).map(|n| match prop {
                NodeProp::CoreAlpha => n.core_alpha,
                NodeProp::StarAlpha => n.star_alpha,
                NodeProp::StarScale => n.star_scale,
                NodeProp::StarRotation => n.star_rotation,
                NodeProp::GlowAlpha => n.glow_alpha,
                NodeProp::GlowScale => n.glow_scale,
            }),
            Target::Logo(LogoProp::Alpha) => Some(self.logo.alpha),
            Target::Logo(LogoProp::Scale) => Some(self.logo.scale),
        }
    }

    fn set(&mut self, target: Target, value: f64) {
        match target {
            Target::Node(i, prop) => {
                if let Some(n) = self.nodes.get_mut(i) {
                    let slot = match prop {
                        NodeProp::CoreAlpha => &mut n.core_alpha,
                        NodeProp::StarAlpha => &mut n.star_alpha,
                        NodeProp::StarScale => &mut n.star_scale,
                        NodeProp::StarRotation => &mut n.star_rotation,
                        NodeProp::GlowAlpha => &mut n.glow_alpha,
                        NodeProp::GlowScale => &mut n.glow_scale,
                    };
                    *slot = value;
                }
            }
            Target::Logo(LogoProp::Alpha) => self.logo.alpha = value,
            Target::Logo(LogoProp::Scale) => self.logo.scale = value,
        }
    }
}

#[derive(Debug)]
pub struct Tween {
    target: Target,
    from: Option<f64>,
    to: f64,
    duration: f64,
    delay: f64,
    ease: Ease,
    repeat: u32,
    yoyo: bool,
    elapsed: f64,
    start: Option<f64>,
    on_complete: Option<Signal>,
    then: Option<Box<Tween>>,
}

impl Tween {
    pub fn to(target: Target, to: f64, duration: f64) -> Self {
        Self {
            target,
            from: None,
            to,
            duration,
            delay: 0.0,
            ease: Ease::default(),
            repeat: 0,
            yoyo: false,
            elapsed: 0.0,
            start: None,
            on_complete: None,
            then: None,
        }
    }

    pub fn from_to(target: Target, from: f64, to: f64, duration: f64) -> Self {
        Self { from: Some(from), ..Self::to(target, to, duration) }
    }

    pub fn delay(mut self, seconds: f64) -> Self {
        self.delay = seconds;
        self
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    /// Play `times` extra cycles after the first.
    pub fn repeat(mut self, times: u32) -> Self {
        self.repeat = times;
        self
    }

    pub fn yoyo(mut self, yoyo: bool) -> Self {
        self.yoyo = yoyo;
        self
    }

    pub fn on_complete(mut self, signal: Signal) -> Self {
        self.on_complete = Some(signal);
        self
    }

    /// Start `next` once this tween completes.
    pub fn then(mut self, next: Tween) -> Self {
        self.then = Some(Box::new(next));
        self
    }

    pub fn target(&self) -> Target {
        self.target
    }

    /// Total play time including delay and repeats.
    pub fn total_duration(&self) -> f64 {
        self.delay + self.duration.max(0.0) * f64::from(self.repeat + 1)
    }

    /// Advance by `dt` seconds and write the value. Returns true when done.
    fn advance(&mut self, dt: f64, stage: &mut Stage<'_>) -> bool {
        self.elapsed += dt;
        if self.elapsed < self.delay {
            return false;
        }
        let start = match self.start {
            Some(s) => s,
            None => {
                let s = self.from.or_else(|| stage.get(self.target)).unwrap_or(self.to);
                self.start = Some(s);
                s
            }
        };
        let local = self.elapsed - self.delay;
        let cycles = f64::from(self.repeat + 1);
        if self.duration <= 0.0 || local >= self.duration * cycles {
            let forward = !(self.yoyo && self.repeat % 2 == 1);
            stage.set(self.target, if forward { self.to } else { start });
            return true;
        }
        let cycle = (local / self.duration).floor();
        let frac = (local - cycle * self.duration) / self.duration;
        let backward = self.yoyo && (cycle as u64) % 2 == 1;
        let p = if backward { self.ease.apply(1.0 - frac) } else { self.ease.apply(frac) };
        stage.set(self.target, start + (self.to - start) * p);
        false
    }
}

/// Live tweens, advanced once per frame.
#[derive(Debug, Default)]
pub struct TweenSet {
    active: Vec<Tween>,
}

impl TweenSet {
    pub fn push(&mut self, tween: Tween) {
        self.active.push(tween);
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn targeting(&self, target: Target) -> usize {
        self.active.iter().filter(|t| t.target == target).count()
    }

    /// Advance all tweens; finished ones fire their signal and hand over to
    /// their chained follow-up, which starts on the next frame.
    pub fn advance(&mut self, dt: f64, stage: &mut Stage<'_>) {
        let mut chained = Vec::new();
        self.active.retain_mut(|tween| {
            if !tween.advance(dt, stage) {
                return true;
            }
            if let Some(sig) = tween.on_complete.as_mut() {
                sig.fire();
            }
            if let Some(next) = tween.then.take() {
                chained.push(*next);
            }
            false
        });
        self.active.extend(chained);
    }

    /// Drop every live tween; unfired completions resolve as interrupted.
    pub fn clear(&mut self) {
        self.active.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::signal::signal;
    use futures::FutureExt;
    use glam::DVec2;

    fn stage_parts() -> (Vec<Node>, Logo) {
        (vec![Node::new(DVec2::ZERO, 0xffffff, 4.0, 0.06)], Logo::new(DVec2::new(50.0, 50.0)))
    }

    fn run(set: &mut TweenSet, nodes: &mut [Node], logo: &mut Logo, seconds: f64, step: f64) {
        let mut t = 0.0;
        while t < seconds - 1e-9 {
            set.advance(step, &mut Stage { nodes: &mut *nodes, logo: &mut *logo });
            t += step;
        }
    }

    #[test]
    fn eases_hit_endpoints() {
        for e in [Ease::Linear, Ease::Power1Out, Ease::Power2Out] {
            assert_eq!(e.apply(0.0), 0.0);
            assert_eq!(e.apply(1.0), 1.0);
            assert!(e.apply(0.5) >= 0.5);
        }
    }

    #[test]
    fn to_tween_reaches_target_and_fires() {
        let (mut nodes, mut logo) = stage_parts();
        let (sig, done) = signal();
        let mut set = TweenSet::default();
        set.push(Tween::to(Target::Node(0, NodeProp::StarAlpha), 1.0, 0.16).on_complete(sig));
        run(&mut set, &mut nodes, &mut logo, 0.1, 0.05);
        assert!(nodes[0].star_alpha > 0.0 && nodes[0].star_alpha < 1.0);
        run(&mut set, &mut nodes, &mut logo, 0.1, 0.05);
        assert_eq!(nodes[0].star_alpha, 1.0);
        assert!(set.is_empty());
        assert!(matches!(done.now_or_never(), Some(Ok(()))));
    }

    #[test]
    fn delayed_tween_captures_start_when_it_begins() {
        let (mut nodes, mut logo) = stage_parts();
        let mut set = TweenSet::default();
        set.push(Tween::to(Target::Node(0, NodeProp::StarScale), 1.6, 0.2).ease(Ease::Linear));
        set.push(Tween::to(Target::Node(0, NodeProp::StarScale), 0.4, 0.35).delay(0.2).ease(Ease::Linear));
        run(&mut set, &mut nodes, &mut logo, 0.2, 0.05);
        assert!((nodes[0].star_scale - 1.6).abs() < 1e-9);
        run(&mut set, &mut nodes, &mut logo, 0.4, 0.05);
        assert!((nodes[0].star_scale - 0.4).abs() < 1e-9);
    }

    #[test]
    fn chained_tween_runs_after_first() {
        let (mut nodes, mut logo) = stage_parts();
        let mut set = TweenSet::default();
        set.push(
            Tween::to(Target::Node(0, NodeProp::CoreAlpha), 1.0, 0.15)
                .then(Tween::to(Target::Node(0, NodeProp::CoreAlpha), 0.8, 0.3)),
        );
        run(&mut set, &mut nodes, &mut logo, 0.15, 0.05);
        assert_eq!(nodes[0].core_alpha, 1.0);
        assert_eq!(set.len(), 1);
        run(&mut set, &mut nodes, &mut logo, 0.5, 0.05);
        assert!((nodes[0].core_alpha - 0.8).abs() < 1e-9);
        assert!(set.is_empty());
    }

    #[test]
    fn yoyo_with_even_repeat_ends_on_target() {
        let (mut nodes, mut logo) = stage_parts();
        logo.alpha = 1.0;
        let mut set = TweenSet::default();
        set.push(Tween::to(Target::Logo(LogoProp::Alpha), 0.55, 0.05).repeat(10).yoyo(true).ease(Ease::Linear));
        // one full forward cycle then half way back
        run(&mut set, &mut nodes, &mut logo, 0.075, 0.0125);
        assert!((logo.alpha - 0.775).abs() < 1e-6, "alpha {}", logo.alpha);
        run(&mut set, &mut nodes, &mut logo, 1.0, 0.0125);
        assert!((logo.alpha - 0.55).abs() < 1e-9);
        assert!(set.is_empty());
    }

    #[test]
    fn from_to_overrides_current_value() {
        let (mut nodes, mut logo) = stage_parts();
        logo.scale = 5.0;
        let mut set = TweenSet::default();
        set.push(Tween::from_to(Target::Logo(LogoProp::Scale), 0.9, 1.2, 0.3));
        set.advance(0.0, &mut Stage { nodes: &mut nodes, logo: &mut logo });
        assert!((logo.scale - 0.9).abs() < 1e-9);
    }

    #[test]
    fn missing_node_target_still_completes() {
        let (mut nodes, mut logo) = stage_parts();
        let (sig, done) = signal();
        let mut set = TweenSet::default();
        set.push(Tween::to(Target::Node(99, NodeProp::GlowAlpha), 1.0, 0.1).on_complete(sig));
        run(&mut set, &mut nodes, &mut logo, 0.2, 0.05);
        assert!(matches!(done.now_or_never(), Some(Ok(()))));
    }

    #[test]
    fn clear_interrupts_pending_completions() {
        let (sig, done) = signal();
        let mut set = TweenSet::default();
        set.push(Tween::to(Target::Logo(LogoProp::Alpha), 1.0, 1.0).on_complete(sig));
        set.clear();
        assert!(matches!(done.now_or_never(), Some(Err(_))));
    }

    #[test]
    fn total_duration_counts_delay_and_repeats() {
        let t = Tween::to(Target::Logo(LogoProp::Alpha), 0.55, 0.05).delay(0.1).repeat(10);
        assert!((t.total_duration() - 0.65).abs() < 1e-9);
    }
}
