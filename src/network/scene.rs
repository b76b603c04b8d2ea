//! Scene state: everything the frame loop advances and the renderer draws.

use glam::DVec2;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::bolt::{Bolt, update_bolts};
use super::layout::{Connection, compute_connections, scatter_nodes};
use super::logo::{LogoBorder, update_border};
use super::sparks::{Spark, update_sparks};
use super::tween::{Stage, TweenSet};
use crate::config::NetworkConfig;

/// Tick deltas are expressed in frames of this rate.
pub const FRAMES_PER_SECOND: f64 = 60.0;
const GLOW_RADIUS: f64 = 20.0;
/// Seed used when the config carries none (tests, headless use).
const FALLBACK_SEED: u64 = 0x5eed_e1ec;
/// Node colour when the palette is empty (unvalidated configs).
const FALLBACK_COLOR: u32 = 0x00c8ff;

/// One network node and its three drawable layers.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub pos: DVec2,
    /// 0xRRGGBB
    pub color: u32,
    pub core_radius: f64,
    pub core_alpha: f64,
    pub core_scale: f64,
    pub star_alpha: f64,
    pub star_scale: f64,
    pub star_rotation: f64,
    pub glow_alpha: f64,
    pub glow_scale: f64,
    pub glow_radius: f64,
    pub activated: bool,
}

impl Node {
    pub fn new(pos: DVec2, color: u32, core_radius: f64, base_alpha: f64) -> Self {
        Self {
            pos,
            color,
            core_radius,
            core_alpha: base_alpha,
            core_scale: 1.0,
            star_alpha: 0.0,
            star_scale: 0.2,
            star_rotation: 0.0,
            glow_alpha: 0.0,
            glow_scale: 1.0,
            glow_radius: GLOW_RADIUS,
            activated: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Logo {
    pub center: DVec2,
    pub alpha: f64,
    pub scale: f64,
    /// Unscaled text extent; measured by the renderer once the font is set.
    pub width: f64,
    pub height: f64,
}

impl Logo {
    pub fn new(center: DVec2) -> Self {
        Self { center, alpha: 0.0, scale: 1.0, width: 0.0, height: 0.0 }
    }

    pub fn set_extent(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
    }

    /// Extent with the current scale applied.
    pub fn scaled_extent(&self) -> DVec2 {
        DVec2::new(self.width, self.height) * self.scale
    }
}

/// Running counters, mostly for logging and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SceneStats {
    pub sparks_spawned: u64,
    pub bolts_fired: u64,
    pub nodes_activated: u64,
    pub logo_shocks: u64,
    pub border_starts: u64,
    pub frames: u64,
}

pub struct Scene {
    pub(crate) config: NetworkConfig,
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) nodes: Vec<Node>,
    pub(crate) connections: Vec<Connection>,
    pub(crate) sparks: Vec<Spark>,
    pub(crate) bolts: Vec<Bolt>,
    pub(crate) tweens: TweenSet,
    pub(crate) logo: Logo,
    pub(crate) border: LogoBorder,
    pub(crate) rng: SmallRng,
    pub(crate) clock: f64,
    pub(crate) stats: SceneStats,
}

impl Scene {
    /// Lay out nodes and connections for a `width` x `height` surface.
    pub fn new(config: NetworkConfig, width: f64, height: f64) -> Self {
        let mut rng = SmallRng::seed_from_u64(config.seed.unwrap_or(FALLBACK_SEED));
        let positions = scatter_nodes(&mut rng, config.node_count, width, height);
        let connections = compute_connections(&positions, config.connection_distance);
        let nodes = positions
            .into_iter()
            .map(|pos| {
                let color = config.palette.choose(&mut rng).copied().unwrap_or(FALLBACK_COLOR);
                let radius = rng.gen_range(3.0..8.0);
                Node::new(pos, color, radius, config.node_base_alpha)
            })
            .collect();
        Self::assemble(config, width, height, nodes, connections, rng)
    }

    /// Build a scene around fixed node positions instead of a random layout.
    pub fn with_positions(config: NetworkConfig, width: f64, height: f64, positions: &[DVec2]) -> Self {
        let rng = SmallRng::seed_from_u64(config.seed.unwrap_or(FALLBACK_SEED));
        let connections = compute_connections(positions, config.connection_distance);
        let color = config.palette.first().copied().unwrap_or(FALLBACK_COLOR);
        let nodes = positions
            .iter()
            .map(|&pos| Node::new(pos, color, 4.0, config.node_base_alpha))
            .collect();
        Self::assemble(config, width, height, nodes, connections, rng)
    }

    fn assemble(
        config: NetworkConfig,
        width: f64,
        height: f64,
        nodes: Vec<Node>,
        connections: Vec<Connection>,
        rng: SmallRng,
    ) -> Self {
        let mut logo = Logo::new(DVec2::new(width / 2.0, height / 2.0));
        // Rough Arial Black metrics until the renderer measures the real text.
        let chars = config.logo_text.chars().count() as f64;
        logo.set_extent(chars * config.logo_font_size * 0.72, config.logo_font_size * 1.15);
        Self {
            config,
            width,
            height,
            nodes,
            connections,
            sparks: Vec::new(),
            bolts: Vec::new(),
            tweens: TweenSet::default(),
            logo,
            border: LogoBorder::default(),
            rng,
            clock: 0.0,
            stats: SceneStats::default(),
        }
    }

    /// Advance everything by `dt` frames (1.0 = one 60 Hz frame).
    pub fn tick(&mut self, dt: f64) {
        let dt = dt.clamp(0.0, self.config.max_frame_delta);
        let seconds = dt / FRAMES_PER_SECOND;
        self.clock += seconds;
        self.stats.frames += 1;

        breathe(&mut self.nodes, self.clock);
        update_sparks(&mut self.sparks, dt);
        update_bolts(self, dt);
        self.tweens.advance(seconds, &mut Stage { nodes: &mut self.nodes, logo: &mut self.logo });
        update_border(self, dt);
    }

    /// Drop in-flight bolts and tweens. Anything awaiting them resolves as
    /// interrupted; sparks and the logo border keep running.
    pub fn interrupt(&mut self) {
        let (bolts, tweens) = (self.bolts.len(), self.tweens.len());
        self.bolts.clear();
        self.tweens.clear();
        if bolts + tweens > 0 {
            log::warn!("interrupted {} bolt(s) and {} tween(s)", bolts, tweens);
        }
    }

    /// Follow a canvas resize. Layout and connections stay as computed.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn sparks(&self) -> &[Spark] {
        &self.sparks
    }

    pub fn bolts(&self) -> &[Bolt] {
        &self.bolts
    }

    pub fn tweens(&self) -> &TweenSet {
        &self.tweens
    }

    pub fn logo(&self) -> &Logo {
        &self.logo
    }

    pub fn logo_mut(&mut self) -> &mut Logo {
        &mut self.logo
    }

    pub fn border(&self) -> &LogoBorder {
        &self.border
    }

    pub fn stats(&self) -> SceneStats {
        self.stats
    }

    /// Seconds of scene time elapsed.
    pub fn clock(&self) -> f64 {
        self.clock
    }
}

/// Idle breathing of the core dots.
fn breathe(nodes: &mut [Node], clock: f64) {
    for (i, n) in nodes.iter_mut().enumerate() {
        n.core_scale = 1.0 + ((clock + i as f64) * 0.6).sin() * 0.02;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(nodes: usize) -> NetworkConfig {
        NetworkConfig { node_count: nodes, seed: Some(21), ..Default::default() }
    }

    #[test]
    fn new_scene_matches_config() {
        let scene = Scene::new(cfg(26), 1280.0, 720.0);
        assert_eq!(scene.nodes().len(), 26);
        for n in scene.nodes() {
            assert!(NetworkConfig::default().palette.contains(&n.color));
            assert!((3.0..8.0).contains(&n.core_radius));
            assert_eq!(n.core_alpha, 0.06);
            assert_eq!(n.star_alpha, 0.0);
            assert_eq!(n.star_scale, 0.2);
            assert!(!n.activated);
        }
        for c in scene.connections() {
            assert!(scene.nodes()[c.a].pos.distance(scene.nodes()[c.b].pos) < 240.0);
        }
        assert_eq!(scene.logo().center, DVec2::new(640.0, 360.0));
        assert_eq!(scene.logo().alpha, 0.0);
    }

    #[test]
    fn same_seed_same_layout() {
        let a = Scene::new(cfg(10), 500.0, 500.0);
        let b = Scene::new(cfg(10), 500.0, 500.0);
        assert_eq!(a.nodes(), b.nodes());
        assert_eq!(a.connections(), b.connections());
    }

    #[test]
    fn breathing_stays_within_two_percent() {
        let mut scene = Scene::new(cfg(5), 300.0, 300.0);
        for _ in 0..200 {
            scene.tick(1.0);
            for n in scene.nodes() {
                assert!((n.core_scale - 1.0).abs() <= 0.02 + 1e-12);
            }
        }
        assert_eq!(scene.stats().frames, 200);
    }

    #[test]
    fn tick_clamps_large_deltas() {
        let mut scene = Scene::new(cfg(1), 100.0, 100.0);
        scene.tick(1_000.0);
        assert!((scene.clock() - 4.0 / FRAMES_PER_SECOND).abs() < 1e-12);
        scene.tick(-3.0);
        assert!((scene.clock() - 4.0 / FRAMES_PER_SECOND).abs() < 1e-12);
    }

    #[test]
    fn scaled_extent_follows_scale() {
        let mut logo = Logo::new(DVec2::ZERO);
        logo.set_extent(100.0, 40.0);
        logo.scale = 1.5;
        assert_eq!(logo.scaled_extent(), DVec2::new(150.0, 60.0));
    }
}
