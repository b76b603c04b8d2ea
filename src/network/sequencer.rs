//! Network activation sequence: node by node, bolt by bolt, then into the logo.
//!
//! The sequencer only holds the scene borrow between awaits; the frame loop
//! ticks the scene in between and fires the completions that wake the run.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

use super::activator::activate_node;
use super::bolt::fire_electric_bolt;
use super::logo::{logo_shock, start_logo_border};
use super::scene::Scene;
use super::sparks::spawn_sparks;
use crate::error::Result;

pub type SceneHandle = Rc<RefCell<Scene>>;

const LOGO_BEAM_SPARKS: usize = 12;
const LOGO_BEAM_SPEED: f64 = 1.2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    Running,
}

impl SequencerState {
    pub fn as_str(self) -> &'static str {
        match self {
            SequencerState::Idle => "idle",
            SequencerState::Running => "running",
        }
    }
}

/// Resets the sequencer to `Idle` however the run ends (finished, failed or
/// dropped mid-await).
struct RunningGuard(Rc<Cell<SequencerState>>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.set(SequencerState::Idle);
    }
}

#[derive(Clone)]
pub struct Sequencer {
    scene: SceneHandle,
    state: Rc<Cell<SequencerState>>,
    runs: Rc<Cell<u64>>,
}

impl Sequencer {
    pub fn new(scene: SceneHandle) -> Self {
        Self {
            scene,
            state: Rc::new(Cell::new(SequencerState::Idle)),
            runs: Rc::new(Cell::new(0)),
        }
    }

    pub fn state(&self) -> SequencerState {
        self.state.get()
    }

    /// Runs started so far.
    pub fn runs(&self) -> u64 {
        self.runs.get()
    }

    pub fn scene(&self) -> &SceneHandle {
        &self.scene
    }

    /// Start a run. Returns `None` (and changes nothing) while one is active;
    /// otherwise the run future, which must be polled to make progress.
    pub fn trigger(&self) -> Option<impl Future<Output = Result<()>> + use<>> {
        if self.state.get() == SequencerState::Running {
            log::debug!("network activation already running; trigger ignored");
            return None;
        }
        self.state.set(SequencerState::Running);
        self.runs.set(self.runs.get() + 1);
        let guard = RunningGuard(self.state.clone());
        let scene = self.scene.clone();
        let run = self.runs.get();
        Some(async move {
            let _guard = guard;
            log::info!("network activation #{} started", run);
            let res = run_sequence(&scene).await;
            match &res {
                Ok(()) => log::info!("network activation #{} finished", run),
                Err(e) => log::warn!("network activation #{} aborted: {}", run, e),
            }
            res
        })
    }
}

async fn run_sequence(scene: &SceneHandle) -> Result<()> {
    let count = scene.borrow().nodes.len();
    for i in 0..count {
        let activated = activate_node(&mut scene.borrow_mut(), i);
        activated.await?;
        if i + 1 < count {
            let bolt = {
                let mut s = scene.borrow_mut();
                let (from, to) = (s.nodes[i].pos, s.nodes[i + 1].pos);
                fire_electric_bolt(&mut s, from, to, 1.0)
            };
            bolt.await?;
        }
    }
    let Some(last) = count.checked_sub(1) else {
        log::debug!("no nodes; skipping logo beam");
        return Ok(());
    };
    fire_beam_to_logo(scene, last).await
}

async fn fire_beam_to_logo(scene: &SceneHandle, last: usize) -> Result<()> {
    let beam = {
        let mut s = scene.borrow_mut();
        let from = s.nodes[last].pos;
        let to = s.logo.center;
        spawn_sparks(&mut s, from, LOGO_BEAM_SPARKS);
        fire_electric_bolt(&mut s, from, to, LOGO_BEAM_SPEED)
    };
    beam.await?;
    let mut s = scene.borrow_mut();
    logo_shock(&mut s);
    start_logo_border(&mut s);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkConfig;
    use crate::error::NetworkError;
    use futures::FutureExt;
    use glam::DVec2;

    fn handle(positions: &[DVec2]) -> SceneHandle {
        let cfg = NetworkConfig { seed: Some(1), ..Default::default() };
        Rc::new(RefCell::new(Scene::with_positions(cfg, 800.0, 600.0, positions)))
    }

    #[test]
    fn second_trigger_while_running_is_ignored() {
        let seq = Sequencer::new(handle(&[DVec2::new(10.0, 10.0), DVec2::new(50.0, 50.0)]));
        let mut run = Box::pin(seq.trigger().expect("first trigger"));
        assert!((&mut run).now_or_never().is_none());
        assert_eq!(seq.state(), SequencerState::Running);
        assert!(seq.trigger().is_none());
        assert_eq!(seq.runs(), 1);
        // only the first node was activated
        assert_eq!(seq.scene().borrow().stats().nodes_activated, 1);
    }

    #[test]
    fn empty_network_finishes_immediately() {
        let seq = Sequencer::new(handle(&[]));
        let run = seq.trigger().expect("trigger");
        assert!(matches!(run.now_or_never(), Some(Ok(()))));
        assert_eq!(seq.state(), SequencerState::Idle);
        let scene = seq.scene().borrow();
        assert_eq!(scene.stats().bolts_fired, 0);
        assert!(!scene.border().is_started());
    }

    #[test]
    fn dropping_a_run_returns_to_idle() {
        let seq = Sequencer::new(handle(&[DVec2::ZERO]));
        let mut run = Box::pin(seq.trigger().expect("trigger"));
        assert!((&mut run).now_or_never().is_none());
        drop(run);
        assert_eq!(seq.state(), SequencerState::Idle);
        assert!(seq.trigger().is_some());
    }

    #[test]
    fn interrupted_scene_aborts_the_run() {
        let seq = Sequencer::new(handle(&[DVec2::ZERO, DVec2::new(100.0, 0.0)]));
        let mut run = Box::pin(seq.trigger().expect("trigger"));
        assert!((&mut run).now_or_never().is_none());
        seq.scene().borrow_mut().interrupt();
        assert!(matches!(run.now_or_never(), Some(Err(NetworkError::Interrupted))));
        assert_eq!(seq.state(), SequencerState::Idle);
    }

    #[test]
    fn state_names() {
        assert_eq!(SequencerState::Idle.as_str(), "idle");
        assert_eq!(SequencerState::Running.as_str(), "running");
    }
}
