//! Tunables for the network animation. Every field has a default so the page can
//! pass a partial JSON object (or nothing) to `start_network()`.

use serde::{Deserialize, Serialize};

use crate::error::{NetworkError, Result};

/// When a node activation reports completion to the sequencer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivationWait {
    /// Resolve as soon as the core flash finishes; the starburst, glow and
    /// rotation tweens keep playing while the next bolt fires.
    #[default]
    CoreFlash,
    /// Resolve only after every tween of the activation has finished,
    /// including the slow starburst rotation.
    AllTweens,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NetworkConfig {
    pub node_count: usize,
    /// Pairs closer than this (pixels) get a static connection line.
    pub connection_distance: f64,
    pub node_base_alpha: f64,
    pub node_active_alpha: f64,
    /// 0xRRGGBB colours nodes pick from.
    pub palette: Vec<u32>,
    pub grid_step: f64,
    pub logo_text: String,
    pub logo_font_family: String,
    pub logo_font_size: f64,
    pub logo_padding: f64,
    pub bolt_segments: usize,
    pub border_steps: usize,
    pub activation_wait: ActivationWait,
    /// Fixed layout seed; random per page load when absent.
    pub seed: Option<u64>,
    pub stage_element_id: String,
    pub trigger_element_id: String,
    /// Upper bound on one tick's delta, in 60 Hz frames (tab switches etc).
    pub max_frame_delta: f64,
    pub log_level: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            node_count: 26,
            connection_distance: 240.0,
            node_base_alpha: 0.06,
            node_active_alpha: 1.0,
            palette: vec![0x00c8ff, 0x00ff95, 0xfff95c],
            grid_step: 60.0,
            logo_text: "ELECTRIC LOGO".to_string(),
            logo_font_family: "'Arial Black', sans-serif".to_string(),
            logo_font_size: 96.0,
            logo_padding: 30.0,
            bolt_segments: 18,
            border_steps: 70,
            activation_wait: ActivationWait::CoreFlash,
            seed: None,
            stage_element_id: "electricStage".to_string(),
            trigger_element_id: "activateBtn".to_string(),
            max_frame_delta: 4.0,
            log_level: "info".to_string(),
        }
    }
}

impl NetworkConfig {
    /// Parse a (possibly partial) camelCase JSON object and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: NetworkConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.palette.is_empty() {
            return Err(NetworkError::InvalidConfig("palette must not be empty"));
        }
        if self.bolt_segments == 0 {
            return Err(NetworkError::InvalidConfig("boltSegments must be at least 1"));
        }
        if self.border_steps == 0 {
            return Err(NetworkError::InvalidConfig("borderSteps must be at least 1"));
        }
        if !(self.logo_font_size > 0.0) {
            return Err(NetworkError::InvalidConfig("logoFontSize must be positive"));
        }
        if !(self.grid_step > 0.0) {
            return Err(NetworkError::InvalidConfig("gridStep must be positive"));
        }
        if !(self.max_frame_delta > 0.0) {
            return Err(NetworkError::InvalidConfig("maxFrameDelta must be positive"));
        }
        Ok(())
    }

    /// Canvas font shorthand for the logo text.
    pub fn logo_font(&self) -> String {
        format!("{}px {}", self.logo_font_size, self.logo_font_family)
    }

    /// Unknown names fall back to `Info`.
    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}
