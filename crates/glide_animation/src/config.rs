//! Motion configuration
//!
//! Page-wide defaults for triggers, stagger groups, pointer magnets and the
//! frame clock. Every field has a default, so a config file only needs to
//! name what it changes:
//!
//! ```toml
//! [trigger]
//! threshold = 0.75
//!
//! [magnet]
//! intensity = 4.0
//! return_easing = "power3.out"
//! ```

use crate::magnet::MagnetConfig;
use crate::stagger::StaggerOrder;
use crate::trigger::{TriggerDescriptor, DEFAULT_THRESHOLD};
use glide_core::ElementId;
use serde::{Deserialize, Serialize};

/// Root motion configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub trigger: TriggerConfig,
    pub stagger: StaggerConfig,
    pub magnet: MagnetConfig,
    pub frame: FrameConfig,
}

/// Defaults for visibility triggers
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    pub threshold: f32,
    pub fire_once: bool,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            fire_once: true,
        }
    }
}

impl TriggerConfig {
    /// Trigger on `region` using these defaults
    pub fn descriptor(&self, region: ElementId) -> TriggerDescriptor {
        TriggerDescriptor::new(region)
            .threshold(self.threshold)
            .fire_once(self.fire_once)
    }
}

/// Defaults for stagger groups
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaggerConfig {
    pub increment_ms: u32,
    /// Cascade direction in mirrored layouts
    pub order: StaggerOrder,
}

impl Default for StaggerConfig {
    fn default() -> Self {
        Self {
            increment_ms: 100,
            order: StaggerOrder::Logical,
        }
    }
}

/// Host frame clock
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Frame interval used when the host drives ticks at a fixed rate
    pub frame_ms: f32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self { frame_ms: 1000.0 / 60.0 }
    }
}
