//! Pointer magnet effect
//!
//! Pulls an interactive element toward the pointer while the pointer is over
//! it (or within a small margin around it), and eases it back to rest when
//! the pointer leaves. The effect has no timeline and no completion event;
//! it only writes to the [`StyleLayer::Pointer`] layer.

use crate::easing::{EaseDirection, Easing};
use crate::values::Interpolate;
use glide_core::{Document, ElementId, Point, Property, StyleLayer, Vec2};
use serde::{Deserialize, Serialize};

/// Intensity at which the element follows the pointer one-to-one
pub const INTENSITY_UNIT: f32 = 10.0;

/// Tuning for a pointer magnet
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MagnetConfig {
    /// Displacement scale; [`INTENSITY_UNIT`] follows the pointer exactly
    pub intensity: f32,
    /// Upper bound on the displacement magnitude (px)
    pub max_displacement: f32,
    /// Extra hit area around the element's bounds (px)
    pub margin: f32,
    /// Duration of the ease back to rest
    pub return_ms: u32,
    pub return_easing: Easing,
}

impl Default for MagnetConfig {
    fn default() -> Self {
        Self {
            intensity: 3.0,
            max_displacement: 20.0,
            margin: 24.0,
            return_ms: 600,
            return_easing: Easing::power(3, EaseDirection::Out),
        }
    }
}

/// Displacement for a pointer at `offset` from the element's center
pub fn magnet_displacement(offset: Vec2, config: &MagnetConfig) -> Vec2 {
    (offset * (config.intensity / INTENSITY_UNIT)).clamp_length(config.max_displacement)
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Phase {
    Rest,
    Tracking,
    Returning { from: Vec2, elapsed_ms: f32 },
}

/// State of one attached magnet
#[derive(Clone, Debug)]
pub struct PointerMagnet {
    target: ElementId,
    config: MagnetConfig,
    pointer: Option<Point>,
    displacement: Vec2,
    phase: Phase,
}

impl PointerMagnet {
    pub fn new(target: ElementId, config: MagnetConfig) -> Self {
        Self {
            target,
            config,
            pointer: None,
            displacement: Vec2::ZERO,
            phase: Phase::Rest,
        }
    }

    pub fn target(&self) -> ElementId {
        self.target
    }

    pub fn config(&self) -> &MagnetConfig {
        &self.config
    }

    /// Current displacement applied to the element
    pub fn displacement(&self) -> Vec2 {
        self.displacement
    }

    pub fn is_at_rest(&self) -> bool {
        self.phase == Phase::Rest
    }

    pub fn pointer_moved(&mut self, pointer: Point) {
        self.pointer = Some(pointer);
    }

    pub fn pointer_left(&mut self) {
        self.pointer = None;
    }

    /// Advance the effect and write the displacement into `document`
    ///
    /// Returns true while the element is displaced or returning to rest.
    pub fn tick(&mut self, dt_ms: f32, document: &mut Document) -> bool {
        // Hit testing uses untransformed bounds so the displacement never
        // feeds back into whether the pointer is inside.
        let hit = match (self.pointer, document.bounds(self.target)) {
            (Some(pointer), Ok(bounds)) if bounds.inflate(self.config.margin).contains(pointer) => {
                Some(pointer - bounds.center())
            }
            _ => None,
        };

        match (hit, self.phase) {
            (Some(offset), _) => {
                self.displacement = magnet_displacement(offset, &self.config);
                self.phase = Phase::Tracking;
            }
            (None, Phase::Tracking) => {
                self.phase = Phase::Returning {
                    from: self.displacement,
                    elapsed_ms: 0.0,
                };
                self.step_return(dt_ms);
            }
            (None, Phase::Returning { .. }) => self.step_return(dt_ms),
            (None, Phase::Rest) => return false,
        }

        document.write(self.target, StyleLayer::Pointer, Property::X, self.displacement.x);
        document.write(self.target, StyleLayer::Pointer, Property::Y, self.displacement.y);
        true
    }

    fn step_return(&mut self, dt_ms: f32) {
        let Phase::Returning { from, elapsed_ms } = self.phase else {
            return;
        };
        let elapsed_ms = elapsed_ms + dt_ms;
        let duration = self.config.return_ms.max(1) as f32;
        let t = (elapsed_ms / duration).min(1.0);
        if t >= 1.0 {
            self.displacement = Vec2::ZERO;
            self.phase = Phase::Rest;
            return;
        }
        self.displacement = from.lerp(&Vec2::ZERO, self.config.return_easing.apply(t));
        self.phase = Phase::Returning { from, elapsed_ms };
    }
}
