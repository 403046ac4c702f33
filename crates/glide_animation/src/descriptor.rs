//! Animation descriptors
//!
//! An [`AnimationDescriptor`] describes one tween on one element handle:
//! which properties move, from where to where, for how long and along which
//! curve. Descriptors carry no playback state; timelines and ambient loops
//! sample them with an elapsed time.

use crate::easing::Easing;
use crate::error::{AnimationError, Result};
use crate::values::Interpolate;
use glide_core::{ElementId, PropertyMap};

/// `repeat` value meaning "loop forever"
pub const REPEAT_FOREVER: i32 = -1;

/// Default tween duration
pub const DEFAULT_DURATION_MS: u32 = 500;

/// One tween on one element
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationDescriptor {
    pub target: ElementId,
    /// Start values; empty means "start from whatever the element shows"
    pub from: PropertyMap,
    pub to: PropertyMap,
    pub duration_ms: u32,
    pub easing: Easing,
    /// Extra iterations after the first; `-1` repeats forever
    pub repeat: i32,
    /// Alternate direction on every iteration
    pub yoyo: bool,
    pub delay_ms: u32,
}

impl AnimationDescriptor {
    /// Tween from explicit start values to end values
    pub fn from_to(target: ElementId, from: PropertyMap, to: PropertyMap) -> Self {
        Self {
            target,
            from,
            to,
            duration_ms: DEFAULT_DURATION_MS,
            easing: Easing::default(),
            repeat: 0,
            yoyo: false,
            delay_ms: 0,
        }
    }

    /// Tween from the element's current values to end values
    pub fn to(target: ElementId, to: PropertyMap) -> Self {
        Self::from_to(target, PropertyMap::new(), to)
    }

    pub fn duration(mut self, duration_ms: u32) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn repeat(mut self, repeat: i32) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn yoyo(mut self, yoyo: bool) -> Self {
        self.yoyo = yoyo;
        self
    }

    pub fn delay(mut self, delay_ms: u32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Repeat forever, alternating direction
    pub fn loop_forever(self) -> Self {
        self.repeat(REPEAT_FOREVER).yoyo(true)
    }

    /// Retarget a copy of this descriptor at another element
    pub fn retarget(&self, target: ElementId) -> Self {
        Self {
            target,
            ..self.clone()
        }
    }

    /// Ambient descriptors loop forever and never complete
    pub fn is_ambient(&self) -> bool {
        self.repeat < 0
    }

    /// Whether the start values are given explicitly
    pub fn has_from(&self) -> bool {
        !self.from.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        if self.duration_ms == 0 {
            return Err(AnimationError::InvalidDuration(self.target));
        }
        Ok(())
    }

    /// Total time spent animating, excluding delay; `None` when infinite
    pub fn active_span_ms(&self) -> Option<u32> {
        if self.is_ambient() {
            return None;
        }
        let iterations = self.repeat as u32 + 1;
        Some(self.duration_ms.saturating_mul(iterations))
    }

    /// Linear progress of the current iteration, direction applied
    pub fn iteration_progress(&self, elapsed_ms: f32) -> f32 {
        if elapsed_ms <= 0.0 {
            return 0.0;
        }
        if let Some(span) = self.active_span_ms() {
            if elapsed_ms >= span as f32 {
                return self.final_progress();
            }
        }

        let duration = self.duration_ms.max(1) as f32;
        let cycle = (elapsed_ms / duration).floor();
        let local = (elapsed_ms - cycle * duration) / duration;
        if self.yoyo && (cycle as u64) % 2 == 1 {
            1.0 - local
        } else {
            local
        }
    }

    /// Eased progress at `elapsed_ms` after the tween started
    pub fn sample(&self, elapsed_ms: f32) -> f32 {
        self.easing.apply(self.iteration_progress(elapsed_ms))
    }

    /// Property values at `elapsed_ms`, starting from `from`
    pub fn values_at(&self, from: &PropertyMap, elapsed_ms: f32) -> PropertyMap {
        from.lerp(&self.to, self.sample(elapsed_ms))
    }

    fn final_progress(&self) -> f32 {
        // An odd number of extra yoyo iterations ends back at the start
        if self.yoyo && self.repeat % 2 == 1 {
            0.0
        } else {
            1.0
        }
    }
}
