//! Ambient loops
//!
//! An ambient loop drifts its target to the end values, back to the start
//! values, and repeats forever. It starts on the first frame after it is
//! registered, independent of scroll position, and writes only to the
//! [`StyleLayer::Ambient`] layer so it composes with entrance timelines and
//! pointer effects on the same element.
//!
//! Loops on different targets are meant to use different durations and an
//! initial `delay` as a phase offset, so decorative shapes never move in
//! lockstep.

use crate::descriptor::AnimationDescriptor;
use crate::error::{AnimationError, Result};
use crate::values::Interpolate;
use glide_core::{Document, PropertyMap, StyleLayer};

/// Playback state of one ambient loop
#[derive(Clone, Debug)]
pub struct AmbientLoop {
    descriptor: AnimationDescriptor,
    elapsed_ms: f32,
    /// Start values, captured on the first active frame for `to` loops
    from: Option<PropertyMap>,
}

impl AmbientLoop {
    /// Create a loop; the descriptor must repeat forever and alternate
    pub fn new(descriptor: AnimationDescriptor) -> Result<Self> {
        descriptor.validate()?;
        if !descriptor.is_ambient() || !descriptor.yoyo {
            return Err(AnimationError::NotAmbient(descriptor.target));
        }
        let from = descriptor.has_from().then(|| descriptor.from.clone());
        Ok(Self {
            descriptor,
            elapsed_ms: 0.0,
            from,
        })
    }

    pub fn descriptor(&self) -> &AnimationDescriptor {
        &self.descriptor
    }

    /// Time since the loop was started, delay included
    pub fn elapsed_ms(&self) -> f32 {
        self.elapsed_ms
    }

    /// Time spent actually moving (after the phase delay)
    pub fn phase_ms(&self) -> f32 {
        (self.elapsed_ms - self.descriptor.delay_ms as f32).max(0.0)
    }

    /// Eased progress at `phase_ms`, kept inside `[0, 1]`
    ///
    /// Overshooting curves are clamped so the loop never leaves the
    /// interpolation bounds.
    pub fn progress_at(&self, phase_ms: f32) -> f32 {
        self.descriptor.sample(phase_ms).clamp(0.0, 1.0)
    }

    /// Advance the loop and write its values into `document`
    pub fn tick(&mut self, dt_ms: f32, document: &mut Document) {
        self.elapsed_ms += dt_ms;
        if self.elapsed_ms < self.descriptor.delay_ms as f32 {
            return;
        }

        let progress = self.progress_at(self.phase_ms());
        let descriptor = &self.descriptor;
        let from = self.from.get_or_insert_with(|| {
            descriptor
                .to
                .properties()
                .map(|p| (p, document.read(descriptor.target, StyleLayer::Ambient, p)))
                .collect()
        });
        for (property, value) in from.lerp(&descriptor.to, progress).iter() {
            document.write(descriptor.target, StyleLayer::Ambient, property, value);
        }
    }
}
