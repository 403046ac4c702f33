//! Error types for glide_animation
//!
//! Most of these are recovered locally (a skipped step, a clamped offset, a
//! trigger that fires immediately) and only ever reach the caller through
//! logs and the bookkeeping on the returned value. The ones returned as
//! `Err` are caller mistakes or a scheduler that no longer exists.

use glide_core::ElementId;
use thiserror::Error;

/// Errors that can occur while orchestrating animations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// A descriptor references an element that does not exist
    #[error("animation target {0:?} does not exist")]
    MissingTarget(ElementId),

    /// A relative offset resolved before the start of the timeline
    #[error("step {step} resolved to negative start {resolved_ms}ms")]
    InvalidOffset { step: usize, resolved_ms: i64 },

    /// Descriptors must have a positive duration
    #[error("animation on {0:?} has zero duration")]
    InvalidDuration(ElementId),

    /// The host cannot observe element visibility
    #[error("viewport observation is not supported by the host")]
    UnsupportedObserver,

    /// Two entrance timelines compete for one element
    #[error("element {target:?} already has an active entrance timeline")]
    EntranceConflict { target: ElementId },

    /// Ambient loops need `repeat = -1` and `yoyo = true`
    #[error("ambient loop on {0:?} must repeat forever and alternate")]
    NotAmbient(ElementId),

    /// An ambient descriptor was placed in a finite timeline
    #[error("ambient animation on {0:?} cannot be part of a finite timeline")]
    AmbientInTimeline(ElementId),

    /// Unrecognized easing name
    #[error("unknown easing `{0}`")]
    UnknownEasing(String),

    /// The scheduler or observation service was dropped
    #[error("{0} is no longer alive")]
    Detached(&'static str),

    /// Scope teardown could not release every resource
    #[error("teardown left {failed} of {total} resources unreleased")]
    Teardown { failed: usize, total: usize },
}

/// Result type for glide_animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;
