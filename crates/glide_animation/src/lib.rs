//! Glide Animation System
//!
//! Scroll-synchronized entrance timelines, staggered reveals, ambient loops
//! and pointer effects for landing-page sections.
//!
//! # Features
//!
//! - **Viewport Triggers**: fire once a region crosses a visibility threshold,
//!   through one reference-counted observation service
//! - **Timelines**: steps positioned by absolute or relative offsets, resolved
//!   once into absolute start times
//! - **Stagger Groups**: cascading per-item offsets with an explicit mirrored
//!   layout policy
//! - **Ambient Loops**: perpetual yoyo drifts with phase delays
//! - **Pointer Magnets**: bounded displacement toward the pointer with an
//!   eased return
//! - **Lifecycle Scopes**: everything a section creates is released by one
//!   teardown
//!
//! Entrance timelines, ambient loops and magnets write to separate style
//! layers of an element, so all three can run on the same element.

pub mod ambient;
pub mod config;
pub mod descriptor;
pub mod easing;
pub mod error;
pub mod magnet;
pub mod scheduler;
pub mod scope;
pub mod stagger;
pub mod timeline;
pub mod trigger;
pub mod values;

pub use ambient::AmbientLoop;
pub use config::{FrameConfig, MotionConfig, StaggerConfig, TriggerConfig};
pub use descriptor::{AnimationDescriptor, DEFAULT_DURATION_MS, REPEAT_FOREVER};
pub use easing::{EaseDirection, Easing};
pub use error::{AnimationError, Result};
pub use magnet::{magnet_displacement, MagnetConfig, PointerMagnet};
pub use scheduler::{
    AnimationScheduler, LoopHandle, LoopId, MagnetHandle, MagnetId, SchedulerHandle,
    TimelineHandle, TimelineId,
};
pub use scope::{with_scope, AnimationScope};
pub use stagger::{expand, expand_for_layout, StaggerFrom, StaggerGroup, StaggerOrder};
pub use timeline::{
    compose, Offset, PlayState, ResolvedStep, SkippedStep, Timeline, TimelineComposer,
    TimelineStep,
};
pub use trigger::{
    ObservationService, ObserverHandle, SubscriptionId, TriggerDescriptor, TriggerEvent,
    DEFAULT_THRESHOLD,
};
pub use values::Interpolate;
