//! Frame scheduler
//!
//! The [`AnimationScheduler`] owns every running timeline, ambient loop and
//! pointer magnet and advances them once per host frame. Components receive
//! a weak [`SchedulerHandle`] to register work; the wrapper handles it
//! returns ([`TimelineHandle`], [`LoopHandle`], [`MagnetHandle`]) turn into
//! no-ops once the scheduler is gone.
//!
//! Everything runs on the host's frame thread. Cancelling or stopping
//! through a handle takes effect immediately, so the next tick never
//! processes a cancelled animation.

use crate::ambient::AmbientLoop;
use crate::descriptor::AnimationDescriptor;
use crate::error::{AnimationError, Result};
use crate::magnet::{MagnetConfig, PointerMagnet};
use crate::timeline::{PlayState, Timeline};
use glide_core::{Document, ElementId, Point, Property, StyleLayer, Vec2};
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{debug, trace, warn};

new_key_type! {
    /// Handle to a registered timeline
    pub struct TimelineId;
    /// Handle to a running ambient loop
    pub struct LoopId;
    /// Handle to an attached pointer magnet
    pub struct MagnetId;
}

const SCHEDULER: &str = "animation scheduler";

/// Internal state of the animation scheduler
struct SchedulerInner {
    timelines: SlotMap<TimelineId, Timeline>,
    loops: SlotMap<LoopId, AmbientLoop>,
    magnets: SlotMap<MagnetId, PointerMagnet>,
    /// Element to the timeline currently owning its entrance layer
    entrance_owners: FxHashMap<ElementId, TimelineId>,
    /// Pointer layers to zero on the next frame after a magnet detaches
    pointer_resets: Vec<ElementId>,
    frame: u64,
}

impl SchedulerInner {
    fn release_entrance(&mut self, id: TimelineId) {
        self.entrance_owners.retain(|_, owner| *owner != id);
    }

    fn has_active_animations(&self) -> bool {
        self.timelines.values().any(Timeline::is_playing)
            || !self.loops.is_empty()
            || self.magnets.values().any(|m| !m.is_at_rest())
            || !self.pointer_resets.is_empty()
    }
}

/// The scheduler that ticks all registered animations
///
/// This is held by the page host and shared via [`SchedulerHandle`].
///
/// ```rust
/// use glide_animation::{AnimationDescriptor, AnimationScheduler, TimelineComposer};
/// use glide_core::{Document, Property, PropertyMap, Rect};
///
/// let mut doc = Document::new();
/// let card = doc.insert("card", &["about-card"], Rect::ZERO);
/// let scheduler = AnimationScheduler::new();
///
/// let timeline = TimelineComposer::new()
///     .then(AnimationDescriptor::to(card, PropertyMap::new().with(Property::Y, 40.0)).duration(100))
///     .compose(&doc);
/// let handle = scheduler.handle().register_timeline(timeline).unwrap();
/// handle.play();
///
/// while scheduler.tick(16.0, &mut doc) {}
/// assert_eq!(doc.computed(card, Property::Y), 40.0);
/// ```
pub struct AnimationScheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerInner {
                timelines: SlotMap::with_key(),
                loops: SlotMap::with_key(),
                magnets: SlotMap::with_key(),
                entrance_owners: FxHashMap::default(),
                pointer_resets: Vec::new(),
                frame: 0,
            })),
        }
    }

    /// Get a weak handle for registering animations
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Advance every animation by `dt_ms` and write into `document`
    ///
    /// Returns true if any animation is still active (needs another tick).
    pub fn tick(&self, dt_ms: f32, document: &mut Document) -> bool {
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        inner.frame += 1;

        for element in inner.pointer_resets.drain(..) {
            document.write(element, StyleLayer::Pointer, Property::X, 0.0);
            document.write(element, StyleLayer::Pointer, Property::Y, 0.0);
        }

        // Timelines run in registration order; an element has at most one
        // entrance owner so their writes never overlap.
        for (_, timeline) in inner.timelines.iter_mut() {
            timeline.tick(dt_ms, document);
        }
        for (_, ambient) in inner.loops.iter_mut() {
            ambient.tick(dt_ms, document);
        }
        for (_, magnet) in inner.magnets.iter_mut() {
            magnet.tick(dt_ms, document);
        }

        // Nothing is removed here. Timelines stay registered after finishing
        // so they can be replayed; removal goes through the handles.
        let active = inner.has_active_animations();
        trace!("frame {} active={}", inner.frame, active);
        active
    }

    /// Check if any animations are still active
    pub fn has_active_animations(&self) -> bool {
        self.inner.borrow().has_active_animations()
    }

    /// Number of frames ticked so far
    pub fn frame(&self) -> u64 {
        self.inner.borrow().frame
    }

    /// Get the number of registered timelines
    pub fn timeline_count(&self) -> usize {
        self.inner.borrow().timelines.len()
    }

    /// Get the number of running ambient loops
    pub fn loop_count(&self) -> usize {
        self.inner.borrow().loops.len()
    }

    /// Get the number of attached magnets
    pub fn magnet_count(&self) -> usize {
        self.inner.borrow().magnets.len()
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// A weak handle to the animation scheduler
///
/// This is passed to components that need to register animations.
/// It won't prevent the scheduler from being dropped.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<RefCell<SchedulerInner>>,
}

impl SchedulerHandle {
    fn upgrade(&self) -> Result<Rc<RefCell<SchedulerInner>>> {
        self.inner.upgrade().ok_or(AnimationError::Detached(SCHEDULER))
    }

    fn with_inner<R>(&self, f: impl FnOnce(&mut SchedulerInner) -> R) -> Option<R> {
        self.inner.upgrade().map(|inner| f(&mut inner.borrow_mut()))
    }

    /// Check if the scheduler is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    // =========================================================================
    // Timeline Operations
    // =========================================================================

    /// Register a composed timeline; it stays idle until played
    ///
    /// Fails with [`AnimationError::EntranceConflict`] if one of its targets
    /// is already owned by another live entrance timeline.
    pub fn register_timeline(&self, timeline: Timeline) -> Result<TimelineHandle> {
        let inner = self.upgrade()?;
        let mut guard = inner.borrow_mut();
        let targets = timeline.targets();

        if let Some(target) = targets.iter().find(|t| {
            guard
                .entrance_owners
                .get(*t)
                .and_then(|owner| guard.timelines.get(*owner))
                .is_some_and(|owner| owner.state() != PlayState::Cancelled)
        }) {
            warn!("entrance conflict on {:?}", target);
            return Err(AnimationError::EntranceConflict { target: *target });
        }

        let id = guard.timelines.insert(timeline);
        for target in targets {
            guard.entrance_owners.insert(target, id);
        }
        debug!("registered timeline {:?}", id);
        Ok(TimelineHandle {
            handle: self.clone(),
            id,
        })
    }

    // =========================================================================
    // Ambient Loop Operations
    // =========================================================================

    /// Start an ambient loop; it begins moving on the next frame
    pub fn start_loop(&self, descriptor: AnimationDescriptor) -> Result<LoopHandle> {
        let ambient = AmbientLoop::new(descriptor)?;
        let inner = self.upgrade()?;
        let target = ambient.descriptor().target;
        let id = inner.borrow_mut().loops.insert(ambient);
        debug!("started ambient loop {:?} on {:?}", id, target);
        Ok(LoopHandle {
            handle: self.clone(),
            id,
            stopped: false,
        })
    }

    // =========================================================================
    // Magnet Operations
    // =========================================================================

    /// Attach a pointer magnet to `target`
    pub fn attach_magnet(&self, target: ElementId, config: MagnetConfig) -> Result<MagnetHandle> {
        let inner = self.upgrade()?;
        let id = inner.borrow_mut().magnets.insert(PointerMagnet::new(target, config));
        debug!("attached magnet {:?} to {:?}", id, target);
        Ok(MagnetHandle {
            handle: self.clone(),
            id,
        })
    }
}

// ============================================================================
// Timeline Handle
// ============================================================================

/// Shared control over a registered timeline
///
/// Cloned into trigger callbacks so a visibility event can start playback.
#[derive(Clone)]
pub struct TimelineHandle {
    handle: SchedulerHandle,
    id: TimelineId,
}

impl TimelineHandle {
    pub fn id(&self) -> TimelineId {
        self.id
    }

    /// Start playback; a no-op while already playing
    pub fn play(&self) -> bool {
        self.handle
            .with_inner(|inner| inner.timelines.get_mut(self.id).is_some_and(Timeline::play))
            .unwrap_or(false)
    }

    /// Halt playback where it is and release its elements
    pub fn cancel(&self) {
        self.handle.with_inner(|inner| {
            if let Some(timeline) = inner.timelines.get_mut(self.id) {
                timeline.cancel();
                inner.release_entrance(self.id);
            }
        });
    }

    /// Unregister the timeline; returns whether it was still registered
    pub fn remove(&self) -> bool {
        self.handle
            .with_inner(|inner| {
                inner.release_entrance(self.id);
                inner.timelines.remove(self.id).is_some()
            })
            .unwrap_or(false)
    }

    /// Current play state, `None` once removed
    pub fn state(&self) -> Option<PlayState> {
        self.handle
            .with_inner(|inner| inner.timelines.get(self.id).map(Timeline::state))
            .flatten()
    }

    pub fn is_playing(&self) -> bool {
        self.state() == Some(PlayState::Playing)
    }

    pub fn progress(&self) -> f32 {
        self.handle
            .with_inner(|inner| inner.timelines.get(self.id).map(Timeline::progress))
            .flatten()
            .unwrap_or(0.0)
    }

    /// Run `f` against the registered timeline
    pub fn with_timeline<R>(&self, f: impl FnOnce(&Timeline) -> R) -> Option<R> {
        self.handle
            .with_inner(|inner| inner.timelines.get(self.id).map(f))
            .flatten()
    }
}

// ============================================================================
// Loop Handle
// ============================================================================

/// Owner of a running ambient loop
///
/// Dropping the handle stops the loop, leaving the target at its current
/// interpolated values.
pub struct LoopHandle {
    handle: SchedulerHandle,
    id: LoopId,
    stopped: bool,
}

impl LoopHandle {
    pub fn id(&self) -> LoopId {
        self.id
    }

    /// Stop the loop; returns whether it was still running
    pub fn stop(&mut self) -> bool {
        if self.stopped {
            return false;
        }
        self.stopped = true;
        let id = self.id;
        let stopped = self
            .handle
            .with_inner(|inner| inner.loops.remove(id).is_some())
            .unwrap_or(false);
        if stopped {
            debug!("stopped ambient loop {:?}", id);
        }
        stopped
    }

    pub fn is_running(&self) -> bool {
        !self.stopped
            && self
                .handle
                .with_inner(|inner| inner.loops.contains_key(self.id))
                .unwrap_or(false)
    }

    /// Time spent moving since the phase delay elapsed
    pub fn phase_ms(&self) -> Option<f32> {
        if self.stopped {
            return None;
        }
        self.handle
            .with_inner(|inner| inner.loops.get(self.id).map(AmbientLoop::phase_ms))
            .flatten()
    }
}

impl Drop for LoopHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

// ============================================================================
// Magnet Handle
// ============================================================================

/// Control over an attached pointer magnet
#[derive(Clone)]
pub struct MagnetHandle {
    handle: SchedulerHandle,
    id: MagnetId,
}

impl MagnetHandle {
    pub fn pointer_moved(&self, pointer: Point) {
        self.handle.with_inner(|inner| {
            if let Some(magnet) = inner.magnets.get_mut(self.id) {
                magnet.pointer_moved(pointer);
            }
        });
    }

    pub fn pointer_left(&self) {
        self.handle.with_inner(|inner| {
            if let Some(magnet) = inner.magnets.get_mut(self.id) {
                magnet.pointer_left();
            }
        });
    }

    /// Current displacement, `None` once detached
    pub fn displacement(&self) -> Option<Vec2> {
        self.handle
            .with_inner(|inner| inner.magnets.get(self.id).map(PointerMagnet::displacement))
            .flatten()
    }

    pub fn is_attached(&self) -> bool {
        self.displacement().is_some()
    }

    /// Detach the magnet; the element snaps back to rest on the next frame
    pub fn detach(&self) -> bool {
        self.handle
            .with_inner(|inner| {
                let Some(magnet) = inner.magnets.remove(self.id) else {
                    return false;
                };
                inner.pointer_resets.push(magnet.target());
                debug!("detached magnet {:?}", self.id);
                true
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::{EaseDirection, Easing};
    use crate::timeline::TimelineComposer;
    use glide_core::{PropertyMap, Rect};

    fn reveal(target: ElementId) -> AnimationDescriptor {
        AnimationDescriptor::from_to(
            target,
            PropertyMap::new().with(Property::Y, 50.0),
            PropertyMap::new().with(Property::Y, 0.0),
        )
        .duration(1000)
        .easing(Easing::Linear)
    }

    fn drift(target: ElementId) -> AnimationDescriptor {
        AnimationDescriptor::to(target, PropertyMap::new().with(Property::Y, -50.0))
            .duration(8000)
            .easing(Easing::Sine(EaseDirection::InOut))
            .loop_forever()
    }

    #[test]
    fn test_scheduler_creation() {
        let scheduler = AnimationScheduler::new();
        assert_eq!(scheduler.timeline_count(), 0);
        assert_eq!(scheduler.loop_count(), 0);
        assert!(!scheduler.has_active_animations());
    }

    #[test]
    fn test_timeline_plays_to_end() {
        let mut doc = Document::new();
        let el = doc.insert("title", &[], Rect::ZERO);
        let scheduler = AnimationScheduler::new();
        let timeline = TimelineComposer::new().then(reveal(el)).compose(&doc);
        let handle = scheduler.handle().register_timeline(timeline).unwrap();

        // Armed but not playing: the from-state is already rendered
        assert!(!scheduler.tick(16.0, &mut doc));
        assert_eq!(doc.computed(el, Property::Y), 50.0);

        assert!(handle.play());
        assert!(!handle.play());
        let mut frames = 0;
        while scheduler.tick(16.0, &mut doc) {
            frames += 1;
        }
        assert!(frames >= 60);
        assert_eq!(handle.state(), Some(PlayState::Finished));
        assert_eq!(doc.computed(el, Property::Y), 0.0);
    }

    #[test]
    fn test_cancel_takes_effect_before_next_tick() {
        let mut doc = Document::new();
        let el = doc.insert("title", &[], Rect::ZERO);
        let scheduler = AnimationScheduler::new();
        let timeline = TimelineComposer::new().then(reveal(el)).compose(&doc);
        let handle = scheduler.handle().register_timeline(timeline).unwrap();

        handle.play();
        scheduler.tick(500.0, &mut doc);
        handle.cancel();
        scheduler.tick(500.0, &mut doc);
        assert_eq!(doc.computed(el, Property::Y), 25.0);
        assert_eq!(handle.state(), Some(PlayState::Cancelled));
    }

    #[test]
    fn test_entrance_conflict() {
        let mut doc = Document::new();
        let el = doc.insert("card", &[], Rect::ZERO);
        let scheduler = AnimationScheduler::new();
        let handle = scheduler.handle();

        let first = handle
            .register_timeline(TimelineComposer::new().then(reveal(el)).compose(&doc))
            .unwrap();
        let second = handle.register_timeline(TimelineComposer::new().then(reveal(el)).compose(&doc));
        assert_eq!(second.err(), Some(AnimationError::EntranceConflict { target: el }));

        // Cancelling releases the element
        first.cancel();
        assert!(handle
            .register_timeline(TimelineComposer::new().then(reveal(el)).compose(&doc))
            .is_ok());
    }

    #[test]
    fn test_layers_compose_on_one_element() {
        let mut doc = Document::new();
        let el = doc.insert("orb", &[], Rect::new(0.0, 0.0, 100.0, 100.0));
        let scheduler = AnimationScheduler::new();
        let handle = scheduler.handle();

        let entrance = handle
            .register_timeline(TimelineComposer::new().then(reveal(el)).compose(&doc))
            .unwrap();
        let _ambient = handle.start_loop(drift(el)).unwrap();
        entrance.play();

        scheduler.tick(500.0, &mut doc);
        let entrance_y = doc.read(el, StyleLayer::Entrance, Property::Y);
        let ambient_y = doc.read(el, StyleLayer::Ambient, Property::Y);
        assert_eq!(entrance_y, 25.0);
        assert!(ambient_y < 0.0);
        assert!((doc.computed(el, Property::Y) - (entrance_y + ambient_y)).abs() < 1e-4);
    }

    #[test]
    fn test_loop_handle_drop_stops_loop() {
        let mut doc = Document::new();
        let el = doc.insert("orb", &[], Rect::ZERO);
        let scheduler = AnimationScheduler::new();

        let handle = scheduler.handle().start_loop(drift(el)).unwrap();
        assert!(handle.is_running());
        scheduler.tick(2000.0, &mut doc);
        let held = doc.read(el, StyleLayer::Ambient, Property::Y);
        drop(handle);

        assert_eq!(scheduler.loop_count(), 0);
        scheduler.tick(2000.0, &mut doc);
        assert_eq!(doc.read(el, StyleLayer::Ambient, Property::Y), held);
    }

    #[test]
    fn test_start_loop_rejects_finite() {
        let mut doc = Document::new();
        let el = doc.insert("orb", &[], Rect::ZERO);
        let scheduler = AnimationScheduler::new();
        let result = scheduler.handle().start_loop(reveal(el));
        assert!(matches!(result, Err(AnimationError::NotAmbient(_))));
    }

    #[test]
    fn test_magnet_detach_resets_pointer_layer() {
        let mut doc = Document::new();
        let el = doc.insert("btn", &[], Rect::new(0.0, 0.0, 200.0, 60.0));
        let scheduler = AnimationScheduler::new();
        let magnet = scheduler
            .handle()
            .attach_magnet(el, MagnetConfig::default())
            .unwrap();

        magnet.pointer_moved(Point::new(180.0, 30.0));
        assert!(scheduler.tick(16.0, &mut doc));
        assert!(magnet.displacement().is_some_and(|d| d.x > 0.0));

        assert!(magnet.detach());
        assert!(!magnet.is_attached());
        scheduler.tick(16.0, &mut doc);
        assert_eq!(doc.read(el, StyleLayer::Pointer, Property::X), 0.0);
        assert!(!scheduler.has_active_animations());
    }

    #[test]
    fn test_dropped_scheduler_handles_are_noops() {
        let mut doc = Document::new();
        let el = doc.insert("card", &[], Rect::ZERO);
        let scheduler = AnimationScheduler::new();
        let handle = scheduler.handle();
        let timeline = handle
            .register_timeline(TimelineComposer::new().then(reveal(el)).compose(&doc))
            .unwrap();
        drop(scheduler);

        assert!(!handle.is_alive());
        assert!(!timeline.play());
        assert_eq!(timeline.state(), None);
        assert!(!timeline.remove());
        let result = handle.register_timeline(TimelineComposer::new().then(reveal(el)).compose(&doc));
        assert_eq!(result.err(), Some(AnimationError::Detached("animation scheduler")));
    }
}
