//! Animation lifecycle scopes
//!
//! A page section mounts its motion inside [`with_scope`]. Every timeline,
//! trigger subscription, ambient loop and magnet created through the
//! [`AnimationScope`] is owned by it, and [`AnimationScope::teardown`]
//! releases all of them in one call when the section unmounts. Nothing
//! created in a scope outlives it.

use crate::descriptor::AnimationDescriptor;
use crate::error::{AnimationError, Result};
use crate::magnet::MagnetConfig;
use crate::scheduler::{LoopHandle, LoopId, MagnetHandle, SchedulerHandle, TimelineHandle};
use crate::timeline::Timeline;
use crate::trigger::{ObserverHandle, SubscriptionId, TriggerDescriptor, TriggerEvent};
use glide_core::{ElementId, VisibilityProbe};
use tracing::{debug, info, warn};

/// Run `body` inside a new scope and return the scope with the body's value
///
/// If `body` fails, everything it created so far is torn down before the
/// error is returned.
pub fn with_scope<T>(
    name: impl Into<String>,
    scheduler: &SchedulerHandle,
    observer: &ObserverHandle,
    body: impl FnOnce(&mut AnimationScope) -> Result<T>,
) -> Result<(AnimationScope, T)> {
    let mut scope = AnimationScope::new(name, scheduler.clone(), observer.clone());
    debug!("mounting scope `{}`", scope.name);
    let value = match body(&mut scope) {
        Ok(value) => value,
        Err(err) => {
            warn!("scope `{}` failed to mount: {}", scope.name, err);
            if let Err(teardown) = scope.teardown() {
                warn!("scope `{}`: {}", scope.name, teardown);
            }
            return Err(err);
        }
    };
    info!(
        "scope `{}` mounted: {} timelines, {} triggers, {} loops, {} magnets",
        scope.name,
        scope.timelines.len(),
        scope.subscriptions.len(),
        scope.loops.len(),
        scope.magnets.len()
    );
    Ok((scope, value))
}

/// Owner of every animation resource created for one page section
pub struct AnimationScope {
    name: String,
    scheduler: SchedulerHandle,
    observer: ObserverHandle,
    timelines: Vec<TimelineHandle>,
    subscriptions: Vec<SubscriptionId>,
    loops: Vec<LoopHandle>,
    magnets: Vec<MagnetHandle>,
    torn_down: bool,
}

impl AnimationScope {
    fn new(name: impl Into<String>, scheduler: SchedulerHandle, observer: ObserverHandle) -> Self {
        Self {
            name: name.into(),
            scheduler,
            observer,
            timelines: Vec::new(),
            subscriptions: Vec::new(),
            loops: Vec::new(),
            magnets: Vec::new(),
            torn_down: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Number of resources the scope currently owns
    pub fn resource_count(&self) -> usize {
        self.timelines.len() + self.subscriptions.len() + self.loops.len() + self.magnets.len()
    }

    pub fn timelines(&self) -> &[TimelineHandle] {
        &self.timelines
    }

    pub fn magnets(&self) -> &[MagnetHandle] {
        &self.magnets
    }

    /// Register a composed timeline with the scheduler
    pub fn timeline(&mut self, timeline: Timeline) -> Result<TimelineHandle> {
        let handle = self.scheduler.register_timeline(timeline)?;
        self.timelines.push(handle.clone());
        Ok(handle)
    }

    /// Play `timeline` when the trigger region enters the viewport
    ///
    /// If the region is already visible enough, playback starts before this
    /// returns.
    pub fn play_on_enter(
        &mut self,
        trigger: TriggerDescriptor,
        probe: &dyn VisibilityProbe,
        timeline: &TimelineHandle,
    ) -> Result<SubscriptionId> {
        let timeline = timeline.clone();
        self.observe(trigger, probe, move |event| {
            if let TriggerEvent::Entered { region, fraction } = event {
                debug!("{:?} entered at {:.2}; playing {:?}", region, fraction, timeline.id());
                timeline.play();
            }
        })
    }

    /// Subscribe a callback to a visibility trigger
    pub fn observe(
        &mut self,
        trigger: TriggerDescriptor,
        probe: &dyn VisibilityProbe,
        callback: impl FnMut(TriggerEvent) + 'static,
    ) -> Result<SubscriptionId> {
        let id = self.observer.observe(trigger, probe, callback)?;
        self.subscriptions.push(id);
        Ok(id)
    }

    /// Subscribe a callback to the page scrolling past `offset_px`
    pub fn watch_scroll(
        &mut self,
        offset_px: f32,
        probe: &dyn VisibilityProbe,
        callback: impl FnMut(TriggerEvent) + 'static,
    ) -> Result<SubscriptionId> {
        let id = self.observer.watch_scroll(offset_px, probe, callback)?;
        self.subscriptions.push(id);
        Ok(id)
    }

    /// Start an ambient loop that lives as long as the scope
    pub fn ambient(&mut self, descriptor: AnimationDescriptor) -> Result<LoopId> {
        let handle = self.scheduler.start_loop(descriptor)?;
        let id = handle.id();
        self.loops.push(handle);
        Ok(id)
    }

    /// Stop one of the scope's loops before teardown
    ///
    /// The target keeps its current interpolated values. Returns whether the
    /// loop belonged to this scope and was still running.
    pub fn stop_loop(&mut self, id: LoopId) -> bool {
        let Some(index) = self.loops.iter().position(|l| l.id() == id) else {
            return false;
        };
        self.loops.swap_remove(index).stop()
    }

    /// Attach a pointer magnet that lives as long as the scope
    pub fn magnet(&mut self, target: ElementId, config: MagnetConfig) -> Result<MagnetHandle> {
        let handle = self.scheduler.attach_magnet(target, config)?;
        self.magnets.push(handle.clone());
        Ok(handle)
    }

    /// Release every resource owned by the scope
    ///
    /// Timelines are cancelled where they are, triggers unsubscribed, loops
    /// stopped and magnets detached. Calling this again is a no-op. If the
    /// scheduler or observation service is already gone, the resources it
    /// held are reported once as a single [`AnimationError::Teardown`].
    pub fn teardown(&mut self) -> Result<()> {
        if self.torn_down {
            debug!("scope `{}` already torn down", self.name);
            return Ok(());
        }
        self.torn_down = true;

        let total = self.resource_count();
        let mut failed = if self.scheduler.is_alive() {
            0
        } else {
            total - self.subscriptions.len()
        };

        for timeline in self.timelines.drain(..) {
            timeline.cancel();
            timeline.remove();
        }
        for mut ambient in self.loops.drain(..) {
            ambient.stop();
        }
        for magnet in self.magnets.drain(..) {
            magnet.detach();
        }

        if self.observer.is_alive() {
            for id in self.subscriptions.drain(..) {
                // Spent fire-once triggers are already gone
                self.observer.unsubscribe(id);
            }
        } else {
            failed += self.subscriptions.len();
            self.subscriptions.clear();
        }

        if failed > 0 {
            return Err(AnimationError::Teardown { failed, total });
        }
        info!("scope `{}` torn down ({} resources)", self.name, total);
        Ok(())
    }
}

impl Drop for AnimationScope {
    fn drop(&mut self) {
        if let Err(err) = self.teardown() {
            warn!("scope `{}` dropped: {}", self.name, err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::{EaseDirection, Easing};
    use crate::scheduler::AnimationScheduler;
    use crate::timeline::{PlayState, TimelineComposer};
    use crate::trigger::ObservationService;
    use glide_core::{Document, PageView, Point, Property, PropertyMap, Rect, StyleLayer, Viewport};

    struct Page {
        doc: Document,
        viewport: Viewport,
        scheduler: AnimationScheduler,
        service: ObservationService,
        title: ElementId,
        orb: ElementId,
        button: ElementId,
    }

    fn page() -> Page {
        let mut doc = Document::new();
        let title = doc.insert("about-title", &["about-title"], Rect::new(0.0, 1200.0, 1000.0, 100.0));
        let orb = doc.insert("orb", &["ambient-orb-1"], Rect::new(0.0, 1000.0, 400.0, 400.0));
        let button = doc.insert("cta", &["hero-btn"], Rect::new(100.0, 500.0, 200.0, 60.0));
        Page {
            doc,
            viewport: Viewport::new(1000.0, 800.0),
            scheduler: AnimationScheduler::new(),
            service: ObservationService::new(),
            title,
            orb,
            button,
        }
    }

    fn reveal(target: ElementId) -> AnimationDescriptor {
        AnimationDescriptor::from_to(
            target,
            PropertyMap::new().with(Property::Y, 50.0).with(Property::Opacity, 0.0),
            PropertyMap::new().with(Property::Y, 0.0).with(Property::Opacity, 1.0),
        )
        .duration(1000)
        .easing(Easing::power(3, EaseDirection::Out))
    }

    fn drift(target: ElementId) -> AnimationDescriptor {
        AnimationDescriptor::to(target, PropertyMap::new().with(Property::Y, -50.0))
            .duration(8000)
            .easing(Easing::Sine(EaseDirection::InOut))
            .loop_forever()
    }

    fn mount(p: &Page) -> Result<AnimationScope> {
        let view = PageView::new(&p.doc, &p.viewport);
        with_scope("about", &p.scheduler.handle(), &p.service.handle(), |scope| {
            let timeline = scope.timeline(TimelineComposer::new().then(reveal(p.title)).compose(&p.doc))?;
            scope.play_on_enter(TriggerDescriptor::new(p.title), &view, &timeline)?;
            scope.ambient(drift(p.orb))?;
            scope.magnet(p.button, MagnetConfig::default())?;
            Ok(())
        })
        .map(|(scope, ())| scope)
    }

    #[test]
    fn test_scope_owns_everything_created() {
        let p = page();
        let scope = mount(&p).unwrap();
        assert_eq!(scope.resource_count(), 4);
        assert_eq!(p.scheduler.timeline_count(), 1);
        assert_eq!(p.scheduler.loop_count(), 1);
        assert_eq!(p.scheduler.magnet_count(), 1);
        assert!(p.service.is_listening());
    }

    #[test]
    fn test_teardown_releases_everything() {
        let mut p = page();
        let mut scope = mount(&p).unwrap();
        scope.magnets()[0].pointer_moved(Point::new(290.0, 530.0));
        p.scheduler.tick(16.0, &mut p.doc);

        scope.teardown().unwrap();
        assert!(scope.is_torn_down());
        assert_eq!(scope.resource_count(), 0);
        assert_eq!(p.scheduler.timeline_count(), 0);
        assert_eq!(p.scheduler.loop_count(), 0);
        assert_eq!(p.scheduler.magnet_count(), 0);
        assert_eq!(p.service.subscriber_count(), 0);
        assert!(!p.service.is_listening());

        // Detached magnets release the pointer layer on the next frame
        p.scheduler.tick(16.0, &mut p.doc);
        assert_eq!(p.doc.read(p.button, StyleLayer::Pointer, Property::X), 0.0);
    }

    #[test]
    fn test_stop_loop_before_teardown() {
        let mut p = page();
        let (mut scope, orb_loop) =
            with_scope("orbs", &p.scheduler.handle(), &p.service.handle(), |scope| {
                scope.ambient(drift(p.orb))
            })
            .unwrap();
        p.scheduler.tick(1000.0, &mut p.doc);
        let held = p.doc.read(p.orb, StyleLayer::Ambient, Property::Y);
        assert!(held < 0.0);

        assert!(scope.stop_loop(orb_loop));
        assert!(!scope.stop_loop(orb_loop));
        assert_eq!(scope.resource_count(), 0);
        assert_eq!(p.scheduler.loop_count(), 0);

        p.scheduler.tick(1000.0, &mut p.doc);
        assert_eq!(p.doc.read(p.orb, StyleLayer::Ambient, Property::Y), held);
        assert!(scope.teardown().is_ok());
    }

    #[test]
    fn test_double_teardown_is_noop() {
        let p = page();
        let mut scope = mount(&p).unwrap();
        assert!(scope.teardown().is_ok());
        assert!(scope.teardown().is_ok());
        assert_eq!(p.service.listener_starts(), 1);
    }

    #[test]
    fn test_visible_region_plays_on_mount() {
        let mut p = page();
        // 90% of the title visible
        p.viewport.scroll_to(490.0);
        let scope = mount(&p).unwrap();
        assert_eq!(scope.timelines()[0].state(), Some(PlayState::Playing));

        p.scheduler.tick(16.0, &mut p.doc);
        assert!(p.doc.computed(p.title, Property::Opacity) > 0.0);
    }

    #[test]
    fn test_hidden_region_waits_for_scroll() {
        let mut p = page();
        let scope = mount(&p).unwrap();
        let timeline = scope.timelines()[0].clone();

        p.scheduler.tick(16.0, &mut p.doc);
        assert_eq!(timeline.state(), Some(PlayState::Idle));
        // Pre-reveal state is rendered while waiting
        assert_eq!(p.doc.computed(p.title, Property::Opacity), 0.0);

        p.viewport.scroll_to(600.0);
        p.service.on_scroll(&PageView::new(&p.doc, &p.viewport));
        assert!(timeline.is_playing());
    }

    #[test]
    fn test_failed_body_tears_down() {
        let p = page();
        let result = with_scope("broken", &p.scheduler.handle(), &p.service.handle(), |scope| {
            scope.ambient(drift(p.orb))?;
            scope.ambient(reveal(p.orb))?;
            Ok(())
        });
        assert!(matches!(result, Err(AnimationError::NotAmbient(_))));
        assert_eq!(p.scheduler.loop_count(), 0);
    }

    #[test]
    fn test_drop_tears_down() {
        let p = page();
        drop(mount(&p).unwrap());
        assert_eq!(p.scheduler.timeline_count(), 0);
        assert_eq!(p.service.subscriber_count(), 0);
    }

    #[test]
    fn test_teardown_after_scheduler_dropped_reports_once() {
        let p = page();
        let mut scope = mount(&p).unwrap();
        let Page { scheduler, service, .. } = p;
        drop(scheduler);

        assert_eq!(
            scope.teardown(),
            Err(AnimationError::Teardown { failed: 3, total: 4 })
        );
        assert!(scope.teardown().is_ok());
        assert!(!service.is_listening());
    }
}
