//! Section motion
//!
//! Mounts the motion of each landing page section inside its own scope.
//! Sections take their element handles from [`LandingPage`] and never look
//! elements up themselves.

use crate::page::LandingPage;
use glide_animation::{
    with_scope, AnimationDescriptor, AnimationScope, EaseDirection, Easing, MagnetHandle,
    MotionConfig, ObserverHandle, Offset, Result, SchedulerHandle, StaggerGroup, TimelineComposer,
    TimelineHandle, TriggerEvent,
};
use glide_core::{ElementId, PageView, Property, PropertyMap};
use std::cell::Cell;
use std::rc::Rc;
use tracing::debug;

/// Scroll offset past which the header switches to its compact state
pub const HEADER_COMPACT_OFFSET: f32 = 20.0;

/// Visible fraction of the about grid that reveals the cards
pub const CARD_THRESHOLD: f32 = 0.75;

fn reveal(from: PropertyMap, to: PropertyMap, duration_ms: u32, easing: Easing) -> AnimationDescriptor {
    AnimationDescriptor::from_to(ElementId::default(), from, to)
        .duration(duration_ms)
        .easing(easing)
}

fn power3_out() -> Easing {
    Easing::power(3, EaseDirection::Out)
}

// ============================================================================
// Header
// ============================================================================

pub struct HeaderMotion {
    pub scope: AnimationScope,
    compact: Rc<Cell<bool>>,
}

impl HeaderMotion {
    pub fn is_compact(&self) -> bool {
        self.compact.get()
    }
}

pub fn mount_header(
    page: &LandingPage,
    scheduler: &SchedulerHandle,
    observer: &ObserverHandle,
) -> Result<HeaderMotion> {
    let compact = Rc::new(Cell::new(false));
    let probe = PageView::new(&page.document, &page.viewport);
    let state = compact.clone();
    let bar = page.header.bar;
    let (scope, _) = with_scope("header", scheduler, observer, |scope| {
        scope.watch_scroll(HEADER_COMPACT_OFFSET, &probe, move |event| {
            if let TriggerEvent::ScrollPast { past, offset_y } = event {
                debug!("header {:?} compact={} at {}px", bar, past, offset_y);
                state.set(past);
            }
        })
    })?;
    Ok(HeaderMotion { scope, compact })
}

// ============================================================================
// Hero
// ============================================================================

pub struct HeroMotion {
    pub scope: AnimationScope,
    pub timeline: TimelineHandle,
    pub magnets: Vec<MagnetHandle>,
}

/// Intro sequence: headline, then badge and subtitle overlapping its tail,
/// then the buttons springing in
pub fn hero_timeline(page: &LandingPage) -> TimelineComposer {
    let hidden = |y: f32| PropertyMap::new().with(Property::Y, y).with(Property::Opacity, 0.0);
    let shown = PropertyMap::new().with(Property::Y, 0.0).with(Property::Opacity, 1.0);

    let text = StaggerGroup::new(
        page.hero.text.clone(),
        reveal(hidden(50.0), shown.clone(), 1000, power3_out()).delay(200),
        0,
    );
    let fade_up = StaggerGroup::new(
        page.hero.fade_up.clone(),
        reveal(
            hidden(40.0).with(Property::Blur, 10.0),
            shown.with(Property::Blur, 0.0),
            1000,
            power3_out(),
        ),
        200,
    );
    let buttons = StaggerGroup::new(
        page.hero.buttons.clone(),
        reveal(
            PropertyMap::new().with(Property::Scale, 0.8).with(Property::Opacity, 0.0),
            PropertyMap::new().with(Property::Scale, 1.0).with(Property::Opacity, 1.0),
            800,
            Easing::back_out(1.7),
        ),
        100,
    );

    TimelineComposer::new()
        .group(text, Offset::Absolute(0))
        .group(fade_up, Offset::RelativeToPrevious(-800))
        .group(buttons, Offset::RelativeToPrevious(-600))
}

/// Mount the hero; its intro plays immediately
pub fn mount_hero(
    page: &LandingPage,
    scheduler: &SchedulerHandle,
    observer: &ObserverHandle,
    config: &MotionConfig,
) -> Result<HeroMotion> {
    let (scope, (timeline, magnets)) = with_scope("hero", scheduler, observer, |scope| {
        let intro = scope.timeline(hero_timeline(page).compose(&page.document))?;
        intro.play();
        let magnets = page
            .hero
            .buttons
            .iter()
            .map(|button| scope.magnet(*button, config.magnet))
            .collect::<Result<Vec<_>>>()?;
        Ok((intro, magnets))
    })?;
    Ok(HeroMotion {
        scope,
        timeline,
        magnets,
    })
}

// ============================================================================
// About
// ============================================================================

pub struct AboutMotion {
    pub scope: AnimationScope,
    pub title: TimelineHandle,
    pub cards: TimelineHandle,
}

/// Mount the about section: title and card reveals wait for their regions,
/// the orbs drift from the start
pub fn mount_about(
    page: &LandingPage,
    scheduler: &SchedulerHandle,
    observer: &ObserverHandle,
    config: &MotionConfig,
) -> Result<AboutMotion> {
    let probe = PageView::new(&page.document, &page.viewport);
    let about = &page.about;

    let (scope, (title, cards)) = with_scope("about", scheduler, observer, |scope| {
        let title = TimelineComposer::new()
            .then(
                AnimationDescriptor::from_to(
                    about.title,
                    PropertyMap::new().with(Property::Y, 50.0).with(Property::Opacity, 0.0),
                    PropertyMap::new().with(Property::Y, 0.0).with(Property::Opacity, 1.0),
                )
                .duration(1000)
                .easing(power3_out()),
            )
            .compose(&page.document);
        let title = scope.timeline(title)?;

        let cards = StaggerGroup::new(
            about.cards.clone(),
            reveal(
                PropertyMap::new().with(Property::Y, 100.0).with(Property::Opacity, 0.0),
                PropertyMap::new().with(Property::Y, 0.0).with(Property::Opacity, 1.0),
                1000,
                power3_out(),
            ),
            config.stagger.increment_ms,
        );
        let cards = TimelineComposer::new()
            .layout(page.is_rtl, config.stagger.order)
            .group(cards, Offset::Absolute(0))
            .compose(&page.document);
        let cards = scope.timeline(cards)?;

        scope.play_on_enter(config.trigger.descriptor(about.section), &probe, &title)?;
        scope.play_on_enter(
            config.trigger.descriptor(about.grid).threshold(CARD_THRESHOLD),
            &probe,
            &cards,
        )?;

        let drift = |target, y: f32, x: f32, duration_ms| {
            AnimationDescriptor::to(target, PropertyMap::new().with(Property::Y, y).with(Property::X, x))
                .duration(duration_ms)
                .easing(Easing::Sine(EaseDirection::InOut))
                .loop_forever()
        };
        scope.ambient(drift(about.orbs[0], -50.0, 30.0, 8000))?;
        scope.ambient(drift(about.orbs[1], 60.0, -40.0, 10_000).delay(1000))?;

        Ok((title, cards))
    })?;

    Ok(AboutMotion { scope, title, cards })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glide_animation::{AnimationScheduler, ObservationService, PlayState};
    use glide_core::{StyleLayer, VisibilityProbe};

    struct Host {
        page: LandingPage,
        scheduler: AnimationScheduler,
        service: ObservationService,
        config: MotionConfig,
    }

    fn host(rtl: bool) -> Host {
        Host {
            page: LandingPage::build(rtl).unwrap(),
            scheduler: AnimationScheduler::new(),
            service: ObservationService::new(),
            config: MotionConfig::default(),
        }
    }

    impl Host {
        fn scroll_to(&mut self, y: f32) {
            self.page.viewport.scroll_to(y);
            self.service
                .on_scroll(&PageView::new(&self.page.document, &self.page.viewport));
        }

        fn run(&mut self, ms: f32) {
            let mut left = ms;
            while left > 0.0 {
                self.scheduler.tick(16.0, &mut self.page.document);
                left -= 16.0;
            }
        }
    }

    #[test]
    fn test_hero_sequence_offsets() {
        let h = host(false);
        let timeline = hero_timeline(&h.page).compose(&h.page.document);
        let starts: Vec<u32> = timeline.steps().iter().map(|s| s.start_ms).collect();
        assert_eq!(starts, vec![200, 200, 400, 600, 1000, 1100]);
        assert_eq!(timeline.duration_ms(), 1900);
    }

    #[test]
    fn test_hero_plays_on_mount_and_completes() {
        let mut h = host(false);
        let hero = mount_hero(&h.page, &h.scheduler.handle(), &h.service.handle(), &h.config).unwrap();
        assert!(hero.timeline.is_playing());
        assert_eq!(hero.magnets.len(), 2);

        h.run(2000.0);
        assert_eq!(hero.timeline.state(), Some(PlayState::Finished));
        for id in h.page.hero.fade_up.iter().chain(&h.page.hero.buttons) {
            assert_eq!(h.page.document.computed(*id, Property::Opacity), 1.0);
        }
        assert_eq!(h.page.document.computed(h.page.hero.fade_up[0], Property::Blur), 0.0);
    }

    #[test]
    fn test_header_compacts_past_offset() {
        let mut h = host(false);
        let header = mount_header(&h.page, &h.scheduler.handle(), &h.service.handle()).unwrap();
        assert!(!header.is_compact());
        h.scroll_to(21.0);
        assert!(header.is_compact());
        h.scroll_to(0.0);
        assert!(!header.is_compact());
    }

    #[test]
    fn test_about_waits_for_scroll() {
        let mut h = host(false);
        let about = mount_about(&h.page, &h.scheduler.handle(), &h.service.handle(), &h.config).unwrap();
        h.run(100.0);
        assert_eq!(about.title.state(), Some(PlayState::Idle));
        assert_eq!(h.page.document.computed(h.page.about.title, Property::Opacity), 0.0);
        // Orbs drift regardless of scroll
        assert!(h.page.document.read(h.page.about.orbs[0], StyleLayer::Ambient, Property::Y) < 0.0);

        h.scroll_to(900.0);
        assert!(about.title.is_playing());
        let view = PageView::new(&h.page.document, &h.page.viewport);
        assert!(view.is_element_visible(h.page.about.grid, CARD_THRESHOLD));
        assert!(about.cards.is_playing());
    }

    #[test]
    fn test_cards_follow_reading_order_in_rtl() {
        let mut h = host(true);
        let about = mount_about(&h.page, &h.scheduler.handle(), &h.service.handle(), &h.config).unwrap();
        let starts: Vec<u32> = about
            .cards
            .with_timeline(|t| t.steps().iter().map(|s| s.start_ms).collect())
            .unwrap();
        assert_eq!(starts, vec![0, 100, 200, 300, 400, 500]);
    }

    #[test]
    fn test_unmount_releases_section() {
        let h = host(false);
        let scheduler = h.scheduler.handle();
        let observer = h.service.handle();
        let mut about = mount_about(&h.page, &scheduler, &observer, &h.config).unwrap();
        assert_eq!(h.scheduler.loop_count(), 2);
        assert!(h.service.is_listening());

        about.scope.teardown().unwrap();
        about.scope.teardown().unwrap();
        assert_eq!(h.scheduler.loop_count(), 0);
        assert_eq!(h.scheduler.timeline_count(), 0);
        assert!(!h.service.is_listening());
    }
}
