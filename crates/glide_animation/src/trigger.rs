//! Viewport trigger tracking
//!
//! One [`ObservationService`] is shared by every trigger on the page. It
//! listens for scroll and resize only while it has subscribers: the first
//! subscription starts the listener and removing the last one stops it.
//!
//! Two kinds of subscription are supported:
//!
//! - **Visibility triggers** ([`ObserverHandle::observe`]) report a single
//!   [`TriggerEvent::Entered`] when at least `threshold` of a region is
//!   inside the viewport. Fire-once triggers are removed after firing; the
//!   others re-arm once the region has fully left the viewport.
//! - **Scroll offset watchers** ([`ObserverHandle::watch_scroll`]) report
//!   [`TriggerEvent::ScrollPast`] on subscription and on every change.
//!
//! Subscriptions are evaluated against the host immediately when created, so
//! a region that is already visible fires on the same tick without waiting
//! for a scroll event. Hosts that cannot observe visibility degrade to
//! "always entered".
//!
//! Callbacks run with no internal borrow held, so a callback may subscribe,
//! unsubscribe or play timelines freely.

use crate::error::{AnimationError, Result};
use glide_core::{ElementId, VisibilityProbe};
use slotmap::{new_key_type, SlotMap};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{debug, info, trace, warn};

/// Default visible fraction at which a region counts as entered
pub const DEFAULT_THRESHOLD: f32 = 0.8;

new_key_type! {
    /// Handle to a trigger or scroll subscription
    pub struct SubscriptionId;
}

/// Visibility trigger options
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerDescriptor {
    pub region: ElementId,
    /// Visible fraction in `(0, 1]`
    pub threshold: f32,
    pub fire_once: bool,
}

impl TriggerDescriptor {
    pub fn new(region: ElementId) -> Self {
        Self {
            region,
            threshold: DEFAULT_THRESHOLD,
            fire_once: true,
        }
    }

    /// Set the threshold, kept inside `(0, 1]`
    pub fn threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold.clamp(f32::EPSILON, 1.0);
        self
    }

    pub fn fire_once(mut self, fire_once: bool) -> Self {
        self.fire_once = fire_once;
        self
    }
}

/// Event delivered to a subscription callback
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TriggerEvent {
    /// The region crossed its visibility threshold
    Entered { region: ElementId, fraction: f32 },
    /// The page scroll moved across a watched offset
    ScrollPast { past: bool, offset_y: f32 },
}

/// Subscription callback
pub type TriggerCallback = Box<dyn FnMut(TriggerEvent)>;

#[derive(Clone, Copy, Debug)]
enum Watch {
    Visibility { trigger: TriggerDescriptor, armed: bool },
    ScrollOffset { offset_px: f32, past: Option<bool> },
}

struct Subscription {
    watch: Watch,
    /// Taken out while the callback runs
    callback: Option<TriggerCallback>,
}

struct ServiceInner {
    subscriptions: SlotMap<SubscriptionId, Subscription>,
    listening: bool,
    listener_starts: usize,
    events_delivered: usize,
}

impl ServiceInner {
    fn insert(&mut self, subscription: Subscription) -> SubscriptionId {
        let id = self.subscriptions.insert(subscription);
        if !self.listening {
            self.listening = true;
            self.listener_starts += 1;
            info!("viewport listener started");
        }
        id
    }

    fn remove(&mut self, id: SubscriptionId) -> bool {
        let removed = self.subscriptions.remove(id).is_some();
        if removed && self.subscriptions.is_empty() && self.listening {
            self.listening = false;
            info!("viewport listener stopped");
        }
        removed
    }
}

/// Shared scroll and visibility observation service
///
/// The page owns one service and hands [`ObserverHandle`]s to every
/// section. Call [`on_scroll`](Self::on_scroll) and
/// [`on_resize`](Self::on_resize) from the host's event handlers.
pub struct ObservationService {
    inner: Rc<RefCell<ServiceInner>>,
}

impl ObservationService {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ServiceInner {
                subscriptions: SlotMap::with_key(),
                listening: false,
                listener_starts: 0,
                events_delivered: 0,
            })),
        }
    }

    /// Get a weak handle for subscribing
    pub fn handle(&self) -> ObserverHandle {
        ObserverHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Scroll event from the host; returns the number of events delivered
    pub fn on_scroll(&self, probe: &dyn VisibilityProbe) -> usize {
        self.evaluate(probe)
    }

    /// Resize event from the host; returns the number of events delivered
    pub fn on_resize(&self, probe: &dyn VisibilityProbe) -> usize {
        self.evaluate(probe)
    }

    /// Re-evaluate every subscription against the host
    pub fn evaluate(&self, probe: &dyn VisibilityProbe) -> usize {
        let ids: Vec<SubscriptionId> = {
            let inner = self.inner.borrow();
            if !inner.listening {
                return 0;
            }
            inner.subscriptions.keys().collect()
        };
        ids.into_iter()
            .filter(|id| evaluate_subscription(&self.inner, *id, probe))
            .count()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscriptions.len()
    }

    /// Whether the scroll/resize listener is currently attached
    pub fn is_listening(&self) -> bool {
        self.inner.borrow().listening
    }

    /// How many times the listener has been started
    pub fn listener_starts(&self) -> usize {
        self.inner.borrow().listener_starts
    }

    /// Total events delivered to callbacks
    pub fn events_delivered(&self) -> usize {
        self.inner.borrow().events_delivered
    }
}

impl Default for ObservationService {
    fn default() -> Self {
        Self::new()
    }
}

/// A weak handle to the observation service
///
/// Subscribing through a handle whose service has been dropped fails with
/// [`AnimationError::Detached`]; unsubscribing is then a no-op.
#[derive(Clone)]
pub struct ObserverHandle {
    inner: Weak<RefCell<ServiceInner>>,
}

impl ObserverHandle {
    /// Subscribe to a region crossing its visibility threshold
    ///
    /// The trigger is checked against `probe` before returning, so the
    /// callback may already have run when this returns.
    pub fn observe(
        &self,
        trigger: TriggerDescriptor,
        probe: &dyn VisibilityProbe,
        callback: impl FnMut(TriggerEvent) + 'static,
    ) -> Result<SubscriptionId> {
        self.subscribe(
            Watch::Visibility {
                trigger,
                armed: true,
            },
            probe,
            Box::new(callback),
        )
    }

    /// Subscribe to the page scrolling past `offset_px`
    ///
    /// The current state is reported immediately, then on every change.
    pub fn watch_scroll(
        &self,
        offset_px: f32,
        probe: &dyn VisibilityProbe,
        callback: impl FnMut(TriggerEvent) + 'static,
    ) -> Result<SubscriptionId> {
        self.subscribe(
            Watch::ScrollOffset {
                offset_px,
                past: None,
            },
            probe,
            Box::new(callback),
        )
    }

    /// Remove a subscription; returns whether it was still registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.borrow_mut().remove(id))
            .unwrap_or(false)
    }

    /// Whether the subscription is still registered
    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.borrow().subscriptions.contains_key(id))
            .unwrap_or(false)
    }

    /// Check if the service is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    fn subscribe(
        &self,
        watch: Watch,
        probe: &dyn VisibilityProbe,
        callback: TriggerCallback,
    ) -> Result<SubscriptionId> {
        let inner = self
            .inner
            .upgrade()
            .ok_or(AnimationError::Detached("observation service"))?;
        let id = inner.borrow_mut().insert(Subscription {
            watch,
            callback: Some(callback),
        });
        debug!("subscribed {:?}", id);
        evaluate_subscription(&inner, id, probe);
        Ok(id)
    }
}

/// Check one subscription and run its callback if it fires
fn evaluate_subscription(
    inner: &Rc<RefCell<ServiceInner>>,
    id: SubscriptionId,
    probe: &dyn VisibilityProbe,
) -> bool {
    let (event, remove_after, mut callback) = {
        let mut guard = inner.borrow_mut();
        let Some(subscription) = guard.subscriptions.get_mut(id) else {
            return false;
        };
        let Some((event, remove_after)) = check(&mut subscription.watch, probe) else {
            return false;
        };
        let Some(callback) = subscription.callback.take() else {
            // Re-entrant evaluation from inside this subscription's callback
            return false;
        };
        guard.events_delivered += 1;
        (event, remove_after, callback)
    };

    trace!("delivering {:?} to {:?}", event, id);
    callback(event);

    let mut guard = inner.borrow_mut();
    if remove_after {
        guard.remove(id);
    } else if let Some(subscription) = guard.subscriptions.get_mut(id) {
        subscription.callback = Some(callback);
    }
    true
}

/// Update a watch against the host; returns the event to deliver, if any,
/// and whether the subscription is spent afterwards
fn check(watch: &mut Watch, probe: &dyn VisibilityProbe) -> Option<(TriggerEvent, bool)> {
    match watch {
        Watch::Visibility { trigger, armed } => {
            let fraction = if !probe.is_supported() {
                warn!("{}; treating {:?} as entered", AnimationError::UnsupportedObserver, trigger.region);
                1.0
            } else if let Some(fraction) = probe.visible_fraction(trigger.region) {
                fraction
            } else {
                warn!("trigger region {:?} does not exist; treating as entered", trigger.region);
                1.0
            };

            if !*armed {
                if fraction <= 0.0 {
                    trace!("re-arming trigger on {:?}", trigger.region);
                    *armed = true;
                }
                return None;
            }
            if fraction < trigger.threshold {
                return None;
            }
            *armed = false;
            let event = TriggerEvent::Entered {
                region: trigger.region,
                fraction,
            };
            Some((event, trigger.fire_once))
        }
        Watch::ScrollOffset { offset_px, past } => {
            let offset_y = probe.scroll_offset().y;
            let now = offset_y > *offset_px;
            if *past == Some(now) {
                return None;
            }
            *past = Some(now);
            Some((TriggerEvent::ScrollPast { past: now, offset_y }, false))
        }
    }
}
