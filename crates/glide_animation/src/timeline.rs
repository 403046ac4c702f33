//! Timeline composition and playback
//!
//! [`TimelineComposer`] collects steps and stagger groups, each positioned by
//! an [`Offset`], and resolves them once into a [`Timeline`]: a flat list of
//! steps with absolute start times. Relative offsets are measured from the
//! end of the previously appended step, so a negative offset overlaps the
//! tail of the previous step:
//!
//! ```rust
//! use glide_animation::{AnimationDescriptor, Offset, TimelineComposer};
//! use glide_core::{Document, Property, PropertyMap, Rect};
//!
//! let mut doc = Document::new();
//! let title = doc.insert("title", &["hero-title"], Rect::ZERO);
//! let subtitle = doc.insert("subtitle", &["hero-fade-up"], Rect::ZERO);
//! let fade_up = PropertyMap::new().with(Property::Opacity, 1.0);
//!
//! let timeline = TimelineComposer::new()
//!     .step(AnimationDescriptor::to(title, fade_up.clone()).duration(1000), Offset::Absolute(0))
//!     .step(AnimationDescriptor::to(subtitle, fade_up).duration(1000), Offset::RelativeToPrevious(-800))
//!     .compose(&doc);
//!
//! assert_eq!(timeline.steps()[1].start_ms, 200);
//! ```
//!
//! Playback is driven by the scheduler's frame tick. Steps only write to the
//! [`StyleLayer::Entrance`] layer of their target.

use crate::descriptor::AnimationDescriptor;
use crate::error::AnimationError;
use crate::stagger::{expand_for_layout, StaggerGroup, StaggerOrder};
use glide_core::{Document, ElementId, PropertyMap, StyleLayer};
use rustc_hash::FxHashSet;

/// Start position of a step within its timeline
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Offset {
    /// Milliseconds from the start of the timeline
    Absolute(u32),
    /// Signed milliseconds from the end of the previous step
    RelativeToPrevious(i32),
}

impl Offset {
    /// Start right after the previous step ends
    pub const AFTER_PREVIOUS: Offset = Offset::RelativeToPrevious(0);
}

impl Default for Offset {
    fn default() -> Self {
        Offset::AFTER_PREVIOUS
    }
}

/// A descriptor positioned within a timeline
#[derive(Clone, Debug)]
pub struct TimelineStep {
    pub descriptor: AnimationDescriptor,
    pub offset: Offset,
}

/// A step with its absolute start time resolved
#[derive(Clone, Debug)]
pub struct ResolvedStep {
    pub descriptor: AnimationDescriptor,
    /// Start time from the timeline start, delay included
    pub start_ms: u32,
}

impl ResolvedStep {
    pub fn end_ms(&self) -> u32 {
        let span = self.descriptor.active_span_ms().unwrap_or(0);
        self.start_ms.saturating_add(span)
    }
}

/// A step left out of the composed timeline
#[derive(Clone, Debug, PartialEq)]
pub struct SkippedStep {
    /// Position among the composer's expanded steps
    pub index: usize,
    pub reason: AnimationError,
}

/// Playback state of a timeline
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayState {
    /// Composed, not started
    Idle,
    Playing,
    /// Every step reached its end
    Finished,
    /// Halted; the timeline will not play again
    Cancelled,
}

impl PlayState {
    pub fn name(self) -> &'static str {
        match self {
            PlayState::Idle => "idle",
            PlayState::Playing => "playing",
            PlayState::Finished => "finished",
            PlayState::Cancelled => "cancelled",
        }
    }
}

enum Entry {
    Step(TimelineStep),
    Group { group: StaggerGroup, offset: Offset },
}

/// Builder that resolves steps into a [`Timeline`]
#[derive(Default)]
pub struct TimelineComposer {
    entries: Vec<Entry>,
    is_rtl: bool,
    stagger_order: StaggerOrder,
}

impl TimelineComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layout direction and mirrored-layout policy for stagger groups
    pub fn layout(mut self, is_rtl: bool, order: StaggerOrder) -> Self {
        self.is_rtl = is_rtl;
        self.stagger_order = order;
        self
    }

    /// Append a step at `offset`
    pub fn step(mut self, descriptor: AnimationDescriptor, offset: Offset) -> Self {
        self.entries.push(Entry::Step(TimelineStep { descriptor, offset }));
        self
    }

    /// Append a step right after the previous one
    pub fn then(self, descriptor: AnimationDescriptor) -> Self {
        self.step(descriptor, Offset::AFTER_PREVIOUS)
    }

    /// Append a stagger group whose first member starts at `offset`
    pub fn group(mut self, group: StaggerGroup, offset: Offset) -> Self {
        self.entries.push(Entry::Group { group, offset });
        self
    }

    /// Resolve every step against `document`
    pub fn compose(&self, document: &Document) -> Timeline {
        let mut resolver = Resolver::new(document);
        for entry in &self.entries {
            match entry {
                Entry::Step(step) => resolver.push_step(step),
                Entry::Group { group, offset } => {
                    let steps = expand_for_layout(group, self.is_rtl, self.stagger_order);
                    resolver.push_group(&steps, *offset);
                }
            }
        }
        resolver.finish()
    }
}

/// Resolve a flat list of steps into a timeline
pub fn compose(steps: Vec<TimelineStep>, document: &Document) -> Timeline {
    let mut resolver = Resolver::new(document);
    for step in &steps {
        resolver.push_step(step);
    }
    resolver.finish()
}

struct Resolver<'a> {
    document: &'a Document,
    /// End of the previously appended step (or group)
    previous_end: i64,
    index: usize,
    steps: Vec<ResolvedStep>,
    skipped: Vec<SkippedStep>,
    clamped: usize,
}

impl<'a> Resolver<'a> {
    fn new(document: &'a Document) -> Self {
        Self {
            document,
            previous_end: 0,
            index: 0,
            steps: Vec::new(),
            skipped: Vec::new(),
            clamped: 0,
        }
    }

    fn position(&self, offset: Offset) -> i64 {
        match offset {
            Offset::Absolute(ms) => i64::from(ms),
            Offset::RelativeToPrevious(delta) => self.previous_end + i64::from(delta),
        }
    }

    fn push_step(&mut self, step: &TimelineStep) {
        let base = self.position(step.offset);
        self.previous_end = self.place(&step.descriptor, base);
    }

    /// Members start at `base + stagger`; a negative base is clamped once
    /// for the whole group so the cascade keeps its spacing.
    fn push_group(&mut self, steps: &[TimelineStep], offset: Offset) {
        let base = self.position(offset);
        let base = self.clamp_start(self.index, base);
        let mut end = base;
        for step in steps {
            let stagger = match step.offset {
                Offset::Absolute(ms) => i64::from(ms),
                Offset::RelativeToPrevious(delta) => i64::from(delta),
            };
            end = end.max(self.place(&step.descriptor, base + stagger));
        }
        self.previous_end = end;
    }

    fn clamp_start(&mut self, step: usize, start: i64) -> i64 {
        if start >= 0 {
            return start;
        }
        tracing::warn!(
            "clamping to zero: {}",
            AnimationError::InvalidOffset {
                step,
                resolved_ms: start
            }
        );
        self.clamped += 1;
        0
    }

    /// Place one descriptor at `base`, returning where it ends
    ///
    /// Skipped steps still occupy their slot so the rest of the sequence
    /// keeps its timing.
    fn place(&mut self, descriptor: &AnimationDescriptor, base: i64) -> i64 {
        let index = self.index;
        self.index += 1;

        let start = self.clamp_start(index, base + i64::from(descriptor.delay_ms));
        let span = descriptor.active_span_ms().unwrap_or(0);
        let end = start + i64::from(span);

        let rejection = if descriptor.is_ambient() {
            Some(AnimationError::AmbientInTimeline(descriptor.target))
        } else if let Err(err) = descriptor.validate() {
            Some(err)
        } else if !self.document.contains(descriptor.target) {
            Some(AnimationError::MissingTarget(descriptor.target))
        } else {
            None
        };

        match rejection {
            Some(reason) => {
                tracing::warn!("skipping timeline step {}: {}", index, reason);
                self.skipped.push(SkippedStep { index, reason });
            }
            None => self.steps.push(ResolvedStep {
                descriptor: descriptor.clone(),
                start_ms: u32::try_from(start).unwrap_or(u32::MAX),
            }),
        }
        end
    }

    fn finish(self) -> Timeline {
        Timeline::new(self.steps, self.skipped, self.clamped)
    }
}

/// A resolved schedule of steps plus its playback cursor
///
/// The timeline owns the schedule only; element values live in the
/// [`Document`] and are written during [`Timeline::tick`].
#[derive(Clone, Debug)]
pub struct Timeline {
    steps: Vec<ResolvedStep>,
    skipped: Vec<SkippedStep>,
    clamped: usize,
    /// Step indices sorted by start time (stable for equal starts)
    play_order: Vec<usize>,
    duration_ms: u32,
    state: PlayState,
    elapsed_ms: f32,
    /// Start values captured when a `to`-only step first runs
    captured: Vec<Option<PropertyMap>>,
    needs_from_render: bool,
}

impl Timeline {
    fn new(steps: Vec<ResolvedStep>, skipped: Vec<SkippedStep>, clamped: usize) -> Self {
        let mut play_order: Vec<usize> = (0..steps.len()).collect();
        play_order.sort_by_key(|i| steps[*i].start_ms);
        let duration_ms = steps.iter().map(ResolvedStep::end_ms).max().unwrap_or(0);
        let captured = vec![None; steps.len()];
        Self {
            steps,
            skipped,
            clamped,
            play_order,
            duration_ms,
            state: PlayState::Idle,
            elapsed_ms: 0.0,
            captured,
            needs_from_render: true,
        }
    }

    /// Resolved steps in insertion order
    pub fn steps(&self) -> &[ResolvedStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Steps left out because of a missing target or invalid descriptor
    pub fn skipped(&self) -> &[SkippedStep] {
        &self.skipped
    }

    /// Number of steps whose negative start was clamped to zero
    pub fn clamped_count(&self) -> usize {
        self.clamped
    }

    /// Latest end time over all steps
    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    /// Distinct elements animated by this timeline
    pub fn targets(&self) -> Vec<ElementId> {
        let mut seen = FxHashSet::default();
        self.steps
            .iter()
            .map(|s| s.descriptor.target)
            .filter(|t| seen.insert(*t))
            .collect()
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    pub fn elapsed_ms(&self) -> f32 {
        self.elapsed_ms
    }

    /// Overall progress (0.0 to 1.0)
    pub fn progress(&self) -> f32 {
        match self.state {
            PlayState::Idle => 0.0,
            PlayState::Finished => 1.0,
            _ if self.duration_ms == 0 => 1.0,
            _ => (self.elapsed_ms / self.duration_ms as f32).clamp(0.0, 1.0),
        }
    }

    /// Start playing; a no-op while already playing
    ///
    /// A finished timeline restarts from the beginning. Returns whether
    /// playback (re)started.
    pub fn play(&mut self) -> bool {
        match self.state {
            PlayState::Playing => false,
            PlayState::Cancelled => {
                tracing::debug!("ignoring play() on a cancelled timeline");
                false
            }
            PlayState::Idle | PlayState::Finished => {
                self.state = PlayState::Playing;
                self.elapsed_ms = 0.0;
                self.captured.iter_mut().for_each(|c| *c = None);
                self.needs_from_render = true;
                true
            }
        }
    }

    /// Halt every step where it is; nothing is reset
    pub fn cancel(&mut self) {
        self.state = PlayState::Cancelled;
        self.needs_from_render = false;
    }

    /// Advance playback by `dt_ms` and write step values into `document`
    ///
    /// Returns true while the timeline needs further ticks.
    pub fn tick(&mut self, dt_ms: f32, document: &mut Document) -> bool {
        if self.needs_from_render && self.state != PlayState::Cancelled {
            self.render_from_states(document);
            self.needs_from_render = false;
        }
        if self.state != PlayState::Playing {
            return false;
        }

        self.elapsed_ms += dt_ms;
        self.render(document);

        if self.elapsed_ms >= self.duration_ms as f32 {
            self.state = PlayState::Finished;
            tracing::trace!("timeline finished after {}ms", self.elapsed_ms);
            return false;
        }
        true
    }

    /// Show explicit start values before the steps run
    ///
    /// Earlier steps win when several steps start the same property.
    fn render_from_states(&self, document: &mut Document) {
        for index in self.play_order.iter().rev() {
            let descriptor = &self.steps[*index].descriptor;
            for (property, value) in descriptor.from.iter() {
                document.write(descriptor.target, StyleLayer::Entrance, property, value);
            }
        }
    }

    fn render(&mut self, document: &mut Document) {
        for index in &self.play_order {
            let step = &self.steps[*index];
            let local = self.elapsed_ms - step.start_ms as f32;
            if local < 0.0 {
                continue;
            }
            let descriptor = &step.descriptor;
            let from = self.captured[*index].get_or_insert_with(|| {
                if descriptor.has_from() {
                    descriptor.from.clone()
                } else {
                    descriptor
                        .to
                        .properties()
                        .map(|p| (p, document.read(descriptor.target, StyleLayer::Entrance, p)))
                        .collect()
                }
            });
            for (property, value) in descriptor.values_at(from, local).iter() {
                document.write(descriptor.target, StyleLayer::Entrance, property, value);
            }
        }
    }
}
