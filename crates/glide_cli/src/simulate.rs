//! Frame-by-frame landing page simulation
//!
//! Mounts every section, replays a scroll and pointer script against the
//! frame clock, then unmounts and reports what each element ended up
//! showing.

use crate::page::LandingPage;
use crate::sections::{mount_about, mount_header, mount_hero};
use anyhow::{Context, Result};
use glide_animation::{AnimationScheduler, MotionConfig, ObservationService, TimelineHandle};
use glide_core::{PageView, Point, Property};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

/// Scripted input for one run
#[derive(Clone, Debug)]
pub struct SimulateOptions {
    pub frames: u32,
    /// Scroll distance applied before every frame (px)
    pub scroll_per_frame: f32,
    /// Pointer position held over the first half of the run
    pub pointer: Option<Point>,
    pub is_rtl: bool,
}

impl Default for SimulateOptions {
    fn default() -> Self {
        Self {
            frames: 240,
            scroll_per_frame: 8.0,
            pointer: None,
            is_rtl: false,
        }
    }
}

/// Parse a pointer position given as `X,Y`
pub fn parse_pointer(value: &str) -> Result<Point> {
    let (x, y) = value
        .split_once(',')
        .with_context(|| format!("Invalid pointer '{}', expected X,Y", value))?;
    let x = x.trim().parse().with_context(|| format!("Invalid pointer x '{}'", x))?;
    let y = y.trim().parse().with_context(|| format!("Invalid pointer y '{}'", y))?;
    Ok(Point::new(x, y))
}

#[derive(Debug, Serialize)]
pub struct ElementReport {
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub opacity: f32,
    pub blur: f32,
}

#[derive(Debug, Serialize)]
pub struct TimelineReport {
    pub name: &'static str,
    pub state: &'static str,
    pub progress: f32,
}

#[derive(Debug, Serialize)]
pub struct ObserverReport {
    pub listener_starts: usize,
    pub events_delivered: usize,
    pub subscribers: usize,
}

#[derive(Debug, Serialize)]
pub struct TeardownReport {
    pub errors: Vec<String>,
    pub timelines_left: usize,
    pub loops_left: usize,
    pub magnets_left: usize,
    pub listening: bool,
}

/// Final state of a simulation run
#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub frames: u32,
    pub elapsed_ms: f32,
    pub scroll_y: f32,
    pub rtl: bool,
    pub header_compact: bool,
    pub timelines: Vec<TimelineReport>,
    pub elements: Vec<ElementReport>,
    pub observer: ObserverReport,
    pub teardown: TeardownReport,
}

fn timeline_report(name: &'static str, handle: &TimelineHandle) -> TimelineReport {
    TimelineReport {
        name,
        state: handle.state().map_or("removed", |s| s.name()),
        progress: handle.progress(),
    }
}

/// Run the landing page for `options.frames` frames
pub fn run(options: &SimulateOptions, config: &MotionConfig) -> Result<SimulationReport> {
    let mut page = LandingPage::build(options.is_rtl)?;
    let scheduler = AnimationScheduler::new();
    let service = ObservationService::new();
    let (animations, observer) = (scheduler.handle(), service.handle());

    let mut header = mount_header(&page, &animations, &observer).context("Failed to mount header")?;
    let mut hero = mount_hero(&page, &animations, &observer, config).context("Failed to mount hero")?;
    let mut about =
        mount_about(&page, &animations, &observer, config).context("Failed to mount about section")?;

    let pointer_frames = options.pointer.map_or(0, |_| options.frames / 2);
    for frame in 0..options.frames {
        if let Some(pointer) = options.pointer {
            for magnet in &hero.magnets {
                if frame < pointer_frames {
                    magnet.pointer_moved(pointer);
                } else if frame == pointer_frames {
                    magnet.pointer_left();
                }
            }
        }

        if options.scroll_per_frame != 0.0 {
            page.viewport.scroll_by(options.scroll_per_frame);
            let delivered = service.on_scroll(&PageView::new(&page.document, &page.viewport));
            if delivered > 0 {
                debug!("frame {}: {} trigger events", frame, delivered);
            }
        }

        scheduler.tick(config.frame.frame_ms, &mut page.document);
    }

    let mut elements = Vec::new();
    for id in page.animated_elements() {
        let doc = &page.document;
        elements.push(ElementReport {
            name: page.name(id)?.to_string(),
            x: doc.computed(id, Property::X),
            y: doc.computed(id, Property::Y),
            scale: doc.computed(id, Property::Scale),
            opacity: doc.computed(id, Property::Opacity),
            blur: doc.computed(id, Property::Blur),
        });
    }
    let timelines = vec![
        timeline_report("hero intro", &hero.timeline),
        timeline_report("about title", &about.title),
        timeline_report("about cards", &about.cards),
    ];
    let observer_report = ObserverReport {
        listener_starts: service.listener_starts(),
        events_delivered: service.events_delivered(),
        subscribers: service.subscriber_count(),
    };
    let header_compact = header.is_compact();

    let mut errors = Vec::new();
    for scope in [&mut header.scope, &mut hero.scope, &mut about.scope] {
        if let Err(err) = scope.teardown() {
            warn!("{} teardown: {}", scope.name(), err);
            errors.push(format!("{}: {}", scope.name(), err));
        }
    }
    // Let detached magnets release their pointer offsets
    scheduler.tick(config.frame.frame_ms, &mut page.document);

    let teardown = TeardownReport {
        errors,
        timelines_left: scheduler.timeline_count(),
        loops_left: scheduler.loop_count(),
        magnets_left: scheduler.magnet_count(),
        listening: service.is_listening(),
    };
    info!("Simulated {} frames", options.frames);

    Ok(SimulationReport {
        frames: options.frames,
        elapsed_ms: options.frames as f32 * config.frame.frame_ms,
        scroll_y: page.viewport.scroll.y,
        rtl: options.is_rtl,
        header_compact,
        timelines,
        elements,
        observer: observer_report,
        teardown,
    })
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Simulated {} frames ({:.0}ms), scrolled to {:.0}px{}",
            self.frames,
            self.elapsed_ms,
            self.scroll_y,
            if self.rtl { " (rtl)" } else { "" }
        )?;
        writeln!(
            f,
            "Header: {}",
            if self.header_compact { "compact" } else { "expanded" }
        )?;

        writeln!(f, "\nTimelines:")?;
        for t in &self.timelines {
            writeln!(f, "  {:<14} {:<10} {:>5.1}%", t.name, t.state, t.progress * 100.0)?;
        }

        writeln!(f, "\nElements:")?;
        writeln!(
            f,
            "  {:<16} {:>8} {:>8} {:>6} {:>8} {:>6}",
            "name", "x", "y", "scale", "opacity", "blur"
        )?;
        for e in &self.elements {
            writeln!(
                f,
                "  {:<16} {:>8.2} {:>8.2} {:>6.2} {:>8.2} {:>6.2}",
                e.name, e.x, e.y, e.scale, e.opacity, e.blur
            )?;
        }

        writeln!(
            f,
            "\nObserver: {} listener start(s), {} event(s) delivered, {} subscriber(s) before unmount",
            self.observer.listener_starts, self.observer.events_delivered, self.observer.subscribers
        )?;

        let t = &self.teardown;
        write!(
            f,
            "Teardown: {} timelines, {} loops, {} magnets left; listener {}",
            t.timelines_left,
            t.loops_left,
            t.magnets_left,
            if t.listening { "still attached" } else { "detached" }
        )?;
        for err in &t.errors {
            write!(f, "\n  error: {}", err)?;
        }
        Ok(())
    }
}
