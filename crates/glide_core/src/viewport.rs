//! Viewport state and visibility queries
//!
//! The [`VisibilityProbe`] trait is the passive query surface the trigger
//! service polls on scroll and resize. [`PageView`] implements it over a
//! [`Document`] and a [`Viewport`].

use crate::document::{Document, ElementId};
use crate::geometry::{Point, Rect, Size};

/// The visible window onto the page
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Scroll offset of the window's top-left corner
    pub scroll: Point,
    pub size: Size,
    /// Whether the host can report element visibility at all
    pub observation_supported: bool,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            scroll: Point::ZERO,
            size: Size::new(width, height),
            observation_supported: true,
        }
    }

    /// A host without visibility observation
    pub fn without_observation(mut self) -> Self {
        self.observation_supported = false;
        self
    }

    /// The visible part of the page in page coordinates
    pub fn visible_rect(&self) -> Rect {
        Rect::from_origin_size(self.scroll, self.size)
    }

    pub fn scroll_to(&mut self, y: f32) {
        self.scroll.y = y.max(0.0);
    }

    pub fn scroll_by(&mut self, dy: f32) {
        self.scroll_to(self.scroll.y + dy);
    }

    pub fn resize(&mut self, size: Size) {
        self.size = size;
    }
}

/// Fraction of `region` inside `visible`, in `[0, 1]`
///
/// The overlap is measured against the largest overlap the region can ever
/// have, clamped per axis. A section taller or wider than the window counts
/// as fully visible once it spans the window along that axis. Degenerate
/// (zero-area) regions are either fully visible or not at all.
pub fn visible_fraction(region: &Rect, visible: &Rect) -> f32 {
    if region.area() <= 0.0 {
        return if visible.contains(region.origin) { 1.0 } else { 0.0 };
    }
    let Some(overlap) = region.intersect(visible) else {
        return 0.0;
    };
    let reference = region.width().min(visible.width()).max(0.0)
        * region.height().min(visible.height()).max(0.0);
    if reference <= 0.0 {
        return 0.0;
    }
    (overlap.area() / reference).clamp(0.0, 1.0)
}

/// Host query surface for visibility-driven triggers
pub trait VisibilityProbe {
    /// Whether the host can observe element visibility
    fn is_supported(&self) -> bool {
        true
    }

    /// Visible fraction of `region`, or `None` if the region does not exist
    fn visible_fraction(&self, region: ElementId) -> Option<f32>;

    /// Current scroll offset of the page
    fn scroll_offset(&self) -> Point;

    /// Whether at least `threshold` of `region` is inside the viewport
    fn is_element_visible(&self, region: ElementId, threshold: f32) -> bool {
        self.visible_fraction(region)
            .map(|fraction| fraction >= threshold)
            .unwrap_or(false)
    }
}

/// Borrowed view of a document through a viewport
#[derive(Clone, Copy)]
pub struct PageView<'a> {
    pub document: &'a Document,
    pub viewport: &'a Viewport,
}

impl<'a> PageView<'a> {
    pub fn new(document: &'a Document, viewport: &'a Viewport) -> Self {
        Self { document, viewport }
    }
}

impl VisibilityProbe for PageView<'_> {
    fn is_supported(&self) -> bool {
        self.viewport.observation_supported
    }

    fn visible_fraction(&self, region: ElementId) -> Option<f32> {
        let bounds = self.document.bounds(region).ok()?;
        Some(visible_fraction(&bounds, &self.viewport.visible_rect()))
    }

    fn scroll_offset(&self) -> Point {
        self.viewport.scroll
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction_partially_visible() {
        let visible = Rect::new(0.0, 0.0, 1000.0, 800.0);
        let region = Rect::new(0.0, 710.0, 1000.0, 100.0);
        assert!((visible_fraction(&region, &visible) - 0.9).abs() < 1e-4);
    }

    #[test]
    fn test_fraction_tall_region_measured_against_viewport() {
        let visible = Rect::new(0.0, 0.0, 1000.0, 800.0);
        let region = Rect::new(0.0, 0.0, 1000.0, 4000.0);
        assert_eq!(visible_fraction(&region, &visible), 1.0);
    }

    #[test]
    fn test_fraction_wide_region_measured_per_axis() {
        let visible = Rect::new(0.0, 0.0, 1000.0, 800.0);
        let banner = Rect::new(-500.0, 300.0, 2000.0, 100.0);
        assert_eq!(visible_fraction(&banner, &visible), 1.0);

        let half_in = Rect::new(-500.0, 750.0, 2000.0, 100.0);
        assert!((visible_fraction(&half_in, &visible) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_narrow_viewport_can_fully_reveal_wide_grid() {
        let mut doc = Document::new();
        let grid = doc.insert("grid", &["about-grid"], Rect::new(0.0, 1180.0, 1040.0, 580.0));
        let mut viewport = Viewport::new(375.0, 800.0);

        let best = (0..=25)
            .map(|step| {
                viewport.scroll_to(step as f32 * 100.0);
                PageView::new(&doc, &viewport).visible_fraction(grid).unwrap_or(0.0)
            })
            .fold(0.0f32, f32::max);
        assert_eq!(best, 1.0);
        viewport.scroll_to(1100.0);
        assert!(PageView::new(&doc, &viewport).is_element_visible(grid, 0.75));
    }

    #[test]
    fn test_fraction_outside() {
        let visible = Rect::new(0.0, 0.0, 1000.0, 800.0);
        let region = Rect::new(0.0, 900.0, 1000.0, 100.0);
        assert_eq!(visible_fraction(&region, &visible), 0.0);
    }

    #[test]
    fn test_page_view_follows_scroll() {
        let mut doc = Document::new();
        let section = doc.insert("about", &["about"], Rect::new(0.0, 1200.0, 1000.0, 400.0));
        let mut viewport = Viewport::new(1000.0, 800.0);

        assert!(!PageView::new(&doc, &viewport).is_element_visible(section, 0.8));
        viewport.scroll_by(800.0);
        assert!(PageView::new(&doc, &viewport).is_element_visible(section, 0.8));
    }

    #[test]
    fn test_missing_region_is_not_visible() {
        let mut doc = Document::new();
        let gone = doc.insert("gone", &[], Rect::new(0.0, 0.0, 10.0, 10.0));
        doc.remove(gone);
        let viewport = Viewport::new(100.0, 100.0);
        let view = PageView::new(&doc, &viewport);
        assert_eq!(view.visible_fraction(gone), None);
        assert!(!view.is_element_visible(gone, 0.1));
    }

    #[test]
    fn test_scroll_clamped_at_top() {
        let mut viewport = Viewport::new(100.0, 100.0);
        viewport.scroll_by(-50.0);
        assert_eq!(viewport.scroll.y, 0.0);
    }
}
