//! Landing page document
//!
//! Builds the element layout of the landing page (header, hero and about
//! sections) at a 1280x800 desktop viewport and resolves the handles each
//! section animates. Class selectors are only used here, once.

use anyhow::{Context, Result};
use glide_core::{Document, ElementId, Rect, Viewport};

pub const PAGE_WIDTH: f32 = 1280.0;
pub const VIEWPORT_HEIGHT: f32 = 800.0;

/// Handles used by the header
pub struct HeaderElements {
    pub bar: ElementId,
}

/// Handles used by the hero section
pub struct HeroElements {
    /// Headline lines, revealed together
    pub text: Vec<ElementId>,
    /// Badge and subtitle, in reading order
    pub fade_up: Vec<ElementId>,
    /// Magnetic call-to-action buttons
    pub buttons: Vec<ElementId>,
}

/// Handles used by the about section
pub struct AboutElements {
    pub section: ElementId,
    pub title: ElementId,
    pub grid: ElementId,
    /// Cards in reading order
    pub cards: Vec<ElementId>,
    pub orbs: [ElementId; 2],
}

/// The landing page and its viewport
pub struct LandingPage {
    pub document: Document,
    pub viewport: Viewport,
    pub is_rtl: bool,
    pub header: HeaderElements,
    pub hero: HeroElements,
    pub about: AboutElements,
}

/// Card cells of the about grid: four columns, first card spans 2x2
const CARD_CELLS: [(f32, f32, f32, f32); 6] = [
    (120.0, 1180.0, 508.0, 376.0),
    (652.0, 1180.0, 248.0, 180.0),
    (912.0, 1180.0, 248.0, 180.0),
    (652.0, 1376.0, 508.0, 180.0),
    (120.0, 1580.0, 248.0, 180.0),
    (380.0, 1580.0, 248.0, 180.0),
];

impl LandingPage {
    /// Build the page; `is_rtl` mirrors the about grid horizontally
    pub fn build(is_rtl: bool) -> Result<Self> {
        let mut doc = Document::new();
        let mirror = |x: f32, width: f32| if is_rtl { PAGE_WIDTH - x - width } else { x };

        doc.insert("header", &["header"], Rect::new(320.0, 24.0, 640.0, 72.0));

        doc.insert("hero", &["hero"], Rect::new(0.0, 0.0, PAGE_WIDTH, 900.0));
        doc.insert("hero-badge", &["hero-fade-up"], Rect::new(490.0, 180.0, 300.0, 36.0));
        doc.insert("hero-title-1", &["hero-text-char"], Rect::new(240.0, 260.0, 800.0, 90.0));
        doc.insert("hero-title-2", &["hero-text-char"], Rect::new(240.0, 350.0, 800.0, 90.0));
        doc.insert("hero-subtitle", &["hero-fade-up"], Rect::new(290.0, 470.0, 700.0, 60.0));
        doc.insert("hero-cta", &["hero-btn"], Rect::new(350.0, 580.0, 260.0, 80.0));
        doc.insert("hero-explore", &["hero-btn"], Rect::new(670.0, 580.0, 260.0, 80.0));

        doc.insert("about", &["about"], Rect::new(0.0, 900.0, PAGE_WIDTH, 1400.0));
        doc.insert("orb-1", &["ambient-orb-1"], Rect::new(880.0, 500.0, 800.0, 800.0));
        doc.insert("orb-2", &["ambient-orb-2"], Rect::new(-150.0, 2000.0, 600.0, 600.0));
        doc.insert("about-title", &["about-title"], Rect::new(240.0, 1000.0, 800.0, 120.0));
        doc.insert("about-grid", &["about-grid"], Rect::new(120.0, 1180.0, 1040.0, 580.0));
        for (i, (x, y, w, h)) in CARD_CELLS.iter().enumerate() {
            doc.insert(format!("about-card-{}", i + 1), &["about-card"], Rect::new(mirror(*x, *w), *y, *w, *h));
        }

        let header = HeaderElements {
            bar: doc.query_one("header")?,
        };
        let hero = HeroElements {
            text: doc.query("hero-text-char"),
            fade_up: doc.query("hero-fade-up"),
            buttons: doc.query("hero-btn"),
        };
        let about = AboutElements {
            section: doc.query_one("about")?,
            title: doc.query_one("about-title")?,
            grid: doc.query_one("about-grid")?,
            cards: doc.query("about-card"),
            orbs: [doc.query_one("ambient-orb-1")?, doc.query_one("ambient-orb-2")?],
        };

        Ok(Self {
            document: doc,
            viewport: Viewport::new(PAGE_WIDTH, VIEWPORT_HEIGHT),
            is_rtl,
            header,
            hero,
            about,
        })
    }

    /// Display name of an element, for reports
    pub fn name(&self, id: ElementId) -> Result<&str> {
        self.document
            .get(id)
            .map(|e| e.name.as_str())
            .with_context(|| format!("element {:?} is not on the page", id))
    }

    /// Every element animated by some section, in document order
    pub fn animated_elements(&self) -> Vec<ElementId> {
        let mut ids = Vec::new();
        ids.extend(&self.hero.text);
        ids.extend(&self.hero.fade_up);
        ids.extend(&self.hero.buttons);
        ids.push(self.about.title);
        ids.extend(&self.about.cards);
        ids.extend(self.about.orbs);
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_section_handles() {
        let page = LandingPage::build(false).unwrap();
        assert_eq!(page.hero.text.len(), 2);
        assert_eq!(page.hero.fade_up.len(), 2);
        assert_eq!(page.hero.buttons.len(), 2);
        assert_eq!(page.about.cards.len(), 6);
        assert_eq!(page.name(page.hero.fade_up[0]).unwrap(), "hero-badge");
        assert_eq!(page.name(page.about.cards[0]).unwrap(), "about-card-1");
        assert_eq!(page.animated_elements().len(), 15);
    }

    #[test]
    fn test_rtl_mirrors_grid() {
        let ltr = LandingPage::build(false).unwrap();
        let rtl = LandingPage::build(true).unwrap();
        let first_ltr = ltr.document.bounds(ltr.about.cards[0]).unwrap();
        let first_rtl = rtl.document.bounds(rtl.about.cards[0]).unwrap();
        assert_eq!(first_ltr.x(), 120.0);
        assert_eq!(first_rtl.right(), PAGE_WIDTH - 120.0);
        // Reading order is unchanged
        assert_eq!(rtl.name(rtl.about.cards[0]).unwrap(), "about-card-1");
    }

    #[test]
    fn test_about_starts_below_the_fold() {
        let page = LandingPage::build(false).unwrap();
        let title = page.document.bounds(page.about.title).unwrap();
        assert!(title.y() > page.viewport.visible_rect().bottom());
    }
}
