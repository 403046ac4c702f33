//! Glide Core
//!
//! Foundational types shared by the Glide motion crates:
//!
//! - **Geometry**: page-space points, sizes, rectangles and vectors
//! - **Style Layers**: animatable properties composed across entrance,
//!   ambient and pointer layers
//! - **Document**: element store addressed by explicit handles
//! - **Viewport**: the visible window and the visibility query surface
//!
//! # Example
//!
//! ```rust
//! use glide_core::{Document, PageView, Rect, Viewport, VisibilityProbe};
//!
//! let mut doc = Document::new();
//! let hero = doc.insert("hero", &["hero"], Rect::new(0.0, 0.0, 1280.0, 720.0));
//! let viewport = Viewport::new(1280.0, 800.0);
//!
//! assert!(PageView::new(&doc, &viewport).is_element_visible(hero, 0.8));
//! ```

pub mod document;
pub mod error;
pub mod geometry;
pub mod style;
pub mod viewport;

pub use document::{Document, Element, ElementId};
pub use error::{CoreError, Result};
pub use geometry::{Point, Rect, Size, Vec2};
pub use style::{Composition, ElementStyle, Property, PropertyMap, StyleLayer};
pub use viewport::{visible_fraction, PageView, Viewport, VisibilityProbe};
