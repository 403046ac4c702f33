//! Element document
//!
//! A flat store of page elements addressed by [`ElementId`] handles. Class
//! selectors are resolved once through [`Document::query`]; animation code
//! only ever holds the resulting handles, never selectors.

use crate::error::{CoreError, Result};
use crate::geometry::Rect;
use crate::style::{ElementStyle, Property, StyleLayer};
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

new_key_type! {
    /// Handle to an element in a [`Document`]
    pub struct ElementId;
}

/// A page element: its class list, layout bounds and animated style
#[derive(Clone, Debug)]
pub struct Element {
    pub name: String,
    pub classes: SmallVec<[String; 2]>,
    /// Untransformed layout bounds in page coordinates
    pub bounds: Rect,
    pub style: ElementStyle,
}

impl Element {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// Element store with document-order class lookup
#[derive(Default)]
pub struct Document {
    elements: SlotMap<ElementId, Element>,
    /// Insertion order, which is document (reading) order
    order: Vec<ElementId>,
    by_class: FxHashMap<String, Vec<ElementId>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an element with the given name, classes and bounds
    pub fn insert(&mut self, name: impl Into<String>, classes: &[&str], bounds: Rect) -> ElementId {
        let element = Element {
            name: name.into(),
            classes: classes.iter().map(|c| c.to_string()).collect(),
            bounds,
            style: ElementStyle::default(),
        };
        let id = self.elements.insert(element);
        self.order.push(id);
        for class in classes {
            self.by_class.entry(class.to_string()).or_default().push(id);
        }
        id
    }

    /// Remove an element; handles to it become stale
    pub fn remove(&mut self, id: ElementId) -> Option<Element> {
        let element = self.elements.remove(id)?;
        self.order.retain(|e| *e != id);
        for class in &element.classes {
            if let Some(ids) = self.by_class.get_mut(class.as_str()) {
                ids.retain(|e| *e != id);
            }
        }
        Some(element)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(id)
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// All elements carrying `class`, in document order
    pub fn query(&self, class: &str) -> Vec<ElementId> {
        self.by_class.get(class).cloned().unwrap_or_default()
    }

    /// First element carrying `class`
    pub fn query_one(&self, class: &str) -> Result<ElementId> {
        self.by_class
            .get(class)
            .and_then(|ids| ids.first().copied())
            .ok_or_else(|| CoreError::NoMatch(class.to_string()))
    }

    pub fn bounds(&self, id: ElementId) -> Result<Rect> {
        self.elements
            .get(id)
            .map(|e| e.bounds)
            .ok_or(CoreError::UnknownElement(id))
    }

    pub fn set_bounds(&mut self, id: ElementId, bounds: Rect) -> Result<()> {
        let element = self.elements.get_mut(id).ok_or(CoreError::UnknownElement(id))?;
        element.bounds = bounds;
        Ok(())
    }

    /// Write one layer value; writes to stale handles are dropped
    pub fn write(&mut self, id: ElementId, layer: StyleLayer, property: Property, value: f32) -> bool {
        match self.elements.get_mut(id) {
            Some(element) => {
                element.style.set(layer, property, value);
                true
            }
            None => {
                tracing::trace!("dropping style write to removed element {:?}", id);
                false
            }
        }
    }

    /// Read one layer value, falling back to the property's rest value
    pub fn read(&self, id: ElementId, layer: StyleLayer, property: Property) -> f32 {
        self.elements
            .get(id)
            .map(|e| e.style.value(layer, property))
            .unwrap_or_else(|| property.rest_value())
    }

    /// Rendered value of `property` with all layers composed
    pub fn computed(&self, id: ElementId, property: Property) -> f32 {
        self.elements
            .get(id)
            .map(|e| e.style.computed(property))
            .unwrap_or_else(|| property.rest_value())
    }

    /// Iterate elements in document order
    pub fn iter(&self) -> impl Iterator<Item = (ElementId, &Element)> + '_ {
        self.order
            .iter()
            .filter_map(move |id| self.elements.get(*id).map(|e| (*id, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_preserves_document_order() {
        let mut doc = Document::new();
        let a = doc.insert("card-a", &["about-card"], Rect::new(0.0, 0.0, 10.0, 10.0));
        let _title = doc.insert("title", &["about-title"], Rect::ZERO);
        let b = doc.insert("card-b", &["about-card"], Rect::new(0.0, 20.0, 10.0, 10.0));

        assert_eq!(doc.query("about-card"), vec![a, b]);
        assert!(doc.query("missing").is_empty());
    }

    #[test]
    fn test_remove_makes_handle_stale() {
        let mut doc = Document::new();
        let a = doc.insert("orb", &["ambient-orb-1"], Rect::ZERO);
        doc.remove(a);

        assert!(!doc.contains(a));
        assert!(doc.query("ambient-orb-1").is_empty());
        assert!(!doc.write(a, StyleLayer::Ambient, Property::Y, 1.0));
        assert!(matches!(doc.bounds(a), Err(CoreError::UnknownElement(_))));
    }

    #[test]
    fn test_query_one_no_match() {
        let doc = Document::new();
        assert!(matches!(doc.query_one("hero-title"), Err(CoreError::NoMatch(_))));
    }

    #[test]
    fn test_read_falls_back_to_rest_value() {
        let mut doc = Document::new();
        let a = doc.insert("btn", &["hero-btn"], Rect::ZERO);
        assert_eq!(doc.read(a, StyleLayer::Entrance, Property::Opacity), 1.0);
        doc.write(a, StyleLayer::Entrance, Property::Opacity, 0.0);
        assert_eq!(doc.computed(a, Property::Opacity), 0.0);
    }
}
