//! Animatable style properties and layered composition
//!
//! Every element carries one [`PropertyMap`] per [`StyleLayer`]. Entrance
//! timelines, ambient loops and pointer effects each write to their own
//! layer, and the rendered value of a property is the composition of all
//! layers:
//!
//! - translation, rotation and blur add up across layers
//! - opacity and scale multiply across layers
//!
//! This keeps an ambient drift and a magnetic pointer offset from
//! overwriting each other on the same element.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// A single animatable style property
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    /// Horizontal translation (px)
    X,
    /// Vertical translation (px)
    Y,
    /// Rotation (degrees)
    Rotate,
    /// Uniform scale factor
    Scale,
    /// Opacity (0.0 to 1.0)
    Opacity,
    /// Gaussian blur radius (px)
    Blur,
}

/// How a property combines across style layers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Composition {
    Additive,
    Multiplicative,
}

impl Property {
    pub const ALL: [Property; 6] = [
        Property::X,
        Property::Y,
        Property::Rotate,
        Property::Scale,
        Property::Opacity,
        Property::Blur,
    ];

    /// Value of the property when nothing animates it
    pub fn rest_value(self) -> f32 {
        match self {
            Property::Scale | Property::Opacity => 1.0,
            Property::X | Property::Y | Property::Rotate | Property::Blur => 0.0,
        }
    }

    pub fn composition(self) -> Composition {
        match self {
            Property::Scale | Property::Opacity => Composition::Multiplicative,
            Property::X | Property::Y | Property::Rotate | Property::Blur => Composition::Additive,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Property::X => "x",
            Property::Y => "y",
            Property::Rotate => "rotate",
            Property::Scale => "scale",
            Property::Opacity => "opacity",
            Property::Blur => "blur",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A small ordered map of property values
///
/// Most animations touch two or three properties, so entries live inline.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyMap {
    entries: SmallVec<[(Property, f32); 4]>,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, property: Property, value: f32) -> Self {
        self.set(property, value);
        self
    }

    pub fn get(&self, property: Property) -> Option<f32> {
        self.entries
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, v)| *v)
    }

    pub fn set(&mut self, property: Property, value: f32) {
        match self.entries.iter_mut().find(|(p, _)| *p == property) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((property, value)),
        }
    }

    pub fn remove(&mut self, property: Property) -> Option<f32> {
        let index = self.entries.iter().position(|(p, _)| *p == property)?;
        Some(self.entries.remove(index).1)
    }

    pub fn contains(&self, property: Property) -> bool {
        self.get(property).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Property, f32)> + '_ {
        self.entries.iter().copied()
    }

    pub fn properties(&self) -> impl Iterator<Item = Property> + '_ {
        self.entries.iter().map(|(p, _)| *p)
    }

    /// Overwrite every entry of `other` into this map
    pub fn merge(&mut self, other: &PropertyMap) {
        for (property, value) in other.iter() {
            self.set(property, value);
        }
    }
}

impl FromIterator<(Property, f32)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (Property, f32)>>(iter: I) -> Self {
        let mut map = PropertyMap::new();
        for (property, value) in iter {
            map.set(property, value);
        }
        map
    }
}

/// Independent style layers that compose into the rendered value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleLayer {
    /// One-shot entrance timelines
    Entrance,
    /// Perpetual ambient loops
    Ambient,
    /// Pointer-driven effects
    Pointer,
}

impl StyleLayer {
    pub const ALL: [StyleLayer; 3] = [StyleLayer::Entrance, StyleLayer::Ambient, StyleLayer::Pointer];

    fn index(self) -> usize {
        match self {
            StyleLayer::Entrance => 0,
            StyleLayer::Ambient => 1,
            StyleLayer::Pointer => 2,
        }
    }
}

/// Layered animated style of one element
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElementStyle {
    layers: [PropertyMap; 3],
}

impl ElementStyle {
    pub fn layer(&self, layer: StyleLayer) -> &PropertyMap {
        &self.layers[layer.index()]
    }

    pub fn layer_mut(&mut self, layer: StyleLayer) -> &mut PropertyMap {
        &mut self.layers[layer.index()]
    }

    /// Value of `property` on one layer, falling back to its rest value
    pub fn value(&self, layer: StyleLayer, property: Property) -> f32 {
        self.layer(layer)
            .get(property)
            .unwrap_or_else(|| property.rest_value())
    }

    pub fn set(&mut self, layer: StyleLayer, property: Property, value: f32) {
        self.layer_mut(layer).set(property, value);
    }

    /// Rendered value of `property` with every layer composed
    pub fn computed(&self, property: Property) -> f32 {
        let values = self.layers.iter().filter_map(|layer| layer.get(property));
        match property.composition() {
            Composition::Additive => property.rest_value() + values.sum::<f32>(),
            Composition::Multiplicative => values.fold(property.rest_value(), |acc, v| acc * v),
        }
    }

    /// Rendered values of every property touched by any layer
    pub fn computed_map(&self) -> PropertyMap {
        Property::ALL
            .iter()
            .filter(|p| self.layers.iter().any(|layer| layer.contains(**p)))
            .map(|p| (*p, self.computed(*p)))
            .collect()
    }
}
