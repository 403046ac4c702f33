//! Animatable value types
//!
//! Provides the interpolation trait used by timelines, ambient loops and the
//! pointer magnet, with implementations for scalars, vectors and whole
//! property maps.

use glide_core::{PropertyMap, Vec2};

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Linearly interpolate between self and other by factor t
    ///
    /// `t` is normally in `[0, 1]` but overshooting easings may push it
    /// slightly outside; implementations extrapolate in that case.
    fn lerp(&self, other: &Self, t: f32) -> Self;

    /// Check if two values are approximately equal (for settling detection)
    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool;
}

// ============================================================================
// f32 Implementation
// ============================================================================

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self - other).abs() < epsilon
    }
}

// ============================================================================
// Vec2 Implementation
// ============================================================================

impl Interpolate for Vec2 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Vec2::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.x - other.x).abs() < epsilon && (self.y - other.y).abs() < epsilon
    }
}

// ============================================================================
// PropertyMap Implementation
// ============================================================================

impl Interpolate for PropertyMap {
    /// Interpolates every property of `other`; properties missing from
    /// `self` start at their rest value.
    fn lerp(&self, other: &Self, t: f32) -> Self {
        other
            .iter()
            .map(|(property, end)| {
                let start = self.get(property).unwrap_or_else(|| property.rest_value());
                (property, start.lerp(&end, t))
            })
            .collect()
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.len() == other.len()
            && other.iter().all(|(property, value)| {
                self.get(property)
                    .map(|v| v.approx_eq(&value, epsilon))
                    .unwrap_or(false)
            })
    }
}
