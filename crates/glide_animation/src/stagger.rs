//! Staggered group expansion
//!
//! A [`StaggerGroup`] turns one per-item tween into N timeline steps whose
//! start offsets grow by a fixed increment, producing a cascading reveal.
//!
//! # Mirrored layouts
//!
//! Member order is logical reading order. In a right-to-left layout the grid
//! is drawn mirrored, but by default ([`StaggerOrder::Logical`]) the cascade
//! still follows reading order, so the first card a reader would read
//! appears first. [`StaggerOrder::Visual`] instead follows on-screen
//! left-to-right order, which reverses the cascade when the layout is
//! mirrored.

use crate::descriptor::AnimationDescriptor;
use crate::timeline::{Offset, TimelineStep};
use glide_core::ElementId;
use serde::{Deserialize, Serialize};

/// Where the cascade starts within the group
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaggerFrom {
    /// First member first
    #[default]
    Start,
    /// Last member first
    End,
    /// Middle member first, spreading outward
    Center,
}

/// How mirrored (right-to-left) layouts affect the cascade direction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaggerOrder {
    /// Follow logical reading order regardless of layout direction
    #[default]
    Logical,
    /// Follow on-screen order, reversing the cascade when mirrored
    Visual,
}

/// A group of similar elements animated with one per-item tween
#[derive(Clone, Debug)]
pub struct StaggerGroup {
    /// Members in logical reading order
    pub members: Vec<ElementId>,
    /// Per-item tween; its target is replaced by each member
    pub template: AnimationDescriptor,
    pub increment_ms: u32,
    pub from: StaggerFrom,
}

impl StaggerGroup {
    pub fn new(members: Vec<ElementId>, template: AnimationDescriptor, increment_ms: u32) -> Self {
        Self {
            members,
            template,
            increment_ms,
            from: StaggerFrom::Start,
        }
    }

    pub fn starting_at(mut self, from: StaggerFrom) -> Self {
        self.from = from;
        self
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Stagger offset of member `index` when the cascade starts at `from`
    pub fn offset_for_index(&self, index: usize, from: StaggerFrom) -> u32 {
        let total = self.members.len();
        let position = match from {
            StaggerFrom::Start => index,
            StaggerFrom::End => total.saturating_sub(1).saturating_sub(index),
            StaggerFrom::Center => {
                let center = total / 2;
                if index <= center {
                    center - index
                } else {
                    index - center
                }
            }
        };
        self.increment_ms.saturating_mul(position as u32)
    }
}

/// Expand a group into one step per member, in logical order
///
/// Member `i` gets the absolute offset `i * increment` (for the default
/// [`StaggerFrom::Start`]).
pub fn expand(group: &StaggerGroup) -> Vec<TimelineStep> {
    expand_for_layout(group, false, StaggerOrder::Logical)
}

/// Expand a group, applying the mirrored-layout policy
///
/// Steps are always emitted in member order; only their offsets change.
pub fn expand_for_layout(group: &StaggerGroup, is_rtl: bool, order: StaggerOrder) -> Vec<TimelineStep> {
    let from = effective_from(group.from, is_rtl, order);
    group
        .members
        .iter()
        .enumerate()
        .map(|(index, member)| TimelineStep {
            descriptor: group.template.retarget(*member),
            offset: Offset::Absolute(group.offset_for_index(index, from)),
        })
        .collect()
}

fn effective_from(from: StaggerFrom, is_rtl: bool, order: StaggerOrder) -> StaggerFrom {
    if !(is_rtl && order == StaggerOrder::Visual) {
        return from;
    }
    match from {
        StaggerFrom::Start => StaggerFrom::End,
        StaggerFrom::End => StaggerFrom::Start,
        StaggerFrom::Center => StaggerFrom::Center,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glide_core::{Document, Property, PropertyMap, Rect};

    fn group(n: usize, increment_ms: u32) -> StaggerGroup {
        let mut doc = Document::new();
        let members = (0..n)
            .map(|i| doc.insert(format!("card-{i}"), &["about-card"], Rect::ZERO))
            .collect();
        let template = AnimationDescriptor::from_to(
            ElementId::default(),
            PropertyMap::new().with(Property::Y, 100.0),
            PropertyMap::new().with(Property::Y, 0.0),
        )
        .duration(1000);
        StaggerGroup::new(members, template, increment_ms)
    }

    fn offsets(steps: &[TimelineStep]) -> Vec<u32> {
        steps
            .iter()
            .map(|s| match s.offset {
                Offset::Absolute(ms) => ms,
                Offset::RelativeToPrevious(_) => panic!("stagger steps are absolute"),
            })
            .collect()
    }

    #[test]
    fn test_offsets_are_index_times_increment() {
        let g = group(5, 100);
        let steps = expand(&g);
        assert_eq!(offsets(&steps), vec![0, 100, 200, 300, 400]);
        for (step, member) in steps.iter().zip(&g.members) {
            assert_eq!(step.descriptor.target, *member);
        }
    }

    #[test]
    fn test_rtl_logical_order_keeps_reading_order() {
        let g = group(4, 100);
        let steps = expand_for_layout(&g, true, StaggerOrder::Logical);
        assert_eq!(offsets(&steps), vec![0, 100, 200, 300]);
    }

    #[test]
    fn test_rtl_visual_order_reverses_cascade() {
        let g = group(4, 100);
        let steps = expand_for_layout(&g, true, StaggerOrder::Visual);
        assert_eq!(offsets(&steps), vec![300, 200, 100, 0]);
        // Ltr layouts are unaffected by the policy
        let ltr = expand_for_layout(&g, false, StaggerOrder::Visual);
        assert_eq!(offsets(&ltr), vec![0, 100, 200, 300]);
    }

    #[test]
    fn test_from_center() {
        let g = group(5, 100).starting_at(StaggerFrom::Center);
        assert_eq!(offsets(&expand(&g)), vec![200, 100, 0, 100, 200]);
    }

    #[test]
    fn test_large_group() {
        let g = group(10_000, 10);
        let steps = expand(&g);
        assert_eq!(steps.len(), 10_000);
        assert_eq!(offsets(&steps)[9_999], 99_990);
    }

    #[test]
    fn test_empty_group() {
        let g = group(0, 100);
        assert!(g.is_empty());
        assert!(expand(&g).is_empty());
    }
}
