//! Scene layout: one live region per target.
//!
//! The headless driver stands in for the presentation layer, so it owns the
//! regions and publishes their rectangles. Scripts can override any of them.

use std::collections::BTreeMap;

use diancha_core::geometry::Rect;
use diancha_core::target::Target;
use diancha_gesture::{LiveRegion, TargetBindings};

/// Live regions for every target.
#[derive(Debug, Clone, Default)]
pub struct SceneLayout {
    regions: BTreeMap<Target, LiveRegion>,
}

impl SceneLayout {
    /// The default 1000 x 700 scene.
    #[must_use]
    pub fn standard() -> Self {
        let layout = Self {
            regions: Target::ALL
                .into_iter()
                .map(|target| (target, LiveRegion::new()))
                .collect(),
        };
        for target in Target::ALL {
            layout.publish(target, target.reference_rect());
        }
        layout
    }

    /// Moves `target` to `rect`. Controllers see the change on their next
    /// hit test.
    pub fn publish(&self, target: Target, rect: Rect) {
        if let Some(region) = self.regions.get(&target) {
            region.publish(rect);
        }
    }

    /// Publishes every override in `rects`.
    pub fn apply(&self, rects: &BTreeMap<Target, Rect>) {
        for (target, rect) in rects {
            self.publish(*target, *rect);
        }
    }

    /// Marks `target` as not laid out; every hit test against it misses.
    pub fn unmount(&self, target: Target) {
        if let Some(region) = self.regions.get(&target) {
            region.clear();
        }
    }

    /// Bindings sharing this layout's regions.
    #[must_use]
    pub fn bindings(&self) -> TargetBindings {
        self.regions
            .iter()
            .fold(TargetBindings::new(), |bindings, (target, region)| {
                bindings.bind(*target, region.clone())
            })
    }
}
