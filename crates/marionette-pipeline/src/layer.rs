//! [`RetargetingLayer`] – the host's view of the retargeted rig.
//!
//! Retargeting processors receive the layer in every lifecycle call.  During
//! `setup` they typically resolve the bone transforms they need and cache the
//! handles, so the per-frame path never searches the rig.

use std::collections::BTreeMap;

use marionette_types::{BoneId, TrackedSkeleton, TransformRef};

/// Read-only access to the rig a pipeline is attached to.
pub trait RetargetingLayer: Send + Sync {
    /// Human-readable name used in log output.
    fn name(&self) -> &str;

    /// The rig transform driven by `id`, if the rig has that bone.
    fn bone_transform(&self, id: BoneId) -> Option<TransformRef>;

    /// Every bone the rig provides, in [`BoneId`] order.
    fn bone_ids(&self) -> Vec<BoneId>;
}

/// In-memory [`RetargetingLayer`] backed by a `BoneId → TransformRef` map.
#[derive(Debug, Clone, Default)]
pub struct RigLayer {
    name: String,
    bones: BTreeMap<BoneId, TransformRef>,
}

impl RigLayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bones: BTreeMap::new(),
        }
    }

    /// Builder-style [`RigLayer::insert_bone`].
    pub fn with_bone(mut self, id: BoneId, transform: TransformRef) -> Self {
        self.insert_bone(id, transform);
        self
    }

    /// Attach `transform` to `id`, replacing any previous binding.
    pub fn insert_bone(&mut self, id: BoneId, transform: TransformRef) {
        self.bones.insert(id, transform);
    }

    /// Build a layer whose bones are the live transforms of `skeleton`.
    /// Stale samples are left out.
    pub fn from_skeleton(name: impl Into<String>, skeleton: &TrackedSkeleton) -> Self {
        let mut layer = Self::new(name);
        for sample in skeleton.bones() {
            if let Some(t) = &sample.transform {
                layer.bones.entry(sample.id).or_insert_with(|| t.clone());
            }
        }
        layer
    }
}

impl RetargetingLayer for RigLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn bone_transform(&self, id: BoneId) -> Option<TransformRef> {
        self.bones.get(&id).cloned()
    }

    fn bone_ids(&self) -> Vec<BoneId> {
        self.bones.keys().copied().collect()
    }
}
