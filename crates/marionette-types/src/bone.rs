//! Bone identifiers and the static human-body-bone lookup table.
//!
//! Two vocabularies exist for joints:
//!
//! - [`HumanBodyBone`] – the generic humanoid rig vocabulary used when
//!   declaring retargeting targets (e.g. in configuration files).
//! - [`BoneId`] – the stable identifier attached to every tracked
//!   [`BoneSample`][crate::skeleton::BoneSample].
//!
//! The mapping between them is fixed at compile time.  It is total over
//! every humanoid bone that can be retargeted and injective; the eyes and
//! the jaw have no tracked counterpart and resolve to `None`.

use serde::{Deserialize, Serialize};

use crate::error::RigError;

// ────────────────────────────────────────────────────────────────────────────
// BoneId
// ────────────────────────────────────────────────────────────────────────────

/// Stable identifier of a tracked body joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BoneId {
    Root,
    Hips,
    SpineLower,
    SpineMiddle,
    SpineUpper,
    Chest,
    Neck,
    Head,

    LeftShoulder,
    LeftScapula,
    LeftArmUpper,
    LeftArmLower,
    LeftHandWrist,
    LeftHandPalm,
    LeftHandThumbMetacarpal,
    LeftHandThumbProximal,
    LeftHandThumbDistal,
    LeftHandThumbTip,
    LeftHandIndexProximal,
    LeftHandIndexIntermediate,
    LeftHandIndexDistal,
    LeftHandIndexTip,
    LeftHandMiddleProximal,
    LeftHandMiddleIntermediate,
    LeftHandMiddleDistal,
    LeftHandMiddleTip,
    LeftHandRingProximal,
    LeftHandRingIntermediate,
    LeftHandRingDistal,
    LeftHandRingTip,
    LeftHandLittleProximal,
    LeftHandLittleIntermediate,
    LeftHandLittleDistal,
    LeftHandLittleTip,

    RightShoulder,
    RightScapula,
    RightArmUpper,
    RightArmLower,
    RightHandWrist,
    RightHandPalm,
    RightHandThumbMetacarpal,
    RightHandThumbProximal,
    RightHandThumbDistal,
    RightHandThumbTip,
    RightHandIndexProximal,
    RightHandIndexIntermediate,
    RightHandIndexDistal,
    RightHandIndexTip,
    RightHandMiddleProximal,
    RightHandMiddleIntermediate,
    RightHandMiddleDistal,
    RightHandMiddleTip,
    RightHandRingProximal,
    RightHandRingIntermediate,
    RightHandRingDistal,
    RightHandRingTip,
    RightHandLittleProximal,
    RightHandLittleIntermediate,
    RightHandLittleDistal,
    RightHandLittleTip,

    LeftUpperLeg,
    LeftLowerLeg,
    LeftFootAnkle,
    LeftFootBall,
    RightUpperLeg,
    RightLowerLeg,
    RightFootAnkle,
    RightFootBall,
}

impl BoneId {
    pub const COUNT: usize = 68;

    /// Every identifier, in declaration order.
    pub const ALL: [BoneId; Self::COUNT] = [
        BoneId::Root,
        BoneId::Hips,
        BoneId::SpineLower,
        BoneId::SpineMiddle,
        BoneId::SpineUpper,
        BoneId::Chest,
        BoneId::Neck,
        BoneId::Head,
        BoneId::LeftShoulder,
        BoneId::LeftScapula,
        BoneId::LeftArmUpper,
        BoneId::LeftArmLower,
        BoneId::LeftHandWrist,
        BoneId::LeftHandPalm,
        BoneId::LeftHandThumbMetacarpal,
        BoneId::LeftHandThumbProximal,
        BoneId::LeftHandThumbDistal,
        BoneId::LeftHandThumbTip,
        BoneId::LeftHandIndexProximal,
        BoneId::LeftHandIndexIntermediate,
        BoneId::LeftHandIndexDistal,
        BoneId::LeftHandIndexTip,
        BoneId::LeftHandMiddleProximal,
        BoneId::LeftHandMiddleIntermediate,
        BoneId::LeftHandMiddleDistal,
        BoneId::LeftHandMiddleTip,
        BoneId::LeftHandRingProximal,
        BoneId::LeftHandRingIntermediate,
        BoneId::LeftHandRingDistal,
        BoneId::LeftHandRingTip,
        BoneId::LeftHandLittleProximal,
        BoneId::LeftHandLittleIntermediate,
        BoneId::LeftHandLittleDistal,
        BoneId::LeftHandLittleTip,
        BoneId::RightShoulder,
        BoneId::RightScapula,
        BoneId::RightArmUpper,
        BoneId::RightArmLower,
        BoneId::RightHandWrist,
        BoneId::RightHandPalm,
        BoneId::RightHandThumbMetacarpal,
        BoneId::RightHandThumbProximal,
        BoneId::RightHandThumbDistal,
        BoneId::RightHandThumbTip,
        BoneId::RightHandIndexProximal,
        BoneId::RightHandIndexIntermediate,
        BoneId::RightHandIndexDistal,
        BoneId::RightHandIndexTip,
        BoneId::RightHandMiddleProximal,
        BoneId::RightHandMiddleIntermediate,
        BoneId::RightHandMiddleDistal,
        BoneId::RightHandMiddleTip,
        BoneId::RightHandRingProximal,
        BoneId::RightHandRingIntermediate,
        BoneId::RightHandRingDistal,
        BoneId::RightHandRingTip,
        BoneId::RightHandLittleProximal,
        BoneId::RightHandLittleIntermediate,
        BoneId::RightHandLittleDistal,
        BoneId::RightHandLittleTip,
        BoneId::LeftUpperLeg,
        BoneId::LeftLowerLeg,
        BoneId::LeftFootAnkle,
        BoneId::LeftFootBall,
        BoneId::RightUpperLeg,
        BoneId::RightLowerLeg,
        BoneId::RightFootAnkle,
        BoneId::RightFootBall,
    ];

    /// The humanoid bone this identifier is retargeted from, if any.
    ///
    /// Tracked-only joints (root, chest, scapulae, palms, finger tips) have
    /// no humanoid counterpart.
    pub const fn human_body_bone(self) -> Option<HumanBodyBone> {
        BONE_TO_HUMAN[self as usize]
    }
}

// ────────────────────────────────────────────────────────────────────────────
// HumanBodyBone
// ────────────────────────────────────────────────────────────────────────────

/// Generic humanoid rig bone, as used in retargeting declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HumanBodyBone {
    Hips,
    LeftUpperLeg,
    RightUpperLeg,
    LeftLowerLeg,
    RightLowerLeg,
    LeftFoot,
    RightFoot,
    Spine,
    Chest,
    Neck,
    Head,
    LeftShoulder,
    RightShoulder,
    LeftUpperArm,
    RightUpperArm,
    LeftLowerArm,
    RightLowerArm,
    LeftHand,
    RightHand,
    LeftToes,
    RightToes,
    LeftEye,
    RightEye,
    Jaw,
    LeftThumbProximal,
    LeftThumbIntermediate,
    LeftThumbDistal,
    LeftIndexProximal,
    LeftIndexIntermediate,
    LeftIndexDistal,
    LeftMiddleProximal,
    LeftMiddleIntermediate,
    LeftMiddleDistal,
    LeftRingProximal,
    LeftRingIntermediate,
    LeftRingDistal,
    LeftLittleProximal,
    LeftLittleIntermediate,
    LeftLittleDistal,
    RightThumbProximal,
    RightThumbIntermediate,
    RightThumbDistal,
    RightIndexProximal,
    RightIndexIntermediate,
    RightIndexDistal,
    RightMiddleProximal,
    RightMiddleIntermediate,
    RightMiddleDistal,
    RightRingProximal,
    RightRingIntermediate,
    RightRingDistal,
    RightLittleProximal,
    RightLittleIntermediate,
    RightLittleDistal,
    UpperChest,
}

impl HumanBodyBone {
    pub const COUNT: usize = 55;

    /// Every humanoid bone, in declaration order.
    pub const ALL: [HumanBodyBone; Self::COUNT] = [
        HumanBodyBone::Hips,
        HumanBodyBone::LeftUpperLeg,
        HumanBodyBone::RightUpperLeg,
        HumanBodyBone::LeftLowerLeg,
        HumanBodyBone::RightLowerLeg,
        HumanBodyBone::LeftFoot,
        HumanBodyBone::RightFoot,
        HumanBodyBone::Spine,
        HumanBodyBone::Chest,
        HumanBodyBone::Neck,
        HumanBodyBone::Head,
        HumanBodyBone::LeftShoulder,
        HumanBodyBone::RightShoulder,
        HumanBodyBone::LeftUpperArm,
        HumanBodyBone::RightUpperArm,
        HumanBodyBone::LeftLowerArm,
        HumanBodyBone::RightLowerArm,
        HumanBodyBone::LeftHand,
        HumanBodyBone::RightHand,
        HumanBodyBone::LeftToes,
        HumanBodyBone::RightToes,
        HumanBodyBone::LeftEye,
        HumanBodyBone::RightEye,
        HumanBodyBone::Jaw,
        HumanBodyBone::LeftThumbProximal,
        HumanBodyBone::LeftThumbIntermediate,
        HumanBodyBone::LeftThumbDistal,
        HumanBodyBone::LeftIndexProximal,
        HumanBodyBone::LeftIndexIntermediate,
        HumanBodyBone::LeftIndexDistal,
        HumanBodyBone::LeftMiddleProximal,
        HumanBodyBone::LeftMiddleIntermediate,
        HumanBodyBone::LeftMiddleDistal,
        HumanBodyBone::LeftRingProximal,
        HumanBodyBone::LeftRingIntermediate,
        HumanBodyBone::LeftRingDistal,
        HumanBodyBone::LeftLittleProximal,
        HumanBodyBone::LeftLittleIntermediate,
        HumanBodyBone::LeftLittleDistal,
        HumanBodyBone::RightThumbProximal,
        HumanBodyBone::RightThumbIntermediate,
        HumanBodyBone::RightThumbDistal,
        HumanBodyBone::RightIndexProximal,
        HumanBodyBone::RightIndexIntermediate,
        HumanBodyBone::RightIndexDistal,
        HumanBodyBone::RightMiddleProximal,
        HumanBodyBone::RightMiddleIntermediate,
        HumanBodyBone::RightMiddleDistal,
        HumanBodyBone::RightRingProximal,
        HumanBodyBone::RightRingIntermediate,
        HumanBodyBone::RightRingDistal,
        HumanBodyBone::RightLittleProximal,
        HumanBodyBone::RightLittleIntermediate,
        HumanBodyBone::RightLittleDistal,
        HumanBodyBone::UpperChest,
    ];

    /// Look up the tracked [`BoneId`] for this humanoid bone.
    ///
    /// Returns `None` for bones the tracker does not provide (eyes, jaw).
    pub const fn bone_id(self) -> Option<BoneId> {
        use HumanBodyBone as H;
        let id = match self {
            H::Hips => BoneId::Hips,
            H::Spine => BoneId::SpineLower,
            H::Chest => BoneId::SpineMiddle,
            H::UpperChest => BoneId::SpineUpper,
            H::Neck => BoneId::Neck,
            H::Head => BoneId::Head,

            H::LeftShoulder => BoneId::LeftShoulder,
            H::LeftUpperArm => BoneId::LeftArmUpper,
            H::LeftLowerArm => BoneId::LeftArmLower,
            H::LeftHand => BoneId::LeftHandWrist,
            H::RightShoulder => BoneId::RightShoulder,
            H::RightUpperArm => BoneId::RightArmUpper,
            H::RightLowerArm => BoneId::RightArmLower,
            H::RightHand => BoneId::RightHandWrist,

            H::LeftThumbProximal => BoneId::LeftHandThumbMetacarpal,
            H::LeftThumbIntermediate => BoneId::LeftHandThumbProximal,
            H::LeftThumbDistal => BoneId::LeftHandThumbDistal,
            H::LeftIndexProximal => BoneId::LeftHandIndexProximal,
            H::LeftIndexIntermediate => BoneId::LeftHandIndexIntermediate,
            H::LeftIndexDistal => BoneId::LeftHandIndexDistal,
            H::LeftMiddleProximal => BoneId::LeftHandMiddleProximal,
            H::LeftMiddleIntermediate => BoneId::LeftHandMiddleIntermediate,
            H::LeftMiddleDistal => BoneId::LeftHandMiddleDistal,
            H::LeftRingProximal => BoneId::LeftHandRingProximal,
            H::LeftRingIntermediate => BoneId::LeftHandRingIntermediate,
            H::LeftRingDistal => BoneId::LeftHandRingDistal,
            H::LeftLittleProximal => BoneId::LeftHandLittleProximal,
            H::LeftLittleIntermediate => BoneId::LeftHandLittleIntermediate,
            H::LeftLittleDistal => BoneId::LeftHandLittleDistal,

            H::RightThumbProximal => BoneId::RightHandThumbMetacarpal,
            H::RightThumbIntermediate => BoneId::RightHandThumbProximal,
            H::RightThumbDistal => BoneId::RightHandThumbDistal,
            H::RightIndexProximal => BoneId::RightHandIndexProximal,
            H::RightIndexIntermediate => BoneId::RightHandIndexIntermediate,
            H::RightIndexDistal => BoneId::RightHandIndexDistal,
            H::RightMiddleProximal => BoneId::RightHandMiddleProximal,
            H::RightMiddleIntermediate => BoneId::RightHandMiddleIntermediate,
            H::RightMiddleDistal => BoneId::RightHandMiddleDistal,
            H::RightRingProximal => BoneId::RightHandRingProximal,
            H::RightRingIntermediate => BoneId::RightHandRingIntermediate,
            H::RightRingDistal => BoneId::RightHandRingDistal,
            H::RightLittleProximal => BoneId::RightHandLittleProximal,
            H::RightLittleIntermediate => BoneId::RightHandLittleIntermediate,
            H::RightLittleDistal => BoneId::RightHandLittleDistal,

            H::LeftUpperLeg => BoneId::LeftUpperLeg,
            H::LeftLowerLeg => BoneId::LeftLowerLeg,
            H::LeftFoot => BoneId::LeftFootAnkle,
            H::LeftToes => BoneId::LeftFootBall,
            H::RightUpperLeg => BoneId::RightUpperLeg,
            H::RightLowerLeg => BoneId::RightLowerLeg,
            H::RightFoot => BoneId::RightFootAnkle,
            H::RightToes => BoneId::RightFootBall,

            H::LeftEye | H::RightEye | H::Jaw => return None,
        };
        Some(id)
    }

    /// Like [`HumanBodyBone::bone_id`], but an unmappable bone is a
    /// [`RigError::Configuration`] attributed to `component`.
    pub fn resolve(self, component: &str) -> Result<BoneId, RigError> {
        self.bone_id().ok_or_else(|| RigError::Configuration {
            component: component.to_string(),
            details: format!("humanoid bone {self:?} has no tracked bone id"),
        })
    }
}

/// Reverse table, derived once at compile time from [`HumanBodyBone::bone_id`].
static BONE_TO_HUMAN: [Option<HumanBodyBone>; BoneId::COUNT] = build_reverse_table();

const fn build_reverse_table() -> [Option<HumanBodyBone>; BoneId::COUNT] {
    let mut table = [None; BoneId::COUNT];
    let mut i = 0;
    while i < HumanBodyBone::COUNT {
        let human = HumanBodyBone::ALL[i];
        if let Some(id) = human.bone_id() {
            table[id as usize] = Some(human);
        }
        i += 1;
    }
    table
}
