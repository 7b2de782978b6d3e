//! Domain constants: wearable-type and attachment-point enumerations, and the
//! `(tag)` extraction rule used to read an attachment point out of an
//! inventory item's name (spec.md §2 "Domain constants", §3 "Inventory item").

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Fixed order used by `@getoutfit`'s 16-digit bitmap reply (spec.md §4.6).
pub const WEARABLE_TYPES: [WearableType; 16] = [
    WearableType::Gloves,
    WearableType::Jacket,
    WearableType::Pants,
    WearableType::Shirt,
    WearableType::Shoes,
    WearableType::Skirt,
    WearableType::Socks,
    WearableType::Underpants,
    WearableType::Undershirt,
    WearableType::Skin,
    WearableType::Eyes,
    WearableType::Hair,
    WearableType::Shape,
    WearableType::Alpha,
    WearableType::Tattoo,
    WearableType::Physics,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WearableType {
    Gloves,
    Jacket,
    Pants,
    Shirt,
    Shoes,
    Skirt,
    Socks,
    Underpants,
    Undershirt,
    Skin,
    Eyes,
    Hair,
    Shape,
    Alpha,
    Tattoo,
    Physics,
}

impl WearableType {
    pub fn as_str(self) -> &'static str {
        match self {
            WearableType::Gloves => "gloves",
            WearableType::Jacket => "jacket",
            WearableType::Pants => "pants",
            WearableType::Shirt => "shirt",
            WearableType::Shoes => "shoes",
            WearableType::Skirt => "skirt",
            WearableType::Socks => "socks",
            WearableType::Underpants => "underpants",
            WearableType::Undershirt => "undershirt",
            WearableType::Skin => "skin",
            WearableType::Eyes => "eyes",
            WearableType::Hair => "hair",
            WearableType::Shape => "shape",
            WearableType::Alpha => "alpha",
            WearableType::Tattoo => "tattoo",
            WearableType::Physics => "physics",
        }
    }

    /// `true` for the worn-on values that permission evaluation treats as
    /// permanently attached (spec.md §4.7 forced-detach item rule).
    pub fn always_undetachable(self) -> bool {
        matches!(
            self,
            WearableType::Skin | WearableType::Shape | WearableType::Eyes | WearableType::Hair
        )
    }

    pub fn from_name(name: &str) -> Option<Self> {
        WEARABLE_TYPES
            .iter()
            .copied()
            .find(|w| w.as_str().eq_ignore_ascii_case(name))
    }

    pub fn bitmap_index(self) -> usize {
        WEARABLE_TYPES.iter().position(|w| *w == self).expect("exhaustive table")
    }
}

/// Attachment points, following the viewer's closed attachment-point table.
/// `RightHand` is the default point used when no `(tag)` is found anywhere
/// (spec.md §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(non_camel_case_types)]
pub enum AttachmentPoint {
    Chest,
    Skull,
    LeftShoulder,
    RightShoulder,
    LeftHand,
    RightHand,
    LeftFoot,
    RightFoot,
    Spine,
    Pelvis,
    Mouth,
    Chin,
    LeftEar,
    RightEar,
    LeftEye,
    RightEye,
    Nose,
    RightUpperArm,
    RightForearm,
    LeftUpperArm,
    LeftForearm,
    RightHip,
    RightUpperLeg,
    RightLowerLeg,
    LeftHip,
    LeftUpperLeg,
    LeftLowerLeg,
    Stomach,
    LeftPec,
    RightPec,
    HudCenter2,
    HudTopRight,
    HudTop,
    HudTopLeft,
    HudCenter,
    HudBottom,
    HudBottomLeft,
    HudBottomRight,
    Neck,
    AvatarCenter,
    LeftRing1,
    RightRing1,
    TailBase,
    TailTip,
    LeftWing,
    RightWing,
    FaceJaw,
    FaceLeftEar,
    FaceRightEar,
    FaceLeftEyebrow,
    FaceRightEyebrow,
    FaceLeftEye,
    FaceRightEye,
    FaceTongue,
    Groin,
    FaceLeftSideburn,
    FaceRightSideburn,
    FaceChin,
    FaceForehead,
    FaceAdjustableEyes,
    FaceAdjustableEyebrows,
    FaceAdjustableLips,
    FaceAdjustableTeeth,
    FaceAdjustableGlabella,
    FaceAdjustableNose,
    FaceAdjustableUpperLip,
    FaceAdjustableLowerLip,
}

pub const ATTACHMENT_POINTS: [AttachmentPoint; 65] = [
    AttachmentPoint::Chest,
    AttachmentPoint::Skull,
    AttachmentPoint::LeftShoulder,
    AttachmentPoint::RightShoulder,
    AttachmentPoint::LeftHand,
    AttachmentPoint::RightHand,
    AttachmentPoint::LeftFoot,
    AttachmentPoint::RightFoot,
    AttachmentPoint::Spine,
    AttachmentPoint::Pelvis,
    AttachmentPoint::Mouth,
    AttachmentPoint::Chin,
    AttachmentPoint::LeftEar,
    AttachmentPoint::RightEar,
    AttachmentPoint::LeftEye,
    AttachmentPoint::RightEye,
    AttachmentPoint::Nose,
    AttachmentPoint::RightUpperArm,
    AttachmentPoint::RightForearm,
    AttachmentPoint::LeftUpperArm,
    AttachmentPoint::LeftForearm,
    AttachmentPoint::RightHip,
    AttachmentPoint::RightUpperLeg,
    AttachmentPoint::RightLowerLeg,
    AttachmentPoint::LeftHip,
    AttachmentPoint::LeftUpperLeg,
    AttachmentPoint::LeftLowerLeg,
    AttachmentPoint::Stomach,
    AttachmentPoint::LeftPec,
    AttachmentPoint::RightPec,
    AttachmentPoint::HudCenter2,
    AttachmentPoint::HudTopRight,
    AttachmentPoint::HudTop,
    AttachmentPoint::HudTopLeft,
    AttachmentPoint::HudCenter,
    AttachmentPoint::HudBottom,
    AttachmentPoint::HudBottomLeft,
    AttachmentPoint::HudBottomRight,
    AttachmentPoint::Neck,
    AttachmentPoint::AvatarCenter,
    AttachmentPoint::LeftRing1,
    AttachmentPoint::RightRing1,
    AttachmentPoint::TailBase,
    AttachmentPoint::TailTip,
    AttachmentPoint::LeftWing,
    AttachmentPoint::RightWing,
    AttachmentPoint::FaceJaw,
    AttachmentPoint::FaceLeftEar,
    AttachmentPoint::FaceRightEar,
    AttachmentPoint::FaceLeftEyebrow,
    AttachmentPoint::FaceRightEyebrow,
    AttachmentPoint::FaceLeftEye,
    AttachmentPoint::FaceRightEye,
    AttachmentPoint::FaceTongue,
    AttachmentPoint::Groin,
    AttachmentPoint::FaceLeftSideburn,
    AttachmentPoint::FaceRightSideburn,
    AttachmentPoint::FaceChin,
    AttachmentPoint::FaceForehead,
    AttachmentPoint::FaceAdjustableEyes,
    AttachmentPoint::FaceAdjustableEyebrows,
    AttachmentPoint::FaceAdjustableLips,
    AttachmentPoint::FaceAdjustableTeeth,
    AttachmentPoint::FaceAdjustableGlabella,
    AttachmentPoint::FaceAdjustableNose,
    AttachmentPoint::FaceAdjustableUpperLip,
    AttachmentPoint::FaceAdjustableLowerLip,
];

impl AttachmentPoint {
    pub const DEFAULT: AttachmentPoint = AttachmentPoint::RightHand;

    pub fn as_str(self) -> &'static str {
        match self {
            AttachmentPoint::Chest => "chest",
            AttachmentPoint::Skull => "skull",
            AttachmentPoint::LeftShoulder => "left shoulder",
            AttachmentPoint::RightShoulder => "right shoulder",
            AttachmentPoint::LeftHand => "left hand",
            AttachmentPoint::RightHand => "right hand",
            AttachmentPoint::LeftFoot => "left foot",
            AttachmentPoint::RightFoot => "right foot",
            AttachmentPoint::Spine => "spine",
            AttachmentPoint::Pelvis => "pelvis",
            AttachmentPoint::Mouth => "mouth",
            AttachmentPoint::Chin => "chin",
            AttachmentPoint::LeftEar => "left ear",
            AttachmentPoint::RightEar => "right ear",
            AttachmentPoint::LeftEye => "left eye",
            AttachmentPoint::RightEye => "right eye",
            AttachmentPoint::Nose => "nose",
            AttachmentPoint::RightUpperArm => "right upper arm",
            AttachmentPoint::RightForearm => "right forearm",
            AttachmentPoint::LeftUpperArm => "left upper arm",
            AttachmentPoint::LeftForearm => "left forearm",
            AttachmentPoint::RightHip => "right hip",
            AttachmentPoint::RightUpperLeg => "right upper leg",
            AttachmentPoint::RightLowerLeg => "right lower leg",
            AttachmentPoint::LeftHip => "left hip",
            AttachmentPoint::LeftUpperLeg => "left upper leg",
            AttachmentPoint::LeftLowerLeg => "left lower leg",
            AttachmentPoint::Stomach => "stomach",
            AttachmentPoint::LeftPec => "left pec",
            AttachmentPoint::RightPec => "right pec",
            AttachmentPoint::HudCenter2 => "hud center 2",
            AttachmentPoint::HudTopRight => "hud top right",
            AttachmentPoint::HudTop => "hud top",
            AttachmentPoint::HudTopLeft => "hud top left",
            AttachmentPoint::HudCenter => "hud center",
            AttachmentPoint::HudBottom => "hud bottom",
            AttachmentPoint::HudBottomLeft => "hud bottom left",
            AttachmentPoint::HudBottomRight => "hud bottom right",
            AttachmentPoint::Neck => "neck",
            AttachmentPoint::AvatarCenter => "avatar center",
            AttachmentPoint::LeftRing1 => "left ring 1",
            AttachmentPoint::RightRing1 => "right ring 1",
            AttachmentPoint::TailBase => "tail base",
            AttachmentPoint::TailTip => "tail tip",
            AttachmentPoint::LeftWing => "left wing",
            AttachmentPoint::RightWing => "right wing",
            AttachmentPoint::FaceJaw => "jaw",
            AttachmentPoint::FaceLeftEar => "alt left ear",
            AttachmentPoint::FaceRightEar => "alt right ear",
            AttachmentPoint::FaceLeftEyebrow => "left eyebrow",
            AttachmentPoint::FaceRightEyebrow => "right eyebrow",
            AttachmentPoint::FaceLeftEye => "alt left eye",
            AttachmentPoint::FaceRightEye => "alt right eye",
            AttachmentPoint::FaceTongue => "tongue",
            AttachmentPoint::Groin => "groin",
            AttachmentPoint::FaceLeftSideburn => "left sideburn",
            AttachmentPoint::FaceRightSideburn => "right sideburn",
            AttachmentPoint::FaceChin => "alt chin",
            AttachmentPoint::FaceForehead => "forehead",
            AttachmentPoint::FaceAdjustableEyes => "adjustable eyes",
            AttachmentPoint::FaceAdjustableEyebrows => "adjustable eyebrows",
            AttachmentPoint::FaceAdjustableLips => "adjustable lips",
            AttachmentPoint::FaceAdjustableTeeth => "adjustable teeth",
            AttachmentPoint::FaceAdjustableGlabella => "adjustable glabella",
            AttachmentPoint::FaceAdjustableNose => "adjustable nose",
            AttachmentPoint::FaceAdjustableUpperLip => "adjustable upper lip",
            AttachmentPoint::FaceAdjustableLowerLip => "adjustable lower lip",
        }
    }

    pub fn is_hud(self) -> bool {
        matches!(
            self,
            AttachmentPoint::HudCenter2
                | AttachmentPoint::HudTopRight
                | AttachmentPoint::HudTop
                | AttachmentPoint::HudTopLeft
                | AttachmentPoint::HudCenter
                | AttachmentPoint::HudBottom
                | AttachmentPoint::HudBottomLeft
                | AttachmentPoint::HudBottomRight
        )
    }

    pub fn from_name(name: &str) -> Option<Self> {
        NAME_LOOKUP.get(&normalize_point_name(name)).copied()
    }

    pub fn bitmap_index(self) -> usize {
        ATTACHMENT_POINTS
            .iter()
            .position(|p| *p == self)
            .expect("exhaustive table")
    }
}

fn normalize_point_name(name: &str) -> String {
    name.to_ascii_lowercase().replace(['_', '-'], " ")
}

static NAME_LOOKUP: Lazy<HashMap<String, AttachmentPoint>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for point in ATTACHMENT_POINTS {
        map.insert(normalize_point_name(point.as_str()), point);
        // also accept the name with spaces collapsed (e.g. "righthand")
        map.insert(point.as_str().replace(' ', ""), point);
    }
    map
});

/// Matches a `(tag)` group in an item or folder name. The *last* match wins
/// per spec.md §3.
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([^()]+)\)").unwrap());

/// Extract the attachment point named by the last `(tag)` group in `name`,
/// if any recognized tag is present.
pub fn last_tag_attachment_point(name: &str) -> Option<AttachmentPoint> {
    TAG_RE
        .captures_iter(name)
        .filter_map(|c| AttachmentPoint::from_name(c.get(1)?.as_str()))
        .last()
}

/// Policy constant: characters forbidden in a `/`-prefixed chat message while
/// `@sendchat=n` is active (spec.md §4.5, §9).
pub const FORBIDDEN_CHAT_CHARS: &str = "()\"-*=_^";
