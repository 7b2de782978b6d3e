//! The permission evaluator: pure functions from restriction-store state
//! (plus call-site context) to boolean/value answers (spec.md §4.5).
//!
//! Per the source-language re-architecture note (spec.md §9), secure/exception
//! resolution for every `{normal, secure?, from_to?}` family is routed
//! through one function, [`evaluate_triplet`], rather than being duplicated
//! per behavior.

use crate::behaviors::Behavior;
use crate::constants::{AttachmentPoint, FORBIDDEN_CHAT_CHARS, WearableType};
use crate::grammar::{Args, UuidOrString};
use crate::inventory::Item;
use crate::locked_folders::LockedFolderMap;
use crate::restriction::RestrictionStore;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTarget<'a> {
    Id(Uuid),
    Name(&'a str),
    Channel(i64),
}

fn restriction_names(args: &Args, target: MatchTarget<'_>) -> bool {
    match (args, target) {
        (Args::Uuid(u), MatchTarget::Id(t)) => u == &t,
        (Args::UuidOrString(UuidOrString::Id(u)), MatchTarget::Id(t)) => u == &t,
        (Args::UuidOrString(UuidOrString::Name(n)), MatchTarget::Name(t)) => n.eq_ignore_ascii_case(t),
        (Args::UuidOrString(UuidOrString::AllGroups), MatchTarget::Name(_)) => true,
        (Args::Int(n), MatchTarget::Channel(t)) => *n == t,
        _ => false,
    }
}

/// Reads the `permissive` restriction straight off the store. `default` is
/// the configured initial value (see `EngineConfig`, SPEC_FULL.md §10.3).
/// Per spec.md §4.5, mode is on unless at least one `permissive` restriction
/// is active — the restriction, when present, always forces the mode off,
/// regardless of `default`.
pub fn permissive_mode(store: &RestrictionStore, default: bool) -> bool {
    if !store.by_behavior(Behavior::Permissive).is_empty() {
        false
    } else {
        default
    }
}

/// The three-phase secure/exception resolver of spec.md §4.5, generic over
/// any `(normal, secure?, from_to?)` triplet.
pub fn evaluate_triplet(
    store: &RestrictionStore,
    permissive: bool,
    normal: Behavior,
    secure: Option<Behavior>,
    from_to: Option<Behavior>,
    target: MatchTarget<'_>,
) -> bool {
    if let Some(t_behavior) = from_to {
        if store.by_behavior(t_behavior).iter().any(|r| restriction_names(&r.args, target)) {
            return false;
        }
    }

    let normal_restrictions = store.by_behavior(normal);
    let (n_bare, n_exceptions): (Vec<_>, Vec<_>) =
        normal_restrictions.iter().partition(|r| !r.args.is_argumented());

    if let Some(s_behavior) = secure {
        for r in store.by_behavior(s_behavior) {
            let honored = n_exceptions.iter().any(|e| e.issuer == r.issuer && restriction_names(&e.args, target));
            if !honored {
                return false;
            }
        }
    }

    for r in &n_bare {
        let honored = n_exceptions
            .iter()
            .any(|e| restriction_names(&e.args, target) && (permissive || e.issuer == r.issuer));
        if !honored {
            return false;
        }
    }

    true
}

/// A bare, no-argument restriction check (toggles like `fly`, `showinv`, …
/// that have no secure/exception structure).
pub fn is_restricted(store: &RestrictionStore, behavior: Behavior) -> bool {
    !store.by_behavior(behavior).is_empty()
}

// ---------------------------------------------------------------------
// Teleport
// ---------------------------------------------------------------------

/// `sittp`'s effective maximum is the minimum across restrictions carrying a
/// value, unless at least one restriction has no value (then default 1.5;
/// spec.md §4.3).
pub fn sittp_max(store: &RestrictionStore) -> Option<f64> {
    aggregate_float_min_with_default(store, Behavior::SitTp, 1.5)
}

/// `tplocal` default 0.0 (spec.md §4.3).
pub fn tplocal_max(store: &RestrictionStore) -> Option<f64> {
    aggregate_float_min_with_default(store, Behavior::TpLocal, 0.0)
}

fn aggregate_float_min_with_default(store: &RestrictionStore, behavior: Behavior, default: f64) -> Option<f64> {
    let restrictions = store.by_behavior(behavior);
    if restrictions.is_empty() {
        return None;
    }
    let mut min: Option<f64> = None;
    let mut has_bare = false;
    for r in restrictions {
        match r.args {
            Args::Float(v) => min = Some(min.map_or(v, |m: f64| m.min(v))),
            Args::None => has_bare = true,
            _ => {}
        }
    }
    Some(match min {
        Some(v) if has_bare => v.min(default),
        Some(v) => v,
        None => default,
    })
}

pub fn can_tp_lure(store: &RestrictionStore, permissive: bool, target: MatchTarget<'_>) -> bool {
    evaluate_triplet(store, permissive, Behavior::TpLure, Some(Behavior::TpLureSec), None, target)
}

pub fn can_tp_request(store: &RestrictionStore, permissive: bool, target: MatchTarget<'_>) -> bool {
    evaluate_triplet(store, permissive, Behavior::TpRequest, Some(Behavior::TpRequestSec), None, target)
}

pub fn can_accept_tp(store: &RestrictionStore, permissive: bool, target: MatchTarget<'_>) -> bool {
    evaluate_triplet(store, permissive, Behavior::AcceptTp, None, None, target)
}

pub fn can_unsit(store: &RestrictionStore) -> bool {
    !is_restricted(store, Behavior::Unsit)
}

pub fn can_sit(store: &RestrictionStore) -> bool {
    !is_restricted(store, Behavior::Sit)
}

pub fn can_stand_tp(store: &RestrictionStore) -> bool {
    !is_restricted(store, Behavior::StandTp)
}

pub fn can_tp_loc(store: &RestrictionStore) -> bool {
    !is_restricted(store, Behavior::TpLoc)
}

// ---------------------------------------------------------------------
// IM / chat
// ---------------------------------------------------------------------

pub fn can_send_im(store: &RestrictionStore, permissive: bool, target: MatchTarget<'_>) -> bool {
    evaluate_triplet(store, permissive, Behavior::SendIm, Some(Behavior::SendImSec), Some(Behavior::SendImTo), target)
}

pub fn can_receive_im(store: &RestrictionStore, permissive: bool, target: MatchTarget<'_>) -> bool {
    evaluate_triplet(store, permissive, Behavior::RecvIm, Some(Behavior::RecvImSec), Some(Behavior::RecvImFrom), target)
}

pub fn can_start_im(store: &RestrictionStore, permissive: bool, target: MatchTarget<'_>) -> bool {
    evaluate_triplet(store, permissive, Behavior::StartIm, None, Some(Behavior::StartImTo), target)
}

pub fn can_receive_chat(store: &RestrictionStore, permissive: bool, text: &str, from: MatchTarget<'_>) -> bool {
    if !evaluate_triplet(store, permissive, Behavior::RecvChat, Some(Behavior::RecvChatSec), Some(Behavior::RecvChatFrom), from) {
        // an emote still passes the normal-chat gate when only chat is
        // restricted and the emote behavior itself is unrestricted.
        if text.starts_with("/me ") && !is_restricted(store, Behavior::Emote) {
            return evaluate_triplet(
                store,
                permissive,
                Behavior::RecvEmote,
                Some(Behavior::RecvEmoteSec),
                Some(Behavior::RecvEmoteFrom),
                from,
            );
        }
        return false;
    }
    true
}

/// Channel-0 chat gating with `@sendchat=n` active (spec.md §4.5, §8).
/// `text` is the outgoing message as the avatar typed it.
pub fn can_send_chat_channel0(store: &RestrictionStore, text: &str) -> bool {
    if !is_restricted(store, Behavior::SendChat) {
        return true;
    }
    if text.starts_with("/me ") || text == "/me" {
        return !is_restricted(store, Behavior::Emote);
    }
    if !text.starts_with('/') {
        return false;
    }
    !text.chars().any(|c| FORBIDDEN_CHAT_CHARS.contains(c))
}

/// Non-zero private channel gating (spec.md §4.3 `sendchannel` family).
/// `sendchannel_except` grants unconditional use of a specific channel
/// regardless of any `sendchannel`/`sendchannel_sec` restriction.
pub fn can_send_channel(store: &RestrictionStore, permissive: bool, channel: i64) -> bool {
    let excepted = store
        .by_behavior(Behavior::SendChannelExcept)
        .iter()
        .any(|r| matches!(r.args, Args::Int(c) if c == channel));
    if excepted {
        return true;
    }
    evaluate_triplet(
        store,
        permissive,
        Behavior::SendChannel,
        Some(Behavior::SendChannelSec),
        None,
        MatchTarget::Channel(channel),
    )
}

// ---------------------------------------------------------------------
// Touch
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchLocation {
    RezzedInWorld,
    AttachedSelf,
    AttachedOther,
    Hud,
}

/// `far-touch` max distance check, then the by-location families
/// (spec.md §4.5 "Touch").
pub fn can_touch(
    store: &RestrictionStore,
    location: TouchLocation,
    object: Uuid,
    toucher: Option<Uuid>,
    distance: Option<f64>,
) -> bool {
    if let Some(d) = distance {
        if let Some(max) = touch_far_max(store) {
            if d > max {
                return false;
            }
        }
    }
    if is_restricted(store, Behavior::Interact) {
        return false;
    }
    if let Some(t) = toucher {
        if store.by_behavior(Behavior::TouchMe).iter().any(|r| r.issuer == t) {
            return true;
        }
    }
    if store.by_behavior(Behavior::TouchThis).iter().any(|r| matches!(&r.args, Args::Uuid(u) if *u == object)) {
        return false;
    }
    if !location_is_hud(location) && is_restricted(store, Behavior::TouchAll) {
        return false;
    }
    match location {
        TouchLocation::RezzedInWorld => !denied_with_uuid_exception(store, Behavior::TouchWorld, object),
        TouchLocation::AttachedSelf => {
            !is_restricted(store, Behavior::TouchAttach) && !is_restricted(store, Behavior::TouchAttachSelf)
        }
        TouchLocation::AttachedOther => {
            !is_restricted(store, Behavior::TouchAttach) && !denied_with_uuid_exception(store, Behavior::TouchAttachOther, object)
        }
        TouchLocation::Hud => !denied_with_uuid_exception(store, Behavior::TouchHud, object),
    }
}

fn location_is_hud(location: TouchLocation) -> bool {
    matches!(location, TouchLocation::Hud)
}

/// `behavior` restricted with no args denies everything; restricted with a
/// uuid arg denies only that object (an "exception list" by exclusion, the
/// mirror image of the usual secure-exception pattern — spec.md §4.3).
fn denied_with_uuid_exception(store: &RestrictionStore, behavior: Behavior, object: Uuid) -> bool {
    store.by_behavior(behavior).iter().any(|r| match &r.args {
        Args::None => true,
        Args::Uuid(u) => *u == object,
        _ => false,
    })
}

fn touch_far_max(store: &RestrictionStore) -> Option<f64> {
    let restrictions = store.by_behavior(Behavior::TouchFar);
    if restrictions.is_empty() {
        return None;
    }
    let mut min: Option<f64> = None;
    for r in restrictions {
        if let Args::Float(v) = r.args {
            min = Some(min.map_or(v, |m: f64| m.min(v)));
        }
    }
    min
}

// ---------------------------------------------------------------------
// Attach / Detach
// ---------------------------------------------------------------------

/// spec.md §4.5 "Attach/Detach": evaluate whether `item` may be attached.
pub fn can_attach(store: &RestrictionStore, locks: &LockedFolderMap, item: &Item) -> bool {
    if denied_by_outfit_restriction(store, Behavior::AddOutfit, item.wearable_type) {
        return false;
    }
    if denied_by_point_restriction(store, Behavior::AddAttach, item.worn_on_point) {
        return false;
    }
    shared_or_unshared_allows(store, locks, item, true)
}

/// spec.md §4.5 "Attach/Detach": evaluate whether `item` may be detached.
pub fn can_detach(store: &RestrictionStore, locks: &LockedFolderMap, item: &Item) -> bool {
    if denied_by_outfit_restriction(store, Behavior::RemOutfit, item.wearable_type) {
        return false;
    }
    if denied_by_point_restriction(store, Behavior::RemAttach, item.worn_on_point) {
        return false;
    }
    for r in store.by_behavior(Behavior::Detach) {
        match (&r.args, item.worn_on_point) {
            (Args::None, _) => return false,
            (Args::AttachmentPoint(p), Some(worn)) if *p == worn => return false,
            _ => {}
        }
    }
    shared_or_unshared_allows(store, locks, item, false)
}

fn denied_by_outfit_restriction(store: &RestrictionStore, behavior: Behavior, wearable_type: Option<WearableType>) -> bool {
    store.by_behavior(behavior).iter().any(|r| match (&r.args, wearable_type) {
        (Args::None, _) => true,
        (Args::WearableType(w), Some(worn)) => *w == worn,
        _ => false,
    })
}

fn denied_by_point_restriction(store: &RestrictionStore, behavior: Behavior, point: Option<AttachmentPoint>) -> bool {
    store.by_behavior(behavior).iter().any(|r| match (&r.args, point) {
        (Args::None, _) => true,
        (Args::AttachmentPoint(p), Some(worn)) => *p == worn,
        _ => false,
    })
}

fn shared_or_unshared_allows(store: &RestrictionStore, locks: &LockedFolderMap, item: &Item, attaching: bool) -> bool {
    if let Some(folder) = item.parent_folder {
        let wear_restricted = is_restricted(store, Behavior::SharedWear);
        let unwear_restricted = is_restricted(store, Behavior::SharedUnwear);
        if attaching && wear_restricted {
            return false;
        }
        if !attaching && unwear_restricted {
            return false;
        }
        if attaching {
            locks.can_attach(folder)
        } else {
            locks.can_detach(folder)
        }
    } else {
        if attaching {
            !is_restricted(store, Behavior::UnsharedWear)
        } else {
            !is_restricted(store, Behavior::UnsharedUnwear)
        }
    }
}

// ---------------------------------------------------------------------
// Camera
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraSnapshot {
    pub zoom_min: Option<f64>,
    pub zoom_max: Option<f64>,
    pub draw_min: Option<f64>,
    pub draw_max: Option<f64>,
    pub fov_min: Option<f64>,
    pub fov_max: Option<f64>,
    pub avdist_min: Option<f64>,
    pub avdist_max: Option<f64>,
    pub draw_color: Option<[f64; 3]>,
    pub texture: Option<Uuid>,
    pub locked: bool,
}

/// Aggregate every camera restriction into one snapshot (spec.md §3
/// "Derived camera restriction snapshot", §4.5 "Camera").
pub fn camera_snapshot(store: &RestrictionStore) -> CameraSnapshot {
    CameraSnapshot {
        zoom_min: aggregate_float(store, Behavior::CamZoomMin, f64::max),
        zoom_max: aggregate_float(store, Behavior::CamZoomMax, f64::min),
        draw_min: aggregate_float(store, Behavior::CamDrawMin, f64::max),
        draw_max: aggregate_float(store, Behavior::CamDrawMax, f64::min),
        fov_min: aggregate_float(store, Behavior::CamFovMin, f64::max),
        fov_max: aggregate_float(store, Behavior::CamFovMax, f64::min),
        avdist_min: aggregate_float(store, Behavior::CamAvDistMin, f64::max),
        avdist_max: aggregate_float(store, Behavior::CamAvDistMax, f64::min),
        draw_color: average_color(store),
        texture: last_texture(store),
        locked: is_restricted(store, Behavior::CamUnlock),
    }
}

fn aggregate_float(store: &RestrictionStore, behavior: Behavior, combine: fn(f64, f64) -> f64) -> Option<f64> {
    let mut acc: Option<f64> = None;
    for r in store.by_behavior(behavior) {
        if let Args::Float(v) = r.args {
            acc = Some(acc.map_or(v, |a| combine(a, v)));
        }
    }
    acc
}

fn average_color(store: &RestrictionStore) -> Option<[f64; 3]> {
    let restrictions = store.by_behavior(Behavior::CamDrawColor);
    if restrictions.is_empty() {
        return None;
    }
    let mut sum = [0.0f64; 3];
    let mut count = 0usize;
    for r in restrictions {
        if let Args::ColorTriple(c) = r.args {
            for i in 0..3 {
                sum[i] += c[i];
            }
            count += 1;
        }
    }
    if count == 0 {
        return None;
    }
    Some([
        (sum[0] / count as f64).clamp(0.0, 1.0),
        (sum[1] / count as f64).clamp(0.0, 1.0),
        (sum[2] / count as f64).clamp(0.0, 1.0),
    ])
}

fn last_texture(store: &RestrictionStore) -> Option<Uuid> {
    store.by_behavior(Behavior::CamTextures).iter().rev().find_map(|r| match r.args {
        Args::Uuid(u) => Some(u),
        Args::None => Some(Uuid::nil()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::restriction::Restriction;

    fn add(store: &mut RestrictionStore, behavior: Behavior, issuer: Uuid, args: Args) {
        store.add(Restriction {
            behavior,
            original_behavior: behavior.canonical_name().into(),
            issuer,
            issuer_name: "x".into(),
            args,
        });
    }

    #[test]
    fn sittp_takes_minimum_across_restrictions() {
        let mut store = RestrictionStore::new();
        let issuer = Uuid::new_v4();
        add(&mut store, Behavior::SitTp, issuer, Args::Float(2.5));
        add(&mut store, Behavior::SitTp, issuer, Args::Float(4.5));
        add(&mut store, Behavior::SitTp, issuer, Args::Float(3.5));
        assert_eq!(sittp_max(&store), Some(2.5));
    }

    #[test]
    fn recv_im_sec_requires_same_issuer_exception() {
        let mut store = RestrictionStore::new();
        let i1 = Uuid::new_v4();
        let i2 = Uuid::new_v4();
        let u1 = Uuid::new_v4();
        let u2 = Uuid::new_v4();
        add(&mut store, Behavior::RecvImSec, i1, Args::None);
        add(&mut store, Behavior::RecvIm, i1, Args::UuidOrString(UuidOrString::Id(u1)));
        add(&mut store, Behavior::RecvIm, i2, Args::UuidOrString(UuidOrString::Id(u2)));
        assert!(can_receive_im(&store, false, MatchTarget::Id(u1)));
        assert!(!can_receive_im(&store, false, MatchTarget::Id(u2)));
    }

    #[test]
    fn recv_chat_blocks_text_but_emote_passes() {
        let mut store = RestrictionStore::new();
        let issuer = Uuid::new_v4();
        add(&mut store, Behavior::RecvChat, issuer, Args::None);
        let u = Uuid::new_v4();
        assert!(!can_receive_chat(&store, false, "Hello", MatchTarget::Id(u)));
        assert!(can_receive_chat(&store, false, "/me says Hello", MatchTarget::Id(u)));
    }

    #[test]
    fn send_chat_channel0_gating() {
        let mut store = RestrictionStore::new();
        let issuer = Uuid::new_v4();
        add(&mut store, Behavior::SendChat, issuer, Args::None);
        assert!(can_send_chat_channel0(&store, "/ok text"));
        assert!(!can_send_chat_channel0(&store, "no leading slash"));
        assert!(!can_send_chat_channel0(&store, "/bad(text)"));
        assert!(can_send_chat_channel0(&store, "/me waves"));
    }

    #[test]
    fn touchhud_blocks_only_named_object_when_argumented() {
        let mut store = RestrictionStore::new();
        let issuer = Uuid::new_v4();
        let x = Uuid::new_v4();
        let other = Uuid::new_v4();
        add(&mut store, Behavior::TouchHud, issuer, Args::Uuid(x));
        assert!(!can_touch(&store, TouchLocation::Hud, x, None, None));
        assert!(can_touch(&store, TouchLocation::Hud, other, None, None));
    }

    #[test]
    fn touchhud_bare_blocks_all_hud_touches() {
        let mut store = RestrictionStore::new();
        let issuer = Uuid::new_v4();
        add(&mut store, Behavior::TouchHud, issuer, Args::None);
        assert!(!can_touch(&store, TouchLocation::Hud, Uuid::new_v4(), None, None));
        assert!(can_touch(&store, TouchLocation::AttachedSelf, Uuid::new_v4(), None, None));
        assert!(can_touch(&store, TouchLocation::RezzedInWorld, Uuid::new_v4(), None, Some(5.0)));
    }

    #[test]
    fn permissive_mode_flips_to_off_when_restriction_active() {
        let mut store = RestrictionStore::new();
        assert!(permissive_mode(&store, true));
        add(&mut store, Behavior::Permissive, Uuid::new_v4(), Args::None);
        assert!(!permissive_mode(&store, true));
    }
}
