//! The forced-action executor: turns a resolved `Dispatch::Force` into a
//! batch of host callbacks, after checking the relevant permissions
//! (spec.md §4.7).
//!
//! Like [`crate::permissions`] and [`crate::getters`], this module is pure:
//! it never calls the host itself. The facade calls [`execute`] and then
//! dispatches the returned [`HostAction`]s through the host traits.

use crate::behaviors::Behavior;
use crate::constants::{AttachmentPoint, WearableType};
use crate::inventory::{FolderIdx, InventoryMap, Item, ItemIdx};
use crate::locked_folders::LockedFolderMap;
use crate::permissions;
use crate::restriction::RestrictionStore;
use uuid::Uuid;

pub struct ForceContext<'a> {
    pub store: &'a RestrictionStore,
    pub locks: &'a LockedFolderMap,
    pub inv: &'a InventoryMap,
    /// Prim id of the object that issued the `=force` command.
    pub issuer: Uuid,
    pub permissive: bool,
    /// `Some(seat_object)` if the avatar is currently sitting.
    pub currently_sitting: Option<Uuid>,
    pub camera_locked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttachItem {
    pub item_id: Uuid,
    pub point: AttachmentPoint,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HostAction {
    SetRot(f64),
    AdjustHeight { distance: f64, factor: f64, delta: f64 },
    SetCamFov(f64),
    TpTo { x: f64, y: f64, z: f64, look_at_yaw: Option<f64> },
    Sit(Uuid),
    Unsit,
    SitGround,
    SetGroup(String),
    SetDebug { name: String, value: String },
    SetEnv { name: String, value: String },
    Attach { items: Vec<AttachItem>, replace: bool },
    Detach { items: Vec<Uuid> },
}

/// Execute one `=force` dispatch. Returns the (possibly empty) batch of host
/// callbacks; an empty result means either the command carried no
/// actionable payload or a permission check denied it.
pub fn execute(behavior: Behavior, suffix: Option<&str>, raw_option: &str, ctx: &ForceContext) -> Vec<HostAction> {
    use Behavior::*;
    match behavior {
        Sit => force_sit(raw_option, ctx),
        Unsit => force_unsit(ctx),
        SitGround => force_sit_ground(ctx),
        SetRot => parse_f64(raw_option).map(HostAction::SetRot).into_iter().collect(),
        AdjustHeight => force_adjust_height(raw_option),
        SetCamFov => force_set_cam_fov(raw_option, ctx),
        TpTo => force_tp_to(raw_option, ctx),
        SetGroup => vec![HostAction::SetGroup(raw_option.to_string())],
        SetDebugDynamic => suffix
            .map(|name| HostAction::SetDebug { name: name.to_string(), value: raw_option.to_string() })
            .into_iter()
            .collect(),
        SetEnvDynamic => suffix
            .map(|name| HostAction::SetEnv { name: name.to_string(), value: raw_option.to_string() })
            .into_iter()
            .collect(),

        Attach | AttachOver | AttachAll | AttachAllOver | AddOutfitAll | AddOutfitOver | AddOutfitAllOver => {
            force_attach_path(behavior, raw_option, ctx)
        }
        AttachThis | AttachAllThis => force_attach_this(behavior, raw_option, ctx),

        Detach | RemAttach => force_detach_selector(raw_option, ctx),
        DetachMe => force_detach_me(ctx),
        DetachAll => force_detach_path(raw_option, ctx),
        DetachThis | DetachAllThis => force_detach_this(behavior, raw_option, ctx),
        RemOutfit => force_rem_outfit(raw_option, ctx),

        _ => Vec::new(),
    }
}

fn parse_f64(raw: &str) -> Option<f64> {
    raw.trim().parse().ok()
}

// ---------------------------------------------------------------------
// Simple scalar force actions
// ---------------------------------------------------------------------

fn force_sit(raw_option: &str, ctx: &ForceContext) -> Vec<HostAction> {
    let Ok(target) = Uuid::parse_str(raw_option.trim()) else { return Vec::new() };
    if !permissions::can_sit(ctx.store) {
        return Vec::new();
    }
    if ctx.currently_sitting.is_some() && (!permissions::can_unsit(ctx.store) || !permissions::can_stand_tp(ctx.store)) {
        return Vec::new();
    }
    vec![HostAction::Sit(target)]
}

fn force_unsit(ctx: &ForceContext) -> Vec<HostAction> {
    if ctx.currently_sitting.is_none() || !permissions::can_unsit(ctx.store) {
        return Vec::new();
    }
    vec![HostAction::Unsit]
}

fn force_sit_ground(ctx: &ForceContext) -> Vec<HostAction> {
    if !permissions::can_sit(ctx.store) {
        return Vec::new();
    }
    if ctx.currently_sitting.is_some() && !permissions::can_unsit(ctx.store) {
        return Vec::new();
    }
    vec![HostAction::SitGround]
}

/// `adjustheight:distance[;factor[;delta]]` — factor defaults to 1.0, delta
/// to 0.0, matching the composite grammar's bespoke parsing (spec.md §4.7).
fn force_adjust_height(raw_option: &str) -> Vec<HostAction> {
    let mut parts = raw_option.split(';');
    let Some(distance) = parts.next().and_then(parse_f64) else { return Vec::new() };
    let factor = parts.next().and_then(parse_f64).unwrap_or(1.0);
    let delta = parts.next().and_then(parse_f64).unwrap_or(0.0);
    vec![HostAction::AdjustHeight { distance, factor, delta }]
}

fn force_set_cam_fov(raw_option: &str, ctx: &ForceContext) -> Vec<HostAction> {
    if ctx.camera_locked {
        return Vec::new();
    }
    parse_f64(raw_option).map(HostAction::SetCamFov).into_iter().collect()
}

/// `tpto:x/y/z[;lookat_yaw]` (spec.md §4.7).
fn force_tp_to(raw_option: &str, ctx: &ForceContext) -> Vec<HostAction> {
    if !permissions::can_tp_loc(ctx.store) || !permissions::can_unsit(ctx.store) {
        return Vec::new();
    }
    let mut segments = raw_option.splitn(2, ';');
    let Some(coords) = segments.next() else { return Vec::new() };
    let parts: Vec<&str> = coords.split('/').collect();
    if parts.len() != 3 {
        return Vec::new();
    }
    let (Some(x), Some(y), Some(z)) = (parse_f64(parts[0]), parse_f64(parts[1]), parse_f64(parts[2])) else {
        return Vec::new();
    };
    let look_at_yaw = segments.next().and_then(parse_f64);
    vec![HostAction::TpTo { x, y, z, look_at_yaw }]
}

// ---------------------------------------------------------------------
// Attach folder families
// ---------------------------------------------------------------------

fn force_attach_path(behavior: Behavior, raw_option: &str, ctx: &ForceContext) -> Vec<HostAction> {
    use Behavior::*;
    let Some(root_folder) = ctx.inv.resolve_from_root(raw_option) else { return Vec::new() };
    let recursive = matches!(behavior, AttachAll | AttachAllOver | AddOutfitAll | AddOutfitAllOver);
    let default_replace = !matches!(behavior, AttachOver | AttachAllOver | AddOutfitOver | AddOutfitAllOver);
    let folders = if recursive { ctx.inv.folder_and_descendants(root_folder) } else { vec![root_folder] };
    build_attach_batch(ctx, &folders, root_folder, default_replace)
}

/// `attachthis`/`attachallthis` force variant: the starting folder set comes
/// from a selector (empty → issuer's own folders, uuid → that prim's
/// folders, wearable/attachment-point name → folders containing an item of
/// that kind), not a path (spec.md §4.7).
fn force_attach_this(behavior: Behavior, raw_option: &str, ctx: &ForceContext) -> Vec<HostAction> {
    let starts = selector_folders(ctx.inv, raw_option, ctx.issuer);
    if starts.is_empty() {
        return Vec::new();
    }
    let recursive = matches!(behavior, Behavior::AttachAllThis);
    let mut folders = Vec::new();
    for start in &starts {
        if recursive {
            folders.extend(ctx.inv.folder_and_descendants(*start));
        } else {
            folders.push(*start);
        }
    }
    build_attach_batch(ctx, &folders, starts[0], true)
}

fn selector_folders(inv: &InventoryMap, selector: &str, issuer: Uuid) -> Vec<FolderIdx> {
    let from_items = |items: &[ItemIdx]| -> Vec<FolderIdx> {
        let mut out: Vec<FolderIdx> = items.iter().filter_map(|&i| inv.item(i).parent_folder).collect();
        out.sort_unstable();
        out.dedup();
        out
    };
    if selector.is_empty() {
        return from_items(inv.items_by_prim_id(issuer));
    }
    if let Ok(uuid) = Uuid::parse_str(selector) {
        return from_items(inv.items_by_prim_id(uuid));
    }
    if let Some(w) = WearableType::from_name(selector) {
        return from_items(inv.items_by_wearable_type(w));
    }
    if let Some(p) = AttachmentPoint::from_name(selector) {
        return from_items(inv.items_by_attachment_point(p));
    }
    Vec::new()
}

/// Collect every not-currently-worn item under `folders` (recursing into
/// each folder's own subtree, skipping hidden subfolders) and resolve each
/// item's attachment point (last `(tag)` on the item, else on the folder,
/// else the default point). Forced attach does not consult `CanAttach` —
/// only the detach path checks its permission gate (spec.md §4.7's item
/// detachability rule names `CanDetach` and nothing analogous for attach;
/// an intentional asymmetry, not an oversight).
/// `replace` is forced off if `primary_folder`'s name is `+`-prefixed
/// (spec.md §4.7).
fn build_attach_batch(ctx: &ForceContext, folders: &[FolderIdx], primary_folder: FolderIdx, default_replace: bool) -> Vec<HostAction> {
    let replace = default_replace && !crate::inventory::tree::is_no_replace_on_attach(&ctx.inv.folder(primary_folder).name);

    let mut seen = std::collections::HashSet::new();
    let mut items = Vec::new();
    for &folder in folders {
        collect_items_recursive(ctx.inv, folder, &mut items);
    }

    let mut batch = Vec::new();
    for (item, folder) in items {
        if item.is_worn() || !seen.insert(item.id) {
            continue;
        }
        let point = crate::constants::last_tag_attachment_point(&item.name)
            .or_else(|| crate::constants::last_tag_attachment_point(&ctx.inv.folder(folder).name))
            .unwrap_or(AttachmentPoint::DEFAULT);
        batch.push(AttachItem { item_id: item.id, point });
    }
    if batch.is_empty() {
        Vec::new()
    } else {
        vec![HostAction::Attach { items: batch, replace }]
    }
}

fn collect_items_recursive<'a>(inv: &'a InventoryMap, folder: FolderIdx, out: &mut Vec<(&'a Item, FolderIdx)>) {
    for &idx in &inv.folder(folder).items {
        out.push((inv.item(idx), folder));
    }
    for desc in inv.descendants_skip_hidden(folder) {
        for &idx in &inv.folder(desc).items {
            out.push((inv.item(idx), desc));
        }
    }
}

// ---------------------------------------------------------------------
// Detach / remove-outfit families
// ---------------------------------------------------------------------

fn force_detach_selector(raw_option: &str, ctx: &ForceContext) -> Vec<HostAction> {
    let items = if raw_option.is_empty() {
        ctx.inv.items_by_prim_id(ctx.issuer).to_vec()
    } else if let Ok(uuid) = Uuid::parse_str(raw_option) {
        ctx.inv.items_by_id(uuid).to_vec()
    } else if let Some(p) = AttachmentPoint::from_name(raw_option) {
        ctx.inv.items_by_attachment_point(p).to_vec()
    } else {
        Vec::new()
    };
    detach_batch(ctx, &items, false)
}

fn force_detach_me(ctx: &ForceContext) -> Vec<HostAction> {
    detach_batch(ctx, &ctx.inv.items_by_prim_id(ctx.issuer).to_vec(), true)
}

fn force_detach_path(raw_option: &str, ctx: &ForceContext) -> Vec<HostAction> {
    let Some(root) = ctx.inv.resolve_from_root(raw_option) else { return Vec::new() };
    let mut items = Vec::new();
    for folder in ctx.inv.folder_and_descendants(root) {
        items.extend(ctx.inv.folder(folder).items.iter().copied());
    }
    detach_batch(ctx, &items, false)
}

fn force_detach_this(behavior: Behavior, raw_option: &str, ctx: &ForceContext) -> Vec<HostAction> {
    let starts = selector_folders(ctx.inv, raw_option, ctx.issuer);
    let recursive = matches!(behavior, Behavior::DetachAllThis);
    let mut folders = Vec::new();
    for start in &starts {
        if recursive {
            folders.extend(ctx.inv.folder_and_descendants(*start));
        } else {
            folders.push(*start);
        }
    }
    let mut items = Vec::new();
    for folder in folders {
        items.extend(ctx.inv.folder(folder).items.iter().copied());
    }
    detach_batch(ctx, &items, false)
}

fn force_rem_outfit(raw_option: &str, ctx: &ForceContext) -> Vec<HostAction> {
    let items: Vec<ItemIdx> = if raw_option.is_empty() {
        ctx.inv.items.iter().enumerate().filter(|(_, it)| it.wearable_type.is_some()).map(|(i, _)| i).collect()
    } else if let Some(w) = WearableType::from_name(raw_option) {
        ctx.inv.items_by_wearable_type(w).to_vec()
    } else {
        Vec::new()
    };
    detach_batch(ctx, &items, false)
}

/// Filter `items` by the detachability rule and emit one `Detach` batch
/// (spec.md §4.7): must be worn; unless `is_detachme`, a `nostrip` substring
/// in the item or its parent folder's name forbids (a link is exempt);
/// always-undetachable wearable layers forbid; `CanDetach` must allow.
fn detach_batch(ctx: &ForceContext, candidates: &[ItemIdx], is_detachme: bool) -> Vec<HostAction> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for &idx in candidates {
        let item = ctx.inv.item(idx);
        if !item.is_worn() || !seen.insert(item.id) {
            continue;
        }
        if !is_detachme && !item.is_link && nostrip_guards(ctx.inv, item) {
            continue;
        }
        if item.wearable_type.map(WearableType::always_undetachable).unwrap_or(false) {
            continue;
        }
        if !permissions::can_detach(ctx.store, ctx.locks, item) {
            continue;
        }
        out.push(item.id);
    }
    if out.is_empty() {
        Vec::new()
    } else {
        vec![HostAction::Detach { items: out }]
    }
}

fn nostrip_guards(inv: &InventoryMap, item: &Item) -> bool {
    if crate::inventory::tree::is_nostrip(&item.name) {
        return true;
    }
    item.parent_folder.map(|f| inv.folder_is_nostrip(f)).unwrap_or(false)
}
