//! The get-request handler: turns a resolved `Dispatch::Get` into a reply
//! string for the host's reply-channel callback (spec.md §4.6).
//!
//! Everything here is pure formatting over already-fetched state. Values the
//! engine doesn't own itself — camera settings, active group, sit id, env/
//! debug settings — are passed in from whatever the host callback returned;
//! this module never calls out on its own.

use crate::blacklist::Blacklist;
use crate::constants::{AttachmentPoint, WearableType, ATTACHMENT_POINTS, WEARABLE_TYPES};
use crate::grammar::{Args, FolderPathOrLayer, FolderPathOrLayerKind, UuidOrString};
use crate::inventory::{FolderIdx, InventoryMap, Item};
use crate::restriction::{Restriction, RestrictionStore};
use uuid::Uuid;

pub const VERSION_STRING: &str = "RestrainedLove viewer v3.4.3 (RLVa 2.4.2)";
pub const VERSION_NUM: &str = "2040213";
pub const NULL_KEY: &str = "00000000-0000-0000-0000-000000000000";

pub fn version_reply() -> String {
    VERSION_STRING.to_string()
}

pub fn version_num_reply() -> String {
    VERSION_NUM.to_string()
}

pub fn version_num_bl_reply(blacklist: &Blacklist) -> String {
    format!("{},{}", VERSION_NUM, blacklist.all_sorted().join(","))
}

pub fn get_blacklist_reply(blacklist: &Blacklist, substr: &str) -> String {
    blacklist.matching(substr).join(",")
}

/// `substr;sep` split, defaulting `sep` to `/` when absent or empty
/// (spec.md §4.6 `getstatus`).
fn split_substr_sep(raw_option: &str) -> (&str, &str) {
    let mut parts = raw_option.splitn(2, ';');
    let substr = parts.next().unwrap_or("");
    let sep = parts.next().filter(|s| !s.is_empty()).unwrap_or("/");
    (substr, sep)
}

pub fn get_status_reply(store: &RestrictionStore, raw_option: &str, issuer_filter: Option<Uuid>) -> String {
    let (substr, sep) = split_substr_sep(raw_option);
    store
        .snapshot(substr, issuer_filter)
        .iter()
        .map(|r| format!("{}{}", sep, format_restriction(r)))
        .collect()
}

pub(crate) fn format_restriction(r: &Restriction) -> String {
    match render_args(&r.args) {
        Some(arg) => format!("{}:{}", r.original_behavior, arg),
        None => r.original_behavior.clone(),
    }
}

/// Render an [`Args`] value back to wire-option text, for `getstatus` display
/// only; not a general-purpose inverse of `parse_option`.
pub(crate) fn render_args(args: &Args) -> Option<String> {
    match args {
        Args::None => None,
        Args::Float(v) => Some(v.to_string()),
        Args::Int(v) => Some(v.to_string()),
        Args::Uuid(u) => Some(u.to_string()),
        Args::UuidOrString(UuidOrString::Id(u)) => Some(u.to_string()),
        Args::UuidOrString(UuidOrString::Name(n)) => Some(n.clone()),
        Args::UuidOrString(UuidOrString::AllGroups) => Some("allgroups".to_string()),
        Args::WearableType(w) => Some(w.as_str().to_string()),
        Args::AttachmentPoint(p) => Some(p.as_str().to_string()),
        Args::FolderPathOrLayer(FolderPathOrLayer::Typed(FolderPathOrLayerKind::Wearable(w))) => {
            Some(w.as_str().to_string())
        }
        Args::FolderPathOrLayer(FolderPathOrLayer::Typed(FolderPathOrLayerKind::Attachment(p))) => {
            Some(p.as_str().to_string())
        }
        Args::FolderPathOrLayer(FolderPathOrLayer::Path(p)) => Some(p.clone()),
        Args::Notify { channel, filter } => Some(format!("{};{}", channel, filter.clone().unwrap_or_default())),
        Args::ColorTriple([a, b, c]) => Some(format!("{};{};{}", a, b, c)),
        Args::Path(p) => Some(p.clone()),
    }
}

pub fn get_sit_id_reply(sit_id: Option<Uuid>) -> String {
    sit_id.map(|u| u.to_string()).unwrap_or_else(|| NULL_KEY.to_string())
}

/// Subset of the host's camera callback this module needs (spec.md §6
/// `try_get_camera_settings`). `getcam_*` echoes these live values directly;
/// they are independent of any restriction-derived clamp in
/// [`crate::permissions::camera_snapshot`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HostCameraSettings {
    pub zoom_min: f64,
    pub fov: f64,
    pub fov_min: f64,
    pub fov_max: f64,
    pub avdist_min: f64,
    pub avdist_max: f64,
}

pub fn get_cam_zoom_min_reply(cam: &HostCameraSettings) -> String {
    cam.zoom_min.to_string()
}
pub fn get_cam_fov_reply(cam: &HostCameraSettings) -> String {
    cam.fov.to_string()
}
pub fn get_cam_fov_min_reply(cam: &HostCameraSettings) -> String {
    cam.fov_min.to_string()
}
pub fn get_cam_fov_max_reply(cam: &HostCameraSettings) -> String {
    cam.fov_max.to_string()
}
pub fn get_cam_avdist_min_reply(cam: &HostCameraSettings) -> String {
    cam.avdist_min.to_string()
}
pub fn get_cam_avdist_max_reply(cam: &HostCameraSettings) -> String {
    cam.avdist_max.to_string()
}

pub fn get_group_reply(active_group_name: &str) -> String {
    active_group_name.to_string()
}

pub fn get_outfit_reply(inv: &InventoryMap, layer: Option<WearableType>) -> String {
    match layer {
        Some(w) => if inv.items_by_wearable_type(w).is_empty() { "0" } else { "1" }.to_string(),
        None => WEARABLE_TYPES
            .iter()
            .map(|&w| if inv.items_by_wearable_type(w).is_empty() { '0' } else { '1' })
            .collect(),
    }
}

pub fn get_attach_reply(inv: &InventoryMap, point: Option<AttachmentPoint>) -> String {
    match point {
        Some(p) => if inv.items_by_attachment_point(p).is_empty() { "0" } else { "1" }.to_string(),
        None => ATTACHMENT_POINTS
            .iter()
            .map(|&p| if inv.items_by_attachment_point(p).is_empty() { '0' } else { '1' })
            .collect(),
    }
}

fn resolve_query_folder(inv: &InventoryMap, path: &str) -> Option<FolderIdx> {
    if path.is_empty() {
        inv.root
    } else {
        inv.resolve_from_root(path)
    }
}

pub fn get_inv_reply(inv: &InventoryMap, path: &str) -> String {
    let Some(folder) = resolve_query_folder(inv, path) else { return String::new() };
    inv.folder(folder)
        .children
        .iter()
        .map(|&c| inv.folder(c))
        .filter(|f| !crate::inventory::tree::is_hidden(&f.name))
        .map(|f| f.name.clone())
        .collect::<Vec<_>>()
        .join(",")
}

/// {0 empty, 1 none worn, 2 some, 3 all} over one flat set of items
/// (spec.md §4.6 `getinvworn`).
fn worn_state<'a>(items: impl Iterator<Item = &'a Item>) -> char {
    let mut total = 0usize;
    let mut worn = 0usize;
    for item in items {
        total += 1;
        if item.is_worn() {
            worn += 1;
        }
    }
    match (total, worn) {
        (0, _) => '0',
        (_, 0) => '1',
        (t, w) if t == w => '3',
        _ => '2',
    }
}

fn direct_items(inv: &InventoryMap, folder: FolderIdx) -> impl Iterator<Item = &Item> {
    inv.folder(folder).items.iter().map(move |&i| inv.item(i))
}

fn recursive_items(inv: &InventoryMap, folder: FolderIdx) -> Vec<&Item> {
    let mut items: Vec<&Item> = direct_items(inv, folder).collect();
    for desc in inv.descendants(folder) {
        items.extend(direct_items(inv, desc));
    }
    items
}

pub fn get_inv_worn_reply(inv: &InventoryMap, path: &str) -> String {
    let Some(folder) = resolve_query_folder(inv, path) else { return String::new() };
    let mut tokens = vec![format!(
        "|{}{}",
        worn_state(direct_items(inv, folder)),
        worn_state(recursive_items(inv, folder).into_iter())
    )];
    for &child in &inv.folder(folder).children {
        tokens.push(format!(
            "{}|{}{}",
            inv.folder(child).name,
            worn_state(direct_items(inv, child)),
            worn_state(recursive_items(inv, child).into_iter())
        ));
    }
    tokens.join(",")
}

/// Full `/`-joined path from the shared root down to `folder`, excluding the
/// root folder's own name (spec.md §4.6 `findfolder`/`findfolders`,
/// `getpath`/`getpathnew`).
fn folder_path_string(inv: &InventoryMap, folder: FolderIdx) -> String {
    let mut segments = Vec::new();
    let mut current = Some(folder);
    while let Some(idx) = current {
        let f = inv.folder(idx);
        if f.parent.is_none() {
            break;
        }
        segments.push(f.name.clone());
        current = f.parent;
    }
    segments.reverse();
    segments.join("/")
}

pub fn find_folder_reply(inv: &InventoryMap, raw_option: &str) -> String {
    let (query, _sep) = split_substr_sep(raw_option);
    inv.search_folders(query)
        .first()
        .map(|&f| folder_path_string(inv, f))
        .unwrap_or_default()
}

pub fn find_folders_reply(inv: &InventoryMap, raw_option: &str) -> String {
    let (query, sep) = split_substr_sep(raw_option);
    inv.search_folders(query)
        .iter()
        .map(|&f| folder_path_string(inv, f))
        .collect::<Vec<_>>()
        .join(sep)
}

/// Resolve a `getpath`/`getpathnew` selector to the folders containing a
/// matching item (spec.md §4.6: empty = sender prim id, else uuid / wearable
/// type name / attachment point name).
fn folders_for_selector(inv: &InventoryMap, selector: &str, sender: Uuid) -> Vec<FolderIdx> {
    let item_folders = |items: &[usize]| -> Vec<FolderIdx> {
        items.iter().filter_map(|&i| inv.item(i).parent_folder).collect()
    };

    if selector.is_empty() {
        return item_folders(inv.items_by_prim_id(sender));
    }
    if let Ok(uuid) = Uuid::parse_str(selector) {
        return item_folders(inv.items_by_prim_id(uuid));
    }
    if let Some(w) = WearableType::from_name(selector) {
        return item_folders(inv.items_by_wearable_type(w));
    }
    if let Some(p) = AttachmentPoint::from_name(selector) {
        return item_folders(inv.items_by_attachment_point(p));
    }
    Vec::new()
}

pub fn get_path_reply(inv: &InventoryMap, selector: &str, sender: Uuid) -> String {
    folders_for_selector(inv, selector, sender)
        .first()
        .map(|&f| folder_path_string(inv, f))
        .unwrap_or_default()
}

pub fn get_path_new_reply(inv: &InventoryMap, selector: &str, sender: Uuid) -> String {
    let mut paths: Vec<String> = folders_for_selector(inv, selector, sender)
        .iter()
        .map(|&f| folder_path_string(inv, f))
        .collect();
    paths.sort();
    paths.dedup();
    paths.join(",")
}

/// `getenv_X`/`getdebug_X` are pure passthrough: whatever the host callback
/// returned for that named setting is the reply, verbatim.
pub fn passthrough_reply(host_value: &str) -> String {
    host_value.to_string()
}
