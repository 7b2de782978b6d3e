//! The inventory model: shared folder tree, worn/external items, and the
//! lookup indexes built fresh from each host snapshot (spec.md §3 "Shared
//! folder", "Inventory item", "Inventory map").
//!
//! Per the source-language re-architecture note (spec.md §9): the tree is an
//! arena of folders addressed by index, with parent links stored as indices
//! rather than owning references, so there is no ownership cycle to fight.

pub mod tree;

use crate::constants::{AttachmentPoint, WearableType};
use std::collections::HashMap;
use uuid::Uuid;

pub type FolderIdx = usize;
pub type ItemIdx = usize;

/// What the host hands back from `try_get_inventory_map` (spec.md §6),
/// before it has been flattened into an [`InventoryMap`].
#[derive(Debug, Clone)]
pub struct FolderSnapshot {
    pub id: Uuid,
    pub name: String,
    pub folders: Vec<FolderSnapshot>,
    pub items: Vec<ItemSnapshot>,
}

#[derive(Debug, Clone, Default)]
pub struct ItemSnapshot {
    pub id: Uuid,
    pub name: String,
    pub is_link: bool,
    /// Set when this item is worn/attached but lives outside `#RLV`
    /// (spec.md §3: "external (non-shared) worn items").
    pub external_folder_id: Option<Uuid>,
    pub attached_prim_id: Option<Uuid>,
    pub worn_on_point: Option<AttachmentPoint>,
    pub wearable_type: Option<WearableType>,
    pub gesture_active: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct Folder {
    pub id: Uuid,
    pub name: String,
    pub parent: Option<FolderIdx>,
    pub children: Vec<FolderIdx>,
    pub items: Vec<ItemIdx>,
}

#[derive(Debug, Clone)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub is_link: bool,
    pub parent_folder: Option<FolderIdx>,
    pub external_folder_id: Option<Uuid>,
    pub attached_prim_id: Option<Uuid>,
    pub worn_on_point: Option<AttachmentPoint>,
    pub wearable_type: Option<WearableType>,
    pub gesture_active: Option<bool>,
}

impl Item {
    pub fn is_worn(&self) -> bool {
        self.attached_prim_id.is_some() || self.worn_on_point.is_some() || self.wearable_type.is_some()
    }

    pub fn is_external(&self) -> bool {
        self.external_folder_id.is_some()
    }
}

/// Denormalized view built once per query: folders and items in arenas, plus
/// four lookup indexes (spec.md §3 "Inventory map").
#[derive(Debug, Default)]
pub struct InventoryMap {
    pub folders: Vec<Folder>,
    pub items: Vec<Item>,
    pub root: Option<FolderIdx>,

    by_id: HashMap<Uuid, Vec<ItemIdx>>,
    by_prim_id: HashMap<Uuid, Vec<ItemIdx>>,
    by_attachment_point: HashMap<AttachmentPoint, Vec<ItemIdx>>,
    by_wearable_type: HashMap<WearableType, Vec<ItemIdx>>,
    by_folder_id: HashMap<Uuid, FolderIdx>,
}

impl InventoryMap {
    pub fn build(shared_root: &FolderSnapshot, external_items: &[ItemSnapshot]) -> Self {
        let mut map = InventoryMap::default();
        let root = map.insert_folder(shared_root, None);
        map.root = Some(root);
        for snap in external_items {
            map.insert_item(snap, None, snap.external_folder_id);
        }
        map
    }

    fn insert_folder(&mut self, snap: &FolderSnapshot, parent: Option<FolderIdx>) -> FolderIdx {
        let idx = self.folders.len();
        self.folders.push(Folder {
            id: snap.id,
            name: snap.name.clone(),
            parent,
            children: Vec::new(),
            items: Vec::new(),
        });
        self.by_folder_id.insert(snap.id, idx);

        for item_snap in &snap.items {
            self.insert_item(item_snap, Some(idx), None);
        }
        for child_snap in &snap.folders {
            let child_idx = self.insert_folder(child_snap, Some(idx));
            self.folders[idx].children.push(child_idx);
        }
        idx
    }

    fn insert_item(&mut self, snap: &ItemSnapshot, parent_folder: Option<FolderIdx>, external_folder_id: Option<Uuid>) -> ItemIdx {
        let idx = self.items.len();
        let item = Item {
            id: snap.id,
            name: snap.name.clone(),
            is_link: snap.is_link,
            parent_folder,
            external_folder_id,
            attached_prim_id: snap.attached_prim_id,
            worn_on_point: snap.worn_on_point,
            wearable_type: snap.wearable_type,
            gesture_active: snap.gesture_active,
        };
        self.by_id.entry(item.id).or_default().push(idx);
        if let Some(prim) = item.attached_prim_id {
            self.by_prim_id.entry(prim).or_default().push(idx);
        }
        if let Some(pt) = item.worn_on_point {
            self.by_attachment_point.entry(pt).or_default().push(idx);
        }
        if let Some(wt) = item.wearable_type {
            self.by_wearable_type.entry(wt).or_default().push(idx);
        }
        if let Some(folder_idx) = parent_folder {
            self.folders[folder_idx].items.push(idx);
        }
        self.items.push(item);
        idx
    }

    pub fn folder(&self, idx: FolderIdx) -> &Folder {
        &self.folders[idx]
    }

    pub fn item(&self, idx: ItemIdx) -> &Item {
        &self.items[idx]
    }

    pub fn folder_by_id(&self, id: Uuid) -> Option<FolderIdx> {
        self.by_folder_id.get(&id).copied()
    }

    pub fn items_by_id(&self, id: Uuid) -> &[ItemIdx] {
        self.by_id.get(&id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn items_by_prim_id(&self, prim_id: Uuid) -> &[ItemIdx] {
        self.by_prim_id.get(&prim_id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn items_by_attachment_point(&self, point: AttachmentPoint) -> &[ItemIdx] {
        self.by_attachment_point.get(&point).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn items_by_wearable_type(&self, wearable: WearableType) -> &[ItemIdx] {
        self.by_wearable_type.get(&wearable).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn all_external_items(&self) -> impl Iterator<Item = (ItemIdx, &Item)> {
        self.items.iter().enumerate().filter(|(_, it)| it.is_external())
    }
}
