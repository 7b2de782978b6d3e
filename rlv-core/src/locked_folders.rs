//! Folder-lock derivation: projects `*this*` restrictions onto the inventory
//! tree to compute the set of locked folders (spec.md §3 "Locked folder
//! record", §4.4).

use crate::behaviors::Behavior;
use crate::grammar::{Args, FolderPathOrLayer, FolderPathOrLayerKind};
use crate::inventory::{FolderIdx, InventoryMap};
use crate::restriction::{Restriction, RestrictionStore};
use std::collections::HashMap;

/// The eight folder-lock behaviors (spec.md §4.4), grouped by what they
/// govern and whether they recurse into descendants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LockKind {
    AttachRestriction { recursive: bool },
    DetachRestriction { recursive: bool },
    AttachException { recursive: bool },
    DetachException { recursive: bool },
}

fn lock_kind(behavior: Behavior) -> Option<LockKind> {
    match behavior {
        Behavior::AttachThis => Some(LockKind::AttachRestriction { recursive: false }),
        Behavior::AttachAllThis => Some(LockKind::AttachRestriction { recursive: true }),
        Behavior::DetachThis => Some(LockKind::DetachRestriction { recursive: false }),
        Behavior::DetachAllThis => Some(LockKind::DetachRestriction { recursive: true }),
        Behavior::AttachThisExcept => Some(LockKind::AttachException { recursive: false }),
        Behavior::AttachAllThisExcept => Some(LockKind::AttachException { recursive: true }),
        Behavior::DetachThisExcept => Some(LockKind::DetachException { recursive: false }),
        Behavior::DetachAllThisExcept => Some(LockKind::DetachException { recursive: true }),
        _ => None,
    }
}

#[derive(Debug, Clone, Default)]
pub struct LockRecord {
    pub attach_restrictions: Vec<Restriction>,
    pub detach_restrictions: Vec<Restriction>,
    pub attach_exceptions: Vec<Restriction>,
    pub detach_exceptions: Vec<Restriction>,
}

impl LockRecord {
    pub fn can_attach(&self) -> bool {
        self.attach_restrictions.is_empty() || !self.attach_exceptions.is_empty()
    }

    pub fn can_detach(&self) -> bool {
        self.detach_restrictions.is_empty() || !self.detach_exceptions.is_empty()
    }

    pub fn is_locked(&self) -> bool {
        !self.attach_restrictions.is_empty() || !self.detach_restrictions.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct LockedFolderMap {
    records: HashMap<FolderIdx, LockRecord>,
}

impl LockedFolderMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, folder: FolderIdx) -> Option<&LockRecord> {
        self.records.get(&folder)
    }

    pub fn is_locked(&self, folder: FolderIdx) -> bool {
        self.records.get(&folder).map(|r| r.is_locked()).unwrap_or(false)
    }

    pub fn can_attach(&self, folder: FolderIdx) -> bool {
        self.records.get(&folder).map(|r| r.can_attach()).unwrap_or(true)
    }

    pub fn can_detach(&self, folder: FolderIdx) -> bool {
        self.records.get(&folder).map(|r| r.can_detach()).unwrap_or(true)
    }

    pub fn locked_folders(&self) -> impl Iterator<Item = (&FolderIdx, &LockRecord)> {
        self.records.iter()
    }

    /// Full rebuild from every live locking restriction — used on `@clear`,
    /// on removal of any locking restriction, and on every fresh inventory
    /// snapshot load (spec.md §4.4).
    pub fn rebuild(store: &RestrictionStore, inv: &InventoryMap) -> Self {
        let mut map = LockedFolderMap::new();
        for behavior in [
            Behavior::AttachThis,
            Behavior::AttachAllThis,
            Behavior::DetachThis,
            Behavior::DetachAllThis,
            Behavior::AttachThisExcept,
            Behavior::AttachAllThisExcept,
            Behavior::DetachThisExcept,
            Behavior::DetachAllThisExcept,
        ] {
            for restriction in store.by_behavior(behavior) {
                map.extend_with(restriction, inv);
            }
        }
        map
    }

    /// Incrementally extend the map with one newly added restriction,
    /// without touching unrelated records (spec.md §4.4: "on a single add it
    /// is incrementally extended").
    pub fn extend_with(&mut self, restriction: &Restriction, inv: &InventoryMap) {
        let Some(kind) = lock_kind(restriction.behavior) else { return };
        let base_folders = target_folders(restriction, inv);

        let recursive = matches!(
            kind,
            LockKind::AttachRestriction { recursive: true }
                | LockKind::DetachRestriction { recursive: true }
                | LockKind::AttachException { recursive: true }
                | LockKind::DetachException { recursive: true }
        );

        let mut folders = Vec::new();
        for folder in base_folders {
            if recursive {
                folders.extend(inv.folder_and_descendants(folder));
            } else {
                folders.push(folder);
            }
        }

        for folder in folders {
            let record = self.records.entry(folder).or_default();
            match kind {
                LockKind::AttachRestriction { .. } => record.attach_restrictions.push(restriction.clone()),
                LockKind::DetachRestriction { .. } => record.detach_restrictions.push(restriction.clone()),
                LockKind::AttachException { .. } => record.attach_exceptions.push(restriction.clone()),
                LockKind::DetachException { .. } => record.detach_exceptions.push(restriction.clone()),
            }
        }
    }
}

/// Resolve the folder(s) a single `*this*` restriction targets, per the four
/// option shapes of spec.md §4.4 (no option / wearable type / attachment
/// point / path). `_except` forms are path-only (see their `Path` grammar in
/// `behaviors.rs`) but still flow through here uniformly.
fn target_folders(restriction: &Restriction, inv: &InventoryMap) -> Vec<FolderIdx> {
    match &restriction.args {
        Args::None => inv
            .items_by_prim_id(restriction.issuer)
            .iter()
            .filter_map(|&idx| inv.item(idx).parent_folder)
            .collect(),
        Args::FolderPathOrLayer(FolderPathOrLayer::Typed(FolderPathOrLayerKind::Wearable(w))) => inv
            .items_by_wearable_type(*w)
            .iter()
            .filter_map(|&idx| inv.item(idx).parent_folder)
            .collect(),
        Args::FolderPathOrLayer(FolderPathOrLayer::Typed(FolderPathOrLayerKind::Attachment(p))) => inv
            .items_by_attachment_point(*p)
            .iter()
            .filter_map(|&idx| inv.item(idx).parent_folder)
            .collect(),
        Args::FolderPathOrLayer(FolderPathOrLayer::Path(path)) | Args::Path(path) => {
            inv.resolve_from_root(path).into_iter().collect()
        }
        _ => Vec::new(),
    }
}
