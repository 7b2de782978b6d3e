//! The restriction store (spec.md §3 "Restriction", §4.2).
//!
//! A raw bag of live restrictions, indexed by behavior kind. Secure/exception
//! resolution is deliberately *not* done here — see [`crate::permissions`].

use crate::behaviors::Behavior;
use crate::grammar::Args;
use std::collections::HashMap;
use uuid::Uuid;

/// `(behavior, original_behavior, issuer_prim_id, issuer_name, args)`
/// (spec.md §3). Equality is exactly `(behavior, issuer, args)` — two
/// restrictions from the same issuer for the same behavior and arguments are
/// the same restriction even if their `original_behavior` text differs (e.g.
/// one arrived via an alias).
#[derive(Debug, Clone)]
pub struct Restriction {
    pub behavior: Behavior,
    pub original_behavior: String,
    pub issuer: Uuid,
    pub issuer_name: String,
    pub args: Args,
}

impl PartialEq for Restriction {
    fn eq(&self, other: &Self) -> bool {
        self.behavior == other.behavior && self.issuer == other.issuer && self.args == other.args
    }
}
impl Eq for Restriction {}

/// `(restriction, is_new, is_deleted)` (spec.md §4.2, §6 "Outbound
/// restriction events"). Exactly one of `is_new`/`is_deleted` is set per
/// event; both false never occurs since the store only emits on change.
#[derive(Debug, Clone)]
pub struct RestrictionEvent {
    pub restriction: Restriction,
    pub is_new: bool,
    pub is_deleted: bool,
}

#[derive(Debug, Default)]
pub struct RestrictionStore {
    by_behavior: HashMap<Behavior, Vec<Restriction>>,
}

impl RestrictionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a restriction (set semantics). Returns the resulting event, or
    /// `None` if an equal restriction was already present (idempotent add).
    pub fn add(&mut self, restriction: Restriction) -> Option<RestrictionEvent> {
        let bucket = self.by_behavior.entry(restriction.behavior).or_default();
        if bucket.contains(&restriction) {
            return None;
        }
        bucket.push(restriction.clone());
        Some(RestrictionEvent { restriction, is_new: true, is_deleted: false })
    }

    /// Remove a restriction by equality. Returns the resulting event, or
    /// `None` if no equal restriction was present.
    pub fn remove(&mut self, restriction: &Restriction) -> Option<RestrictionEvent> {
        let bucket = self.by_behavior.get_mut(&restriction.behavior)?;
        let idx = bucket.iter().position(|r| r == restriction)?;
        let removed = bucket.remove(idx);
        Some(RestrictionEvent { restriction: removed, is_new: false, is_deleted: true })
    }

    /// Remove every restriction whose behavior canonical-name contains
    /// `filter` as a substring *and* whose issuer equals `issuer`
    /// (spec.md §4.2 "Clear").
    pub fn clear(&mut self, issuer: Uuid, filter: &str) -> Vec<RestrictionEvent> {
        let filter = filter.to_ascii_lowercase();
        let mut events = Vec::new();
        for bucket in self.by_behavior.values_mut() {
            let mut i = 0;
            while i < bucket.len() {
                let matches_filter = bucket[i].behavior.canonical_name().contains(&filter);
                if bucket[i].issuer == issuer && matches_filter {
                    let removed = bucket.remove(i);
                    events.push(RestrictionEvent { restriction: removed, is_new: false, is_deleted: true });
                } else {
                    i += 1;
                }
            }
        }
        events
    }

    /// Remove every restriction from `issuer`, regardless of behavior or
    /// name (spec.md §4.2 "Remove-by-issuer", used when the host reports an
    /// object vanished).
    pub fn remove_by_issuer(&mut self, issuer: Uuid) -> Vec<RestrictionEvent> {
        let mut events = Vec::new();
        for bucket in self.by_behavior.values_mut() {
            let mut i = 0;
            while i < bucket.len() {
                if bucket[i].issuer == issuer {
                    let removed = bucket.remove(i);
                    events.push(RestrictionEvent { restriction: removed, is_new: false, is_deleted: true });
                } else {
                    i += 1;
                }
            }
        }
        events
    }

    /// All live restrictions of a given behavior kind.
    pub fn by_behavior(&self, behavior: Behavior) -> &[Restriction] {
        self.by_behavior.get(&behavior).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Snapshot restrictions whose canonical name contains `name_substr`
    /// (case-insensitive), optionally filtered further by issuer
    /// (spec.md §4.2 "Snapshot").
    pub fn snapshot(&self, name_substr: &str, issuer: Option<Uuid>) -> Vec<&Restriction> {
        let needle = name_substr.to_ascii_lowercase();
        self.by_behavior
            .values()
            .flatten()
            .filter(|r| r.behavior.canonical_name().contains(&needle))
            .filter(|r| issuer.map(|i| i == r.issuer).unwrap_or(true))
            .collect()
    }

    /// Every live issuer prim id (spec.md §4.2 "Enumerate all live issuer
    /// prim ids").
    pub fn issuers(&self) -> std::collections::HashSet<Uuid> {
        self.by_behavior.values().flatten().map(|r| r.issuer).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.by_behavior.values().all(|v| v.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Restriction> {
        self.by_behavior.values().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviors::Behavior;

    fn r(behavior: Behavior, issuer: Uuid) -> Restriction {
        Restriction {
            behavior,
            original_behavior: behavior.canonical_name().to_string(),
            issuer,
            issuer_name: "tester".to_string(),
            args: Args::None,
        }
    }

    #[test]
    fn add_is_idempotent() {
        let mut store = RestrictionStore::new();
        let issuer = Uuid::new_v4();
        assert!(store.add(r(Behavior::Fly, issuer)).is_some());
        assert!(store.add(r(Behavior::Fly, issuer)).is_none());
        assert_eq!(store.by_behavior(Behavior::Fly).len(), 1);
    }

    #[test]
    fn add_then_remove_returns_to_empty() {
        let mut store = RestrictionStore::new();
        let issuer = Uuid::new_v4();
        store.add(r(Behavior::Fly, issuer));
        assert!(store.remove(&r(Behavior::Fly, issuer)).is_some());
        assert!(store.is_empty());
    }

    #[test]
    fn clear_is_local_to_issuer() {
        let mut store = RestrictionStore::new();
        let i1 = Uuid::new_v4();
        let i2 = Uuid::new_v4();
        store.add(r(Behavior::Fly, i1));
        store.add(r(Behavior::Fly, i2));
        let events = store.clear(i1, "");
        assert_eq!(events.len(), 1);
        assert_eq!(store.by_behavior(Behavior::Fly).len(), 1);
        assert_eq!(store.by_behavior(Behavior::Fly)[0].issuer, i2);
    }

    #[test]
    fn remove_by_issuer_removes_across_behaviors() {
        let mut store = RestrictionStore::new();
        let issuer = Uuid::new_v4();
        store.add(r(Behavior::Fly, issuer));
        store.add(r(Behavior::Jump, issuer));
        let events = store.remove_by_issuer(issuer);
        assert_eq!(events.len(), 2);
        assert!(store.is_empty());
    }
}
