//! Name-prefix semantics, path resolution, and tree walks over an
//! [`InventoryMap`] (spec.md §3 "Shared folder" prefixes, "Inventory map"
//! path resolution).

use super::{FolderIdx, InventoryMap};

pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

pub fn is_no_replace_on_attach(name: &str) -> bool {
    name.starts_with('+')
}

pub fn is_alias_root(name: &str) -> bool {
    name.starts_with('~')
}

pub fn is_nostrip(name: &str) -> bool {
    name.to_ascii_lowercase().contains("nostrip")
}

/// Strip exactly one leading prefix character (`.`, `+`, or `~`), if present.
fn strip_prefix_char(name: &str) -> Option<&str> {
    name.strip_prefix(['.', '+', '~'])
}

impl InventoryMap {
    /// Resolve a `/`-separated path starting at `start`, case-insensitively.
    /// Each segment matches either a child's literal name or its name with
    /// one leading `.`/`+`/`~` stripped; an exact unprefixed match always
    /// wins over a stripped-prefix match, the longest original name wins
    /// among stripped candidates, first occurrence otherwise
    /// (spec.md §3, §8 "Path resolution precedence").
    pub fn resolve_path(&self, start: FolderIdx, path: &str) -> Option<FolderIdx> {
        let mut current = start;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = self.find_child(current, segment)?;
        }
        Some(current)
    }

    /// Resolve a path from the inventory root.
    pub fn resolve_from_root(&self, path: &str) -> Option<FolderIdx> {
        self.resolve_path(self.root?, path)
    }

    fn find_child(&self, folder: FolderIdx, segment: &str) -> Option<FolderIdx> {
        let needle = segment.to_ascii_lowercase();
        let mut best_stripped: Option<FolderIdx> = None;
        let mut best_len = 0usize;

        for &child in &self.folder(folder).children {
            let name = &self.folder(child).name;
            let lname = name.to_ascii_lowercase();
            if lname == needle {
                return Some(child);
            }
            if let Some(stripped) = strip_prefix_char(&lname) {
                if stripped == needle && name.len() > best_len {
                    best_stripped = Some(child);
                    best_len = name.len();
                }
            }
        }
        best_stripped
    }

    /// All descendant folders of `folder`, depth-first, not including
    /// `folder` itself. Used by the `*all*` folder-lock families, which do
    /// not skip hidden subfolders (spec.md §4.4).
    pub fn descendants(&self, folder: FolderIdx) -> Vec<FolderIdx> {
        let mut out = Vec::new();
        let mut visited = std::collections::HashSet::new();
        let mut stack: Vec<FolderIdx> = self.folder(folder).children.clone();
        while let Some(idx) = stack.pop() {
            if !visited.insert(idx) {
                continue; // defensive: tree is acyclic by construction, but never loop on bad input
            }
            out.push(idx);
            stack.extend(self.folder(idx).children.iter().copied());
        }
        out
    }

    /// Descendant folders, skipping any subfolder whose name is
    /// `.`-prefixed — used when recursively collecting items to attach
    /// (spec.md §4.7: "Hidden subfolders are skipped when recursing (but not
    /// when the path *resolves to* a hidden folder)").
    pub fn descendants_skip_hidden(&self, folder: FolderIdx) -> Vec<FolderIdx> {
        let mut out = Vec::new();
        let mut visited = std::collections::HashSet::new();
        let mut stack: Vec<FolderIdx> = self
            .folder(folder)
            .children
            .iter()
            .copied()
            .filter(|&c| !is_hidden(&self.folder(c).name))
            .collect();
        while let Some(idx) = stack.pop() {
            if !visited.insert(idx) {
                continue;
            }
            out.push(idx);
            stack.extend(
                self.folder(idx)
                    .children
                    .iter()
                    .copied()
                    .filter(|&c| !is_hidden(&self.folder(c).name)),
            );
        }
        out
    }

    /// `folder` and every one of its descendants (used by `*all*` lock
    /// families, which lock the matched folder plus every descendant).
    pub fn folder_and_descendants(&self, folder: FolderIdx) -> Vec<FolderIdx> {
        let mut out = vec![folder];
        out.extend(self.descendants(folder));
        out
    }

    /// `true` if `folder` or any ancestor (up to and excluding the caller's
    /// search root) has the `nostrip` substring in its name — used by the
    /// forced-detach item-detachability rule (spec.md §4.7).
    pub fn folder_is_nostrip(&self, folder: FolderIdx) -> bool {
        is_nostrip(&self.folder(folder).name)
    }

    /// Find folders whose name satisfies every `&&`-joined substring term in
    /// `query`, excluding `.`/`~`-prefixed folders (spec.md §4.6
    /// `findfolder`/`findfolders`).
    pub fn search_folders(&self, query: &str) -> Vec<FolderIdx> {
        let terms: Vec<String> = query.split("&&").map(|s| s.to_ascii_lowercase()).collect();
        let mut out = Vec::new();
        for (idx, folder) in self.folders.iter().enumerate() {
            if is_hidden(&folder.name) || is_alias_root(&folder.name) {
                continue;
            }
            let lname = folder.name.to_ascii_lowercase();
            if terms.iter().all(|t| t.is_empty() || lname.contains(t.as_str())) {
                out.push(idx);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{FolderSnapshot, InventoryMap};
    use uuid::Uuid;

    fn folder(name: &str, children: Vec<FolderSnapshot>) -> FolderSnapshot {
        FolderSnapshot { id: Uuid::new_v4(), name: name.to_string(), folders: children, items: vec![] }
    }

    #[test]
    fn exact_match_wins_over_prefixed() {
        let root = folder(
            "#RLV",
            vec![
                folder("Clothing", vec![]),
                folder("+Clothing", vec![]),
                folder("~Clothing", vec![]),
                folder("Clothing Things", vec![]),
            ],
        );
        let map = InventoryMap::build(&root, &[]);
        let resolved = map.resolve_from_root("Clothing").unwrap();
        assert_eq!(map.folder(resolved).name, "Clothing");
    }

    #[test]
    fn stripped_prefix_matches_when_no_exact() {
        let root = folder("#RLV", vec![folder("+Accessories", vec![])]);
        let map = InventoryMap::build(&root, &[]);
        let resolved = map.resolve_from_root("Accessories").unwrap();
        assert_eq!(map.folder(resolved).name, "+Accessories");
    }

    #[test]
    fn descendants_all_includes_hidden() {
        let root = folder(
            "#RLV",
            vec![folder("Hats", vec![folder(".Hidden", vec![]), folder("Sub Hats", vec![])])],
        );
        let map = InventoryMap::build(&root, &[]);
        let hats = map.resolve_from_root("Hats").unwrap();
        let names: Vec<&str> = map.descendants(hats).iter().map(|&i| map.folder(i).name.as_str()).collect();
        assert!(names.contains(&".Hidden"));
        assert!(names.contains(&"Sub Hats"));
    }

    #[test]
    fn descendants_skip_hidden_excludes_dotted() {
        let root = folder(
            "#RLV",
            vec![folder("Hats", vec![folder(".Hidden", vec![]), folder("Sub Hats", vec![])])],
        );
        let map = InventoryMap::build(&root, &[]);
        let hats = map.resolve_from_root("Hats").unwrap();
        let names: Vec<&str> = map
            .descendants_skip_hidden(hats)
            .iter()
            .map(|&i| map.folder(i).name.as_str())
            .collect();
        assert!(!names.contains(&".Hidden"));
        assert!(names.contains(&"Sub Hats"));
    }
}
