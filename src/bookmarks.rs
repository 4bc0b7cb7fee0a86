// SPDX-License-Identifier: EUPL-1.2

//! A user's set of bookmarked tools.

use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BookmarkChange {
    Added,
    Removed,
}

/// Ordered, duplicate-free set of tool ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkSet {
    ids: Vec<Uuid>,
}

impl BookmarkSet {
    pub fn new(ids: impl IntoIterator<Item = Uuid>) -> Self {
        let mut set = Self::default();
        for id in ids {
            if !set.contains(id) {
                set.ids.push(id);
            }
        }
        set
    }

    pub fn contains(&self, tool_id: Uuid) -> bool {
        self.ids.contains(&tool_id)
    }

    /// Flip membership of `tool_id`.
    pub fn toggle(&mut self, tool_id: Uuid) -> BookmarkChange {
        match self.ids.iter().position(|id| *id == tool_id) {
            Some(pos) => {
                self.ids.remove(pos);
                BookmarkChange::Removed
            }
            None => {
                self.ids.push(tool_id);
                BookmarkChange::Added
            }
        }
    }

    pub fn ids(&self) -> &[Uuid] {
        &self.ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_toggle_restores_membership() {
        let keep = Uuid::new_v4();
        let flip = Uuid::new_v4();
        let original = BookmarkSet::new([keep]);

        let mut set = original.clone();
        assert_eq!(set.toggle(flip), BookmarkChange::Added);
        assert!(set.contains(flip));
        assert_eq!(set.toggle(flip), BookmarkChange::Removed);
        assert_eq!(set, original);

        assert_eq!(set.toggle(keep), BookmarkChange::Removed);
        assert_eq!(set.toggle(keep), BookmarkChange::Added);
        assert_eq!(set, original);
    }

    #[test]
    fn duplicates_collapse_on_construction() {
        let id = Uuid::new_v4();
        let set = BookmarkSet::new([id, id]);
        assert_eq!(set.ids(), [id]);
    }
}
