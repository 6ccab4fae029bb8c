use std::collections::BTreeSet;

use pagevault_types::TagId;

/// Tags picked for the bookmark currently being composed. Never persisted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SelectionState {
    selected: BTreeSet<TagId>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip `tag_id` in or out of the selection. Returns whether it is now
    /// selected.
    pub fn toggle(&mut self, tag_id: TagId) -> bool {
        if self.selected.remove(&tag_id) {
            false
        } else {
            self.selected.insert(tag_id)
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn snapshot(&self) -> BTreeSet<TagId> {
        self.selected.clone()
    }

    pub fn is_selected(&self, tag_id: TagId) -> bool {
        self.selected.contains(&tag_id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}
