use serde::Serialize;
use sitecfg_protocol::StructureId;
use std::collections::BTreeSet;

/// Detail page configured for one content type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailPageInfo {
    pub type_name: String,
    /// Root path of the page at parse time
    pub uri: String,
    pub id: StructureId,
    pub is_default: bool,
}

/// Formatter additions and removals declared by one configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormatterChangeSet {
    /// Drop every formatter change inherited from parents
    pub remove_all: bool,
    pub add: BTreeSet<String>,
    pub remove: BTreeSet<String>,
}

impl FormatterChangeSet {
    pub fn is_empty(&self) -> bool {
        !self.remove_all && self.add.is_empty() && self.remove.is_empty()
    }

    /// Layer `child` on top of this (parent) change set
    pub fn combine(&self, child: &Self) -> Self {
        if child.remove_all {
            return child.clone();
        }

        let mut add: BTreeSet<String> = self.add.difference(&child.remove).cloned().collect();
        add.extend(child.add.iter().cloned());

        let mut remove: BTreeSet<String> = self.remove.difference(&child.add).cloned().collect();
        remove.extend(child.remove.iter().cloned());

        Self {
            remove_all: self.remove_all,
            add,
            remove,
        }
    }

    /// Apply to a set of available formatter keys
    pub fn apply(&self, available: &BTreeSet<String>) -> BTreeSet<String> {
        let mut active = if self.remove_all {
            BTreeSet::new()
        } else {
            available.clone()
        };
        for key in &self.remove {
            active.remove(key);
        }
        active.extend(self.add.iter().cloned());
        active
    }
}
