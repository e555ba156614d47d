//! Pending ids whose configuration must be re-read on the next refresh

use parking_lot::Mutex;
use sitecfg_protocol::StructureId;
use std::collections::HashSet;
use std::fmt;

/// Entry of the dirty set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirtyId {
    /// Re-parse one configuration document
    Resource(StructureId),
    /// Discard the snapshot and read everything
    ReloadAll,
    /// Re-read the module configuration list
    ReloadModules,
    /// Rebuild the snapshot so derived folder types are recomputed
    RecomputeFolderTypes,
    /// Re-read element view documents
    ReloadElementViews,
}

impl fmt::Display for DirtyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resource(id) => write!(f, "{}", id),
            Self::ReloadAll => write!(f, "<reload-all>"),
            Self::ReloadModules => write!(f, "<reload-modules>"),
            Self::RecomputeFolderTypes => write!(f, "<recompute-folder-types>"),
            Self::ReloadElementViews => write!(f, "<reload-element-views>"),
        }
    }
}

/// Deduplicating set with many producers and one draining consumer
#[derive(Debug, Default)]
pub struct DirtySet {
    ids: Mutex<HashSet<DirtyId>>,
}

impl DirtySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, id: DirtyId) {
        self.ids.lock().insert(id);
    }

    pub fn add_all(&self, ids: impl IntoIterator<Item = DirtyId>) {
        self.ids.lock().extend(ids);
    }

    /// Remove and return everything added so far
    pub fn drain(&self) -> HashSet<DirtyId> {
        std::mem::take(&mut *self.ids.lock())
    }

    pub fn is_empty(&self) -> bool {
        self.ids.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.lock().len()
    }
}
