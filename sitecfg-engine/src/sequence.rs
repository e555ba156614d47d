//! Inheritance chain of configuration records for one lookup

use std::sync::Arc;

use crate::model::ConfigRecord;

/// Ordered chain of records, module configuration first, then each
/// configured ancestor from the root down, with master configurations
/// spliced in before the records referencing them
///
/// `index` points at the current link and is always within bounds.
#[derive(Debug, Clone)]
pub struct ConfigSequence {
    records: Arc<[Arc<ConfigRecord>]>,
    index: usize,
}

impl ConfigSequence {
    /// Build a sequence positioned at its last record
    pub fn new(module: Arc<ConfigRecord>, chain: Vec<Arc<ConfigRecord>>) -> Self {
        let mut records = Vec::with_capacity(chain.len() + 1);
        records.push(module);
        records.extend(chain);
        let index = records.len() - 1;
        Self {
            records: records.into(),
            index,
        }
    }

    /// Record at the current position
    pub fn config(&self) -> &Arc<ConfigRecord> {
        &self.records[self.index]
    }

    /// The same chain positioned one link closer to the module configuration
    pub fn parent(&self) -> Option<ConfigSequence> {
        if self.index == 0 {
            return None;
        }
        Some(Self {
            records: Arc::clone(&self.records),
            index: self.index - 1,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// All records of the chain, independent of the current position
    pub fn records(&self) -> &[Arc<ConfigRecord>] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ConfigKind;
    use sitecfg_protocol::StructureId;

    #[test]
    fn test_walk_to_module() {
        let module = Arc::new(ConfigRecord::empty(ConfigKind::Module));
        let a = Arc::new(ConfigRecord::sitemap(StructureId::new_v4(), "/a"));
        let b = Arc::new(ConfigRecord::sitemap(StructureId::new_v4(), "/a/b"));
        let seq = ConfigSequence::new(module, vec![a, b]);

        assert_eq!(seq.index(), 2);
        assert_eq!(seq.config().base_path.as_deref(), Some("/a/b"));

        let parent = seq.parent().unwrap();
        assert_eq!(parent.config().base_path.as_deref(), Some("/a"));

        let root = parent.parent().unwrap();
        assert!(root.config().is_module_config());
        assert!(root.parent().is_none());
        assert_eq!(root.records().len(), 3);
    }

    #[test]
    fn test_module_only() {
        let seq = ConfigSequence::new(Arc::new(ConfigRecord::empty(ConfigKind::Module)), vec![]);
        assert_eq!(seq.index(), 0);
        assert!(seq.parent().is_none());
    }
}
