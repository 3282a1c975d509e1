//! Named groupings of factors.
//!
//! A dataset holds a set of unique factor ids in insertion order; the order
//! carries no meaning beyond display.

use emfactor_core::errors::{FactorError, FactorResult};
use emfactor_core::factor::FactorId;
use serde::{Deserialize, Serialize};

/// A user-created grouping of factor ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    name: String,
    members: Vec<FactorId>,
}

impl Dataset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a factor id. Returns false (and changes nothing) if it is
    /// already a member.
    pub fn add(&mut self, id: FactorId) -> bool {
        if self.members.contains(&id) {
            return false;
        }
        self.members.push(id);
        true
    }

    /// Removes a factor id, returning whether it was a member.
    pub fn remove(&mut self, id: FactorId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| *m != id);
        self.members.len() != before
    }

    pub fn contains(&self, id: FactorId) -> bool {
        self.members.contains(&id)
    }

    /// Members in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = FactorId> + '_ {
        self.members.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// All datasets of a session, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetStore {
    datasets: Vec<Dataset>,
}

impl DatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty dataset with a unique name.
    pub fn create(&mut self, name: impl Into<String>) -> FactorResult<&mut Dataset> {
        let name = name.into();
        if self.get(&name).is_some() {
            return Err(FactorError::DuplicateDataset(name));
        }
        self.datasets.push(Dataset::new(name));
        let last = self.datasets.len() - 1;
        Ok(&mut self.datasets[last])
    }

    pub fn get(&self, name: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Dataset> {
        self.datasets.iter_mut().find(|d| d.name == name)
    }

    pub fn delete(&mut self, name: &str) -> FactorResult<()> {
        let before = self.datasets.len();
        self.datasets.retain(|d| d.name != name);
        if self.datasets.len() == before {
            return Err(FactorError::UnknownDataset(name.to_string()));
        }
        Ok(())
    }

    /// Dataset names sorted for display.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.datasets.iter().map(|d| d.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dataset> {
        self.datasets.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_duplicate_members() {
        let mut dataset = Dataset::new("scope 1");
        assert!(dataset.add(FactorId(1)));
        assert!(dataset.add(FactorId(2)));
        assert!(!dataset.add(FactorId(1)));
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn insertion_order_preserved() {
        let mut dataset = Dataset::new("ordered");
        for id in [5, 1, 3] {
            dataset.add(FactorId(id));
        }
        let members: Vec<u64> = dataset.iter().map(|id| id.0).collect();
        assert_eq!(members, vec![5, 1, 3]);
    }

    #[test]
    fn remove_member() {
        let mut dataset = Dataset::new("d");
        dataset.add(FactorId(1));
        assert!(dataset.remove(FactorId(1)));
        assert!(!dataset.remove(FactorId(1)));
        assert!(dataset.is_empty());
    }

    #[test]
    fn store_rejects_duplicate_names() {
        let mut store = DatasetStore::new();
        store.create("fuels").unwrap();
        let err = store.create("fuels").unwrap_err();
        assert_eq!(err, FactorError::DuplicateDataset("fuels".to_string()));
    }

    #[test]
    fn store_lookup_and_delete() {
        let mut store = DatasetStore::new();
        store.create("fuels").unwrap().add(FactorId(1));
        assert!(store.get("fuels").unwrap().contains(FactorId(1)));

        store.delete("fuels").unwrap();
        assert!(store.get("fuels").is_none());
        assert_eq!(
            store.delete("fuels").unwrap_err(),
            FactorError::UnknownDataset("fuels".to_string())
        );
    }

    #[test]
    fn names_sorted_for_display() {
        let mut store = DatasetStore::new();
        store.create("transport").unwrap();
        store.create("energy").unwrap();
        store.create("materials").unwrap();
        assert_eq!(store.names(), vec!["energy", "materials", "transport"]);
    }
}
