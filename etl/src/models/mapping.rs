use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// One line of the metadata file: a source column feeding a target table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    pub source_table: String,
    pub target_table: String,
    pub column_name: String,
}

impl MappingEntry {
    pub fn new(source_table: &str, target_table: &str, column_name: &str) -> Self {
        Self {
            source_table: source_table.to_string(),
            target_table: target_table.to_string(),
            column_name: column_name.to_string(),
        }
    }

    pub fn key(&self) -> TableKey {
        TableKey {
            source_table: self.source_table.clone(),
            target_table: self.target_table.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TableKey {
    pub source_table: String,
    pub target_table: String,
}

impl TableKey {
    pub fn new(source_table: &str, target_table: &str) -> Self {
        Self {
            source_table: source_table.to_string(),
            target_table: target_table.to_string(),
        }
    }
}

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source_table, self.target_table)
    }
}

/// Entries grouped by (source, target) pair. Keys iterate in order of first
/// appearance; entries within a key keep file order.
#[derive(Debug, Clone, Default)]
pub struct MappingGroup {
    keys: Vec<TableKey>,
    entries: HashMap<TableKey, Vec<MappingEntry>>,
}

impl MappingGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: MappingEntry) {
        let key = entry.key();
        match self.entries.get_mut(&key) {
            Some(existing) => existing.push(entry),
            None => {
                self.keys.push(key.clone());
                self.entries.insert(key, vec![entry]);
            }
        }
    }

    pub fn get(&self, key: &TableKey) -> Option<&[MappingEntry]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Column list for `key` in file order, duplicates included.
    pub fn columns(&self, key: &TableKey) -> Vec<&str> {
        self.get(key)
            .map(|entries| entries.iter().map(|e| e.column_name.as_str()).collect())
            .unwrap_or_default()
    }

    /// Column names listed more than once for `key`, each reported once.
    pub fn duplicate_columns(&self, key: &TableKey) -> Vec<&str> {
        let mut seen = HashMap::new();
        let mut duplicates = Vec::new();
        for column in self.columns(key) {
            let count = seen.entry(column).or_insert(0usize);
            *count += 1;
            if *count == 2 {
                duplicates.push(column);
            }
        }
        duplicates
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TableKey, &[MappingEntry])> {
        self.keys
            .iter()
            .map(move |key| (key, self.entries[key].as_slice()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &TableKey> {
        self.keys.iter()
    }

    /// Number of (source, target) pairs.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Total number of mapping lines across all keys.
    pub fn entry_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}

impl FromIterator<MappingEntry> for MappingGroup {
    fn from_iter<I: IntoIterator<Item = MappingEntry>>(iter: I) -> Self {
        let mut group = MappingGroup::new();
        for entry in iter {
            group.insert(entry);
        }
        group
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_follow_first_appearance() {
        let group: MappingGroup = vec![
            MappingEntry::new("orders", "orders_dw", "id"),
            MappingEntry::new("customers", "customers_dw", "id"),
            MappingEntry::new("orders", "orders_dw", "amount"),
        ]
        .into_iter()
        .collect();

        let keys: Vec<String> = group.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["orders -> orders_dw", "customers -> customers_dw"]);
        assert_eq!(
            group.columns(&TableKey::new("orders", "orders_dw")),
            vec!["id", "amount"]
        );
        assert_eq!(group.len(), 2);
        assert_eq!(group.entry_count(), 3);
    }

    #[test]
    fn test_same_source_different_target_are_separate_keys() {
        let group: MappingGroup = vec![
            MappingEntry::new("orders", "orders_dw", "id"),
            MappingEntry::new("orders", "orders_archive", "id"),
        ]
        .into_iter()
        .collect();

        assert_eq!(group.len(), 2);
    }

    #[test]
    fn test_duplicates_preserved() {
        let group: MappingGroup = vec![
            MappingEntry::new("orders", "orders_dw", "id"),
            MappingEntry::new("orders", "orders_dw", "id"),
            MappingEntry::new("orders", "orders_dw", "amount"),
            MappingEntry::new("orders", "orders_dw", "id"),
        ]
        .into_iter()
        .collect();

        let key = TableKey::new("orders", "orders_dw");
        assert_eq!(group.columns(&key), vec!["id", "id", "amount", "id"]);
        assert_eq!(group.duplicate_columns(&key), vec!["id"]);
    }

    #[test]
    fn test_unknown_key_has_no_columns() {
        let group = MappingGroup::new();
        assert!(group.is_empty());
        assert!(group.columns(&TableKey::new("a", "b")).is_empty());
    }
}
