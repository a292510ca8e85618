//! Registry of uploaded tables, one per source filename.

use food_access_map_models::UploadedLocation;

use crate::upload::UploadedTable;

/// Holds the session's uploaded tables, deduplicated by source filename.
///
/// Re-uploading a filename replaces its prior table in place, so uploading
/// the same file twice yields the same combined state as uploading it
/// once. The combined view is recomputed fresh on every call; the registry
/// is bounded by the number of uploads in a session, so there is nothing
/// worth caching.
#[derive(Debug, Default)]
pub struct UploadRegistry {
    tables: Vec<UploadedTable>,
}

impl UploadRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self { tables: Vec::new() }
    }

    /// Adds a table, replacing any existing table with the same
    /// `source_file` at its original position.
    pub fn add_or_replace(&mut self, table: UploadedTable) {
        if let Some(existing) = self
            .tables
            .iter_mut()
            .find(|t| t.source_file == table.source_file)
        {
            log::info!(
                "Replacing upload {:?} ({} rows -> {} rows)",
                table.source_file,
                existing.rows.len(),
                table.rows.len()
            );
            *existing = table;
        } else {
            self.tables.push(table);
        }
    }

    /// Removes the table for `source_file`. Returns whether one existed.
    pub fn remove(&mut self, source_file: &str) -> bool {
        let before = self.tables.len();
        self.tables.retain(|t| t.source_file != source_file);
        self.tables.len() != before
    }

    /// Concatenates all registered tables into one working row set.
    #[must_use]
    pub fn combined(&self) -> Vec<UploadedLocation> {
        self.tables
            .iter()
            .flat_map(|t| t.rows.iter().cloned())
            .collect()
    }

    /// The registered source filenames, in registration order.
    #[must_use]
    pub fn sources(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.source_file.as_str()).collect()
    }

    /// Number of registered tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether no tables are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(source_file: &str, rows: usize) -> UploadedTable {
        UploadedTable {
            source_file: source_file.to_string(),
            rows: (0..rows)
                .map(|i| UploadedLocation {
                    lat: Some(35.0 + i as f64),
                    lon: Some(-80.0),
                    source_file: source_file.to_string(),
                    ..UploadedLocation::default()
                })
                .collect(),
        }
    }

    #[test]
    fn reupload_replaces_instead_of_appending() {
        let mut registry = UploadRegistry::new();
        registry.add_or_replace(table("a.csv", 3));
        registry.add_or_replace(table("a.csv", 5));

        assert_eq!(registry.len(), 1);
        // combined() reflects the second upload's rows, not the sum.
        assert_eq!(registry.combined().len(), 5);
    }

    #[test]
    fn replacement_keeps_position() {
        let mut registry = UploadRegistry::new();
        registry.add_or_replace(table("a.csv", 1));
        registry.add_or_replace(table("b.csv", 1));
        registry.add_or_replace(table("a.csv", 2));

        assert_eq!(registry.sources(), vec!["a.csv", "b.csv"]);
        assert_eq!(registry.combined()[0].source_file, "a.csv");
    }

    #[test]
    fn combined_concatenates_all_tables() {
        let mut registry = UploadRegistry::new();
        registry.add_or_replace(table("a.csv", 2));
        registry.add_or_replace(table("b.csv", 3));
        assert_eq!(registry.combined().len(), 5);
    }

    #[test]
    fn remove_takes_effect_immediately() {
        let mut registry = UploadRegistry::new();
        registry.add_or_replace(table("a.csv", 2));
        registry.add_or_replace(table("b.csv", 3));

        assert!(registry.remove("a.csv"));
        assert_eq!(registry.combined().len(), 3);
        assert!(!registry.remove("a.csv"));
    }

    #[test]
    fn empty_registry_combines_to_nothing() {
        assert!(UploadRegistry::new().combined().is_empty());
    }
}
