//! Bounded virtual table of previously created entities.
//!
//! One table exists per resource (books, customers, orders). Tables are
//! populated from `201 Created` responses fed back by the transport layer
//! and give the engine real identifiers to target with GET/PUT/DELETE
//! requests and cross-resource references.
//!
//! The table is memory-bounded: inserting a new key once 1000 rows are
//! live clears the whole table first. A clear can orphan identifiers still
//! referenced by rows in other tables; callers must tolerate stale
//! cross-references.

use crate::random::RandomContext;
use serde_json::Value;
use std::collections::BTreeMap;

/// An entity record: plain field-to-value data, independent of how it was
/// synthesized.
pub type Record = serde_json::Map<String, Value>;

/// Read a string field from a record, or `""` when absent or non-string.
pub fn str_field<'a>(record: &'a Record, name: &str) -> &'a str {
    record.get(name).and_then(Value::as_str).unwrap_or("")
}

/// Maximum number of live rows before an insert clears the table.
pub const MAX_ROWS: usize = 1000;

/// Bounded id-to-record mapping with random-access retrieval.
///
/// Rows are kept in a `BTreeMap` so key iteration order is deterministic
/// and random-key draws replay with the seed.
#[derive(Debug, Default)]
pub struct VirtualTable {
    rows: BTreeMap<String, Record>,
    keep_fields: Option<Vec<String>>,
}

impl VirtualTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field-projection mode: only the listed fields are retained on insert.
    pub fn with_keep_fields(fields: Vec<String>) -> Self {
        Self {
            rows: BTreeMap::new(),
            keep_fields: Some(fields),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, key: &str) -> Option<&Record> {
        self.rows.get(key)
    }

    /// Uniformly random key, for GET and DELETE targets. Returns `None` on
    /// an empty table; callers must check emptiness before sampling.
    pub fn random_key(&self, ctx: &mut RandomContext) -> Option<String> {
        if self.rows.is_empty() {
            return None;
        }
        let idx = ctx.uniform_int(self.rows.len() as u64) as usize;
        self.rows.keys().nth(idx).cloned()
    }

    /// Uniformly random key plus a copy of its record, for requests that
    /// need the original data (PUT). The copy may be mutated freely without
    /// touching the stored row.
    pub fn random_row(&self, ctx: &mut RandomContext) -> Option<(String, Record)> {
        let key = self.random_key(ctx)?;
        let row = self.rows.get(&key)?.clone();
        Some((key, row))
    }

    /// Insert or overwrite a row. Inserting a new key once `MAX_ROWS` rows
    /// are live clears the whole table first, leaving the new row as the
    /// sole entry. Overwriting a live key never clears.
    pub fn put(&mut self, key: String, mut row: Record) {
        if self.rows.len() >= MAX_ROWS && !self.rows.contains_key(&key) {
            self.clear();
        }
        if let Some(keep) = &self.keep_fields {
            row.retain(|name, _| keep.iter().any(|k| k == name));
        }
        self.rows.insert(key, row);
    }

    /// Delete a row if present. Removing an absent key is a no-op.
    pub fn remove(&mut self, key: &str) {
        self.rows.remove(key);
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(fields: &[(&str, &str)]) -> Record {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect()
    }

    #[test]
    fn test_random_key_on_empty_table_is_none() {
        let table = VirtualTable::new();
        let mut ctx = RandomContext::new(1);
        assert!(table.random_key(&mut ctx).is_none());
        assert!(table.random_row(&mut ctx).is_none());
    }

    #[test]
    fn test_random_key_is_always_a_live_key() {
        let mut table = VirtualTable::new();
        for i in 0..20 {
            table.put(format!("id-{i}"), record(&[("n", "v")]));
        }
        let mut ctx = RandomContext::new(5);
        for _ in 0..100 {
            let key = table.random_key(&mut ctx).unwrap();
            assert!(table.get(&key).is_some());
        }
    }

    #[test]
    fn test_random_row_returns_a_copy() {
        let mut table = VirtualTable::new();
        table.put("a".into(), record(&[("title", "original")]));
        let mut ctx = RandomContext::new(2);

        let (key, mut row) = table.random_row(&mut ctx).unwrap();
        row.insert("title".into(), json!("mutated"));

        assert_eq!(str_field(table.get(&key).unwrap(), "title"), "original");
    }

    #[test]
    fn test_insert_beyond_cap_clears_the_table() {
        let mut table = VirtualTable::new();
        for i in 0..MAX_ROWS {
            table.put(format!("id-{i}"), Record::new());
        }
        assert_eq!(table.len(), MAX_ROWS);

        table.put("overflow".into(), Record::new());
        assert_eq!(table.len(), 1);
        assert!(table.get("overflow").is_some());
    }

    #[test]
    fn test_overwrite_at_cap_does_not_clear() {
        let mut table = VirtualTable::new();
        for i in 0..MAX_ROWS {
            table.put(format!("id-{i}"), record(&[("v", "old")]));
        }

        table.put("id-0".into(), record(&[("v", "new")]));
        assert_eq!(table.len(), MAX_ROWS);
        assert_eq!(str_field(table.get("id-0").unwrap(), "v"), "new");
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut table = VirtualTable::new();
        table.put("a".into(), Record::new());
        table.remove("a");
        table.remove("a");
        table.remove("never-existed");
        assert!(table.is_empty());
    }

    #[test]
    fn test_put_overwrites_existing_key() {
        let mut table = VirtualTable::new();
        table.put("a".into(), record(&[("v", "1")]));
        table.put("a".into(), record(&[("v", "2")]));
        assert_eq!(table.len(), 1);
        assert_eq!(str_field(table.get("a").unwrap(), "v"), "2");
    }

    #[test]
    fn test_keep_fields_projects_on_insert() {
        let mut table = VirtualTable::with_keep_fields(vec!["title".into()]);
        table.put("a".into(), record(&[("title", "kept"), ("password", "dropped")]));

        let row = table.get("a").unwrap();
        assert_eq!(str_field(row, "title"), "kept");
        assert!(row.get("password").is_none());
    }
}
