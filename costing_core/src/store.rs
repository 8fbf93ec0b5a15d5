//! # Record Store
//!
//! Persistence seam for saved calculations. Records live in named
//! collections (see [`collections`](crate::calculations::collections)) and
//! carry creation and update timestamps. The calculation engines never
//! depend on a store; [`Workbook`](crate::project::Workbook) is the
//! file-backed implementation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::calculations::CalculationItem;
use crate::errors::CalcResult;

/// A stored item and its bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: Uuid,
    pub collection: String,
    pub item: CalculationItem,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredRecord {
    pub fn new(collection: impl Into<String>, item: CalculationItem) -> Self {
        let now = Utc::now();
        StoredRecord {
            id: Uuid::new_v4(),
            collection: collection.into(),
            item,
            created_at: now,
            updated_at: now,
        }
    }

    /// Value at a dotted path into the serialized item, e.g.
    /// `"input.header.customer_name"`.
    pub fn field(&self, path: &str) -> Option<Value> {
        let mut value = serde_json::to_value(&self.item).ok()?;
        for key in path.split('.') {
            value = value.get_mut(key)?.take();
        }
        Some(value)
    }
}

/// Generic CRUD over collections of [`CalculationItem`]s.
pub trait RecordStore {
    /// Store `item` and return its new id
    fn create(&mut self, collection: &str, item: CalculationItem) -> CalcResult<Uuid>;

    /// Every record in `collection`, oldest first
    fn get_all(&self, collection: &str) -> Vec<&StoredRecord>;

    fn get(&self, collection: &str, id: &Uuid) -> CalcResult<&StoredRecord>;

    /// Replace the item, keeping `created_at` and refreshing `updated_at`.
    fn update(&mut self, collection: &str, id: &Uuid, item: CalculationItem) -> CalcResult<()>;

    fn delete(&mut self, collection: &str, id: &Uuid) -> CalcResult<StoredRecord>;

    /// Records whose item reports `status`, newest first.
    fn get_by_status(&self, collection: &str, status: &str) -> Vec<&StoredRecord> {
        let hits = self
            .get_all(collection)
            .into_iter()
            .filter(|r| r.item.status() == Some(status))
            .collect();
        newest_first(hits)
    }

    /// Records whose field at `path` equals `value`, newest first.
    fn get_by_field(&self, collection: &str, path: &str, value: &Value) -> Vec<&StoredRecord> {
        self.get_by_fields(collection, &[(path, value.clone())])
    }

    /// Records matching every `(path, value)` pair, newest first.
    fn get_by_fields(&self, collection: &str, conditions: &[(&str, Value)]) -> Vec<&StoredRecord> {
        let hits = self
            .get_all(collection)
            .into_iter()
            .filter(|r| {
                conditions
                    .iter()
                    .all(|(path, value)| r.field(path).as_ref() == Some(value))
            })
            .collect();
        newest_first(hits)
    }
}

fn newest_first(mut records: Vec<&StoredRecord>) -> Vec<&StoredRecord> {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    records
}
