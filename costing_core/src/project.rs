//! # Workbook
//!
//! The `Workbook` is the root container for saved costing data. Workbooks
//! serialize to `.est` files as human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! Workbook
//! ├── meta: WorkbookMetadata (version, owner, company, timestamps)
//! ├── settings: WorkbookSettings (currency, markups)
//! └── records: HashMap<Uuid, StoredRecord> (all saved items, by collection)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use costing_core::calculations::{collections, CalculationItem};
//! use costing_core::materials::Material;
//! use costing_core::project::Workbook;
//! use costing_core::store::RecordStore;
//!
//! let mut workbook = Workbook::new("Priya", "Acme Gears");
//! let id = workbook
//!     .create(collections::MATERIALS, CalculationItem::Material(Material::new("EN8", 7.85)))
//!     .unwrap();
//! assert!(workbook.get(collections::MATERIALS, &id).is_ok());
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculations::{collections, CalculationItem, ProcessRecord};
use crate::config::MarkupDefaults;
use crate::errors::{CalcError, CalcResult};
use crate::materials::MaterialLibrary;
use crate::store::{RecordStore, StoredRecord};

/// Current schema version for .est files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root workbook container.
///
/// Records are stored in a flat UUID-keyed map; the collection name lives
/// on each record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workbook {
    pub meta: WorkbookMetadata,
    pub settings: WorkbookSettings,
    pub records: HashMap<Uuid, StoredRecord>,
}

impl Workbook {
    /// Create a new empty workbook.
    ///
    /// ```rust
    /// use costing_core::project::Workbook;
    ///
    /// let workbook = Workbook::new("Priya", "Acme Gears");
    /// assert_eq!(workbook.meta.owner, "Priya");
    /// ```
    pub fn new(owner: impl Into<String>, company: impl Into<String>) -> Self {
        let now = Utc::now();
        Workbook {
            meta: WorkbookMetadata {
                version: SCHEMA_VERSION.to_string(),
                owner: owner.into(),
                company: company.into(),
                created: now,
                modified: now,
            },
            settings: WorkbookSettings::default(),
            records: HashMap::new(),
        }
    }

    /// Store an item in its usual collection
    pub fn add_item(&mut self, item: CalculationItem) -> Uuid {
        let record = StoredRecord::new(item.default_collection(), item);
        let id = record.id;
        log::info!("Added {} record {}", record.collection, id);
        self.records.insert(id, record);
        self.touch();
        id
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Materials saved in the workbook, on top of the standard library.
    pub fn material_library(&self) -> MaterialLibrary {
        let saved = self.get_all(collections::MATERIALS).into_iter().filter_map(|r| match &r.item {
            CalculationItem::Material(m) => Some(m.clone()),
            _ => None,
        });
        let mut library = MaterialLibrary::standard();
        for material in saved {
            if let Err(e) = library.add(material) {
                log::warn!("Ignoring saved material: {}", e);
            }
        }
        library
    }

    /// All process records, oldest first
    pub fn process_records(&self) -> Vec<ProcessRecord> {
        self.get_all(collections::PROCESSES)
            .into_iter()
            .filter_map(|r| match &r.item {
                CalculationItem::Process(p) => Some(p.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Workbook::new("", "")
    }
}

impl RecordStore for Workbook {
    fn create(&mut self, collection: &str, item: CalculationItem) -> CalcResult<Uuid> {
        if collection.trim().is_empty() {
            return Err(CalcError::missing_field("collection"));
        }
        let record = StoredRecord::new(collection, item);
        let id = record.id;
        self.records.insert(id, record);
        self.touch();
        log::info!("Created {} record {}", collection, id);
        Ok(id)
    }

    fn get_all(&self, collection: &str) -> Vec<&StoredRecord> {
        let mut records: Vec<&StoredRecord> =
            self.records.values().filter(|r| r.collection == collection).collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        records
    }

    fn get(&self, collection: &str, id: &Uuid) -> CalcResult<&StoredRecord> {
        self.records
            .get(id)
            .filter(|r| r.collection == collection)
            .ok_or_else(|| CalcError::record_not_found(collection, id))
    }

    fn update(&mut self, collection: &str, id: &Uuid, item: CalculationItem) -> CalcResult<()> {
        let record = self
            .records
            .get_mut(id)
            .filter(|r| r.collection == collection)
            .ok_or_else(|| CalcError::record_not_found(collection, id))?;
        record.item = item;
        record.updated_at = Utc::now();
        self.touch();
        log::info!("Updated {} record {}", collection, id);
        Ok(())
    }

    fn delete(&mut self, collection: &str, id: &Uuid) -> CalcResult<StoredRecord> {
        match self.records.get(id) {
            Some(r) if r.collection == collection => {}
            _ => return Err(CalcError::record_not_found(collection, id)),
        }
        let removed = self
            .records
            .remove(id)
            .ok_or_else(|| CalcError::record_not_found(collection, id))?;
        self.touch();
        log::info!("Deleted {} record {}", collection, id);
        Ok(removed)
    }
}

/// Workbook metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkbookMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,
    pub owner: String,
    pub company: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// Settings shared by every record in the workbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkbookSettings {
    /// Currency code for displayed amounts
    pub currency: String,
    /// Markups seeded into new estimations
    pub markups: MarkupDefaults,
}

impl Default for WorkbookSettings {
    fn default() -> Self {
        WorkbookSettings {
            currency: "INR".to_string(),
            markups: MarkupDefaults::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::{EstimationInput, EstimationRecord};
    use crate::calculations::estimation::EstimationStatus;
    use crate::materials::Material;
    use serde_json::json;

    fn estimation(customer: &str, status: EstimationStatus) -> CalculationItem {
        let mut input = EstimationInput::default();
        input.header.customer_name = customer.to_string();
        input.status = status;
        CalculationItem::Estimation(EstimationRecord::from_input(input))
    }

    #[test]
    fn test_workbook_creation() {
        let workbook = Workbook::new("Priya", "Acme Gears");
        assert_eq!(workbook.meta.owner, "Priya");
        assert_eq!(workbook.meta.company, "Acme Gears");
        assert_eq!(workbook.meta.version, SCHEMA_VERSION);
        assert_eq!(workbook.settings.currency, "INR");
    }

    #[test]
    fn test_workbook_serialization() {
        let mut workbook = Workbook::new("Priya", "Acme Gears");
        workbook.add_item(CalculationItem::Material(Material::new("EN8", 7.85)));
        let json = serde_json::to_string_pretty(&workbook).unwrap();
        assert!(json.contains("Acme Gears"));
        assert!(json.contains("\"materials\""));

        let roundtrip: Workbook = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.record_count(), 1);
    }

    #[test]
    fn test_crud() {
        let mut workbook = Workbook::default();
        let id = workbook
            .create(collections::ESTIMATIONS, estimation("Acme", EstimationStatus::Draft))
            .unwrap();
        let created = workbook.get(collections::ESTIMATIONS, &id).unwrap().created_at;

        workbook
            .update(collections::ESTIMATIONS, &id, estimation("Acme", EstimationStatus::Submitted))
            .unwrap();
        let record = workbook.get(collections::ESTIMATIONS, &id).unwrap();
        assert_eq!(record.created_at, created);
        assert!(record.updated_at >= created);
        assert_eq!(record.item.status(), Some("Submitted"));

        // Wrong collection behaves like a missing id
        let err = workbook.get(collections::WEIGHTS, &id).unwrap_err();
        assert_eq!(err.error_code(), "RECORD_NOT_FOUND");

        workbook.delete(collections::ESTIMATIONS, &id).unwrap();
        assert_eq!(workbook.record_count(), 0);
        assert!(workbook.delete(collections::ESTIMATIONS, &id).is_err());
        assert!(workbook
            .update(collections::ESTIMATIONS, &id, estimation("Acme", EstimationStatus::Draft))
            .is_err());
    }

    /// Three estimations created one minute apart, oldest first
    fn dated_workbook() -> (Workbook, [Uuid; 3]) {
        let mut workbook = Workbook::default();
        let items = [
            estimation("Acme", EstimationStatus::Draft),
            estimation("Beta", EstimationStatus::Approved),
            estimation("Acme", EstimationStatus::Approved),
        ];
        let start = Utc::now() - chrono::Duration::minutes(10);
        let mut ids = [Uuid::nil(); 3];
        for (i, item) in items.into_iter().enumerate() {
            let id = workbook.create(collections::ESTIMATIONS, item).unwrap();
            let record = workbook.records.get_mut(&id).unwrap();
            record.created_at = start + chrono::Duration::minutes(i as i64);
            ids[i] = id;
        }
        (workbook, ids)
    }

    #[test]
    fn test_queries() {
        let (workbook, [first, second, third]) = dated_workbook();

        let all: Vec<Uuid> = workbook
            .get_all(collections::ESTIMATIONS)
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(all, vec![first, second, third]);

        let approved: Vec<Uuid> = workbook
            .get_by_status(collections::ESTIMATIONS, "Approved")
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(approved, vec![third, second]);

        let acme: Vec<Uuid> = workbook
            .get_by_field(collections::ESTIMATIONS, "input.header.customer_name", &json!("Acme"))
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(acme, vec![third, first]);

        assert!(workbook
            .get_by_field(collections::ESTIMATIONS, "no.such.field", &json!("Acme"))
            .is_empty());
    }

    #[test]
    fn test_query_by_several_fields() {
        let (workbook, [_, _, third]) = dated_workbook();

        let hits = workbook.get_by_fields(
            collections::ESTIMATIONS,
            &[
                ("input.header.customer_name", json!("Acme")),
                ("input.status", json!("Approved")),
            ],
        );
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, third);

        let none = workbook.get_by_fields(
            collections::ESTIMATIONS,
            &[
                ("input.header.customer_name", json!("Beta")),
                ("input.status", json!("Draft")),
            ],
        );
        assert!(none.is_empty());
    }

    #[test]
    fn test_material_library_merges_saved() {
        let mut workbook = Workbook::default();
        workbook.add_item(CalculationItem::Material(Material::new("Inconel 718", 8.19)));
        workbook.add_item(CalculationItem::Material(Material::new("EN8", 7.80)));

        let library = workbook.material_library();
        assert_eq!(library.get("Inconel 718").unwrap().specific_gravity, 8.19);
        assert_eq!(library.get("EN8").unwrap().specific_gravity, 7.80);
    }

    #[test]
    fn test_process_records() {
        let mut workbook = Workbook::default();
        workbook.add_item(CalculationItem::Process(ProcessRecord::new("Acme", "Turning", 4.0)));
        workbook.add_item(CalculationItem::Material(Material::new("EN8", 7.85)));
        assert_eq!(workbook.process_records().len(), 1);
    }
}
