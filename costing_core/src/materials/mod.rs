//! # Material Library
//!
//! Material master records supplying the specific gravity used by the
//! weight calculator. Lookups by name fail with
//! [`CalcError::MaterialNotFound`] rather than falling back to a zero
//! gravity that would silently zero a weight and every cost built on it.
//!
//! ## Example
//!
//! ```rust
//! use costing_core::materials::MaterialLibrary;
//!
//! let library = MaterialLibrary::standard();
//! let en8 = library.get("EN8").unwrap();
//! assert_eq!(en8.specific_gravity, 7.85);
//!
//! assert!(library.get("Unobtainium").is_err());
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Whether a material can be picked for new calculations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialStatus {
    #[default]
    Active,
    Inactive,
}

/// A material master record.
///
/// ## JSON Example
///
/// ```json
/// { "material_name": "SS304", "base_uom": "Kg", "specific_gravity": 7.93, "status": "Active" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub material_name: String,
    #[serde(default = "default_uom")]
    pub base_uom: String,
    /// Density in g/cm³
    pub specific_gravity: f64,
    #[serde(default)]
    pub status: MaterialStatus,
}

fn default_uom() -> String {
    "Kg".to_string()
}

impl Material {
    /// Create an active material measured in Kg
    pub fn new(material_name: impl Into<String>, specific_gravity: f64) -> Self {
        Material {
            material_name: material_name.into(),
            base_uom: default_uom(),
            specific_gravity,
            status: MaterialStatus::Active,
        }
    }

    /// Validate the record before it is stored.
    pub fn validate(&self) -> CalcResult<()> {
        if self.material_name.trim().is_empty() {
            return Err(CalcError::missing_field("material_name"));
        }
        if !(self.specific_gravity.is_finite() && self.specific_gravity > 0.0) {
            return Err(CalcError::invalid_input(
                "specific_gravity",
                self.specific_gravity.to_string(),
                "Specific gravity must be positive",
            ));
        }
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.status == MaterialStatus::Active
    }
}

/// Common engineering materials and their specific gravities (g/cm³)
const STANDARD_MATERIALS: [(&str, f64); 24] = [
    ("Mild Steel", 7.85),
    ("16MnCr5", 7.85),
    ("EN8", 7.85),
    ("EN19", 7.85),
    ("EN24", 7.85),
    ("EN31", 7.81),
    ("C45", 7.85),
    ("4140", 7.85),
    ("4340", 7.85),
    ("SS304", 7.93),
    ("SS316", 7.98),
    ("SS410", 7.74),
    ("SS420", 7.74),
    ("Aluminum 6061", 2.70),
    ("Aluminum 7075", 2.81),
    ("Brass", 8.50),
    ("Bronze", 8.80),
    ("Copper", 8.96),
    ("Cast Iron", 7.20),
    ("Ductile Iron", 7.10),
    ("Tool Steel D2", 7.70),
    ("Tool Steel H13", 7.80),
    ("Titanium Grade 2", 4.51),
    ("Titanium Grade 5", 4.43),
];

/// Ordered, name-unique collection of materials.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialLibrary {
    materials: Vec<Material>,
}

impl MaterialLibrary {
    /// Empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Library seeded with [`STANDARD_MATERIALS`]
    pub fn standard() -> Self {
        MaterialLibrary {
            materials: STANDARD_MATERIALS
                .iter()
                .map(|(name, sg)| Material::new(*name, *sg))
                .collect(),
        }
    }

    /// Add a material, replacing any existing one with the same name.
    pub fn add(&mut self, material: Material) -> CalcResult<()> {
        material.validate()?;
        match self
            .materials
            .iter_mut()
            .find(|m| m.material_name.eq_ignore_ascii_case(&material.material_name))
        {
            Some(existing) => *existing = material,
            None => self.materials.push(material),
        }
        Ok(())
    }

    /// Look up a material by name (case-insensitive)
    pub fn get(&self, name: &str) -> CalcResult<&Material> {
        self.materials
            .iter()
            .find(|m| m.material_name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| CalcError::material_not_found(name))
    }

    /// Names of active materials in library order
    pub fn names(&self) -> Vec<&str> {
        self.materials
            .iter()
            .filter(|m| m.is_active())
            .map(|m| m.material_name.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl FromIterator<Material> for MaterialLibrary {
    fn from_iter<I: IntoIterator<Item = Material>>(iter: I) -> Self {
        let mut library = MaterialLibrary::new();
        for material in iter {
            if let Err(e) = library.add(material) {
                log::warn!("Skipping invalid material record: {}", e);
            }
        }
        library
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_library_lookup() {
        let library = MaterialLibrary::standard();
        assert_eq!(library.len(), STANDARD_MATERIALS.len());
        assert_eq!(library.get("ss316").unwrap().specific_gravity, 7.98);
        assert_eq!(library.get("Aluminum 6061").unwrap().base_uom, "Kg");
    }

    #[test]
    fn test_missing_material_fails_loudly() {
        let library = MaterialLibrary::standard();
        let err = library.get("Inconel").unwrap_err();
        assert_eq!(err, CalcError::material_not_found("Inconel"));
    }

    #[test]
    fn test_add_replaces_same_name() {
        let mut library = MaterialLibrary::new();
        library.add(Material::new("EN8", 7.85)).unwrap();
        library.add(Material::new("en8", 7.80)).unwrap();
        assert_eq!(library.len(), 1);
        assert_eq!(library.get("EN8").unwrap().specific_gravity, 7.80);
    }

    #[test]
    fn test_invalid_material_rejected() {
        let mut library = MaterialLibrary::new();
        assert!(library.add(Material::new("", 7.85)).is_err());
        assert!(library.add(Material::new("Foam", 0.0)).is_err());
        assert!(library.is_empty());
    }

    #[test]
    fn test_inactive_hidden_from_names() {
        let mut inactive = Material::new("Old Alloy", 8.0);
        inactive.status = MaterialStatus::Inactive;
        let library: MaterialLibrary =
            vec![Material::new("EN8", 7.85), inactive].into_iter().collect();
        assert_eq!(library.names(), vec!["EN8"]);
        // Still resolvable for existing records
        assert!(library.get("Old Alloy").is_ok());
    }

    #[test]
    fn test_material_deserialize_defaults() {
        let m: Material =
            serde_json::from_str(r#"{ "material_name": "Brass", "specific_gravity": 8.5 }"#)
                .unwrap();
        assert_eq!(m.base_uom, "Kg");
        assert_eq!(m.status, MaterialStatus::Active);
    }
}
