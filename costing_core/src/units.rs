//! # Unit Conversion
//!
//! Converts a value between units of one physical category. Length, weight
//! and volume go through a per-category base unit (mm, g, ml): the value is
//! scaled up into the base unit, then down into the target unit, so any
//! pair in a category converts without a pairwise table.
//!
//! Temperature scales do not share a zero point, so they use explicit
//! affine formulas instead of the ratio tables.
//!
//! ## Example
//!
//! ```rust
//! use costing_core::units::{convert, UnitCategory};
//!
//! let mm = convert(UnitCategory::Length, "inch", "mm", 2.0).unwrap();
//! assert!((mm - 50.8).abs() < 1e-9);
//!
//! let f = convert(UnitCategory::Temperature, "celsius", "fahrenheit", 100.0).unwrap();
//! assert_eq!(f, 212.0);
//!
//! assert!(convert(UnitCategory::Weight, "stone", "kg", 1.0).is_err());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Decimal places shown for a conversion result
pub const DISPLAY_DECIMALS: u32 = 4;

/// Millimeters per inch
pub const MM_PER_INCH: f64 = 25.4;

// ============================================================================
// Ratio tables
// ============================================================================

/// Length ratios against the millimeter
const LENGTH_UNITS: [(&str, &str, f64); 6] = [
    ("mm", "Millimeter (mm)", 1.0),
    ("cm", "Centimeter (cm)", 10.0),
    ("m", "Meter (m)", 1000.0),
    ("inch", "Inch (in)", 25.4),
    ("ft", "Feet (ft)", 304.8),
    ("yard", "Yard (yd)", 914.4),
];

/// Weight ratios against the gram
const WEIGHT_UNITS: [(&str, &str, f64); 5] = [
    ("g", "Gram (g)", 1.0),
    ("kg", "Kilogram (kg)", 1000.0),
    ("ton", "Ton (t)", 1_000_000.0),
    ("oz", "Ounce (oz)", 28.3495),
    ("lb", "Pound (lb)", 453.592),
];

/// Volume ratios against the milliliter
const VOLUME_UNITS: [(&str, &str, f64); 6] = [
    ("ml", "Milliliter (ml)", 1.0),
    ("l", "Liter (l)", 1000.0),
    ("m3", "Cubic Meter (m³)", 1_000_000.0),
    ("in3", "Cubic Inch (in³)", 16.3871),
    ("ft3", "Cubic Feet (ft³)", 28316.8),
    ("gal", "Gallon (gal)", 3785.41),
];

const TEMPERATURE_UNITS: [(&str, &str); 3] = [
    ("celsius", "Celsius (°C)"),
    ("fahrenheit", "Fahrenheit (°F)"),
    ("kelvin", "Kelvin (K)"),
];

static RATIO_TABLES: Lazy<HashMap<UnitCategory, HashMap<&'static str, f64>>> = Lazy::new(|| {
    let table = |units: &[(&'static str, &'static str, f64)]| {
        units.iter().map(|(symbol, _, ratio)| (*symbol, *ratio)).collect::<HashMap<_, _>>()
    };
    let mut tables = HashMap::new();
    tables.insert(UnitCategory::Length, table(&LENGTH_UNITS));
    tables.insert(UnitCategory::Weight, table(&WEIGHT_UNITS));
    tables.insert(UnitCategory::Volume, table(&VOLUME_UNITS));
    tables
});

// ============================================================================
// Categories
// ============================================================================

/// Physical quantity category selected on the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitCategory {
    Length,
    Weight,
    Temperature,
    Volume,
}

impl UnitCategory {
    /// All categories in menu order
    pub const ALL: [UnitCategory; 4] = [
        UnitCategory::Length,
        UnitCategory::Weight,
        UnitCategory::Temperature,
        UnitCategory::Volume,
    ];

    /// Lowercase key used in JSON and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitCategory::Length => "length",
            UnitCategory::Weight => "weight",
            UnitCategory::Temperature => "temperature",
            UnitCategory::Volume => "volume",
        }
    }

    /// Canonical unit for ratio-based categories. Temperature has none.
    pub fn base_unit(&self) -> Option<&'static str> {
        match self {
            UnitCategory::Length => Some("mm"),
            UnitCategory::Weight => Some("g"),
            UnitCategory::Volume => Some("ml"),
            UnitCategory::Temperature => None,
        }
    }

    /// Unit symbols and display labels available in this category
    pub fn units(&self) -> Vec<(&'static str, &'static str)> {
        let labelled =
            |units: &[(&'static str, &'static str, f64)]| -> Vec<(&'static str, &'static str)> {
                units.iter().map(|(symbol, label, _)| (*symbol, *label)).collect()
            };
        match self {
            UnitCategory::Length => labelled(&LENGTH_UNITS),
            UnitCategory::Weight => labelled(&WEIGHT_UNITS),
            UnitCategory::Volume => labelled(&VOLUME_UNITS),
            UnitCategory::Temperature => TEMPERATURE_UNITS.to_vec(),
        }
    }

    /// Default (from, to) pair shown when the category is selected
    pub fn default_pair(&self) -> (&'static str, &'static str) {
        match self {
            UnitCategory::Length => ("inch", "mm"),
            UnitCategory::Weight => ("kg", "lb"),
            UnitCategory::Temperature => ("celsius", "fahrenheit"),
            UnitCategory::Volume => ("l", "gal"),
        }
    }
}

impl fmt::Display for UnitCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitCategory {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UnitCategory::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                CalcError::invalid_input(
                    "category",
                    s,
                    "Expected length, weight, temperature or volume",
                )
            })
    }
}

/// Temperature scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl TemperatureUnit {
    fn parse(symbol: &str) -> CalcResult<Self> {
        match symbol {
            "celsius" => Ok(TemperatureUnit::Celsius),
            "fahrenheit" => Ok(TemperatureUnit::Fahrenheit),
            "kelvin" => Ok(TemperatureUnit::Kelvin),
            other => Err(CalcError::invalid_unit(UnitCategory::Temperature.as_str(), other)),
        }
    }
}

// ============================================================================
// Conversion
// ============================================================================

/// Ratio of `unit` against its category's base unit.
pub fn ratio(category: UnitCategory, unit: &str) -> CalcResult<f64> {
    RATIO_TABLES
        .get(&category)
        .and_then(|table| table.get(unit))
        .copied()
        .ok_or_else(|| CalcError::invalid_unit(category.as_str(), unit))
}

/// Convert `value` from `from_unit` to `to_unit` within `category`.
///
/// Returns the unrounded value; use [`round_to`] with [`DISPLAY_DECIMALS`]
/// for display. Unknown unit symbols fail with `InvalidUnit`.
pub fn convert(
    category: UnitCategory,
    from_unit: &str,
    to_unit: &str,
    value: f64,
) -> CalcResult<f64> {
    let result = match category {
        UnitCategory::Temperature => {
            let from = TemperatureUnit::parse(from_unit)?;
            let to = TemperatureUnit::parse(to_unit)?;
            convert_temperature(from, to, value)
        }
        _ => {
            let value_in_base = value * ratio(category, from_unit)?;
            value_in_base / ratio(category, to_unit)?
        }
    };
    log::debug!("convert {} {} {} -> {} = {}", category, value, from_unit, to_unit, result);
    Ok(result)
}

/// Affine temperature conversion between two scales.
pub fn convert_temperature(from: TemperatureUnit, to: TemperatureUnit, value: f64) -> f64 {
    use TemperatureUnit::*;
    match (from, to) {
        (Celsius, Fahrenheit) => value * 9.0 / 5.0 + 32.0,
        (Fahrenheit, Celsius) => (value - 32.0) * 5.0 / 9.0,
        (Celsius, Kelvin) => value + 273.15,
        (Kelvin, Celsius) => value - 273.15,
        (Fahrenheit, Kelvin) => (value - 32.0) * 5.0 / 9.0 + 273.15,
        (Kelvin, Fahrenheit) => (value - 273.15) * 9.0 / 5.0 + 32.0,
        _ => value,
    }
}

/// Quick inch to millimeter conversion, rounded for display.
pub fn inch_to_mm(inches: f64) -> f64 {
    round_to(inches * MM_PER_INCH, DISPLAY_DECIMALS)
}

/// Round half away from zero to `places` decimal places.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// One conversion request as entered on the converter.
///
/// ## JSON Example
///
/// ```json
/// { "category": "length", "from_unit": "inch", "to_unit": "mm", "value": 2.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionQuantity {
    pub category: UnitCategory,
    pub from_unit: String,
    pub to_unit: String,
    pub value: f64,
}

impl ConversionQuantity {
    /// Create a conversion request
    pub fn new(
        category: UnitCategory,
        from_unit: impl Into<String>,
        to_unit: impl Into<String>,
        value: f64,
    ) -> Self {
        ConversionQuantity {
            category,
            from_unit: from_unit.into(),
            to_unit: to_unit.into(),
            value,
        }
    }

    /// Converted value, unrounded
    pub fn result(&self) -> CalcResult<f64> {
        convert(self.category, &self.from_unit, &self.to_unit, self.value)
    }

    /// Converted value rounded to [`DISPLAY_DECIMALS`]
    pub fn display_result(&self) -> CalcResult<f64> {
        self.result().map(|v| round_to(v, DISPLAY_DECIMALS))
    }

    /// Exchange source and target units, carrying the displayed result
    /// over as the new input value.
    pub fn swap(&mut self) -> CalcResult<()> {
        let carried = self.display_result()?;
        std::mem::swap(&mut self.from_unit, &mut self.to_unit);
        self.value = carried;
        Ok(())
    }
}

/// Persisted conversion with its displayed result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRecord {
    #[serde(flatten)]
    pub quantity: ConversionQuantity,
    pub result: f64,
    pub calculated_at: DateTime<Utc>,
}

impl ConversionRecord {
    pub fn new(quantity: ConversionQuantity) -> CalcResult<Self> {
        let result = quantity.display_result()?;
        Ok(ConversionRecord {
            quantity,
            result,
            calculated_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_inch_to_mm() {
        let mm = convert(UnitCategory::Length, "inch", "mm", 2.0).unwrap();
        assert!((mm - 50.8).abs() < EPS);
        assert_eq!(inch_to_mm(2.0), 50.8);
    }

    #[test]
    fn test_length_through_base_unit() {
        let ft = convert(UnitCategory::Length, "yard", "ft", 1.0).unwrap();
        assert!((ft - 3.0).abs() < EPS);
        let cm = convert(UnitCategory::Length, "m", "cm", 1.5).unwrap();
        assert!((cm - 150.0).abs() < EPS);
    }

    #[test]
    fn test_weight_conversion() {
        let g = convert(UnitCategory::Weight, "kg", "g", 2.5).unwrap();
        assert!((g - 2500.0).abs() < EPS);
        let lb = convert(UnitCategory::Weight, "kg", "lb", 1.0).unwrap();
        assert_eq!(round_to(lb, DISPLAY_DECIMALS), 2.2046);
    }

    #[test]
    fn test_volume_conversion() {
        let ml = convert(UnitCategory::Volume, "l", "ml", 3.0).unwrap();
        assert!((ml - 3000.0).abs() < EPS);
        let l = convert(UnitCategory::Volume, "gal", "l", 1.0).unwrap();
        assert_eq!(round_to(l, DISPLAY_DECIMALS), 3.7854);
    }

    #[test]
    fn test_same_unit_is_identity() {
        let v = convert(UnitCategory::Volume, "ft3", "ft3", 7.25).unwrap();
        assert!((v - 7.25).abs() < EPS);
        let t = convert(UnitCategory::Temperature, "kelvin", "kelvin", 300.0).unwrap();
        assert_eq!(t, 300.0);
    }

    #[test]
    fn test_temperature_round_trip() {
        let f = convert(UnitCategory::Temperature, "celsius", "fahrenheit", 100.0).unwrap();
        assert_eq!(f, 212.0);
        let c = convert(UnitCategory::Temperature, "fahrenheit", "celsius", f).unwrap();
        assert_eq!(c, 100.0);
    }

    #[test]
    fn test_temperature_kelvin() {
        let k = convert(UnitCategory::Temperature, "celsius", "kelvin", 0.0).unwrap();
        assert!((k - 273.15).abs() < EPS);
        let f = convert(UnitCategory::Temperature, "kelvin", "fahrenheit", 273.15).unwrap();
        assert!((f - 32.0).abs() < EPS);
        let k = convert(UnitCategory::Temperature, "fahrenheit", "kelvin", 32.0).unwrap();
        assert!((k - 273.15).abs() < EPS);
    }

    #[test]
    fn test_unknown_unit_fails() {
        let err = convert(UnitCategory::Length, "furlong", "mm", 1.0).unwrap_err();
        assert_eq!(err, CalcError::invalid_unit("length", "furlong"));

        // A valid symbol from another category is still unknown here
        assert!(convert(UnitCategory::Weight, "mm", "g", 1.0).is_err());
        assert!(convert(UnitCategory::Temperature, "celsius", "rankine", 1.0).is_err());
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("Length".parse::<UnitCategory>().unwrap(), UnitCategory::Length);
        assert_eq!(" volume ".parse::<UnitCategory>().unwrap(), UnitCategory::Volume);
        assert!("pressure".parse::<UnitCategory>().is_err());
    }

    #[test]
    fn test_units_listing_matches_ratio_tables() {
        for category in UnitCategory::ALL {
            for (symbol, _) in category.units() {
                assert!(convert(category, symbol, symbol, 1.0).is_ok(), "{} {}", category, symbol);
            }
        }
        assert_eq!(UnitCategory::Temperature.base_unit(), None);
        assert_eq!(ratio(UnitCategory::Length, "mm").unwrap(), 1.0);
    }

    #[test]
    fn test_swap_carries_result() {
        let mut q = ConversionQuantity::new(UnitCategory::Length, "inch", "mm", 2.0);
        q.swap().unwrap();
        assert_eq!(q.from_unit, "mm");
        assert_eq!(q.to_unit, "inch");
        assert_eq!(q.value, 50.8);
        assert_eq!(q.display_result().unwrap(), 2.0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 4), 1.2346);
        assert_eq!(round_to(-2.5, 0), -3.0);
    }

    #[test]
    fn test_quantity_serialization() {
        let q = ConversionQuantity::new(UnitCategory::Temperature, "celsius", "kelvin", 25.0);
        let json = serde_json::to_string(&q).unwrap();
        assert!(json.contains("\"category\":\"temperature\""));
        let roundtrip: ConversionQuantity = serde_json::from_str(&json).unwrap();
        assert_eq!(q, roundtrip);
    }

    #[test]
    fn test_conversion_record() {
        let quantity = ConversionQuantity::new(UnitCategory::Length, "inch", "mm", 2.0);
        let record = ConversionRecord::new(quantity).unwrap();
        assert_eq!(record.result, 50.8);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["from_unit"], "inch");

        let bad = ConversionQuantity::new(UnitCategory::Length, "inch", "stone", 2.0);
        assert!(ConversionRecord::new(bad).is_err());
    }
}
