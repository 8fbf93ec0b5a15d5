//! # Raw Material Weight
//!
//! Computes the solid volume of a stock shape and its mass from the
//! material's specific gravity. All lengths are millimeters.
//!
//! | Shape   | Volume (mm³)                          |
//! |---------|---------------------------------------|
//! | Flat    | length × width × thickness            |
//! | Pipe    | π × ((OD/2)² − (ID/2)²) × length      |
//! | Round   | π × (OD/2)² × length                  |
//! | Hexagon | (3√3/2) × AF² × length                |
//!
//! Mass is `volume × specific_gravity / 1,000,000` with specific gravity
//! in g/cm³: 1 cm³ is 1000 mm³ and 1 kg is 1000 g.
//!
//! ## Example
//!
//! ```rust
//! use costing_core::calculations::weight::{compute_weight, Shape};
//!
//! let bar = Shape::Flat { length: 100.0, width: 50.0, thickness: 10.0 };
//! let result = compute_weight(&bar, 7.85).unwrap();
//! assert_eq!(result.volume_mm3, 50_000.0);
//! assert!((result.weight_kg - 0.3925).abs() < 1e-12);
//! ```

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::units::round_to;

/// mm³ × (g/cm³) → kg
pub const MM3_SG_TO_KG: f64 = 1_000_000.0;

/// Decimal places shown for volume
pub const VOLUME_DECIMALS: u32 = 2;

/// Decimal places shown for weight
pub const WEIGHT_DECIMALS: u32 = 3;

/// Shape category without dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Flat,
    Pipe,
    Round,
    Hexagon,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 4] = [
        ShapeKind::Flat,
        ShapeKind::Pipe,
        ShapeKind::Round,
        ShapeKind::Hexagon,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Flat => "flat",
            ShapeKind::Pipe => "pipe",
            ShapeKind::Round => "round",
            ShapeKind::Hexagon => "hexagon",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            ShapeKind::Flat => "Flat Material",
            ShapeKind::Pipe => "Pipe / Ring",
            ShapeKind::Round => "Round Material",
            ShapeKind::Hexagon => "Hexagon Material",
        }
    }

    /// Dimension field names required by this shape, in entry order
    pub fn dimension_fields(&self) -> &'static [&'static str] {
        match self {
            ShapeKind::Flat => &["length", "width", "thickness"],
            ShapeKind::Pipe => &["outer_diameter", "inner_diameter", "length"],
            ShapeKind::Round => &["outer_diameter", "length"],
            ShapeKind::Hexagon => &["across_flats", "length"],
        }
    }

    /// A shape of this kind with every dimension at zero
    pub fn empty_shape(&self) -> Shape {
        match self {
            ShapeKind::Flat => Shape::Flat {
                length: 0.0,
                width: 0.0,
                thickness: 0.0,
            },
            ShapeKind::Pipe => Shape::Pipe {
                outer_diameter: 0.0,
                inner_diameter: 0.0,
                length: 0.0,
            },
            ShapeKind::Round => Shape::Round {
                outer_diameter: 0.0,
                length: 0.0,
            },
            ShapeKind::Hexagon => Shape::Hexagon {
                across_flats: 0.0,
                length: 0.0,
            },
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShapeKind {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShapeKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                CalcError::invalid_input("shape", s, "Expected flat, pipe, round or hexagon")
            })
    }
}

/// Stock shape with its own dimension set (mm).
///
/// ## JSON Example
///
/// ```json
/// { "type": "pipe", "outer_diameter": 60.0, "inner_diameter": 40.0, "length": 200.0 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    Flat {
        #[serde(default)]
        length: f64,
        #[serde(default)]
        width: f64,
        #[serde(default)]
        thickness: f64,
    },
    Pipe {
        #[serde(default)]
        outer_diameter: f64,
        #[serde(default)]
        inner_diameter: f64,
        #[serde(default)]
        length: f64,
    },
    Round {
        #[serde(default)]
        outer_diameter: f64,
        #[serde(default)]
        length: f64,
    },
    Hexagon {
        #[serde(default)]
        across_flats: f64,
        #[serde(default)]
        length: f64,
    },
}

impl Default for Shape {
    fn default() -> Self {
        ShapeKind::default().empty_shape()
    }
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Flat { .. } => ShapeKind::Flat,
            Shape::Pipe { .. } => ShapeKind::Pipe,
            Shape::Round { .. } => ShapeKind::Round,
            Shape::Hexagon { .. } => ShapeKind::Hexagon,
        }
    }

    /// (field, value) pairs in the order of [`ShapeKind::dimension_fields`]
    pub fn dimensions(&self) -> Vec<(&'static str, f64)> {
        let values: Vec<f64> = match *self {
            Shape::Flat {
                length,
                width,
                thickness,
            } => vec![length, width, thickness],
            Shape::Pipe {
                outer_diameter,
                inner_diameter,
                length,
            } => vec![outer_diameter, inner_diameter, length],
            Shape::Round { outer_diameter, length } => vec![outer_diameter, length],
            Shape::Hexagon { across_flats, length } => vec![across_flats, length],
        };
        self.kind().dimension_fields().iter().copied().zip(values).collect()
    }

    /// Set one dimension of the active shape.
    ///
    /// Fields belonging to other shapes are rejected, so values never
    /// leak between shape kinds.
    pub fn set_dimension(&mut self, field: &str, value: f64) -> CalcResult<()> {
        let kind = self.kind();
        let slot = match (self, field) {
            (Shape::Flat { length, .. }, "length") => length,
            (Shape::Flat { width, .. }, "width") => width,
            (Shape::Flat { thickness, .. }, "thickness") => thickness,
            (Shape::Pipe { outer_diameter, .. }, "outer_diameter") => outer_diameter,
            (Shape::Pipe { inner_diameter, .. }, "inner_diameter") => inner_diameter,
            (Shape::Pipe { length, .. }, "length") => length,
            (Shape::Round { outer_diameter, .. }, "outer_diameter") => outer_diameter,
            (Shape::Round { length, .. }, "length") => length,
            (Shape::Hexagon { across_flats, .. }, "across_flats") => across_flats,
            (Shape::Hexagon { length, .. }, "length") => length,
            _ => {
                return Err(CalcError::invalid_input(
                    field,
                    value.to_string(),
                    format!("Not a dimension of {} shape", kind),
                ))
            }
        };
        *slot = value;
        Ok(())
    }

    /// Check every required dimension is positive and a pipe's bore is
    /// smaller than its outside diameter.
    pub fn validate(&self) -> CalcResult<()> {
        let kind = self.kind();
        for (field, value) in self.dimensions() {
            if !(value.is_finite() && value > 0.0) {
                return Err(CalcError::invalid_dimension(
                    kind.as_str(),
                    field,
                    value,
                    "Dimension must be positive",
                ));
            }
        }
        if let Shape::Pipe {
            outer_diameter,
            inner_diameter,
            ..
        } = *self
        {
            if inner_diameter >= outer_diameter {
                return Err(CalcError::invalid_dimension(
                    kind.as_str(),
                    "inner_diameter",
                    inner_diameter,
                    format!(
                        "Inner diameter must be smaller than outer diameter ({})",
                        outer_diameter
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Geometric volume in mm³ with no validation
    fn raw_volume_mm3(&self) -> f64 {
        match *self {
            Shape::Flat {
                length,
                width,
                thickness,
            } => length * width * thickness,
            Shape::Pipe {
                outer_diameter,
                inner_diameter,
                length,
            } => {
                let outer_radius = outer_diameter / 2.0;
                let inner_radius = inner_diameter / 2.0;
                PI * (outer_radius * outer_radius - inner_radius * inner_radius) * length
            }
            Shape::Round { outer_diameter, length } => {
                let radius = outer_diameter / 2.0;
                PI * radius * radius * length
            }
            Shape::Hexagon { across_flats, length } => {
                (3.0 * 3f64.sqrt() / 2.0) * across_flats.powi(2) * length
            }
        }
    }
}

/// Lenient volume for a partially filled form.
///
/// Any dimension still at zero (or unparsable) gives a volume of 0 rather
/// than a partial product.
pub fn volume_mm3(shape: &Shape) -> f64 {
    let incomplete = shape
        .dimensions()
        .iter()
        .any(|(_, value)| *value == 0.0 || !value.is_finite());
    if incomplete {
        0.0
    } else {
        shape.raw_volume_mm3()
    }
}

/// Unrounded volume and mass of a stock piece.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightResult {
    pub volume_mm3: f64,
    pub weight_kg: f64,
}

impl WeightResult {
    /// Volume rounded to [`VOLUME_DECIMALS`]
    pub fn display_volume_mm3(&self) -> f64 {
        round_to(self.volume_mm3, VOLUME_DECIMALS)
    }

    /// Weight rounded to [`WEIGHT_DECIMALS`]
    pub fn display_weight_kg(&self) -> f64 {
        round_to(self.weight_kg, WEIGHT_DECIMALS)
    }
}

/// Compute volume and mass for `shape` at `specific_gravity` (g/cm³).
///
/// # Returns
///
/// * `Ok(WeightResult)` - unrounded values; round only for display
/// * `Err(CalcError::InvalidShapeDimension)` - a required dimension is
///   non-positive, or a pipe's inner diameter is not below its outer one
/// * `Err(CalcError::InvalidInput)` - specific gravity is not positive
pub fn compute_weight(shape: &Shape, specific_gravity: f64) -> CalcResult<WeightResult> {
    shape.validate()?;
    if !(specific_gravity.is_finite() && specific_gravity > 0.0) {
        return Err(CalcError::invalid_input(
            "specific_gravity",
            specific_gravity.to_string(),
            "Specific gravity must be positive",
        ));
    }

    let volume_mm3 = shape.raw_volume_mm3();
    let weight_kg = volume_mm3 * specific_gravity / MM3_SG_TO_KG;
    log::debug!(
        "weight: {} volume {:.4} mm3, sg {}, {:.6} kg",
        shape.kind(),
        volume_mm3,
        specific_gravity,
        weight_kg
    );

    Ok(WeightResult { volume_mm3, weight_kg })
}

/// A weight calculation as entered: material, its gravity and the shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightInput {
    pub material_name: String,
    pub specific_gravity: f64,
    pub shape: Shape,
}

/// Calculate the weight for a full input
pub fn calculate(input: &WeightInput) -> CalcResult<WeightResult> {
    compute_weight(&input.shape, input.specific_gravity)
}

/// Persisted weight calculation: inputs, display values, exact values and
/// a timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightRecord {
    pub input: WeightInput,
    /// Volume rounded for display (mm³)
    pub volume_mm3: f64,
    /// Weight rounded for display (kg)
    pub weight_kg: f64,
    /// Unrounded result for downstream calculations
    pub exact: WeightResult,
    pub calculated_at: DateTime<Utc>,
}

impl WeightRecord {
    pub fn new(input: WeightInput, result: WeightResult) -> Self {
        WeightRecord {
            input,
            volume_mm3: result.display_volume_mm3(),
            weight_kg: result.display_weight_kg(),
            exact: result,
            calculated_at: Utc::now(),
        }
    }

    /// Shape category of the stored input
    pub fn shape_kind(&self) -> ShapeKind {
        self.input.shape.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!((actual - expected).abs() < tol, "expected {expected}, got {actual}");
    }

    #[test]
    fn test_flat_worked_example() {
        let shape = Shape::Flat {
            length: 100.0,
            width: 50.0,
            thickness: 10.0,
        };
        let r = compute_weight(&shape, 7.85).unwrap();
        assert_eq!(r.volume_mm3, 50_000.0);
        assert_close(r.weight_kg, 0.3925, 1e-12);
        assert_eq!(r.display_volume_mm3(), 50_000.0);
    }

    #[test]
    fn test_round_bar() {
        let shape = Shape::Round {
            outer_diameter: 20.0,
            length: 100.0,
        };
        let r = compute_weight(&shape, 7.85).unwrap();
        // π × 10² × 100
        assert_close(r.volume_mm3, 31_415.926_535, 1e-5);
        assert_close(r.weight_kg, 0.246_615, 1e-6);
        assert_eq!(r.display_weight_kg(), 0.247);
    }

    #[test]
    fn test_pipe() {
        let shape = Shape::Pipe {
            outer_diameter: 60.0,
            inner_diameter: 40.0,
            length: 200.0,
        };
        let r = compute_weight(&shape, 7.85).unwrap();
        // π × (900 − 400) × 200
        assert_close(r.volume_mm3, PI * 500.0 * 200.0, 1e-6);
        assert_eq!(r.display_volume_mm3(), 314_159.27);
    }

    #[test]
    fn test_hexagon() {
        let shape = Shape::Hexagon {
            across_flats: 10.0,
            length: 100.0,
        };
        let r = compute_weight(&shape, 8.5).unwrap();
        let expected = 1.5 * 3f64.sqrt() * 100.0 * 100.0;
        assert_close(r.volume_mm3, expected, 1e-9);
        assert_close(r.weight_kg, expected * 8.5 / 1e6, 1e-12);
    }

    #[test]
    fn test_pipe_bore_not_smaller_than_od_rejected() {
        let shape = Shape::Pipe {
            outer_diameter: 40.0,
            inner_diameter: 60.0,
            length: 200.0,
        };
        let err = compute_weight(&shape, 7.85).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_SHAPE_DIMENSION");
        assert_eq!(err.field(), Some("inner_diameter"));

        let equal = Shape::Pipe {
            outer_diameter: 40.0,
            inner_diameter: 40.0,
            length: 200.0,
        };
        assert!(compute_weight(&equal, 7.85).is_err());
    }

    #[test]
    fn test_missing_dimension_rejected_by_engine() {
        let shape = Shape::Flat {
            length: 100.0,
            width: 0.0,
            thickness: 10.0,
        };
        let err = compute_weight(&shape, 7.85).unwrap_err();
        assert_eq!(err.field(), Some("width"));
    }

    #[test]
    fn test_negative_dimension_rejected_by_engine() {
        let shape = Shape::Hexagon {
            across_flats: -12.0,
            length: 50.0,
        };
        let err = compute_weight(&shape, 7.85).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_SHAPE_DIMENSION");
        assert_eq!(err.field(), Some("across_flats"));
    }

    #[test]
    fn test_lenient_volume_zero_when_incomplete() {
        let shape = Shape::Round {
            outer_diameter: 20.0,
            length: 0.0,
        };
        assert_eq!(volume_mm3(&shape), 0.0);
        assert_eq!(volume_mm3(&ShapeKind::Hexagon.empty_shape()), 0.0);

        let complete = Shape::Flat {
            length: 2.0,
            width: 3.0,
            thickness: 4.0,
        };
        assert_eq!(volume_mm3(&complete), 24.0);
    }

    #[test]
    fn test_non_positive_specific_gravity_rejected() {
        let shape = Shape::Flat {
            length: 1.0,
            width: 1.0,
            thickness: 1.0,
        };
        let err = compute_weight(&shape, 0.0).unwrap_err();
        assert_eq!(err.field(), Some("specific_gravity"));
    }

    #[test]
    fn test_set_dimension_only_on_active_shape() {
        let mut shape = ShapeKind::Round.empty_shape();
        shape.set_dimension("outer_diameter", 25.0).unwrap();
        assert!(shape.set_dimension("width", 10.0).is_err());
        assert_eq!(shape.dimensions(), vec![("outer_diameter", 25.0), ("length", 0.0)]);
    }

    #[test]
    fn test_shape_kind_parsing() {
        assert_eq!("Hexagon".parse::<ShapeKind>().unwrap(), ShapeKind::Hexagon);
        assert!("triangle".parse::<ShapeKind>().is_err());
        assert_eq!(ShapeKind::Pipe.label(), "Pipe / Ring");
    }

    #[test]
    fn test_shape_serialization() {
        let shape = Shape::Pipe {
            outer_diameter: 60.0,
            inner_diameter: 40.0,
            length: 200.0,
        };
        let json = serde_json::to_string(&shape).unwrap();
        assert!(json.contains("\"type\":\"pipe\""));
        let roundtrip: Shape = serde_json::from_str(&json).unwrap();
        assert_eq!(shape, roundtrip);

        let partial: Shape =
            serde_json::from_str(r#"{ "type": "round", "outer_diameter": 12.0 }"#).unwrap();
        assert_eq!(volume_mm3(&partial), 0.0);
    }

    #[test]
    fn test_record_keeps_exact_and_display_values() {
        let input = WeightInput {
            material_name: "EN8".to_string(),
            specific_gravity: 7.85,
            shape: Shape::Round {
                outer_diameter: 20.0,
                length: 100.0,
            },
        };
        let result = calculate(&input).unwrap();
        let record = WeightRecord::new(input, result);
        assert_eq!(record.weight_kg, 0.247);
        assert_close(record.exact.weight_kg, 0.246_615, 1e-6);
        assert_eq!(record.shape_kind(), ShapeKind::Round);
    }
}
