//! # Costing Calculations
//!
//! Each calculation follows the pattern:
//!
//! - `*Input` - Input parameters (JSON-serializable)
//! - `*Result` / `*Breakdown` - Derived figures (JSON-serializable)
//! - a pure function from input to result, returning [`CalcResult`](crate::errors::CalcResult)
//!   where the input can be rejected
//!
//! ## Available Calculations
//!
//! - [`estimation`] - Manufacturing cost roll-up
//! - [`weight`] - Part weight from shape dimensions and specific gravity
//! - [`process_chart`] - Cycle-time summaries over recorded processes

pub mod estimation;
pub mod process_chart;
pub mod weight;

use serde::{Deserialize, Serialize};

use crate::materials::Material;
use crate::units::ConversionRecord;

pub use estimation::{
    recompute, CostBase, CostBreakdown, EstimationInput, EstimationRecord, ProcessLine,
};
pub use process_chart::{build_chart, ChartFilter, ProcessChart, ProcessRecord};
pub use weight::{compute_weight, Shape, ShapeKind, WeightInput, WeightRecord, WeightResult};

/// Collection names used when records are persisted
pub mod collections {
    pub const ESTIMATIONS: &str = "manualEstimations";
    pub const WEIGHTS: &str = "weightCalculations";
    pub const CONVERSIONS: &str = "conversions";
    pub const MATERIALS: &str = "materials";
    pub const PROCESSES: &str = "processes";
    pub const CHART_REPORTS: &str = "chartReports";

    pub const ALL: [&str; 6] =
        [ESTIMATIONS, WEIGHTS, CONVERSIONS, MATERIALS, PROCESSES, CHART_REPORTS];
}

/// Enum wrapper for everything a workbook can store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CalculationItem {
    Estimation(EstimationRecord),
    Weight(WeightRecord),
    Conversion(ConversionRecord),
    Material(Material),
    Process(ProcessRecord),
    ChartReport(ProcessChart),
}

impl CalculationItem {
    /// Human-readable label for listings
    pub fn label(&self) -> String {
        match self {
            CalculationItem::Estimation(e) => {
                let header = &e.input.header;
                if header.quotation_number.is_empty() {
                    e.input.part.part_name.clone()
                } else {
                    header.quotation_number.clone()
                }
            }
            CalculationItem::Weight(w) => {
                format!("{} {}", w.input.material_name, w.shape_kind().label())
            }
            CalculationItem::Conversion(c) => {
                format!("{} {} -> {}", c.quantity.value, c.quantity.from_unit, c.quantity.to_unit)
            }
            CalculationItem::Material(m) => m.material_name.clone(),
            CalculationItem::Process(p) => p.display_name().to_string(),
            CalculationItem::ChartReport(c) => {
                format!("{} / {}", c.filter.customer_name, c.filter.operation_name)
            }
        }
    }

    /// Get the calculation type as a string
    pub fn calc_type(&self) -> &'static str {
        match self {
            CalculationItem::Estimation(_) => "Estimation",
            CalculationItem::Weight(_) => "Weight",
            CalculationItem::Conversion(_) => "Conversion",
            CalculationItem::Material(_) => "Material",
            CalculationItem::Process(_) => "Process",
            CalculationItem::ChartReport(_) => "ChartReport",
        }
    }

    /// Collection this kind of item is normally stored in
    pub fn default_collection(&self) -> &'static str {
        match self {
            CalculationItem::Estimation(_) => collections::ESTIMATIONS,
            CalculationItem::Weight(_) => collections::WEIGHTS,
            CalculationItem::Conversion(_) => collections::CONVERSIONS,
            CalculationItem::Material(_) => collections::MATERIALS,
            CalculationItem::Process(_) => collections::PROCESSES,
            CalculationItem::ChartReport(_) => collections::CHART_REPORTS,
        }
    }

    /// Workflow status, for item kinds that carry one
    pub fn status(&self) -> Option<&'static str> {
        match self {
            CalculationItem::Estimation(e) => Some(e.input.status.as_str()),
            CalculationItem::Material(m) => Some(if m.is_active() { "Active" } else { "Inactive" }),
            _ => None,
        }
    }
}
