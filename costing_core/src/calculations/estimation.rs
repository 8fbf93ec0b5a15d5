//! # Cost Roll-Up
//!
//! Computes the derived money figures of a manual estimation from its base
//! inputs. The chain is strictly linear and evaluated top to bottom:
//!
//! ```text
//! material_cost            = weight_kg × rate_per_kg
//! total_process_cost       = Σ time_hours × rate_per_hour
//! part_cost                = material_cost + total_process_cost
//! total_part_cost          = part_cost × quantity
//! manufacturing_cost_net   = total_part_cost
//! manufacturing_cost_gross = net + transport + oiling + others
//! profit/packing/overheads = gross × pct / 100
//! project_cost             = gross + profit + packing + overheads
//! ```
//!
//! No rounding is applied inside the chain. The engine does not validate
//! business ranges: zero quantities and negative percentages propagate
//! arithmetically.
//!
//! ## Example
//!
//! ```rust
//! use costing_core::calculations::estimation::{recompute, CostBase, ProcessLine};
//!
//! let base = CostBase {
//!     weight_kg: 10.0,
//!     rate_per_kg: 100.0,
//!     processes: vec![ProcessLine::new("CNC Turning", 2.0, 50.0)],
//!     quantity: 5.0,
//!     transport: 50.0,
//!     oiling: 20.0,
//!     others: 10.0,
//!     profit_pct: 15.0,
//!     packing_pct: 2.0,
//!     overheads_pct: 10.0,
//! };
//!
//! let breakdown = recompute(&base);
//! assert_eq!(breakdown.manufacturing_cost_gross, 5580.0);
//! assert!((breakdown.project_cost - 7086.60).abs() < 1e-6);
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stock process names offered when adding a process line
pub const COMMON_PROCESSES: [&str; 12] = [
    "CNC Milling",
    "CNC Turning",
    "Drilling",
    "Boring",
    "Grinding",
    "Welding",
    "Heat Treatment",
    "Surface Treatment",
    "Assembly",
    "Quality Check",
    "Packaging",
    "Material Handling",
];

/// One machining/processing step priced by time.
///
/// Names are not unique; lines are identified by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessLine {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub process_name: String,
    #[serde(default)]
    pub time_hours: f64,
    #[serde(default)]
    pub rate_per_hour: f64,
}

impl ProcessLine {
    /// Create a process line with a fresh id
    pub fn new(process_name: impl Into<String>, time_hours: f64, rate_per_hour: f64) -> Self {
        ProcessLine {
            id: Uuid::new_v4(),
            process_name: process_name.into(),
            time_hours,
            rate_per_hour,
        }
    }

    /// Line cost = time × rate
    pub fn line_cost(&self) -> f64 {
        self.time_hours * self.rate_per_hour
    }
}

/// Base inputs of the roll-up. Absent JSON fields read as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostBase {
    pub weight_kg: f64,
    pub rate_per_kg: f64,
    pub processes: Vec<ProcessLine>,
    pub quantity: f64,
    pub transport: f64,
    pub oiling: f64,
    pub others: f64,
    pub profit_pct: f64,
    pub packing_pct: f64,
    pub overheads_pct: f64,
}

/// Every derived figure of the roll-up, always produced together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub material_cost: f64,
    pub total_process_cost: f64,
    pub part_cost: f64,
    pub total_part_cost: f64,
    pub manufacturing_cost_net: f64,
    pub manufacturing_cost_gross: f64,
    pub profit_amount: f64,
    pub packing_amount: f64,
    pub overheads_amount: f64,
    pub project_cost: f64,
}

/// Recompute the full breakdown from `base`.
///
/// Total over all finite inputs and deterministic: the same base always
/// yields a bit-identical breakdown.
pub fn recompute(base: &CostBase) -> CostBreakdown {
    let material_cost = base.weight_kg * base.rate_per_kg;
    let total_process_cost: f64 = base.processes.iter().map(ProcessLine::line_cost).sum();
    let part_cost = material_cost + total_process_cost;
    let total_part_cost = part_cost * base.quantity;
    let manufacturing_cost_net = total_part_cost;
    let manufacturing_cost_gross =
        manufacturing_cost_net + base.transport + base.oiling + base.others;

    let profit_amount = manufacturing_cost_gross * base.profit_pct / 100.0;
    let packing_amount = manufacturing_cost_gross * base.packing_pct / 100.0;
    let overheads_amount = manufacturing_cost_gross * base.overheads_pct / 100.0;
    let project_cost = manufacturing_cost_gross + profit_amount + packing_amount + overheads_amount;

    log::debug!(
        "recompute: {} process lines, gross {:.4}, project {:.4}",
        base.processes.len(),
        manufacturing_cost_gross,
        project_cost
    );

    CostBreakdown {
        material_cost,
        total_process_cost,
        part_cost,
        total_part_cost,
        manufacturing_cost_net,
        manufacturing_cost_gross,
        profit_amount,
        packing_amount,
        overheads_amount,
        project_cost,
    }
}

/// Coerce a raw form number at the input boundary: anything non-finite
/// (an empty or unparsable field) becomes 0.
pub fn coerce_number(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

// ============================================================================
// Estimation records
// ============================================================================

/// Enquiry and quotation details printed on the estimate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimationHeader {
    pub customer_name: String,
    pub enquiry_number: String,
    pub enquiry_date: Option<NaiveDate>,
    pub description: String,
    pub quotation_number: String,
    pub quotation_date: Option<NaiveDate>,
    pub drawing_number: String,
}

/// Part and raw material being priced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartDetail {
    pub part_name: String,
    pub drawing_no: String,
    pub material: String,
    pub weight_kg: f64,
    pub rate_per_kg: f64,
}

/// Workflow status of an estimation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EstimationStatus {
    #[default]
    Draft,
    Submitted,
    Approved,
    Rejected,
}

impl EstimationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstimationStatus::Draft => "Draft",
            EstimationStatus::Submitted => "Submitted",
            EstimationStatus::Approved => "Approved",
            EstimationStatus::Rejected => "Rejected",
        }
    }
}

/// Everything a user enters on a manual estimation.
///
/// ## JSON Example
///
/// ```json
/// {
///   "header": { "customer_name": "Acme Gears", "quotation_number": "Q-101" },
///   "part": { "part_name": "Shaft", "material": "EN8", "weight_kg": 10.0, "rate_per_kg": 100.0 },
///   "processes": [{ "process_name": "CNC Turning", "time_hours": 2.0, "rate_per_hour": 50.0 }],
///   "quantity": 5.0,
///   "transport": 50.0,
///   "oiling": 20.0,
///   "others": 10.0,
///   "profit_pct": 15.0,
///   "packing_pct": 2.0,
///   "overheads_pct": 10.0
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimationInput {
    pub header: EstimationHeader,
    pub part: PartDetail,
    pub processes: Vec<ProcessLine>,
    pub quantity: f64,
    pub transport: f64,
    pub oiling: f64,
    pub others: f64,
    pub profit_pct: f64,
    pub packing_pct: f64,
    pub overheads_pct: f64,
    pub status: EstimationStatus,
}

impl EstimationInput {
    /// Project the base inputs the roll-up depends on.
    pub fn cost_base(&self) -> CostBase {
        CostBase {
            weight_kg: self.part.weight_kg,
            rate_per_kg: self.part.rate_per_kg,
            processes: self.processes.clone(),
            quantity: self.quantity,
            transport: self.transport,
            oiling: self.oiling,
            others: self.others,
            profit_pct: self.profit_pct,
            packing_pct: self.packing_pct,
            overheads_pct: self.overheads_pct,
        }
    }

    /// Recompute the breakdown for these inputs
    pub fn breakdown(&self) -> CostBreakdown {
        recompute(&self.cost_base())
    }
}

/// Persisted estimation: inputs, derived figures and a timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimationRecord {
    pub input: EstimationInput,
    pub breakdown: CostBreakdown,
    pub calculated_at: DateTime<Utc>,
}

impl EstimationRecord {
    /// Snapshot `input` together with its freshly computed breakdown.
    pub fn from_input(input: EstimationInput) -> Self {
        let breakdown = input.breakdown();
        EstimationRecord {
            input,
            breakdown,
            calculated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn worked_example() -> CostBase {
        CostBase {
            weight_kg: 10.0,
            rate_per_kg: 100.0,
            processes: vec![ProcessLine::new("CNC Milling", 2.0, 50.0)],
            quantity: 5.0,
            transport: 50.0,
            oiling: 20.0,
            others: 10.0,
            profit_pct: 15.0,
            packing_pct: 2.0,
            overheads_pct: 10.0,
        }
    }

    #[test]
    fn test_worked_example() {
        let b = recompute(&worked_example());
        assert_eq!(b.material_cost, 1000.0);
        assert_eq!(b.total_process_cost, 100.0);
        assert_eq!(b.part_cost, 1100.0);
        assert_eq!(b.total_part_cost, 5500.0);
        assert_eq!(b.manufacturing_cost_net, 5500.0);
        assert_eq!(b.manufacturing_cost_gross, 5580.0);
        assert!((b.profit_amount - 837.0).abs() < EPS);
        assert!((b.packing_amount - 111.6).abs() < EPS);
        assert!((b.overheads_amount - 558.0).abs() < EPS);
        assert!((b.project_cost - 7086.60).abs() < 1e-6);
    }

    #[test]
    fn test_deterministic() {
        let base = worked_example();
        let first = recompute(&base);
        let second = recompute(&base);
        assert_eq!(first, second);
        assert_eq!(first.project_cost.to_bits(), second.project_cost.to_bits());
    }

    #[test]
    fn test_composition_identities() {
        let mut base = worked_example();
        base.processes.push(ProcessLine::new("Grinding", 0.75, 420.0));
        base.quantity = 13.0;
        base.profit_pct = 12.5;
        base.packing_pct = 3.0;
        base.overheads_pct = 7.25;

        let b = recompute(&base);
        assert!((b.total_part_cost - b.part_cost * base.quantity).abs() < 1e-6);

        let markup =
            1.0 + base.profit_pct / 100.0 + base.packing_pct / 100.0 + base.overheads_pct / 100.0;
        assert!((b.project_cost - b.manufacturing_cost_gross * markup).abs() < 1e-6);
    }

    #[test]
    fn test_empty_process_list() {
        let mut base = worked_example();
        base.processes.clear();
        let b = recompute(&base);
        assert_eq!(b.total_process_cost, 0.0);
        assert_eq!(b.part_cost, b.material_cost);
    }

    #[test]
    fn test_zero_quantity_zeroes_totals() {
        let mut base = worked_example();
        base.quantity = 0.0;
        let b = recompute(&base);
        assert_eq!(b.total_part_cost, 0.0);
        // Flat costs still apply on top of a zero net
        assert_eq!(b.manufacturing_cost_gross, 80.0);
    }

    #[test]
    fn test_negative_percentage_propagates() {
        let mut base = worked_example();
        base.profit_pct = -10.0;
        base.packing_pct = 0.0;
        base.overheads_pct = 0.0;
        let b = recompute(&base);
        assert!((b.profit_amount + 558.0).abs() < EPS);
        assert!((b.project_cost - 5022.0).abs() < 1e-6);
    }

    #[test]
    fn test_duplicate_process_names_allowed() {
        let mut base = CostBase::default();
        base.processes = vec![
            ProcessLine::new("Drilling", 1.0, 10.0),
            ProcessLine::new("Drilling", 2.0, 10.0),
        ];
        assert_eq!(recompute(&base).total_process_cost, 30.0);
    }

    #[test]
    fn test_absent_fields_read_as_zero() {
        let base: CostBase =
            serde_json::from_str(r#"{ "weight_kg": 2.0, "rate_per_kg": 3.0 }"#).unwrap();
        assert_eq!(base.quantity, 0.0);
        assert_eq!(recompute(&base).material_cost, 6.0);

        let line: ProcessLine = serde_json::from_str(r#"{ "process_name": "Boring" }"#).unwrap();
        assert_eq!(line.line_cost(), 0.0);
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(f64::NAN), 0.0);
        assert_eq!(coerce_number(f64::INFINITY), 0.0);
        assert_eq!(coerce_number(-4.5), -4.5);
    }

    #[test]
    fn test_record_carries_inputs_and_breakdown() {
        let input = EstimationInput {
            part: PartDetail {
                weight_kg: 10.0,
                rate_per_kg: 100.0,
                ..Default::default()
            },
            quantity: 2.0,
            ..Default::default()
        };
        let record = EstimationRecord::from_input(input);
        assert_eq!(record.breakdown.total_part_cost, 2000.0);

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("project_cost"));
        assert!(json.contains("calculated_at"));
        let roundtrip: EstimationRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, record);
    }
}
