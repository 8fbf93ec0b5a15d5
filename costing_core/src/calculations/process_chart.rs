//! # Process Chart
//!
//! Builds a cycle-time chart from recorded process data. Records are
//! filtered by customer and operation (both required) and optionally by
//! project, part name and drawing number, then summarised.
//!
//! ## Example
//!
//! ```rust
//! use costing_core::calculations::process_chart::{build_chart, ChartFilter, ProcessRecord};
//!
//! let records = vec![
//!     ProcessRecord::new("Acme", "Turning", 12.0),
//!     ProcessRecord::new("Acme", "Turning", 8.0),
//!     ProcessRecord::new("Other", "Turning", 99.0),
//! ];
//! let chart = build_chart(&records, &ChartFilter::new("Acme", "Turning")).unwrap();
//! assert_eq!(chart.total_processes, 2);
//! assert_eq!(chart.average_cycle_time, 10.0);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::units::round_to;

/// Label for records carrying neither a process nor an operation name
pub const UNKNOWN_PROCESS: &str = "Unknown Process";

/// A recorded process step. Every field is optional in stored data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessRecord {
    pub process_name: Option<String>,
    pub operation_name: Option<String>,
    pub cycle_time: Option<f64>,
    pub customer_name: Option<String>,
    pub project_id: Option<String>,
    pub part_name: Option<String>,
    pub drawing_number: Option<String>,
}

impl ProcessRecord {
    /// Record with customer, operation and cycle time set
    pub fn new(
        customer_name: impl Into<String>,
        operation_name: impl Into<String>,
        cycle_time: f64,
    ) -> Self {
        ProcessRecord {
            operation_name: Some(operation_name.into()),
            customer_name: Some(customer_name.into()),
            cycle_time: Some(cycle_time),
            ..Default::default()
        }
    }

    /// Name shown on the chart axis
    pub fn display_name(&self) -> &str {
        non_empty(&self.process_name)
            .or_else(|| non_empty(&self.operation_name))
            .unwrap_or(UNKNOWN_PROCESS)
    }

    fn matches_operation(&self, operation: &str) -> bool {
        self.operation_name.as_deref() == Some(operation)
            || self.process_name.as_deref() == Some(operation)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

/// Selection criteria for a chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartFilter {
    pub customer_name: String,
    pub operation_name: String,
    pub project_id: Option<String>,
    /// Case-insensitive substring match
    pub part_name: Option<String>,
    /// Exact match
    pub drawing_number: Option<String>,
}

impl ChartFilter {
    pub fn new(customer_name: impl Into<String>, operation_name: impl Into<String>) -> Self {
        ChartFilter {
            customer_name: customer_name.into(),
            operation_name: operation_name.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> CalcResult<()> {
        if self.customer_name.trim().is_empty() {
            return Err(CalcError::missing_field("customer_name"));
        }
        if self.operation_name.trim().is_empty() {
            return Err(CalcError::missing_field("operation_name"));
        }
        Ok(())
    }

    pub fn matches(&self, record: &ProcessRecord) -> bool {
        if record.customer_name.as_deref() != Some(self.customer_name.as_str()) {
            return false;
        }
        if !record.matches_operation(&self.operation_name) {
            return false;
        }
        if let Some(project_id) = self.project_id.as_deref().filter(|s| !s.is_empty()) {
            if record.project_id.as_deref() != Some(project_id) {
                return false;
            }
        }
        if let Some(part) = self.part_name.as_deref().filter(|s| !s.is_empty()) {
            let wanted = part.to_lowercase();
            match record.part_name.as_deref() {
                Some(name) if name.to_lowercase().contains(&wanted) => {}
                _ => return false,
            }
        }
        if let Some(drawing) = self.drawing_number.as_deref().filter(|s| !s.is_empty()) {
            if record.drawing_number.as_deref() != Some(drawing) {
                return false;
            }
        }
        true
    }
}

/// One bar of the chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub process_name: String,
    pub cycle_time: f64,
}

/// A generated chart with its summary figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessChart {
    pub filter: ChartFilter,
    pub points: Vec<ChartPoint>,
    pub total_processes: usize,
    pub total_cycle_time: f64,
    /// Rounded to 2 decimal places
    pub average_cycle_time: f64,
    pub created_at: DateTime<Utc>,
}

/// Filter `records` and summarise their cycle times.
///
/// # Returns
///
/// * `Err(CalcError::MissingField)` - customer or operation not given
/// * `Err(CalcError::CalculationFailed)` - nothing matched the filter
pub fn build_chart(records: &[ProcessRecord], filter: &ChartFilter) -> CalcResult<ProcessChart> {
    filter.validate()?;

    let points: Vec<ChartPoint> = records
        .iter()
        .filter(|r| filter.matches(r))
        .map(|r| ChartPoint {
            process_name: r.display_name().to_string(),
            cycle_time: r.cycle_time.unwrap_or(0.0),
        })
        .collect();

    if points.is_empty() {
        return Err(CalcError::calculation_failed(
            "process_chart",
            "No process data found matching the specified criteria",
        ));
    }

    let total_cycle_time: f64 = points.iter().map(|p| p.cycle_time).sum();
    let average_cycle_time = round_to(total_cycle_time / points.len() as f64, 2);
    log::debug!(
        "chart for {} / {}: {} points",
        filter.customer_name,
        filter.operation_name,
        points.len()
    );

    Ok(ProcessChart {
        filter: filter.clone(),
        total_processes: points.len(),
        points,
        total_cycle_time,
        average_cycle_time,
        created_at: Utc::now(),
    })
}

/// Distinct operation names in first-seen order
pub fn unique_operations(records: &[ProcessRecord]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for record in records {
        let name = non_empty(&record.operation_name).or_else(|| non_empty(&record.process_name));
        if let Some(name) = name {
            if !seen.iter().any(|s| s == name) {
                seen.push(name.to_string());
            }
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_records() -> Vec<ProcessRecord> {
        vec![
            ProcessRecord {
                process_name: Some("Rough Turn".to_string()),
                part_name: Some("Main Shaft".to_string()),
                drawing_number: Some("DRG-1".to_string()),
                project_id: Some("P-1".to_string()),
                ..ProcessRecord::new("Acme", "Turning", 12.5)
            },
            ProcessRecord {
                part_name: Some("Idler Shaft".to_string()),
                project_id: Some("P-2".to_string()),
                ..ProcessRecord::new("Acme", "Turning", 7.25)
            },
            ProcessRecord {
                cycle_time: None,
                ..ProcessRecord::new("Acme", "Turning", 0.0)
            },
            ProcessRecord::new("Acme", "Milling", 30.0),
            ProcessRecord::new("Beta", "Turning", 5.0),
        ]
    }

    #[test]
    fn test_required_fields() {
        let records = sample_records();
        let err = build_chart(&records, &ChartFilter::new("", "Turning")).unwrap_err();
        assert_eq!(err.field(), Some("customer_name"));
        let err = build_chart(&records, &ChartFilter::new("Acme", " ")).unwrap_err();
        assert_eq!(err.field(), Some("operation_name"));
    }

    #[test]
    fn test_summary() {
        let chart = build_chart(&sample_records(), &ChartFilter::new("Acme", "Turning")).unwrap();
        assert_eq!(chart.total_processes, 3);
        assert_eq!(chart.total_cycle_time, 19.75);
        assert_eq!(chart.average_cycle_time, 6.58);
        assert_eq!(chart.points[0].process_name, "Rough Turn");
        assert_eq!(chart.points[1].process_name, "Turning");
        assert_eq!(chart.points[2].cycle_time, 0.0);
    }

    #[test]
    fn test_process_name_matches_operation() {
        let chart =
            build_chart(&sample_records(), &ChartFilter::new("Acme", "Rough Turn")).unwrap();
        assert_eq!(chart.total_processes, 1);
    }

    #[test]
    fn test_optional_filters() {
        let records = sample_records();
        let mut filter = ChartFilter::new("Acme", "Turning");
        filter.part_name = Some("SHAFT".to_string());
        assert_eq!(build_chart(&records, &filter).unwrap().total_processes, 2);

        filter.project_id = Some("P-2".to_string());
        let chart = build_chart(&records, &filter).unwrap();
        assert_eq!(chart.points[0].cycle_time, 7.25);

        filter.project_id = None;
        filter.drawing_number = Some("DRG-1".to_string());
        assert_eq!(build_chart(&records, &filter).unwrap().total_processes, 1);
    }

    #[test]
    fn test_no_match() {
        let err =
            build_chart(&sample_records(), &ChartFilter::new("Gamma", "Turning")).unwrap_err();
        assert_eq!(err.error_code(), "CALCULATION_FAILED");
    }

    #[test]
    fn test_unknown_process_name() {
        let record = ProcessRecord::default();
        assert_eq!(record.display_name(), UNKNOWN_PROCESS);
    }

    #[test]
    fn test_unique_operations() {
        let ops = unique_operations(&sample_records());
        assert_eq!(ops, vec!["Turning".to_string(), "Milling".to_string()]);
    }
}
