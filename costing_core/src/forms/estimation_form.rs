//! Manual estimation form state.
//!
//! ```rust
//! use costing_core::forms::EstimationForm;
//!
//! let mut form = EstimationForm::new();
//! form.set_weight_kg(10.0);
//! form.set_rate_per_kg(100.0);
//! form.add_process("CNC Turning", 2.0, 50.0).unwrap();
//! form.set_quantity(5.0);
//!
//! assert_eq!(form.breakdown().total_part_cost, 5500.0);
//! ```

use chrono::Utc;
use uuid::Uuid;

use crate::calculations::estimation::{
    coerce_number, recompute, CostBreakdown, EstimationHeader, EstimationInput, EstimationRecord,
    EstimationStatus, ProcessLine,
};
use crate::config::MarkupDefaults;
use crate::errors::{CalcError, CalcResult};

/// Holds a manual estimation being edited and its current breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimationForm {
    input: EstimationInput,
    breakdown: CostBreakdown,
    markups: MarkupDefaults,
    editing_id: Option<Uuid>,
}

impl Default for EstimationForm {
    fn default() -> Self {
        Self::new()
    }
}

impl EstimationForm {
    /// Blank form with the standard markups (15 / 2 / 10 %)
    pub fn new() -> Self {
        Self::with_markups(MarkupDefaults::default())
    }

    /// Blank form seeded with configured markups
    pub fn with_markups(markups: MarkupDefaults) -> Self {
        let mut form = EstimationForm {
            input: EstimationInput::default(),
            breakdown: CostBreakdown::default(),
            markups,
            editing_id: None,
        };
        form.reset();
        form
    }

    /// Load a stored estimation for editing. The configured markups are
    /// kept for the next `reset`.
    pub fn edit(&mut self, id: Uuid, record: &EstimationRecord) {
        self.input = record.input.clone();
        self.editing_id = Some(id);
        self.refresh();
    }

    /// Restore the blank form, keeping the configured markups.
    pub fn reset(&mut self) {
        let today = Utc::now().date_naive();
        self.input = EstimationInput {
            header: EstimationHeader {
                enquiry_date: Some(today),
                quotation_date: Some(today),
                ..Default::default()
            },
            quantity: 1.0,
            profit_pct: self.markups.profit_pct,
            packing_pct: self.markups.packing_pct,
            overheads_pct: self.markups.overheads_pct,
            status: EstimationStatus::Draft,
            ..Default::default()
        };
        self.editing_id = None;
        self.refresh();
    }

    pub fn input(&self) -> &EstimationInput {
        &self.input
    }

    pub fn breakdown(&self) -> &CostBreakdown {
        &self.breakdown
    }

    pub fn editing_id(&self) -> Option<Uuid> {
        self.editing_id
    }

    /// Header fields do not feed the roll-up, so editing them never recomputes.
    pub fn header_mut(&mut self) -> &mut EstimationHeader {
        &mut self.input.header
    }

    pub fn set_status(&mut self, status: EstimationStatus) {
        self.input.status = status;
    }

    /// Part name, drawing and material are descriptive only.
    pub fn set_part_identity(
        &mut self,
        part_name: impl Into<String>,
        drawing_no: impl Into<String>,
        material: impl Into<String>,
    ) {
        let part = &mut self.input.part;
        part.part_name = part_name.into();
        part.drawing_no = drawing_no.into();
        part.material = material.into();
    }

    // ------------------------------------------------------------------
    // Base fields: each returns whether the breakdown changed
    // ------------------------------------------------------------------

    pub fn set_weight_kg(&mut self, value: f64) -> bool {
        self.input.part.weight_kg = coerce_number(value);
        self.refresh()
    }

    pub fn set_rate_per_kg(&mut self, value: f64) -> bool {
        self.input.part.rate_per_kg = coerce_number(value);
        self.refresh()
    }

    pub fn set_quantity(&mut self, value: f64) -> bool {
        self.input.quantity = coerce_number(value);
        self.refresh()
    }

    pub fn set_transport(&mut self, value: f64) -> bool {
        self.input.transport = coerce_number(value);
        self.refresh()
    }

    pub fn set_oiling(&mut self, value: f64) -> bool {
        self.input.oiling = coerce_number(value);
        self.refresh()
    }

    pub fn set_others(&mut self, value: f64) -> bool {
        self.input.others = coerce_number(value);
        self.refresh()
    }

    pub fn set_profit_pct(&mut self, value: f64) -> bool {
        self.input.profit_pct = coerce_number(value);
        self.refresh()
    }

    pub fn set_packing_pct(&mut self, value: f64) -> bool {
        self.input.packing_pct = coerce_number(value);
        self.refresh()
    }

    pub fn set_overheads_pct(&mut self, value: f64) -> bool {
        self.input.overheads_pct = coerce_number(value);
        self.refresh()
    }

    /// Append a process line.
    ///
    /// A name is required and time and rate must be positive; on rejection
    /// the process list is left as it was.
    pub fn add_process(
        &mut self,
        process_name: &str,
        time_hours: f64,
        rate_per_hour: f64,
    ) -> CalcResult<Uuid> {
        let process_name = process_name.trim();
        if process_name.is_empty() {
            return Err(CalcError::missing_field("process_name"));
        }
        let time_hours = coerce_number(time_hours);
        if time_hours <= 0.0 {
            return Err(CalcError::invalid_input(
                "time_hours",
                time_hours.to_string(),
                "Process time must be positive",
            ));
        }
        let rate_per_hour = coerce_number(rate_per_hour);
        if rate_per_hour <= 0.0 {
            return Err(CalcError::invalid_input(
                "rate_per_hour",
                rate_per_hour.to_string(),
                "Process rate must be positive",
            ));
        }

        let line = ProcessLine::new(process_name, time_hours, rate_per_hour);
        let id = line.id;
        self.input.processes.push(line);
        self.refresh();
        Ok(id)
    }

    /// Remove the process line with `id`. Returns false if there was none.
    pub fn remove_process(&mut self, id: &Uuid) -> bool {
        let before = self.input.processes.len();
        self.input.processes.retain(|p| p.id != *id);
        if self.input.processes.len() == before {
            return false;
        }
        self.refresh();
        true
    }

    pub fn clear_processes(&mut self) -> bool {
        self.input.processes.clear();
        self.refresh()
    }

    /// Snapshot for persistence
    pub fn to_record(&self) -> EstimationRecord {
        EstimationRecord {
            input: self.input.clone(),
            breakdown: self.breakdown,
            calculated_at: Utc::now(),
        }
    }

    /// Full recompute; replaces the breakdown in one assignment.
    ///
    /// Returns whether the new breakdown differs from the previous one, a
    /// hint callers may use to skip a redraw.
    fn refresh(&mut self) -> bool {
        let next = recompute(&self.input.cost_base());
        let changed = next != self.breakdown;
        self.breakdown = next;
        changed
    }
}
