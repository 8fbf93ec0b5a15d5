//! Weight calculator form state.
//!
//! Dimensions are keyed per shape: selecting another shape starts from an
//! all-zero dimension set of that shape. While the form is incomplete the
//! result stays at zero; once complete, an invalid entry is rejected and
//! the last valid result stays on display.

use crate::calculations::estimation::coerce_number;
use crate::calculations::weight::{
    compute_weight, Shape, ShapeKind, WeightInput, WeightRecord, WeightResult,
};
use crate::config::WeightDefaults;
use crate::errors::{CalcError, CalcResult};
use crate::materials::MaterialLibrary;

#[derive(Debug, Clone, PartialEq)]
pub struct WeightForm {
    material_name: String,
    specific_gravity: f64,
    shape: Shape,
    result: WeightResult,
    defaults: WeightDefaults,
}

impl Default for WeightForm {
    fn default() -> Self {
        Self::with_defaults(WeightDefaults::default())
    }
}

impl WeightForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(defaults: WeightDefaults) -> Self {
        WeightForm {
            material_name: String::new(),
            specific_gravity: defaults.specific_gravity,
            shape: defaults.shape.empty_shape(),
            result: WeightResult::default(),
            defaults,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::with_defaults(self.defaults);
    }

    pub fn material_name(&self) -> &str {
        &self.material_name
    }

    pub fn specific_gravity(&self) -> f64 {
        self.specific_gravity
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Last valid result (unrounded)
    pub fn result(&self) -> WeightResult {
        self.result
    }

    /// Switch shape, discarding every dimension entered so far.
    pub fn select_shape(&mut self, kind: ShapeKind) -> CalcResult<WeightResult> {
        self.shape = kind.empty_shape();
        self.refresh()
    }

    /// Pick a material from the library and take over its specific gravity.
    pub fn select_material(
        &mut self,
        library: &MaterialLibrary,
        name: &str,
    ) -> CalcResult<WeightResult> {
        let material = library.get(name)?;
        self.material_name = material.material_name.clone();
        self.specific_gravity = material.specific_gravity;
        self.refresh()
    }

    /// Override the specific gravity by hand
    pub fn set_specific_gravity(&mut self, value: f64) -> CalcResult<WeightResult> {
        self.specific_gravity = coerce_number(value);
        self.refresh()
    }

    /// Set one dimension of the active shape (mm).
    ///
    /// Zero clears the field. A negative value is rejected straight away,
    /// even on an incomplete shape, and leaves the shape unchanged.
    pub fn set_dimension(&mut self, field: &str, value: f64) -> CalcResult<WeightResult> {
        let value = coerce_number(value);
        let mut next = self.shape;
        next.set_dimension(field, value)?;
        if value < 0.0 {
            log::warn!("Rejected negative {} of {} mm", field, value);
            return Err(CalcError::invalid_dimension(
                next.kind().as_str(),
                field,
                value,
                "Dimension must be positive",
            ));
        }
        self.shape = next;
        self.refresh()
    }

    /// Recompute from the current inputs.
    ///
    /// An incomplete shape shows zero. A complete but invalid one keeps the
    /// previous result and returns the error naming the field.
    fn refresh(&mut self) -> CalcResult<WeightResult> {
        let incomplete = self.shape.dimensions().iter().any(|(_, value)| *value == 0.0);
        if incomplete {
            self.result = WeightResult::default();
            return Ok(self.result);
        }
        match compute_weight(&self.shape, self.specific_gravity) {
            Ok(result) => {
                self.result = result;
                Ok(result)
            }
            Err(e) => {
                log::warn!("Weight input rejected, keeping previous result: {}", e);
                Err(e)
            }
        }
    }

    /// Build the record to persist. A material and a non-zero weight are required.
    pub fn to_record(&self) -> CalcResult<WeightRecord> {
        if self.material_name.trim().is_empty() {
            return Err(CalcError::missing_field("material_name"));
        }
        let input = WeightInput {
            material_name: self.material_name.clone(),
            specific_gravity: self.specific_gravity,
            shape: self.shape,
        };
        let result = compute_weight(&input.shape, input.specific_gravity)?;
        Ok(WeightRecord::new(input, result))
    }

    /// Load a stored calculation back into the form, keeping the
    /// configured defaults for the next `reset`.
    pub fn load_record(&mut self, record: &WeightRecord) {
        self.material_name = record.input.material_name.clone();
        self.specific_gravity = record.input.specific_gravity;
        self.shape = record.input.shape;
        self.result = record.exact;
    }
}
