//! # Form State
//!
//! State holders for the interactive calculators. Every setter for a base
//! field immediately runs a full, synchronous recompute and replaces the
//! derived values as a whole, so the derived values never go stale.
//!
//! - [`EstimationForm`] - manual estimation with cost roll-up
//! - [`WeightForm`] - raw material weight by shape

pub mod estimation_form;
pub mod weight_form;

pub use estimation_form::EstimationForm;
pub use weight_form::WeightForm;
