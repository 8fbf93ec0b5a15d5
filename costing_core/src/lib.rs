//! # costing_core - Manufacturing Cost Estimation Engine
//!
//! `costing_core` prices machined parts: it converts units, computes a
//! part's weight from its shape and material, and rolls material,
//! process and overhead figures up into a project cost. All inputs and
//! outputs are JSON-serializable so results can be stored in a workbook
//! or handed to other tools unchanged.
//!
//! ## Design Philosophy
//!
//! - **Pure engines**: the roll-up, weight and conversion functions take
//!   plain values and never touch storage
//! - **JSON-First**: all types implement Serialize/Deserialize
//! - **Rich Errors**: structured error types, not just strings
//!
//! ## Quick Start
//!
//! ```rust
//! use costing_core::calculations::estimation::{recompute, CostBase, ProcessLine};
//!
//! let base = CostBase {
//!     weight_kg: 10.0,
//!     rate_per_kg: 100.0,
//!     processes: vec![ProcessLine::new("CNC Milling", 2.0, 50.0)],
//!     quantity: 5.0,
//!     transport: 50.0,
//!     oiling: 20.0,
//!     others: 10.0,
//!     profit_pct: 15.0,
//!     packing_pct: 2.0,
//!     overheads_pct: 10.0,
//! };
//! let breakdown = recompute(&base);
//! assert!((breakdown.project_cost - 7086.60).abs() < 1e-6);
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - Cost roll-up, weight and process chart calculations
//! - [`units`] - Unit conversion
//! - [`materials`] - Material master and specific gravities
//! - [`forms`] - Form state that recomputes on every edit
//! - [`store`] - Record store abstraction
//! - [`project`] - Workbook container
//! - [`file_io`] - Workbook files with atomic saves and locking
//! - [`config`] - User defaults
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod config;
pub mod errors;
#[cfg(not(target_arch = "wasm32"))]
pub mod file_io;
pub mod forms;
pub mod materials;
pub mod project;
pub mod store;
pub mod units;

pub use config::EstimatorConfig;
pub use errors::{CalcError, CalcResult};
#[cfg(not(target_arch = "wasm32"))]
pub use file_io::{load_workbook, save_workbook, FileLock};
pub use project::{Workbook, WorkbookMetadata, WorkbookSettings};
pub use store::{RecordStore, StoredRecord};
