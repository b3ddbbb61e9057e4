//! threatreg-registry: the service layer over threatreg-storage.
//!
//! `Registry` owns the database manager, the event dispatcher and the
//! resolved configuration. Operations are grouped by entity in the modules
//! below, each adding an `impl Registry` block.

pub mod assignments;
pub mod attributes;
pub mod components;
pub mod controls;
pub mod domains;
pub mod inheritance;
pub mod patterns;
pub mod registry;
pub mod relationships;
pub mod resolutions;
pub mod tags;
pub mod threats;
pub mod tree;

mod validate;

pub use patterns::PatternMatch;
pub use registry::Registry;
