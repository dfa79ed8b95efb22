//! gridcalc-core - UI-agnostic document model + workspace storage.

pub mod document;
pub mod error;
pub mod storage;

pub use document::{Document, LoadReport};
pub use error::{GridcalcError, Result};

pub use gridcalc_engine::engine::CellRef;
