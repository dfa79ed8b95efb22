//! Document state and logic (UI-agnostic).

mod io;
mod ops;
mod state;

pub use io::LoadReport;
pub use state::Document;
