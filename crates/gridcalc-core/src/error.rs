//! Error types for Gridcalc core.

use gridcalc_engine::engine::EngineError;
use thiserror::Error;

/// Errors that can occur in the Gridcalc application
#[derive(Error, Debug)]
pub enum GridcalcError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid workspace name '{0}' (use a letter or '_' followed by letters, digits, '_', '-' or '.')")]
    InvalidWorkspaceName(String),

    #[error("Workspace '{0}' not found")]
    WorkspaceNotFound(String),

    #[error("No workspace name set")]
    NoWorkspace,
}

pub type Result<T> = std::result::Result<T, GridcalcError>;
