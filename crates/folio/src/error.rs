//! Error types for configuration assembly and mounting

use thiserror::Error;

/// Fatal problems found while assembling an editor configuration.
///
/// Any of these aborts assembly before a session exists, so the surface can
/// never be mounted with a half-built configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("Capability '{0}' is already registered")]
    DuplicateCapability(String),

    #[error("Unknown capability or command: '{0}'")]
    UnknownCapability(String),

    #[error("Plugin '{0}' is not in the capability catalog")]
    UnknownPlugin(String),

    #[error("Mention trigger '{0}' already has a feed")]
    ConflictingTrigger(String),

    #[error("Merge field '{0}' is defined more than once")]
    DuplicateMergeField(String),

    #[error("Template '{template}' references undefined merge field '{field}'")]
    UnmatchedPlaceholder { template: String, field: String },

    #[error("Invalid export configuration: {0}")]
    InvalidExport(String),

    #[error("Invalid '{section}' section: {reason}")]
    InvalidSection { section: String, reason: String },

    #[error("Required section '{0}' is missing or empty")]
    MissingSection(String),
}

/// Failures reported by the mount lifecycle.
#[derive(Error, Debug)]
pub enum MountError {
    #[error("Editor engine construction failed: {0}")]
    Construct(String),
}
