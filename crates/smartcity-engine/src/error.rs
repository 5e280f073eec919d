//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps every failure
//! mode of a batch run.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: smartcity_core::config::ConfigError,
    },

    /// The ensemble or sweep rejected its inputs.
    #[error("run error: {source}")]
    Run {
        /// The underlying runner error.
        #[from]
        source: smartcity_core::RunError,
    },

    /// Writing the report failed.
    #[error("report error: {source}")]
    Report {
        /// The underlying report error.
        #[from]
        source: smartcity_core::report::ReportError,
    },
}
