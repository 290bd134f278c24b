use thiserror::Error;
use wsx_host::HostError;

/// Errors produced by component registration, configuration and state access.
#[derive(Debug, Error)]
pub enum ComponentError {
    /// A host DOM operation failed.
    #[error(transparent)]
    Host(#[from] HostError),
    /// The derived or requested tag is not a valid custom element name.
    #[error("`{0}` is not a valid custom element name")]
    InvalidTagName(String),
    /// A state key was first created with a different value type.
    #[error("state `{key}` holds a `{expected}`, not a `{requested}`")]
    StateTypeMismatch {
        /// The state key.
        key: String,
        /// Type the state was created with.
        expected: &'static str,
        /// Type requested by the caller.
        requested: &'static str,
    },
    /// A configuration value could not be converted.
    #[error("invalid configuration value for `{key}`: {source}")]
    Config {
        /// The configuration key.
        key: String,
        /// The conversion error.
        #[source]
        source: serde_json::Error,
    },
}
