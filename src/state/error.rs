use crate::api::ApiError;

/// Errors surfaced by the state containers
///
/// Every variant is `Clone` so it can be kept inside a state snapshot and shown
/// inline next to the data it failed to produce.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConsoleError {
    /// The server could not be reached or the connection test failed
    #[error("Connection failed: {0}")]
    Connectivity(ApiError),

    /// Loading data (folder contents, parameters, policies, search) failed
    #[error("{context}: {source}")]
    Load { context: String, source: ApiError },

    /// Required parameters are still empty; never sent to the server
    #[error("Missing required parameters: {}", .missing.join(", "))]
    Validation { missing: Vec<String> },

    /// A raw value could not be converted to the parameter's declared type
    #[error("Invalid value '{value}' for parameter '{parameter}': {reason}")]
    Coercion {
        parameter: String,
        value: String,
        reason: String,
    },

    #[error("Failed to render report: {0}")]
    Render(ApiError),

    /// A folder, report or policy mutation was rejected
    #[error("{action} failed: {source}")]
    Persistence { action: String, source: ApiError },

    #[error("No report selected")]
    NoSelection,

    /// The operation needs data that has not finished loading
    #[error("{0} is not loaded yet")]
    NotReady(String),

    #[error("Role '{role}' cannot be assigned here. Assignable roles: {}", .assignable.join(", "))]
    UnknownRole { role: String, assignable: Vec<String> },

    #[error("Unknown parameter '{0}'")]
    UnknownParameter(String),

    #[error("Invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// Local file or key-value storage failure
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ConsoleError {
    pub fn load(context: impl Into<String>, source: ApiError) -> Self {
        ConsoleError::Load {
            context: context.into(),
            source,
        }
    }

    pub fn persistence(action: impl Into<String>, source: ApiError) -> Self {
        ConsoleError::Persistence {
            action: action.into(),
            source,
        }
    }

    /// Underlying API error, if the failure came from the server
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            ConsoleError::Connectivity(e) | ConsoleError::Render(e) => Some(e),
            ConsoleError::Load { source, .. } | ConsoleError::Persistence { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConsoleError {
    fn from(err: std::io::Error) -> Self {
        ConsoleError::Storage(err.to_string())
    }
}
