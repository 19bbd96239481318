//! Cloud resolution error types

use cdnflow_build::BuildError;
use cdnflow_core::FlowError;
use thiserror::Error;

/// Errors raised while turning a config into a stack template
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Invalid configuration: {0}")]
    Configuration(FlowError),

    #[error("Resolution failed: {0}")]
    Resolution(String),

    #[error("Build failed: {0}")]
    Build(#[from] BuildError),

    #[error("Policy assembly failed: {0}")]
    PolicyAssembly(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<FlowError> for CloudError {
    fn from(err: FlowError) -> Self {
        if err.is_resolution() {
            CloudError::Resolution(err.to_string())
        } else {
            CloudError::Configuration(err)
        }
    }
}

impl CloudError {
    /// Name of the step that failed, for user-facing reports
    pub fn step(&self) -> &'static str {
        match self {
            CloudError::Configuration(_) => "configuration",
            CloudError::Resolution(_) => "resolution",
            CloudError::Build(_) => "build",
            CloudError::PolicyAssembly(_) => "policy assembly",
            CloudError::Template(_) => "template",
            CloudError::Io(_) | CloudError::Json(_) => "output",
        }
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
