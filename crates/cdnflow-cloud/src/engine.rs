//! Deployment engine abstraction

use crate::error::Result;
use crate::stack::SynthesizedStack;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Materializes a synthesized stack
///
/// Engines receive the finished template and report where it went and
/// the access URL of the distribution.
#[async_trait]
pub trait DeploymentEngine: Send + Sync {
    /// Returns the engine name (e.g., "template-writer")
    fn name(&self) -> &str;

    /// Hand the stack over for deployment
    async fn deploy(&self, stack: &SynthesizedStack) -> Result<DeployOutcome>;
}

/// What a deployment produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployOutcome {
    /// `AccessURLOutput` as known to the engine
    pub access_url: String,

    /// Where the engine put the stack
    pub location: String,
}

/// Writes `<out_dir>/<stack>.template.json` for an external deployer
pub struct TemplateWriter {
    out_dir: PathBuf,
}

impl TemplateWriter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }
}

#[async_trait]
impl DeploymentEngine for TemplateWriter {
    fn name(&self) -> &str {
        "template-writer"
    }

    async fn deploy(&self, stack: &SynthesizedStack) -> Result<DeployOutcome> {
        tokio::fs::create_dir_all(&self.out_dir).await?;

        let path = self.out_dir.join(stack.template_file_name());
        let body = stack.template.to_json_pretty()?;
        tokio::fs::write(&path, body).await?;

        tracing::info!("Wrote {}", path.display());
        Ok(DeployOutcome {
            access_url: stack.access_url(),
            location: path.display().to_string(),
        })
    }
}
