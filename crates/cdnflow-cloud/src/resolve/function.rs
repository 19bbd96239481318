//! Edge function resolution
//!
//! Resolution happens in two halves. [`plan_function`] is a pure decision
//! over the config; [`prepare_function`] and [`resolve_function`] run the
//! build and read the compiled artifact back.

use crate::error::{CloudError, Result};
use crate::logical_id;
use crate::template::intrinsic;
use cdnflow_build::{ArtifactBuilder, BuildError};
use cdnflow_core::{FunctionConfig, is_valid_function_arn, qualified_name};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

/// Where the function code comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionSource {
    /// Compiled from a source directory
    Build { source_dir: PathBuf },
    /// Existing function
    Reference { arn: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionPlan {
    /// Qualified name (`<env>-<name>`)
    pub name: String,
    pub source: FunctionSource,
}

impl FunctionPlan {
    pub fn needs_build(&self) -> bool {
        matches!(self.source, FunctionSource::Build { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedFunction {
    /// Registered by this stack with the compiled code inlined
    Owned { name: String, code: String },
    /// Existing function, associated by ARN
    Referenced { name: String, arn: String },
}

impl ResolvedFunction {
    pub fn name(&self) -> &str {
        match self {
            ResolvedFunction::Owned { name, .. } | ResolvedFunction::Referenced { name, .. } => {
                name
            }
        }
    }

    pub fn is_owned(&self) -> bool {
        matches!(self, ResolvedFunction::Owned { .. })
    }

    /// ARN of the function, as a template value
    pub fn arn(&self) -> Value {
        match self {
            ResolvedFunction::Owned { .. } => {
                intrinsic::get_att(logical_id::FUNCTION, "FunctionARN")
            }
            ResolvedFunction::Referenced { arn, .. } => Value::String(arn.clone()),
        }
    }
}

/// Decide how the function is sourced. `None` when no function is configured.
pub fn plan_function(
    function: Option<&FunctionConfig>,
    environment_prefix: Option<&str>,
) -> Result<Option<FunctionPlan>> {
    let Some(function) = function else {
        return Ok(None);
    };

    let name = qualified_name(environment_prefix, &function.name);
    let source = match &function.arn {
        Some(arn) if is_valid_function_arn(arn) => FunctionSource::Reference { arn: arn.clone() },
        Some(arn) => {
            return Err(CloudError::Resolution(format!(
                "invalid function ARN: {}",
                arn
            )));
        }
        None => FunctionSource::Build {
            source_dir: function.source_dir(),
        },
    };

    tracing::debug!("Function {} resolved as {:?}", name, source);
    Ok(Some(FunctionPlan { name, source }))
}

/// Run the build for a function that is compiled from source.
///
/// Returns whether a build ran.
pub fn prepare_function(plan: &FunctionPlan, builder: &dyn ArtifactBuilder) -> Result<bool> {
    match &plan.source {
        FunctionSource::Build { source_dir } => {
            builder.prepare(std::slice::from_ref(source_dir))?;
            Ok(true)
        }
        FunctionSource::Reference { .. } => Ok(false),
    }
}

/// Turn a plan into a function, reading the compiled artifact when owned.
pub fn resolve_function(
    plan: FunctionPlan,
    builder: &dyn ArtifactBuilder,
) -> Result<ResolvedFunction> {
    match plan.source {
        FunctionSource::Reference { arn } => Ok(ResolvedFunction::Referenced {
            name: plan.name,
            arn,
        }),
        FunctionSource::Build { source_dir } => {
            let artifact = builder.artifact_path(&source_dir);
            if !artifact.is_file() {
                return Err(BuildError::ArtifactMissing(artifact).into());
            }
            let code = fs::read_to_string(&artifact)?;
            tracing::debug!("Loaded {} bytes from {}", code.len(), artifact.display());
            Ok(ResolvedFunction::Owned {
                name: plan.name,
                code,
            })
        }
    }
}
