//! cdnflow edge function build pipeline
//!
//! This crate compiles CloudFront Function sources into deployable
//! artifacts. Every step runs synchronously, so the artifact is on disk
//! before the stack reads it.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod progress;

pub use config::{ARTIFACT_FILE, BuildConfig};
pub use error::{BuildError, BuildResult};
pub use pipeline::{ArtifactBuilder, BuildPipeline, clean_artifacts};
pub use progress::BuildProgress;
