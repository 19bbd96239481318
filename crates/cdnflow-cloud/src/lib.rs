//! cdnflow stack synthesis
//!
//! This crate turns a validated [`cdnflow_core::Config`] into a deployment
//! template for a static site: an S3 origin bucket behind a CloudFront
//! distribution, with an optional KMS key, edge function and origin
//! access control.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                   cdnflow CLI                     │
//! │              (cdnflow synth / plan)               │
//! └─────────────────┬────────────────────────────────┘
//!                   │ Config
//! ┌─────────────────▼────────────────────────────────┐
//! │                 cdnflow-cloud                     │
//! │  ┌────────────┐ ┌────────────┐ ┌──────────────┐  │
//! │  │ encryption │ │  function  │ │    access    │  │
//! │  │  resolver  │ │  resolver  │ │   control    │  │
//! │  └─────┬──────┘ └─────┬──────┘ └──────┬───────┘  │
//! │        └──────┬───────┴───────────────┘          │
//! │        ┌──────▼───────┐   ┌──────────────────┐   │
//! │        │ StackBuilder │◄──│ policy assembler │   │
//! │        └──────┬───────┘   └──────────────────┘   │
//! └───────────────┼──────────────────────────────────┘
//!                 │ Template
//! ┌───────────────▼──────────────────────────────────┐
//! │        trait DeploymentEngine { ... }            │
//! └──────────────────────────────────────────────────┘
//! ```

pub mod action;
pub mod assemble;
pub mod edge;
pub mod engine;
pub mod error;
pub mod logical_id;
pub mod policy;
pub mod resolve;
pub mod stack;
pub mod template;

// Re-exports
pub use action::{Action, ActionType, Plan, PlanSummary};
pub use assemble::{AssembledPolicies, OriginReader, PolicyTargets, assemble};
pub use edge::rewrite_uri;
pub use engine::{DeployOutcome, DeploymentEngine, TemplateWriter};
pub use error::{CloudError, Result};
pub use policy::{AccountRef, Effect, PolicyDocument, PolicyStatement, Principal};
pub use resolve::{
    ContextKeyLookup, FunctionPlan, FunctionSource, KeyLookup, KeyRef, ResolvedAccessControl,
    ResolvedEncryption, ResolvedFunction,
};
pub use stack::{StackBuilder, Step, SynthesizedStack, synthesize};
pub use template::{Output, Resource, Template};
