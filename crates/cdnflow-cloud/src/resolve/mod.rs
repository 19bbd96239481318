//! Resolvers turning config intent into resource decisions

pub mod access;
pub mod encryption;
pub mod function;

pub use access::{ResolvedAccessControl, resolve_access_control};
pub use encryption::{ContextKeyLookup, KeyLookup, KeyRef, ResolvedEncryption, resolve_encryption};
pub use function::{
    FunctionPlan, FunctionSource, ResolvedFunction, plan_function, prepare_function,
    resolve_function,
};
