//! Plan files: the deployment-specific steps fed into the runner.
//!
//! This module provides:
//! - [`PlanConfig`] and friends, the YAML schema
//! - [`Plan`] loading and validation
//! - [`Variables`] for `${step_name}` interpolation of recorded outcomes
//! - [`StageBuilder`] turning a stage into runnable steps
//! - [`PlanExecutor`] resolving stages in order

pub mod build;
pub mod executor;
pub mod interpolation;
pub mod loader;
pub mod schema;

pub use build::{BuiltChain, StageBuilder};
pub use executor::{PlanExecutor, PlanReport};
pub use interpolation::Variables;
pub use loader::Plan;
pub use schema::{ChainConfig, PlanConfig, RuleConfig, StageConfig, StepConfig, StepKind};
