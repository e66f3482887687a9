//! Declarative plan loading.

use std::fs;
use std::path::Path;

use thiserror::Error;

use convoy_core::action::Action;

use crate::config::ActionSpec;
use crate::factory::{ActionFactory, BuildError, DefaultActionFactory};

/// Plan loading errors.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("build error: {0}")]
    Build(#[from] BuildError),
    #[error("invalid plan: {0}")]
    Invalid(String),
}

/// Load a plan from a YAML file and build its root action with the
/// default factory.
pub fn load_plan(path: &Path) -> Result<Box<dyn Action>, PlanError> {
    load_plan_with(path, &DefaultActionFactory::new())
}

/// Load a plan from a YAML file and build its root action with the
/// given factory.
pub fn load_plan_with(
    path: &Path,
    factory: &dyn ActionFactory,
) -> Result<Box<dyn Action>, PlanError> {
    let content = fs::read_to_string(path)?;
    let spec: ActionSpec = serde_yaml::from_str(&content)?;
    validate_spec(&spec)?;
    Ok(factory.build(&spec)?)
}

fn validate_spec(spec: &ActionSpec) -> Result<(), PlanError> {
    if spec.kind.trim().is_empty() {
        return Err(PlanError::Invalid(
            "action kind must not be empty".to_string(),
        ));
    }
    for child in &spec.actions {
        validate_spec(child)?;
    }
    Ok(())
}
