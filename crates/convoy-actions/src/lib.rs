//! # Convoy Actions
//!
//! Action leaves and declarative construction for the convoy engine.
//!
//! This crate provides:
//! - ShellCommand and LoadLibrary leaf actions
//! - YAML action specs and a factory to build action trees from them
//! - The DynamicLoader seam behind the LoadLibrary leaf

mod config;
mod factory;
mod library;
mod loader;
mod shell;

// Re-export core action traits
pub use convoy_core::action::{Action, ActionContext, Flag};
pub use convoy_core::error::ActionError;
pub use convoy_core::list::ActionList;

pub use config::ActionSpec;
pub use factory::{ActionFactory, BuildError, DefaultActionFactory};
pub use library::{DynamicLoader, InitFn, LoadLibrary, LoaderError, ParameterMap, SystemLoader};
pub use loader::{load_plan, load_plan_with, PlanError};
pub use shell::ShellCommand;
