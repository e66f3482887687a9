use thiserror::Error;

use convoy_core::action::{Action, Flag};
use convoy_core::error::ActionError;
use convoy_core::list::ActionList;

use crate::config::{config_bool, config_string, config_u64, ActionSpec};
use crate::library::{LoadLibrary, ParameterMap};
use crate::shell::ShellCommand;

/// Action construction errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The spec names an action kind this factory cannot build.
    #[error("unknown action kind: '{0}'")]
    UnknownKind(String),
    /// A scalar field carries a malformed value.
    #[error("invalid action config: {0}")]
    InvalidConfig(String),
    /// Child specs were supplied under a kind that cannot own children.
    #[error("action kind '{0}' cannot own child actions")]
    UnexpectedChildren(String),
}

impl From<BuildError> for ActionError {
    fn from(err: BuildError) -> Self {
        match err {
            BuildError::InvalidConfig(msg) => ActionError::Data(msg),
            other => ActionError::Logic(other.to_string()),
        }
    }
}

/// Builds action instances from declarative specs.
///
/// This is the engine's construction boundary: the factory consumes a
/// completed spec for each element and hands back the corresponding
/// action, recursing into a list's children so each completed child is
/// attached to its owner as it is finished.
pub trait ActionFactory: Send + Sync {
    fn build(&self, spec: &ActionSpec) -> Result<Box<dyn Action>, BuildError>;
}

/// Default factory for the built-in action kinds
/// (`shell`, `load_library`, `list`).
pub struct DefaultActionFactory;

impl DefaultActionFactory {
    pub fn new() -> Self {
        Self
    }

    fn build_shell(&self, spec: &ActionSpec) -> Result<Box<dyn Action>, BuildError> {
        // An empty command builds fine and fails with a data error at
        // execute time.
        let command = config_string(&spec.config, "command").unwrap_or_default();
        let mut action = ShellCommand::new(command).with_verbosity(Flag::from(spec.verbose));
        if let Some(description) = &spec.description {
            action = action.with_description(description.clone());
        }
        Ok(Box::new(action))
    }

    fn build_load_library(&self, spec: &ActionSpec) -> Result<Box<dyn Action>, BuildError> {
        let path = config_string(&spec.config, "path").unwrap_or_default();
        let mut parameters = ParameterMap::new();
        if let Some(params) = spec.config.get("params") {
            let pairs = params.as_object().ok_or_else(|| {
                BuildError::InvalidConfig("'params' must be a name/value mapping".to_string())
            })?;
            for (name, value) in pairs {
                let value = value.as_str().ok_or_else(|| {
                    BuildError::InvalidConfig(format!(
                        "invalid parameter specification for '{name}': value must be a string"
                    ))
                })?;
                parameters.insert(name.clone(), value.to_string());
            }
        }
        Ok(Box::new(
            LoadLibrary::new(path)
                .with_parameters(parameters)
                .with_verbosity(Flag::from(spec.verbose)),
        ))
    }

    fn build_list(&self, spec: &ActionSpec) -> Result<Box<dyn Action>, BuildError> {
        let mut list = ActionList::new(spec.description_or("action list"))
            .with_verbosity(Flag::from(spec.verbose))
            .with_abort_on_error(Flag::from(config_bool(&spec.config, "abort_on_error")))
            .with_sequential(Flag::from(config_bool(&spec.config, "sequential")));
        if let Some(max_parallel) = config_u64(&spec.config, "max_parallel") {
            list = list.with_max_parallel(max_parallel as usize);
        }
        for child_spec in &spec.actions {
            // Each completed child object is attached to its owner here.
            list.add(self.build(child_spec)?);
        }
        Ok(Box::new(list))
    }
}

impl Default for DefaultActionFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionFactory for DefaultActionFactory {
    fn build(&self, spec: &ActionSpec) -> Result<Box<dyn Action>, BuildError> {
        if spec.kind != "list" && !spec.actions.is_empty() {
            return Err(BuildError::UnexpectedChildren(spec.kind.clone()));
        }
        match spec.kind.as_str() {
            "shell" => self.build_shell(spec),
            "load_library" => self.build_load_library(spec),
            "list" => self.build_list(spec),
            other => Err(BuildError::UnknownKind(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convoy_core::action::ActionContext;

    fn spec(yaml: &str) -> ActionSpec {
        serde_yaml::from_str(yaml).expect("spec parses")
    }

    #[test]
    fn test_unknown_kind_is_a_logic_error() {
        let err = DefaultActionFactory::new()
            .build(&spec("kind: teleport"))
            .expect_err("unknown kind");
        assert!(matches!(&err, BuildError::UnknownKind(_)));
        assert!(matches!(ActionError::from(err), ActionError::Logic(_)));
    }

    #[test]
    fn test_empty_kind_is_a_logic_error() {
        let err = DefaultActionFactory::new()
            .build(&spec("kind: \"\""))
            .expect_err("empty kind");
        assert!(matches!(&err, BuildError::UnknownKind(_)));
    }

    #[test]
    fn test_children_under_a_leaf_kind_are_rejected() {
        let yaml = r#"
kind: shell
config:
  command: "true"
actions:
  - kind: shell
    config:
      command: "false"
"#;
        let err = DefaultActionFactory::new()
            .build(&spec(yaml))
            .expect_err("leaf with children");
        assert!(matches!(&err, BuildError::UnexpectedChildren(_)));
        assert!(matches!(ActionError::from(err), ActionError::Logic(_)));
    }

    #[test]
    fn test_malformed_parameter_pair_is_a_data_error() {
        let yaml = r#"
kind: load_library
config:
  path: libforecast.so
  params:
    horizon: 12
"#;
        let err = DefaultActionFactory::new()
            .build(&spec(yaml))
            .expect_err("non-string parameter value");
        assert!(matches!(&err, BuildError::InvalidConfig(_)));
        assert!(matches!(ActionError::from(err), ActionError::Data(_)));
    }

    #[test]
    fn test_builds_nested_list_with_leaves() {
        let yaml = r#"
kind: list
description: release steps
config:
  abort_on_error: false
actions:
  - kind: shell
    config:
      command: "true"
  - kind: list
    actions:
      - kind: load_library
        config:
          path: libforecast.so
          params:
            horizon: "12"
"#;
        let action = DefaultActionFactory::new()
            .build(&spec(yaml))
            .expect("builds");
        assert_eq!(action.description(), "release steps");
    }

    #[test]
    fn test_built_plan_executes() {
        tokio_test::block_on(async {
            let yaml = r#"
kind: list
actions:
  - kind: shell
    config:
      command: "exit 0"
  - kind: shell
    config:
      command: "exit 0"
"#;
            let mut action = DefaultActionFactory::new()
                .build(&spec(yaml))
                .expect("builds");
            action
                .execute(&ActionContext::root())
                .await
                .expect("plan executes");
        });
    }
}
