use serde::Deserialize;
use serde_json::Value;

/// Single action definition from a declarative plan.
///
/// A `list` spec nests further specs under `actions`; leaf specs keep
/// their scalar fields in the free-form `config` payload.
#[derive(Debug, Deserialize)]
pub struct ActionSpec {
    pub kind: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Absent means the verbosity flag inherits from the owner chain.
    #[serde(default)]
    pub verbose: Option<bool>,
    #[serde(default)]
    pub config: Value,
    /// Child specs; only meaningful for the `list` kind.
    #[serde(default)]
    pub actions: Vec<ActionSpec>,
}

impl ActionSpec {
    pub fn description_or(&self, fallback: &str) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| fallback.to_string())
    }
}

pub(crate) fn config_string(config: &Value, key: &str) -> Option<String> {
    config
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

pub(crate) fn config_bool(config: &Value, key: &str) -> Option<bool> {
    config.get(key).and_then(|v| v.as_bool())
}

pub(crate) fn config_u64(config: &Value, key: &str) -> Option<u64> {
    config.get(key).and_then(|v| v.as_u64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_parses_from_yaml_with_defaults() {
        let yaml = r#"
kind: shell
config:
  command: "echo hello"
"#;
        let spec: ActionSpec = serde_yaml::from_str(yaml).expect("parse");
        assert_eq!(spec.kind, "shell");
        assert!(spec.description.is_none());
        assert!(spec.verbose.is_none());
        assert!(spec.actions.is_empty());
        assert_eq!(
            config_string(&spec.config, "command").as_deref(),
            Some("echo hello")
        );
    }

    #[test]
    fn test_nested_list_spec_parses() {
        let yaml = r#"
kind: list
description: nightly batch
verbose: true
config:
  sequential: false
  max_parallel: 2
actions:
  - kind: shell
    config:
      command: "true"
  - kind: list
    config:
      abort_on_error: false
    actions:
      - kind: shell
        config:
          command: "false"
"#;
        let spec: ActionSpec = serde_yaml::from_str(yaml).expect("parse");
        assert_eq!(spec.kind, "list");
        assert_eq!(spec.verbose, Some(true));
        assert_eq!(config_bool(&spec.config, "sequential"), Some(false));
        assert_eq!(config_u64(&spec.config, "max_parallel"), Some(2));
        assert_eq!(spec.actions.len(), 2);
        assert_eq!(spec.actions[1].actions.len(), 1);
        assert_eq!(
            config_bool(&spec.actions[1].config, "abort_on_error"),
            Some(false)
        );
    }

    #[test]
    fn test_description_or_fallback() {
        let spec: ActionSpec = serde_yaml::from_str("kind: shell").expect("parse");
        assert_eq!(spec.description_or("shell command"), "shell command");
    }
}
