//! Ordered rule lists loaded from YAML or JSON

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::environment::VariableEnvironment;
use crate::modules::ModuleArgs;
use crate::runtime::error::RunError;

/// A single rule: which module to run and with what arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub name: Option<String>,
    pub module: String,
    #[serde(default)]
    pub args: ModuleArgs,
}

impl Rule {
    /// Name used in logs, falling back to the module name
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.module)
    }
}

/// Variables plus the rules to apply, in file order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RulePlan {
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl RulePlan {
    pub fn from_file(path: &Path) -> Result<Self, RunError> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| RunError::Read {
            path: display.clone(),
            error: e.to_string(),
        })?;

        let parsed = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content).map_err(|e| e.to_string()),
            _ => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
        };

        parsed.map_err(|error| RunError::Parse {
            path: display,
            error,
        })
    }

    /// Bind the plan's variables into an environment
    pub fn bind_variables(&self, env: &mut VariableEnvironment) {
        for (name, value) in &self.variables {
            env.set(name.as_str(), value.as_str());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::ArgValue;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_yaml_plan() {
        let mut file = Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(
            file,
            r#"
variables:
  target: /tmp/out
rules:
  - name: say hello
    module: shell
    args:
      command: "echo hello > ${{target}}"
  - module: shell
    args:
      command:
        - "true"
        - "echo done"
      shell: true
"#
        )
        .unwrap();

        let plan = RulePlan::from_file(file.path()).unwrap();
        assert_eq!(plan.variables.get("target").map(String::as_str), Some("/tmp/out"));
        assert_eq!(plan.rules.len(), 2);
        assert_eq!(plan.rules[0].label(), "say hello");
        assert_eq!(plan.rules[1].label(), "shell");
        assert_eq!(
            plan.rules[1].args.get("command"),
            Some(&ArgValue::from(vec!["true", "echo done"]))
        );
        assert_eq!(plan.rules[1].args.get("shell"), Some(&ArgValue::Bool(true)));
    }

    #[test]
    fn test_json_plan_with_expression_argument() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"rules": [{{"module": "shell", "args": {{"command": {{"type": "backtick", "command": "echo true"}}}}}}]}}"#
        )
        .unwrap();

        let plan = RulePlan::from_file(file.path()).unwrap();
        assert!(plan.variables.is_empty());
        assert!(matches!(
            plan.rules[0].args.get("command"),
            Some(ArgValue::Expr(_))
        ));
    }

    #[test]
    fn test_malformed_plan_is_parse_error() {
        let mut file = Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(file, "rules: [{{args: {{}}}}]").unwrap();

        let err = RulePlan::from_file(file.path()).unwrap_err();
        assert!(matches!(err, RunError::Parse { .. }));
    }

    #[test]
    fn test_bind_variables() {
        let plan = RulePlan {
            variables: BTreeMap::from([("name".to_string(), "world".to_string())]),
            rules: Vec::new(),
        };
        let mut env = VariableEnvironment::new();
        plan.bind_variables(&mut env);
        assert_eq!(env.get("name"), Some("world"));
    }
}
