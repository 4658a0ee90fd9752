//! Module interface traits and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::environment::Environment;
use crate::modules::error::ModuleError;
use crate::value::{EvalError, FunctionRegistry, Node};

/// Interface every automation unit implements
#[async_trait]
pub trait Module: Send + Sync {
    /// Module name (e.g., "shell")
    fn name(&self) -> &'static str;

    /// Validate arguments before anything on the host is touched
    fn check(&self, args: &ModuleArgs) -> Result<(), ModuleError>;

    /// Perform the operation, reporting whether host state changed
    async fn execute(
        &self,
        env: &dyn Environment,
        args: &ModuleArgs,
    ) -> Result<bool, ModuleError>;

    fn documentation(&self) -> ModuleDocumentation;
}

/// A single rule argument.
///
/// Deserialises from plain rule data: strings, booleans, integers, lists of
/// strings, or a tagged expression node. Mixed lists are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    String(String),
    Bool(bool),
    Number(i64),
    List(Vec<String>),
    Expr(Node),
}

impl ArgValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            ArgValue::String(_) => "string",
            ArgValue::Bool(_) => "boolean",
            ArgValue::Number(_) => "number",
            ArgValue::List(_) => "list",
            ArgValue::Expr(_) => "expression",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::String(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::String(value)
    }
}

impl From<Vec<String>> for ArgValue {
    fn from(value: Vec<String>) -> Self {
        ArgValue::List(value)
    }
}

impl From<Vec<&str>> for ArgValue {
    fn from(value: Vec<&str>) -> Self {
        ArgValue::List(value.into_iter().map(String::from).collect())
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        ArgValue::Bool(value)
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        ArgValue::Number(value)
    }
}

impl From<Node> for ArgValue {
    fn from(value: Node) -> Self {
        ArgValue::Expr(value)
    }
}

/// Module execution arguments, keyed by parameter name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleArgs {
    pub args: BTreeMap<String, ArgValue>,
}

impl ModuleArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.args.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.args.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.args.contains_key(name)
    }

    /// Scalar parameter rendered as a string; `None` when absent or not scalar
    pub fn string_param(&self, name: &str) -> Option<String> {
        match self.args.get(name)? {
            ArgValue::String(s) => Some(s.clone()),
            ArgValue::Bool(b) => Some(b.to_string()),
            ArgValue::Number(n) => Some(n.to_string()),
            ArgValue::List(_) | ArgValue::Expr(_) => None,
        }
    }

    /// Evaluate every argument down to plain data.
    ///
    /// Strings and string lists have their variable references expanded,
    /// expressions are evaluated to strings, booleans and numbers pass through.
    /// Arguments are resolved in name order and the first failure aborts.
    pub async fn resolve(
        &self,
        env: &dyn Environment,
        functions: &FunctionRegistry,
    ) -> Result<ModuleArgs, EvalError> {
        let mut resolved = BTreeMap::new();

        for (name, value) in &self.args {
            let value = match value {
                ArgValue::String(s) => {
                    ArgValue::String(Node::literal(s.as_str()).evaluate(env, functions).await?)
                }
                ArgValue::List(items) => {
                    let mut expanded = Vec::with_capacity(items.len());
                    for item in items {
                        expanded.push(Node::literal(item.as_str()).evaluate(env, functions).await?);
                    }
                    ArgValue::List(expanded)
                }
                ArgValue::Expr(node) => ArgValue::String(node.evaluate(env, functions).await?),
                ArgValue::Bool(_) | ArgValue::Number(_) => value.clone(),
            };
            resolved.insert(name.clone(), value);
        }

        Ok(ModuleArgs { args: resolved })
    }
}

/// Module documentation
#[derive(Debug, Clone)]
pub struct ModuleDocumentation {
    pub description: String,
    pub arguments: Vec<ArgumentSpec>,
    pub examples: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ArgumentSpec {
    pub name: String,
    pub description: String,
    pub required: bool,
    pub argument_type: String,
    pub default: Option<String>,
}

impl fmt::Display for ModuleDocumentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.description)?;

        if !self.arguments.is_empty() {
            writeln!(f, "\nArguments:")?;
            for arg in &self.arguments {
                let mut detail = arg.argument_type.clone();
                if arg.required {
                    detail.push_str(", required");
                }
                if let Some(default) = &arg.default {
                    detail.push_str(&format!(", default: {default}"));
                }
                writeln!(f, "  {} ({}): {}", arg.name, detail, arg.description)?;
            }
        }

        if !self.examples.is_empty() {
            writeln!(f, "\nExamples:")?;
            for example in &self.examples {
                for line in example.lines() {
                    writeln!(f, "  {line}")?;
                }
                writeln!(f)?;
            }
        }

        Ok(())
    }
}
