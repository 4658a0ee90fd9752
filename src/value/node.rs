//! Primitive values and their evaluation

use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::environment::Environment;
use crate::value::{error::EvalError, functions::FunctionRegistry};

/// A node of the expression tree.
///
/// Nodes are built by the rule parser, are immutable, and evaluate to a
/// runtime string against an [`Environment`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    /// String literal; variable references are expanded on evaluation
    #[serde(rename = "string")]
    Literal { value: String },
    Boolean { value: bool },
    /// Integers only, no floating point
    Number { value: i64 },
    /// Command substitution
    Backtick { command: String },
    Funcall {
        name: String,
        #[serde(default)]
        args: Vec<Node>,
    },
}

impl Node {
    pub fn literal(value: impl Into<String>) -> Self {
        Node::Literal {
            value: value.into(),
        }
    }

    pub fn boolean(value: bool) -> Self {
        Node::Boolean { value }
    }

    pub fn number(value: i64) -> Self {
        Node::Number { value }
    }

    pub fn backtick(command: impl Into<String>) -> Self {
        Node::Backtick {
            command: command.into(),
        }
    }

    pub fn funcall(name: impl Into<String>, args: Vec<Node>) -> Self {
        Node::Funcall {
            name: name.into(),
            args,
        }
    }

    /// Debug form, not used for execution
    pub fn render(&self) -> String {
        match self {
            Node::Literal { value } => format!("String{{{value}}}"),
            Node::Boolean { value } => format!("Boolean{{{value}}}"),
            Node::Number { value } => format!("Number{{{value}}}"),
            Node::Backtick { command } => format!("Backtick{{Command:{command}}}"),
            Node::Funcall { name, .. } => format!("Funcall{{{name}}}"),
        }
    }

    /// Evaluate to a runtime string.
    ///
    /// Backticks run a command through the environment. Function calls
    /// resolve the function first and only then evaluate their arguments,
    /// left to right, stopping at the first failure.
    pub fn evaluate<'a>(
        &'a self,
        env: &'a dyn Environment,
        functions: &'a FunctionRegistry,
    ) -> BoxFuture<'a, Result<String, EvalError>> {
        async move {
            match self {
                Node::Literal { value } => Ok(env.expand(value)),
                Node::Boolean { value } => Ok(value.to_string()),
                Node::Number { value } => Ok(value.to_string()),
                Node::Backtick { command } => Ok(env.execute_command(command).await?),
                Node::Funcall { name, args } => call(name, args, env, functions).await,
            }
        }
        .boxed()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

async fn call(
    name: &str,
    args: &[Node],
    env: &dyn Environment,
    functions: &FunctionRegistry,
) -> Result<String, EvalError> {
    let function = functions.get(name).ok_or_else(|| EvalError::Lookup {
        name: name.to_string(),
    })?;

    let mut values = Vec::with_capacity(args.len());
    for arg in args {
        values.push(arg.evaluate(env, functions).await?);
    }

    tracing::debug!("Invoking function - {}({})", name, values.join(","));

    let result = function(env, &values)?;

    tracing::debug!(
        "Function result - {}({}) -> {}",
        name,
        values.join(","),
        result
    );

    let node = Node::try_from(result)?;
    node.evaluate(env, functions).await
}

/// Dynamically-typed result of a registered function.
///
/// Only nodes and scalar data (strings, booleans, integers) can be evaluated;
/// anything else is a cast failure at the call site.
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionValue {
    Node(Node),
    Data(serde_json::Value),
}

impl fmt::Display for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionValue::Node(node) => write!(f, "{node}"),
            FunctionValue::Data(data) => write!(f, "{data}"),
        }
    }
}

impl TryFrom<FunctionValue> for Node {
    type Error = EvalError;

    fn try_from(value: FunctionValue) -> Result<Self, Self::Error> {
        let not_evaluable = || EvalError::Cast {
            message: "return value is not a valid evaluable value".to_string(),
        };

        match value {
            FunctionValue::Node(node) => Ok(node),
            FunctionValue::Data(serde_json::Value::String(s)) => Ok(Node::literal(s)),
            FunctionValue::Data(serde_json::Value::Bool(b)) => Ok(Node::boolean(b)),
            FunctionValue::Data(serde_json::Value::Number(n)) => {
                n.as_i64().map(Node::number).ok_or_else(not_evaluable)
            }
            FunctionValue::Data(_) => Err(not_evaluable()),
        }
    }
}

impl From<Node> for FunctionValue {
    fn from(node: Node) -> Self {
        FunctionValue::Node(node)
    }
}

impl From<serde_json::Value> for FunctionValue {
    fn from(data: serde_json::Value) -> Self {
        FunctionValue::Data(data)
    }
}

impl From<String> for FunctionValue {
    fn from(value: String) -> Self {
        FunctionValue::Node(Node::literal(value))
    }
}

impl From<&str> for FunctionValue {
    fn from(value: &str) -> Self {
        FunctionValue::Node(Node::literal(value))
    }
}

impl From<bool> for FunctionValue {
    fn from(value: bool) -> Self {
        FunctionValue::Node(Node::boolean(value))
    }
}

impl From<i64> for FunctionValue {
    fn from(value: i64) -> Self {
        FunctionValue::Node(Node::number(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render() {
        assert_eq!(Node::literal("x").render(), "String{x}");
        assert_eq!(Node::boolean(true).render(), "Boolean{true}");
        assert_eq!(Node::boolean(false).render(), "Boolean{false}");
        assert_eq!(Node::number(-7).render(), "Number{-7}");
        assert_eq!(Node::backtick("uptime").render(), "Backtick{Command:uptime}");
        assert_eq!(
            Node::funcall("upper", vec![Node::literal("a")]).render(),
            "Funcall{upper}"
        );
    }

    #[test]
    fn test_scalar_data_converts_to_nodes() {
        assert_eq!(
            Node::try_from(FunctionValue::from(json!("abc"))).unwrap(),
            Node::literal("abc")
        );
        assert_eq!(
            Node::try_from(FunctionValue::from(json!(true))).unwrap(),
            Node::boolean(true)
        );
        assert_eq!(
            Node::try_from(FunctionValue::from(json!(42))).unwrap(),
            Node::number(42)
        );
    }

    #[test]
    fn test_non_scalar_data_is_cast_error() {
        for data in [json!(null), json!(1.5), json!([1, 2]), json!({"a": 1})] {
            let err = Node::try_from(FunctionValue::from(data)).unwrap_err();
            assert!(matches!(err, EvalError::Cast { .. }));
        }
    }

    #[test]
    fn test_nodes_deserialize_from_tagged_form() {
        let node: Node = serde_json::from_value(json!({
            "type": "funcall",
            "name": "upper",
            "args": [{"type": "string", "value": "abc"}, {"type": "number", "value": 3}]
        }))
        .unwrap();

        assert_eq!(
            node,
            Node::funcall("upper", vec![Node::literal("abc"), Node::number(3)])
        );
    }
}
