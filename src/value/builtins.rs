//! Built-in functions available to every rule file

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::path::Path;

use crate::environment::Environment;
use crate::value::{error::EvalError, functions::FunctionRegistry, node::FunctionValue};

pub(crate) fn register_all(registry: &mut FunctionRegistry) {
    registry.register("upper", upper);
    registry.register("lower", lower);
    registry.register("trim", trim);
    registry.register("len", len);
    registry.register("join", join);
    registry.register("env", env);
    registry.register("exists", exists);
    registry.register("on_path", on_path);
    registry.register("equal", equal);
    registry.register("contains", contains);
    registry.register("md5", md5_hex);
    registry.register("sha1", sha1_hex);
    registry.register("sha256", sha256_hex);
}

fn exactly<'a>(name: &str, args: &'a [String], count: usize) -> Result<&'a [String], EvalError> {
    if args.len() != count {
        return Err(EvalError::function(
            name,
            format!("expected {count} argument(s), got {}", args.len()),
        ));
    }
    Ok(args)
}

fn upper(_env: &dyn Environment, args: &[String]) -> Result<FunctionValue, EvalError> {
    let args = exactly("upper", args, 1)?;
    Ok(args[0].to_uppercase().into())
}

fn lower(_env: &dyn Environment, args: &[String]) -> Result<FunctionValue, EvalError> {
    let args = exactly("lower", args, 1)?;
    Ok(args[0].to_lowercase().into())
}

fn trim(_env: &dyn Environment, args: &[String]) -> Result<FunctionValue, EvalError> {
    let args = exactly("trim", args, 1)?;
    Ok(args[0].trim().into())
}

fn len(_env: &dyn Environment, args: &[String]) -> Result<FunctionValue, EvalError> {
    let args = exactly("len", args, 1)?;
    let count = i64::try_from(args[0].chars().count())
        .map_err(|e| EvalError::function("len", e.to_string()))?;
    Ok(count.into())
}

/// `join(separator, values...)`
fn join(_env: &dyn Environment, args: &[String]) -> Result<FunctionValue, EvalError> {
    let (separator, values) = args
        .split_first()
        .ok_or_else(|| EvalError::function("join", "missing separator argument"))?;
    Ok(values.join(separator).into())
}

/// Process environment lookup, empty when unset
fn env(_env: &dyn Environment, args: &[String]) -> Result<FunctionValue, EvalError> {
    let args = exactly("env", args, 1)?;
    Ok(std::env::var(&args[0]).unwrap_or_default().into())
}

fn exists(_env: &dyn Environment, args: &[String]) -> Result<FunctionValue, EvalError> {
    let args = exactly("exists", args, 1)?;
    Ok(Path::new(&args[0]).exists().into())
}

fn on_path(_env: &dyn Environment, args: &[String]) -> Result<FunctionValue, EvalError> {
    let args = exactly("on_path", args, 1)?;
    Ok(which::which(&args[0]).is_ok().into())
}

fn equal(_env: &dyn Environment, args: &[String]) -> Result<FunctionValue, EvalError> {
    let args = exactly("equal", args, 2)?;
    Ok((args[0] == args[1]).into())
}

fn contains(_env: &dyn Environment, args: &[String]) -> Result<FunctionValue, EvalError> {
    let args = exactly("contains", args, 2)?;
    Ok(args[0].contains(args[1].as_str()).into())
}

fn md5_hex(_env: &dyn Environment, args: &[String]) -> Result<FunctionValue, EvalError> {
    let args = exactly("md5", args, 1)?;
    Ok(format!("{:x}", Md5::digest(args[0].as_bytes())).into())
}

fn sha1_hex(_env: &dyn Environment, args: &[String]) -> Result<FunctionValue, EvalError> {
    let args = exactly("sha1", args, 1)?;
    Ok(format!("{:x}", Sha1::digest(args[0].as_bytes())).into())
}

fn sha256_hex(_env: &dyn Environment, args: &[String]) -> Result<FunctionValue, EvalError> {
    let args = exactly("sha256", args, 1)?;
    Ok(format!("{:x}", Sha256::digest(args[0].as_bytes())).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::VariableEnvironment;
    use crate::value::Node;

    async fn eval(name: &str, args: &[&str]) -> Result<String, EvalError> {
        let env = VariableEnvironment::new();
        let functions = FunctionRegistry::with_builtins();
        let node = Node::funcall(name, args.iter().map(|a| Node::literal(*a)).collect());
        node.evaluate(&env, &functions).await
    }

    #[tokio::test]
    async fn test_case_functions() {
        assert_eq!(eval("upper", &["abc"]).await.unwrap(), "ABC");
        assert_eq!(eval("lower", &["MiXeD"]).await.unwrap(), "mixed");
        assert_eq!(eval("trim", &["  padded \t"]).await.unwrap(), "padded");
    }

    #[tokio::test]
    async fn test_len_counts_characters() {
        assert_eq!(eval("len", &["héllo"]).await.unwrap(), "5");
        assert_eq!(eval("len", &[""]).await.unwrap(), "0");
    }

    #[tokio::test]
    async fn test_join() {
        assert_eq!(eval("join", &[",", "a", "b", "c"]).await.unwrap(), "a,b,c");
        assert_eq!(eval("join", &["-"]).await.unwrap(), "");
        assert!(eval("join", &[]).await.is_err());
    }

    #[tokio::test]
    async fn test_predicates() {
        assert_eq!(eval("equal", &["a", "a"]).await.unwrap(), "true");
        assert_eq!(eval("equal", &["a", "b"]).await.unwrap(), "false");
        assert_eq!(eval("contains", &["haystack", "st"]).await.unwrap(), "true");
        assert_eq!(eval("exists", &["/"]).await.unwrap(), "true");
        assert_eq!(
            eval("exists", &["/no/such/path/for/rustle"]).await.unwrap(),
            "false"
        );
        assert_eq!(eval("on_path", &["sh"]).await.unwrap(), "true");
    }

    #[tokio::test]
    async fn test_digests() {
        assert_eq!(
            eval("md5", &["hello world"]).await.unwrap(),
            "5eb63bbbe01eeed093cb22bb8f5acdc3"
        );
        assert_eq!(
            eval("sha1", &["hello world"]).await.unwrap(),
            "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed"
        );
        assert_eq!(
            eval("sha256", &["hello world"]).await.unwrap(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[tokio::test]
    async fn test_arity_is_checked() {
        let err = eval("upper", &["a", "b"]).await.unwrap_err();
        assert!(matches!(err, EvalError::Function { .. }));
        assert!(err.to_string().contains("expected 1 argument(s), got 2"));
    }
}
