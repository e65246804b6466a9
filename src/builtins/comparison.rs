//! Comparisons: `=`, `<`, `>`, `<=`, `>=`.

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;
use std::rc::Rc;

fn numeric_pair(name: &str, args: &[Value]) -> Result<(f64, f64), EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error(name, "2", args.len()));
    }
    let a = match &args[0] {
        Value::Number(n) => *n,
        other => return Err(EvalError::type_error(name, "number", other, 0)),
    };
    let b = match &args[1] {
        Value::Number(n) => *n,
        other => return Err(EvalError::type_error(name, "number", other, 1)),
    };
    Ok((a, b))
}

fn lt(args: &[Value]) -> Result<Value, EvalError> {
    let (a, b) = numeric_pair("<", args)?;
    Ok(Value::Bool(a < b))
}

fn gt(args: &[Value]) -> Result<Value, EvalError> {
    let (a, b) = numeric_pair(">", args)?;
    Ok(Value::Bool(a > b))
}

fn le(args: &[Value]) -> Result<Value, EvalError> {
    let (a, b) = numeric_pair("<=", args)?;
    Ok(Value::Bool(a <= b))
}

fn ge(args: &[Value]) -> Result<Value, EvalError> {
    let (a, b) = numeric_pair(">=", args)?;
    Ok(Value::Bool(a >= b))
}

fn eq(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("=", "2", args.len()));
    }
    Ok(Value::Bool(args[0].mal_eq(&args[1])))
}

pub fn register(env: &Rc<Environment>) {
    env.define("<".to_string(), Value::builtin("<", lt));
    env.define(">".to_string(), Value::builtin(">", gt));
    env.define("<=".to_string(), Value::builtin("<=", le));
    env.define(">=".to_string(), Value::builtin(">=", ge));
    env.define("=".to_string(), Value::builtin("=", eq));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering() {
        assert!(lt(&[Value::Number(1.0), Value::Number(2.0)]).unwrap().truthy());
        assert!(ge(&[Value::Number(2.0), Value::Number(2.0)]).unwrap().truthy());
    }

    #[test]
    fn equality_uses_mal_eq() {
        let l = Value::list(vec![Value::Number(1.0)]);
        let v = Value::vector(vec![Value::Number(1.0)]);
        assert!(eq(&[l, v]).unwrap().truthy());
    }

    #[test]
    fn wrong_arity_errors() {
        assert!(eq(&[Value::Nil]).is_err());
    }
}
