//! Type predicates and the `symbol`/`keyword` constructors.
//!
//! `list?`/`vector?`/`sequential?` encode the value model's vector-flag
//! distinction: a vector answers true to `vector?` and `sequential?` but
//! false to `list?`.

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;
use std::rc::Rc;

fn one_arg<'a>(name: &str, args: &'a [Value]) -> Result<&'a Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error(name, "1", args.len()));
    }
    Ok(&args[0])
}

fn list_p(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(one_arg("list?", args)?.is_list()))
}

fn vector_p(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(one_arg("vector?", args)?.is_vector()))
}

fn sequential_p(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(one_arg("sequential?", args)?.is_sequential()))
}

fn map_p(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(
        one_arg("map?", args)?,
        Value::Map { .. }
    )))
}

fn nil_p(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(one_arg("nil?", args)?, Value::Nil)))
}

fn true_p(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(one_arg("true?", args)?, Value::Bool(true))))
}

fn false_p(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(one_arg("false?", args)?, Value::Bool(false))))
}

fn number_p(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(one_arg("number?", args)?, Value::Number(_))))
}

fn string_p(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(one_arg("string?", args)?, Value::Str(_))))
}

fn symbol_p(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(one_arg("symbol?", args)?, Value::Symbol(_))))
}

fn keyword_p(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(one_arg("keyword?", args)?, Value::Keyword(_))))
}

fn fn_p(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(
        one_arg("fn?", args)?,
        Value::Function(f) if !f.is_macro()
    )))
}

fn macro_p(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(
        one_arg("macro?", args)?,
        Value::Function(f) if f.is_macro()
    )))
}

fn atom_p(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(one_arg("atom?", args)?, Value::Atom(..))))
}

fn symbol(args: &[Value]) -> Result<Value, EvalError> {
    match one_arg("symbol", args)? {
        Value::Str(s) => Ok(Value::Symbol(s.clone())),
        other => Err(EvalError::type_error("symbol", "string", other, 0)),
    }
}

fn keyword(args: &[Value]) -> Result<Value, EvalError> {
    match one_arg("keyword", args)? {
        Value::Str(s) => Ok(Value::Keyword(format!(":{s}"))),
        Value::Keyword(k) => Ok(Value::Keyword(k.clone())),
        other => Err(EvalError::type_error("keyword", "string or keyword", other, 0)),
    }
}

pub fn register(env: &Rc<Environment>) {
    env.define("list?".to_string(), Value::builtin("list?", list_p));
    env.define("vector?".to_string(), Value::builtin("vector?", vector_p));
    env.define(
        "sequential?".to_string(),
        Value::builtin("sequential?", sequential_p),
    );
    env.define("map?".to_string(), Value::builtin("map?", map_p));
    env.define("nil?".to_string(), Value::builtin("nil?", nil_p));
    env.define("true?".to_string(), Value::builtin("true?", true_p));
    env.define("false?".to_string(), Value::builtin("false?", false_p));
    env.define("number?".to_string(), Value::builtin("number?", number_p));
    env.define("string?".to_string(), Value::builtin("string?", string_p));
    env.define("symbol?".to_string(), Value::builtin("symbol?", symbol_p));
    env.define("keyword?".to_string(), Value::builtin("keyword?", keyword_p));
    env.define("fn?".to_string(), Value::builtin("fn?", fn_p));
    env.define("macro?".to_string(), Value::builtin("macro?", macro_p));
    env.define("atom?".to_string(), Value::builtin("atom?", atom_p));
    env.define("symbol".to_string(), Value::builtin("symbol", symbol));
    env.define("keyword".to_string(), Value::builtin("keyword", keyword));
}
