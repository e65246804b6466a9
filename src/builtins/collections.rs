//! Sequence operations shared by lists and vectors: construction,
//! traversal, and the two higher-order forms (`map`, `apply`) that
//! re-enter the evaluator through a stored closure.

use crate::env::Environment;
use crate::error::EvalError;
use crate::eval::apply_function;
use crate::value::Value;
use std::rc::Rc;

fn items_of<'a>(name: &str, v: &'a Value, position: usize) -> Result<&'a [Value], EvalError> {
    v.as_items()
        .ok_or_else(|| EvalError::type_error(name, "list or vector", v, position))
}

fn list(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::list(args.to_vec()))
}

fn vector(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::vector(args.to_vec()))
}

fn empty_p(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("empty?", "1", args.len()));
    }
    let items = items_of("empty?", &args[0], 0)?;
    Ok(Value::Bool(items.is_empty()))
}

fn count(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("count", "1", args.len()));
    }
    let n = match &args[0] {
        Value::Nil => 0,
        Value::List { items, .. } => items.len(),
        _ => 0,
    };
    Ok(Value::Number(n as f64))
}

fn cons(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("cons", "2", args.len()));
    }
    let tail = items_of("cons", &args[1], 1)?;
    let mut items = Vec::with_capacity(tail.len() + 1);
    items.push(args[0].clone());
    items.extend_from_slice(tail);
    Ok(Value::list(items))
}

fn concat(args: &[Value]) -> Result<Value, EvalError> {
    let mut out = Vec::new();
    for (i, arg) in args.iter().enumerate() {
        out.extend_from_slice(items_of("concat", arg, i)?);
    }
    Ok(Value::list(out))
}

fn first(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("first", "1", args.len()));
    }
    if matches!(args[0], Value::Nil) {
        return Ok(Value::Nil);
    }
    let items = items_of("first", &args[0], 0)?;
    Ok(items.first().cloned().unwrap_or(Value::Nil))
}

fn rest(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("rest", "1", args.len()));
    }
    if matches!(args[0], Value::Nil) {
        return Ok(Value::list(vec![]));
    }
    let items = items_of("rest", &args[0], 0)?;
    Ok(Value::list(items.iter().skip(1).cloned().collect()))
}

fn nth(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("nth", "2", args.len()));
    }
    let items = items_of("nth", &args[0], 0)?;
    let idx = match &args[1] {
        Value::Number(n) => *n as usize,
        other => return Err(EvalError::type_error("nth", "number", other, 1)),
    };
    items
        .get(idx)
        .cloned()
        .ok_or_else(|| EvalError::runtime_error("nth", "index out of range"))
}

fn conj(args: &[Value]) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(EvalError::arity_error("conj", "at least 1", args.len()));
    }
    match &args[0] {
        Value::List {
            items,
            is_vector: false,
            ..
        } => {
            let mut out = items.clone();
            for extra in &args[1..] {
                out.insert(0, extra.clone());
            }
            Ok(Value::list(out))
        }
        Value::List {
            items,
            is_vector: true,
            ..
        } => {
            let mut out = items.clone();
            out.extend_from_slice(&args[1..]);
            Ok(Value::vector(out))
        }
        other => Err(EvalError::type_error("conj", "list or vector", other, 0)),
    }
}

fn seq(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("seq", "1", args.len()));
    }
    match &args[0] {
        Value::Nil => Ok(Value::Nil),
        Value::List { items, .. } if items.is_empty() => Ok(Value::Nil),
        Value::List {
            items,
            is_vector: false,
            ..
        } => Ok(Value::list(items.clone())),
        Value::List {
            items,
            is_vector: true,
            ..
        } => Ok(Value::list(items.clone())),
        Value::Str(s) if s.is_empty() => Ok(Value::Nil),
        Value::Str(s) => Ok(Value::list(
            s.chars().map(|c| Value::Str(c.to_string())).collect(),
        )),
        other => Err(EvalError::type_error(
            "seq",
            "list, vector, string, or nil",
            other,
            0,
        )),
    }
}

fn apply(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() < 2 {
        return Err(EvalError::arity_error("apply", "at least 2", args.len()));
    }
    let f = args[0]
        .as_function()
        .ok_or_else(|| EvalError::type_error("apply", "function", &args[0], 0))?;
    let last = args.len() - 1;
    let spread = items_of("apply", &args[last], last)?;
    let mut call_args = Vec::with_capacity(args.len() - 2 + spread.len());
    call_args.extend_from_slice(&args[1..last]);
    call_args.extend_from_slice(spread);
    apply_function(f, &call_args)
}

fn map(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("map", "2", args.len()));
    }
    let f = args[0]
        .as_function()
        .ok_or_else(|| EvalError::type_error("map", "function", &args[0], 0))?;
    let items = items_of("map", &args[1], 1)?;
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        out.push(apply_function(f, std::slice::from_ref(item))?);
    }
    Ok(Value::list(out))
}

pub fn register(env: &Rc<Environment>) {
    env.define("list".to_string(), Value::builtin("list", list));
    env.define("vector".to_string(), Value::builtin("vector", vector));
    env.define("empty?".to_string(), Value::builtin("empty?", empty_p));
    env.define("count".to_string(), Value::builtin("count", count));
    env.define("cons".to_string(), Value::builtin("cons", cons));
    env.define("concat".to_string(), Value::builtin("concat", concat));
    env.define("first".to_string(), Value::builtin("first", first));
    env.define("rest".to_string(), Value::builtin("rest", rest));
    env.define("nth".to_string(), Value::builtin("nth", nth));
    env.define("conj".to_string(), Value::builtin("conj", conj));
    env.define("seq".to_string(), Value::builtin("seq", seq));
    env.define("apply".to_string(), Value::builtin("apply", apply));
    env.define("map".to_string(), Value::builtin("map", map));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cons_always_produces_a_non_vector_list() {
        let v = conj(&[Value::vector(vec![]), Value::Number(1.0)]).unwrap();
        assert!(v.is_vector());
        let c = cons(&[Value::Number(1.0), Value::vector(vec![Value::Number(2.0)])]).unwrap();
        assert!(c.is_list());
        assert!(!c.is_vector());
    }

    #[test]
    fn rest_on_nil_or_empty_is_empty_list() {
        assert!(matches!(rest(&[Value::Nil]), Ok(Value::List { ref items, .. }) if items.is_empty()));
        assert!(matches!(rest(&[Value::list(vec![])]), Ok(Value::List { ref items, .. }) if items.is_empty()));
    }

    #[test]
    fn first_on_nil_is_nil() {
        assert!(matches!(first(&[Value::Nil]), Ok(Value::Nil)));
    }

    #[test]
    fn nth_out_of_range_errors() {
        assert!(nth(&[Value::list(vec![Value::Number(1.0)]), Value::Number(5.0)]).is_err());
    }

    #[test]
    fn conj_prepends_for_list_appends_for_vector() {
        let l = conj(&[
            Value::list(vec![Value::Number(1.0)]),
            Value::Number(2.0),
            Value::Number(3.0),
        ])
        .unwrap();
        assert_eq!(crate::printer::pr_str(&l, true), "(3 2 1)");
        let v = conj(&[
            Value::vector(vec![Value::Number(1.0)]),
            Value::Number(2.0),
            Value::Number(3.0),
        ])
        .unwrap();
        assert_eq!(crate::printer::pr_str(&v, true), "[1 2 3]");
    }

    #[test]
    fn seq_on_string_splits_into_one_char_strings() {
        let v = seq(&[Value::Str("ab".to_string())]).unwrap();
        assert_eq!(crate::printer::pr_str(&v, true), "(\"a\" \"b\")");
    }

    #[test]
    fn count_of_nil_is_zero() {
        assert!(matches!(count(&[Value::Nil]), Ok(Value::Number(n)) if n == 0.0));
    }
}
