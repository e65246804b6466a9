//! Atom operations: the only user-exposed mutable reference cells.
//!
//! Single-threaded evaluation means no locking is needed, but `swap!`
//! still has to read-compute-store in that order so a callback that
//! mutates the same atom observes the pre-swap value, per the resource
//! model's nested-`swap!` contract.

use crate::env::Environment;
use crate::error::EvalError;
use crate::eval::apply_function;
use crate::value::Value;
use std::rc::Rc;

fn atom(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("atom", "1", args.len()));
    }
    Ok(Value::atom(args[0].clone()))
}

fn deref(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("deref", "1", args.len()));
    }
    match &args[0] {
        Value::Atom(cell, _) => Ok(cell.borrow().clone()),
        other => Err(EvalError::type_error("deref", "atom", other, 0)),
    }
}

fn reset_bang(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("reset!", "2", args.len()));
    }
    match &args[0] {
        Value::Atom(cell, _) => {
            *cell.borrow_mut() = args[1].clone();
            Ok(args[1].clone())
        }
        other => Err(EvalError::type_error("reset!", "atom", other, 0)),
    }
}

fn swap_bang(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() < 2 {
        return Err(EvalError::arity_error("swap!", "at least 2", args.len()));
    }
    let cell = match &args[0] {
        Value::Atom(cell, _) => cell,
        other => return Err(EvalError::type_error("swap!", "atom", other, 0)),
    };
    let f = args[1]
        .as_function()
        .ok_or_else(|| EvalError::type_error("swap!", "function", &args[1], 1))?;
    let current = cell.borrow().clone();
    let mut call_args = Vec::with_capacity(args.len() - 1);
    call_args.push(current);
    call_args.extend_from_slice(&args[2..]);
    let new_value = apply_function(f, &call_args)?;
    *cell.borrow_mut() = new_value.clone();
    Ok(new_value)
}

pub fn register(env: &Rc<Environment>) {
    env.define("atom".to_string(), Value::builtin("atom", atom));
    env.define("deref".to_string(), Value::builtin("deref", deref));
    env.define("reset!".to_string(), Value::builtin("reset!", reset_bang));
    env.define("swap!".to_string(), Value::builtin("swap!", swap_bang));
}
