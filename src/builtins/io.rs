//! Reader/printer bridge (`read-string`, `pr-str`, `str`, `prn`,
//! `println`) and host I/O delegated straight through to the filesystem
//! and stdin/stdout, with no sandboxing.

use crate::env::Environment;
use crate::error::EvalError;
use crate::printer::pr_str;
use crate::reader::read_str;
use crate::value::Value;
use std::io::Write;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

fn read_string(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("read-string", "1", args.len()));
    }
    let s = match &args[0] {
        Value::Str(s) => s,
        other => return Err(EvalError::type_error("read-string", "string", other, 0)),
    };
    Ok(read_str(s)?.unwrap_or(Value::Nil))
}

fn pr_str_fn(args: &[Value]) -> Result<Value, EvalError> {
    let rendered = args
        .iter()
        .map(|v| pr_str(v, true))
        .collect::<Vec<_>>()
        .join(" ");
    Ok(Value::Str(rendered))
}

fn str_fn(args: &[Value]) -> Result<Value, EvalError> {
    let rendered = args.iter().map(|v| pr_str(v, false)).collect::<String>();
    Ok(Value::Str(rendered))
}

fn prn(args: &[Value]) -> Result<Value, EvalError> {
    let rendered = args
        .iter()
        .map(|v| pr_str(v, true))
        .collect::<Vec<_>>()
        .join(" ");
    println!("{rendered}");
    Ok(Value::Nil)
}

fn println_fn(args: &[Value]) -> Result<Value, EvalError> {
    let rendered = args
        .iter()
        .map(|v| pr_str(v, false))
        .collect::<Vec<_>>()
        .join(" ");
    println!("{rendered}");
    Ok(Value::Nil)
}

fn slurp(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("slurp", "1", args.len()));
    }
    let path = match &args[0] {
        Value::Str(s) => s,
        other => return Err(EvalError::type_error("slurp", "string", other, 0)),
    };
    std::fs::read_to_string(path)
        .map(Value::Str)
        .map_err(|e| EvalError::runtime_error("slurp", e.to_string()))
}

fn readline(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("readline", "1", args.len()));
    }
    let prompt = match &args[0] {
        Value::Str(s) => s,
        other => return Err(EvalError::type_error("readline", "string", other, 0)),
    };
    print!("{prompt}");
    std::io::stdout()
        .flush()
        .map_err(|e| EvalError::runtime_error("readline", e.to_string()))?;
    let mut line = String::new();
    let bytes_read = std::io::stdin()
        .read_line(&mut line)
        .map_err(|e| EvalError::runtime_error("readline", e.to_string()))?;
    if bytes_read == 0 {
        return Ok(Value::Nil);
    }
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(Value::Str(line))
}

fn time_ms(args: &[Value]) -> Result<Value, EvalError> {
    if !args.is_empty() {
        return Err(EvalError::arity_error("time-ms", "0", args.len()));
    }
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| EvalError::runtime_error("time-ms", e.to_string()))?
        .as_millis();
    Ok(Value::Number(millis as f64))
}

pub fn register(env: &Rc<Environment>) {
    env.define(
        "read-string".to_string(),
        Value::builtin("read-string", read_string),
    );
    env.define("pr-str".to_string(), Value::builtin("pr-str", pr_str_fn));
    env.define("str".to_string(), Value::builtin("str", str_fn));
    env.define("prn".to_string(), Value::builtin("prn", prn));
    env.define("println".to_string(), Value::builtin("println", println_fn));
    env.define("slurp".to_string(), Value::builtin("slurp", slurp));
    env.define("readline".to_string(), Value::builtin("readline", readline));
    env.define("time-ms".to_string(), Value::builtin("time-ms", time_ms));
}
