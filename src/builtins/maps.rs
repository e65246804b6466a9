//! Hash-map operations: construction and the immutable `assoc`/`dissoc`
//! update forms. Keys are Strings or Keywords only, per the value model's
//! `MapKey` (hashed/compared by stored text).

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::{MapKey, Value};
use std::collections::HashMap;
use std::rc::Rc;

fn value_to_map_key(name: &str, v: &Value, position: usize) -> Result<MapKey, EvalError> {
    match v {
        Value::Str(s) => Ok(MapKey(s.clone())),
        Value::Keyword(k) => Ok(MapKey(k.clone())),
        other => Err(EvalError::type_error(name, "string or keyword", other, position)),
    }
}

fn map_key_to_value(k: &MapKey) -> Value {
    if k.0.starts_with(':') {
        Value::Keyword(k.0.clone())
    } else {
        Value::Str(k.0.clone())
    }
}

fn hash_map(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() % 2 != 0 {
        return Err(EvalError::runtime_error(
            "hash-map",
            "requires an even number of key/value arguments",
        ));
    }
    let mut entries = HashMap::with_capacity(args.len() / 2);
    for pair in args.chunks(2) {
        let key = value_to_map_key("hash-map", &pair[0], 0)?;
        entries.insert(key, pair[1].clone());
    }
    Ok(Value::Map { entries, meta: None })
}

fn as_map<'a>(name: &str, v: &'a Value, position: usize) -> Result<&'a HashMap<MapKey, Value>, EvalError> {
    match v {
        Value::Map { entries, .. } => Ok(entries),
        other => Err(EvalError::type_error(name, "map", other, position)),
    }
}

fn assoc(args: &[Value]) -> Result<Value, EvalError> {
    if args.is_empty() || (args.len() - 1) % 2 != 0 {
        return Err(EvalError::runtime_error(
            "assoc",
            "requires a map and an even number of key/value arguments",
        ));
    }
    let mut entries = as_map("assoc", &args[0], 0)?.clone();
    for pair in args[1..].chunks(2) {
        let key = value_to_map_key("assoc", &pair[0], 0)?;
        entries.insert(key, pair[1].clone());
    }
    Ok(Value::Map { entries, meta: None })
}

fn dissoc(args: &[Value]) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(EvalError::arity_error("dissoc", "at least 1", args.len()));
    }
    let mut entries = as_map("dissoc", &args[0], 0)?.clone();
    for key_val in &args[1..] {
        let key = value_to_map_key("dissoc", key_val, 1)?;
        entries.remove(&key);
    }
    Ok(Value::Map { entries, meta: None })
}

fn get(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("get", "2", args.len()));
    }
    let entries = match &args[0] {
        Value::Map { entries, .. } => entries,
        Value::Nil => return Ok(Value::Nil),
        other => return Err(EvalError::type_error("get", "map or nil", other, 0)),
    };
    let key = value_to_map_key("get", &args[1], 1)?;
    Ok(entries.get(&key).cloned().unwrap_or(Value::Nil))
}

fn contains_p(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("contains?", "2", args.len()));
    }
    let entries = as_map("contains?", &args[0], 0)?;
    let key = value_to_map_key("contains?", &args[1], 1)?;
    Ok(Value::Bool(entries.contains_key(&key)))
}

fn keys(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("keys", "1", args.len()));
    }
    let entries = as_map("keys", &args[0], 0)?;
    Ok(Value::list(entries.keys().map(map_key_to_value).collect()))
}

fn vals(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("vals", "1", args.len()));
    }
    let entries = as_map("vals", &args[0], 0)?;
    Ok(Value::list(entries.values().cloned().collect()))
}

pub fn register(env: &Rc<Environment>) {
    env.define("hash-map".to_string(), Value::builtin("hash-map", hash_map));
    env.define("assoc".to_string(), Value::builtin("assoc", assoc));
    env.define("dissoc".to_string(), Value::builtin("dissoc", dissoc));
    env.define("get".to_string(), Value::builtin("get", get));
    env.define("contains?".to_string(), Value::builtin("contains?", contains_p));
    env.define("keys".to_string(), Value::builtin("keys", keys));
    env.define("vals".to_string(), Value::builtin("vals", vals));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construct_requires_even_args() {
        assert!(hash_map(&[Value::Str("a".into())]).is_err());
        assert!(hash_map(&[Value::Str("a".into()), Value::Number(1.0)]).is_ok());
    }

    #[test]
    fn get_on_missing_key_or_non_map_is_nil() {
        let m = hash_map(&[Value::Keyword(":a".into()), Value::Number(1.0)]).unwrap();
        assert!(matches!(get(&[m, Value::Keyword(":b".into())]), Ok(Value::Nil)));
        assert!(matches!(get(&[Value::Nil, Value::Keyword(":a".into())]), Ok(Value::Nil)));
    }

    #[test]
    fn assoc_and_dissoc_are_immutable() {
        let m = hash_map(&[Value::Keyword(":a".into()), Value::Number(1.0)]).unwrap();
        let m2 = assoc(&[m.clone(), Value::Keyword(":b".into()), Value::Number(2.0)]).unwrap();
        assert!(matches!(get(&[m.clone(), Value::Keyword(":b".into())]), Ok(Value::Nil)));
        assert!(matches!(get(&[m2.clone(), Value::Keyword(":b".into())]), Ok(Value::Number(n)) if n == 2.0));
        let m3 = dissoc(&[m2, Value::Keyword(":a".into())]).unwrap();
        assert!(matches!(contains_p(&[m3, Value::Keyword(":a".into())]), Ok(Value::Bool(false))));
    }

    #[test]
    fn keyword_keys_keep_leading_colon_text_keys_round_trip() {
        let m = hash_map(&[Value::Str("foo".into()), Value::Number(1.0)]).unwrap();
        let ks = keys(&[m]).unwrap();
        assert_eq!(crate::printer::pr_str(&ks, true), "(\"foo\")");
    }
}
