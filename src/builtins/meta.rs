//! Metadata read/attach for the four metadata-bearing variants (list,
//! vector, map, function, atom). Metadata never participates in equality
//! and attaching it returns a fresh instance sharing internals.

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;
use std::rc::Rc;

fn meta(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("meta", "1", args.len()));
    }
    Ok(args[0].meta())
}

fn with_meta(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("with-meta", "2", args.len()));
    }
    args[0].with_meta(args[1].clone())
}

pub fn register(env: &Rc<Environment>) {
    env.define("meta".to_string(), Value::builtin("meta", meta));
    env.define("with-meta".to_string(), Value::builtin("with-meta", with_meta));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_defaults_to_nil() {
        assert!(matches!(meta(&[Value::list(vec![])]), Ok(Value::Nil)));
    }

    #[test]
    fn with_meta_does_not_mutate_the_original() {
        let l = Value::list(vec![Value::Number(1.0)]);
        let tagged = with_meta(&[l.clone(), Value::Keyword(":tag".into())]).unwrap();
        assert!(matches!(meta(&[l]), Ok(Value::Nil)));
        assert!(matches!(meta(&[tagged]), Ok(Value::Keyword(k)) if k == ":tag"));
    }
}
