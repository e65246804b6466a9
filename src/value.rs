// ABOUTME: Value types representing Mal data structures and expressions

use crate::env::Environment;
use crate::error::EvalError;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A builtin is a plain function pointer; it closes over nothing and reaches
/// the outside world (if at all) through thread-local I/O state in `builtins::io`.
pub type BuiltinFn = fn(&[Value]) -> Result<Value, EvalError>;

/// A map key compares and hashes by stored text. Keywords keep their leading
/// `:` in the string, so `:foo` and `"foo"` never collide as keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MapKey(pub String);

impl From<&str> for MapKey {
    fn from(s: &str) -> Self {
        MapKey(s.to_string())
    }
}

/// Either a native builtin or a user-defined closure. Kept as one level of
/// nesting inside `Value::Function` so both shapes share a single printed
/// representation and a single `is_macro` check site, per the value model's
/// "two sub-shapes, one variant" rule.
#[derive(Clone)]
pub enum Function {
    Builtin {
        name: &'static str,
        func: BuiltinFn,
    },
    Closure {
        params: Vec<String>,
        rest: Option<String>,
        body: Rc<Value>,
        env: Rc<Environment>,
        is_macro: Cell<bool>,
        meta: Option<Rc<Value>>,
    },
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Function::Builtin { name, .. } => write!(f, "Builtin({name})"),
            Function::Closure { params, .. } => write!(f, "Closure({params:?})"),
        }
    }
}

impl Function {
    pub fn is_macro(&self) -> bool {
        matches!(self, Function::Closure { is_macro, .. } if is_macro.get())
    }

    pub fn set_macro(&self) {
        if let Function::Closure { is_macro, .. } = self {
            is_macro.set(true);
        }
    }

    pub fn meta(&self) -> Option<Rc<Value>> {
        match self {
            Function::Builtin { .. } => None,
            Function::Closure { meta, .. } => meta.clone(),
        }
    }

    /// Returns a clone of this function carrying new metadata. Internals
    /// (params/body/env, or the builtin pointer) are shared, not copied.
    pub fn with_meta(&self, meta: Value) -> Function {
        match self {
            Function::Builtin { name, func } => Function::Builtin { name, func: *func },
            Function::Closure {
                params,
                rest,
                body,
                env,
                is_macro,
                ..
            } => Function::Closure {
                params: params.clone(),
                rest: rest.clone(),
                body: body.clone(),
                env: env.clone(),
                is_macro: Cell::new(is_macro.get()),
                meta: Some(Rc::new(meta)),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    Str(String),
    Symbol(String),
    /// Stores the leading `:`, e.g. `Keyword(":foo".into())`.
    Keyword(String),
    List {
        items: Vec<Value>,
        is_vector: bool,
        meta: Option<Rc<Value>>,
    },
    Map {
        entries: HashMap<MapKey, Value>,
        meta: Option<Rc<Value>>,
    },
    Function(Rc<Function>),
    Atom(Rc<RefCell<Value>>, Option<Rc<Value>>),
}

impl Value {
    pub fn list(items: Vec<Value>) -> Value {
        Value::List {
            items,
            is_vector: false,
            meta: None,
        }
    }

    pub fn vector(items: Vec<Value>) -> Value {
        Value::List {
            items,
            is_vector: true,
            meta: None,
        }
    }

    pub fn builtin(name: &'static str, func: BuiltinFn) -> Value {
        Value::Function(Rc::new(Function::Builtin { name, func }))
    }

    pub fn atom(v: Value) -> Value {
        Value::Atom(Rc::new(RefCell::new(v)), None)
    }

    pub fn truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    pub fn is_list(&self) -> bool {
        matches!(
            self,
            Value::List {
                is_vector: false,
                ..
            }
        )
    }

    pub fn is_vector(&self) -> bool {
        matches!(
            self,
            Value::List {
                is_vector: true,
                ..
            }
        )
    }

    pub fn is_sequential(&self) -> bool {
        matches!(self, Value::List { .. })
    }

    pub fn as_items(&self) -> Option<&[Value]> {
        match self {
            Value::List { items, .. } => Some(items),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Rc<Function>> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Name used in error messages.
    pub fn type_name(&self) -> String {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Keyword(_) => "keyword",
            Value::List {
                is_vector: false, ..
            } => "list",
            Value::List { is_vector: true, .. } => "vector",
            Value::Map { .. } => "map",
            Value::Function(_) => "function",
            Value::Atom(..) => "atom",
        }
        .to_string()
    }

    /// Returns a fresh instance of the same value carrying new metadata.
    /// Internals are shared (structural sharing), only the meta slot differs.
    pub fn with_meta(&self, meta: Value) -> Result<Value, EvalError> {
        match self {
            Value::List {
                items, is_vector, ..
            } => Ok(Value::List {
                items: items.clone(),
                is_vector: *is_vector,
                meta: Some(Rc::new(meta)),
            }),
            Value::Map { entries, .. } => Ok(Value::Map {
                entries: entries.clone(),
                meta: Some(Rc::new(meta)),
            }),
            Value::Function(f) => Ok(Value::Function(Rc::new(f.with_meta(meta)))),
            Value::Atom(cell, _) => Ok(Value::Atom(cell.clone(), Some(Rc::new(meta)))),
            other => Err(EvalError::type_error(
                "with-meta",
                "list, vector, map, function, or atom",
                other,
                0,
            )),
        }
    }

    pub fn meta(&self) -> Value {
        let m = match self {
            Value::List { meta, .. } => meta.clone(),
            Value::Map { meta, .. } => meta.clone(),
            Value::Function(f) => f.meta(),
            Value::Atom(_, meta) => meta.clone(),
            _ => None,
        };
        m.map(|v| (*v).clone()).unwrap_or(Value::Nil)
    }

    /// Structural equality per the value model's equality rules: lists and
    /// vectors compare by content across the flavour boundary, functions are
    /// never equal, atoms compare by cell identity, metadata never counts.
    pub fn mal_eq(&self, other: &Value) -> bool {
        use Value::*;
        match (self, other) {
            (Nil, Nil) => true,
            (Bool(a), Bool(b)) => a == b,
            (Number(a), Number(b)) => a == b,
            (Str(a), Str(b)) => a == b,
            (Symbol(a), Symbol(b)) => a == b,
            (Keyword(a), Keyword(b)) => a == b,
            (List { items: a, .. }, List { items: b, .. }) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.mal_eq(y))
            }
            (Map { entries: a, .. }, Map { entries: b, .. }) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|v2| v.mal_eq(v2)))
            }
            (Atom(a, _), Atom(b, _)) => Rc::ptr_eq(a, b),
            (Function(_), Function(_)) => false,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_and_vector_equal_by_content() {
        let l = Value::list(vec![Value::Number(1.0), Value::Number(2.0)]);
        let v = Value::vector(vec![Value::Number(1.0), Value::Number(2.0)]);
        assert!(l.mal_eq(&v));
    }

    #[test]
    fn vector_is_not_a_list() {
        let v = Value::vector(vec![]);
        assert!(!v.is_list());
        assert!(v.is_vector());
        assert!(v.is_sequential());
    }

    #[test]
    fn atoms_are_identity_equal_only() {
        let a = Value::atom(Value::Number(1.0));
        let b = Value::atom(Value::Number(1.0));
        assert!(!a.mal_eq(&b));
        assert!(a.mal_eq(&a.clone()));
    }

    #[test]
    fn functions_are_never_equal() {
        let f1 = Value::builtin("f", |_| Ok(Value::Nil));
        let f2 = Value::builtin("f", |_| Ok(Value::Nil));
        assert!(!f1.mal_eq(&f2));
        assert!(!f1.mal_eq(&f1.clone()));
    }

    #[test]
    fn metadata_does_not_affect_equality() {
        let a = Value::list(vec![Value::Number(1.0)]);
        let b = a.with_meta(Value::Keyword(":tag".into())).unwrap();
        assert!(a.mal_eq(&b));
    }

    #[test]
    fn nil_equals_nil_and_not_other_variants() {
        assert!(Value::Nil.mal_eq(&Value::Nil));
        assert!(!Value::Nil.mal_eq(&Value::Bool(false)));
    }
}
