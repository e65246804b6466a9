// ABOUTME: Evaluator module for executing parsed Lisp expressions

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::{Function, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

thread_local! {
    /// The root environment, so the `eval` builtin (bound by the REPL
    /// driver at startup) can reinvoke the evaluator globally without a
    /// plain `fn` pointer capturing it by closure.
    static ROOT_ENV: RefCell<Option<Rc<Environment>>> = const { RefCell::new(None) };
}

/// Installs `eval` as a builtin in `env`, bound to `env` itself as the root
/// environment every call reinvokes against.
pub fn register_eval_builtin(env: &Rc<Environment>) {
    ROOT_ENV.with(|cell| *cell.borrow_mut() = Some(env.clone()));
    env.define("eval".to_string(), Value::builtin("eval", eval_builtin));
}

fn eval_builtin(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("eval", "1", args.len()));
    }
    let root = ROOT_ENV
        .with(|cell| cell.borrow().clone())
        .expect("eval builtin registered without a root environment");
    eval(args[0].clone(), root)
}

/// Main evaluation function: a trampoline loop rather than host recursion,
/// so that `let*`, `do`, `if`, `quasiquote`, `try*`'s handler body, and
/// user-function application in tail position never grow the Rust stack.
pub fn eval(mut ast: Value, mut env: Rc<Environment>) -> Result<Value, EvalError> {
    loop {
        ast = expand_macros_fully(ast, &env)?;

        let items = match &ast {
            Value::List {
                items,
                is_vector: false,
                ..
            } if !items.is_empty() => items.clone(),
            _ => return eval_ast(&ast, &env),
        };

        if let Value::Symbol(sym) = &items[0] {
            match sym.as_str() {
                "def!" => return eval_def(&items, &env),
                "defmacro!" => return eval_defmacro(&items, &env),
                "let*" => {
                    let (body, new_env) = eval_let_bindings(&items, &env)?;
                    ast = body;
                    env = new_env;
                    continue;
                }
                "do" => {
                    let rest = &items[1..];
                    if rest.is_empty() {
                        return Ok(Value::Nil);
                    }
                    for form in &rest[..rest.len() - 1] {
                        eval(form.clone(), env.clone())?;
                    }
                    ast = rest[rest.len() - 1].clone();
                    continue;
                }
                "if" => {
                    require_arity("if", &items, 3, Some(4))?;
                    let cond = eval(items[1].clone(), env.clone())?;
                    if cond.truthy() {
                        ast = items[2].clone();
                    } else if items.len() == 4 {
                        ast = items[3].clone();
                    } else {
                        return Ok(Value::Nil);
                    }
                    continue;
                }
                "fn*" => return eval_fn_star(&items, &env),
                "quote" => {
                    require_arity("quote", &items, 2, Some(2))?;
                    return Ok(items[1].clone());
                }
                "quasiquote" => {
                    require_arity("quasiquote", &items, 2, Some(2))?;
                    ast = quasiquote(&items[1]);
                    continue;
                }
                "quasiquoteexpand" => {
                    require_arity("quasiquoteexpand", &items, 2, Some(2))?;
                    return Ok(quasiquote(&items[1]));
                }
                "macroexpand" => {
                    require_arity("macroexpand", &items, 2, Some(2))?;
                    return expand_macro_once(items[1].clone(), &env);
                }
                "try*" => {
                    require_arity("try*", &items, 2, Some(3))?;
                    if items.len() == 2 {
                        ast = items[1].clone();
                        continue;
                    }
                    let catch_form = match &items[2] {
                        Value::List { items: c, .. } => c.clone(),
                        other => {
                            return Err(EvalError::type_error("try*", "catch* form", other, 2))
                        }
                    };
                    if catch_form.len() != 3 || catch_form[0].as_symbol() != Some("catch*") {
                        return Err(EvalError::runtime_error(
                            "try*",
                            "expected (catch* symbol handler)",
                        ));
                    }
                    match eval(items[1].clone(), env.clone()) {
                        Ok(v) => return Ok(v),
                        Err(e) => {
                            let sym = catch_form[1]
                                .as_symbol()
                                .ok_or_else(|| {
                                    EvalError::type_error("try*", "symbol", &catch_form[1], 0)
                                })?
                                .to_string();
                            let payload = e.into_caught_value();
                            let handler_env = Environment::with_parent(env.clone());
                            handler_env.define(sym, payload);
                            ast = catch_form[2].clone();
                            env = handler_env;
                            continue;
                        }
                    }
                }
                "throw" => {
                    require_arity("throw", &items, 2, Some(2))?;
                    let payload = eval(items[1].clone(), env.clone())?;
                    return Err(EvalError::Thrown(payload));
                }
                _ => {}
            }
        }

        // Generic application.
        let callee = eval(items[0].clone(), env.clone())?;
        let mut args = Vec::with_capacity(items.len() - 1);
        for form in &items[1..] {
            args.push(eval(form.clone(), env.clone())?);
        }
        match callee {
            Value::Function(f) => match f.as_ref() {
                Function::Builtin { func, .. } => return func(&args),
                Function::Closure {
                    params,
                    rest,
                    body,
                    env: closure_env,
                    ..
                } => {
                    env = Environment::new_with_bindings(
                        closure_env.clone(),
                        params,
                        rest.as_deref(),
                        &args,
                    )?;
                    ast = (**body).clone();
                    continue;
                }
            },
            _ => return Err(EvalError::NotCallable),
        }
    }
}

/// Evaluates values that are not a non-empty, non-vector list: symbols
/// resolve against the environment, vectors and maps evaluate their
/// contents, everything else (including an empty list) is self-evaluating.
fn eval_ast(ast: &Value, env: &Rc<Environment>) -> Result<Value, EvalError> {
    match ast {
        Value::Symbol(name) => env
            .get(name)
            .ok_or_else(|| EvalError::UndefinedSymbol(name.clone())),
        Value::List {
            items,
            is_vector: true,
            meta,
        } => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(eval(item.clone(), env.clone())?);
            }
            Ok(Value::List {
                items: out,
                is_vector: true,
                meta: meta.clone(),
            })
        }
        Value::Map { entries, meta } => {
            let mut out = HashMap::with_capacity(entries.len());
            for (k, v) in entries {
                out.insert(k.clone(), eval(v.clone(), env.clone())?);
            }
            Ok(Value::Map {
                entries: out,
                meta: meta.clone(),
            })
        }
        other => Ok(other.clone()),
    }
}

/// Applies `f` to `args` without participating in the caller's trampoline.
/// Used from contexts that are not in tail position: macro expansion,
/// `map`, `apply`, `swap!`.
pub fn apply_function(f: &Rc<Function>, args: &[Value]) -> Result<Value, EvalError> {
    match f.as_ref() {
        Function::Builtin { func, .. } => func(args),
        Function::Closure {
            params, rest, body, env, ..
        } => {
            let new_env = Environment::new_with_bindings(env.clone(), params, rest.as_deref(), args)?;
            eval((**body).clone(), new_env)
        }
    }
}

fn is_macro_call(ast: &Value, env: &Rc<Environment>) -> Option<Rc<Function>> {
    let items = match ast {
        Value::List {
            items,
            is_vector: false,
            ..
        } if !items.is_empty() => items,
        _ => return None,
    };
    let sym = items[0].as_symbol()?;
    let value = env.get(sym)?;
    match value {
        Value::Function(f) if f.is_macro() => Some(f),
        _ => None,
    }
}

/// Expands `ast` while its head is bound to a macro, per the AST
/// pre-processing step that runs before special-form dispatch.
fn expand_macros_fully(mut ast: Value, env: &Rc<Environment>) -> Result<Value, EvalError> {
    while let Some(mac) = is_macro_call(&ast, env) {
        let args = match &ast {
            Value::List { items, .. } => items[1..].to_vec(),
            _ => unreachable!(),
        };
        ast = apply_function(&mac, &args)?;
    }
    Ok(ast)
}

/// Expands `ast` a single step, for the `macroexpand` special form.
fn expand_macro_once(ast: Value, env: &Rc<Environment>) -> Result<Value, EvalError> {
    match is_macro_call(&ast, env) {
        Some(mac) => {
            let args = match &ast {
                Value::List { items, .. } => items[1..].to_vec(),
                _ => unreachable!(),
            };
            apply_function(&mac, &args)
        }
        None => Ok(ast),
    }
}

fn require_arity(
    function: &str,
    items: &[Value],
    min: usize,
    max: Option<usize>,
) -> Result<(), EvalError> {
    let actual = items.len();
    let ok = actual >= min && max.map(|m| actual <= m).unwrap_or(true);
    if ok {
        return Ok(());
    }
    let expected = match max {
        Some(m) if m == min => (min - 1).to_string(),
        Some(m) => format!("{}-{}", min - 1, m - 1),
        None => format!("at least {}", min - 1),
    };
    Err(EvalError::arity_error(function, expected, actual - 1))
}

fn eval_def(items: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    require_arity("def!", items, 3, Some(3))?;
    let name = items[1]
        .as_symbol()
        .ok_or_else(|| EvalError::type_error("def!", "symbol", &items[1], 1))?
        .to_string();
    let value = eval(items[2].clone(), env.clone())?;
    env.define(name, value.clone());
    Ok(value)
}

fn eval_defmacro(items: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    require_arity("defmacro!", items, 3, Some(3))?;
    let name = items[1]
        .as_symbol()
        .ok_or_else(|| EvalError::type_error("defmacro!", "symbol", &items[1], 1))?
        .to_string();
    let value = eval(items[2].clone(), env.clone())?;
    let f = value
        .as_function()
        .ok_or_else(|| EvalError::type_error("defmacro!", "function", &value, 2))?;
    let copied = (**f).clone();
    copied.set_macro();
    let macro_value = Value::Function(Rc::new(copied));
    env.define(name, macro_value.clone());
    Ok(macro_value)
}

fn binding_forms(items: &[Value], position: usize) -> Result<&[Value], EvalError> {
    match &items[position] {
        Value::List { items: binds, .. } => Ok(binds),
        other => Err(EvalError::type_error("let*", "list or vector", other, position)),
    }
}

fn eval_let_bindings(
    items: &[Value],
    env: &Rc<Environment>,
) -> Result<(Value, Rc<Environment>), EvalError> {
    require_arity("let*", items, 3, Some(3))?;
    let binds = binding_forms(items, 1)?;
    if binds.len() % 2 != 0 {
        return Err(EvalError::runtime_error(
            "let*",
            "binding list must have an even number of forms",
        ));
    }
    let child = Environment::with_parent(env.clone());
    for pair in binds.chunks(2) {
        let name = pair[0]
            .as_symbol()
            .ok_or_else(|| EvalError::type_error("let*", "symbol", &pair[0], 0))?
            .to_string();
        let value = eval(pair[1].clone(), child.clone())?;
        child.define(name, value);
    }
    Ok((items[2].clone(), child))
}

fn parse_params(forms: &[Value]) -> Result<(Vec<String>, Option<String>), EvalError> {
    let mut params = Vec::new();
    let mut rest = None;
    let mut iter = forms.iter();
    while let Some(form) = iter.next() {
        let name = form
            .as_symbol()
            .ok_or_else(|| EvalError::type_error("fn*", "symbol", form, 0))?;
        if name == "&" {
            let rest_form = iter
                .next()
                .ok_or_else(|| EvalError::runtime_error("fn*", "missing rest parameter name"))?;
            let rest_name = rest_form
                .as_symbol()
                .ok_or_else(|| EvalError::type_error("fn*", "symbol", rest_form, 0))?;
            rest = Some(rest_name.to_string());
            break;
        }
        params.push(name.to_string());
    }
    Ok((params, rest))
}

fn eval_fn_star(items: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    require_arity("fn*", items, 3, Some(3))?;
    let param_forms = match &items[1] {
        Value::List { items, .. } => items.as_slice(),
        other => return Err(EvalError::type_error("fn*", "list or vector", other, 1)),
    };
    let (params, rest) = parse_params(param_forms)?;
    Ok(Value::Function(Rc::new(Function::Closure {
        params,
        rest,
        body: Rc::new(items[2].clone()),
        env: env.clone(),
        is_macro: std::cell::Cell::new(false),
        meta: None,
    })))
}

/// Rewrites a quasiquoted form into the `cons`/`concat`/`quote` expression
/// that, once evaluated, produces the intended value.
fn quasiquote(ast: &Value) -> Value {
    match ast {
        Value::List { items, .. } if !items.is_empty() => {
            let head = &items[0];
            if let Value::Symbol(s) = head {
                if s == "unquote" && items.len() >= 2 {
                    return items[1].clone();
                }
            }
            if let Value::List {
                items: hitems,
                is_vector: false,
                ..
            } = head
            {
                if hitems.len() >= 2 {
                    if let Value::Symbol(s) = &hitems[0] {
                        if s == "splice-unquote" {
                            let rest = Value::list(items[1..].to_vec());
                            return Value::list(vec![
                                Value::Symbol("concat".to_string()),
                                hitems[1].clone(),
                                quasiquote(&rest),
                            ]);
                        }
                    }
                }
            }
            let rest = Value::list(items[1..].to_vec());
            Value::list(vec![
                Value::Symbol("cons".to_string()),
                quasiquote(head),
                quasiquote(&rest),
            ])
        }
        other => Value::list(vec![Value::Symbol("quote".to_string()), other.clone()]),
    }
}
