// ABOUTME: REPL driver: root environment bootstrap, file loading, read-eval-print loop

use crate::builtins::register_builtins;
use crate::env::Environment;
use crate::error::EvalError;
use crate::eval::{apply_function, eval, register_eval_builtin};
use crate::printer::pr_str;
use crate::reader::read_str;
use crate::value::Value;
use rustyline::error::ReadlineError;
use rustyline::{Config, Editor};
use std::io::{self, BufRead, Write};
use std::rc::Rc;

/// Mal source evaluated once at startup, after builtins are registered: the
/// `not` helper, `load-file`, and the `cond` macro.
const BOOTSTRAP: &[&str] = &[
    "(def! not (fn* (a) (if a false true)))",
    r#"(def! load-file (fn* (f) (eval (read-string (str "(do " (slurp f) "\nnil)")))))"#,
    "(defmacro! cond (fn* (& xs) (if (> (count xs) 0) (list 'if (first xs) (if (> (count xs) 1) (nth xs 1) (throw \"odd number of forms to cond\")) (cons 'cond (rest (rest xs)))))))",
];

/// Builds the root environment: installs every core-namespace builtin, the
/// `eval` builtin bound back to this same environment, and the bootstrap
/// program. Panics only if the bootstrap program itself fails to parse or
/// evaluate, which would indicate a bug in this crate, not user input.
pub fn root_environment() -> Rc<Environment> {
    let env = Environment::new();
    register_builtins(&env);
    register_eval_builtin(&env);
    for form in BOOTSTRAP {
        rep(form, &env).expect("bootstrap program must evaluate cleanly");
    }
    env
}

/// Binds `*ARGV*` to the program's trailing arguments as Strings.
pub fn bind_argv(env: &Rc<Environment>, args: &[String]) {
    let items = args.iter().map(|a| Value::Str(a.clone())).collect();
    env.define("*ARGV*".to_string(), Value::list(items));
}

/// Reads one form from `input`, evaluates it against `env`, and renders the
/// result readably. Returns `Ok(None)` for input with no forms, which the
/// REPL treats as a no-op.
pub fn rep(input: &str, env: &Rc<Environment>) -> Result<Option<String>, EvalError> {
    match read_str(input)? {
        None => Ok(None),
        Some(ast) => {
            let result = eval(ast, env.clone())?;
            Ok(Some(pr_str(&result, true)))
        }
    }
}

/// Loads and evaluates `path` via the bootstrap-defined `load-file`. Errors
/// propagate to the caller rather than being printed here, since a
/// file-mode run should exit non-zero on failure.
pub fn run_file(path: &str, env: &Rc<Environment>) -> Result<(), EvalError> {
    let load_file = env
        .get("load-file")
        .and_then(|v| v.as_function().cloned())
        .expect("root environment must define load-file");
    apply_function(&load_file, &[Value::Str(path.to_string())])?;
    Ok(())
}

/// Interactive loop for deterministic testing: reads lines from plain
/// buffered stdin with no line-editor, echoing the `user> ` prompt.
pub fn run_interactive_stdin(env: &Rc<Environment>) {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("user> ");
        if io::stdout().flush().is_err() {
            return;
        }
        match lines.next() {
            None => {
                println!();
                return;
            }
            Some(Err(_)) => return,
            Some(Ok(line)) => report_line(&line, env),
        }
    }
}

/// Interactive loop backed by `rustyline`'s line editor, with history
/// persisted to `.mal_history` in the current directory.
pub fn run_interactive(env: &Rc<Environment>) {
    const HISTORY_FILE: &str = ".mal_history";
    let config = Config::builder().auto_add_history(true).build();
    let mut rl: Editor<(), rustyline::history::DefaultHistory> =
        match Editor::with_config(config) {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Error: failed to initialize REPL: {e}");
                return;
            }
        };
    let _ = rl.load_history(HISTORY_FILE);

    loop {
        match rl.readline("user> ") {
            Ok(line) => report_line(&line, env),
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Error: {e}");
                break;
            }
        }
    }
    let _ = rl.save_history(HISTORY_FILE);
}

fn report_line(line: &str, env: &Rc<Environment>) {
    match rep(line, env) {
        Ok(Some(rendered)) => println!("{rendered}"),
        Ok(None) => {}
        Err(e) => eprintln!("Error: {e}"),
    }
}
