// ABOUTME: Black-box tests driving the full read -> eval -> print pipeline

use mal_rs::env::Environment;
use mal_rs::eval::{eval, register_eval_builtin};
use mal_rs::printer::pr_str;
use mal_rs::reader::read_str;
use mal_rs::{builtins, value::Value};
use std::rc::Rc;

const BOOTSTRAP: &[&str] = &[
    "(def! not (fn* (a) (if a false true)))",
    r#"(def! load-file (fn* (f) (eval (read-string (str "(do " (slurp f) "\nnil)")))))"#,
    "(defmacro! cond (fn* (& xs) (if (> (count xs) 0) (list 'if (first xs) (if (> (count xs) 1) (nth xs 1) (throw \"odd number of forms to cond\")) (cons 'cond (rest (rest xs)))))))",
];

fn setup() -> Rc<Environment> {
    let env = Environment::new();
    builtins::register_builtins(&env);
    register_eval_builtin(&env);
    for form in BOOTSTRAP {
        run(form, &env);
    }
    env
}

fn run(src: &str, env: &Rc<Environment>) -> Value {
    let ast = read_str(src).unwrap().expect("non-empty input");
    eval(ast, env.clone()).unwrap()
}

fn run_err(src: &str, env: &Rc<Environment>) -> String {
    let ast = read_str(src).unwrap().expect("non-empty input");
    eval(ast, env.clone()).unwrap_err().to_string()
}

fn printed(src: &str, env: &Rc<Environment>) -> String {
    pr_str(&run(src, env), true)
}

#[test]
fn scenario_arithmetic_nesting() {
    let env = setup();
    assert_eq!(printed("(+ 1 (* 2 3))", &env), "7");
}

#[test]
fn scenario_user_function_definition_and_call() {
    let env = setup();
    run("(def! sq (fn* (x) (* x x)))", &env);
    assert_eq!(printed("(sq 9)", &env), "81");
}

#[test]
fn scenario_let_star_scoping() {
    let env = setup();
    assert_eq!(printed("(let* (a 1 b 2) (+ a b))", &env), "3");
}

#[test]
fn scenario_variadic_fn_counts_rest_args() {
    let env = setup();
    assert_eq!(printed("((fn* (& xs) (count xs)) 1 2 3)", &env), "3");
}

#[test]
fn scenario_macro_rewrites_before_evaluation() {
    let env = setup();
    run(
        "(defmacro! unless (fn* (pred a b) (list 'if pred b a)))",
        &env,
    );
    assert_eq!(printed("(unless false 7 8)", &env), "7");
}

#[test]
fn scenario_try_catch_binds_thrown_map_payload() {
    let env = setup();
    assert_eq!(
        printed("(try* (throw {:kind :boom}) (catch* e (get e :kind)))", &env),
        ":boom"
    );
}

#[test]
fn scenario_atom_swap_and_deref() {
    let env = setup();
    run("(def! a (atom 0))", &env);
    assert_eq!(printed("(swap! a (fn* (n) (+ n 1)))", &env), "1");
    assert_eq!(printed("(deref a)", &env), "1");
}

#[test]
fn scenario_read_string_round_trips_through_the_printer() {
    let env = setup();
    assert_eq!(printed(r#"(read-string "(1 2 3)")"#, &env), "(1 2 3)");
}

#[test]
fn cond_macro_from_bootstrap_chooses_first_truthy_clause() {
    let env = setup();
    assert_eq!(printed("(cond false 1 true 2 true 3)", &env), "2");
}

#[test]
fn not_helper_from_bootstrap() {
    let env = setup();
    assert_eq!(printed("(not nil)", &env), "true");
    assert_eq!(printed("(not 5)", &env), "false");
}

#[test]
fn deeply_recursive_tco_program_runs_without_overflow() {
    let env = setup();
    run(
        "(def! f (fn* (n) (if (= n 0) :done (f (- n 1)))))",
        &env,
    );
    assert_eq!(printed("(f 100000)", &env), ":done");
}

#[test]
fn quasiquote_unquote_splice_unquote() {
    let env = setup();
    run("(def! lst (list 2 3))", &env);
    assert_eq!(printed("`(1 ~@lst 4)", &env), "(1 2 3 4)");
}

#[test]
fn macroexpand_does_not_evaluate_the_expansion() {
    let env = setup();
    run("(defmacro! ident (fn* (x) x))", &env);
    assert_eq!(printed("(macroexpand (ident (+ 1 1)))", &env), "(+ 1 1)");
}

#[test]
fn undefined_symbol_is_a_reportable_error() {
    let env = setup();
    let msg = run_err("unbound-symbol-xyz", &env);
    assert!(msg.contains("not found") || msg.contains("Undefined"));
}

#[test]
fn uncaught_throw_propagates_as_an_error() {
    let env = setup();
    assert!(run_err("(throw :oops)", &env).contains(":oops"));
}

#[test]
fn count_of_rest_is_count_minus_one_or_zero() {
    let env = setup();
    run("(def! l (list 1 2 3))", &env);
    assert_eq!(printed("(count (rest l))", &env), "2");
    run("(def! empty-l (list))", &env);
    assert_eq!(printed("(count (rest empty-l))", &env), "0");
}

#[test]
fn first_equals_nth_zero_on_non_empty_list() {
    let env = setup();
    run("(def! l (list 10 20 30))", &env);
    assert_eq!(printed("(first l)", &env), printed("(nth l 0)", &env));
}

#[test]
fn atom_equality_is_identity_not_content() {
    let env = setup();
    assert_eq!(printed("(= (atom 1) (atom 1))", &env), "false");
    assert_eq!(printed("(let* (a (atom 1)) (= a a))", &env), "true");
}

#[test]
fn def_binding_is_visible_immediately() {
    let env = setup();
    run("(def! s 42)", &env);
    assert_eq!(printed("s", &env), "42");
}

#[test]
fn hash_map_literal_and_assoc_round_trip() {
    let env = setup();
    run(r#"(def! m {:a 1 :b 2})"#, &env);
    assert_eq!(printed("(get m :a)", &env), "1");
    assert_eq!(printed("(get (assoc m :c 3) :c)", &env), "3");
    assert_eq!(printed("(get m :c)", &env), "nil");
}

#[test]
fn eval_builtin_reaches_the_root_environment_from_nested_calls() {
    let env = setup();
    run("(def! x 7)", &env);
    assert_eq!(
        printed("((fn* () (eval (read-string \"x\"))))", &env),
        "7"
    );
}
