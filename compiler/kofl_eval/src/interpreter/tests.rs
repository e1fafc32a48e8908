use super::*;
use crate::print_handler::buffer_handler;
use crate::value::Arguments;
use kofl_canon::lower_module;
use kofl_ir::ast::{Expr, FuncDecl, Param, Stmt};
use kofl_ir::{BinaryOp, Literal, LogicalOp, UnaryOp};
use kofl_types::{Type, TypeScope};
use pretty_assertions::assert_eq;

fn l(line: u32) -> Line {
    Line::new(line)
}

/// A type scope and an interpreter that live across units.
struct Harness {
    scope: TypeScope,
    interpreter: Interpreter,
}

impl Harness {
    fn new() -> Self {
        Harness {
            scope: TypeScope::with_builtins(),
            interpreter: Interpreter::builder()
                .print_handler(buffer_handler())
                .build()
                .unwrap(),
        }
    }

    fn run(&mut self, stmts: &[Stmt]) -> Result<Vec<KoflObject>, EvalError> {
        let unit = lower_module(&mut self.scope, stmts).unwrap();
        self.interpreter.evaluate_unit(&unit)
    }

    fn last(&mut self, stmts: &[Stmt]) -> KoflObject {
        self.run(stmts).unwrap().pop().unwrap()
    }

    fn error(&mut self, stmts: &[Stmt]) -> EvalError {
        self.run(stmts).unwrap_err()
    }

    fn output(&self) -> String {
        self.interpreter.print_handler().output()
    }
}

fn eval(stmts: &[Stmt]) -> KoflObject {
    Harness::new().last(stmts)
}

fn var(name: &str, line: u32) -> Expr {
    Expr::var(name, l(line))
}

fn call(name: &str, arguments: Vec<Expr>, line: u32) -> Expr {
    Expr::call(var(name, line), arguments, l(line))
}

fn println_decl() -> Stmt {
    Stmt::expr(Expr::native_func(
        "println",
        vec![Param::new("message", "Any")],
        None,
        l(1),
    ))
}

#[test]
fn test_val_var_and_assign_yield_values() {
    let values = Harness::new()
        .run(&[
            Stmt::var("z", None, Expr::int(1, l(1)), l(1)),
            Stmt::expr(Expr::assign("z", Expr::int(2, l(2)), l(2))),
            Stmt::expr(var("z", 3)),
        ])
        .unwrap();
    assert_eq!(
        values,
        vec![KoflObject::int(1), KoflObject::int(2), KoflObject::int(2)]
    );
}

#[test]
fn test_reassign_immutable() {
    let error = Harness::new().error(&[
        Stmt::val("z", None, Expr::int(1, l(1)), l(1)),
        Stmt::expr(Expr::assign("z", Expr::int(2, l(2)), l(2))),
    ]);
    assert_eq!(
        error.kind,
        EvalErrorKind::ReassignImmutableVariable { name: "z".into() }
    );
    assert_eq!(error.line, Some(l(2)));
}

#[test]
fn test_redeclare_in_same_block_fails() {
    let error = Harness::new().error(&[Stmt::block(
        vec![
            Stmt::val("x", None, Expr::int(1, l(2)), l(2)),
            Stmt::val("x", None, Expr::int(1, l(3)), l(3)),
        ],
        l(1),
    )]);
    assert_eq!(
        error.kind,
        EvalErrorKind::AlreadyDeclaredVariable { name: "x".into() }
    );
    assert_eq!(error.line, Some(l(3)));
}

#[test]
fn test_shadowing_in_inner_block() {
    let values = Harness::new()
        .run(&[
            Stmt::val("x", None, Expr::int(1, l(1)), l(1)),
            Stmt::block(
                vec![
                    Stmt::val("x", None, Expr::int(2, l(2)), l(2)),
                    Stmt::expr(var("x", 3)),
                ],
                l(2),
            ),
            Stmt::expr(var("x", 4)),
        ])
        .unwrap();
    assert_eq!(values[1], KoflObject::int(2));
    assert_eq!(values[2], KoflObject::int(1));
}

#[test]
fn test_while_body_gets_a_fresh_scope_each_iteration() {
    // `seen` is redeclared on every iteration.
    let result = eval(&[
        Stmt::var("i", None, Expr::double(0.0, l(1)), l(1)),
        Stmt::while_loop(
            Expr::binary(var("i", 2), BinaryOp::Less, Expr::double(3.0, l(2)), l(2)),
            vec![
                Stmt::val("seen", None, var("i", 3), l(3)),
                Stmt::expr(Expr::assign(
                    "i",
                    Expr::binary(var("i", 4), BinaryOp::Plus, Expr::double(1.0, l(4)), l(4)),
                    l(4),
                )),
            ],
            l(2),
        ),
        Stmt::expr(var("i", 5)),
    ]);
    assert_eq!(result, KoflObject::double(3.0));
}

#[test]
fn test_if_yields_taken_branch() {
    let branch = |condition: bool| {
        eval(&[Stmt::expr(Expr::if_else(
            Expr::boolean(condition, l(1)),
            vec![Stmt::expr(Expr::string("yes", l(1)))],
            Some(vec![Stmt::expr(Expr::string("no", l(1)))]),
            l(1),
        ))])
    };
    assert_eq!(branch(true), KoflObject::string("yes"));
    assert_eq!(branch(false), KoflObject::string("no"));
}

#[test]
fn test_if_without_else_yields_unit() {
    let result = eval(&[Stmt::expr(Expr::if_else(
        Expr::boolean(false, l(1)),
        vec![Stmt::expr(Expr::int(1, l(1)))],
        None,
        l(1),
    ))]);
    assert_eq!(result, KoflObject::Unit);
}

#[test]
fn test_function_call_returns_value() {
    let result = eval(&[
        Stmt::func(
            FuncDecl::new(
                "id",
                vec![Param::new("n", "Int")],
                Some("Int"),
                vec![Stmt::ret(var("n", 1), l(1))],
            ),
            l(1),
        ),
        Stmt::expr(call("id", vec![Expr::int(7, l(2))], 2)),
    ]);
    assert_eq!(result, KoflObject::int(7));
}

#[test]
fn test_overloads_dispatch_by_indexed_name() {
    let add = |ty: &str, body: Expr| {
        Stmt::func(
            FuncDecl::new(
                "add",
                vec![Param::new("a", ty), Param::new("b", ty)],
                Some(ty),
                vec![Stmt::ret(body, l(1))],
            ),
            l(1),
        )
    };
    let mut harness = Harness::new();
    harness
        .run(&[
            add("Int", var("a", 1)),
            add(
                "String",
                Expr::binary(var("a", 2), BinaryOp::Plus, var("b", 2), l(2)),
            ),
        ])
        .unwrap();
    let result = harness.last(&[Stmt::expr(call(
        "add",
        vec![Expr::string("a", l(3)), Expr::string("b", l(3))],
        3,
    ))]);
    assert_eq!(result, KoflObject::string("ab"));
    assert_eq!(
        harness.last(&[Stmt::expr(call(
            "add",
            vec![Expr::int(4, l(4)), Expr::int(5, l(4))],
            4
        ))]),
        KoflObject::int(4)
    );
}

#[test]
fn test_recursion() {
    // fact(n) = if n <= 1 { 1 } else { n * fact(n - 1) }
    let fact = FuncDecl::new(
        "fact",
        vec![Param::new("n", "Double")],
        Some("Double"),
        vec![
            Stmt::expr(Expr::if_else(
                Expr::binary(var("n", 2), BinaryOp::LessEqual, Expr::double(1.0, l(2)), l(2)),
                vec![Stmt::ret(Expr::double(1.0, l(2)), l(2))],
                None,
                l(2),
            )),
            Stmt::ret(
                Expr::binary(
                    var("n", 3),
                    BinaryOp::Star,
                    call(
                        "fact",
                        vec![Expr::binary(
                            var("n", 3),
                            BinaryOp::Minus,
                            Expr::double(1.0, l(3)),
                            l(3),
                        )],
                        3,
                    ),
                    l(3),
                ),
                l(3),
            ),
        ],
    );
    let result = eval(&[
        Stmt::func(fact, l(1)),
        Stmt::expr(call("fact", vec![Expr::double(5.0, l(4))], 4)),
    ]);
    assert_eq!(result, KoflObject::double(120.0));
}

#[test]
fn test_missing_return_at_runtime() {
    let error = Harness::new().error(&[
        Stmt::func(
            FuncDecl::new(
                "noop",
                vec![],
                None,
                vec![Stmt::val("x", None, Expr::int(1, l(1)), l(1))],
            ),
            l(1),
        ),
        Stmt::expr(call("noop", vec![], 2)),
    ]);
    assert_eq!(
        error.kind,
        EvalErrorKind::MissingReturn {
            function: "noop-0".into()
        }
    );
    let backtrace = error.backtrace.unwrap();
    assert_eq!(backtrace.frames()[0].name, "call noop-0");
    assert_eq!(backtrace.frames()[0].line, l(2));
}

#[test]
fn test_error_inside_call_carries_backtrace() {
    let poke = FuncDecl::new(
        "poke",
        vec![],
        Some("Int"),
        vec![
            Stmt::block(
                vec![Stmt::expr(Expr::assign("z", Expr::int(2, l(4)), l(4)))],
                l(3),
            ),
            Stmt::ret(Expr::int(0, l(5)), l(5)),
        ],
    );
    let error = Harness::new().error(&[
        Stmt::val("z", None, Expr::int(1, l(1)), l(1)),
        Stmt::func(poke, l(2)),
        Stmt::expr(call("poke", vec![], 6)),
    ]);
    assert_eq!(
        error.kind,
        EvalErrorKind::ReassignImmutableVariable { name: "z".into() }
    );
    assert_eq!(error.line, Some(l(4)));
    assert_eq!(
        error.backtrace.unwrap().to_string(),
        "stack backtrace:\n  0: block at line 3\n  1: call poke-0 at line 6"
    );
}

#[test]
fn test_closure_outlives_its_block() {
    let zero = Expr::anonymous_func(vec![], Some("Int"), vec![Stmt::ret(Expr::int(0, l(1)), l(1))], l(1));
    let hidden = Expr::anonymous_func(vec![], Some("Int"), vec![Stmt::ret(var("hidden", 3), l(3))], l(3));
    let result = eval(&[
        Stmt::var("f", None, zero, l(1)),
        Stmt::block(
            vec![
                Stmt::val("hidden", None, Expr::int(42, l(2)), l(2)),
                Stmt::expr(Expr::assign("f", hidden, l(3))),
            ],
            l(2),
        ),
        Stmt::expr(call("f", vec![], 4)),
    ]);
    assert_eq!(result, KoflObject::int(42));
}

#[test]
fn test_closure_mutates_captured_variable() {
    let bump = Expr::anonymous_func(
        vec![],
        None,
        vec![
            Stmt::expr(Expr::assign(
                "count",
                Expr::binary(var("count", 2), BinaryOp::Plus, Expr::double(1.0, l(2)), l(2)),
                l(2),
            )),
            Stmt::ret(Expr::unit(l(2)), l(2)),
        ],
        l(2),
    );
    let result = eval(&[
        Stmt::var("count", None, Expr::double(0.0, l(1)), l(1)),
        Stmt::val("bump", None, bump, l(2)),
        Stmt::expr(call("bump", vec![], 3)),
        Stmt::expr(call("bump", vec![], 4)),
        Stmt::expr(var("count", 5)),
    ]);
    assert_eq!(result, KoflObject::double(2.0));
}

#[test]
fn test_println_through_native_bridge() {
    let mut harness = Harness::new();
    let values = harness
        .run(&[
            println_decl(),
            Stmt::expr(call("println", vec![Expr::string("hi", l(2))], 2)),
            Stmt::expr(call(
                "println",
                vec![call("String", vec![Expr::int(3, l(3))], 3)],
                3,
            )),
        ])
        .unwrap();
    assert_eq!(values[1], KoflObject::Unit);
    assert_eq!(harness.output(), "hi\n3\n");
}

#[test]
fn test_native_without_implementation() {
    let error = Harness::new().error(&[
        Stmt::expr(Expr::native_func("launch", vec![], None, l(1))),
        Stmt::expr(call("launch", vec![], 2)),
    ]);
    assert_eq!(
        error.kind,
        EvalErrorKind::UndefinedFunction {
            name: "launch".into()
        }
    );
}

#[test]
fn test_extension_function_binds_this() {
    let show = FuncDecl::new(
        "show",
        vec![Param::new("prefix", "String")],
        Some("String"),
        vec![Stmt::ret(
            Expr::binary(var("prefix", 1), BinaryOp::Plus, Expr::this(l(1)), l(1)),
            l(1),
        )],
    );
    let result = eval(&[
        Stmt::expr(Expr::extension_func("Int", show, l(1))),
        Stmt::expr(Expr::call(
            Expr::get(Expr::int(7, l(2)), "show", l(2)),
            vec![Expr::string(">", l(2))],
            l(2),
        )),
    ]);
    assert_eq!(result, KoflObject::string(">7"));
}

#[test]
fn test_module_functions_need_use() {
    let mut harness = Harness::new();
    harness
        .run(&[
            Stmt::module("M", l(1)),
            Stmt::func(
                FuncDecl::new(
                    "f",
                    vec![],
                    Some("Int"),
                    vec![Stmt::ret(Expr::int(1, l(2)), l(2))],
                ),
                l(2),
            ),
        ])
        .unwrap();

    let error = harness.error(&[Stmt::expr(call("f", vec![], 3))]);
    assert_eq!(
        error.kind,
        EvalErrorKind::UndefinedFunction { name: "f-0".into() }
    );

    let values = harness
        .run(&[Stmt::use_module("M", l(4)), Stmt::expr(call("f", vec![], 5))])
        .unwrap();
    assert_eq!(values, vec![KoflObject::Unit, KoflObject::int(1)]);
    assert!(harness.interpreter.module("M").is_some());
}

#[test]
fn test_module_outside_global() {
    let error = Harness::new().error(&[Stmt::block(vec![Stmt::module("N", l(2))], l(1))]);
    assert_eq!(
        error.kind,
        EvalErrorKind::ModuleOutsideGlobal { name: "N".into() }
    );
}

#[test]
fn test_use_unknown_module() {
    let error = Harness::new().error(&[Stmt::use_module("Nope", l(1))]);
    assert_eq!(
        error.kind,
        EvalErrorKind::UndefinedModule {
            name: "Nope".into()
        }
    );
    assert_eq!(error.line, Some(l(1)));
}

#[test]
fn test_top_level_return_is_uncaught() {
    let error = Harness::new().error(&[Stmt::ret(Expr::int(1, l(1)), l(1))]);
    assert_eq!(error.kind, EvalErrorKind::UncaughtReturn);
}

#[test]
fn test_records_are_unsupported() {
    let error = Harness::new().error(&[Stmt::record("Point", vec![Param::new("x", "Int")], l(1))]);
    assert!(matches!(error.kind, EvalErrorKind::Unsupported { .. }));
}

#[test]
fn test_declarations_before_failure_survive() {
    let mut harness = Harness::new();
    let error = harness.error(&[
        Stmt::val("kept", None, Expr::int(1, l(1)), l(1)),
        Stmt::ret(Expr::int(2, l(2)), l(2)),
    ]);
    assert_eq!(error.kind, EvalErrorKind::UncaughtReturn);
    assert_eq!(harness.last(&[Stmt::expr(var("kept", 3))]), KoflObject::int(1));
}

#[test]
fn test_operators() {
    let bin = |left: Expr, op: BinaryOp, right: Expr| eval(&[Stmt::expr(Expr::binary(left, op, right, l(1)))]);
    let int = |value: i64| Expr::int(value, l(1));
    let string = |value: &str| Expr::string(value, l(1));

    assert_eq!(bin(int(1), BinaryOp::Plus, int(2)), KoflObject::double(3.0));
    assert_eq!(bin(int(7), BinaryOp::Slash, int(2)), KoflObject::double(3.5));
    assert_eq!(bin(int(1), BinaryOp::Less, int(2)), KoflObject::boolean(true));
    assert_eq!(bin(int(2), BinaryOp::GreaterEqual, int(3)), KoflObject::boolean(false));
    assert_eq!(bin(string("a"), BinaryOp::Plus, int(1)), KoflObject::string("a1"));
    assert_eq!(bin(string("a"), BinaryOp::EqualEqual, string("a")), KoflObject::boolean(true));
    assert_eq!(bin(int(1), BinaryOp::BangEqual, int(1)), KoflObject::boolean(false));

    let unary = |op: UnaryOp, right: Expr| eval(&[Stmt::expr(Expr::unary(op, right, l(1)))]);
    assert_eq!(unary(UnaryOp::Minus, int(5)), KoflObject::int(-5));
    assert_eq!(unary(UnaryOp::Minus, Expr::double(0.5, l(1))), KoflObject::double(-0.5));
    assert_eq!(unary(UnaryOp::Bang, Expr::boolean(true, l(1))), KoflObject::boolean(false));
}

#[test]
fn test_logical_short_circuits() {
    let touch = FuncDecl::new(
        "touch",
        vec![],
        Some("Boolean"),
        vec![
            Stmt::expr(Expr::assign(
                "hits",
                Expr::binary(var("hits", 2), BinaryOp::Plus, Expr::double(1.0, l(2)), l(2)),
                l(2),
            )),
            Stmt::ret(Expr::boolean(true, l(2)), l(2)),
        ],
    );
    let values = Harness::new()
        .run(&[
            Stmt::var("hits", None, Expr::double(0.0, l(1)), l(1)),
            Stmt::func(touch, l(2)),
            Stmt::expr(Expr::logical(
                Expr::boolean(false, l(3)),
                LogicalOp::And,
                call("touch", vec![], 3),
                l(3),
            )),
            Stmt::expr(Expr::logical(
                Expr::boolean(true, l(4)),
                LogicalOp::Or,
                call("touch", vec![], 4),
                l(4),
            )),
            Stmt::expr(Expr::logical(
                Expr::boolean(true, l(5)),
                LogicalOp::And,
                call("touch", vec![], 5),
                l(5),
            )),
            Stmt::expr(var("hits", 6)),
        ])
        .unwrap();
    assert_eq!(values[2], KoflObject::boolean(false));
    assert_eq!(values[3], KoflObject::boolean(true));
    assert_eq!(values[4], KoflObject::boolean(true));
    assert_eq!(values[5], KoflObject::double(1.0));
}

#[test]
fn test_calling_a_non_callable() {
    let interpreter = Interpreter::builder().build().unwrap();
    let callee = Descriptor::new(DescriptorKind::Const(Literal::Int(1)), Type::int(), l(1));
    let call = Descriptor::new(
        DescriptorKind::Call {
            callee: Box::new(callee),
            arguments: vec![],
        },
        Type::unit(),
        l(1),
    );
    let error = interpreter.evaluate_unit(&[call]).unwrap_err();
    assert_eq!(
        error.kind,
        EvalErrorKind::InvalidType {
            expected: "a callable".into(),
            found: "Int".into()
        }
    );
}

#[test]
fn test_call_function_by_name() {
    let mut harness = Harness::new();
    harness
        .run(&[Stmt::func(
            FuncDecl::new(
                "main",
                vec![],
                Some("Int"),
                vec![Stmt::ret(Expr::int(0, l(1)), l(1))],
            ),
            l(1),
        )])
        .unwrap();
    let result = harness
        .interpreter
        .call_function("main-0", &Arguments::new());
    assert!(matches!(result, Ok(value) if value == KoflObject::int(0)));
}

#[test]
fn test_builtin_constructors() {
    let harness = Harness::new();
    let string = harness.interpreter.class("String").unwrap();
    assert_eq!(string.name(), "String");
    assert!(harness.interpreter.class("Int").is_some());
    assert!(harness.interpreter.class("Point").is_none());
}

#[test]
fn test_unit_is_bound_globally() {
    let result = eval(&[Stmt::expr(var("Unit", 1))]);
    assert_eq!(result, KoflObject::Unit);
}
