use super::*;
use crate::errors::EvalErrorKind;
use pretty_assertions::assert_eq;

fn kind(result: Result<impl fmt::Debug, EvalError>) -> EvalErrorKind {
    result.expect_err("expected an error").kind
}

#[test]
fn test_declare_and_lookup() {
    let env = Environment::global();
    env.declare("x", KoflObject::int(1), Mutability::Immutable)
        .unwrap();
    assert_eq!(env.lookup("x").unwrap(), KoflObject::int(1));
    assert!(env.contains("x"));
    assert!(env.is_global());
}

#[test]
fn test_redeclare_in_same_environment_fails() {
    let env = Environment::global();
    env.declare("x", KoflObject::int(1), Mutability::Immutable)
        .unwrap();
    assert_eq!(
        kind(env.declare("x", KoflObject::int(2), Mutability::Immutable)),
        EvalErrorKind::AlreadyDeclaredVariable { name: "x".into() }
    );
}

#[test]
fn test_shadowing_in_child() {
    let outer = Environment::global();
    outer
        .declare("x", KoflObject::int(1), Mutability::Immutable)
        .unwrap();
    let inner = outer.child(None);
    inner
        .declare("x", KoflObject::int(2), Mutability::Immutable)
        .unwrap();
    assert_eq!(inner.lookup("x").unwrap(), KoflObject::int(2));
    assert_eq!(outer.lookup("x").unwrap(), KoflObject::int(1));
    assert!(!inner.is_global());
}

#[test]
fn test_assign_walks_enclosing_chain() {
    let outer = Environment::global();
    outer
        .declare("z", KoflObject::int(1), Mutability::Mutable)
        .unwrap();
    let inner = outer.child(None).child(None);
    inner.assign("z", KoflObject::int(2)).unwrap();
    assert_eq!(outer.lookup("z").unwrap(), KoflObject::int(2));
}

#[test]
fn test_assign_immutable_fails() {
    let env = Environment::global();
    env.declare("z", KoflObject::int(1), Mutability::Immutable)
        .unwrap();
    assert_eq!(
        kind(env.assign("z", KoflObject::int(2))),
        EvalErrorKind::ReassignImmutableVariable { name: "z".into() }
    );
    assert_eq!(env.lookup("z").unwrap(), KoflObject::int(1));
}

#[test]
fn test_assign_undefined_fails() {
    let env = Environment::global().child(None);
    assert_eq!(
        kind(env.assign("nope", KoflObject::Unit)),
        EvalErrorKind::UndefinedVariable {
            name: "nope".into()
        }
    );
}

#[test]
fn test_expanded_lookup_is_flat() {
    let global = Environment::global();
    let module = global.child(None);
    module
        .declare("m", KoflObject::int(1), Mutability::Immutable)
        .unwrap();
    let other = global.child(None);
    other
        .declare("o", KoflObject::int(2), Mutability::Immutable)
        .unwrap();
    module.expand(&other);

    let user = Environment::global();
    assert!(user.lookup("m").is_err());
    user.expand(&module);
    assert_eq!(user.lookup("m").unwrap(), KoflObject::int(1));
    // `other` is only visible to `module`, not re-exported.
    assert_eq!(
        kind(user.lookup("o")),
        EvalErrorKind::UndefinedVariable { name: "o".into() }
    );
}

#[test]
fn test_expansion_is_visible_from_children() {
    let global = Environment::global();
    let module = global.child(None);
    module
        .declare("m", KoflObject::int(1), Mutability::Immutable)
        .unwrap();
    global.expand(&module);
    global.expand(&module);
    let nested = global.child(None).child(None);
    assert_eq!(nested.lookup("m").unwrap(), KoflObject::int(1));
}

#[test]
fn test_assign_does_not_reach_expansions() {
    let global = Environment::global();
    let module = global.child(None);
    module
        .declare("m", KoflObject::int(1), Mutability::Mutable)
        .unwrap();
    let user = Environment::global();
    user.expand(&module);
    assert_eq!(
        kind(user.assign("m", KoflObject::int(2))),
        EvalErrorKind::UndefinedVariable { name: "m".into() }
    );
}

#[test]
fn test_expansion_does_not_keep_module_alive() {
    let global = Environment::global();
    let module = global.child(None);
    module
        .declare("m", KoflObject::int(1), Mutability::Immutable)
        .unwrap();
    global.expand(&module);
    assert_eq!(global.lookup("m").unwrap(), KoflObject::int(1));

    drop(module);
    assert_eq!(
        kind(global.lookup("m")),
        EvalErrorKind::UndefinedVariable { name: "m".into() }
    );
}

#[test]
fn test_function_table_is_separate() {
    let env = Environment::global();
    assert_eq!(
        kind(env.lookup_function("f-0")),
        EvalErrorKind::UndefinedFunction { name: "f-0".into() }
    );
    assert!(env.lookup("f-0").is_err());
}

#[test]
fn test_ancestor() {
    let global = Environment::global();
    let a = global.child(None);
    let b = a.child(None);
    assert!(b.ancestor(0).unwrap().ptr_eq(&b));
    assert!(b.ancestor(2).unwrap().ptr_eq(&global));
    assert!(b.ancestor(3).is_none());
}

#[test]
fn test_backtrace_from_call_sites() {
    let global = Environment::global();
    let call = global.child(Some(CallSite::new("call f-0", Line::new(3))));
    let block = call.child(Some(CallSite::new("block", Line::new(5))));
    let plain = block.child(None);
    let names: Vec<String> = plain
        .backtrace()
        .frames()
        .iter()
        .map(|frame| format!("{} at {}", frame.name, frame.line))
        .collect();
    assert_eq!(names, ["block at line 5", "call f-0 at line 3"]);
    assert!(global.backtrace().is_empty());
}
