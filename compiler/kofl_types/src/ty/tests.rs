use super::*;
use pretty_assertions::assert_eq;

fn binary(left: Type, right: Type, ret: Type) -> FunctionType {
    FunctionType::new(
        Parameters::new().with("a", left).with("b", right),
        ret,
        None,
    )
}

#[test]
fn test_primitives_are_shared() {
    assert_eq!(Type::int(), Type::int());
    assert_ne!(Type::int(), Type::double());
    assert_eq!(Type::string().to_string(), "String");
}

#[test]
fn test_any_accepts_everything() {
    let any = Type::any();
    assert!(any.is_assignable_by(&Type::int()));
    assert!(any.is_assignable_by(&Type::string()));
    assert!(any.is_assignable_by(&Type::function(Parameters::new(), Type::unit())));
}

#[test]
fn test_assignability_is_equality_otherwise() {
    assert!(Type::int().is_assignable_by(&Type::int()));
    assert!(!Type::int().is_assignable_by(&Type::double()));
    assert!(!Type::int().is_assignable_by(&Type::any()));
}

#[test]
fn test_is_number() {
    assert!(Type::int().is_number());
    assert!(Type::double().is_number());
    assert!(!Type::boolean().is_number());
    assert!(!Type::string().is_number());
}

#[test]
fn test_function_equality_is_structural() {
    let a = binary(Type::int(), Type::int(), Type::int());
    let b = binary(Type::int(), Type::int(), Type::int());
    let c = binary(Type::int(), Type::int(), Type::double());
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_class_equality_is_structural() {
    let point = || {
        ClassBuilder::new("Point")
            .field("x", Type::int())
            .field("y", Type::int())
            .build()
    };
    assert_eq!(point(), point());
    let other = ClassBuilder::new("Point").field("x", Type::int()).build();
    assert_ne!(point(), other);
}

#[test]
fn test_match_first_declared_wins() {
    let candidates = vec![
        Overload::new("show-0", FunctionType::new(
            Parameters::new().with("value", Type::any()),
            Type::unit(),
            None,
        )),
        Overload::new("show-1", FunctionType::new(
            Parameters::new().with("value", Type::int()),
            Type::unit(),
            None,
        )),
    ];
    let found = match_overload(&candidates, &[Type::int()], None).map(|o| o.name.as_str());
    assert_eq!(found, Some("show-0"));
}

#[test]
fn test_match_requires_arity() {
    let candidates = vec![Overload::new(
        "add-0",
        binary(Type::int(), Type::int(), Type::int()),
    )];
    assert!(match_overload(&candidates, &[Type::int()], None).is_none());
    assert!(match_overload(&candidates, &[Type::int(), Type::int()], None).is_some());
}

#[test]
fn test_match_selects_by_argument_types() {
    let candidates = vec![
        Overload::new("add-0", binary(Type::int(), Type::int(), Type::int())),
        Overload::new(
            "add-1",
            binary(Type::string(), Type::string(), Type::string()),
        ),
    ];
    let found = match_overload(&candidates, &[Type::string(), Type::string()], None)
        .map(|o| o.name.as_str());
    assert_eq!(found, Some("add-1"));
}

#[test]
fn test_match_requires_exact_receiver() {
    let extension = FunctionType::new(
        Parameters::new().with("this", Type::int()),
        Type::int(),
        Some(Type::int()),
    );
    let candidates = vec![Overload::new("twice-0", extension)];
    assert!(match_overload(&candidates, &[Type::int()], None).is_none());
    assert!(match_overload(&candidates, &[Type::int()], Some(&Type::double())).is_none());
    assert!(match_overload(&candidates, &[Type::int()], Some(&Type::int())).is_some());
}

#[test]
fn test_constructors_return_their_class() {
    let string = Type::string();
    let class = string.as_class().unwrap();
    let constructors = class.constructors();
    assert_eq!(constructors.len(), 1);
    assert_eq!(constructors[0].return_type(), &string);
    assert_eq!(constructors[0].to_string(), "(any: Any) -> String");
}

#[test]
fn test_display_function_with_receiver() {
    let ty = FunctionType::new(
        Parameters::new().with("this", Type::int()).with("n", Type::int()),
        Type::boolean(),
        Some(Type::int()),
    );
    assert_eq!(ty.to_string(), "Int.(this: Int, n: Int) -> Boolean");
}

#[test]
fn test_overload_name() {
    assert_eq!(overload_name("add", 0), "add-0");
    assert_eq!(overload_name("add", 12), "add-12");
}
