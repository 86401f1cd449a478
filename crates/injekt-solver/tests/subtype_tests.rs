use crate::test_types::Fixture;
use crate::*;

#[test]
fn test_reflexivity() {
    let f = Fixture::new();
    for ty in [
        f.ty(f.int),
        f.nullable(f.ty(f.string)),
        f.list(f.ty(f.int)),
        f.of(f.boxed, &[TypeId::STAR]),
    ] {
        assert!(f.interner.is_subtype_of(ty, ty));
        assert!(f.interner.is_equal_to(ty, ty));
    }
}

#[test]
fn test_nothing_and_any_bounds() {
    let f = Fixture::new();
    let int = f.ty(f.int);
    let nullable_int = f.nullable(int);
    assert!(f.interner.is_subtype_of(TypeId::NOTHING, int));
    assert!(f.interner.is_subtype_of(TypeId::NOTHING, nullable_int));
    assert!(!f.interner.is_subtype_of(TypeId::NULLABLE_NOTHING, int));
    assert!(f.interner.is_subtype_of(TypeId::NULLABLE_NOTHING, nullable_int));

    assert!(f.interner.is_subtype_of(int, TypeId::ANY));
    assert!(!f.interner.is_subtype_of(nullable_int, TypeId::ANY));
    assert!(f.interner.is_subtype_of(nullable_int, TypeId::NULLABLE_ANY));
}

#[test]
fn test_nullability() {
    let f = Fixture::new();
    let int = f.ty(f.int);
    assert!(f.interner.is_subtype_of(int, f.nullable(int)));
    assert!(!f.interner.is_subtype_of(f.nullable(int), int));
    assert!(f.interner.is_subtype_of(int, f.nullable(f.ty(f.number))));
    assert!(!f.interner.is_equal_to(int, f.nullable(int)));
}

#[test]
fn test_nominal_hierarchy_is_transitive() {
    let f = Fixture::new();
    let int = f.ty(f.int);
    let number = f.ty(f.number);
    assert!(f.interner.is_subtype_of(int, number));
    assert!(f.interner.is_subtype_of(number, TypeId::ANY));
    assert!(f.interner.is_subtype_of(int, TypeId::ANY));
    assert!(!f.interner.is_subtype_of(number, int));
    assert!(!f.interner.is_subtype_of(int, f.ty(f.string)));
}

#[test]
fn test_covariant_arguments() {
    let f = Fixture::new();
    let list_int = f.list(f.ty(f.int));
    let list_number = f.list(f.ty(f.number));
    assert!(f.interner.is_subtype_of(list_int, list_number));
    assert!(!f.interner.is_subtype_of(list_number, list_int));
    assert!(
        f.interner
            .is_subtype_of(list_int, f.interner.collection_type(f.ty(f.number)))
    );
}

#[test]
fn test_contravariant_arguments() {
    let f = Fixture::new();
    let comparable_number = f.of(f.comparable, &[f.ty(f.number)]);
    let comparable_int = f.of(f.comparable, &[f.ty(f.int)]);
    assert!(f.interner.is_subtype_of(comparable_number, comparable_int));
    assert!(!f.interner.is_subtype_of(comparable_int, comparable_number));
}

#[test]
fn test_invariant_arguments() {
    let f = Fixture::new();
    let box_int = f.of(f.boxed, &[f.ty(f.int)]);
    let box_number = f.of(f.boxed, &[f.ty(f.number)]);
    assert!(!f.interner.is_subtype_of(box_int, box_number));
    assert!(!f.interner.is_subtype_of(box_number, box_int));
}

#[test]
fn test_use_site_variance() {
    let f = Fixture::new();
    let out_int = f.interner.with_variance(f.ty(f.int), Variance::Out);
    let out_number = f.interner.with_variance(f.ty(f.number), Variance::Out);
    let box_out_int = f.of(f.boxed, &[out_int]);
    let box_out_number = f.of(f.boxed, &[out_number]);
    assert!(f.interner.is_subtype_of(box_out_int, box_out_number));
    assert!(!f.interner.is_subtype_of(box_out_number, box_out_int));
}

#[test]
fn test_star_projection() {
    let f = Fixture::new();
    let box_int = f.of(f.boxed, &[f.ty(f.int)]);
    let box_star = f.of(f.boxed, &[TypeId::STAR]);
    assert!(f.interner.is_subtype_of(box_int, box_star));
    assert!(!f.interner.is_subtype_of(box_star, box_int));
}

#[test]
fn test_mutual_subtypes_are_equal() {
    let f = Fixture::new();
    let a = f.list(f.ty(f.string));
    let b = f.list(f.ty(f.string));
    assert!(f.interner.is_subtype_of(a, b) && f.interner.is_subtype_of(b, a));
    assert!(f.interner.is_equal_to(a, b));
}

#[test]
fn test_type_parameter_bound_is_respected() {
    let f = Fixture::new();
    let (_, t) = f.bounded_type_parameter("app.T", f.ty(f.number));
    assert!(f.interner.is_subtype_of(t, f.ty(f.number)));
    assert!(f.interner.is_subtype_of(t, TypeId::ANY));
    assert!(!f.interner.is_subtype_of(t, f.ty(f.int)));
    assert!(!f.interner.is_subtype_of(f.ty(f.int), t));
}

#[test]
fn test_tagged_type_is_not_its_inner_type() {
    let f = Fixture::new();
    let named = f
        .interner
        .declare_classifier(ClassifierDecl::new("app.Named").with_flags(ClassifierFlags::TAG));
    let named_string = f.of(named, &[f.ty(f.string)]);
    assert!(!f.interner.is_subtype_of(named_string, f.ty(f.string)));
    assert!(!f.interner.is_subtype_of(f.ty(f.string), named_string));
    assert!(
        f.interner
            .is_subtype_of(named_string, f.of(named, &[f.ty(f.char_sequence)]))
    );
}

#[test]
fn test_function_types_follow_declared_variance() {
    let f = Fixture::new();
    let number_to_int = f
        .interner
        .function_type(&[f.ty(f.number)], f.ty(f.int), CallContext::Default);
    let int_to_number = f
        .interner
        .function_type(&[f.ty(f.int)], f.ty(f.number), CallContext::Default);
    assert!(f.interner.is_subtype_of(number_to_int, int_to_number));
    assert!(!f.interner.is_subtype_of(int_to_number, number_to_int));
}
