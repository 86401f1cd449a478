use crate::test_types::Fixture;
use crate::*;
use std::cell::Cell;
use std::rc::Rc;

#[test]
fn test_interning_is_structural() {
    let f = Fixture::new();
    let a = f.of(f.boxed, &[f.ty(f.int)]);
    let b = f.of(f.boxed, &[f.ty(f.int)]);
    assert_eq!(a, b);
    assert_ne!(a, f.nullable(a));
}

#[test]
fn test_classifiers_are_cached_by_key() {
    let f = Fixture::new();
    let again = f.interner.declare_classifier(ClassifierDecl::new("app.Int"));
    assert_eq!(again, f.int);
    assert_eq!(f.interner.classifier_by_key("app.Int"), Some(f.int));
    assert_eq!(f.interner.classifier_by_key("app.Missing"), None);
}

#[test]
#[should_panic(expected = "argument size mismatch")]
fn test_arity_mismatch_is_fatal() {
    let f = Fixture::new();
    f.interner.apply(f.boxed, []);
}

#[test]
fn test_super_types_are_substituted() {
    let f = Fixture::new();
    let list_of_int = f.list(f.ty(f.int));
    let collection_of_int = f.interner.collection_type(f.ty(f.int));
    assert_eq!(&*f.interner.super_types(list_of_int), &[collection_of_int]);
}

#[test]
fn test_nullability_propagates_to_super_types() {
    let f = Fixture::new();
    let nullable_int = f.nullable(f.ty(f.int));
    let super_types = f.interner.super_types(nullable_int);
    assert_eq!(&*super_types, &[f.nullable(f.ty(f.number))]);
    assert!(f.interner.is_nullable_type(nullable_int));
    assert!(!f.interner.is_nullable_type(f.ty(f.int)));
}

#[test]
fn test_type_parameter_is_not_nullable_unless_marked() {
    let f = Fixture::new();
    let (_, t) = f.type_parameter("app.T");
    assert!(!f.interner.is_nullable_type(t));
    assert!(f.interner.is_nullable_type(f.nullable(t)));
    let (_, s) = f.bounded_type_parameter("app.S", f.nullable(f.ty(f.foo)));
    assert_eq!(&*f.interner.super_types(s), &[f.ty(f.foo)]);
}

#[test]
fn test_subtype_view_reexpresses_ancestor() {
    let f = Fixture::new();
    let list_of_string = f.list(f.ty(f.string));
    let view = f
        .interner
        .subtype_view(list_of_string, f.interner.builtins().collection);
    assert_eq!(view, Some(f.interner.collection_type(f.ty(f.string))));
    assert_eq!(f.interner.subtype_view(list_of_string, f.int), None);
}

#[test]
fn test_all_types_covers_arguments_and_super_types() {
    let f = Fixture::new();
    let list_of_int = f.list(f.ty(f.int));
    let all = f.interner.all_types(list_of_int);
    assert_eq!(all[0], list_of_int);
    assert!(all.contains(&f.ty(f.int)));
    assert!(all.contains(&f.ty(f.number)));
    assert!(all.contains(&f.interner.collection_type(f.ty(f.int))));
    assert!(all.contains(&TypeId::ANY));
}

#[test]
fn test_declared_out_parameter_is_not_projected_in_super_types() {
    let f = Fixture::new();
    let list_of_int = f.list(f.ty(f.int));
    let super_types = f.interner.super_types(list_of_int);
    let collection_of_int = super_types[0];
    assert!(f.interner.same_type(collection_of_int, f.interner.collection_type(f.ty(f.int))));
    let arguments = f.interner.arguments(collection_of_int);
    assert_eq!(f.interner.variance_of(arguments[0]), Variance::Invariant);

    let source_t = f
        .interner
        .declare_type_parameter("app.Source.T", Variance::Out, ClassifierFlags::empty());
    let source = f
        .interner
        .declare_classifier(ClassifierDecl::new("app.Source").with_type_parameters(vec![source_t]));
    let producer_t = f
        .interner
        .declare_type_parameter("app.Producer.T", Variance::Out, ClassifierFlags::empty());
    let producer = f.interner.declare_classifier(
        ClassifierDecl::new("app.Producer").with_type_parameters(vec![producer_t]),
    );
    let source_super = f.of(source, &[f.interner.type_parameter_type(producer_t)]);
    f.interner.set_super_types(producer, vec![source_super]);

    let producer_of_string = f.of(producer, &[f.ty(f.string)]);
    assert_eq!(
        &*f.interner.super_types(producer_of_string),
        &[f.of(source, &[f.ty(f.string)])]
    );
    assert_eq!(
        f.interner.subtype_view(producer_of_string, source),
        Some(f.of(source, &[f.ty(f.string)]))
    );
}

#[test]
fn test_substitute_combines_flags() {
    let f = Fixture::new();
    let (t_id, t) = f.type_parameter("app.T");
    let substitution = TypeSubstitution::from_pairs([(t_id, f.ty(f.int))]);

    let nullable_t = f.nullable(t);
    assert_eq!(
        f.interner.substitute(nullable_t, &substitution),
        f.nullable(f.ty(f.int))
    );

    let provide_t = f.interner.with_provide(t, true);
    assert!(f.interner.is_provide(f.interner.substitute(provide_t, &substitution)));

    let out_t = f.interner.with_variance(t, Variance::Out);
    assert_eq!(
        f.interner.variance_of(f.interner.substitute(out_t, &substitution)),
        Variance::Out
    );
}

#[test]
fn test_substitute_prefers_substitution_variance() {
    let f = Fixture::new();
    let (t_id, t) = f.type_parameter("app.T");
    let in_int = f.interner.with_variance(f.ty(f.int), Variance::In);
    let out_t = f.interner.with_variance(t, Variance::Out);
    let substitution = TypeSubstitution::from_pairs([(t_id, in_int)]);
    assert_eq!(f.interner.substitute(out_t, &substitution), in_int);
}

#[test]
fn test_substitute_recurses_into_arguments() {
    let f = Fixture::new();
    let (t_id, t) = f.type_parameter("app.T");
    let substitution = TypeSubstitution::from_pairs([(t_id, f.ty(f.string))]);
    let boxed_list = f.of(f.boxed, &[f.list(t)]);
    assert_eq!(
        f.interner.substitute(boxed_list, &substitution),
        f.of(f.boxed, &[f.list(f.ty(f.string))])
    );
    assert_eq!(f.interner.substitute(f.ty(f.int), &substitution), f.ty(f.int));
}

#[test]
fn test_tags_wrap_and_unwrap() {
    let f = Fixture::new();
    let named = f
        .interner
        .declare_classifier(ClassifierDecl::new("app.Named").with_flags(ClassifierFlags::TAG));
    assert_eq!(f.interner.classifier(named).type_parameters.len(), 1);

    let named_any = f.of(named, &[TypeId::NULLABLE_ANY]);
    let named_string = f.interner.wrap(named_any, f.ty(f.string));
    assert_eq!(named_string, f.of(named, &[f.ty(f.string)]));
    assert_eq!(f.interner.unwrap_tags(named_string), f.ty(f.string));

    let logger = f
        .interner
        .declare_classifier(ClassifierDecl::new("app.Logger").with_tags(vec![named_any]));
    let default = f.interner.default_type(logger);
    assert_eq!(f.interner.classifier_of(default), named);
    assert_eq!(f.interner.unwrap_tags(default), f.ty(logger));
}

#[test]
fn test_substitute_classifiers_keeps_identity_and_substitutes_bounds() {
    let f = Fixture::new();
    let (t_id, t) = f.type_parameter("app.T");
    let (s_id, _) = f.bounded_type_parameter("app.S", f.list(t));
    let substitution = TypeSubstitution::from_pairs([(t_id, f.ty(f.int))]);

    let copies = f.interner.substitute_classifiers(&[t_id, s_id], &substitution);
    assert_ne!(copies[1], s_id);
    assert_eq!(f.interner.canonical(copies[1]), s_id);
    assert_eq!(
        &*f.interner.classifier_super_types(copies[1]),
        &[f.list(f.ty(f.int))]
    );
    // Types built from a copy intern to the declaration's types.
    assert_eq!(
        f.interner.default_type(copies[1]),
        f.interner.default_type(s_id)
    );
}

#[test]
fn test_lazy_super_types_evaluate_once() {
    let f = Fixture::new();
    let calls = Rc::new(Cell::new(0));
    let node = f.interner.declare_classifier(ClassifierDecl::new("app.Node"));
    let foo = f.foo;
    let counter = calls.clone();
    f.interner.set_lazy_super_types(
        node,
        Rc::new(move |interner: &TypeInterner| {
            counter.set(counter.get() + 1);
            vec![interner.apply(foo, [])]
        }),
    );
    assert!(f.interner.is_subtype_of(f.ty(node), f.ty(f.foo)));
    assert!(f.interner.is_subtype_of(f.ty(node), f.ty(f.foo)));
    assert_eq!(f.interner.classifier_super_types(node).len(), 1);
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_erase_sources_is_deep() {
    let f = Fixture::new();
    let (t_id, _) = f.type_parameter("app.T");
    let sourced = f
        .interner
        .with_source(f.ty(f.int), Variance::Invariant, Some(t_id));
    let boxed = f.of(f.boxed, &[sourced]);
    assert_ne!(boxed, f.of(f.boxed, &[f.ty(f.int)]));
    assert_eq!(f.interner.erase_sources(boxed), f.of(f.boxed, &[f.ty(f.int)]));
    assert!(f.interner.same_type(boxed, f.of(f.boxed, &[f.ty(f.int)])));
}

#[test]
fn test_function_types() {
    let f = Fixture::new();
    let provider = f
        .interner
        .function_type(&[f.ty(f.int)], f.ty(f.string), CallContext::Suspend);
    assert!(f.interner.is_function_type(provider));
    assert!(!f.interner.is_provide_function_type(provider));
    assert!(
        f.interner
            .is_provide_function_type(f.interner.with_provide(provider, true))
    );
    assert_eq!(f.interner.call_context_of(provider), CallContext::Suspend);
    assert_eq!(
        f.interner.function_classifier(1, CallContext::Suspend),
        f.interner.classifier_of(provider)
    );
}

#[test]
fn test_is_unconstrained() {
    let f = Fixture::new();
    let (t_id, t) = f.type_parameter("app.T");
    let (_, s) = f.bounded_type_parameter("app.S", f.ty(f.foo));
    assert!(f.interner.is_unconstrained(t, &[]));
    assert!(!f.interner.is_unconstrained(t, &[t_id]));
    assert!(!f.interner.is_unconstrained(s, &[]));
    assert!(!f.interner.is_unconstrained(f.ty(f.int), &[]));
}

#[test]
fn test_render() {
    let f = Fixture::new();
    let ty = f.nullable(f.list(f.of(f.boxed, &[TypeId::STAR])));
    assert_eq!(
        f.interner.render(ty),
        "kotlin.collections.List<app.Box<*>>?"
    );
    let shallow = TypeFormatter::new(&f.interner).with_max_depth(0).format(ty);
    assert_eq!(shallow, "kotlin.collections.List<...>?");
}
