use crate::test_types::Fixture;
use crate::*;

#[test]
fn test_infers_variable_from_covariant_argument() {
    let f = Fixture::new();
    let (t_id, t) = f.type_parameter("app.provide.T");
    let context = run_candidate_inference(&f.interner, f.list(t), f.list(f.ty(f.int)), &[], false);
    assert!(context.is_ok());
    assert_eq!(context.fixed_type_variables.get(&t_id), Some(&f.ty(f.int)));
    assert_eq!(context.substitution().get(t_id), Some(f.ty(f.int)));
}

#[test]
fn test_declared_bound_is_checked() {
    let f = Fixture::new();
    let (t_id, t) = f.bounded_type_parameter("app.provide.T", f.ty(f.number));

    let satisfied =
        run_candidate_inference(&f.interner, f.list(t), f.list(f.ty(f.int)), &[], false);
    assert!(satisfied.is_ok());
    assert_eq!(satisfied.fixed_type_variables.get(&t_id), Some(&f.ty(f.int)));

    let violated =
        run_candidate_inference(&f.interner, f.list(t), f.list(f.ty(f.string)), &[], false);
    assert!(!violated.is_ok());
}

#[test]
fn test_lower_and_upper_on_same_type_merge_into_equal() {
    let f = Fixture::new();
    let (t_id, t) = f.type_parameter("app.provide.T");
    let context = run_candidate_inference(
        &f.interner,
        f.of(f.boxed, &[t]),
        f.of(f.boxed, &[f.ty(f.int)]),
        &[],
        false,
    );
    assert!(context.is_ok());
    let constraints = context.constraints_of(t_id);
    assert_eq!(constraints.len(), 1);
    assert_eq!(constraints[0].kind, ConstraintKind::Equal);
    assert_eq!(constraints[0].ty, f.ty(f.int));
}

#[test]
fn test_static_type_parameters_are_not_inferred() {
    let f = Fixture::new();
    let (t_id, t) = f.type_parameter("app.Outer.T");
    let context =
        run_candidate_inference(&f.interner, f.list(t), f.list(f.ty(f.int)), &[t_id], false);
    assert!(!context.is_ok());
    assert!(context.fixed_type_variables.is_empty());
}

#[test]
fn test_static_type_parameter_matches_itself() {
    let f = Fixture::new();
    let (t_id, t) = f.type_parameter("app.Outer.T");
    let context = run_candidate_inference(&f.interner, f.list(t), f.list(t), &[t_id], false);
    assert!(context.is_ok());
}

#[test]
fn test_nullable_variable_cannot_satisfy_non_null_request() {
    let f = Fixture::new();
    let (_, t) = f.type_parameter("app.provide.T");
    let context = run_candidate_inference(&f.interner, f.nullable(t), f.ty(f.int), &[], false);
    assert!(!context.is_ok());
}

#[test]
fn test_variable_takes_nullable_request() {
    let f = Fixture::new();
    let (t_id, t) = f.type_parameter("app.provide.T");
    let nullable_int = f.nullable(f.ty(f.int));
    let context = run_candidate_inference(&f.interner, t, nullable_int, &[], false);
    assert!(context.is_ok());
    assert_eq!(context.fixed_type_variables.get(&t_id), Some(&nullable_int));
}

#[test]
fn test_unconstrained_variable_fixes_to_top_type() {
    let f = Fixture::new();
    let (t_id, t) = f.type_parameter("app.provide.T");
    let (u_id, _) = f.type_parameter("app.provide.U");
    let mut context = TypeContext::new(&f.interner);
    context.add_type_variable(t_id);
    context.add_type_variable(u_id);
    context.add_initial_subtype_constraint(t, f.ty(f.foo));
    context.fix_type_variables();
    assert!(context.is_ok());
    assert_eq!(context.fixed_type_variables.get(&t_id), Some(&f.ty(f.foo)));
    assert_eq!(
        context.fixed_type_variables.get(&u_id),
        Some(&TypeId::NULLABLE_ANY)
    );
}

#[test]
fn test_add_on_inference_binds_constraint_parameter() {
    let f = Fixture::new();
    let (t_id, t) = f.bounded_type_parameter("app.eager.T", f.ty(f.foo));
    let context = run_add_on_injectable_inference(&f.interner, t, f.ty(f.bar), &[]);
    assert!(context.is_ok());
    assert_eq!(context.fixed_type_variables.get(&t_id), Some(&f.ty(f.bar)));
}

#[test]
fn test_add_on_inference_rejects_candidate_outside_bound() {
    let f = Fixture::new();
    let (_, t) = f.bounded_type_parameter("app.eager.T", f.ty(f.foo));
    let context = run_add_on_injectable_inference(&f.interner, t, f.ty(f.int), &[]);
    assert!(!context.is_ok());
}

#[test]
fn test_lower_constraints_join_to_common_super_type() {
    let f = Fixture::new();
    let (t_id, t) = f.type_parameter("app.provide.T");
    let mut context = TypeContext::new(&f.interner);
    context.add_type_variable(t_id);
    context.add_initial_subtype_constraint(f.ty(f.int), t);
    context.add_initial_subtype_constraint(f.ty(f.long), t);
    context.fix_type_variables();
    assert!(context.is_ok());
    assert_eq!(context.fixed_type_variables.get(&t_id), Some(&f.ty(f.number)));
}
