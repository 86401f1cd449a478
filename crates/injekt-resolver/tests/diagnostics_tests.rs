use crate::fixture::{Fixture, root_scope};
use crate::*;
use injekt_solver::CallContext;

#[test]
fn test_success_has_no_message() {
    let f = Fixture::new();
    let table = DeclarationTable::new();
    let ctx = f.context(&table);
    let root = root_scope(&ctx, vec![f.provider("app.foo", f.ty(f.foo))]);
    let result = ctx.resolve_call(root, f.callee("app.run", &[("foo", f.ty(f.foo))]));
    assert_eq!(result.render(&ctx), None);
}

#[test]
fn test_missing_top_level_request() {
    let f = Fixture::new();
    let table = DeclarationTable::new();
    let ctx = f.context(&table);
    let root = root_scope(&ctx, vec![]);
    let result = ctx.resolve_call(root, f.callee("app.run", &[("foo", f.ty(f.foo))]));
    assert_eq!(
        result.render(&ctx).as_deref(),
        Some("\nno injectable found of type app.Foo for parameter foo of function app.run.\n")
    );
}

#[test]
fn test_missing_nested_dependency_prints_the_call_chain() {
    let f = Fixture::new();
    let table = DeclarationTable::new();
    let ctx = f.context(&table);
    let root = root_scope(
        &ctx,
        vec![f.provider("app.bar", f.ty(f.baz)).with_inject_parameter("foo", f.ty(f.foo))],
    );
    let result = ctx.resolve_call(root, f.callee("app.run", &[("bar", f.ty(f.baz))]));

    let expected = "
no injectable found of type app.Foo for parameter foo of function app.bar.

I found:

  app.run(
    bar = app.bar(
      foo = /* missing: */ inject<app.Foo>()
    )
  )

but no injectables were found that match type app.Foo.
";
    assert_eq!(result.render(&ctx).as_deref(), Some(expected));
}

#[test]
fn test_ambiguity_lists_candidates() {
    let f = Fixture::new();
    let table = DeclarationTable::new();
    let ctx = f.context(&table);
    let root = root_scope(
        &ctx,
        vec![f.provider("app.first", f.ty(f.foo)), f.provider("app.second", f.ty(f.foo))],
    );
    let result = ctx.resolve_call(root, f.callee("app.run", &[("foo", f.ty(f.foo))]));
    let message = result.render(&ctx).expect("message");
    assert!(message.starts_with("\nambiguous injectables:\n\napp.first\napp.second\n\n"));
    assert!(
        message.ends_with("do all match type app.Foo for parameter foo of function app.run.\n")
    );
}

#[test]
fn test_call_context_mismatch_message() {
    let f = Fixture::new();
    let table = DeclarationTable::new();
    let ctx = f.context(&table);
    let root = root_scope(
        &ctx,
        vec![f.provider("app.loadFoo", f.ty(f.foo)).with_call_context(CallContext::Suspend)],
    );
    let result = ctx.resolve_call(root, f.callee("app.run", &[("foo", f.ty(f.foo))]));
    assert_eq!(
        result.render(&ctx).as_deref(),
        Some(
            "\ninjectable app.loadFoo() of type app.Foo for parameter foo of function app.run \
             is a suspend function but current call context is default.\n"
        )
    );
}

#[test]
fn test_divergence_message_names_the_candidate() {
    let f = Fixture::new();
    let table = DeclarationTable::new();
    let ctx = f.context(&table);
    let root = root_scope(
        &ctx,
        vec![f.provider("app.Foo", f.ty(f.foo)).with_inject_parameter("foo", f.ty(f.foo))],
    );
    let result = ctx.resolve_call(root, f.callee("app.run", &[("foo", f.ty(f.foo))]));
    let message = result.render(&ctx).expect("message");
    assert!(message.contains("app.run(\n    foo = app.Foo(\n"));
    assert!(message.ends_with(
        "but injectable app.Foo produces a diverging search when trying to match type app.Foo.\n"
    ));
}
