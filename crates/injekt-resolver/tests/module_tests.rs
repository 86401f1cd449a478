use crate::fixture::{Fixture, chosen, root_scope};
use crate::*;
use injekt_solver::{CallContext, ClassifierDecl, ClassifierFlags, Variance};

#[test]
fn test_module_members_become_candidates() {
    let f = Fixture::new();
    let module = f.interner.declare_classifier(
        ClassifierDecl::new("app.DbModule").with_flags(ClassifierFlags::MODULE),
    );
    let mut table = DeclarationTable::new();
    table.add_module_member(module, f.provider("app.DbModule.database", f.ty(f.foo)));
    let ctx = f.context(&table);

    let instance = f
        .provider("app.dbModule", f.ty(module))
        .with_kind(CallableKind::Object);
    let root = root_scope(&ctx, vec![instance]);

    let injectables = ctx.scope(root).injectables();
    assert_eq!(injectables.len(), 2);
    let module_unique_id = f.interner.unique_id(injectables[0].ty);
    assert!(module_unique_id.is_some());

    let member = &injectables[1];
    assert_eq!(&*member.chain_name, "app.dbModule.database");
    assert!(f.interner.unique_id(member.ty).is_some());
    assert_ne!(f.interner.unique_id(member.ty), module_unique_id);
    assert_eq!(member.dispatch_receiver(), Some(injectables[0].ty));
}

#[test]
fn test_module_member_resolves_through_its_module() {
    let f = Fixture::new();
    let module = f.interner.declare_classifier(
        ClassifierDecl::new("app.DbModule").with_flags(ClassifierFlags::MODULE),
    );
    let mut table = DeclarationTable::new();
    table.add_module_member(module, f.provider("app.DbModule.database", f.ty(f.foo)));
    let ctx = f.context(&table);
    let root = root_scope(
        &ctx,
        vec![f.provider("app.dbModule", f.ty(module)).with_kind(CallableKind::Object)],
    );

    let callee = f.callee("app.run", &[("foo", f.ty(f.foo))]);
    let result = ctx.resolve_call(root, callee);
    let InjectionResult::Success { results, .. } = &result else {
        panic!("expected success, got {result:?}");
    };
    let (_, foo) = results.first().expect("one result");
    assert_eq!(chosen(&ctx, foo).as_deref(), Some("app.DbModule.database"));

    let Some(Success::Value { dependency_results, .. }) = foo.as_success() else {
        panic!("expected a value");
    };
    let (receiver, module_result) = dependency_results.first().expect("dispatch receiver");
    assert_eq!(&*receiver.parameter_name, callable::DISPATCH_RECEIVER_NAME);
    assert_eq!(chosen(&ctx, module_result).as_deref(), Some("app.dbModule"));
}

#[test]
fn test_generic_module_members_are_substituted() {
    let f = Fixture::new();
    let c = f.interner.declare_type_parameter(
        "app.ConfigModule.C",
        Variance::Invariant,
        ClassifierFlags::empty(),
    );
    let module = f.interner.declare_classifier(
        ClassifierDecl::new("app.ConfigModule")
            .with_type_parameters(vec![c])
            .with_flags(ClassifierFlags::MODULE),
    );
    let mut table = DeclarationTable::new();
    table.add_module_member(
        module,
        f.provider("app.ConfigModule.config", f.interner.default_type(c)),
    );
    let ctx = f.context(&table);
    let root = root_scope(
        &ctx,
        vec![f.provider("app.intConfig", f.of(module, &[f.ty(f.int)]))],
    );

    let member = ctx.scope(root).injectables()[1].clone();
    assert_eq!(f.interner.with_unique_id(member.ty, None), f.ty(f.int));

    let request = InjectableRequest::new(f.ty(f.int), "app.run", "config");
    let result = ctx.resolve_request(root, &request);
    assert_eq!(chosen(&ctx, &result).as_deref(), Some("app.ConfigModule.config"));
}

#[test]
fn test_nullable_module_makes_members_nullable() {
    let f = Fixture::new();
    let module = f.interner.declare_classifier(
        ClassifierDecl::new("app.DbModule").with_flags(ClassifierFlags::MODULE),
    );
    let mut table = DeclarationTable::new();
    table.add_module_member(module, f.provider("app.DbModule.database", f.ty(f.foo)));
    let ctx = f.context(&table);
    let root = root_scope(
        &ctx,
        vec![f.provider("app.maybeDb", f.interner.nullable(f.ty(module)))],
    );
    let member = ctx.scope(root).injectables()[1].clone();
    assert!(f.interner.is_marked_nullable(member.ty));
}

#[test]
fn test_self_containing_module_stops_expanding() {
    let f = Fixture::new();
    let module = f.interner.declare_classifier(
        ClassifierDecl::new("app.Recursive").with_flags(ClassifierFlags::MODULE),
    );
    let mut table = DeclarationTable::new();
    table
        .add_module_member(module, f.provider("app.Recursive.foo", f.ty(f.foo)))
        .add_module_member(module, f.provider("app.Recursive.self", f.ty(module)));
    let ctx = f.context(&table);
    let root = root_scope(&ctx, vec![f.provider("app.recursive", f.ty(module))]);

    let chains: Vec<String> = ctx
        .scope(root)
        .injectables()
        .iter()
        .map(|callable| callable.chain_name.to_string())
        .collect();
    assert_eq!(
        chains,
        vec!["app.recursive", "app.recursive.foo", "app.recursive.self"]
    );
}

#[test]
fn test_provide_function_value_contributes_invoke() {
    let f = Fixture::new();
    let table = DeclarationTable::new();
    let ctx = f.context(&table);
    let factory_type = f.interner.with_provide(
        f.interner
            .function_type(&[f.ty(f.baz)], f.ty(f.foo), CallContext::Default),
        true,
    );
    let root = root_scope(
        &ctx,
        vec![
            f.provider("app.fooFactory", factory_type),
            f.provider("app.baz", f.ty(f.baz)),
        ],
    );

    let injectables = ctx.scope(root).injectables();
    let invoke = injectables
        .iter()
        .find(|callable| callable.kind == CallableKind::FunctionInvoke)
        .expect("invoke candidate");
    assert_eq!(&*invoke.fq_name, "app.fooFactory.invoke");
    assert_eq!(invoke.ty, f.ty(f.foo));
    assert_eq!(invoke.dispatch_receiver(), Some(injectables[0].ty));

    let request = InjectableRequest::new(f.ty(f.foo), "app.run", "foo");
    let result = ctx.resolve_request(root, &request);
    assert_eq!(chosen(&ctx, &result).as_deref(), Some("app.fooFactory.invoke"));
}
