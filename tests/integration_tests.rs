//! End-to-end resolution tests through the `injekt` facade.
//!
//! These build declarations the way a host would: classifiers in the
//! interner, top-level candidates in a `DeclarationTable`, scopes through the
//! factories, then resolve call sites.

use injekt::*;
use std::io::Write;
use std::rc::Rc;

struct Program {
    interner: TypeInterner,
    a: TypeId,
    b: TypeId,
    logger: TypeId,
    next_declaration: u32,
}

impl Program {
    fn new(options: ResolverOptions) -> Self {
        let interner = TypeInterner::with_options(options);
        let a = interner.apply(interner.declare_classifier(ClassifierDecl::new("app.A")), []);
        let b = interner.apply(interner.declare_classifier(ClassifierDecl::new("app.B")), []);
        let logger =
            interner.apply(interner.declare_classifier(ClassifierDecl::new("app.Logger")), []);
        Program {
            interner,
            a,
            b,
            logger,
            next_declaration: 0,
        }
    }

    fn declaration(&mut self) -> DeclarationId {
        self.next_declaration += 1;
        DeclarationId(self.next_declaration)
    }

    fn provider(&mut self, fq_name: &str, ty: TypeId) -> InjektCallable {
        InjektCallable::new(self.declaration(), fq_name, ty)
    }

    fn function(&mut self, fq_name: &str, provided: Vec<InjektCallable>) -> FunctionScopeDecl {
        FunctionScopeDecl {
            id: self.declaration(),
            fq_name: fq_name.to_string(),
            is_constructor: false,
            type_parameters: Vec::new(),
            provided_parameters: provided,
            call_context: CallContext::Default,
        }
    }
}

fn chosen(ctx: &InjektContext<'_>, result: &ResolutionResult) -> Option<String> {
    let candidate = result.candidate()?;
    match ctx.injectable(candidate).as_ref() {
        Injectable::Callable(injectable) => Some(injectable.callable.fq_name.to_string()),
        other => Some(other.chain_name().to_string()),
    }
}

#[test]
fn test_global_file_function_chain_resolves() {
    let mut program = Program::new(ResolverOptions::default());
    let (a, b) = (program.a, program.b);
    let provide_a = program.provider("lib.provideA", a);
    let provide_b = program
        .provider("app.provideB", b)
        .with_inject_parameter("a", a);
    let mut table = DeclarationTable::new();
    table
        .add_external(provide_a)
        .add_to_file(FileId(0), provide_b);

    let unrelated = program.provider("app.main.logger", program.logger);
    let function = program.function("app.main", vec![unrelated]);
    let callee = Rc::new(program.provider("app.useB", TypeId::ANY).with_inject_parameter("b", b));

    let ctx = InjektContext::new(&program.interner, &table);
    let file = ctx.file_scope(&table, FileId(0));
    let scope = ctx.function_scope(file, &function);
    let result = ctx.resolve_call(scope, callee);

    let InjectionResult::Success { results, .. } = &result else {
        panic!("expected success, got {:?}", result.render(&ctx));
    };
    let (_, b_result) = results.first().expect("b");
    assert_eq!(chosen(&ctx, b_result).as_deref(), Some("app.provideB"));

    let function_scope = ctx.scope(scope);
    assert!(function_scope.cached_result(a).is_some());
    assert!(function_scope.cached_result(b).is_some());
}

#[test]
fn test_function_logger_shadows_file_logger() {
    let mut program = Program::new(ResolverOptions::default());
    let logger = program.logger;
    let mut table = DeclarationTable::new();
    table.add_to_file(FileId(0), program.provider("app.fileLogger", logger));

    let local = program
        .provider("app.main.logger", logger)
        .with_kind(CallableKind::Parameter);
    let function = program.function("app.main", vec![local]);
    let callee = Rc::new(
        program
            .provider("app.log", TypeId::ANY)
            .with_inject_parameter("logger", logger),
    );

    let ctx = InjektContext::new(&program.interner, &table);
    let scope = ctx.function_scope(ctx.file_scope(&table, FileId(0)), &function);
    let result = ctx.resolve_call(scope, callee);
    let InjectionResult::Success { results, .. } = &result else {
        panic!("expected success");
    };
    let (_, logger_result) = results.first().expect("logger");
    assert_eq!(chosen(&ctx, logger_result).as_deref(), Some("app.main.logger"));
}

#[test]
fn test_self_requiring_constructor_diverges() {
    let mut program = Program::new(ResolverOptions::default());
    let foo = program
        .interner
        .apply(program.interner.declare_classifier(ClassifierDecl::new("app.Foo")), []);
    let constructor = program
        .provider("app.Foo", foo)
        .with_kind(CallableKind::Constructor)
        .with_inject_parameter("foo", foo);
    let mut table = DeclarationTable::new();
    table.add_to_file(FileId(0), constructor);
    let callee = Rc::new(
        program
            .provider("app.main", TypeId::ANY)
            .with_inject_parameter("foo", foo),
    );

    let ctx = InjektContext::new(&program.interner, &table);
    let file = ctx.file_scope(&table, FileId(0));
    let result = ctx.resolve_call(file, callee);
    let (_, leaf) = result.unwrapped_failure().expect("failure");
    assert!(matches!(leaf, Failure::DivergentInjectable { .. }));
    let message = result.render(&ctx).expect("message");
    assert!(message.contains("produces a diverging search"));
}

#[test]
fn test_results_do_not_leak_between_call_sites() {
    let mut program = Program::new(ResolverOptions::default());
    let (a, b) = (program.a, program.b);
    let mut table = DeclarationTable::new();
    table
        .add_to_file(FileId(0), program.provider("app.a", a))
        .add_to_file(FileId(0), program.provider("app.b", b));
    let first = Rc::new(program.provider("app.first", TypeId::ANY).with_inject_parameter("a", a));
    let second = Rc::new(program.provider("app.second", TypeId::ANY).with_inject_parameter("b", b));
    let again = Rc::new(program.provider("app.again", TypeId::ANY).with_inject_parameter("a", a));

    let ctx = InjektContext::new(&program.interner, &table);
    let file = ctx.file_scope(&table, FileId(0));
    let first_result = ctx.resolve_call(file, first);
    assert!(first_result.is_success());
    let first_a = ctx.scope(file).cached_result(a).expect("a cached by the first call");

    assert!(ctx.resolve_call(file, second).is_success());
    assert!(ctx.scope(file).cached_result(a).is_none());
    assert!(ctx.scope(file).cached_result(b).is_some());

    assert!(ctx.resolve_call(file, again).is_success());
    let again_a = ctx.scope(file).cached_result(a).expect("a cached by the third call");
    assert!(!Rc::ptr_eq(&first_a, &again_a));
    assert!(ctx.scope(file).cached_result(b).is_none());
}

#[test]
fn test_common_supertype_of_lists_is_a_list() {
    let program = Program::new(ResolverOptions::default());
    let interner = &program.interner;
    let list_a = interner.list_type(program.a);
    let list_b = interner.list_type(program.b);
    let common = interner.common_super_type(&[list_a, list_b]);
    assert_eq!(interner.classifier_of(common), interner.builtins().list);
}

#[test]
fn test_options_file_round_trip() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(file, r#"{{"renderDepth": 3, "traceResolution": true}}"#).expect("write options");

    let options = load_options_file(file.path()).expect("options");
    assert_eq!(options.render_depth, 3);
    assert!(options.trace_resolution);
    assert_eq!(
        options.compare_type_depth,
        ResolverOptions::default().compare_type_depth
    );

    let program = Program::new(options);
    let nested = (0..5).fold(program.a, |element, _| program.interner.list_type(element));
    assert!(program.interner.render(nested).contains("..."));
}

#[test]
fn test_invalid_options_file_reports_path() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(file, r#"{{"compareTypeDepth": 0}}"#).expect("write options");
    let error = load_options_file(file.path()).expect_err("zero depth is rejected");
    let message = format!("{error:#}");
    assert!(message.contains("failed to load resolver options"));
    assert!(message.contains("compareTypeDepth"));

    let missing = load_options_file(std::path::Path::new("/nonexistent/injekt.json"));
    assert!(missing.is_err());
    assert_eq!(load_options(None).expect("defaults"), ResolverOptions::default());
}

#[test]
fn test_log_format_names() {
    assert_eq!(LogFormat::parse("tree"), LogFormat::Tree);
    assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
    assert_eq!(LogFormat::parse(""), LogFormat::Text);
    assert_eq!(LogFormat::parse("fancy"), LogFormat::Text);
}
