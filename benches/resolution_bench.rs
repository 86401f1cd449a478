//! Resolution benchmarks.
//!
//! Measures request resolution over a linear dependency chain and candidate
//! sorting among many equally visible providers.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use injekt::*;
use std::rc::Rc;

/// `n` classifiers where `T{i}` is provided by a function requiring `T{i-1}`.
fn chain_program(n: usize) -> (TypeInterner, DeclarationTable, Vec<TypeId>) {
    let interner = TypeInterner::new();
    let mut table = DeclarationTable::new();
    let mut types = Vec::with_capacity(n);
    for index in 0..n {
        let classifier =
            interner.declare_classifier(ClassifierDecl::new(format!("bench.T{index}")));
        let ty = interner.apply(classifier, []);
        let name = format!("bench.provide{index}");
        let mut provider = InjektCallable::new(DeclarationId(index as u32), &name, ty);
        if let Some(&previous) = types.last() {
            provider = provider.with_inject_parameter("previous", previous);
        }
        table.add_to_file(FileId(0), provider);
        types.push(ty);
    }
    (interner, table, types)
}

/// `n` providers of subtypes of one base type.
fn wide_program(n: usize) -> (TypeInterner, DeclarationTable, TypeId) {
    let interner = TypeInterner::new();
    let mut table = DeclarationTable::new();
    let base = interner.apply(interner.declare_classifier(ClassifierDecl::new("bench.Base")), []);
    let mut parent = base;
    for index in 0..n {
        let classifier =
            interner.declare_classifier(ClassifierDecl::new(format!("bench.Sub{index}")));
        interner.set_super_types(classifier, vec![parent]);
        let ty = interner.apply(classifier, []);
        table.add_to_file(
            FileId(0),
            InjektCallable::new(DeclarationId(index as u32), &format!("bench.sub{index}"), ty),
        );
        parent = ty;
    }
    (interner, table, base)
}

fn bench_dependency_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("dependency_chain");
    for n in [8usize, 32, 128] {
        let (interner, table, types) = chain_program(n);
        let Some(&last) = types.last() else { continue };
        let callee = Rc::new(
            InjektCallable::new(DeclarationId(u32::MAX - 1), "bench.main", TypeId::ANY)
                .with_inject_parameter("value", last),
        );
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |bench, _| {
            bench.iter(|| {
                let ctx = InjektContext::new(&interner, &table);
                let file = ctx.file_scope(&table, FileId(0));
                black_box(ctx.resolve_call(file, callee.clone()).is_success())
            });
        });
    }
    group.finish();
}

fn bench_specificity_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("specificity_sort");
    for n in [4usize, 16, 64] {
        let (interner, table, base) = wide_program(n);
        let request = InjectableRequest::new(base, "bench.main", "base");
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |bench, _| {
            bench.iter(|| {
                let ctx = InjektContext::new(&interner, &table);
                let file = ctx.file_scope(&table, FileId(0));
                black_box(ctx.resolve_request(file, &request).is_success())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_dependency_chain, bench_specificity_sort);
criterion_main!(benches);
