//! Common supertype and intersection of type lists.
//!
//! The algorithm:
//! - strips nullability from mixed lists, computes on the non-null types and
//!   restores nullability unless the result is a type parameter
//! - keeps the classifiers present in every operand's supertype closure and
//!   drops those subsumed by a more specific shared classifier
//! - computes each type argument recursively with a depth budget so recursive
//!   generic definitions collapse to `*` instead of recursing forever
//!
//! Internal operations return `None` when the inputs have no common shape (an
//! empty list, or no shared classifier). The public entry points map that to
//! the universal top type, while [`try_common_super_type`] exposes it.

use crate::intern::TypeInterner;
use crate::subtype::{StaticChecker, TypeCheckerContext, is_equal_to, is_subtype_of};
use crate::types::*;
use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;

type OrderedSet<T> = IndexSet<T, FxBuildHasher>;

/// Common supertype of `types`, or `Any?` when none can be formed.
pub fn common_super_type<'a, C>(ctx: &mut C, types: &[TypeId]) -> TypeId
where
    C: TypeCheckerContext<'a> + ?Sized,
{
    try_common_super_type(ctx, types).unwrap_or(TypeId::NULLABLE_ANY)
}

/// Common supertype of `types`, or `None` when the list is empty or the
/// operands share no classifier.
pub fn try_common_super_type<'a, C>(ctx: &mut C, types: &[TypeId]) -> Option<TypeId>
where
    C: TypeCheckerContext<'a> + ?Sized,
{
    let interner = ctx.interner();
    let depth = -types
        .iter()
        .map(|&ty| interner.type_depth(ty))
        .max()
        .unwrap_or(0);
    common_super_type_at(ctx, types, depth)
}

/// Intersection of `types`, or `Any?` when none can be formed.
pub fn intersect_types<'a, C>(ctx: &mut C, types: &[TypeId]) -> TypeId
where
    C: TypeCheckerContext<'a> + ?Sized,
{
    try_intersect_types(ctx, types).unwrap_or(TypeId::NULLABLE_ANY)
}

fn common_super_type_at<'a, C>(ctx: &mut C, types: &[TypeId], depth: i32) -> Option<TypeId>
where
    C: TypeCheckerContext<'a> + ?Sized,
{
    if let [single] = types {
        return Some(*single);
    }
    let interner = ctx.interner();
    let any_nullable = types.iter().any(|&ty| interner.is_nullable_type(ty));
    let not_null: Vec<TypeId> = if any_nullable {
        types
            .iter()
            .map(|&ty| interner.with_nullability(ty, false))
            .collect()
    } else {
        types.to_vec()
    };

    let common = common_super_type_for_not_null_types(ctx, &not_null, depth)?;
    if any_nullable && !interner.is_type_parameter(interner.classifier_of(common)) {
        Some(interner.with_nullability(common, true))
    } else {
        Some(common)
    }
}

fn uniquify<'a, C>(ctx: &mut C, types: &[TypeId]) -> Vec<TypeId>
where
    C: TypeCheckerContext<'a> + ?Sized,
{
    let mut unique: Vec<TypeId> = Vec::new();
    for &ty in types {
        let mut is_new = true;
        for &existing in &unique {
            if is_equal_to(ctx, existing, ty) {
                is_new = false;
                break;
            }
        }
        if is_new {
            unique.push(ty);
        }
    }
    unique
}

/// Keeps every `upper` for which no other element `lower` satisfies
/// `predicate(lower, upper)`.
fn filter_types<'a, C>(
    ctx: &mut C,
    types: &[TypeId],
    predicate: impl Fn(&mut C, TypeId, TypeId) -> bool,
) -> Vec<TypeId>
where
    C: TypeCheckerContext<'a> + ?Sized,
{
    let mut kept = Vec::with_capacity(types.len());
    for (upper_index, &upper) in types.iter().enumerate() {
        let mut dominated = false;
        for (lower_index, &lower) in types.iter().enumerate() {
            if lower_index != upper_index && predicate(ctx, lower, upper) {
                dominated = true;
                break;
            }
        }
        if !dominated {
            kept.push(upper);
        }
    }
    kept
}

fn common_super_type_for_not_null_types<'a, C>(
    ctx: &mut C,
    types: &[TypeId],
    depth: i32,
) -> Option<TypeId>
where
    C: TypeCheckerContext<'a> + ?Sized,
{
    match types {
        [] => return None,
        [single] => return Some(*single),
        _ => {}
    }

    let unique = uniquify(ctx, types);
    if let [single] = unique.as_slice() {
        return Some(*single);
    }

    // Operands below another operand are covered by it.
    let explicit_super_types = filter_types(ctx, &unique, |ctx, other, candidate| {
        is_subtype_of(ctx, candidate, other)
    });
    if let [single] = explicit_super_types.as_slice() {
        return Some(*single);
    }

    let interner = ctx.interner();
    let classifiers = all_common_super_type_classifiers(interner, &explicit_super_types);
    let mut candidates = Vec::with_capacity(classifiers.len());
    for classifier in classifiers {
        candidates.push(super_type_with_classifier(
            ctx,
            &explicit_super_types,
            classifier,
            depth,
        )?);
    }
    try_intersect_types(ctx, &candidates)
}

fn collect_all_super_type_classifiers(
    interner: &TypeInterner,
    ty: TypeId,
) -> OrderedSet<ClassifierId> {
    let mut classifiers = OrderedSet::default();
    interner.any_super_type(ty, &mut |super_type: TypeId| {
        classifiers.insert(interner.classifier_of(super_type));
        false
    });
    classifiers
}

fn all_common_super_type_classifiers(
    interner: &TypeInterner,
    types: &[TypeId],
) -> Vec<ClassifierId> {
    let Some((&first, rest)) = types.split_first() else {
        return Vec::new();
    };
    let mut result = collect_all_super_type_classifiers(interner, first);
    for &ty in rest {
        let other = collect_all_super_type_classifiers(interner, ty);
        result.retain(|classifier| other.contains(classifier));
    }

    // A classifier with a more specific shared subclassifier is less precise.
    result
        .iter()
        .copied()
        .filter(|&target| {
            !result.iter().any(|&other| {
                other != target
                    && interner
                        .classifier_super_types(other)
                        .iter()
                        .any(|&super_type| interner.classifier_of(super_type) == target)
            })
        })
        .collect()
}

fn super_type_with_classifier<'a, C>(
    ctx: &mut C,
    types: &[TypeId],
    classifier: ClassifierId,
    depth: i32,
) -> Option<TypeId>
where
    C: TypeCheckerContext<'a> + ?Sized,
{
    let interner = ctx.interner();
    let type_parameters = interner.classifier(classifier).type_parameters.clone();
    if type_parameters.is_empty() {
        return Some(interner.default_type(classifier));
    }

    let views: Vec<Option<TypeId>> = types
        .iter()
        .map(|&ty| interner.subtype_view(ty, classifier))
        .collect();

    let mut arguments = TypeArgs::new();
    for (index, &parameter) in type_parameters.iter().enumerate() {
        let mut there_is_star = false;
        let mut type_arguments = Vec::with_capacity(views.len());
        for view in views.iter().flatten() {
            let Some(&argument) = interner.arguments(*view).get(index) else {
                continue;
            };
            if interner.is_star(argument) {
                there_is_star = true;
            } else {
                type_arguments.push(argument);
            }
        }

        let argument = if there_is_star || type_arguments.is_empty() {
            TypeId::STAR
        } else {
            let calculated = calculate_argument(ctx, parameter, &type_arguments, depth)?;
            collapse_recursive_argument(interner, calculated, classifier)
        };
        arguments.push(argument);
    }
    Some(interner.with_arguments(interner.base_type(classifier), arguments))
}

/// `out Self<...>` inside `Self` collapses to `*`.
fn collapse_recursive_argument(
    interner: &TypeInterner,
    argument: TypeId,
    classifier: ClassifierId,
) -> TypeId {
    if interner.is_star(argument) {
        return argument;
    }
    if interner.variance_of(argument) == Variance::Out
        && interner.classifier_of(argument) == classifier
    {
        TypeId::STAR
    } else {
        argument
    }
}

fn calculate_argument<'a, C>(
    ctx: &mut C,
    parameter: ClassifierId,
    arguments: &[TypeId],
    depth: i32,
) -> Option<TypeId>
where
    C: TypeCheckerContext<'a> + ?Sized,
{
    if depth > 0 {
        return Some(TypeId::STAR);
    }
    let interner = ctx.interner();
    let parameter_variance = interner.classifier(parameter).variance;
    let first = *arguments.first()?;

    if parameter_variance == Variance::Invariant
        && arguments
            .iter()
            .all(|&argument| interner.variance_of(argument) == Variance::Invariant)
        && arguments
            .iter()
            .all(|&argument| interner.same_type(argument, first))
    {
        return Some(first);
    }

    let as_out = if parameter_variance != Variance::Invariant {
        parameter_variance == Variance::Out
    } else {
        let there_is_out = arguments
            .iter()
            .any(|&argument| interner.variance_of(argument) == Variance::Out);
        let there_is_in = arguments
            .iter()
            .any(|&argument| interner.variance_of(argument) == Variance::In);
        if there_is_out {
            if there_is_in {
                return Some(TypeId::STAR);
            }
            true
        } else {
            !there_is_in
        }
    };

    if as_out {
        if parameter_variance != Variance::Invariant {
            return common_super_type_at(ctx, arguments, depth + 1);
        }

        let mut equal_to_each_other = None;
        for &potential in arguments {
            let mut all_equal = true;
            for &argument in arguments {
                if !is_equal_to(ctx, argument, potential) {
                    all_equal = false;
                    break;
                }
            }
            if all_equal {
                equal_to_each_other = Some(potential);
                break;
            }
        }

        match equal_to_each_other {
            None => {
                let common = common_super_type_at(ctx, arguments, depth + 1)?;
                Some(interner.with_variance(common, Variance::Out))
            }
            Some(equal) => {
                let there_is_not_inv = arguments
                    .iter()
                    .any(|&argument| interner.variance_of(argument) != Variance::Invariant);
                let variance = if there_is_not_inv {
                    Variance::Out
                } else {
                    Variance::Invariant
                };
                Some(interner.with_variance(equal, variance))
            }
        }
    } else {
        let intersected = try_intersect_types(ctx, arguments)?;
        if parameter_variance != Variance::Invariant {
            Some(intersected)
        } else {
            Some(interner.with_variance(intersected, Variance::In))
        }
    }
}

pub(crate) fn try_intersect_types<'a, C>(ctx: &mut C, types: &[TypeId]) -> Option<TypeId>
where
    C: TypeCheckerContext<'a> + ?Sized,
{
    match types {
        [] => return None,
        [single] => return Some(*single),
        _ => {}
    }
    let interner = ctx.interner();
    let nullable = types.iter().any(|&ty| interner.is_nullable_type(ty));
    let adjusted: OrderedSet<TypeId> = types
        .iter()
        .map(|&ty| interner.with_nullability(ty, nullable))
        .collect();
    let adjusted: Vec<TypeId> = adjusted.into_iter().collect();
    if let [single] = adjusted.as_slice() {
        return Some(*single);
    }

    let without_super_types = filter_types(ctx, &adjusted, |ctx, lower, upper| {
        is_strict_super_type(ctx.interner(), lower, upper)
    });
    let without_equal = filter_types(ctx, &without_super_types, |ctx, lower, upper| {
        is_equal_to(ctx, lower, upper)
    });

    match without_equal.as_slice() {
        [] => None,
        [single] => Some(*single),
        many => {
            if many.iter().all(|&ty| !interner.is_nullable_type(ty)) {
                Some(TypeId::ANY)
            } else {
                Some(TypeId::NULLABLE_ANY)
            }
        }
    }
}

fn is_strict_super_type(interner: &TypeInterner, sub_type: TypeId, super_type: TypeId) -> bool {
    let mut checker = StaticChecker::new(interner);
    is_subtype_of(&mut checker, sub_type, super_type)
        && !is_subtype_of(&mut checker, super_type, sub_type)
}

impl TypeInterner {
    /// Common supertype without type variables.
    pub fn common_super_type(&self, types: &[TypeId]) -> TypeId {
        common_super_type(&mut StaticChecker::new(self), types)
    }

    /// Common supertype without type variables; `None` when no common shape
    /// exists.
    pub fn try_common_super_type(&self, types: &[TypeId]) -> Option<TypeId> {
        try_common_super_type(&mut StaticChecker::new(self), types)
    }

    pub fn intersect_types(&self, types: &[TypeId]) -> TypeId {
        intersect_types(&mut StaticChecker::new(self), types)
    }
}
