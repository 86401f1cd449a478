//! Subtyping and type equality.
//!
//! Both relations are parameterized over a [`TypeCheckerContext`]. The plain
//! [`StaticChecker`] treats every type as denotable; the constraint solver's
//! `TypeContext` intercepts checks involving open type variables and records
//! constraints instead.

use crate::intern::TypeInterner;
use crate::types::*;

/// Hooks the solver uses to observe relation checks.
pub trait TypeCheckerContext<'a> {
    fn interner(&self) -> &'a TypeInterner;

    /// Types that are not open type variables compare structurally.
    fn is_denotable(&self, ty: TypeId) -> bool {
        let _ = ty;
        true
    }

    /// Returns `Some(answer)` when the check was turned into a constraint.
    fn add_subtype_constraint(&mut self, sub_type: TypeId, super_type: TypeId) -> Option<bool> {
        let _ = (sub_type, super_type);
        None
    }
}

/// Relation checks without type variables.
#[derive(Clone, Copy)]
pub struct StaticChecker<'a> {
    interner: &'a TypeInterner,
}

impl<'a> StaticChecker<'a> {
    pub fn new(interner: &'a TypeInterner) -> Self {
        StaticChecker { interner }
    }
}

impl<'a> TypeCheckerContext<'a> for StaticChecker<'a> {
    fn interner(&self) -> &'a TypeInterner {
        self.interner
    }
}

pub fn is_equal_to<'a, C>(ctx: &mut C, a: TypeId, b: TypeId) -> bool
where
    C: TypeCheckerContext<'a> + ?Sized,
{
    let interner = ctx.interner();
    if interner.same_type(a, b) {
        return true;
    }

    if ctx.is_denotable(a) && ctx.is_denotable(b) {
        let left = interner.get(a);
        let right = interner.get(b);
        if left.classifier != right.classifier || left.nullable != right.nullable {
            return false;
        }
        for (&left_argument, &right_argument) in left.arguments.iter().zip(right.arguments.iter()) {
            if interner.is_star(left_argument) && interner.is_star(right_argument) {
                continue;
            }
            let left_variance = interner.variance_of(left_argument);
            let right_variance = interner.variance_of(right_argument);
            if Variance::effective(left_variance, right_variance, Variance::Invariant)
                != Variance::effective(right_variance, left_variance, Variance::Invariant)
            {
                return false;
            }
            if !is_equal_to(ctx, left_argument, right_argument) {
                return false;
            }
        }
        return true;
    }

    is_subtype_of(ctx, a, b) && is_subtype_of(ctx, b, a)
}

pub fn is_subtype_of<'a, C>(ctx: &mut C, sub_type: TypeId, super_type: TypeId) -> bool
where
    C: TypeCheckerContext<'a> + ?Sized,
{
    let interner = ctx.interner();
    if interner.same_type(sub_type, super_type) {
        return true;
    }

    if let Some(answer) = ctx.add_subtype_constraint(sub_type, super_type) {
        return answer;
    }

    let sub = interner.get(sub_type);
    if sub.classifier == ClassifierId::NOTHING
        && (!sub.nullable || interner.is_nullable_type(super_type))
    {
        return true;
    }

    let sup = interner.get(super_type);
    if sup.classifier == ClassifierId::ANY
        && (sup.nullable || !interner.is_nullable_type(sub_type))
    {
        return true;
    }

    match interner.subtype_view(sub_type, sup.classifier) {
        Some(view) => is_subtype_of_same_classifier(ctx, view, super_type),
        None => false,
    }
}

fn is_subtype_of_same_classifier<'a, C>(ctx: &mut C, sub_type: TypeId, super_type: TypeId) -> bool
where
    C: TypeCheckerContext<'a> + ?Sized,
{
    let interner = ctx.interner();
    let sub = interner.get(sub_type);
    let sup = interner.get(super_type);
    if !sup.nullable && sub.nullable {
        return false;
    }

    let parameters = interner.classifier(sup.classifier).type_parameters.clone();
    let pairs = sub.arguments.iter().zip(sup.arguments.iter()).enumerate();
    for (index, (&argument, &parameter)) in pairs {
        if interner.is_star(parameter) {
            continue;
        }
        if interner.is_star(argument) {
            return false;
        }
        let declared = parameters
            .get(index)
            .map(|&type_parameter| interner.classifier(type_parameter).variance)
            .unwrap_or_default();
        let variance = Variance::effective(
            interner.variance_of(parameter),
            interner.variance_of(argument),
            declared,
        );
        let argument_ok = match variance {
            Variance::In => is_subtype_of(ctx, parameter, argument),
            Variance::Out => is_subtype_of(ctx, argument, parameter),
            Variance::Invariant => is_equal_to(ctx, argument, parameter),
        };
        if !argument_ok {
            return false;
        }
    }

    true
}

impl TypeInterner {
    /// `sub_type <: super_type` without type variables.
    pub fn is_subtype_of(&self, sub_type: TypeId, super_type: TypeId) -> bool {
        is_subtype_of(&mut StaticChecker::new(self), sub_type, super_type)
    }

    /// Structural equality without type variables.
    pub fn is_equal_to(&self, a: TypeId, b: TypeId) -> bool {
        is_equal_to(&mut StaticChecker::new(self), a, b)
    }
}
