//! Candidate specificity.
//!
//! `Ordering::Less` means "more specific". Comparisons return `None` when the
//! comparator hits an inconsistency (no common supertype, recursion limit);
//! candidate sorting then keeps declaration order.

use crate::context::InjektContext;
use crate::injectable::{Injectable, InjectableId};
use injekt_common::{RecursionGuard, RecursionResult};
use injekt_solver::{ClassifierId, TypeId};
use rustc_hash::FxHashSet;
use std::cmp::Ordering;
use tracing::trace;

struct TypeComparison {
    compared: FxHashSet<(TypeId, TypeId)>,
    guard: RecursionGuard<(TypeId, TypeId)>,
}

impl InjektContext<'_> {
    /// Deeper owner scope first, then the dispatch-receiver tie-break, then
    /// the declared result types.
    pub fn compare_candidate(&self, a: InjectableId, b: InjectableId) -> Option<Ordering> {
        if a == b {
            return Some(Ordering::Equal);
        }
        let a = self.injectable(a);
        let b = self.injectable(b);

        let a_nesting = self.scope(a.owner_scope()).nesting;
        let b_nesting = self.scope(b.owner_scope()).nesting;
        match b_nesting.cmp(&a_nesting) {
            Ordering::Equal => {}
            unequal => return Some(unequal),
        }

        match (a.as_ref(), b.as_ref()) {
            (Injectable::Callable(a), Injectable::Callable(b)) => {
                let receivers = self.compare_dispatch_receivers(
                    a.callable.dispatch_receiver(),
                    b.callable.dispatch_receiver(),
                );
                if let Some(ordering) = receivers {
                    return Some(ordering);
                }
                self.compare_type(a.callable.original_type, b.callable.original_type)
            }
            (Injectable::Callable(_), _) => Some(Ordering::Less),
            (_, Injectable::Callable(_)) => Some(Ordering::Greater),
            _ => Some(Ordering::Equal),
        }
    }

    /// Members of a subclass win over members of its superclass.
    fn compare_dispatch_receivers(&self, a: Option<TypeId>, b: Option<TypeId>) -> Option<Ordering> {
        let interner = self.interner;
        let (a, b) = (a?, b?);
        let a_classifier: ClassifierId = interner.canonical(interner.classifier_of(a));
        let b_classifier: ClassifierId = interner.canonical(interner.classifier_of(b));
        if a_classifier == b_classifier {
            return None;
        }
        let a_base = interner.default_type(a_classifier);
        let b_base = interner.default_type(b_classifier);
        if interner.subtype_view(a_base, b_classifier).is_some() {
            return Some(Ordering::Less);
        }
        if interner.subtype_view(b_base, a_classifier).is_some() {
            return Some(Ordering::Greater);
        }
        None
    }

    pub fn compare_type(&self, a: TypeId, b: TypeId) -> Option<Ordering> {
        let depth = self.options().compare_type_depth;
        let mut comparison = TypeComparison {
            compared: FxHashSet::default(),
            guard: RecursionGuard::new(depth, injekt_common::limits::MAX_COMPARE_TYPE_ITERATIONS),
        };
        let result = self.compare_type_inner(a, b, &mut comparison);
        if result.is_none() {
            trace!(
                a = %self.interner.render(a),
                b = %self.interner.render(b),
                "inconsistent type comparison"
            );
        }
        result
    }

    fn compare_type_inner(
        &self,
        a: TypeId,
        b: TypeId,
        comparison: &mut TypeComparison,
    ) -> Option<Ordering> {
        let interner = self.interner;
        if interner.same_type(a, b) {
            return Some(Ordering::Equal);
        }

        let a_star = interner.is_star(a);
        let b_star = interner.is_star(b);
        if a_star != b_star {
            return Some(if b_star { Ordering::Less } else { Ordering::Greater });
        }

        let a_nullable = interner.is_marked_nullable(a);
        let b_nullable = interner.is_marked_nullable(b);
        if a_nullable != b_nullable {
            return Some(if b_nullable { Ordering::Less } else { Ordering::Greater });
        }

        let a_classifier = interner.classifier_of(a);
        let b_classifier = interner.classifier_of(b);
        let a_type_parameter = interner.is_type_parameter(a_classifier);
        let b_type_parameter = interner.is_type_parameter(b_classifier);
        if a_type_parameter != b_type_parameter {
            return Some(if b_type_parameter { Ordering::Less } else { Ordering::Greater });
        }

        if !comparison.compared.insert((a, b)) {
            return Some(Ordering::Equal);
        }
        match comparison.guard.enter((a, b)) {
            RecursionResult::Entered => {}
            RecursionResult::Cycle => return Some(Ordering::Equal),
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => return None,
        }
        let result = self.compare_distinct_types(a, b, comparison);
        comparison.guard.leave((a, b));
        result
    }

    fn compare_distinct_types(
        &self,
        a: TypeId,
        b: TypeId,
        comparison: &mut TypeComparison,
    ) -> Option<Ordering> {
        let interner = self.interner;
        let a_classifier = interner.canonical(interner.classifier_of(a));
        if a_classifier == interner.canonical(interner.classifier_of(b)) {
            let mut diff = 0i32;
            let arguments = interner.arguments(a).into_iter().zip(interner.arguments(b));
            for (a_argument, b_argument) in arguments {
                diff += match self.compare_type_inner(a_argument, b_argument, comparison)? {
                    Ordering::Less => -1,
                    Ordering::Equal => 0,
                    Ordering::Greater => 1,
                };
            }
            return Some(diff.cmp(&0));
        }

        let a_sub_type_of_b = interner.is_subtype_of(a, b);
        let b_sub_type_of_a = interner.is_subtype_of(b, a);
        if a_sub_type_of_b && !b_sub_type_of_a {
            return Some(Ordering::Less);
        }
        if b_sub_type_of_a && !a_sub_type_of_b {
            return Some(Ordering::Greater);
        }

        let a_common = self.common_super_type_of_super_types(a)?;
        let b_common = self.common_super_type_of_super_types(b)?;
        self.compare_type_inner(a_common, b_common, comparison)
    }

    fn common_super_type_of_super_types(&self, ty: TypeId) -> Option<TypeId> {
        let interner = self.interner;
        let super_types = interner.super_types(ty);
        if super_types.is_empty() {
            // Roots of the hierarchy stand for themselves.
            return Some(ty);
        }
        interner.try_common_super_type(&super_types)
    }
}
