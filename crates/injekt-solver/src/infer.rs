//! Constraint-based inference for candidate type parameters.
//!
//! A [`TypeContext`] holds a set of static (already fixed) type parameters and
//! a set of free type variables. Relation checks that involve a free variable
//! are turned into LOWER/UPPER constraints on that variable. Constraints
//! propagate until a fixed point:
//! 1. a new constraint is checked against the variable's other constraints
//! 2. every other constraint mentioning the variable yields a derived,
//!    substituted constraint (`derived_from` blocks rederiving through the
//!    same variable)
//!
//! Variables are then fixed one at a time: first one whose nested variables
//! are all fixed, else the first remaining one. Failing checks are recorded as
//! soft errors and surfaced through [`TypeContext::is_ok`].

use crate::common_supertype::{common_super_type, intersect_types};
use crate::intern::TypeInterner;
use crate::substitute::TypeSubstitution;
use crate::subtype::{StaticChecker, TypeCheckerContext, is_equal_to, is_subtype_of};
use crate::types::*;
use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;
use tracing::trace;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    Lower,
    Upper,
    Equal,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConstraintPosition {
    FixVariable,
    DeclaredUpperBound,
    Unknown,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Constraint {
    pub type_variable: ClassifierId,
    pub ty: TypeId,
    pub kind: ConstraintKind,
    pub position: ConstraintPosition,
    pub derived_from: SmallVec<[ClassifierId; 2]>,
}

/// Soft inference errors.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeContextError {
    /// A relation check required by the constraints does not hold.
    ConstraintError {
        sub_type: TypeId,
        super_type: TypeId,
        kind: ConstraintKind,
    },
    /// Propagation did not reach a fixed point within the configured rounds.
    RoundsExceeded { rounds: u32 },
}

#[derive(Clone, Debug)]
pub struct VariableWithConstraints {
    pub type_variable: ClassifierId,
    pub constraints: Vec<Constraint>,
}

impl VariableWithConstraints {
    fn new(type_variable: ClassifierId) -> Self {
        VariableWithConstraints {
            type_variable,
            constraints: Vec::new(),
        }
    }

    /// Returns whether the constraint set changed. A LOWER and an UPPER
    /// constraint on the same type merge into one EQUAL constraint.
    fn add_constraint(&mut self, interner: &TypeInterner, constraint: Constraint) -> bool {
        for previous in self.constraints.clone() {
            if !interner.same_type(previous.ty, constraint.ty) {
                continue;
            }
            if previous.kind == ConstraintKind::Equal || previous.kind == constraint.kind {
                return false;
            }
            let matching = match previous.kind {
                ConstraintKind::Equal => true,
                ConstraintKind::Lower => constraint.kind == ConstraintKind::Upper,
                ConstraintKind::Upper => constraint.kind == ConstraintKind::Lower,
            };
            if matching {
                let actual = Constraint {
                    kind: ConstraintKind::Equal,
                    ..constraint
                };
                self.constraints
                    .retain(|existing| !interner.same_type(existing.ty, actual.ty));
                self.constraints.push(actual);
                return true;
            }
        }

        self.constraints.push(constraint);
        true
    }
}

/// Infer type variables in `candidate` so that `candidate <: super_type`.
pub fn run_candidate_inference<'a>(
    interner: &'a TypeInterner,
    candidate: TypeId,
    super_type: TypeId,
    static_type_parameters: &[ClassifierId],
    collect_super_type_variables: bool,
) -> TypeContext<'a> {
    let mut context = TypeContext::new(interner);
    for &parameter in static_type_parameters {
        context.add_static_type_parameter(parameter);
    }
    for &ty in interner.all_types(candidate).iter() {
        let classifier = interner.classifier_of(ty);
        if interner.is_type_parameter(classifier) {
            context.add_type_variable(classifier);
        }
    }
    if collect_super_type_variables {
        for &ty in interner.all_types(super_type).iter() {
            let classifier = interner.classifier_of(ty);
            if interner.is_type_parameter(classifier) {
                context.add_type_variable(classifier);
            }
        }
    }

    context.add_initial_subtype_constraint(candidate, super_type);
    context.fix_type_variables();
    trace!(
        candidate = candidate.0,
        super_type = super_type.0,
        ok = context.is_ok(),
        fixed = context.fixed_type_variables.len(),
        "candidate inference"
    );
    context
}

/// Infer the add-on type parameter in `constraint_type` from `candidate_type`.
/// The candidate's own type parameters stay static.
pub fn run_add_on_injectable_inference<'a>(
    interner: &'a TypeInterner,
    constraint_type: TypeId,
    candidate_type: TypeId,
    static_type_parameters: &[ClassifierId],
) -> TypeContext<'a> {
    let mut statics: Vec<ClassifierId> = Vec::new();
    for &ty in interner.all_types(candidate_type).iter() {
        let classifier = interner.classifier_of(ty);
        if interner.is_type_parameter(classifier) {
            statics.push(classifier);
        }
    }
    statics.extend_from_slice(static_type_parameters);
    run_candidate_inference(interner, candidate_type, constraint_type, &statics, true)
}

pub struct TypeContext<'a> {
    interner: &'a TypeInterner,
    static_type_parameters: Vec<ClassifierId>,
    type_variables: IndexMap<ClassifierId, VariableWithConstraints, FxBuildHasher>,
    pub fixed_type_variables: IndexMap<ClassifierId, TypeId, FxBuildHasher>,
    pub errors: IndexSet<TypeContextError, FxBuildHasher>,
    possible_new_constraints: Option<Vec<Constraint>>,
    position: ConstraintPosition,
    max_rounds: u32,
}

impl<'a> TypeCheckerContext<'a> for TypeContext<'a> {
    fn interner(&self) -> &'a TypeInterner {
        self.interner
    }

    fn is_denotable(&self, ty: TypeId) -> bool {
        !self
            .type_variables
            .contains_key(&self.interner.classifier_of(ty))
    }

    fn add_subtype_constraint(&mut self, sub_type: TypeId, super_type: TypeId) -> Option<bool> {
        let interner = self.interner;
        let mut answer = None;

        if self
            .type_variables
            .contains_key(&interner.classifier_of(super_type))
        {
            answer = Some(self.add_lower_constraint(super_type, sub_type));
        }

        if self
            .type_variables
            .contains_key(&interner.classifier_of(sub_type))
        {
            return Some(self.add_upper_constraint(sub_type, super_type) && answer.unwrap_or(true));
        }
        if let Some(source) = interner.source(sub_type) {
            let variable = interner.default_type(source);
            return Some(self.add_upper_constraint(variable, super_type) && answer.unwrap_or(true));
        }

        answer
    }
}

impl<'a> TypeContext<'a> {
    pub fn new(interner: &'a TypeInterner) -> Self {
        TypeContext {
            interner,
            static_type_parameters: Vec::new(),
            type_variables: IndexMap::default(),
            fixed_type_variables: IndexMap::default(),
            errors: IndexSet::default(),
            possible_new_constraints: None,
            position: ConstraintPosition::Unknown,
            max_rounds: interner.options().max_constraint_rounds,
        }
    }

    #[inline]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// The solution as a substitution over the fixed variables.
    pub fn substitution(&self) -> TypeSubstitution {
        TypeSubstitution::from_pairs(self.fixed_type_variables.iter().map(|(&k, &v)| (k, v)))
    }

    pub fn constraints_of(&self, type_variable: ClassifierId) -> &[Constraint] {
        self.type_variables
            .get(&type_variable)
            .map(|variable| variable.constraints.as_slice())
            .unwrap_or(&[])
    }

    pub fn add_static_type_parameter(&mut self, parameter: ClassifierId) {
        self.static_type_parameters
            .push(self.interner.canonical(parameter));
    }

    /// Register a free variable and seed its declared bounds, except the
    /// universal `Any?` bound.
    pub fn add_type_variable(&mut self, parameter: ClassifierId) {
        let parameter = self.interner.canonical(parameter);
        if self.static_type_parameters.contains(&parameter) {
            return;
        }
        self.type_variables
            .insert(parameter, VariableWithConstraints::new(parameter));
        let variable = self.interner.default_type(parameter);
        let bounds = self.interner.classifier_super_types(parameter);
        for &bound in bounds.iter() {
            if bound != TypeId::NULLABLE_ANY {
                self.position = ConstraintPosition::DeclaredUpperBound;
                self.add_initial_subtype_constraint(variable, bound);
                self.position = ConstraintPosition::Unknown;
            }
        }
    }

    pub fn add_initial_subtype_constraint(&mut self, sub_type: TypeId, super_type: TypeId) {
        self.run_is_subtype_of(sub_type, super_type);
        self.process_constraints();
    }

    fn add_initial_equality_constraint(&mut self, a: TypeId, b: TypeId) {
        let interner = self.interner;
        let (type_variable, equal_type) = if interner.is_type_parameter(interner.classifier_of(a)) {
            (a, b)
        } else if interner.is_type_parameter(interner.classifier_of(b)) {
            (b, a)
        } else {
            return;
        };

        self.add_possible_new_constraint(Constraint {
            type_variable: interner.classifier_of(type_variable),
            ty: equal_type,
            kind: ConstraintKind::Equal,
            position: ConstraintPosition::FixVariable,
            derived_from: SmallVec::new(),
        });
        self.process_constraints();
    }

    fn add_possible_new_constraint(&mut self, constraint: Constraint) {
        self.possible_new_constraints
            .get_or_insert_with(Vec::new)
            .push(constraint);
    }

    fn process_constraints(&mut self) {
        let interner = self.interner;
        let mut rounds = 0u32;
        while self.possible_new_constraints.is_some() {
            if !self.is_ok() {
                break;
            }
            let Some(batch) = self.possible_new_constraints.take() else {
                break;
            };
            rounds += 1;
            if rounds > self.max_rounds {
                self.errors
                    .insert(TypeContextError::RoundsExceeded { rounds: self.max_rounds });
                break;
            }

            let mut any_added = false;
            for constraint in batch {
                if self.should_skip_constraint(&constraint) {
                    continue;
                }
                let Some(variable) = self.type_variables.get_mut(&constraint.type_variable) else {
                    continue;
                };
                let was_added = variable.add_constraint(interner, constraint.clone());
                any_added = any_added || was_added;
                if was_added {
                    self.direct_with_variable(constraint.type_variable, &constraint);
                    self.inside_other_constraint(constraint.type_variable, &constraint);
                }
            }
            if !any_added {
                break;
            }
        }
    }

    fn should_skip_constraint(&self, constraint: &Constraint) -> bool {
        if constraint.kind == ConstraintKind::Equal {
            return false;
        }
        let interner = self.interner;
        if interner.classifier_of(constraint.ty) == constraint.type_variable {
            return !(interner.is_marked_nullable(constraint.ty)
                && constraint.kind == ConstraintKind::Lower);
        }
        constraint.position == ConstraintPosition::DeclaredUpperBound
            && constraint.kind == ConstraintKind::Upper
            && interner.same_type(constraint.ty, TypeId::NULLABLE_ANY)
    }

    pub fn fix_type_variables(&mut self) {
        while self.is_ok() {
            let unfixed: Vec<ClassifierId> = self
                .type_variables
                .keys()
                .copied()
                .filter(|variable| !self.fixed_type_variables.contains_key(variable))
                .collect();
            let Some(&first) = unfixed.first() else {
                break;
            };
            let to_fix = unfixed
                .iter()
                .copied()
                .find(|&variable| {
                    self.nested_type_variables(variable)
                        .iter()
                        .all(|&nested| {
                            self.fixed_type_variables
                                .contains_key(&self.interner.classifier_of(nested))
                        })
                })
                .unwrap_or(first);
            self.fix_variable(to_fix);
        }
    }

    fn fix_variable(&mut self, type_variable: ClassifierId) {
        let interner = self.interner;
        let ty = self.get_fixed_type(type_variable);
        trace!(
            variable = %interner.fq_name(type_variable),
            fixed_type = ty.0,
            "fix type variable"
        );

        self.add_initial_equality_constraint(interner.default_type(type_variable), ty);

        let fixed: Vec<ClassifierId> = self.fixed_type_variables.keys().copied().collect();
        for (&other, variable) in self.type_variables.iter_mut() {
            if other == type_variable || fixed.contains(&other) {
                continue;
            }
            variable.constraints.retain(|constraint| {
                !interner.any_type(constraint.ty, &mut |nested: TypeId| {
                    interner.classifier_of(nested) == type_variable
                })
            });
        }

        self.fixed_type_variables
            .insert(type_variable, interner.erase_sources(ty));
    }

    fn get_fixed_type(&mut self, type_variable: ClassifierId) -> TypeId {
        let equal: Vec<TypeId> = self
            .constraints_of(type_variable)
            .iter()
            .filter(|constraint| constraint.kind == ConstraintKind::Equal)
            .map(|constraint| constraint.ty)
            .collect();
        if let Some(representative) = self.single_best_representative(&equal) {
            return representative;
        }

        let sub_type = self.find_sub_type(type_variable);
        let super_type = self.find_super_type(type_variable);
        if let Some(result) = self.result_type(sub_type, super_type, type_variable) {
            return result;
        }

        TypeId::NULLABLE_ANY
    }

    fn result_type(
        &mut self,
        first: Option<TypeId>,
        second: Option<TypeId>,
        type_variable: ClassifierId,
    ) -> Option<TypeId> {
        let (first, second) = match (first, second) {
            (Some(first), Some(second)) => (first, second),
            (first, second) => return first.or(second),
        };
        if self.is_suitable_type(first, type_variable) {
            return Some(first);
        }
        if self.is_suitable_type(second, type_variable) {
            Some(second)
        } else {
            Some(first)
        }
    }

    fn is_suitable_type(&mut self, result: TypeId, type_variable: ClassifierId) -> bool {
        if self.interner.classifier_of(result) == ClassifierId::NOTHING {
            return false;
        }
        let constraints = self.constraints_of(type_variable).to_vec();
        for constraint in constraints {
            if !self.check_constraint(constraint.ty, constraint.kind, result) {
                return false;
            }
        }
        true
    }

    fn check_constraint(
        &mut self,
        constraint_type: TypeId,
        kind: ConstraintKind,
        result: TypeId,
    ) -> bool {
        match kind {
            ConstraintKind::Equal => is_equal_to(self, constraint_type, result),
            ConstraintKind::Lower => is_subtype_of(self, constraint_type, result),
            ConstraintKind::Upper => is_subtype_of(self, result, constraint_type),
        }
    }

    fn find_super_type(&mut self, type_variable: ClassifierId) -> Option<TypeId> {
        let upper: Vec<TypeId> = self
            .constraints_of(type_variable)
            .iter()
            .filter(|constraint| constraint.kind == ConstraintKind::Upper)
            .map(|constraint| constraint.ty)
            .collect();
        if upper.is_empty() {
            return None;
        }
        Some(intersect_types(self, &upper))
    }

    fn find_sub_type(&mut self, type_variable: ClassifierId) -> Option<TypeId> {
        let lower: Vec<TypeId> = self
            .constraints_of(type_variable)
            .iter()
            .filter(|constraint| constraint.kind == ConstraintKind::Lower)
            .map(|constraint| constraint.ty)
            .collect();
        if lower.is_empty() {
            return None;
        }
        Some(common_super_type(self, &lower))
    }

    fn single_best_representative(&self, types: &[TypeId]) -> Option<TypeId> {
        if let [single] = types {
            return Some(*single);
        }
        let mut checker = StaticChecker::new(self.interner);
        types.iter().copied().find(|&candidate| {
            types
                .iter()
                .all(|&other| is_equal_to(&mut checker, candidate, other))
        })
    }

    fn nested_type_variables(&self, type_variable: ClassifierId) -> Vec<TypeId> {
        let interner = self.interner;
        let mut nested = Vec::new();
        for constraint in self.constraints_of(type_variable) {
            for &ty in interner.all_types(constraint.ty).iter() {
                if self.type_variables.contains_key(&interner.classifier_of(ty)) {
                    nested.push(ty);
                }
            }
        }
        nested
    }

    fn add_upper_constraint(&mut self, type_variable: TypeId, super_type: TypeId) -> bool {
        let interner = self.interner;
        self.add_possible_new_constraint(Constraint {
            type_variable: interner.classifier_of(type_variable),
            ty: super_type,
            kind: ConstraintKind::Upper,
            position: self.position,
            derived_from: SmallVec::new(),
        });

        if interner.is_marked_nullable(type_variable) {
            return self
                .type_variables
                .contains_key(&interner.classifier_of(super_type))
                || is_subtype_of(self, TypeId::NULLABLE_NOTHING, super_type);
        }
        true
    }

    fn add_lower_constraint(&mut self, type_variable: TypeId, sub_type: TypeId) -> bool {
        let interner = self.interner;
        self.add_possible_new_constraint(Constraint {
            type_variable: interner.classifier_of(type_variable),
            ty: sub_type,
            kind: ConstraintKind::Lower,
            position: ConstraintPosition::Unknown,
            derived_from: SmallVec::new(),
        });
        true
    }

    fn direct_with_variable(&mut self, type_variable: ClassifierId, constraint: &Constraint) {
        if constraint.kind != ConstraintKind::Lower {
            for other in self.constraints_of(type_variable).to_vec() {
                if !self.is_ok() {
                    break;
                }
                if other.kind != ConstraintKind::Upper {
                    self.run_is_subtype_of(other.ty, constraint.ty);
                }
            }
        }

        if constraint.kind != ConstraintKind::Upper {
            for other in self.constraints_of(type_variable).to_vec() {
                if !self.is_ok() {
                    break;
                }
                if other.kind != ConstraintKind::Lower {
                    self.run_is_subtype_of(constraint.ty, other.ty);
                }
            }
        }
    }

    fn inside_other_constraint(&mut self, type_variable: ClassifierId, constraint: &Constraint) {
        let interner = self.interner;
        let mut affected: Vec<(ClassifierId, Constraint)> = Vec::new();
        for (&target, variable) in self.type_variables.iter() {
            for base in &variable.constraints {
                if interner.any_type(base.ty, &mut |nested: TypeId| {
                    interner.classifier_of(nested) == type_variable
                }) {
                    affected.push((target, base.clone()));
                }
            }
        }
        for (target, base) in affected {
            if !self.is_ok() {
                break;
            }
            self.generate_new_constraint(target, &base, type_variable, constraint);
        }
    }

    fn run_is_subtype_of(&mut self, sub_type: TypeId, super_type: TypeId) {
        if !is_subtype_of(self, sub_type, super_type) {
            self.errors.insert(TypeContextError::ConstraintError {
                sub_type,
                super_type,
                kind: ConstraintKind::Upper,
            });
        }
    }

    fn generate_new_constraint(
        &mut self,
        target: ClassifierId,
        base: &Constraint,
        other_variable: ClassifierId,
        other: &Constraint,
    ) {
        let interner = self.interner;
        let replacement = match other.kind {
            ConstraintKind::Equal => other.ty,
            ConstraintKind::Upper => {
                interner.with_source(other.ty, Variance::Out, Some(other_variable))
            }
            ConstraintKind::Lower => {
                interner.with_source(other.ty, Variance::In, Some(other_variable))
            }
        };
        let substitution = TypeSubstitution::from_pairs([(other_variable, replacement)]);
        let substituted = interner.substitute(base.ty, &substitution);
        if base.kind != ConstraintKind::Lower {
            self.add_new_constraint(
                target,
                base,
                other_variable,
                other,
                substituted,
                ConstraintKind::Upper,
            );
        }
        if base.kind != ConstraintKind::Upper {
            self.add_new_constraint(
                target,
                base,
                other_variable,
                other,
                substituted,
                ConstraintKind::Lower,
            );
        }
    }

    fn add_new_constraint(
        &mut self,
        target: ClassifierId,
        base: &Constraint,
        other_variable: ClassifierId,
        other: &Constraint,
        ty: TypeId,
        kind: ConstraintKind,
    ) {
        let mut derived_from = base.derived_from.clone();
        for &variable in &other.derived_from {
            if !derived_from.contains(&variable) {
                derived_from.push(variable);
            }
        }
        if derived_from.contains(&other_variable) {
            return;
        }
        derived_from.push(other_variable);
        self.add_possible_new_constraint(Constraint {
            type_variable: target,
            ty,
            kind,
            position: ConstraintPosition::Unknown,
            derived_from,
        });
    }
}
