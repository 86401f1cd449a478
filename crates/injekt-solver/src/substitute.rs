//! Type substitution.
//!
//! Replaces classifier occurrences with bound types. A direct substitution
//! combines nullability and the provide flag with the replaced occurrence and
//! keeps the occurrence's variance only when the substitution is invariant.

use crate::intern::TypeInterner;
use crate::types::*;
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use std::rc::Rc;

/// Mapping from (canonical) classifiers to the types replacing them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeSubstitution {
    map: IndexMap<ClassifierId, TypeId, FxBuildHasher>,
}

impl TypeSubstitution {
    pub fn new() -> Self {
        TypeSubstitution::default()
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (ClassifierId, TypeId)>) -> Self {
        TypeSubstitution {
            map: pairs.into_iter().collect(),
        }
    }

    pub fn insert(&mut self, classifier: ClassifierId, ty: TypeId) {
        self.map.insert(classifier, ty);
    }

    #[inline]
    pub fn get(&self, classifier: ClassifierId) -> Option<TypeId> {
        self.map.get(&classifier).copied()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClassifierId, TypeId)> + '_ {
        self.map.iter().map(|(&classifier, &ty)| (classifier, ty))
    }
}

impl TypeInterner {
    pub fn substitute(&self, ty: TypeId, substitution: &TypeSubstitution) -> TypeId {
        if substitution.is_empty() {
            return ty;
        }
        let data = self.get(ty);
        if let Some(replacement) = substitution.get(data.classifier) {
            let with = self.get(replacement);
            let nullable = if data.star {
                with.nullable
            } else {
                data.nullable || with.nullable
            };
            let provide = data.provide || with.provide;
            let variance = if with.variance != Variance::Invariant {
                with.variance
            } else {
                data.variance
            };
            if nullable == with.nullable && provide == with.provide && variance == with.variance {
                return replacement;
            }
            return self.intern(TypeData {
                nullable,
                provide,
                variance,
                ..with
            });
        }

        if data.arguments.is_empty() {
            return ty;
        }
        let arguments: TypeArgs = data
            .arguments
            .iter()
            .map(|&argument| self.substitute(argument, substitution))
            .collect();
        self.with_arguments(ty, arguments)
    }

    /// Rebuild a type parameter list under `substitution`.
    ///
    /// The copies compute their supertypes lazily, so bounds that refer back
    /// into the list (`T : Comparable<T>`) are substituted on first use rather
    /// than eagerly.
    pub fn substitute_classifiers(
        &self,
        classifiers: &[ClassifierId],
        substitution: &TypeSubstitution,
    ) -> Vec<ClassifierId> {
        if substitution.is_empty() {
            return classifiers.to_vec();
        }
        let shared = Rc::new(substitution.clone());
        classifiers
            .iter()
            .map(|&classifier| {
                let original = self.canonical(classifier);
                let substitution = shared.clone();
                self.copy_classifier(
                    original,
                    Rc::new(move |interner: &TypeInterner| {
                        interner
                            .classifier_super_types(original)
                            .iter()
                            .map(|&super_type| interner.substitute(super_type, &substitution))
                            .collect()
                    }),
                )
            })
            .collect()
    }
}
