//! Type interning and classifier arena.
//!
//! Converts `TypeData` structures into lightweight `TypeId` handles and owns
//! every classifier declared for the session. Derived views (`super_types`,
//! `all_types`, `is_nullable_type`, `subtype_view`) are memoized per `TypeId`.
//!
//! Benefits:
//! - O(1) structural type equality (compare `TypeId` values)
//! - Each unique structure stored once
//! - Derived views computed at most once per type
//!
//! Resolution is single-threaded, so interior mutability uses `RefCell`. No
//! borrow is held across a call that may re-enter the interner.

use crate::types::*;
use indexmap::IndexSet;
use injekt_common::{Atom, Interner, ResolverOptions};
use rustc_hash::{FxBuildHasher, FxHashMap};
use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

/// Deferred supertype computation for a classifier.
pub type LazySuperTypes = Rc<dyn Fn(&TypeInterner) -> Vec<TypeId>>;

enum SuperTypesSlot {
    Resolved(Arc<[TypeId]>),
    Lazy(LazySuperTypes),
    /// The thunk is running. A re-entrant read sees no supertypes.
    Computing,
}

#[derive(Default)]
struct DerivedViews {
    super_types: FxHashMap<TypeId, Arc<[TypeId]>>,
    all_types: FxHashMap<TypeId, Arc<[TypeId]>>,
    is_nullable: FxHashMap<TypeId, bool>,
    subtype_views: FxHashMap<(TypeId, ClassifierId), Option<TypeId>>,
    erased: FxHashMap<TypeId, TypeId>,
}

/// Session-wide store of classifiers and interned types.
pub struct TypeInterner {
    names: RefCell<Interner>,
    classifiers: RefCell<Vec<Arc<ClassifierData>>>,
    classifier_super_types: RefCell<Vec<SuperTypesSlot>>,
    classifier_keys: RefCell<FxHashMap<Atom, ClassifierId>>,
    types: RefCell<Vec<TypeData>>,
    type_ids: RefCell<FxHashMap<TypeData, TypeId>>,
    views: RefCell<DerivedViews>,
    function_classifiers: RefCell<FxHashMap<(usize, CallContext), ClassifierId>>,
    builtins: Builtins,
    options: ResolverOptions,
}

impl TypeInterner {
    pub fn new() -> Self {
        Self::with_options(ResolverOptions::default())
    }

    pub fn with_options(options: ResolverOptions) -> Self {
        let mut names = Interner::new();
        names.intern_common();
        let mut interner = TypeInterner {
            names: RefCell::new(names),
            classifiers: RefCell::new(Vec::new()),
            classifier_super_types: RefCell::new(Vec::new()),
            classifier_keys: RefCell::new(FxHashMap::default()),
            types: RefCell::new(Vec::new()),
            type_ids: RefCell::new(FxHashMap::default()),
            views: RefCell::new(DerivedViews::default()),
            function_classifiers: RefCell::new(FxHashMap::default()),
            builtins: Builtins {
                any: ClassifierId::ANY,
                nothing: ClassifierId::NOTHING,
                star: ClassifierId::STAR,
                collection: ClassifierId::ANY,
                list: ClassifierId::ANY,
                source_key: ClassifierId::ANY,
                type_key: ClassifierId::ANY,
            },
            options,
        };
        interner.register_builtins();
        interner
    }

    fn register_builtins(&mut self) {
        let any = self.declare_classifier(ClassifierDecl::new("kotlin.Any"));
        let nothing = self.declare_classifier(ClassifierDecl::new("kotlin.Nothing"));
        let star = self.declare_classifier(ClassifierDecl::new("kotlin.Any").with_key("*"));
        debug_assert_eq!(any, ClassifierId::ANY);
        debug_assert_eq!(nothing, ClassifierId::NOTHING);
        debug_assert_eq!(star, ClassifierId::STAR);
        self.set_super_types(any, Vec::new());
        self.set_super_types(nothing, Vec::new());
        self.set_super_types(star, Vec::new());

        // Fixed slots behind the TypeId constants.
        let any_type = self.intern(TypeData::new(any, []));
        let nullable_any = self.intern(TypeData {
            nullable: true,
            ..TypeData::new(any, [])
        });
        let nothing_type = self.intern(TypeData::new(nothing, []));
        let nullable_nothing = self.intern(TypeData {
            nullable: true,
            ..TypeData::new(nothing, [])
        });
        let star_type = self.intern(TypeData {
            star: true,
            ..TypeData::new(star, [])
        });
        debug_assert_eq!(any_type, TypeId::ANY);
        debug_assert_eq!(nullable_any, TypeId::NULLABLE_ANY);
        debug_assert_eq!(nothing_type, TypeId::NOTHING);
        debug_assert_eq!(nullable_nothing, TypeId::NULLABLE_NOTHING);
        debug_assert_eq!(star_type, TypeId::STAR);

        let collection_e = self.declare_classifier(ClassifierDecl::type_parameter(
            "kotlin.collections.Collection.E",
            Variance::Out,
        ));
        let collection = self.declare_classifier(
            ClassifierDecl::new("kotlin.collections.Collection")
                .with_type_parameters(vec![collection_e]),
        );
        let list_e = self.declare_classifier(ClassifierDecl::type_parameter(
            "kotlin.collections.List.E",
            Variance::Out,
        ));
        let list = self.declare_classifier(
            ClassifierDecl::new("kotlin.collections.List").with_type_parameters(vec![list_e]),
        );
        let list_super = self.apply(collection, [self.type_parameter_type(list_e)]);
        self.set_super_types(list, vec![list_super]);

        let source_key = self.declare_classifier(ClassifierDecl::new("injekt.common.SourceKey"));
        let type_key_t = self.declare_classifier(ClassifierDecl::type_parameter(
            "injekt.common.TypeKey.T",
            Variance::Invariant,
        ));
        let type_key = self.declare_classifier(
            ClassifierDecl::new("injekt.common.TypeKey").with_type_parameters(vec![type_key_t]),
        );

        self.builtins = Builtins {
            any,
            nothing,
            star,
            collection,
            list,
            source_key,
            type_key,
        };
    }

    #[inline]
    pub fn builtins(&self) -> Builtins {
        self.builtins
    }

    #[inline]
    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    // =========================================================================
    // Names
    // =========================================================================

    pub fn intern_name(&self, name: &str) -> Atom {
        self.names.borrow_mut().intern(name)
    }

    pub fn name(&self, atom: Atom) -> Arc<str> {
        self.names.borrow().resolve_arc(atom)
    }

    // =========================================================================
    // Classifiers
    // =========================================================================

    /// Declare (or look up) a classifier. Classifiers are cached by key for
    /// the whole session, so a second declaration with the same key returns
    /// the first handle.
    ///
    /// Tag classifiers receive an implicit trailing `out` type parameter that
    /// holds the wrapped type.
    pub fn declare_classifier(&self, decl: ClassifierDecl) -> ClassifierId {
        let key_text = if decl.key.is_empty() {
            decl.fq_name.clone()
        } else {
            decl.key.clone()
        };
        let key = self.intern_name(&key_text);
        if let Some(&existing) = self.classifier_keys.borrow().get(&key) {
            return existing;
        }

        let mut type_parameters = decl.type_parameters;
        if decl.flags.contains(ClassifierFlags::TAG) {
            let wrapped = self.declare_classifier(
                ClassifierDecl::type_parameter(format!("{}.$TT", decl.fq_name), Variance::Out)
                    .with_key(format!("{key_text}.$TT")),
            );
            type_parameters.push(wrapped);
        }

        let default_super_types: Arc<[TypeId]> =
            if decl.flags.contains(ClassifierFlags::TYPE_PARAMETER) {
                Arc::from([TypeId::NULLABLE_ANY])
            } else if key_text == "kotlin.Any" || key_text == "kotlin.Nothing" || key_text == "*" {
                Arc::from([])
            } else {
                Arc::from([TypeId::ANY])
            };

        let mut classifiers = self.classifiers.borrow_mut();
        let id = ClassifierId(classifiers.len() as u32);
        classifiers.push(Arc::new(ClassifierData {
            key,
            fq_name: self.intern_name(&decl.fq_name),
            type_parameters,
            flags: decl.flags,
            variance: decl.variance,
            tags: decl.tags,
            call_context: decl.call_context,
            origin: id,
        }));
        drop(classifiers);
        self.classifier_super_types
            .borrow_mut()
            .push(SuperTypesSlot::Resolved(default_super_types));
        self.classifier_keys.borrow_mut().insert(key, id);
        id
    }

    /// Convenience for declaring a type parameter with explicit bounds.
    pub fn declare_type_parameter(
        &self,
        fq_name: &str,
        variance: Variance,
        flags: ClassifierFlags,
    ) -> ClassifierId {
        self.declare_classifier(
            ClassifierDecl::type_parameter(fq_name, variance).with_flags(flags),
        )
    }

    /// Allocate a copy of `original` that shares its key and answers
    /// `canonical()` with the original declaration.
    pub(crate) fn copy_classifier(
        &self,
        original: ClassifierId,
        super_types: LazySuperTypes,
    ) -> ClassifierId {
        let data = self.classifier(original);
        let mut classifiers = self.classifiers.borrow_mut();
        let id = ClassifierId(classifiers.len() as u32);
        classifiers.push(Arc::new(ClassifierData {
            origin: data.origin,
            ..(*data).clone()
        }));
        drop(classifiers);
        self.classifier_super_types
            .borrow_mut()
            .push(SuperTypesSlot::Lazy(super_types));
        id
    }

    pub fn classifier_by_key(&self, key: &str) -> Option<ClassifierId> {
        let atom = self.names.borrow().lookup(key)?;
        self.classifier_keys.borrow().get(&atom).copied()
    }

    pub fn set_super_types(&self, id: ClassifierId, super_types: Vec<TypeId>) {
        if let Some(slot) = self.classifier_super_types.borrow_mut().get_mut(id.0 as usize) {
            *slot = SuperTypesSlot::Resolved(Arc::from(super_types));
        }
    }

    /// Install a thunk computing the supertypes on first access. Used when the
    /// supertypes mention classifiers that do not exist yet.
    pub fn set_lazy_super_types(&self, id: ClassifierId, super_types: LazySuperTypes) {
        if let Some(slot) = self.classifier_super_types.borrow_mut().get_mut(id.0 as usize) {
            *slot = SuperTypesSlot::Lazy(super_types);
        }
    }

    #[inline]
    pub fn classifier(&self, id: ClassifierId) -> Arc<ClassifierData> {
        self.classifiers.borrow()[id.0 as usize].clone()
    }

    /// The declaration a (possibly substituted) classifier was copied from.
    #[inline]
    pub fn canonical(&self, id: ClassifierId) -> ClassifierId {
        self.classifiers.borrow()[id.0 as usize].origin
    }

    #[inline]
    pub fn has_flag(&self, id: ClassifierId, flag: ClassifierFlags) -> bool {
        self.classifiers.borrow()[id.0 as usize].flags.contains(flag)
    }

    #[inline]
    pub fn is_type_parameter(&self, id: ClassifierId) -> bool {
        self.has_flag(id, ClassifierFlags::TYPE_PARAMETER)
    }

    /// Declared supertypes of a classifier.
    pub fn classifier_super_types(&self, id: ClassifierId) -> Arc<[TypeId]> {
        let thunk = {
            let mut slots = self.classifier_super_types.borrow_mut();
            let Some(slot) = slots.get_mut(id.0 as usize) else {
                return Arc::from([]);
            };
            match slot {
                SuperTypesSlot::Resolved(types) => return types.clone(),
                SuperTypesSlot::Computing => return Arc::from([]),
                SuperTypesSlot::Lazy(thunk) => {
                    let thunk = thunk.clone();
                    *slot = SuperTypesSlot::Computing;
                    thunk
                }
            }
        };
        let computed: Arc<[TypeId]> = Arc::from(thunk(self));
        if let Some(slot) = self.classifier_super_types.borrow_mut().get_mut(id.0 as usize) {
            *slot = SuperTypesSlot::Resolved(computed.clone());
        }
        computed
    }

    pub fn fq_name(&self, id: ClassifierId) -> Arc<str> {
        let atom = self.classifiers.borrow()[id.0 as usize].fq_name;
        self.name(atom)
    }

    // =========================================================================
    // Types
    // =========================================================================

    /// Intern a type.
    ///
    /// # Panics
    ///
    /// Panics when the argument count differs from the classifier's type
    /// parameter count. That is an internal defect, not a user error.
    pub fn intern(&self, mut data: TypeData) -> TypeId {
        data.classifier = self.canonical(data.classifier);
        let arity = self.classifier(data.classifier).type_parameters.len();
        assert!(
            data.arguments.len() == arity,
            "argument size mismatch for {}: expected {} arguments, got {}",
            self.fq_name(data.classifier),
            arity,
            data.arguments.len()
        );
        if let Some(&id) = self.type_ids.borrow().get(&data) {
            return id;
        }
        let mut types = self.types.borrow_mut();
        let id = TypeId(types.len() as u32);
        types.push(data.clone());
        drop(types);
        self.type_ids.borrow_mut().insert(data, id);
        id
    }

    #[inline]
    pub fn get(&self, id: TypeId) -> TypeData {
        self.types.borrow()[id.0 as usize].clone()
    }

    #[inline]
    pub fn classifier_of(&self, id: TypeId) -> ClassifierId {
        self.types.borrow()[id.0 as usize].classifier
    }

    #[inline]
    pub fn arguments(&self, id: TypeId) -> TypeArgs {
        self.types.borrow()[id.0 as usize].arguments.clone()
    }

    #[inline]
    pub fn is_marked_nullable(&self, id: TypeId) -> bool {
        self.types.borrow()[id.0 as usize].nullable
    }

    #[inline]
    pub fn is_star(&self, id: TypeId) -> bool {
        self.types.borrow()[id.0 as usize].star
    }

    #[inline]
    pub fn variance_of(&self, id: TypeId) -> Variance {
        self.types.borrow()[id.0 as usize].variance
    }

    #[inline]
    pub fn is_provide(&self, id: TypeId) -> bool {
        self.types.borrow()[id.0 as usize].provide
    }

    #[inline]
    pub fn unique_id(&self, id: TypeId) -> Option<u32> {
        self.types.borrow()[id.0 as usize].unique_id
    }

    #[inline]
    pub fn source(&self, id: TypeId) -> Option<ClassifierId> {
        self.types.borrow()[id.0 as usize].source
    }

    pub fn len(&self) -> usize {
        self.types.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() as u32 <= TypeId::FIRST_USER
    }

    /// `classifier<arguments>` with invariant use-site variance.
    pub fn apply(
        &self,
        classifier: ClassifierId,
        arguments: impl IntoIterator<Item = TypeId>,
    ) -> TypeId {
        self.intern(TypeData::new(classifier, arguments))
    }

    /// The classifier applied to its own type parameters, without tags.
    pub fn base_type(&self, classifier: ClassifierId) -> TypeId {
        let data = self.classifier(classifier);
        let arguments: TypeArgs = data
            .type_parameters
            .iter()
            .map(|&parameter| self.default_type(parameter))
            .collect();
        self.intern(TypeData {
            variance: data.variance,
            ..TypeData::new(classifier, arguments)
        })
    }

    /// The classifier applied to its own type parameters, wrapped in its
    /// attached tags.
    pub fn default_type(&self, classifier: ClassifierId) -> TypeId {
        let tags = self.classifier(classifier).tags.clone();
        let base = self.base_type(classifier);
        self.wrap_tags(&tags, base)
    }

    /// A use of the type parameter inside a declared type, such as a
    /// supertype or a signature. The declared variance stays on the
    /// classifier and the occurrence itself is invariant.
    pub fn type_parameter_type(&self, parameter: ClassifierId) -> TypeId {
        self.with_variance(self.default_type(parameter), Variance::Invariant)
    }

    pub fn with_arguments(&self, id: TypeId, arguments: TypeArgs) -> TypeId {
        let data = self.get(id);
        if data.arguments == arguments {
            return id;
        }
        self.intern(TypeData { arguments, ..data })
    }

    pub fn with_nullability(&self, id: TypeId, nullable: bool) -> TypeId {
        let data = self.get(id);
        if data.nullable == nullable {
            return id;
        }
        self.intern(TypeData { nullable, ..data })
    }

    pub fn with_variance(&self, id: TypeId, variance: Variance) -> TypeId {
        let data = self.get(id);
        if data.variance == variance {
            return id;
        }
        self.intern(TypeData { variance, ..data })
    }

    pub fn with_provide(&self, id: TypeId, provide: bool) -> TypeId {
        let data = self.get(id);
        if data.provide == provide {
            return id;
        }
        self.intern(TypeData { provide, ..data })
    }

    pub fn with_unique_id(&self, id: TypeId, unique_id: Option<u32>) -> TypeId {
        let data = self.get(id);
        if data.unique_id == unique_id {
            return id;
        }
        self.intern(TypeData { unique_id, ..data })
    }

    pub fn with_source(
        &self,
        id: TypeId,
        variance: Variance,
        source: Option<ClassifierId>,
    ) -> TypeId {
        let data = self.get(id);
        self.intern(TypeData {
            variance,
            source,
            ..data
        })
    }

    #[inline]
    pub fn nullable(&self, id: TypeId) -> TypeId {
        self.with_nullability(id, true)
    }

    /// Drop constraint provenance at every level of a type.
    pub fn erase_sources(&self, id: TypeId) -> TypeId {
        if let Some(&erased) = self.views.borrow().erased.get(&id) {
            return erased;
        }
        let data = self.get(id);
        let arguments: TypeArgs = data
            .arguments
            .iter()
            .map(|&argument| self.erase_sources(argument))
            .collect();
        let erased = if data.source.is_none() && arguments == data.arguments {
            id
        } else {
            self.intern(TypeData {
                arguments,
                source: None,
                ..data
            })
        };
        self.views.borrow_mut().erased.insert(id, erased);
        erased
    }

    /// Type equality ignoring constraint provenance.
    #[inline]
    pub fn same_type(&self, a: TypeId, b: TypeId) -> bool {
        a == b || self.erase_sources(a) == self.erase_sources(b)
    }

    // =========================================================================
    // Derived views
    // =========================================================================

    /// The classifier's supertypes with this type's arguments substituted and
    /// this type's nullability applied.
    pub fn super_types(&self, id: TypeId) -> Arc<[TypeId]> {
        if let Some(cached) = self.views.borrow().super_types.get(&id) {
            return cached.clone();
        }
        let data = self.get(id);
        let classifier = self.classifier(data.classifier);
        let declared = self.classifier_super_types(data.classifier);
        let mut substitution = crate::substitute::TypeSubstitution::new();
        let bindings = classifier.type_parameters.iter().zip(data.arguments.iter());
        for (&parameter, &argument) in bindings {
            substitution.insert(self.canonical(parameter), argument);
        }
        let super_types: Arc<[TypeId]> = declared
            .iter()
            .map(|&super_type| {
                let substituted = self.substitute(super_type, &substitution);
                self.with_nullability(substituted, data.nullable)
            })
            .collect();
        self.views
            .borrow_mut()
            .super_types
            .insert(id, super_types.clone());
        super_types
    }

    /// Transitive closure over arguments and supertypes, in discovery order.
    pub fn all_types(&self, id: TypeId) -> Arc<[TypeId]> {
        if let Some(cached) = self.views.borrow().all_types.get(&id) {
            return cached.clone();
        }
        let mut seen: IndexSet<TypeId, FxBuildHasher> = IndexSet::default();
        self.collect_all_types(id, &mut seen);
        let all: Arc<[TypeId]> = seen.into_iter().collect();
        self.views.borrow_mut().all_types.insert(id, all.clone());
        all
    }

    fn collect_all_types(&self, id: TypeId, seen: &mut IndexSet<TypeId, FxBuildHasher>) {
        if !seen.insert(id) {
            return;
        }
        for argument in self.arguments(id) {
            self.collect_all_types(argument, seen);
        }
        for super_type in self.super_types(id).iter() {
            self.collect_all_types(*super_type, seen);
        }
    }

    /// True if the type or any of its supertypes is marked nullable.
    pub fn is_nullable_type(&self, id: TypeId) -> bool {
        if let Some(&cached) = self.views.borrow().is_nullable.get(&id) {
            return cached;
        }
        let result = self.is_marked_nullable(id)
            || self
                .super_types(id)
                .iter()
                .any(|&super_type| self.is_nullable_type(super_type));
        self.views.borrow_mut().is_nullable.insert(id, result);
        result
    }

    /// This type re-expressed as an instantiation of `classifier`, if
    /// `classifier` is among its ancestors.
    pub fn subtype_view(&self, id: TypeId, classifier: ClassifierId) -> Option<TypeId> {
        let classifier = self.canonical(classifier);
        if let Some(cached) = self.views.borrow().subtype_views.get(&(id, classifier)) {
            return *cached;
        }
        let result = if self.classifier_of(id) == classifier {
            Some(id)
        } else {
            self.super_types(id)
                .iter()
                .find_map(|&super_type| self.subtype_view(super_type, classifier))
        };
        self.views
            .borrow_mut()
            .subtype_views
            .insert((id, classifier), result);
        result
    }

    pub fn type_depth(&self, id: TypeId) -> i32 {
        self.arguments(id)
            .iter()
            .map(|&argument| self.type_depth(argument))
            .max()
            .unwrap_or(0)
            + 1
    }

    /// True if `predicate` holds for the type or any nested argument.
    pub fn any_type(&self, id: TypeId, predicate: &mut dyn FnMut(TypeId) -> bool) -> bool {
        if predicate(id) {
            return true;
        }
        self.arguments(id)
            .iter()
            .any(|&argument| self.any_type(argument, predicate))
    }

    /// True if `predicate` holds for the type or any transitive supertype.
    pub fn any_super_type(&self, id: TypeId, predicate: &mut dyn FnMut(TypeId) -> bool) -> bool {
        if predicate(id) {
            return true;
        }
        self.super_types(id)
            .iter()
            .any(|&super_type| self.any_super_type(super_type, predicate))
    }

    /// A free type parameter whose bounds constrain nothing beyond `Any`.
    pub fn is_unconstrained(&self, id: TypeId, static_type_parameters: &[ClassifierId]) -> bool {
        let classifier = self.classifier_of(id);
        self.is_type_parameter(classifier)
            && !static_type_parameters.contains(&classifier)
            && self
                .classifier_super_types(classifier)
                .iter()
                .all(|&bound| {
                    self.classifier_of(bound) == ClassifierId::ANY
                        || self.is_unconstrained(bound, static_type_parameters)
                })
    }

    // =========================================================================
    // Tags
    // =========================================================================

    /// Nest `inner` as the wrapped (last) argument of `tag`.
    pub fn wrap(&self, tag: TypeId, inner: TypeId) -> TypeId {
        let mut arguments = self.arguments(tag);
        arguments.pop();
        arguments.push(inner);
        self.with_arguments(tag, arguments)
    }

    /// Wrap `inner` in a chain of tags; the last tag ends up innermost.
    pub fn wrap_tags(&self, tags: &[TypeId], inner: TypeId) -> TypeId {
        tags.iter()
            .rev()
            .fold(inner, |acc, &tag| self.wrap(tag, acc))
    }

    pub fn unwrap_tags(&self, id: TypeId) -> TypeId {
        let data = self.get(id);
        if !self.has_flag(data.classifier, ClassifierFlags::TAG) {
            return id;
        }
        match data.arguments.last() {
            Some(&inner) => self.unwrap_tags(inner),
            None => id,
        }
    }

    // =========================================================================
    // Well-known types
    // =========================================================================

    /// The function classifier for `arity` parameters in `call_context`.
    /// Parameters are contravariant and the return type covariant.
    pub fn function_classifier(&self, arity: usize, call_context: CallContext) -> ClassifierId {
        if let Some(&id) = self.function_classifiers.borrow().get(&(arity, call_context)) {
            return id;
        }
        let base = match call_context {
            CallContext::Default => "kotlin.Function",
            CallContext::Suspend => "kotlin.coroutines.SuspendFunction",
            CallContext::Composable => "injekt.ComposableFunction",
        };
        let fq_name = format!("{base}{arity}");
        let mut type_parameters: Vec<ClassifierId> = (1..=arity)
            .map(|index| {
                self.declare_classifier(ClassifierDecl::type_parameter(
                    format!("{fq_name}.P{index}"),
                    Variance::In,
                ))
            })
            .collect();
        let return_parameter =
            ClassifierDecl::type_parameter(format!("{fq_name}.R"), Variance::Out);
        type_parameters.push(self.declare_classifier(return_parameter));
        let id = self.declare_classifier(ClassifierDecl {
            call_context,
            ..ClassifierDecl::new(fq_name)
                .with_type_parameters(type_parameters)
                .with_flags(ClassifierFlags::FUNCTION)
        });
        self.function_classifiers
            .borrow_mut()
            .insert((arity, call_context), id);
        id
    }

    pub fn function_type(
        &self,
        parameters: &[TypeId],
        return_type: TypeId,
        call_context: CallContext,
    ) -> TypeId {
        let classifier = self.function_classifier(parameters.len(), call_context);
        let arguments: SmallVec<[TypeId; 4]> = parameters
            .iter()
            .copied()
            .chain(std::iter::once(return_type))
            .collect();
        self.apply(classifier, arguments)
    }

    /// True if the tag-unwrapped type is one of the function classifiers.
    pub fn is_function_type(&self, id: TypeId) -> bool {
        let unwrapped = self.unwrap_tags(id);
        self.has_flag(self.classifier_of(unwrapped), ClassifierFlags::FUNCTION)
    }

    /// Provide-flagged function value whose invocation is itself a candidate.
    pub fn is_provide_function_type(&self, id: TypeId) -> bool {
        self.is_provide(id)
            && self.any_super_type(self.unwrap_tags(id), &mut |ty: TypeId| {
                self.has_flag(self.classifier_of(ty), ClassifierFlags::FUNCTION)
            })
    }

    /// Call context carried by a function type, `Default` otherwise.
    pub fn call_context_of(&self, id: TypeId) -> CallContext {
        let unwrapped = self.unwrap_tags(id);
        self.classifier(self.classifier_of(unwrapped)).call_context
    }

    pub fn list_type(&self, element: TypeId) -> TypeId {
        self.apply(self.builtins.list, [element])
    }

    pub fn collection_type(&self, element: TypeId) -> TypeId {
        self.apply(self.builtins.collection, [element])
    }

    pub fn type_key_type(&self, ty: TypeId) -> TypeId {
        self.apply(self.builtins.type_key, [ty])
    }

    pub fn source_key_type(&self) -> TypeId {
        self.apply(self.builtins.source_key, [])
    }
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}
