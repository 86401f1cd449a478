//! Scopes of visible injectables.
//!
//! An [`InjectablesScope`] holds the candidates one lexical construct adds on
//! top of its parent, plus the memo tables filled while resolving requests
//! issued from it. Scopes are created through [`InjektContext::create_scope`]
//! (or the factories in `scope_factories`) and live in the context's arena.
//!
//! Candidate lookup walks the chain from the root: an ancestor's matching
//! candidates come before the scope's own. A scope without injectables
//! answers every lookup with its parent's answer.

use crate::callable::{CallableKind, DeclarationId, InjektCallable};
use crate::context::{InjektContext, ScopeConstruct};
use crate::injectable::{
    CallableInjectable, Injectable, InjectableId, InjectableRequest, LAMBDA_CHAIN_NAME,
    LIST_CHAIN_NAME, LambdaInjectable, ListInjectable, SourceKeyInjectable, TYPE_KEY_CHAIN_NAME,
    TypeKeyInjectable,
};
use crate::result::ResolutionResult;
use indexmap::IndexSet;
use injekt_solver::{
    CallContext, ClassifierId, TypeId, run_add_on_injectable_inference, run_candidate_inference,
};
use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use tracing::trace;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u32);

/// A generic provider applied to every matching candidate of a scope.
#[derive(Clone, Debug)]
pub(crate) struct AddOnInjectable {
    pub callable: Rc<InjektCallable>,
    /// The unbound add-on type parameter as a type.
    pub constraint_type: TypeId,
    /// Candidate types already run through inference for this add-on.
    pub processed: FxHashSet<TypeId>,
}

/// Input of [`InjektContext::create_scope`].
#[derive(Clone, Debug, Default)]
pub struct ScopeInit {
    pub name: String,
    pub parent: Option<ScopeId>,
    pub owner: Option<DeclarationId>,
    pub injectables: Vec<InjektCallable>,
    pub type_parameters: Vec<ClassifierId>,
    /// Defaults to the parent's nesting plus one.
    pub nesting: Option<u32>,
    /// Defaults to the parent's call context.
    pub call_context: Option<CallContext>,
}

impl ScopeInit {
    pub fn new(name: impl Into<String>, parent: Option<ScopeId>) -> Self {
        ScopeInit {
            name: name.into(),
            parent,
            ..ScopeInit::default()
        }
    }

    pub fn with_owner(mut self, owner: DeclarationId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_injectables(mut self, injectables: Vec<InjektCallable>) -> Self {
        self.injectables = injectables;
        self
    }

    pub fn with_type_parameters(mut self, type_parameters: Vec<ClassifierId>) -> Self {
        self.type_parameters = type_parameters;
        self
    }

    pub fn with_nesting(mut self, nesting: u32) -> Self {
        self.nesting = Some(nesting);
        self
    }

    pub fn with_call_context(mut self, call_context: CallContext) -> Self {
        self.call_context = Some(call_context);
        self
    }
}

type RequestKey = (TypeId, Vec<ClassifierId>);

pub struct InjectablesScope {
    pub id: ScopeId,
    pub name: Arc<str>,
    pub parent: Option<ScopeId>,
    pub owner: Option<DeclarationId>,
    pub type_parameters: Vec<ClassifierId>,
    pub nesting: u32,
    pub call_context: CallContext,
    /// The chain from the root down to this scope.
    pub all_scopes: Vec<ScopeId>,
    pub all_static_type_parameters: Vec<ClassifierId>,
    pub(crate) injectables: RefCell<Vec<Rc<InjektCallable>>>,
    pub(crate) add_ons: RefCell<Vec<AddOnInjectable>>,
    /// Add-ons currently expanding, by index into `add_ons`.
    pub(crate) add_on_chain: RefCell<Vec<usize>>,
    injectables_by_request: RefCell<FxHashMap<RequestKey, Rc<[InjectableId]>>>,
    pub(crate) results_by_type: RefCell<FxHashMap<TypeId, Rc<ResolutionResult>>>,
    pub(crate) results_by_candidate: RefCell<FxHashMap<InjectableId, Rc<ResolutionResult>>>,
}

impl std::fmt::Debug for InjectablesScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InjectablesScope({})", self.name)
    }
}

impl InjectablesScope {
    /// The candidates this scope declares, after module expansion.
    pub fn injectables(&self) -> Vec<Rc<InjektCallable>> {
        self.injectables.borrow().clone()
    }

    pub fn has_injectables(&self) -> bool {
        !self.injectables.borrow().is_empty()
    }

    pub fn cached_result(&self, ty: TypeId) -> Option<Rc<ResolutionResult>> {
        self.results_by_type.borrow().get(&ty).cloned()
    }

    pub fn cached_candidate_result(&self, candidate: InjectableId) -> Option<Rc<ResolutionResult>> {
        self.results_by_candidate.borrow().get(&candidate).cloned()
    }

    pub fn add_on_count(&self) -> usize {
        self.add_ons.borrow().len()
    }
}

impl InjektContext<'_> {
    /// Allocate a scope, expand its injectables and apply the add-ons it
    /// inherits or declares.
    pub fn create_scope(&self, init: ScopeInit) -> ScopeId {
        let interner = self.interner;
        let parent = init.parent.map(|parent| self.scope(parent));
        let id = ScopeId(self.scope_count() as u32);

        let mut all_scopes = parent
            .as_ref()
            .map(|parent| parent.all_scopes.clone())
            .unwrap_or_default();
        all_scopes.push(id);

        let type_parameters: Vec<ClassifierId> = init
            .type_parameters
            .iter()
            .map(|&parameter| interner.canonical(parameter))
            .collect();
        let mut all_static_type_parameters = parent
            .as_ref()
            .map(|parent| parent.all_static_type_parameters.clone())
            .unwrap_or_default();
        all_static_type_parameters.extend(type_parameters.iter().copied());

        let nesting = init
            .nesting
            .unwrap_or_else(|| parent.as_ref().map_or(0, |parent| parent.nesting + 1));
        let call_context = init.call_context.unwrap_or_else(|| {
            parent
                .as_ref()
                .map_or(CallContext::Default, |parent| parent.call_context)
        });
        let add_ons = parent
            .as_ref()
            .map(|parent| parent.add_ons.borrow().clone())
            .unwrap_or_default();

        let scope = Rc::new(InjectablesScope {
            id,
            name: Arc::from(init.name.as_str()),
            parent: init.parent,
            owner: init.owner,
            type_parameters,
            nesting,
            call_context,
            all_scopes,
            all_static_type_parameters,
            injectables: RefCell::new(Vec::new()),
            add_ons: RefCell::new(add_ons),
            add_on_chain: RefCell::new(Vec::new()),
            injectables_by_request: RefCell::new(FxHashMap::default()),
            results_by_type: RefCell::new(FxHashMap::default()),
            results_by_candidate: RefCell::new(FxHashMap::default()),
        });
        self.scopes.borrow_mut().push(scope.clone());

        for callable in init.injectables {
            self.collect_module_injectables(&scope, callable);
        }
        let add_on_count = scope.add_ons.borrow().len();
        for index in 0..add_on_count {
            self.apply_add_on_to_all(&scope, index);
        }

        trace!(
            scope = %scope.name,
            nesting,
            injectables = scope.injectables.borrow().len(),
            add_ons = scope.add_ons.borrow().len(),
            "created scope"
        );
        id
    }

    /// Like [`create_scope`](Self::create_scope), but returns the parent when
    /// the new scope would add nothing to it.
    pub fn scope_or_parent_if_empty(&self, init: ScopeInit) -> ScopeId {
        if let Some(parent) = init.parent {
            let parent_scope = self.scope(parent);
            let same_call_context = init
                .call_context
                .is_none_or(|call_context| call_context == parent_scope.call_context);
            if init.injectables.is_empty() && init.type_parameters.is_empty() && same_call_context {
                return parent;
            }
        }
        self.create_scope(init)
    }

    // =========================================================================
    // Candidate lookup
    // =========================================================================

    /// User candidates visible from `scope` whose type satisfies `request`.
    pub fn injectables_for_request(
        &self,
        scope: ScopeId,
        request: &InjectableRequest,
    ) -> Rc<[InjectableId]> {
        let interner = self.interner;
        // Un-keyed lists are always merged by the list builtin.
        if interner.unique_id(request.ty).is_none()
            && interner.classifier_of(request.ty) == interner.builtins().list
        {
            return Rc::from([]);
        }
        let scope = self.scope(scope);
        let key: RequestKey = (request.ty, scope.all_static_type_parameters.clone());
        self.injectables_for_type(&scope, &key)
    }

    fn injectables_for_type(
        &self,
        scope: &InjectablesScope,
        key: &RequestKey,
    ) -> Rc<[InjectableId]> {
        if !scope.has_injectables() {
            return match scope.parent {
                Some(parent) => self.injectables_for_type(&self.scope(parent), key),
                None => Rc::from([]),
            };
        }
        if let Some(cached) = scope.injectables_by_request.borrow().get(key) {
            return cached.clone();
        }

        let interner = self.interner;
        let (request_type, static_type_parameters) = key;
        let mut result: Vec<InjectableId> = match scope.parent {
            Some(parent) => self.injectables_for_type(&self.scope(parent), key).to_vec(),
            None => Vec::new(),
        };
        let request_unique_id = interner.unique_id(*request_type);
        for candidate in scope.injectables() {
            if request_unique_id.is_some()
                && interner.unique_id(candidate.ty) != request_unique_id
            {
                continue;
            }
            let context = run_candidate_inference(
                interner,
                candidate.ty,
                *request_type,
                static_type_parameters,
                false,
            );
            if !context.is_ok() {
                continue;
            }
            let substituted = candidate.substitute(interner, &context.substitution());
            let dependencies = substituted.injectable_requests();
            result.push(self.alloc_injectable(Injectable::Callable(CallableInjectable {
                ty: *request_type,
                owner_scope: scope.id,
                callable: Rc::new(substituted),
                dependencies,
            })));
        }

        let result: Rc<[InjectableId]> = Rc::from(result);
        scope
            .injectables_by_request
            .borrow_mut()
            .insert(key.clone(), result.clone());
        result
    }

    /// A synthesized candidate for `request`, consulted when no user
    /// candidate matches.
    pub fn builtin_injectable_for_request(
        &self,
        scope: ScopeId,
        request: &InjectableRequest,
    ) -> Option<InjectableId> {
        let interner = self.interner;
        let builtins = interner.builtins();
        let classifier = interner.classifier_of(request.ty);
        let scope = self.scope(scope);
        if interner.is_function_type(request.ty) && !interner.is_provide(request.ty) {
            Some(self.lambda_injectable(&scope, request))
        } else if classifier == builtins.list {
            self.list_injectable(&scope, request)
        } else if classifier == builtins.source_key {
            Some(self.alloc_injectable(Injectable::SourceKey(SourceKeyInjectable {
                ty: request.ty,
                owner_scope: scope.id,
            })))
        } else if classifier == builtins.type_key {
            Some(self.type_key_injectable(&scope, request))
        } else {
            None
        }
    }

    fn lambda_injectable(
        &self,
        scope: &InjectablesScope,
        request: &InjectableRequest,
    ) -> InjectableId {
        let interner = self.interner;
        let function = interner.unwrap_tags(request.ty);
        let mut arguments = interner.arguments(function);
        let return_type = arguments.pop().unwrap_or(TypeId::NULLABLE_ANY);
        let parameters: Vec<(Arc<str>, TypeId)> = arguments
            .iter()
            .enumerate()
            .map(|(index, &ty)| (Arc::from(format!("p{}", index + 1)), ty))
            .collect();

        let construct = ScopeConstruct::Lambda(request.ty);
        let dependency_scope = match self.cached_scope(construct, Some(scope.id)) {
            Some(existing) => existing,
            None => {
                let injectables = parameters
                    .iter()
                    .map(|(name, ty)| {
                        InjektCallable::new(
                            DeclarationId::SYNTHETIC,
                            &format!("{LAMBDA_CHAIN_NAME}.{name}"),
                            *ty,
                        )
                        .with_kind(CallableKind::Parameter)
                    })
                    .collect();
                let name = format!("LAMBDA {}", interner.render(request.ty));
                let created = self.create_scope(
                    ScopeInit::new(name, Some(scope.id))
                        .with_injectables(injectables)
                        .with_nesting(scope.nesting + 1)
                        .with_call_context(interner.call_context_of(function)),
                );
                self.cache_scope(construct, Some(scope.id), created)
            }
        };

        let mut dependency = InjectableRequest::new(return_type, LAMBDA_CHAIN_NAME, "instance");
        dependency.is_required = !interner.is_nullable_type(return_type);
        self.alloc_injectable(Injectable::Lambda(LambdaInjectable {
            ty: request.ty,
            owner_scope: scope.id,
            dependency_scope,
            parameters,
            dependencies: vec![dependency],
        }))
    }

    fn list_injectable(
        &self,
        scope: &InjectablesScope,
        request: &InjectableRequest,
    ) -> Option<InjectableId> {
        let interner = self.interner;
        let single_element_type = interner.arguments(request.ty).first().copied()?;
        let collection_element_type = interner.collection_type(single_element_type);
        let elements = self.list_element_types(
            scope,
            single_element_type,
            collection_element_type,
            &scope.all_static_type_parameters,
        );
        if elements.is_empty() {
            return None;
        }
        let dependencies = elements
            .iter()
            .enumerate()
            .map(|(index, &element)| {
                InjectableRequest::new(element, LIST_CHAIN_NAME, &format!("element{index}"))
            })
            .collect();
        Some(self.alloc_injectable(Injectable::List(ListInjectable {
            ty: request.ty,
            owner_scope: scope.id,
            elements,
            single_element_type,
            collection_element_type,
            dependencies,
        })))
    }

    /// Types of every candidate in the chain usable as a list element,
    /// ancestors first, without duplicates.
    fn list_element_types(
        &self,
        scope: &InjectablesScope,
        single_element_type: TypeId,
        collection_element_type: TypeId,
        static_type_parameters: &[ClassifierId],
    ) -> Vec<TypeId> {
        let mut result = match scope.parent {
            Some(parent) => self.list_element_types(
                &self.scope(parent),
                single_element_type,
                collection_element_type,
                static_type_parameters,
            ),
            None => Vec::new(),
        };
        let interner = self.interner;
        for candidate in scope.injectables() {
            let mut context = run_candidate_inference(
                interner,
                candidate.ty,
                single_element_type,
                static_type_parameters,
                false,
            );
            if !context.is_ok() {
                context = run_candidate_inference(
                    interner,
                    candidate.ty,
                    collection_element_type,
                    static_type_parameters,
                    false,
                );
            }
            if !context.is_ok() {
                continue;
            }
            let element = interner.substitute(candidate.ty, &context.substitution());
            if !result.iter().any(|&existing| interner.same_type(existing, element)) {
                result.push(element);
            }
        }
        result
    }

    fn type_key_injectable(
        &self,
        scope: &InjectablesScope,
        request: &InjectableRequest,
    ) -> InjectableId {
        let interner = self.interner;
        let mut type_parameters: IndexSet<ClassifierId, FxBuildHasher> = IndexSet::default();
        if let Some(&keyed) = interner.arguments(request.ty).first() {
            interner.any_type(keyed, &mut |ty: TypeId| {
                let classifier = interner.classifier_of(ty);
                if interner.is_type_parameter(classifier) {
                    type_parameters.insert(interner.canonical(classifier));
                }
                false
            });
        }
        let dependencies = type_parameters
            .iter()
            .map(|&parameter| {
                let parameter_type = interner.default_type(parameter);
                InjectableRequest::new(
                    interner.type_key_type(parameter_type),
                    TYPE_KEY_CHAIN_NAME,
                    &interner.fq_name(parameter),
                )
            })
            .collect();
        self.alloc_injectable(Injectable::TypeKey(TypeKeyInjectable {
            ty: request.ty,
            owner_scope: scope.id,
            dependencies,
        }))
    }

    // =========================================================================
    // Candidate registration and add-ons
    // =========================================================================

    pub(crate) fn add_candidate(&self, scope: &InjectablesScope, callable: InjektCallable) {
        let ty = callable.ty;
        scope.injectables.borrow_mut().push(Rc::new(callable));
        let add_on_count = scope.add_ons.borrow().len();
        for index in 0..add_on_count {
            self.apply_add_on(scope, index, ty);
        }
    }

    pub(crate) fn add_add_on(
        &self,
        scope: &InjectablesScope,
        callable: InjektCallable,
        parameter: ClassifierId,
    ) {
        let constraint_type = callable
            .type_arguments
            .get(&parameter)
            .copied()
            .unwrap_or_else(|| self.interner.default_type(parameter));
        let index = {
            let mut add_ons = scope.add_ons.borrow_mut();
            add_ons.push(AddOnInjectable {
                callable: Rc::new(callable),
                constraint_type,
                processed: FxHashSet::default(),
            });
            add_ons.len() - 1
        };
        self.apply_add_on_to_all(scope, index);
    }

    fn apply_add_on_to_all(&self, scope: &InjectablesScope, index: usize) {
        let candidate_types: Vec<TypeId> = scope
            .injectables
            .borrow()
            .iter()
            .map(|candidate| candidate.ty)
            .collect();
        for candidate_type in candidate_types {
            self.apply_add_on(scope, index, candidate_type);
        }
    }

    fn apply_add_on(&self, scope: &InjectablesScope, index: usize, candidate_type: TypeId) {
        let (callable, constraint_type) = {
            let mut add_ons = scope.add_ons.borrow_mut();
            let Some(add_on) = add_ons.get_mut(index) else {
                return;
            };
            if !add_on.processed.insert(candidate_type) {
                return;
            }
            (add_on.callable.clone(), add_on.constraint_type)
        };
        if scope.add_on_chain.borrow().contains(&index) {
            return;
        }

        let interner = self.interner;
        let context = run_add_on_injectable_inference(
            interner,
            constraint_type,
            candidate_type,
            &scope.all_static_type_parameters,
        );
        if !context.is_ok() {
            return;
        }
        let substituted = callable.substitute(interner, &context.substitution());
        trace!(
            scope = %scope.name,
            add_on = %callable.fq_name,
            candidate = %interner.render(candidate_type),
            "applied add-on"
        );

        scope.add_on_chain.borrow_mut().push(index);
        self.collect_module_injectables(scope, substituted);
        scope.add_on_chain.borrow_mut().retain(|&active| active != index);
    }
}
