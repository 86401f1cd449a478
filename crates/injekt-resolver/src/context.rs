//! Session state shared by every scope of one resolution run.
//!
//! `InjektContext` owns the scope arena, the injectable arena, the scope
//! cache and the active resolution chain. Scopes and injectables refer to
//! each other by id, so the whole tree can be built and queried through a
//! shared `&InjektContext`.

use crate::declarations::{DeclarationFeed, FileId};
use crate::injectable::{Injectable, InjectableId};
use crate::scope::{InjectablesScope, ScopeId};
use crate::callable::DeclarationId;
use injekt_common::ResolverOptions;
use injekt_solver::{TypeId, TypeInterner};
use rustc_hash::FxHashMap;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::trace;

/// The lexical construct a cached scope was created for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScopeConstruct {
    ExternalGlobal,
    InternalGlobal(FileId),
    File(FileId),
    Class(DeclarationId),
    FunctionParameter(DeclarationId, u32),
    Function(DeclarationId),
    Property(DeclarationId),
    /// A block after its first `count` visible declarations.
    Block { block: DeclarationId, count: u32 },
    /// The body scope of a synthesized lambda for a requested function type.
    Lambda(TypeId),
}

pub struct InjektContext<'a> {
    pub(crate) interner: &'a TypeInterner,
    pub(crate) feed: &'a dyn DeclarationFeed,
    pub(crate) scopes: RefCell<Vec<Rc<InjectablesScope>>>,
    pub(crate) injectables: RefCell<Vec<Rc<Injectable>>>,
    pub(crate) scope_cache: RefCell<FxHashMap<(ScopeConstruct, Option<ScopeId>), ScopeId>>,
    /// Candidates currently being computed, innermost last. Shared by the
    /// whole scope tree.
    pub(crate) resolution_chain: RefCell<Vec<InjectableId>>,
    next_unique_id: Cell<u32>,
}

impl<'a> InjektContext<'a> {
    pub fn new(interner: &'a TypeInterner, feed: &'a dyn DeclarationFeed) -> Self {
        InjektContext {
            interner,
            feed,
            scopes: RefCell::new(Vec::new()),
            injectables: RefCell::new(Vec::new()),
            scope_cache: RefCell::new(FxHashMap::default()),
            resolution_chain: RefCell::new(Vec::new()),
            next_unique_id: Cell::new(0),
        }
    }

    #[inline]
    pub fn interner(&self) -> &'a TypeInterner {
        self.interner
    }

    #[inline]
    pub fn options(&self) -> &'a ResolverOptions {
        self.interner.options()
    }

    pub fn scope(&self, id: ScopeId) -> Rc<InjectablesScope> {
        self.scopes.borrow()[id.0 as usize].clone()
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.borrow().len()
    }

    pub fn injectable(&self, id: InjectableId) -> Rc<Injectable> {
        self.injectables.borrow()[id.0 as usize].clone()
    }

    pub(crate) fn alloc_injectable(&self, injectable: Injectable) -> InjectableId {
        let mut injectables = self.injectables.borrow_mut();
        let id = InjectableId(injectables.len() as u32);
        injectables.push(Rc::new(injectable));
        id
    }

    /// A fresh identity for a module or provide-function expansion site.
    pub(crate) fn next_unique_id(&self) -> u32 {
        let id = self.next_unique_id.get();
        self.next_unique_id.set(id + 1);
        id
    }

    pub(crate) fn cached_scope(
        &self,
        construct: ScopeConstruct,
        parent: Option<ScopeId>,
    ) -> Option<ScopeId> {
        self.scope_cache.borrow().get(&(construct, parent)).copied()
    }

    pub(crate) fn cache_scope(
        &self,
        construct: ScopeConstruct,
        parent: Option<ScopeId>,
        scope: ScopeId,
    ) -> ScopeId {
        self.scope_cache
            .borrow_mut()
            .insert((construct, parent), scope);
        scope
    }

    /// Drop every memoized result. Each call site does this on entry.
    /// Scopes, their candidates and the candidate lists stay cached.
    pub fn clear_results(&self) {
        for scope in self.scopes.borrow().iter() {
            scope.results_by_type.borrow_mut().clear();
            scope.results_by_candidate.borrow_mut().clear();
        }
        trace!(scopes = self.scope_count(), "cleared resolution results");
    }
}
