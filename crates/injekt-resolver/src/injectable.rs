//! Candidates and requests.
//!
//! [`Injectable`] is the closed set of things that can satisfy a request:
//! user callables plus the synthesized list, lambda and key values. Every
//! injectable lives in the context's arena and is referred to by
//! [`InjectableId`]; the arena id is the identity used for memoization.

use crate::callable::InjektCallable;
use crate::scope::ScopeId;
use injekt_solver::{CallContext, ClassifierId, TypeId};
use std::rc::Rc;
use std::sync::Arc;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InjectableId(pub u32);

/// A demand for a value of `ty` at one parameter of one callable.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct InjectableRequest {
    pub ty: TypeId,
    /// The callable whose parameter is being satisfied.
    pub chain_name: Arc<str>,
    pub type_arguments: Arc<[(ClassifierId, TypeId)]>,
    pub parameter_name: Arc<str>,
    pub is_required: bool,
    pub is_inline: bool,
}

impl InjectableRequest {
    /// A required, non-inline request without type arguments.
    pub fn new(ty: TypeId, chain_name: &str, parameter_name: &str) -> Self {
        InjectableRequest {
            ty,
            chain_name: Arc::from(chain_name),
            type_arguments: Arc::from([]),
            parameter_name: Arc::from(parameter_name),
            is_required: true,
            is_inline: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.is_required = false;
        self
    }
}

#[derive(Clone, Debug)]
pub struct CallableInjectable {
    /// The request type this candidate was matched against.
    pub ty: TypeId,
    pub owner_scope: ScopeId,
    pub callable: Rc<InjektCallable>,
    pub dependencies: Vec<InjectableRequest>,
}

/// Aggregates every matching candidate in the chain into one list value.
#[derive(Clone, Debug)]
pub struct ListInjectable {
    pub ty: TypeId,
    pub owner_scope: ScopeId,
    pub elements: Vec<TypeId>,
    pub single_element_type: TypeId,
    pub collection_element_type: TypeId,
    pub dependencies: Vec<InjectableRequest>,
}

/// A function value whose body resolves the return type in a nested scope
/// that provides the function parameters.
#[derive(Clone, Debug)]
pub struct LambdaInjectable {
    pub ty: TypeId,
    pub owner_scope: ScopeId,
    pub dependency_scope: ScopeId,
    pub parameters: Vec<(Arc<str>, TypeId)>,
    pub dependencies: Vec<InjectableRequest>,
}

#[derive(Clone, Debug)]
pub struct SourceKeyInjectable {
    pub ty: TypeId,
    pub owner_scope: ScopeId,
}

#[derive(Clone, Debug)]
pub struct TypeKeyInjectable {
    pub ty: TypeId,
    pub owner_scope: ScopeId,
    /// One `TypeKey<P>` request per type parameter `P` mentioned in the type.
    pub dependencies: Vec<InjectableRequest>,
}

#[derive(Clone, Debug)]
pub enum Injectable {
    Callable(CallableInjectable),
    List(ListInjectable),
    Lambda(LambdaInjectable),
    SourceKey(SourceKeyInjectable),
    TypeKey(TypeKeyInjectable),
}

pub const LIST_CHAIN_NAME: &str = "injekt.listOf";
pub const LAMBDA_CHAIN_NAME: &str = "injekt.lambda";
pub const SOURCE_KEY_CHAIN_NAME: &str = "injekt.sourceKey";
pub const TYPE_KEY_CHAIN_NAME: &str = "injekt.typeKeyOf";

impl Injectable {
    pub fn ty(&self) -> TypeId {
        match self {
            Injectable::Callable(injectable) => injectable.ty,
            Injectable::List(injectable) => injectable.ty,
            Injectable::Lambda(injectable) => injectable.ty,
            Injectable::SourceKey(injectable) => injectable.ty,
            Injectable::TypeKey(injectable) => injectable.ty,
        }
    }

    pub fn owner_scope(&self) -> ScopeId {
        match self {
            Injectable::Callable(injectable) => injectable.owner_scope,
            Injectable::List(injectable) => injectable.owner_scope,
            Injectable::Lambda(injectable) => injectable.owner_scope,
            Injectable::SourceKey(injectable) => injectable.owner_scope,
            Injectable::TypeKey(injectable) => injectable.owner_scope,
        }
    }

    pub fn dependencies(&self) -> &[InjectableRequest] {
        match self {
            Injectable::Callable(injectable) => &injectable.dependencies,
            Injectable::List(injectable) => &injectable.dependencies,
            Injectable::Lambda(injectable) => &injectable.dependencies,
            Injectable::SourceKey(_) => &[],
            Injectable::TypeKey(injectable) => &injectable.dependencies,
        }
    }

    /// Scope the dependencies resolve in, when it differs from the
    /// requesting scope.
    pub fn dependency_scope(&self) -> Option<ScopeId> {
        match self {
            Injectable::Lambda(injectable) => Some(injectable.dependency_scope),
            _ => None,
        }
    }

    pub fn chain_name(&self) -> &str {
        match self {
            Injectable::Callable(injectable) => &injectable.callable.chain_name,
            Injectable::List(_) => LIST_CHAIN_NAME,
            Injectable::Lambda(_) => LAMBDA_CHAIN_NAME,
            Injectable::SourceKey(_) => SOURCE_KEY_CHAIN_NAME,
            Injectable::TypeKey(_) => TYPE_KEY_CHAIN_NAME,
        }
    }

    pub fn call_context(&self) -> CallContext {
        match self {
            Injectable::Callable(injectable) => injectable.callable.call_context,
            _ => CallContext::Default,
        }
    }

    pub fn as_callable(&self) -> Option<&CallableInjectable> {
        match self {
            Injectable::Callable(injectable) => Some(injectable),
            _ => None,
        }
    }

    /// Candidates whose identity is their first dependency: function value
    /// invocations and lambdas.
    pub(crate) fn compares_by_first_dependency(&self) -> bool {
        match self {
            Injectable::Callable(injectable) => {
                injectable.callable.kind == crate::callable::CallableKind::FunctionInvoke
            }
            Injectable::Lambda(_) => true,
            _ => false,
        }
    }
}
