//! Typed wrapper around a candidate declaration.
//!
//! An [`InjektCallable`] is what the declaration feed hands to the resolver:
//! the declaration handle, the result type, the named parameters and the type
//! argument bindings. Substitution produces a new callable; the original is
//! never mutated.

use crate::injectable::InjectableRequest;
use indexmap::{IndexMap, IndexSet};
use injekt_solver::{
    CallContext, ClassifierFlags, ClassifierId, TypeId, TypeInterner, TypeSubstitution,
};
use rustc_hash::FxBuildHasher;
use std::sync::Arc;

/// Parameter name under which a member's dispatch receiver is recorded.
pub const DISPATCH_RECEIVER_NAME: &str = "<this>";

/// Parameter name of an extension receiver.
pub const EXTENSION_RECEIVER_NAME: &str = "<receiver>";

/// Opaque handle of a host declaration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclarationId(pub u32);

impl DeclarationId {
    /// Placeholder for synthesized callables with no host declaration.
    pub const SYNTHETIC: DeclarationId = DeclarationId(u32::MAX);
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CallableKind {
    Function,
    Constructor,
    Property,
    /// A provided parameter or receiver of the enclosing declaration.
    Parameter,
    /// A singleton object.
    Object,
    /// `invoke` of a provide-flagged function value.
    FunctionInvoke,
}

pub type ParameterMap = IndexMap<Arc<str>, TypeId, FxBuildHasher>;
pub type NameSet = IndexSet<Arc<str>, FxBuildHasher>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InjektCallable {
    pub symbol: DeclarationId,
    pub fq_name: Arc<str>,
    pub kind: CallableKind,
    pub ty: TypeId,
    /// Result type before any substitution; used for specificity.
    pub original_type: TypeId,
    pub type_parameters: Vec<ClassifierId>,
    pub parameter_types: ParameterMap,
    /// Parameters supplied by injection.
    pub inject_parameters: NameSet,
    pub default_value_parameters: NameSet,
    pub inline_parameters: NameSet,
    /// Bindings of the callable's (canonical) type parameters.
    pub type_arguments: IndexMap<ClassifierId, TypeId, FxBuildHasher>,
    /// Dotted name used for divergence comparison.
    pub chain_name: Arc<str>,
    pub call_context: CallContext,
}

impl InjektCallable {
    pub fn new(symbol: DeclarationId, fq_name: &str, ty: TypeId) -> Self {
        let fq_name: Arc<str> = Arc::from(fq_name);
        InjektCallable {
            symbol,
            chain_name: fq_name.clone(),
            fq_name,
            kind: CallableKind::Function,
            ty,
            original_type: ty,
            type_parameters: Vec::new(),
            parameter_types: ParameterMap::default(),
            inject_parameters: NameSet::default(),
            default_value_parameters: NameSet::default(),
            inline_parameters: NameSet::default(),
            type_arguments: IndexMap::default(),
            call_context: CallContext::Default,
        }
    }

    pub fn with_kind(mut self, kind: CallableKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_call_context(mut self, call_context: CallContext) -> Self {
        self.call_context = call_context;
        self
    }

    pub fn with_chain_name(mut self, chain_name: &str) -> Self {
        self.chain_name = Arc::from(chain_name);
        self
    }

    /// Declare the callable's type parameters. Each starts bound to itself.
    pub fn with_type_parameters(
        mut self,
        interner: &TypeInterner,
        type_parameters: &[ClassifierId],
    ) -> Self {
        for &parameter in type_parameters {
            let parameter = interner.canonical(parameter);
            self.type_parameters.push(parameter);
            self.type_arguments
                .insert(parameter, interner.default_type(parameter));
        }
        self
    }

    /// A parameter resolved by injection.
    pub fn with_inject_parameter(mut self, name: &str, ty: TypeId) -> Self {
        let name: Arc<str> = Arc::from(name);
        self.parameter_types.insert(name.clone(), ty);
        self.inject_parameters.insert(name);
        self
    }

    /// An injected parameter that falls back to its default value.
    pub fn with_optional_parameter(mut self, name: &str, ty: TypeId) -> Self {
        let name: Arc<str> = Arc::from(name);
        self.parameter_types.insert(name.clone(), ty);
        self.inject_parameters.insert(name.clone());
        self.default_value_parameters.insert(name);
        self
    }

    /// A parameter the caller passes explicitly.
    pub fn with_plain_parameter(mut self, name: &str, ty: TypeId) -> Self {
        self.parameter_types.insert(Arc::from(name), ty);
        self
    }

    pub fn with_inline_parameter(mut self, name: &str) -> Self {
        self.inline_parameters.insert(Arc::from(name));
        self
    }

    /// The receiver a member is called on. It is always injected.
    pub fn with_dispatch_receiver(self, ty: TypeId) -> Self {
        self.with_inject_parameter(DISPATCH_RECEIVER_NAME, ty)
    }

    pub fn dispatch_receiver(&self) -> Option<TypeId> {
        self.parameter_types.get(DISPATCH_RECEIVER_NAME).copied()
    }

    /// The add-on type parameter, while it is still unbound.
    pub fn add_on_parameter(&self, interner: &TypeInterner) -> Option<ClassifierId> {
        self.type_arguments
            .iter()
            .find_map(|(&parameter, &argument)| {
                (interner.has_flag(parameter, ClassifierFlags::ADD_ON)
                    && interner.canonical(interner.classifier_of(argument)) == parameter)
                    .then_some(parameter)
            })
    }

    /// The last segment of the fully qualified name.
    pub fn short_name(&self) -> &str {
        injekt_common::interner::short_name(&self.fq_name)
    }

    /// Requests for every injected parameter, in declaration order.
    pub fn injectable_requests(&self) -> Vec<InjectableRequest> {
        let type_arguments: Arc<[(ClassifierId, TypeId)]> = self
            .type_arguments
            .iter()
            .map(|(&parameter, &argument)| (parameter, argument))
            .collect();
        self.parameter_types
            .iter()
            .filter(|(name, _)| self.inject_parameters.contains(*name))
            .map(|(name, &ty)| InjectableRequest {
                ty,
                chain_name: self.fq_name.clone(),
                type_arguments: type_arguments.clone(),
                parameter_name: name.clone(),
                is_required: !self.default_value_parameters.contains(name),
                is_inline: self.inline_parameters.contains(name),
            })
            .collect()
    }

    /// Apply `substitution` to every type the callable mentions.
    ///
    /// The type parameter list is rebuilt so bounds see the substitution too.
    pub fn substitute(
        &self,
        interner: &TypeInterner,
        substitution: &TypeSubstitution,
    ) -> InjektCallable {
        if substitution.is_empty() {
            return self.clone();
        }
        let type_parameters = interner.substitute_classifiers(&self.type_parameters, substitution);
        InjektCallable {
            ty: interner.substitute(self.ty, substitution),
            parameter_types: self
                .parameter_types
                .iter()
                .map(|(name, &ty)| (name.clone(), interner.substitute(ty, substitution)))
                .collect(),
            type_parameters,
            type_arguments: self
                .type_arguments
                .iter()
                .map(|(&parameter, &argument)| {
                    (parameter, interner.substitute(argument, substitution))
                })
                .collect(),
            ..self.clone()
        }
    }
}
