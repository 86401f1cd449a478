//! Candidate harvesting for modules and provide-function values.
//!
//! Registering a callable in a scope goes through
//! [`InjektContext::collect_module_injectables`]:
//!
//! - an add-on (unbound `ADD_ON` type parameter) becomes an add-on of the
//!   scope instead of a candidate;
//! - a module type is registered under a fresh unique id and its members are
//!   harvested recursively, each receiving the module value as dispatch
//!   receiver;
//! - a provide-function value is registered under a fresh unique id and also
//!   contributes its `invoke`.

use crate::callable::{CallableKind, InjektCallable};
use crate::context::InjektContext;
use crate::scope::InjectablesScope;
use injekt_common::{RecursionGuard, RecursionProfile, RecursionResult};
use injekt_solver::{ClassifierFlags, ClassifierId, TypeId, TypeInterner, TypeSubstitution};
use tracing::{debug, trace};

impl InjektContext<'_> {
    /// Register `callable` and everything it provides in `scope`.
    pub(crate) fn collect_module_injectables(
        &self,
        scope: &InjectablesScope,
        callable: InjektCallable,
    ) {
        let mut guard = RecursionGuard::with_profile(RecursionProfile::ModuleExpansion);
        self.collect_injectables(scope, callable, &mut guard);
    }

    fn collect_injectables(
        &self,
        scope: &InjectablesScope,
        callable: InjektCallable,
        guard: &mut RecursionGuard<ClassifierId>,
    ) {
        let interner = self.interner;
        if let Some(parameter) = callable.add_on_parameter(interner) {
            self.add_add_on(scope, callable, parameter);
            return;
        }

        let untagged = interner.unwrap_tags(callable.ty);
        let classifier = interner.canonical(interner.classifier_of(untagged));
        let is_module = interner.has_flag(classifier, ClassifierFlags::MODULE);
        let is_provide_function = interner.is_provide_function_type(callable.ty);
        if !is_module && !is_provide_function {
            self.add_candidate(scope, callable);
            return;
        }

        let unique_id = Some(self.next_unique_id());
        let callable = InjektCallable {
            ty: interner.with_unique_id(callable.ty, unique_id),
            original_type: interner.with_unique_id(callable.original_type, unique_id),
            ..callable
        };
        self.add_candidate(scope, callable.clone());

        if is_provide_function {
            if let Some(invoke) = invoke_callable(interner, &callable) {
                self.collect_injectables(scope, invoke, guard);
            }
        }

        if is_module {
            match guard.enter(classifier) {
                RecursionResult::Entered => {
                    for member in self.module_member_callables(&callable, classifier) {
                        self.collect_injectables(scope, member, guard);
                    }
                    guard.leave(classifier);
                }
                RecursionResult::Cycle => {
                    trace!(module = %callable.fq_name, "module already expanding");
                }
                RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                    debug!(module = %callable.fq_name, "module expansion limit reached");
                }
            }
        }
    }

    /// Members of the module value `module`, substituted by its type
    /// arguments and bound to it as dispatch receiver.
    fn module_member_callables(
        &self,
        module: &InjektCallable,
        classifier: ClassifierId,
    ) -> Vec<InjektCallable> {
        let interner = self.interner;
        let module_type = interner.unwrap_tags(module.ty);
        let substitution = TypeSubstitution::from_pairs(
            interner
                .classifier(classifier)
                .type_parameters
                .iter()
                .map(|&parameter| interner.canonical(parameter))
                .zip(interner.arguments(module_type)),
        );
        let module_nullable = interner.is_marked_nullable(module.ty);

        self.feed
            .module_members(classifier)
            .into_iter()
            .map(|member| {
                let member = member.substitute(interner, &substitution);
                let nullable = module_nullable || interner.is_marked_nullable(member.ty);
                let ty = interner.with_unique_id(
                    interner.with_nullability(member.ty, nullable),
                    Some(self.next_unique_id()),
                );
                let chain_name = format!("{}.{}", module.chain_name, member.short_name());
                InjektCallable { ty, ..member }
                    .with_chain_name(&chain_name)
                    .with_dispatch_receiver(module.ty)
            })
            .collect()
    }
}

/// `invoke` of a provide-function value: the receiver first, then the
/// function parameters, returning the function's result.
fn invoke_callable(
    interner: &TypeInterner,
    function_value: &InjektCallable,
) -> Option<InjektCallable> {
    let function = function_super_type(interner, interner.unwrap_tags(function_value.ty))?;
    let mut arguments = interner.arguments(function);
    let return_type = arguments.pop()?;
    let mut invoke = InjektCallable::new(
        function_value.symbol,
        &format!("{}.invoke", function_value.fq_name),
        return_type,
    )
    .with_kind(CallableKind::FunctionInvoke)
    .with_call_context(interner.call_context_of(function))
    .with_chain_name(&format!("{}.invoke", function_value.chain_name))
    .with_dispatch_receiver(function_value.ty);
    for (index, &parameter) in arguments.iter().enumerate() {
        invoke = invoke.with_inject_parameter(&format!("p{}", index + 1), parameter);
    }
    Some(invoke)
}

fn function_super_type(interner: &TypeInterner, ty: TypeId) -> Option<TypeId> {
    if interner.has_flag(interner.classifier_of(ty), ClassifierFlags::FUNCTION) {
        return Some(ty);
    }
    interner
        .super_types(ty)
        .iter()
        .find_map(|&super_type| function_super_type(interner, super_type))
}
