//! Scope construction per lexical construct.
//!
//! Every factory caches its scope by (construct, parent) and goes through
//! [`InjektContext::scope_or_parent_if_empty`], so a construct that adds
//! nothing returns its parent.
//!
//! The global chain is
//! `EXTERNAL GLOBAL -> INTERNAL GLOBAL EXCEPT <file> -> FILE <file>`.

use crate::callable::{CallableKind, DeclarationId, InjektCallable};
use crate::context::{InjektContext, ScopeConstruct};
use crate::declarations::{FileId, GlobalDeclarationIndex};
use crate::scope::{ScopeId, ScopeInit};
use injekt_solver::{CallContext, ClassifierId, TypeId};

/// A class body: the class instance is injectable inside it.
#[derive(Clone, Debug)]
pub struct ClassScopeDecl {
    pub id: DeclarationId,
    pub fq_name: String,
    /// The type of `this` inside the class.
    pub this_type: TypeId,
    pub type_parameters: Vec<ClassifierId>,
    /// The companion object, whose scope sits between the class and its
    /// parent.
    pub companion: Option<Box<ClassScopeDecl>>,
}

#[derive(Clone, Debug)]
pub struct FunctionScopeDecl {
    pub id: DeclarationId,
    pub fq_name: String,
    pub is_constructor: bool,
    pub type_parameters: Vec<ClassifierId>,
    /// Provided parameters, in declaration order.
    pub provided_parameters: Vec<InjektCallable>,
    pub call_context: CallContext,
}

#[derive(Clone, Debug)]
pub struct PropertyScopeDecl {
    pub id: DeclarationId,
    pub fq_name: String,
    pub type_parameters: Vec<ClassifierId>,
    /// Provided receivers of the property.
    pub provided_parameters: Vec<InjektCallable>,
}

impl InjektContext<'_> {
    pub fn external_global_scope(&self, index: &dyn GlobalDeclarationIndex) -> ScopeId {
        let construct = ScopeConstruct::ExternalGlobal;
        if let Some(existing) = self.cached_scope(construct, None) {
            return existing;
        }
        let scope = self.create_scope(
            ScopeInit::new("EXTERNAL GLOBAL", None).with_injectables(index.external_declarations()),
        );
        self.cache_scope(construct, None, scope)
    }

    pub fn internal_global_scope(
        &self,
        index: &dyn GlobalDeclarationIndex,
        file: FileId,
    ) -> ScopeId {
        let parent = self.external_global_scope(index);
        let construct = ScopeConstruct::InternalGlobal(file);
        if let Some(existing) = self.cached_scope(construct, Some(parent)) {
            return existing;
        }
        let scope = self.scope_or_parent_if_empty(
            ScopeInit::new(format!("INTERNAL GLOBAL EXCEPT {}", file.0), Some(parent))
                .with_injectables(index.internal_declarations(file)),
        );
        self.cache_scope(construct, Some(parent), scope)
    }

    pub fn file_scope(&self, index: &dyn GlobalDeclarationIndex, file: FileId) -> ScopeId {
        let parent = self.internal_global_scope(index, file);
        let construct = ScopeConstruct::File(file);
        if let Some(existing) = self.cached_scope(construct, Some(parent)) {
            return existing;
        }
        let scope = self.scope_or_parent_if_empty(
            ScopeInit::new(format!("FILE {}", file.0), Some(parent))
                .with_injectables(index.file_declarations(file)),
        );
        self.cache_scope(construct, Some(parent), scope)
    }

    pub fn class_scope(&self, parent: ScopeId, class: &ClassScopeDecl) -> ScopeId {
        self.class_scope_named(parent, class, "CLASS")
    }

    fn class_scope_named(&self, parent: ScopeId, class: &ClassScopeDecl, label: &str) -> ScopeId {
        let construct = ScopeConstruct::Class(class.id);
        if let Some(existing) = self.cached_scope(construct, Some(parent)) {
            return existing;
        }
        let class_parent = match &class.companion {
            Some(companion) => self.class_scope_named(parent, companion, "COMPANION"),
            None => parent,
        };
        let this_name = format!("{}.this", class.fq_name);
        let this = InjektCallable::new(class.id, &this_name, class.this_type)
            .with_kind(CallableKind::Parameter);
        let scope = self.scope_or_parent_if_empty(
            ScopeInit::new(format!("{label} {}", class.fq_name), Some(class_parent))
                .with_owner(class.id)
                .with_injectables(vec![this])
                .with_type_parameters(class.type_parameters.clone()),
        );
        self.cache_scope(construct, Some(parent), scope)
    }

    /// One scope per provided parameter, then the function's own scope with
    /// its type parameters and call context. Parameter scopes after the first
    /// share its nesting.
    pub fn function_scope(&self, parent: ScopeId, function: &FunctionScopeDecl) -> ScopeId {
        let construct = ScopeConstruct::Function(function.id);
        if let Some(existing) = self.cached_scope(construct, Some(parent)) {
            return existing;
        }

        let mut parameter_scope = parent;
        for (index, parameter) in function.provided_parameters.iter().enumerate() {
            let parameter_construct = ScopeConstruct::FunctionParameter(function.id, index as u32);
            if let Some(existing) = self.cached_scope(parameter_construct, Some(parameter_scope)) {
                parameter_scope = existing;
                continue;
            }
            let previous = self.scope(parameter_scope);
            let nesting = if index > 0 && previous.owner == Some(function.id) {
                previous.nesting
            } else {
                previous.nesting + 1
            };
            let created = self.scope_or_parent_if_empty(
                ScopeInit::new(
                    format!("FUNCTION PARAMETER {}.{}", function.fq_name, parameter.short_name()),
                    Some(parameter_scope),
                )
                .with_owner(function.id)
                .with_injectables(vec![parameter.clone()])
                .with_type_parameters(function.type_parameters.clone())
                .with_nesting(nesting),
            );
            parameter_scope = self.cache_scope(parameter_construct, Some(parameter_scope), created);
        }

        let base_name = if function.is_constructor { "CONSTRUCTOR" } else { "FUNCTION" };
        let nesting = self.scope(parameter_scope).nesting;
        let name = format!("{base_name} {}", function.fq_name);
        let init = ScopeInit::new(name, Some(parameter_scope))
            .with_owner(function.id)
            .with_type_parameters(function.type_parameters.clone())
            .with_call_context(function.call_context);
        let init = if parameter_scope == parent {
            init
        } else {
            init.with_nesting(nesting)
        };
        let scope = self.scope_or_parent_if_empty(init);
        self.cache_scope(construct, Some(parent), scope)
    }

    pub fn property_scope(&self, parent: ScopeId, property: &PropertyScopeDecl) -> ScopeId {
        let construct = ScopeConstruct::Property(property.id);
        if let Some(existing) = self.cached_scope(construct, Some(parent)) {
            return existing;
        }
        let scope = self.scope_or_parent_if_empty(
            ScopeInit::new(format!("PROPERTY {}", property.fq_name), Some(parent))
                .with_owner(property.id)
                .with_injectables(property.provided_parameters.clone())
                .with_type_parameters(property.type_parameters.clone()),
        );
        self.cache_scope(construct, Some(parent), scope)
    }

    /// The scope of a position in `block` after the provided declarations in
    /// `visible`. Each declaration opens its own scope; all but the first
    /// keep the nesting of the one before.
    pub fn block_scope(
        &self,
        parent: ScopeId,
        block: DeclarationId,
        visible: &[InjektCallable],
    ) -> ScopeId {
        let Some((last, earlier)) = visible.split_last() else {
            return parent;
        };
        let construct = ScopeConstruct::Block {
            block,
            count: visible.len() as u32,
        };
        if let Some(existing) = self.cached_scope(construct, Some(parent)) {
            return existing;
        }
        let final_parent = if earlier.is_empty() {
            parent
        } else {
            self.block_scope(parent, block, earlier)
        };
        let parent_nesting = self.scope(final_parent).nesting;
        let nesting = if earlier.is_empty() {
            parent_nesting + 1
        } else {
            parent_nesting
        };
        let scope = self.scope_or_parent_if_empty(
            ScopeInit::new(format!("BLOCK AT {}", last.short_name()), Some(final_parent))
                .with_owner(block)
                .with_injectables(vec![last.clone()])
                .with_nesting(nesting),
        );
        self.cache_scope(construct, Some(parent), scope)
    }
}
