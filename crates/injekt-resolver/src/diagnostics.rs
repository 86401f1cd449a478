//! Human-readable messages for failed call sites.
//!
//! A message names the leaf failure first. For dependency failures it then
//! prints the call chain that was attempted and ends with the leaf cause:
//!
//! ```text
//! no injectable found of type app.Foo for parameter foo of function app.bar.
//!
//! I found:
//!
//!   app.run(
//!     bar = app.bar(
//!       foo = /* missing: */ inject<app.Foo>()
//!     )
//!   )
//!
//! but no injectables were found that match type app.Foo.
//! ```

use crate::context::InjektContext;
use crate::injectable::{Injectable, InjectableId, InjectableRequest};
use crate::result::{Failure, InjectionResult, ResolutionResult};
use std::rc::Rc;

impl InjectionResult {
    /// The diagnostic for an `Error`, `None` for a success.
    pub fn render(&self, ctx: &InjektContext<'_>) -> Option<String> {
        let InjectionResult::Error {
            failure_request,
            failure,
            ..
        } = self
        else {
            return None;
        };
        let failure = failure.as_failure()?;
        let mut renderer = FailureRenderer {
            ctx,
            out: String::new(),
            indent: 0,
        };
        renderer.render(failure_request, failure);
        Some(renderer.out)
    }
}

struct FailureRenderer<'c, 'a> {
    ctx: &'c InjektContext<'a>,
    out: String,
    indent: usize,
}

impl FailureRenderer<'_, '_> {
    fn ty(&self, request: &InjectableRequest) -> String {
        self.ctx.interner().render(request.ty)
    }

    fn candidate_name(&self, candidate: InjectableId) -> String {
        match self.ctx.injectable(candidate).as_ref() {
            Injectable::Callable(injectable) => injectable.callable.fq_name.to_string(),
            other => other.chain_name().to_string(),
        }
    }

    fn candidate_names(&self, results: &[Rc<ResolutionResult>], separator: &str) -> String {
        results
            .iter()
            .filter_map(|result| result.candidate())
            .map(|candidate| self.candidate_name(candidate))
            .collect::<Vec<_>>()
            .join(separator)
    }

    fn line(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn push_indent(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
    }

    fn render(&mut self, request: &InjectableRequest, failure: &Failure) {
        let (leaf_request, leaf) = failure.unwrap_dependency_failure(request);
        let is_leaf = !matches!(failure, Failure::DependencyFailure { .. });

        self.out.push('\n');
        let headline = self.headline(leaf_request, leaf, is_leaf);
        self.line(&headline);

        if !matches!(failure, Failure::DependencyFailure { .. }) {
            return;
        }
        self.out.push('\n');
        self.line("I found:");
        self.out.push('\n');
        self.indent += 1;
        self.push_indent();
        self.print_call(request, failure, None);
        self.indent -= 1;
        self.out.push('\n');

        let tail = self.tail(leaf_request, leaf);
        self.line(&tail);
    }

    fn headline(&self, request: &InjectableRequest, leaf: &Failure, is_leaf: bool) -> String {
        let ty = self.ty(request);
        let parameter = &request.parameter_name;
        let function = &request.chain_name;
        match leaf {
            Failure::CallContextMismatch { actual, candidate } => {
                if is_leaf {
                    let candidate_context = self.ctx.injectable(*candidate).call_context();
                    format!(
                        "injectable {}() of type {ty} for parameter {parameter} of function \
                         {function} is a {} function but current call context is {}.",
                        self.candidate_name(*candidate),
                        candidate_context.name(),
                        actual.name()
                    )
                } else {
                    "call context mismatch.".to_string()
                }
            }
            Failure::ReifiedTypeArgumentMismatch {
                parameter: type_parameter,
                argument,
                candidate,
            } => {
                if is_leaf {
                    let interner = self.ctx.interner();
                    format!(
                        "type parameter {} of injectable {}() of type {ty} for parameter \
                         {parameter} of function {function} is reified but type argument {} is \
                         not reified.",
                        injekt_common::interner::short_name(&interner.fq_name(*type_parameter)),
                        self.candidate_name(*candidate),
                        interner.fq_name(*argument)
                    )
                } else {
                    "type argument kind mismatch.".to_string()
                }
            }
            Failure::CandidateAmbiguity {
                candidate_results, ..
            } => {
                if is_leaf {
                    format!(
                        "ambiguous injectables:\n\n{}\n\ndo all match type {ty} for parameter \
                         {parameter} of function {function}.",
                        self.candidate_names(candidate_results, "\n")
                    )
                } else {
                    format!(
                        "ambiguous injectables of type {ty} for parameter {parameter} of function \
                         {function}."
                    )
                }
            }
            Failure::NoCandidates { .. }
            | Failure::DivergentInjectable { .. }
            | Failure::DependencyFailure { .. } => {
                format!(
                    "no injectable found of type {ty} for parameter {parameter} of function \
                     {function}."
                )
            }
        }
    }

    fn tail(&self, request: &InjectableRequest, leaf: &Failure) -> String {
        let ty = self.ty(request);
        match leaf {
            Failure::CallContextMismatch { actual, .. } => {
                format!("but call context was {}.", actual.name())
            }
            Failure::ReifiedTypeArgumentMismatch { argument, .. } => format!(
                "but type argument {} is not reified.",
                self.ctx.interner().fq_name(*argument)
            ),
            Failure::CandidateAmbiguity {
                candidate_results, ..
            } => format!(
                "but\n\n{}\n\ndo all match type {ty}.",
                self.candidate_names(candidate_results, "\n")
            ),
            Failure::DivergentInjectable { candidate } => format!(
                "but injectable {} produces a diverging search when trying to match type {ty}.",
                self.candidate_name(*candidate)
            ),
            Failure::NoCandidates { .. } | Failure::DependencyFailure { .. } => {
                format!("but no injectables were found that match type {ty}.")
            }
        }
    }

    fn print_call(
        &mut self,
        request: &InjectableRequest,
        failure: &Failure,
        candidate: Option<InjectableId>,
    ) {
        let injectable = candidate.map(|candidate| self.ctx.injectable(candidate));
        let lambda = injectable.as_deref().and_then(|injectable| match injectable {
            Injectable::Lambda(lambda) => Some(lambda),
            _ => None,
        });

        match lambda {
            Some(lambda) => {
                self.out.push_str("{ ");
                if !lambda.parameters.is_empty() {
                    let parameters = lambda
                        .parameters
                        .iter()
                        .map(|(name, ty)| format!("{name}: {}", self.ctx.interner().render(*ty)))
                        .collect::<Vec<_>>()
                        .join(", ");
                    self.out.push_str(&parameters);
                    self.out.push_str(" -> ");
                }
                self.out.push('\n');
            }
            None => {
                self.out.push_str(&request.chain_name);
                if !request.type_arguments.is_empty() {
                    let arguments = request
                        .type_arguments
                        .iter()
                        .map(|(_, argument)| self.ctx.interner().render(*argument))
                        .collect::<Vec<_>>()
                        .join(", ");
                    self.out.push_str(&format!("<{arguments}>"));
                }
                self.out.push_str("(\n");
            }
        }

        self.indent += 1;
        self.push_indent();
        if lambda.is_none() {
            self.out.push_str(&format!("{} = ", request.parameter_name));
        }
        match failure {
            Failure::DependencyFailure {
                candidate,
                dependency_request,
                dependency_failure,
            } => match dependency_failure.as_failure() {
                Some(inner) => self.print_call(dependency_request, inner, Some(*candidate)),
                None => self.out.push('\n'),
            },
            leaf => {
                let comment = match leaf {
                    Failure::CallContextMismatch { actual, .. } => {
                        format!("call context {}:", actual.name())
                    }
                    Failure::ReifiedTypeArgumentMismatch { parameter, .. } => {
                        let name = self.ctx.interner().fq_name(*parameter);
                        format!("{} is reified:", injekt_common::interner::short_name(&name))
                    }
                    Failure::CandidateAmbiguity {
                        candidate_results, ..
                    } => format!(
                        "ambiguous: {} do match type {}",
                        self.candidate_names(candidate_results, ", "),
                        self.ty(request)
                    ),
                    _ => "missing:".to_string(),
                };
                let placeholder = format!("/* {comment} */ inject<{}>()\n", self.ty(request));
                self.out.push_str(&placeholder);
            }
        }
        self.indent -= 1;
        self.push_indent();
        self.out.push_str(if lambda.is_some() { "}\n" } else { ")\n" });
    }
}
