//! Request resolution.
//!
//! ```text
//! resolve_requests
//!   └─ resolve_request        (memoized per scope by requested type)
//!        ├─ user candidates   depth filter, specificity sort, early exit
//!        ├─ builtin candidate list / lambda / source key / type key
//!        └─ NoCandidates
//!             resolve_candidate (memoized per scope by candidate)
//!               ├─ divergence check over the resolution chain
//!               ├─ call context and reified checks
//!               └─ dependencies, in the candidate's own scope if it has one
//! ```

use crate::callable::InjektCallable;
use crate::context::InjektContext;
use crate::injectable::{InjectableId, InjectableRequest};
use crate::result::{DependencyResults, Failure, InjectionResult, ResolutionResult, Success};
use crate::scope::{InjectablesScope, ScopeId};
use injekt_solver::ClassifierFlags;
use std::cmp::Ordering;
use std::rc::Rc;
use tracing::{debug, instrument, trace};

impl InjektContext<'_> {
    /// Resolve every injected parameter of `callee` from `scope`.
    pub fn resolve_call(&self, scope: ScopeId, callee: Rc<InjektCallable>) -> InjectionResult {
        let requests = callee.injectable_requests();
        self.resolve_requests(scope, callee, &requests)
    }

    /// Resolve `requests` as one call site.
    ///
    /// Memoized results from an earlier call site are dropped first. They stay
    /// readable on the scopes until the next call site starts.
    #[instrument(level = "trace", skip_all, fields(scope = scope.0, callee = %callee.fq_name))]
    pub fn resolve_requests(
        &self,
        scope: ScopeId,
        callee: Rc<InjektCallable>,
        requests: &[InjectableRequest],
    ) -> InjectionResult {
        self.clear_results();
        let mut results = DependencyResults::default();
        let mut failure: Option<(InjectableRequest, Rc<ResolutionResult>)> = None;
        for request in requests {
            let result = self.resolve_request(scope, request);
            if result.is_success() {
                results.insert(request.clone(), result);
                continue;
            }
            let downgrade = !request.is_required
                && result
                    .as_failure()
                    .is_some_and(|request_failure| is_no_candidates(request_failure, request));
            if downgrade {
                results.insert(
                    request.clone(),
                    Rc::new(ResolutionResult::Success(Success::DefaultValue)),
                );
                continue;
            }
            let worse = failure
                .as_ref()
                .is_none_or(|(_, current)| self.compare_result(&result, current) == Ordering::Less);
            if worse {
                failure = Some((request.clone(), result));
            }
        }

        match failure {
            None => InjectionResult::Success {
                scope,
                callee,
                results,
            },
            Some((failure_request, failure)) => {
                debug!(
                    callee = %callee.fq_name,
                    request = %failure_request.parameter_name,
                    "injection failed"
                );
                InjectionResult::Error {
                    scope,
                    callee,
                    failure_request,
                    failure,
                }
            }
        }
    }

    pub fn resolve_request(
        &self,
        scope: ScopeId,
        request: &InjectableRequest,
    ) -> Rc<ResolutionResult> {
        let scope_ref = self.scope(scope);
        if let Some(cached) = scope_ref.cached_result(request.ty) {
            return cached;
        }

        let candidates = self.injectables_for_request(scope, request);
        let result = if !candidates.is_empty() {
            self.resolve_candidates(&scope_ref, request, &candidates)
        } else if let Some(builtin) = self.builtin_injectable_for_request(scope, request) {
            self.resolve_candidate(&scope_ref, request, builtin)
        } else {
            Rc::new(ResolutionResult::Failure(Failure::NoCandidates {
                request: request.clone(),
            }))
        };

        if self.options().trace_resolution {
            debug!(
                scope = %scope_ref.name,
                request = %self.interner.render(request.ty),
                parameter = %request.parameter_name,
                success = result.is_success(),
                candidates = candidates.len(),
                "resolved request"
            );
        }
        scope_ref
            .results_by_type
            .borrow_mut()
            .insert(request.ty, result.clone());
        result
    }

    fn resolve_candidates(
        &self,
        scope: &InjectablesScope,
        request: &InjectableRequest,
        candidates: &[InjectableId],
    ) -> Rc<ResolutionResult> {
        if let [candidate] = candidates {
            return self.resolve_candidate(scope, request, *candidate);
        }

        // Shadowing: only the deepest owners compete.
        let max_nesting = candidates
            .iter()
            .map(|&candidate| self.scope(self.injectable(candidate).owner_scope()).nesting)
            .max()
            .unwrap_or(0);
        let remaining: Vec<InjectableId> = candidates
            .iter()
            .copied()
            .filter(|&candidate| {
                self.scope(self.injectable(candidate).owner_scope()).nesting == max_nesting
            })
            .collect();
        let remaining = self.sort_candidates(remaining);

        let mut successes: Vec<Rc<ResolutionResult>> = Vec::new();
        let mut failure: Option<Rc<ResolutionResult>> = None;
        for candidate in remaining {
            if let Some(best) = successes.first().and_then(|success| success.candidate()) {
                if self.compare_candidate(best, candidate) == Some(Ordering::Less) {
                    // Nothing later can beat the current best.
                    break;
                }
            }

            let candidate_result = self.resolve_candidate(scope, request, candidate);
            if candidate_result.is_success() {
                match successes.first() {
                    None => successes.push(candidate_result),
                    Some(first) => match self.compare_result(&candidate_result, first) {
                        Ordering::Less => {
                            successes.clear();
                            successes.push(candidate_result);
                        }
                        Ordering::Equal => successes.push(candidate_result),
                        Ordering::Greater => {}
                    },
                }
            } else {
                let worse = failure.as_ref().is_none_or(|current| {
                    self.compare_result(&candidate_result, current) == Ordering::Less
                });
                if worse {
                    failure = Some(candidate_result);
                }
            }
        }

        if successes.len() == 1 {
            return successes.remove(0);
        }
        if !successes.is_empty() {
            trace!(
                request = %self.interner.render(request.ty),
                candidates = successes.len(),
                "ambiguous candidates"
            );
            return Rc::new(ResolutionResult::Failure(Failure::CandidateAmbiguity {
                request: request.clone(),
                candidate_results: successes,
            }));
        }
        failure.unwrap_or_else(|| {
            Rc::new(ResolutionResult::Failure(Failure::NoCandidates {
                request: request.clone(),
            }))
        })
    }

    /// Stable insertion sort by specificity. Any inconsistent comparison
    /// keeps the declaration order.
    fn sort_candidates(&self, candidates: Vec<InjectableId>) -> Vec<InjectableId> {
        let mut sorted: Vec<InjectableId> = Vec::with_capacity(candidates.len());
        for &candidate in &candidates {
            let mut position = sorted.len();
            for (index, &existing) in sorted.iter().enumerate() {
                let forward = self.compare_candidate(candidate, existing);
                let backward = self.compare_candidate(existing, candidate);
                match (forward, backward) {
                    (Some(forward), Some(backward)) if forward == backward.reverse() => {
                        if forward == Ordering::Less {
                            position = index;
                            break;
                        }
                    }
                    _ => {
                        trace!(candidates = candidates.len(), "keeping declaration order");
                        return candidates;
                    }
                }
            }
            sorted.insert(position, candidate);
        }
        sorted
    }

    fn resolve_candidate(
        &self,
        scope: &InjectablesScope,
        request: &InjectableRequest,
        candidate: InjectableId,
    ) -> Rc<ResolutionResult> {
        self.compute_for_candidate(scope, candidate, || {
            self.resolve_candidate_dependencies(scope, request, candidate)
        })
    }

    fn compute_for_candidate(
        &self,
        scope: &InjectablesScope,
        candidate: InjectableId,
        compute: impl FnOnce() -> ResolutionResult,
    ) -> Rc<ResolutionResult> {
        if let Some(cached) = scope.cached_candidate_result(candidate) {
            return cached;
        }

        let injectable = self.injectable(candidate);
        if injectable.dependencies().is_empty() {
            let result = Rc::new(compute());
            scope
                .results_by_candidate
                .borrow_mut()
                .insert(candidate, result.clone());
            return result;
        }

        if self.is_divergent(candidate) {
            trace!(
                candidate = candidate.0,
                chain = %injectable.chain_name(),
                "divergent candidate"
            );
            let result =
                Rc::new(ResolutionResult::Failure(Failure::DivergentInjectable { candidate }));
            scope
                .results_by_candidate
                .borrow_mut()
                .insert(candidate, result.clone());
            return result;
        }

        self.resolution_chain.borrow_mut().push(candidate);
        let result = Rc::new(compute());
        self.resolution_chain.borrow_mut().pop();
        scope
            .results_by_candidate
            .borrow_mut()
            .insert(candidate, result.clone());
        result
    }

    /// True if a candidate of the same shape is already being computed.
    fn is_divergent(&self, candidate: InjectableId) -> bool {
        let interner = self.interner;
        let injectable = self.injectable(candidate);
        let chain = self.resolution_chain.borrow().clone();
        chain.iter().rev().any(|&previous_id| {
            let previous = self.injectable(previous_id);
            let is_same_callable = if injectable.compares_by_first_dependency()
                && previous.compares_by_first_dependency()
            {
                match (injectable.dependencies().first(), previous.dependencies().first()) {
                    (Some(current), Some(earlier)) => interner.same_type(current.ty, earlier.ty),
                    _ => false,
                }
            } else {
                previous.chain_name() == injectable.chain_name()
            };
            is_same_callable && interner.same_type(previous.ty(), injectable.ty())
        })
    }

    fn resolve_candidate_dependencies(
        &self,
        scope: &InjectablesScope,
        request: &InjectableRequest,
        candidate: InjectableId,
    ) -> ResolutionResult {
        let interner = self.interner;
        let injectable = self.injectable(candidate);

        let candidate_context = injectable.call_context();
        if !scope.call_context.can_call(candidate_context) {
            return ResolutionResult::Failure(Failure::CallContextMismatch {
                actual: scope.call_context,
                candidate,
            });
        }

        if let Some(callable) = injectable.as_callable() {
            for (&parameter, &argument) in &callable.callable.type_arguments {
                let argument_classifier = interner.classifier_of(argument);
                if interner.has_flag(parameter, ClassifierFlags::REIFIED)
                    && interner.is_type_parameter(argument_classifier)
                    && !interner.has_flag(argument_classifier, ClassifierFlags::REIFIED)
                {
                    return ResolutionResult::Failure(Failure::ReifiedTypeArgumentMismatch {
                        parameter,
                        argument: argument_classifier,
                        candidate,
                    });
                }
            }
        }

        let dependency_scope = injectable.dependency_scope().unwrap_or(scope.id);
        let is_lambda = matches!(injectable.as_ref(), crate::injectable::Injectable::Lambda(_));
        let mut dependency_results = DependencyResults::default();
        for dependency in injectable.dependencies() {
            let dependency_result = self.resolve_request(dependency_scope, dependency);
            if dependency_result.is_success() {
                dependency_results.insert(dependency.clone(), dependency_result);
                continue;
            }
            let no_candidates = dependency_result
                .as_failure()
                .is_some_and(|failure| matches!(failure, Failure::NoCandidates { .. }));
            if dependency.is_required && is_lambda && no_candidates {
                return ResolutionResult::Failure(Failure::NoCandidates {
                    request: dependency.clone(),
                });
            }
            let downgrade = !dependency.is_required
                && dependency_result
                    .as_failure()
                    .is_some_and(|failure| is_no_candidates(failure, dependency));
            if downgrade {
                dependency_results.insert(
                    dependency.clone(),
                    Rc::new(ResolutionResult::Success(Success::DefaultValue)),
                );
                continue;
            }
            return ResolutionResult::Failure(Failure::DependencyFailure {
                candidate,
                dependency_request: dependency.clone(),
                dependency_failure: dependency_result,
            });
        }

        trace!(
            request = %request.parameter_name,
            candidate = candidate.0,
            dependencies = dependency_results.len(),
            "resolved candidate"
        );
        ResolutionResult::Success(Success::Value {
            candidate,
            scope: scope.id,
            dependency_results,
        })
    }

    /// `Less` if `a` is the better outcome: successes before failures, values
    /// before defaults, more specific candidates first, and lower failure
    /// ordering first.
    fn compare_result(&self, a: &Rc<ResolutionResult>, b: &Rc<ResolutionResult>) -> Ordering {
        if Rc::ptr_eq(a, b) {
            return Ordering::Equal;
        }
        match (a.as_ref(), b.as_ref()) {
            (ResolutionResult::Success(_), ResolutionResult::Failure(_)) => Ordering::Less,
            (ResolutionResult::Failure(_), ResolutionResult::Success(_)) => Ordering::Greater,
            (ResolutionResult::Success(a), ResolutionResult::Success(b)) => match (a, b) {
                (Success::Value { candidate: a, .. }, Success::Value { candidate: b, .. }) => {
                    self.compare_candidate(*a, *b).unwrap_or(Ordering::Equal)
                }
                (Success::Value { .. }, Success::DefaultValue) => Ordering::Less,
                (Success::DefaultValue, Success::Value { .. }) => Ordering::Greater,
                (Success::DefaultValue, Success::DefaultValue) => Ordering::Equal,
            },
            (ResolutionResult::Failure(a), ResolutionResult::Failure(b)) => {
                a.ordering().cmp(&b.ordering())
            }
        }
    }
}

fn is_no_candidates(failure: &Failure, request: &InjectableRequest) -> bool {
    matches!(
        failure.unwrap_dependency_failure(request).1,
        Failure::NoCandidates { .. }
    )
}
