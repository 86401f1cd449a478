//! Resolution outcomes.
//!
//! Failures are values. When several branches fail, the one with the lowest
//! [`Failure::ordering`] is reported:
//! ambiguity (0) < candidate-specific failures (1) < divergence (2) < no
//! candidates (3).

use crate::callable::InjektCallable;
use crate::injectable::{InjectableId, InjectableRequest};
use crate::scope::ScopeId;
use indexmap::IndexMap;
use injekt_solver::{CallContext, ClassifierId};
use rustc_hash::FxBuildHasher;
use std::rc::Rc;

pub type DependencyResults = IndexMap<InjectableRequest, Rc<ResolutionResult>, FxBuildHasher>;

#[derive(Clone, Debug)]
pub enum ResolutionResult {
    Success(Success),
    Failure(Failure),
}

#[derive(Clone, Debug)]
pub enum Success {
    /// The chosen candidate and the results of its dependencies.
    Value {
        candidate: InjectableId,
        scope: ScopeId,
        dependency_results: DependencyResults,
    },
    /// An optional dependency left to its default value.
    DefaultValue,
}

#[derive(Clone, Debug)]
pub enum Failure {
    NoCandidates {
        request: InjectableRequest,
    },
    CandidateAmbiguity {
        request: InjectableRequest,
        candidate_results: Vec<Rc<ResolutionResult>>,
    },
    DivergentInjectable {
        candidate: InjectableId,
    },
    CallContextMismatch {
        actual: CallContext,
        candidate: InjectableId,
    },
    ReifiedTypeArgumentMismatch {
        parameter: ClassifierId,
        argument: ClassifierId,
        candidate: InjectableId,
    },
    DependencyFailure {
        candidate: InjectableId,
        dependency_request: InjectableRequest,
        dependency_failure: Rc<ResolutionResult>,
    },
}

impl Failure {
    /// Lower is worse and wins when failures are merged.
    pub fn ordering(&self) -> u8 {
        match self {
            Failure::CandidateAmbiguity { .. } => 0,
            Failure::CallContextMismatch { .. }
            | Failure::ReifiedTypeArgumentMismatch { .. }
            | Failure::DependencyFailure { .. } => 1,
            Failure::DivergentInjectable { .. } => 2,
            Failure::NoCandidates { .. } => 3,
        }
    }

    /// The candidate a candidate-specific failure is about.
    pub fn candidate(&self) -> Option<InjectableId> {
        match self {
            Failure::DivergentInjectable { candidate }
            | Failure::CallContextMismatch { candidate, .. }
            | Failure::ReifiedTypeArgumentMismatch { candidate, .. }
            | Failure::DependencyFailure { candidate, .. } => Some(*candidate),
            Failure::NoCandidates { .. } | Failure::CandidateAmbiguity { .. } => None,
        }
    }

    /// Follow nested dependency failures down to the leaf.
    pub fn unwrap_dependency_failure<'r>(
        &'r self,
        request: &'r InjectableRequest,
    ) -> (&'r InjectableRequest, &'r Failure) {
        match self {
            Failure::DependencyFailure {
                dependency_request,
                dependency_failure,
                ..
            } => match dependency_failure.as_failure() {
                Some(inner) => inner.unwrap_dependency_failure(dependency_request),
                None => (request, self),
            },
            _ => (request, self),
        }
    }
}

impl ResolutionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ResolutionResult::Success(_))
    }

    pub fn as_failure(&self) -> Option<&Failure> {
        match self {
            ResolutionResult::Failure(failure) => Some(failure),
            ResolutionResult::Success(_) => None,
        }
    }

    pub fn as_success(&self) -> Option<&Success> {
        match self {
            ResolutionResult::Success(success) => Some(success),
            ResolutionResult::Failure(_) => None,
        }
    }

    /// The candidate of a `Success::Value`.
    pub fn candidate(&self) -> Option<InjectableId> {
        match self {
            ResolutionResult::Success(Success::Value { candidate, .. }) => Some(*candidate),
            _ => None,
        }
    }
}

/// Outcome of resolving all requests of one call site.
#[derive(Clone, Debug)]
pub enum InjectionResult {
    Success {
        scope: ScopeId,
        callee: Rc<InjektCallable>,
        results: DependencyResults,
    },
    Error {
        scope: ScopeId,
        callee: Rc<InjektCallable>,
        failure_request: InjectableRequest,
        failure: Rc<ResolutionResult>,
    },
}

impl InjectionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, InjectionResult::Success { .. })
    }

    pub fn scope(&self) -> ScopeId {
        match self {
            InjectionResult::Success { scope, .. } | InjectionResult::Error { scope, .. } => *scope,
        }
    }

    /// The representative failure and the leaf it unwraps to.
    pub fn failure(&self) -> Option<(&InjectableRequest, &Failure)> {
        match self {
            InjectionResult::Error {
                failure_request,
                failure,
                ..
            } => failure.as_failure().map(|failure| (failure_request, failure)),
            InjectionResult::Success { .. } => None,
        }
    }

    pub fn unwrapped_failure(&self) -> Option<(&InjectableRequest, &Failure)> {
        self.failure()
            .map(|(request, failure)| failure.unwrap_dependency_failure(request))
    }
}
