//! Deduplicated resolution across candidate loading contexts.
//!
//! Class resolution walks each candidate's parent chain in candidate order
//! and returns the first context that can supply the class. An attempted-set
//! of context identities guarantees that no context is queried twice within
//! one call, which both avoids redundant lookups when chains share ancestors
//! and bounds the walk on cyclic parent graphs.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use crate::classpath;
use crate::context::{ContextId, LoadingContext, ResolvedClass};

/// Default contexts first, then caller-supplied extras. Earlier candidates
/// take precedence on ties.
pub fn merge_candidates(extra: &[Arc<dyn LoadingContext>]) -> Vec<Arc<dyn LoadingContext>> {
    let mut merged = classpath::default_contexts();
    merged.extend(extra.iter().cloned());
    merged
}

/// Resolves `class_name` against the merged default and extra contexts.
pub fn resolve_class_by_name(
    class_name: &str,
    extra: &[Arc<dyn LoadingContext>],
) -> Option<(Arc<dyn LoadingContext>, ResolvedClass)> {
    resolve_class(class_name, &merge_candidates(extra))
}

/// Collects resource locators for `resource` from the merged default and
/// extra contexts.
pub fn resource_locators_by_name(
    resource: &str,
    extra: &[Arc<dyn LoadingContext>],
) -> BTreeSet<String> {
    resolve_resource_locators(resource, &merge_candidates(extra))
}

/// First-success-wins class resolution over `candidates`.
///
/// Each candidate's ancestor chain is walked to its root. A context already
/// attempted earlier in the call is skipped without being queried again, but
/// the walk still continues past it towards the root. Exhausting every chain
/// yields `None`; the caller decides whether that is fatal.
pub fn resolve_class(
    class_name: &str,
    candidates: &[Arc<dyn LoadingContext>],
) -> Option<(Arc<dyn LoadingContext>, ResolvedClass)> {
    let mut attempted: HashSet<ContextId> = HashSet::new();

    for candidate in candidates {
        // Separate per-chain guard: a chain that loops back on itself must
        // terminate even though already-attempted contexts are walked past.
        let mut walked: HashSet<ContextId> = HashSet::new();
        let mut cursor = Some(Arc::clone(candidate));

        while let Some(context) = cursor {
            if !walked.insert(context.id()) {
                break;
            }
            if attempted.insert(context.id())
                && let Some(resolved) = context.resolve_class(class_name)
            {
                return Some((context, resolved));
            }
            cursor = context.parent();
        }
    }

    None
}

/// Union of every locator supplied by every candidate context, deduplicated
/// by exact string equality. Unlike class resolution this never
/// short-circuits: all candidates are always consulted.
pub fn resolve_resource_locators(
    resource: &str,
    candidates: &[Arc<dyn LoadingContext>],
) -> BTreeSet<String> {
    let mut locators = BTreeSet::new();
    for candidate in candidates {
        locators.extend(candidate.resource_locators(resource));
    }
    locators
}
