//! Loading-context abstraction.
//!
//! A loading context is anything that can attempt to resolve a class or a
//! resource by name and may delegate to a parent context. Contexts form a
//! tree through the parent relation; several starting contexts may share
//! ancestors. Identity is carried by an explicit [`ContextId`] handle so the
//! resolver can recognize "the same context reached twice" even across
//! diamond-shaped or cyclic parent graphs.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Stable, comparable identity of a loading context. Allocated once per
/// context instance from a process-wide counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContextId(u64);

impl ContextId {
    pub fn next() -> Self {
        Self(NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A successfully resolved class: its dotted name and a URL-style locator of
/// the classpath entry that supplied it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedClass {
    pub class_name: String,
    pub location: String,
}

/// Capability contract for class and resource resolution.
///
/// `resolve_class` is a local lookup only: implementations must not delegate
/// to their parent, the resolver walks the parent chain explicitly.
/// `resource_locators` mirrors how resource enumeration behaves on the JVM
/// and does include ancestor results.
///
/// Implementations are required to be safe for concurrent read access; the
/// provided [`ClasspathContext`](crate::classpath::ClasspathContext) holds
/// only an immutable entry list. An implementation with interior caches must
/// be serialized by its caller.
pub trait LoadingContext: Send + Sync {
    fn id(&self) -> ContextId;

    /// Human-readable name used in diagnostics and reports.
    fn label(&self) -> &str;

    fn parent(&self) -> Option<Arc<dyn LoadingContext>>;

    /// Attempts to resolve `class_name` against this context alone.
    fn resolve_class(&self, class_name: &str) -> Option<ResolvedClass>;

    /// All locators for `resource` visible from this context, ancestors
    /// included. Order is not significant; callers deduplicate.
    fn resource_locators(&self, resource: &str) -> Vec<String>;
}
