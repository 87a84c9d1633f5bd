//! Exact-match routing with prefix-composed registration.
//!
//! Routes are keyed by `(absolute path, method)`. Prefixes only matter while
//! registering: a group joins its prefix with each relative path, and lookup
//! afterwards is a plain map access — no patterns, no wildcards, no partial
//! matches.

use std::collections::HashMap;
use std::sync::Arc;

use crate::handler::Handler;
use crate::protocol::Method;

type Routes<S> = HashMap<String, HashMap<Method, Arc<dyn Handler<S>>>>;

/// A namespace of routes registered under a common path prefix.
///
/// The prefix is normalized to end with `/`, and leading slashes of relative
/// paths are stripped before joining, so `/api` + `/users` and `/api/` +
/// `users` both bind `/api/users` and double slashes cannot appear.
///
/// Groups compose by value: [`RouteGroup::merge`] copies the other group's
/// finished routes into this one, which makes circular composition
/// inexpressible by construction.
pub struct RouteGroup<S> {
    prefix: String,
    routes: Routes<S>,
}

impl<S> RouteGroup<S> {
    pub fn new(prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        if !prefix.ends_with('/') {
            prefix.push('/');
        }
        Self { prefix, routes: HashMap::new() }
    }

    /// A group rooted at `/`.
    pub fn root() -> Self {
        Self::new("/")
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Registers `handler` for `method` at the prefix-joined absolute path.
    ///
    /// Registering the same `(path, method)` again replaces the earlier
    /// handler — last write wins, mirroring [`RouteGroup::merge`].
    pub fn route(mut self, path: &str, method: Method, handler: impl Handler<S> + 'static) -> Self {
        let absolute = format!("{}{}", self.prefix, path.trim_start_matches('/'));
        self.routes.entry(absolute).or_default().insert(method, Arc::new(handler));
        self
    }

    /// Absorbs every route of `other`. Key collisions resolve to `other`'s
    /// handler; no conflict error is raised.
    pub fn merge(mut self, other: RouteGroup<S>) -> Self {
        for (path, methods) in other.routes {
            self.routes.entry(path).or_default().extend(methods);
        }
        self
    }

    /// Freezes the group into the immutable table the server runs on.
    pub fn into_table(self) -> RouteTable<S> {
        RouteTable { routes: self.routes }
    }
}

/// The read-only route registry shared by every connection.
///
/// Built once before serving starts and never mutated afterwards; connections
/// share it behind an `Arc`.
pub struct RouteTable<S> {
    routes: Routes<S>,
}

impl<S> RouteTable<S> {
    /// Exact-match lookup. Returns `None` for near misses such as a trailing
    /// slash or a registered path under a different method.
    pub fn lookup(&self, path: &str, method: Method) -> Option<&Arc<dyn Handler<S>>> {
        self.routes.get(path).and_then(|methods| methods.get(&method))
    }

    pub fn len(&self) -> usize {
        self.routes.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
